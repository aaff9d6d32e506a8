//! Perfil de cor ICC usado no OutputIntent.
//!
//! O perfil sRGB padrão vem embutido no binário do addon. Perfis externos
//! são lidos uma única vez por caminho e mantidos em memória durante toda a
//! vida do processo. Erros de leitura não entram no cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::{Lazy, OnceCell};
use tracing::debug;

use crate::error::{PdfA3Error, Result};

const HEADER_LEN: usize = 128;

/// sRGB IEC 61966-2.1 (ICC v2, display)
pub const BUNDLED_SRGB: &[u8] = include_bytes!("../assets/sRGB-IEC61966-2.1.icc");

static BUNDLED_PROFILE: OnceCell<Arc<IccProfile>> = OnceCell::new();

static PROFILE_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<IccProfile>>>> =
  Lazy::new(|| Mutex::new(HashMap::new()));

/// Perfil ICC carregado do disco
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccProfile {
  data: Vec<u8>,
}

impl IccProfile {
  /// Valida o cabeçalho ICC (assinatura `acsp` e espaço de cor RGB)
  pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
    if data.len() < HEADER_LEN {
      return Err(PdfA3Error::InvalidIccProfile(format!(
        "arquivo com {} bytes, menor que o cabeçalho",
        data.len()
      )));
    }
    if &data[36..40] != b"acsp" {
      return Err(PdfA3Error::InvalidIccProfile(
        "assinatura 'acsp' ausente".to_string(),
      ));
    }
    if &data[16..20] != b"RGB " {
      return Err(PdfA3Error::InvalidIccProfile(format!(
        "espaço de cor {:?} não é RGB",
        String::from_utf8_lossy(&data[16..20])
      )));
    }
    Ok(Self { data })
  }

  /// Lê e valida o perfil, sem passar pelo cache
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| PdfA3Error::IccIo {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_bytes(data)
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Número de componentes de cor (/N do stream)
  pub fn components(&self) -> i64 {
    3
  }
}

/// Perfil padrão; não depende de nenhum arquivo em disco
pub fn bundled() -> Result<Arc<IccProfile>> {
  BUNDLED_PROFILE
    .get_or_try_init(|| IccProfile::from_bytes(BUNDLED_SRGB.to_vec()).map(Arc::new))
    .map(Arc::clone)
}

/// Retorna o perfil do cache, lendo do disco na primeira vez
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<Arc<IccProfile>> {
  let path = path.as_ref();

  {
    let cache = PROFILE_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(profile) = cache.get(path) {
      return Ok(Arc::clone(profile));
    }
  }

  // Leitura fora do lock; se duas threads lerem juntas, fica a primeira
  let profile = Arc::new(IccProfile::load(path)?);
  debug!(path = %path.display(), bytes = profile.len(), "perfil ICC carregado");

  let mut cache = PROFILE_CACHE.lock().unwrap_or_else(|e| e.into_inner());
  Ok(Arc::clone(
    cache.entry(path.to_path_buf()).or_insert(profile),
  ))
}
