use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::identifier::DocumentIdSource;

/// Variável de ambiente que sobrescreve o caminho do perfil ICC
pub const ICC_PROFILE_ENV: &str = "PDFA3_ICC_PROFILE";

pub const DEFAULT_CREATOR_TOOL: &str = "Flick.";
pub const DEFAULT_PRODUCER: &str = "Flick Netowrk";

/// Configuração para conversão PDF/A-3
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfA3Config {
  /// Autor (dc:creator e /Author)
  pub author: String,
  /// Título (dc:title e /Title)
  pub title: String,
  /// Ferramenta criadora (xmp:CreatorTool e /Creator)
  pub creator_tool: String,
  /// Produtor (pdf:Producer e /Producer)
  pub producer: String,
  /// Caminho do perfil ICC sRGB; `None` usa o perfil embutido
  pub icc_profile_path: Option<PathBuf>,
  /// Origem do hash usado no /ID do trailer
  pub id_source: DocumentIdSource,
  /// Sincroniza o dicionário /Info com o XMP
  pub sync_info: bool,
  /// Remove objetos que ficaram sem referência após a conversão
  pub prune_unreferenced: bool,
}

impl Default for PdfA3Config {
  fn default() -> Self {
    Self {
      author: String::new(),
      title: String::new(),
      creator_tool: DEFAULT_CREATOR_TOOL.to_string(),
      producer: DEFAULT_PRODUCER.to_string(),
      icc_profile_path: None,
      id_source: DocumentIdSource::default(),
      sync_info: true,
      prune_unreferenced: true,
    }
  }
}

impl PdfA3Config {
  pub fn new(author: impl Into<String>, title: impl Into<String>) -> Self {
    Self {
      author: author.into(),
      title: title.into(),
      ..Self::default()
    }
  }

  pub fn with_creator_tool(mut self, creator_tool: impl Into<String>) -> Self {
    self.creator_tool = creator_tool.into();
    self
  }

  pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
    self.producer = producer.into();
    self
  }

  pub fn with_icc_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.icc_profile_path = Some(path.into());
    self
  }

  pub fn with_id_source(mut self, id_source: DocumentIdSource) -> Self {
    self.id_source = id_source;
    self
  }

  pub fn with_sync_info(mut self, sync_info: bool) -> Self {
    self.sync_info = sync_info;
    self
  }

  pub fn with_prune_unreferenced(mut self, prune: bool) -> Self {
    self.prune_unreferenced = prune;
    self
  }

  /// Caminho do perfil ICC: configuração, depois `PDFA3_ICC_PROFILE`.
  /// `None` quer dizer perfil embutido no addon.
  pub fn resolve_icc_profile_path(&self) -> Option<PathBuf> {
    self.icc_profile_path.clone().or_else(|| {
      std::env::var_os(ICC_PROFILE_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
    })
  }
}
