use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfA3Error {
  #[error("Erro ao ler perfil ICC {}: {source}", path.display())]
  IccIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Perfil ICC inválido: {0}")]
  InvalidIccProfile(String),

  #[error("Erro ao decodificar base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("PDF inválido: {0}")]
  Pdf(#[from] lopdf::Error),

  #[error("Catálogo do PDF não encontrado")]
  MissingCatalog,

  #[error("XMP inválido: {0}")]
  Xmp(#[from] quick_xml::Error),

  #[error("Erro ao serializar PDF: {0}")]
  Save(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfA3Error>;

impl From<PdfA3Error> for napi::Error {
  fn from(err: PdfA3Error) -> Self {
    napi::Error::new(napi::Status::GenericFailure, err.to_string())
  }
}
