use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const ID_PREFIX: &[u8] = b"DOCUMENTID";

/// O que a versão em JavaScript concatenava: a função `toISOString` sem
/// ser chamada, ou seja, o código-fonte dela
const LEGACY_SUFFIX: &[u8] = b"function toISOString() { [native code] }";

/// Origem dos bytes usados no hash do /ID
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentIdSource {
  /// SHA-256 de "DOCUMENTID" + bytes do PDF de entrada
  #[default]
  Content,
  /// SHA-256 constante, idêntico ao gerado pela implementação antiga
  Legacy,
}

/// Identificador de documento (digest SHA-256)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentId([u8; 32]);

impl DocumentId {
  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

/// Calcula o identificador do documento
pub fn compute_document_id(source: DocumentIdSource, content: &[u8]) -> DocumentId {
  let mut hasher = Sha256::new();
  hasher.update(ID_PREFIX);
  match source {
    DocumentIdSource::Content => hasher.update(content),
    DocumentIdSource::Legacy => hasher.update(LEGACY_SUFFIX),
  }
  DocumentId(hasher.finalize().into())
}
