use lopdf::{Document, Object};
use serde::Serialize;

use crate::error::Result;
use crate::utils::{catalog, decode_base64};
use crate::xmp::XmpSummary;

/// O que um documento declara em termos de PDF/A-3
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfA3Report {
  pub has_metadata: bool,
  pub xmp: Option<XmpSummary>,
  pub marked: bool,
  pub has_struct_tree_root: bool,
  pub output_intent_count: usize,
  /// Tamanho do perfil ICC do primeiro OutputIntent
  pub dest_output_profile_len: Option<usize>,
  /// Par /ID do trailer em hexadecimal
  pub document_id: Option<(String, String)>,
}

impl PdfA3Report {
  pub fn ids_match(&self) -> bool {
    matches!(&self.document_id, Some((a, b)) if a == b)
  }

  /// Todas as entradas que a conversão adiciona estão presentes
  pub fn is_complete(&self) -> bool {
    self.has_metadata
      && self.xmp.as_ref().is_some_and(XmpSummary::declares_pdfa3a)
      && self.marked
      && self.has_struct_tree_root
      && self.output_intent_count == 1
      && self.dest_output_profile_len.is_some()
      && self.ids_match()
  }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
  doc.dereference(obj).ok().map(|(_, resolved)| resolved)
}

pub fn inspect(doc: &Document) -> Result<PdfA3Report> {
  let catalog = catalog(doc)?;
  let mut report = PdfA3Report::default();

  if let Some(Object::Stream(stream)) = catalog.get(b"Metadata").ok().and_then(|o| resolve(doc, o)) {
    report.has_metadata = true;
    let content = stream
      .decompressed_content()
      .unwrap_or_else(|_| stream.content.clone());
    report.xmp = Some(XmpSummary::parse(&String::from_utf8_lossy(&content))?);
  }

  report.marked = catalog
    .get(b"MarkInfo")
    .ok()
    .and_then(|o| resolve(doc, o))
    .and_then(|o| o.as_dict().ok())
    .and_then(|d| d.get(b"Marked").ok())
    .and_then(|m| m.as_bool().ok())
    .unwrap_or(false);

  report.has_struct_tree_root = catalog
    .get(b"StructTreeRoot")
    .ok()
    .and_then(|o| resolve(doc, o))
    .and_then(|o| o.as_dict().ok())
    .is_some();

  if let Some(intents) = catalog
    .get(b"OutputIntents")
    .ok()
    .and_then(|o| resolve(doc, o))
    .and_then(|o| o.as_array().ok())
  {
    report.output_intent_count = intents.len();
    report.dest_output_profile_len = intents
      .first()
      .and_then(|i| resolve(doc, i))
      .and_then(|i| i.as_dict().ok())
      .and_then(|i| i.get(b"DestOutputProfile").ok())
      .and_then(|p| resolve(doc, p))
      .and_then(|p| p.as_stream().ok())
      .map(|p| p.content.len());
  }

  if let Ok(Object::Array(ids)) = doc.trailer.get(b"ID") {
    if let [first, second] = ids.as_slice() {
      if let (Ok(a), Ok(b)) = (first.as_str(), second.as_str()) {
        report.document_id = Some((hex::encode(a), hex::encode(b)));
      }
    }
  }

  Ok(report)
}

/// `inspect` para PDF em base64
pub fn inspect_base64(input: &str) -> Result<PdfA3Report> {
  let doc = Document::load_mem(&decode_base64(input)?)?;
  inspect(&doc)
}
