#![deny(clippy::all)]

pub mod config;
pub mod converter;
pub mod error;
pub mod icc;
pub mod identifier;
pub mod inspect;
mod utils;
pub mod xmp;

#[cfg(test)]
mod test_support;

use napi::bindgen_prelude::*;
use napi::{Env, Task};
use napi_derive::napi;

use config::PdfA3Config;
use converter::PdfA3Converter;
use identifier::DocumentIdSource;
use inspect::PdfA3Report;

#[napi(object)]
pub struct A3Options {
  pub author: String,
  pub title: String,
  pub creator_tool: Option<String>,
  pub producer: Option<String>,
  /// Perfil ICC externo; sem ele vale o sRGB embutido no addon
  pub icc_profile_path: Option<String>,
  /// Usa o /ID constante da versão antiga em vez do hash do conteúdo
  pub legacy_document_id: Option<bool>,
}

impl From<A3Options> for PdfA3Config {
  fn from(options: A3Options) -> Self {
    let mut config = PdfA3Config::new(options.author, options.title);
    if let Some(creator_tool) = options.creator_tool {
      config.creator_tool = creator_tool;
    }
    if let Some(producer) = options.producer {
      config.producer = producer;
    }
    if let Some(path) = options.icc_profile_path {
      config.icc_profile_path = Some(path.into());
    }
    if options.legacy_document_id.unwrap_or(false) {
      config.id_source = DocumentIdSource::Legacy;
    }
    config
  }
}

#[napi(object)]
pub struct PdfA3Info {
  pub has_metadata: bool,
  pub author: Option<String>,
  pub title: Option<String>,
  pub pdfa_part: Option<String>,
  pub pdfa_conformance: Option<String>,
  pub marked: bool,
  pub has_struct_tree_root: bool,
  pub output_intent_count: u32,
  pub dest_output_profile_length: Option<u32>,
  pub document_id: Option<Vec<String>>,
}

impl From<PdfA3Report> for PdfA3Info {
  fn from(report: PdfA3Report) -> Self {
    let xmp = report.xmp.unwrap_or_default();
    Self {
      has_metadata: report.has_metadata,
      author: xmp.creators.into_iter().next(),
      title: xmp.title,
      pdfa_part: xmp.pdfa_part,
      pdfa_conformance: xmp.pdfa_conformance,
      marked: report.marked,
      has_struct_tree_root: report.has_struct_tree_root,
      output_intent_count: report.output_intent_count as u32,
      dest_output_profile_length: report.dest_output_profile_len.map(|len| len as u32),
      document_id: report.document_id.map(|(a, b)| vec![a, b]),
    }
  }
}

fn convert(input: &str, config: PdfA3Config) -> Result<String> {
  let converter = PdfA3Converter::new(config)
    .map_err(|e| Error::from_reason(format!("Erro ao carregar perfil ICC: {}", e)))?;

  converter
    .convert_base64(input)
    .map_err(|e| Error::from_reason(format!("Erro ao gerar PDF/A-3: {}", e)))
}

pub struct MakePdfA3Task {
  input: String,
  config: PdfA3Config,
}

impl Task for MakePdfA3Task {
  type Output = String;
  type JsValue = String;

  fn compute(&mut self) -> Result<Self::Output> {
    convert(&self.input, self.config.clone())
  }

  fn resolve(&mut self, _env: Env, output: Self::Output) -> Result<Self::JsValue> {
    Ok(output)
  }
}

// Converte o PDF (base64) em PDF/A-3 fora da thread principal do Node
#[napi]
pub fn make_pdf_a3(base64: String, options: A3Options) -> AsyncTask<MakePdfA3Task> {
  AsyncTask::new(MakePdfA3Task {
    input: base64,
    config: options.into(),
  })
}

#[napi]
pub fn make_pdf_a3_sync(base64: String, options: A3Options) -> Result<String> {
  convert(&base64, options.into())
}

// Lê de volta o que o documento declara (metadados, IDs, OutputIntents)
#[napi]
pub fn inspect_pdf_a3(base64: String) -> Result<PdfA3Info> {
  let report = inspect::inspect_base64(&base64)
    .map_err(|e| Error::from_reason(format!("Erro ao inspecionar PDF: {}", e)))?;
  Ok(report.into())
}
