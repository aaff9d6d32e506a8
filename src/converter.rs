use std::sync::Arc;

use chrono::{DateTime, Utc};
use lopdf::{
  dictionary, text_string, Dictionary, Document, Object, ObjectId, Stream, StringFormat,
};
use tracing::{debug, info, instrument, warn};

use crate::config::PdfA3Config;
use crate::error::{PdfA3Error, Result};
use crate::icc::{self, IccProfile};
use crate::identifier::{compute_document_id, DocumentId};
use crate::utils::{catalog_mut, decode_base64, encode_base64, pdf_date, register_and_link};
use crate::xmp::XmpPacket;

/// Estrutura principal para conversão de PDFs em PDF/A-3
pub struct PdfA3Converter {
  config: PdfA3Config,
  profile: Arc<IccProfile>,
}

impl PdfA3Converter {
  /// Cria o conversor carregando o perfil ICC (do cache, se já lido).
  /// Sem caminho configurado usa o perfil embutido no addon. Falha aqui,
  /// antes de tocar em qualquer documento, se o perfil não existir.
  pub fn new(config: PdfA3Config) -> Result<Self> {
    let profile = match config.resolve_icc_profile_path() {
      Some(path) => icc::load_cached(path)?,
      None => icc::bundled()?,
    };
    Ok(Self { config, profile })
  }

  /// Cria o conversor com um perfil já carregado
  pub fn with_profile(config: PdfA3Config, profile: Arc<IccProfile>) -> Self {
    Self { config, profile }
  }

  /// Converte um PDF em base64 e devolve o resultado em base64
  pub fn convert_base64(&self, input: &str) -> Result<String> {
    let pdf_data = decode_base64(input)?;
    let output = self.convert_bytes(&pdf_data)?;
    Ok(encode_base64(&output))
  }

  /// Converte um PDF a partir de bytes e retorna o buffer serializado
  #[instrument(
    skip(self, pdf_data),
    fields(input_len = pdf_data.len(), author_len = self.config.author.len(), title_len = self.config.title.len())
  )]
  pub fn convert_bytes(&self, pdf_data: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf_data)?;

    let document_id = compute_document_id(self.config.id_source, pdf_data);
    self.convert_document(&mut doc, document_id, Utc::now())?;

    let mut output = Vec::new();
    doc.save_to(&mut output)?;

    info!(output_len = output.len(), "PDF/A-3 gerado");
    Ok(output)
  }

  /// Aplica todas as alterações PDF/A-3 no documento já carregado
  pub fn convert_document(
    &self,
    doc: &mut Document,
    document_id: DocumentId,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let packet = XmpPacket::new(&self.config.author, &self.config.title, now)
      .with_creator_tool(&self.config.creator_tool)
      .with_producer(&self.config.producer);

    // 1. Metadados XMP
    inject_metadata(doc, &packet)?;

    // 2. /ID, MarkInfo e StructTreeRoot
    inject_document_id(doc, &document_id);
    mark_tagged(doc)?;
    inject_struct_tree_root(doc)?;

    // 3. OutputIntent com o perfil sRGB
    inject_output_intent(doc, &self.profile)?;

    if self.config.sync_info {
      sync_info_dictionary(doc, &self.config, &now)?;
    }

    if self.config.prune_unreferenced {
      let pruned = doc.prune_objects();
      if !pruned.is_empty() {
        debug!(count = pruned.len(), "objetos sem referência removidos");
      }
    }

    Ok(())
  }
}

fn warn_if_replacing(doc: &mut Document, key: &str) -> Result<()> {
  if catalog_mut(doc)?.has(key.as_bytes()) {
    warn!(key, "entrada existente no Catalog será sobrescrita");
  }
  Ok(())
}

/// Registra o stream XMP e aponta /Metadata do Catalog para ele
pub fn inject_metadata(doc: &mut Document, packet: &XmpPacket) -> Result<ObjectId> {
  let xml = packet.to_xml().into_bytes();
  let dict = dictionary! {
    "Type" => "Metadata",
    "Subtype" => "XML",
    "Length" => xml.len() as i64,
  };
  // PDF/A exige o XMP legível, sem filtro
  let mut stream = Stream::new(dict, xml);
  stream.allows_compression = false;

  warn_if_replacing(doc, "Metadata")?;
  let id = register_and_link(doc, "Metadata", stream)?;
  debug!(?id, "stream de metadados registrado");
  Ok(id)
}

/// Grava /ID [<id> <id>] no trailer (permanente e mutável iguais)
pub fn inject_document_id(doc: &mut Document, document_id: &DocumentId) {
  let id = Object::String(document_id.as_bytes().to_vec(), StringFormat::Hexadecimal);
  doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
  debug!(id = %document_id.to_hex(), "identificador do documento definido");
}

/// Declara o documento como marcado (/MarkInfo << /Marked true >>)
pub fn mark_tagged(doc: &mut Document) -> Result<()> {
  catalog_mut(doc)?.set("MarkInfo", dictionary! { "Marked" => true });
  Ok(())
}

/// Registra um StructTreeRoot vazio e liga ao Catalog
pub fn inject_struct_tree_root(doc: &mut Document) -> Result<ObjectId> {
  warn_if_replacing(doc, "StructTreeRoot")?;
  let id = register_and_link(doc, "StructTreeRoot", dictionary! {
    "Type" => "StructTreeRoot",
  })?;
  debug!(?id, "StructTreeRoot registrado");
  Ok(id)
}

/// Incorpora o perfil ICC e define /OutputIntents com um único intent.
/// Qualquer /OutputIntents anterior é substituído.
pub fn inject_output_intent(doc: &mut Document, profile: &IccProfile) -> Result<ObjectId> {
  let profile_stream = Stream::new(
    dictionary! {
      "N" => profile.components(),
      "Length" => profile.len() as i64,
    },
    profile.data().to_vec(),
  );
  let profile_id = doc.add_object(profile_stream);

  let intent_id = doc.add_object(dictionary! {
    "Type" => "OutputIntent",
    "S" => "GTS_PDFA1",
    "OutputConditionIdentifier" => Object::string_literal("sRGB"),
    "DestOutputProfile" => profile_id,
  });

  warn_if_replacing(doc, "OutputIntents")?;
  catalog_mut(doc)?.set("OutputIntents", vec![Object::Reference(intent_id)]);
  debug!(?profile_id, ?intent_id, bytes = profile.len(), "OutputIntent registrado");
  Ok(intent_id)
}

/// Copia título, autor, ferramentas e datas para o dicionário /Info,
/// criando-o se não existir. Demais chaves são preservadas.
pub fn sync_info_dictionary(
  doc: &mut Document,
  config: &PdfA3Config,
  now: &DateTime<Utc>,
) -> Result<()> {
  let date = Object::string_literal(pdf_date(now));
  let entries: [(&str, Object); 6] = [
    ("Title", text_string(&config.title)),
    ("Author", text_string(&config.author)),
    ("Creator", text_string(&config.creator_tool)),
    ("Producer", text_string(&config.producer)),
    ("CreationDate", date.clone()),
    ("ModDate", date),
  ];

  let info = info_dictionary_mut(doc)?;
  for (key, value) in entries {
    info.set(key, value);
  }
  Ok(())
}

fn info_dictionary_mut(doc: &mut Document) -> Result<&mut Dictionary> {
  let existing = match doc.trailer.get(b"Info").ok().cloned() {
    Some(Object::Reference(id)) if doc.get_dictionary(id).is_ok() => Some(id),
    // /Info inline no trailer: move para um objeto indireto
    Some(Object::Dictionary(dict)) => Some(doc.add_object(dict)),
    _ => None,
  };

  let info_id = match existing {
    Some(id) => id,
    None => doc.add_object(Dictionary::new()),
  };
  doc.trailer.set("Info", Object::Reference(info_id));

  doc
    .get_object_mut(info_id)
    .and_then(Object::as_dict_mut)
    .map_err(PdfA3Error::from)
}
