//! Pacote XMP com os esquemas Dublin Core, XMP Basic, Adobe PDF e a
//! identificação PDF/A (pdfaid).
//!
//! Todo texto vindo do usuário passa por [`escape_xml_text`] antes de entrar
//! no XML.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::config::{DEFAULT_CREATOR_TOOL, DEFAULT_PRODUCER};
use crate::error::Result;
use crate::utils::xmp_date;

pub const PDFA_PART: &str = "3";
pub const PDFA_CONFORMANCE: &str = "A";

pub fn escape_xml_text(text: &str) -> Cow<'_, str> {
  quick_xml::escape::escape(text)
}

/// Dados que vão para o pacote XMP
#[derive(Debug, Clone)]
pub struct XmpPacket {
  author: String,
  title: String,
  creator_tool: String,
  producer: String,
  /// Mesmo instante para CreateDate, ModifyDate e MetadataDate
  timestamp: DateTime<Utc>,
}

impl XmpPacket {
  pub fn new(author: impl Into<String>, title: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Self {
      author: author.into(),
      title: title.into(),
      creator_tool: DEFAULT_CREATOR_TOOL.to_string(),
      producer: DEFAULT_PRODUCER.to_string(),
      timestamp,
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

  pub fn to_xml(&self) -> String {
    let date = xmp_date(&self.timestamp);
    format!(
      r#"<?xpacket begin="{bom}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:format>application/pdf</dc:format>
      <dc:creator>
        <rdf:Seq>
          <rdf:li>{author}</rdf:li>
        </rdf:Seq>
      </dc:creator>
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">{title}</rdf:li>
        </rdf:Alt>
      </dc:title>
      <dc:subject>
        <rdf:Bag>
        </rdf:Bag>
      </dc:subject>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:CreatorTool>{creator_tool}</xmp:CreatorTool>
      <xmp:CreateDate>{date}</xmp:CreateDate>
      <xmp:ModifyDate>{date}</xmp:ModifyDate>
      <xmp:MetadataDate>{date}</xmp:MetadataDate>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
      <pdf:Producer>{producer}</pdf:Producer>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>{part}</pdfaid:part>
      <pdfaid:conformance>{conformance}</pdfaid:conformance>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
      bom = '\u{feff}',
      author = escape_xml_text(&self.author),
      title = escape_xml_text(&self.title),
      creator_tool = escape_xml_text(&self.creator_tool),
      producer = escape_xml_text(&self.producer),
      date = date,
      part = PDFA_PART,
      conformance = PDFA_CONFORMANCE,
    )
  }
}

/// Campos lidos de volta de um pacote XMP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmpSummary {
  pub creators: Vec<String>,
  /// Valor de dc:title com xml:lang="x-default"
  pub title: Option<String>,
  pub creator_tool: Option<String>,
  pub producer: Option<String>,
  pub create_date: Option<String>,
  pub pdfa_part: Option<String>,
  pub pdfa_conformance: Option<String>,
}

fn lang_attr(e: &BytesStart) -> Result<Option<String>> {
  for attr in e.attributes() {
    let attr = attr.map_err(quick_xml::Error::from)?;
    if attr.key.as_ref() == b"xml:lang" {
      return Ok(Some(attr.unescape_value()?.to_string()));
    }
  }
  Ok(None)
}

impl XmpSummary {
  /// Lê o pacote XMP; XML malformado é erro
  pub fn parse(xml: &str) -> Result<Self> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut summary = XmpSummary::default();
    let mut stack: Vec<String> = Vec::new();
    let mut li_lang: Option<String> = None;
    // Elemento aberto que ainda não recebeu texto nem filhos
    let mut open_leaf = false;

    loop {
      match reader.read_event()? {
        Event::Start(e) => {
          let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
          if name == "rdf:li" {
            li_lang = lang_attr(&e)?;
          }
          stack.push(name);
          open_leaf = true;
        }
        Event::Empty(e) => {
          // <rdf:li/> e afins: valor vazio
          let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
          if name == "rdf:li" {
            li_lang = lang_attr(&e)?;
          }
          stack.push(name);
          summary.record(&stack, li_lang.as_deref(), String::new());
          stack.pop();
          open_leaf = false;
        }
        Event::End(_) => {
          // trim_text descarta texto vazio; <x></x> ainda é um valor ""
          if open_leaf {
            summary.record(&stack, li_lang.as_deref(), String::new());
          }
          stack.pop();
          open_leaf = false;
        }
        Event::Text(e) => {
          summary.record(&stack, li_lang.as_deref(), e.unescape()?.to_string());
          open_leaf = false;
        }
        Event::Eof => break,
        _ => {}
      }
    }

    Ok(summary)
  }

  fn record(&mut self, stack: &[String], li_lang: Option<&str>, text: String) {
    // Propriedade = elemento mais interno fora de rdf:/x:
    let property = stack
      .iter()
      .rev()
      .find(|el| !el.starts_with("rdf:") && !el.starts_with("x:"));
    let in_li = stack.last().is_some_and(|el| el == "rdf:li");
    match property.map(String::as_str) {
      Some("dc:creator") if in_li => self.creators.push(text),
      Some("dc:title") if in_li => {
        let is_default = !matches!(li_lang, Some(lang) if lang != "x-default");
        if is_default && self.title.is_none() {
          self.title = Some(text);
        }
      }
      Some("xmp:CreatorTool") => self.creator_tool = Some(text),
      Some("xmp:CreateDate") => self.create_date = Some(text),
      Some("pdf:Producer") => self.producer = Some(text),
      Some("pdfaid:part") => self.pdfa_part = Some(text),
      Some("pdfaid:conformance") => self.pdfa_conformance = Some(text),
      _ => {}
    }
  }

  /// pdfaid declara PDF/A-3A
  pub fn declares_pdfa3a(&self) -> bool {
    self.pdfa_part.as_deref() == Some(PDFA_PART)
      && self.pdfa_conformance.as_deref() == Some(PDFA_CONFORMANCE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use pretty_assertions::assert_eq;

  fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap()
  }

  #[test]
  fn test_packet_roundtrip_through_parser() {
    let xml = XmpPacket::new("Maria Silva", "Contrato 42", instant()).to_xml();
    let summary = XmpSummary::parse(&xml).unwrap();

    assert_eq!(summary.creators, vec!["Maria Silva".to_string()]);
    assert_eq!(summary.title.as_deref(), Some("Contrato 42"));
    assert_eq!(summary.creator_tool.as_deref(), Some("Flick."));
    assert_eq!(summary.producer.as_deref(), Some("Flick Netowrk"));
    assert_eq!(summary.create_date.as_deref(), Some("2024-05-17T12:30:00.000Z"));
    assert!(summary.declares_pdfa3a());
  }

  #[test]
  fn test_same_instant_for_all_dates() {
    let xml = XmpPacket::new("a", "b", instant()).to_xml();
    assert_eq!(xml.matches("2024-05-17T12:30:00.000Z").count(), 3);
  }

  #[test]
  fn test_packet_structure() {
    let xml = XmpPacket::new("a", "b", instant()).to_xml();
    assert!(xml.starts_with("<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>"));
    assert!(xml.ends_with("<?xpacket end=\"w\"?>"));
    assert!(xml.contains("<dc:format>application/pdf</dc:format>"));
    assert!(xml.contains("<rdf:Bag>\n        </rdf:Bag>"));
  }

  #[test]
  fn test_special_characters_are_escaped() {
    let xml = XmpPacket::new("Tom & Jerry <Ltda>", "\"Ata\" d'Oeste", instant())
      .with_producer("A&B")
      .to_xml();

    assert!(xml.contains("Tom &amp; Jerry &lt;Ltda&gt;"));
    assert!(!xml.contains("Tom & Jerry"));

    let summary = XmpSummary::parse(&xml).unwrap();
    assert_eq!(summary.creators, vec!["Tom & Jerry <Ltda>".to_string()]);
    assert_eq!(summary.title.as_deref(), Some("\"Ata\" d'Oeste"));
    assert_eq!(summary.producer.as_deref(), Some("A&B"));
  }

  #[test]
  fn test_custom_creator_tool() {
    let xml = XmpPacket::new("a", "b", instant())
      .with_creator_tool("Gerador 2.0")
      .to_xml();
    let summary = XmpSummary::parse(&xml).unwrap();
    assert_eq!(summary.creator_tool.as_deref(), Some("Gerador 2.0"));
  }

  #[test]
  fn test_empty_author_and_title_read_back_as_empty() {
    let xml = XmpPacket::new("", "", instant()).to_xml();
    let summary = XmpSummary::parse(&xml).unwrap();
    assert_eq!(summary.creators, vec![String::new()]);
    assert_eq!(summary.title.as_deref(), Some(""));
    assert!(summary.declares_pdfa3a());
  }

  #[test]
  fn test_self_closing_li_is_empty_value() {
    let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:creator><rdf:Seq><rdf:li/><rdf:li>Bia</rdf:li></rdf:Seq></dc:creator>
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default"/></rdf:Alt></dc:title>
      <dc:subject><rdf:Bag></rdf:Bag></dc:subject>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;
    let summary = XmpSummary::parse(xml).unwrap();
    assert_eq!(summary.creators, vec![String::new(), "Bia".to_string()]);
    assert_eq!(summary.title.as_deref(), Some(""));
  }

  #[test]
  fn test_malformed_xml_is_error() {
    let xml = "<x:xmpmeta><rdf:RDF><dc:title>a</rdf:RDF></x:xmpmeta>";
    assert!(XmpSummary::parse(xml).is_err());
  }

  #[test]
  fn test_title_prefers_x_default() {
    let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="pt-BR">Relatório</rdf:li>
          <rdf:li xml:lang="x-default">Report</rdf:li>
        </rdf:Alt>
      </dc:title>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;
    let summary = XmpSummary::parse(xml).unwrap();
    assert_eq!(summary.title.as_deref(), Some("Report"));
    assert!(!summary.declares_pdfa3a());
  }
}
