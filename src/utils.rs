/// Utilidades para manipulação de PDFs
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{PdfA3Error, Result};

/// Decodifica o PDF recebido em base64 (aceita espaços e quebras de linha)
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(cleaned)?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Catalog apontado por /Root no trailer
pub fn catalog(doc: &Document) -> Result<&Dictionary> {
    doc.catalog().map_err(|_| PdfA3Error::MissingCatalog)
}

pub fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    doc.catalog_mut().map_err(|_| PdfA3Error::MissingCatalog)
}

/// Registra o objeto na tabela de objetos e grava a referência indireta
/// em `key` no Catalog. Retorna o id do objeto registrado.
pub fn register_and_link<O: Into<Object>>(
    doc: &mut Document,
    key: &str,
    object: O,
) -> Result<ObjectId> {
    // Valida o Catalog ANTES de registrar, para não deixar objeto órfão
    catalog(doc)?;
    let id = doc.add_object(object);
    catalog_mut(doc)?.set(key, Object::Reference(id));
    Ok(id)
}

/// Data no formato do XMP (igual ao `toISOString` do JavaScript)
pub fn xmp_date(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Data no formato PDF: D:YYYYMMDDHHmmSSZ
pub fn pdf_date(instant: &DateTime<Utc>) -> String {
    format!("D:{}Z", instant.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lopdf::dictionary;

    fn doc_with_catalog() -> Document {
        let mut doc = Document::with_version("1.7");
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog" });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_base64_roundtrip_ignores_whitespace() {
        let encoded = encode_base64(b"%PDF-1.7 test");
        let wrapped = format!("{}\n{}\r\n", &encoded[..4], &encoded[4..]);
        assert_eq!(decode_base64(&wrapped).unwrap(), b"%PDF-1.7 test");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(matches!(
            decode_base64("não é base64!"),
            Err(PdfA3Error::Base64(_))
        ));
    }

    #[test]
    fn test_register_and_link_uses_indirect_reference() {
        let mut doc = doc_with_catalog();
        let id = register_and_link(&mut doc, "StructTreeRoot", dictionary! {
            "Type" => "StructTreeRoot",
        })
        .unwrap();

        let catalog = catalog(&doc).unwrap();
        assert_eq!(
            catalog.get(b"StructTreeRoot").unwrap().as_reference().unwrap(),
            id
        );
        assert!(doc.get_object(id).is_ok());
    }

    #[test]
    fn test_catalog_with_dangling_root_is_missing() {
        let mut doc = Document::with_version("1.7");
        doc.trailer.set("Root", Object::Reference((99, 0)));
        assert!(matches!(catalog(&doc), Err(PdfA3Error::MissingCatalog)));
        assert!(matches!(catalog_mut(&mut doc), Err(PdfA3Error::MissingCatalog)));
    }

    #[test]
    fn test_register_and_link_without_catalog_registers_nothing() {
        let mut doc = Document::with_version("1.7");
        let before = doc.objects.len();
        let result = register_and_link(&mut doc, "Metadata", dictionary! {});
        assert!(matches!(result, Err(PdfA3Error::MissingCatalog)));
        assert_eq!(doc.objects.len(), before);
    }

    #[test]
    fn test_dates() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(xmp_date(&instant), "2024-03-09T07:05:01.042Z");
        assert_eq!(pdf_date(&instant), "D:20240309070501Z");
    }
}
