//! Fixtures compartilhadas pelos testes
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// PDF mínimo de uma página, gerado em memória
pub fn sample_pdf() -> Vec<u8> {
  let mut doc = Document::with_version("1.7");
  let pages_id = doc.new_object_id();

  let font_id = doc.add_object(dictionary! {
    "Type" => "Font",
    "Subtype" => "Type1",
    "BaseFont" => "Helvetica",
  });
  let resources_id = doc.add_object(dictionary! {
    "Font" => dictionary! { "F1" => font_id },
  });

  let content = Content {
    operations: vec![
      Operation::new("BT", vec![]),
      Operation::new("Tf", vec!["F1".into(), 12.into()]),
      Operation::new("Td", vec![72.into(), 720.into()]),
      Operation::new("Tj", vec![Object::string_literal("Teste PDF/A")]),
      Operation::new("ET", vec![]),
    ],
  };
  let content_id = doc.add_object(Stream::new(
    dictionary! {},
    content.encode().unwrap_or_default(),
  ));

  let page_id = doc.add_object(dictionary! {
    "Type" => "Page",
    "Parent" => pages_id,
    "Contents" => content_id,
    "Resources" => resources_id,
    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
  });
  doc.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => vec![page_id.into()],
      "Count" => 1,
    }),
  );

  let catalog_id = doc.add_object(dictionary! {
    "Type" => "Catalog",
    "Pages" => pages_id,
  });
  doc.trailer.set("Root", catalog_id);

  let mut buffer = Vec::new();
  doc.save_to(&mut buffer).unwrap();
  buffer
}

/// Bytes com cabeçalho ICC válido (mntr, RGB, XYZ, acsp)
pub fn fake_icc_profile(len: usize) -> Vec<u8> {
  let mut data = vec![0u8; len.max(128)];
  let declared = data.len() as u32;
  data[0..4].copy_from_slice(&declared.to_be_bytes());
  data[12..16].copy_from_slice(b"mntr");
  data[16..20].copy_from_slice(b"RGB ");
  data[20..24].copy_from_slice(b"XYZ ");
  data[36..40].copy_from_slice(b"acsp");
  data
}

pub fn write_icc_profile(dir: &Path, len: usize) -> PathBuf {
  let path = dir.join("perfil.icc");
  std::fs::write(&path, fake_icc_profile(len)).unwrap();
  path
}
