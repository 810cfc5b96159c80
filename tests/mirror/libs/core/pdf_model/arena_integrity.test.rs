/**
 * =================================================================
 * APARATO: ARENA INTEGRITY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el parseo tolerante de la arena y la
 *           resolución de referencias indirectas como valores.
 * =================================================================
 */

use sigilo_core_pdf::{count_eof_markers, count_pdf_headers, ArtifactFactory, PdfDocument};

fn sample_artifact() -> Vec<u8> {
    ArtifactFactory::new(br#"{"id":"DOC-1"}"#.to_vec())
        .with_bindings(br#"{"content_hash":"SHA-256:00"}"#.to_vec())
        .build()
}

#[test]
fn certify_factory_artifact_parses_into_live_arena() {
    let bytes = sample_artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    assert_eq!(document.catalog_id().number, 1);
    assert_eq!(document.pages().len(), 1);
    assert!(document.max_object_number() >= 10);
    assert_eq!(document.file_length(), bytes.len());
}

#[test]
fn certify_reference_resolution_is_value_based() {
    let bytes = sample_artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    // El catálogo referencia /Pages de forma indirecta.
    let pages_ref = document.catalog().get("Pages").unwrap();
    let pages = document.resolve(pages_ref).as_dict().unwrap();

    assert_eq!(
        pages.get("Count").and_then(|c| document.resolve(c).as_int()),
        Some(1)
    );
}

#[test]
fn certify_missing_header_is_a_parse_error() {
    assert!(PdfDocument::parse(b"not a pdf").is_err());
}

#[test]
fn certify_headerless_object_soup_is_a_parse_error() {
    assert!(PdfDocument::parse(b"%PDF-1.7\nno objects here\n%%EOF\n").is_err());
}

#[test]
fn certify_marker_counters() {
    let bytes = sample_artifact();
    assert_eq!(count_pdf_headers(&bytes), 1);
    assert_eq!(count_eof_markers(&bytes), 1);

    let mut doubled = bytes.clone();
    doubled.extend_from_slice(&bytes);
    assert_eq!(count_pdf_headers(&doubled), 2);
    assert_eq!(count_eof_markers(&doubled), 2);
}

#[test]
fn certify_incremental_tail_keeps_latest_definition() {
    let bytes = sample_artifact();
    let document = PdfDocument::parse(&bytes).unwrap();
    let before = document.definitions().len();

    // Revisión simulada: redefinición del catálogo al final del flujo.
    let mut extended = bytes.clone();
    extended.extend_from_slice(
        b"\n1 0 obj\n<</Type /Catalog /Pages 2 0 R /Marker (latest)>>\nendobj\n%%EOF\n",
    );

    let reparsed = PdfDocument::parse(&extended).unwrap();
    assert_eq!(reparsed.definitions().len(), before + 1);
    assert!(
        reparsed.catalog().contains_key("Marker"),
        "La última definición del catálogo debe ganar."
    );
}
