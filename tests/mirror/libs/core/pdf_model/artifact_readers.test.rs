/**
 * =================================================================
 * APARATO: ARTIFACT READERS TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar los lectores del contenedor: archivos
 *           asociados, árbol de nombres, XMP, firmas y ByteRange.
 * =================================================================
 */

use sigilo_core_pdf::{extract_pdfa_identification, ArtifactFactory, PdfDocument};

const CONTENT: &[u8] = br#"{"decision":"approved","id":"DEC-2026-0001"}"#;
const BINDINGS: &[u8] = br#"{"content_hash":"SHA-256:00","hash_algorithm":"SHA-256"}"#;

fn artifact() -> Vec<u8> {
    ArtifactFactory::new(CONTENT.to_vec())
        .with_bindings(BINDINGS.to_vec())
        .with_visible_line("Sealed archival artifact")
        .build()
}

#[test]
fn certify_af_and_name_tree_expose_filespecs() {
    let bytes = artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    let af_specs = document.af_filespecs();
    assert_eq!(af_specs.len(), 2, "AF debe portar content.json y bindings.json");

    let tree_specs = document.name_tree_filespecs();
    assert_eq!(tree_specs.len(), 2);

    // Ambos mecanismos referencian los MISMOS objetos indirectos.
    let af_ids: Vec<_> = af_specs.iter().filter_map(|(id, _)| *id).collect();
    let tree_ids: Vec<_> = tree_specs.iter().filter_map(|(id, _)| *id).collect();
    assert_eq!(af_ids, tree_ids);
}

#[test]
fn certify_embedded_bytes_roundtrip_by_relationship() {
    let bytes = artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    for (_, filespec) in document.af_filespecs() {
        let payload = document.read_embedded_bytes(filespec).unwrap();
        match document.af_relationship(filespec) {
            Some("Data") => assert_eq!(payload, CONTENT),
            Some("Supplement") => assert_eq!(payload, BINDINGS),
            other => panic!("relación inesperada: {other:?}"),
        }
    }
}

#[test]
fn certify_xmp_identification_extraction() {
    let bytes = artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    let xmp = document.xmp_bytes().expect("el artefacto porta XMP");
    let (part, conformance) = extract_pdfa_identification(&xmp);

    assert_eq!(part.as_deref(), Some("3"));
    assert_eq!(conformance.as_deref(), Some("B"));
}

#[test]
fn certify_divergent_identification_is_reported_verbatim() {
    let bytes = ArtifactFactory::new(CONTENT.to_vec())
        .with_pdfa_identification("2", "A")
        .build();
    let document = PdfDocument::parse(&bytes).unwrap();

    let xmp = document.xmp_bytes().unwrap();
    let (part, conformance) = extract_pdfa_identification(&xmp);

    assert_eq!(part.as_deref(), Some("2"));
    assert_eq!(conformance.as_deref(), Some("A"));
}

#[test]
fn certify_signature_field_reading_and_coverage() {
    let bytes = ArtifactFactory::new(CONTENT.to_vec())
        .with_bindings(BINDINGS.to_vec())
        .build_with_dummy_certification(2);

    let document = PdfDocument::parse(&bytes).unwrap();
    let fields = document.signature_fields();

    assert_eq!(fields.len(), 1);
    let field = &fields[0];

    assert_eq!(field.field_name.as_deref(), Some("ArchiveSignature"));
    assert_eq!(field.subfilter.as_deref(), Some("adbe.pkcs7.detached"));
    assert_eq!(field.docmdp_permission, Some(2));
    assert_eq!(field.covers_entire_file(bytes.len()), Some(true));

    // Cola adulterada: la cobertura deja de ser total.
    let mut tampered = bytes.clone();
    tampered.extend_from_slice(b"\n<<tampered>>\n");
    assert_eq!(field.covers_entire_file(tampered.len()), Some(false));
}

#[test]
fn certify_visible_text_projection() {
    let bytes = artifact();
    let document = PdfDocument::parse(&bytes).unwrap();

    assert_eq!(document.visible_text(), "Sealed archival artifact");
}
