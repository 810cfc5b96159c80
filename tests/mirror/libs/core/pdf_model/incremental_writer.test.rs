/**
 * =================================================================
 * APARATO: INCREMENTAL WRITER TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la disciplina append-only de las revisiones
 *           y la geometría de los esqueletos de firma.
 * =================================================================
 */

use sigilo_core_pdf::{
    append_dss_revision, append_signature_revision, count_eof_markers, read_dss,
    read_dss_streams, splice_contents, ArtifactFactory, DssMaterial, ObjId, PdfAtom, PdfDict,
    PdfDocument, RevisionBuilder, SignatureRevisionSpec, SUBFILTER_PKCS7_DETACHED,
};

fn base_artifact() -> Vec<u8> {
    ArtifactFactory::new(br#"{"id":"DOC-1"}"#.to_vec()).build()
}

#[test]
fn certify_prior_bytes_are_never_rewritten() {
    let base = base_artifact();
    let document = PdfDocument::parse(&base).unwrap();

    let mut builder = RevisionBuilder::new();
    let mut marker = PdfDict::new();
    marker.insert("Role".to_string(), PdfAtom::Name("Marker".to_string()));
    builder.put(ObjId::new(50, 0), PdfAtom::Dict(marker));

    let (extended, offsets) = builder.append_to(&base, document.catalog_id(), 51);

    assert_eq!(&extended[..base.len()], base.as_slice());
    assert_eq!(count_eof_markers(&extended), 2);

    let marker_offset = offsets[&50];
    assert!(extended[marker_offset..].starts_with(b"50 0 obj"));

    let reparsed = PdfDocument::parse(&extended).unwrap();
    assert!(reparsed.object(50).is_some());
}

#[test]
fn certify_signature_skeleton_geometry() {
    let base = base_artifact();

    let skeleton = append_signature_revision(
        &base,
        &SignatureRevisionSpec {
            field_name: "ArchiveSignature".to_string(),
            subfilter: SUBFILTER_PKCS7_DETACHED.to_string(),
            reserved_contents: 256,
            docmdp_permission: Some(2),
            signing_time: Some("D:20260101120000Z".to_string()),
        },
    )
    .unwrap();

    // ByteRange definitivo: cubre todo salvo el hueco, hasta el final.
    let [o1, l1, o2, l2] = skeleton.byte_range;
    assert_eq!(o1, 0);
    assert_eq!(o2 + l2, skeleton.bytes.len() as i64);
    // El hueco abre en '<' (un byte antes del primer dígito hex) y
    // cierra en '>' (un byte después del último).
    assert_eq!(l1, skeleton.contents_hex_span.0 as i64 - 1);
    assert_eq!(o2, skeleton.contents_hex_span.1 as i64 + 1);

    // El hueco reserva exactamente 256 bytes en ceros (512 hex).
    let (start, end) = skeleton.contents_hex_span;
    assert_eq!(end - start, 512);
    assert!(skeleton.bytes[start..end].iter().all(|b| *b == b'0'));

    // El lector reconstruye la misma geometría.
    let document = PdfDocument::parse(&skeleton.bytes).unwrap();
    let fields = document.signature_fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(
        fields[0].byte_range.as_deref(),
        Some(skeleton.byte_range.as_slice())
    );
    assert_eq!(fields[0].covers_entire_file(skeleton.bytes.len()), Some(true));
}

#[test]
fn certify_contents_splice_respects_the_hole() {
    let base = base_artifact();
    let skeleton = append_signature_revision(
        &base,
        &SignatureRevisionSpec {
            field_name: "ArchiveSignature".to_string(),
            subfilter: SUBFILTER_PKCS7_DETACHED.to_string(),
            reserved_contents: 64,
            docmdp_permission: Some(1),
            signing_time: None,
        },
    )
    .unwrap();

    let total_before = skeleton.bytes.len();
    let mut sealed = skeleton.bytes.clone();

    splice_contents(&mut sealed, skeleton.contents_hex_span, &[0xAB, 0xCD]).unwrap();
    assert_eq!(sealed.len(), total_before, "El parcheo jamás desplaza bytes.");
    assert_eq!(
        &sealed[skeleton.contents_hex_span.0..skeleton.contents_hex_span.0 + 4],
        b"abcd"
    );

    // Material que excede el hueco: rechazado.
    assert!(splice_contents(&mut sealed, skeleton.contents_hex_span, &[0u8; 65]).is_err());
}

#[test]
fn certify_dss_revision_roundtrip() {
    let base = base_artifact();

    let extended = append_dss_revision(
        &base,
        &DssMaterial {
            certificates: vec![vec![0x30, 0x03, 0x02, 0x01, 0x01]],
            ocsp_responses: Vec::new(),
            crls: vec![vec![0x30, 0x03, 0x02, 0x01, 0x02]],
            vri_key: "AB12".to_string(),
        },
    )
    .unwrap();

    assert_eq!(&extended[..base.len()], base.as_slice());

    let document = PdfDocument::parse(&extended).unwrap();
    let dss = read_dss(&document).expect("la revisión debe exponer /DSS");

    let certificates = read_dss_streams(&document, dss, "Certs");
    assert_eq!(certificates, vec![vec![0x30, 0x03, 0x02, 0x01, 0x01]]);

    let crls = read_dss_streams(&document, dss, "CRLs");
    assert_eq!(crls.len(), 1);

    assert!(dss.contains_key("VRI"));
}
