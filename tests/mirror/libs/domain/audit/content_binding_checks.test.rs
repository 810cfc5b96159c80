/**
 * =================================================================
 * APARATO: CONTENT & BINDING CHECKS TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el contrato autoritativo de extracción
 *           (AIA-CRIT-02x) y el vínculo criptográfico (AIA-CRIT-03x).
 * =================================================================
 */

use serde_json::Value;

use sigilo_core_canonical::{canonicalize, content_hash};
use sigilo_core_pdf::ArtifactFactory;
use sigilo_domain_audit::ArtifactIntegrityAudit;

const CONTENT: &str = r#"{"decision":"approved","id":"DEC-2026-0001"}"#;

fn bound_bindings(content_json: &str) -> Vec<u8> {
    let payload: Value = serde_json::from_str(content_json).unwrap();
    let anchor = content_hash(&canonicalize(&payload).unwrap());
    format!(
        r#"{{"content_hash":"{anchor}","hash_algorithm":"SHA-256","generation_mode":"final"}}"#
    )
    .into_bytes()
}

fn ids(result: &sigilo_domain_models::ArtifactIntegrityResult) -> Vec<&str> {
    result
        .findings
        .iter()
        .map(|f| f.finding_id.as_str())
        .collect()
}

#[test]
fn certify_happy_path_extracts_all_signals() {
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(bound_bindings(CONTENT))
        .with_visible_line("Decision record DEC-2026-0001")
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);

    assert!(result.passed, "hallazgos inesperados: {:?}", result.findings);
    assert!(result.document_content.is_some());
    assert_eq!(
        result.content_derived_text.as_deref(),
        Some("approved\nDEC-2026-0001"),
        "Proyección: escalares del nivel superior en orden de clave."
    );
    assert_eq!(
        result.visible_text.as_deref(),
        Some("Decision record DEC-2026-0001")
    );
    assert_eq!(
        result.checks_executed,
        vec![
            "container_archival_compliance",
            "content_extraction",
            "cryptographic_binding"
        ]
    );
}

#[test]
fn certify_failed_audit_carries_no_signals() {
    let result = ArtifactIntegrityAudit::run(b"not a pdf");

    assert!(!result.passed);
    assert!(result.document_content.is_none());
    assert!(result.content_derived_text.is_none());
    assert!(result.visible_text.is_none());
}

#[test]
fn certify_ambiguous_data_filespecs_hard_stop() {
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(bound_bindings(CONTENT))
        .with_duplicate_data_filespec()
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(!result.passed);
    assert!(ids(&result).contains(&"AIA-CRIT-020"));
}

#[test]
fn certify_empty_content_hard_stops() {
    let artifact = ArtifactFactory::new(Vec::new())
        .with_bindings(bound_bindings(CONTENT))
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-021"));
}

#[test]
fn certify_invalid_json_content_hard_stops() {
    let artifact = ArtifactFactory::new(b"definitely{not json".to_vec())
        .with_bindings(bound_bindings(CONTENT))
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-022"));
}

#[test]
fn certify_non_object_root_hard_stops() {
    let artifact = ArtifactFactory::new(b"[1,2,3]".to_vec())
        .with_bindings(bound_bindings(CONTENT))
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-023"));
}

#[test]
fn certify_missing_bindings_hard_stop() {
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec()).build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(!result.passed);
    assert!(ids(&result).contains(&"AIA-CRIT-031"));
}

#[test]
fn certify_malformed_bindings_reduce_to_null() {
    // Bindings ilegibles NO producen error de parseo: degradan a null
    // y el vínculo criptográfico reporta su ausencia.
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(b"not json at all".to_vec())
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-031"));
}

#[test]
fn certify_empty_declared_anchor() {
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(br#"{"content_hash":""}"#.to_vec())
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-032"));
}

#[test]
fn certify_unsupported_anchor_format() {
    let declared = format!(r#"{{"content_hash":"SHA-512:{}"}}"#, "a".repeat(128));
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(declared.into_bytes())
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(ids(&result).contains(&"AIA-CRIT-035"));
}

#[test]
fn certify_anchor_mismatch_hard_stops() {
    let wrong = format!(r#"{{"content_hash":"SHA-256:{}"}}"#, "0".repeat(64));
    let artifact = ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(wrong.into_bytes())
        .build();

    let result = ArtifactIntegrityAudit::run(&artifact);
    assert!(!result.passed);
    assert!(ids(&result).contains(&"AIA-CRIT-034"));
}
