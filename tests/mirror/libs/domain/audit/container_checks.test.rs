/**
 * =================================================================
 * APARATO: CONTAINER CHECKS TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la cadena estructural: cabecera, flujos
 *           concatenados, clasificación incremental consciente de
 *           firmas e identificación PDF/A.
 * =================================================================
 */

use sigilo_core_pdf::ArtifactFactory;
use sigilo_domain_audit::aia::run_container_archival_checks;
use sigilo_domain_models::{FindingStatus, Severity};

const CONTENT: &[u8] = br#"{"id":"DOC-1"}"#;

fn finding_ids(findings: &[sigilo_domain_models::Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.finding_id.as_str()).collect()
}

#[test]
fn certify_invalid_header_hard_stops() {
    let findings = run_container_archival_checks(b"not a pdf");

    assert_eq!(finding_ids(&findings), vec!["AIA-CRIT-001"]);
    assert_eq!(findings[0].severity, Severity::Critical);
}

#[test]
fn certify_concatenated_streams_hard_stop() {
    let artifact = ArtifactFactory::new(CONTENT.to_vec()).build();
    let mut concatenated = artifact.clone();
    concatenated.extend_from_slice(&artifact);

    let findings = run_container_archival_checks(&concatenated);
    assert_eq!(finding_ids(&findings), vec!["AIA-CRIT-002"]);
}

#[test]
fn certify_unsigned_incremental_update_hard_stops() {
    let mut artifact = ArtifactFactory::new(CONTENT.to_vec()).build();
    artifact.extend_from_slice(b"\n%%EOF\n");

    let findings = run_container_archival_checks(&artifact);
    assert_eq!(finding_ids(&findings), vec!["AIA-CRIT-002"]);
    assert!(findings[0].title.to_lowercase().contains("unsigned"));
}

#[test]
fn certify_signed_full_coverage_is_accepted() {
    let artifact = ArtifactFactory::new(CONTENT.to_vec()).build_with_dummy_certification(2);

    let findings = run_container_archival_checks(&artifact);
    assert!(
        findings.is_empty(),
        "Revisiones PAdES con cobertura total no generan hallazgos: {findings:?}"
    );
}

#[test]
fn certify_uncovered_tail_defers_to_stv() {
    let mut artifact = ArtifactFactory::new(CONTENT.to_vec()).build_with_dummy_certification(2);
    artifact.extend_from_slice(b"\n<<tampered tail>>\n");

    let findings = run_container_archival_checks(&artifact);
    assert_eq!(finding_ids(&findings), vec!["AIA-MAJ-008"]);

    let deferred = &findings[0];
    assert_eq!(deferred.severity, Severity::Major, "No fatal: difiere a STV.");
    assert!(deferred.requires_stv);
    assert_eq!(deferred.status, FindingStatus::FlaggedForHumanReview);
}

#[test]
fn certify_missing_xmp_is_major_non_fatal() {
    let artifact = ArtifactFactory::new(CONTENT.to_vec()).without_xmp().build();

    let findings = run_container_archival_checks(&artifact);
    assert_eq!(finding_ids(&findings), vec!["AIA-MAJ-004"]);
    assert_eq!(findings[0].severity, Severity::Major);
}

#[test]
fn certify_conformance_mismatch_is_reported() {
    let artifact = ArtifactFactory::new(CONTENT.to_vec())
        .with_pdfa_identification("2", "A")
        .build();

    let findings = run_container_archival_checks(&artifact);
    assert_eq!(finding_ids(&findings), vec!["AIA-MAJ-006"]);
}
