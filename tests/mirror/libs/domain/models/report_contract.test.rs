/**
 * =================================================================
 * APARATO: REPORT CONTRACT TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar que los agregados del reporte rechazan en
 *           construcción toda violación de sus invariantes.
 * =================================================================
 */

use serde_json::json;

use sigilo_domain_models::{
    ArtifactIntegrityResult, AuditStatus, DeliveryRecommendation, ReportContractError,
    SealTrustResult, SemanticAuditResult, VerificationReport,
};

fn passed_aia() -> ArtifactIntegrityResult {
    ArtifactIntegrityResult::new(
        true,
        vec!["container_archival_compliance".to_string()],
        Vec::new(),
        Some(json!({"id": "DOC-1"})),
        Some("DOC-1".to_string()),
        Some("visible".to_string()),
    )
    .unwrap()
}

#[test]
fn certify_passed_aia_requires_all_signals() {
    let rejected = ArtifactIntegrityResult::new(true, Vec::new(), Vec::new(), None, None, None);
    assert_eq!(rejected, Err(ReportContractError::MissingExtractedSignals));
}

#[test]
fn certify_failed_aia_forbids_signals() {
    let rejected = ArtifactIntegrityResult::new(
        false,
        Vec::new(),
        Vec::new(),
        Some(json!({})),
        None,
        None,
    );
    assert_eq!(rejected, Err(ReportContractError::ForbiddenExtractedSignals));
}

#[test]
fn certify_stv_trust_state_coupling() {
    // executed=false exige trusted=None y resoluciones vacías.
    assert_eq!(
        SealTrustResult::new(false, Some(true), Vec::new(), Vec::new()),
        Err(ReportContractError::TrustStateMismatch)
    );
    assert_eq!(
        SealTrustResult::new(true, None, Vec::new(), Vec::new()),
        Err(ReportContractError::TrustStateMismatch)
    );

    // trusted=false jamás porta resoluciones.
    assert_eq!(
        SealTrustResult::new(
            true,
            Some(false),
            Vec::new(),
            vec!["AIA-MAJ-008".to_string()]
        ),
        Err(ReportContractError::ResolutionWithoutTrust)
    );

    // La forma no ejecutada canónica es válida.
    let idle = SealTrustResult::not_executed();
    assert!(!idle.executed);
    assert_eq!(idle.trusted, None);
    assert!(idle.resolved_aia_finding_ids.is_empty());
}

#[test]
fn certify_pass_status_demands_passed_integrity() {
    let failed_aia = ArtifactIntegrityResult::failed(Vec::new(), Vec::new());

    let rejected = VerificationReport::assemble(
        "audit-001".to_string(),
        AuditStatus::Pass,
        DeliveryRecommendation::Ready,
        failed_aia,
        SemanticAuditResult::not_executed(),
        SealTrustResult::not_executed(),
        Vec::new(),
    );

    assert!(matches!(
        rejected,
        Err(ReportContractError::PassWithoutIntegrity)
    ));
}

#[test]
fn certify_semantic_execution_demands_passed_integrity() {
    let failed_aia = ArtifactIntegrityResult::failed(Vec::new(), Vec::new());

    let mut executed_semantic = SemanticAuditResult::not_executed();
    executed_semantic.executed = true;

    let rejected = VerificationReport::assemble(
        "audit-002".to_string(),
        AuditStatus::Fail,
        DeliveryRecommendation::NotReady,
        failed_aia,
        executed_semantic,
        SealTrustResult::not_executed(),
        Vec::new(),
    );

    assert!(matches!(
        rejected,
        Err(ReportContractError::SemanticAfterIntegrityFailure)
    ));
}

#[test]
fn certify_report_serialization_shape() {
    let report = VerificationReport::assemble(
        "audit-003".to_string(),
        AuditStatus::Pass,
        DeliveryRecommendation::Ready,
        passed_aia(),
        SemanticAuditResult::not_executed(),
        SealTrustResult::not_executed(),
        Vec::new(),
    )
    .unwrap();

    let rendered = serde_json::to_value(&report).unwrap();

    assert_eq!(rendered["schema_version"], "1.4");
    assert_eq!(rendered["artifact_role"], "meta-audit");
    assert_eq!(rendered["status"], "pass");
    assert_eq!(rendered["delivery_recommendation"], "ready");
    assert!(rendered["generated_at"].is_string());
}
