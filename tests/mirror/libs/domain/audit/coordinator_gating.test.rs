/**
 * =================================================================
 * APARATO: COORDINATOR GATING TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar al controlador de tráfico mudo: hard-stop de
 *           AIA, gate de observaciones diferidas, resolución post-STV
 *           por sustitución de valor completo y mapa de señales
 *           consultivas.
 * =================================================================
 */

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use sigilo_core_canonical::{canonicalize, content_hash};
use sigilo_core_pdf::ArtifactFactory;
use sigilo_domain_audit::{
    AdesValidator, AdesVerdict, AuditorConfig, AuditorCoordinator, SealTrustVerification,
    SemanticAuditRunner, SemanticRunInputs, ValidationRequest, ValidatorFailure,
};
use sigilo_domain_models::{
    AuditStatus, DeliveryRecommendation, EventBus, FindingStatus, SemanticAuditPassResult,
    SemanticAuditResult,
};

const CONTENT: &str = r#"{"decision":"approved","id":"DEC-2026-0001"}"#;

// ---------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------

fn bound_artifact() -> Vec<u8> {
    let payload: Value = serde_json::from_str(CONTENT).unwrap();
    let anchor = content_hash(&canonicalize(&payload).unwrap());
    let bindings = format!(r#"{{"content_hash":"{anchor}","hash_algorithm":"SHA-256"}}"#);

    ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(bindings.into_bytes())
        .build_with_dummy_certification(2)
}

fn tampered_artifact() -> Vec<u8> {
    let mut artifact = bound_artifact();
    artifact.extend_from_slice(b"\n<<tampered tail>>\n");
    artifact
}

struct StubValidator {
    verdict: AdesVerdict,
}

impl AdesValidator for StubValidator {
    fn validate(&self, _request: &ValidationRequest<'_>) -> Result<AdesVerdict, ValidatorFailure> {
        Ok(self.verdict.clone())
    }
}

fn trusted_stv(docmdp_ok: Option<bool>) -> Arc<SealTrustVerification> {
    Arc::new(SealTrustVerification::new(
        Arc::new(StubValidator {
            verdict: AdesVerdict {
                signature_valid: true,
                chain_trusted: true,
                revocation_ok: true,
                timestamp_ok: Some(true),
                docmdp_ok,
                diagnostics: Vec::new(),
            },
        }),
        Vec::new(),
    ))
}

/// Corredor semántico de guion fijo: emite señales del pase P8.
struct ScriptedSemanticRunner {
    advisory_signals: Vec<String>,
}

impl SemanticAuditRunner for ScriptedSemanticRunner {
    fn run<'a>(&'a self, _inputs: SemanticRunInputs<'a>) -> BoxFuture<'a, SemanticAuditResult> {
        async move {
            let p8 = SemanticAuditPassResult {
                pass_id: "P8".to_string(),
                executed: true,
                findings: Vec::new(),
                delivery_recommendation: Some("REVIEW_REQUIRED".to_string()),
                execution_error: None,
                token_metrics: None,
                advisory_signals: self.advisory_signals.clone(),
                confidence: None,
            };

            SemanticAuditResult {
                executed: true,
                protocol_id: Some("SDVP".to_string()),
                protocol_version: Some("1.2".to_string()),
                pass_results: vec![p8],
                findings: Vec::new(),
            }
        }
        .boxed()
    }
}

fn semantic_config() -> AuditorConfig {
    AuditorConfig {
        enable_semantic_audit: true,
        semantic_model_provider: "azure_openai".to_string(),
        ..AuditorConfig::default()
    }
}

// ---------------------------------------------------------------------
// Escenarios
// ---------------------------------------------------------------------

#[tokio::test]
async fn certify_invalid_container_hard_stops_everything() {
    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);

    let report = coordinator
        .run_audit(b"not a pdf", "audit-s2", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Fail);
    assert_eq!(report.delivery_recommendation, DeliveryRecommendation::NotReady);
    assert!(!report.semantic_audit.executed);
    assert!(!report.seal_trust.executed);
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_id == "AIA-CRIT-001"));
}

#[tokio::test]
async fn certify_happy_path_passes_ready() {
    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);

    let report = coordinator
        .run_audit(&bound_artifact(), "audit-s1", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Pass);
    assert_eq!(report.delivery_recommendation, DeliveryRecommendation::Ready);
    assert!(report.artifact_integrity.passed);
    assert!(
        report.findings.is_empty(),
        "Sin hallazgos de integridad en el camino feliz: {:?}",
        report.findings
    );
}

#[tokio::test]
async fn certify_deferred_observation_without_stv_fails_closed() {
    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);

    let report = coordinator
        .run_audit(&tampered_artifact(), "audit-s5", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Fail);
    assert_eq!(report.delivery_recommendation, DeliveryRecommendation::NotReady);
    assert!(!report.semantic_audit.executed);
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_id == "AIA-CRIT-STV-REQUIRED"));
}

#[tokio::test]
async fn certify_stv_resolution_rewrites_by_whole_value() {
    let config = AuditorConfig {
        enable_seal_trust_verification: true,
        ..AuditorConfig::default()
    };
    let coordinator = AuditorCoordinator::new(config, None, Some(trusted_stv(Some(true))));

    let report = coordinator
        .run_audit(&tampered_artifact(), "audit-s6", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Pass);
    assert_eq!(
        report.seal_trust.resolved_aia_finding_ids,
        vec!["AIA-MAJ-008"]
    );

    let rewritten = report
        .artifact_integrity
        .findings
        .iter()
        .find(|f| f.finding_id == "AIA-MAJ-008")
        .expect("el hallazgo diferido permanece en el reporte");
    assert_eq!(rewritten.status, FindingStatus::Resolved);

    let flattened = report
        .findings
        .iter()
        .find(|f| f.finding_id == "AIA-MAJ-008")
        .unwrap();
    assert_eq!(flattened.status, FindingStatus::Resolved);
}

#[tokio::test]
async fn certify_inconclusive_docmdp_fails_the_audit() {
    let config = AuditorConfig {
        enable_seal_trust_verification: true,
        ..AuditorConfig::default()
    };
    let coordinator = AuditorCoordinator::new(config, None, Some(trusted_stv(None)));

    let report = coordinator
        .run_audit(&tampered_artifact(), "audit-s7", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Fail);
    assert_eq!(report.seal_trust.trusted, Some(false));
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_id == "STV-CRIT-003"));
    assert!(report.seal_trust.resolved_aia_finding_ids.is_empty());
}

#[tokio::test]
async fn certify_review_signal_degrades_to_expert_review() {
    let coordinator = AuditorCoordinator::new(
        semantic_config(),
        Some(Arc::new(ScriptedSemanticRunner {
            advisory_signals: vec!["DELIVERY_REVIEW_REQUIRED".to_string()],
        })),
        None,
    );

    let report = coordinator
        .run_audit(&bound_artifact(), "audit-signal-1", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Pass);
    assert_eq!(
        report.delivery_recommendation,
        DeliveryRecommendation::ExpertReviewRequired
    );
}

#[tokio::test]
async fn certify_not_recommended_signal_fails_delivery() {
    let coordinator = AuditorCoordinator::new(
        semantic_config(),
        Some(Arc::new(ScriptedSemanticRunner {
            advisory_signals: vec!["DELIVERY_NOT_RECOMMENDED".to_string()],
        })),
        None,
    );

    let report = coordinator
        .run_audit(&bound_artifact(), "audit-signal-2", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Fail);
    assert_eq!(report.delivery_recommendation, DeliveryRecommendation::NotReady);
}

#[tokio::test]
async fn certify_disabled_integrity_audit_fails_closed() {
    let config = AuditorConfig {
        enable_artifact_integrity_audit: false,
        ..AuditorConfig::default()
    };
    let coordinator = AuditorCoordinator::new(config, None, None);

    let report = coordinator
        .run_audit(&bound_artifact(), "audit-disabled", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Fail);
    assert!(report
        .findings
        .iter()
        .any(|f| f.finding_id == "AIA-CRIT-000"));
}
