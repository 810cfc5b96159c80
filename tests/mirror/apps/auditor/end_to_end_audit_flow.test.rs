/**
 * =================================================================
 * APARATO: END-TO-END AUDIT FLOW TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar los escenarios extremo a extremo del auditor
 *           sobre artefactos forjados: camino feliz, revisiones
 *           firmadas con cobertura total y streaming de eventos.
 * =================================================================
 */

use serde_json::Value;

use sigilo_core_canonical::{canonicalize, content_hash};
use sigilo_core_pdf::ArtifactFactory;
use sigilo_domain_audit::{AuditorConfig, AuditorCoordinator};
use sigilo_domain_models::{
    AuditEventType, AuditStatus, DeliveryRecommendation, EventBus, FindingSource, Severity,
};

const CONTENT: &str = r#"{"decision":"approved","id":"DEC-2026-0001"}"#;

fn bound_factory() -> ArtifactFactory {
    let payload: Value = serde_json::from_str(CONTENT).unwrap();
    let anchor = content_hash(&canonicalize(&payload).unwrap());
    let bindings = format!(
        r#"{{"content_hash":"{anchor}","hash_algorithm":"SHA-256","generation_mode":"final"}}"#
    );

    ArtifactFactory::new(CONTENT.as_bytes().to_vec())
        .with_bindings(bindings.into_bytes())
        .with_visible_line("Decision DEC-2026-0001: approved")
}

#[tokio::test]
async fn certify_happy_path_artifact_passes_ready() {
    let artifact = bound_factory().build_with_dummy_certification(2);

    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);
    let report = coordinator
        .run_audit(&artifact, "e2e-s1", EventBus::null())
        .await;

    assert_eq!(report.status, AuditStatus::Pass);
    assert_eq!(report.delivery_recommendation, DeliveryRecommendation::Ready);

    // Sin hallazgos CRITICAL ni MAJOR de integridad del artefacto.
    assert!(!report.findings.iter().any(|finding| {
        finding.source == FindingSource::ArtifactIntegrity
            && matches!(finding.severity, Severity::Critical | Severity::Major)
    }));

    // Señales autoritativas presentes tras una integridad aprobada.
    assert!(report.artifact_integrity.document_content.is_some());
    assert!(report.artifact_integrity.content_derived_text.is_some());
    assert!(report.artifact_integrity.visible_text.is_some());
}

#[tokio::test]
async fn certify_pades_revisions_alone_never_flag_incrementality() {
    // Más de un %%EOF únicamente por revisiones PAdES con cobertura
    // total: ni actualización sin firma ni bytes fuera de cobertura.
    let artifact = bound_factory().build_with_dummy_certification(1);

    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);
    let report = coordinator
        .run_audit(&artifact, "e2e-s4", EventBus::null())
        .await;

    assert!(!report
        .findings
        .iter()
        .any(|f| f.finding_id == "AIA-CRIT-002"));
    assert!(!report
        .findings
        .iter()
        .any(|f| f.finding_id == "AIA-MAJ-008"));
    assert_eq!(report.status, AuditStatus::Pass);
}

#[tokio::test]
async fn certify_event_stream_brackets_the_audit() {
    let artifact = bound_factory().build_with_dummy_certification(2);

    let (bus, mut receiver) = EventBus::channel();
    let coordinator = AuditorCoordinator::new(AuditorConfig::default(), None, None);

    let report = coordinator.run_audit(&artifact, "e2e-events", bus).await;
    assert_eq!(report.status, AuditStatus::Pass);

    let mut observed = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        assert_eq!(event.audit_id, "e2e-events");
        observed.push(event.event_type);
    }

    assert_eq!(observed.first(), Some(&AuditEventType::AuditStarted));
    assert!(observed.contains(&AuditEventType::AiaStarted));
    assert!(observed.contains(&AuditEventType::AiaCompleted));
    assert_eq!(observed.last(), Some(&AuditEventType::AuditCompleted));
}
