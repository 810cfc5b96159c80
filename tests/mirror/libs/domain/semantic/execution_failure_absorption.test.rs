/**
 * =================================================================
 * APARATO: EXECUTION FAILURE ABSORPTION TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar que los fallos de la capa LLM se absorben
 *           como hallazgos consultivos con el mapa de severidad
 *           congelado, sin cruzar la frontera del pase.
 * =================================================================
 */

use std::sync::Arc;

use serde_json::json;

use sigilo_domain_models::{ConfidenceLevel, FindingCategory, Severity};
use sigilo_domain_semantic::testing::SimulatedExecutor;
use sigilo_domain_semantic::{
    sdvp_blueprints, FailureKind, SemanticAuditContext, SemanticAuditPipeline, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};

async fn run_with_failure(failure: FailureKind) -> sigilo_domain_models::SemanticAuditResult {
    let executor = Arc::new(SimulatedExecutor::succeeding().with_failure_on("P3", failure));

    let pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        "Authority layer.".to_string(),
        executor,
    )
    .unwrap();

    let context = SemanticAuditContext::new(
        json!({ "doc_id": "abs-1" }),
        "Embedded text".to_string(),
        String::new(),
    );

    pipeline.run(&context).await
}

#[tokio::test]
async fn certify_failure_never_interrupts_the_pipeline() {
    let result = run_with_failure(FailureKind::Timeout).await;

    assert!(result.executed);
    assert_eq!(result.pass_results.len(), 8);
    assert!(
        result.pass_results.iter().all(|p| p.executed),
        "Un fallo de ejecución no omite pases; solo el corte STOP lo hace."
    );
}

#[tokio::test]
async fn certify_timeout_maps_to_minor_high() {
    let result = run_with_failure(FailureKind::Timeout).await;

    let p3 = result
        .pass_results
        .iter()
        .find(|p| p.pass_id == "P3")
        .unwrap();

    assert_eq!(p3.findings.len(), 1);
    let finding = &p3.findings[0];
    assert_eq!(finding.severity, Severity::Minor);
    assert_eq!(finding.confidence, ConfidenceLevel::High);
    assert_eq!(finding.category, FindingCategory::ExecutionReadiness);

    let diagnostics = p3.execution_error.as_ref().unwrap();
    assert_eq!(diagnostics.failure_type, "timeout");
}

#[tokio::test]
async fn certify_refusal_maps_to_info_medium_ethical() {
    let result = run_with_failure(FailureKind::Refusal).await;

    let finding = &result
        .pass_results
        .iter()
        .find(|p| p.pass_id == "P3")
        .unwrap()
        .findings[0];

    assert_eq!(finding.severity, Severity::Info);
    assert_eq!(finding.confidence, ConfidenceLevel::Medium);
    assert_eq!(finding.category, FindingCategory::Ethical);
}

#[tokio::test]
async fn certify_schema_violation_maps_to_major_structure() {
    let result = run_with_failure(FailureKind::SchemaViolation).await;

    let finding = &result
        .pass_results
        .iter()
        .find(|p| p.pass_id == "P3")
        .unwrap()
        .findings[0];

    assert_eq!(finding.severity, Severity::Major);
    assert_eq!(finding.category, FindingCategory::Structure);
}

#[tokio::test]
async fn certify_malformed_output_absorbs_as_schema_violation() {
    // Salida que no cumple la forma del pase: findings no es arreglo.
    let executor = Arc::new(
        SimulatedExecutor::succeeding().with_output("P5", json!({ "findings": "not a list" })),
    );

    let pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        "Authority layer.".to_string(),
        executor,
    )
    .unwrap();

    let result = pipeline
        .run(&SemanticAuditContext::new(
            json!({ "doc_id": "abs-2" }),
            "text".to_string(),
            String::new(),
        ))
        .await;

    let p5 = result
        .pass_results
        .iter()
        .find(|p| p.pass_id == "P5")
        .unwrap();

    assert!(p5.executed);
    assert_eq!(
        p5.execution_error.as_ref().unwrap().failure_type,
        "schema_violation"
    );
    assert_eq!(p5.findings.len(), 1);
    assert_eq!(p5.findings[0].category, FindingCategory::Structure);
}
