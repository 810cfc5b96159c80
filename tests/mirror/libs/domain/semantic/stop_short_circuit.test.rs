/**
 * =================================================================
 * APARATO: STOP SHORT-CIRCUIT TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el corte semántico: los pases posteriores se
 *           registran como no ejecutados y el corte JAMÁS afecta la
 *           completitud del pipeline.
 * =================================================================
 */

use std::sync::Arc;

use serde_json::json;

use sigilo_domain_models::FindingSource;
use sigilo_domain_semantic::testing::SimulatedExecutor;
use sigilo_domain_semantic::{
    sdvp_blueprints, SemanticAuditContext, SemanticAuditPipeline, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};

#[tokio::test]
async fn certify_stop_condition_short_circuits_semantic_scope_only() {
    let executor = Arc::new(SimulatedExecutor::succeeding().with_stop_on("P2"));

    let pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        "Authority layer.".to_string(),
        executor.clone(),
    )
    .unwrap();

    let context = SemanticAuditContext::new(
        json!({ "doc_id": "123" }),
        "Embedded document text".to_string(),
        "Visible text".to_string(),
    )
    .with_audit_id("audit-stop-001");

    let result = pipeline.run(&context).await;

    // --------------------------------------------------------------
    // Invariantes de nivel auditoría
    // --------------------------------------------------------------
    assert!(result.executed, "El corte no invalida la corrida.");
    assert_eq!(result.protocol_id.as_deref(), Some("SDVP"));

    // --------------------------------------------------------------
    // Matriz de ejecución de pases
    // --------------------------------------------------------------
    assert_eq!(result.pass_results.len(), 8, "La línea temporal se mantiene.");

    let by_id = |pass_id: &str| {
        result
            .pass_results
            .iter()
            .find(|p| p.pass_id == pass_id)
            .unwrap()
    };

    assert!(by_id("P1").executed);
    assert!(by_id("P2").executed);

    for skipped in ["P3", "P4", "P5", "P6", "P7", "P8"] {
        assert!(!by_id(skipped).executed, "{skipped} debió omitirse");
        assert!(by_id(skipped).findings.is_empty());
    }

    // --------------------------------------------------------------
    // El hallazgo de corte es semántico y porta la señal literal
    // --------------------------------------------------------------
    let p2_findings = &by_id("P2").findings;
    assert_eq!(p2_findings.len(), 1);
    let stop_finding = &p2_findings[0];

    assert_eq!(stop_finding.source, FindingSource::SemanticAudit);
    assert!(stop_finding.stop_condition());

    // --------------------------------------------------------------
    // Observabilidad del ejecutor: nada corre después del corte
    // --------------------------------------------------------------
    assert_eq!(executor.executed_passes(), vec!["P1", "P2"]);

    // La vista derivada refleja solo pases ejecutados.
    assert_eq!(result.passes_executed(), vec!["P1", "P2"]);
}
