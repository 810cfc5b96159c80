/**
 * =================================================================
 * APARATO: PROMPT PREFIX INVARIANCE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la estabilidad de caché: el prefijo
 *           autoridad+snapshot es byte-idéntico de P1 a P8.
 * =================================================================
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;

use sigilo_domain_semantic::testing::SimulatedExecutor;
use sigilo_domain_semantic::{
    sdvp_blueprints, SemanticAuditContext, SemanticAuditPipeline, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};

#[tokio::test]
async fn certify_prefix_hash_is_strictly_invariant_across_passes() {
    let executor = Arc::new(SimulatedExecutor::succeeding());

    let pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        "Static authority layer for cache certification.".to_string(),
        executor.clone(),
    )
    .unwrap();

    // Texto bajo el límite del rebanador de P1 (6 000 caracteres) para
    // que la proyección local coincida con el texto íntegro.
    let context = SemanticAuditContext::new(
        json!({ "schema_version": "1.0", "author": "system" }),
        "Stable document text for cache certification.".to_string(),
        "Visible text".to_string(),
    )
    .with_audit_id("audit-cache-001");

    let result = pipeline.run(&context).await;

    // --------------------------------------------------------------
    // Invariantes de ejecución
    // --------------------------------------------------------------
    assert!(result.executed);
    assert_eq!(
        executor.executed_passes(),
        vec!["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8"]
    );

    // --------------------------------------------------------------
    // Estabilidad de caché (invarianza del prefijo)
    // --------------------------------------------------------------
    let prefix_hashes = executor.prefix_hashes();
    assert_eq!(prefix_hashes.len(), 8);

    let unique_hashes: BTreeSet<&String> = prefix_hashes.values().collect();
    assert_eq!(
        unique_hashes.len(),
        1,
        "¡Volatilidad de caché detectada! Hashes de prefijo: {prefix_hashes:?}"
    );
}

#[tokio::test]
async fn certify_distinct_documents_produce_distinct_prefixes() {
    let first_executor = Arc::new(SimulatedExecutor::succeeding());
    let second_executor = Arc::new(SimulatedExecutor::succeeding());

    let authority = "Static authority layer.".to_string();

    let first_pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        authority.clone(),
        first_executor.clone(),
    )
    .unwrap();
    let second_pipeline = SemanticAuditPipeline::new(
        SDVP_PROTOCOL_ID,
        SDVP_PROTOCOL_VERSION,
        sdvp_blueprints(),
        authority,
        second_executor.clone(),
    )
    .unwrap();

    first_pipeline
        .run(&SemanticAuditContext::new(
            json!({ "doc": "alpha" }),
            "alpha text".to_string(),
            String::new(),
        ))
        .await;
    second_pipeline
        .run(&SemanticAuditContext::new(
            json!({ "doc": "beta" }),
            "beta text".to_string(),
            String::new(),
        ))
        .await;

    let first_hash = first_executor.prefix_hashes()["P1"].clone();
    let second_hash = second_executor.prefix_hashes()["P1"].clone();
    assert_ne!(first_hash, second_hash);
}
