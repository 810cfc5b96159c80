/**
 * =================================================================
 * APARATO: LIFECYCLE GUARDS TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la máquina RENDERED→BASELINE→LT→LTA: gating
 *           por configuración, transiciones ilegales y terminalidad
 *           absoluta del estado LTA.
 * =================================================================
 */

use std::sync::Arc;

use sigilo_domain_pades::{
    ArtifactState, LifecycleConfig, PadesLifecycleOrchestrator, SealError, SealedArtifact,
};
use sigilo_infra_hsm::{AzureHsmSigner, HsmSignerConfig, StaticTokenProvider};
use sigilo_infra_tsa::TsaClient;

fn offline_signer() -> AzureHsmSigner {
    AzureHsmSigner::new(
        HsmSignerConfig {
            endpoint: "https://127.0.0.1:1".to_string(),
            account: "sigilo-account".to_string(),
            profile: "sigilo-profile".to_string(),
        },
        Arc::new(StaticTokenProvider::new("token".to_string())),
    )
    .unwrap()
}

#[test]
fn certify_docmdp_permission_follows_the_lta_gate() {
    let baseline_only = PadesLifecycleOrchestrator::new(LifecycleConfig {
        enable_lta_updates: false,
    });
    assert_eq!(baseline_only.docmdp_permission(), 1);

    let full_lifecycle = PadesLifecycleOrchestrator::new(LifecycleConfig {
        enable_lta_updates: true,
    });
    assert_eq!(full_lifecycle.docmdp_permission(), 2);
}

#[tokio::test]
async fn certify_lta_state_is_terminal_for_every_operation() {
    let orchestrator = PadesLifecycleOrchestrator::new(LifecycleConfig {
        enable_lta_updates: true,
    });
    let signer = offline_signer();
    let tsa = TsaClient::new("https://127.0.0.1:1/tsa".to_string()).unwrap();

    let frozen = SealedArtifact::resume(b"%PDF-frozen".to_vec(), ArtifactState::Lta);
    let outcome = orchestrator
        .certify(frozen, &signer, "trace-lta-1")
        .await;
    assert!(matches!(outcome, Err(SealError::Sealed)));

    let frozen = SealedArtifact::resume(b"%PDF-frozen".to_vec(), ArtifactState::Lta);
    let outcome = orchestrator
        .extend_long_term(frozen, &signer, "trace-lta-2")
        .await;
    assert!(matches!(outcome, Err(SealError::Sealed)));

    let frozen = SealedArtifact::resume(b"%PDF-frozen".to_vec(), ArtifactState::Lta);
    let outcome = orchestrator.timestamp(frozen, &tsa).await;
    assert!(matches!(outcome, Err(SealError::Sealed)));
}

#[tokio::test]
async fn certify_out_of_order_transitions_are_rejected() {
    let orchestrator = PadesLifecycleOrchestrator::new(LifecycleConfig {
        enable_lta_updates: true,
    });
    let signer = offline_signer();
    let tsa = TsaClient::new("https://127.0.0.1:1/tsa".to_string()).unwrap();

    // Certificar dos veces: BASELINE no admite re-certificación.
    let baseline = SealedArtifact::resume(b"%PDF-b".to_vec(), ArtifactState::Baseline);
    assert!(matches!(
        orchestrator.certify(baseline, &signer, "trace-1").await,
        Err(SealError::IllegalTransition { .. })
    ));

    // Saltarse la certificación: RENDERED no admite DSS.
    let rendered = SealedArtifact::resume(b"%PDF-r".to_vec(), ArtifactState::Rendered);
    assert!(matches!(
        orchestrator
            .extend_long_term(rendered, &signer, "trace-2")
            .await,
        Err(SealError::IllegalTransition { .. })
    ));

    // Sellar tiempo sin DSS: BASELINE no admite el sello documental.
    let baseline = SealedArtifact::resume(b"%PDF-b".to_vec(), ArtifactState::Baseline);
    assert!(matches!(
        orchestrator.timestamp(baseline, &tsa).await,
        Err(SealError::IllegalTransition { .. })
    ));
}

#[tokio::test]
async fn certify_disabled_gate_blocks_lt_and_lta() {
    let orchestrator = PadesLifecycleOrchestrator::new(LifecycleConfig {
        enable_lta_updates: false,
    });
    let signer = offline_signer();
    let tsa = TsaClient::new("https://127.0.0.1:1/tsa".to_string()).unwrap();

    let baseline = SealedArtifact::resume(b"%PDF-b".to_vec(), ArtifactState::Baseline);
    assert!(matches!(
        orchestrator
            .extend_long_term(baseline, &signer, "trace-3")
            .await,
        Err(SealError::IllegalTransition { .. })
    ));

    let long_term = SealedArtifact::resume(b"%PDF-lt".to_vec(), ArtifactState::Lt);
    assert!(matches!(
        orchestrator.timestamp(long_term, &tsa).await,
        Err(SealError::IllegalTransition { .. })
    ));
}

#[test]
fn certify_resume_preserves_bytes_and_state() {
    let artifact = SealedArtifact::resume(b"%PDF-x".to_vec(), ArtifactState::Lt);
    assert_eq!(artifact.state(), ArtifactState::Lt);
    assert_eq!(artifact.bytes(), b"%PDF-x");
}
