// [libs/domain/pades/src/lifecycle.rs]
/*!
 * =================================================================
 * APARATO: PADES LIFECYCLE ORCHESTRATOR (V5.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS DEL ARTEFACTO SELLADO
 *
 *   RENDERED → BASELINE → LT → LTA
 *
 * El tránsito a LT/LTA está gateado por `enable_lta_updates`: con el
 * gate apagado el pipeline se detiene en BASELINE (terminal); con el
 * gate encendido las TRES revisiones ejecutan en orden y el sello de
 * tiempo es SIEMPRE el último (testigo "existió en o antes de T").
 *
 * Los buffers se mueven: cada etapa consume un buffer inmutable y
 * produce uno nuevo; los bytes previos jamás se reescriben.
 * =================================================================
 */

use tracing::{info, instrument};

use sigilo_infra_hsm::AzureHsmSigner;
use sigilo_infra_tsa::TsaClient;

use crate::errors::SealError;
use crate::revisions::{
    apply_certification_signature, apply_document_timestamp, apply_dss_revision,
    collect_crl_material,
};

/// Estados conceptuales del artefacto PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// PDF/A-3b renderizado, sin firmar.
    Rendered,
    /// PAdES-B: una firma de certificación.
    Baseline,
    /// PAdES-B-LT: revisión DSS/VRI presente.
    Lt,
    /// PAdES-B-LTA: sello de tiempo documental. TERMINAL.
    Lta,
}

/// Artefacto con su estado de ciclo de vida. El buffer es inmutable;
/// las transiciones producen un artefacto nuevo.
#[derive(Debug, Clone)]
pub struct SealedArtifact {
    bytes: Vec<u8>,
    state: ArtifactState,
}

impl SealedArtifact {
    pub fn rendered(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            state: ArtifactState::Rendered,
        }
    }

    /// Reanuda un artefacto persistido en un estado conocido.
    ///
    /// El llamador es responsable de que los bytes correspondan
    /// realmente al estado declarado (p.ej. tras reinicio de servicio).
    pub fn resume(bytes: Vec<u8>, state: ArtifactState) -> Self {
        Self { bytes, state }
    }

    pub fn state(&self) -> ArtifactState {
        self.state
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn advanced(bytes: Vec<u8>, state: ArtifactState) -> Self {
        Self { bytes, state }
    }
}

/// Configuración del ciclo de sellado.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Gate de las revisiones LT/LTA.
    pub enable_lta_updates: bool,
}

/// Orquestador del ciclo PAdES. Aplica las transiciones en orden y
/// rechaza toda operación sobre un artefacto LTA.
pub struct PadesLifecycleOrchestrator {
    config: LifecycleConfig,
}

impl PadesLifecycleOrchestrator {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    /// Permiso DocMDP de la certificación según el gate LTA:
    /// /P=1 (sin cambios) en BASELINE terminal; /P=2 (relleno de
    /// formularios y firmas adicionales) cuando siguen LT/LTA.
    pub fn docmdp_permission(&self) -> i64 {
        if self.config.enable_lta_updates {
            2
        } else {
            1
        }
    }

    /// RENDERED → BASELINE (Rev 1).
    #[instrument(skip(self, artifact, signer))]
    pub async fn certify(
        &self,
        artifact: SealedArtifact,
        signer: &AzureHsmSigner,
        correlation_id: &str,
    ) -> Result<SealedArtifact, SealError> {
        match artifact.state {
            ArtifactState::Rendered => {}
            ArtifactState::Lta => return Err(SealError::Sealed),
            from => {
                return Err(SealError::IllegalTransition {
                    from,
                    operation: "certify",
                })
            }
        }

        let sealed = apply_certification_signature(
            artifact.bytes(),
            self.docmdp_permission(),
            signer,
            correlation_id,
        )
        .await?;

        Ok(SealedArtifact::advanced(sealed, ArtifactState::Baseline))
    }

    /// BASELINE → LT (Rev 2). Gateado por `enable_lta_updates`.
    #[instrument(skip(self, artifact, signer))]
    pub async fn extend_long_term(
        &self,
        artifact: SealedArtifact,
        signer: &AzureHsmSigner,
        correlation_id: &str,
    ) -> Result<SealedArtifact, SealError> {
        match artifact.state {
            ArtifactState::Baseline => {}
            ArtifactState::Lta => return Err(SealError::Sealed),
            from => {
                return Err(SealError::IllegalTransition {
                    from,
                    operation: "extend_long_term",
                })
            }
        }

        if !self.config.enable_lta_updates {
            return Err(SealError::IllegalTransition {
                from: artifact.state,
                operation: "extend_long_term (gate disabled)",
            });
        }

        let chain = signer.signer_chain(correlation_id).await?;
        let crls = collect_crl_material(&chain).await?;
        let extended = apply_dss_revision(artifact.bytes(), chain, Vec::new(), crls)?;

        Ok(SealedArtifact::advanced(extended, ArtifactState::Lt))
    }

    /// LT → LTA (Rev 3). SIEMPRE la última operación criptográfica.
    #[instrument(skip(self, artifact, tsa))]
    pub async fn timestamp(
        &self,
        artifact: SealedArtifact,
        tsa: &TsaClient,
    ) -> Result<SealedArtifact, SealError> {
        match artifact.state {
            ArtifactState::Lt => {}
            ArtifactState::Lta => return Err(SealError::Sealed),
            from => {
                return Err(SealError::IllegalTransition {
                    from,
                    operation: "timestamp",
                })
            }
        }

        if !self.config.enable_lta_updates {
            return Err(SealError::IllegalTransition {
                from: artifact.state,
                operation: "timestamp (gate disabled)",
            });
        }

        let frozen = apply_document_timestamp(artifact.bytes(), tsa).await?;
        Ok(SealedArtifact::advanced(frozen, ArtifactState::Lta))
    }

    /// Ciclo completo: RENDERED → BASELINE [→ LT → LTA].
    #[instrument(skip(self, rendered, signer, tsa))]
    pub async fn seal(
        &self,
        rendered: Vec<u8>,
        signer: &AzureHsmSigner,
        tsa: Option<&TsaClient>,
        correlation_id: &str,
    ) -> Result<SealedArtifact, SealError> {
        let artifact = SealedArtifact::rendered(rendered);
        let baseline = self.certify(artifact, signer, correlation_id).await?;

        if !self.config.enable_lta_updates {
            info!("🧊 [LIFECYCLE]: baseline terminal (LTA gate disabled)");
            return Ok(baseline);
        }

        let tsa = tsa.ok_or(SealError::MissingTsa)?;
        let long_term = self
            .extend_long_term(baseline, signer, correlation_id)
            .await?;
        let frozen = self.timestamp(long_term, tsa).await?;

        info!("🏛️  [LIFECYCLE]: artifact sealed at PAdES-B-LTA");
        Ok(frozen)
    }
}
