// [apps/auditor/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR KERNEL (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CONSTRUCCIÓN EXPLÍCITA DE LAS DEPENDENCIAS
 *
 * La configuración se carga UNA vez y es inmutable por vida del
 * proceso. Toda dependencia probabilística o externa se cablea aquí,
 * explícitamente, al arranque (fail-fast).
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;

use sigilo_domain_audit::{
    AuditorConfig, AuditorCoordinator, BuiltinAdesValidator, SealTrustVerification,
    SemanticAuditRunner,
};
use sigilo_domain_semantic::{
    sdvp_blueprints, AzureStructuredExecutor, SemanticAuditPipeline, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};

use crate::semantic_bridge::SdvpRunner;

/// Capa de autoridad del protocolo (system prompt, estática global).
const SDVP_AUTHORITY_TEXT: &str = "\
You are a deterministic semantic auditor for sealed archival documents. \
You analyze ONLY the canonical semantic snapshot provided. You never \
invent facts, never assert legal validity, and never decide audit \
outcomes. Every finding must cite a rule_id from the active pass's rule \
set and describe an observation, its impact, and your confidence.";

/// Núcleo del servicio: configuración congelada + coordinador cableado.
pub struct AuditorKernel {
    pub config: AuditorConfig,
    pub coordinator: Arc<AuditorCoordinator>,
}

impl AuditorKernel {
    /// Ignición del kernel (fail-fast ante configuración inválida).
    pub fn ignite() -> anyhow::Result<Self> {
        let config = AuditorConfig::from_env().context("invalid auditor configuration")?;

        // ------------------------------------------------------------------
        // Pipeline semántico (opcional)
        // ------------------------------------------------------------------
        let semantic: Option<Arc<dyn SemanticAuditRunner>> = if config.enable_semantic_audit {
            if config.semantic_model_provider != "azure_openai" {
                bail!("semantic audit requires AUDITOR_SEMANTIC_MODEL_PROVIDER=azure_openai");
            }

            let bearer_token = std::env::var("AZURE_OPENAI_BEARER_TOKEN")
                .context("AZURE_OPENAI_BEARER_TOKEN is required for semantic audit")?;

            let executor = AzureStructuredExecutor::new(
                config.azure_openai_endpoint.clone(),
                config.semantic_model_deployment.clone(),
                config.azure_openai_api_version.clone(),
                bearer_token,
                Duration::from_secs(60),
            )
            .map_err(anyhow::Error::msg)?;

            let pipeline = SemanticAuditPipeline::new(
                SDVP_PROTOCOL_ID,
                SDVP_PROTOCOL_VERSION,
                sdvp_blueprints(),
                SDVP_AUTHORITY_TEXT.to_string(),
                executor,
            )
            .map_err(anyhow::Error::msg)?;

            info!("🧠 [KERNEL]: SDVP semantic pipeline wired (azure_openai)");
            Some(Arc::new(SdvpRunner::new(pipeline)))
        } else {
            None
        };

        // ------------------------------------------------------------------
        // Verificación de confianza del sello (opcional)
        // ------------------------------------------------------------------
        let seal_trust = if config.enable_seal_trust_verification {
            let trust_roots_path = config
                .trust_roots_path
                .as_deref()
                .context("AUDITOR_TRUST_ROOTS_PATH is required for seal trust verification")?;

            let trust_roots = load_trust_roots(trust_roots_path)
                .with_context(|| format!("unreadable trust roots at {trust_roots_path}"))?;

            if trust_roots.is_empty() {
                bail!("trust root bundle at {trust_roots_path} contains no certificates");
            }

            info!(
                "🛡️  [KERNEL]: seal trust verification wired ({} trust roots)",
                trust_roots.len()
            );
            Some(Arc::new(SealTrustVerification::new(
                Arc::new(BuiltinAdesValidator::new()),
                trust_roots,
            )))
        } else {
            None
        };

        let coordinator = Arc::new(AuditorCoordinator::new(config.clone(), semantic, seal_trust));

        Ok(Self {
            config,
            coordinator,
        })
    }
}

/// Carga un paquete PEM de raíces de confianza a DER.
fn load_trust_roots(path: &str) -> anyhow::Result<Vec<Vec<u8>>> {
    let text = std::fs::read_to_string(path)?;
    let mut roots = Vec::new();

    let mut remaining = text.as_str();
    while let Some(begin) = remaining.find("-----BEGIN CERTIFICATE-----") {
        let block = &remaining[begin..];
        let Some(end) = block.find("-----END CERTIFICATE-----") else {
            bail!("dangling PEM block in trust root bundle");
        };
        let end_absolute = end + "-----END CERTIFICATE-----".len();

        let (label, der) = pem_rfc7468::decode_vec(block[..end_absolute].as_bytes())
            .map_err(|e| anyhow::anyhow!("PEM decode failure: {e}"))?;
        if label != "CERTIFICATE" {
            bail!("unexpected PEM label '{label}' in trust root bundle");
        }
        roots.push(der);

        remaining = &block[end_absolute..];
    }

    Ok(roots)
}
