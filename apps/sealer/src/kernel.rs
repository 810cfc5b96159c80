// [apps/sealer/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: SEALER KERNEL (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CONFIGURACIÓN CONGELADA Y CLIENTES DE FIRMADO
 *
 * Garantías:
 * - Arranque fail-fast ante configuración o credenciales inválidas
 * - Fuente de credencial determinista (bearer por entorno)
 * - Transportes compartidos pre-asignados (cliente HSM, cliente TSA)
 * =================================================================
 */

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use sigilo_domain_pades::{LifecycleConfig, PadesLifecycleOrchestrator};
use sigilo_infra_hsm::{AzureHsmSigner, HsmSignerConfig, StaticTokenProvider};
use sigilo_infra_tsa::TsaClient;

/// Configuración del servicio de sellado.
#[derive(Debug, Clone)]
pub struct SealerConfig {
    pub max_pdf_size_mb: u64,
    pub enable_lta_updates: bool,
    pub hsm_endpoint: String,
    pub hsm_account: String,
    pub hsm_profile: String,
    pub tsa_url: Option<String>,
}

impl SealerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            max_pdf_size_mb: std::env::var("SEALER_MAX_PDF_SIZE_MB")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .context("SEALER_MAX_PDF_SIZE_MB must be an integer")?,
            enable_lta_updates: matches!(
                std::env::var("SEALER_ENABLE_LTA_UPDATES")
                    .unwrap_or_else(|_| "true".to_string())
                    .to_ascii_lowercase()
                    .as_str(),
                "1" | "true" | "yes" | "on"
            ),
            hsm_endpoint: std::env::var("HSM_SIGNING_ENDPOINT")
                .context("HSM_SIGNING_ENDPOINT is required")?,
            hsm_account: std::env::var("HSM_SIGNING_ACCOUNT")
                .context("HSM_SIGNING_ACCOUNT is required")?,
            hsm_profile: std::env::var("HSM_SIGNING_PROFILE")
                .context("HSM_SIGNING_PROFILE is required")?,
            tsa_url: std::env::var("TSA_URL").ok(),
        })
    }
}

/// Núcleo del sellador: clientes y orquestador del ciclo PAdES.
pub struct SealerKernel {
    pub config: SealerConfig,
    pub signer: Arc<AzureHsmSigner>,
    pub tsa: Option<Arc<TsaClient>>,
    pub lifecycle: PadesLifecycleOrchestrator,
}

impl SealerKernel {
    pub fn ignite() -> anyhow::Result<Self> {
        let config = SealerConfig::from_env()?;

        let bearer_token = std::env::var("HSM_SIGNING_BEARER_TOKEN")
            .context("HSM_SIGNING_BEARER_TOKEN is required")?;

        let signer = Arc::new(AzureHsmSigner::new(
            HsmSignerConfig {
                endpoint: config.hsm_endpoint.clone(),
                account: config.hsm_account.clone(),
                profile: config.hsm_profile.clone(),
            },
            Arc::new(StaticTokenProvider::new(bearer_token)),
        )?);

        let tsa = match &config.tsa_url {
            Some(url) => Some(Arc::new(TsaClient::new(url.clone())?)),
            None => None,
        };

        if config.enable_lta_updates && tsa.is_none() {
            bail!("SEALER_ENABLE_LTA_UPDATES demands a configured TSA_URL");
        }

        let lifecycle = PadesLifecycleOrchestrator::new(LifecycleConfig {
            enable_lta_updates: config.enable_lta_updates,
        });

        info!(
            "🔐 [KERNEL]: sealer wired (LTA updates {})",
            if config.enable_lta_updates { "ENABLED" } else { "disabled" }
        );

        Ok(Self {
            config,
            signer,
            tsa,
            lifecycle,
        })
    }
}
