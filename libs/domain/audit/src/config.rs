// [libs/domain/audit/src/config.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR RUNTIME CONFIG (V4.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: GATES DE EJECUCIÓN Y LÍMITES DE RECURSOS
 *
 * La configuración se captura UNA vez al arranque, es de solo
 * lectura en runtime y jamás introduce no-determinismo en los
 * veredictos de verificación.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("UNSUPPORTED_PROVIDER: semantic model provider '{0}' (allowed: disabled, azure_openai)")]
    UnsupportedProvider(String),

    #[error("PROVIDER_REQUIRED: semantic audit enabled without a model provider")]
    ProviderRequired,

    #[error("MODEL_WITHOUT_AUDIT: model deployment configured but semantic audit is disabled")]
    ModelWithoutAudit,

    #[error("MALFORMED_LIMIT: {0}")]
    MalformedLimit(String),
}

/// Configuración del microservicio Auditor.
#[derive(Debug, Clone)]
pub struct AuditorConfig {
    // --- Gates de ejecución ---
    pub enable_artifact_integrity_audit: bool,
    pub enable_semantic_audit: bool,
    pub enable_seal_trust_verification: bool,

    // --- Límites de seguridad y recursos ---
    pub max_pdf_size_mb: u64,
    pub max_page_count: u32,
    pub max_text_extraction_chars: usize,

    // --- Análisis semántico ---
    pub semantic_model_provider: String,
    pub semantic_model_deployment: String,
    pub azure_openai_endpoint: String,
    pub azure_openai_api_version: String,

    // --- Raíces de confianza (entrada externa, nunca propiedad del core) ---
    pub trust_roots_path: Option<String>,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            enable_artifact_integrity_audit: true,
            enable_semantic_audit: false,
            enable_seal_trust_verification: false,
            max_pdf_size_mb: 25,
            max_page_count: 500,
            max_text_extraction_chars: 2_000_000,
            semantic_model_provider: "disabled".to_string(),
            semantic_model_deployment: String::new(),
            azure_openai_endpoint: String::new(),
            azure_openai_api_version: String::new(),
            trust_roots_path: None,
        }
    }
}

impl AuditorConfig {
    /// Carga desde variables de entorno. Valores parseados una vez,
    /// inmutables después.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            enable_artifact_integrity_audit: env_bool(
                "AUDITOR_ENABLE_ARTIFACT_INTEGRITY_AUDIT",
                true,
            ),
            enable_semantic_audit: env_bool("AUDITOR_ENABLE_SEMANTIC_AUDIT", false),
            enable_seal_trust_verification: env_bool(
                "AUDITOR_ENABLE_SEAL_TRUST_VERIFICATION",
                false,
            ),
            max_pdf_size_mb: env_parse("AUDITOR_MAX_PDF_SIZE_MB", 25)?,
            max_page_count: env_parse("AUDITOR_MAX_PAGE_COUNT", 500)?,
            max_text_extraction_chars: env_parse("AUDITOR_MAX_TEXT_EXTRACTION_CHARS", 2_000_000)?,
            semantic_model_provider: std::env::var("AUDITOR_SEMANTIC_MODEL_PROVIDER")
                .unwrap_or_else(|_| "disabled".to_string()),
            semantic_model_deployment: std::env::var("AUDITOR_SEMANTIC_MODEL_DEPLOYMENT")
                .unwrap_or_default(),
            azure_openai_endpoint: std::env::var("AZURE_OPENAI_ENDPOINT").unwrap_or_default(),
            azure_openai_api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_default(),
            trust_roots_path: std::env::var("AUDITOR_TRUST_ROOTS_PATH").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let allowed = ["disabled", "azure_openai"];
        if !allowed.contains(&self.semantic_model_provider.as_str()) {
            return Err(ConfigError::UnsupportedProvider(
                self.semantic_model_provider.clone(),
            ));
        }

        if self.enable_semantic_audit && self.semantic_model_provider == "disabled" {
            return Err(ConfigError::ProviderRequired);
        }

        if !self.semantic_model_deployment.is_empty() && !self.enable_semantic_audit {
            return Err(ConfigError::ModelWithoutAudit);
        }

        Ok(())
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::MalformedLimit(format!("{name}='{raw}'"))),
        Err(_) => Ok(default),
    }
}
