// [libs/domain/models/src/report.rs]
/*!
 * =================================================================
 * APARATO: VERIFICATION REPORT AGGREGATES (V5.0 - FROZEN CONTRACT)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * RESPONSABILIDAD: REPORTE MAESTRO DE AUDITORÍA E INVARIANTES
 *
 * El reporte es legible por máquina, revisable por humanos, sellable
 * criptográficamente y apto para incrustación archivística PDF/A-3.
 * Las invariantes de capa cruzada se validan EN CONSTRUCCIÓN: un
 * agregado que viola el contrato no puede existir como valor.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::finding::{ConfidenceLevel, Finding};

/// Versión del esquema del reporte de verificación.
pub const REPORT_SCHEMA_VERSION: &str = "1.4";

/// Rol del archivo cuando se incrusta como associated file del PDF.
pub const REPORT_ARTIFACT_ROLE: &str = "meta-audit";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportContractError {
    #[error("AIA_SIGNAL_CONTRACT: extracted signals must all be present when integrity passes")]
    MissingExtractedSignals,

    #[error("AIA_SIGNAL_CONTRACT: extracted signals must be absent when integrity fails")]
    ForbiddenExtractedSignals,

    #[error("STV_CONTRACT: trusted must be null exactly when STV is not executed")]
    TrustStateMismatch,

    #[error("STV_CONTRACT: resolved_aia_finding_ids requires trusted=true")]
    ResolutionWithoutTrust,

    #[error("FLOW_CONTRACT: semantic audit must not be executed if artifact integrity failed")]
    SemanticAfterIntegrityFailure,

    #[error("FLOW_CONTRACT: audit status PASS requires artifact integrity to have passed")]
    PassWithoutIntegrity,
}

/// Resultado global de la auditoría. Estrictamente para gating de flujo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Pass,
    Fail,
    NotEvaluated,
}

/// Recomendación consultiva de entrega. Señal de guía, jamás
/// aprobación legal ni autorización de publicación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryRecommendation {
    Ready,
    NotReady,
    ExpertReviewRequired,
}

// ---------------------------------------------------------------------
// Integridad del artefacto (raíz de confianza del Auditor)
// ---------------------------------------------------------------------

/// Resultado de la verificación determinista de integridad (AIA).
///
/// Invariante: las tres señales extraídas están presentes si y solo si
/// `passed == true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactIntegrityResult {
    pub passed: bool,

    #[serde(default)]
    pub checks_executed: Vec<String>,

    #[serde(default)]
    pub findings: Vec<Finding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_content: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_derived_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_text: Option<String>,
}

impl ArtifactIntegrityResult {
    /// Construcción validada del agregado AIA.
    pub fn new(
        passed: bool,
        checks_executed: Vec<String>,
        findings: Vec<Finding>,
        document_content: Option<Value>,
        content_derived_text: Option<String>,
        visible_text: Option<String>,
    ) -> Result<Self, ReportContractError> {
        if passed {
            if document_content.is_none()
                || content_derived_text.is_none()
                || visible_text.is_none()
            {
                return Err(ReportContractError::MissingExtractedSignals);
            }
        } else if document_content.is_some()
            || content_derived_text.is_some()
            || visible_text.is_some()
        {
            return Err(ReportContractError::ForbiddenExtractedSignals);
        }

        Ok(Self {
            passed,
            checks_executed,
            findings,
            document_content,
            content_derived_text,
            visible_text,
        })
    }

    /// Agregado fallido sin señales extraídas.
    pub fn failed(checks_executed: Vec<String>, findings: Vec<Finding>) -> Self {
        Self {
            passed: false,
            checks_executed,
            findings,
            document_content: None,
            content_derived_text: None,
            visible_text: None,
        }
    }
}

// ---------------------------------------------------------------------
// Auditoría semántica (consultiva, no autoritativa)
// ---------------------------------------------------------------------

/// Métricas de consumo de tokens. Diagnóstico puro; jamás gatean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    /// Tokens del prompt servidos desde caché del proveedor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
}

/// Diagnóstico técnico de ejecución de un pase semántico.
/// NO es fallo semántico; NO gatea entrega ni estado de auditoría.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticExecutionError {
    pub failure_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_deployment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

/// Resultado interno de un único pase semántico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAuditPassResult {
    pub pass_id: String,

    /// Si la ejecución del pase fue intentada. Un error de ejecución
    /// NO implica fallo semántico.
    pub executed: bool,

    #[serde(default)]
    pub findings: Vec<Finding>,

    /// Recomendación de entrega del pase (solo P8). Metadato
    /// informacional del reporte; el coordinador consume únicamente
    /// `advisory_signals`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_recommendation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<SemanticExecutionError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_metrics: Option<TokenMetrics>,

    /// Señales consultivas no-gating (conjunto acotado, ver coordinador).
    #[serde(default)]
    pub advisory_signals: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceLevel>,
}

impl SemanticAuditPassResult {
    /// Registro de pase omitido por corte semántico (STOP).
    pub fn skipped(pass_id: &str) -> Self {
        Self {
            pass_id: pass_id.to_string(),
            executed: false,
            findings: Vec::new(),
            delivery_recommendation: None,
            execution_error: None,
            token_metrics: None,
            advisory_signals: Vec::new(),
            confidence: None,
        }
    }
}

/// Resultado agregado de un protocolo de auditoría semántica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAuditResult {
    pub executed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub pass_results: Vec<SemanticAuditPassResult>,

    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl SemanticAuditResult {
    pub fn not_executed() -> Self {
        Self {
            executed: false,
            protocol_id: None,
            protocol_version: None,
            pass_results: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// Vista derivada, solo lectura: IDs de pases efectivamente ejecutados.
    pub fn passes_executed(&self) -> Vec<&str> {
        self.pass_results
            .iter()
            .filter(|p| p.executed)
            .map(|p| p.pass_id.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------
// Verificación de confianza del sello (STV)
// ---------------------------------------------------------------------

/// Resultado de la verificación criptográfica del sello.
///
/// Invariantes: `trusted` es null si y solo si `executed == false`;
/// `resolved_aia_finding_ids` vacío salvo `trusted == true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealTrustResult {
    pub executed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,

    #[serde(default)]
    pub findings: Vec<Finding>,

    /// IDs de hallazgos AIA resueltos criptográficamente por STV.
    #[serde(default)]
    pub resolved_aia_finding_ids: Vec<String>,
}

impl SealTrustResult {
    pub fn new(
        executed: bool,
        trusted: Option<bool>,
        findings: Vec<Finding>,
        resolved_aia_finding_ids: Vec<String>,
    ) -> Result<Self, ReportContractError> {
        if executed != trusted.is_some() {
            return Err(ReportContractError::TrustStateMismatch);
        }

        if trusted != Some(true) && !resolved_aia_finding_ids.is_empty() {
            return Err(ReportContractError::ResolutionWithoutTrust);
        }

        Ok(Self {
            executed,
            trusted,
            findings,
            resolved_aia_finding_ids,
        })
    }

    pub fn not_executed() -> Self {
        Self {
            executed: false,
            trusted: None,
            findings: Vec::new(),
            resolved_aia_finding_ids: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------
// Reporte maestro (contrato público congelado)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub schema_version: String,
    pub artifact_role: String,

    pub audit_id: String,
    pub generated_at: DateTime<Utc>,

    pub status: AuditStatus,
    pub delivery_recommendation: DeliveryRecommendation,

    pub artifact_integrity: ArtifactIntegrityResult,
    pub semantic_audit: SemanticAuditResult,
    pub seal_trust: SealTrustResult,

    /// Lista aplanada de todos los hallazgos canónicos de todas las
    /// etapas, para indexación y tooling descendente.
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    /// Ensambla el reporte maestro validando las invariantes de flujo.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        audit_id: String,
        status: AuditStatus,
        delivery_recommendation: DeliveryRecommendation,
        artifact_integrity: ArtifactIntegrityResult,
        semantic_audit: SemanticAuditResult,
        seal_trust: SealTrustResult,
        findings: Vec<Finding>,
    ) -> Result<Self, ReportContractError> {
        if !artifact_integrity.passed && semantic_audit.executed {
            return Err(ReportContractError::SemanticAfterIntegrityFailure);
        }

        if status == AuditStatus::Pass && !artifact_integrity.passed {
            return Err(ReportContractError::PassWithoutIntegrity);
        }

        Ok(Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            artifact_role: REPORT_ARTIFACT_ROLE.to_string(),
            audit_id,
            generated_at: Utc::now(),
            status,
            delivery_recommendation,
            artifact_integrity,
            semantic_audit,
            seal_trust,
            findings,
        })
    }
}
