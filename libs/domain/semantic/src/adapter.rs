// [libs/domain/semantic/src/adapter.rs]
/*!
 * =================================================================
 * APARATO: PROTOCOL FINDING ADAPTER (V5.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: IDENTIDAD ESTABLE DE HALLAZGOS SEMÁNTICOS
 *
 * El adaptador es la ÚNICA autoridad para:
 * - generar finding_id estables
 * - asignar severidad / confianza a fallos de ejecución
 *
 * IDENTIDAD ESTABLE: derivada SOLO de hechos inmutables — protocolo,
 * versión, pase, rule_id, categoría, ubicación y el Document Content
 * canónico. El texto generado por el modelo y el orden de ejecución
 * JAMÁS afectan la identidad. Los fallos de ejecución derivan su ID
 * de (protocolo, versión, pase, "execution", tipo de fallo).
 * =================================================================
 */

use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use sigilo_domain_models::{
    ConfidenceLevel, Finding, FindingCategory, FindingSource, FindingStatus, Severity,
};

use crate::executor::FailureKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("RULE_ID_REQUIRED: semantic finding from pass {0} is missing its rule_id")]
    MissingRuleId(String),
}

/// Hallazgo crudo tal como lo emite el modelo (esquema del pase).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSemanticFinding {
    pub rule_id: String,
    pub title: String,
    pub description: String,
    pub why_it_matters: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub confidence: ConfidenceLevel,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Adaptador de hallazgos de un pase concreto de un protocolo.
pub struct ProtocolFindingAdapter {
    protocol_id: String,
    protocol_version: String,
    pass_id: String,
}

impl ProtocolFindingAdapter {
    pub fn new(protocol_id: &str, protocol_version: &str, pass_id: &str) -> Self {
        Self {
            protocol_id: protocol_id.to_string(),
            protocol_version: protocol_version.to_string(),
            pass_id: pass_id.to_string(),
        }
    }

    /// Adapta un hallazgo crudo al esquema canónico con ID estable.
    pub fn adapt(
        &self,
        raw: &RawSemanticFinding,
        document_content: &Value,
    ) -> Result<Finding, AdapterError> {
        if raw.rule_id.trim().is_empty() {
            return Err(AdapterError::MissingRuleId(self.pass_id.clone()));
        }

        let canonical_payload = sigilo_core_canonical::canonicalize(document_content)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_default();

        // Material de identidad (AUTORITATIVO). El número de secuencia
        // queda intencionalmente FUERA.
        let hash_material = [
            self.protocol_id.as_str(),
            self.protocol_version.as_str(),
            self.pass_id.as_str(),
            raw.rule_id.as_str(),
            category_label(raw.category),
            raw.location.as_deref().unwrap_or(""),
            canonical_payload.as_str(),
        ]
        .join("|");

        let suffix = stable_suffix(&hash_material);

        let finding_id = format!(
            "{}-{}-{}-{}",
            self.protocol_id,
            self.pass_id,
            severity_label(raw.severity).to_ascii_uppercase(),
            suffix
        );

        let mut metadata = raw.metadata.clone().unwrap_or_default();
        metadata.insert("rule_id".to_string(), Value::String(raw.rule_id.clone()));

        Ok(Finding {
            finding_id,
            source: FindingSource::SemanticAudit,
            protocol_id: Some(self.protocol_id.clone()),
            protocol_version: Some(self.protocol_version.clone()),
            pass_id: Some(self.pass_id.clone()),
            category: raw.category,
            severity: raw.severity,
            confidence: raw.confidence,
            status: FindingStatus::Open,
            title: raw.title.clone(),
            description: raw.description.clone(),
            why_it_matters: raw.why_it_matters.clone(),
            location: raw.location.clone(),
            suggested_fix: raw.suggested_fix.clone(),
            metadata: Some(metadata),
            requires_stv: false,
        })
    }

    /// Absorbe un fallo de ejecución LLM como hallazgo consultivo.
    ///
    /// Mapa de severidad:
    ///   timeout          → MINOR / HIGH   (EXECUTION_READINESS)
    ///   retry_exhausted  → MAJOR / HIGH   (EXECUTION_READINESS)
    ///   schema_violation → MAJOR / HIGH   (STRUCTURE)
    ///   refusal          → INFO  / MEDIUM (ETHICAL)
    ///   unexpected_error → MAJOR / MEDIUM (OTHER)
    pub fn adapt_execution_failure(&self, failure: FailureKind) -> Finding {
        let (severity, confidence, category, title) = match failure {
            FailureKind::Timeout => (
                Severity::Minor,
                ConfidenceLevel::High,
                FindingCategory::ExecutionReadiness,
                "Semantic audit execution timed out",
            ),
            FailureKind::RetryExhausted => (
                Severity::Major,
                ConfidenceLevel::High,
                FindingCategory::ExecutionReadiness,
                "Semantic audit execution failed after retries",
            ),
            FailureKind::SchemaViolation => (
                Severity::Major,
                ConfidenceLevel::High,
                FindingCategory::Structure,
                "Semantic audit returned invalid structured output",
            ),
            FailureKind::Refusal => (
                Severity::Info,
                ConfidenceLevel::Medium,
                FindingCategory::Ethical,
                "Semantic audit request was refused by the model",
            ),
            FailureKind::UnexpectedError => (
                Severity::Major,
                ConfidenceLevel::Medium,
                FindingCategory::Other,
                "Unexpected semantic audit execution failure",
            ),
        };

        let hash_material = format!(
            "{}:{}:{}:execution:{}",
            self.protocol_id,
            self.protocol_version,
            self.pass_id,
            failure.wire_label()
        );

        let finding_id = format!(
            "{}-{}-EXECUTION-{}",
            self.protocol_id,
            self.pass_id,
            stable_suffix(&hash_material)
        );

        Finding {
            finding_id,
            source: FindingSource::SemanticAudit,
            protocol_id: Some(self.protocol_id.clone()),
            protocol_version: Some(self.protocol_version.clone()),
            pass_id: Some(self.pass_id.clone()),
            category,
            severity,
            confidence,
            status: FindingStatus::Open,
            title: title.to_string(),
            description: format!(
                "The semantic audit pass {} could not be fully executed due to an \
                 execution failure ({}). This does not imply document invalidity.",
                self.pass_id,
                failure.wire_label()
            ),
            why_it_matters: "Execution reliability affects audit completeness but does \
                             not reflect document quality."
                .to_string(),
            location: None,
            suggested_fix: None,
            metadata: None,
            requires_stv: false,
        }
    }
}

/// Sufijo determinista: 12 hex del SHA-256 del material de identidad.
fn stable_suffix(material: &str) -> String {
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(digest)[..12].to_string()
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "crit",
        Severity::Major => "major",
        Severity::Minor => "minor",
        Severity::Info => "info",
    }
}

fn category_label(category: FindingCategory) -> &'static str {
    match category {
        FindingCategory::Context => "context",
        FindingCategory::Ux => "ux",
        FindingCategory::Clarity => "clarity",
        FindingCategory::Accessibility => "accessibility",
        FindingCategory::Structure => "structure",
        FindingCategory::Accuracy => "accuracy",
        FindingCategory::Completeness => "completeness",
        FindingCategory::Risk => "risk",
        FindingCategory::Compliance => "compliance",
        FindingCategory::ExecutionReadiness => "execution_readiness",
        FindingCategory::Ethical => "ethical",
        FindingCategory::Other => "other",
    }
}
