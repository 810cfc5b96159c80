// [libs/domain/models/src/finding.rs]
/*!
 * =================================================================
 * APARATO: CANONICAL FINDING OBJECT (V5.0 - FROZEN CONTRACT)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * RESPONSABILIDAD: OBSERVACIÓN INMUTABLE DE AUDITORÍA
 *
 * Los hallazgos son descriptivos, no prescriptivos. Registran lo
 * observado, por qué importa, y señalan severidad, confianza y
 * necesidad de revisión humana. NO aprueban ni rechazan documentos.
 *
 * REGLA DE INMUTABILIDAD: una vez construido, un hallazgo solo se
 * "actualiza" por sustitución de valor completo (`with_status`),
 * nunca por escritura de campo.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severidad del hallazgo. El orden es intencional y DEBE permanecer estable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Info,
}

/// Nivel de certeza del verificador sobre la existencia del problema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Estado de flujo de trabajo del hallazgo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    FlaggedForHumanReview,
    Resolved,
}

/// Origen del hallazgo. Frontera de confianza explícita.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    ArtifactIntegrity,
    SemanticAudit,
    SealTrust,
}

/// Taxonomía de alto nivel, intencionalmente amplia para permanecer
/// estable ante la evolución de protocolos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Context,
    Ux,
    Clarity,
    Accessibility,
    Structure,
    Accuracy,
    Completeness,
    Risk,
    Compliance,
    ExecutionReadiness,
    Ethical,
    Other,
}

/// Hallazgo canónico de auditoría (contrato congelado, apto para
/// incrustación archivística como associated file PDF/A-3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Identificador estable. Derivado determinísticamente del material
    /// inmutable del hallazgo, jamás del orden de ejecución.
    pub finding_id: String,

    pub source: FindingSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_id: Option<String>,

    pub category: FindingCategory,
    pub severity: Severity,
    pub confidence: ConfidenceLevel,
    pub status: FindingStatus,

    pub title: String,
    pub description: String,

    /// Explicación de impacto, riesgo o consecuencia.
    pub why_it_matters: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Observación estructural que requiere resolución criptográfica (STV).
    #[serde(default)]
    pub requires_stv: bool,
}

impl Finding {
    /// Sustitución de valor completo con nuevo estado de flujo.
    #[must_use]
    pub fn with_status(&self, status: FindingStatus) -> Finding {
        Finding {
            status,
            ..self.clone()
        }
    }

    /// Un hallazgo fatal detiene la auditoría de integridad.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// Señal de corte semántico: `metadata.stop_condition == true`.
    pub fn stop_condition(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("stop_condition"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
