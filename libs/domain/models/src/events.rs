// [libs/domain/models/src/events.rs]
/*!
 * =================================================================
 * APARATO: AUDIT EVENT BUS (V3.0 - OBSERVATIONAL ONLY)
 * CLASIFICACIÓN: DOMAIN MODEL (ESTRATO L2)
 * RESPONSABILIDAD: OBSERVACIONES DE TRANSICIÓN DE FASE DEL AUDITOR
 *
 * Los eventos son estrictamente observacionales, agnósticos del
 * transporte, no autoritativos y no archivísticos. Un fallo de
 * emisión JAMÁS altera la ejecución de la auditoría.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progresión determinista de eventos del ciclo de auditoría.
/// Enum finito y versionado: nuevas entradas preservan semántica
/// observacional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    // --- Ciclo global ---
    #[serde(rename = "audit_started")]
    AuditStarted,
    #[serde(rename = "audit_completed")]
    AuditCompleted,
    #[serde(rename = "audit_failed")]
    AuditFailed,

    // --- Fase de integridad del artefacto ---
    #[serde(rename = "artifact_integrity_started")]
    AiaStarted,
    #[serde(rename = "artifact_integrity_completed")]
    AiaCompleted,

    // --- Fase semántica ---
    #[serde(rename = "semantic_audit_started")]
    SemanticAuditStarted,
    #[serde(rename = "semantic_pass_started")]
    SemanticPassStarted,
    #[serde(rename = "semantic_pass_completed")]
    SemanticPassCompleted,
    #[serde(rename = "semantic_audit_completed")]
    SemanticAuditCompleted,
    #[serde(rename = "finding_discovered")]
    FindingDiscovered,

    // --- Ejecución LLM (observacional, no autoritativa) ---
    #[serde(rename = "llm_execution_started")]
    LlmExecutionStarted,
    #[serde(rename = "llm_execution_completed")]
    LlmExecutionCompleted,

    // --- Fase de confianza del sello ---
    #[serde(rename = "seal_trust_started")]
    SealTrustStarted,
    #[serde(rename = "seal_trust_completed")]
    SealTrustCompleted,

    // --- Presentación / streaming (no terminal) ---
    #[serde(rename = "audit_report_ready")]
    AuditReportReady,
}

/// Observación inmutable de una transición de fase del Auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub audit_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,

    /// Metadato contextual opcional (pass_id, protocol_id, conteos…).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl AuditEvent {
    pub fn new(
        audit_id: &str,
        event_type: AuditEventType,
        details: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            audit_id: audit_id.to_string(),
            timestamp: Utc::now(),
            event_type,
            details,
        }
    }
}

/// Capacidad de emisión de eventos.
///
/// El bus nulo (por defecto) descarta todo. El bus con canal respalda
/// el streaming SSE: emisión no bloqueante, fallos descartados, el
/// stream termina cuando el último emisor se suelta.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    sender: Option<mpsc::UnboundedSender<AuditEvent>>,
}

impl EventBus {
    /// Emisor nulo seguro (auditorías síncronas, jobs, tests).
    pub fn null() -> Self {
        Self { sender: None }
    }

    /// Emisor respaldado por canal en memoria, apto para SSE.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Emite una observación. Fail-safe: la observabilidad jamás
    /// rompe la auditoría.
    pub fn emit(&self, event: AuditEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
