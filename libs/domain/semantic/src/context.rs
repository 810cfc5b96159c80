// [libs/domain/semantic/src/context.rs]
/*!
 * =================================================================
 * APARATO: SEMANTIC AUDIT CONTEXT (V4.0 - IMMUTABLE)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: CONTEXTO COMPARTIDO DE SOLO LECTURA
 *
 * Derivado EXCLUSIVAMENTE de las salidas de la Auditoría de
 * Integridad y metadatos de ejecución. Una vez construido es de solo
 * lectura para todos los pases: cualquier proyección (rebanado,
 * chunking) se produce localmente en el pase y jamás muta este
 * contexto.
 * =================================================================
 */

use serde_json::Value;

use sigilo_domain_models::EventBus;

/// Contexto inmutable compartido por todos los pases semánticos.
#[derive(Debug, Clone)]
pub struct SemanticAuditContext {
    // --- Entradas autoritativas (de la Auditoría de Integridad) ---
    /// Document Content autoritativo extraído del artefacto.
    pub document_content: Value,

    /// Proyección textual determinista derivada del contenido.
    pub content_derived_text: String,

    /// Texto visible de página extraído de los content streams.
    pub visible_text: String,

    // --- Metadatos de ejecución (diagnóstico, opcionales) ---
    pub audit_id: Option<String>,
    pub protocol_id: Option<String>,
    pub protocol_version: Option<String>,
    pub model_deployment: Option<String>,

    // --- Plomería de runtime (capacidad, no estado de modelo) ---
    pub bus: EventBus,
}

impl SemanticAuditContext {
    pub fn new(
        document_content: Value,
        content_derived_text: String,
        visible_text: String,
    ) -> Self {
        Self {
            document_content,
            content_derived_text,
            visible_text,
            audit_id: None,
            protocol_id: None,
            protocol_version: None,
            model_deployment: None,
            bus: EventBus::null(),
        }
    }

    pub fn with_audit_id(mut self, audit_id: &str) -> Self {
        self.audit_id = Some(audit_id.to_string());
        self
    }

    pub fn with_protocol(mut self, protocol_id: &str, protocol_version: &str) -> Self {
        self.protocol_id = Some(protocol_id.to_string());
        self.protocol_version = Some(protocol_version.to_string());
        self
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }
}
