// [libs/domain/semantic/src/executor.rs]
/*!
 * =================================================================
 * APARATO: STRUCTURED EXECUTOR SEAM (V5.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL EJECUTOR LLM ESTRUCTURADO
 *
 * El resultado de ejecución es NO-AUTORITATIVO y de diagnóstico:
 * jamás lanza y normaliza todo desenlace (éxito, timeout, violación
 * de esquema, rechazo ético, error inesperado) a un valor.
 * =================================================================
 */

use futures::future::BoxFuture;
use serde_json::Value;

use sigilo_domain_models::{EventBus, TokenMetrics};

use crate::prompt::PromptFragment;

/// Clasificación cerrada de fallos de ejecución LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    RetryExhausted,
    SchemaViolation,
    Refusal,
    UnexpectedError,
}

impl FailureKind {
    pub fn wire_label(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::RetryExhausted => "retry_exhausted",
            FailureKind::SchemaViolation => "schema_violation",
            FailureKind::Refusal => "refusal",
            FailureKind::UnexpectedError => "unexpected_error",
        }
    }
}

/// Prefijo cache-estable ya ensamblado (autoridad + snapshot).
///
/// Se construye UNA vez por corrida; los ejecutores lo consumen por
/// referencia para que el material sea byte-idéntico entre pases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPrefix {
    pub authority_text: String,
    pub snapshot: String,
}

/// Solicitud de una ejecución estructurada.
pub struct ExecutionRequest<'a> {
    pub prompt: &'a PromptFragment,
    pub prefix: &'a PromptPrefix,
    /// Capa de foco opcional (chunk bajo análisis).
    pub focus_chunk: Option<String>,
    pub audit_id: Option<&'a str>,
    pub bus: EventBus,
}

/// Resultado canónico de una ejecución estructurada.
#[derive(Debug, Clone)]
pub struct StructuredExecution {
    pub success: bool,
    /// Salida JSON validada por el proveedor (None ante fallo).
    pub output: Option<Value>,

    /// Telemetría cruda de tokens (consultiva).
    pub token_metrics: Option<TokenMetrics>,

    pub failure_type: Option<FailureKind>,
    pub raw_error: Option<String>,

    pub model_deployment: String,
    pub prompt_id: String,

    /// Hash del prefijo efectivamente transmitido (invariante de caché).
    pub prefix_hash: String,
}

/// Costura del ejecutor LLM estructurado.
pub trait StructuredExecutor: Send + Sync {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, StructuredExecution>;
}

impl<T: StructuredExecutor> StructuredExecutor for std::sync::Arc<T> {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, StructuredExecution> {
        (**self).execute(request)
    }
}
