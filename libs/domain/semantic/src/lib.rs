// [libs/domain/semantic/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SEMANTIC AUDIT PIPELINE (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: MOTOR MULTI-PASE CONSULTIVO, AGNÓSTICO DE PROTOCOLO
 *
 * IMPORTANTE:
 * - La Auditoría de Integridad del Artefacto DEBE haber pasado antes.
 * - Este pipeline es probabilístico y consultivo POR DISEÑO.
 * - Produce hallazgos canónicos para revisión humana.
 * - JAMÁS determina el estado de la auditoría; su única vía de
 *   influencia es la señal consultiva acotada que el coordinador
 *   consume explícitamente.
 * =================================================================
 */

pub mod adapter;
pub mod chunker;
pub mod context;
pub mod executor;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod protocol;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use adapter::{AdapterError, ProtocolFindingAdapter, RawSemanticFinding};
pub use chunker::{DeterministicTextSlicer, SectionChunker};
pub use context::SemanticAuditContext;
pub use executor::{
    ExecutionRequest, FailureKind, PromptPrefix, StructuredExecution, StructuredExecutor,
};
pub use llm::AzureStructuredExecutor;
pub use pipeline::SemanticAuditPipeline;
pub use prompt::{canonical_semantic_snapshot, prefix_hash, PromptFragment};
pub use protocol::{
    sdvp_blueprints, validate_pass_order, PassBlueprint, SDVP_PASS_ORDER, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};
