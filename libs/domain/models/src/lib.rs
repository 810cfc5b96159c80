// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SIGILO DOMAIN MODELS (V5.0 - FROZEN CONTRACTS)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DE DATOS DEL PIPELINE DE CONFIANZA
 *
 * VISION HIPER-HOLÍSTICA:
 * Única fuente de verdad para los tipos que cruzan fronteras de
 * subsistema: hallazgos inmutables, agregados del reporte de
 * verificación con invariantes validadas en construcción, vínculos
 * suplementales (bindings) y eventos observacionales de auditoría.
 * =================================================================
 */

pub mod bindings;
pub mod events;
pub mod finding;
pub mod report;

pub use bindings::{GenerationMode, SealBindings};
pub use events::{AuditEvent, AuditEventType, EventBus};
pub use finding::{
    ConfidenceLevel, Finding, FindingCategory, FindingSource, FindingStatus, Severity,
};
pub use report::{
    ArtifactIntegrityResult, AuditStatus, DeliveryRecommendation, ReportContractError,
    SealTrustResult, SemanticAuditPassResult, SemanticAuditResult, SemanticExecutionError,
    TokenMetrics, VerificationReport,
};
