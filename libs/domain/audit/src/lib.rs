// [libs/domain/audit/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ARTIFACT AUDIT STACK (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: AUDITORÍA EN CAPAS DEL ARTEFACTO SELLADO
 *
 * Tres capas con fronteras de confianza explícitas:
 *   1. AIA — integridad determinista del artefacto (raíz de confianza)
 *   2. STV — confianza criptográfica del sello (resuelve hallazgos AIA)
 *   3. Coordinador — control de tráfico mudo: orden, gates, agregado
 *
 * El coordinador NO inspecciona contenido, NO interpreta prosa de
 * hallazgos y NO introduce heurísticas.
 * =================================================================
 */

pub mod aia;
pub mod config;
pub mod coordinator;
pub mod stv;

pub(crate) mod findings;

pub use aia::ArtifactIntegrityAudit;
pub use config::AuditorConfig;
pub use coordinator::{AuditorCoordinator, SemanticAuditRunner, SemanticRunInputs};
pub use stv::{
    AdesValidator, AdesVerdict, SealTrustVerification, ValidationRequest, ValidatorFailure,
};
pub use stv::validator::BuiltinAdesValidator;
