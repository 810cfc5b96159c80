// [libs/domain/pades/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CMS / PADES ASSEMBLER & LIFECYCLE (V5.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: PIPELINE DE SELLADO LIFECYCLE-CORRECT
 *
 * Pipeline de firmado con corrección de ciclo de vida:
 *
 *   Rev 1: Firma de certificación (DocMDP)        → PAdES-B
 *   Rev 2: DSS + VRI de la firma de certificación → PAdES-B-LT
 *   Rev 3: DocumentTimeStamp (congelado FINAL)    → PAdES-B-LTA
 *
 * El sello de tiempo documental es SIEMPRE la última operación
 * criptográfica. Tras él no se realiza actualización alguna.
 * =================================================================
 */

mod cms_builder;
mod errors;
mod lifecycle;
mod revisions;

pub use cms_builder::{build_detached_cms, dry_run_cms_budget, CmsSignedAttributes};
pub use errors::SealError;
pub use lifecycle::{ArtifactState, LifecycleConfig, PadesLifecycleOrchestrator, SealedArtifact};
pub use revisions::{
    apply_certification_signature, apply_document_timestamp, apply_dss_revision,
    collect_crl_material, vri_key_for_contents, CERTIFICATION_FIELD_NAME,
    CERTIFICATION_RESERVED_BYTES, TIMESTAMP_FIELD_NAME, TIMESTAMP_RESERVED_BYTES,
};
