// [libs/domain/pades/src/errors.rs]
//! =================================================================
//! APARATO: SEALING ERRORS (V3.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL PIPELINE DE SELLADO
//! =================================================================

use thiserror::Error;

use sigilo_core_pdf::PdfParseError;
use sigilo_infra_hsm::SignerError;
use sigilo_infra_tsa::TsaError;

#[derive(Error, Debug)]
pub enum SealError {
    #[error("CONTAINER_FAULT: {0}")]
    Pdf(#[from] PdfParseError),

    #[error("SIGNER_FAULT: {0}")]
    Signer(#[from] SignerError),

    #[error("TIMESTAMP_FAULT: {0}")]
    Tsa(#[from] TsaError),

    #[error("CMS_ENCODING_FAULT: {0}")]
    CmsEncoding(String),

    #[error("HOLE_BUDGET_EXCEEDED: CMS needs {needed} bytes but the hole reserves {reserved}")]
    BudgetExceeded { needed: usize, reserved: usize },

    #[error("CHAIN_EMPTY: Signing service returned no certificate material")]
    ChainEmpty,

    #[error("ILLEGAL_TRANSITION: Operation '{operation}' is not valid from state {from:?}")]
    IllegalTransition {
        from: crate::lifecycle::ArtifactState,
        operation: &'static str,
    },

    #[error("ARTIFACT_SEALED: LTA-signed artifacts admit no further revisions")]
    Sealed,

    #[error("TSA_REQUIRED: enable_lta_updates demands a configured timestamp authority")]
    MissingTsa,

    #[error("REVOCATION_FETCH_FAULT: {0}")]
    RevocationFetch(String),
}
