// [libs/infra/hsm-client/src/errors.rs]
//! =================================================================
//! APARATO: HSM UPLINK ERRORS (V3.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL SERVICIO DE FIRMADO
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("INVALID_ARGUMENT: {0}")]
    InvalidArgument(String),

    #[error("TRANSIENT_UNAVAILABLE: Signing service unreachable: {0}")]
    TransientUnavailable(String),

    #[error("REMOTE_FAILURE: Signing service reported failure: {0}")]
    RemoteFailure(String),

    #[error("POLL_BUDGET_EXHAUSTED: Operation still pending after {elapsed_seconds}s")]
    TimedOut { elapsed_seconds: u64 },

    #[error("CHAIN_MATERIAL_UNPARSEABLE: Certificate payload resisted every normalization: {0}")]
    ChainUnparseable(String),
}
