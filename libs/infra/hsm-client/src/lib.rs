// [libs/infra/hsm-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HSM SIGNING UPLINK (V5.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: DELEGACIÓN DE OPERACIONES RSA AL HSM REMOTO
 *
 * GARANTÍAS DURAS:
 * - Se firman DIGESTS, jamás datos crudos.
 * - El material de clave privada vive exclusivamente en el HSM.
 * - Cliente sin estado: nada criptográfico sobrevive a una operación,
 *   salvo la caché de cadena de certificados con TTL corto (≈15 min).
 * =================================================================
 */

mod backoff;
mod chain;
mod client;
mod errors;

pub use backoff::{
    poll_delay, poll_delay_deterministic, POLL_BACKOFF_CAP_SECONDS, POLL_BUDGET_SECONDS,
};
pub use chain::normalize_certificate_payload;
pub use client::{
    AzureHsmSigner, HsmSignerConfig, SignatureAlgorithm, SignerResponse, StaticTokenProvider,
    TokenProvider, CHAIN_CACHE_TTL,
};
pub use errors::SignerError;
