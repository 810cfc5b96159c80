// [libs/infra/hsm-client/src/backoff.rs]
//! =================================================================
//! APARATO: POLL BACKOFF POLICY (V2.0)
//! RESPONSABILIDAD: CADENCIA DE SONDEO BAJO PRESUPUESTO ACOTADO
//!
//! # Mathematical Proof (Bounded Polling):
//! delay(n) = min(cap, base · 2^n) + jitter. Con base 1 s y tope
//! 10 s, la suma de esperas alcanza el presupuesto total de 60 s en
//! un número finito y pequeño de intentos; el bucle de sondeo JAMÁS
//! es infinito.
//! =================================================================

use std::time::Duration;

use rand::Rng;

/// Presupuesto total de pared para una operación de firma.
pub const POLL_BUDGET_SECONDS: u64 = 60;

/// Tope del backoff exponencial entre sondeos.
pub const POLL_BACKOFF_CAP_SECONDS: u64 = 10;

const BASE_DELAY_MILLIS: u64 = 1_000;
const JITTER_MILLIS: u64 = 250;

/// Espera previa al sondeo `attempt` (0-indexado), con jitter.
pub fn poll_delay(attempt: u32) -> Duration {
    let exponential = BASE_DELAY_MILLIS.saturating_mul(1u64 << attempt.min(16));
    let capped = exponential.min(POLL_BACKOFF_CAP_SECONDS * 1_000);
    let jitter = rand::thread_rng().gen_range(0..JITTER_MILLIS);
    Duration::from_millis(capped + jitter)
}

/// Espera determinista (sin jitter), expuesta para certificación.
pub fn poll_delay_deterministic(attempt: u32) -> Duration {
    let exponential = BASE_DELAY_MILLIS.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(exponential.min(POLL_BACKOFF_CAP_SECONDS * 1_000))
}
