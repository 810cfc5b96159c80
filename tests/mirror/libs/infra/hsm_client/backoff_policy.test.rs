/**
 * =================================================================
 * APARATO: BACKOFF POLICY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la progresión exponencial con tope y el
 *           presupuesto total de sondeo.
 * =================================================================
 */

use std::time::Duration;

use sigilo_infra_hsm::{
    poll_delay, poll_delay_deterministic, POLL_BACKOFF_CAP_SECONDS, POLL_BUDGET_SECONDS,
};

#[test]
fn certify_exponential_progression_with_cap() {
    assert_eq!(poll_delay_deterministic(0), Duration::from_millis(1_000));
    assert_eq!(poll_delay_deterministic(1), Duration::from_millis(2_000));
    assert_eq!(poll_delay_deterministic(2), Duration::from_millis(4_000));
    assert_eq!(poll_delay_deterministic(3), Duration::from_millis(8_000));

    // Tope duro de 10 s a partir del cuarto intento.
    assert_eq!(poll_delay_deterministic(4), Duration::from_millis(10_000));
    assert_eq!(poll_delay_deterministic(10), Duration::from_millis(10_000));
    assert_eq!(poll_delay_deterministic(63), Duration::from_millis(10_000));
}

#[test]
fn certify_jittered_delay_stays_bounded() {
    for attempt in 0..12 {
        let deterministic = poll_delay_deterministic(attempt);
        let jittered = poll_delay(attempt);

        assert!(jittered >= deterministic);
        assert!(jittered < deterministic + Duration::from_millis(250));
    }
}

#[test]
fn certify_budget_constants() {
    assert_eq!(POLL_BUDGET_SECONDS, 60);
    assert_eq!(POLL_BACKOFF_CAP_SECONDS, 10);
}
