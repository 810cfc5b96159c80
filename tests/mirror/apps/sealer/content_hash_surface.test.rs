/**
 * =================================================================
 * APARATO: CONTENT HASH SURFACE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la utilidad del lado generador: ancla
 *           canónica estable y trazabilidad de correlación.
 * =================================================================
 */

use axum::http::{HeaderMap, HeaderValue};
use serde_json::Value;

use sigilo_core_canonical::{canonicalize, content_hash, parse_content_hash};
use sigilo_sealer::routes::correlation_id_of;

#[test]
fn certify_generator_anchor_matches_auditor_expectation() {
    // El mismo Document Content debe producir el mismo ancla que el
    // auditor recomputa durante el vínculo criptográfico.
    let payload: Value =
        serde_json::from_str(r#"{"decision":"approved","id":"DEC-2026-0001"}"#).unwrap();

    let anchor = content_hash(&canonicalize(&payload).unwrap());

    let (algorithm, hex_digest) = parse_content_hash(&anchor).unwrap();
    assert_eq!(algorithm.label(), "SHA-256");
    assert_eq!(hex_digest.len(), 64);

    // Estabilidad frente a permutación de claves del generador.
    let shuffled: Value =
        serde_json::from_str(r#"{"id":"DEC-2026-0001","decision":"approved"}"#).unwrap();
    let shuffled_anchor = content_hash(&canonicalize(&shuffled).unwrap());
    assert_eq!(anchor, shuffled_anchor);
}

#[test]
fn certify_correlation_id_is_honored() {
    let mut headers = HeaderMap::new();
    headers.insert("X-Correlation-ID", HeaderValue::from_static("trace-abc-123"));

    assert_eq!(correlation_id_of(&headers), "trace-abc-123");
}

#[test]
fn certify_correlation_id_is_generated_when_absent_or_oversized() {
    let generated = correlation_id_of(&HeaderMap::new());
    assert_eq!(generated.len(), 36, "uuid v4 canónico");

    let mut headers = HeaderMap::new();
    let oversized = "x".repeat(200);
    headers.insert(
        "X-Correlation-ID",
        HeaderValue::from_str(&oversized).unwrap(),
    );
    let regenerated = correlation_id_of(&headers);
    assert_ne!(regenerated, oversized);
    assert_eq!(regenerated.len(), 36);
}
