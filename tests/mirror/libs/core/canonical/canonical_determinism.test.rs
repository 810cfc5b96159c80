/**
 * =================================================================
 * APARATO: CANONICAL DETERMINISM TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar determinismo byte-exacto e invarianza de
 *           permutación de claves del códec canónico.
 * =================================================================
 */

use proptest::prelude::*;
use serde_json::Value;

use sigilo_core_canonical::{canonicalize, content_hash, sha256_hex};

#[test]
fn certify_identical_content_yields_identical_bytes() {
    let payload: Value =
        serde_json::from_str(r#"{"decision":"approved","id":"DEC-2026-0001"}"#).unwrap();

    let first = canonicalize(&payload).unwrap();
    let second = canonicalize(&payload).unwrap();

    assert_eq!(first, second, "El códec debe ser una función pura.");
}

#[test]
fn certify_key_order_permutations_are_byte_identical() {
    let ordered: Value = serde_json::from_str(
        r#"{"document_type":"service_agreement","parties":{"customer":"Globex","provider":"Acme"},"terms":{"payment":{"amount":"1000","currency":"USD"}}}"#,
    )
    .unwrap();
    let shuffled: Value = serde_json::from_str(
        r#"{"terms":{"payment":{"currency":"USD","amount":"1000"}},"parties":{"provider":"Acme","customer":"Globex"},"document_type":"service_agreement"}"#,
    )
    .unwrap();

    assert_eq!(
        canonicalize(&ordered).unwrap(),
        canonicalize(&shuffled).unwrap(),
        "Las permutaciones de orden de claves deben colapsar al mismo flujo."
    );
}

#[test]
fn certify_output_grammar_is_minimal_and_sorted() {
    let payload: Value = serde_json::from_str(r#"{"b": 1, "a": [true, null, "x"]}"#).unwrap();
    let bytes = canonicalize(&payload).unwrap();

    assert_eq!(bytes, br#"{"a":[true,null,"x"],"b":1}"#.to_vec());
}

#[test]
fn certify_decimal_tokens_survive_verbatim() {
    let payload: Value =
        serde_json::from_str(r#"{"amount":1000.50,"rate":0.0750,"count":42}"#).unwrap();
    let bytes = canonicalize(&payload).unwrap();
    let rendered = String::from_utf8(bytes).unwrap();

    assert!(rendered.contains("1000.50"), "Precisión decimal perdida: {rendered}");
    assert!(rendered.contains("0.0750"), "Precisión decimal perdida: {rendered}");
}

#[test]
fn certify_non_ascii_is_preserved_unescaped() {
    let payload: Value = serde_json::from_str(r#"{"título":"señal única"}"#).unwrap();
    let rendered = String::from_utf8(canonicalize(&payload).unwrap()).unwrap();

    assert_eq!(rendered, "{\"título\":\"señal única\"}");
}

#[test]
fn certify_anchor_binds_to_canonical_bytes() {
    let payload: Value =
        serde_json::from_str(r#"{"decision":"approved","id":"DEC-2026-0001"}"#).unwrap();
    let bytes = canonicalize(&payload).unwrap();

    let anchor = content_hash(&bytes);
    assert_eq!(anchor, format!("SHA-256:{}", sha256_hex(&bytes)));
}

// ---------------------------------------------------------------------
// Propiedad: toda permutación de inserción colapsa al mismo flujo
// ---------------------------------------------------------------------

proptest! {
    #[test]
    fn property_insertion_order_never_leaks(
        pairs in proptest::collection::btree_map("[a-z]{1,8}", 0i64..10_000, 1..12)
    ) {
        let entries: Vec<(String, i64)> = pairs.into_iter().collect();

        let forward = format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(key, value)| format!("\"{key}\":{value}"))
                .collect::<Vec<_>>()
                .join(",")
        );
        let reversed = format!(
            "{{{}}}",
            entries
                .iter()
                .rev()
                .map(|(key, value)| format!("\"{key}\":{value}"))
                .collect::<Vec<_>>()
                .join(",")
        );

        let forward_value: Value = serde_json::from_str(&forward).unwrap();
        let reversed_value: Value = serde_json::from_str(&reversed).unwrap();

        prop_assert_eq!(
            canonicalize(&forward_value).unwrap(),
            canonicalize(&reversed_value).unwrap()
        );
    }
}
