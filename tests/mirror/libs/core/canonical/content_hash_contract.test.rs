/**
 * =================================================================
 * APARATO: CONTENT HASH CONTRACT TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el formato del ancla y su parseo estricto.
 * =================================================================
 */

use sigilo_core_canonical::{content_hash, parse_content_hash, sha256_hex, ContentHashError, HashAlgorithm};

#[test]
fn certify_prefixed_anchor_roundtrip() {
    let anchor = content_hash(b"payload");
    let (algorithm, hex_digest) = parse_content_hash(&anchor).unwrap();

    assert_eq!(algorithm, HashAlgorithm::Sha256);
    assert_eq!(hex_digest, sha256_hex(b"payload"));
}

#[test]
fn certify_bare_hex_backward_compat() {
    let bare = sha256_hex(b"payload");
    let (algorithm, hex_digest) = parse_content_hash(&bare).unwrap();

    assert_eq!(algorithm, HashAlgorithm::Sha256);
    assert_eq!(hex_digest, bare);
}

#[test]
fn certify_uppercase_hex_is_normalized() {
    let lower = sha256_hex(b"payload");
    let upper = lower.to_ascii_uppercase();
    let (_, hex_digest) = parse_content_hash(&format!("SHA-256:{upper}")).unwrap();

    assert_eq!(hex_digest, lower);
}

#[test]
fn certify_foreign_algorithm_rejection() {
    let declared = format!("SHA-512:{}", "a".repeat(128));
    assert!(matches!(
        parse_content_hash(&declared),
        Err(ContentHashError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn certify_malformed_digests_rejection() {
    assert!(matches!(parse_content_hash(""), Err(ContentHashError::Empty)));
    assert!(matches!(
        parse_content_hash("SHA-256:zz"),
        Err(ContentHashError::WrongLength(2))
    ));
    let non_hex = format!("SHA-256:{}", "g".repeat(64));
    assert!(matches!(
        parse_content_hash(&non_hex),
        Err(ContentHashError::MalformedHex)
    ));
}
