/**
 * =================================================================
 * APARATO: STABLE FINDING IDS TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la identidad determinista de hallazgos:
 *           estable entre corridas, invariante al orden de claves,
 *           sensible a ubicación y payload.
 * =================================================================
 */

use serde_json::Value;

use sigilo_domain_models::{ConfidenceLevel, FindingCategory, Severity};
use sigilo_domain_semantic::{AdapterError, FailureKind, ProtocolFindingAdapter, RawSemanticFinding};

fn base_payload() -> Value {
    serde_json::from_str(
        r#"{"document_type":"service_agreement","parties":{"customer":"Globex Ltd","provider":"Acme Corp"},"terms":{"payment":{"amount":"1000","currency":"USD"}}}"#,
    )
    .unwrap()
}

fn raw_finding(location: Option<&str>, rule_id: &str) -> RawSemanticFinding {
    RawSemanticFinding {
        rule_id: rule_id.to_string(),
        title: "Test finding".to_string(),
        description: "Test description".to_string(),
        why_it_matters: "Test impact".to_string(),
        category: FindingCategory::Risk,
        severity: Severity::Major,
        confidence: ConfidenceLevel::High,
        location: location.map(str::to_string),
        suggested_fix: None,
        metadata: None,
    }
}

fn adapter() -> ProtocolFindingAdapter {
    ProtocolFindingAdapter::new("SDVP", "1.2", "P7")
}

#[test]
fn certify_identity_is_deterministic_across_runs() {
    let first = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &base_payload())
        .unwrap();
    let second = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &base_payload())
        .unwrap();

    assert_eq!(first.finding_id, second.finding_id);
}

#[test]
fn certify_identity_is_invariant_to_json_key_order() {
    let shuffled: Value = serde_json::from_str(
        r#"{"terms":{"payment":{"currency":"USD","amount":"1000"}},"parties":{"provider":"Acme Corp","customer":"Globex Ltd"},"document_type":"service_agreement"}"#,
    )
    .unwrap();

    let ordered_id = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &base_payload())
        .unwrap()
        .finding_id;
    let shuffled_id = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &shuffled)
        .unwrap()
        .finding_id;

    assert_eq!(ordered_id, shuffled_id);
}

#[test]
fn certify_identity_changes_with_location() {
    let first = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &base_payload())
        .unwrap();
    let second = adapter()
        .adapt(&raw_finding(Some("Section 9.1"), "R_TEST"), &base_payload())
        .unwrap();

    assert_ne!(first.finding_id, second.finding_id);
}

#[test]
fn certify_identity_changes_with_payload() {
    let mut modified = base_payload();
    modified["terms"]["payment"]["amount"] = Value::String("2000".to_string());

    let first = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &base_payload())
        .unwrap();
    let second = adapter()
        .adapt(&raw_finding(Some("Section 5.2"), "R_TEST"), &modified)
        .unwrap();

    assert_ne!(first.finding_id, second.finding_id);
}

#[test]
fn certify_identity_changes_with_rule() {
    let first = adapter()
        .adapt(&raw_finding(None, "R_ALPHA"), &base_payload())
        .unwrap();
    let second = adapter()
        .adapt(&raw_finding(None, "R_BETA"), &base_payload())
        .unwrap();

    assert_ne!(first.finding_id, second.finding_id);
}

#[test]
fn certify_rule_id_is_mandatory() {
    let outcome = adapter().adapt(&raw_finding(None, "  "), &base_payload());
    assert!(matches!(outcome, Err(AdapterError::MissingRuleId(_))));
}

#[test]
fn certify_identity_shape_and_metadata_rule_echo() {
    let finding = adapter()
        .adapt(&raw_finding(None, "R_TEST"), &base_payload())
        .unwrap();

    assert!(finding.finding_id.starts_with("SDVP-P7-MAJOR-"));
    assert_eq!(finding.protocol_id.as_deref(), Some("SDVP"));
    assert_eq!(finding.pass_id.as_deref(), Some("P7"));
    assert_eq!(
        finding
            .metadata
            .as_ref()
            .and_then(|m| m.get("rule_id"))
            .and_then(Value::as_str),
        Some("R_TEST")
    );
}

#[test]
fn certify_execution_failure_identity_depends_only_on_failure_type() {
    let timeout_a = adapter().adapt_execution_failure(FailureKind::Timeout);
    let timeout_b = adapter().adapt_execution_failure(FailureKind::Timeout);
    let refusal = adapter().adapt_execution_failure(FailureKind::Refusal);

    assert_eq!(timeout_a.finding_id, timeout_b.finding_id);
    assert_ne!(timeout_a.finding_id, refusal.finding_id);
    assert!(timeout_a.finding_id.starts_with("SDVP-P7-EXECUTION-"));
}
