/**
 * =================================================================
 * APARATO: FINDING IMMUTABILITY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la sustitución de valor completo y la señal
 *           de corte semántico.
 * =================================================================
 */

use serde_json::{json, Map, Value};

use sigilo_domain_models::{
    ConfidenceLevel, Finding, FindingCategory, FindingSource, FindingStatus, Severity,
};

fn sample_finding(metadata: Option<Map<String, Value>>) -> Finding {
    Finding {
        finding_id: "SDVP-P2-MAJOR-abc123def456".to_string(),
        source: FindingSource::SemanticAudit,
        protocol_id: Some("SDVP".to_string()),
        protocol_version: Some("1.2".to_string()),
        pass_id: Some("P2".to_string()),
        category: FindingCategory::Risk,
        severity: Severity::Major,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::Open,
        title: "Sample".to_string(),
        description: "Sample description".to_string(),
        why_it_matters: "Sample impact".to_string(),
        location: None,
        suggested_fix: None,
        metadata,
        requires_stv: false,
    }
}

#[test]
fn certify_status_change_is_whole_value_substitution() {
    let original = sample_finding(None);
    let resolved = original.with_status(FindingStatus::Resolved);

    assert_eq!(original.status, FindingStatus::Open, "El original no muta.");
    assert_eq!(resolved.status, FindingStatus::Resolved);
    assert_eq!(resolved.finding_id, original.finding_id);
    assert_eq!(resolved.title, original.title);
}

#[test]
fn certify_stop_condition_detection() {
    let mut stop_metadata = Map::new();
    stop_metadata.insert("stop_condition".to_string(), json!(true));

    assert!(sample_finding(Some(stop_metadata)).stop_condition());
    assert!(!sample_finding(None).stop_condition());

    let mut non_bool = Map::new();
    non_bool.insert("stop_condition".to_string(), json!("yes"));
    assert!(
        !sample_finding(Some(non_bool)).stop_condition(),
        "Solo un booleano literal dispara el corte."
    );
}

#[test]
fn certify_fatality_is_critical_only() {
    let mut finding = sample_finding(None);
    assert!(!finding.is_fatal());

    finding.severity = Severity::Critical;
    assert!(finding.is_fatal());
}

#[test]
fn certify_wire_format_round_trip() {
    let finding = sample_finding(None);
    let rendered = serde_json::to_value(&finding).unwrap();

    assert_eq!(rendered["source"], "semantic_audit");
    assert_eq!(rendered["severity"], "major");
    assert_eq!(rendered["status"], "open");
    assert_eq!(rendered["requires_stv"], false);

    let reparsed: Finding = serde_json::from_value(rendered).unwrap();
    assert_eq!(reparsed, finding);
}
