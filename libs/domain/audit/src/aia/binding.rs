// [libs/domain/audit/src/aia/binding.rs]
/*!
 * =================================================================
 * APARATO: CRYPTOGRAPHIC BINDING CHECK (V6.0)
 * CLASIFICACIÓN: DOMAIN / AIA (ESTRATO L2)
 * RESPONSABILIDAD: VÍNCULO DETERMINISTA CONTENIDO ↔ ANCLA DECLARADA
 *
 * Verificación determinista y no-probabilística: canoniza el Document
 * Content extraído, computa SHA-256 y lo compara contra el ancla
 * declarada en bindings. Aquí no hay firma criptográfica; el vínculo
 * es la correspondencia exacta de digests.
 * =================================================================
 */

use serde_json::Value;

use sigilo_core_canonical::{canonicalize, parse_content_hash, sha256_hex};
use sigilo_domain_models::{Finding, FindingCategory, Severity};

use crate::findings::aia_finding;

/// Ejecuta la verificación de vínculo criptográfico.
pub fn run_cryptographic_binding_checks(
    document_content: Option<&Value>,
    bindings: Option<&Value>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    // --------------------------------------------------------------
    // Precondiciones de material
    // --------------------------------------------------------------
    let Some(content) = document_content else {
        findings.push(aia_finding(
            "AIA-CRIT-030",
            FindingCategory::Structure,
            Severity::Critical,
            "Document Content unavailable for binding",
            "The authoritative Document Content is missing; binding verification cannot \
             be performed."
                .to_string(),
            "Without the embedded Document Content there is nothing to bind the declared \
             integrity anchor against.",
        ));
        return findings;
    };

    let Some(bindings_object) = bindings.and_then(Value::as_object) else {
        findings.push(aia_finding(
            "AIA-CRIT-031",
            FindingCategory::Compliance,
            Severity::Critical,
            "Bindings unavailable for verification",
            "No supplemental bindings object (bindings.json) was extracted from the \
             artifact."
                .to_string(),
            "The declared content hash travels in the bindings; without it the integrity \
             anchor cannot be verified.",
        ));
        return findings;
    };

    // --------------------------------------------------------------
    // Ancla declarada
    // --------------------------------------------------------------
    let declared = bindings_object
        .get("content_hash")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");

    if declared.is_empty() {
        findings.push(aia_finding(
            "AIA-CRIT-032",
            FindingCategory::Compliance,
            Severity::Critical,
            "Declared content hash missing or empty",
            "The bindings object does not declare a usable content_hash.".to_string(),
            "An absent integrity anchor makes the artifact unverifiable.",
        ));
        return findings;
    }

    let declared_hex = match parse_content_hash(declared) {
        Ok((_algorithm, hex_digest)) => hex_digest,
        Err(parse_fault) => {
            findings.push(aia_finding(
                "AIA-CRIT-035",
                FindingCategory::Compliance,
                Severity::Critical,
                "Declared content hash has unsupported format",
                format!("The declared content hash could not be parsed: {parse_fault}"),
                "Only SHA-256 anchors are supported; any other declaration is \
                 unverifiable.",
            ));
            return findings;
        }
    };

    // --------------------------------------------------------------
    // Canonización y comparación
    // --------------------------------------------------------------
    let canonical_bytes = match canonicalize(content) {
        Ok(bytes) => bytes,
        Err(canonical_fault) => {
            findings.push(aia_finding(
                "AIA-CRIT-033",
                FindingCategory::Compliance,
                Severity::Critical,
                "Document Content canonicalization failed",
                format!("Deterministic canonicalization failed: {canonical_fault}"),
                "A stable content hash requires deterministic canonicalization; failure \
                 here prevents integrity verification.",
            ));
            return findings;
        }
    };

    let computed_hex = sha256_hex(&canonical_bytes);

    if computed_hex != declared_hex {
        findings.push(aia_finding(
            "AIA-CRIT-034",
            FindingCategory::Compliance,
            Severity::Critical,
            "Content hash mismatch",
            "The SHA-256 of the canonicalized Document Content does not match the \
             declared content hash."
                .to_string(),
            "A hash mismatch indicates divergence between the artifact's embedded data \
             and its declared binding, invalidating content integrity.",
        ));
    }

    findings
}
