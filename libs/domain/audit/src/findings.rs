// [libs/domain/audit/src/findings.rs]
//! =================================================================
//! APARATO: AUDIT FINDING FORGE (V3.0)
//! RESPONSABILIDAD: CONSTRUCCIÓN UNIFORME DE HALLAZGOS DEL AUDITOR
//!
//! Los hallazgos del auditor determinista portan IDs literales del
//! catálogo (AIA-*, STV-*): su identidad está en el catálogo, no en
//! material hasheado.
//! =================================================================

use sigilo_domain_models::{
    ConfidenceLevel, Finding, FindingCategory, FindingSource, FindingStatus, Severity,
};

pub(crate) fn aia_finding(
    finding_id: &str,
    category: FindingCategory,
    severity: Severity,
    title: &str,
    description: String,
    why_it_matters: &str,
) -> Finding {
    Finding {
        finding_id: finding_id.to_string(),
        source: FindingSource::ArtifactIntegrity,
        protocol_id: None,
        protocol_version: None,
        pass_id: None,
        category,
        severity,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::Open,
        title: title.to_string(),
        description,
        why_it_matters: why_it_matters.to_string(),
        location: None,
        suggested_fix: None,
        metadata: None,
        requires_stv: false,
    }
}

/// Observación estructural diferida a STV: MAJOR, marcada para
/// revisión humana, no fatal en AIA.
pub(crate) fn aia_stv_deferred_finding(
    finding_id: &str,
    title: &str,
    description: String,
    why_it_matters: &str,
) -> Finding {
    Finding {
        status: FindingStatus::FlaggedForHumanReview,
        severity: Severity::Major,
        requires_stv: true,
        ..aia_finding(
            finding_id,
            FindingCategory::Structure,
            Severity::Major,
            title,
            description,
            why_it_matters,
        )
    }
}

pub(crate) fn stv_finding(
    finding_id: &str,
    severity: Severity,
    title: &str,
    description: String,
    why_it_matters: &str,
) -> Finding {
    Finding {
        finding_id: finding_id.to_string(),
        source: FindingSource::SealTrust,
        protocol_id: None,
        protocol_version: None,
        pass_id: None,
        category: FindingCategory::Compliance,
        severity,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::Open,
        title: title.to_string(),
        description,
        why_it_matters: why_it_matters.to_string(),
        location: None,
        suggested_fix: None,
        metadata: None,
        requires_stv: false,
    }
}
