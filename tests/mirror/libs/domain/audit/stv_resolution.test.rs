/**
 * =================================================================
 * APARATO: STV RESOLUTION MATRIX TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la clasificación de fallos del verificador y
 *           la rama de seguridad crítica: el diff DocMDP ternario
 *           solo resuelve AIA-MAJ-008 ante un Some(true) exacto.
 * =================================================================
 */

use std::sync::Arc;

use sigilo_core_pdf::ArtifactFactory;
use sigilo_domain_audit::{
    AdesValidator, AdesVerdict, SealTrustVerification, ValidationRequest, ValidatorFailure,
};
use sigilo_domain_models::{
    ConfidenceLevel, Finding, FindingCategory, FindingSource, FindingStatus, Severity,
};

// ---------------------------------------------------------------------
// Dobles de verificación
// ---------------------------------------------------------------------

struct StubValidator {
    verdict: AdesVerdict,
}

impl AdesValidator for StubValidator {
    fn validate(&self, _request: &ValidationRequest<'_>) -> Result<AdesVerdict, ValidatorFailure> {
        Ok(self.verdict.clone())
    }
}

struct FailingValidator {
    failure: ValidatorFailure,
}

impl AdesValidator for FailingValidator {
    fn validate(&self, _request: &ValidationRequest<'_>) -> Result<AdesVerdict, ValidatorFailure> {
        Err(self.failure.clone())
    }
}

fn trusted_verdict(docmdp_ok: Option<bool>) -> AdesVerdict {
    AdesVerdict {
        signature_valid: true,
        chain_trusted: true,
        revocation_ok: true,
        timestamp_ok: Some(true),
        docmdp_ok,
        diagnostics: Vec::new(),
    }
}

fn deferred_finding() -> Finding {
    Finding {
        finding_id: "AIA-MAJ-008".to_string(),
        source: FindingSource::ArtifactIntegrity,
        protocol_id: None,
        protocol_version: None,
        pass_id: None,
        category: FindingCategory::Structure,
        severity: Severity::Major,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::FlaggedForHumanReview,
        title: "Bytes outside the final signature coverage".to_string(),
        description: "post-signing bytes".to_string(),
        why_it_matters: "unresolved bytes".to_string(),
        location: None,
        suggested_fix: None,
        metadata: None,
        requires_stv: true,
    }
}

fn sealed_artifact() -> Vec<u8> {
    ArtifactFactory::new(br#"{"id":"DOC-1"}"#.to_vec()).build_with_dummy_certification(2)
}

fn stv_with(validator: impl AdesValidator + 'static) -> SealTrustVerification {
    SealTrustVerification::new(Arc::new(validator), Vec::new())
}

fn ids(result: &sigilo_domain_models::SealTrustResult) -> Vec<&str> {
    result
        .findings
        .iter()
        .map(|f| f.finding_id.as_str())
        .collect()
}

// ---------------------------------------------------------------------
// Matriz de resolución
// ---------------------------------------------------------------------

#[test]
fn certify_exact_true_docmdp_resolves_the_deferred_finding() {
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(Some(true)),
    });

    let result = stv.run(&sealed_artifact(), &[deferred_finding()]);

    assert_eq!(result.trusted, Some(true));
    assert_eq!(result.resolved_aia_finding_ids, vec!["AIA-MAJ-008"]);
    assert!(result.findings.is_empty());
}

#[test]
fn certify_inconclusive_docmdp_is_failure_not_pass() {
    // LA RAMA MÁS CRÍTICA: None JAMÁS es aprobación inconclusa.
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(None),
    });

    let result = stv.run(&sealed_artifact(), &[deferred_finding()]);

    assert_eq!(result.trusted, Some(false));
    assert!(result.resolved_aia_finding_ids.is_empty());
    assert!(ids(&result).contains(&"STV-CRIT-003"));
}

#[test]
fn certify_out_of_scope_docmdp_fails() {
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(Some(false)),
    });

    let result = stv.run(&sealed_artifact(), &[deferred_finding()]);

    assert_eq!(result.trusted, Some(false));
    assert!(result.resolved_aia_finding_ids.is_empty());
    assert!(ids(&result).contains(&"STV-CRIT-003"));
}

#[test]
fn certify_no_deferred_finding_skips_docmdp_gate() {
    // Sin AIA-MAJ-008 presente, un diff inconcluso no contamina.
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(None),
    });

    let result = stv.run(&sealed_artifact(), &[]);

    assert_eq!(result.trusted, Some(true));
    assert!(result.resolved_aia_finding_ids.is_empty());
}

// ---------------------------------------------------------------------
// Clasificación de fallos
// ---------------------------------------------------------------------

#[test]
fn certify_unsigned_artifact_yields_stv_crit_001() {
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(Some(true)),
    });
    let unsigned = ArtifactFactory::new(br#"{"id":"DOC-1"}"#.to_vec()).build();

    let result = stv.run(&unsigned, &[]);

    assert_eq!(result.trusted, Some(false));
    assert_eq!(ids(&result), vec!["STV-CRIT-001"]);
}

#[test]
fn certify_unparseable_artifact_yields_stv_crit_005() {
    let stv = stv_with(StubValidator {
        verdict: trusted_verdict(Some(true)),
    });

    let result = stv.run(b"not a pdf", &[]);
    assert_eq!(ids(&result), vec!["STV-CRIT-005"]);
}

#[test]
fn certify_engine_failure_yields_stv_crit_002() {
    let stv = stv_with(FailingValidator {
        failure: ValidatorFailure::EngineFailure("no status produced".to_string()),
    });

    let result = stv.run(&sealed_artifact(), &[]);
    assert_eq!(ids(&result), vec!["STV-CRIT-002"]);
    assert_eq!(result.trusted, Some(false));
}

#[test]
fn certify_cms_rejection_yields_stv_crit_006() {
    let stv = stv_with(FailingValidator {
        failure: ValidatorFailure::CmsRejected("mangled SignedData".to_string()),
    });

    let result = stv.run(&sealed_artifact(), &[]);
    assert_eq!(ids(&result), vec!["STV-CRIT-006"]);
}

#[test]
fn certify_untrusted_verdict_yields_stv_crit_002() {
    let mut verdict = trusted_verdict(Some(true));
    verdict.chain_trusted = false;

    let stv = stv_with(StubValidator { verdict });
    let result = stv.run(&sealed_artifact(), &[deferred_finding()]);

    assert_eq!(result.trusted, Some(false));
    assert_eq!(ids(&result), vec!["STV-CRIT-002"]);
    assert!(result.resolved_aia_finding_ids.is_empty());
}
