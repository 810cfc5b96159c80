// [libs/domain/audit/src/stv/mod.rs]
/*!
 * =================================================================
 * APARATO: SEAL TRUST VERIFICATION (V6.0)
 * CLASIFICACIÓN: DOMAIN / STV (ESTRATO L2)
 * RESPONSABILIDAD: PUERTA CRIPTOGRÁFICA DEL SELLO
 *
 * Evalúa QUIÉN selló y CUÁNDO, con independencia total del contenido
 * del documento. Consume las raíces de confianza como entrada externa
 * (el core no posee almacén de confianza propio) y usa el material
 * LTV del /DSS para validación en tiempo pasado.
 *
 * DETERMINISMO CRÍTICO: un diff DocMDP sin conclusión (None) se trata
 * como FALLO, jamás como aprobación inconclusa. Es la rama más
 * sensible de todo el subsistema.
 * =================================================================
 */

pub mod validator;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use sigilo_core_pdf::PdfDocument;
use sigilo_domain_models::{Finding, SealTrustResult, Severity};

use crate::findings::stv_finding;

/// Solicitud de validación AdES-LTA.
pub struct ValidationRequest<'a> {
    pub pdf_bytes: &'a [u8],
    /// Raíces de confianza en DER, suministradas externamente.
    pub trust_roots_der: &'a [Vec<u8>],
}

/// Veredicto del validador AdES-LTA.
#[derive(Debug, Clone)]
pub struct AdesVerdict {
    /// Aritmética CMS correcta (digest del ByteRange + firma RSA).
    pub signature_valid: bool,
    /// La cadena del firmante termina en una raíz confiable.
    pub chain_trusted: bool,
    /// Información de revocación presente y limpia para hoja e
    /// intermedios (política hard-fail).
    pub revocation_ok: bool,
    /// Sello de tiempo documental: cubre la certificación y su propia
    /// cadena valida. None cuando no hay sello.
    pub timestamp_ok: Option<bool>,
    /// Diff DocMDP ternario: Some(true) dentro del alcance /P,
    /// Some(false) lo excede, None sin conclusión.
    pub docmdp_ok: Option<bool>,
    /// Diagnóstico libre (prosa, no autoritativo).
    pub diagnostics: Vec<String>,
}

/// Clasificación de fallos del validador.
#[derive(Debug, Clone)]
pub enum ValidatorFailure {
    /// El motor no produjo estado alguno.
    EngineFailure(String),
    /// PDF malformado durante la verificación.
    MalformedPdf(String),
    /// El CMS o la firma fueron rechazados estructuralmente.
    CmsRejected(String),
}

/// Costura del validador AdES-LTA (capacidad inyectable).
pub trait AdesValidator: Send + Sync {
    fn validate(&self, request: &ValidationRequest<'_>) -> Result<AdesVerdict, ValidatorFailure>;
}

/// Subsistema de verificación de confianza del sello.
pub struct SealTrustVerification {
    validator: Arc<dyn AdesValidator>,
    trust_roots_der: Vec<Vec<u8>>,
}

impl SealTrustVerification {
    pub fn new(validator: Arc<dyn AdesValidator>, trust_roots_der: Vec<Vec<u8>>) -> Self {
        Self {
            validator,
            trust_roots_der,
        }
    }

    /// Ejecuta la verificación y resuelve los hallazgos AIA diferidos.
    #[instrument(skip(self, pdf_bytes, aia_findings))]
    pub fn run(&self, pdf_bytes: &[u8], aia_findings: &[Finding]) -> SealTrustResult {
        let mut findings: Vec<Finding> = Vec::new();
        let mut resolved_aia_finding_ids: Vec<String> = Vec::new();

        // --------------------------------------------------------------
        // 1. Presencia de firmas
        // --------------------------------------------------------------
        let signatures_present = match PdfDocument::parse(pdf_bytes) {
            Ok(document) => !document.signature_fields().is_empty(),
            Err(parse_fault) => {
                findings.push(stv_finding(
                    "STV-CRIT-005",
                    Severity::Critical,
                    "Artifact unparseable during seal verification",
                    parse_fault.to_string(),
                    "A malformed container prevents any cryptographic statement about \
                     its seal.",
                ));
                return untrusted(findings);
            }
        };

        if !signatures_present {
            findings.push(stv_finding(
                "STV-CRIT-001",
                Severity::Critical,
                "No embedded signatures present",
                "The artifact carries no signature fields; there is no seal to verify."
                    .to_string(),
                "An unsealed artifact provides no cryptographic origin or integrity \
                 guarantees.",
            ));
            return untrusted(findings);
        }

        // --------------------------------------------------------------
        // 2-4. Validación AdES-LTA
        // --------------------------------------------------------------
        let request = ValidationRequest {
            pdf_bytes,
            trust_roots_der: &self.trust_roots_der,
        };

        let verdict = match self.validator.validate(&request) {
            Ok(verdict) => verdict,
            Err(ValidatorFailure::EngineFailure(detail)) => {
                findings.push(stv_finding(
                    "STV-CRIT-002",
                    Severity::Critical,
                    "Seal validation engine produced no status",
                    detail,
                    "Without a validation status the seal cannot be trusted.",
                ));
                return untrusted(findings);
            }
            Err(ValidatorFailure::MalformedPdf(detail)) => {
                findings.push(stv_finding(
                    "STV-CRIT-005",
                    Severity::Critical,
                    "Artifact malformed during seal verification",
                    detail,
                    "A malformed container prevents any cryptographic statement about \
                     its seal.",
                ));
                return untrusted(findings);
            }
            Err(ValidatorFailure::CmsRejected(detail)) => {
                findings.push(stv_finding(
                    "STV-CRIT-006",
                    Severity::Critical,
                    "CMS signature rejected by the validator",
                    detail,
                    "A structurally rejected signature provides no trust anchor.",
                ));
                return untrusted(findings);
            }
        };

        let seal_trusted = verdict.signature_valid
            && verdict.chain_trusted
            && verdict.revocation_ok
            && verdict.timestamp_ok.unwrap_or(true);

        if !seal_trusted {
            findings.push(stv_finding(
                "STV-CRIT-002",
                Severity::Critical,
                "Seal signature invalid or untrusted",
                format!(
                    "signature_valid={}, chain_trusted={}, revocation_ok={}, \
                     timestamp_ok={:?}: {}",
                    verdict.signature_valid,
                    verdict.chain_trusted,
                    verdict.revocation_ok,
                    verdict.timestamp_ok,
                    verdict.diagnostics.join("; ")
                ),
                "A seal that fails arithmetic, chain, revocation or timestamp \
                 verification cannot anchor trust.",
            ));
            return untrusted(findings);
        }

        // --------------------------------------------------------------
        // 5. Resolución de AIA-MAJ-008 (rama de seguridad crítica)
        // --------------------------------------------------------------
        let deferred_present = aia_findings
            .iter()
            .any(|finding| finding.finding_id == "AIA-MAJ-008");

        if deferred_present {
            match verdict.docmdp_ok {
                // Resolución SOLO ante un Some(true) exacto.
                Some(true) => {
                    resolved_aia_finding_ids.push("AIA-MAJ-008".to_string());
                    info!("🔓 [STV]: AIA-MAJ-008 cryptographically resolved (DocMDP in scope)");
                }
                other => {
                    warn!("⛔ [STV]: DocMDP diff verdict {:?} — refusing resolution", other);
                    findings.push(stv_finding(
                        "STV-CRIT-003",
                        Severity::Critical,
                        "Unauthorized post-signing modification",
                        format!(
                            "Incremental modifications after the certification signature \
                             could not be confirmed within the DocMDP permission scope \
                             (diff verdict: {other:?}). An inconclusive diff is treated \
                             as failure."
                        ),
                        "Post-signing changes outside the DocMDP scope invalidate the \
                         seal's modification guarantees.",
                    ));
                    return untrusted(findings);
                }
            }
        }

        info!("🛡️  [STV]: seal trusted");
        SealTrustResult::new(true, Some(true), findings, resolved_aia_finding_ids)
            .expect("invariant violation: trusted STV result rejected its own shape")
    }
}

fn untrusted(findings: Vec<Finding>) -> SealTrustResult {
    SealTrustResult::new(true, Some(false), findings, Vec::new())
        .expect("invariant violation: untrusted STV result rejected its own shape")
}
