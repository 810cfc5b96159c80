// [libs/domain/audit/src/coordinator.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR COORDINATOR (V6.0 - DUMB AUTHORITY)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: CONTROL DE TRÁFICO DEL PIPELINE DE AUDITORÍA
 *
 * El coordinador es una AUTORIDAD MUDA. NO DEBE:
 * - inspeccionar el Document Content
 * - interpretar la prosa de los hallazgos
 * - aplicar heurísticas o inteligencia
 *
 * SUS ÚNICAS RESPONSABILIDADES:
 * - imponer el orden de ejecución (AIA → gate STV → semántica → STV)
 * - imponer fronteras de confianza (gate de hallazgos requires_stv)
 * - reescritura por sustitución de valor completo de hallazgos
 *   resueltos por STV
 * - agregación del VerificationReport inmutable
 * =================================================================
 */

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use sigilo_domain_models::{
    ArtifactIntegrityResult, AuditEvent, AuditEventType, AuditStatus, ConfidenceLevel,
    DeliveryRecommendation, EventBus, Finding, FindingCategory, FindingSource, FindingStatus,
    SealTrustResult, SemanticAuditResult, Severity, VerificationReport,
};

use crate::aia::ArtifactIntegrityAudit;
use crate::config::AuditorConfig;
use crate::stv::SealTrustVerification;

/// Entradas de la corrida semántica (derivadas de señales AIA).
pub struct SemanticRunInputs<'a> {
    pub audit_id: &'a str,
    pub document_content: &'a Value,
    pub content_derived_text: &'a str,
    pub visible_text: &'a str,
    pub bus: EventBus,
}

/// Costura del protocolo semántico: el coordinador no conoce pases ni
/// prompts, solo el contrato del resultado agregado.
pub trait SemanticAuditRunner: Send + Sync {
    fn run<'a>(&'a self, inputs: SemanticRunInputs<'a>) -> BoxFuture<'a, SemanticAuditResult>;
}

/// Señales consultivas con significado de control (conjunto acotado).
const SIGNAL_DELIVERY_NOT_RECOMMENDED: &str = "DELIVERY_NOT_RECOMMENDED";
const SIGNAL_DELIVERY_REVIEW_REQUIRED: &str = "DELIVERY_REVIEW_REQUIRED";

/// Coordinador central de verificación.
pub struct AuditorCoordinator {
    config: AuditorConfig,
    semantic: Option<Arc<dyn SemanticAuditRunner>>,
    seal_trust: Option<Arc<SealTrustVerification>>,
}

impl AuditorCoordinator {
    pub fn new(
        config: AuditorConfig,
        semantic: Option<Arc<dyn SemanticAuditRunner>>,
        seal_trust: Option<Arc<SealTrustVerification>>,
    ) -> Self {
        Self {
            config,
            semantic,
            seal_trust,
        }
    }

    /// Ejecuta el pipeline completo para un artefacto finalizado.
    #[instrument(skip(self, pdf_bytes, bus))]
    pub async fn run_audit(
        &self,
        pdf_bytes: &[u8],
        audit_id: &str,
        bus: EventBus,
    ) -> VerificationReport {
        bus.emit(AuditEvent::new(audit_id, AuditEventType::AuditStarted, None));

        // --------------------------------------------------------------
        // 1. Artifact Integrity Audit (raíz de confianza)
        // --------------------------------------------------------------
        bus.emit(AuditEvent::new(audit_id, AuditEventType::AiaStarted, None));

        let aia_result = if self.config.enable_artifact_integrity_audit {
            ArtifactIntegrityAudit::run(pdf_bytes)
        } else {
            ArtifactIntegrityResult::failed(Vec::new(), vec![integrity_audit_disabled_finding()])
        };

        bus.emit(AuditEvent::new(
            audit_id,
            AuditEventType::AiaCompleted,
            Some(event_details(&[
                ("passed", Value::Bool(aia_result.passed)),
                (
                    "findings",
                    Value::Number(aia_result.findings.len().into()),
                ),
            ])),
        ));

        let mut all_findings: Vec<Finding> = aia_result.findings.clone();

        if !aia_result.passed {
            // HARD STOP: ningún análisis descendente está permitido.
            return self.finalize(
                audit_id,
                AuditStatus::Fail,
                DeliveryRecommendation::NotReady,
                aia_result,
                SemanticAuditResult::not_executed(),
                SealTrustResult::not_executed(),
                all_findings,
                &bus,
            );
        }

        // --------------------------------------------------------------
        // 2. Gate de observaciones diferidas a STV
        // --------------------------------------------------------------
        let stv_required: Vec<&Finding> = aia_result
            .findings
            .iter()
            .filter(|finding| finding.requires_stv)
            .collect();

        if !stv_required.is_empty()
            && (self.seal_trust.is_none() || !self.config.enable_seal_trust_verification)
        {
            // Emitir veredicto sobre un PDF con observaciones
            // estructurales sin resolver sería infundado.
            all_findings.push(stv_required_gate_finding(stv_required.len()));
            return self.finalize(
                audit_id,
                AuditStatus::Fail,
                DeliveryRecommendation::NotReady,
                aia_result,
                SemanticAuditResult::not_executed(),
                SealTrustResult::not_executed(),
                all_findings,
                &bus,
            );
        }

        // --------------------------------------------------------------
        // 3. Auditoría semántica (consultiva; JAMÁS gatea estado)
        // --------------------------------------------------------------
        let semantic_result = match (&self.semantic, self.config.enable_semantic_audit) {
            (Some(runner), true) => {
                bus.emit(AuditEvent::new(
                    audit_id,
                    AuditEventType::SemanticAuditStarted,
                    None,
                ));

                let result = runner
                    .run(SemanticRunInputs {
                        audit_id,
                        document_content: aia_result
                            .document_content
                            .as_ref()
                            .expect("passed AIA carries document content"),
                        content_derived_text: aia_result
                            .content_derived_text
                            .as_deref()
                            .expect("passed AIA carries derived text"),
                        visible_text: aia_result
                            .visible_text
                            .as_deref()
                            .expect("passed AIA carries visible text"),
                        bus: bus.clone(),
                    })
                    .await;

                bus.emit(AuditEvent::new(
                    audit_id,
                    AuditEventType::SemanticAuditCompleted,
                    Some(event_details(&[(
                        "findings",
                        Value::Number(result.findings.len().into()),
                    )])),
                ));

                result
            }
            _ => SemanticAuditResult::not_executed(),
        };

        all_findings.extend(semantic_result.findings.iter().cloned());

        // --------------------------------------------------------------
        // 4. Seal Trust Verification + resolución de hallazgos AIA
        // --------------------------------------------------------------
        let (aia_result, seal_trust_result, mut all_findings) =
            match (&self.seal_trust, self.config.enable_seal_trust_verification) {
                (Some(seal_trust), true) => {
                    bus.emit(AuditEvent::new(
                        audit_id,
                        AuditEventType::SealTrustStarted,
                        None,
                    ));

                    let stv_result = seal_trust.run(pdf_bytes, &aia_result.findings);

                    bus.emit(AuditEvent::new(
                        audit_id,
                        AuditEventType::SealTrustCompleted,
                        Some(event_details(&[(
                            "trusted",
                            stv_result
                                .trusted
                                .map(Value::Bool)
                                .unwrap_or(Value::Null),
                        )])),
                    ));

                    all_findings.extend(stv_result.findings.iter().cloned());

                    // Reescritura por sustitución de valor completo.
                    let resolved_ids = &stv_result.resolved_aia_finding_ids;
                    let rewritten_aia = rewrite_resolved(aia_result, resolved_ids);
                    let rewritten_all = all_findings
                        .into_iter()
                        .map(|finding| {
                            if resolved_ids.contains(&finding.finding_id) {
                                finding.with_status(FindingStatus::Resolved)
                            } else {
                                finding
                            }
                        })
                        .collect();

                    (rewritten_aia, stv_result, rewritten_all)
                }
                _ => (aia_result, SealTrustResult::not_executed(), all_findings),
            };

        // --------------------------------------------------------------
        // 5. Disposición final (mecánica, sin heurísticas)
        // --------------------------------------------------------------
        if seal_trust_result.executed && seal_trust_result.trusted == Some(false) {
            return self.finalize(
                audit_id,
                AuditStatus::Fail,
                DeliveryRecommendation::NotReady,
                aia_result,
                semantic_result,
                seal_trust_result,
                all_findings,
                &bus,
            );
        }

        let advisory_signals: Vec<&str> = semantic_result
            .pass_results
            .iter()
            .filter(|pass| pass.pass_id == "P8")
            .flat_map(|pass| pass.advisory_signals.iter().map(String::as_str))
            .collect();

        let (status, recommendation) =
            if advisory_signals.contains(&SIGNAL_DELIVERY_NOT_RECOMMENDED) {
                (AuditStatus::Fail, DeliveryRecommendation::NotReady)
            } else if advisory_signals.contains(&SIGNAL_DELIVERY_REVIEW_REQUIRED) {
                (
                    AuditStatus::Pass,
                    DeliveryRecommendation::ExpertReviewRequired,
                )
            } else {
                (AuditStatus::Pass, DeliveryRecommendation::Ready)
            };

        let report_findings = std::mem::take(&mut all_findings);
        self.finalize(
            audit_id,
            status,
            recommendation,
            aia_result,
            semantic_result,
            seal_trust_result,
            report_findings,
            &bus,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        audit_id: &str,
        status: AuditStatus,
        recommendation: DeliveryRecommendation,
        artifact_integrity: ArtifactIntegrityResult,
        semantic_audit: SemanticAuditResult,
        seal_trust: SealTrustResult,
        findings: Vec<Finding>,
        bus: &EventBus,
    ) -> VerificationReport {
        let report = VerificationReport::assemble(
            audit_id.to_string(),
            status,
            recommendation,
            artifact_integrity,
            semantic_audit,
            seal_trust,
            findings,
        )
        .expect("invariant violation: coordinator assembled a contract-breaking report");

        info!(
            "🏁 [COORDINATOR]: audit {} finished with status {:?} / {:?}",
            audit_id, status, recommendation
        );

        bus.emit(AuditEvent::new(
            audit_id,
            AuditEventType::AuditCompleted,
            Some(event_details(&[
                ("status", serde_json::to_value(status).unwrap_or(Value::Null)),
                (
                    "delivery_recommendation",
                    serde_json::to_value(recommendation).unwrap_or(Value::Null),
                ),
            ])),
        ));

        report
    }
}

/// Reescribe los hallazgos resueltos del agregado AIA (valor completo).
fn rewrite_resolved(
    aia_result: ArtifactIntegrityResult,
    resolved_ids: &[String],
) -> ArtifactIntegrityResult {
    if resolved_ids.is_empty() {
        return aia_result;
    }

    let rewritten_findings = aia_result
        .findings
        .iter()
        .map(|finding| {
            if resolved_ids.contains(&finding.finding_id) {
                finding.with_status(FindingStatus::Resolved)
            } else {
                finding.clone()
            }
        })
        .collect();

    ArtifactIntegrityResult {
        findings: rewritten_findings,
        ..aia_result
    }
}

fn integrity_audit_disabled_finding() -> Finding {
    Finding {
        finding_id: "AIA-CRIT-000".to_string(),
        source: FindingSource::ArtifactIntegrity,
        protocol_id: None,
        protocol_version: None,
        pass_id: None,
        category: FindingCategory::Compliance,
        severity: Severity::Critical,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::Open,
        title: "Artifact integrity audit disabled".to_string(),
        description: "Artifact integrity verification is disabled by runtime configuration."
            .to_string(),
        why_it_matters: "Without artifact integrity verification, the authenticity and \
                         immutability of the document cannot be established."
            .to_string(),
        location: None,
        suggested_fix: None,
        metadata: None,
        requires_stv: false,
    }
}

fn stv_required_gate_finding(deferred_count: usize) -> Finding {
    Finding {
        finding_id: "AIA-CRIT-STV-REQUIRED".to_string(),
        source: FindingSource::ArtifactIntegrity,
        protocol_id: None,
        protocol_version: None,
        pass_id: None,
        category: FindingCategory::Structure,
        severity: Severity::Critical,
        confidence: ConfidenceLevel::High,
        status: FindingStatus::Open,
        title: "Structural observations require seal trust verification".to_string(),
        description: format!(
            "{deferred_count} structural observation(s) can only be resolved \
             cryptographically, but no seal trust verifier is configured."
        ),
        why_it_matters: "Issuing a verdict on an artifact with unresolved structural \
                         observations would be unsound."
            .to_string(),
        location: None,
        suggested_fix: None,
        metadata: None,
        requires_stv: false,
    }
}

/// Constructor compacto del mapa `details` de un evento.
fn event_details(entries: &[(&str, Value)]) -> Map<String, Value> {
    let mut details = Map::new();
    for (key, value) in entries {
        details.insert((*key).to_string(), value.clone());
    }
    details
}
