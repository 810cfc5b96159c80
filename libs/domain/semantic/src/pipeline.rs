// [libs/domain/semantic/src/pipeline.rs]
/*!
 * =================================================================
 * APARATO: SEMANTIC AUDIT PIPELINE ENGINE (V6.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: SECUENCIACIÓN ESTRICTA DE PASES CONSULTIVOS
 *
 * El pipeline posee:
 * - el orden de pases (congelado en construcción, validado contra el
 *   protocolo)
 * - el estado de runtime (hallazgos acumulados, pases ejecutados),
 *   expuesto a los pases posteriores en SOLO lectura
 * - el corte STOP y la absorción de fallos de ejecución
 *
 * NO posee: semántica de protocolo, decisiones de auditoría ni
 * recomendaciones de entrega.
 *
 * INVARIANTE DE CACHÉ: el prefijo autoridad+snapshot se ensambla UNA
 * vez y se verifica por hash en cada pase; una deriva dispara pánico
 * de invariante (error de lógica, jamás dato).
 * =================================================================
 */

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use sigilo_domain_models::{
    AuditEvent, AuditEventType, Finding, SemanticAuditPassResult, SemanticAuditResult,
    SemanticExecutionError,
};

use crate::adapter::{ProtocolFindingAdapter, RawSemanticFinding};
use crate::context::SemanticAuditContext;
use crate::executor::{ExecutionRequest, FailureKind, PromptPrefix, StructuredExecutor};
use crate::prompt::{canonical_semantic_snapshot, prefix_hash, PromptFragment};
use crate::protocol::{validate_pass_order, PassBlueprint};

/// Salida estructurada esperada de todo pase SDVP.
#[derive(Debug, Deserialize)]
struct PassOutput {
    #[serde(default)]
    findings: Vec<RawSemanticFinding>,

    #[serde(default)]
    #[allow(dead_code)]
    summary: Option<String>,

    /// Solo P8: recomendación informacional de entrega.
    #[serde(default)]
    delivery_recommendation: Option<String>,

    /// Solo P8: señales consultivas acotadas (entrada de control del
    /// coordinador).
    #[serde(default)]
    advisory_signals: Vec<String>,
}

/// Motor del pipeline semántico, genérico sobre el ejecutor.
pub struct SemanticAuditPipeline<E: StructuredExecutor> {
    protocol_id: String,
    protocol_version: String,
    passes: Vec<PassBlueprint>,
    authority_text: String,
    executor: E,
}

impl<E: StructuredExecutor> SemanticAuditPipeline<E> {
    /// Construye el pipeline validando forma y orden del protocolo.
    pub fn new(
        protocol_id: &str,
        protocol_version: &str,
        passes: Vec<PassBlueprint>,
        authority_text: String,
        executor: E,
    ) -> Result<Self, String> {
        validate_pass_order(&passes)?;

        Ok(Self {
            protocol_id: protocol_id.to_string(),
            protocol_version: protocol_version.to_string(),
            passes,
            authority_text,
            executor,
        })
    }

    /// Ejecuta todos los pases en orden estricto.
    #[instrument(skip(self, context))]
    pub async fn run(&self, context: &SemanticAuditContext) -> SemanticAuditResult {
        // Capa de datos: ensamblada UNA vez (estabilidad de caché).
        let prefix = PromptPrefix {
            authority_text: self.authority_text.clone(),
            snapshot: canonical_semantic_snapshot(
                &context.document_content,
                &context.content_derived_text,
            ),
        };
        let expected_prefix_hash = prefix_hash(&prefix.authority_text, &prefix.snapshot);

        let mut pass_results: Vec<SemanticAuditPassResult> = Vec::new();
        let mut all_findings: Vec<Finding> = Vec::new();
        let mut executed_pass_ids: Vec<String> = Vec::new();
        let mut stop_triggered = false;

        for blueprint in &self.passes {
            if stop_triggered {
                // Pases omitidos: executed=false, sin hallazgos, para
                // mantener consistente la línea temporal de pases.
                pass_results.push(SemanticAuditPassResult::skipped(blueprint.pass_id));
                continue;
            }

            self.emit(
                context,
                AuditEventType::SemanticPassStarted,
                blueprint.pass_id,
            );

            let result = self
                .run_single_pass(
                    blueprint,
                    context,
                    &prefix,
                    &expected_prefix_hash,
                    &all_findings,
                    &executed_pass_ids,
                )
                .await;

            for finding in &result.findings {
                self.emit(
                    context,
                    AuditEventType::FindingDiscovered,
                    &finding.finding_id,
                );
            }

            // Corte STOP: solo hallazgos semánticos del pase recién
            // completado pueden dispararlo. Alcance semántico
            // exclusivamente: no toca autoridad, entrega ni STV.
            stop_triggered = result
                .findings
                .iter()
                .any(|finding| finding.stop_condition());

            if stop_triggered {
                warn!(
                    "🛑 [SEMANTIC]: STOP condition raised by pass {} — remaining passes skipped",
                    blueprint.pass_id
                );
            }

            all_findings.extend(result.findings.iter().cloned());
            executed_pass_ids.push(blueprint.pass_id.to_string());

            self.emit(
                context,
                AuditEventType::SemanticPassCompleted,
                blueprint.pass_id,
            );

            pass_results.push(result);
        }

        info!(
            "🧠 [SEMANTIC]: protocol {} v{} finished ({} passes executed, {} findings)",
            self.protocol_id,
            self.protocol_version,
            executed_pass_ids.len(),
            all_findings.len()
        );

        SemanticAuditResult {
            executed: true,
            protocol_id: Some(self.protocol_id.clone()),
            protocol_version: Some(self.protocol_version.clone()),
            pass_results,
            findings: all_findings,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_single_pass(
        &self,
        blueprint: &PassBlueprint,
        context: &SemanticAuditContext,
        prefix: &PromptPrefix,
        expected_prefix_hash: &str,
        prior_findings: &[Finding],
        executed_pass_ids: &[String],
    ) -> SemanticAuditPassResult {
        let adapter = ProtocolFindingAdapter::new(
            &self.protocol_id,
            &self.protocol_version,
            blueprint.pass_id,
        );

        let prompt = PromptFragment {
            protocol_id: self.protocol_id.clone(),
            protocol_version: self.protocol_version.clone(),
            pass_id: blueprint.pass_id.to_string(),
            text: blueprint.task_text.to_string(),
        };

        // Capa de foco: proyección local del pase (jamás muta contexto).
        let focus_chunk = if blueprint.is_delivery_pass {
            Some(delivery_focus(prior_findings, executed_pass_ids))
        } else {
            blueprint
                .slicer
                .map(|slicer| slicer.slice(&context.content_derived_text))
        };

        let execution = self
            .executor
            .execute(ExecutionRequest {
                prompt: &prompt,
                prefix,
                focus_chunk,
                audit_id: context.audit_id.as_deref(),
                bus: context.bus.clone(),
            })
            .await;

        // Invariante de caché: deriva del prefijo = error de lógica.
        assert_eq!(
            execution.prefix_hash, expected_prefix_hash,
            "cache-stability invariant violated: prompt prefix drifted in pass {}",
            blueprint.pass_id
        );

        // ----------------------------------------------------------
        // Fallo de ejecución: absorbido como hallazgo consultivo.
        // JAMÁS cruza la frontera del pase como error.
        // ----------------------------------------------------------
        if !execution.success {
            let failure = execution.failure_type.unwrap_or(FailureKind::UnexpectedError);
            return SemanticAuditPassResult {
                pass_id: blueprint.pass_id.to_string(),
                executed: true,
                findings: vec![adapter.adapt_execution_failure(failure)],
                delivery_recommendation: None,
                execution_error: Some(SemanticExecutionError {
                    failure_type: failure.wire_label().to_string(),
                    raw_error: execution.raw_error,
                    model_deployment: Some(execution.model_deployment),
                    prompt_id: Some(execution.prompt_id),
                }),
                token_metrics: execution.token_metrics,
                advisory_signals: Vec::new(),
                confidence: None,
            };
        }

        // ----------------------------------------------------------
        // Salida estructurada: una forma inválida es violación de
        // esquema, también absorbida.
        // ----------------------------------------------------------
        let output: PassOutput = match execution
            .output
            .as_ref()
            .map(|value| serde_json::from_value::<PassOutput>(value.clone()))
        {
            Some(Ok(output)) => output,
            _ => {
                return SemanticAuditPassResult {
                    pass_id: blueprint.pass_id.to_string(),
                    executed: true,
                    findings: vec![
                        adapter.adapt_execution_failure(FailureKind::SchemaViolation)
                    ],
                    delivery_recommendation: None,
                    execution_error: Some(SemanticExecutionError {
                        failure_type: FailureKind::SchemaViolation.wire_label().to_string(),
                        raw_error: Some("pass output did not match its schema".to_string()),
                        model_deployment: Some(execution.model_deployment),
                        prompt_id: Some(execution.prompt_id),
                    }),
                    token_metrics: execution.token_metrics,
                    advisory_signals: Vec::new(),
                    confidence: None,
                };
            }
        };

        let mut findings = Vec::new();
        let mut schema_violation = false;

        for raw in &output.findings {
            match adapter.adapt(raw, &context.document_content) {
                Ok(finding) => findings.push(finding),
                Err(_missing_rule) => {
                    schema_violation = true;
                    break;
                }
            }
        }

        if schema_violation {
            return SemanticAuditPassResult {
                pass_id: blueprint.pass_id.to_string(),
                executed: true,
                findings: vec![adapter.adapt_execution_failure(FailureKind::SchemaViolation)],
                delivery_recommendation: None,
                execution_error: Some(SemanticExecutionError {
                    failure_type: FailureKind::SchemaViolation.wire_label().to_string(),
                    raw_error: Some("finding emitted without mandatory rule_id".to_string()),
                    model_deployment: Some(execution.model_deployment),
                    prompt_id: Some(execution.prompt_id),
                }),
                token_metrics: execution.token_metrics,
                advisory_signals: Vec::new(),
                confidence: None,
            };
        }

        SemanticAuditPassResult {
            pass_id: blueprint.pass_id.to_string(),
            executed: true,
            findings,
            delivery_recommendation: if blueprint.is_delivery_pass {
                output.delivery_recommendation
            } else {
                None
            },
            execution_error: None,
            token_metrics: execution.token_metrics,
            advisory_signals: if blueprint.is_delivery_pass {
                output.advisory_signals
            } else {
                Vec::new()
            },
            confidence: None,
        }
    }

    fn emit(&self, context: &SemanticAuditContext, event_type: AuditEventType, detail: &str) {
        if let Some(audit_id) = &context.audit_id {
            let mut details = serde_json::Map::new();
            details.insert(
                "subject".to_string(),
                Value::String(detail.to_string()),
            );
            details.insert(
                "protocol_id".to_string(),
                Value::String(self.protocol_id.clone()),
            );
            context
                .bus
                .emit(AuditEvent::new(audit_id, event_type, Some(details)));
        }
    }
}

/// Capa de foco del pase de entrega: hallazgos previos y línea
/// temporal de pases, como JSON estable.
fn delivery_focus(prior_findings: &[Finding], executed_pass_ids: &[String]) -> String {
    let snapshot = serde_json::json!({
        "prior_findings": prior_findings,
        "executed_passes": executed_pass_ids,
    });
    serde_json::to_string(&snapshot).unwrap_or_default()
}
