// [libs/domain/semantic/src/llm/azure.rs]
/*!
 * =================================================================
 * APARATO: AZURE OPENAI STRUCTURED EXECUTOR (V6.0)
 * CLASIFICACIÓN: DOMAIN / LLM ADAPTER (ESTRATO L2)
 * RESPONSABILIDAD: EJECUCIÓN ESTRUCTURADA CONTRA AZURE OPENAI
 *
 * Aplica el contrato de ensamblado de 4 capas con salidas
 * estructuradas (response_format json_schema). Normaliza TODO
 * desenlace a StructuredExecution; jamás lanza hacia el pipeline.
 * =================================================================
 */

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use sigilo_domain_models::{AuditEvent, AuditEventType, TokenMetrics};

use crate::executor::{
    ExecutionRequest, FailureKind, StructuredExecution, StructuredExecutor,
};
use crate::prompt::prefix_hash;

const MAX_ATTEMPTS: u32 = 3;

/// Ejecutor estructurado sobre el despliegue Azure OpenAI.
pub struct AzureStructuredExecutor {
    http: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    bearer_token: String,
}

impl AzureStructuredExecutor {
    pub fn new(
        endpoint: String,
        deployment: String,
        api_version: String,
        bearer_token: String,
        timeout: Duration,
    ) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            http,
            endpoint,
            deployment,
            api_version,
            bearer_token,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

// ---------------------------------------------------------------------
// Cableado de respuesta
// ---------------------------------------------------------------------

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
    prompt_tokens_details: Option<PromptTokensDetails>,
}

#[derive(Deserialize)]
struct PromptTokensDetails {
    cached_tokens: Option<u64>,
}

/// Esquema genérico de salida de pase (forma validada localmente
/// contra los tipos del pipeline).
fn pass_output_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "semantic_pass_output",
            "strict": false,
            "schema": {
                "type": "object",
                "properties": {
                    "findings": { "type": "array" },
                    "summary": { "type": ["string", "null"] },
                    "delivery_recommendation": { "type": ["string", "null"] },
                    "advisory_signals": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["findings"]
            }
        }
    })
}

impl StructuredExecutor for AzureStructuredExecutor {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, StructuredExecution> {
        async move {
            let prompt_id = request.prompt.prompt_id();
            let computed_prefix_hash =
                prefix_hash(&request.prefix.authority_text, &request.prefix.snapshot);

            if let Some(audit_id) = request.audit_id {
                let mut details = serde_json::Map::new();
                details.insert("pass_id".into(), Value::String(request.prompt.pass_id.clone()));
                details.insert("model_deployment".into(), Value::String(self.deployment.clone()));
                request.bus.emit(AuditEvent::new(
                    audit_id,
                    AuditEventType::LlmExecutionStarted,
                    Some(details),
                ));
            }

            let outcome = self.execute_inner(&request, &prompt_id, &computed_prefix_hash).await;

            if let Some(audit_id) = request.audit_id {
                let mut details = serde_json::Map::new();
                details.insert("success".into(), Value::Bool(outcome.success));
                details.insert(
                    "failure_type".into(),
                    outcome
                        .failure_type
                        .map(|f| Value::String(f.wire_label().to_string()))
                        .unwrap_or(Value::Null),
                );
                request.bus.emit(AuditEvent::new(
                    audit_id,
                    AuditEventType::LlmExecutionCompleted,
                    Some(details),
                ));
            }

            outcome
        }
        .boxed()
    }
}

impl AzureStructuredExecutor {
    async fn execute_inner(
        &self,
        request: &ExecutionRequest<'_>,
        prompt_id: &str,
        computed_prefix_hash: &str,
    ) -> StructuredExecution {
        let failure = |kind: FailureKind, raw: String| StructuredExecution {
            success: false,
            output: None,
            token_metrics: None,
            failure_type: Some(kind),
            raw_error: Some(raw),
            model_deployment: self.deployment.clone(),
            prompt_id: prompt_id.to_string(),
            prefix_hash: computed_prefix_hash.to_string(),
        };

        // --------------------------------------------------------------
        // Ensamblado de 4 capas (el prefijo llega YA ensamblado)
        // --------------------------------------------------------------
        let mut messages = vec![
            json!({ "role": "system", "content": request.prefix.authority_text }),
            json!({ "role": "user", "content": request.prefix.snapshot }),
            json!({ "role": "user", "content": request.prompt.text }),
        ];

        if let Some(chunk) = &request.focus_chunk {
            messages.push(json!({
                "role": "user",
                "content": format!(
                    "--- BEGIN CHUNK UNDER ANALYSIS ---\n{chunk}\n--- END CHUNK UNDER ANALYSIS ---"
                ),
            }));
        }

        let body = json!({
            "messages": messages,
            "response_format": pass_output_schema(),
        });

        // --------------------------------------------------------------
        // Envío con reintentos acotados
        // --------------------------------------------------------------
        let mut last_transport_error = String::new();

        for attempt in 0..MAX_ATTEMPTS {
            let response = self
                .http
                .post(self.completions_url())
                .header("Authorization", format!("Bearer {}", self.bearer_token))
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(error) if error.is_timeout() => {
                    return failure(FailureKind::Timeout, error.to_string());
                }
                Err(error) => {
                    warn!("🌩️  [LLM_UPLINK]: transport fault on attempt {attempt}: {error}");
                    last_transport_error = error.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                last_transport_error = format!("HTTP {status}");
                continue;
            }
            if !status.is_success() {
                return failure(
                    FailureKind::UnexpectedError,
                    format!("HTTP {status}: {}", response.text().await.unwrap_or_default()),
                );
            }

            let parsed: ChatResponse = match response.json().await {
                Ok(parsed) => parsed,
                Err(error) => {
                    return failure(FailureKind::UnexpectedError, error.to_string());
                }
            };

            let token_metrics = parsed.usage.as_ref().map(|usage| TokenMetrics {
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
                total_tokens: usage.total_tokens,
                cached_tokens: usage
                    .prompt_tokens_details
                    .as_ref()
                    .and_then(|details| details.cached_tokens),
            });

            let Some(choice) = parsed.choices.first() else {
                return failure(
                    FailureKind::UnexpectedError,
                    "completion carried no choices".to_string(),
                );
            };

            if choice.message.refusal.is_some()
                || choice.finish_reason.as_deref() == Some("content_filter")
            {
                return failure(
                    FailureKind::Refusal,
                    choice
                        .message
                        .refusal
                        .clone()
                        .unwrap_or_else(|| "content filter".to_string()),
                );
            }

            let Some(content) = &choice.message.content else {
                return failure(
                    FailureKind::SchemaViolation,
                    "completion message without content".to_string(),
                );
            };

            return match serde_json::from_str::<Value>(content) {
                Ok(output) => {
                    debug!("🤖 [LLM_UPLINK]: structured output received for {prompt_id}");
                    StructuredExecution {
                        success: true,
                        output: Some(output),
                        token_metrics,
                        failure_type: None,
                        raw_error: None,
                        model_deployment: self.deployment.clone(),
                        prompt_id: prompt_id.to_string(),
                        prefix_hash: computed_prefix_hash.to_string(),
                    }
                }
                Err(error) => failure(FailureKind::SchemaViolation, error.to_string()),
            };
        }

        failure(FailureKind::RetryExhausted, last_transport_error)
    }
}
