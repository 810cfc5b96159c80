// [libs/domain/semantic/src/testing.rs]
/*!
 * =================================================================
 * APARATO: SIMULATED EXECUTOR (TEST SUPPORT)
 * CLASIFICACIÓN: PROVING GROUNDS
 * RESPONSABILIDAD: EJECUCIÓN SEMÁNTICA SIMULADA Y OBSERVABLE
 *
 * Ejecutor determinista para las suites de certificación: registra
 * pases ejecutados y hashes de prefijo, inyecta condiciones STOP y
 * fallos de ejecución clasificados, sin tocar la red.
 * =================================================================
 */

use std::collections::BTreeMap;
use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use crate::executor::{
    ExecutionRequest, FailureKind, StructuredExecution, StructuredExecutor,
};
use crate::prompt::prefix_hash;

/// Ejecutor simulado con comportamiento por pase.
#[derive(Default)]
pub struct SimulatedExecutor {
    /// Salida específica por pass_id (por defecto `{"findings": []}`).
    outputs_by_pass: BTreeMap<String, Value>,
    /// Pase que inyecta un hallazgo con stop_condition=true.
    stop_on_pass: Option<String>,
    /// Pase que simula un fallo de ejecución clasificado.
    failure_on_pass: Option<(String, FailureKind)>,

    executed_passes: Mutex<Vec<String>>,
    prefix_hashes: Mutex<BTreeMap<String, String>>,
}

impl SimulatedExecutor {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, pass_id: &str, output: Value) -> Self {
        self.outputs_by_pass.insert(pass_id.to_string(), output);
        self
    }

    pub fn with_stop_on(mut self, pass_id: &str) -> Self {
        self.stop_on_pass = Some(pass_id.to_string());
        self
    }

    pub fn with_failure_on(mut self, pass_id: &str, failure: FailureKind) -> Self {
        self.failure_on_pass = Some((pass_id.to_string(), failure));
        self
    }

    /// Pases efectivamente ejecutados, en orden.
    pub fn executed_passes(&self) -> Vec<String> {
        self.executed_passes.lock().expect("mock lock").clone()
    }

    /// Hash de prefijo observado por pase (invariante de caché).
    pub fn prefix_hashes(&self) -> BTreeMap<String, String> {
        self.prefix_hashes.lock().expect("mock lock").clone()
    }
}

impl StructuredExecutor for SimulatedExecutor {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, StructuredExecution> {
        async move {
            let pass_id = request.prompt.pass_id.clone();
            let prompt_id = request.prompt.prompt_id();
            let observed_hash =
                prefix_hash(&request.prefix.authority_text, &request.prefix.snapshot);

            self.executed_passes
                .lock()
                .expect("mock lock")
                .push(pass_id.clone());
            self.prefix_hashes
                .lock()
                .expect("mock lock")
                .insert(pass_id.clone(), observed_hash.clone());

            if let Some((failing_pass, failure)) = &self.failure_on_pass {
                if *failing_pass == pass_id {
                    return StructuredExecution {
                        success: false,
                        output: None,
                        token_metrics: None,
                        failure_type: Some(*failure),
                        raw_error: Some("simulated execution failure".to_string()),
                        model_deployment: "simulated".to_string(),
                        prompt_id,
                        prefix_hash: observed_hash,
                    };
                }
            }

            let output = if self.stop_on_pass.as_deref() == Some(pass_id.as_str()) {
                json!({
                    "findings": [{
                        "rule_id": "STOP-001",
                        "title": "Semantic STOP requested",
                        "description": "This finding requests a semantic-scope STOP.",
                        "why_it_matters": "Further semantic analysis would be misleading.",
                        "category": "risk",
                        "severity": "critical",
                        "confidence": "high",
                        "metadata": { "stop_condition": true }
                    }]
                })
            } else {
                self.outputs_by_pass
                    .get(&pass_id)
                    .cloned()
                    .unwrap_or_else(|| json!({ "findings": [] }))
            };

            StructuredExecution {
                success: true,
                output: Some(output),
                token_metrics: None,
                failure_type: None,
                raw_error: None,
                model_deployment: "simulated".to_string(),
                prompt_id,
                prefix_hash: observed_hash,
            }
        }
        .boxed()
    }
}
