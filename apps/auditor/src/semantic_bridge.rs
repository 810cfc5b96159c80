// [apps/auditor/src/semantic_bridge.rs]
/*!
 * =================================================================
 * APARATO: SDVP RUNNER BRIDGE (V3.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: ADAPTAR EL PIPELINE SDVP A LA COSTURA DEL
 *                  COORDINADOR
 *
 * El coordinador conoce SemanticAuditRunner; el pipeline conoce su
 * contexto inmutable. Este puente construye el contexto desde las
 * señales AIA y delega, sin lógica propia.
 * =================================================================
 */

use futures::future::BoxFuture;
use futures::FutureExt;

use sigilo_domain_audit::{SemanticAuditRunner, SemanticRunInputs};
use sigilo_domain_models::SemanticAuditResult;
use sigilo_domain_semantic::{
    SemanticAuditContext, SemanticAuditPipeline, StructuredExecutor, SDVP_PROTOCOL_ID,
    SDVP_PROTOCOL_VERSION,
};

pub struct SdvpRunner<E: StructuredExecutor> {
    pipeline: SemanticAuditPipeline<E>,
}

impl<E: StructuredExecutor> SdvpRunner<E> {
    pub fn new(pipeline: SemanticAuditPipeline<E>) -> Self {
        Self { pipeline }
    }
}

impl<E: StructuredExecutor + 'static> SemanticAuditRunner for SdvpRunner<E> {
    fn run<'a>(&'a self, inputs: SemanticRunInputs<'a>) -> BoxFuture<'a, SemanticAuditResult> {
        async move {
            let context = SemanticAuditContext::new(
                inputs.document_content.clone(),
                inputs.content_derived_text.to_string(),
                inputs.visible_text.to_string(),
            )
            .with_audit_id(inputs.audit_id)
            .with_protocol(SDVP_PROTOCOL_ID, SDVP_PROTOCOL_VERSION)
            .with_bus(inputs.bus);

            self.pipeline.run(&context).await
        }
        .boxed()
    }
}
