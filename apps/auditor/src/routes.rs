// [apps/auditor/src/routes.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR HTTP SURFACE (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE PÚBLICA DE VERIFICACIÓN
 *
 * - POST /api/v1/audit         → VerificationReport JSON
 * - POST /api/v1/audit/stream  → eventos SSE + reporte final
 * - GET  /healthz              → latido del servicio
 *
 * La desconexión del cliente SSE JAMÁS cancela la auditoría: la
 * corrida se lanza como tarea independiente y corre a término en
 * segundo plano.
 * =================================================================
 */

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use sigilo_domain_models::{AuditEvent, AuditEventType, EventBus};
use sigilo_shared_vigia::audit_span;

use crate::kernel::AuditorKernel;

pub type SharedKernel = Arc<AuditorKernel>;

pub fn build_router(kernel: SharedKernel) -> Router {
    Router::new()
        .route("/api/v1/audit", post(run_audit))
        .route("/api/v1/audit/stream", post(run_audit_stream))
        .route("/healthz", get(healthcheck))
        .with_state(kernel)
}

async fn healthcheck() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "operational", "service": "sigilo-auditor" }))
}

/// Guardas estrictas del payload: tipo de medio y tamaño acotado.
fn guard_pdf_payload(
    kernel: &AuditorKernel,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<(), (StatusCode, String)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("application/pdf") {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Only 'application/pdf' payloads are accepted.".to_string(),
        ));
    }

    if body.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Empty PDF payload.".to_string(),
        ));
    }

    let max_bytes = kernel.config.max_pdf_size_mb as usize * 1024 * 1024;
    if body.len() > max_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File exceeds the {}MB limit.",
                kernel.config.max_pdf_size_mb
            ),
        ));
    }

    Ok(())
}

/// Auditoría síncrona: corre a término y retorna el reporte completo.
async fn run_audit(
    State(kernel): State<SharedKernel>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err((status, detail)) = guard_pdf_payload(&kernel, &headers, &body) {
        return (status, Json(serde_json::json!({ "detail": detail }))).into_response();
    }

    let audit_id = Uuid::new_v4().to_string();
    info!("🔎 [AUDITOR_API]: audit {} accepted ({} bytes)", audit_id, body.len());

    // Toda traza de la corrida viaja atada al audit_id del reporte.
    let report = kernel
        .coordinator
        .run_audit(&body, &audit_id, EventBus::null())
        .instrument(audit_span(&audit_id))
        .await;

    (StatusCode::OK, Json(report)).into_response()
}

/// Auditoría en streaming: eventos SSE y reporte final como evento.
async fn run_audit_stream(
    State(kernel): State<SharedKernel>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err((status, detail)) = guard_pdf_payload(&kernel, &headers, &body) {
        return (status, Json(serde_json::json!({ "detail": detail }))).into_response();
    }

    let audit_id = Uuid::new_v4().to_string();
    let (bus, receiver) = EventBus::channel();

    info!("📡 [AUDITOR_API]: streamed audit {} accepted", audit_id);

    // La auditoría corre como tarea independiente: la desconexión del
    // stream no la cancela.
    let task_kernel = kernel.clone();
    let task_audit_id = audit_id.clone();
    tokio::spawn(async move {
        let task_bus = bus.clone();
        let report = task_kernel
            .coordinator
            .run_audit(&body, &task_audit_id, bus)
            .instrument(audit_span(&task_audit_id))
            .await;

        // Reporte final como evento de presentación (no terminal).
        let mut details = serde_json::Map::new();
        match serde_json::to_value(&report) {
            Ok(report_value) => {
                details.insert("report".to_string(), report_value);
            }
            Err(serialization_fault) => {
                error!(
                    "❌ [AUDITOR_API]: report serialization collapsed: {}",
                    serialization_fault
                );
            }
        }
        task_bus.emit(AuditEvent::new(
            &task_audit_id,
            AuditEventType::AuditReportReady,
            Some(details),
        ));
    });

    let stream: std::pin::Pin<
        Box<dyn Stream<Item = Result<Event, Infallible>> + Send>,
    > = Box::pin(
        UnboundedReceiverStream::new(receiver).map(|event: AuditEvent| {
            let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Ok(Event::default().data(payload))
        }),
    );

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}
