// [apps/sealer/src/routes.rs]
/*!
 * =================================================================
 * APARATO: SEALER HTTP SURFACE (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE PÚBLICA DE SELLADO
 *
 * - POST /api/v1/seal          → PDF sellado (PAdES-B o PAdES-B-LTA)
 * - POST /api/v1/content-hash  → ancla canónica + bindings
 * - GET  /healthz              → latido del servicio
 * =================================================================
 */

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use sigilo_core_canonical::{canonicalize, content_hash};
use sigilo_shared_vigia::seal_span;

use crate::kernel::SealerKernel;

pub type SharedKernel = Arc<SealerKernel>;

pub fn build_router(kernel: SharedKernel) -> Router {
    Router::new()
        .route("/api/v1/seal", post(seal_archival))
        .route("/api/v1/content-hash", post(compute_content_hash))
        .route("/healthz", get(healthcheck))
        .with_state(kernel)
}

async fn healthcheck() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "operational", "service": "sigilo-sealer" }))
}

/// Identidad de trazabilidad extremo a extremo.
pub fn correlation_id_of(headers: &HeaderMap) -> String {
    headers
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Sella un artefacto PDF/A-3b finalizado.
async fn seal_archival(
    State(kernel): State<SharedKernel>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let correlation_id = correlation_id_of(&headers);

    // ------------------------------------------------------------------
    // 1. Guardas estrictas
    // ------------------------------------------------------------------
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("application/pdf") {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            [("X-Correlation-ID", correlation_id)],
            "Only 'application/pdf' files are accepted.",
        )
            .into_response();
    }

    if body.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            [("X-Correlation-ID", correlation_id)],
            "Empty PDF payload.",
        )
            .into_response();
    }

    let max_bytes = kernel.config.max_pdf_size_mb as usize * 1024 * 1024;
    if body.len() > max_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            [("X-Correlation-ID", correlation_id)],
            "File exceeds the configured size limit.",
        )
            .into_response();
    }

    info!(
        "🖋️  [SEALER_API]: archival seal initiated (trace {}, {} bytes)",
        correlation_id,
        body.len()
    );

    // ------------------------------------------------------------------
    // 2. Orquestación del ciclo PAdES
    // ------------------------------------------------------------------
    // Toda traza del ciclo (HSM, TSA, revisiones) viaja atada al
    // trace de correlación de la solicitud.
    let sealed = kernel
        .lifecycle
        .seal(
            body.to_vec(),
            &kernel.signer,
            kernel.tsa.as_deref(),
            &correlation_id,
        )
        .instrument(seal_span(&correlation_id))
        .await;

    match sealed {
        Ok(artifact) => {
            let standard = if kernel.config.enable_lta_updates {
                "PAdES-B-LTA"
            } else {
                "PAdES-B"
            };

            info!(
                "✅ [SEALER_API]: seal success (trace {}, standard {})",
                correlation_id, standard
            );

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE.as_str(), "application/pdf".to_string()),
                    ("X-Correlation-ID", correlation_id),
                    ("X-Signer-Backend", "Azure-HSM-Signing".to_string()),
                    ("X-Signature-Standard", standard.to_string()),
                ],
                artifact.into_bytes(),
            )
                .into_response()
        }
        Err(seal_fault) => {
            error!(
                "❌ [SEALER_API]: sealing collapsed (trace {}): {}",
                correlation_id, seal_fault
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("X-Correlation-ID", correlation_id)],
                "Archival sealing failed.",
            )
                .into_response()
        }
    }
}

/// Computa el ancla canónica de un Document Content (lado generador).
async fn compute_content_hash(Json(document_content): Json<Value>) -> impl IntoResponse {
    if !document_content.is_object() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "detail": "Document Content must be a JSON object at the top level."
            })),
        )
            .into_response();
    }

    match canonicalize(&document_content) {
        Ok(canonical_bytes) => {
            let anchor = content_hash(&canonical_bytes);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "content_hash": anchor,
                    "hash_algorithm": "SHA-256",
                    "generation_mode": "final",
                    "canonical_length": canonical_bytes.len(),
                })),
            )
                .into_response()
        }
        Err(canonical_fault) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "detail": canonical_fault.to_string() })),
        )
            .into_response(),
    }
}
