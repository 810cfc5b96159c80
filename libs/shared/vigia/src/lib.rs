// [libs/shared/vigia/src/lib.rs]
/*!
 * =================================================================
 * APARATO: VIGÍA TRUST-PIPELINE OBSERVER (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: TELEMETRÍA DEL PIPELINE DE CONFIANZA E IDENTIDAD
 *                  DE CORRELACIÓN EN SPANS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. MAPA DE ESTRATOS: el filtro por defecto enumera los crates del
 *    dominio Sigilo (canonical → pdf → pades / audit → semantic) con
 *    niveles propios, en vez de un único target de servicio.
 * 2. IDENTIDAD PORTADA: las superficies de servicio envuelven cada
 *    auditoría y cada sellado en un span con audit_id / trace id;
 *    en producción cada línea JSON arrastra esos campos.
 * 3. FORENSE DE PÁNICO: el hook global registra hilo, coordenadas y
 *    payload como campos estructurados antes de la defunción.
 * =================================================================
 */

use std::panic;
use std::thread;

use tracing::{error, info, info_span, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Estratos del dominio con su nivel por defecto. El ruido de
/// infraestructura HTTP queda degradado a 'warn'.
const STRATA_DIRECTIVES: &[(&str, &str)] = &[
    ("sigilo_core_canonical", "info"),
    ("sigilo_core_pdf", "info"),
    ("sigilo_domain_models", "info"),
    ("sigilo_domain_pades", "info"),
    ("sigilo_domain_audit", "info"),
    ("sigilo_domain_semantic", "info"),
    ("sigilo_infra_hsm", "info"),
    ("sigilo_infra_tsa", "info"),
    ("tower_http", "warn"),
    ("hyper", "warn"),
    ("reqwest", "warn"),
];

fn default_filter(service_label: &str) -> String {
    let service_level = if cfg!(debug_assertions) { "debug" } else { "info" };

    let mut directives: Vec<String> = vec![format!("{service_label}={service_level}")];
    directives.extend(
        STRATA_DIRECTIVES
            .iter()
            .map(|(target, level)| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Enciende el observador Vigía para un servicio del pipeline.
///
/// - Desarrollo: líneas compactas con target visible (mapa de estratos).
/// - Producción: JSON plano; cada evento arrastra los campos del span
///   activo (`audit_id` / `trace`), el pegamento entre una línea de
///   log y el artefacto que la produjo.
///
/// # Errors:
/// Provoca pánico si otro suscriptor global ya fue inicializado.
pub fn init_tracing(service_label: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(service_label).into());

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init();
    }

    install_panic_forensics(service_label);

    info!(
        service = %service_label,
        "👁️  [VIGIA_ONLINE]: trust-pipeline observability levelized."
    );
}

/// Span de una corrida de auditoría. Toda traza emitida dentro del
/// span (coordinador, AIA, STV, pases semánticos) queda atada al
/// audit_id del reporte final.
pub fn audit_span(audit_id: &str) -> Span {
    info_span!("audit", audit_id = %audit_id)
}

/// Span de una operación de sellado, atado al trace de correlación
/// que viaja en X-Correlation-ID hacia el HSM y la TSA.
pub fn seal_span(correlation_id: &str) -> Span {
    info_span!("seal", trace = %correlation_id)
}

/// Hook global: un colapso en cualquier tarea (polling HSM, pipeline
/// de auditoría) se registra con campos estructurados antes de morir.
fn install_panic_forensics(service_label: &str) {
    let service_tag = service_label.to_string();

    panic::set_hook(Box::new(move |panic_info| {
        let thread_label = thread::current()
            .name()
            .unwrap_or("unnamed-task")
            .to_string();

        let coordinates = panic_info
            .location()
            .map(|at| format!("{}:{}", at.file(), at.line()))
            .unwrap_or_else(|| "unknown".to_string());

        error!(
            target: "sigilo_panic",
            service = %service_tag,
            thread = %thread_label,
            at = %coordinates,
            "🔥 [PANIC_FORENSICS]: task collapsed: {}",
            describe_panic_payload(panic_info.payload())
        );
    }));
}

fn describe_panic_payload(payload: &dyn std::any::Any) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }

    "opaque panic payload".to_string()
}
