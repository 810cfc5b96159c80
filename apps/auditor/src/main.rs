// [apps/auditor/src/main.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR MAIN ENTRY POINT (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * La configuración y el cableado de dependencias (semántica, STV)
 * ocurren ANTES de abrir el socket TCP: un proceso que escucha es un
 * proceso completamente configurado (fail-fast).
 * =================================================================
 */

use std::sync::Arc;

use dotenvy::dotenv;
use sigilo_auditor::routes::build_router;
use sigilo_auditor::AuditorKernel;
use sigilo_shared_vigia::init_tracing;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. OBSERVABILIDAD NEURAL (VIGÍA)
    init_tracing("sigilo_auditor");

    // 3. RUNTIME SOBERANO
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        info!("🛰️  [AUDITOR]: ignition sequence starting...");

        // 4. KERNEL (fail-fast)
        let kernel = Arc::new(AuditorKernel::ignite()?);

        let listening_port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse()
            .unwrap_or(8081);

        // 5. SUPERFICIE HTTP
        let router = build_router(kernel);
        let listener =
            tokio::net::TcpListener::bind(("0.0.0.0", listening_port)).await?;

        info!("🚀 [AUDITOR_ONLINE]: verification surface listening on port {listening_port}");
        axum::serve(listener, router).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
