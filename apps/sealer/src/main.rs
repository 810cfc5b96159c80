// [apps/sealer/src/main.rs]
/*!
 * =================================================================
 * APARATO: SEALER MAIN ENTRY POINT (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 * =================================================================
 */

use std::sync::Arc;

use dotenvy::dotenv;
use sigilo_sealer::routes::build_router;
use sigilo_sealer::SealerKernel;
use sigilo_shared_vigia::init_tracing;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. OBSERVABILIDAD NEURAL (VIGÍA)
    init_tracing("sigilo_sealer");

    // 3. RUNTIME SOBERANO
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        info!("🛰️  [SEALER]: ignition sequence starting...");

        // 4. KERNEL (fail-fast: credenciales y TSA validadas aquí)
        let kernel = Arc::new(SealerKernel::ignite()?);

        let listening_port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        // 5. SUPERFICIE HTTP
        let router = build_router(kernel);
        let listener =
            tokio::net::TcpListener::bind(("0.0.0.0", listening_port)).await?;

        info!("🚀 [SEALER_ONLINE]: sealing surface listening on port {listening_port}");
        axum::serve(listener, router).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
