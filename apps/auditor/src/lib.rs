// [apps/auditor/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AUDITOR SERVICE LIBRARY (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CABLEADO Y SUPERFICIE HTTP DEL AUDITOR
 *
 * Modelo de confianza cero: el artefacto PDF es la ÚNICA fuente de
 * verdad. No se asume nada del proceso de generación, del agente de
 * redacción ni del backend de firmado.
 * =================================================================
 */

pub mod kernel;
pub mod routes;
pub mod semantic_bridge;

pub use kernel::AuditorKernel;
