// [apps/sealer/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SEALER SERVICE LIBRARY (V6.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: CABLEADO Y SUPERFICIE HTTP DEL SELLADOR
 *
 * El PDF de entrada se trata como FINAL y CONTENT-COMPLETE: el
 * sellador no reescribe contenido, solo aplica revisiones
 * incrementales del ciclo PAdES.
 * =================================================================
 */

pub mod kernel;
pub mod routes;

pub use kernel::SealerKernel;
