// [libs/core/canonical/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CANONICAL CONTENT CODEC (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: BYTES CANÓNICOS Y ANCLA DE INTEGRIDAD SHA-256
 *
 * VISION HIPER-HOLÍSTICA:
 * El contenido del documento (Document Content) se serializa a un
 * único flujo de bytes determinista: claves ordenadas en cada objeto,
 * separadores mínimos, UTF-8 sin escape de no-ASCII y preservación
 * del token decimal original. El hash derivado de esos bytes es el
 * ÚNICO ancla de integridad entre generador y auditor.
 *
 * REGLA DE DISEÑO: Este aparato canoniza y hashea bytes. No parsea
 * PDFs, no aplica firmas, no interpreta semántica.
 * =================================================================
 */

mod codec;
mod errors;
mod hashing;

pub use codec::canonicalize;
pub use errors::{CanonicalError, ContentHashError};
pub use hashing::{content_hash, parse_content_hash, sha256_hex, HashAlgorithm};
