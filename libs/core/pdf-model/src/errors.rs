// [libs/core/pdf-model/src/errors.rs]
//! =================================================================
//! APARATO: PDF PARSE ERRORS (V2.0)
//! RESPONSABILIDAD: FALLO DE PARSEO COMO CIUDADANO DE PRIMERA CLASE
//!
//! Disciplina de excepciones: los ayudantes del auditor capturan
//! ÚNICAMENTE esta clase. Errores de lógica (claves ausentes en
//! nuestros propios mapas, aritmética) NO se representan aquí y
//! propagan por su propio camino.
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfParseError {
    #[error("MALFORMED_CONTAINER: {0}")]
    Malformed(String),

    #[error("TRUNCATED_OBJECT: object {number} {generation} ends before 'endobj'")]
    TruncatedObject { number: u32, generation: u16 },

    #[error("MISSING_CATALOG: no /Type /Catalog object present in the arena")]
    MissingCatalog,

    #[error("UNSUPPORTED_FILTER: stream filter '/{0}' cannot be decoded")]
    UnsupportedFilter(String),

    #[error("STREAM_DECODE_FAILED: {0}")]
    StreamDecodeFailed(String),

    #[error("UNRESOLVED_REFERENCE: object {number} {generation} R not present in the arena")]
    UnresolvedReference { number: u32, generation: u16 },

    #[error("EMBEDDED_FILE_UNREADABLE: {0}")]
    EmbeddedFileUnreadable(String),
}
