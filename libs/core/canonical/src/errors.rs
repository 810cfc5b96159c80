// [libs/core/canonical/src/errors.rs]
//! =================================================================
//! APARATO: CANONICAL CODEC ERRORS (V2.1)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE CANONIZACIÓN Y ANCLAJE
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("INVALID_TYPE: Value at '{path}' is not representable as canonical JSON: {detail}")]
    InvalidType { path: String, detail: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentHashError {
    #[error("UNSUPPORTED_ALGORITHM: Declared hash algorithm '{0}' is not SHA-256")]
    UnsupportedAlgorithm(String),

    #[error("MALFORMED_DIGEST: Declared digest is not valid lowercase hexadecimal")]
    MalformedHex,

    #[error("DIGEST_LENGTH_MISMATCH: Expected 64 hex characters, got {0}")]
    WrongLength(usize),

    #[error("EMPTY_DECLARATION: Declared content hash is empty")]
    Empty,
}
