// [libs/core/canonical/src/hashing.rs]
/*!
 * =================================================================
 * APARATO: CONTENT HASH ANCHOR (V3.2)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: ANCLA DE INTEGRIDAD SHA-256 SOBRE BYTES CANÓNICOS
 *
 * REGLA DE DISEÑO: Este módulo hashea bytes, y SOLO bytes. La
 * canonización ocurre fuera; aquí no hay serialización, ni
 * normalización, ni transformación de ningún tipo.
 * =================================================================
 */

use sha2::{Digest, Sha256};

use crate::errors::ContentHashError;

/// Algoritmo soportado por el ancla de integridad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
}

impl HashAlgorithm {
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
        }
    }
}

/// Digest SHA-256 en hexadecimal minúsculo.
pub fn sha256_hex(canonical_bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(canonical_bytes))
}

/// Ancla de integridad legible con prefijo explícito de algoritmo.
///
/// Ejemplo: `SHA-256:3b7c0e4c…`
pub fn content_hash(canonical_bytes: &[u8]) -> String {
    format!("SHA-256:{}", sha256_hex(canonical_bytes))
}

/// Parsea un ancla declarada.
///
/// Acepta hex desnudo (compatibilidad retroactiva) o `ALGO:hex`.
/// Cualquier algoritmo distinto de SHA-256 se rechaza.
pub fn parse_content_hash(declared: &str) -> Result<(HashAlgorithm, String), ContentHashError> {
    let trimmed = declared.trim();
    if trimmed.is_empty() {
        return Err(ContentHashError::Empty);
    }

    let (algorithm_label, digest_hex) = match trimmed.split_once(':') {
        Some((label, rest)) => (label, rest),
        None => ("SHA-256", trimmed),
    };

    if !algorithm_label.eq_ignore_ascii_case("SHA-256") {
        return Err(ContentHashError::UnsupportedAlgorithm(
            algorithm_label.to_string(),
        ));
    }

    if digest_hex.len() != 64 {
        return Err(ContentHashError::WrongLength(digest_hex.len()));
    }

    if !digest_hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ContentHashError::MalformedHex);
    }

    Ok((HashAlgorithm::Sha256, digest_hex.to_ascii_lowercase()))
}
