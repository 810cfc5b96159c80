// [libs/domain/models/src/bindings.rs]
//! =================================================================
//! APARATO: SEAL BINDINGS MODEL (V2.0)
//! RESPONSABILIDAD: METADATO SUPLEMENTAL DEL ANCLA DE INTEGRIDAD
//!
//! Los bindings viajan como 'bindings.json' (AFRelationship=/Supplement)
//! junto al Document Content. No se hashean; son suplementales. Un
//! bindings malformado se reduce a null sin error (el contrato de
//! extracción lo tolera; el chequeo de vínculo criptográfico decide).
//! =================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Draft,
    Final,
}

/// Metadato suplemental emitido junto al Document Content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealBindings {
    /// Ancla declarada: `SHA-256:<hex>` o hex desnudo (retro-compat).
    pub content_hash: String,

    /// Etiqueta del algoritmo declarado.
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    #[serde(default = "default_generation_mode")]
    pub generation_mode: GenerationMode,
}

fn default_hash_algorithm() -> String {
    "SHA-256".to_string()
}

fn default_generation_mode() -> GenerationMode {
    GenerationMode::Final
}

impl SealBindings {
    pub fn sealed(content_hash: String) -> Self {
        Self {
            content_hash,
            hash_algorithm: default_hash_algorithm(),
            generation_mode: GenerationMode::Final,
        }
    }

    /// Parseo tolerante desde un objeto JSON extraído del artefacto.
    /// Cualquier malformación reduce a `None` sin error.
    pub fn from_extracted(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let content_hash = object.get("content_hash")?.as_str()?.to_string();

        let hash_algorithm = object
            .get("hash_algorithm")
            .and_then(Value::as_str)
            .unwrap_or("SHA-256")
            .to_string();

        let generation_mode = match object.get("generation_mode").and_then(Value::as_str) {
            Some("draft") => GenerationMode::Draft,
            _ => GenerationMode::Final,
        };

        Some(Self {
            content_hash,
            hash_algorithm,
            generation_mode,
        })
    }
}
