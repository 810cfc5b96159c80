// [libs/domain/semantic/src/prompt.rs]
/*!
 * =================================================================
 * APARATO: PROMPT ASSEMBLY CONTRACT (V4.0 - CACHE-STABLE)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE ENSAMBLADO DE 4 CAPAS
 *
 * Capas por llamada:
 *   1. Capa de Autoridad  (system, estática global)
 *   2. Capa de Datos      (snapshot semántico canónico, estático por
 *                          documento)
 *   3. Capa de Tarea      (instrucciones específicas del pase)
 *   4. Capa de Foco       (chunk opcional bajo análisis)
 *
 * INVARIANTE DE CACHÉ: el prefijo autoridad+snapshot DEBE ser
 * byte-idéntico en todos los pases de una corrida. La deriva aquí
 * destruye silenciosamente el caché de prompt del proveedor; el
 * pipeline la detecta hasheando el prefijo en cada pase.
 * =================================================================
 */

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Fragmento inmutable de prompt de un protocolo semántico.
/// Versionado, hasheable y auditable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFragment {
    pub protocol_id: String,
    pub protocol_version: String,
    pub pass_id: String,
    pub text: String,
}

impl PromptFragment {
    /// Identidad estable del prompt, segura para telemetría.
    pub fn prompt_id(&self) -> String {
        format!(
            "{}:{}:{}",
            self.protocol_id, self.protocol_version, self.pass_id
        )
    }
}

/// Snapshot semántico canónico (capa de datos, estática por corrida).
///
/// El payload se emite como JSON canónico (claves ordenadas,
/// separadores mínimos) para que dos corridas sobre el mismo
/// Document Content produzcan bytes idénticos.
pub fn canonical_semantic_snapshot(
    document_content: &Value,
    content_derived_text: &str,
) -> String {
    let canonical_payload = sigilo_core_canonical::canonicalize(document_content)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default();

    format!(
        "--- BEGIN CANONICAL SEMANTIC SNAPSHOT ---\n\n\
         STRUCTURED SEMANTIC PAYLOAD (CANONICAL JSON):\n\
         {canonical_payload}\n\n\
         DERIVED DOCUMENT TEXT (DETERMINISTIC PROJECTION):\n\
         {content_derived_text}\n\n\
         --- END CANONICAL SEMANTIC SNAPSHOT ---"
    )
}

/// Hash SHA-256 (hex) del prefijo autoridad+snapshot.
pub fn prefix_hash(authority_text: &str, snapshot: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(authority_text.as_bytes());
    hasher.update(b"\x00");
    hasher.update(snapshot.as_bytes());
    hex::encode(hasher.finalize())
}
