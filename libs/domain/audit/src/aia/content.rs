// [libs/domain/audit/src/aia/content.rs]
/*!
 * =================================================================
 * APARATO: EMBEDDED CONTENT EXTRACTION (V6.0)
 * CLASIFICACIÓN: DOMAIN / AIA (ESTRATO L2)
 * RESPONSABILIDAD: EXTRACCIÓN DEL DOCUMENT CONTENT AUTORITATIVO
 *
 * CONTRATO AUTORITATIVO:
 * - Exactamente UN archivo incrustado con AFRelationship=/Data.
 * - Ese archivo DEBE ser JSON válido y un objeto en el nivel superior.
 * - Los /Supplement son bindings suplementales; su malformación
 *   degrada a null sin error.
 *
 * Este módulo es la única autoridad sobre: Document Content,
 * bindings extraídos y la proyección textual derivada del contenido.
 * El texto visible de página NO se maneja aquí.
 * =================================================================
 */

use std::collections::BTreeSet;

use serde_json::Value;

use sigilo_core_pdf::PdfDocument;
use sigilo_domain_models::{Finding, FindingCategory, Severity};

use crate::findings::aia_finding;

/// Resultado autoritativo de la extracción de contenido.
pub struct ContentExtractionOutcome {
    pub findings: Vec<Finding>,
    pub document_content: Option<Value>,
    pub content_derived_text: Option<String>,
    pub bindings: Option<Value>,
}

impl ContentExtractionOutcome {
    fn failed(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            document_content: None,
            content_derived_text: None,
            bindings: None,
        }
    }
}

/// Extrae los archivos asociados por relación, de-duplicando los
/// filespecs indirectos que aparecen en /AF y en el árbol de nombres.
///
/// INVARIANTE ABSOLUTA: esta función no falla; lo ilegible se omite.
fn extract_embedded_payloads(document: &PdfDocument) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let mut data_payloads = Vec::new();
    let mut supplement_payloads = Vec::new();
    let mut seen_ids: BTreeSet<(u32, u16)> = BTreeSet::new();

    let mut handles = document.af_filespecs();
    handles.extend(document.name_tree_filespecs());

    for (object_id, filespec) in handles {
        if let Some(id) = object_id {
            if !seen_ids.insert((id.number, id.generation)) {
                continue;
            }
        }

        let Some(relationship) = document.af_relationship(filespec) else {
            continue;
        };

        let sink = match relationship {
            "Data" => &mut data_payloads,
            "Supplement" => &mut supplement_payloads,
            _ => continue,
        };

        match document.read_embedded_bytes(filespec) {
            Ok(payload) => sink.push(payload),
            Err(_unreadable) => continue,
        }
    }

    (data_payloads, supplement_payloads)
}

/// Chequeo AIA de presencia y extracción del Document Content.
pub fn run_content_extraction_checks(document: &PdfDocument) -> ContentExtractionOutcome {
    let mut findings = Vec::new();

    let (data_payloads, supplement_payloads) = extract_embedded_payloads(document);

    // --------------------------------------------------------------
    // Presencia del Document Content
    // --------------------------------------------------------------
    if data_payloads.len() != 1 {
        findings.push(aia_finding(
            "AIA-CRIT-020",
            FindingCategory::Structure,
            Severity::Critical,
            "Embedded Document Content missing or ambiguous",
            format!(
                "The PDF must contain exactly one embedded JSON file marked with \
                 AFRelationship=/Data to serve as the authoritative Document Content. \
                 Found {}.",
                data_payloads.len()
            ),
            "Without a single authoritative Document Content, the document's factual \
             content cannot be deterministically verified.",
        ));
        return ContentExtractionOutcome::failed(findings);
    }

    let content_bytes = &data_payloads[0];

    if content_bytes.is_empty() {
        findings.push(aia_finding(
            "AIA-CRIT-021",
            FindingCategory::Structure,
            Severity::Critical,
            "Embedded Document Content is empty",
            "The embedded Document Content contains no data.".to_string(),
            "An empty Document Content cannot represent authoritative document facts.",
        ));
        return ContentExtractionOutcome::failed(findings);
    }

    // --------------------------------------------------------------
    // Parseo del Document Content
    // --------------------------------------------------------------
    let content: Value = match serde_json::from_slice(content_bytes) {
        Ok(content) => content,
        Err(_malformed) => {
            findings.push(aia_finding(
                "AIA-CRIT-022",
                FindingCategory::Structure,
                Severity::Critical,
                "Embedded Document Content is not valid JSON",
                "The embedded Document Content could not be parsed as JSON.".to_string(),
                "Invalid JSON prevents deterministic interpretation and verification of \
                 document data.",
            ));
            return ContentExtractionOutcome::failed(findings);
        }
    };

    if !content.is_object() {
        findings.push(aia_finding(
            "AIA-CRIT-023",
            FindingCategory::Structure,
            Severity::Critical,
            "Embedded Document Content has invalid structure",
            "The embedded Document Content must be a JSON object at the top level."
                .to_string(),
            "A non-object Document Content cannot represent structured document facts.",
        ));
        return ContentExtractionOutcome::failed(findings);
    }

    // --------------------------------------------------------------
    // Bindings (opcionales, suplementales; malformación ⇒ null)
    // --------------------------------------------------------------
    let bindings = supplement_payloads
        .first()
        .and_then(|payload| serde_json::from_slice::<Value>(payload).ok())
        .filter(Value::is_object);

    // --------------------------------------------------------------
    // Proyección textual derivada (determinista, consultiva)
    // --------------------------------------------------------------
    let content_derived_text = derive_content_text(&content);

    ContentExtractionOutcome {
        findings,
        document_content: Some(content),
        content_derived_text: Some(content_derived_text),
        bindings,
    }
}

/// Proyección determinista: escalares del objeto superior en orden de
/// clave, unidos por salto de línea; si queda vacía, respaldo a la
/// representación canónica JSON.
fn derive_content_text(content: &Value) -> String {
    let object = content
        .as_object()
        .expect("caller guarantees a top-level object");

    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort_unstable();

    let mut parts: Vec<String> = Vec::new();
    for key in keys {
        match &object[key.as_str()] {
            Value::String(text) => parts.push(text.clone()),
            Value::Number(number) => parts.push(number.to_string()),
            Value::Bool(flag) => parts.push(flag.to_string()),
            _ => {}
        }
    }

    let joined = parts.join("\n").trim().to_string();
    if !joined.is_empty() {
        return joined;
    }

    sigilo_core_canonical::canonicalize(content)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}
