// [libs/core/pdf-model/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PDF/A-3 ARTIFACT MODEL (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: LECTURA TOLERANTE Y ESCRITURA INCREMENTAL DEL
 *                  CONTENEDOR ARCHIVÍSTICO
 *
 * VISION HIPER-HOLÍSTICA:
 * Los objetos PDF se modelan como variante etiquetada (PdfAtom) con
 * una arena de objetos resueltos por número: una referencia indirecta
 * es un VALOR puro, no un puntero. Los lectores jamás mutan la
 * fuente; las escrituras son estrictamente incrementales (append de
 * sección xref + %%EOF, los bytes previos nunca se reescriben).
 *
 * El fallo de parseo es de primera clase: un PDF malformado emerge
 * como PdfParseError, distinguible de errores de lógica.
 * =================================================================
 */

mod atom;
mod document;
mod errors;
mod factory;
mod incremental;
mod parser;
mod revisions;
mod serialize;

pub use atom::{ObjId, PdfAtom, PdfDict};
pub use document::{extract_pdfa_identification, PdfDocument, SignatureField};
pub use errors::PdfParseError;
pub use factory::ArtifactFactory;
pub use incremental::RevisionBuilder;
pub use revisions::{
    append_dss_revision, append_signature_revision, read_dss, read_dss_streams, splice_contents,
    DssMaterial, SignatureRevisionSpec, SignatureSkeleton, SUBFILTER_PKCS7_DETACHED,
    SUBFILTER_RFC3161,
};
pub use serialize::serialize_atom;

/// Cuenta ocurrencias del encabezado `%PDF-` en el flujo completo.
pub fn count_pdf_headers(bytes: &[u8]) -> usize {
    count_occurrences(bytes, b"%PDF-")
}

/// Cuenta marcadores `%%EOF` (uno por revisión incremental).
pub fn count_eof_markers(bytes: &[u8]) -> usize {
    count_occurrences(bytes, b"%%EOF")
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| w == &needle).count()
}
