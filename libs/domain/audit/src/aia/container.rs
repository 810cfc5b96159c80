// [libs/domain/audit/src/aia/container.rs]
/*!
 * =================================================================
 * APARATO: CONTAINER & ARCHIVAL CHECKS (V6.0)
 * CLASIFICACIÓN: DOMAIN / AIA (ESTRATO L2)
 * RESPONSABILIDAD: VALIDACIÓN ESTRUCTURAL DEL CONTENEDOR PDF/A-3B
 *
 * Chequeos puramente estructurales; JAMÁS interpretan contenido.
 *
 * DISCIPLINA DE EXCEPCIONES (crítica): los ayudantes de firma
 * capturan ÚNICAMENTE PdfParseError. La cobertura del último
 * ByteRange es asimétrica por diseño: fallo de parseo ⇒ TRUE
 * conservador (sin hallazgo); ByteRange real pero corto ⇒ FALSE
 * (hallazgo diferido a STV). Errores de lógica propagan.
 * =================================================================
 */

use sigilo_core_pdf::{count_eof_markers, count_pdf_headers, extract_pdfa_identification, PdfDocument};
use sigilo_domain_models::{Finding, FindingCategory, Severity};

use crate::findings::{aia_finding, aia_stv_deferred_finding};

/// Ejecuta los chequeos de contenedor y archivado en orden estricto.
pub fn run_container_archival_checks(pdf_bytes: &[u8]) -> Vec<Finding> {
    let mut findings = Vec::new();

    // --------------------------------------------------------------
    // 1. Cabecera del contenedor
    // --------------------------------------------------------------
    if !pdf_bytes.starts_with(b"%PDF-") {
        findings.push(aia_finding(
            "AIA-CRIT-001",
            FindingCategory::Structure,
            Severity::Critical,
            "Invalid PDF header",
            "The file does not begin with a valid PDF header. This indicates the artifact \
             is not a valid PDF container."
                .to_string(),
            "The document cannot be parsed as a valid PDF and therefore cannot qualify as \
             an archival artifact.",
        ));
        return findings;
    }

    // --------------------------------------------------------------
    // 2. Flujos concatenados
    // --------------------------------------------------------------
    let header_count = count_pdf_headers(pdf_bytes);
    if header_count > 1 {
        findings.push(aia_finding(
            "AIA-CRIT-002",
            FindingCategory::Structure,
            Severity::Critical,
            "Concatenated PDF streams detected",
            format!(
                "The file contains {header_count} PDF headers, indicating multiple \
                 concatenated PDF streams."
            ),
            "Archival artifacts must consist of a single finalized PDF stream.",
        ));
        return findings;
    }

    // --------------------------------------------------------------
    // 3. Clasificación de actualizaciones incrementales
    // --------------------------------------------------------------
    let eof_count = count_eof_markers(pdf_bytes);
    if eof_count > 1 {
        if !has_signature_fields(pdf_bytes) {
            findings.push(aia_finding(
                "AIA-CRIT-002",
                FindingCategory::Structure,
                Severity::Critical,
                "Unsigned incremental PDF updates detected",
                format!(
                    "The PDF carries {eof_count} end-of-file markers but no signature \
                     fields. Incremental updates on an unsigned artifact break archival \
                     finality."
                ),
                "Archival artifacts must be finalized and immutable. Unsigned incremental \
                 updates break archival guarantees.",
            ));
            return findings;
        }

        if !last_signature_covers_full_document(pdf_bytes) {
            // No fatal: observación diferida a la capa criptográfica.
            findings.push(aia_stv_deferred_finding(
                "AIA-MAJ-008",
                "Bytes outside the final signature coverage",
                "The last signature's ByteRange does not cover the entire file: bytes \
                 were appended after the final signed revision."
                    .to_string(),
                "Unresolved post-signing bytes may carry unauthorized modifications. \
                 Seal Trust Verification must determine whether they fall within the \
                 DocMDP permission scope.",
            ));
        }
    }

    // --------------------------------------------------------------
    // 4. Sanidad de xref (mejor esfuerzo)
    // --------------------------------------------------------------
    // El lector de arena no expone secciones xref como API; la
    // evaluación imposible se omite en silencio.

    // --------------------------------------------------------------
    // 5. Identificación PDF/A (XMP)
    // --------------------------------------------------------------
    let document = match PdfDocument::parse(pdf_bytes) {
        Ok(document) => document,
        Err(parse_error) => {
            findings.push(aia_finding(
                "AIA-CRIT-007",
                FindingCategory::Structure,
                Severity::Critical,
                "PDF structural parsing failed",
                parse_error.to_string(),
                "Structural parsing failure indicates a malformed or corrupted PDF \
                 container.",
            ));
            return findings;
        }
    };

    match document.xmp_bytes() {
        None => findings.push(aia_finding(
            "AIA-MAJ-004",
            FindingCategory::Compliance,
            Severity::Major,
            "Missing PDF/A identification metadata",
            "No XMP metadata packet was found. PDF/A identification metadata is required."
                .to_string(),
            "Without PDF/A identification metadata, long-term archival compliance cannot \
             be established.",
        )),
        Some(xmp) => {
            let (part, conformance) = extract_pdfa_identification(&xmp);
            match (part, conformance) {
                (Some(part), Some(conformance)) => {
                    if part != "3" || conformance.to_ascii_uppercase() != "B" {
                        findings.push(aia_finding(
                            "AIA-MAJ-006",
                            FindingCategory::Compliance,
                            Severity::Major,
                            "PDF/A conformance mismatch",
                            format!(
                                "The document declares pdfaid:part={part} and \
                                 pdfaid:conformance={conformance}. Expected part=3 and \
                                 conformance=B."
                            ),
                            "The document may not satisfy archival requirements for \
                             PDF/A-3b.",
                        ));
                    }
                }
                _ => findings.push(aia_finding(
                    "AIA-MAJ-005",
                    FindingCategory::Compliance,
                    Severity::Major,
                    "Incomplete PDF/A identification metadata",
                    "The XMP metadata does not contain both pdfaid:part and \
                     pdfaid:conformance entries."
                        .to_string(),
                    "Incomplete PDF/A metadata prevents verification of archival \
                     conformance.",
                )),
            }
        }
    }

    findings
}

/// ¿Existen campos de firma? Captura SOLO PdfParseError: un artefacto
/// imparseable no puede acreditar firmas.
fn has_signature_fields(pdf_bytes: &[u8]) -> bool {
    match PdfDocument::parse(pdf_bytes) {
        Ok(document) => !document.signature_fields().is_empty(),
        Err(_parse_fault) => false,
    }
}

/// ¿El último ByteRange cubre el archivo completo?
///
/// Asimetría deliberada: fallo de parseo ⇒ TRUE conservador (la capa
/// criptográfica decidirá); ByteRange real pero corto ⇒ FALSE.
fn last_signature_covers_full_document(pdf_bytes: &[u8]) -> bool {
    let document = match PdfDocument::parse(pdf_bytes) {
        Ok(document) => document,
        Err(_parse_fault) => return true,
    };

    let fields = document.signature_fields();
    let Some(last_covered) = fields
        .iter()
        .filter_map(|field| {
            let range = field.byte_range.as_ref()?;
            if range.len() == 4 {
                Some(range[2] + range[3])
            } else {
                None
            }
        })
        .max()
    else {
        return true;
    };

    last_covered == pdf_bytes.len() as i64
}
