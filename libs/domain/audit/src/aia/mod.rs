// [libs/domain/audit/src/aia/mod.rs]
/*!
 * =================================================================
 * APARATO: ARTIFACT INTEGRITY AUDIT (V6.0)
 * CLASIFICACIÓN: DOMAIN / AIA (ESTRATO L2)
 * RESPONSABILIDAD: RAÍZ DE CONFIANZA DEL AUDITOR
 *
 * Cadena determinista y libre de inteligencia. Orden estricto:
 *   1. Contenedor y archivado (cabecera, concatenación, clasificación
 *      incremental, identificación PDF/A)
 *   2. Extracción del Document Content y bindings
 *   3. Vínculo criptográfico (ancla SHA-256)
 * Aborta ante el primer hallazgo fatal (severidad CRITICAL). Los
 * hallazgos MAJOR continúan (incluido AIA-MAJ-008, diferido a STV).
 *
 * Este componente asume que el coordinador ya aplicó el gate de
 * habilitación; aquí no hay interpretación de configuración.
 * =================================================================
 */

mod binding;
mod container;
mod content;

use tracing::{info, instrument};

use sigilo_core_pdf::PdfDocument;
use sigilo_domain_models::{ArtifactIntegrityResult, Finding};

pub use binding::run_cryptographic_binding_checks;
pub use container::run_container_archival_checks;
pub use content::{run_content_extraction_checks, ContentExtractionOutcome};

/// Auditoría de integridad del artefacto (AIA).
pub struct ArtifactIntegrityAudit;

impl ArtifactIntegrityAudit {
    /// Ejecuta la cadena completa de chequeos deterministas.
    #[instrument(skip(pdf_bytes))]
    pub fn run(pdf_bytes: &[u8]) -> ArtifactIntegrityResult {
        let mut findings: Vec<Finding> = Vec::new();
        let mut checks_executed: Vec<String> = Vec::new();

        // --------------------------------------------------------------
        // 1. Contenedor y archivado
        // --------------------------------------------------------------
        checks_executed.push("container_archival_compliance".to_string());
        let container_findings = run_container_archival_checks(pdf_bytes);
        let container_fatal = has_fatal(&container_findings);
        findings.extend(container_findings);

        if container_fatal {
            return ArtifactIntegrityResult::failed(checks_executed, findings);
        }

        // El contenedor pasó sus chequeos fatales: el parseo es seguro.
        // Un fallo aquí sería error de lógica, no de parseo.
        let document = PdfDocument::parse(pdf_bytes)
            .expect("container checks guarantee a parseable artifact");

        // --------------------------------------------------------------
        // 2. Extracción del Document Content
        // --------------------------------------------------------------
        checks_executed.push("content_extraction".to_string());
        let extraction = run_content_extraction_checks(&document);
        let extraction_fatal = has_fatal(&extraction.findings);
        findings.extend(extraction.findings);

        if extraction_fatal {
            return ArtifactIntegrityResult::failed(checks_executed, findings);
        }

        // --------------------------------------------------------------
        // 3. Vínculo criptográfico
        // --------------------------------------------------------------
        checks_executed.push("cryptographic_binding".to_string());
        let binding_findings = run_cryptographic_binding_checks(
            extraction.document_content.as_ref(),
            extraction.bindings.as_ref(),
        );
        let binding_fatal = has_fatal(&binding_findings);
        findings.extend(binding_findings);

        if binding_fatal {
            return ArtifactIntegrityResult::failed(checks_executed, findings);
        }

        // --------------------------------------------------------------
        // Invariantes post-chequeo
        // --------------------------------------------------------------
        let document_content = extraction
            .document_content
            .expect("invariant violation: AIA passed but Document Content is missing");
        let content_derived_text = extraction
            .content_derived_text
            .expect("invariant violation: AIA passed but derived text is missing");

        // --------------------------------------------------------------
        // Texto visible (determinista, jamás gatea)
        // --------------------------------------------------------------
        // Una cadena vacía es un snapshot válido y autoritativo.
        let visible_text = document.visible_text();

        info!(
            "🧾 [AIA]: integrity chain passed ({} findings, {} checks)",
            findings.len(),
            checks_executed.len()
        );

        ArtifactIntegrityResult::new(
            true,
            checks_executed,
            findings,
            Some(document_content),
            Some(content_derived_text),
            Some(visible_text),
        )
        .expect("invariant violation: passed AIA result rejected its own signals")
    }
}

fn has_fatal(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_fatal)
}
