// [libs/domain/semantic/src/protocol.rs]
/*!
 * =================================================================
 * APARATO: SDVP PROTOCOL DECLARATION (V6.0 - FROZEN)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: IDENTIDAD Y ORDEN DEL PROTOCOLO SEMÁNTICO
 *
 * SDVP — Sealed Document Verification Protocol. Este módulo es
 * puramente declarativo y autoritativo:
 * - NO contiene lógica semántica
 * - NO ejecuta pases
 * - NO toma decisiones de auditoría ni de entrega
 *
 * El orden de pases es POR PASS ID y NO cambia sin bump de versión
 * del protocolo.
 * =================================================================
 */

use crate::chunker::DeterministicTextSlicer;

/// Identidad congelada del protocolo.
pub const SDVP_PROTOCOL_ID: &str = "SDVP";
pub const SDVP_PROTOCOL_VERSION: &str = "1.2";

/// Orden autoritativo de pases.
pub const SDVP_PASS_ORDER: [&str; 8] = ["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8"];

/// Plano declarativo de un pase.
#[derive(Debug, Clone)]
pub struct PassBlueprint {
    pub pass_id: &'static str,
    pub name: &'static str,
    /// Capa de tarea (estática por versión del protocolo).
    pub task_text: &'static str,
    /// Proyección local del texto derivado, si el pase la usa.
    pub slicer: Option<DeterministicTextSlicer>,
    /// Pase de disposición de entrega (P8): recibe hallazgos previos y
    /// emite recomendación + señales consultivas.
    pub is_delivery_pass: bool,
}

/// Planos de los ocho pases SDVP, en orden congelado.
pub fn sdvp_blueprints() -> Vec<PassBlueprint> {
    vec![
        PassBlueprint {
            pass_id: "P1",
            name: "Context & Classification",
            task_text: "Classify the sealed document's context: its declared purpose, the \
                        parties or systems involved, and whether the structured payload is \
                        coherent with that classification. Report contradictions or \
                        ambiguities as findings with rule_id values from the P1 rule set.",
            slicer: Some(DeterministicTextSlicer::new(6_000, 4_000, 2_000)),
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P2",
            name: "Presentation & Usability",
            task_text: "Evaluate whether the visible rendering faithfully presents the \
                        structured payload: missing fields, truncated values, or visible \
                        text that diverges from the authoritative content. Emit findings \
                        with rule_id values from the P2 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P3",
            name: "Clarity & Accessibility",
            task_text: "Assess clarity and accessibility of the document's language: \
                        undefined jargon, ambiguous references, unreadable constructions. \
                        Emit findings with rule_id values from the P3 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P4",
            name: "Structural Integrity",
            task_text: "Verify the internal structure of the payload: required sections, \
                        cross-references between fields, identifier formats. Emit findings \
                        with rule_id values from the P4 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P5",
            name: "Accuracy",
            task_text: "Check factual self-consistency of the payload: dates, amounts, \
                        arithmetic, units. Only report inconsistencies internal to the \
                        document; never assert external truth. Use rule_id values from \
                        the P5 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P6",
            name: "Completeness",
            task_text: "Determine whether the document is complete for its declared \
                        purpose: missing obligations, unreferenced attachments, empty \
                        mandatory values. Use rule_id values from the P6 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P7",
            name: "Risk & Compliance",
            task_text: "Surface risk signals only: clauses or values that merit human \
                        review. Findings are advisory risk signals, never legal \
                        determinations. Use rule_id values from the P7 rule set.",
            slicer: None,
            is_delivery_pass: false,
        },
        PassBlueprint {
            pass_id: "P8",
            name: "Delivery Readiness",
            task_text: "Synthesize the prior passes' findings into a delivery readiness \
                        assessment. Emit a delivery_recommendation and, when warranted, \
                        the advisory signals DELIVERY_REVIEW_REQUIRED or \
                        DELIVERY_NOT_RECOMMENDED. Use rule_id values from the P8 rule set.",
            slicer: None,
            is_delivery_pass: true,
        },
    ]
}

/// Valida forma y orden de una secuencia de pases contra el protocolo.
pub fn validate_pass_order(blueprints: &[PassBlueprint]) -> Result<(), String> {
    if blueprints.len() != SDVP_PASS_ORDER.len() {
        return Err(format!(
            "SDVP requires {} passes (P1–P8), received {}",
            SDVP_PASS_ORDER.len(),
            blueprints.len()
        ));
    }

    for (expected, blueprint) in SDVP_PASS_ORDER.iter().zip(blueprints) {
        if blueprint.pass_id != *expected {
            return Err(format!(
                "SDVP pass ordering mismatch: expected {expected}, got {}",
                blueprint.pass_id
            ));
        }
    }

    Ok(())
}
