// [libs/domain/semantic/src/chunker.rs]
/*!
 * =================================================================
 * APARATO: DETERMINISTIC TEXT PROJECTIONS (V3.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: REBANADO Y SECCIONADO LOCALES DE LOS PASES
 *
 * Las proyecciones son locales a cada pase y JAMÁS mutan el contexto
 * compartido. Determinismo estricto: misma entrada, misma proyección.
 * =================================================================
 */

/// Rebanador determinista cabeza/cola con tope de caracteres.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicTextSlicer {
    pub max_chars: usize,
    pub head_chars: usize,
    pub tail_chars: usize,
}

impl DeterministicTextSlicer {
    pub fn new(max_chars: usize, head_chars: usize, tail_chars: usize) -> Self {
        Self {
            max_chars,
            head_chars,
            tail_chars,
        }
    }

    /// Proyección: texto íntegro bajo el tope; sobre el tope, cabeza +
    /// marcador de elisión + cola, respetando fronteras de carácter.
    pub fn slice(&self, text: &str) -> String {
        let total_chars = text.chars().count();
        if total_chars <= self.max_chars {
            return text.to_string();
        }

        let head: String = text.chars().take(self.head_chars).collect();
        let tail: String = text
            .chars()
            .skip(total_chars.saturating_sub(self.tail_chars))
            .collect();

        format!("{head}\n[...elided...]\n{tail}")
    }
}

/// Seccionador por párrafos con tope de tamaño de sección.
#[derive(Debug, Clone, Copy)]
pub struct SectionChunker {
    pub max_section_chars: usize,
}

impl SectionChunker {
    pub fn new(max_section_chars: usize) -> Self {
        Self { max_section_chars }
    }

    /// Divide en secciones sobre líneas en blanco; las secciones que
    /// exceden el tope se parten por longitud de caracteres.
    pub fn sections(&self, text: &str) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();

        for paragraph_block in text.split("\n\n") {
            let trimmed = paragraph_block.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.chars().count() <= self.max_section_chars {
                sections.push(trimmed.to_string());
                continue;
            }

            let characters: Vec<char> = trimmed.chars().collect();
            for window in characters.chunks(self.max_section_chars) {
                sections.push(window.iter().collect());
            }
        }

        sections
    }
}
