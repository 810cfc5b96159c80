// [libs/core/pdf-model/src/incremental.rs]
/*!
 * =================================================================
 * APARATO: INCREMENTAL REVISION WRITER (V5.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: REVISIONES APPEND-ONLY DEL ARTEFACTO
 *
 * Disciplina incremental estricta: cada revisión agrega objetos, una
 * sección xref clásica con subsecciones por corridas consecutivas,
 * un trailer con /Prev encadenado y un marcador %%EOF. Los bytes
 * previos JAMÁS se reescriben.
 * =================================================================
 */

use std::collections::BTreeMap;

use crate::atom::{ObjId, PdfAtom, PdfDict};
use crate::parser::find_subslice;
use crate::serialize::serialize_atom;

/// Constructor de una revisión incremental.
pub struct RevisionBuilder {
    objects: Vec<(ObjId, PdfAtom)>,
}

impl Default for RevisionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionBuilder {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Registra (o reemplaza en esta revisión) un objeto indirecto.
    pub fn put(&mut self, id: ObjId, atom: PdfAtom) -> &mut Self {
        self.objects.retain(|(existing, _)| *existing != id);
        self.objects.push((id, atom));
        self
    }

    /// Anexa la revisión a los bytes base.
    ///
    /// Retorna el nuevo buffer (los bytes base intactos al frente) y
    /// el offset absoluto de cada objeto emitido.
    ///
    /// `root`: referencia viva del catálogo. `size`: máximo número de
    /// objeto conocido + 1 (dominio del llamador, que posee la arena).
    pub fn append_to(
        &self,
        base: &[u8],
        root: ObjId,
        size: u32,
    ) -> (Vec<u8>, BTreeMap<u32, usize>) {
        let previous_xref_offset = locate_previous_startxref(base);

        let mut out = base.to_vec();
        if out.last() != Some(&b'\n') {
            out.push(b'\n');
        }

        // 1. Emisión de objetos
        let mut offsets: BTreeMap<u32, usize> = BTreeMap::new();
        let mut entries: Vec<(u32, u16, usize)> = Vec::new();

        for (id, atom) in &self.objects {
            let offset = out.len();
            offsets.insert(id.number, offset);
            entries.push((id.number, id.generation, offset));

            out.extend_from_slice(format!("{} {} obj\n", id.number, id.generation).as_bytes());
            serialize_atom(atom, &mut out);
            out.extend_from_slice(b"\nendobj\n");
        }

        // 2. Sección xref (subsecciones por corridas consecutivas)
        entries.sort_by_key(|(number, _, _)| *number);
        let xref_offset = out.len();
        out.extend_from_slice(b"xref\n");

        let mut index = 0usize;
        while index < entries.len() {
            let run_start = entries[index].0;
            let mut run_length = 1usize;
            while index + run_length < entries.len()
                && entries[index + run_length].0 == run_start + run_length as u32
            {
                run_length += 1;
            }

            out.extend_from_slice(format!("{run_start} {run_length}\n").as_bytes());
            for (_, generation, offset) in &entries[index..index + run_length] {
                out.extend_from_slice(format!("{offset:010} {generation:05} n \n").as_bytes());
            }

            index += run_length;
        }

        // 3. Trailer encadenado
        let mut trailer = PdfDict::new();
        trailer.insert("Size".to_string(), PdfAtom::Int(size as i64));
        trailer.insert("Root".to_string(), PdfAtom::Ref(root));
        if let Some(previous) = previous_xref_offset {
            trailer.insert("Prev".to_string(), PdfAtom::Int(previous as i64));
        }

        out.extend_from_slice(b"trailer\n");
        serialize_atom(&PdfAtom::Dict(trailer), &mut out);
        out.extend_from_slice(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());

        (out, offsets)
    }
}

/// Localiza el offset anunciado por el último 'startxref' de la base.
fn locate_previous_startxref(base: &[u8]) -> Option<usize> {
    let mut last_match: Option<usize> = None;
    let mut from = 0usize;
    while let Some(relative) = find_subslice(&base[from..], b"startxref") {
        last_match = Some(from + relative);
        from += relative + b"startxref".len();
    }

    let keyword_at = last_match?;
    let tail = &base[keyword_at + b"startxref".len()..];

    let digits: Vec<u8> = tail
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .copied()
        .collect();

    std::str::from_utf8(&digits).ok()?.parse().ok()
}
