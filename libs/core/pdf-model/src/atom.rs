// [libs/core/pdf-model/src/atom.rs]
/*!
 * =================================================================
 * APARATO: PDF OBJECT VARIANT (V3.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: REPRESENTACIÓN ETIQUETADA DEL GRAFO DE OBJETOS
 *
 * Una referencia indirecta (Ref) es un valor puro; su resolución
 * ocurre contra la arena del documento, nunca por desreferencia
 * implícita.
 * =================================================================
 */

use std::collections::BTreeMap;

/// Identidad de un objeto indirecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjId {
    pub number: u32,
    pub generation: u16,
}

impl ObjId {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

/// Diccionario PDF: claves /Name sin la barra inicial.
/// BTreeMap garantiza serialización determinista.
pub type PdfDict = BTreeMap<String, PdfAtom>;

/// Variante etiquetada del espacio de objetos PDF.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfAtom {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    /// Cadena PDF cruda (literal u hex) ya decodificada a bytes.
    Str(Vec<u8>),
    /// Nombre sin la barra inicial, con escapes #XX ya resueltos.
    Name(String),
    Array(Vec<PdfAtom>),
    Dict(PdfDict),
    Stream {
        dict: PdfDict,
        data: Vec<u8>,
    },
    Ref(ObjId),
}

impl PdfAtom {
    pub fn as_dict(&self) -> Option<&PdfDict> {
        match self {
            PdfAtom::Dict(dict) => Some(dict),
            PdfAtom::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PdfAtom]> {
        match self {
            PdfAtom::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PdfAtom::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PdfAtom::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str_bytes(&self) -> Option<&[u8]> {
        match self {
            PdfAtom::Str(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<ObjId> {
        match self {
            PdfAtom::Ref(id) => Some(*id),
            _ => None,
        }
    }
}
