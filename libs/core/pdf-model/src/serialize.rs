// [libs/core/pdf-model/src/serialize.rs]
/*!
 * =================================================================
 * APARATO: PDF OBJECT SERIALIZER (V3.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: PROYECCIÓN DETERMINISTA DE ÁTOMOS A BYTES
 *
 * Reglas de emisión:
 * - Diccionarios en orden de clave (BTreeMap) — byte-determinista.
 * - Cadenas SIEMPRE como hex strings: representación única, segura
 *   para payloads binarios y para el parcheo posicional de /Contents.
 * - /Length de streams se emite desde la longitud real de los datos.
 * =================================================================
 */

use crate::atom::{PdfAtom, PdfDict};

/// Serializa un átomo al flujo de salida.
pub fn serialize_atom(atom: &PdfAtom, sink: &mut Vec<u8>) {
    match atom {
        PdfAtom::Null => sink.extend_from_slice(b"null"),
        PdfAtom::Bool(true) => sink.extend_from_slice(b"true"),
        PdfAtom::Bool(false) => sink.extend_from_slice(b"false"),
        PdfAtom::Int(value) => sink.extend_from_slice(value.to_string().as_bytes()),
        PdfAtom::Real(value) => sink.extend_from_slice(format!("{value}").as_bytes()),
        PdfAtom::Str(bytes) => {
            sink.push(b'<');
            for byte in bytes {
                sink.extend_from_slice(format!("{byte:02x}").as_bytes());
            }
            sink.push(b'>');
        }
        PdfAtom::Name(name) => {
            sink.push(b'/');
            for byte in name.bytes() {
                let regular = !matches!(
                    byte,
                    b'\0'..=b' '
                        | b'('
                        | b')'
                        | b'<'
                        | b'>'
                        | b'['
                        | b']'
                        | b'{'
                        | b'}'
                        | b'/'
                        | b'%'
                        | b'#'
                ) && byte < 0x7F;
                if regular {
                    sink.push(byte);
                } else {
                    sink.extend_from_slice(format!("#{byte:02X}").as_bytes());
                }
            }
        }
        PdfAtom::Array(items) => {
            sink.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    sink.push(b' ');
                }
                serialize_atom(item, sink);
            }
            sink.push(b']');
        }
        PdfAtom::Dict(dict) => serialize_dict(dict, sink),
        PdfAtom::Stream { dict, data } => {
            let mut with_length = dict.clone();
            with_length.insert("Length".to_string(), PdfAtom::Int(data.len() as i64));
            serialize_dict(&with_length, sink);
            sink.extend_from_slice(b"\nstream\n");
            sink.extend_from_slice(data);
            sink.extend_from_slice(b"\nendstream");
        }
        PdfAtom::Ref(id) => {
            sink.extend_from_slice(format!("{} {} R", id.number, id.generation).as_bytes());
        }
    }
}

fn serialize_dict(dict: &PdfDict, sink: &mut Vec<u8>) {
    sink.extend_from_slice(b"<<");
    for (key, value) in dict {
        serialize_atom(&PdfAtom::Name(key.clone()), sink);
        sink.push(b' ');
        serialize_atom(value, sink);
        sink.push(b' ');
    }
    sink.extend_from_slice(b">>");
}
