// [libs/core/canonical/src/codec.rs]
/*!
 * =================================================================
 * APARATO: DETERMINISTIC JSON CANONICALIZER (V4.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: PROYECCIÓN BYTE-EXACTA DEL DOCUMENT CONTENT
 *
 * # Mathematical Proof (Byte Determinism):
 * Para todo par de objetos D, D' idénticos salvo el orden de claves,
 * canonicalize(D) == canonicalize(D') byte a byte: el recorrido
 * ordena las claves en CADA nivel de objeto y la gramática de salida
 * no contiene espacios ni decisiones dependientes de locale.
 * =================================================================
 */

use serde_json::Value;

use crate::errors::CanonicalError;

/// Produce los bytes canónicos de un Document Content.
///
/// Gramática de salida:
/// - claves ordenadas (orden binario de UTF-8) en cada objeto
/// - separadores mínimos `","` y `":"`
/// - no-ASCII preservado sin escape
/// - números emitidos con su token de precisión arbitraria original
///
/// # Errors
/// `CanonicalError::InvalidType` si el grafo contiene un valor sin
/// representación canónica (número no-finito construido fuera del
/// espacio JSON).
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    let mut sink = Vec::with_capacity(256);
    write_value(value, "$", &mut sink)?;
    Ok(sink)
}

fn write_value(value: &Value, path: &str, sink: &mut Vec<u8>) -> Result<(), CanonicalError> {
    match value {
        Value::Null => sink.extend_from_slice(b"null"),
        Value::Bool(true) => sink.extend_from_slice(b"true"),
        Value::Bool(false) => sink.extend_from_slice(b"false"),
        Value::Number(number) => {
            // Con 'arbitrary_precision' el token original del payload se
            // conserva íntegro; un número no-finito no tiene token JSON.
            let token = number.to_string();
            if token.is_empty() || token == "NaN" || token.ends_with("inf") {
                return Err(CanonicalError::InvalidType {
                    path: path.to_string(),
                    detail: format!("non-finite numeric token '{token}'"),
                });
            }
            sink.extend_from_slice(token.as_bytes());
        }
        Value::String(text) => write_string(text, sink),
        Value::Array(items) => {
            sink.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    sink.push(b',');
                }
                write_value(item, &format!("{path}[{index}]"), sink)?;
            }
            sink.push(b']');
        }
        Value::Object(entries) => {
            // Orden explícito: no dependemos de la representación interna
            // del mapa (BTree vs preserve_order).
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort_unstable();

            sink.push(b'{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    sink.push(b',');
                }
                write_string(key, sink);
                sink.push(b':');
                write_value(&entries[key.as_str()], &format!("{path}.{key}"), sink)?;
            }
            sink.push(b'}');
        }
    }

    Ok(())
}

/// Escape mínimo compatible con JSON: comillas, barra invertida y
/// caracteres de control. Todo lo demás (incluido no-ASCII) se emite
/// como UTF-8 crudo.
fn write_string(text: &str, sink: &mut Vec<u8>) {
    sink.push(b'"');
    for character in text.chars() {
        match character {
            '"' => sink.extend_from_slice(b"\\\""),
            '\\' => sink.extend_from_slice(b"\\\\"),
            '\u{0008}' => sink.extend_from_slice(b"\\b"),
            '\u{000C}' => sink.extend_from_slice(b"\\f"),
            '\n' => sink.extend_from_slice(b"\\n"),
            '\r' => sink.extend_from_slice(b"\\r"),
            '\t' => sink.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                sink.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut utf8_buffer = [0u8; 4];
                sink.extend_from_slice(c.encode_utf8(&mut utf8_buffer).as_bytes());
            }
        }
    }
    sink.push(b'"');
}
