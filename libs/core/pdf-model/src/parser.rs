// [libs/core/pdf-model/src/parser.rs]
/*!
 * =================================================================
 * APARATO: RESYNCHRONIZING ARENA PARSER (V6.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: ESCANEO TOLERANTE DEL GRAFO DE OBJETOS INDIRECTOS
 *
 * Estrategia: barrido lineal de cabeceras 'N G obj'. Cada objeto se
 * parsea por descenso recursivo; el escáner continúa DESPUÉS del
 * cuerpo parseado (los datos binarios de streams jamás se confunden
 * con cabeceras). Ante un cuerpo malformado, el escáner se
 * resincroniza avanzando sobre la cabecera fallida.
 *
 * La última definición de un número de objeto gana: así el arena
 * refleja el estado vivo tras revisiones incrementales sin depender
 * de tablas xref clásicas ni de xref streams.
 * =================================================================
 */

use std::collections::BTreeMap;

use crate::atom::{ObjId, PdfAtom, PdfDict};
use crate::errors::PdfParseError;

/// Resultado del barrido: estado vivo + historial posicional.
pub(crate) struct ParsedArena {
    /// Definición viva (mayor offset) por número de objeto.
    pub latest: BTreeMap<u32, (u16, PdfAtom)>,
    /// Toda definición observada, en orden de aparición.
    pub definitions: Vec<(ObjId, usize)>,
}

pub(crate) fn parse_arena(bytes: &[u8]) -> Result<ParsedArena, PdfParseError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfParseError::Malformed(
            "missing %PDF- header".to_string(),
        ));
    }

    let mut latest: BTreeMap<u32, (u16, PdfAtom)> = BTreeMap::new();
    let mut definitions: Vec<(ObjId, usize)> = Vec::new();

    let mut scan_position = 0usize;

    while let Some(keyword_at) = find_keyword(bytes, b"obj", scan_position) {
        let Some((header_start, number, generation)) = read_header_backwards(bytes, keyword_at)
        else {
            scan_position = keyword_at + 3;
            continue;
        };

        let mut cursor = Cursor::new(bytes, keyword_at + 3);

        match cursor.parse_value() {
            Ok(atom) => {
                cursor.skip_whitespace();
                // 'endobj' tolerante: su ausencia no invalida el objeto ya
                // parseado, solo marca el punto de resincronización.
                if bytes[cursor.position..].starts_with(b"endobj") {
                    cursor.position += b"endobj".len();
                }

                let object_id = ObjId::new(number, generation);
                definitions.push((object_id, header_start));
                latest.insert(number, (generation, atom));
                scan_position = cursor.position;
            }
            Err(_) => {
                scan_position = keyword_at + 3;
            }
        }
    }

    if latest.is_empty() {
        return Err(PdfParseError::Malformed(
            "no indirect objects found".to_string(),
        ));
    }

    Ok(ParsedArena {
        latest,
        definitions,
    })
}

// ---------------------------------------------------------------------
// Léxico
// ---------------------------------------------------------------------

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(byte: u8) -> bool {
    !is_whitespace(byte) && !is_delimiter(byte)
}

/// Busca la próxima ocurrencia de una palabra clave con frontera de
/// token válida a ambos lados.
fn find_keyword(bytes: &[u8], keyword: &[u8], from: usize) -> Option<usize> {
    let mut position = from;
    while position + keyword.len() <= bytes.len() {
        if &bytes[position..position + keyword.len()] == keyword {
            let boundary_after = position + keyword.len() >= bytes.len()
                || !is_regular(bytes[position + keyword.len()]);
            let boundary_before = position == 0 || !is_regular(bytes[position - 1]);
            if boundary_after && boundary_before {
                return Some(position);
            }
        }
        position += 1;
    }
    None
}

/// Desde la posición de 'obj', retrocede leyendo '<número> <generación>'.
fn read_header_backwards(bytes: &[u8], keyword_at: usize) -> Option<(usize, u32, u16)> {
    let mut index = keyword_at;

    // espacios entre generación y 'obj'
    while index > 0 && is_whitespace(bytes[index - 1]) {
        index -= 1;
    }
    let generation_end = index;
    while index > 0 && bytes[index - 1].is_ascii_digit() {
        index -= 1;
    }
    let generation_start = index;
    if generation_start == generation_end {
        return None;
    }

    while index > 0 && is_whitespace(bytes[index - 1]) {
        index -= 1;
    }
    let number_end = index;
    while index > 0 && bytes[index - 1].is_ascii_digit() {
        index -= 1;
    }
    let number_start = index;
    if number_start == number_end || number_end == generation_start {
        return None;
    }

    if number_start > 0 && is_regular(bytes[number_start - 1]) {
        return None;
    }

    let number: u32 = std::str::from_utf8(&bytes[number_start..number_end])
        .ok()?
        .parse()
        .ok()?;
    let generation: u16 = std::str::from_utf8(&bytes[generation_start..generation_end])
        .ok()?
        .parse()
        .ok()?;

    Some((number_start, number, generation))
}

// ---------------------------------------------------------------------
// Descenso recursivo
// ---------------------------------------------------------------------

pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pub position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8], position: usize) -> Self {
        Self { bytes, position }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek() {
            if is_whitespace(byte) {
                self.position += 1;
            } else if byte == b'%' {
                // comentario hasta fin de línea
                while let Some(b) = self.peek() {
                    self.position += 1;
                    if b == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    pub fn parse_value(&mut self) -> Result<PdfAtom, PdfParseError> {
        self.skip_whitespace();

        match self.peek() {
            None => Err(PdfParseError::Malformed(
                "unexpected end of input".to_string(),
            )),
            Some(b'<') => {
                if self.bytes[self.position..].starts_with(b"<<") {
                    self.parse_dict_or_stream()
                } else {
                    self.parse_hex_string()
                }
            }
            Some(b'(') => self.parse_literal_string(),
            Some(b'/') => self.parse_name().map(PdfAtom::Name),
            Some(b'[') => self.parse_array(),
            Some(b't') | Some(b'f') | Some(b'n') => self.parse_keyword(),
            Some(byte) if byte == b'+' || byte == b'-' || byte == b'.' || byte.is_ascii_digit() => {
                self.parse_number_or_ref()
            }
            Some(byte) => Err(PdfParseError::Malformed(format!(
                "unexpected byte 0x{byte:02x} at offset {}",
                self.position
            ))),
        }
    }

    fn parse_keyword(&mut self) -> Result<PdfAtom, PdfParseError> {
        for (keyword, atom) in [
            (&b"true"[..], PdfAtom::Bool(true)),
            (&b"false"[..], PdfAtom::Bool(false)),
            (&b"null"[..], PdfAtom::Null),
        ] {
            if self.bytes[self.position..].starts_with(keyword) {
                self.position += keyword.len();
                return Ok(atom);
            }
        }
        Err(PdfParseError::Malformed(format!(
            "unknown keyword at offset {}",
            self.position
        )))
    }

    fn parse_name(&mut self) -> Result<String, PdfParseError> {
        // consume '/'
        self.position += 1;
        let mut name = String::new();

        while let Some(byte) = self.peek() {
            if !is_regular(byte) {
                break;
            }
            if byte == b'#' && self.position + 2 < self.bytes.len() {
                let hex = &self.bytes[self.position + 1..self.position + 3];
                if let Ok(decoded) =
                    u8::from_str_radix(std::str::from_utf8(hex).unwrap_or("zz"), 16)
                {
                    name.push(decoded as char);
                    self.position += 3;
                    continue;
                }
            }
            name.push(byte as char);
            self.position += 1;
        }

        Ok(name)
    }

    fn parse_array(&mut self) -> Result<PdfAtom, PdfParseError> {
        // consume '['
        self.position += 1;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b']') => {
                    self.position += 1;
                    return Ok(PdfAtom::Array(items));
                }
                Some(_) => items.push(self.parse_value()?),
                None => {
                    return Err(PdfParseError::Malformed(
                        "unterminated array".to_string(),
                    ))
                }
            }
        }
    }

    fn parse_dict_or_stream(&mut self) -> Result<PdfAtom, PdfParseError> {
        // consume '<<'
        self.position += 2;
        let mut dict = PdfDict::new();

        loop {
            self.skip_whitespace();
            if self.bytes[self.position..].starts_with(b">>") {
                self.position += 2;
                break;
            }
            match self.peek() {
                Some(b'/') => {
                    let key = self.parse_name()?;
                    let value = self.parse_value()?;
                    dict.insert(key, value);
                }
                Some(_) | None => {
                    return Err(PdfParseError::Malformed(
                        "dictionary key must be a name".to_string(),
                    ))
                }
            }
        }

        // ¿Sigue un stream?
        let checkpoint = self.position;
        self.skip_whitespace();
        if self.bytes[self.position..].starts_with(b"stream") {
            self.position += b"stream".len();
            if self.peek() == Some(b'\r') {
                self.position += 1;
            }
            if self.peek() == Some(b'\n') {
                self.position += 1;
            }
            let data = self.read_stream_data(&dict)?;
            return Ok(PdfAtom::Stream { dict, data });
        }
        self.position = checkpoint;

        Ok(PdfAtom::Dict(dict))
    }

    fn read_stream_data(&mut self, dict: &PdfDict) -> Result<Vec<u8>, PdfParseError> {
        let start = self.position;

        // Camino primario: /Length directo.
        if let Some(PdfAtom::Int(length)) = dict.get("Length") {
            let length = *length;
            if length >= 0 {
                let end = start
                    .checked_add(length as usize)
                    .filter(|end| *end <= self.bytes.len());
                if let Some(end) = end {
                    let after = &self.bytes[end..];
                    let after_trim_start = after
                        .iter()
                        .take_while(|b| is_whitespace(**b))
                        .count();
                    if after[after_trim_start..].starts_with(b"endstream") {
                        self.position = end + after_trim_start + b"endstream".len();
                        return Ok(self.bytes[start..end].to_vec());
                    }
                }
            }
        }

        // Camino de respaldo: /Length indirecto o inconsistente — se
        // busca el delimitador literal.
        match find_subslice(&self.bytes[start..], b"endstream") {
            Some(relative) => {
                let mut end = start + relative;
                // recorte del EOL previo al delimitador
                if end > start && self.bytes[end - 1] == b'\n' {
                    end -= 1;
                }
                if end > start && self.bytes[end - 1] == b'\r' {
                    end -= 1;
                }
                self.position = start + relative + b"endstream".len();
                Ok(self.bytes[start..end].to_vec())
            }
            None => Err(PdfParseError::Malformed(
                "stream without endstream delimiter".to_string(),
            )),
        }
    }

    fn parse_hex_string(&mut self) -> Result<PdfAtom, PdfParseError> {
        // consume '<'
        self.position += 1;
        let mut nibbles = Vec::new();

        while let Some(byte) = self.peek() {
            self.position += 1;
            match byte {
                b'>' => {
                    if nibbles.len() % 2 == 1 {
                        nibbles.push(b'0');
                    }
                    let mut decoded = Vec::with_capacity(nibbles.len() / 2);
                    for pair in nibbles.chunks(2) {
                        let high = (pair[0] as char).to_digit(16).ok_or_else(|| {
                            PdfParseError::Malformed("invalid hex string".to_string())
                        })?;
                        let low = (pair[1] as char).to_digit(16).ok_or_else(|| {
                            PdfParseError::Malformed("invalid hex string".to_string())
                        })?;
                        decoded.push(((high << 4) | low) as u8);
                    }
                    return Ok(PdfAtom::Str(decoded));
                }
                b if is_whitespace(b) => continue,
                b => nibbles.push(b),
            }
        }

        Err(PdfParseError::Malformed(
            "unterminated hex string".to_string(),
        ))
    }

    fn parse_literal_string(&mut self) -> Result<PdfAtom, PdfParseError> {
        // consume '('
        self.position += 1;
        let mut depth = 1usize;
        let mut decoded = Vec::new();

        while let Some(byte) = self.peek() {
            self.position += 1;
            match byte {
                b'\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(PdfParseError::Malformed(
                            "dangling escape in string".to_string(),
                        ));
                    };
                    self.position += 1;
                    match escaped {
                        b'n' => decoded.push(b'\n'),
                        b'r' => decoded.push(b'\r'),
                        b't' => decoded.push(b'\t'),
                        b'b' => decoded.push(0x08),
                        b'f' => decoded.push(0x0C),
                        b'(' => decoded.push(b'('),
                        b')' => decoded.push(b')'),
                        b'\\' => decoded.push(b'\\'),
                        b'\n' => {}
                        d if d.is_ascii_digit() => {
                            let mut octal = (d - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(next) if next.is_ascii_digit() && next < b'8' => {
                                        octal = octal * 8 + (next - b'0') as u32;
                                        self.position += 1;
                                    }
                                    _ => break,
                                }
                            }
                            decoded.push((octal & 0xFF) as u8);
                        }
                        other => decoded.push(other),
                    }
                }
                b'(' => {
                    depth += 1;
                    decoded.push(b'(');
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(PdfAtom::Str(decoded));
                    }
                    decoded.push(b')');
                }
                other => decoded.push(other),
            }
        }

        Err(PdfParseError::Malformed(
            "unterminated literal string".to_string(),
        ))
    }

    fn parse_number_or_ref(&mut self) -> Result<PdfAtom, PdfParseError> {
        let start = self.position;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.position += 1;
        }
        let mut saw_dot = false;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_digit() {
                self.position += 1;
            } else if byte == b'.' && !saw_dot {
                saw_dot = true;
                self.position += 1;
            } else {
                break;
            }
        }

        let token = std::str::from_utf8(&self.bytes[start..self.position])
            .map_err(|_| PdfParseError::Malformed("non-ascii number token".to_string()))?;

        if saw_dot {
            let value: f64 = token
                .parse()
                .map_err(|_| PdfParseError::Malformed(format!("bad real token '{token}'")))?;
            return Ok(PdfAtom::Real(value));
        }

        let value: i64 = token
            .parse()
            .map_err(|_| PdfParseError::Malformed(format!("bad integer token '{token}'")))?;

        // Lookahead de referencia indirecta: '<int> <int> R'
        let checkpoint = self.position;
        self.skip_whitespace();
        let gen_start = self.position;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.position += 1;
        }
        if self.position > gen_start {
            let generation_token =
                std::str::from_utf8(&self.bytes[gen_start..self.position]).unwrap_or("");
            self.skip_whitespace();
            if self.peek() == Some(b'R')
                && self
                    .bytes
                    .get(self.position + 1)
                    .map(|b| !is_regular(*b))
                    .unwrap_or(true)
            {
                if let (Ok(number), Ok(generation)) =
                    (u32::try_from(value.max(0)), generation_token.parse::<u16>())
                {
                    self.position += 1;
                    return Ok(PdfAtom::Ref(ObjId::new(number, generation)));
                }
            }
        }
        self.position = checkpoint;

        Ok(PdfAtom::Int(value))
    }
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
