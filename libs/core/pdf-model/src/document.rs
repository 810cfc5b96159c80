// [libs/core/pdf-model/src/document.rs]
/*!
 * =================================================================
 * APARATO: PDF DOCUMENT READERS (V6.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: OPERACIONES DE LECTURA SOBRE LA ARENA RESUELTA
 *
 * Todas las operaciones de lectura toleran indirección de objetos y
 * JAMÁS mutan la fuente. La resolución de referencias es explícita
 * contra la arena; una referencia no resoluble degrada a Null en los
 * caminos tolerantes y a error tipado en los caminos estrictos.
 * =================================================================
 */

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::atom::{ObjId, PdfAtom, PdfDict};
use crate::errors::PdfParseError;
use crate::parser::parse_arena;

static NULL_ATOM: PdfAtom = PdfAtom::Null;

/// Campo de firma extraído de /AcroForm.Fields (FT=Sig con /V).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
    pub field_name: Option<String>,
    pub subfilter: Option<String>,
    pub byte_range: Option<Vec<i64>>,
    pub contents: Option<Vec<u8>>,
    /// Permiso DocMDP declarado (/P de TransformParams), si existe.
    pub docmdp_permission: Option<i64>,
}

impl SignatureField {
    /// ¿El ByteRange cubre el archivo completo? `o2 + l2 == len`.
    pub fn covers_entire_file(&self, file_length: usize) -> Option<bool> {
        let range = self.byte_range.as_ref()?;
        if range.len() != 4 {
            return None;
        }
        let end = range[2].checked_add(range[3])?;
        Some(end == file_length as i64)
    }
}

/// Documento parseado: arena viva + historial posicional.
pub struct PdfDocument {
    arena: BTreeMap<u32, (u16, PdfAtom)>,
    definitions: Vec<(ObjId, usize)>,
    catalog_number: u32,
    catalog_generation: u16,
    file_length: usize,
}

impl PdfDocument {
    /// Parsea el flujo completo. Malformación ⇒ `PdfParseError`.
    pub fn parse(bytes: &[u8]) -> Result<Self, PdfParseError> {
        let parsed = parse_arena(bytes)?;

        // El catálogo vivo es la definición /Type /Catalog de mayor offset.
        let mut catalog_number: Option<(u32, usize)> = None;
        for (object_id, offset) in &parsed.definitions {
            if let Some((_, atom)) = parsed.latest.get(&object_id.number) {
                let is_catalog = atom
                    .as_dict()
                    .and_then(|d| d.get("Type"))
                    .and_then(PdfAtom::as_name)
                    == Some("Catalog");
                if is_catalog {
                    match catalog_number {
                        Some((_, best)) if best >= *offset => {}
                        _ => catalog_number = Some((object_id.number, *offset)),
                    }
                }
            }
        }

        let catalog_number = catalog_number
            .map(|(number, _)| number)
            .ok_or(PdfParseError::MissingCatalog)?;

        let catalog_generation = parsed
            .latest
            .get(&catalog_number)
            .map(|(generation, _)| *generation)
            .unwrap_or(0);

        Ok(Self {
            arena: parsed.latest,
            definitions: parsed.definitions,
            catalog_number,
            catalog_generation,
            file_length: bytes.len(),
        })
    }

    /// Identidad del objeto catálogo vivo.
    pub fn catalog_id(&self) -> ObjId {
        ObjId::new(self.catalog_number, self.catalog_generation)
    }

    /// Mayor número de objeto presente en la arena.
    pub fn max_object_number(&self) -> u32 {
        self.arena.keys().next_back().copied().unwrap_or(0)
    }

    /// Identidad del primer objeto /Type /Page de la arena.
    pub fn first_page_id(&self) -> Option<ObjId> {
        self.arena
            .iter()
            .find(|(_, (_, atom))| {
                atom.as_dict()
                    .and_then(|d| d.get("Type"))
                    .and_then(PdfAtom::as_name)
                    == Some("Page")
            })
            .map(|(number, (generation, _))| ObjId::new(*number, *generation))
    }

    pub fn file_length(&self) -> usize {
        self.file_length
    }

    /// Historial posicional de definiciones (orden de aparición).
    pub fn definitions(&self) -> &[(ObjId, usize)] {
        &self.definitions
    }

    pub fn object(&self, number: u32) -> Option<&PdfAtom> {
        self.arena.get(&number).map(|(_, atom)| atom)
    }

    /// Resolución tolerante: referencias no resolubles degradan a Null.
    pub fn resolve<'a>(&'a self, atom: &'a PdfAtom) -> &'a PdfAtom {
        let mut current = atom;
        for _ in 0..32 {
            match current {
                PdfAtom::Ref(id) => match self.object(id.number) {
                    Some(target) => current = target,
                    None => return &NULL_ATOM,
                },
                other => return other,
            }
        }
        &NULL_ATOM
    }

    /// Resolución estricta para caminos que exigen presencia.
    pub fn resolve_required<'a>(
        &'a self,
        atom: &'a PdfAtom,
    ) -> Result<&'a PdfAtom, PdfParseError> {
        let mut current = atom;
        for _ in 0..32 {
            match current {
                PdfAtom::Ref(id) => match self.object(id.number) {
                    Some(target) => current = target,
                    None => {
                        return Err(PdfParseError::UnresolvedReference {
                            number: id.number,
                            generation: id.generation,
                        })
                    }
                },
                other => return Ok(other),
            }
        }
        Err(PdfParseError::Malformed(
            "reference chain exceeds resolution depth".to_string(),
        ))
    }

    pub fn catalog(&self) -> &PdfDict {
        // El número de catálogo se validó en parse(); un catálogo sin
        // diccionario sería un error de lógica, no de parseo.
        self.object(self.catalog_number)
            .and_then(PdfAtom::as_dict)
            .expect("catalog object validated at parse time")
    }

    /// Recorre el árbol /Pages recolectando diccionarios /Type /Page.
    pub fn pages(&self) -> Vec<&PdfDict> {
        let mut pages = Vec::new();
        let mut visited: BTreeSet<u32> = BTreeSet::new();

        let root = match self.catalog().get("Pages") {
            Some(node) => node,
            None => return pages,
        };

        self.collect_pages(root, &mut pages, &mut visited, 0);
        pages
    }

    fn collect_pages<'a>(
        &'a self,
        node: &'a PdfAtom,
        pages: &mut Vec<&'a PdfDict>,
        visited: &mut BTreeSet<u32>,
        depth: usize,
    ) {
        if depth > 64 {
            return;
        }

        if let PdfAtom::Ref(id) = node {
            if !visited.insert(id.number) {
                return;
            }
        }

        let Some(dict) = self.resolve(node).as_dict() else {
            return;
        };

        match dict.get("Type").and_then(PdfAtom::as_name) {
            Some("Page") => pages.push(dict),
            _ => {
                if let Some(kids) = dict.get("Kids").map(|k| self.resolve(k)) {
                    if let Some(items) = kids.as_array() {
                        for kid in items {
                            self.collect_pages(kid, pages, visited, depth + 1);
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Firmas
    // -----------------------------------------------------------------

    /// Enumera campos de firma (`/FT /Sig` con `/V`) de /AcroForm.Fields.
    pub fn signature_fields(&self) -> Vec<SignatureField> {
        let mut fields = Vec::new();

        let Some(acroform) = self
            .catalog()
            .get("AcroForm")
            .map(|a| self.resolve(a))
            .and_then(PdfAtom::as_dict)
        else {
            return fields;
        };

        let Some(field_refs) = acroform
            .get("Fields")
            .map(|f| self.resolve(f))
            .and_then(PdfAtom::as_array)
        else {
            return fields;
        };

        for field_ref in field_refs {
            let Some(field) = self.resolve(field_ref).as_dict() else {
                continue;
            };

            if field.get("FT").and_then(PdfAtom::as_name) != Some("Sig") {
                continue;
            }

            let field_name = field
                .get("T")
                .map(|t| self.resolve(t))
                .and_then(PdfAtom::as_str_bytes)
                .map(|b| String::from_utf8_lossy(b).into_owned());

            let Some(value) = field
                .get("V")
                .map(|v| self.resolve(v))
                .and_then(PdfAtom::as_dict)
            else {
                continue;
            };

            let subfilter = value
                .get("SubFilter")
                .map(|s| self.resolve(s))
                .and_then(PdfAtom::as_name)
                .map(str::to_string);

            let byte_range = value
                .get("ByteRange")
                .map(|b| self.resolve(b))
                .and_then(PdfAtom::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|i| self.resolve(i).as_int())
                        .collect::<Vec<i64>>()
                });

            let contents = value
                .get("Contents")
                .map(|c| self.resolve(c))
                .and_then(PdfAtom::as_str_bytes)
                .map(|b| b.to_vec());

            let docmdp_permission = self.docmdp_permission_of(value);

            fields.push(SignatureField {
                field_name,
                subfilter,
                byte_range,
                contents,
                docmdp_permission,
            });
        }

        fields
    }

    fn docmdp_permission_of(&self, signature_value: &PdfDict) -> Option<i64> {
        let references = signature_value
            .get("Reference")
            .map(|r| self.resolve(r))
            .and_then(PdfAtom::as_array)?;

        for reference in references {
            let Some(sig_ref) = self.resolve(reference).as_dict() else {
                continue;
            };
            if sig_ref.get("TransformMethod").and_then(PdfAtom::as_name) != Some("DocMDP") {
                continue;
            }
            let params = sig_ref
                .get("TransformParams")
                .map(|p| self.resolve(p))
                .and_then(PdfAtom::as_dict);

            // /P por defecto es 2 cuando TransformParams lo omite.
            return Some(
                params
                    .and_then(|p| p.get("P"))
                    .map(|p| self.resolve(p))
                    .and_then(PdfAtom::as_int)
                    .unwrap_or(2),
            );
        }

        None
    }

    // -----------------------------------------------------------------
    // Archivos asociados (PDF/A-3)
    // -----------------------------------------------------------------

    /// Filespecs del arreglo /AF del catálogo y de cada página.
    ///
    /// Cada entrada porta su identidad de objeto cuando es indirecta,
    /// para permitir de-duplicación entre mecanismos de asociación.
    pub fn af_filespecs(&self) -> Vec<(Option<ObjId>, &PdfDict)> {
        let mut filespecs = Vec::new();

        if let Some(af) = self
            .catalog()
            .get("AF")
            .map(|a| self.resolve(a))
            .and_then(PdfAtom::as_array)
        {
            for filespec in af {
                if let Some(dict) = self.resolve(filespec).as_dict() {
                    filespecs.push((filespec.as_ref_id(), dict));
                }
            }
        }

        for page in self.pages() {
            if let Some(af) = page
                .get("AF")
                .map(|a| self.resolve(a))
                .and_then(PdfAtom::as_array)
            {
                for filespec in af {
                    if let Some(dict) = self.resolve(filespec).as_dict() {
                        filespecs.push((filespec.as_ref_id(), dict));
                    }
                }
            }
        }

        filespecs
    }

    /// Filespecs del árbol de nombres /Names → /EmbeddedFiles.
    pub fn name_tree_filespecs(&self) -> Vec<(Option<ObjId>, &PdfDict)> {
        let mut filespecs = Vec::new();

        let Some(tree) = self
            .catalog()
            .get("Names")
            .map(|n| self.resolve(n))
            .and_then(PdfAtom::as_dict)
            .and_then(|names| names.get("EmbeddedFiles"))
            .map(|t| self.resolve(t))
            .and_then(PdfAtom::as_dict)
        else {
            return filespecs;
        };

        self.collect_name_tree(tree, &mut filespecs, 0);
        filespecs
    }

    fn collect_name_tree<'a>(
        &'a self,
        node: &'a PdfDict,
        filespecs: &mut Vec<(Option<ObjId>, &'a PdfDict)>,
        depth: usize,
    ) {
        if depth > 32 {
            return;
        }

        if let Some(pairs) = node
            .get("Names")
            .map(|n| self.resolve(n))
            .and_then(PdfAtom::as_array)
        {
            // [ (clave) filespec (clave) filespec … ] — índices impares.
            for filespec in pairs.iter().skip(1).step_by(2) {
                if let Some(dict) = self.resolve(filespec).as_dict() {
                    filespecs.push((filespec.as_ref_id(), dict));
                }
            }
        }

        if let Some(kids) = node
            .get("Kids")
            .map(|k| self.resolve(k))
            .and_then(PdfAtom::as_array)
        {
            for kid in kids {
                if let Some(kid_dict) = self.resolve(kid).as_dict() {
                    self.collect_name_tree(kid_dict, filespecs, depth + 1);
                }
            }
        }
    }

    /// Relación /AFRelationship de un filespec (nombre sin barra).
    pub fn af_relationship<'a>(&'a self, filespec: &'a PdfDict) -> Option<&'a str> {
        filespec
            .get("AFRelationship")
            .map(|r| self.resolve(r))
            .and_then(PdfAtom::as_name)
    }

    /// Lee los bytes de un archivo incrustado vía /EF/UF, luego /EF/F.
    pub fn read_embedded_bytes(&self, filespec: &PdfDict) -> Result<Vec<u8>, PdfParseError> {
        let ef = filespec
            .get("EF")
            .map(|e| self.resolve(e))
            .and_then(PdfAtom::as_dict)
            .ok_or_else(|| {
                PdfParseError::EmbeddedFileUnreadable("filespec without /EF".to_string())
            })?;

        let stream = ef
            .get("UF")
            .or_else(|| ef.get("F"))
            .map(|s| self.resolve(s))
            .ok_or_else(|| {
                PdfParseError::EmbeddedFileUnreadable("/EF without /UF or /F".to_string())
            })?;

        match stream {
            PdfAtom::Stream { dict, data } => self.decode_stream(dict, data),
            _ => Err(PdfParseError::EmbeddedFileUnreadable(
                "/EF entry is not a stream".to_string(),
            )),
        }
    }

    // -----------------------------------------------------------------
    // Streams y filtros
    // -----------------------------------------------------------------

    /// Decodifica los datos de un stream según su /Filter.
    pub fn decode_stream(&self, dict: &PdfDict, data: &[u8]) -> Result<Vec<u8>, PdfParseError> {
        let filters: Vec<String> = match dict.get("Filter").map(|f| self.resolve(f)) {
            None => Vec::new(),
            Some(PdfAtom::Name(name)) => vec![name.clone()],
            Some(PdfAtom::Array(items)) => items
                .iter()
                .filter_map(|i| self.resolve(i).as_name())
                .map(str::to_string)
                .collect(),
            Some(PdfAtom::Null) => Vec::new(),
            Some(_) => {
                return Err(PdfParseError::Malformed(
                    "stream /Filter is neither name nor array".to_string(),
                ))
            }
        };

        let has_predictor = dict
            .get("DecodeParms")
            .map(|p| self.resolve(p))
            .and_then(PdfAtom::as_dict)
            .and_then(|p| p.get("Predictor"))
            .and_then(PdfAtom::as_int)
            .map(|p| p > 1)
            .unwrap_or(false);

        let mut current = data.to_vec();
        for filter in filters {
            match filter.as_str() {
                "FlateDecode" => {
                    if has_predictor {
                        return Err(PdfParseError::UnsupportedFilter(
                            "FlateDecode+Predictor".to_string(),
                        ));
                    }
                    let mut decoder = ZlibDecoder::new(current.as_slice());
                    let mut inflated = Vec::new();
                    decoder.read_to_end(&mut inflated).map_err(|e| {
                        PdfParseError::StreamDecodeFailed(format!("FlateDecode: {e}"))
                    })?;
                    current = inflated;
                }
                other => return Err(PdfParseError::UnsupportedFilter(other.to_string())),
            }
        }

        Ok(current)
    }

    // -----------------------------------------------------------------
    // XMP
    // -----------------------------------------------------------------

    /// Paquete XMP del catálogo (/Metadata), decodificado. Tolerante:
    /// la ausencia o ilegibilidad degrada a None.
    pub fn xmp_bytes(&self) -> Option<Vec<u8>> {
        let metadata = self.catalog().get("Metadata").map(|m| self.resolve(m))?;
        match metadata {
            PdfAtom::Stream { dict, data } => self.decode_stream(dict, data).ok(),
            _ => None,
        }
    }

    // -----------------------------------------------------------------
    // Texto visible (mejor esfuerzo, determinista)
    // -----------------------------------------------------------------

    /// Proyección determinista del texto visible: operandos de los
    /// operadores de pintado de texto (Tj / TJ / ' / ") de los content
    /// streams, en orden de página.
    pub fn visible_text(&self) -> String {
        let mut fragments: Vec<String> = Vec::new();

        for page in self.pages() {
            let Some(contents) = page.get("Contents").map(|c| self.resolve(c)) else {
                continue;
            };

            let mut streams: Vec<&PdfAtom> = Vec::new();
            match contents {
                PdfAtom::Array(items) => {
                    for item in items {
                        streams.push(self.resolve(item));
                    }
                }
                other => streams.push(other),
            }

            for stream in streams {
                if let PdfAtom::Stream { dict, data } = stream {
                    if let Ok(decoded) = self.decode_stream(dict, data) {
                        fragments.extend(extract_text_operands(&decoded));
                    }
                }
            }
        }

        fragments.join("\n").trim().to_string()
    }
}

/// Extrae operandos de texto de un content stream descomprimido.
fn extract_text_operands(content: &[u8]) -> Vec<String> {
    let mut collected = Vec::new();
    let mut position = 0usize;
    let mut pending_string: Option<Vec<u8>> = None;
    let mut pending_array_strings: Vec<Vec<u8>> = Vec::new();
    let mut in_array = false;

    while position < content.len() {
        let byte = content[position];
        match byte {
            b'(' => {
                let mut cursor = crate::parser::Cursor::new(content, position);
                match cursor.parse_value() {
                    Ok(PdfAtom::Str(bytes)) => {
                        if in_array {
                            pending_array_strings.push(bytes);
                        } else {
                            pending_string = Some(bytes);
                        }
                        position = cursor.position;
                    }
                    _ => position += 1,
                }
            }
            b'[' => {
                in_array = true;
                pending_array_strings.clear();
                position += 1;
            }
            b']' => {
                in_array = false;
                position += 1;
            }
            b'T' if position + 1 < content.len() => {
                match content[position + 1] {
                    b'j' => {
                        if let Some(bytes) = pending_string.take() {
                            collected.push(String::from_utf8_lossy(&bytes).into_owned());
                        }
                        position += 2;
                    }
                    b'J' => {
                        if !pending_array_strings.is_empty() {
                            let joined = pending_array_strings
                                .drain(..)
                                .map(|b| String::from_utf8_lossy(&b).into_owned())
                                .collect::<Vec<_>>()
                                .join("");
                            collected.push(joined);
                        }
                        position += 2;
                    }
                    _ => position += 1,
                }
            }
            b'\'' | b'"' => {
                if let Some(bytes) = pending_string.take() {
                    collected.push(String::from_utf8_lossy(&bytes).into_owned());
                }
                position += 1;
            }
            _ => position += 1,
        }
    }

    collected
}

/// Identificación PDF/A del paquete XMP: (`pdfaid:part`, `pdfaid:conformance`).
///
/// Acepta forma de elemento (`<pdfaid:part>3</pdfaid:part>`) y de
/// atributo (`pdfaid:part="3"`).
pub fn extract_pdfa_identification(xmp: &[u8]) -> (Option<String>, Option<String>) {
    (
        extract_xmp_value(xmp, "pdfaid:part"),
        extract_xmp_value(xmp, "pdfaid:conformance"),
    )
}

fn extract_xmp_value(xmp: &[u8], qualified_name: &str) -> Option<String> {
    let text = String::from_utf8_lossy(xmp);

    // Forma de atributo: pdfaid:part="3"
    if let Some(start) = text.find(&format!("{qualified_name}=\"")) {
        let value_start = start + qualified_name.len() + 2;
        if let Some(length) = text[value_start..].find('"') {
            return Some(text[value_start..value_start + length].trim().to_string());
        }
    }

    // Forma de elemento: <pdfaid:part>3</pdfaid:part>
    if let Some(start) = text.find(&format!("<{qualified_name}>")) {
        let value_start = start + qualified_name.len() + 2;
        if let Some(length) = text[value_start..].find('<') {
            return Some(text[value_start..value_start + length].trim().to_string());
        }
    }

    None
}
