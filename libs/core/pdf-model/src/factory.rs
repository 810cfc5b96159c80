// [libs/core/pdf-model/src/factory.rs]
/*!
 * =================================================================
 * APARATO: ARTIFACT FACTORY (V4.0 - FIXTURE FORGE)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: FORJA DETERMINISTA DE ARTEFACTOS MÍNIMOS
 *
 * Produce contenedores PDF/A-3 mínimos con archivos asociados
 * (content.json /Data, bindings.json /Supplement), identificación
 * XMP y una línea de texto visible. Alimenta las suites de
 * certificación y las demos del sellador; NO sustituye al
 * renderizador externo de producción.
 * =================================================================
 */

use crate::atom::{ObjId, PdfAtom, PdfDict};
use crate::revisions::{append_signature_revision, SignatureRevisionSpec};
use crate::serialize::serialize_atom;

/// Forja de artefactos mínimos, configurable por escenario.
#[derive(Debug, Clone)]
pub struct ArtifactFactory {
    content_json: Vec<u8>,
    bindings_json: Option<Vec<u8>>,
    include_xmp: bool,
    xmp_part: String,
    xmp_conformance: String,
    visible_line: String,
    duplicate_data_filespec: bool,
}

impl ArtifactFactory {
    pub fn new(content_json: impl Into<Vec<u8>>) -> Self {
        Self {
            content_json: content_json.into(),
            bindings_json: None,
            include_xmp: true,
            xmp_part: "3".to_string(),
            xmp_conformance: "B".to_string(),
            visible_line: "Sealed archival artifact".to_string(),
            duplicate_data_filespec: false,
        }
    }

    pub fn with_bindings(mut self, bindings_json: impl Into<Vec<u8>>) -> Self {
        self.bindings_json = Some(bindings_json.into());
        self
    }

    pub fn without_xmp(mut self) -> Self {
        self.include_xmp = false;
        self
    }

    pub fn with_pdfa_identification(mut self, part: &str, conformance: &str) -> Self {
        self.xmp_part = part.to_string();
        self.xmp_conformance = conformance.to_string();
        self
    }

    pub fn with_visible_line(mut self, line: &str) -> Self {
        self.visible_line = line.to_string();
        self
    }

    /// Escenario de ambigüedad: dos filespecs /Data.
    pub fn with_duplicate_data_filespec(mut self) -> Self {
        self.duplicate_data_filespec = true;
        self
    }

    /// Construye el artefacto base (estado RENDERED, una revisión).
    pub fn build(&self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::with_capacity(4096);
        out.extend_from_slice(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");

        let catalog_id = ObjId::new(1, 0);
        let pages_id = ObjId::new(2, 0);
        let page_id = ObjId::new(3, 0);
        let contents_id = ObjId::new(4, 0);
        let content_stream_id = ObjId::new(5, 0);
        let content_filespec_id = ObjId::new(6, 0);
        let bindings_stream_id = ObjId::new(7, 0);
        let bindings_filespec_id = ObjId::new(8, 0);
        let metadata_id = ObjId::new(9, 0);
        let font_id = ObjId::new(10, 0);
        let duplicate_filespec_id = ObjId::new(11, 0);

        let mut objects: Vec<(ObjId, PdfAtom)> = Vec::new();

        // --- Catálogo ---
        let mut af_items = vec![PdfAtom::Ref(content_filespec_id)];
        if self.duplicate_data_filespec {
            // Segundo filespec /Data DISTINTO: ambigüedad real.
            af_items.push(PdfAtom::Ref(duplicate_filespec_id));
        }
        if self.bindings_json.is_some() {
            af_items.push(PdfAtom::Ref(bindings_filespec_id));
        }

        let mut name_pairs = vec![
            PdfAtom::Str(b"content.json".to_vec()),
            PdfAtom::Ref(content_filespec_id),
        ];
        if self.bindings_json.is_some() {
            name_pairs.push(PdfAtom::Str(b"bindings.json".to_vec()));
            name_pairs.push(PdfAtom::Ref(bindings_filespec_id));
        }

        let mut embedded_files = PdfDict::new();
        embedded_files.insert("Names".to_string(), PdfAtom::Array(name_pairs));

        let mut names = PdfDict::new();
        names.insert("EmbeddedFiles".to_string(), PdfAtom::Dict(embedded_files));

        let mut catalog = PdfDict::new();
        catalog.insert("Type".to_string(), PdfAtom::Name("Catalog".to_string()));
        catalog.insert("Pages".to_string(), PdfAtom::Ref(pages_id));
        catalog.insert("Names".to_string(), PdfAtom::Dict(names));
        catalog.insert("AF".to_string(), PdfAtom::Array(af_items));
        if self.include_xmp {
            catalog.insert("Metadata".to_string(), PdfAtom::Ref(metadata_id));
        }
        objects.push((catalog_id, PdfAtom::Dict(catalog)));

        // --- Árbol de páginas ---
        let mut pages = PdfDict::new();
        pages.insert("Type".to_string(), PdfAtom::Name("Pages".to_string()));
        pages.insert(
            "Kids".to_string(),
            PdfAtom::Array(vec![PdfAtom::Ref(page_id)]),
        );
        pages.insert("Count".to_string(), PdfAtom::Int(1));
        objects.push((pages_id, PdfAtom::Dict(pages)));

        let mut font_resource = PdfDict::new();
        font_resource.insert("F1".to_string(), PdfAtom::Ref(font_id));
        let mut resources = PdfDict::new();
        resources.insert("Font".to_string(), PdfAtom::Dict(font_resource));

        let mut page = PdfDict::new();
        page.insert("Type".to_string(), PdfAtom::Name("Page".to_string()));
        page.insert("Parent".to_string(), PdfAtom::Ref(pages_id));
        page.insert(
            "MediaBox".to_string(),
            PdfAtom::Array(vec![
                PdfAtom::Int(0),
                PdfAtom::Int(0),
                PdfAtom::Int(612),
                PdfAtom::Int(792),
            ]),
        );
        page.insert("Contents".to_string(), PdfAtom::Ref(contents_id));
        page.insert("Resources".to_string(), PdfAtom::Dict(resources));
        objects.push((page_id, PdfAtom::Dict(page)));

        // --- Content stream visible ---
        let content_ops = format!(
            "BT /F1 12 Tf 72 720 Td ({}) Tj ET",
            escape_literal(&self.visible_line)
        );
        objects.push((
            contents_id,
            PdfAtom::Stream {
                dict: PdfDict::new(),
                data: content_ops.into_bytes(),
            },
        ));

        // --- content.json (/Data) ---
        let mut embedded_dict = PdfDict::new();
        embedded_dict.insert("Type".to_string(), PdfAtom::Name("EmbeddedFile".to_string()));
        embedded_dict.insert(
            "Subtype".to_string(),
            PdfAtom::Name("application/json".to_string()),
        );
        objects.push((
            content_stream_id,
            PdfAtom::Stream {
                dict: embedded_dict.clone(),
                data: self.content_json.clone(),
            },
        ));
        objects.push((
            content_filespec_id,
            PdfAtom::Dict(filespec("content.json", "Data", content_stream_id)),
        ));
        if self.duplicate_data_filespec {
            objects.push((
                duplicate_filespec_id,
                PdfAtom::Dict(filespec("content-copy.json", "Data", content_stream_id)),
            ));
        }

        // --- bindings.json (/Supplement) ---
        if let Some(bindings_json) = &self.bindings_json {
            objects.push((
                bindings_stream_id,
                PdfAtom::Stream {
                    dict: embedded_dict,
                    data: bindings_json.clone(),
                },
            ));
            objects.push((
                bindings_filespec_id,
                PdfAtom::Dict(filespec("bindings.json", "Supplement", bindings_stream_id)),
            ));
        }

        // --- XMP ---
        if self.include_xmp {
            let xmp = format!(
                concat!(
                    "<?xpacket begin=\"\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n",
                    "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n",
                    " <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n",
                    "  <rdf:Description rdf:about=\"\" ",
                    "xmlns:pdfaid=\"http://www.aiim.org/pdfa/ns/id/\" ",
                    "pdfaid:part=\"{part}\" pdfaid:conformance=\"{conformance}\"/>\n",
                    " </rdf:RDF>\n",
                    "</x:xmpmeta>\n",
                    "<?xpacket end=\"w\"?>",
                ),
                part = self.xmp_part,
                conformance = self.xmp_conformance,
            );

            let mut metadata_dict = PdfDict::new();
            metadata_dict.insert("Type".to_string(), PdfAtom::Name("Metadata".to_string()));
            metadata_dict.insert("Subtype".to_string(), PdfAtom::Name("XML".to_string()));
            objects.push((
                metadata_id,
                PdfAtom::Stream {
                    dict: metadata_dict,
                    data: xmp.into_bytes(),
                },
            ));
        }

        // --- Fuente ---
        let mut font = PdfDict::new();
        font.insert("Type".to_string(), PdfAtom::Name("Font".to_string()));
        font.insert("Subtype".to_string(), PdfAtom::Name("Type1".to_string()));
        font.insert("BaseFont".to_string(), PdfAtom::Name("Helvetica".to_string()));
        objects.push((font_id, PdfAtom::Dict(font)));

        // --- Emisión + xref clásica ---
        let mut offsets: Vec<(u32, usize)> = Vec::new();
        for (id, atom) in &objects {
            offsets.push((id.number, out.len()));
            out.extend_from_slice(format!("{} {} obj\n", id.number, id.generation).as_bytes());
            serialize_atom(atom, &mut out);
            out.extend_from_slice(b"\nendobj\n");
        }

        let max_number = objects.iter().map(|(id, _)| id.number).max().unwrap_or(0);
        let xref_offset = out.len();

        out.extend_from_slice(format!("xref\n0 {}\n", max_number + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max_number {
            match offsets.iter().find(|(n, _)| *n == number) {
                Some((_, offset)) => {
                    out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes())
                }
                None => out.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }

        out.extend_from_slice(b"trailer\n");
        let mut trailer = PdfDict::new();
        trailer.insert("Size".to_string(), PdfAtom::Int((max_number + 1) as i64));
        trailer.insert("Root".to_string(), PdfAtom::Ref(catalog_id));
        serialize_atom(&PdfAtom::Dict(trailer), &mut out);
        out.extend_from_slice(format!("\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes());

        out
    }

    /// Artefacto con firma de certificación simulada (material en
    /// ceros, ByteRange de cobertura total). Para suites del auditor.
    pub fn build_with_dummy_certification(&self, docmdp_permission: i64) -> Vec<u8> {
        let base = self.build();
        let skeleton = append_signature_revision(
            &base,
            &SignatureRevisionSpec {
                field_name: "ArchiveSignature".to_string(),
                subfilter: crate::revisions::SUBFILTER_PKCS7_DETACHED.to_string(),
                reserved_contents: 512,
                docmdp_permission: Some(docmdp_permission),
                signing_time: Some("D:20260101120000Z".to_string()),
            },
        )
        .expect("factory-built artifact must accept a signature revision");
        skeleton.bytes
    }
}

fn filespec(name: &str, relationship: &str, stream_id: ObjId) -> PdfDict {
    let mut ef = PdfDict::new();
    ef.insert("F".to_string(), PdfAtom::Ref(stream_id));
    ef.insert("UF".to_string(), PdfAtom::Ref(stream_id));

    let mut spec = PdfDict::new();
    spec.insert("Type".to_string(), PdfAtom::Name("Filespec".to_string()));
    spec.insert("F".to_string(), PdfAtom::Str(name.as_bytes().to_vec()));
    spec.insert("UF".to_string(), PdfAtom::Str(name.as_bytes().to_vec()));
    spec.insert(
        "AFRelationship".to_string(),
        PdfAtom::Name(relationship.to_string()),
    );
    spec.insert("EF".to_string(), PdfAtom::Dict(ef));
    spec
}

fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
