// [libs/core/pdf-model/src/revisions.rs]
/*!
 * =================================================================
 * APARATO: STRUCTURAL SIGNATURE REVISIONS (V5.0)
 * CLASIFICACIÓN: CORE (ESTRATO L1)
 * RESPONSABILIDAD: ESQUELETOS DE REVISIÓN PARA FIRMA, DSS Y SELLO
 *                  DE TIEMPO
 *
 * Este módulo escribe la ESTRUCTURA de las revisiones PAdES sobre el
 * contenedor: campo de firma con hueco /Contents reservado y
 * /ByteRange parcheado, revisión /DSS con VRI, y campo de sello de
 * tiempo documental. El material criptográfico (CMS, token TSA) lo
 * aporta el ensamblador del dominio; aquí solo viven bytes y offsets.
 * =================================================================
 */

use crate::atom::{ObjId, PdfAtom, PdfDict};
use crate::document::PdfDocument;
use crate::errors::PdfParseError;
use crate::incremental::RevisionBuilder;
use crate::parser::find_subslice;

/// Subfiltro de la firma de certificación PAdES.
pub const SUBFILTER_PKCS7_DETACHED: &str = "adbe.pkcs7.detached";
/// Subfiltro del sello de tiempo documental.
pub const SUBFILTER_RFC3161: &str = "ETSI.RFC3161";

/// Parámetros estructurales de una revisión de firma.
#[derive(Debug, Clone)]
pub struct SignatureRevisionSpec {
    pub field_name: String,
    pub subfilter: String,
    /// Bytes reservados para el material criptográfico del hueco.
    pub reserved_contents: usize,
    /// `Some(p)` ⇒ firma de certificación con DocMDP /P=p.
    pub docmdp_permission: Option<i64>,
    /// Marca de firma `D:YYYYMMDDHHmmSSZ` (se omite si None).
    pub signing_time: Option<String>,
}

/// Esqueleto resultante: buffer con hueco en cero y ByteRange real.
#[derive(Debug, Clone)]
pub struct SignatureSkeleton {
    pub bytes: Vec<u8>,
    /// Span [start, end) de los caracteres hex del hueco /Contents.
    pub contents_hex_span: (usize, usize),
    /// ByteRange definitivo ya parcheado en el buffer.
    pub byte_range: [i64; 4],
}

/// Anexa una revisión incremental con un nuevo campo de firma.
///
/// El hueco /Contents queda lleno de ceros con el tamaño reservado y
/// el /ByteRange queda parcheado con la cobertura real del archivo.
pub fn append_signature_revision(
    base: &[u8],
    spec: &SignatureRevisionSpec,
) -> Result<SignatureSkeleton, PdfParseError> {
    let document = PdfDocument::parse(base)?;

    let catalog_id = document.catalog_id();
    let next_number = document.max_object_number() + 1;

    let signature_id = ObjId::new(next_number, 0);
    let field_id = ObjId::new(next_number + 1, 0);
    let acroform_id = ObjId::new(next_number + 2, 0);

    // --- Diccionario de valor de firma (el hueco) ---
    let mut signature_value = PdfDict::new();
    signature_value.insert("Type".to_string(), PdfAtom::Name("Sig".to_string()));
    signature_value.insert(
        "Filter".to_string(),
        PdfAtom::Name("Adobe.PPKLite".to_string()),
    );
    signature_value.insert(
        "SubFilter".to_string(),
        PdfAtom::Name(spec.subfilter.clone()),
    );
    signature_value.insert(
        "Contents".to_string(),
        PdfAtom::Str(vec![0u8; spec.reserved_contents]),
    );
    signature_value.insert(
        "ByteRange".to_string(),
        PdfAtom::Array(vec![
            PdfAtom::Int(0),
            PdfAtom::Int(9_999_999_999),
            PdfAtom::Int(9_999_999_999),
            PdfAtom::Int(9_999_999_999),
        ]),
    );
    if let Some(signing_time) = &spec.signing_time {
        signature_value.insert(
            "M".to_string(),
            PdfAtom::Str(signing_time.as_bytes().to_vec()),
        );
    }
    if let Some(permission) = spec.docmdp_permission {
        let mut transform_params = PdfDict::new();
        transform_params.insert(
            "Type".to_string(),
            PdfAtom::Name("TransformParams".to_string()),
        );
        transform_params.insert("P".to_string(), PdfAtom::Int(permission));
        transform_params.insert("V".to_string(), PdfAtom::Name("1.2".to_string()));

        let mut sig_ref = PdfDict::new();
        sig_ref.insert("Type".to_string(), PdfAtom::Name("SigRef".to_string()));
        sig_ref.insert(
            "TransformMethod".to_string(),
            PdfAtom::Name("DocMDP".to_string()),
        );
        sig_ref.insert("TransformParams".to_string(), PdfAtom::Dict(transform_params));

        signature_value.insert(
            "Reference".to_string(),
            PdfAtom::Array(vec![PdfAtom::Dict(sig_ref)]),
        );
    }

    // --- Campo/widget de firma ---
    let mut field = PdfDict::new();
    field.insert("FT".to_string(), PdfAtom::Name("Sig".to_string()));
    field.insert(
        "T".to_string(),
        PdfAtom::Str(spec.field_name.as_bytes().to_vec()),
    );
    field.insert("V".to_string(), PdfAtom::Ref(signature_id));
    field.insert("Type".to_string(), PdfAtom::Name("Annot".to_string()));
    field.insert("Subtype".to_string(), PdfAtom::Name("Widget".to_string()));
    field.insert(
        "Rect".to_string(),
        PdfAtom::Array(vec![
            PdfAtom::Int(0),
            PdfAtom::Int(0),
            PdfAtom::Int(0),
            PdfAtom::Int(0),
        ]),
    );
    field.insert("F".to_string(), PdfAtom::Int(132));
    if let Some(page_id) = document.first_page_id() {
        field.insert("P".to_string(), PdfAtom::Ref(page_id));
    }

    // --- AcroForm: preserva campos previos, agrega el nuestro ---
    let mut acroform = document
        .catalog()
        .get("AcroForm")
        .map(|a| document.resolve(a))
        .and_then(PdfAtom::as_dict)
        .cloned()
        .unwrap_or_default();

    let mut fields_array = acroform
        .get("Fields")
        .map(|f| document.resolve(f))
        .and_then(PdfAtom::as_array)
        .map(<[PdfAtom]>::to_vec)
        .unwrap_or_default();
    fields_array.push(PdfAtom::Ref(field_id));

    acroform.insert("Fields".to_string(), PdfAtom::Array(fields_array));
    acroform.insert("SigFlags".to_string(), PdfAtom::Int(3));

    // --- Catálogo: nueva revisión del mismo objeto ---
    let mut catalog = document.catalog().clone();
    catalog.insert("AcroForm".to_string(), PdfAtom::Ref(acroform_id));
    if spec.docmdp_permission.is_some() {
        let mut perms = PdfDict::new();
        perms.insert("DocMDP".to_string(), PdfAtom::Ref(signature_id));
        catalog.insert("Perms".to_string(), PdfAtom::Dict(perms));
    }

    let mut builder = RevisionBuilder::new();
    builder
        .put(signature_id, PdfAtom::Dict(signature_value))
        .put(field_id, PdfAtom::Dict(field))
        .put(acroform_id, PdfAtom::Dict(acroform))
        .put(catalog_id, PdfAtom::Dict(catalog));

    let size = acroform_id.number + 1;
    let (mut bytes, offsets) = builder.append_to(base, catalog_id, size);

    // --- Parcheo posicional: hueco y cobertura ---
    let signature_offset = offsets[&signature_id.number];

    let contents_open = find_subslice(&bytes[signature_offset..], b"/Contents <")
        .map(|relative| signature_offset + relative + b"/Contents ".len())
        .ok_or_else(|| {
            PdfParseError::Malformed("signature revision without /Contents hole".to_string())
        })?;
    let hex_start = contents_open + 1;
    let hex_end = hex_start + spec.reserved_contents * 2;

    if bytes.get(hex_end) != Some(&b'>') {
        return Err(PdfParseError::Malformed(
            "signature /Contents hole has unexpected geometry".to_string(),
        ));
    }

    let hole_start = contents_open as i64;
    let hole_end = (hex_end + 1) as i64;
    let total_length = bytes.len() as i64;
    let byte_range = [0, hole_start, hole_end, total_length - hole_end];

    patch_byte_range(&mut bytes, signature_offset, byte_range)?;

    Ok(SignatureSkeleton {
        bytes,
        contents_hex_span: (hex_start, hex_end),
        byte_range,
    })
}

/// Inyecta material DER en el hueco /Contents de un esqueleto.
///
/// El material se codifica en hex y se rellena con ceros hasta agotar
/// el hueco reservado. Excederlo es error del llamador.
pub fn splice_contents(
    skeleton_bytes: &mut [u8],
    contents_hex_span: (usize, usize),
    der_material: &[u8],
) -> Result<(), PdfParseError> {
    let (start, end) = contents_hex_span;
    let capacity = (end - start) / 2;

    if der_material.len() > capacity {
        return Err(PdfParseError::Malformed(format!(
            "signature material ({} bytes) exceeds reserved hole ({capacity} bytes)",
            der_material.len()
        )));
    }

    for (index, byte) in der_material.iter().enumerate() {
        let hex = format!("{byte:02x}");
        skeleton_bytes[start + index * 2] = hex.as_bytes()[0];
        skeleton_bytes[start + index * 2 + 1] = hex.as_bytes()[1];
    }

    Ok(())
}

fn patch_byte_range(
    bytes: &mut [u8],
    signature_offset: usize,
    values: [i64; 4],
) -> Result<(), PdfParseError> {
    let key_at = find_subslice(&bytes[signature_offset..], b"/ByteRange [")
        .map(|relative| signature_offset + relative)
        .ok_or_else(|| {
            PdfParseError::Malformed("signature revision without /ByteRange".to_string())
        })?;

    let open = key_at + b"/ByteRange ".len();
    let close = find_subslice(&bytes[open..], b"]")
        .map(|relative| open + relative)
        .ok_or_else(|| PdfParseError::Malformed("unterminated /ByteRange".to_string()))?;

    let rendered = format!(
        "[{} {} {} {}",
        values[0], values[1], values[2], values[3]
    );
    let slot = &mut bytes[open..close];

    if rendered.len() > slot.len() {
        return Err(PdfParseError::Malformed(
            "/ByteRange placeholder narrower than patched values".to_string(),
        ));
    }

    slot[..rendered.len()].copy_from_slice(rendered.as_bytes());
    for byte in &mut slot[rendered.len()..] {
        *byte = b' ';
    }

    Ok(())
}

// ---------------------------------------------------------------------
// Revisión DSS (PAdES-B-LT)
// ---------------------------------------------------------------------

/// Material de validación a largo plazo para la revisión /DSS.
#[derive(Debug, Clone, Default)]
pub struct DssMaterial {
    pub certificates: Vec<Vec<u8>>,
    pub ocsp_responses: Vec<Vec<u8>>,
    pub crls: Vec<Vec<u8>>,
    /// Clave VRI: SHA-1 del /Contents de la firma, hex mayúsculas.
    pub vri_key: String,
}

/// Anexa la revisión /DSS + /VRI. No introduce diccionario de firma.
pub fn append_dss_revision(base: &[u8], material: &DssMaterial) -> Result<Vec<u8>, PdfParseError> {
    let document = PdfDocument::parse(base)?;
    let catalog_id = document.catalog_id();
    let mut next_number = document.max_object_number() + 1;

    let mut builder = RevisionBuilder::new();

    let mut allocate_streams = |payloads: &[Vec<u8>],
                                builder: &mut RevisionBuilder,
                                next_number: &mut u32|
     -> Vec<PdfAtom> {
        payloads
            .iter()
            .map(|payload| {
                let id = ObjId::new(*next_number, 0);
                *next_number += 1;
                builder.put(
                    id,
                    PdfAtom::Stream {
                        dict: PdfDict::new(),
                        data: payload.clone(),
                    },
                );
                PdfAtom::Ref(id)
            })
            .collect()
    };

    let cert_refs = allocate_streams(&material.certificates, &mut builder, &mut next_number);
    let ocsp_refs = allocate_streams(&material.ocsp_responses, &mut builder, &mut next_number);
    let crl_refs = allocate_streams(&material.crls, &mut builder, &mut next_number);

    let mut vri_entry = PdfDict::new();
    if !cert_refs.is_empty() {
        vri_entry.insert("Cert".to_string(), PdfAtom::Array(cert_refs.clone()));
    }
    if !ocsp_refs.is_empty() {
        vri_entry.insert("OCSP".to_string(), PdfAtom::Array(ocsp_refs.clone()));
    }
    if !crl_refs.is_empty() {
        vri_entry.insert("CRL".to_string(), PdfAtom::Array(crl_refs.clone()));
    }

    let mut vri = PdfDict::new();
    vri.insert(material.vri_key.clone(), PdfAtom::Dict(vri_entry));

    let mut dss = PdfDict::new();
    if !cert_refs.is_empty() {
        dss.insert("Certs".to_string(), PdfAtom::Array(cert_refs));
    }
    if !ocsp_refs.is_empty() {
        dss.insert("OCSPs".to_string(), PdfAtom::Array(ocsp_refs));
    }
    if !crl_refs.is_empty() {
        dss.insert("CRLs".to_string(), PdfAtom::Array(crl_refs));
    }
    dss.insert("VRI".to_string(), PdfAtom::Dict(vri));

    let dss_id = ObjId::new(next_number, 0);
    next_number += 1;
    builder.put(dss_id, PdfAtom::Dict(dss));

    let mut catalog = document.catalog().clone();
    catalog.insert("DSS".to_string(), PdfAtom::Ref(dss_id));
    builder.put(catalog_id, PdfAtom::Dict(catalog));

    let (bytes, _offsets) = builder.append_to(base, catalog_id, next_number);
    Ok(bytes)
}

/// Lee el diccionario /DSS vivo de un documento, si existe.
pub fn read_dss<'a>(document: &'a PdfDocument) -> Option<&'a PdfDict> {
    document
        .catalog()
        .get("DSS")
        .map(|d| document.resolve(d))
        .and_then(PdfAtom::as_dict)
}

/// Extrae los payloads de una entrada de arreglo del /DSS (p.ej. /Certs).
pub fn read_dss_streams(document: &PdfDocument, dss: &PdfDict, key: &str) -> Vec<Vec<u8>> {
    let mut payloads = Vec::new();

    if let Some(items) = dss
        .get(key)
        .map(|v| document.resolve(v))
        .and_then(PdfAtom::as_array)
    {
        for item in items {
            if let PdfAtom::Stream { dict, data } = document.resolve(item) {
                if let Ok(decoded) = document.decode_stream(dict, data) {
                    payloads.push(decoded);
                }
            }
        }
    }

    payloads
}
