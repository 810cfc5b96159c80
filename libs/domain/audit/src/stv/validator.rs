// [libs/domain/audit/src/stv/validator.rs]
/*!
 * =================================================================
 * APARATO: BUILT-IN ADES-LTA VALIDATOR (V6.0)
 * CLASIFICACIÓN: DOMAIN / STV (ESTRATO L2)
 * RESPONSABILIDAD: VALIDACIÓN DETERMINISTA DEL SELLO PADES
 *
 * Implementación interna de la costura AdesValidator:
 * - aritmética CMS (digest del ByteRange, atributos firmados, RSA)
 * - construcción de cadena contra raíces externas, alimentada por los
 *   certificados del CMS y el material LTV del /DSS
 * - política de revocación hard-fail (CRL del /DSS por emisor)
 * - sello de tiempo documental (imprint, cobertura, cadena)
 * - diff DocMDP ternario por clasificación de revisiones posteriores
 * =================================================================
 */

use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier, SignerInfo};
use const_oid::db::rfc5911::{ID_MESSAGE_DIGEST, ID_SIGNED_DATA};
use const_oid::db::rfc5912::{
    ID_SHA_256, ID_SHA_384, ID_SHA_512, SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION,
    SHA_512_WITH_RSA_ENCRYPTION,
};
use der::asn1::OctetString;
use der::{Decode, Encode};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::crl::CertificateList;
use x509_cert::Certificate;
use x509_tsp::TstInfo;

use sigilo_core_pdf::{
    read_dss, read_dss_streams, PdfDocument, SignatureField, SUBFILTER_PKCS7_DETACHED,
    SUBFILTER_RFC3161,
};

use super::{AdesValidator, AdesVerdict, ValidationRequest, ValidatorFailure};

/// Validador AdES-LTA interno.
#[derive(Default)]
pub struct BuiltinAdesValidator;

impl BuiltinAdesValidator {
    pub fn new() -> Self {
        Self
    }
}

impl AdesValidator for BuiltinAdesValidator {
    fn validate(&self, request: &ValidationRequest<'_>) -> Result<AdesVerdict, ValidatorFailure> {
        let document = PdfDocument::parse(request.pdf_bytes)
            .map_err(|e| ValidatorFailure::MalformedPdf(e.to_string()))?;

        let fields = document.signature_fields();

        let certification = fields
            .iter()
            .find(|field| field.subfilter.as_deref() == Some(SUBFILTER_PKCS7_DETACHED))
            .ok_or_else(|| {
                ValidatorFailure::EngineFailure(
                    "no certification signature (adbe.pkcs7.detached) present".to_string(),
                )
            })?;

        let mut diagnostics: Vec<String> = Vec::new();

        // --------------------------------------------------------------
        // CMS: parseo estructural
        // --------------------------------------------------------------
        let contents = certification.contents.clone().unwrap_or_default();
        let cms_der = trim_der_prefix(&contents).ok_or_else(|| {
            ValidatorFailure::CmsRejected("signature hole carries no DER material".to_string())
        })?;

        let content_info = ContentInfo::from_der(cms_der)
            .map_err(|e| ValidatorFailure::CmsRejected(format!("ContentInfo: {e}")))?;

        if content_info.content_type != ID_SIGNED_DATA {
            return Err(ValidatorFailure::CmsRejected(
                "certification CMS is not SignedData".to_string(),
            ));
        }

        let signed_data: SignedData = content_info
            .content
            .decode_as()
            .map_err(|e| ValidatorFailure::CmsRejected(format!("SignedData: {e}")))?;

        let signer_info = signed_data.signer_infos.0.iter().next().ok_or_else(|| {
            ValidatorFailure::CmsRejected("SignedData without SignerInfo".to_string())
        })?;

        let signed_attrs = signer_info.signed_attrs.as_ref().ok_or_else(|| {
            ValidatorFailure::CmsRejected("PAdES requires signed attributes".to_string())
        })?;

        // --------------------------------------------------------------
        // Aritmética: digest del ByteRange vs message-digest + RSA
        // --------------------------------------------------------------
        let byte_range = certification.byte_range.clone().ok_or_else(|| {
            ValidatorFailure::CmsRejected("certification signature without ByteRange".to_string())
        })?;

        let covered = covered_bytes(request.pdf_bytes, &byte_range).ok_or_else(|| {
            ValidatorFailure::MalformedPdf("ByteRange exceeds file bounds".to_string())
        })?;
        let document_digest = Sha256::digest(&covered);

        let declared_digest = message_digest_attribute(signed_attrs);
        let digest_matches = declared_digest
            .as_deref()
            .map(|declared| declared == document_digest.as_slice())
            .unwrap_or(false);
        if !digest_matches {
            diagnostics.push("message-digest attribute does not match ByteRange digest".into());
        }

        let cms_certificates = certificates_of(&signed_data);
        let leaf = find_signer_certificate(signer_info, &cms_certificates);

        let rsa_valid = match &leaf {
            Some(leaf) => verify_signer_rsa(signer_info, signed_attrs, leaf, &mut diagnostics),
            None => {
                diagnostics.push("signer certificate not present in CMS".into());
                false
            }
        };

        let signature_valid = digest_matches && rsa_valid;

        // --------------------------------------------------------------
        // Cadena y revocación (material LTV del /DSS)
        // --------------------------------------------------------------
        let dss_certificates: Vec<Certificate> = read_dss(&document)
            .map(|dss| read_dss_streams(&document, dss, "Certs"))
            .unwrap_or_default()
            .iter()
            .filter_map(|der_bytes| Certificate::from_der(der_bytes).ok())
            .collect();

        let dss_crls: Vec<CertificateList> = read_dss(&document)
            .map(|dss| read_dss_streams(&document, dss, "CRLs"))
            .unwrap_or_default()
            .iter()
            .filter_map(|der_bytes| CertificateList::from_der(der_bytes).ok())
            .collect();

        let dss_ocsps: Vec<Vec<u8>> = read_dss(&document)
            .map(|dss| read_dss_streams(&document, dss, "OCSPs"))
            .unwrap_or_default();

        let trust_roots: Vec<Certificate> = request
            .trust_roots_der
            .iter()
            .filter_map(|der_bytes| Certificate::from_der(der_bytes).ok())
            .collect();

        let mut pool: Vec<Certificate> = cms_certificates.clone();
        pool.extend(dss_certificates.iter().cloned());

        let (chain_trusted, chain) = match &leaf {
            Some(leaf) => build_trusted_chain(leaf, &pool, &trust_roots),
            None => (false, Vec::new()),
        };
        if !chain_trusted {
            diagnostics.push("certificate path does not terminate at a supplied root".into());
        }

        let revocation_ok =
            revocation_material_ok(&chain, &trust_roots, &dss_crls, &dss_ocsps, &mut diagnostics);

        // --------------------------------------------------------------
        // Sello de tiempo documental
        // --------------------------------------------------------------
        let timestamp_ok = fields
            .iter()
            .find(|field| field.subfilter.as_deref() == Some(SUBFILTER_RFC3161))
            .map(|timestamp| {
                verify_document_timestamp(
                    request.pdf_bytes,
                    timestamp,
                    certification,
                    &trust_roots,
                    &pool,
                    &mut diagnostics,
                )
            });

        // --------------------------------------------------------------
        // Diff DocMDP
        // --------------------------------------------------------------
        let docmdp_ok = docmdp_diff(&document, request.pdf_bytes, certification);

        Ok(AdesVerdict {
            signature_valid,
            chain_trusted,
            revocation_ok,
            timestamp_ok,
            docmdp_ok,
            diagnostics,
        })
    }
}

// ---------------------------------------------------------------------
// Ayudantes CMS
// ---------------------------------------------------------------------

/// Prefijo DER real del hueco (descarta el relleno de ceros).
fn trim_der_prefix(hole: &[u8]) -> Option<&[u8]> {
    if hole.len() < 2 || hole[0] != 0x30 {
        return None;
    }

    let first_length_byte = hole[1];
    if first_length_byte & 0x80 == 0 {
        let total = 2 + first_length_byte as usize;
        return hole.get(..total);
    }

    let length_octets = (first_length_byte & 0x7F) as usize;
    if length_octets == 0 || length_octets > 4 || hole.len() < 2 + length_octets {
        return None;
    }

    let mut content_length = 0usize;
    for octet in &hole[2..2 + length_octets] {
        content_length = (content_length << 8) | *octet as usize;
    }

    hole.get(..2 + length_octets + content_length)
}

fn covered_bytes(bytes: &[u8], byte_range: &[i64]) -> Option<Vec<u8>> {
    if byte_range.len() != 4 {
        return None;
    }
    let (o1, l1, o2, l2) = (
        usize::try_from(byte_range[0]).ok()?,
        usize::try_from(byte_range[1]).ok()?,
        usize::try_from(byte_range[2]).ok()?,
        usize::try_from(byte_range[3]).ok()?,
    );

    let first = bytes.get(o1..o1.checked_add(l1)?)?;
    let second = bytes.get(o2..o2.checked_add(l2)?)?;

    let mut covered = Vec::with_capacity(first.len() + second.len());
    covered.extend_from_slice(first);
    covered.extend_from_slice(second);
    Some(covered)
}

fn message_digest_attribute(signed_attrs: &der::asn1::SetOfVec<x509_cert::attr::Attribute>) -> Option<Vec<u8>> {
    signed_attrs
        .iter()
        .find(|attribute| attribute.oid == ID_MESSAGE_DIGEST)
        .and_then(|attribute| attribute.values.iter().next())
        .and_then(|value| value.decode_as::<OctetString>().ok())
        .map(|octets| octets.as_bytes().to_vec())
}

fn certificates_of(signed_data: &SignedData) -> Vec<Certificate> {
    signed_data
        .certificates
        .as_ref()
        .map(|set| {
            set.0
                .iter()
                .filter_map(|choice| match choice {
                    CertificateChoices::Certificate(certificate) => Some(certificate.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn find_signer_certificate(
    signer_info: &SignerInfo,
    candidates: &[Certificate],
) -> Option<Certificate> {
    match &signer_info.sid {
        SignerIdentifier::IssuerAndSerialNumber(issuer_serial) => candidates
            .iter()
            .find(|certificate| {
                certificate.tbs_certificate.issuer == issuer_serial.issuer
                    && certificate.tbs_certificate.serial_number == issuer_serial.serial_number
            })
            .cloned(),
        SignerIdentifier::SubjectKeyIdentifier(_) => candidates.first().cloned(),
    }
}

fn verify_signer_rsa(
    signer_info: &SignerInfo,
    signed_attrs: &der::asn1::SetOfVec<x509_cert::attr::Attribute>,
    leaf: &Certificate,
    diagnostics: &mut Vec<String>,
) -> bool {
    let Ok(signature_base) = signed_attrs.to_der() else {
        diagnostics.push("signed attributes refused DER re-encoding".into());
        return false;
    };

    let Some(public_key) = rsa_public_key_of(leaf) else {
        diagnostics.push("signer SPKI is not an RSA key".into());
        return false;
    };

    let signature = signer_info.signature.as_bytes();

    let verified = match signer_info.digest_alg.oid {
        oid if oid == ID_SHA_256 => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &Sha256::digest(&signature_base),
                signature,
            )
            .is_ok(),
        oid if oid == ID_SHA_384 => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha384>(),
                &Sha384::digest(&signature_base),
                signature,
            )
            .is_ok(),
        oid if oid == ID_SHA_512 => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha512>(),
                &Sha512::digest(&signature_base),
                signature,
            )
            .is_ok(),
        other => {
            diagnostics.push(format!("unsupported signer digest algorithm {other}"));
            false
        }
    };

    if !verified {
        diagnostics.push("RSA signature over signed attributes failed verification".into());
    }
    verified
}

fn rsa_public_key_of(certificate: &Certificate) -> Option<rsa::RsaPublicKey> {
    let spki_bits = certificate
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()?;
    rsa::RsaPublicKey::from_pkcs1_der(spki_bits).ok()
}

// ---------------------------------------------------------------------
// Cadena y revocación
// ---------------------------------------------------------------------

fn same_certificate(a: &Certificate, b: &Certificate) -> bool {
    a.to_der().ok() == b.to_der().ok()
}

fn is_trust_root(certificate: &Certificate, roots: &[Certificate]) -> bool {
    roots.iter().any(|root| same_certificate(certificate, root))
}

/// Construye la cadena hoja→raíz verificando la firma de cada eslabón.
/// Devuelve (confiable, cadena construida incluida la hoja).
fn build_trusted_chain(
    leaf: &Certificate,
    pool: &[Certificate],
    roots: &[Certificate],
) -> (bool, Vec<Certificate>) {
    let mut chain = vec![leaf.clone()];
    let mut current = leaf.clone();

    for _ in 0..8 {
        if is_trust_root(&current, roots) {
            return (true, chain);
        }

        let issuer_name = current.tbs_certificate.issuer.clone();
        let self_issued = current.tbs_certificate.subject == issuer_name;

        if self_issued {
            // Autofirmado que no es raíz suministrada: cadena huérfana.
            return (false, chain);
        }

        let candidates: Vec<&Certificate> = pool
            .iter()
            .chain(roots.iter())
            .filter(|candidate| candidate.tbs_certificate.subject == issuer_name)
            .collect();

        let Some(issuer) = candidates
            .into_iter()
            .find(|candidate| verify_certificate_signature(&current, candidate))
        else {
            return (false, chain);
        };

        chain.push(issuer.clone());
        current = issuer.clone();
    }

    (false, chain)
}

fn verify_certificate_signature(subject: &Certificate, issuer: &Certificate) -> bool {
    let Ok(tbs_der) = subject.tbs_certificate.to_der() else {
        return false;
    };
    let Some(signature) = subject.signature.as_bytes() else {
        return false;
    };
    let Some(public_key) = rsa_public_key_of(issuer) else {
        return false;
    };

    match subject.signature_algorithm.oid {
        oid if oid == SHA_256_WITH_RSA_ENCRYPTION => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &Sha256::digest(&tbs_der),
                signature,
            )
            .is_ok(),
        oid if oid == SHA_384_WITH_RSA_ENCRYPTION => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha384>(),
                &Sha384::digest(&tbs_der),
                signature,
            )
            .is_ok(),
        oid if oid == SHA_512_WITH_RSA_ENCRYPTION => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha512>(),
                &Sha512::digest(&tbs_der),
                signature,
            )
            .is_ok(),
        _ => false,
    }
}

/// Política hard-fail: hoja e intermedios exigen material de
/// revocación limpio (CRL del emisor en /DSS u OCSP presente).
fn revocation_material_ok(
    chain: &[Certificate],
    roots: &[Certificate],
    crls: &[CertificateList],
    ocsps: &[Vec<u8>],
    diagnostics: &mut Vec<String>,
) -> bool {
    if chain.is_empty() {
        return false;
    }

    for certificate in chain {
        if is_trust_root(certificate, roots) {
            continue;
        }

        let issuer_name = &certificate.tbs_certificate.issuer;

        let covering_crl = crls
            .iter()
            .find(|crl| &crl.tbs_cert_list.issuer == issuer_name);

        match covering_crl {
            Some(crl) => {
                let revoked = crl
                    .tbs_cert_list
                    .revoked_certificates
                    .as_ref()
                    .map(|entries| {
                        entries.iter().any(|entry| {
                            entry.serial_number == certificate.tbs_certificate.serial_number
                        })
                    })
                    .unwrap_or(false);

                if revoked {
                    diagnostics.push(format!(
                        "certificate serial {:?} is revoked by its issuer CRL",
                        certificate.tbs_certificate.serial_number
                    ));
                    return false;
                }
            }
            None if !ocsps.is_empty() => continue,
            None => {
                diagnostics.push(
                    "missing revocation information for a non-root chain element".into(),
                );
                return false;
            }
        }
    }

    true
}

// ---------------------------------------------------------------------
// Sello de tiempo documental
// ---------------------------------------------------------------------

fn verify_document_timestamp(
    bytes: &[u8],
    timestamp: &SignatureField,
    certification: &SignatureField,
    roots: &[Certificate],
    pool: &[Certificate],
    diagnostics: &mut Vec<String>,
) -> bool {
    let Some(timestamp_range) = timestamp.byte_range.as_ref().filter(|r| r.len() == 4) else {
        diagnostics.push("document timestamp without ByteRange".into());
        return false;
    };
    let Some(certification_range) = certification.byte_range.as_ref().filter(|r| r.len() == 4)
    else {
        diagnostics.push("certification without ByteRange".into());
        return false;
    };

    // El sello debe cubrir la firma de certificación completa.
    if certification_range[2] > timestamp_range[1] {
        diagnostics.push("document timestamp does not cover the certification hole".into());
        return false;
    }

    let Some(covered) = covered_bytes(bytes, timestamp_range) else {
        diagnostics.push("document timestamp ByteRange exceeds file bounds".into());
        return false;
    };

    let contents = timestamp.contents.clone().unwrap_or_default();
    let Some(token_der) = trim_der_prefix(&contents) else {
        diagnostics.push("timestamp hole carries no DER token".into());
        return false;
    };

    let Ok(token) = ContentInfo::from_der(token_der) else {
        diagnostics.push("timestamp token is not a ContentInfo".into());
        return false;
    };

    let Ok(token_signed_data) = token.content.decode_as::<SignedData>() else {
        diagnostics.push("timestamp token is not SignedData".into());
        return false;
    };

    // Imprint del TSTInfo contra el digest del ByteRange del sello.
    let tst_info = token_signed_data
        .encap_content_info
        .econtent
        .as_ref()
        .and_then(|content| content.decode_as::<OctetString>().ok())
        .and_then(|octets| TstInfo::from_der(octets.as_bytes()).ok());

    let Some(tst_info) = tst_info else {
        diagnostics.push("timestamp token without decodable TSTInfo".into());
        return false;
    };

    let imprint_matches = tst_info.message_imprint.hashed_message.as_bytes()
        == Sha256::digest(&covered).as_slice();
    if !imprint_matches {
        diagnostics.push("TSTInfo message imprint does not match ByteRange digest".into());
        return false;
    }

    // Cadena de la TSA: certificados del token + pool, contra raíces.
    let tsa_certificates = certificates_of(&token_signed_data);
    let Some(tsa_leaf) = token_signed_data
        .signer_infos
        .0
        .iter()
        .next()
        .and_then(|signer| {
            let mut candidates = tsa_certificates.clone();
            candidates.extend(pool.iter().cloned());
            find_signer_certificate(signer, &candidates)
        })
    else {
        diagnostics.push("timestamp token without identifiable TSA certificate".into());
        return false;
    };

    let mut tsa_pool = tsa_certificates;
    tsa_pool.extend(pool.iter().cloned());
    let (tsa_trusted, _) = build_trusted_chain(&tsa_leaf, &tsa_pool, roots);
    if !tsa_trusted {
        diagnostics.push("TSA certificate path does not terminate at a supplied root".into());
    }

    tsa_trusted
}

// ---------------------------------------------------------------------
// Diff DocMDP
// ---------------------------------------------------------------------

/// Clasifica las revisiones posteriores a la certificación.
///
/// Some(true): todo lo agregado cae dentro del alcance del permiso:
/// /DSS y material LTV para cualquier /P; el diccionario del sello
/// documental ETSI.RFC3161 para cualquier /P; redefiniciones de
/// catálogo, AcroForm y campos/diccionarios de firma adicionales SOLO
/// para /P≥2. Una redefinición de página JAMÁS entra en alcance:
/// ningún nivel de permiso DocMDP licencia ediciones de contenido de
/// página. Some(false): un objeto excede el alcance. None: la cola
/// posterior no es clasificable (p.ej. bytes sin estructura).
fn docmdp_diff(
    document: &PdfDocument,
    bytes: &[u8],
    certification: &SignatureField,
) -> Option<bool> {
    let byte_range = certification.byte_range.as_ref()?;
    if byte_range.len() != 4 {
        return None;
    }

    let coverage_end = usize::try_from(byte_range[2].checked_add(byte_range[3])?).ok()?;

    if coverage_end == bytes.len() {
        return Some(true);
    }
    if coverage_end > bytes.len() {
        return None;
    }

    let permission = certification.docmdp_permission.unwrap_or(2);

    let post_signing: Vec<u32> = document
        .definitions()
        .iter()
        .filter(|(_, offset)| *offset >= coverage_end)
        .map(|(id, _)| id.number)
        .collect();

    if post_signing.is_empty() {
        // Cola sin estructura de objetos: inconcluso por definición.
        return None;
    }

    for number in post_signing {
        let atom = document.object(number)?;

        let Some(dict) = atom.as_dict() else {
            // Streams sin diccionario no existen; átomos sueltos como
            // objeto indirecto de primer nivel son material extraño.
            return Some(false);
        };

        let type_name = dict
            .get("Type")
            .map(|t| document.resolve(t))
            .and_then(sigilo_core_pdf::PdfAtom::as_name);

        let is_dss = dict.contains_key("VRI")
            || dict.contains_key("Certs")
            || dict.contains_key("OCSPs")
            || dict.contains_key("CRLs");

        let is_bare_stream = matches!(atom, sigilo_core_pdf::PdfAtom::Stream { .. })
            && type_name.is_none();

        let classified_in_scope = match type_name {
            _ if is_dss || is_bare_stream => true,
            // Redefinir el catálogo puede reapuntar /AF o /Names hacia
            // material preexistente: solo /P≥2 lo tolera.
            Some("Catalog") => permission >= 2,
            Some("Sig") => {
                let is_document_timestamp = dict
                    .get("SubFilter")
                    .map(|s| document.resolve(s))
                    .and_then(sigilo_core_pdf::PdfAtom::as_name)
                    == Some(SUBFILTER_RFC3161);
                is_document_timestamp || permission >= 2
            }
            Some("Annot") => {
                let value_subfilter = dict
                    .get("V")
                    .map(|v| document.resolve(v))
                    .and_then(sigilo_core_pdf::PdfAtom::as_dict)
                    .and_then(|value| value.get("SubFilter"))
                    .map(|s| document.resolve(s))
                    .and_then(sigilo_core_pdf::PdfAtom::as_name);
                value_subfilter == Some(SUBFILTER_RFC3161) || permission >= 2
            }
            // Contenido de página intercambiado tras la firma (shadow
            // attack): fuera de alcance bajo TODO /P.
            Some("Page") => false,
            // AcroForm redefinido: solo /P≥2, como los campos de firma.
            None if dict.contains_key("Fields") => permission >= 2,
            _ => false,
        };

        if !classified_in_scope {
            return Some(false);
        }
    }

    Some(true)
}
