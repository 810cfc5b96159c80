// [libs/infra/hsm-client/src/chain.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICATE PAYLOAD NORMALIZER (V4.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: NORMALIZACIÓN DEL MATERIAL DE CADENA DEL SERVICIO
 *
 * El servicio emite la cadena del firmante en formatos variables.
 * La normalización intenta, EN ORDEN FIJO:
 *   1. PKCS#7 DER        (ContentInfo/SignedData)
 *   2. PKCS#7 PEM
 *   3. X.509 DER único
 *   4. X.509 PEM (uno o varios concatenados)
 *   5. base64-de-DER     (recursión sobre 1 y 3)
 * Solo falla cuando TODOS los intentos fallan.
 * =================================================================
 */

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use const_oid::db::rfc5911::ID_SIGNED_DATA;
use der::{Decode, Encode};
use x509_cert::Certificate;

use crate::errors::SignerError;

/// Normaliza el payload de certificados a una lista de DER X.509.
pub fn normalize_certificate_payload(raw: &[u8]) -> Result<Vec<Vec<u8>>, SignerError> {
    // 1. PKCS#7 DER
    if let Some(chain) = try_pkcs7_der(raw) {
        return Ok(chain);
    }

    // 2. PKCS#7 PEM
    if let Some(chain) = try_pem(raw, "PKCS7").and_then(|der| try_pkcs7_der(&der)) {
        return Ok(chain);
    }

    // 3. X.509 DER único
    if let Some(chain) = try_single_der(raw) {
        return Ok(chain);
    }

    // 4. X.509 PEM (uno o varios)
    if let Some(chain) = try_pem_certificates(raw) {
        return Ok(chain);
    }

    // 5. base64-de-DER (el transporte JSON suele envolver así)
    let stripped: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    if let Ok(decoded) = BASE64.decode(&stripped) {
        if let Some(chain) = try_pkcs7_der(&decoded) {
            return Ok(chain);
        }
        if let Some(chain) = try_single_der(&decoded) {
            return Ok(chain);
        }
    }

    Err(SignerError::ChainUnparseable(format!(
        "{} bytes resisted PKCS#7 DER/PEM, X.509 DER/PEM and base64-of-DER",
        raw.len()
    )))
}

fn try_pkcs7_der(raw: &[u8]) -> Option<Vec<Vec<u8>>> {
    let content_info = ContentInfo::from_der(raw).ok()?;
    if content_info.content_type != ID_SIGNED_DATA {
        return None;
    }

    let signed_data: SignedData = content_info.content.decode_as().ok()?;
    let certificates = signed_data.certificates?;

    let mut chain = Vec::new();
    for choice in certificates.0.iter() {
        if let cms::cert::CertificateChoices::Certificate(certificate) = choice {
            chain.push(certificate.to_der().ok()?);
        }
    }

    if chain.is_empty() {
        None
    } else {
        Some(chain)
    }
}

fn try_single_der(raw: &[u8]) -> Option<Vec<Vec<u8>>> {
    let certificate = Certificate::from_der(raw).ok()?;
    Some(vec![certificate.to_der().ok()?])
}

fn try_pem(raw: &[u8], expected_label: &str) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(raw).ok()?;
    let (label, der) = pem_rfc7468::decode_vec(text.as_bytes()).ok()?;
    if label != expected_label {
        return None;
    }
    Some(der)
}

fn try_pem_certificates(raw: &[u8]) -> Option<Vec<Vec<u8>>> {
    let text = std::str::from_utf8(raw).ok()?;
    let mut chain = Vec::new();

    // Divide el texto por bloques PEM CERTIFICATE concatenados.
    let mut remaining = text;
    while let Some(begin) = remaining.find("-----BEGIN CERTIFICATE-----") {
        let block = &remaining[begin..];
        let end = block.find("-----END CERTIFICATE-----")?;
        let end_absolute = end + "-----END CERTIFICATE-----".len();
        let pem_block = &block[..end_absolute];

        let (label, der) = pem_rfc7468::decode_vec(pem_block.as_bytes()).ok()?;
        if label != "CERTIFICATE" {
            return None;
        }
        // Validación: el DER debe parsear como certificado real.
        Certificate::from_der(&der).ok()?;
        chain.push(der);

        remaining = &block[end_absolute..];
    }

    if chain.is_empty() {
        None
    } else {
        Some(chain)
    }
}
