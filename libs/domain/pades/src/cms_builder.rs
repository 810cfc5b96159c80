// [libs/domain/pades/src/cms_builder.rs]
/*!
 * =================================================================
 * APARATO: DETACHED CMS BUILDER (V5.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: SIGNEDDATA DESPRENDIDO ALREDEDOR DEL PRIMITIVO HSM
 *
 * Atributos firmados: content-type, message-digest y signing-time.
 * El SignedData incrusta el certificado del firmante y la cadena
 * completa MENOS la raíz (las raíces viajan después en el /DSS).
 * La firma RSA se obtiene del uplink HSM; el modo dry-run sustituye
 * la firma por ceros del largo exacto del módulo para computar el
 * presupuesto de bytes sin un segundo viaje al HSM.
 * =================================================================
 */

use chrono::Utc;
use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::ContentInfo;
use cms::signed_data::{
    CertificateSet, EncapsulatedContentInfo, SignedData, SignerIdentifier, SignerInfo,
    SignerInfos,
};
use const_oid::db::rfc5911::{ID_CONTENT_TYPE, ID_DATA, ID_MESSAGE_DIGEST, ID_SIGNED_DATA, ID_SIGNING_TIME};
use const_oid::db::rfc5912::{ID_SHA_256, RSA_ENCRYPTION};
use der::asn1::{OctetString, SetOfVec, UtcTime};
use der::{Any, Decode, Encode};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use sha2::{Digest, Sha256};
use spki::AlgorithmIdentifierOwned;
use x509_cert::attr::Attribute;
use x509_cert::Certificate;

use sigilo_infra_hsm::{AzureHsmSigner, SignatureAlgorithm};

use crate::errors::SealError;

/// Conjunto de atributos firmados de la firma de certificación.
pub struct CmsSignedAttributes {
    attributes: SetOfVec<Attribute>,
}

impl CmsSignedAttributes {
    /// content-type(id-data) + message-digest + signing-time(ahora).
    pub fn for_document_digest(document_digest: &[u8]) -> Result<Self, SealError> {
        let mut attributes: SetOfVec<Attribute> = SetOfVec::new();

        attributes
            .insert(attribute(
                ID_CONTENT_TYPE,
                Any::encode_from(&ID_DATA).map_err(encoding)?,
            )?)
            .map_err(encoding)?;

        let digest_value = OctetString::new(document_digest).map_err(encoding)?;
        attributes
            .insert(attribute(
                ID_MESSAGE_DIGEST,
                Any::encode_from(&digest_value).map_err(encoding)?,
            )?)
            .map_err(encoding)?;

        let now = Utc::now();
        let signing_time = UtcTime::from_unix_duration(
            std::time::Duration::from_secs(now.timestamp().max(0) as u64),
        )
        .map_err(encoding)?;
        attributes
            .insert(attribute(
                ID_SIGNING_TIME,
                Any::encode_from(&signing_time).map_err(encoding)?,
            )?)
            .map_err(encoding)?;

        Ok(Self { attributes })
    }

    /// DER del SET OF explícito: la base exacta de la firma RSA.
    pub fn signature_base(&self) -> Result<Vec<u8>, SealError> {
        self.attributes.to_der().map_err(encoding)
    }
}

fn attribute(oid: const_oid::ObjectIdentifier, value: Any) -> Result<Attribute, SealError> {
    let mut values = SetOfVec::new();
    values.insert(value).map_err(encoding)?;
    Ok(Attribute { oid, values })
}

fn encoding(error: impl std::fmt::Display) -> SealError {
    SealError::CmsEncoding(error.to_string())
}

/// Largo en bytes del módulo RSA del certificado hoja.
fn modulus_length(leaf_der: &[u8]) -> Result<usize, SealError> {
    let certificate = Certificate::from_der(leaf_der).map_err(encoding)?;
    let spki_bytes = certificate
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| SealError::CmsEncoding("leaf SPKI bit string not octet-aligned".to_string()))?;

    let public_key =
        rsa::RsaPublicKey::from_pkcs1_der(spki_bytes).map_err(|e| encoding(e.to_string()))?;
    Ok(public_key.size())
}

/// ¿Certificado autofirmado? (issuer == subject ⇒ raíz).
fn is_self_issued(der_bytes: &[u8]) -> bool {
    Certificate::from_der(der_bytes)
        .map(|c| c.tbs_certificate.issuer == c.tbs_certificate.subject)
        .unwrap_or(false)
}

/// Ensambla el SignedData desprendido con la firma provista.
fn assemble_signed_data(
    chain_der: &[Vec<u8>],
    signed_attributes: &CmsSignedAttributes,
    signature: Vec<u8>,
) -> Result<Vec<u8>, SealError> {
    let leaf = Certificate::from_der(&chain_der[0]).map_err(encoding)?;

    let digest_algorithm = AlgorithmIdentifierOwned {
        oid: ID_SHA_256,
        parameters: None,
    };

    let signer_info = SignerInfo {
        version: cms::content_info::CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: leaf.tbs_certificate.issuer.clone(),
            serial_number: leaf.tbs_certificate.serial_number.clone(),
        }),
        digest_alg: digest_algorithm.clone(),
        signed_attrs: Some(signed_attributes.attributes.clone()),
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: RSA_ENCRYPTION,
            parameters: Some(Any::null()),
        },
        signature: OctetString::new(signature).map_err(encoding)?,
        unsigned_attrs: None,
    };

    let mut digest_algorithms = SetOfVec::new();
    digest_algorithms.insert(digest_algorithm).map_err(encoding)?;

    // Cadena completa menos la raíz; las raíces viajan en el /DSS.
    let mut certificate_set: SetOfVec<CertificateChoices> = SetOfVec::new();
    for der_bytes in chain_der {
        if chain_der.len() > 1 && is_self_issued(der_bytes) {
            continue;
        }
        let certificate = Certificate::from_der(der_bytes).map_err(encoding)?;
        certificate_set
            .insert(CertificateChoices::Certificate(certificate))
            .map_err(encoding)?;
    }

    let mut signer_infos: SignerInfos = SetOfVec::new().into();
    signer_infos.0.insert(signer_info).map_err(encoding)?;

    let signed_data = SignedData {
        version: cms::content_info::CmsVersion::V1,
        digest_algorithms,
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: ID_DATA,
            econtent: None,
        },
        certificates: Some(CertificateSet(certificate_set)),
        crls: None,
        signer_infos,
    };

    let content_info = ContentInfo {
        content_type: ID_SIGNED_DATA,
        content: Any::encode_from(&signed_data).map_err(encoding)?,
    };

    content_info.to_der().map_err(encoding)
}

/// Presupuesto exacto del CMS: misma estructura con firma en ceros.
///
/// Permite computar el ByteRange y validar el hueco reservado ANTES
/// de solicitar la firma real (un único viaje al HSM).
pub fn dry_run_cms_budget(
    chain_der: &[Vec<u8>],
    document_digest: &[u8],
) -> Result<usize, SealError> {
    if chain_der.is_empty() {
        return Err(SealError::ChainEmpty);
    }

    let signed_attributes = CmsSignedAttributes::for_document_digest(document_digest)?;
    let placeholder = vec![0u8; modulus_length(&chain_der[0])?];
    let encoded = assemble_signed_data(chain_der, &signed_attributes, placeholder)?;
    Ok(encoded.len())
}

/// Construye el CMS desprendido real alrededor del primitivo HSM.
pub async fn build_detached_cms(
    document_digest: &[u8],
    signer: &AzureHsmSigner,
    correlation_id: &str,
) -> Result<Vec<u8>, SealError> {
    let chain_der = signer.signer_chain(correlation_id).await?;
    if chain_der.is_empty() {
        return Err(SealError::ChainEmpty);
    }

    let signed_attributes = CmsSignedAttributes::for_document_digest(document_digest)?;

    // La firma RSA cubre el DER del SET OF de atributos firmados.
    let attribute_digest = Sha256::digest(signed_attributes.signature_base()?);

    let response = signer
        .sign_digest(&attribute_digest, SignatureAlgorithm::Rs256, correlation_id)
        .await?;

    assemble_signed_data(&chain_der, &signed_attributes, response.signature)
}
