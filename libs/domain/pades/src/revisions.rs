// [libs/domain/pades/src/revisions.rs]
/*!
 * =================================================================
 * APARATO: PADES REVISION ORCHESTRATION (V5.0)
 * CLASIFICACIÓN: DOMAIN (ESTRATO L2)
 * RESPONSABILIDAD: LAS TRES CLASES DE REVISIÓN DEL PERFIL PADES
 *
 * Rev 1 — Firma de certificación: subfiltro adbe.pkcs7.detached,
 *         campo determinista "ArchiveSignature", hueco de 32 KiB,
 *         DocMDP /P según el gating LTA.
 * Rev 2 — /DSS + /VRI: certificados (raíces incluidas), OCSP y CRL.
 * Rev 3 — Sello de tiempo documental ETSI.RFC3161 sobre el digest
 *         del ByteRange hasta el hueco del sello.
 * =================================================================
 */

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};
use x509_cert::ext::pkix::CrlDistributionPoints;
use x509_cert::Certificate;

use der::Decode;
use sigilo_core_pdf::{
    append_dss_revision, append_signature_revision, splice_contents, DssMaterial, PdfDocument,
    SignatureRevisionSpec, SignatureSkeleton, SUBFILTER_PKCS7_DETACHED, SUBFILTER_RFC3161,
};
use sigilo_infra_hsm::AzureHsmSigner;
use sigilo_infra_tsa::TsaClient;

use crate::cms_builder::{build_detached_cms, dry_run_cms_budget};
use crate::errors::SealError;

/// Nombre determinista del campo de certificación.
pub const CERTIFICATION_FIELD_NAME: &str = "ArchiveSignature";
/// Nombre determinista del campo de sello de tiempo.
pub const TIMESTAMP_FIELD_NAME: &str = "ArchiveTimestamp";

/// Hueco reservado para el CMS de certificación (constante segura).
pub const CERTIFICATION_RESERVED_BYTES: usize = 32 * 1024;
/// Hueco reservado para el token de la TSA.
pub const TIMESTAMP_RESERVED_BYTES: usize = 12 * 1024;

/// Digest SHA-256 de los dos tramos cubiertos por un ByteRange.
fn byte_range_digest(bytes: &[u8], byte_range: [i64; 4]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    let (o1, l1, o2, l2) = (
        byte_range[0] as usize,
        byte_range[1] as usize,
        byte_range[2] as usize,
        byte_range[3] as usize,
    );
    hasher.update(&bytes[o1..o1 + l1]);
    hasher.update(&bytes[o2..o2 + l2]);
    hasher.finalize().to_vec()
}

// ---------------------------------------------------------------------
// Rev 1 — Certificación
// ---------------------------------------------------------------------

/// Aplica la firma de certificación (RENDERED → BASELINE).
///
/// `docmdp_permission`: /P=1 sin actualizaciones LTA; /P=2 cuando el
/// ciclo de vida continuará con DSS y sello de tiempo.
#[instrument(skip(rendered, signer))]
pub async fn apply_certification_signature(
    rendered: &[u8],
    docmdp_permission: i64,
    signer: &AzureHsmSigner,
    correlation_id: &str,
) -> Result<Vec<u8>, SealError> {
    let skeleton: SignatureSkeleton = append_signature_revision(
        rendered,
        &SignatureRevisionSpec {
            field_name: CERTIFICATION_FIELD_NAME.to_string(),
            subfilter: SUBFILTER_PKCS7_DETACHED.to_string(),
            reserved_contents: CERTIFICATION_RESERVED_BYTES,
            docmdp_permission: Some(docmdp_permission),
            signing_time: Some(pdf_date_now()),
        },
    )?;

    let document_digest = byte_range_digest(&skeleton.bytes, skeleton.byte_range);

    // Dry-run: valida el presupuesto del hueco con firma en ceros,
    // sin segundo viaje al HSM.
    let chain = signer.signer_chain(correlation_id).await?;
    let needed = dry_run_cms_budget(&chain, &document_digest)?;
    if needed > CERTIFICATION_RESERVED_BYTES {
        return Err(SealError::BudgetExceeded {
            needed,
            reserved: CERTIFICATION_RESERVED_BYTES,
        });
    }

    let cms_der = build_detached_cms(&document_digest, signer, correlation_id).await?;
    if cms_der.len() > CERTIFICATION_RESERVED_BYTES {
        return Err(SealError::BudgetExceeded {
            needed: cms_der.len(),
            reserved: CERTIFICATION_RESERVED_BYTES,
        });
    }

    let mut sealed = skeleton.bytes;
    splice_contents(&mut sealed, skeleton.contents_hex_span, &cms_der)?;

    info!(
        "🖋️  [PADES]: certification signature applied ({} bytes of CMS in a {} byte hole)",
        cms_der.len(),
        CERTIFICATION_RESERVED_BYTES
    );
    Ok(sealed)
}

// ---------------------------------------------------------------------
// Rev 2 — DSS + VRI
// ---------------------------------------------------------------------

/// Clave VRI de una firma: SHA-1 de su /Contents, hex mayúsculas.
pub fn vri_key_for_contents(contents: &[u8]) -> String {
    let digest = Sha1::digest(contents);
    hex::encode_upper(digest)
}

/// Aplica la revisión DSS/VRI (BASELINE → LT).
///
/// Las raíces SÍ viajan aquí (a diferencia del CMS): el /DSS es el
/// almacén de validación a largo plazo.
#[instrument(skip(baseline, certificates, ocsp_responses, crls))]
pub fn apply_dss_revision(
    baseline: &[u8],
    certificates: Vec<Vec<u8>>,
    ocsp_responses: Vec<Vec<u8>>,
    crls: Vec<Vec<u8>>,
) -> Result<Vec<u8>, SealError> {
    let document = PdfDocument::parse(baseline)?;

    let certification = document
        .signature_fields()
        .into_iter()
        .find(|field| field.subfilter.as_deref() == Some(SUBFILTER_PKCS7_DETACHED))
        .ok_or_else(|| {
            SealError::CmsEncoding("DSS revision requires a certification signature".to_string())
        })?;

    let contents = certification.contents.unwrap_or_default();
    let vri_key = vri_key_for_contents(&contents);

    let extended = append_dss_revision(
        baseline,
        &DssMaterial {
            certificates,
            ocsp_responses,
            crls,
            vri_key,
        },
    )?;

    info!("🗄️  [PADES]: DSS/VRI revision appended");
    Ok(extended)
}

/// Recolecta CRLs desde los CRL Distribution Points de la cadena.
///
/// Mejor esfuerzo: un punto de distribución inalcanzable degrada a
/// omisión (el verificador decidirá si el material alcanza).
pub async fn collect_crl_material(chain_der: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, SealError> {
    let http = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(|e| SealError::RevocationFetch(e.to_string()))?;

    let mut crls = Vec::new();

    for der_bytes in chain_der {
        let Ok(certificate) = Certificate::from_der(der_bytes) else {
            continue;
        };
        let Some(extensions) = &certificate.tbs_certificate.extensions else {
            continue;
        };

        for extension in extensions {
            if extension.extn_id != const_oid::db::rfc5280::ID_CE_CRL_DISTRIBUTION_POINTS {
                continue;
            }
            let Ok(points) = CrlDistributionPoints::from_der(extension.extn_value.as_bytes())
            else {
                continue;
            };

            for point in points.0.iter() {
                let Some(DistributionPointName::FullName(names)) = &point.distribution_point
                else {
                    continue;
                };
                for name in names {
                    let GeneralName::UniformResourceIdentifier(uri) = name else {
                        continue;
                    };
                    let url = uri.to_string();
                    match http.get(&url).send().await {
                        Ok(response) if response.status().is_success() => {
                            if let Ok(body) = response.bytes().await {
                                crls.push(body.to_vec());
                            }
                        }
                        _ => continue,
                    }
                }
            }
        }
    }

    Ok(crls)
}

// ---------------------------------------------------------------------
// Rev 3 — Sello de tiempo documental
// ---------------------------------------------------------------------

/// Aplica el sello de tiempo documental (LT → LTA). Operación FINAL.
#[instrument(skip(lt_bytes, tsa))]
pub async fn apply_document_timestamp(
    lt_bytes: &[u8],
    tsa: &TsaClient,
) -> Result<Vec<u8>, SealError> {
    let skeleton = append_signature_revision(
        lt_bytes,
        &SignatureRevisionSpec {
            field_name: TIMESTAMP_FIELD_NAME.to_string(),
            subfilter: SUBFILTER_RFC3161.to_string(),
            reserved_contents: TIMESTAMP_RESERVED_BYTES,
            docmdp_permission: None,
            signing_time: None,
        },
    )?;

    let digest = byte_range_digest(&skeleton.bytes, skeleton.byte_range);
    let token = tsa.timestamp_digest(&digest).await?;

    if token.len() > TIMESTAMP_RESERVED_BYTES {
        return Err(SealError::BudgetExceeded {
            needed: token.len(),
            reserved: TIMESTAMP_RESERVED_BYTES,
        });
    }

    let mut sealed = skeleton.bytes;
    splice_contents(&mut sealed, skeleton.contents_hex_span, &token)?;

    info!("⏱️  [PADES]: document timestamp applied — artifact frozen");
    Ok(sealed)
}

fn pdf_date_now() -> String {
    chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
}
