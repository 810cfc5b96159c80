// [libs/infra/tsa-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: RFC 3161 TIMESTAMP UPLINK (V3.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: OBTENCIÓN DEL TESTIGO TEMPORAL DEL ARCHIVO
 *
 * El sello de tiempo documental establece el testigo "existió en o
 * antes de T" del perfil PAdES-B-LTA. La solicitud viaja como
 * application/timestamp-query; la respuesta retorna el token CMS
 * (TSTInfo firmado por la TSA) que se incrusta en el hueco
 * ETSI.RFC3161 del artefacto.
 * =================================================================
 */

use const_oid::db::rfc5912::ID_SHA_256;
use der::asn1::{Int, OctetString};
use der::{Decode, Encode};
use rand::RngCore;
use sha2::{Digest, Sha256};
use spki::AlgorithmIdentifierOwned;
use thiserror::Error;
use tracing::{info, instrument};
use cmpv2::status::PkiStatus;
use x509_tsp::{MessageImprint, TimeStampReq, TimeStampResp, TspVersion};

#[derive(Error, Debug)]
pub enum TsaError {
    #[error("TSA_UNREACHABLE: {0}")]
    Unreachable(String),

    #[error("TSA_REJECTION: Authority returned status {status:?}: {detail}")]
    Rejected { status: PkiStatus, detail: String },

    #[error("TSA_MALFORMED_REPLY: {0}")]
    MalformedReply(String),

    #[error("TSA_REQUEST_ENCODING: {0}")]
    RequestEncoding(String),
}

/// Cliente del endpoint HTTP de la autoridad de sellado de tiempo.
pub struct TsaClient {
    http: reqwest::Client,
    url: String,
}

impl TsaClient {
    pub fn new(url: String) -> Result<Self, TsaError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| TsaError::Unreachable(e.to_string()))?;

        Ok(Self { http, url })
    }

    /// Solicita un token sobre el mensaje dado (se digiere SHA-256).
    #[instrument(skip(self, message))]
    pub async fn timestamp_message(&self, message: &[u8]) -> Result<Vec<u8>, TsaError> {
        let digest = Sha256::digest(message);
        self.timestamp_digest(&digest).await
    }

    /// Solicita un token sobre un digest SHA-256 ya computado.
    pub async fn timestamp_digest(&self, digest: &[u8]) -> Result<Vec<u8>, TsaError> {
        let request_der = build_timestamp_request(digest)?;

        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/timestamp-query")
            .header("Accept", "application/timestamp-reply")
            .body(request_der)
            .send()
            .await
            .map_err(|e| TsaError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TsaError::Unreachable(format!(
                "authority answered HTTP {status}"
            )));
        }

        let reply = response
            .bytes()
            .await
            .map_err(|e| TsaError::Unreachable(e.to_string()))?;

        let token = extract_token(&reply)?;
        info!("⏱️  [TSA_UPLINK]: timestamp token obtained ({} bytes)", token.len());
        Ok(token)
    }
}

/// Construye el TimeStampReq DER (SHA-256, nonce, certReq=true).
pub fn build_timestamp_request(digest: &[u8]) -> Result<Vec<u8>, TsaError> {
    let hashed_message = OctetString::new(digest)
        .map_err(|e| TsaError::RequestEncoding(e.to_string()))?;

    // Nonce de 8 octetos, positivo (bit alto en cero).
    let mut nonce_bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    nonce_bytes[0] &= 0x7F;
    let nonce = Int::new(&nonce_bytes).map_err(|e| TsaError::RequestEncoding(e.to_string()))?;

    let request = TimeStampReq {
        version: TspVersion::V1,
        message_imprint: MessageImprint {
            hash_algorithm: AlgorithmIdentifierOwned {
                oid: ID_SHA_256,
                parameters: None,
            },
            hashed_message,
        },
        req_policy: None,
        nonce: Some(nonce),
        cert_req: true,
        extensions: None,
    };

    request
        .to_der()
        .map_err(|e| TsaError::RequestEncoding(e.to_string()))
}

/// Extrae el token CMS de un TimeStampResp, validando el PKIStatus.
pub fn extract_token(reply_der: &[u8]) -> Result<Vec<u8>, TsaError> {
    let reply = TimeStampResp::from_der(reply_der)
        .map_err(|e| TsaError::MalformedReply(e.to_string()))?;

    match reply.status.status {
        PkiStatus::Accepted | PkiStatus::GrantedWithMods => {}
        other => {
            return Err(TsaError::Rejected {
                status: other,
                detail: reply
                    .status
                    .status_string
                    .map(|s| format!("{s:?}"))
                    .unwrap_or_else(|| "no detail".to_string()),
            })
        }
    }

    let token = reply.time_stamp_token.ok_or_else(|| {
        TsaError::MalformedReply("granted reply without timestamp token".to_string())
    })?;

    token
        .to_der()
        .map_err(|e| TsaError::MalformedReply(e.to_string()))
}
