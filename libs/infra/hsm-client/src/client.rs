// [libs/infra/hsm-client/src/client.rs]
/*!
 * =================================================================
 * APARATO: AZURE HSM SIGNING CLIENT (V5.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: MÁQUINA SUBMIT/POLL DEL PLANO DE DATOS DE FIRMA
 *
 * Máquina de estados explícita por operación:
 *   Submitted(op_id) → Polling(op_id, attempt) → Done(sig) | Failed
 * El bucle de sondeo es privado de cada operación; jamás se comparte.
 *
 * La versión de API está FIJADA por compatibilidad con perfiles de
 * certificado creados vía signtool y con el enrutamiento no
 * documentado del servicio (payload con espejos Authenticode).
 * =================================================================
 */

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::backoff::{poll_delay, POLL_BUDGET_SECONDS};
use crate::chain::normalize_certificate_payload;
use crate::errors::SignerError;

/// Versión de API fijada (estabilidad + compatibilidad signtool).
pub const API_VERSION: &str = "2022-06-15-preview";

/// TTL de la caché de cadena de certificados del firmante.
pub const CHAIN_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Entrada centinela del bootstrap de cadena.
const BOOTSTRAP_SENTINEL: &[u8] = b"bootstrap";

/// Identificadores de algoritmo del servicio (NO semántica JOSE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Rs256,
    Rs384,
    Rs512,
}

impl SignatureAlgorithm {
    pub fn wire_label(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rs256 => "RS256",
            SignatureAlgorithm::Rs384 => "RS384",
            SignatureAlgorithm::Rs512 => "RS512",
        }
    }

    /// Longitud de digest exigida por el algoritmo.
    pub fn digest_length(&self) -> usize {
        match self {
            SignatureAlgorithm::Rs256 => 32,
            SignatureAlgorithm::Rs384 => 48,
            SignatureAlgorithm::Rs512 => 64,
        }
    }
}

/// Capacidad de obtención del bearer OAuth2. El material de identidad
/// es dominio del operador; el cliente solo lo porta.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String, SignerError>;
}

/// Proveedor de token estático (inyección por configuración).
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, SignerError> {
        if self.token.is_empty() {
            return Err(SignerError::InvalidArgument(
                "empty bearer token".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

/// Configuración del uplink de firmado.
#[derive(Debug, Clone)]
pub struct HsmSignerConfig {
    pub endpoint: String,
    pub account: String,
    pub profile: String,
}

impl HsmSignerConfig {
    /// Valida nombres de cuenta y perfil: `^[a-zA-Z0-9-]{3,64}$`.
    pub fn validate(&self) -> Result<(), SignerError> {
        for (label, value) in [("account", &self.account), ("profile", &self.profile)] {
            let valid_length = (3..=64).contains(&value.len());
            let valid_charset = value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid_length || !valid_charset {
                return Err(SignerError::InvalidArgument(format!(
                    "invalid signing {label} name"
                )));
            }
        }
        Ok(())
    }

    fn resource_path(&self) -> String {
        format!(
            "/codesigningaccounts/{}/certificateprofiles/{}",
            self.account, self.profile
        )
    }
}

/// Respuesta del plano de datos al completar una operación.
#[derive(Debug, Clone)]
pub struct SignerResponse {
    pub signature: Vec<u8>,
    pub certificate_chain_der: Vec<Vec<u8>>,
}

// ---------------------------------------------------------------------
// Cableado (payloads)
// ---------------------------------------------------------------------

#[derive(Serialize)]
struct SignSubmitPayload<'a> {
    #[serde(rename = "signatureAlgorithm")]
    signature_algorithm: &'a str,
    digest: String,
    // Espejos Authenticode: seleccionan intencionalmente el pipeline
    // compatible con signtool en el enrutamiento del servicio.
    #[serde(rename = "fileHashList")]
    file_hash_list: Vec<String>,
    #[serde(rename = "authenticodeHashList")]
    authenticode_hash_list: Vec<String>,
}

#[derive(Deserialize)]
struct SignPollBody {
    status: Option<String>,
    signature: Option<String>,
    #[serde(rename = "signingCertificate")]
    signing_certificate: Option<String>,
    error: Option<serde_json::Value>,
}

/// Fases explícitas de una operación de firma.
enum SignOperationPhase {
    Submitted { operation_id: String },
    Polling { operation_id: String, attempt: u32 },
    Done(SignerResponse),
    Failed(SignerError),
}

// ---------------------------------------------------------------------
// Cliente
// ---------------------------------------------------------------------

struct ChainCacheEntry {
    certificates_der: Vec<Vec<u8>>,
    fetched_at: Instant,
}

pub struct AzureHsmSigner {
    http: reqwest::Client,
    config: HsmSignerConfig,
    token_provider: Arc<dyn TokenProvider>,
    // Caché de lectura única propiedad de la tarea dueña del cliente;
    // TTL monotónico, entrada caduca se descarta antes del próximo uso.
    chain_cache: Mutex<Option<ChainCacheEntry>>,
}

impl AzureHsmSigner {
    pub fn new(
        config: HsmSignerConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Result<Self, SignerError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SignerError::TransientUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            config,
            token_provider,
            chain_cache: Mutex::new(None),
        })
    }

    // -----------------------------------------------------------------
    // API pública
    // -----------------------------------------------------------------

    /// Firma un digest precomputado.
    ///
    /// Devuelve `(firma, cadena_certificados_der)` — la cadena llega
    /// EXACTAMENTE como el servicio la emite, ya normalizada a DER.
    #[instrument(skip(self, digest))]
    pub async fn sign_digest(
        &self,
        digest: &[u8],
        algorithm: SignatureAlgorithm,
        correlation_id: &str,
    ) -> Result<SignerResponse, SignerError> {
        if digest.len() != algorithm.digest_length() {
            return Err(SignerError::InvalidArgument(format!(
                "digest length {} does not match {} requirement ({} bytes)",
                digest.len(),
                algorithm.wire_label(),
                algorithm.digest_length()
            )));
        }

        let started = Instant::now();
        let operation_id = self.submit(digest, algorithm, correlation_id).await?;

        let mut phase = SignOperationPhase::Submitted { operation_id };

        loop {
            phase = match phase {
                SignOperationPhase::Submitted { operation_id } => SignOperationPhase::Polling {
                    operation_id,
                    attempt: 0,
                },
                SignOperationPhase::Polling {
                    operation_id,
                    attempt,
                } => {
                    if started.elapsed() >= Duration::from_secs(POLL_BUDGET_SECONDS) {
                        SignOperationPhase::Failed(SignerError::TimedOut {
                            elapsed_seconds: started.elapsed().as_secs(),
                        })
                    } else {
                        tokio::time::sleep(poll_delay(attempt)).await;
                        match self.poll(&operation_id, correlation_id).await {
                            PollOutcome::Pending => SignOperationPhase::Polling {
                                operation_id,
                                attempt: attempt + 1,
                            },
                            PollOutcome::Transient(detail) => {
                                warn!(
                                    "🛰️  [HSM_UPLINK]: transient poll fault, retrying: {}",
                                    detail
                                );
                                SignOperationPhase::Polling {
                                    operation_id,
                                    attempt: attempt + 1,
                                }
                            }
                            PollOutcome::Done(response) => SignOperationPhase::Done(response),
                            PollOutcome::Failed(error) => SignOperationPhase::Failed(error),
                        }
                    }
                }
                SignOperationPhase::Done(response) => {
                    info!(
                        "🔏 [HSM_UPLINK]: digest signed in {}ms",
                        started.elapsed().as_millis()
                    );
                    return Ok(response);
                }
                SignOperationPhase::Failed(error) => return Err(error),
            };
        }
    }

    /// Cadena de certificados del firmante con caché de TTL corto.
    ///
    /// El servicio solo expone certificados dentro de una operación de
    /// firma: el bootstrap emite una firma de un solo uso sobre el
    /// digest del centinela, descarta la firma y conserva la cadena.
    #[instrument(skip(self))]
    pub async fn signer_chain(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<Vec<u8>>, SignerError> {
        {
            let cache = self
                .chain_cache
                .lock()
                .expect("chain cache lock poisoned");
            if let Some(entry) = cache.as_ref() {
                if entry.fetched_at.elapsed() < CHAIN_CACHE_TTL {
                    debug!("♻️  [HSM_UPLINK]: signer chain served from warm cache");
                    return Ok(entry.certificates_der.clone());
                }
            }
        }

        let sentinel_digest = Sha256::digest(BOOTSTRAP_SENTINEL);
        let response = self
            .sign_digest(&sentinel_digest, SignatureAlgorithm::Rs256, correlation_id)
            .await?;

        // La firma del centinela se descarta; solo interesa la cadena.
        let chain = response.certificate_chain_der;
        if chain.is_empty() {
            return Err(SignerError::RemoteFailure(
                "bootstrap produced no certificate material".to_string(),
            ));
        }

        let mut cache = self
            .chain_cache
            .lock()
            .expect("chain cache lock poisoned");
        *cache = Some(ChainCacheEntry {
            certificates_der: chain.clone(),
            fetched_at: Instant::now(),
        });

        info!(
            "📜 [HSM_UPLINK]: signer chain bootstrapped ({} certificates)",
            chain.len()
        );
        Ok(chain)
    }

    // -----------------------------------------------------------------
    // Interno: submit
    // -----------------------------------------------------------------

    fn sign_url(&self) -> String {
        format!(
            "{}{}/sign?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.resource_path(),
            API_VERSION
        )
    }

    fn poll_url(&self, operation_id: &str) -> String {
        format!(
            "{}{}/sign/{}?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.resource_path(),
            operation_id,
            API_VERSION
        )
    }

    fn trace_headers(
        &self,
        request: reqwest::RequestBuilder,
        correlation_id: &str,
    ) -> Result<reqwest::RequestBuilder, SignerError> {
        let token = self.token_provider.bearer_token()?;
        Ok(request
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-Correlation-ID", correlation_id)
            .header("x-ms-client-request-id", correlation_id)
            .header("x-ms-return-client-request-id", "true"))
    }

    async fn submit(
        &self,
        digest: &[u8],
        algorithm: SignatureAlgorithm,
        correlation_id: &str,
    ) -> Result<String, SignerError> {
        let digest_b64 = BASE64.encode(digest);
        let payload = SignSubmitPayload {
            signature_algorithm: algorithm.wire_label(),
            digest: digest_b64.clone(),
            file_hash_list: vec![digest_b64.clone()],
            authenticode_hash_list: vec![digest_b64],
        };

        let request = self
            .trace_headers(self.http.post(self.sign_url()), correlation_id)?
            .json(&payload);

        let response = request
            .send()
            .await
            .map_err(|e| SignerError::TransientUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignerError::RemoteFailure(format!(
                "submit rejected with HTTP {status}: {body}"
            )));
        }

        let async_operation = response
            .headers()
            .get("Azure-AsyncOperation")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                SignerError::RemoteFailure(
                    "response missing Azure-AsyncOperation header".to_string(),
                )
            })?;

        // Se extrae ÚNICAMENTE el identificador de operación.
        let operation_id = async_operation
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .split('?')
            .next()
            .unwrap_or("")
            .to_string();

        if operation_id.is_empty() {
            return Err(SignerError::RemoteFailure(
                "Azure-AsyncOperation header carried no operation id".to_string(),
            ));
        }

        Ok(operation_id)
    }

    // -----------------------------------------------------------------
    // Interno: poll
    // -----------------------------------------------------------------

    async fn poll(&self, operation_id: &str, correlation_id: &str) -> PollOutcome {
        let request = match self.trace_headers(self.http.get(self.poll_url(operation_id)), correlation_id)
        {
            Ok(request) => request,
            Err(error) => return PollOutcome::Failed(error),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => return PollOutcome::Transient(error.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return PollOutcome::Failed(SignerError::RemoteFailure(format!(
                "poll rejected with HTTP {status}"
            )));
        }

        let body: SignPollBody = match response.json().await {
            Ok(body) => body,
            Err(error) => return PollOutcome::Transient(error.to_string()),
        };

        match body.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("succeeded") => {
                let (Some(signature_b64), Some(certificate_b64)) =
                    (body.signature, body.signing_certificate)
                else {
                    return PollOutcome::Failed(SignerError::RemoteFailure(
                        "success response missing signature or certificate fields".to_string(),
                    ));
                };

                let signature = match BASE64.decode(signature_b64.as_bytes()) {
                    Ok(signature) => signature,
                    Err(error) => {
                        return PollOutcome::Failed(SignerError::RemoteFailure(format!(
                            "signature is not valid base64: {error}"
                        )))
                    }
                };

                match normalize_certificate_payload(certificate_b64.as_bytes()) {
                    Ok(chain) => PollOutcome::Done(SignerResponse {
                        signature,
                        certificate_chain_der: chain,
                    }),
                    Err(error) => PollOutcome::Failed(error),
                }
            }
            Some("failed") => PollOutcome::Failed(SignerError::RemoteFailure(format!(
                "service reported failure: {}",
                body.error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no detail".to_string())
            ))),
            // Estados asíncronos esperados → seguir sondeando.
            Some("running") | Some("inprogress") | Some("notstarted") | None => {
                PollOutcome::Pending
            }
            Some(other) => PollOutcome::Transient(format!("unknown status '{other}'")),
        }
    }
}

enum PollOutcome {
    Pending,
    Transient(String),
    Done(SignerResponse),
    Failed(SignerError),
}
