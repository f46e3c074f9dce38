use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::TokenProvider;
use crate::config::FcmConfig;
use crate::errors::{FCMError, HttpError, Result};
use crate::models::{Message, SendRequest};
use crate::transport::{dump_request, dump_response, HttpTransport, ReqwestTransport};
use crate::validation::validate;

/// Production FCM host
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Firebase Cloud Messaging Client
///
/// Sends FCM v1 messages on behalf of a service account. The client is cheap
/// to share behind an `Arc`: the token cache and the transport both accept
/// concurrent callers.
pub struct FCMClient {
    project_id: String,
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
    token_provider: TokenProvider,
    timeout: Option<Duration>,
}

impl FCMClient {
    /// Create new FCM client from a service account JSON file
    ///
    /// # Arguments
    /// * `project_id` - Firebase project ID
    /// * `credentials_location` - Path to the service account key
    pub fn new(project_id: impl Into<String>, credentials_location: impl AsRef<Path>) -> Result<Self> {
        Self::builder(project_id)
            .credentials_file(credentials_location.as_ref())
            .build()
    }

    /// Create new FCM client from raw service account JSON
    pub fn from_bytes(project_id: impl Into<String>, json_key: &[u8]) -> Result<Self> {
        Self::builder(project_id).credentials_json(json_key).build()
    }

    /// Create new FCM client from environment-backed configuration
    pub fn from_config(config: &FcmConfig) -> Result<Self> {
        let mut builder = Self::builder(config.project_id.clone());

        builder = match (&config.credentials_json, &config.credentials_location) {
            (Some(json), _) => builder.credentials_json(json.as_bytes()),
            (None, Some(path)) => builder.credentials_file(path),
            (None, None) => {
                return Err(FCMError::Config(
                    "either FCM_CREDENTIALS_JSON or FCM_CREDENTIALS_LOCATION must be set"
                        .to_string(),
                ))
            }
        };

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        builder.build()
    }

    pub fn builder(project_id: impl Into<String>) -> FCMClientBuilder {
        FCMClientBuilder::new(project_id)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Full `messages:send` URL for this project
    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    /// Validate and send a message.
    ///
    /// Exactly one HTTP exchange with FCM is made (plus a token refresh when
    /// the cached token is stale). Nothing is retried. Without a builder
    /// timeout the call waits as long as the transport does; drop the future
    /// or use [`FCMClient::send_with_timeout`] to bound it.
    pub async fn send(&self, request: &SendRequest) -> Result<Message> {
        match self.timeout {
            Some(timeout) => self.send_with_timeout(request, timeout).await,
            None => self.send_inner(request).await,
        }
    }

    /// Same as [`FCMClient::send`], failing with [`FCMError::Timeout`] once
    /// `timeout` elapses
    pub async fn send_with_timeout(&self, request: &SendRequest, timeout: Duration) -> Result<Message> {
        tokio::time::timeout(timeout, self.send_inner(request))
            .await
            .map_err(|_| FCMError::Timeout(timeout))?
    }

    async fn send_inner(&self, request: &SendRequest) -> Result<Message> {
        validate(request.message.as_ref())?;

        let body = serde_json::to_vec(request)?;
        let url = self.send_url();

        let access_token = self.token_provider.token().await?;

        let http_request = http::Request::post(url.as_str())
            .header(http::header::AUTHORIZATION, format!("Bearer {}", access_token))
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|e| FCMError::SendRequestError(e.to_string()))?;

        debug!(
            project_id = %self.project_id,
            validate_only = request.validate_only,
            "Sending FCM message"
        );

        let response = self.transport.execute(&http_request).await?;
        let status = response.status();

        if !status.is_success() {
            warn!(
                project_id = %self.project_id,
                status = status.as_u16(),
                "FCM API returned an error status"
            );
            return Err(HttpError::new(
                status,
                dump_request(&http_request),
                dump_response(&response),
            )
            .into());
        }

        let message: Message = serde_json::from_slice(response.body())
            .map_err(|e| FCMError::ResponseParseError(e.to_string()))?;

        info!(
            project_id = %self.project_id,
            message_id = %message.message_id(),
            "FCM message sent"
        );

        Ok(message)
    }
}

impl std::fmt::Debug for FCMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FCMClient")
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .field("token_provider", &self.token_provider)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

enum CredentialsSource {
    File(PathBuf),
    Json(Vec<u8>),
}

/// Construction options for [`FCMClient`]
pub struct FCMClientBuilder {
    project_id: String,
    credentials: Option<CredentialsSource>,
    transport: Option<Arc<dyn HttpTransport>>,
    endpoint: String,
    timeout: Option<Duration>,
}

impl FCMClientBuilder {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credentials: None,
            transport: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }

    pub fn credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials = Some(CredentialsSource::File(path.into()));
        self
    }

    pub fn credentials_json(mut self, json_key: &[u8]) -> Self {
        self.credentials = Some(CredentialsSource::Json(json_key.to_vec()));
        self
    }

    /// Route token refreshes and sends through a custom transport
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a preconfigured reqwest client (proxy, TLS settings)
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(Arc::new(ReqwestTransport::from_client(client)))
    }

    /// Override the FCM base URL, e.g. for an emulator
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Default deadline applied by [`FCMClient::send`]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<FCMClient> {
        if self.project_id.is_empty() {
            return Err(FCMError::Config("project id is empty".to_string()));
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        let token_provider = match self.credentials {
            Some(CredentialsSource::File(path)) => TokenProvider::from_file(path, transport.clone())?,
            Some(CredentialsSource::Json(json_key)) => {
                TokenProvider::from_bytes(&json_key, transport.clone())?
            }
            None => {
                return Err(FCMError::InvalidCredentials(
                    "no service account credentials provided".to_string(),
                ))
            }
        };

        info!(
            project_id = %self.project_id,
            client_email = %token_provider.client_email(),
            "Initialized FCM client"
        );

        Ok(FCMClient {
            project_id: self.project_id,
            endpoint: self.endpoint,
            transport,
            token_provider,
            timeout: self.timeout,
        })
    }
}
