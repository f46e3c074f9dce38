use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::{FCMError, Result};
use crate::models::{GoogleTokenResponse, JwtClaims, ServiceAccountKey, TokenCache};
use crate::transport::HttpTransport;

/// OAuth2 scope required by the FCM v1 API
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime requested for the signed assertion
const ASSERTION_LIFETIME_HOURS: i64 = 1;

/// Bearer tokens for one service account.
///
/// The token is fetched lazily and cached until shortly before it expires.
/// Refreshes are serialized, so concurrent callers share one exchange.
pub struct TokenProvider {
    credentials: ServiceAccountKey,
    encoding_key: EncodingKey,
    transport: Arc<dyn HttpTransport>,
    cache: Mutex<Option<TokenCache>>,
}

impl TokenProvider {
    /// Reads a service account JSON key from disk
    pub fn from_file(path: impl AsRef<Path>, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let path = path.as_ref();
        let json_key = std::fs::read(path).map_err(|source| FCMError::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(&json_key, transport)
    }

    /// Parses a service account JSON key
    pub fn from_bytes(json_key: &[u8], transport: Arc<dyn HttpTransport>) -> Result<Self> {
        if json_key.is_empty() {
            return Err(FCMError::InvalidCredentials(
                "credentials are empty".to_string(),
            ));
        }

        let credentials: ServiceAccountKey = serde_json::from_slice(json_key)
            .map_err(|e| FCMError::InvalidCredentials(e.to_string()))?;

        Self::new(credentials, transport)
    }

    pub fn new(credentials: ServiceAccountKey, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        if !credentials.key_type.is_empty() && credentials.key_type != "service_account" {
            return Err(FCMError::InvalidCredentials(format!(
                "'type' field is \"{}\" (expected \"service_account\")",
                credentials.key_type
            )));
        }
        if credentials.client_email.is_empty() {
            return Err(FCMError::InvalidCredentials(
                "'client_email' is empty".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| FCMError::KeyParseError(e.to_string()))?;

        Ok(Self {
            credentials,
            encoding_key,
            transport,
            cache: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Returns a valid access token, refreshing it when needed
    pub async fn token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Utc::now().timestamp(), EXPIRY_MARGIN_SECS) {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.fetch_token().await.map_err(FCMError::TokenError)?;
        let access_token = fresh.access_token.clone();
        *cache = Some(fresh);

        Ok(access_token)
    }

    /// Drops the cached token so the next call refreshes
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    fn sign_assertion(&self) -> Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: FIREBASE_MESSAGING_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(ASSERTION_LIFETIME_HOURS)).timestamp(),
            iat: now.timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        if !self.credentials.private_key_id.is_empty() {
            header.kid = Some(self.credentials.private_key_id.clone());
        }

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| FCMError::JwtEncodeError(e.to_string()))
    }

    async fn fetch_token(&self) -> std::result::Result<TokenCache, String> {
        let assertion = self.sign_assertion().map_err(|e| e.to_string())?;
        let form = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_BEARER_GRANT),
            urlencoding::encode(&assertion)
        );

        let request = http::Request::post(self.credentials.token_uri.as_str())
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form.into_bytes())
            .map_err(|e| format!("invalid token_uri: {}", e))?;

        debug!(
            client_email = %self.credentials.client_email,
            token_uri = %self.credentials.token_uri,
            "Refreshing FCM access token"
        );

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| format!("Failed to get access token: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Token request failed with status: {} - {}",
                response.status(),
                String::from_utf8_lossy(response.body())
            ));
        }

        let token_response: GoogleTokenResponse = serde_json::from_slice(response.body())
            .map_err(|e| format!("Failed to parse token response: {}", e))?;

        if token_response.access_token.is_empty() {
            return Err("server response missing access_token".to_string());
        }

        let expires_in = token_response
            .expires_in
            .unwrap_or(ASSERTION_LIFETIME_HOURS * 3600);

        Ok(TokenCache {
            access_token: token_response.access_token,
            expires_at: Utc::now().timestamp().saturating_add(expires_in),
        })
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("client_email", &self.credentials.client_email)
            .field("token_uri", &self.credentials.token_uri)
            .finish_non_exhaustive()
    }
}
