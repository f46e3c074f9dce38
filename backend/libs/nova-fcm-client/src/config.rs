use std::time::Duration;

use serde::Deserialize;

use crate::errors::{FCMError, Result};

/// Client settings read from `FCM_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// FCM_PROJECT_ID
    pub project_id: String,
    /// FCM_CREDENTIALS_LOCATION, path to the service account key
    #[serde(default)]
    pub credentials_location: Option<String>,
    /// FCM_CREDENTIALS_JSON, inline service account key; wins over the path
    #[serde(default)]
    pub credentials_json: Option<String>,
    /// FCM_ENDPOINT, base URL override
    #[serde(default)]
    pub endpoint: Option<String>,
    /// FCM_TIMEOUT_SECS
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FcmConfig {
    /// Loads `.env` when present, then reads the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Reads the `FCM_*` entries of an explicit variable list
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("FCM_")
            .from_iter::<_, FcmConfig>(vars)
            .map_err(|e| FCMError::Config(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
