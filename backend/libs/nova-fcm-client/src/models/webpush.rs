use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Webpush protocol options (RFC 8030)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebpushConfig {
    /// Webpush HTTP headers, e.g. "TTL": "15"
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Overrides `Message::data` for web clients
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<WebpushNotification>,
}

/// Web notification delivered through webpush
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebpushNotification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// URL of the notification icon
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
}
