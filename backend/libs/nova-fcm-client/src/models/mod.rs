use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod android;
pub mod apns;
pub mod credentials;
pub mod webpush;

pub use android::{AndroidConfig, AndroidMessagePriority, AndroidNotification};
pub use apns::{
    ApnsAlert, ApnsConfig, ApnsContentAvailability, ApnsHeaders, ApnsPayload, ApnsPriority,
    ApsDictionary,
};
pub use credentials::{GoogleTokenResponse, JwtClaims, ServiceAccountKey, TokenCache};
pub use webpush::{WebpushConfig, WebpushNotification};

/// Envelope posted to `messages:send`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Ask FCM to check the message without delivering it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl SendRequest {
    pub fn new(message: Message) -> Self {
        Self {
            validate_only: false,
            message: Some(message),
        }
    }

    /// Dry-run variant of [`SendRequest::new`]
    pub fn validate_only(message: Message) -> Self {
        Self {
            validate_only: true,
            message: Some(message),
        }
    }
}

/// Notification template shared by all platforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// FCM v1 message.
///
/// Exactly one of `token`, `topic` or `condition` must be set; see
/// [`crate::validation::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier, `projects/*/messages/{message_id}`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Registration token of a single device
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Topic name without the `/topics/` prefix, e.g. "weather"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,

    /// Topic condition, e.g. "'foo' in topics && 'bar' in topics"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub condition: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webpush: Option<WebpushConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
}

impl Message {
    /// Trailing id of [`Message::name`].
    ///
    /// A name without `/` is returned whole; an empty name yields "".
    pub fn message_id(&self) -> &str {
        match self.name.rfind('/') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    /// Shorthand for [`crate::validation::validate`]
    pub fn validate(&self) -> Result<(), crate::errors::ValidationError> {
        crate::validation::validate(Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_extraction() {
        let msg = Message {
            name: "projects/*/messages/{message_id}".to_string(),
            ..Default::default()
        };
        assert_eq!(msg.message_id(), "{message_id}");
    }

    #[test]
    fn test_message_id_edge_cases() {
        assert_eq!(Message::default().message_id(), "");

        let bare = Message {
            name: "0:1500415314455276%31bd1c9631bd1c96".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.message_id(), "0:1500415314455276%31bd1c9631bd1c96");

        let trailing = Message {
            name: "projects/p/messages/".to_string(),
            ..Default::default()
        };
        assert_eq!(trailing.message_id(), "");
    }

    #[test]
    fn test_empty_fields_are_omitted_on_the_wire() {
        let request = SendRequest::new(Message {
            topic: "cats".to_string(),
            ..Default::default()
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "message": { "topic": "cats" } }));
    }

    #[test]
    fn test_send_request_wire_names() {
        let mut data = HashMap::new();
        data.insert("count".to_string(), "3".to_string());

        let request = SendRequest::validate_only(Message {
            token: "device-token".to_string(),
            notification: Some(Notification {
                title: "Hello".to_string(),
                body: "World".to_string(),
            }),
            data,
            ..Default::default()
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["validate_only"], true);
        assert_eq!(json["message"]["token"], "device-token");
        assert_eq!(json["message"]["notification"]["title"], "Hello");
        assert_eq!(json["message"]["notification"]["body"], "World");
        assert_eq!(json["message"]["data"]["count"], "3");
    }

    #[test]
    fn test_full_message_round_trip() {
        let payload = ApnsPayload {
            aps: Some(ApsDictionary {
                alert: Some(ApnsAlert {
                    title: "Acme title".to_string(),
                    body: "Acme message".to_string(),
                    loc_args: vec!["Jenna".to_string(), "Frank".to_string()],
                    ..Default::default()
                }),
                badge: Some(1),
                sound: "chime.aiff".to_string(),
                thread_id: "my-thread-id".to_string(),
                ..Default::default()
            }),
        };
        let mut payload_map = payload.to_map().unwrap();
        payload_map.insert("acme1".to_string(), serde_json::json!("bar"));

        let mut android_data = HashMap::new();
        android_data.insert("acme1".to_string(), "bar".to_string());
        let mut webpush_headers = HashMap::new();
        webpush_headers.insert("TTL".to_string(), "15".to_string());

        let request = SendRequest::validate_only(Message {
            name: "projects/p/messages/1".to_string(),
            topic: "cats".to_string(),
            notification: Some(Notification {
                title: "FCM Message".to_string(),
                body: "Topic message".to_string(),
            }),
            apns: Some(ApnsConfig {
                headers: Some(ApnsHeaders {
                    expiration: "14567890".to_string(),
                    priority: ApnsPriority::Normal.to_string(),
                    topic: "my-topic".to_string(),
                    collapse_id: "my-collapse-id".to_string(),
                }),
                payload: payload_map,
            }),
            android: Some(AndroidConfig {
                collapse_key: "my-collapse-key".to_string(),
                priority: Some(AndroidMessagePriority::High),
                ttl: "84000s".to_string(),
                restricted_package_name: "com.example.app".to_string(),
                data: android_data,
                notification: Some(AndroidNotification {
                    title: "FCM Message".to_string(),
                    icon: "ic_notification".to_string(),
                    body_loc_args: vec!["Jenna".to_string()],
                    ..Default::default()
                }),
            }),
            webpush: Some(WebpushConfig {
                headers: webpush_headers,
                data: HashMap::new(),
                notification: Some(WebpushNotification {
                    title: "Web".to_string(),
                    body: "Push".to_string(),
                    icon: "https://example.com/icon.png".to_string(),
                }),
            }),
            ..Default::default()
        });

        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: SendRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, request);
    }
}
