use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Apple Push Notification Service specific options.
///
/// `payload` is free-form so callers can merge their own keys next to the
/// `aps` dictionary produced by [`ApnsPayload::to_map`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<ApnsHeaders>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
}

/// APNs request headers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsHeaders {
    /// UNIX epoch seconds after which the notification is discarded; "0" means
    /// deliver once or drop
    #[serde(rename = "apns-expiration", default, skip_serializing_if = "String::is_empty")]
    pub expiration: String,

    /// "10" (immediate) or "5" (power aware); APNs defaults to "10" when empty
    #[serde(rename = "apns-priority", default, skip_serializing_if = "String::is_empty")]
    pub priority: String,

    /// Usually the app bundle id
    #[serde(rename = "apns-topic", default, skip_serializing_if = "String::is_empty")]
    pub topic: String,

    /// At most 64 bytes
    #[serde(rename = "apns-collapse-id", default, skip_serializing_if = "String::is_empty")]
    pub collapse_id: String,
}

/// Values accepted by the `apns-priority` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsPriority {
    /// Power-aware delivery, may be grouped and throttled
    Normal,
    /// Immediate delivery; must trigger an alert, sound or badge
    High,
}

impl ApnsPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApnsPriority::Normal => "5",
            ApnsPriority::High => "10",
        }
    }
}

impl fmt::Display for ApnsPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `content-available` flag of the aps dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsContentAvailability {
    /// Delivered straight to the user
    Unavailable = 0,
    /// Background update; the app is woken to handle it
    Available = 1,
}

impl From<ApnsContentAvailability> for i64 {
    fn from(value: ApnsContentAvailability) -> Self {
        value as i64
    }
}

/// Structured APNs payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aps: Option<ApsDictionary>,
}

impl ApnsPayload {
    /// Converts the payload to the generic map carried by [`ApnsConfig::payload`]
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Reads the structured part back out of a generic payload map.
    ///
    /// Keys other than `aps` are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map.clone()))
    }

    pub fn is_background_only(&self) -> bool {
        self.aps
            .as_ref()
            .and_then(|aps| aps.content_available)
            .map_or(false, |flag| flag == i64::from(ApnsContentAvailability::Available))
    }
}

/// The `aps` dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApsDictionary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<ApnsAlert>,

    /// Badge count; `Some(0)` clears the badge, `None` leaves it unchanged
    #[serde(
        default,
        deserialize_with = "deserialize_integral",
        skip_serializing_if = "Option::is_none"
    )]
    pub badge: Option<i64>,

    /// Sound file in the app bundle, or "default"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sound: String,

    /// Identifier of a registered notification category
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    #[serde(rename = "thread-id", default, skip_serializing_if = "String::is_empty")]
    pub thread_id: String,

    #[serde(
        rename = "content-available",
        default,
        deserialize_with = "deserialize_integral",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_available: Option<i64>,
}

/// Accepts any JSON number with no fractional part, so `1.0` from a
/// hand-built payload map reads as `1`
fn deserialize_integral<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Some(value) = number.as_i64() {
        return Ok(Some(value));
    }

    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 => {
            Ok(Some(value as i64))
        }
        _ => Err(D::Error::custom(format!("expected an integer, got {}", number))),
    }
}

/// Alert shown by the system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsAlert {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(rename = "title-loc-key", default, skip_serializing_if = "String::is_empty")]
    pub title_loc_key: String,

    #[serde(rename = "title-loc-args", default, skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,

    /// Localized title of the "View" button
    #[serde(rename = "action-loc-key", default, skip_serializing_if = "String::is_empty")]
    pub action_loc_key: String,

    #[serde(rename = "loc-key", default, skip_serializing_if = "String::is_empty")]
    pub loc_key: String,

    #[serde(rename = "loc-args", default, skip_serializing_if = "Vec::is_empty")]
    pub loc_args: Vec<String>,

    #[serde(rename = "launch-image", default, skip_serializing_if = "String::is_empty")]
    pub launch_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_map_uses_apns_key_names() {
        let payload = ApnsPayload {
            aps: Some(ApsDictionary {
                alert: Some(ApnsAlert {
                    title: "Title".to_string(),
                    loc_key: "GAME_PLAY_REQUEST_FORMAT".to_string(),
                    ..Default::default()
                }),
                badge: Some(0),
                thread_id: "thread".to_string(),
                content_available: Some(1),
                ..Default::default()
            }),
        };

        let map = payload.to_map().unwrap();
        let aps = &map["aps"];
        assert_eq!(aps["alert"]["title"], "Title");
        assert_eq!(aps["alert"]["loc-key"], "GAME_PLAY_REQUEST_FORMAT");
        assert_eq!(aps["badge"], 0);
        assert_eq!(aps["thread-id"], "thread");
        assert_eq!(aps["content-available"], 1);
        assert!(aps.get("sound").is_none());
    }

    #[test]
    fn test_from_map_accepts_integral_numbers() {
        let map = serde_json::json!({
            "aps": { "badge": -1, "content-available": 1.0 },
            "acme": "bar",
        });
        let payload = ApnsPayload::from_map(map.as_object().unwrap()).unwrap();
        let aps = payload.aps.as_ref().unwrap();

        assert_eq!(aps.badge, Some(-1));
        assert_eq!(aps.content_available, Some(1));
        assert!(payload.is_background_only());

        let fractional = serde_json::json!({ "aps": { "badge": 1.5 } });
        assert!(ApnsPayload::from_map(fractional.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_empty_payload_maps_to_empty_map() {
        let map = ApnsPayload::default().to_map().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_custom_keys_survive_alongside_aps() {
        let payload = ApnsPayload {
            aps: Some(ApsDictionary {
                sound: "default".to_string(),
                ..Default::default()
            }),
        };

        let mut map = payload.to_map().unwrap();
        map.insert("acme1".to_string(), Value::from("bar"));
        map.insert("acme2".to_string(), serde_json::json!(["bang", "whiz"]));

        let decoded = ApnsPayload::from_map(&map).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(map["acme2"][1], "whiz");
    }

    #[test]
    fn test_background_only_detection() {
        let background = ApnsPayload {
            aps: Some(ApsDictionary {
                content_available: Some(ApnsContentAvailability::Available.into()),
                ..Default::default()
            }),
        };
        let foreground = ApnsPayload {
            aps: Some(ApsDictionary {
                content_available: Some(ApnsContentAvailability::Unavailable.into()),
                ..Default::default()
            }),
        };

        assert!(background.is_background_only());
        assert!(!foreground.is_background_only());
        assert!(!ApnsPayload::default().is_background_only());
    }

    #[test]
    fn test_priority_header_values() {
        assert_eq!(ApnsPriority::High.to_string(), "10");
        assert_eq!(ApnsPriority::Normal.as_str(), "5");

        let headers = ApnsHeaders {
            priority: ApnsPriority::High.to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&headers).unwrap();
        assert_eq!(json, serde_json::json!({ "apns-priority": "10" }));
    }
}
