use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Android specific options for messages sent through the FCM connection server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Collapsible group of messages; at most 4 keys are kept at a time
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collapse_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<AndroidMessagePriority>,

    /// How long FCM keeps the message while the device is offline.
    ///
    /// Duration string such as "3600s" or "3.5s"; at most 4 weeks.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ttl: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub restricted_package_name: String,

    /// Overrides `Message::data` on Android
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

/// Delivery priority for Android devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidMessagePriority {
    /// Default for data messages; may be delayed to save battery
    Normal,
    /// Default for notification messages; wakes a sleeping device
    High,
}

/// Notification shown on Android devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AndroidNotification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// Drawable resource name; the launcher icon is used when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,

    /// "default" or a sound file bundled under /res/raw/
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sound: String,

    /// Replaces a shown notification carrying the same tag
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// #rrggbb
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub click_action: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body_loc_key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_loc_args: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_loc_key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,
}
