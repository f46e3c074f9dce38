//! Dry-run send of a message carrying every platform block.
//!
//! The APNs payload is built from the typed dictionary and then extended with
//! custom keys before sending.
//!
//! ```sh
//! FCM_PROJECT_ID=my-project FCM_CREDENTIALS_LOCATION=secrets/sa.json \
//!     cargo run -p nova-fcm-client --example apns_payload
//! ```

use std::collections::HashMap;

use nova_fcm_client::{
    AndroidConfig, AndroidMessagePriority, AndroidNotification, ApnsAlert, ApnsConfig,
    ApnsContentAvailability, ApnsHeaders, ApnsPayload, ApnsPriority, ApsDictionary, FCMClient,
    FcmConfig, Message, Notification, SendRequest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let apns_payload = ApnsPayload {
        aps: Some(ApsDictionary {
            alert: Some(ApnsAlert {
                title: "Acme title".to_string(),
                body: "Acme message received from Johnny Appleseed".to_string(),
                loc_key: "GAME_PLAY_REQUEST_FORMAT".to_string(),
                loc_args: vec!["Jenna".to_string(), "Frank".to_string()],
                title_loc_key: "GAME_PLAY_REQUEST_FORMAT".to_string(),
                title_loc_args: vec!["Jenna".to_string(), "Frank".to_string()],
                action_loc_key: "PLAY".to_string(),
                launch_image: "UILaunchImageFileKey".to_string(),
            }),
            badge: Some(1),
            sound: "chime.aiff".to_string(),
            category: "NEW_MESSAGE_CATEGORY".to_string(),
            thread_id: "my-thread-id".to_string(),
            content_available: Some(ApnsContentAvailability::Available.into()),
        }),
    };

    let mut payload = apns_payload.to_map()?;
    payload.insert("acme1".to_string(), serde_json::json!("bar"));
    payload.insert("acme2".to_string(), serde_json::json!(["bang", "whiz"]));

    let mut android_data = HashMap::new();
    android_data.insert("acme1".to_string(), "bar".to_string());

    let request = SendRequest::validate_only(Message {
        topic: "cats".to_string(),
        notification: Some(Notification {
            title: "FCM Message".to_string(),
            body: "This is a Firebase Cloud Messaging Topic Message!".to_string(),
        }),
        apns: Some(ApnsConfig {
            headers: Some(ApnsHeaders {
                expiration: "14567890".to_string(),
                // Background updates must not ask for immediate delivery.
                priority: ApnsPriority::Normal.to_string(),
                topic: "my-topic".to_string(),
                collapse_id: "my-collapse-id".to_string(),
            }),
            payload,
        }),
        android: Some(AndroidConfig {
            collapse_key: "my-collapse-key".to_string(),
            priority: Some(AndroidMessagePriority::High),
            ttl: "84000s".to_string(),
            restricted_package_name: "com.example.nova".to_string(),
            data: android_data,
            notification: Some(AndroidNotification {
                title: "FCM Message".to_string(),
                body: "This is a Firebase Cloud Messaging Topic Message!".to_string(),
                icon: "ic_notification".to_string(),
                color: "#336699".to_string(),
                sound: "res_raw_notification_sound.mp3".to_string(),
                tag: "my-notification-tag".to_string(),
                click_action: "MainActivity".to_string(),
                body_loc_key: "notification_body".to_string(),
                body_loc_args: vec!["Jenna".to_string(), "Frank".to_string()],
                title_loc_key: "notification_title".to_string(),
                title_loc_args: vec!["Jenna".to_string(), "Frank".to_string()],
            }),
        }),
        ..Default::default()
    });

    let config = FcmConfig::from_env()?;
    let client = FCMClient::from_config(&config)?;

    let response = client.send(&request).await?;
    println!("{:#?}", response);

    Ok(())
}
