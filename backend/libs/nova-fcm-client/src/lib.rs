//! Nova FCM Client Library
//!
//! This library provides a Firebase Cloud Messaging (FCM) HTTP v1 client
//! for sending push notifications to Android, Apple and Web devices.
//!
//! It handles:
//! - The FCM v1 message schema, including Android, APNs and Webpush overrides
//! - Local validation of messages before they are sent
//! - OAuth2 token generation using Google service accounts
//! - Token caching with automatic refresh
//! - Single message delivery with typed HTTP error diagnostics
//!
//! Retries, batching and rate limiting are left to the caller.

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod transport;
pub mod validation;

pub use auth::TokenProvider;
pub use client::{FCMClient, FCMClientBuilder};
pub use config::FcmConfig;
pub use errors::{FCMError, HttpError, ValidationError};
pub use models::{
    AndroidConfig, AndroidMessagePriority, AndroidNotification, ApnsAlert, ApnsConfig,
    ApnsContentAvailability, ApnsHeaders, ApnsPayload, ApnsPriority, ApsDictionary, Message,
    Notification, SendRequest, ServiceAccountKey, WebpushConfig, WebpushNotification,
};
pub use transport::{HttpTransport, ReqwestTransport};
pub use validation::validate;
