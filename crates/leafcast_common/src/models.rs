// --- File: crates/leafcast_common/src/models.rs ---

// Domain model shared by the storage layer and its callers.

use crate::error::{parse_error, validation_error, LeafcastError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Length of an uncompressed P-256 public key (0x04 || X || Y)
pub const P256DH_KEY_LEN: usize = 65;

/// Length of the Web Push authentication secret
pub const AUTH_SECRET_LEN: usize = 16;

/// Encryption material of a push subscription, base64url encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub auth: String,
    pub p256dh: String,
}

/// How to reach a device through its push service.
///
/// This mirrors the JSON a browser produces for `PushSubscription.toJSON()`,
/// which is also the form it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub endpoint: String,

    #[serde(
        rename = "expirationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_time: Option<i64>,

    pub keys: SubscriptionKeys,
}

impl Subscription {
    /// Parse and validate a subscription from its stored text form
    pub fn parse(text: &str) -> Result<Self, LeafcastError> {
        let subscription: Subscription = serde_json::from_str(text)?;
        subscription.validate()?;
        Ok(subscription)
    }

    /// Validate and serialize the subscription to its stored text form
    pub fn to_text(&self) -> Result<String, LeafcastError> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }

    /// Check that the endpoint is an HTTP(S) URL and that both keys decode
    /// to the sizes Web Push encryption requires.
    pub fn validate(&self) -> Result<(), LeafcastError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| validation_error(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;
        if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
            return Err(validation_error(format!(
                "unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }

        let p256dh = decode_key("p256dh", &self.keys.p256dh)?;
        if p256dh.len() != P256DH_KEY_LEN || p256dh[0] != 0x04 {
            return Err(validation_error(
                "p256dh must be an uncompressed P-256 public key",
            ));
        }

        let auth = decode_key("auth", &self.keys.auth)?;
        if auth.len() != AUTH_SECRET_LEN {
            return Err(validation_error(format!(
                "auth must be {} bytes, got {}",
                AUTH_SECRET_LEN,
                auth.len()
            )));
        }

        Ok(())
    }
}

// Browsers emit unpadded base64url; padded input is tolerated.
fn decode_key(name: &str, value: &str) -> Result<Vec<u8>, LeafcastError> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| parse_error(format!("{} is not base64url: {}", name, e)))
}

/// A push-notification endpoint owned by one user.
///
/// `id` and `created_at` are assigned by the database and are `None` until
/// the device has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// The unique identifier of this device
    pub id: Option<i64>,

    /// The user owning this device
    pub user_id: i64,

    /// Client-chosen identifier, unique per user
    pub key: String,

    /// Where to deliver push messages for this device
    pub subscription: Subscription,

    /// The timestamp when this device was stored
    pub created_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Create a new, not yet stored, device
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user owning the device
    /// * `key` - The client-chosen device identifier
    /// * `subscription` - The push subscription of the device
    pub fn new(user_id: i64, key: impl Into<String>, subscription: Subscription) -> Self {
        Self {
            id: None,
            user_id,
            key: key.into(),
            subscription,
            created_at: None,
        }
    }

    /// The subscription in its stored text form
    pub fn subscription_text(&self) -> Result<String, LeafcastError> {
        self.subscription.to_text()
    }

    /// Check the fields a caller provides before the device is stored
    pub fn validate(&self) -> Result<(), LeafcastError> {
        if self.key.trim().is_empty() {
            return Err(validation_error("device key must not be empty"));
        }
        self.subscription.validate()
    }
}
