use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Result, Topic};

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message travelling on a topic.
///
/// The payload is the flat record of the contract; the other fields are
/// transport metadata. `key` is the id of the aggregate the message is about,
/// consumers rely on per-key ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub message_id: MessageId,

    /// The channel the message was published on.
    pub topic: Topic,

    /// Partition key: the aggregate id.
    pub key: String,

    /// When the message was created.
    pub timestamp: DateTime<Utc>,

    /// The record as JSON.
    pub payload: serde_json::Value,
}

impl Message {
    /// Creates a message from a serializable record.
    pub fn new<T: Serialize + ?Sized>(
        topic: Topic,
        key: impl ToString,
        payload: &T,
    ) -> Result<Self> {
        Ok(Self::raw(topic, key, serde_json::to_value(payload)?))
    }

    /// Creates a message from a raw JSON payload.
    pub fn raw(topic: Topic, key: impl ToString, payload: serde_json::Value) -> Self {
        Self {
            message_id: MessageId::new(),
            topic,
            key: key.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Decodes the payload into a record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}
