//! Rating event published on the fan-out exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Rating;

/// Wire payload announcing that a rating was accepted at intake.
///
/// Serialized as a flat JSON record:
///
/// ```json
/// { "providerId": 1, "ratingValue": 5, "userId": 7, "createdAt": "2024-05-01T10:00:00Z" }
/// ```
///
/// Exists only on the event bus; the notification consumer turns it into a
/// [`crate::domain::entities::Notification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCreatedEvent {
    pub provider_id: i64,
    pub rating_value: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl RateCreatedEvent {
    pub fn from_rating(rating: &Rating) -> Self {
        Self {
            provider_id: rating.provider_id,
            rating_value: rating.rating_value,
            user_id: rating.user_id,
            created_at: rating.created_at,
        }
    }

    /// Parses a raw bus payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for anything that is not a complete event record.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_format_is_flat_camel_case() {
        let event = RateCreatedEvent {
            provider_id: 1,
            rating_value: 5,
            user_id: 7,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        };

        let value: serde_json::Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();

        assert_eq!(value["providerId"], 1);
        assert_eq!(value["ratingValue"], 5);
        assert_eq!(value["userId"], 7);
        assert_eq!(value["createdAt"], "2024-05-01T10:00:00Z");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(RateCreatedEvent::decode(b"invalid message").is_err());
        assert!(RateCreatedEvent::decode(br#"{"providerId":1}"#).is_err());
    }
}
