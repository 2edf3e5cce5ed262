//! # Notification Data Transfer Objects
//!
//! Notifications are fetched over REST and then kept current by push events
//! delivered on the notification WebSocket.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub count: u64,
}

/// Payload of `notification:read`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatusChange {
    pub id: String,
    pub is_read: bool,
}

/// Payload of `notification:deleted`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedNotification {
    pub id: String,
}

/// A frame on the notification push channel.
///
/// ```text
/// {"event":"notification","data":{...}}
/// {"event":"notification:read","data":{"id":"n1","isRead":true}}
/// {"event":"notifications:all-read"}
/// {"event":"notification:deleted","data":{"id":"n1"}}
/// ```
///
/// `notifications:all-read` carries no payload; any `data` sent with it is ignored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum PushEvent {
    #[serde(rename = "notification")]
    Created(Notification),
    #[serde(rename = "notification:read")]
    Read(ReadStatusChange),
    #[serde(rename = "notifications:all-read")]
    AllRead,
    #[serde(rename = "notification:deleted")]
    Deleted(DeletedNotification),
}

/// Raw frame before the payload is interpreted.
#[derive(Deserialize)]
struct PushFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

const PUSH_EVENTS: &[&str] = &[
    "notification",
    "notification:read",
    "notifications:all-read",
    "notification:deleted",
];

impl<'de> Deserialize<'de> for PushEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let frame = PushFrame::deserialize(deserializer)?;
        let event = match frame.event.as_str() {
            "notification" => serde_json::from_value(frame.data).map(PushEvent::Created),
            "notification:read" => serde_json::from_value(frame.data).map(PushEvent::Read),
            "notifications:all-read" => return Ok(PushEvent::AllRead),
            "notification:deleted" => serde_json::from_value(frame.data).map(PushEvent::Deleted),
            other => return Err(de::Error::unknown_variant(other, PUSH_EVENTS)),
        };
        event.map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_event_frames() {
        let read: PushEvent =
            serde_json::from_str(r#"{"event":"notification:read","data":{"id":"n1","isRead":true}}"#).unwrap();
        assert_eq!(
            read,
            PushEvent::Read(ReadStatusChange { id: "n1".to_string(), is_read: true })
        );

        let all: PushEvent = serde_json::from_str(r#"{"event":"notifications:all-read"}"#).unwrap();
        assert_eq!(all, PushEvent::AllRead);

        let created: PushEvent = serde_json::from_str(
            r#"{"event":"notification","data":{"id":"n2","type":"DEPOSIT","title":"Deposit approved",
                "message":"Your deposit of $100 was approved","isRead":false,"createdAt":"2024-05-01T10:00:00Z"}}"#,
        )
        .unwrap();
        match created {
            PushEvent::Created(n) => {
                assert_eq!(n.id, "n2");
                assert!(n.data.is_null());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_all_read_ignores_payload() {
        for frame in [
            r#"{"event":"notifications:all-read","data":{}}"#,
            r#"{"event":"notifications:all-read","data":{"userId":"u1","count":3}}"#,
            r#"{"event":"notifications:all-read","data":null}"#,
        ] {
            assert_eq!(serde_json::from_str::<PushEvent>(frame).unwrap(), PushEvent::AllRead);
        }
    }

    #[test]
    fn test_event_without_required_payload_is_rejected() {
        assert!(serde_json::from_str::<PushEvent>(r#"{"event":"notification:read"}"#).is_err());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<PushEvent>(r#"{"event":"typing","data":{}}"#).is_err());
    }
}
