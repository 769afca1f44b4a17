use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Core Notification Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Request,
    Job,
    Application,
    Interview,
    System,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    RequestCreated,
    RequestUpdated,
    RequestCompleted,
    CandidatesShortlisted,
    CandidateHired,
    InterviewScheduled,
    WalletFunded,
    PaymentFailed,
    SystemAnnouncement,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub recipient_role: Option<String>,
    pub category: NotificationCategory,
    #[serde(default)]
    pub read: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Notification {
    /// Title used for desktop notifications
    pub fn title(&self) -> &'static str {
        match self.category {
            NotificationCategory::Request => "Request update",
            NotificationCategory::Job => "Job update",
            NotificationCategory::Application => "New application",
            NotificationCategory::Interview => "Interview update",
            NotificationCategory::System => "System notice",
            NotificationCategory::Payment => "Payment update",
        }
    }
}

/// Server-computed aggregate, fetched separately from the list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub unread: u64,
    #[serde(default)]
    pub by_category: HashMap<String, u64>,
    #[serde(default)]
    pub by_priority: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NotificationListResponse {
    Plain(Vec<Notification>),
    Wrapped { notifications: Vec<Notification> },
}

impl NotificationListResponse {
    pub(crate) fn into_vec(self) -> Vec<Notification> {
        match self {
            NotificationListResponse::Plain(list) => list,
            NotificationListResponse::Wrapped { notifications } => notifications,
        }
    }
}

// ============================================================================
// Real-time Channel Frames
// ============================================================================

/// Every frame on the wire: `{"event": "...", "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

pub const EVENT_REGISTER: &str = "register";
pub const EVENT_MARK_READ: &str = "mark_notification_read";
pub const EVENT_REGISTERED: &str = "registered";
pub const EVENT_NOTIFICATION: &str = "notification";
pub const EVENT_MARKED_READ: &str = "notification_marked_read";
pub const EVENT_ERROR: &str = "error";

/// Client → Server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Register { user_id: String },
    MarkNotificationRead { notification_id: String },
}

impl ClientMessage {
    pub fn to_frame(&self) -> Frame {
        match self {
            ClientMessage::Register { user_id } => Frame {
                event: EVENT_REGISTER.to_string(),
                data: serde_json::json!({ "userId": user_id }),
            },
            ClientMessage::MarkNotificationRead { notification_id } => Frame {
                event: EVENT_MARK_READ.to_string(),
                data: serde_json::json!({ "notificationId": notification_id }),
            },
        }
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_frame())
    }
}

/// Server → Client
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Registered { user_id: Option<String> },
    Notification(Box<Notification>),
    NotificationMarkedRead { notification_id: String },
    Error { message: String },
    Unknown { event: String },
}

impl ServerEvent {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let frame: Frame = serde_json::from_str(text)?;
        Self::from_frame(frame)
    }

    pub fn from_frame(frame: Frame) -> Result<Self, serde_json::Error> {
        let event = match frame.event.as_str() {
            EVENT_REGISTERED => ServerEvent::Registered {
                user_id: string_field(&frame.data, "userId"),
            },
            EVENT_NOTIFICATION => {
                ServerEvent::Notification(Box::new(serde_json::from_value(frame.data)?))
            }
            EVENT_MARKED_READ => match string_field(&frame.data, "notificationId") {
                Some(notification_id) => ServerEvent::NotificationMarkedRead { notification_id },
                None => ServerEvent::Unknown { event: frame.event },
            },
            EVENT_ERROR => ServerEvent::Error {
                message: string_field(&frame.data, "message")
                    .unwrap_or_else(|| "unknown channel error".to_string()),
            },
            _ => ServerEvent::Unknown { event: frame.event },
        };
        Ok(event)
    }
}

/// Reads `key` from an object payload, or the payload itself when it is a bare string
fn string_field(data: &Value, key: &str) -> Option<String> {
    data.as_str()
        .map(str::to_string)
        .or_else(|| data.get(key).and_then(Value::as_str).map(str::to_string))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}
