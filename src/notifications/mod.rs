//! # Notifications Module
//!
//! In-app notifications for the signed-in user:
//! - A bounded, de-duplicated store that drives the unread badge
//! - REST endpoints for the bulk list, stats and read state
//! - A real-time push channel with reconnect and re-registration
//! - Optional desktop display gated by permission

pub mod channel;
pub mod desktop;
pub mod models;
pub mod service;
pub mod store;


pub use channel::{ChannelConfig, ChannelError, NotificationChannel};
pub use desktop::{DesktopNotifier, Permission, TracingNotifier};
pub use models::{
    ChannelStatus, ClientMessage, Frame, Notification, NotificationCategory, NotificationStats,
    NotificationType, ServerEvent,
};
pub use service::{NotificationBackend, NotificationService};
pub use store::{NotificationStore, MAX_NOTIFICATIONS};
