//! Desktop (OS-level) notification display, gated by user permission

use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Never asked
    Default,
    Granted,
    Denied,
}

pub trait DesktopNotifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Asks the user; must not block the caller for long
    fn request_permission(&self) -> Permission;

    fn show(&self, title: &str, body: &str) -> Result<(), String>;
}

/// Renders desktop notifications as log events. The answer to the permission
/// prompt is fixed up front (the CLI takes it from configuration).
#[derive(Debug)]
pub struct TracingNotifier {
    permission: Mutex<Permission>,
    answer: Permission,
}

impl TracingNotifier {
    pub fn new(allow: bool) -> Self {
        Self {
            permission: Mutex::new(Permission::Default),
            answer: if allow {
                Permission::Granted
            } else {
                Permission::Denied
            },
        }
    }
}

impl DesktopNotifier for TracingNotifier {
    fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(Permission::Denied)
    }

    fn request_permission(&self) -> Permission {
        match self.permission.lock() {
            Ok(mut current) => {
                if *current == Permission::Default {
                    *current = self.answer;
                }
                *current
            }
            Err(_) => Permission::Denied,
        }
    }

    fn show(&self, title: &str, body: &str) -> Result<(), String> {
        if self.permission() != Permission::Granted {
            return Err("desktop notifications not permitted".to_string());
        }
        info!(title = %title, body = %body, "🔔 Notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_flow() {
        let notifier = TracingNotifier::new(true);
        assert_eq!(notifier.permission(), Permission::Default);
        assert!(notifier.show("t", "b").is_err());

        assert_eq!(notifier.request_permission(), Permission::Granted);
        assert!(notifier.show("t", "b").is_ok());
    }

    #[test]
    fn test_denied_is_sticky() {
        let notifier = TracingNotifier::new(false);
        assert_eq!(notifier.request_permission(), Permission::Denied);
        assert_eq!(notifier.request_permission(), Permission::Denied);
        assert!(notifier.show("t", "b").is_err());
    }
}
