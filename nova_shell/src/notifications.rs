// nova_shell/src/notifications.rs
use tracing::info;

pub struct NotificationManager {}

impl NotificationManager {
    pub fn new() -> Self {
        info!("Initializing NotificationManager component");
        Self {}
    }

    pub fn show_notification(&self, summary: &str, body: &str) {
        info!("Showing notification (placeholder): {} - {}", summary, body);
    }
}
