//! Notification integration module for the NovaDE system layer.
//!
//! This module provides notification integration functionality for the NovaDE desktop environment,
//! connecting to system notification services.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use novade_domain::notifications::core::{Notification, NotificationId, NotificationPriority};
use crate::error::{SystemError, SystemResult, to_system_error, SystemErrorKind};

/// Notification integration interface.
#[async_trait]
pub trait NotificationIntegration: Send + Sync {
    /// Sends a notification.
    ///
    /// # Arguments
    ///
    /// * `notification` - The notification to send
    ///
    /// # Returns
    ///
    /// The notification ID, or an error if sending failed.
    async fn send_notification(&self, notification: Notification) -> SystemResult<NotificationId>;
    
    /// Updates a notification.
    ///
    /// # Arguments
    ///
    /// * `id` - The notification ID
    /// * `notification` - The updated notification
    ///
    /// # Returns
    ///
    /// `Ok(())` if the notification was updated, or an error if it failed.
    async fn update_notification(&self, id: NotificationId, notification: Notification) -> SystemResult<()>;
    
    /// Closes a notification.
    ///
    /// # Arguments
    ///
    /// * `id` - The notification ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the notification was closed, or an error if it failed.
    async fn close_notification(&self, id: NotificationId) -> SystemResult<()>;
    
    /// Gets the capabilities of the notification service.
    ///
    /// # Returns
    ///
    /// A vector of capability strings.
    async fn get_capabilities(&self) -> SystemResult<Vec<String>>;
}

/// D-Bus notification integration implementation.
pub struct DBusNotificationIntegration {
    /// The D-Bus connection.
    connection: Arc<Mutex<DBusConnection>>,
}

impl DBusNotificationIntegration {
    /// Creates a new D-Bus notification integration.
    ///
    /// # Returns
    ///
    /// A new D-Bus notification integration.
    pub fn new() -> SystemResult<Self> {
        let connection = DBusConnection::new()?;
        
        Ok(DBusNotificationIntegration {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

#[async_trait]
impl NotificationIntegration for DBusNotificationIntegration {
    async fn send_notification(&self, notification: Notification) -> SystemResult<NotificationId> {
        let connection = self.connection.lock().unwrap();
        connection.send_notification(notification)
    }
    
    async fn update_notification(&self, id: NotificationId, notification: Notification) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.update_notification(id, notification)
    }
    
    async fn close_notification(&self, id: NotificationId) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.close_notification(id)
    }
    
    async fn get_capabilities(&self) -> SystemResult<Vec<String>> {
        let connection = self.connection.lock().unwrap();
        connection.get_capabilities()
    }
}

/// D-Bus connection.
struct DBusConnection {
    // In a real implementation, this would contain the D-Bus connection
    // For now, we'll use a placeholder implementation
}

impl DBusConnection {
    /// Creates a new D-Bus connection.
    ///
    /// # Returns
    ///
    /// A new D-Bus connection.
    fn new() -> SystemResult<Self> {
        // In a real implementation, this would connect to the D-Bus service
        Ok(DBusConnection {})
    }
    
    /// Sends a notification.
    ///
    /// # Arguments
    ///
    /// * `notification` - The notification to send
    ///
    /// # Returns
    ///
    /// The notification ID, or an error if sending failed.
    fn send_notification(&self, notification: Notification) -> SystemResult<NotificationId> {
        // In a real implementation, this would send the notification via D-Bus
        // For now, we'll return a placeholder ID
        Ok(NotificationId::new())
    }
    
    /// Updates a notification.
    ///
    /// # Arguments
    ///
    /// * `id` - The notification ID
    /// * `notification` - The updated notification
    ///
    /// # Returns
    ///
    /// `Ok(())` if the notification was updated, or an error if it failed.
    fn update_notification(&self, _id: NotificationId, _notification: Notification) -> SystemResult<()> {
        // In a real implementation, this would update the notification via D-Bus
        Ok(())
    }
    
    /// Closes a notification.
    ///
    /// # Arguments
    ///
    /// * `id` - The notification ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the notification was closed, or an error if it failed.
    fn close_notification(&self, _id: NotificationId) -> SystemResult<()> {
        // In a real implementation, this would close the notification via D-Bus
        Ok(())
    }
    
    /// Gets the capabilities of the notification service.
    ///
    /// # Returns
    ///
    /// A vector of capability strings.
    fn get_capabilities(&self) -> SystemResult<Vec<String>> {
        // In a real implementation, this would query the capabilities via D-Bus
        // For now, we'll return placeholder capabilities
        Ok(vec![
            "actions".to_string(),
            "body".to_string(),
            "body-hyperlinks".to_string(),
            "body-markup".to_string(),
            "icon-static".to_string(),
            "persistence".to_string(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    // These tests are placeholders and would be more comprehensive in a real implementation
    
    #[tokio::test]
    async fn test_dbus_notification_integration() {
        let integration = DBusNotificationIntegration::new().unwrap();
        
        let notification = Notification::new(
            "Test Title",
            "Test Body",
            None,
            NotificationPriority::Normal,
            None,
            Vec::new(),
        );
        
        let id = integration.send_notification(notification.clone()).await.unwrap();
        
        integration.update_notification(id, notification).await.unwrap();
        integration.close_notification(id).await.unwrap();
        
        let capabilities = integration.get_capabilities().await.unwrap();
        assert!(!capabilities.is_empty());
    }
}
