//! Network management module for the NovaDE system layer.
//!
//! This module provides network management functionality for the NovaDE desktop environment,
//! monitoring network connectivity.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use tokio::sync::mpsc::{self, Receiver, Sender};
use crate::error::{SystemError, SystemResult, to_system_error, SystemErrorKind};

/// Network connection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkConnectionType {
    /// Wired connection.
    Wired,
    /// Wireless connection.
    Wireless,
    /// Mobile connection.
    Mobile,
    /// VPN connection.
    VPN,
    /// Other connection type.
    Other,
}

/// Network connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkConnectionState {
    /// The connection is disconnected.
    Disconnected,
    /// The connection is connecting.
    Connecting,
    /// The connection is connected.
    Connected,
    /// The connection is disconnecting.
    Disconnecting,
    /// The connection state is unknown.
    Unknown,
}

/// Network connection.
#[derive(Debug, Clone)]
pub struct NetworkConnection {
    /// The connection ID.
    id: String,
    /// The connection name.
    name: String,
    /// The connection type.
    connection_type: NetworkConnectionType,
    /// The connection state.
    state: NetworkConnectionState,
    /// Whether the connection is the default route.
    is_default: bool,
    /// The connection strength (0.0-1.0), if applicable.
    strength: Option<f64>,
    /// The connection speed in Mbps, if known.
    speed: Option<u32>,
}

impl NetworkConnection {
    /// Creates a new network connection.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    /// * `name` - The connection name
    /// * `connection_type` - The connection type
    /// * `state` - The connection state
    /// * `is_default` - Whether the connection is the default route
    /// * `strength` - The connection strength (0.0-1.0), if applicable
    /// * `speed` - The connection speed in Mbps, if known
    ///
    /// # Returns
    ///
    /// A new network connection.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        connection_type: NetworkConnectionType,
        state: NetworkConnectionState,
        is_default: bool,
        strength: Option<f64>,
        speed: Option<u32>,
    ) -> Self {
        NetworkConnection {
            id: id.into(),
            name: name.into(),
            connection_type,
            state,
            is_default,
            strength,
            speed,
        }
    }

    /// Gets the connection ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the connection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the connection type.
    pub fn connection_type(&self) -> NetworkConnectionType {
        self.connection_type
    }

    /// Gets the connection state.
    pub fn state(&self) -> NetworkConnectionState {
        self.state
    }

    /// Checks if the connection is the default route.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Gets the connection strength.
    pub fn strength(&self) -> Option<f64> {
        self.strength
    }

    /// Gets the connection speed.
    pub fn speed(&self) -> Option<u32> {
        self.speed
    }
}

/// Network event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEventType {
    /// A connection was added.
    ConnectionAdded,
    /// A connection was removed.
    ConnectionRemoved,
    /// A connection state changed.
    ConnectionStateChanged,
    /// The default connection changed.
    DefaultConnectionChanged,
    /// The network connectivity changed.
    ConnectivityChanged,
}

/// Network event.
#[derive(Debug, Clone)]
pub struct NetworkEvent {
    /// The event type.
    pub event_type: NetworkEventType,
    /// The connection ID, if applicable.
    pub connection_id: Option<String>,
    /// The connection state, if applicable.
    pub state: Option<NetworkConnectionState>,
    /// Whether the network has connectivity, if applicable.
    pub has_connectivity: Option<bool>,
}

/// Network manager interface.
#[async_trait]
pub trait NetworkManager: Send + Sync {
    /// Gets all network connections.
    ///
    /// # Returns
    ///
    /// A vector of all network connections.
    async fn get_connections(&self) -> SystemResult<Vec<NetworkConnection>>;
    
    /// Gets a network connection by ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    ///
    /// # Returns
    ///
    /// The network connection, or an error if it doesn't exist.
    async fn get_connection(&self, id: &str) -> SystemResult<NetworkConnection>;
    
    /// Gets the default network connection.
    ///
    /// # Returns
    ///
    /// The default network connection, or an error if there is no default.
    async fn get_default_connection(&self) -> SystemResult<NetworkConnection>;
    
    /// Connects to a network.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the connection was initiated, or an error if it failed.
    async fn connect(&self, id: &str) -> SystemResult<()>;
    
    /// Disconnects from a network.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the disconnection was initiated, or an error if it failed.
    async fn disconnect(&self, id: &str) -> SystemResult<()>;
    
    /// Checks if the system has network connectivity.
    ///
    /// # Returns
    ///
    /// `true` if the system has network connectivity, `false` otherwise.
    async fn has_connectivity(&self) -> SystemResult<bool>;
    
    /// Subscribes to network events.
    ///
    /// # Returns
    ///
    /// A receiver for network events.
    async fn subscribe(&self) -> SystemResult<Receiver<NetworkEvent>>;
}

/// NetworkManager integration implementation.
pub struct NetworkManagerIntegration {
    /// The D-Bus connection.
    connection: Arc<Mutex<NetworkDBusConnection>>,
    /// The connection cache.
    connection_cache: Arc<Mutex<HashMap<String, NetworkConnection>>>,
    /// The event sender.
    event_sender: Sender<NetworkEvent>,
}

impl NetworkManagerIntegration {
    /// Creates a new NetworkManager integration.
    ///
    /// # Returns
    ///
    /// A new NetworkManager integration.
    pub fn new() -> SystemResult<Self> {
        let connection = NetworkDBusConnection::new()?;
        let (tx, _) = mpsc::channel(100);
        
        let integration = NetworkManagerIntegration {
            connection: Arc::new(Mutex::new(connection)),
            connection_cache: Arc::new(Mutex::new(HashMap::new())),
            event_sender: tx,
        };
        
        // Start the event loop
        integration.start_event_loop();
        
        Ok(integration)
    }
    
    /// Starts the event loop.
    fn start_event_loop(&self) {
        let connection = self.connection.clone();
        let sender = self.event_sender.clone();
        
        tokio::spawn(async move {
            loop {
                // In a real implementation, this would poll for events from NetworkManager
                // For now, we'll just sleep to avoid busy-waiting
                tokio::time::sleep(tokio::time::Duration::from_millis(1000)).await;
                
                // Check if there are any events
                let events = {
                    let connection = connection.lock().unwrap();
                    connection.poll_events()
                };
                
                // Send the events
                for event in events {
                    if sender.send(event).await.is_err() {
                        // The receiver was dropped, so we can stop the event loop
                        break;
                    }
                }
            }
        });
    }
    
    /// Updates the connection cache.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the cache was updated, or an error if it failed.
    async fn update_cache(&self) -> SystemResult<()> {
        let connections = {
            let connection = self.connection.lock().unwrap();
            connection.get_connections()?
        };
        
        let mut cache = self.connection_cache.lock().unwrap();
        cache.clear();
        
        for connection in connections {
            cache.insert(connection.id().to_string(), connection);
        }
        
        Ok(())
    }
}

#[async_trait]
impl NetworkManager for NetworkManagerIntegration {
    async fn get_connections(&self) -> SystemResult<Vec<NetworkConnection>> {
        self.update_cache().await?;
        
        let cache = self.connection_cache.lock().unwrap();
        let connections = cache.values().cloned().collect();
        
        Ok(connections)
    }
    
    async fn get_connection(&self, id: &str) -> SystemResult<NetworkConnection> {
        self.update_cache().await?;
        
        let cache = self.connection_cache.lock().unwrap();
        
        cache.get(id)
            .cloned()
            .ok_or_else(|| to_system_error(format!("Network connection not found: {}", id), SystemErrorKind::NetworkManagement))
    }
    
    async fn get_default_connection(&self) -> SystemResult<NetworkConnection> {
        self.update_cache().await?;
        
        let cache = self.connection_cache.lock().unwrap();
        
        cache.values()
            .find(|c| c.is_default())
            .cloned()
            .ok_or_else(|| to_system_error("No default network connection found", SystemErrorKind::NetworkManagement))
    }
    
    async fn connect(&self, id: &str) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.connect(id)
    }
    
    async fn disconnect(&self, id: &str) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.disconnect(id)
    }
    
    async fn has_connectivity(&self) -> SystemResult<bool> {
        let connection = self.connection.lock().unwrap();
        connection.has_connectivity()
    }
    
    async fn subscribe(&self) -> SystemResult<Receiver<NetworkEvent>> {
        let (tx, rx) = mpsc::channel(100);
        
        // Clone the sender to forward events
        let sender = self.event_sender.clone();
        
        tokio::spawn(async move {
            let mut receiver = sender.subscribe();
            
            while let Ok(event) = receiver.recv().await {
                if tx.send(event).await.is_err() {
                    // The receiver was dropped, so we can stop forwarding events
                    break;
                }
            }
        });
        
        Ok(rx)
    }
}

/// Network D-Bus connection.
struct NetworkDBusConnection {
    // In a real implementation, this would contain the D-Bus connection
    // For now, we'll use a placeholder implementation
}

impl NetworkDBusConnection {
    /// Creates a new network D-Bus connection.
    ///
    /// # Returns
    ///
    /// A new network D-Bus connection.
    fn new() -> SystemResult<Self> {
        // In a real implementation, this would connect to the NetworkManager D-Bus service
        Ok(NetworkDBusConnection {})
    }
    
    /// Gets all network connections.
    ///
    /// # Returns
    ///
    /// A vector of all network connections.
    fn get_connections(&self) -> SystemResult<Vec<NetworkConnection>> {
        // In a real implementation, this would query NetworkManager for connections
        // For now, we'll return placeholder connections
        let connections = vec![
            NetworkConnection::new(
                "wired-1",
                "Ethernet",
                NetworkConnectionType::Wired,
                NetworkConnectionState::Connected,
                true,
                None,
                Some(1000),
            ),
            NetworkConnection::new(
                "wireless-1",
                "Home WiFi",
                NetworkConnectionType::Wireless,
                NetworkConnectionState::Disconnected,
                false,
                Some(0.8),
                Some(300),
            ),
            NetworkConnection::new(
                "mobile-1",
                "Mobile Data",
                NetworkConnectionType::Mobile,
                NetworkConnectionState::Disconnected,
                false,
                Some(0.6),
                Some(50),
            ),
        ];
        
        Ok(connections)
    }
    
    /// Connects to a network.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the connection was initiated, or an error if it failed.
    fn connect(&self, _id: &str) -> SystemResult<()> {
        // In a real implementation, this would initiate a connection
        Ok(())
    }
    
    /// Disconnects from a network.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the disconnection was initiated, or an error if it failed.
    fn disconnect(&self, _id: &str) -> SystemResult<()> {
        // In a real implementation, this would initiate a disconnection
        Ok(())
    }
    
    /// Checks if the system has network connectivity.
    ///
    /// # Returns
    ///
    /// `true` if the system has network connectivity, `false` otherwise.
    fn has_connectivity(&self) -> SystemResult<bool> {
        // In a real implementation, this would check connectivity
        // For now, we'll return true
        Ok(true)
    }
    
    /// Polls for network events.
    ///
    /// # Returns
    ///
    /// A vector of network events.
    fn poll_events(&self) -> Vec<NetworkEvent> {
        // In a real implementation, this would poll for events from NetworkManager
        // For now, we'll return an empty vector
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    // These tests are placeholders and would be more comprehensive in a real implementation
    
    #[tokio::test]
    async fn test_networkmanager_integration() {
        let manager = NetworkManagerIntegration::new().unwrap();
        
        let connections = manager.get_connections().await.unwrap();
        assert!(!connections.is_empty());
        
        let connection = &connections[0];
        let id = connection.id();
        
        let retrieved = manager.get_connection(id).await.unwrap();
        assert_eq!(retrieved.id(), id);
        
        let default = manager.get_default_connection().await.unwrap();
        assert!(default.is_default());
        
        let has_connectivity = manager.has_connectivity().await.unwrap();
        assert!(has_connectivity);
        
        manager.connect(id).await.unwrap();
        manager.disconnect(id).await.unwrap();
        
        let mut receiver = manager.subscribe().await.unwrap();
        
        // In a real test, we would wait for events and verify them
        // For now, we'll just test the API
    }
}
