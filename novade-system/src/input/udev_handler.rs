// src/input/udev_handler.rs

// Import StubbedInputDevice to be used in hotplug simulation
use super::libinput_handler::StubbedInputDevice;
// LibinputHandler import is not strictly needed for this stub's functionality
// but kept from previous version if it implies an integration point.
use super::libinput_handler::LibinputHandler;


#[derive(Debug, Clone)]
pub enum HotplugEventType {
    DeviceAdded,
    DeviceRemoved,
}

pub struct UdevHandler;

impl UdevHandler {
    pub fn new() -> Self {
        tracing::info!("UdevHandler (Pure Stub): Initializing. No actual udev interaction will occur.");
        UdevHandler
    }

    // This method would normally monitor udev events.
    pub fn poll_events(&mut self) {
        tracing::trace!("UdevHandler (Pure Stub): poll_events() called.");
        // No actual event polling for a stub. In a real scenario, this might trigger callbacks
        // or update internal state that DeviceManager could query.
    }

    // Method to simulate a hotplug event
    pub fn simulate_hotplug_event(&mut self, event_type: HotplugEventType, device_details: &StubbedInputDevice) {
        match event_type {
            HotplugEventType::DeviceAdded => {
                tracing::info!(
                    "UdevHandler (Pure Stub): Simulated Hotplug Event - Device ADDED. Name: '{}', Capabilities: {:?}",
                    device_details.name, device_details.capabilities
                );
                // In a real system, this might trigger a signal or callback to DeviceManager
                // to re-scan or add this specific device.
            }
            HotplugEventType::DeviceRemoved => {
                tracing::info!(
                    "UdevHandler (Pure Stub): Simulated Hotplug Event - Device REMOVED. Name: '{}'",
                    device_details.name
                );
                // Similar to DeviceAdded, this would inform DeviceManager.
            }
        }
    }

    // Add any other methods that might be expected.
    pub fn register_event_source(&self, _libinput_handler: &LibinputHandler) {
        tracing::debug!("UdevHandler (Pure Stub): register_event_source called with LibinputHandler.");
        // In a real implementation, this might involve getting a file descriptor from udev
        // and asking libinput to monitor it. For a stub, this is a no-op.
    }
}
