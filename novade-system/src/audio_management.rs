//! Audio management module for the NovaDE system layer.
//!
//! This module provides audio management functionality for the NovaDE desktop environment,
//! controlling system audio.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use crate::error::{SystemError, SystemResult, to_system_error, SystemErrorKind};

/// Audio device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioDeviceType {
    /// Output device (speakers, headphones).
    Output,
    /// Input device (microphone).
    Input,
}

/// Audio device.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// The device ID.
    id: String,
    /// The device name.
    name: String,
    /// The device type.
    device_type: AudioDeviceType,
    /// Whether the device is the default for its type.
    is_default: bool,
    /// The device volume (0.0-1.0).
    volume: f64,
    /// Whether the device is muted.
    muted: bool,
}

impl AudioDevice {
    /// Creates a new audio device.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    /// * `name` - The device name
    /// * `device_type` - The device type
    /// * `is_default` - Whether the device is the default for its type
    /// * `volume` - The device volume (0.0-1.0)
    /// * `muted` - Whether the device is muted
    ///
    /// # Returns
    ///
    /// A new audio device.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        device_type: AudioDeviceType,
        is_default: bool,
        volume: f64,
        muted: bool,
    ) -> Self {
        AudioDevice {
            id: id.into(),
            name: name.into(),
            device_type,
            is_default,
            volume,
            muted,
        }
    }

    /// Gets the device ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the device type.
    pub fn device_type(&self) -> AudioDeviceType {
        self.device_type
    }

    /// Checks if the device is the default for its type.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Gets the device volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Checks if the device is muted.
    pub fn muted(&self) -> bool {
        self.muted
    }
}

// TODO: Assistant Integration: This module's functionality (e.g., set_device_volume, set_device_mute, get_devices)
// might be exposed through the SystemSettingsService or a direct D-Bus interface
// for the Smart Assistant to control audio settings.

/// Audio stream.
#[derive(Debug, Clone)]
pub struct AudioStream {
    /// The stream ID.
    id: String,
    /// The stream name.
    name: String,
    /// The application name.
    application: String,
    /// The stream volume (0.0-1.0).
    volume: f64,
    /// Whether the stream is muted.
    muted: bool,
}

impl AudioStream {
    /// Creates a new audio stream.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    /// * `name` - The stream name
    /// * `application` - The application name
    /// * `volume` - The stream volume (0.0-1.0)
    /// * `muted` - Whether the stream is muted
    ///
    /// # Returns
    ///
    /// A new audio stream.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        application: impl Into<String>,
        volume: f64,
        muted: bool,
    ) -> Self {
        AudioStream {
            id: id.into(),
            name: name.into(),
            application: application.into(),
            volume,
            muted,
        }
    }

    /// Gets the stream ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the stream name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the application name.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Gets the stream volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Checks if the stream is muted.
    pub fn muted(&self) -> bool {
        self.muted
    }
}

/// Audio manager interface.
#[async_trait]
pub trait AudioManager: Send + Sync {
    /// Gets all audio devices.
    ///
    /// # Returns
    ///
    /// A vector of all audio devices.
    async fn get_devices(&self) -> SystemResult<Vec<AudioDevice>>;
    
    /// Gets an audio device by ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    ///
    /// # Returns
    ///
    /// The audio device, or an error if it doesn't exist.
    async fn get_device(&self, id: &str) -> SystemResult<AudioDevice>;
    
    /// Gets the default device for a device type.
    ///
    /// # Arguments
    ///
    /// * `device_type` - The device type
    ///
    /// # Returns
    ///
    /// The default audio device, or an error if there is no default.
    async fn get_default_device(&self, device_type: AudioDeviceType) -> SystemResult<AudioDevice>;
    
    /// Sets the default device for a device type.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the default device was set, or an error if it failed.
    async fn set_default_device(&self, id: &str) -> SystemResult<()>;
    
    /// Sets the volume for a device.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    /// * `volume` - The volume level (0.0-1.0)
    ///
    /// # Returns
    ///
    /// `Ok(())` if the volume was set, or an error if it failed.
    async fn set_device_volume(&self, id: &str, volume: f64) -> SystemResult<()>;
    
    /// Sets the mute state for a device.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    /// * `muted` - Whether the device should be muted
    ///
    /// # Returns
    ///
    /// `Ok(())` if the mute state was set, or an error if it failed.
    async fn set_device_mute(&self, id: &str, muted: bool) -> SystemResult<()>;
    
    /// Gets all audio streams.
    ///
    /// # Returns
    ///
    /// A vector of all audio streams.
    async fn get_streams(&self) -> SystemResult<Vec<AudioStream>>;
    
    /// Gets an audio stream by ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    ///
    /// # Returns
    ///
    /// The audio stream, or an error if it doesn't exist.
    async fn get_stream(&self, id: &str) -> SystemResult<AudioStream>;
    
    /// Sets the volume for a stream.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    /// * `volume` - The volume level (0.0-1.0)
    ///
    /// # Returns
    ///
    /// `Ok(())` if the volume was set, or an error if it failed.
    async fn set_stream_volume(&self, id: &str, volume: f64) -> SystemResult<()>;
    
    /// Sets the mute state for a stream.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    /// * `muted` - Whether the stream should be muted
    ///
    /// # Returns
    ///
    /// `Ok(())` if the mute state was set, or an error if it failed.
    async fn set_stream_mute(&self, id: &str, muted: bool) -> SystemResult<()>;
}

/// PulseAudio manager implementation.
pub struct PulseAudioManager {
    /// The PulseAudio connection.
    connection: Arc<Mutex<PulseAudioConnection>>,
    /// The device cache.
    device_cache: Arc<Mutex<HashMap<String, AudioDevice>>>,
    /// The stream cache.
    stream_cache: Arc<Mutex<HashMap<String, AudioStream>>>,
}

impl PulseAudioManager {
    /// Creates a new PulseAudio manager.
    ///
    /// # Returns
    ///
    /// A new PulseAudio manager.
    pub fn new() -> SystemResult<Self> {
        let connection = PulseAudioConnection::new()?;
        
        Ok(PulseAudioManager {
            connection: Arc::new(Mutex::new(connection)),
            device_cache: Arc::new(Mutex::new(HashMap::new())),
            stream_cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }
    
    /// Updates the device cache.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the cache was updated, or an error if it failed.
    async fn update_device_cache(&self) -> SystemResult<()> {
        let devices = {
            let connection = self.connection.lock().unwrap();
            connection.get_devices()?
        };
        
        let mut cache = self.device_cache.lock().unwrap();
        cache.clear();
        
        for device in devices {
            cache.insert(device.id().to_string(), device);
        }
        
        Ok(())
    }
    
    /// Updates the stream cache.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the cache was updated, or an error if it failed.
    async fn update_stream_cache(&self) -> SystemResult<()> {
        let streams = {
            let connection = self.connection.lock().unwrap();
            connection.get_streams()?
        };
        
        let mut cache = self.stream_cache.lock().unwrap();
        cache.clear();
        
        for stream in streams {
            cache.insert(stream.id().to_string(), stream);
        }
        
        Ok(())
    }
}

#[async_trait]
impl AudioManager for PulseAudioManager {
    async fn get_devices(&self) -> SystemResult<Vec<AudioDevice>> {
        self.update_device_cache().await?;
        
        let cache = self.device_cache.lock().unwrap();
        let devices = cache.values().cloned().collect();
        
        Ok(devices)
    }
    
    async fn get_device(&self, id: &str) -> SystemResult<AudioDevice> {
        self.update_device_cache().await?;
        
        let cache = self.device_cache.lock().unwrap();
        
        cache.get(id)
            .cloned()
            .ok_or_else(|| to_system_error(format!("Audio device not found: {}", id), SystemErrorKind::AudioManagement))
    }
    
    async fn get_default_device(&self, device_type: AudioDeviceType) -> SystemResult<AudioDevice> {
        self.update_device_cache().await?;
        
        let cache = self.device_cache.lock().unwrap();
        
        cache.values()
            .find(|d| d.device_type() == device_type && d.is_default())
            .cloned()
            .ok_or_else(|| to_system_error(format!("No default device found for type: {:?}", device_type), SystemErrorKind::AudioManagement))
    }
    
    async fn set_default_device(&self, id: &str) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.set_default_device(id)
    }
    
    async fn set_device_volume(&self, id: &str, volume: f64) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.set_device_volume(id, volume)
    }
    
    async fn set_device_mute(&self, id: &str, muted: bool) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.set_device_mute(id, muted)
    }
    
    async fn get_streams(&self) -> SystemResult<Vec<AudioStream>> {
        self.update_stream_cache().await?;
        
        let cache = self.stream_cache.lock().unwrap();
        let streams = cache.values().cloned().collect();
        
        Ok(streams)
    }
    
    async fn get_stream(&self, id: &str) -> SystemResult<AudioStream> {
        self.update_stream_cache().await?;
        
        let cache = self.stream_cache.lock().unwrap();
        
        cache.get(id)
            .cloned()
            .ok_or_else(|| to_system_error(format!("Audio stream not found: {}", id), SystemErrorKind::AudioManagement))
    }
    
    async fn set_stream_volume(&self, id: &str, volume: f64) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.set_stream_volume(id, volume)
    }
    
    async fn set_stream_mute(&self, id: &str, muted: bool) -> SystemResult<()> {
        let connection = self.connection.lock().unwrap();
        connection.set_stream_mute(id, muted)
    }
}

/// PulseAudio connection.
struct PulseAudioConnection {
    // In a real implementation, this would contain the PulseAudio connection
    // For now, we'll use a placeholder implementation
}

impl PulseAudioConnection {
    /// Creates a new PulseAudio connection.
    ///
    /// # Returns
    ///
    /// A new PulseAudio connection.
    fn new() -> SystemResult<Self> {
        // In a real implementation, this would connect to the PulseAudio server
        Ok(PulseAudioConnection {})
    }
    
    /// Gets all audio devices.
    ///
    /// # Returns
    ///
    /// A vector of all audio devices.
    fn get_devices(&self) -> SystemResult<Vec<AudioDevice>> {
        // In a real implementation, this would query the PulseAudio server for devices
        // For now, we'll return placeholder devices
        let devices = vec![
            AudioDevice::new(
                "output-1",
                "Built-in Speakers",
                AudioDeviceType::Output,
                true,
                0.75,
                false,
            ),
            AudioDevice::new(
                "output-2",
                "HDMI Audio",
                AudioDeviceType::Output,
                false,
                0.5,
                true,
            ),
            AudioDevice::new(
                "input-1",
                "Built-in Microphone",
                AudioDeviceType::Input,
                true,
                0.8,
                false,
            ),
        ];
        
        Ok(devices)
    }
    
    /// Sets the default device for a device type.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    ///
    /// # Returns
    ///
    /// `Ok(())` if the default device was set, or an error if it failed.
    fn set_default_device(&self, _id: &str) -> SystemResult<()> {
        // In a real implementation, this would set the default device
        Ok(())
    }
    
    /// Sets the volume for a device.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    /// * `volume` - The volume level (0.0-1.0)
    ///
    /// # Returns
    ///
    /// `Ok(())` if the volume was set, or an error if it failed.
    fn set_device_volume(&self, _id: &str, volume: f64) -> SystemResult<()> {
        // Validate the volume level
        if volume < 0.0 || volume > 1.0 {
            return Err(to_system_error(
                format!("Invalid volume level: {}", volume),
                SystemErrorKind::AudioManagement,
            ));
        }
        
        // In a real implementation, this would set the device volume
        Ok(())
    }
    
    /// Sets the mute state for a device.
    ///
    /// # Arguments
    ///
    /// * `id` - The device ID
    /// * `muted` - Whether the device should be muted
    ///
    /// # Returns
    ///
    /// `Ok(())` if the mute state was set, or an error if it failed.
    fn set_device_mute(&self, _id: &str, _muted: bool) -> SystemResult<()> {
        // In a real implementation, this would set the device mute state
        Ok(())
    }
    
    /// Gets all audio streams.
    ///
    /// # Returns
    ///
    /// A vector of all audio streams.
    fn get_streams(&self) -> SystemResult<Vec<AudioStream>> {
        // In a real implementation, this would query the PulseAudio server for streams
        // For now, we'll return placeholder streams
        let streams = vec![
            AudioStream::new(
                "stream-1",
                "Music",
                "Music Player",
                0.8,
                false,
            ),
            AudioStream::new(
                "stream-2",
                "Video",
                "Video Player",
                0.6,
                false,
            ),
            AudioStream::new(
                "stream-3",
                "System Sounds",
                "System",
                0.5,
                true,
            ),
        ];
        
        Ok(streams)
    }
    
    /// Sets the volume for a stream.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    /// * `volume` - The volume level (0.0-1.0)
    ///
    /// # Returns
    ///
    /// `Ok(())` if the volume was set, or an error if it failed.
    fn set_stream_volume(&self, _id: &str, volume: f64) -> SystemResult<()> {
        // Validate the volume level
        if volume < 0.0 || volume > 1.0 {
            return Err(to_system_error(
                format!("Invalid volume level: {}", volume),
                SystemErrorKind::AudioManagement,
            ));
        }
        
        // In a real implementation, this would set the stream volume
        Ok(())
    }
    
    /// Sets the mute state for a stream.
    ///
    /// # Arguments
    ///
    /// * `id` - The stream ID
    /// * `muted` - Whether the stream should be muted
    ///
    /// # Returns
    ///
    /// `Ok(())` if the mute state was set, or an error if it failed.
    fn set_stream_mute(&self, _id: &str, _muted: bool) -> SystemResult<()> {
        // In a real implementation, this would set the stream mute state
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    // These tests are placeholders and would be more comprehensive in a real implementation
    
    #[tokio::test]
    async fn test_pulseaudio_manager() {
        let manager = PulseAudioManager::new().unwrap();
        
        let devices = manager.get_devices().await.unwrap();
        assert!(!devices.is_empty());
        
        let device = &devices[0];
        let id = device.id();
        
        let retrieved = manager.get_device(id).await.unwrap();
        assert_eq!(retrieved.id(), id);
        
        let default_output = manager.get_default_device(AudioDeviceType::Output).await.unwrap();
        assert!(default_output.is_default());
        assert_eq!(default_output.device_type(), AudioDeviceType::Output);
        
        let default_input = manager.get_default_device(AudioDeviceType::Input).await.unwrap();
        assert!(default_input.is_default());
        assert_eq!(default_input.device_type(), AudioDeviceType::Input);
        
        manager.set_default_device(id).await.unwrap();
        manager.set_device_volume(id, 0.5).await.unwrap();
        manager.set_device_mute(id, false).await.unwrap();
        
        let streams = manager.get_streams().await.unwrap();
        assert!(!streams.is_empty());
        
        let stream = &streams[0];
        let stream_id = stream.id();
        
        let retrieved_stream = manager.get_stream(stream_id).await.unwrap();
        assert_eq!(retrieved_stream.id(), stream_id);
        
        manager.set_stream_volume(stream_id, 0.5).await.unwrap();
        manager.set_stream_mute(stream_id, false).await.unwrap();
    }
}
