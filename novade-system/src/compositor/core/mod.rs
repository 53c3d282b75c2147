// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # Core Compositor Functionality Implementation
//!
//! This module implements the core functionality of the compositor,
//! including state management, client data handling, and event processing.

use std::sync::{Arc, Mutex, RwLock};
use std::collections::HashMap;
use smithay::wayland::compositor::CompositorState;
use smithay::wayland::shell::xdg::XdgShellState;
use smithay::wayland::shell::wlr_layer::LayerShellState;
use smithay::wayland::output::OutputManagerState;
use smithay::wayland::seat::SeatState;
use smithay::reexports::wayland_server::Display;
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::reexports::wayland_server::Client;
use smithay::reexports::wayland_server::Resource;
use smithay::utils::{Logical, Point, Size, Rectangle};
use smithay::input::{Seat, SeatHandler, pointer, keyboard, touch};
use smithay::backend::renderer::gles::GlesRenderer;

use crate::error::SystemError;
use super::{CompositorError, CompositorResult};

/// Represents the state of the desktop environment
pub struct DesktopState {
    /// Wayland display
    pub display: Arc<Mutex<Display>>,
    
    /// Compositor state
    pub compositor_state: CompositorState,
    
    /// XDG shell state
    pub xdg_shell_state: XdgShellState,
    
    /// Layer shell state
    pub layer_shell_state: LayerShellState,
    
    /// Output manager state
    pub output_manager_state: OutputManagerState,
    
    /// Seat state
    pub seat_state: SeatState<DesktopState>,
    
    /// Surface to client data mapping
    pub surface_to_client: Arc<RwLock<HashMap<WlSurface, ClientCompositorData>>>,
    
    /// Active seats
    pub seats: Arc<RwLock<HashMap<String, Seat<DesktopState>>>>,
    
    /// Current focus
    pub current_focus: Arc<RwLock<Option<WlSurface>>>,
    
    /// Current pointer position
    pub pointer_position: Arc<RwLock<Point<f64, Logical>>>,
    
    /// Current output configuration
    pub output_configuration: Arc<RwLock<OutputConfiguration>>,
    
    /// Renderer
    pub renderer: Arc<Mutex<Option<GlesRenderer>>>,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfiguration {
    /// Output name
    pub name: String,
    
    /// Output size
    pub size: Size<i32, Logical>,
    
    /// Output scale
    pub scale: f64,
    
    /// Output transform
    pub transform: smithay::utils::Transform,
    
    /// Output mode
    pub mode: OutputMode,
}

/// Output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Fixed mode with specific resolution and refresh rate
    Fixed {
        /// Width in pixels
        width: i32,
        
        /// Height in pixels
        height: i32,
        
        /// Refresh rate in mHz
        refresh: i32,
    },
    
    /// Custom mode
    Custom,
}

impl DesktopState {
    /// Creates a new desktop state
    pub fn new() -> CompositorResult<Self> {
        let display = Arc::new(Mutex::new(Display::new().map_err(|e| {
            CompositorError::InitializationError(format!("Failed to create Wayland display: {}", e))
        })?));
        
        let compositor_state = CompositorState::new::<Self>(&display.lock().unwrap());
        let xdg_shell_state = XdgShellState::new::<Self>(&display.lock().unwrap());
        let layer_shell_state = LayerShellState::new::<Self>(&display.lock().unwrap());
        let output_manager_state = OutputManagerState::new_with_xdg_output::<Self>(&display.lock().unwrap());
        let seat_state = SeatState::new();
        
        Ok(Self {
            display,
            compositor_state,
            xdg_shell_state,
            layer_shell_state,
            output_manager_state,
            seat_state,
            surface_to_client: Arc::new(RwLock::new(HashMap::new())),
            seats: Arc::new(RwLock::new(HashMap::new())),
            current_focus: Arc::new(RwLock::new(None)),
            pointer_position: Arc::new(RwLock::new(Point::from((0.0, 0.0)))),
            output_configuration: Arc::new(RwLock::new(OutputConfiguration {
                name: "default".to_string(),
                size: Size::from((1920, 1080)),
                scale: 1.0,
                transform: smithay::utils::Transform::Normal,
                mode: OutputMode::Fixed {
                    width: 1920,
                    height: 1080,
                    refresh: 60000,
                },
            })),
            renderer: Arc::new(Mutex::new(None)),
        })
    }
    
    /// Registers a new client
    pub fn register_client(&self, surface: WlSurface, client_data: ClientCompositorData) -> CompositorResult<()> {
        let mut surface_to_client = self.surface_to_client.write().map_err(|_| {
            CompositorError::SurfaceError("Failed to acquire write lock on surface map".to_string())
        })?;
        
        surface_to_client.insert(surface, client_data);
        Ok(())
    }
    
    /// Gets client data for a surface
    pub fn get_client_data(&self, surface: &WlSurface) -> CompositorResult<Option<ClientCompositorData>> {
        let surface_to_client = self.surface_to_client.read().map_err(|_| {
            CompositorError::SurfaceError("Failed to acquire read lock on surface map".to_string())
        })?;
        
        Ok(surface_to_client.get(surface).cloned())
    }
    
    /// Creates a new seat
    pub fn create_seat(&self, name: &str) -> CompositorResult<Seat<DesktopState>> {
        let mut seats = self.seats.write().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire write lock on seats".to_string())
        })?;
        
        let seat = Seat::new(
            &self.display.lock().unwrap(),
            name.to_string(),
            self,
        );
        
        seats.insert(name.to_string(), seat.clone());
        
        Ok(seat)
    }
    
    /// Gets a seat by name
    pub fn get_seat(&self, name: &str) -> CompositorResult<Option<Seat<DesktopState>>> {
        let seats = self.seats.read().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire read lock on seats".to_string())
        })?;
        
        Ok(seats.get(name).cloned())
    }
    
    /// Sets the current focus
    pub fn set_focus(&self, surface: Option<WlSurface>) -> CompositorResult<()> {
        let mut current_focus = self.current_focus.write().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire write lock on current focus".to_string())
        })?;
        
        *current_focus = surface;
        Ok(())
    }
    
    /// Gets the current focus
    pub fn get_focus(&self) -> CompositorResult<Option<WlSurface>> {
        let current_focus = self.current_focus.read().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire read lock on current focus".to_string())
        })?;
        
        Ok(current_focus.clone())
    }
    
    /// Sets the pointer position
    pub fn set_pointer_position(&self, position: Point<f64, Logical>) -> CompositorResult<()> {
        let mut pointer_position = self.pointer_position.write().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire write lock on pointer position".to_string())
        })?;
        
        *pointer_position = position;
        Ok(())
    }
    
    /// Gets the pointer position
    pub fn get_pointer_position(&self) -> CompositorResult<Point<f64, Logical>> {
        let pointer_position = self.pointer_position.read().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire read lock on pointer position".to_string())
        })?;
        
        Ok(*pointer_position)
    }
    
    /// Sets the output configuration
    pub fn set_output_configuration(&self, config: OutputConfiguration) -> CompositorResult<()> {
        let mut output_configuration = self.output_configuration.write().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire write lock on output configuration".to_string())
        })?;
        
        *output_configuration = config;
        Ok(())
    }
    
    /// Gets the output configuration
    pub fn get_output_configuration(&self) -> CompositorResult<OutputConfiguration> {
        let output_configuration = self.output_configuration.read().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire read lock on output configuration".to_string())
        })?;
        
        Ok(output_configuration.clone())
    }
    
    /// Sets the renderer
    pub fn set_renderer(&self, renderer: GlesRenderer) -> CompositorResult<()> {
        let mut renderer_lock = self.renderer.lock().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
        })?;
        
        *renderer_lock = Some(renderer);
        Ok(())
    }
    
    /// Gets the renderer
    pub fn get_renderer(&self) -> CompositorResult<Option<GlesRenderer>> {
        let renderer_lock = self.renderer.lock().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
        })?;
        
        Ok(renderer_lock.clone())
    }
}

/// Implementation of the seat handler for the desktop state
impl SeatHandler for DesktopState {
    type KeyboardFocus = WlSurface;
    type PointerFocus = WlSurface;
    type TouchFocus = WlSurface;
    
    fn seat_state(&mut self) -> &mut SeatState<Self> {
        &mut self.seat_state
    }
    
    fn cursor_image(&mut self, _seat: &Seat<Self>, _image: pointer::CursorImageStatus) {
        // Implementation would handle cursor image changes
    }
    
    fn focus_changed(&mut self, _seat: &Seat<Self>, _focused: Option<&WlSurface>) {
        // Implementation would handle focus changes
    }
    
    fn keyboard_key(&mut self, _seat: &Seat<Self>, _key: keyboard::KeysymHandle, _state: keyboard::KeyState) {
        // Implementation would handle keyboard key events
    }
    
    fn keyboard_modifiers(&mut self, _seat: &Seat<Self>, _modifiers: keyboard::ModifiersState) {
        // Implementation would handle keyboard modifier events
    }
    
    fn pointer_motion(&mut self, _seat: &Seat<Self>, _location: Point<f64, Logical>) {
        // Implementation would handle pointer motion events
    }
    
    fn pointer_motion_absolute(&mut self, _seat: &Seat<Self>, _location: Point<f64, Logical>) {
        // Implementation would handle absolute pointer motion events
    }
    
    fn pointer_button(&mut self, _seat: &Seat<Self>, _button: pointer::ButtonEvent) {
        // Implementation would handle pointer button events
    }
    
    fn pointer_axis(&mut self, _seat: &Seat<Self>, _details: pointer::AxisFrame) {
        // Implementation would handle pointer axis events
    }
    
    fn touch_down(&mut self, _seat: &Seat<Self>, _event: &mut touch::DownEvent) {
        // Implementation would handle touch down events
    }
    
    fn touch_up(&mut self, _seat: &Seat<Self>, _event: &mut touch::UpEvent) {
        // Implementation would handle touch up events
    }
    
    fn touch_motion(&mut self, _seat: &Seat<Self>, _event: &mut touch::MotionEvent) {
        // Implementation would handle touch motion events
    }
    
    fn touch_frame(&mut self, _seat: &Seat<Self>) {
        // Implementation would handle touch frame events
    }
    
    fn touch_cancel(&mut self, _seat: &Seat<Self>) {
        // Implementation would handle touch cancel events
    }
}

/// Data associated with a client compositor
#[derive(Debug, Clone)]
pub struct ClientCompositorData {
    /// Client ID
    pub client_id: u32,
    
    /// Application name
    pub app_name: Option<String>,
    
    /// Application ID
    pub app_id: Option<String>,
    
    /// Is the client fullscreen
    pub is_fullscreen: bool,
    
    /// Is the client maximized
    pub is_maximized: bool,
    
    /// Is the client minimized
    pub is_minimized: bool,
    
    /// Client geometry
    pub geometry: Option<Rectangle<i32, Logical>>,
    
    /// Client position
    pub position: Point<i32, Logical>,
    
    /// Client size
    pub size: Size<i32, Logical>,
    
    /// Client opacity
    pub opacity: f64,
    
    /// Client visibility
    pub visible: bool,
    
    /// Client z-index
    pub z_index: i32,
    
    /// Client workspace
    pub workspace: Option<u32>,
}

impl ClientCompositorData {
    /// Creates a new client compositor data
    pub fn new(client_id: u32) -> Self {
        Self {
            client_id,
            app_name: None,
            app_id: None,
            is_fullscreen: false,
            is_maximized: false,
            is_minimized: false,
            geometry: None,
            position: Point::from((0, 0)),
            size: Size::from((800, 600)),
            opacity: 1.0,
            visible: true,
            z_index: 0,
            workspace: Some(0),
        }
    }
    
    /// Sets the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
    
    /// Sets the application ID
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }
    
    /// Sets the fullscreen state
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.is_fullscreen = fullscreen;
        self
    }
    
    /// Sets the maximized state
    pub fn with_maximized(mut self, maximized: bool) -> Self {
        self.is_maximized = maximized;
        self
    }
    
    /// Sets the minimized state
    pub fn with_minimized(mut self, minimized: bool) -> Self {
        self.is_minimized = minimized;
        self
    }
    
    /// Sets the geometry
    pub fn with_geometry(mut self, geometry: Rectangle<i32, Logical>) -> Self {
        self.geometry = Some(geometry);
        self
    }
    
    /// Sets the position
    pub fn with_position(mut self, position: Point<i32, Logical>) -> Self {
        self.position = position;
        self
    }
    
    /// Sets the size
    pub fn with_size(mut self, size: Size<i32, Logical>) -> Self {
        self.size = size;
        self
    }
    
    /// Sets the opacity
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
    
    /// Sets the visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
    
    /// Sets the z-index
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
    
    /// Sets the workspace
    pub fn with_workspace(mut self, workspace: u32) -> Self {
        self.workspace = Some(workspace);
        self
    }
}
