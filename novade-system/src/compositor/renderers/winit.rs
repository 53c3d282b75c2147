// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # Winit Renderer Implementation
//!
//! This module implements a renderer for Winit backends.

use std::sync::{Arc, Mutex, RwLock};
use smithay::backend::renderer::gles::{GlesRenderer, GlesTexture};
use smithay::backend::winit::{WinitEvent, WinitGraphicsBackend, WinitEventLoop};
use smithay::utils::{Logical, Physical, Point, Size, Rectangle, Transform};

use super::super::{CompositorError, CompositorResult};
use super::super::renderer_interface::{FrameRenderer, RenderableTexture};
use super::super::surface_management::{SurfaceData, AttachedBufferInfo};

/// Winit renderer implementation
pub struct WinitRenderer {
    /// The Winit backend
    backend: Arc<Mutex<WinitGraphicsBackend>>,
    
    /// The GLES renderer
    renderer: Arc<Mutex<GlesRenderer>>,
    
    /// The output size
    output_size: Size<i32, Physical>,
    
    /// The output scale
    output_scale: f64,
    
    /// The pending damage
    pending_damage: Arc<RwLock<Vec<Rectangle<i32, Physical>>>>,
    
    /// The event loop
    event_loop: Arc<Mutex<Option<WinitEventLoop>>>,
    
    /// Is the renderer initialized
    initialized: Arc<RwLock<bool>>,
}

impl WinitRenderer {
    /// Creates a new Winit renderer
    pub fn new(
        backend: WinitGraphicsBackend,
        output_scale: f64,
    ) -> CompositorResult<Self> {
        let output_size = backend.window_size().physical_size.into();
        let renderer = backend.renderer().clone();
        
        Ok(Self {
            backend: Arc::new(Mutex::new(backend)),
            renderer: Arc::new(Mutex::new(renderer)),
            output_size,
            output_scale,
            pending_damage: Arc::new(RwLock::new(Vec::new())),
            event_loop: Arc::new(Mutex::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        })
    }
    
    /// Handles Winit events
    pub fn handle_event(&mut self, event: WinitEvent) -> CompositorResult<()> {
        match event {
            WinitEvent::Resized { size, .. } => {
                // Update the output size
                self.output_size = size.into();
                
                // Add damage for the entire window
                self.add_damage(Rectangle::from_loc_and_size(
                    Point::from((0, 0)),
                    self.output_size,
                ))?;
            }
            WinitEvent::Input(input) => {
                // Handle input events
                // This would be forwarded to the input handling system
            }
            WinitEvent::Refresh => {
                // Request a redraw
                let mut backend = self.backend.lock().map_err(|_| {
                    CompositorError::RenderError("Failed to acquire lock on Winit backend".to_string())
                })?;
                
                backend.window().request_redraw();
            }
            WinitEvent::CloseRequested => {
                // Handle close request
                // This would typically exit the application
            }
            _ => {}
        }
        
        Ok(())
    }
    
    /// Sets the event loop
    pub fn set_event_loop(&self, event_loop: WinitEventLoop) -> CompositorResult<()> {
        let mut event_loop_lock = self.event_loop.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on event loop".to_string())
        })?;
        
        *event_loop_lock = Some(event_loop);
        
        Ok(())
    }
    
    /// Adds damage to the pending damage list
    pub fn add_damage(&self, damage: Rectangle<i32, Physical>) -> CompositorResult<()> {
        let mut pending_damage = self.pending_damage.write().map_err(|_| {
            CompositorError::RenderError("Failed to acquire write lock on pending damage".to_string())
        })?;
        
        pending_damage.push(damage);
        
        Ok(())
    }
    
    /// Clears the pending damage list
    pub fn clear_damage(&self) -> CompositorResult<()> {
        let mut pending_damage = self.pending_damage.write().map_err(|_| {
            CompositorError::RenderError("Failed to acquire write lock on pending damage".to_string())
        })?;
        
        pending_damage.clear();
        
        Ok(())
    }
    
    /// Gets the pending damage
    pub fn get_damage(&self) -> CompositorResult<Vec<Rectangle<i32, Physical>>> {
        let pending_damage = self.pending_damage.read().map_err(|_| {
            CompositorError::RenderError("Failed to acquire read lock on pending damage".to_string())
        })?;
        
        Ok(pending_damage.clone())
    }
    
    /// Creates a texture from a buffer
    pub fn create_texture(&self, buffer: &AttachedBufferInfo) -> CompositorResult<GlesTexture> {
        let renderer = self.renderer.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
        })?;
        
        // Implementation would create a texture from the buffer
        // This is a placeholder
        Err(CompositorError::RenderError("Texture creation not yet implemented".to_string()))
    }
}

impl FrameRenderer for WinitRenderer {
    fn initialize(&mut self) -> CompositorResult<()> {
        // Initialize the renderer
        let mut renderer = self.renderer.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
        })?;
        
        renderer.bind().map_err(|e| {
            CompositorError::RenderError(format!("Failed to bind renderer: {}", e))
        })?;
        
        // Mark as initialized
        let mut initialized = self.initialized.write().map_err(|_| {
            CompositorError::RenderError("Failed to acquire write lock on initialized flag".to_string())
        })?;
        
        *initialized = true;
        
        Ok(())
    }
    
    fn begin_frame(&mut self) -> CompositorResult<()> {
        let mut backend = self.backend.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on Winit backend".to_string())
        })?;
        
        // Check if initialized
        let initialized = self.initialized.read().map_err(|_| {
            CompositorError::RenderError("Failed to acquire read lock on initialized flag".to_string())
        })?;
        
        if !*initialized {
            return Err(CompositorError::RenderError("Renderer not initialized".to_string()));
        }
        
        // Begin a new frame
        backend.bind().map_err(|e| {
            CompositorError::RenderError(format!("Failed to bind backend: {}", e))
        })?;
        
        // Clear the window
        backend.renderer().clear([0.0, 0.0, 0.0, 1.0], &[]).map_err(|e| {
            CompositorError::RenderError(format!("Failed to clear window: {}", e))
        })?;
        
        Ok(())
    }
    
    fn render_surface(&mut self, surface: &SurfaceData, position: (i32, i32)) -> CompositorResult<()> {
        let backend = self.backend.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on Winit backend".to_string())
        })?;
        
        // Get the buffer info
        let buffer_info = match surface.get_buffer_info()? {
            Some(info) => info,
            None => return Ok(()),
        };
        
        // Get the surface state
        let state = surface.get_state()?;
        
        // Skip if not visible
        if !state.visible {
            return Ok(());
        }
        
        // Create a texture if needed
        let texture = match buffer_info.texture {
            Some(texture) => texture,
            None => self.create_texture(&buffer_info)?,
        };
        
        // Render the texture
        let renderer = backend.renderer();
        
        // Calculate the destination rectangle
        let dst = Rectangle::from_loc_and_size(
            Point::from(position),
            state.size,
        );
        
        // Render the texture
        renderer.render_texture_at(
            &texture,
            dst.to_f64(),
            Transform::Normal,
            state.opacity,
        ).map_err(|e| {
            CompositorError::RenderError(format!("Failed to render texture: {}", e))
        })?;
        
        // Add damage for the rendered area
        self.add_damage(Rectangle::from_loc_and_size(
            Point::from(position),
            state.size.to_physical(self.output_scale as f32),
        ))?;
        
        Ok(())
    }
    
    fn render_texture(&mut self, texture: &dyn RenderableTexture, position: (i32, i32), size: (i32, i32)) -> CompositorResult<()> {
        let backend = self.backend.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on Winit backend".to_string())
        })?;
        
        // Get the GLES texture
        let gles_texture = match texture.gles_texture() {
            Some(texture) => texture,
            None => return Ok(()),
        };
        
        // Render the texture
        let renderer = backend.renderer();
        
        // Calculate the destination rectangle
        let dst = Rectangle::from_loc_and_size(
            Point::from(position),
            Size::from(size),
        );
        
        // Render the texture
        renderer.render_texture_at(
            gles_texture,
            dst.to_f64(),
            Transform::Normal,
            1.0,
        ).map_err(|e| {
            CompositorError::RenderError(format!("Failed to render texture: {}", e))
        })?;
        
        // Add damage for the rendered area
        self.add_damage(Rectangle::from_loc_and_size(
            Point::from(position),
            Size::from(size).to_physical(self.output_scale as f32),
        ))?;
        
        Ok(())
    }
    
    fn end_frame(&mut self) -> CompositorResult<()> {
        let mut backend = self.backend.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on Winit backend".to_string())
        })?;
        
        // Submit the frame
        backend.submit().map_err(|e| {
            CompositorError::RenderError(format!("Failed to submit frame: {}", e))
        })?;
        
        // Clear the damage
        self.clear_damage()?;
        
        Ok(())
    }
    
    fn cleanup(&mut self) -> CompositorResult<()> {
        // Clean up resources
        let mut renderer = self.renderer.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
        })?;
        
        renderer.unbind().map_err(|e| {
            CompositorError::RenderError(format!("Failed to unbind renderer: {}", e))
        })?;
        
        // Mark as uninitialized
        let mut initialized = self.initialized.write().map_err(|_| {
            CompositorError::RenderError("Failed to acquire write lock on initialized flag".to_string())
        })?;
        
        *initialized = false;
        
        Ok(())
    }
}
