// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # Compositor Initialization Implementation
//!
//! This module provides functionality for initializing the compositor.

use std::sync::{Arc, Mutex, RwLock};
use std::collections::HashMap;
use smithay::reexports::wayland_server::Display;
use smithay::wayland::compositor::CompositorState;
use smithay::wayland::shell::xdg::XdgShellState;
use smithay::wayland::shell::wlr_layer::LayerShellState;
use smithay::wayland::output::OutputManagerState;
use smithay::wayland::seat::SeatState;
use smithay::backend::drm::DrmNode;
use smithay::backend::winit::{WinitGraphicsBackend, WinitEventLoop};
use smithay::input::Seat;
use smithay::utils::{Logical, Size};

use super::{CompositorError, CompositorResult};
use super::core::{DesktopState, OutputConfiguration, OutputMode};
use super::renderers::{DrmGbmRenderer, WinitRenderer};
use super::renderer_interface::FrameRenderer;
use super::thread_safety::run_all_validations;

/// Initializes the compositor with a DRM/GBM backend
pub fn initialize_compositor_drm(
    drm_node: DrmNode,
    output_size: (i32, i32),
    output_scale: f64,
) -> CompositorResult<(Arc<DesktopState>, Arc<Mutex<DrmGbmRenderer>>)> {
    // Create the desktop state
    let desktop_state = Arc::new(DesktopState::new()?);
    
    // Create the renderer
    let renderer = DrmGbmRenderer::new(drm_node, Size::from(output_size), output_scale)?;
    let renderer = Arc::new(Mutex::new(renderer));
    
    // Initialize the renderer
    renderer.lock().map_err(|_| {
        CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
    })?.initialize()?;
    
    // Set up signal handlers and other initialization
    setup_signal_handlers(desktop_state.clone())?;
    
    // Create a default seat
    desktop_state.create_seat("default")?;
    
    // Set the output configuration
    desktop_state.set_output_configuration(OutputConfiguration {
        name: "default".to_string(),
        size: Size::from(output_size),
        scale: output_scale,
        transform: smithay::utils::Transform::Normal,
        mode: OutputMode::Fixed {
            width: output_size.0,
            height: output_size.1,
            refresh: 60000,
        },
    })?;
    
    // Validate thread safety
    run_all_validations(desktop_state.clone())?;
    
    Ok((desktop_state, renderer))
}

/// Initializes the compositor with a Winit backend
pub fn initialize_compositor_winit(
    backend: WinitGraphicsBackend,
    output_scale: f64,
) -> CompositorResult<(Arc<DesktopState>, Arc<Mutex<WinitRenderer>>)> {
    // Create the desktop state
    let desktop_state = Arc::new(DesktopState::new()?);
    
    // Create the renderer
    let renderer = WinitRenderer::new(backend, output_scale)?;
    let renderer = Arc::new(Mutex::new(renderer));
    
    // Initialize the renderer
    renderer.lock().map_err(|_| {
        CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
    })?.initialize()?;
    
    // Set up signal handlers and other initialization
    setup_signal_handlers(desktop_state.clone())?;
    
    // Create a default seat
    desktop_state.create_seat("default")?;
    
    // Set the output configuration
    let output_size = renderer.lock().map_err(|_| {
        CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
    })?.output_size;
    
    desktop_state.set_output_configuration(OutputConfiguration {
        name: "default".to_string(),
        size: Size::from((output_size.w, output_size.h)),
        scale: output_scale,
        transform: smithay::utils::Transform::Normal,
        mode: OutputMode::Fixed {
            width: output_size.w,
            height: output_size.h,
            refresh: 60000,
        },
    })?;
    
    // Validate thread safety
    run_all_validations(desktop_state.clone())?;
    
    Ok((desktop_state, renderer))
}

/// Convenience function to initialize the compositor
pub fn initialize_compositor() -> CompositorResult<Arc<DesktopState>> {
    // Try to find a DRM device
    let drm_nodes = DrmNode::available_nodes().map_err(|e| {
        CompositorError::InitializationError(format!("Failed to enumerate DRM nodes: {}", e))
    })?;
    
    if let Some(node) = drm_nodes.first() {
        // Initialize with DRM/GBM
        let (desktop_state, _) = initialize_compositor_drm(*node, (1920, 1080), 1.0)?;
        Ok(desktop_state)
    } else {
        // Initialize with Winit
        let event_loop = WinitEventLoop::new().map_err(|e| {
            CompositorError::InitializationError(format!("Failed to create Winit event loop: {}", e))
        })?;
        
        let backend = WinitGraphicsBackend::new(&event_loop, None, None).map_err(|e| {
            CompositorError::InitializationError(format!("Failed to create Winit backend: {}", e))
        })?;
        
        let (desktop_state, renderer) = initialize_compositor_winit(backend, 1.0)?;
        
        // Store the event loop in the renderer
        renderer.lock().map_err(|_| {
            CompositorError::InitializationError("Failed to acquire lock on renderer".to_string())
        })?.set_event_loop(event_loop)?;
        
        Ok(desktop_state)
    }
}

/// Sets up signal handlers for the compositor
fn setup_signal_handlers(desktop_state: Arc<DesktopState>) -> CompositorResult<()> {
    // Set up signal handlers for SIGINT, SIGTERM, etc.
    // This would typically use the signal_hook crate
    
    // For now, this is just a placeholder
    Ok(())
}

/// Runs the compositor main loop
pub fn run_compositor(
    desktop_state: Arc<DesktopState>,
    renderer: Arc<Mutex<dyn FrameRenderer + Send + Sync>>,
) -> CompositorResult<()> {
    // Get the display
    let display = desktop_state.display.clone();
    
    // Create a channel for events
    let (event_sender, event_receiver) = std::sync::mpsc::channel();
    
    // Set up a thread for the Wayland event loop
    let wayland_thread = std::thread::spawn(move || {
        let mut display = display.lock().unwrap();
        
        loop {
            // Dispatch Wayland events
            display.dispatch_clients(&mut ()).unwrap();
            display.flush_clients().unwrap();
            
            // Check for exit signal
            if let Ok(()) = event_receiver.try_recv() {
                break;
            }
            
            // Sleep a bit to avoid busy waiting
            std::thread::sleep(std::time::Duration::from_millis(16));
        }
    });
    
    // Main rendering loop
    loop {
        // Begin frame
        renderer.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
        })?.begin_frame()?;
        
        // Render all surfaces
        // This would iterate through all surfaces and render them
        
        // End frame
        renderer.lock().map_err(|_| {
            CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
        })?.end_frame()?;
        
        // Sleep to maintain frame rate
        std::thread::sleep(std::time::Duration::from_millis(16));
        
        // Check for exit condition
        // This would check for a signal or other exit condition
        
        // For now, just break after a few frames for testing
        break;
    }
    
    // Signal the Wayland thread to exit
    event_sender.send(()).map_err(|_| {
        CompositorError::InitializationError("Failed to send exit signal to Wayland thread".to_string())
    })?;
    
    // Wait for the Wayland thread to exit
    wayland_thread.join().map_err(|_| {
        CompositorError::InitializationError("Failed to join Wayland thread".to_string())
    })?;
    
    // Clean up the renderer
    renderer.lock().map_err(|_| {
        CompositorError::RenderError("Failed to acquire lock on renderer".to_string())
    })?.cleanup()?;
    
    Ok(())
}
