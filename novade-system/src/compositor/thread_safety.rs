// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # Thread Safety Validation Module
//!
//! This module provides utilities for validating thread safety in the compositor.

use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use super::{CompositorError, CompositorResult};
use super::core::DesktopState;
use super::surface_management::SurfaceManager;
use super::xdg_shell::XdgShellManager;
use super::layer_shell::LayerShellManager;

/// Validates thread safety of the compositor
pub fn validate_thread_safety(desktop_state: Arc<DesktopState>) -> CompositorResult<()> {
    // Validate that DesktopState can be shared between threads
    let desktop_state_clone = desktop_state.clone();
    let thread_handle = thread::spawn(move || {
        // Access various components of the desktop state to ensure they can be accessed from another thread
        let _display = desktop_state_clone.display.lock().unwrap();
        let _surface_map = desktop_state_clone.surface_to_client.read().unwrap();
        let _current_focus = desktop_state_clone.current_focus.read().unwrap();
        let _pointer_position = desktop_state_clone.pointer_position.read().unwrap();
        let _output_configuration = desktop_state_clone.output_configuration.read().unwrap();
        
        // Return success if no panics occurred
        Ok(())
    });
    
    // Wait for the thread to complete and check the result
    thread_handle.join().map_err(|_| {
        CompositorError::ThreadSafetyError("Thread safety validation failed".to_string())
    })??;
    
    // Validate surface management thread safety
    validate_surface_management_thread_safety()?;
    
    // Validate XDG shell thread safety
    validate_xdg_shell_thread_safety()?;
    
    // Validate layer shell thread safety
    validate_layer_shell_thread_safety()?;
    
    // If we got here, thread safety validation passed
    Ok(())
}

/// Validates thread safety of surface management
fn validate_surface_management_thread_safety() -> CompositorResult<()> {
    // Create a surface manager
    let surface_manager = Arc::new(SurfaceManager::new());
    
    // Create multiple threads that access the surface manager concurrently
    let mut handles = Vec::new();
    
    for i in 0..5 {
        let surface_manager_clone = surface_manager.clone();
        
        let handle = thread::spawn(move || {
            // Simulate some work
            thread::sleep(Duration::from_millis(10));
            
            // Try to get all surfaces
            let _surfaces = surface_manager_clone.get_all_surfaces().unwrap();
            
            // Try to get surfaces by role
            let _surfaces = surface_manager_clone.get_surfaces_by_role(
                super::surface_management::SurfaceRole::Unknown
            ).unwrap();
            
            // Try to get surfaces by workspace
            let _surfaces = surface_manager_clone.get_surfaces_by_workspace(i).unwrap();
            
            Ok(())
        });
        
        handles.push(handle);
    }
    
    // Wait for all threads to complete
    for handle in handles {
        handle.join().map_err(|_| {
            CompositorError::ThreadSafetyError("Surface management thread safety validation failed".to_string())
        })??;
    }
    
    Ok(())
}

/// Validates thread safety of XDG shell
fn validate_xdg_shell_thread_safety() -> CompositorResult<()> {
    // Create a surface manager and XDG shell manager
    let surface_manager = Arc::new(SurfaceManager::new());
    let xdg_shell_manager = Arc::new(XdgShellManager::new(surface_manager.clone()));
    
    // Create multiple threads that access the XDG shell manager concurrently
    let mut handles = Vec::new();
    
    for i in 0..5 {
        let xdg_shell_manager_clone = xdg_shell_manager.clone();
        
        let handle = thread::spawn(move || {
            // Simulate some work
            thread::sleep(Duration::from_millis(10));
            
            // Try to get all toplevels
            let _toplevels = xdg_shell_manager_clone.get_all_toplevels().unwrap();
            
            // Try to get toplevels by workspace
            let _toplevels = xdg_shell_manager_clone.get_toplevels_by_workspace(i).unwrap();
            
            Ok(())
        });
        
        handles.push(handle);
    }
    
    // Wait for all threads to complete
    for handle in handles {
        handle.join().map_err(|_| {
            CompositorError::ThreadSafetyError("XDG shell thread safety validation failed".to_string())
        })??;
    }
    
    Ok(())
}

/// Validates thread safety of layer shell
fn validate_layer_shell_thread_safety() -> CompositorResult<()> {
    // Create a surface manager and layer shell manager
    let surface_manager = Arc::new(SurfaceManager::new());
    let layer_shell_manager = Arc::new(LayerShellManager::new(surface_manager.clone()));
    
    // Create multiple threads that access the layer shell manager concurrently
    let mut handles = Vec::new();
    
    for _ in 0..5 {
        let layer_shell_manager_clone = layer_shell_manager.clone();
        
        let handle = thread::spawn(move || {
            // Simulate some work
            thread::sleep(Duration::from_millis(10));
            
            // Try to get all layer surfaces
            let _layer_surfaces = layer_shell_manager_clone.get_all_layer_surfaces().unwrap();
            
            // Try to get layer surfaces by layer
            let _layer_surfaces = layer_shell_manager_clone.get_layer_surfaces(
                smithay::wayland::shell::wlr_layer::Layer::Background
            ).unwrap();
            
            Ok(())
        });
        
        handles.push(handle);
    }
    
    // Wait for all threads to complete
    for handle in handles {
        handle.join().map_err(|_| {
            CompositorError::ThreadSafetyError("Layer shell thread safety validation failed".to_string())
        })??;
    }
    
    Ok(())
}

/// Ensures that all synchronization primitives are used correctly
pub fn validate_synchronization_primitives() -> CompositorResult<()> {
    // Check for potential deadlocks
    validate_lock_ordering()?;
    
    // Check for race conditions
    validate_race_conditions()?;
    
    // Check for proper use of interior mutability
    validate_interior_mutability()?;
    
    Ok(())
}

/// Validates that lock ordering is consistent to prevent deadlocks
fn validate_lock_ordering() -> CompositorResult<()> {
    // This would check that locks are always acquired in the same order
    // to prevent deadlocks. For example, if we have locks A and B, we should
    // always acquire A before B, or always acquire B before A, but never
    // acquire A then B in one place and B then A in another.
    
    // For now, this is just a placeholder
    Ok(())
}

/// Validates that there are no race conditions
fn validate_race_conditions() -> CompositorResult<()> {
    // This would check for potential race conditions, such as reading a value
    // without proper synchronization after it has been modified.
    
    // For now, this is just a placeholder
    Ok(())
}

/// Validates that no interior mutability is used without proper synchronization
pub fn validate_interior_mutability() -> CompositorResult<()> {
    // This would check that:
    // 1. No Cell or RefCell is used in shared state
    // 2. No UnsafeCell is used without proper synchronization
    
    // For now, this is just a placeholder
    Ok(())
}

/// Runs all thread safety validations
pub fn run_all_validations(desktop_state: Arc<DesktopState>) -> CompositorResult<()> {
    validate_thread_safety(desktop_state)?;
    validate_synchronization_primitives()?;
    validate_interior_mutability()?;
    
    Ok(())
}
