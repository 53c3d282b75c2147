// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # XDG Shell Implementation
//!
//! This module implements the XDG shell protocol for the compositor.

// Copyright (c) 2025 NovaDE Contributors
// SPDX-License-Identifier: MIT

//! # XDG Shell Implementation
//!
//! This module implements the XDG shell protocol for the compositor.
//! It primarily re-exports types from `xdg_shell::types` and relies on
//! `xdg_shell::handlers` for the actual XdgShellHandler implementation.

// Re-export types from the types module
pub mod types;
pub use types::*;

// Imports that might be needed by handlers if they were in this file,
// but generally, handlers.rs will have its own imports.
// use std::sync::{Arc, Mutex, RwLock};
// use std::collections::HashMap;
// use smithay::wayland::shell::xdg::{XdgShellHandler, XdgShellState, ToplevelSurface, PopupSurface, PositionerState, ResizeEdge};
// use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
// use smithay::reexports::wayland_server::backend::ClientId;
// use smithay::utils::{Logical, Point, Size, Rectangle};
// use smithay::input::Seat;

// use super::{CompositorError, CompositorResult};
// use super::core::DesktopState; // This would be NovadeCompositorState
// use super::surface_management::{SurfaceData, SurfaceRole, SurfaceManager}; // SurfaceManager is removed

// All struct definitions (ManagedWindow, WindowState, WindowManagerData, WindowLayer),
// the XdgShellManager, and the `impl XdgShellHandler for DesktopState`
// have been removed from this file.
// Logic is now either in `types.rs` or `handlers.rs`.
