//! Utility functions and types for the Nova Wayland Compositor.
//!
//! This module provides helper functions and common data structures that
//! might be used across different parts of the compositor.
// Currently empty, but placeholder for future utility code.

// Example of a utility function:
/*
use smithay::utils::Serial;

/// Generates a new Wayland serial.
pub fn next_serial() -> Serial {
    SERIAL_COUNTER.next_serial()
}
*/
