//! Defines custom error types for the Nova Wayland Compositor.
//!
//! This module will contain enums and structs for representing various
//! errors that can occur during compositor operation, such as initialization
//! failures, protocol errors, or resource handling issues.
// Currently empty, but placeholder for future error types.

// Example of how an error type might be defined:
/*
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Wayland protocol error: {0}")]
    Protocol(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
*/
