// novade-system/src/window_mechanics/error.rs

use thiserror::Error;
// Import standard I/O error, as it was mentioned as an example in the spec,
// though it might not be used immediately.
use std::io;

/// Defines specific errors that can occur within the window management system.
///
/// These errors are used to provide context about failures in operations like
/// layout calculations, window identification, or interactions with the
/// underlying compositor state.
#[derive(Error, Debug)]
pub enum WindowManagerError {
    /// Occurs when an operation is attempted with an invalid or unknown window ID.
    ///
    /// Contains the problematic window ID.
    #[error("Invalid window ID: {0}")]
    InvalidWindowId(String),

    /// Occurs when a window layout calculation fails.
    ///
    /// Contains a message describing the reason for the layout failure.
    #[error("Failed to calculate window layout: {0}")]
    LayoutCalculation(String),

    /// Occurs when there's an issue accessing or manipulating the compositor's state.
    ///
    /// This could be due to locking issues, unexpected state, or other
    /// problems related to the underlying `smithay` compositor integration.
    /// Contains a message describing the access error.
    #[error("Failed to access compositor state: {0}")]
    CompositorStateAccess(String),

    /// Occurs when an unsupported or currently unimplemented window operation is requested.
    ///
    /// Contains a message describing the unsupported operation.
    #[error("Unsupported window operation: {0}")]
    UnsupportedOperation(String),

    /// Placeholder for I/O errors, if any operations directly cause them.
    /// For example, if window configurations were read from/written to files.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// A generic error type for other, less specific window management issues.
    ///
    /// Contains a general message describing the error.
    #[error("Generic window manager error: {0}")]
    Other(String),
}

// It can be useful to implement `From` for common error types that might
// be encountered and need to be converted into `WindowManagerError`.
// For instance, if a function returns `Result<_, SomeOtherError>`, you might
// want to convert `SomeOtherError` into `WindowManagerError::Other` or a more
// specific variant.

// Example: Implementing From for a hypothetical external error type
// (This is commented out as no specific external errors are defined yet beyond std::io::Error)
/*
#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("An external problem occurred: {0}")]
    Problem(String),
}

impl From<ExternalError> for WindowManagerError {
    fn from(err: ExternalError) -> Self {
        WindowManagerError::Other(format!("External error: {}", err))
    }
}
*/
