//! Error type for the window matcher.
//!
//! Per the matcher's error-handling design, almost nothing here is fatal:
//! transient executor failures, invalid geometry, missing connectors, and
//! exhausted drift retries are all modeled as local control flow (a skipped
//! operation, a deferred decision, an emitted event), not as `Err` values.
//! This type is reserved for the actual fallible boundary: loading and
//! parsing persisted state and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowMatcherError {
    #[error("failed to parse persisted window matcher state: {0}")]
    StateParse(#[from] serde_json::Error),

    #[error("failed to parse window matcher configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("persistence sink rejected a state write: {0}")]
    PersistenceFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_failed_formats_with_reason() {
        let err = WindowMatcherError::PersistenceFailed("disk full".to_string());
        assert_eq!(
            format!("{}", err),
            "persistence sink rejected a state write: disk full"
        );
    }
}
