// novade-system/src/system_health_collectors/log_harvester.rs

use async_trait::async_trait;
use novade_core::types::system_health::{LogEntry, LogFilter, LogSourceIdentifier};
use novade_domain::system_health_service::service::LogHarvesterAdapter;
use novade_domain::system_health_service::error::SystemHealthError;
use super::error::CollectionError;
use tokio::sync::mpsc;

pub struct SystemLogHarvester {
    // Example: May hold a handle to journald or configured log files.
}

impl SystemLogHarvester {
    pub fn new() -> Self {
        SystemLogHarvester {}
    }

    #[allow(dead_code)] // This will be used when actual collection logic is added
    fn to_domain_error(err: CollectionError, source_id: &LogSourceIdentifier) -> SystemHealthError {
        SystemHealthError::LogHarvestingError {
            source_id: source_id.clone(),
            source_description: err.to_string(), // Or more specific description
            source: Some(Box::new(err)),
        }
    }
}

#[async_trait]
impl LogHarvesterAdapter for SystemLogHarvester {
    async fn stream_logs(&self, filter: LogFilter) -> Result<mpsc::Receiver<Result<LogEntry, SystemHealthError>>, SystemHealthError> {
        // Placeholder: Actual implementation would connect to journald or tail log files.
        // This would involve spawning a task to monitor log sources and send entries to the receiver.
        println!("SystemLayer: `stream_logs` called with filter: {:?} (placeholder)", filter);
        let (_tx, rx) = mpsc::channel(100); // Dummy channel
        // Example of returning an error:
        // Err(Self::to_domain_error(
        //     CollectionError::NotImplemented("stream_logs".to_string()),
        //     &LogSourceIdentifier("system_logs".to_string()) // Example source ID
        // ))
        Ok(rx) // Returning the receiver part of a dummy channel for now
    }

    async fn query_logs(&self, filter: LogFilter) -> Result<Vec<LogEntry>, SystemHealthError> {
        // Placeholder: Actual implementation would query journald or parse log files.
        println!("SystemLayer: `query_logs` called with filter: {:?} (placeholder)", filter);
        Ok(vec![])
    }

    async fn list_log_sources(&self) -> Result<Vec<LogSourceIdentifier>, SystemHealthError> {
        // Placeholder: Could list known system log sources like "journald", "/var/log/syslog", etc.
        println!("SystemLayer: `list_log_sources` called (placeholder)");
        // Example:
        // Ok(vec![
        //     LogSourceIdentifier("journald".to_string()),
        //     LogSourceIdentifier("/var/log/syslog".to_string())
        // ])
        Ok(vec![])
    }
}
