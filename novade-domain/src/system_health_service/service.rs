// novade-domain/src/system_health_service/service.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex as TokioMutex}; // Using TokioMutex for active_alerts if needed for async operations. RwLock is also fine.
use tokio::time::{interval, Duration};
use log::{error, info, debug}; // Assuming log crate is setup

use novade_core::types::system_health::{
    CpuMetrics, MemoryMetrics, DiskActivityMetrics, DiskSpaceMetrics, NetworkActivityMetrics, TemperatureMetric,
    LogEntry, LogFilter, LogSourceIdentifier, DiagnosticTestId, DiagnosticTestInfo, DiagnosticTestResult, Alert, AlertId, SystemHealthDashboardConfig,
};
// use novade_core::types::EntityId; // Assuming a generic EntityId type exists - Removed for now as not used directly in this snippet
use crate::system_health_service::error::SystemHealthError;

// Dependencies from System Layer (to be defined in Step 4)
// These are conceptual traits that the System Layer will implement.
// The SystemHealthService will depend on these abstractions.

#[async_trait]
pub trait MetricCollectorAdapter: Send + Sync {
    async fn collect_cpu_metrics(&self) -> Result<CpuMetrics, SystemHealthError>;
    async fn collect_memory_metrics(&self) -> Result<MemoryMetrics, SystemHealthError>;
    async fn collect_disk_activity_metrics(&self) -> Result<Vec<DiskActivityMetrics>, SystemHealthError>; // One per monitored disk/activity group
    async fn collect_disk_space_metrics(&self) -> Result<Vec<DiskSpaceMetrics>, SystemHealthError>; // One per monitored partition
    async fn collect_network_activity_metrics(&self) -> Result<Vec<NetworkActivityMetrics>, SystemHealthError>; // One per interface
    async fn collect_temperature_metrics(&self) -> Result<Vec<TemperatureMetric>, SystemHealthError>;
}

#[async_trait]
pub trait LogHarvesterAdapter: Send + Sync {
    // Streams live logs. `LogFilter` could specify which sources to stream from.
    async fn stream_logs(&self, filter: LogFilter) -> Result<tokio::sync::mpsc::Receiver<Result<LogEntry, SystemHealthError>>, SystemHealthError>;
    // Queries historical logs.
    async fn query_logs(&self, filter: LogFilter) -> Result<Vec<LogEntry>, SystemHealthError>;
    async fn list_log_sources(&self) -> Result<Vec<LogSourceIdentifier>, SystemHealthError>;
}

#[async_trait]
pub trait DiagnosticRunnerAdapter: Send + Sync {
    async fn list_available_diagnostics(&self) -> Result<Vec<DiagnosticTestInfo>, SystemHealthError>;
    async fn run_diagnostic(&self, test_id: DiagnosticTestId, params: Option<serde_json::Value>) -> Result<DiagnosticTestResult, SystemHealthError>; // params could be JSON for flexibility
}

// Placeholder for a potential Alert Dispatcher interface if alerts need to go beyond just the UI
// For now, alerts will be part of the SystemHealthService's broadcast.
// #[async_trait]
// pub trait AlertDispatcherAdapter: Send + Sync {
//     async fn dispatch_alert(&self, alert: Alert) -> Result<(), SystemHealthError>;
// }


/// `SystemHealthServiceTrait` defines the public API of the System Health Service.
/// This service is responsible for aggregating system health data, managing diagnostic tests,
/// and generating alerts.
#[async_trait]
pub trait SystemHealthServiceTrait: Send + Sync {
    // Metric Retrieval
    async fn get_current_cpu_metrics(&self) -> Result<CpuMetrics, SystemHealthError>;
    async fn get_current_memory_metrics(&self) -> Result<MemoryMetrics, SystemHealthError>;
    async fn get_current_disk_activity_metrics(&self) -> Result<Vec<DiskActivityMetrics>, SystemHealthError>;
    async fn get_current_disk_space_metrics(&self) -> Result<Vec<DiskSpaceMetrics>, SystemHealthError>;
    async fn get_current_network_activity_metrics(&self) -> Result<Vec<NetworkActivityMetrics>, SystemHealthError>;
    async fn get_current_temperature_metrics(&self) -> Result<Vec<TemperatureMetric>, SystemHealthError>;

    // Log Retrieval
    async fn stream_log_entries(&self, filter: LogFilter) -> Result<tokio::sync::mpsc::Receiver<Result<LogEntry, SystemHealthError>>, SystemHealthError>;
    async fn query_log_entries(&self, filter: LogFilter) -> Result<Vec<LogEntry>, SystemHealthError>;
    async fn get_available_log_sources(&self) -> Result<Vec<LogSourceIdentifier>, SystemHealthError>;

    // Diagnostic Tests
    async fn list_diagnostics(&self) -> Result<Vec<DiagnosticTestInfo>, SystemHealthError>;
    async fn run_diagnostic_test(&self, test_id: DiagnosticTestId, params: Option<serde_json::Value>) -> Result<DiagnosticTestResult, SystemHealthError>; // Returns final result after completion
    async fn stream_diagnostic_test_progress(&self, test_id: DiagnosticTestId) -> Result<tokio::sync::mpsc::Receiver<Result<DiagnosticTestResult, SystemHealthError>>, SystemHealthError>; // For long-running tests

    // Alerts
    async fn get_active_alerts(&self) -> Result<Vec<Alert>, SystemHealthError>;
    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<(), SystemHealthError>;
    // async fn get_alert_history(&self, limit: Option<u32>) -> Result<Vec<Alert>, SystemHealthError>;

    // Subscription to real-time updates (e.g., for UI)
    // These would broadcast new values as they are processed/generated internally.
    fn subscribe_to_cpu_metrics_updates(&self) -> broadcast::Receiver<CpuMetrics>;
    fn subscribe_to_memory_metrics_updates(&self) -> broadcast::Receiver<MemoryMetrics>;
    // TODO: Add subscriptions for other metric types (DiskActivity, DiskSpace, Network, Temperature)
    fn subscribe_to_disk_activity_updates(&self) -> broadcast::Receiver<Vec<DiskActivityMetrics>>;
    fn subscribe_to_disk_space_updates(&self) -> broadcast::Receiver<Vec<DiskSpaceMetrics>>;
    fn subscribe_to_network_activity_updates(&self) -> broadcast::Receiver<Vec<NetworkActivityMetrics>>;
    fn subscribe_to_temperature_updates(&self) -> broadcast::Receiver<Vec<TemperatureMetric>>;
    fn subscribe_to_alert_updates(&self) -> broadcast::Receiver<Alert>;
    // Log updates are typically handled by stream_log_entries, but a general "new log available" event could exist.

    // Configuration
    async fn get_current_configuration(&self) -> Result<SystemHealthDashboardConfig, SystemHealthError>;
    async fn update_configuration(&self, config: SystemHealthDashboardConfig) -> Result<(), SystemHealthError>;
}

pub struct SystemHealthService {
    config: Arc<tokio::sync::RwLock<SystemHealthDashboardConfig>>,
    metric_collector: Arc<dyn MetricCollectorAdapter>,
    log_harvester: Arc<dyn LogHarvesterAdapter>,
    diagnostic_runner: Arc<dyn DiagnosticRunnerAdapter>,
    // alert_dispatcher: Option<Arc<dyn AlertDispatcherAdapter>>, // If external dispatch needed

    // Broadcasters for real-time UI updates
    cpu_metrics_tx: broadcast::Sender<CpuMetrics>,
    memory_metrics_tx: broadcast::Sender<MemoryMetrics>,
    disk_activity_tx: broadcast::Sender<Vec<DiskActivityMetrics>>,
    disk_space_tx: broadcast::Sender<Vec<DiskSpaceMetrics>>,
    network_activity_tx: broadcast::Sender<Vec<NetworkActivityMetrics>>,
    temperature_tx: broadcast::Sender<Vec<TemperatureMetric>>,
    alert_tx: broadcast::Sender<Alert>,

    // Internal state for alerts, etc.
    active_alerts: Arc<tokio::sync::RwLock<HashMap<AlertId, Alert>>>,
    // Background task handles
    // metric_polling_task: Option<tokio::task::JoinHandle<()>>,
    // log_processing_task: Option<tokio::task::JoinHandle<()>>,
    // alert_evaluation_task: Option<tokio::task::JoinHandle<()>>,
    // For tasks that might need to be joined or cancelled:
    // background_tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl SystemHealthService {
    pub fn new(
        initial_config: SystemHealthDashboardConfig,
        metric_collector: Arc<dyn MetricCollectorAdapter>,
        log_harvester: Arc<dyn LogHarvesterAdapter>,
        diagnostic_runner: Arc<dyn DiagnosticRunnerAdapter>,
        // alert_dispatcher: Option<Arc<dyn AlertDispatcherAdapter>>,
    ) -> Arc<Self> { // Return Arc<Self> to make it easy to start tasks that need Arc<Self>
        // Initialize broadcasters
        let (cpu_metrics_tx, _) = broadcast::channel(16);
        let (memory_metrics_tx, _) = broadcast::channel(16);
        let (disk_activity_tx, _) = broadcast::channel(16);
        let (disk_space_tx, _) = broadcast::channel(16);
        let (network_activity_tx, _) = broadcast::channel(16);
        let (temperature_tx, _) = broadcast::channel(16);
        let (alert_tx, _) = broadcast::channel(32);

        let service_arc = Arc::new(Self {
            config: Arc::new(tokio::sync::RwLock::new(initial_config)),
            metric_collector: metric_collector.clone(), // Clone Arcs for the struct
            log_harvester: log_harvester.clone(),
            diagnostic_runner: diagnostic_runner.clone(),
            cpu_metrics_tx: cpu_metrics_tx.clone(),
            memory_metrics_tx: memory_metrics_tx.clone(),
            disk_activity_tx: disk_activity_tx.clone(),
            disk_space_tx: disk_space_tx.clone(),
            network_activity_tx: network_activity_tx.clone(),
            temperature_tx: temperature_tx.clone(),
            alert_tx: alert_tx.clone(),
            active_alerts: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            // background_tasks: Vec::new(), // Initialize if using this pattern
        });

        // Start background tasks
        // SystemHealthService::start_cpu_metric_polling(service_arc.clone()); // Example for CPU
        SystemHealthService::start_memory_metric_polling(service_arc.clone());
        // SystemHealthService::start_alert_evaluation_task(service_arc.clone()); // etc.

        service_arc
    }

    // Method to start memory metric polling task
    fn start_memory_metric_polling(self_arc: Arc<Self>) {
        tokio::spawn(async move {
            // Read initial interval from config. In a more complex system, this might need to react to config changes.
            let initial_interval_ms = self_arc.config.read().await.metric_refresh_interval_ms;
            let mut tick_interval = interval(Duration::from_millis(initial_interval_ms));

            info!("Starting memory metric polling task with interval: {}ms", initial_interval_ms);

            loop {
                tick_interval.tick().await;
                // Potentially re-read interval if config can change dynamically
                // let current_interval_ms = self_arc.config.read().await.metric_refresh_interval_ms;
                // if tick_interval.period().as_millis() as u64 != current_interval_ms {
                //     tick_interval = interval(Duration::from_millis(current_interval_ms));
                //     info!("Updated memory metric polling interval to: {}ms", current_interval_ms);
                // }

                match self_arc.metric_collector.collect_memory_metrics().await {
                    Ok(metrics) => {
                        debug!("Collected memory metrics: {:?}", metrics);
                        if let Err(e) = self_arc.memory_metrics_tx.send(metrics.clone()) {
                            error!("Failed to broadcast memory metrics: {}", e);
                        } else {
                            // info!("Successfully broadcasted memory metrics."); // Can be too verbose
                        }
                    }
                    Err(e) => {
                        error!("Failed to collect memory metrics: {:?}", e);
                    }
                }
            }
        });
    }

    // Similarly, other polling tasks could be added here:
    // fn start_cpu_metric_polling(self_arc: Arc<Self>) { /* ... */ }
    // fn start_disk_activity_polling(self_arc: Arc<Self>) { /* ... */ }
    // ... etc. ...
    // fn start_alert_evaluation_task(self_arc: Arc<Self>) { /* ... */ }
}

#[async_trait]
impl SystemHealthServiceTrait for SystemHealthService {
    async fn get_current_cpu_metrics(&self) -> Result<CpuMetrics, SystemHealthError> {
        self.metric_collector.collect_cpu_metrics().await
    }

    async fn get_current_memory_metrics(&self) -> Result<MemoryMetrics, SystemHealthError> {
        self.metric_collector.collect_memory_metrics().await
    }

    async fn get_current_disk_activity_metrics(&self) -> Result<Vec<DiskActivityMetrics>, SystemHealthError> {
        self.metric_collector.collect_disk_activity_metrics().await
    }

    async fn get_current_disk_space_metrics(&self) -> Result<Vec<DiskSpaceMetrics>, SystemHealthError> {
        self.metric_collector.collect_disk_space_metrics().await
    }

    async fn get_current_network_activity_metrics(&self) -> Result<Vec<NetworkActivityMetrics>, SystemHealthError> {
        self.metric_collector.collect_network_activity_metrics().await
    }

    async fn get_current_temperature_metrics(&self) -> Result<Vec<TemperatureMetric>, SystemHealthError> {
        self.metric_collector.collect_temperature_metrics().await
    }

    async fn stream_log_entries(&self, filter: LogFilter) -> Result<tokio::sync::mpsc::Receiver<Result<LogEntry, SystemHealthError>>, SystemHealthError> {
        self.log_harvester.stream_logs(filter).await
    }

    async fn query_log_entries(&self, filter: LogFilter) -> Result<Vec<LogEntry>, SystemHealthError> {
        self.log_harvester.query_logs(filter).await
    }

    async fn get_available_log_sources(&self) -> Result<Vec<LogSourceIdentifier>, SystemHealthError> {
        self.log_harvester.list_log_sources().await
    }

    async fn list_diagnostics(&self) -> Result<Vec<DiagnosticTestInfo>, SystemHealthError> {
        self.diagnostic_runner.list_available_diagnostics().await
    }

    async fn run_diagnostic_test(&self, test_id: DiagnosticTestId, params: Option<serde_json::Value>) -> Result<DiagnosticTestResult, SystemHealthError> {
        self.diagnostic_runner.run_diagnostic(test_id, params).await
    }

    async fn stream_diagnostic_test_progress(&self, _test_id: DiagnosticTestId) -> Result<tokio::sync::mpsc::Receiver<Result<DiagnosticTestResult, SystemHealthError>>, SystemHealthError> {
        // Placeholder: The DiagnosticRunnerAdapter would need to support streaming progress.
        // This might involve the adapter returning an mpsc::Receiver directly for a given test run.
        Err(SystemHealthError::Unexpected("Streaming diagnostic progress not yet implemented".to_string()))
    }

    async fn get_active_alerts(&self) -> Result<Vec<Alert>, SystemHealthError> {
        let alerts_map = self.active_alerts.read().await;
        Ok(alerts_map.values().cloned().collect())
    }

    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<(), SystemHealthError> {
        let mut alerts_map = self.active_alerts.write().await;
        if let Some(alert) = alerts_map.get_mut(&alert_id) {
            if !alert.acknowledged {
                alert.acknowledged = true;
                // Rebroadcast the updated alert
                let _ = self.alert_tx.send(alert.clone());
            }
            Ok(())
        } else {
            Err(SystemHealthError::Unexpected(format!("Alert with ID {:?} not found for acknowledgement.", alert_id)))
        }
    }

    fn subscribe_to_cpu_metrics_updates(&self) -> broadcast::Receiver<CpuMetrics> {
        self.cpu_metrics_tx.subscribe()
    }

    fn subscribe_to_memory_metrics_updates(&self) -> broadcast::Receiver<MemoryMetrics> {
        self.memory_metrics_tx.subscribe()
    }

    fn subscribe_to_disk_activity_updates(&self) -> broadcast::Receiver<Vec<DiskActivityMetrics>> {
        self.disk_activity_tx.subscribe()
    }

    fn subscribe_to_disk_space_updates(&self) -> broadcast::Receiver<Vec<DiskSpaceMetrics>> {
        self.disk_space_tx.subscribe()
    }

    fn subscribe_to_network_activity_updates(&self) -> broadcast::Receiver<Vec<NetworkActivityMetrics>> {
        self.network_activity_tx.subscribe()
    }

    fn subscribe_to_temperature_updates(&self) -> broadcast::Receiver<Vec<TemperatureMetric>> {
        self.temperature_tx.subscribe()
    }

    fn subscribe_to_alert_updates(&self) -> broadcast::Receiver<Alert> {
        self.alert_tx.subscribe()
    }

    async fn get_current_configuration(&self) -> Result<SystemHealthDashboardConfig, SystemHealthError> {
        Ok(self.config.read().await.clone())
    }

    async fn update_configuration(&self, config: SystemHealthDashboardConfig) -> Result<(), SystemHealthError> {
        let mut current_config = self.config.write().await;
        *current_config = config;
        // TODO: Notify background tasks about config changes (e.g., refresh interval, alert thresholds).
        // This might involve sending a specific signal or message to the tasks,
        // or the tasks themselves could periodically check the config Arc.
        // For instance, a metric polling task would need to adjust its sleep duration.
        // An alert evaluation task would need to reload alert thresholds.
        println!("SystemHealthService configuration updated. Background tasks may need to be signaled to reload settings."); // Placeholder
        Ok(())
    }
}
