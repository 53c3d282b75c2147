//ANCHOR [NovaDE Developers <dev@novade.org>] Debug Interface for NovaDE System.
//! This module provides a debug interface for introspecting and interacting with
//! the NovaDE system at runtime. It's intended for development, testing, and
//! advanced troubleshooting.
//!
//! The interface might expose functionalities via D-Bus, a Unix socket, or other
//! communication channels in the future. For now, it defines the core logic
//! and placeholder for these interactions.

use serde::Serialize;
use serde_json;
use std::sync::{Arc, Mutex, Weak}; // Mutex for now, consider RwLock if reads are frequent
use tokio::sync::mpsc; // For command processing if using an async task approach

//ANCHOR [NovaDE Developers <dev@novade.org>] Represents a snapshot of some system state.
/// A generic structure to represent a snapshot of a part of the system state.
/// This would be specialized for different kinds of state (e.g., CompositorStateSnapshot).
#[derive(Serialize, Debug, Clone)]
pub struct StateSnapshot {
    pub name: String,
    pub timestamp: u64, // Unix timestamp
    pub data: serde_json::Value,
    //TODO [NovaDE Developers <dev@novade.org>] Add versioning for snapshot formats.
}

//ANCHOR [NovaDE Developers <dev@novade.org>] Defines commands for the Debug Interface.
/// Enum representing commands that can be sent to the Debug Interface.
#[derive(Debug)]
pub enum DebugCommand {
    GetMetric(String),
    DumpState(Option<String>), // Option<String> for specific component or full dump
    TriggerGc, // If applicable to any internal components using manual GC
    StartProfiling(ProfilerTarget, u64), // Target and duration
    StopProfiling(ProfilerTarget),
    TriggerMemoryReport,
    //TODO [NovaDE Developers <dev@novade.org>] Add more commands as features are developed (e.g., set log level, simulate event).
}

//ANCHOR [NovaDE Developers <dev@novade.org>] Defines targets for profiling.
/// Enum representing different targets or types of profiling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfilerTarget {
    System,
    Compositor,
    SpecificProcess(u32), // PID
}

//ANCHOR [NovaDE Developers <dev@novade.org>] Main struct for the Debug Interface.
/// The `DebugInterface` provides methods for runtime introspection, debugging,
/// and control of the system.
///
/// It might manage access to various system components' states and offer
/// control functions for profiling and diagnostics.
//TODO [Compositor State Access] [NovaDE Developers <dev@novade.org>] Define how `DebugInterface` accesses compositor state.
// This could be via:
// 1. `Arc<Mutex<CompositorState>>` (if DebugInterface is in the same process space and state is shareable).
// 2. Message passing (e.g., `mpsc::Sender<CompositorRequest>`) if the compositor is an actor or runs its own event loop.
// 3. D-Bus calls if the compositor exposes its state via D-Bus.
// For now, we'll assume a placeholder mechanism or direct access for some shared state.
#[derive(Debug, Clone)]
pub struct DebugInterface {
    // Example: Access to a shared, simplified representation of some system state.
    // This is a placeholder. In a real system, this would be more complex and might involve Weak pointers
    // to avoid circular dependencies or channels for communication.
    // system_state_accessor: Option<Weak<Mutex<SomeSystemState>>>,

    // Example: Channel to send commands to a handler task for this DebugInterface
    // command_sender: Option<mpsc::Sender<DebugCommand>>,
}

impl DebugInterface {
    //ANCHOR [NovaDE Developers <dev@novade.org>] Creates a new DebugInterface.
    /// Creates a new instance of the `DebugInterface`.
    ///
    /// Initialization might involve setting up access to shared state or starting
    /// listener tasks for commands, depending on the chosen transport.
    pub fn new() -> Self {
        DebugInterface {
            // system_state_accessor: None, // Initialize appropriately
            // command_sender: None, // Initialize if using a command channel
        }
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Retrieves a snapshot of system state.
    /// Retrieves a snapshot of a specific part of the system's state.
    ///
    /// This is a placeholder. The actual implementation would query the relevant
    /// component (e.g., compositor, window manager) for its current state.
    ///
    /// # Arguments
    /// * `component_name`: An optional string to specify which component's state to fetch.
    ///                   If None, a general system overview might be returned.
    pub async fn get_system_state_snapshot(&self, component_name: Option<&str>) -> Result<StateSnapshot, String> {
        //TODO [Compositor State Access] [NovaDE Developers <dev@novade.org>] Implement actual state retrieval logic.
        // This would involve interacting with the live system components.
        // For example, if `system_state_accessor` held a `Weak<Mutex<ActualState>>`:
        // if let Some(state_arc) = self.system_state_accessor.as_ref().and_then(|w| w.upgrade()) {
        //     let state_locked = state_arc.lock().unwrap();
        //     // Access state_locked and serialize parts of it.
        // } else {
        //     return Err("System state is no longer accessible.".to_string());
        // }

        let data = json!({
            "status": "placeholder",
            "message": "Actual state retrieval not yet implemented.",
            "requested_component": component_name.unwrap_or("all"),
            "active_windows": 0, // Placeholder
            "resource_usage": { "cpu": "N/A", "memory": "N/A" } // Placeholder
        });

        Ok(StateSnapshot {
            name: component_name.unwrap_or("system_overview").to_string(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            data,
        })
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Generates a comprehensive state dump.
    /// Generates a JSON string or writes to a file a comprehensive dump of the system state.
    /// This may include active windows, resource usage, recent logs/errors.
    ///
    /// //TODO [Sensitive Information] [NovaDE Developers <dev@novade.org>] Implement redaction of sensitive information (e.g., window titles, file paths, user data) from the state dump. This might involve a denylist or allowlist approach for serialization.
    pub async fn generate_state_dump(&self, component_name: Option<&str>) -> Result<String, String> {
        let snapshot = self.get_system_state_snapshot(component_name).await?;
        serde_json::to_string_pretty(&snapshot).map_err(|e| format!("Failed to serialize state dump: {}", e))
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Processes a debug command.
    /// Processes an incoming `DebugCommand`.
    /// This function would typically be called by a command listener (e.g., socket server, D-Bus handler).
    ///
    /// # Arguments
    /// * `command`: The `DebugCommand` to process.
    ///
    /// //TODO [Debug Command Transport] [NovaDE Developers <dev@novade.org>] Specify and implement the actual transport for receiving commands (e.g., Unix domain socket, named pipe, D-Bus methods). For now, this is a direct call.
    pub async fn process_command(&self, command: DebugCommand) -> Result<serde_json::Value, String> {
        match command {
            DebugCommand::GetMetric(metric_name) => {
                //TODO [NovaDE Developers <dev@novade.org>] Integrate with metrics system (e.g., Prometheus client or direct collector query)
                Ok(json!({ "metric": metric_name, "value": "not_implemented" }))
            }
            DebugCommand::DumpState(component) => {
                let dump = self.generate_state_dump(component.as_deref()).await?;
                Ok(json!({ "state_dump": dump }))
            }
            DebugCommand::TriggerGc => {
                //TODO [NovaDE Developers <dev@novade.org>] Implement if any components have manual GC triggers.
                Ok(json!({ "status": "gc_not_applicable_or_not_implemented" }))
            }
            DebugCommand::StartProfiling(target, duration_sec) => {
                self.start_profiling(target, duration_sec).await
            }
            DebugCommand::StopProfiling(target) => {
                self.stop_profiling(target).await
            }
            DebugCommand::TriggerMemoryReport => {
                self.trigger_memory_report().await
            }
        }
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Starts a profiling session.
    /// Placeholder function to start a profiling session.
    ///
    /// //TODO [External Profiler Control] [NovaDE Developers <dev@novade.org>] Implement control for external profilers (e.g., `perf`, `Tracy`) or enable internal profiling flags. This might involve executing shell commands or using a specific profiling crate's API.
    pub async fn start_profiling(&self, target: ProfilerTarget, duration_sec: u64) -> Result<serde_json::Value, String> {
        tracing::info!("Attempting to start profiling for target: {:?}, duration: {}s (Not Yet Implemented)", target, duration_sec);
        Ok(json!({
            "status": "profiling_start_not_implemented",
            "target": target,
            "duration_seconds": duration_sec
        }))
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Stops a profiling session.
    /// Placeholder function to stop a profiling session.
    ///
    /// //TODO [External Profiler Control] [NovaDE Developers <dev@novade.org>] Implement control to stop/finalize external profilers or disable internal flags. This might involve sending signals or generating report files.
    pub async fn stop_profiling(&self, target: ProfilerTarget) -> Result<serde_json::Value, String> {
        tracing::info!("Attempting to stop profiling for target: {:?} (Not Yet Implemented)", target);
        Ok(json!({
            "status": "profiling_stop_not_implemented",
            "target": target
        }))
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Triggers a memory report generation.
    /// Placeholder function to trigger generation of a memory report.
    ///
    /// //TODO [Memory Leak Tooling] [NovaDE Developers <dev@novade.org>] Integrate with memory profiling tools (e.g., `heaptrack`, `dhat`, `valgrind` control) or custom logic to dump memory allocation statistics.
    pub async fn trigger_memory_report(&self) -> Result<serde_json::Value, String> {
        tracing::info!("Attempting to trigger memory report (Not Yet Implemented)");
        Ok(json!({ "status": "memory_report_not_implemented" }))
    }
}

impl Default for DebugInterface {
    fn default() -> Self {
        Self::new()
    }
}

//ANCHOR [NovaDE Developers <dev@novade.org>] Import DebugInterfaceConfig.
use novade_core::config::DebugInterfaceConfig;
// use tokio::net::UnixListener; // Example for Unix socket, keep commented for now.
// use tokio::io::AsyncBufReadExt; // For reading lines from socket if that approach is taken.

//ANCHOR [NovaDE Developers <dev@novade.org>] Runs the debug command server.
/// Initializes and runs the debug command server if enabled in the configuration.
///
/// The actual server implementation (e.g., Unix socket listener, command parsing)
/// is currently a placeholder. This function sets up the checks based on configuration.
///
/// # Arguments
/// * `config`: Configuration for the debug interface.
/// * `debug_interface`: An `Arc` pointing to the `DebugInterface` instance.
pub async fn run_debug_command_server(config: &DebugInterfaceConfig, debug_interface: Arc<DebugInterface>) {
    if !config.debug_interface_enabled {
        // Consider using tracing::info! if logging is set up.
        println!("[DebugInterface] Not starting as debug_interface_enabled is false.");
        return;
    }

    let socket_path = match &config.debug_interface_address {
        Some(path) if !path.is_empty() => path.clone(), // Clone to own the string for potential use
        _ => {
            // Consider using tracing::error!
            eprintln!("[DebugInterface] Enabled but no valid debug_interface_address provided. Server not starting.");
            return;
        }
    };

    tracing::info!(
        "[DebugInterface] Server configured to run on address: {} (Actual server logic is placeholder).",
        socket_path
    );

    //TODO [Debug Command Transport] Implement actual server logic for chosen transport (e.g., Unix domain socket, named pipe, D-Bus methods).
    // Example conceptual Unix socket listener (kept commented):
    /*
    match UnixListener::bind(&socket_path) { // Use the cloned socket_path
        Ok(listener) => {
            tracing::info!("[DebugInterface] Listening on Unix socket: {}", socket_path);
            loop {
                match listener.accept().await {
                    Ok((mut _stream, _addr)) => { // Renamed to _stream as it's not used yet
                        let _interface_clone = debug_interface.clone(); // Renamed as it's not used yet
                        tokio::spawn(async move {
                            // TODO: Implement command reading/parsing from _stream
                            // For example, read a line:
                            // let mut reader = tokio::io::BufReader::new(&mut _stream);
                            // let mut line = String::new();
                            // if reader.read_line(&mut line).await.is_ok() {
                            //     // Parse `line` into a `DebugCommand`
                            //     // let cmd = parse_command_from_string(line.trim());
                            //     // match _interface_clone.process_command(cmd).await {
                            //     //      Ok(response) => { /* write response to _stream */ },
                            //     //      Err(e) => { /* write error to _stream */ },
                            //     // }
                            // }
                            tracing::debug!("[DebugInterface] New connection (handler placeholder).");
                        });
                    }
                    Err(e) => {
                        tracing::error!("[DebugInterface] Failed to accept incoming connection: {}", e);
                        // Consider delay before retrying or exiting if bind fails permanently for some reason.
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!("[DebugInterface] Failed to bind to Unix socket {}: {}", socket_path, e);
        }
    }
    */
}


#[cfg(test)]
mod tests {
    use super::*;
    use novade_core::config::DebugInterfaceConfig; // For tests
    use std::sync::Arc;

    #[tokio::test]
    async fn test_debug_interface_new() {
        let debug_iface = DebugInterface::new();
        // Basic check, more complex if `new` had side effects or complex state
        // For instance, if `new` was supposed to setup some internal state based on config:
        // assert!(debug_iface.some_internal_state_is_correct());
        // For now, it's trivial.
    }

    #[tokio::test]
    async fn test_get_system_state_snapshot_placeholder() {
        let debug_iface = DebugInterface::new();
        let snapshot_result = debug_iface.get_system_state_snapshot(Some("test_component")).await;
        assert!(snapshot_result.is_ok());
        let snapshot = snapshot_result.unwrap();
        assert_eq!(snapshot.name, "test_component");
        assert!(snapshot.data.is_object());
        assert_eq!(snapshot.data["requested_component"], "test_component");
        assert_eq!(snapshot.data["message"], "Actual state retrieval not yet implemented.");
    }

    #[tokio::test]
    async fn test_generate_state_dump_placeholder() {
        let debug_iface = DebugInterface::new();
        let dump_result = debug_iface.generate_state_dump(None).await;
        assert!(dump_result.is_ok());
        let dump_str = dump_result.unwrap();

        let parsed_json: Result<serde_json::Value, _> = serde_json::from_str(&dump_str);
        assert!(parsed_json.is_ok(), "State dump should be valid JSON");
        let json_value = parsed_json.unwrap();
        assert_eq!(json_value["name"], "system_overview");
        assert!(json_value["data"]["message"].as_str().unwrap().contains("not yet implemented"));
    }

    #[tokio::test]
    async fn test_process_command_dump_state() {
        let debug_iface = DebugInterface::new();
        let command = DebugCommand::DumpState(Some("test_component".to_string()));
        let result = debug_iface.process_command(command).await;
        assert!(result.is_ok());
        let json_response = result.unwrap();
        assert!(json_response["state_dump"].is_string());
        let inner_dump_str = json_response["state_dump"].as_str().unwrap();
        let inner_json: serde_json::Value = serde_json::from_str(inner_dump_str).unwrap();
        assert_eq!(inner_json["name"], "test_component");
    }

    #[tokio::test]
    async fn test_process_command_get_metric_placeholder() {
        let debug_iface = DebugInterface::new();
        let command = DebugCommand::GetMetric("cpu_usage".to_string());
        let result = debug_iface.process_command(command).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), json!({ "metric": "cpu_usage", "value": "not_implemented" }));
    }

    #[tokio::test]
    async fn test_process_command_profiling_placeholders() {
        let debug_iface = DebugInterface::new();

        let cmd_start = DebugCommand::StartProfiling(ProfilerTarget::Compositor, 60);
        let res_start = debug_iface.process_command(cmd_start).await.unwrap();
        assert_eq!(res_start["status"], "profiling_start_not_implemented");
        assert_eq!(res_start["target"], json!(ProfilerTarget::Compositor));

        let cmd_stop = DebugCommand::StopProfiling(ProfilerTarget::Compositor);
        let res_stop = debug_iface.process_command(cmd_stop).await.unwrap();
        assert_eq!(res_stop["status"], "profiling_stop_not_implemented");
    }

    #[tokio::test]
    async fn test_process_command_memory_report_placeholder() {
        let debug_iface = DebugInterface::new();
        let command = DebugCommand::TriggerMemoryReport;
        let result = debug_iface.process_command(command).await.unwrap();
        assert_eq!(result, json!({ "status": "memory_report_not_implemented" }));
    }

    // Serialization test for ProfilerTarget for json! macro usage
    impl Serialize for ProfilerTarget {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer,
        {
            serializer.serialize_str(match self {
                ProfilerTarget::System => "System",
                ProfilerTarget::Compositor => "Compositor",
                ProfilerTarget::SpecificProcess(pid) => &format!("SpecificProcess({})", pid),
            })
        }
    }

    //ANCHOR [NovaDE Developers <dev@novade.org>] Tests for run_debug_command_server.
    #[tokio::test]
    async fn test_run_debug_server_disabled() {
        let config = DebugInterfaceConfig {
            debug_interface_enabled: false,
            debug_interface_address: None,
        };
        let iface = Arc::new(DebugInterface::new());
        // Should print "Not starting" and return quickly.
        // Using timeout to ensure it doesn't hang.
        let server_future = run_debug_command_server(&config, iface);
        match tokio::time::timeout(std::time::Duration::from_millis(50), server_future).await {
            Ok(_) => { /* Completed quickly, as expected */ }
            Err(_) => panic!("Server task timed out when it should have exited quickly (disabled)."),
        }
    }

    #[tokio::test]
    async fn test_run_debug_server_enabled_no_address() {
        let config = DebugInterfaceConfig {
            debug_interface_enabled: true,
            debug_interface_address: None,
        };
        let iface = Arc::new(DebugInterface::new());
        // Should print "no valid debug_interface_address" and return quickly.
        let server_future = run_debug_command_server(&config, iface);
        match tokio::time::timeout(std::time::Duration::from_millis(50), server_future).await {
            Ok(_) => { /* Completed quickly, as expected */ }
            Err(_) => panic!("Server task timed out when it should have exited quickly (no address)."),
        }
    }

    #[tokio::test]
    async fn test_run_debug_server_enabled_empty_address() {
        let config = DebugInterfaceConfig {
            debug_interface_enabled: true,
            debug_interface_address: Some("".to_string()),
        };
        let iface = Arc::new(DebugInterface::new());
        // Should print "no valid debug_interface_address" and return quickly.
        let server_future = run_debug_command_server(&config, iface);
        match tokio::time::timeout(std::time::Duration::from_millis(50), server_future).await {
            Ok(_) => { /* Completed quickly, as expected */ }
            Err(_) => panic!("Server task timed out when it should have exited quickly (empty address)."),
        }
    }

    #[tokio::test]
    async fn test_run_debug_server_enabled_with_address_placeholder_logic() {
        let config = DebugInterfaceConfig {
            debug_interface_enabled: true,
            debug_interface_address: Some("/tmp/novade-debug.sock".to_string()),
        };
        let iface = Arc::new(DebugInterface::new());
        // Current `run_debug_command_server` only logs and then placeholder comments for server logic.
        // So it should also return quickly.
        let server_future = run_debug_command_server(&config, iface);
         match tokio::time::timeout(std::time::Duration::from_millis(50), server_future).await {
            Ok(_) => { /* Completed quickly, as expected */ }
            Err(_) => panic!("Server task timed out when it should have exited quickly (placeholder logic)."),
        }
        // Check test output for: "[DebugInterface] Server configured to run on address: /tmp/novade-debug.sock"
    }
}
