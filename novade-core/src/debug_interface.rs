//! Placeholder for Debug Interface features.
//! As per Prompt #8: Runtime introspection, debug commands, state dumps, profiling, memory leak detection.

use tracing::warn;

pub fn init_debug_interface() {
    warn!("Debug interface is not yet fully implemented.");
}

pub fn register_debug_command(command: &str, handler: fn(args: &[&str]) -> String) {
    // warn!("Registering debug command '{}' - feature not fully implemented.", command);
}

pub fn dump_system_state() -> String {
    warn!("System state dump - feature not fully implemented.");
    "// System state dump not available //".to_string()
}
