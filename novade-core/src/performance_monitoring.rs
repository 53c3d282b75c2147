//! Placeholder for Performance Monitoring features.
//! As per Prompt #8: Real-time metrics, frame-time analysis, memory/GPU tracking, regression detection.

use tracing::warn;

pub fn init_performance_monitoring() {
    warn!("Performance monitoring system is not yet fully implemented.");
}

pub fn record_frame_time(duration_ms: f64) {
    // warn!("Frame time recording ({}ms) - feature not fully implemented.", duration_ms);
}

pub fn track_memory_usage(subsystem: &str, bytes: u64) {
    // warn!("Memory usage tracking for '{}': {} bytes - feature not fully implemented.", subsystem, bytes);
}

pub fn track_gpu_utilization(utilization_percent: f32) {
    // warn!("GPU utilization tracking ({}%) - feature not fully implemented.", utilization_percent);
}
