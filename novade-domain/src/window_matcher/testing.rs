//! Null-object and fixed-fixture implementations of the matcher's capability
//! traits, used across this module's own unit tests and available to a host
//! application's integration tests.

use std::collections::HashMap;

use novade_core::types::geometry::RectInt;

use super::capabilities::{PersistenceSink, TimerHandle, TimerHarness};
use super::types::Slot;

/// A monitor/connector table fixed for the lifetime of the test.
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    connectors: HashMap<String, i32>,
    geometries: HashMap<i32, RectInt>,
}

impl StaticTopology {
    pub fn new() -> Self {
        StaticTopology::default()
    }

    pub fn with_connector(mut self, name: &str, monitor_index: i32, geometry: RectInt) -> Self {
        self.connectors.insert(name.to_string(), monitor_index);
        self.geometries.insert(monitor_index, geometry);
        self
    }
}

impl super::capabilities::Topology for StaticTopology {
    fn monitor_count(&self) -> usize {
        self.geometries.len()
    }

    fn monitor_geometry(&self, index: i32) -> Option<RectInt> {
        self.geometries.get(&index).copied()
    }

    fn connector_for_monitor(&self, index: i32) -> Option<String> {
        self.connectors
            .iter()
            .find(|(_, &idx)| idx == index)
            .map(|(name, _)| name.clone())
    }

    fn monitor_for_connector(&self, name: &str) -> Option<i32> {
        self.connectors.get(name).copied()
    }

    fn available_connectors(&self) -> Vec<String> {
        self.connectors.keys().cloned().collect()
    }
}

/// Hands out sequential handles and records cancellations, driving timers
/// synchronously under test control rather than through a real event loop.
#[derive(Debug, Default)]
pub struct NullTimerHarness {
    next: u64,
    pub cancelled: Vec<TimerHandle>,
    pub scheduled: Vec<(TimerHandle, i64)>,
}

impl NullTimerHarness {
    pub fn new() -> Self {
        NullTimerHarness::default()
    }
}

impl TimerHarness for NullTimerHarness {
    fn schedule(&mut self, delay_ms: i64) -> TimerHandle {
        let handle = TimerHandle(self.next);
        self.next += 1;
        self.scheduled.push((handle, delay_ms));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.cancelled.push(handle);
    }
}

/// Discards every state-change notification.
#[derive(Debug, Default)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn on_state_changed(&mut self, _slots: &[Slot]) {}
}

/// Records every state-change notification verbatim, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub snapshots: Vec<Vec<Slot>>,
}

impl PersistenceSink for RecordingSink {
    fn on_state_changed(&mut self, slots: &[Slot]) {
        self.snapshots.push(slots.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::super::capabilities::Topology;
    use super::*;

    #[test]
    fn static_topology_reports_registered_connectors() {
        let topo = StaticTopology::new().with_connector("HDMI-1", 0, RectInt::new(0, 0, 1920, 1080));
        assert_eq!(topo.monitor_for_connector("HDMI-1"), Some(0));
        assert_eq!(topo.connector_for_monitor(0), Some("HDMI-1".to_string()));
        assert_eq!(topo.monitor_geometry(0), Some(RectInt::new(0, 0, 1920, 1080)));
        assert_eq!(topo.available_connectors(), vec!["HDMI-1".to_string()]);
    }

    #[test]
    fn null_timer_harness_hands_out_increasing_handles() {
        let mut harness = NullTimerHarness::new();
        let a = harness.schedule(500);
        let b = harness.schedule(200);
        assert_ne!(a, b);
        harness.cancel(a);
        assert_eq!(harness.cancelled, vec![a]);
    }

    #[test]
    fn recording_sink_captures_snapshots_in_order() {
        let mut sink = RecordingSink::default();
        sink.on_state_changed(&[]);
        assert_eq!(sink.snapshots.len(), 1);
    }
}
