//! Capability traits the host must supply: monitor topology, deferred-timer
//! registration, persisted-state notification, and window filtering. Each
//! absent capability is represented by a null-object implementation, never
//! by an `Option<fn(...)>`, see the "dictionary-of-callbacks -> capability
//! trait" design note. Test doubles live under [`super::testing`]; a null
//! object that is itself a legitimate production default, like
//! [`AllowAllFilter`], is defined alongside its trait instead.

use novade_core::types::geometry::RectInt;

use super::types::{LiveWindowDetails, Slot};

/// Read-only view of the current monitor/connector topology.
pub trait Topology {
    fn monitor_count(&self) -> usize;
    fn monitor_geometry(&self, index: i32) -> Option<RectInt>;
    fn connector_for_monitor(&self, index: i32) -> Option<String>;
    fn monitor_for_connector(&self, name: &str) -> Option<i32>;
    fn available_connectors(&self) -> Vec<String>;
}

/// Opaque handle to a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Centralized registration and teardown of deferred callbacks.
///
/// The harness only tracks bookkeeping for cancellation (invariant: every
/// registered timer is either fired-and-removed or explicitly cancelled).
/// The actual firing is driven by the host's event loop, which calls back
/// into the engine's `on_pending_tick`/`on_settle_timer` once a registered
/// delay elapses.
pub trait TimerHarness {
    fn schedule(&mut self, delay_ms: i64) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Notified synchronously whenever the remembered-window list changes.
pub trait PersistenceSink {
    fn on_state_changed(&mut self, slots: &[Slot]);
}

/// External policy callback (§4.6 step 2): given the latest observed
/// details, may filter a window out of matching entirely before the core's
/// own trackability heuristics run. Optional in the sense the spec
/// describes ("if any"); a host with no opinion uses [`AllowAllFilter`]
/// rather than leaving the capability unset.
pub trait WindowFilter {
    fn should_track(&self, details: &LiveWindowDetails) -> bool;
}

/// The null-object [`WindowFilter`]: every window is eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllFilter;

impl WindowFilter for AllowAllFilter {
    fn should_track(&self, _details: &LiveWindowDetails) -> bool {
        true
    }
}
