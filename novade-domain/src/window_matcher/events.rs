//! Observable event kinds emitted alongside an operation batch, for tests and
//! diagnostics (§4.6). These are distinct from the Event Source's inbound
//! `event_name` strings, this is the dispatcher's outbound vocabulary.

use super::types::WindowId;

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    WindowDestroyed(WindowId),
    WindowModified(WindowId),
    WindowTitleBecameSpecific(WindowId),
    /// Emitted on each PENDING-tick pass; sampled, not every window every
    /// tick, to avoid flooding diagnostics.
    WindowPendingDecision(WindowId),
    KnownMatch(WindowId, usize),
    KnownNew(WindowId, usize),
    WindowMonitorRelocated(WindowId),
    WindowUserMonitorChange(WindowId),
    WindowDriftCorrected(WindowId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_carries_window_identity() {
        let id = WindowId::new("wl-surface-1");
        let event = EventKind::WindowDestroyed(id.clone());
        assert_eq!(event, EventKind::WindowDestroyed(id));
    }
}
