//! Persistence Model (§4.7): the on-disk slot representation, load/restore
//! with occupancy reset, and debounced state-change notification.
//!
//! Live window identifiers are never persisted. They are compositor-local
//! and unstable across restarts (§1 non-goals), so the wire record has no
//! `occupied` payload at all; restore always yields `Occupied::Unoccupied`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::capabilities::PersistenceSink;
use super::error::WindowMatcherError;
use super::types::{Config, Identity, Occupied, Slot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub wm_class: String,
    pub title: String,
    #[serde(default)]
    pub configs: Vec<Config>,
    #[serde(default)]
    pub connector_preference: Vec<String>,
    #[serde(default)]
    pub seen: i64,
}

impl From<&Slot> for SlotRecord {
    fn from(slot: &Slot) -> Self {
        SlotRecord {
            wm_class: slot.identity.wm_class.clone(),
            title: slot.identity.title.clone(),
            configs: slot.configs.clone(),
            connector_preference: slot.connector_preference.clone(),
            seen: slot.seen,
        }
    }
}

impl From<SlotRecord> for Slot {
    fn from(record: SlotRecord) -> Self {
        Slot {
            occupied: Occupied::Unoccupied,
            identity: Identity::new(record.wm_class, record.title),
            configs: record.configs,
            connector_preference: record.connector_preference,
            seen: record.seen,
        }
    }
}

/// Serializes the remembered-windows list to its wire form (JSON, per §6's
/// recommendation).
pub fn serialize_slots(slots: &[Slot]) -> Result<String, WindowMatcherError> {
    let records: Vec<SlotRecord> = slots.iter().map(SlotRecord::from).collect();
    serde_json::to_string(&records).map_err(WindowMatcherError::StateParse)
}

/// Parses a persisted slot list, resetting every slot to unoccupied.
pub fn deserialize_slots(raw: &str) -> Result<Vec<Slot>, WindowMatcherError> {
    let records: Vec<SlotRecord> = serde_json::from_str(raw).map_err(WindowMatcherError::StateParse)?;
    Ok(records.into_iter().map(Slot::from).collect())
}

/// Parses persisted state, treating any load failure as empty state per
/// §7's "State-load failure: treat as empty state".
pub fn load_or_empty(raw: &str) -> Vec<Slot> {
    match deserialize_slots(raw) {
        Ok(slots) => slots,
        Err(err) => {
            warn!(error = %err, "failed to load persisted window matcher state, starting empty");
            Vec::new()
        }
    }
}

/// Wraps a host-supplied [`PersistenceSink`], suppressing notifications
/// during bulk refresh and initial restore so those don't round-trip as
/// redundant writes.
pub struct PersistenceNotifier {
    sink: Box<dyn PersistenceSink>,
    suppressed: bool,
}

impl PersistenceNotifier {
    pub fn new(sink: Box<dyn PersistenceSink>) -> Self {
        PersistenceNotifier {
            sink,
            suppressed: false,
        }
    }

    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub fn resume(&mut self) {
        self.suppressed = false;
    }

    pub fn notify(&mut self, slots: &[Slot]) {
        if !self.suppressed {
            self.sink.on_state_changed(slots);
        }
    }

    /// Runs `body` with notifications suppressed, regardless of the prior
    /// suppression state, restoring it afterward.
    pub fn while_suppressed<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        let was_suppressed = self.suppressed;
        self.suppressed = true;
        let result = body(self);
        self.suppressed = was_suppressed;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novade_core::types::geometry::RectInt;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CountingSink(Rc<RefCell<usize>>);

    impl PersistenceSink for CountingSink {
        fn on_state_changed(&mut self, _slots: &[Slot]) {
            *self.0.borrow_mut() += 1;
        }
    }

    fn sample_slot() -> Slot {
        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 1_000);
        slot.occupied = Occupied::Bound(crate::window_matcher::types::WindowId::new("wl-1"));
        slot.set_config(Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600)));
        slot.prefer_connector("DP-1");
        slot
    }

    #[test]
    fn round_trip_clears_occupancy_and_preserves_identity_and_configs() {
        let slot = sample_slot();
        let raw = serialize_slots(&[slot.clone()]).unwrap();
        let restored = deserialize_slots(&raw).unwrap();
        assert_eq!(restored.len(), 1);
        assert!(restored[0].occupied.is_unoccupied());
        assert_eq!(restored[0].identity, slot.identity);
        assert_eq!(restored[0].configs, slot.configs);
        assert_eq!(restored[0].connector_preference, slot.connector_preference);
        assert_eq!(restored[0].seen, slot.seen);
    }

    #[test]
    fn serialized_form_never_carries_the_live_window_identifier() {
        let slot = sample_slot();
        let raw = serialize_slots(&[slot]).unwrap();
        assert!(!raw.contains("wl-1"));
    }

    #[test]
    fn malformed_state_loads_as_empty() {
        assert!(load_or_empty("not json at all").is_empty());
    }

    #[test]
    fn legacy_record_missing_connector_preference_defaults_empty() {
        let raw = r#"[{"wm_class":"Term","title":"shell","configs":[],"seen":0}]"#;
        let slots = deserialize_slots(raw).unwrap();
        assert!(slots[0].connector_preference.is_empty());
    }

    #[test]
    fn notifier_suppresses_during_bulk_restore() {
        let counter = Rc::new(RefCell::new(0));
        let sink = CountingSink(counter.clone());
        let mut notifier = PersistenceNotifier::new(Box::new(sink));

        notifier.while_suppressed(|n| n.notify(&[]));
        assert_eq!(*counter.borrow(), 0);

        notifier.notify(&[]);
        assert_eq!(*counter.borrow(), 1);

        notifier.suppress();
        notifier.notify(&[]);
        assert_eq!(*counter.borrow(), 1);

        notifier.resume();
        notifier.notify(&[]);
        assert_eq!(*counter.borrow(), 2);
    }
}
