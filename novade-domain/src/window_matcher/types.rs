//! Core data types for the window state matcher: identities, per-connector
//! configs, remembered slots, and the live observation record for a tracked
//! window.

use std::fmt;

use serde::{Deserialize, Serialize};

use novade_core::types::geometry::RectInt;

/// Opaque identifier for a live window, as handed to us by the host's event
/// source. We never interpret it, only compare and hash it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(raw: impl Into<String>) -> Self {
        WindowId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        WindowId::new(s)
    }
}

impl From<String> for WindowId {
    fn from(s: String) -> Self {
        WindowId::new(s)
    }
}

/// Last-known `{wm_class, title}` pair for a window or slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub wm_class: String,
    pub title: String,
}

impl Identity {
    pub fn new(wm_class: impl Into<String>, title: impl Into<String>) -> Self {
        Identity {
            wm_class: wm_class.into(),
            title: title.into(),
        }
    }

    /// A title is generic iff its length is below `MIN_SPECIFIC_TITLE_LENGTH`.
    pub fn is_generic_title(title: &str, min_specific_title_length: usize) -> bool {
        title.len() < min_specific_title_length
    }
}

/// Maximization state, a bit field in `{NONE, HORIZONTAL, VERTICAL, BOTH}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Maximized {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Maximized {
    pub fn bits(self) -> u8 {
        match self {
            Maximized::None => 0,
            Maximized::Horizontal => 1,
            Maximized::Vertical => 2,
            Maximized::Both => 3,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Maximized::None,
            1 => Maximized::Horizontal,
            2 => Maximized::Vertical,
            _ => Maximized::Both,
        }
    }

    /// Tiled means partially maximized: HORIZONTAL or VERTICAL only.
    pub fn is_tiled(self) -> bool {
        matches!(self, Maximized::Horizontal | Maximized::Vertical)
    }

    pub fn is_none(self) -> bool {
        matches!(self, Maximized::None)
    }
}

/// A per-connector placement record within a remembered slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Stable physical-output identifier, e.g. `"HDMI-1"`.
    pub connector: String,
    pub workspace: i32,
    /// Rectangle relative to the connector's monitor origin.
    pub relative_rect: RectInt,
    pub maximized: Maximized,
    pub minimized: bool,
    pub fullscreen: bool,
    pub on_all_workspaces: bool,
    pub above: bool,
}

impl Config {
    pub fn new(connector: impl Into<String>, workspace: i32, relative_rect: RectInt) -> Self {
        Config {
            connector: connector.into(),
            workspace,
            relative_rect,
            maximized: Maximized::None,
            minimized: false,
            fullscreen: false,
            on_all_workspaces: false,
            above: false,
        }
    }
}

/// Whether a remembered slot is currently bound to a live window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Occupied {
    #[default]
    Unoccupied,
    Bound(WindowId),
}

impl Occupied {
    pub fn window_id(&self) -> Option<&WindowId> {
        match self {
            Occupied::Bound(id) => Some(id),
            Occupied::Unoccupied => None,
        }
    }

    pub fn is_unoccupied(&self) -> bool {
        matches!(self, Occupied::Unoccupied)
    }
}

/// An entry in the flat, ordered list of remembered windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub occupied: Occupied,
    pub identity: Identity,
    pub configs: Vec<Config>,
    /// Connector names, most-recently-chosen first (LIFO). No duplicates.
    pub connector_preference: Vec<String>,
    /// Monotonic millisecond timestamp of the last binding or update.
    pub seen: i64,
}

impl Slot {
    pub fn new(identity: Identity, now_ms: i64) -> Self {
        Slot {
            occupied: Occupied::Unoccupied,
            identity,
            configs: Vec::new(),
            connector_preference: Vec::new(),
            seen: now_ms,
        }
    }

    /// LIFO insert: move `connector` to the front, removing any existing
    /// occurrence. A no-op if it's already at the front.
    pub fn prefer_connector(&mut self, connector: &str) {
        if self.connector_preference.first().map(String::as_str) == Some(connector) {
            return;
        }
        self.connector_preference.retain(|c| c != connector);
        self.connector_preference.insert(0, connector.to_string());
    }

    pub fn config_for(&self, connector: &str) -> Option<&Config> {
        self.configs.iter().find(|c| c.connector == connector)
    }

    pub fn set_config(&mut self, config: Config) {
        if let Some(existing) = self.configs.iter_mut().find(|c| c.connector == config.connector) {
            *existing = config;
        } else {
            self.configs.push(config);
        }
    }
}

/// Last observed state of a live window, as reported by the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveWindowDetails {
    pub wm_class: String,
    pub title: String,
    pub workspace: i32,
    pub monitor: i32,
    pub frame_rect: RectInt,
    pub maximized: Maximized,
    pub minimized: bool,
    pub fullscreen: bool,
    pub on_all_workspaces: bool,
    pub above: bool,
}

impl LiveWindowDetails {
    pub fn identity(&self) -> Identity {
        Identity::new(self.wm_class.clone(), self.title.clone())
    }

    /// Geometry is invalid if either dimension is non-positive.
    pub fn has_valid_geometry(&self) -> bool {
        self.frame_rect.width > 0 && self.frame_rect.height > 0
    }
}

/// Per-window lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    Restoring,
    Settling,
    Tracking,
}

/// Bookkeeping for a single live window, regardless of phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveWindowState {
    pub phase: Phase,
    pub transition_time: i64,
    pub last_event_time: i64,
    /// Handle of the currently-pending settle timer, if any.
    pub settle_timer: Option<u64>,
    /// The config the engine is trying to achieve. Non-null in SETTLING,
    /// null in TRACKING.
    pub target_config: Option<Config>,
    pub details: Option<LiveWindowDetails>,
    /// The slot this window is bound to, once matched. `None` while PENDING.
    pub slot: Option<usize>,
    pub drift_retries: u8,
}

impl LiveWindowState {
    pub fn new_pending(now_ms: i64) -> Self {
        LiveWindowState {
            phase: Phase::Pending,
            transition_time: now_ms,
            last_event_time: now_ms,
            settle_timer: None,
            target_config: None,
            details: None,
            slot: None,
            drift_retries: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_display_roundtrips_raw_string() {
        let id = WindowId::new("wl-surface-42");
        assert_eq!(id.as_str(), "wl-surface-42");
        assert_eq!(format!("{}", id), "wl-surface-42");
    }

    #[test]
    fn maximized_bits_roundtrip() {
        for m in [Maximized::None, Maximized::Horizontal, Maximized::Vertical, Maximized::Both] {
            assert_eq!(Maximized::from_bits(m.bits()), m);
        }
    }

    #[test]
    fn maximized_tiled_classification() {
        assert!(Maximized::Horizontal.is_tiled());
        assert!(Maximized::Vertical.is_tiled());
        assert!(!Maximized::Both.is_tiled());
        assert!(!Maximized::None.is_tiled());
    }

    #[test]
    fn connector_preference_is_lifo_no_duplicates() {
        let mut slot = Slot::new(Identity::new("Term", "shell"), 0);
        slot.prefer_connector("HDMI-1");
        slot.prefer_connector("eDP-1");
        assert_eq!(slot.connector_preference, vec!["eDP-1", "HDMI-1"]);
        slot.prefer_connector("HDMI-1");
        assert_eq!(slot.connector_preference, vec!["HDMI-1", "eDP-1"]);
    }

    #[test]
    fn prefer_connector_already_front_is_noop() {
        let mut slot = Slot::new(Identity::new("Term", "shell"), 0);
        slot.prefer_connector("HDMI-1");
        let before = slot.connector_preference.clone();
        slot.prefer_connector("HDMI-1");
        assert_eq!(slot.connector_preference, before);
    }

    #[test]
    fn generic_title_threshold() {
        assert!(Identity::is_generic_title("Editor", 15));
        assert!(!Identity::is_generic_title("README.md — Editor", 15));
    }

    #[test]
    fn invalid_geometry_detection() {
        let mut details = sample_details();
        details.frame_rect = RectInt::new(0, 0, 0, 600);
        assert!(!details.has_valid_geometry());
        details.frame_rect = RectInt::new(0, 0, 800, 600);
        assert!(details.has_valid_geometry());
    }

    fn sample_details() -> LiveWindowDetails {
        LiveWindowDetails {
            wm_class: "Term".into(),
            title: "shell".into(),
            workspace: 0,
            monitor: 0,
            frame_rect: RectInt::new(0, 0, 800, 600),
            maximized: Maximized::None,
            minimized: false,
            fullscreen: false,
            on_all_workspaces: false,
            above: false,
        }
    }
}
