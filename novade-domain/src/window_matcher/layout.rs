//! Layout Resolver: picks the best applicable per-connector config for a
//! slot given the current monitor topology, and converts its relative
//! rectangle into an absolute one.

use novade_core::types::geometry::RectInt;

use super::capabilities::Topology;
use super::types::{Config, Slot};

/// A config resolved against the current topology: the chosen config, its
/// rectangle converted to absolute screen coordinates, and the monitor index
/// it currently lives on.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub config: Config,
    pub frame_rect: RectInt,
    pub monitor_index: i32,
}

/// Resolves a slot's best-applicable config against `topology`.
///
/// 1. Walk `connector_preference` in order; take the first connector that is
///    both currently available and has a config.
/// 2. Otherwise fall back to the first config whose connector is available.
/// 3. Returns `None` if nothing is applicable.
pub fn resolve_layout(slot: &Slot, topology: &dyn Topology) -> Option<ResolvedLayout> {
    let available = topology.available_connectors();

    for connector in &slot.connector_preference {
        if available.iter().any(|a| a == connector) {
            if let Some(config) = slot.config_for(connector) {
                if let Some(resolved) = resolve_config(config, topology) {
                    return Some(resolved);
                }
            }
        }
    }

    for config in &slot.configs {
        if available.iter().any(|a| a == &config.connector) {
            if let Some(resolved) = resolve_config(config, topology) {
                return Some(resolved);
            }
        }
    }

    None
}

/// Resolves a single config directly against the topology, skipping the
/// connector-preference walk. Used by drift correction, which reuses the
/// `target_config` captured at RESTORING entry instead of re-running the
/// full Layout Resolver.
pub(crate) fn resolve_config(config: &Config, topology: &dyn Topology) -> Option<ResolvedLayout> {
    let monitor_index = topology.monitor_for_connector(&config.connector)?;
    let geometry = topology.monitor_geometry(monitor_index)?;
    let frame_rect = RectInt::new(
        geometry.x + config.relative_rect.x,
        geometry.y + config.relative_rect.y,
        config.relative_rect.width,
        config.relative_rect.height,
    );
    Some(ResolvedLayout {
        config: config.clone(),
        frame_rect,
        monitor_index,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::StaticTopology;
    use super::*;
    use crate::window_matcher::types::Identity;

    fn slot_with(configs: Vec<Config>, preference: Vec<&str>) -> Slot {
        let mut slot = Slot::new(Identity::new("Term", "shell"), 0);
        slot.configs = configs;
        slot.connector_preference = preference.into_iter().map(String::from).collect();
        slot
    }

    #[test]
    fn prefers_first_available_connector_in_preference_order() {
        let topology = StaticTopology::new()
            .with_connector("HDMI-1", 0, RectInt::new(0, 0, 1920, 1080))
            .with_connector("eDP-1", 1, RectInt::new(1920, 0, 1280, 720));

        let configs = vec![
            Config::new("HDMI-1", 0, RectInt::new(10, 10, 400, 300)),
            Config::new("eDP-1", 0, RectInt::new(20, 20, 400, 300)),
        ];
        let slot = slot_with(configs, vec!["eDP-1", "HDMI-1"]);

        let resolved = resolve_layout(&slot, &topology).unwrap();
        assert_eq!(resolved.config.connector, "eDP-1");
        assert_eq!(resolved.monitor_index, 1);
        assert_eq!(resolved.frame_rect, RectInt::new(1940, 20, 400, 300));
    }

    #[test]
    fn falls_back_to_any_available_config_when_preference_list_is_stale() {
        let topology = StaticTopology::new().with_connector("eDP-1", 0, RectInt::new(0, 0, 1280, 720));
        let configs = vec![
            Config::new("HDMI-1", 0, RectInt::new(0, 0, 400, 300)),
            Config::new("eDP-1", 0, RectInt::new(5, 5, 400, 300)),
        ];
        let slot = slot_with(configs, vec!["HDMI-1"]);

        let resolved = resolve_layout(&slot, &topology).unwrap();
        assert_eq!(resolved.config.connector, "eDP-1");
        assert_eq!(resolved.frame_rect, RectInt::new(5, 5, 400, 300));
    }

    #[test]
    fn returns_none_when_no_config_connector_is_available() {
        let topology = StaticTopology::new().with_connector("DP-2", 0, RectInt::new(0, 0, 1920, 1080));
        let configs = vec![Config::new("HDMI-1", 0, RectInt::new(0, 0, 400, 300))];
        let slot = slot_with(configs, vec!["HDMI-1"]);

        assert!(resolve_layout(&slot, &topology).is_none());
    }
}
