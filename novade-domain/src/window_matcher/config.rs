//! Tunable thresholds and timeouts for the matcher, and the default sync
//! action applied when no policy override matches.
//!
//! Mirrors `novade-core::config`'s layered-default approach: a `Default`
//! impl matching the documented defaults, with an optional TOML overlay via
//! [`MatcherConfig::from_toml_str`].

use serde::{Deserialize, Serialize};

use super::error::WindowMatcherError;
use super::policy::PolicyAction;

/// All numeric/enum tunables from the matcher's configuration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub settle_idle_timeout_ms: i64,
    pub settle_max_wait_ms: i64,
    pub min_idle_time_before_match_ms: i64,
    pub generic_title_extended_wait_ms: i64,
    pub workspace_settle_timeout_ms: i64,
    pub operation_settle_delay_ms: i64,
    pub drift_detection_window_ms: i64,
    pub min_score_spread: f64,
    pub ambiguous_similarity_threshold: f64,
    pub ambiguous_similarity_threshold_generic: f64,
    pub specific_match_boost: f64,
    pub min_title_len_for_penalty: usize,
    pub title_len_penalty_ratio: f64,
    pub title_len_penalty_factor: f64,
    pub min_specific_title_length: usize,
    pub title_change_significance_ratio: f64,
    pub title_migration_threshold: f64,
    pub position_tolerance_px: i32,
    pub max_drift_retries: u8,
    pub default_sync_mode: PolicyAction,
    pub default_match_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            settle_idle_timeout_ms: 500,
            settle_max_wait_ms: 2_500,
            min_idle_time_before_match_ms: 300,
            generic_title_extended_wait_ms: 15_000,
            workspace_settle_timeout_ms: 500,
            operation_settle_delay_ms: 200,
            drift_detection_window_ms: 500,
            min_score_spread: 0.6,
            ambiguous_similarity_threshold: 0.95,
            ambiguous_similarity_threshold_generic: 0.99,
            specific_match_boost: 1.1,
            min_title_len_for_penalty: 8,
            title_len_penalty_ratio: 0.5,
            title_len_penalty_factor: 0.5,
            min_specific_title_length: 15,
            title_change_significance_ratio: 2.0,
            title_migration_threshold: 0.95,
            position_tolerance_px: 10,
            max_drift_retries: 3,
            default_sync_mode: PolicyAction::Restore,
            default_match_threshold: 0.8,
        }
    }
}

impl MatcherConfig {
    /// Parses a TOML document overlaying whichever fields it sets on top of
    /// [`MatcherConfig::default`], the same layering `novade-core`'s file
    /// loader applies to its own config tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, WindowMatcherError> {
        toml::from_str(raw).map_err(WindowMatcherError::ConfigParse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let cfg = MatcherConfig::default();
        assert_eq!(cfg.settle_idle_timeout_ms, 500);
        assert_eq!(cfg.settle_max_wait_ms, 2_500);
        assert_eq!(cfg.min_idle_time_before_match_ms, 300);
        assert_eq!(cfg.generic_title_extended_wait_ms, 15_000);
        assert_eq!(cfg.workspace_settle_timeout_ms, 500);
        assert_eq!(cfg.operation_settle_delay_ms, 200);
        assert_eq!(cfg.drift_detection_window_ms, 500);
        assert_eq!(cfg.min_score_spread, 0.6);
        assert_eq!(cfg.ambiguous_similarity_threshold, 0.95);
        assert_eq!(cfg.ambiguous_similarity_threshold_generic, 0.99);
        assert_eq!(cfg.specific_match_boost, 1.1);
        assert_eq!(cfg.min_title_len_for_penalty, 8);
        assert_eq!(cfg.title_len_penalty_ratio, 0.5);
        assert_eq!(cfg.title_len_penalty_factor, 0.5);
        assert_eq!(cfg.min_specific_title_length, 15);
        assert_eq!(cfg.title_change_significance_ratio, 2.0);
        assert_eq!(cfg.title_migration_threshold, 0.95);
        assert_eq!(cfg.position_tolerance_px, 10);
        assert_eq!(cfg.max_drift_retries, 3);
        assert_eq!(cfg.default_sync_mode, PolicyAction::Restore);
        assert_eq!(cfg.default_match_threshold, 0.8);
    }

    #[test]
    fn toml_overlay_overrides_only_named_fields() {
        let cfg = MatcherConfig::from_toml_str("max_drift_retries = 5\ndefault_sync_mode = \"Ignore\"\n")
            .expect("valid overlay");
        assert_eq!(cfg.max_drift_retries, 5);
        assert_eq!(cfg.default_sync_mode, PolicyAction::Ignore);
        assert_eq!(cfg.settle_idle_timeout_ms, 500);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let result = MatcherConfig::from_toml_str("max_drift_retries = [this is not valid");
        assert!(result.is_err());
    }
}
