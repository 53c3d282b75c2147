//! Time-based predicates for the PENDING decision policy and the SETTLING
//! drift check (§4.5). Kept free of engine state so each predicate can be
//! unit-tested against bare timestamps and configs.

use novade_core::types::geometry::RectInt;

use super::config::MatcherConfig;
use super::similarity::score;
use super::types::{Config, Identity, LiveWindowDetails, Maximized};

pub fn total_elapsed(now_ms: i64, transition_time: i64) -> i64 {
    now_ms - transition_time
}

pub fn time_idle(now_ms: i64, last_event_time: i64) -> i64 {
    now_ms - last_event_time
}

/// `total_elapsed > SETTLE_MAX_WAIT`, or, for generic titles,
/// `> GENERIC_TITLE_EXTENDED_WAIT`.
pub fn is_timed_out(config: &MatcherConfig, total_elapsed_ms: i64, generic_title: bool) -> bool {
    let bound = if generic_title {
        config.generic_title_extended_wait_ms
    } else {
        config.settle_max_wait_ms
    };
    total_elapsed_ms > bound
}

/// Whether a PENDING window is ready for a match/add-as-new decision, absent
/// the ambiguity and geometry gates (which need sibling PENDING state and are
/// applied by the caller).
pub fn ready_to_decide(
    config: &MatcherConfig,
    generic_title: bool,
    time_idle_ms: i64,
    timed_out: bool,
) -> bool {
    if generic_title {
        timed_out || time_idle_ms > config.settle_idle_timeout_ms
    } else {
        time_idle_ms > config.settle_idle_timeout_ms
            || (timed_out && time_idle_ms > config.min_idle_time_before_match_ms)
    }
}

/// True if `a` and `b` are the same `wm_class` and similar enough to be
/// ambiguous: above `AMBIGUOUS_SIMILARITY_THRESHOLD`, raised to the generic
/// threshold if either title is generic.
pub fn is_ambiguous_pair(a: &Identity, b: &Identity, config: &MatcherConfig) -> bool {
    if a.wm_class != b.wm_class {
        return false;
    }
    let either_generic = Identity::is_generic_title(&a.title, config.min_specific_title_length)
        || Identity::is_generic_title(&b.title, config.min_specific_title_length);
    let threshold = if either_generic {
        config.ambiguous_similarity_threshold_generic
    } else {
        config.ambiguous_similarity_threshold
    };
    score(a, b, config) >= threshold
}

/// §4.5's "confidence" test over a sorted-by-score candidate list: best score
/// minus second-best score, or an exact match, or a timed-out window.
pub fn has_confidence(best_score: f64, second_best_score: Option<f64>, exact_match: bool, timed_out: bool, config: &MatcherConfig) -> bool {
    if exact_match || timed_out {
        return true;
    }
    match second_best_score {
        Some(second) => best_score - second >= config.min_score_spread,
        None => true,
    }
}

/// Drift between live state and the target config after a SETTLING window
/// elapses. Position is compared only for non-BOTH-maximized targets; a
/// monitor-index mismatch alone never counts (indices are unstable across
/// hot-plug); workspace mismatch is ignored when either side is
/// `on_all_workspaces`.
pub fn detect_drift(live: &LiveWindowDetails, target: &Config, target_frame_rect: RectInt, config: &MatcherConfig) -> bool {
    if target.maximized != Maximized::Both {
        let dx = (live.frame_rect.x - target_frame_rect.x).abs();
        let dy = (live.frame_rect.y - target_frame_rect.y).abs();
        if dx > config.position_tolerance_px || dy > config.position_tolerance_px {
            return true;
        }
    }

    if live.workspace != target.workspace && !live.on_all_workspaces && !target.on_all_workspaces {
        return true;
    }

    if live.maximized != target.maximized {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MatcherConfig {
        MatcherConfig::default()
    }

    #[test]
    fn specific_title_decides_once_idle_past_settle_timeout() {
        let c = cfg();
        assert!(!ready_to_decide(&c, false, 400, false));
        assert!(ready_to_decide(&c, false, 600, false));
    }

    #[test]
    fn specific_title_also_decides_once_timed_out_and_past_idle_floor() {
        let c = cfg();
        assert!(!ready_to_decide(&c, false, 200, true));
        assert!(ready_to_decide(&c, false, 350, true));
    }

    #[test]
    fn generic_title_waits_for_timeout_or_idle() {
        let c = cfg();
        assert!(!ready_to_decide(&c, true, 100, false));
        assert!(ready_to_decide(&c, true, 100, true));
        assert!(ready_to_decide(&c, true, 600, false));
    }

    #[test]
    fn timeout_bound_differs_for_generic_titles() {
        let c = cfg();
        assert!(!is_timed_out(&c, 3000, true));
        assert!(is_timed_out(&c, 3000, false));
        assert!(is_timed_out(&c, 16_000, true));
    }

    #[test]
    fn ambiguous_pair_requires_shared_wm_class() {
        let c = cfg();
        let a = Identity::new("Editor", "README.md — Editor main window");
        let b = Identity::new("Term", "README.md — Editor main window");
        assert!(!is_ambiguous_pair(&a, &b, &c));
    }

    #[test]
    fn ambiguous_pair_uses_generic_threshold_when_either_title_is_short() {
        let c = cfg();
        let a = Identity::new("Editor", "Editor");
        let b = Identity::new("Editor", "Editor");
        assert!(is_ambiguous_pair(&a, &b, &c));
    }

    #[test]
    fn confidence_requires_spread_unless_exact_or_timed_out() {
        let c = cfg();
        assert!(!has_confidence(0.9, Some(0.5), false, false, &c));
        assert!(has_confidence(0.9, Some(0.2), false, false, &c));
        assert!(has_confidence(0.81, Some(0.8), true, false, &c));
        assert!(has_confidence(0.81, Some(0.8), false, true, &c));
    }

    fn base_live() -> LiveWindowDetails {
        LiveWindowDetails {
            wm_class: "Term".into(),
            title: "shell".into(),
            workspace: 2,
            monitor: 0,
            frame_rect: RectInt::new(100, 50, 800, 600),
            maximized: Maximized::None,
            minimized: false,
            fullscreen: false,
            on_all_workspaces: false,
            above: false,
        }
    }

    #[test]
    fn drift_detected_when_position_outside_tolerance() {
        let c = cfg();
        let mut live = base_live();
        live.frame_rect = RectInt::new(150, 50, 800, 600);
        let target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        assert!(detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }

    #[test]
    fn drift_ignores_position_within_tolerance() {
        let c = cfg();
        let mut live = base_live();
        live.frame_rect = RectInt::new(105, 50, 800, 600);
        let target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        assert!(!detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }

    #[test]
    fn monitor_mismatch_alone_is_not_drift() {
        let c = cfg();
        let mut live = base_live();
        live.monitor = 3;
        let target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        assert!(!detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }

    #[test]
    fn workspace_mismatch_ignored_when_either_side_is_on_all_workspaces() {
        let c = cfg();
        let mut live = base_live();
        live.workspace = 5;
        live.on_all_workspaces = true;
        let target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        assert!(!detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }

    #[test]
    fn maximized_mismatch_is_drift() {
        let c = cfg();
        let mut live = base_live();
        live.maximized = Maximized::Both;
        let mut target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        target.maximized = Maximized::None;
        assert!(detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }

    #[test]
    fn position_not_checked_for_both_maximized_target() {
        let c = cfg();
        let mut live = base_live();
        live.maximized = Maximized::Both;
        live.frame_rect = RectInt::new(9999, 9999, 800, 600);
        let mut target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        target.maximized = Maximized::Both;
        assert!(!detect_drift(&live, &target, RectInt::new(100, 50, 800, 600), &c));
    }
}
