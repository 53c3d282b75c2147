//! Operation Planner: diffs live state against a target config and emits an
//! ordered operation list honoring compositor ordering constraints.
//!
//! Ordering discipline (§4.4):
//! 1. `MoveToMonitor` precedes `MoveToWorkspace` (workspaces exist per
//!    monitor in the target topology).
//! 2. `Maximize`/`Unmaximize` for tiled targets precede `Place`, since the
//!    compositor's maximize overrides position.
//! 3. `Place` is skipped entirely when the target is BOTH-maximized, or when
//!    the live window's current geometry is invalid.
//! 4. A second pass inserts `Unmaximize` preconditions ahead of any
//!    geometry-moving or re-maximizing operation, simulating the window's
//!    "effective maximized" state across the list so redundant unmaximize
//!    calls are not emitted.

use novade_core::types::geometry::RectInt;

use super::operation::Operation;
use super::policy::ResolvedPolicy;
use super::types::{Config, LiveWindowDetails, Maximized};

pub const PROP_MONITOR: &str = "monitor";
pub const PROP_WORKSPACE: &str = "workspace";
pub const PROP_POSITION: &str = "position";
pub const PROP_MAXIMIZED: &str = "maximized";
pub const PROP_MINIMIZED: &str = "minimized";
pub const PROP_FULLSCREEN: &str = "fullscreen";
pub const PROP_ON_ALL_WORKSPACES: &str = "on_all_workspaces";
pub const PROP_ABOVE: &str = "above";

/// Everything the planner needs to reconcile one window against one target.
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub live: &'a LiveWindowDetails,
    pub target: &'a Config,
    pub target_frame_rect: RectInt,
    pub target_monitor_index: i32,
    pub policy: &'a ResolvedPolicy,
    /// True for monitor hot-plug reconciliation and drift correction: every
    /// applicable field emits an operation regardless of equality with live
    /// state.
    pub force: bool,
}

pub fn plan(input: &PlanInput<'_>) -> Vec<Operation> {
    if input.policy.action == super::policy::PolicyAction::Ignore {
        return Vec::new();
    }

    let mut ops = Vec::new();
    let live = input.live;
    let target = input.target;
    let policy = input.policy;

    if policy.allows(PROP_MONITOR) && (input.force || live.monitor != input.target_monitor_index) {
        ops.push(Operation::MoveToMonitor(input.target_monitor_index));
    }

    if policy.allows(PROP_WORKSPACE) && (input.force || live.workspace != target.workspace) {
        ops.push(Operation::MoveToWorkspace(target.workspace));
    }

    if policy.allows(PROP_MAXIMIZED) && (input.force || live.maximized != target.maximized) {
        match target.maximized {
            Maximized::None => ops.push(Operation::Unmaximize),
            tiled_or_both => {
                if input.force && tiled_or_both.is_tiled() {
                    ops.push(Operation::Unmaximize);
                }
                ops.push(Operation::Maximize(tiled_or_both));
            }
        }
    }

    if policy.allows(PROP_POSITION) && target.maximized != Maximized::Both {
        let valid = live.has_valid_geometry();
        if valid && (input.force || live.frame_rect != input.target_frame_rect) {
            let r = input.target_frame_rect;
            ops.push(Operation::Place(r.x, r.y, r.width, r.height));
        }
    }

    if policy.allows(PROP_MINIMIZED) && target.minimized && (input.force || !live.minimized) {
        ops.push(Operation::Minimize);
    }

    if policy.allows(PROP_FULLSCREEN) && (input.force || live.fullscreen != target.fullscreen) {
        ops.push(Operation::SetFullscreen(target.fullscreen));
    }

    if policy.allows(PROP_ON_ALL_WORKSPACES) && (input.force || live.on_all_workspaces != target.on_all_workspaces) {
        ops.push(Operation::SetOnAllWorkspaces(target.on_all_workspaces));
    }

    if policy.allows(PROP_ABOVE) && (input.force || live.above != target.above) {
        ops.push(Operation::SetAbove(target.above));
    }

    insert_unmaximize_preconditions(ops, live.maximized)
}

/// Simulates the window's "effective maximized" state as operations are
/// applied in order, inserting `Unmaximize` exactly where the compositor
/// requires it and nowhere it would be redundant.
fn insert_unmaximize_preconditions(ops: Vec<Operation>, live_maximized: Maximized) -> Vec<Operation> {
    let mut effective = live_maximized;
    let mut result = Vec::with_capacity(ops.len() + 2);

    for op in ops {
        match op {
            Operation::MoveToMonitor(_) | Operation::Move(_, _) => {
                if !effective.is_none() {
                    result.push(Operation::Unmaximize);
                    effective = Maximized::None;
                }
                result.push(op);
            }
            Operation::Place(..) => {
                if effective == Maximized::Both {
                    result.push(Operation::Unmaximize);
                    effective = Maximized::None;
                }
                result.push(op);
            }
            Operation::Maximize(new_flags) => {
                if !effective.is_none() && effective != new_flags {
                    result.push(Operation::Unmaximize);
                }
                effective = new_flags;
                result.push(op);
            }
            Operation::Unmaximize => {
                effective = Maximized::None;
                result.push(op);
            }
            other => result.push(other),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_matcher::policy::PolicyAction;

    fn restore_policy() -> ResolvedPolicy {
        ResolvedPolicy {
            action: PolicyAction::Restore,
            threshold: 0.8,
            allowed_properties: None,
        }
    }

    fn sample_live() -> LiveWindowDetails {
        LiveWindowDetails {
            wm_class: "Term".into(),
            title: "shell".into(),
            workspace: 0,
            monitor: 0,
            frame_rect: RectInt::new(0, 0, 400, 300),
            maximized: Maximized::None,
            minimized: false,
            fullscreen: false,
            on_all_workspaces: false,
            above: false,
        }
    }

    #[test]
    fn idempotence_when_state_already_matches_target_and_not_forced() {
        let live = sample_live();
        let target = Config::new("DP-1", 0, RectInt::new(0, 0, 400, 300));
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: live.frame_rect,
            target_monitor_index: live.monitor,
            policy: &policy,
            force: false,
        };
        assert!(plan(&input).is_empty());
    }

    #[test]
    fn monitor_precedes_workspace_in_emitted_order() {
        let live = sample_live();
        let mut target = Config::new("HDMI-1", 2, RectInt::new(100, 50, 800, 600));
        target.workspace = 2;
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(100, 50, 800, 600),
            target_monitor_index: 1,
            policy: &policy,
            force: false,
        };
        let ops = plan(&input);
        let monitor_idx = ops.iter().position(|o| matches!(o, Operation::MoveToMonitor(_)));
        let workspace_idx = ops.iter().position(|o| matches!(o, Operation::MoveToWorkspace(_)));
        assert!(monitor_idx.is_some() && workspace_idx.is_some());
        assert!(monitor_idx.unwrap() < workspace_idx.unwrap());
    }

    #[test]
    fn s1_exact_reopen_plans_workspace_move_then_place() {
        // S1 from the matcher's end-to-end scenarios.
        let mut live = sample_live();
        live.workspace = 0;
        live.monitor = 0;
        live.frame_rect = RectInt::new(0, 0, 400, 300);
        let target = Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600));
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(100, 50, 800, 600),
            target_monitor_index: 0,
            policy: &policy,
            force: false,
        };
        let ops = plan(&input);
        assert_eq!(
            ops,
            vec![Operation::MoveToWorkspace(2), Operation::Place(100, 50, 800, 600)]
        );
    }

    #[test]
    fn tiled_target_places_maximize_before_place_and_drops_place_for_both() {
        let live = sample_live();
        let mut target = Config::new("DP-1", 0, RectInt::new(0, 0, 960, 1080));
        target.maximized = Maximized::Horizontal;
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(0, 0, 960, 1080),
            target_monitor_index: 0,
            policy: &policy,
            force: false,
        };
        let ops = plan(&input);
        let max_idx = ops.iter().position(|o| matches!(o, Operation::Maximize(_))).unwrap();
        let place_idx = ops.iter().position(|o| matches!(o, Operation::Place(..))).unwrap();
        assert!(max_idx < place_idx);

        let mut both_target = target.clone();
        both_target.maximized = Maximized::Both;
        let both_input = PlanInput {
            target: &both_target,
            ..input
        };
        let both_ops = plan(&both_input);
        assert!(!both_ops.iter().any(|o| matches!(o, Operation::Place(..))));
    }

    #[test]
    fn place_skipped_when_live_geometry_invalid() {
        let mut live = sample_live();
        live.frame_rect = RectInt::new(0, 0, 0, 0);
        let target = Config::new("DP-1", 0, RectInt::new(10, 10, 400, 300));
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(10, 10, 400, 300),
            target_monitor_index: 0,
            policy: &policy,
            force: false,
        };
        assert!(!plan(&input).iter().any(|o| matches!(o, Operation::Place(..))));
    }

    #[test]
    fn forced_tiled_replan_prepends_explicit_unmaximize() {
        let mut live = sample_live();
        live.maximized = Maximized::Horizontal;
        let mut target = Config::new("DP-1", 0, RectInt::new(0, 0, 960, 1080));
        target.maximized = Maximized::Horizontal;
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(0, 0, 960, 1080),
            target_monitor_index: 0,
            policy: &policy,
            force: true,
        };
        let ops = plan(&input);
        assert_eq!(ops[0], Operation::Unmaximize);
        assert!(ops.contains(&Operation::Maximize(Maximized::Horizontal)));
    }

    #[test]
    fn maximize_with_different_flags_gets_unmaximize_precondition() {
        let mut live = sample_live();
        live.maximized = Maximized::Both;
        let mut target = Config::new("DP-1", 0, RectInt::new(0, 0, 960, 1080));
        target.maximized = Maximized::Horizontal;
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(0, 0, 960, 1080),
            target_monitor_index: 0,
            policy: &policy,
            force: false,
        };
        let ops = plan(&input);
        let unmax_idx = ops.iter().position(|o| matches!(o, Operation::Unmaximize)).unwrap();
        let max_idx = ops.iter().position(|o| matches!(o, Operation::Maximize(_))).unwrap();
        assert!(unmax_idx < max_idx);
    }

    #[test]
    fn moving_a_maximized_window_to_another_monitor_unmaximizes_first() {
        let mut live = sample_live();
        live.maximized = Maximized::Both;
        live.monitor = 0;
        let target = Config::new("HDMI-1", 0, RectInt::new(0, 0, 1920, 1080));
        let policy = restore_policy();
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(0, 0, 1920, 1080),
            target_monitor_index: 1,
            policy: &policy,
            force: true,
        };
        let ops = plan(&input);
        assert_eq!(ops[0], Operation::Unmaximize);
        let monitor_idx = ops.iter().position(|o| matches!(o, Operation::MoveToMonitor(_))).unwrap();
        assert_eq!(monitor_idx, 1);
    }

    #[test]
    fn ignore_action_emits_nothing_regardless_of_diff() {
        let live = sample_live();
        let target = Config::new("HDMI-1", 5, RectInt::new(500, 500, 200, 200));
        let policy = ResolvedPolicy {
            action: PolicyAction::Ignore,
            threshold: 0.8,
            allowed_properties: None,
        };
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(500, 500, 200, 200),
            target_monitor_index: 9,
            policy: &policy,
            force: true,
        };
        assert!(plan(&input).is_empty());
    }

    #[test]
    fn allowed_properties_gate_individual_operations() {
        let live = sample_live();
        let mut target = Config::new("HDMI-1", 3, RectInt::new(10, 10, 400, 300));
        target.workspace = 3;
        let policy = ResolvedPolicy {
            action: PolicyAction::Restore,
            threshold: 0.8,
            allowed_properties: Some(vec![PROP_WORKSPACE.to_string()]),
        };
        let input = PlanInput {
            live: &live,
            target: &target,
            target_frame_rect: RectInt::new(10, 10, 400, 300),
            target_monitor_index: 1,
            policy: &policy,
            force: true,
        };
        let ops = plan(&input);
        assert_eq!(ops, vec![Operation::MoveToWorkspace(3)]);
    }
}
