//! Matcher Dispatcher: the main event entry. Routes each inbound event by a
//! live window's phase, runs the PENDING decision pass, detects
//! title-became-specific migrations and user-initiated monitor moves, and
//! delegates to the Operation Planner (§4.6).

use std::collections::HashMap;

use tracing::{debug, info, warn};

use novade_core::types::geometry::RectInt;

use super::capabilities::{AllowAllFilter, PersistenceSink, TimerHandle, TimerHarness, Topology, WindowFilter};
use super::config::MatcherConfig;
use super::events::EventKind;
use super::layout;
use super::operation::Operation;
use super::persistence::PersistenceNotifier;
use super::planner::{self, PlanInput};
use super::policy::{self, PolicyOverrides};
use super::similarity;
use super::timing;
use super::types::{Config, Identity, LiveWindowDetails, LiveWindowState, Occupied, Phase, Slot, WindowId};

/// Inbound notification kinds from the Event Source (§6). `Destroy` carries
/// no details; every other variant is always paired with a fresh
/// `LiveWindowDetails` snapshot (the core trusts the host's already-
/// normalized events, debounce/coalescing is explicitly out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEventKind {
    WindowCreated,
    InitialQuery,
    NotifyTitle,
    NotifyWmClass,
    NotifyMinimized,
    NotifyAbove,
    NotifyFullscreen,
    NotifyMaximizedHorizontally,
    NotifyMaximizedVertically,
    SizeChanged,
    PositionChanged,
    WorkspaceChanged,
    MonitorsChanged,
    Destroy,
}

/// What the caller must do after an event: run these operations (in order,
/// per window) through the executor, and surface these diagnostic events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResult {
    pub operations: Vec<Operation>,
    pub events: Vec<EventKind>,
}

impl DispatchResult {
    fn merge(mut self, mut other: DispatchResult) -> Self {
        self.operations.append(&mut other.operations);
        self.events.append(&mut other.events);
        self
    }
}

pub struct WindowMatcher<T: Topology, H: TimerHarness> {
    config: MatcherConfig,
    overrides: PolicyOverrides,
    topology: T,
    timers: H,
    persistence: PersistenceNotifier,
    filter: Box<dyn WindowFilter>,
    slots: Vec<Slot>,
    live: HashMap<WindowId, LiveWindowState>,
}

impl<T: Topology, H: TimerHarness> WindowMatcher<T, H> {
    /// `restored_slots` is adopted directly, without routing through the
    /// persistence sink, per §4.7's "suppressed ... during initial restore".
    pub fn new(
        config: MatcherConfig,
        overrides: PolicyOverrides,
        topology: T,
        timers: H,
        sink: Box<dyn PersistenceSink>,
        restored_slots: Vec<Slot>,
    ) -> Self {
        WindowMatcher {
            config,
            overrides,
            topology,
            timers,
            persistence: PersistenceNotifier::new(sink),
            filter: Box::new(AllowAllFilter),
            slots: restored_slots,
            live: HashMap::new(),
        }
    }

    /// Installs an external policy callback (§4.6 step 2) in place of the
    /// default [`AllowAllFilter`].
    pub fn with_filter(mut self, filter: Box<dyn WindowFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn phase_of(&self, winid: &WindowId) -> Option<Phase> {
        self.live.get(winid).map(|s| s.phase)
    }

    /// Cancels every outstanding settle timer and drops all per-window
    /// state. Per §5's cancellation rule, in-flight executor completions
    /// that arrive after this call find no state and are ignored.
    pub fn teardown(&mut self) {
        let WindowMatcher { live, timers, .. } = self;
        for state in live.values() {
            if let Some(handle) = state.settle_timer {
                timers.cancel(TimerHandle(handle));
            }
        }
        live.clear();
    }

    /// Main entry point (§4.6).
    pub fn on_event(&mut self, winid: &WindowId, event: InboundEventKind, details: Option<LiveWindowDetails>, now_ms: i64) -> DispatchResult {
        if event == InboundEventKind::Destroy {
            return self.handle_destroy(winid);
        }

        let details = match details {
            Some(d) => d,
            None => {
                warn!(%winid, "non-destroy event carried no details, dropping");
                return DispatchResult::default();
            }
        };

        if !self.filter.should_track(&details) {
            debug!(%winid, "external policy callback filtered window out, dropping event");
            return DispatchResult::default();
        }

        if event == InboundEventKind::MonitorsChanged {
            if let Some(result) = self.handle_monitors_changed(winid, &details, now_ms) {
                return result;
            }
        }

        if details.wm_class.is_empty() || !details.has_valid_geometry() {
            debug!(%winid, "window not trackable yet, dropping event");
            return DispatchResult::default();
        }

        let slot_idx = self.live.get(winid).and_then(|s| s.slot);
        match slot_idx {
            Some(idx) => self.handle_bound_window(winid, idx, details, now_ms),
            None => self.handle_unbound_window(winid, details, now_ms),
        }
    }

    fn handle_destroy(&mut self, winid: &WindowId) -> DispatchResult {
        self.unbind(winid);
        self.live.remove(winid);
        DispatchResult {
            operations: Vec::new(),
            events: vec![EventKind::WindowDestroyed(winid.clone())],
        }
    }

    fn unbind(&mut self, winid: &WindowId) -> Option<usize> {
        let idx = self.slots.iter().position(|s| s.occupied.window_id() == Some(winid))?;
        self.slots[idx].occupied = Occupied::Unoccupied;
        Some(idx)
    }

    fn handle_monitors_changed(&mut self, winid: &WindowId, details: &LiveWindowDetails, now_ms: i64) -> Option<DispatchResult> {
        let slot_idx = self.live.get(winid)?.slot?;
        let slot = &self.slots[slot_idx];

        let current_connector = self.topology.connector_for_monitor(details.monitor);
        if current_connector.as_deref() == slot.connector_preference.first().map(String::as_str) {
            return Some(DispatchResult::default());
        }

        let resolved = layout::resolve_layout(slot, &self.topology)?;
        let policy = policy::resolve(&self.overrides, &self.config, &details.wm_class, &details.title);
        let input = PlanInput {
            live: details,
            target: &resolved.config,
            target_frame_rect: resolved.frame_rect,
            target_monitor_index: resolved.monitor_index,
            policy: &policy,
            force: true,
        };
        let ops = planner::plan(&input);
        let mut events = vec![EventKind::WindowMonitorRelocated(winid.clone())];

        if let Some(state) = self.live.get_mut(winid) {
            state.details = Some(details.clone());
            state.last_event_time = now_ms;
            if !ops.is_empty() {
                state.phase = Phase::Restoring;
                state.transition_time = now_ms;
                state.target_config = Some(resolved.config);
            } else {
                events.clear();
            }
        }

        Some(DispatchResult { operations: ops, events })
    }

    fn handle_bound_window(&mut self, winid: &WindowId, slot_idx: usize, details: LiveWindowDetails, now_ms: i64) -> DispatchResult {
        let old_identity = self.slots[slot_idx].identity.clone();
        let new_identity = details.identity();

        if self.title_became_specific(&old_identity.title, &new_identity.title) {
            if let Some((target_idx, score)) = self.best_migration_candidate(slot_idx, &new_identity) {
                if score >= self.config.title_migration_threshold {
                    return self.migrate_binding(winid, slot_idx, target_idx, details, now_ms);
                }
            }
        }

        let phase = self.live.get(winid).map(|s| s.phase);
        let mut result = DispatchResult::default();

        if phase == Some(Phase::Tracking) {
            result = result.merge(self.detect_user_monitor_change(winid, slot_idx, &details, now_ms));
        }

        if self.live.get(winid).map(|s| s.phase) == Some(Phase::Tracking) {
            self.update_tracked_config(slot_idx, &details, now_ms);
            result.events.push(EventKind::WindowModified(winid.clone()));
        }

        if let Some(state) = self.live.get_mut(winid) {
            state.details = Some(details);
            state.last_event_time = now_ms;
        }

        result
    }

    fn title_became_specific(&self, old_title: &str, new_title: &str) -> bool {
        if old_title.is_empty() {
            return false;
        }
        new_title.len() as f64 >= self.config.title_change_significance_ratio * old_title.len() as f64
    }

    fn best_migration_candidate(&self, exclude_slot: usize, identity: &Identity) -> Option<(usize, f64)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(idx, s)| *idx != exclude_slot && s.occupied.is_unoccupied())
            .map(|(idx, s)| (idx, similarity::score(&s.identity, identity, &self.config)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
    }

    fn migrate_binding(&mut self, winid: &WindowId, old_idx: usize, new_idx: usize, details: LiveWindowDetails, now_ms: i64) -> DispatchResult {
        let old_was_generic = Identity::is_generic_title(&self.slots[old_idx].identity.title, self.config.min_specific_title_length);
        self.slots[old_idx].occupied = Occupied::Unoccupied;
        self.slots[new_idx].occupied = Occupied::Bound(winid.clone());

        if let Some(state) = self.live.get_mut(winid) {
            state.slot = Some(new_idx);
            state.phase = Phase::Tracking;
            state.details = Some(details);
            state.last_event_time = now_ms;
            state.target_config = None;
        }

        let mut reported_idx = new_idx;
        if old_was_generic {
            self.slots.remove(old_idx);
            self.fixup_slot_index_after_removal(winid, old_idx);
            if new_idx > old_idx {
                reported_idx = new_idx - 1;
            }
        }

        self.persistence.notify(&self.slots);

        DispatchResult {
            operations: Vec::new(),
            events: vec![
                EventKind::WindowTitleBecameSpecific(winid.clone()),
                EventKind::KnownMatch(winid.clone(), reported_idx),
            ],
        }
    }

    /// After removing a slot at `removed_idx`, every live binding pointing
    /// past it shifts down by one.
    fn fixup_slot_index_after_removal(&mut self, _just_migrated: &WindowId, removed_idx: usize) {
        for state in self.live.values_mut() {
            if let Some(idx) = state.slot {
                if idx > removed_idx {
                    state.slot = Some(idx - 1);
                }
            }
        }
    }

    fn detect_user_monitor_change(&mut self, winid: &WindowId, slot_idx: usize, details: &LiveWindowDetails, now_ms: i64) -> DispatchResult {
        let previous_monitor = match self.live.get(winid).and_then(|s| s.details.as_ref()) {
            Some(d) => d.monitor,
            None => return DispatchResult::default(),
        };
        if previous_monitor == details.monitor {
            return DispatchResult::default();
        }

        let previous_still_exists = self.topology.monitor_geometry(previous_monitor).is_some();
        if !previous_still_exists {
            // Shell fallback relocation, not a user action: leave preference alone.
            return DispatchResult::default();
        }

        let new_connector = match self.topology.connector_for_monitor(details.monitor) {
            Some(c) => c,
            None => return DispatchResult::default(),
        };
        self.slots[slot_idx].prefer_connector(&new_connector);

        let mut result = DispatchResult {
            operations: Vec::new(),
            events: vec![EventKind::WindowUserMonitorChange(winid.clone())],
        };

        if let Some(config) = self.slots[slot_idx].config_for(&new_connector).cloned() {
            if let Some(resolved) = layout::resolve_config(&config, &self.topology) {
                let policy = policy::resolve(&self.overrides, &self.config, &details.wm_class, &details.title);
                let input = PlanInput {
                    live: details,
                    target: &resolved.config,
                    target_frame_rect: resolved.frame_rect,
                    target_monitor_index: resolved.monitor_index,
                    policy: &policy,
                    force: false,
                };
                let ops = planner::plan(&input);
                if !ops.is_empty() {
                    if let Some(state) = self.live.get_mut(winid) {
                        state.phase = Phase::Restoring;
                        state.transition_time = now_ms;
                        state.target_config = Some(resolved.config);
                    }
                }
                result.operations = ops;
            }
        }

        result
    }

    fn update_tracked_config(&mut self, slot_idx: usize, details: &LiveWindowDetails, now_ms: i64) {
        let Some(connector) = self.topology.connector_for_monitor(details.monitor) else {
            return;
        };
        let Some(geometry) = self.topology.monitor_geometry(details.monitor) else {
            return;
        };

        let mut config = Config::new(
            &connector,
            details.workspace,
            RectInt::new(
                details.frame_rect.x - geometry.x,
                details.frame_rect.y - geometry.y,
                details.frame_rect.width,
                details.frame_rect.height,
            ),
        );
        config.maximized = details.maximized;
        config.minimized = details.minimized;
        config.fullscreen = details.fullscreen;
        config.on_all_workspaces = details.on_all_workspaces;
        config.above = details.above;

        let slot = &mut self.slots[slot_idx];
        slot.set_config(config);
        slot.identity = details.identity();
        slot.seen = now_ms;

        self.persistence.notify(&self.slots);
    }

    fn handle_unbound_window(&mut self, winid: &WindowId, details: LiveWindowDetails, now_ms: i64) -> DispatchResult {
        let entry = self.live.entry(winid.clone()).or_insert_with(|| LiveWindowState::new_pending(now_ms));
        if let Some(previous) = &entry.details {
            if entry.phase == Phase::Pending && details.title.len() as f64 >= self.config.title_change_significance_ratio * previous.title.len().max(1) as f64 {
                entry.transition_time = now_ms;
            }
        }
        entry.details = Some(details);
        entry.last_event_time = now_ms;

        self.try_decide_pending(winid, now_ms)
    }

    /// Periodic 200ms PENDING-processing tick: re-evaluates every PENDING
    /// window, since idle/timeout thresholds are time-based rather than
    /// event-triggered.
    pub fn on_pending_tick(&mut self, now_ms: i64) -> DispatchResult {
        let pending: Vec<WindowId> = self
            .live
            .iter()
            .filter(|(_, s)| s.phase == Phase::Pending)
            .map(|(id, _)| id.clone())
            .collect();

        let mut result = DispatchResult::default();
        for winid in pending {
            result = result.merge(self.try_decide_pending(&winid, now_ms));
        }
        result
    }

    fn try_decide_pending(&mut self, winid: &WindowId, now_ms: i64) -> DispatchResult {
        let Some(state) = self.live.get(winid) else {
            return DispatchResult::default();
        };
        if state.phase != Phase::Pending {
            return DispatchResult::default();
        }
        let Some(details) = state.details.clone() else {
            return DispatchResult::default();
        };
        if !details.has_valid_geometry() {
            return DispatchResult::default();
        }

        let identity = details.identity();
        let generic = Identity::is_generic_title(&identity.title, self.config.min_specific_title_length);
        let total_elapsed = timing::total_elapsed(now_ms, state.transition_time);
        let time_idle = timing::time_idle(now_ms, state.last_event_time);
        let timed_out = timing::is_timed_out(&self.config, total_elapsed, generic);

        let exact_idx = self
            .slots
            .iter()
            .position(|s| s.occupied.is_unoccupied() && s.identity == identity);

        let mut ready = exact_idx.is_some() || timing::ready_to_decide(&self.config, generic, time_idle, timed_out);

        if ready && exact_idx.is_none() && !timed_out {
            let ambiguous = self.live.values().any(|other| {
                other.phase == Phase::Pending
                    && other.details.as_ref().map(|d| d.identity()) != Some(identity.clone())
                    && other
                        .details
                        .as_ref()
                        .map(|d| timing::is_ambiguous_pair(&identity, &d.identity(), &self.config))
                        .unwrap_or(false)
            });
            if ambiguous {
                ready = false;
            }
        }

        if !ready {
            return DispatchResult {
                operations: Vec::new(),
                events: vec![EventKind::WindowPendingDecision(winid.clone())],
            };
        }

        self.decide_pending(winid, &details, &identity, exact_idx, timed_out, now_ms)
    }

    fn decide_pending(
        &mut self,
        winid: &WindowId,
        details: &LiveWindowDetails,
        identity: &Identity,
        exact_idx: Option<usize>,
        timed_out: bool,
        now_ms: i64,
    ) -> DispatchResult {
        let mut candidates: Vec<(usize, f64, bool)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.occupied.is_unoccupied())
            .map(|(idx, s)| (idx, similarity::score(&s.identity, identity, &self.config), s.identity == *identity))
            .collect();
        candidates.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| b.1.partial_cmp(&a.1).unwrap()));

        let policy = policy::resolve(&self.overrides, &self.config, &identity.wm_class, &identity.title);
        let best = candidates.first().copied();
        let second_score = candidates.get(1).map(|c| c.1);

        let matched_idx = exact_idx.or_else(|| {
            best.and_then(|(idx, score, exact)| {
                let confident = timing::has_confidence(score, second_score, exact, timed_out, &self.config);
                if confident && score >= policy.threshold {
                    Some(idx)
                } else {
                    None
                }
            })
        });

        match matched_idx {
            Some(idx) => self.bind_matched(winid, idx, details, &policy, now_ms),
            None => self.add_as_new(winid, identity, details, now_ms),
        }
    }

    fn bind_matched(&mut self, winid: &WindowId, slot_idx: usize, details: &LiveWindowDetails, policy: &policy::ResolvedPolicy, now_ms: i64) -> DispatchResult {
        self.slots[slot_idx].occupied = Occupied::Bound(winid.clone());

        let resolved = layout::resolve_layout(&self.slots[slot_idx], &self.topology);
        let ops = match &resolved {
            Some(r) => {
                let input = PlanInput {
                    live: details,
                    target: &r.config,
                    target_frame_rect: r.frame_rect,
                    target_monitor_index: r.monitor_index,
                    policy,
                    force: false,
                };
                planner::plan(&input)
            }
            None => Vec::new(),
        };

        if let Some(state) = self.live.get_mut(winid) {
            state.slot = Some(slot_idx);
            state.details = Some(details.clone());
            if !ops.is_empty() {
                state.phase = Phase::Restoring;
                state.transition_time = now_ms;
                state.target_config = resolved.map(|r| r.config);
            } else {
                state.phase = Phase::Tracking;
                state.target_config = None;
            }
        }

        self.persistence.notify(&self.slots);

        DispatchResult {
            operations: ops,
            events: vec![EventKind::KnownMatch(winid.clone(), slot_idx)],
        }
    }

    fn add_as_new(&mut self, winid: &WindowId, identity: &Identity, details: &LiveWindowDetails, now_ms: i64) -> DispatchResult {
        let mut slot = Slot::new(identity.clone(), now_ms);
        slot.occupied = Occupied::Bound(winid.clone());

        if let Some(connector) = self.topology.connector_for_monitor(details.monitor) {
            if let Some(geometry) = self.topology.monitor_geometry(details.monitor) {
                let mut config = Config::new(
                    &connector,
                    details.workspace,
                    RectInt::new(
                        details.frame_rect.x - geometry.x,
                        details.frame_rect.y - geometry.y,
                        details.frame_rect.width,
                        details.frame_rect.height,
                    ),
                );
                config.maximized = details.maximized;
                config.minimized = details.minimized;
                config.fullscreen = details.fullscreen;
                config.on_all_workspaces = details.on_all_workspaces;
                config.above = details.above;
                slot.set_config(config);
                slot.prefer_connector(&connector);
            }
        }

        let new_idx = self.slots.len();
        self.slots.push(slot);

        if let Some(state) = self.live.get_mut(winid) {
            state.slot = Some(new_idx);
            state.phase = Phase::Tracking;
            state.details = Some(details.clone());
            state.target_config = None;
        }

        self.persistence.notify(&self.slots);

        DispatchResult {
            operations: Vec::new(),
            events: vec![EventKind::KnownNew(winid.clone(), new_idx)],
        }
    }

    /// Executor signals completion of the operations emitted for `winid`:
    /// RESTORING -> SETTLING, arming the drift-detection timer.
    pub fn on_operations_complete(&mut self, winid: &WindowId, now_ms: i64) -> Option<TimerHandle> {
        let state = self.live.get_mut(winid)?;
        if state.phase != Phase::Restoring {
            return None;
        }
        state.phase = Phase::Settling;
        state.transition_time = now_ms;
        let handle = self.timers.schedule(self.config.drift_detection_window_ms);
        state.settle_timer = Some(handle.0);
        Some(handle)
    }

    /// Settle timer expiry: drift check against `target_config` (§4.5).
    pub fn on_settle_timer(&mut self, winid: &WindowId, handle: TimerHandle, now_ms: i64) -> DispatchResult {
        let Some(state) = self.live.get(winid) else {
            return DispatchResult::default();
        };
        if state.phase != Phase::Settling || state.settle_timer != Some(handle.0) {
            return DispatchResult::default();
        }
        let (Some(target), Some(details)) = (state.target_config.clone(), state.details.clone()) else {
            return DispatchResult::default();
        };

        let Some(resolved) = layout::resolve_config(&target, &self.topology) else {
            if let Some(state) = self.live.get_mut(winid) {
                state.phase = Phase::Tracking;
                state.settle_timer = None;
                state.target_config = None;
            }
            return DispatchResult::default();
        };

        let drifted = timing::detect_drift(&details, &target, resolved.frame_rect, &self.config);

        if !drifted {
            if let Some(state) = self.live.get_mut(winid) {
                state.phase = Phase::Tracking;
                state.settle_timer = None;
                state.target_config = None;
            }
            return DispatchResult::default();
        }

        let retries = state.drift_retries;
        if retries >= self.config.max_drift_retries {
            info!(%winid, retries, "drift correction cap exceeded, abandoning to tracking");
            if let Some(state) = self.live.get_mut(winid) {
                state.phase = Phase::Tracking;
                state.settle_timer = None;
                state.target_config = None;
            }
            return DispatchResult::default();
        }

        let policy = policy::resolve(&self.overrides, &self.config, &details.wm_class, &details.title);
        let input = PlanInput {
            live: &details,
            target: &target,
            target_frame_rect: resolved.frame_rect,
            target_monitor_index: resolved.monitor_index,
            policy: &policy,
            force: true,
        };
        let ops = planner::plan(&input);

        if let Some(state) = self.live.get_mut(winid) {
            state.drift_retries += 1;
            state.phase = Phase::Restoring;
            state.transition_time = now_ms;
            state.settle_timer = None;
        }

        DispatchResult {
            operations: ops,
            events: vec![EventKind::WindowDriftCorrected(winid.clone())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_matcher::testing::{NullSink, NullTimerHarness, StaticTopology};
    use crate::window_matcher::types::Maximized;
    use novade_core::types::geometry::RectInt;

    fn matcher() -> WindowMatcher<StaticTopology, NullTimerHarness> {
        let topology = StaticTopology::new().with_connector("DP-1", 0, RectInt::new(0, 0, 1920, 1080));
        WindowMatcher::new(
            MatcherConfig::default(),
            PolicyOverrides::default(),
            topology,
            NullTimerHarness::new(),
            Box::new(NullSink::default()),
            Vec::new(),
        )
    }

    fn details(workspace: i32, frame: RectInt) -> LiveWindowDetails {
        LiveWindowDetails {
            wm_class: "Term".into(),
            title: "user@host: ~/project".into(),
            workspace,
            monitor: 0,
            frame_rect: frame,
            maximized: Maximized::None,
            minimized: false,
            fullscreen: false,
            on_all_workspaces: false,
            above: false,
        }
    }

    #[test]
    fn s1_exact_reopen_matches_immediately_and_plans_workspace_then_place() {
        let mut m = matcher();
        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        slot.set_config(Config::new("DP-1", 2, RectInt::new(100, 50, 800, 600)));
        slot.prefer_connector("DP-1");
        m.slots.push(slot);

        let winid = WindowId::new("win-7");
        let result = m.on_event(&winid, InboundEventKind::WindowCreated, Some(details(0, RectInt::new(0, 0, 400, 300))), 0);

        assert_eq!(
            result.operations,
            vec![Operation::MoveToWorkspace(2), Operation::Place(100, 50, 800, 600)]
        );
        assert_eq!(m.phase_of(&winid), Some(Phase::Restoring));
    }

    #[test]
    fn s6_ignored_application_binds_with_empty_operations() {
        let overrides = {
            use std::collections::HashMap;
            let mut map = HashMap::new();
            map.insert(
                "Slack".to_string(),
                vec![policy::PolicyRule {
                    title: None,
                    action: Some(policy::PolicyAction::Ignore),
                    threshold: None,
                    match_properties: None,
                }],
            );
            PolicyOverrides::new(map)
        };
        let mut m = WindowMatcher::new(
            MatcherConfig::default(),
            overrides,
            StaticTopology::new().with_connector("DP-1", 0, RectInt::new(0, 0, 1920, 1080)),
            NullTimerHarness::new(),
            Box::new(NullSink::default()),
            Vec::new(),
        );

        let winid = WindowId::new("slack-1");
        let mut d = details(0, RectInt::new(0, 0, 400, 300));
        d.wm_class = "Slack".into();
        let result = m.on_event(&winid, InboundEventKind::WindowCreated, Some(d), 0);

        assert!(result.operations.is_empty());
        assert_eq!(m.phase_of(&winid), Some(Phase::Tracking));
    }

    #[test]
    fn destroy_unbinds_slot_and_drops_live_state() {
        let mut m = matcher();
        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        let winid = WindowId::new("win-7");
        slot.occupied = Occupied::Bound(winid.clone());
        m.slots.push(slot);
        m.live.insert(winid.clone(), LiveWindowState::new_pending(0));

        let result = m.on_event(&winid, InboundEventKind::Destroy, None, 10);

        assert_eq!(result.events, vec![EventKind::WindowDestroyed(winid.clone())]);
        assert!(m.slots[0].occupied.is_unoccupied());
        assert!(m.phase_of(&winid).is_none());
    }

    #[test]
    fn s5_settle_timer_drift_retries_then_abandons_after_cap() {
        let mut m = matcher();
        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        slot.set_config(Config::new("DP-1", 3, RectInt::new(0, 0, 400, 300)));
        slot.occupied = Occupied::Bound(WindowId::new("win-9"));
        m.slots.push(slot);

        let winid = WindowId::new("win-9");
        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Settling;
        state.slot = Some(0);
        state.settle_timer = Some(0);
        state.target_config = Some(Config::new("DP-1", 3, RectInt::new(0, 0, 400, 300)));
        state.details = Some(details(0, RectInt::new(0, 0, 400, 300)));
        m.live.insert(winid.clone(), state);

        for expected_retries in 1..=3 {
            let result = m.on_settle_timer(&winid, TimerHandle(0), 100);
            assert_eq!(m.live.get(&winid).unwrap().drift_retries, expected_retries);
            assert_eq!(m.phase_of(&winid), Some(Phase::Restoring));
            assert!(!result.operations.is_empty());
            if let Some(state) = m.live.get_mut(&winid) {
                state.phase = Phase::Settling;
                state.settle_timer = Some(0);
            }
        }

        let result = m.on_settle_timer(&winid, TimerHandle(0), 100);
        assert!(result.operations.is_empty());
        assert_eq!(m.phase_of(&winid), Some(Phase::Tracking));
    }

    #[test]
    fn operations_complete_transitions_restoring_to_settling_and_arms_timer() {
        let mut m = matcher();
        let winid = WindowId::new("win-1");
        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Restoring;
        m.live.insert(winid.clone(), state);

        let handle = m.on_operations_complete(&winid, 50);
        assert!(handle.is_some());
        assert_eq!(m.phase_of(&winid), Some(Phase::Settling));
    }

    #[test]
    fn external_policy_filter_drops_events_for_rejected_windows() {
        struct RejectSlack;
        impl WindowFilter for RejectSlack {
            fn should_track(&self, details: &LiveWindowDetails) -> bool {
                details.wm_class != "Slack"
            }
        }

        let mut m = matcher().with_filter(Box::new(RejectSlack));
        let winid = WindowId::new("slack-1");
        let mut d = details(0, RectInt::new(0, 0, 400, 300));
        d.wm_class = "Slack".into();

        let result = m.on_event(&winid, InboundEventKind::WindowCreated, Some(d), 0);

        assert_eq!(result, DispatchResult::default());
        assert!(m.phase_of(&winid).is_none());
    }

    #[test]
    fn teardown_cancels_outstanding_settle_timers_and_drops_live_state() {
        let mut m = matcher();
        let winid = WindowId::new("win-settling");
        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Settling;
        state.settle_timer = Some(7);
        m.live.insert(winid.clone(), state);

        m.teardown();

        assert_eq!(m.timers.cancelled, vec![TimerHandle(7)]);
        assert!(m.phase_of(&winid).is_none());

        // A completion callback arriving after teardown finds no state.
        let handle = m.on_operations_complete(&winid, 10);
        assert!(handle.is_none());
    }

    #[test]
    fn s3_monitor_hotplug_relocates_bound_window_with_force() {
        // Slot remembers both HDMI-1 and eDP-1; only eDP-1 is connected at
        // first, so the window settles there. When HDMI-1 reappears and a
        // monitors-changed event arrives, the preferred connector differs
        // from where the window currently sits, so a forced relocation plan
        // is produced.
        let topology = StaticTopology::new()
            .with_connector("HDMI-1", 0, RectInt::new(0, 0, 1920, 1080))
            .with_connector("eDP-1", 1, RectInt::new(1920, 0, 1280, 720));
        let mut m = WindowMatcher::new(
            MatcherConfig::default(),
            PolicyOverrides::default(),
            topology,
            NullTimerHarness::new(),
            Box::new(NullSink::default()),
            Vec::new(),
        );

        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        slot.set_config(Config::new("HDMI-1", 0, RectInt::new(0, 0, 800, 600)));
        slot.set_config(Config::new("eDP-1", 0, RectInt::new(0, 0, 800, 600)));
        slot.connector_preference = vec!["HDMI-1".to_string(), "eDP-1".to_string()];
        let winid = WindowId::new("win-hotplug");
        slot.occupied = Occupied::Bound(winid.clone());
        m.slots.push(slot);

        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Tracking;
        state.slot = Some(0);
        state.details = Some(details(0, RectInt::new(1920, 0, 800, 600)));
        m.live.insert(winid.clone(), state);

        // HDMI-1 is back; the window is still reported as sitting on eDP-1
        // (monitor index 1), which no longer matches the preference head.
        let mut d = details(0, RectInt::new(1920, 0, 800, 600));
        d.monitor = 1;
        let result = m.on_event(&winid, InboundEventKind::MonitorsChanged, Some(d), 500);

        assert!(result.operations.contains(&Operation::MoveToMonitor(0)));
        assert_eq!(result.events, vec![EventKind::WindowMonitorRelocated(winid.clone())]);
        assert_eq!(m.phase_of(&winid), Some(Phase::Restoring));
    }

    #[test]
    fn s3_monitor_hotplug_is_a_noop_when_already_on_preferred_connector() {
        let topology = StaticTopology::new().with_connector("eDP-1", 1, RectInt::new(1920, 0, 1280, 720));
        let mut m = WindowMatcher::new(
            MatcherConfig::default(),
            PolicyOverrides::default(),
            topology,
            NullTimerHarness::new(),
            Box::new(NullSink::default()),
            Vec::new(),
        );

        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        slot.set_config(Config::new("eDP-1", 0, RectInt::new(0, 0, 800, 600)));
        slot.connector_preference = vec!["eDP-1".to_string()];
        let winid = WindowId::new("win-hotplug-2");
        slot.occupied = Occupied::Bound(winid.clone());
        m.slots.push(slot);

        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Tracking;
        state.slot = Some(0);
        state.details = Some(details(0, RectInt::new(1920, 0, 800, 600)));
        m.live.insert(winid.clone(), state);

        let mut d = details(0, RectInt::new(1920, 0, 800, 600));
        d.monitor = 1;
        let result = m.on_event(&winid, InboundEventKind::MonitorsChanged, Some(d), 500);

        assert!(result.operations.is_empty());
        assert!(result.events.is_empty());
        assert_eq!(m.phase_of(&winid), Some(Phase::Tracking));
    }

    #[test]
    fn s4_user_monitor_change_prepends_new_connector_and_restores_stored_config() {
        let topology = StaticTopology::new()
            .with_connector("DP-1", 0, RectInt::new(0, 0, 1920, 1080))
            .with_connector("HDMI-1", 1, RectInt::new(1920, 0, 1920, 1080));
        let mut m = WindowMatcher::new(
            MatcherConfig::default(),
            PolicyOverrides::default(),
            topology,
            NullTimerHarness::new(),
            Box::new(NullSink::default()),
            Vec::new(),
        );

        let mut slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        slot.set_config(Config::new("DP-1", 0, RectInt::new(0, 0, 800, 600)));
        slot.set_config(Config::new("HDMI-1", 1, RectInt::new(50, 50, 1000, 700)));
        slot.connector_preference = vec!["DP-1".to_string()];
        let winid = WindowId::new("win-dragged");
        slot.occupied = Occupied::Bound(winid.clone());
        m.slots.push(slot);

        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Tracking;
        state.slot = Some(0);
        state.details = Some(details(0, RectInt::new(0, 0, 800, 600)));
        m.live.insert(winid.clone(), state);

        // User drags the window onto monitor 1 (HDMI-1); monitor 0 still
        // exists, so this is a user action, not a shell fallback.
        let mut d = details(0, RectInt::new(1970, 50, 1000, 700));
        d.monitor = 1;
        let result = m.on_event(&winid, InboundEventKind::PositionChanged, Some(d), 1000);

        assert_eq!(m.slots[0].connector_preference, vec!["HDMI-1".to_string(), "DP-1".to_string()]);
        assert!(result.events.contains(&EventKind::WindowUserMonitorChange(winid.clone())));
    }

    #[test]
    fn s2_ambiguous_pending_pair_defers_decision_until_timed_out() {
        // Neither live title exactly matches a remembered slot, so nothing
        // decides on an exact match; both titles are specific (>=15 chars)
        // and differ by a single trailing character, so they are mutually
        // ambiguous per the pairwise PENDING gate.
        let mut m = matcher();
        let mut slot = Slot::new(Identity::new("Editor", "some other window title"), 0);
        slot.set_config(Config::new("DP-1", 0, RectInt::new(0, 0, 400, 300)));
        m.slots.push(slot);

        let win_a = WindowId::new("editor-a");
        let win_b = WindowId::new("editor-b");
        let mut da = details(0, RectInt::new(10, 10, 400, 300));
        da.wm_class = "Editor".into();
        da.title = "README.md — Editor main window".into();
        let mut db = details(0, RectInt::new(20, 20, 400, 300));
        db.wm_class = "Editor".into();
        db.title = "README.md — Editor main windoz".into();

        m.on_event(&win_a, InboundEventKind::WindowCreated, Some(da), 0);
        m.on_event(&win_b, InboundEventKind::WindowCreated, Some(db), 0);
        assert_eq!(m.phase_of(&win_a), Some(Phase::Pending));
        assert_eq!(m.phase_of(&win_b), Some(Phase::Pending));

        // Both windows are idle long enough to decide, but their mutual
        // similarity holds the decision back before the timeout.
        m.on_pending_tick(600);
        assert_eq!(m.phase_of(&win_a), Some(Phase::Pending));
        assert_eq!(m.phase_of(&win_b), Some(Phase::Pending));

        // Past SETTLE_MAX_WAIT the ambiguity gate no longer blocks: both
        // windows get a final decision (add-as-new, since neither scores
        // above threshold against the lone unrelated slot).
        m.on_pending_tick(3_000);
        assert_ne!(m.phase_of(&win_a), Some(Phase::Pending));
        assert_ne!(m.phase_of(&win_b), Some(Phase::Pending));
    }

    #[test]
    fn title_migration_reports_index_after_generic_slot_removal_shifts_it() {
        // Five slots; the bound slot at index 0 has a generic title and is
        // superseded by the migration, so it is removed. The migration
        // target started at index 2, which becomes index 1 once the lower
        // slot is gone. The emitted KnownMatch must carry the post-removal
        // index, not the pre-removal one.
        let mut m = matcher();
        let winid = WindowId::new("win-migrate");

        let mut old_slot = Slot::new(Identity::new("Term", "sh"), 0);
        old_slot.occupied = Occupied::Bound(winid.clone());
        m.slots.push(old_slot);
        m.slots.push(Slot::new(Identity::new("Other", "whatever-1"), 0));

        let mut target_slot = Slot::new(Identity::new("Term", "user@host: ~/project"), 0);
        target_slot.set_config(Config::new("DP-1", 0, RectInt::new(0, 0, 400, 300)));
        m.slots.push(target_slot);
        m.slots.push(Slot::new(Identity::new("Other", "whatever-3"), 0));
        m.slots.push(Slot::new(Identity::new("Other", "whatever-4"), 0));

        let mut state = LiveWindowState::new_pending(0);
        state.phase = Phase::Tracking;
        state.slot = Some(0);
        state.details = Some(details(0, RectInt::new(0, 0, 400, 300)));
        m.live.insert(winid.clone(), state);

        let new_details = details(0, RectInt::new(0, 0, 400, 300));
        let result = m.on_event(&winid, InboundEventKind::NotifyTitle, Some(new_details), 10);

        assert!(result.events.contains(&EventKind::KnownMatch(winid.clone(), 1)));
        assert_eq!(m.slots.len(), 4);
        assert_eq!(m.slots[1].identity, Identity::new("Term", "user@host: ~/project"));
        assert_eq!(m.live.get(&winid).and_then(|s| s.slot), Some(1));
    }
}
