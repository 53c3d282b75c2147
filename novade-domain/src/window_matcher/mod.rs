//! Window State Matcher: observes windows appearing on a multi-monitor
//! desktop and restores them to the position, size, monitor, workspace, and
//! maximization state they previously occupied, while continuously learning
//! placements the user chooses.
//!
//! The engine itself never touches the compositor, it emits [`Operation`]
//! batches for a host-supplied executor and relies on three capability
//! traits ([`Topology`], [`TimerHarness`], [`PersistenceSink`]) for
//! everything it needs from the outside world.

mod capabilities;
mod config;
mod engine;
mod error;
mod events;
mod layout;
mod operation;
mod persistence;
mod planner;
mod policy;
mod similarity;
pub mod testing;
mod timing;
mod types;

pub use capabilities::{AllowAllFilter, PersistenceSink, TimerHandle, TimerHarness, Topology, WindowFilter};
pub use config::MatcherConfig;
pub use engine::{DispatchResult, InboundEventKind, WindowMatcher};
pub use error::WindowMatcherError;
pub use events::EventKind;
pub use layout::ResolvedLayout;
pub use operation::Operation;
pub use persistence::{deserialize_slots, load_or_empty, serialize_slots, PersistenceNotifier, SlotRecord};
pub use planner::{plan, PlanInput};
pub use policy::{resolve as resolve_policy, PolicyAction, PolicyOverrides, PolicyRule, ResolvedPolicy};
pub use similarity::score as similarity_score;
pub use types::{
    Config, Identity, LiveWindowDetails, LiveWindowState, Maximized, Occupied, Phase, Slot, WindowId,
};
