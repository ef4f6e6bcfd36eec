//! Timed random events.
//!
//! At most one event is active at a time. The [`EventEngine`] owns it, the
//! schedule for the next one, and the activity list used to pick mark targets.
//! Combat asks the engine for multipliers and reports hits back to it.

mod activity;
mod engine;
mod kind;
mod timer;

pub use activity::ActivityTracker;
pub use engine::{
    ActiveEvent, EventEngine, FIRST_EVENT_PHASE, MARK_FALLBACK_LIMIT, MarkProgress, TotemHit,
};
pub use kind::{EndReason, EventKind, EventMeta, MarkState, TotemState};
pub use timer::Timer;
