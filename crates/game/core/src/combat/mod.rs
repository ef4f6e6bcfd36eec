//! Combat building blocks.
//!
//! Pure pieces used by the session when it resolves an action: the action
//! catalogue, cooldown slots, base damage and modifier composition, and the
//! report types handed back to callers. Orchestration lives in
//! [`crate::engine`].

pub mod action;
pub mod cooldown;
pub mod damage;
pub mod result;

pub use action::ActionKind;
pub use cooldown::{CooldownSlot, remaining_ms};
pub use damage::{Modifier, Multiplier, attack_base, charged_base};
pub use result::{ActionEffect, ActionOutcome, ActionReport};
