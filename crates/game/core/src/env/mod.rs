//! Collaborators the session consumes but does not own.
//!
//! Randomness and player persistence are injected so the same session logic runs
//! under the async runtime, the offline simulators and the unit tests.
mod rng;
mod store;

pub use rng::{PcgRng, RngSource, SequenceRng};
pub use store::{PlayerStore, StoreError};
