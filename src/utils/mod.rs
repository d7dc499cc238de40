//! Small shared helpers.
//!
//! - [`clock`] - Injectable wall clock

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
