//! Event plumbing between DOM listeners and the async form loops.
//!
//! - **[`Relay`]** carries events from listeners (`change`, `input`,
//!   `pageshow`, timers) to the task that owns the form.
//! - **[`Actor`]** owns one piece of observable state and the task that
//!   mutates it; views bind to its signal.
//!
//! Relays follow the `{source}_{event}_relay` naming pattern.

pub mod actor;
pub mod relay;

pub use actor::Actor;
pub use relay::{Relay, relay};
