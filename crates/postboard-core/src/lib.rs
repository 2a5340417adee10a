//! Core postboard library: session cache, authenticated client, session
//! guard and the user flows built on them.

pub mod api;
pub mod config;
pub mod flows;
pub mod guard;
pub mod models;
pub mod session;
pub mod surface;
pub mod validation;

#[cfg(test)]
mod testing;

pub use flows::{App, FlowOutcome};
pub use guard::{GuardState, Rejection, SessionGuard};
