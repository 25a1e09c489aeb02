//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `check.rs` — check/audit runs over the distributions.
//! - `describe.rs` — link descriptor generation.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod check;
pub mod describe;

pub use check::handle_run_commands;
pub use describe::handle_describe_commands;
