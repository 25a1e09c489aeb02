//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `license.rs` — item identifiers and the license state machine.
//! - `models.rs` — table rows, facts, report/output structs.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem side effects.
//!
//! ## Compatibility note
//! `AttributionEntry`, `CanonicalRow` and `LicenseAttribute` define on-disk
//! JSON consumed by the display front-end. Keep field renames explicit.

pub mod license;
pub mod models;
