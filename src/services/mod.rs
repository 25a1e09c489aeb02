//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `manifest.rs` — tolerant field extraction from manifest text.
//! - `archive.rs` — bounded manifest lookup inside archives, per-run cache.
//! - `descriptor.rs` — link descriptor facts with id fallbacks.
//! - `license_table.rs` — authoritative license attributes.
//! - `engine.rs` — canonical record store and merge policy.
//! - `audit.rs` — post-pass classification of the canonical table.
//! - `quarantine.rs` — collision-safe archive relocation.
//! - `distribution.rs` — one distribution's scan and attribution outputs.
//! - `run.rs` — whole-run orchestration.
//! - `describe.rs` — link descriptor generation for an archive.
//! - `storage.rs` — table loading, persistence and display copies.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod archive;
pub mod audit;
pub mod describe;
pub mod descriptor;
pub mod distribution;
pub mod engine;
pub mod license_table;
pub mod manifest;
pub mod output;
pub mod quarantine;
pub mod run;
pub mod storage;
