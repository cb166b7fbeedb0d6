//! Phase Router Core
//!
//! Foundational traits, error types, outcome store and processing context
//! for the phase router workspace. The resolver and execution engine live in
//! the `phase-router` crate; this crate is everything a phase handler needs
//! to be written against.
//!
//! ## Module Organization
//!
//! - `error` - Error taxonomy (`PhaseError`, `PhaseResult`)
//! - `outcome` - Outcome identity tokens and the write-once store (`OutcomeType`, `OutcomeStore`)
//! - `context` - Per-phase view of the store (`PhaseContext`)
//! - `handler` - Phase handler abstraction (`PhaseHandler`, `PhaseRegistration`, `FnPhase`)

pub mod error;
pub mod outcome;
pub mod context;
pub mod handler;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{PhaseError, PhaseResult};

// ── Outcomes ───────────────────────────────────────────────────────────
pub use outcome::{OutcomeStore, OutcomeType};

// ── Processing Context ─────────────────────────────────────────────────
pub use context::PhaseContext;

// ── Phase Handlers ─────────────────────────────────────────────────────
pub use handler::{FnPhase, PhaseHandler, PhaseRegistration};
