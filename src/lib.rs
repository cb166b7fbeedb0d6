//! Phase Router
//!
//! Pull-based orchestration of processing phases. Each phase declares the
//! outcome types it consumes and provides; asking the router for an outcome
//! resolves the chain of phases needed to produce it and runs that chain.
//!
//! ## Module Organization
//!
//! - `registry` - Phase descriptors and the provider index (`PhaseDescriptor`, `PhaseRegistry`)
//! - `resolver` - Backtracking chain resolution (`ChainResolver`, `PhaseChain`)
//! - `router` - Execution engine (`PhaseRouter`)
//! - `builders` - Router configuration and construction (`RouterConfig`, `PhaseRouterBuilder`)
//!
//! Handler-facing types live in `phase-router-core` and are re-exported here.

pub mod builders;
pub mod registry;
pub mod resolver;
pub mod router;

// ── Core Types ─────────────────────────────────────────────────────────
pub use phase_router_core::{
    FnPhase, OutcomeStore, OutcomeType, PhaseContext, PhaseError, PhaseHandler,
    PhaseRegistration, PhaseResult,
};

// ── Registry & Resolution ──────────────────────────────────────────────
pub use registry::{PhaseDescriptor, PhaseRegistry, PhaseSummary};
pub use resolver::{ChainResolver, PhaseChain};

// ── Router ─────────────────────────────────────────────────────────────
pub use builders::{PhaseRouterBuilder, RouterConfig, RouterConfigBuilder};
pub use router::PhaseRouter;
