//! Router Configuration & Builders
//!
//! Each builder follows the standard Rust builder pattern:
//! 1. Create with `::new()` or `::default()`
//! 2. Chain `.field(value)` calls
//! 3. Call `.build()` which validates and returns `PhaseResult<_>`
//!
//! `PhaseRouterBuilder` is also the registration surface: handlers are
//! added (and declare their types) here, and `build()` freezes the registry
//! into a `PhaseRouter`.

use std::sync::Arc;

use phase_router_core::{PhaseError, PhaseHandler, PhaseResult};
use serde::{Deserialize, Serialize};

use crate::registry::PhaseRegistry;
use crate::router::PhaseRouter;

// ============================================================================
// RouterConfig
// ============================================================================

/// Router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    /// Verify after each phase that it provided every type it declared.
    pub check_outcomes: bool,
    /// Optional cap on nested provider placement during resolution.
    /// Unbounded when `None`; the search never revisits a phase on its
    /// active path, so depth never exceeds the number of registered phases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chain_depth: Option<usize>,
}

impl RouterConfig {
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::new()
    }

    /// Check field constraints.
    pub fn validate(&self) -> PhaseResult<()> {
        if self.max_chain_depth == Some(0) {
            return Err(PhaseError::validation("max_chain_depth must be > 0"));
        }
        Ok(())
    }
}

// ============================================================================
// RouterConfigBuilder
// ============================================================================

/// Builder for router configuration with validation at build time.
///
/// # Example
/// ```ignore
/// let config = RouterConfigBuilder::new()
///     .check_outcomes(true)
///     .max_chain_depth(64)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct RouterConfigBuilder {
    check_outcomes: Option<bool>,
    max_chain_depth: Option<usize>,
}

impl RouterConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable post-phase outcome checking.
    pub fn check_outcomes(mut self, enabled: bool) -> Self {
        self.check_outcomes = Some(enabled);
        self
    }

    /// Cap the resolution depth (must be > 0). Branches deeper than this
    /// fail like dead ends.
    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = Some(depth);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> PhaseResult<RouterConfig> {
        let defaults = RouterConfig::default();
        let config = RouterConfig {
            check_outcomes: self.check_outcomes.unwrap_or(defaults.check_outcomes),
            max_chain_depth: self.max_chain_depth.or(defaults.max_chain_depth),
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// PhaseRouterBuilder
// ============================================================================

/// Collects phase handlers and builds a `PhaseRouter`.
///
/// # Example
/// ```ignore
/// let router = PhaseRouterBuilder::new()
///     .add_phase(ReadSource)?
///     .add_phase(Tokenize)?
///     .check_outcomes(true)
///     .build()?;
/// let tokens: Tokens = router.consume()?;
/// ```
#[derive(Debug, Default)]
pub struct PhaseRouterBuilder {
    registry: PhaseRegistry,
    config: RouterConfig,
}

impl PhaseRouterBuilder {
    /// Create a builder with no phases and the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a phase handler. Its `declare` runs immediately.
    pub fn add_phase<H: PhaseHandler + 'static>(self, handler: H) -> PhaseResult<Self> {
        self.add_shared_phase(Arc::new(handler))
    }

    /// Register an already shared phase handler.
    pub fn add_shared_phase(mut self, handler: Arc<dyn PhaseHandler>) -> PhaseResult<Self> {
        self.registry.register(handler)?;
        Ok(self)
    }

    /// Enable or disable post-phase outcome checking.
    pub fn check_outcomes(mut self, enabled: bool) -> Self {
        self.config.check_outcomes = enabled;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of phases added so far.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Freeze the registry into a router.
    pub fn build(self) -> PhaseResult<PhaseRouter> {
        self.config.validate()?;
        tracing::info!(
            "Phase router built: {} phase(s), {} outcome type(s), check_outcomes={}",
            self.registry.len(),
            self.registry.provided_types().len(),
            self.config.check_outcomes
        );
        Ok(PhaseRouter::new(self.registry, self.config))
    }
}

// ============================================================================
// Tests
// ============================================================================
