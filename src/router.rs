//! Phase Router
//!
//! Execution engine: resolves the chain for a requested outcome and runs it
//! against a fresh outcome store seeded with the values provided up front.
//!
//! A built router is read-only apart from its seeded values. Resolution
//! state and per-call stores are local to each `consume`, so a router behind
//! an `Arc` can serve `consume` calls from several threads.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use phase_router_core::{OutcomeStore, OutcomeType, PhaseContext, PhaseError, PhaseResult};

use crate::builders::{PhaseRouterBuilder, RouterConfig};
use crate::registry::{PhaseDescriptor, PhaseRegistry};
use crate::resolver::{ChainResolver, PhaseChain};

/// Resolves and runs phase chains to produce requested outcomes.
#[derive(Debug)]
pub struct PhaseRouter {
    registry: PhaseRegistry,
    provided: OutcomeStore,
    config: RouterConfig,
}

impl PhaseRouter {
    pub(crate) fn new(registry: PhaseRegistry, config: RouterConfig) -> Self {
        Self {
            registry,
            provided: OutcomeStore::new(),
            config,
        }
    }

    pub fn builder() -> PhaseRouterBuilder {
        PhaseRouterBuilder::new()
    }

    pub fn registry(&self) -> &PhaseRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Whether phases are checked for the outcomes they declared.
    pub fn checks_outcomes(&self) -> bool {
        self.config.check_outcomes
    }

    /// Whether to check that phases actually provide the outcomes they
    /// declared during registration.
    pub fn set_check_outcomes(&mut self, enabled: bool) {
        self.config.check_outcomes = enabled;
    }

    // ------------------------------------------------------------------------
    // Seeded values
    // ------------------------------------------------------------------------

    /// Provide a value that phases can consume.
    ///
    /// A provided type is never resolved: consuming it returns the value and
    /// phases consuming it get it without a provider being scheduled.
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) -> PhaseResult<()> {
        self.provided.insert(value)
    }

    pub fn provide_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> PhaseResult<()> {
        self.provided.insert_shared(value)
    }

    /// Provide every value of `values`; nothing is added on a conflict.
    pub fn provide_all(&mut self, values: OutcomeStore) -> PhaseResult<()> {
        self.provided.merge(values)
    }

    /// Check whether a value of type `T` was provided. Never resolves.
    pub fn is_available<T: Any>(&self) -> bool {
        self.provided.contains_type::<T>()
    }

    pub fn is_type_available(&self, ty: OutcomeType) -> bool {
        self.provided.contains(ty)
    }

    // ------------------------------------------------------------------------
    // Resolution & execution
    // ------------------------------------------------------------------------

    /// Resolve the chain that would produce `T`, without running it.
    pub fn resolve_chain<T: Any>(&self) -> PhaseResult<PhaseChain> {
        self.resolve_chain_for(OutcomeType::of::<T>())
    }

    /// Resolve the chain that would produce `target`, without running it.
    pub fn resolve_chain_for(&self, target: OutcomeType) -> PhaseResult<PhaseChain> {
        let provided: HashSet<OutcomeType> = self.provided.type_set();
        ChainResolver::new(&self.registry)
            .with_max_depth(self.config.max_chain_depth)
            .resolve(target, &provided)
    }

    /// Consume a value of type `T`, processing the phases needed to produce it.
    pub fn consume<T: Any + Send + Sync + Clone>(&self) -> PhaseResult<T> {
        self.consume_shared::<T>().map(|value| T::clone(&value))
    }

    /// Like `consume`, returning the shared value.
    pub fn consume_shared<T: Any + Send + Sync>(&self) -> PhaseResult<Arc<T>> {
        let target = OutcomeType::of::<T>();
        if let Some(value) = self.provided.get_shared::<T>() {
            tracing::debug!("Outcome {} was provided up front", target.short_name());
            return Ok(value);
        }

        let chain = self.resolve_chain_for(target)?;
        let store = self.execute(&chain)?;
        store
            .get_shared::<T>()
            .ok_or(PhaseError::OutcomeNotProduced(target))
    }

    /// Provide `values`, then consume a value of type `T`.
    pub fn consume_with<T: Any + Send + Sync + Clone>(
        &mut self,
        values: OutcomeStore,
    ) -> PhaseResult<T> {
        self.provide_all(values)?;
        self.consume::<T>()
    }

    /// Run `chain` in order against a copy of the seeded store.
    fn execute(&self, chain: &PhaseChain) -> PhaseResult<OutcomeStore> {
        let mut store = self.provided.clone();
        for phase in chain.phases() {
            self.process_phase(phase, &mut store)?;
        }
        Ok(store)
    }

    fn process_phase(&self, phase: &PhaseDescriptor, store: &mut OutcomeStore) -> PhaseResult<()> {
        tracing::debug!("Processing phase {}", phase.label());
        {
            let mut ctx = PhaseContext::new(store, phase.id(), phase.name());
            phase.handler().process(&mut ctx)?;
        }

        if self.config.check_outcomes {
            let missing: Vec<OutcomeType> = phase
                .provides()
                .iter()
                .copied()
                .filter(|ty| !store.contains(*ty))
                .collect();
            if !missing.is_empty() {
                tracing::warn!(
                    "Phase {} did not provide {} declared outcome(s)",
                    phase.label(),
                    missing.len()
                );
                return Err(PhaseError::UnmetPromise {
                    phase: phase.label(),
                    missing,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
