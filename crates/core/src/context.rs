//! Phase Processing Context
//!
//! `PhaseContext` is the view a phase handler gets while it runs. It is
//! scoped to the store of the current `consume` call: outcomes provided by
//! earlier phases of the chain (and pre-seeded values) can be consumed, and
//! new outcomes can be provided for the phases that follow.
//!
//! Consuming is a plain store lookup. It never triggers another resolution;
//! the chain is arranged so that declared inputs are present before a phase
//! runs.

use std::any::Any;
use std::sync::Arc;

use crate::error::{PhaseError, PhaseResult};
use crate::outcome::{OutcomeStore, OutcomeType};

/// Context handed to `PhaseHandler::process`.
pub struct PhaseContext<'a> {
    store: &'a mut OutcomeStore,
    phase_id: usize,
    phase_name: &'a str,
}

impl<'a> PhaseContext<'a> {
    /// Create a context over `store` for the phase being processed.
    pub fn new(store: &'a mut OutcomeStore, phase_id: usize, phase_name: &'a str) -> Self {
        Self {
            store,
            phase_id,
            phase_name,
        }
    }

    /// Registration id of the running phase.
    pub fn phase_id(&self) -> usize {
        self.phase_id
    }

    /// Display name of the running phase.
    pub fn phase_name(&self) -> &str {
        self.phase_name
    }

    /// Provide an outcome for the phases that follow.
    ///
    /// Returns `Err(PhaseError::DuplicateOutcome)` if the type was already
    /// provided in this resolution.
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) -> PhaseResult<()> {
        self.store.insert(value)
    }

    /// Provide an already shared outcome.
    pub fn provide_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> PhaseResult<()> {
        self.store.insert_shared(value)
    }

    /// Borrow an outcome of a previously processed phase.
    pub fn consume<T: Any>(&self) -> PhaseResult<&T> {
        self.store
            .get::<T>()
            .ok_or_else(|| PhaseError::OutcomeNotProduced(OutcomeType::of::<T>()))
    }

    /// Get a shared handle to an outcome of a previously processed phase.
    pub fn consume_shared<T: Any + Send + Sync>(&self) -> PhaseResult<Arc<T>> {
        self.store
            .get_shared::<T>()
            .ok_or_else(|| PhaseError::OutcomeNotProduced(OutcomeType::of::<T>()))
    }

    /// Check whether an outcome of type `T` is available.
    pub fn is_available<T: Any>(&self) -> bool {
        self.store.contains_type::<T>()
    }

    /// Check whether an outcome of the given type is available.
    pub fn is_type_available(&self, ty: OutcomeType) -> bool {
        self.store.contains(ty)
    }
}
