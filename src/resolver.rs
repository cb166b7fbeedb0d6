//! Phase Chain Resolution
//!
//! Depth-first search with backtracking over the provider graph. For the
//! requested type, candidates are tried in registration order. Placing a
//! candidate first places providers for each of its consumed types, then
//! appends the candidate itself, so the resulting chain is in post-order:
//! every producer precedes its consumers.
//!
//! Search state is local to one `resolve` call:
//! - `on_path` - descriptors on the active DFS path; meeting one again is a cycle
//! - `in_chain` - descriptors already appended; any of them providing a type
//!   satisfies that type for the rest of the search
//!
//! A failed alternative is rolled back by truncating the chain to the length
//! it had before the attempt. Descriptors are never mutated, so one registry
//! can serve any number of concurrent resolutions.

use std::collections::HashSet;
use std::sync::Arc;

use phase_router_core::{OutcomeType, PhaseError, PhaseResult};
use serde::{Serialize, Serializer};

use crate::registry::{PhaseDescriptor, PhaseRegistry, PhaseSummary};

// ============================================================================
// PhaseChain
// ============================================================================

/// Ordered sequence of phases producing a requested outcome.
#[derive(Debug, Clone, Default)]
pub struct PhaseChain {
    phases: Vec<Arc<PhaseDescriptor>>,
}

impl PhaseChain {
    /// Phases in execution order.
    pub fn phases(&self) -> &[Arc<PhaseDescriptor>] {
        &self.phases
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PhaseDescriptor>> {
        self.phases.iter()
    }

    /// Registration ids in execution order.
    pub fn ids(&self) -> Vec<usize> {
        self.phases.iter().map(|p| p.id()).collect()
    }

    /// Phase names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.phases.iter().any(|p| p.id() == id)
    }

    /// Position of the phase with registration id `id`.
    pub fn position(&self, id: usize) -> Option<usize> {
        self.phases.iter().position(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn summaries(&self) -> Vec<PhaseSummary> {
        self.phases.iter().map(|p| p.summary()).collect()
    }
}

impl Serialize for PhaseChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.phases.iter().map(|p| p.summary()))
    }
}

// ============================================================================
// ChainResolver
// ============================================================================

/// Resolves the phase chain needed to produce an outcome type.
#[derive(Debug, Clone, Copy)]
pub struct ChainResolver<'r> {
    registry: &'r PhaseRegistry,
    max_depth: Option<usize>,
}

impl<'r> ChainResolver<'r> {
    pub fn new(registry: &'r PhaseRegistry) -> Self {
        Self {
            registry,
            max_depth: None,
        }
    }

    /// Optional cap on nested provider placement. A branch reaching it fails
    /// like a dead end. Unbounded by default.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve the chain for `target`.
    ///
    /// Types in `already_provided` count as satisfied and get no provider.
    /// Top-level candidates are tried in registration order and the first
    /// one that can be placed wins, the same rule that applies to consumed
    /// types.
    ///
    /// # Errors
    /// - `PhaseError::NoProvider` - nothing is registered for `target`
    /// - `PhaseError::UnresolvableChain` - every candidate hit a cycle, a
    ///   type without providers, or the configured depth cap
    pub fn resolve(
        &self,
        target: OutcomeType,
        already_provided: &HashSet<OutcomeType>,
    ) -> PhaseResult<PhaseChain> {
        let candidates = self
            .registry
            .lookup(target)
            .ok_or(PhaseError::NoProvider(target))?;

        tracing::debug!(
            "Resolving phase chain for {} ({} candidate(s))",
            target.short_name(),
            candidates.len()
        );

        let mut search = Search::new(self.registry, already_provided, self.max_depth);
        for candidate in candidates {
            if search.place(candidate, 0) {
                let chain = PhaseChain {
                    phases: search.chain,
                };
                tracing::debug!(
                    "Resolved phase chain for {}: [{}]",
                    target.short_name(),
                    chain.names().join(", ")
                );
                return Ok(chain);
            }
            search.rollback(0);
        }

        tracing::debug!("No viable phase chain for {}", target.short_name());
        Err(PhaseError::UnresolvableChain(target))
    }
}

// ============================================================================
// Search state
// ============================================================================

struct Search<'a> {
    registry: &'a PhaseRegistry,
    provided: &'a HashSet<OutcomeType>,
    max_depth: Option<usize>,
    chain: Vec<Arc<PhaseDescriptor>>,
    in_chain: HashSet<usize>,
    on_path: HashSet<usize>,
}

impl<'a> Search<'a> {
    fn new(
        registry: &'a PhaseRegistry,
        provided: &'a HashSet<OutcomeType>,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            registry,
            provided,
            max_depth,
            chain: Vec::new(),
            in_chain: HashSet::new(),
            on_path: HashSet::new(),
        }
    }

    /// Place `phase` and everything it needs at the end of the chain.
    ///
    /// On failure the chain may hold entries appended for some of the
    /// phase's consumed types; the caller rolls them back.
    fn place(&mut self, phase: &Arc<PhaseDescriptor>, depth: usize) -> bool {
        if let Some(max) = self.max_depth.filter(|max| depth >= *max) {
            tracing::trace!("Depth limit {} reached at phase {}", max, phase.label());
            return false;
        }
        if !self.on_path.insert(phase.id()) {
            tracing::trace!("Cycle through phase {}", phase.label());
            return false;
        }

        let placed = self.place_inputs(phase, depth);
        self.on_path.remove(&phase.id());

        if placed {
            self.chain.push(Arc::clone(phase));
            self.in_chain.insert(phase.id());
        }
        placed
    }

    fn place_inputs(&mut self, phase: &PhaseDescriptor, depth: usize) -> bool {
        let registry = self.registry;
        for ty in phase.consumes() {
            if self.is_satisfied(*ty) {
                continue;
            }
            let Some(candidates) = registry.lookup(*ty) else {
                tracing::trace!(
                    "Phase {} consumes {} which has no providers",
                    phase.label(),
                    ty.short_name()
                );
                return false;
            };

            let mark = self.chain.len();
            let mut provided = false;
            for candidate in candidates {
                if self.place(candidate, depth + 1) {
                    provided = true;
                    break;
                }
                self.rollback(mark);
            }
            if !provided {
                return false;
            }
        }
        true
    }

    /// Pre-provided, or produced by a phase already in the chain.
    fn is_satisfied(&self, ty: OutcomeType) -> bool {
        if self.provided.contains(&ty) {
            return true;
        }
        self.registry
            .lookup(ty)
            .map(|candidates| candidates.iter().any(|p| self.in_chain.contains(&p.id())))
            .unwrap_or(false)
    }

    fn rollback(&mut self, mark: usize) {
        if self.chain.len() > mark {
            tracing::trace!("Rolling back {} phase(s)", self.chain.len() - mark);
        }
        for phase in self.chain.drain(mark..) {
            self.in_chain.remove(&phase.id());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
