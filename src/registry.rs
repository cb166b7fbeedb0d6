//! Phase Descriptors & Registry
//!
//! A `PhaseDescriptor` is the frozen declaration of one registered handler.
//! The `PhaseRegistry` maps each outcome type to the descriptors able to
//! provide it, in registration order. That order is the priority order the
//! resolver tries alternatives in.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use phase_router_core::{OutcomeType, PhaseHandler, PhaseRegistration, PhaseResult};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// PhaseDescriptor
// ============================================================================

/// Immutable record of a registered phase.
pub struct PhaseDescriptor {
    id: usize,
    name: String,
    handler: Arc<dyn PhaseHandler>,
    consumes: Vec<OutcomeType>,
    provides: Vec<OutcomeType>,
}

impl PhaseDescriptor {
    /// Describe `handler` under registration id `id`.
    ///
    /// Calls `PhaseHandler::declare` exactly once.
    pub fn new(id: usize, handler: Arc<dyn PhaseHandler>) -> PhaseResult<Self> {
        let mut registration = PhaseRegistration::new();
        handler.declare(&mut registration)?;
        let (consumes, provides) = registration.into_parts();
        Ok(Self {
            id,
            name: handler.name().to_string(),
            handler,
            consumes,
            provides,
        })
    }

    /// Registration sequence number, starting at 1.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `name#id`, unique within a registry.
    pub fn label(&self) -> String {
        format!("{}#{}", self.name, self.id)
    }

    pub fn handler(&self) -> &Arc<dyn PhaseHandler> {
        &self.handler
    }

    /// Types required before this phase can run, in declaration order.
    pub fn consumes(&self) -> &[OutcomeType] {
        &self.consumes
    }

    /// Types this phase declares it provides, in declaration order.
    pub fn provides(&self) -> &[OutcomeType] {
        &self.provides
    }

    pub fn summary(&self) -> PhaseSummary {
        PhaseSummary {
            id: self.id,
            name: self.name.clone(),
            consumes: self.consumes.clone(),
            provides: self.provides.clone(),
        }
    }
}

impl fmt::Debug for PhaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("consumes", &self.consumes)
            .field("provides", &self.provides)
            .finish()
    }
}

/// Serializable view of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub id: usize,
    pub name: String,
    pub consumes: Vec<OutcomeType>,
    pub provides: Vec<OutcomeType>,
}

// ============================================================================
// PhaseRegistry
// ============================================================================

/// Registry of phase descriptors indexed by provided outcome type.
#[derive(Debug, Default)]
pub struct PhaseRegistry {
    /// Registration order.
    phases: Vec<Arc<PhaseDescriptor>>,
    providers: HashMap<OutcomeType, Vec<Arc<PhaseDescriptor>>>,
}

impl PhaseRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            providers: HashMap::new(),
        }
    }

    /// Register a handler.
    ///
    /// The new descriptor is appended to the candidate list of every type it
    /// provides. A handler declaring several types shows up under each.
    pub fn register(
        &mut self,
        handler: Arc<dyn PhaseHandler>,
    ) -> PhaseResult<Arc<PhaseDescriptor>> {
        let descriptor = Arc::new(PhaseDescriptor::new(self.phases.len() + 1, handler)?);
        for ty in descriptor.provides() {
            self.providers
                .entry(*ty)
                .or_default()
                .push(Arc::clone(&descriptor));
        }
        tracing::debug!(
            "Registered phase {} (consumes: {}, provides: {})",
            descriptor.label(),
            descriptor.consumes().len(),
            descriptor.provides().len()
        );
        self.phases.push(Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Candidate providers of `ty` in priority order.
    pub fn lookup(&self, ty: OutcomeType) -> Option<&[Arc<PhaseDescriptor>]> {
        self.providers.get(&ty).map(Vec::as_slice)
    }

    /// Look up a descriptor by registration id.
    pub fn get(&self, id: usize) -> Option<&Arc<PhaseDescriptor>> {
        id.checked_sub(1).and_then(|idx| self.phases.get(idx))
    }

    /// All descriptors in registration order.
    pub fn phases(&self) -> &[Arc<PhaseDescriptor>] {
        &self.phases
    }

    /// Every type with at least one provider, in order of first registration.
    pub fn provided_types(&self) -> Vec<OutcomeType> {
        let mut types: Vec<OutcomeType> = Vec::new();
        for ty in self.phases.iter().flat_map(|p| p.provides()) {
            if !types.contains(ty) {
                types.push(*ty);
            }
        }
        types
    }

    /// Number of registered phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase definitions as JSON values in registration order.
    pub fn definitions(&self) -> Vec<Value> {
        self.phases
            .iter()
            .map(|phase| {
                serde_json::json!({
                    "id": phase.id(),
                    "name": phase.name(),
                    "consumes": phase.consumes(),
                    "provides": phase.provides(),
                })
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
