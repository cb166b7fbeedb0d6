//! Phase Handler Trait
//!
//! Defines the contract between the router and the phases it runs:
//!
//! - `PhaseHandler` - declares consumed/provided outcome types once at
//!   registration and processes a context once per chain it appears in
//! - `PhaseRegistration` - the callback a handler declares its types on
//! - `FnPhase` - closure-backed handler for inline phases

use std::any::Any;
use std::fmt;

use crate::context::PhaseContext;
use crate::error::PhaseResult;
use crate::outcome::OutcomeType;

// ============================================================================
// Trait Definitions
// ============================================================================

/// A unit of work that consumes some outcome types and provides others.
pub trait PhaseHandler: Send + Sync {
    /// Display name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Invoked once when the handler is added to a router builder.
    ///
    /// Registers the consumed and provided outcome types. The declaration is
    /// fixed from then on.
    fn declare(&self, registration: &mut PhaseRegistration) -> PhaseResult<()>;

    /// Invoked by the router to process the phase.
    ///
    /// Every consumed type is available in `ctx` by the time this runs.
    fn process(&self, ctx: &mut PhaseContext<'_>) -> PhaseResult<()>;
}

// ============================================================================
// PhaseRegistration
// ============================================================================

/// Declaration of a phase's consumed and provided outcome types.
///
/// Order is preserved: consumed types are satisfied in declaration order
/// during resolution.
#[derive(Debug, Clone, Default)]
pub struct PhaseRegistration {
    consumes: Vec<OutcomeType>,
    provides: Vec<OutcomeType>,
}

impl PhaseRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that the phase requires an outcome of type `T`.
    pub fn consumes<T: Any>(&mut self) -> &mut Self {
        self.consumes_type(OutcomeType::of::<T>())
    }

    /// Declare that the phase provides an outcome of type `T`.
    pub fn provides<T: Any>(&mut self) -> &mut Self {
        self.provides_type(OutcomeType::of::<T>())
    }

    pub fn consumes_type(&mut self, ty: OutcomeType) -> &mut Self {
        self.consumes.push(ty);
        self
    }

    pub fn provides_type(&mut self, ty: OutcomeType) -> &mut Self {
        self.provides.push(ty);
        self
    }

    /// Consumed types in declaration order.
    pub fn consumed_types(&self) -> &[OutcomeType] {
        &self.consumes
    }

    /// Provided types in declaration order.
    pub fn provided_types(&self) -> &[OutcomeType] {
        &self.provides
    }

    /// Split into `(consumes, provides)`.
    pub fn into_parts(self) -> (Vec<OutcomeType>, Vec<OutcomeType>) {
        (self.consumes, self.provides)
    }
}

// ============================================================================
// FnPhase
// ============================================================================

/// Phase handler backed by a closure.
///
/// # Example
/// ```ignore
/// let phase = FnPhase::new("checksum", |ctx| {
///     let len = ctx.consume::<Source>()?.0.len() as u64;
///     ctx.provide(Checksum(len))
/// })
/// .consumes::<Source>()
/// .provides::<Checksum>();
/// ```
pub struct FnPhase<P> {
    name: String,
    registration: PhaseRegistration,
    process: P,
}

impl<P> FnPhase<P> {
    /// Create a phase with no declared types.
    pub fn new(name: impl Into<String>, process: P) -> Self
    where
        P: Fn(&mut PhaseContext<'_>) -> PhaseResult<()> + Send + Sync,
    {
        Self {
            name: name.into(),
            registration: PhaseRegistration::new(),
            process,
        }
    }

    /// Declare a consumed type.
    pub fn consumes<T: Any>(mut self) -> Self {
        self.registration.consumes::<T>();
        self
    }

    /// Declare a provided type.
    pub fn provides<T: Any>(mut self) -> Self {
        self.registration.provides::<T>();
        self
    }
}

impl<P> PhaseHandler for FnPhase<P>
where
    P: Fn(&mut PhaseContext<'_>) -> PhaseResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn declare(&self, registration: &mut PhaseRegistration) -> PhaseResult<()> {
        for ty in self.registration.consumed_types() {
            registration.consumes_type(*ty);
        }
        for ty in self.registration.provided_types() {
            registration.provides_type(*ty);
        }
        Ok(())
    }

    fn process(&self, ctx: &mut PhaseContext<'_>) -> PhaseResult<()> {
        (self.process)(ctx)
    }
}

impl<P> fmt::Debug for FnPhase<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPhase")
            .field("name", &self.name)
            .field("registration", &self.registration)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
