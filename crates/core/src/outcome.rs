//! Outcome Types & Outcome Store
//!
//! - `OutcomeType` - identity token for one kind of value phases exchange
//! - `OutcomeStore` - write-once mapping from outcome type to value
//!
//! Outcome types are compared by `TypeId` only. The type name is carried along
//! for logs and error messages and plays no part in equality.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::{PhaseError, PhaseResult};

// ============================================================================
// OutcomeType
// ============================================================================

/// Identity token for a kind of outcome.
///
/// # Examples
/// ```ignore
/// struct Manifest(String);
/// let ty = OutcomeType::of::<Manifest>();
/// assert_eq!(ty, OutcomeType::of::<Manifest>());
/// ```
#[derive(Clone, Copy)]
pub struct OutcomeType {
    id: TypeId,
    name: &'static str,
}

impl OutcomeType {
    /// Token for the Rust type `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Full type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for OutcomeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OutcomeType {}

impl Hash for OutcomeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutcomeType({})", self.name)
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Serialize for OutcomeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

// ============================================================================
// OutcomeStore
// ============================================================================

type OutcomeValue = Arc<dyn Any + Send + Sync>;

/// Write-once store of outcome values keyed by their type.
///
/// Values are reference counted, so cloning a store to seed a new
/// resolution is cheap and never copies the values themselves.
#[derive(Clone, Default)]
pub struct OutcomeStore {
    entries: HashMap<OutcomeType, OutcomeValue>,
}

impl OutcomeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add a value of type `T`.
    ///
    /// Returns `Err(PhaseError::DuplicateOutcome)` if `T` already has a value;
    /// the existing value is kept.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> PhaseResult<()> {
        self.insert_shared(Arc::new(value))
    }

    /// Add an already shared value of type `T`.
    pub fn insert_shared<T: Any + Send + Sync>(&mut self, value: Arc<T>) -> PhaseResult<()> {
        let ty = OutcomeType::of::<T>();
        if self.entries.contains_key(&ty) {
            return Err(PhaseError::DuplicateOutcome(ty));
        }
        tracing::trace!("Outcome provided: {}", ty);
        self.entries.insert(ty, value);
        Ok(())
    }

    /// Builder-style insert, for seeding stores inline.
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> PhaseResult<Self> {
        self.insert(value)?;
        Ok(self)
    }

    /// Borrow the value of type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&OutcomeType::of::<T>())
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    /// Get a shared handle to the value of type `T`.
    pub fn get_shared<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&OutcomeType::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Check if a value for `ty` is present.
    pub fn contains(&self, ty: OutcomeType) -> bool {
        self.entries.contains_key(&ty)
    }

    /// Check if a value of type `T` is present.
    pub fn contains_type<T: Any>(&self) -> bool {
        self.contains(OutcomeType::of::<T>())
    }

    /// Types with a value, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = OutcomeType> + '_ {
        self.entries.keys().copied()
    }

    /// Snapshot of the present types.
    pub fn type_set(&self) -> HashSet<OutcomeType> {
        self.entries.keys().copied().collect()
    }

    /// Move every value of `other` into this store.
    ///
    /// Nothing is moved if any type of `other` is already present here.
    pub fn merge(&mut self, other: OutcomeStore) -> PhaseResult<()> {
        if let Some(dup) = other.entries.keys().find(|ty| self.entries.contains_key(ty)) {
            return Err(PhaseError::DuplicateOutcome(*dup));
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for OutcomeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
