//! Opaque entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique 128-bit entity identifier.
///
/// An entity has no data of its own; the id is only the correlation key
/// shared by the components it owns. Ids are minted by whoever builds the
/// entity (asset factories, tests, the demo) and passed into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Mint a new random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
