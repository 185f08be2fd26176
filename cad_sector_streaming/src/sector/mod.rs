/// Sector data model - identifiers, collection types, parsed geometry and bounds

pub mod bounds;
pub mod collection_type;
pub mod geometry;

pub use bounds::*;
pub use collection_type::*;
pub use geometry::*;

use std::fmt;
use std::sync::Arc;

/// Identifier of a spatial partition of a model at one detail level
pub type SectorId = u32;

/// Stable identifier of one selectable/stylable object within a model
pub type TreeIndex = u32;

/// Opaque identifier of a streamed model
///
/// Backed by a shared string so clones are a reference count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelIdentifier(Arc<str>);

impl ModelIdentifier {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Geometry builders for tests
#[cfg(test)]
pub mod mock_geometry;
