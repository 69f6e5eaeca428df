//! Host document abstraction.
//!
//! The host application (Revit) owns all persistent state. This module models
//! the small slice of its object model that wall creation touches:
//!
//! - Element collections filtered by class (levels, wall types)
//! - A single active transaction per document
//! - The line-based wall creation call
//!
//! [`HostDocument`] is passed explicitly into the route handlers, so one
//! process can serve any number of documents. [`MemoryDocument`] is an
//! in-process implementation used by the standalone `host` command and the
//! test suite.

pub mod error;
pub mod memory;
pub mod transaction;

pub use error::{HostError, HostResult};
pub use memory::{MemoryDocument, Wall};
pub use transaction::{Transaction, TransactionStatus};

use serde::{Deserialize, Serialize};

use crate::geometry::Line;

/// Opaque element identity within a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    /// Returns the integer value of this id.
    #[must_use]
    pub const fn integer_value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element classes that can be collected from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementClass {
    /// Building levels.
    Level,
    /// Wall types.
    WallType,
}

impl std::fmt::Display for ElementClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level => write!(f, "Level"),
            Self::WallType => write!(f, "WallType"),
        }
    }
}

/// A named element returned by a collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedElement {
    /// Element identity.
    pub id: ElementId,
    /// Display name.
    pub name: String,
}

/// Everything needed to place one line-based wall.
#[derive(Debug, Clone, PartialEq)]
pub struct WallPlacement {
    /// Location line.
    pub line: Line,
    /// Wall type to instantiate.
    pub wall_type_id: ElementId,
    /// Base level.
    pub level_id: ElementId,
    /// Unconnected height in document units.
    pub height: f64,
    /// Offset from the base level.
    pub base_offset: f64,
    /// Flip the wall's orientation.
    pub flip: bool,
    /// Create as a structural wall.
    pub structural: bool,
}

/// A host document that can create walls.
///
/// Mutating calls must happen between [`start_transaction`] and
/// [`commit_transaction`]/[`rollback_transaction`]. Prefer driving those
/// through a [`Transaction`] guard.
///
/// [`start_transaction`]: HostDocument::start_transaction
/// [`commit_transaction`]: HostDocument::commit_transaction
/// [`rollback_transaction`]: HostDocument::rollback_transaction
pub trait HostDocument: Send {
    /// Document title.
    fn title(&self) -> &str;

    /// Collects all elements of `class`, in the host's native order.
    fn collect(&self, class: ElementClass) -> Vec<NamedElement>;

    /// Opens a named transaction.
    ///
    /// # Errors
    ///
    /// Fails if a transaction is already open.
    fn start_transaction(&mut self, name: &str) -> HostResult<()>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Fails if no transaction is open or the host rejects the changes.
    fn commit_transaction(&mut self) -> HostResult<()>;

    /// Discards the open transaction.
    ///
    /// # Errors
    ///
    /// Fails if no transaction is open.
    fn rollback_transaction(&mut self) -> HostResult<()>;

    /// Creates a wall inside the open transaction.
    ///
    /// # Errors
    ///
    /// Fails if no transaction is open, an id does not resolve, or the host
    /// refuses the placement.
    fn create_wall(&mut self, placement: &WallPlacement) -> HostResult<ElementId>;
}

/// Finds the first element of `class` whose name equals `name` exactly.
///
/// Linear scan; on duplicate names the first in collection order wins.
pub fn find_by_name<D: HostDocument + ?Sized>(
    doc: &D,
    class: ElementClass,
    name: &str,
) -> Option<NamedElement> {
    doc.collect(class).into_iter().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_name_is_case_sensitive() {
        let doc = MemoryDocument::new("Test").with_level("Ebene 0");
        assert!(find_by_name(&doc, ElementClass::Level, "Ebene 0").is_some());
        assert!(find_by_name(&doc, ElementClass::Level, "ebene 0").is_none());
    }

    #[test]
    fn find_by_name_first_match_wins() {
        let doc = MemoryDocument::new("Test")
            .with_wall_type("Generic - 200mm")
            .with_wall_type("Generic - 200mm");
        let all = doc.collect(ElementClass::WallType);
        assert_eq!(all.len(), 2);

        let found = find_by_name(&doc, ElementClass::WallType, "Generic - 200mm").unwrap();
        assert_eq!(found.id, all[0].id);
    }

    #[test]
    fn find_by_name_scopes_to_class() {
        let doc = MemoryDocument::new("Test").with_level("Shared");
        assert!(find_by_name(&doc, ElementClass::WallType, "Shared").is_none());
    }

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId(42).to_string(), "42");
        assert_eq!(ElementId(42).integer_value(), 42);
        assert_eq!(ElementClass::WallType.to_string(), "WallType");
    }
}
