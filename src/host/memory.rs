//! In-process host document.
//!
//! [`MemoryDocument`] keeps levels, wall types and committed walls in vectors
//! and stages new walls in the open transaction until commit. Collection
//! order is insertion order.

use serde::Serialize;
use tracing::{debug, info};

use super::{ElementClass, ElementId, HostDocument, HostError, HostResult, NamedElement, WallPlacement};
use crate::geometry::Line;

/// First id handed out by a fresh document.
const FIRST_ELEMENT_ID: i64 = 100_000;

/// A wall stored in a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wall {
    /// Element identity.
    pub id: ElementId,
    /// Location line.
    pub line: Line,
    /// Wall type.
    pub wall_type_id: ElementId,
    /// Base level.
    pub level_id: ElementId,
    /// Unconnected height.
    pub height: f64,
    /// Offset from the base level.
    pub base_offset: f64,
    /// Orientation flipped.
    pub flipped: bool,
    /// Structural wall.
    pub structural: bool,
}

#[derive(Debug)]
struct PendingTransaction {
    name: String,
    walls: Vec<Wall>,
}

/// A host document held entirely in memory.
#[derive(Debug)]
pub struct MemoryDocument {
    title: String,
    levels: Vec<NamedElement>,
    wall_types: Vec<NamedElement>,
    walls: Vec<Wall>,
    pending: Option<PendingTransaction>,
    next_id: i64,
    create_failure: Option<String>,
}

impl MemoryDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            levels: Vec::new(),
            wall_types: Vec::new(),
            walls: Vec::new(),
            pending: None,
            next_id: FIRST_ELEMENT_ID,
            create_failure: None,
        }
    }

    /// Adds a level and returns the document.
    #[must_use]
    pub fn with_level(mut self, name: impl Into<String>) -> Self {
        self.add_level(name);
        self
    }

    /// Adds a wall type and returns the document.
    #[must_use]
    pub fn with_wall_type(mut self, name: impl Into<String>) -> Self {
        self.add_wall_type(name);
        self
    }

    /// Adds a level.
    pub fn add_level(&mut self, name: impl Into<String>) -> ElementId {
        let id = self.allocate_id();
        self.levels.push(NamedElement {
            id,
            name: name.into(),
        });
        id
    }

    /// Adds a wall type.
    pub fn add_wall_type(&mut self, name: impl Into<String>) -> ElementId {
        let id = self.allocate_id();
        self.wall_types.push(NamedElement {
            id,
            name: name.into(),
        });
        id
    }

    /// Makes the next [`HostDocument::create_wall`] call fail with `message`.
    pub fn fail_next_wall_creation(&mut self, message: impl Into<String>) {
        self.create_failure = Some(message.into());
    }

    /// Committed walls, in creation order.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Number of committed elements of every class.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.levels.len() + self.wall_types.len() + self.walls.len()
    }

    /// Whether a transaction is currently open.
    #[must_use]
    pub const fn has_open_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    fn require(&self, class: ElementClass, id: ElementId) -> HostResult<()> {
        let pool = match class {
            ElementClass::Level => &self.levels,
            ElementClass::WallType => &self.wall_types,
        };
        if pool.iter().any(|e| e.id == id) {
            Ok(())
        } else {
            Err(HostError::InvalidElementId { class, id })
        }
    }
}

impl HostDocument for MemoryDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn collect(&self, class: ElementClass) -> Vec<NamedElement> {
        match class {
            ElementClass::Level => self.levels.clone(),
            ElementClass::WallType => self.wall_types.clone(),
        }
    }

    fn start_transaction(&mut self, name: &str) -> HostResult<()> {
        if let Some(active) = &self.pending {
            return Err(HostError::TransactionAlreadyOpen {
                active: active.name.clone(),
            });
        }
        self.pending = Some(PendingTransaction {
            name: name.to_string(),
            walls: Vec::new(),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> HostResult<()> {
        let pending = self.pending.take().ok_or(HostError::NoOpenTransaction)?;
        info!(
            document = %self.title,
            transaction = %pending.name,
            created = pending.walls.len(),
            "Committed transaction"
        );
        self.walls.extend(pending.walls);
        Ok(())
    }

    fn rollback_transaction(&mut self) -> HostResult<()> {
        let pending = self.pending.take().ok_or(HostError::NoOpenTransaction)?;
        debug!(
            document = %self.title,
            transaction = %pending.name,
            discarded = pending.walls.len(),
            "Rolled back transaction"
        );
        Ok(())
    }

    fn create_wall(&mut self, placement: &WallPlacement) -> HostResult<ElementId> {
        if self.pending.is_none() {
            return Err(HostError::NoOpenTransaction);
        }
        if let Some(message) = self.create_failure.take() {
            return Err(HostError::CreationFailed { message });
        }
        self.require(ElementClass::WallType, placement.wall_type_id)?;
        self.require(ElementClass::Level, placement.level_id)?;

        let id = self.allocate_id();
        debug!(
            element_id = %id,
            start = ?placement.line.start(),
            end = ?placement.line.end(),
            "Staging wall"
        );
        let wall = Wall {
            id,
            line: placement.line,
            wall_type_id: placement.wall_type_id,
            level_id: placement.level_id,
            height: placement.height,
            base_offset: placement.base_offset,
            flipped: placement.flip,
            structural: placement.structural,
        };
        if let Some(pending) = self.pending.as_mut() {
            pending.walls.push(wall);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3D;

    fn document() -> MemoryDocument {
        MemoryDocument::new("Project1")
            .with_level("Level 1")
            .with_wall_type("Generic - 200mm")
    }

    fn placement(doc: &MemoryDocument) -> WallPlacement {
        WallPlacement {
            line: Line::create_bound(Point3D::new(0.0, 0.0, 0.0), Point3D::new(10.0, 0.0, 0.0))
                .unwrap(),
            wall_type_id: doc.wall_types[0].id,
            level_id: doc.levels[0].id,
            height: 3000.0,
            base_offset: 0.0,
            flip: false,
            structural: false,
        }
    }

    #[test]
    fn collect_preserves_insertion_order() {
        let doc = MemoryDocument::new("Doc")
            .with_level("B")
            .with_level("A")
            .with_level("C");
        let names: Vec<_> = doc
            .collect(ElementClass::Level)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn create_outside_transaction_fails() {
        let mut doc = document();
        let wall = placement(&doc);
        assert_eq!(doc.create_wall(&wall), Err(HostError::NoOpenTransaction));
    }

    #[test]
    fn walls_visible_only_after_commit() {
        let mut doc = document();
        let wall = placement(&doc);

        doc.start_transaction("Create").unwrap();
        let id = doc.create_wall(&wall).unwrap();
        assert!(doc.walls().is_empty());
        doc.commit_transaction().unwrap();

        assert_eq!(doc.walls().len(), 1);
        assert_eq!(doc.walls()[0].id, id);
        assert!((doc.walls()[0].height - 3000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ids_are_unique_across_rollbacks() {
        let mut doc = document();
        let wall = placement(&doc);

        doc.start_transaction("First").unwrap();
        let discarded = doc.create_wall(&wall).unwrap();
        doc.rollback_transaction().unwrap();

        doc.start_transaction("Second").unwrap();
        let kept = doc.create_wall(&wall).unwrap();
        doc.commit_transaction().unwrap();

        assert_ne!(discarded, kept);
        assert_eq!(doc.walls().len(), 1);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut doc = document();
        let mut wall = placement(&doc);
        wall.level_id = ElementId(1);

        doc.start_transaction("Create").unwrap();
        let err = doc.create_wall(&wall).unwrap_err();
        assert!(matches!(
            err,
            HostError::InvalidElementId {
                class: ElementClass::Level,
                ..
            }
        ));
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut doc = document();
        let wall = placement(&doc);
        doc.fail_next_wall_creation("Could not construct wall");

        doc.start_transaction("Create").unwrap();
        assert_eq!(
            doc.create_wall(&wall),
            Err(HostError::creation_failed("Could not construct wall"))
        );
        assert!(doc.create_wall(&wall).is_ok());
    }

    #[test]
    fn commit_without_transaction_fails() {
        let mut doc = document();
        assert_eq!(doc.commit_transaction(), Err(HostError::NoOpenTransaction));
        assert_eq!(doc.rollback_transaction(), Err(HostError::NoOpenTransaction));
    }

    #[test]
    fn element_count_includes_every_class() {
        let doc = document();
        assert_eq!(doc.element_count(), 2);
        assert_eq!(doc.title(), "Project1");
    }
}
