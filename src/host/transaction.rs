//! Scoped transaction guard.
//!
//! A [`Transaction`] borrows the document mutably for its whole lifetime.
//! It is released exactly once: by [`Transaction::commit`], by
//! [`Transaction::rollback`], or by `Drop`, which rolls back a transaction
//! that has started but not ended.

use tracing::{debug, warn};

use super::{HostDocument, HostResult};

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Open; changes are pending.
    Started,
    /// Changes were committed.
    Committed,
    /// Changes were discarded.
    RolledBack,
}

/// A transaction open on a host document.
pub struct Transaction<'a, D: HostDocument + ?Sized> {
    doc: &'a mut D,
    name: String,
    status: TransactionStatus,
}

impl<'a, D: HostDocument + ?Sized> Transaction<'a, D> {
    /// Starts a named transaction on `doc`.
    ///
    /// # Errors
    ///
    /// Returns the host error if the transaction cannot be opened.
    pub fn start(doc: &'a mut D, name: impl Into<String>) -> HostResult<Self> {
        let name = name.into();
        doc.start_transaction(&name)?;
        debug!(transaction = %name, "Transaction started");
        Ok(Self {
            doc,
            name,
            status: TransactionStatus::Started,
        })
    }

    /// Transaction name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Whether the transaction has been committed or rolled back.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.status != TransactionStatus::Started
    }

    /// Mutable access to the document for changes inside the transaction.
    pub fn document(&mut self) -> &mut D {
        &mut *self.doc
    }

    /// Commits the pending changes.
    ///
    /// If the host rejects the commit, the transaction is rolled back on drop
    /// and the commit error is returned.
    ///
    /// # Errors
    ///
    /// Returns the host error if the commit fails.
    pub fn commit(mut self) -> HostResult<()> {
        self.doc.commit_transaction()?;
        self.status = TransactionStatus::Committed;
        debug!(transaction = %self.name, "Transaction committed");
        Ok(())
    }

    /// Discards the pending changes.
    ///
    /// # Errors
    ///
    /// Returns the host error if the rollback fails.
    pub fn rollback(mut self) -> HostResult<()> {
        self.status = TransactionStatus::RolledBack;
        self.doc.rollback_transaction()?;
        debug!(transaction = %self.name, "Transaction rolled back");
        Ok(())
    }
}

impl<D: HostDocument + ?Sized> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if self.has_ended() {
            return;
        }
        self.status = TransactionStatus::RolledBack;
        match self.doc.rollback_transaction() {
            Ok(()) => debug!(transaction = %self.name, "Transaction rolled back on drop"),
            Err(e) => warn!(transaction = %self.name, error = %e, "Rollback failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Point3D};
    use crate::host::{ElementClass, HostError, MemoryDocument, WallPlacement};

    fn placement(doc: &MemoryDocument) -> WallPlacement {
        let level = doc.collect(ElementClass::Level).remove(0);
        let wall_type = doc.collect(ElementClass::WallType).remove(0);
        WallPlacement {
            line: Line::create_bound(Point3D::new(0.0, 0.0, 0.0), Point3D::new(10.0, 0.0, 0.0))
                .unwrap(),
            wall_type_id: wall_type.id,
            level_id: level.id,
            height: 3000.0,
            base_offset: 0.0,
            flip: false,
            structural: false,
        }
    }

    fn document() -> MemoryDocument {
        MemoryDocument::new("Test")
            .with_level("Level 1")
            .with_wall_type("Generic - 200mm")
    }

    #[test]
    fn commit_keeps_changes() {
        let mut doc = document();
        let wall = placement(&doc);

        let mut tx = Transaction::start(&mut doc, "Create").unwrap();
        assert_eq!(tx.status(), TransactionStatus::Started);
        assert!(!tx.has_ended());
        tx.document().create_wall(&wall).unwrap();
        tx.commit().unwrap();

        assert_eq!(doc.walls().len(), 1);
        assert!(!doc.has_open_transaction());
    }

    #[test]
    fn explicit_rollback_discards_changes() {
        let mut doc = document();
        let wall = placement(&doc);

        let mut tx = Transaction::start(&mut doc, "Create").unwrap();
        tx.document().create_wall(&wall).unwrap();
        tx.rollback().unwrap();

        assert!(doc.walls().is_empty());
        assert!(!doc.has_open_transaction());
    }

    #[test]
    fn drop_rolls_back_unended_transaction() {
        let mut doc = document();
        let wall = placement(&doc);

        {
            let mut tx = Transaction::start(&mut doc, "Create").unwrap();
            assert_eq!(tx.name(), "Create");
            tx.document().create_wall(&wall).unwrap();
        }

        assert!(doc.walls().is_empty());
        assert!(!doc.has_open_transaction());
    }

    #[test]
    fn start_fails_while_another_is_open() {
        let mut doc = document();
        doc.start_transaction("Outer").unwrap();

        let err = Transaction::start(&mut doc, "Inner").err().unwrap();
        assert_eq!(
            err,
            HostError::TransactionAlreadyOpen {
                active: "Outer".to_string()
            }
        );
    }
}
