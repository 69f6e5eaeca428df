//! Error types for host document operations.

use thiserror::Error;

use super::{ElementClass, ElementId};

/// Result type for host document operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised by a host document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A modification was attempted without an open transaction.
    #[error("Attempt to modify the model outside of a transaction")]
    NoOpenTransaction,

    /// A transaction was started while another one is open.
    #[error("Transaction '{active}' is already open")]
    TransactionAlreadyOpen {
        /// Name of the transaction that is still open.
        active: String,
    },

    /// An element id does not refer to an element of the expected class.
    #[error("{class} element {id} does not exist in the document")]
    InvalidElementId {
        /// Class the id was expected to resolve to.
        class: ElementClass,
        /// The id that failed to resolve.
        id: ElementId,
    },

    /// The host refused to create the element.
    #[error("{message}")]
    CreationFailed {
        /// Host-provided reason.
        message: String,
    },
}

impl HostError {
    /// Creates a creation failure.
    pub fn creation_failed(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
        }
    }
}
