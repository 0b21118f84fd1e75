use bitcoin::Txid;
use thiserror::Error;

/// Errors raised while assembling or mutating a [`TxTree`](crate::TxTree).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TxTreeError {
    /// No fragment lacks a parent, so there is nothing to root the tree at.
    ///
    /// Also returned for an empty fragment set.
    #[error("tree has no root")]
    MissingRoot,

    /// More than one fragment lacks a parent.
    #[error("tree has {} roots, expected exactly one", .0.len())]
    MultipleRoots(Vec<Txid>),

    /// Two fragments carry the same txid.
    #[error("duplicate fragment for txid {0}")]
    DuplicateTxid(Txid),

    /// A fragment names a parent that is not part of the fragment set.
    #[error("fragment {txid} names unknown parent {parent}")]
    MissingParent {
        /// The child fragment.
        txid: Txid,
        /// The parent it refers to.
        parent: Txid,
    },

    /// Some fragments cannot be reached from the root.
    #[error("{unreachable} fragments are not reachable from root {root}")]
    Disconnected {
        /// The tree root.
        root: Txid,
        /// Number of fragments left over after walking from the root.
        unreachable: usize,
    },

    /// The requested node is not in the tree.
    #[error("txid {0} not found in tree")]
    NotFound(Txid),

    /// The node has no input at the requested index.
    #[error("input {index} out of range for {txid} ({inputs} inputs)")]
    InputOutOfRange {
        /// The node being mutated.
        txid: Txid,
        /// Requested input index.
        index: usize,
        /// Number of inputs the node actually has.
        inputs: usize,
    },

    /// The declared txid does not match the unsigned transaction it carries.
    #[error("fragment declared as {declared} carries transaction {computed}")]
    TxidMismatch {
        /// Txid the fragment was delivered with.
        declared: Txid,
        /// Txid of the fragment's unsigned transaction.
        computed: Txid,
    },

    /// A child does not spend an output of its parent on input 0.
    #[error("fragment {txid} does not spend its parent {parent}")]
    InvalidParentLink {
        /// The child fragment.
        txid: Txid,
        /// The parent it claims.
        parent: Txid,
    },
}
