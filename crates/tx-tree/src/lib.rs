//! Transaction trees of a settlement batch.
//!
//! The server streams the VTXO tree and the connector tree one transaction at
//! a time. [`TxTree`] indexes the complete set once it is known and is the
//! single place signatures get attached to tree nodes.

mod errors;
mod fragment;
mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::TxTreeError;
pub use fragment::TreeFragment;
pub use tree::{Iter, TxTree};
