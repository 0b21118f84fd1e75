use ark_batch_types::TreeKind;
use ark_tx_tree::TxTreeError;
use bitcoin::Txid;
use thiserror::Error;

/// Reasons a settlement session ends without a commitment txid.
///
/// None of these can be resumed from. Recovering means joining a new round
/// with a fresh event stream.
#[derive(Debug, Error)]
pub enum BatchSessionError {
    /// The cancel signal was observed between two events.
    #[error("canceled")]
    Canceled,

    /// The server failed the batch and no observer chose to keep waiting.
    #[error("{reason}")]
    ProtocolFailure { round_id: String, reason: String },

    /// A tree signature or finalization arrived but the VTXO tree was never
    /// built.
    #[error("vtxo tree not initialized")]
    VtxoTreeNotInitialized,

    /// The buffered fragments of a tree do not form a valid tree.
    #[error("malformed {kind} tree: {source}")]
    MalformedTree {
        kind: TreeKind,
        #[source]
        source: TxTreeError,
    },

    /// A tree signature could not be attached to its node.
    #[error("failed to apply tree signature for {txid}: {source}")]
    TreeSignature {
        txid: Txid,
        #[source]
        source: TxTreeError,
    },

    /// A tree signature could not be decoded.
    #[error("invalid tree signature for {txid}: {reason}")]
    InvalidSignature { txid: Txid, reason: String },

    /// The event source ended before the batch was finalized.
    #[error("event stream closed")]
    StreamClosed,

    /// A handler callback failed.
    #[error("handler: {0}")]
    Handler(String),
}

/// Coarse classification of a [`BatchSessionError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Stopped on request, a new round may be joined right away.
    Canceled,
    /// The server reported the batch as failed.
    ProtocolFailure,
    /// Client and server disagree about the round's trees.
    StructuralFailure,
    /// The transport went away.
    StreamClosed,
    /// The caller's handler failed.
    Handler,
}

impl BatchSessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BatchSessionError::Canceled => ErrorKind::Canceled,
            BatchSessionError::ProtocolFailure { .. } => ErrorKind::ProtocolFailure,
            BatchSessionError::VtxoTreeNotInitialized
            | BatchSessionError::MalformedTree { .. }
            | BatchSessionError::TreeSignature { .. }
            | BatchSessionError::InvalidSignature { .. } => ErrorKind::StructuralFailure,
            BatchSessionError::StreamClosed => ErrorKind::StreamClosed,
            BatchSessionError::Handler(_) => ErrorKind::Handler,
        }
    }

    /// Returns true if the error points at a client/server desync rather
    /// than an ordinary failure.
    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::StructuralFailure
    }
}

impl From<eyre::Error> for BatchSessionError {
    fn from(e: eyre::Error) -> Self {
        BatchSessionError::Handler(e.to_string())
    }
}

pub(crate) type Result<T> = std::result::Result<T, BatchSessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_failure_message_is_reason() {
        let err = BatchSessionError::ProtocolFailure {
            round_id: "round".to_owned(),
            reason: "intent expired".to_owned(),
        };
        assert_eq!(err.to_string(), "intent expired");
        assert_eq!(err.kind(), ErrorKind::ProtocolFailure);
        assert!(!err.is_structural());
    }

    #[test]
    fn test_structural_kinds() {
        assert!(BatchSessionError::VtxoTreeNotInitialized.is_structural());
        assert_eq!(
            BatchSessionError::VtxoTreeNotInitialized.to_string(),
            "vtxo tree not initialized"
        );

        let malformed = BatchSessionError::MalformedTree {
            kind: TreeKind::Connector,
            source: TxTreeError::MissingRoot,
        };
        assert!(malformed.is_structural());
        assert_eq!(malformed.to_string(), "malformed connector tree: tree has no root");
    }

    #[test]
    fn test_handler_error_from_eyre() {
        let err = BatchSessionError::from(eyre::eyre!("signer offline"));
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.to_string(), "handler: signer offline");
        assert_eq!(BatchSessionError::StreamClosed.to_string(), "event stream closed");
    }
}
