//! Messages the server pushes during a settlement round.

use std::{collections::BTreeMap, fmt};

use ark_tx_tree::TreeFragment;
use bitcoin::{secp256k1::PublicKey, Psbt, Txid};
use musig2::PubNonce;

use crate::TreeKind;

/// The server announced a new batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchStartedEvent {
    pub id: String,
    /// Hashes of the intents the server included in this batch.
    pub intent_id_hashes: Vec<String>,
    /// Relative expiry of the batch outputs.
    pub batch_expiry: u64,
}

/// One transaction of the VTXO or connector tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeTxEvent {
    pub id: String,
    /// Raw wire index, see [`TreeTxEvent::tree_kind`].
    pub batch_index: u8,
    pub fragment: TreeFragment,
}

impl TreeTxEvent {
    /// The tree the fragment belongs to, `None` for an unknown index.
    pub fn tree_kind(&self) -> Option<TreeKind> {
        TreeKind::try_from(self.batch_index).ok()
    }
}

/// The VTXO tree is complete and cosigners should start signing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSigningStartedEvent {
    pub id: String,
    pub cosigner_pubkeys: Vec<PublicKey>,
    pub unsigned_commitment_tx: Psbt,
}

/// Public nonces of the cosigners for one tree transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNoncesEvent {
    pub id: String,
    pub txid: Txid,
    pub nonces: BTreeMap<PublicKey, PubNonce>,
}

/// Aggregated key-path signature for one tree transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSignatureEvent {
    pub id: String,
    pub batch_index: u8,
    pub txid: Txid,
    /// Hex encoded 64-byte BIP340 signature.
    pub signature: String,
}

impl TreeSignatureEvent {
    /// The tree the signature belongs to, `None` for an unknown index.
    pub fn tree_kind(&self) -> Option<TreeKind> {
        TreeKind::try_from(self.batch_index).ok()
    }
}

/// Trees are signed, forfeits must now be submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFinalizationEvent {
    pub id: String,
    pub commitment_tx: Psbt,
}

/// The commitment transaction was broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFinalizedEvent {
    pub id: String,
    pub commitment_txid: Txid,
}

/// The server gave up on the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailedEvent {
    pub id: String,
    pub reason: String,
}

/// An event of the settlement stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettlementEvent {
    BatchStarted(BatchStartedEvent),
    TreeTx(TreeTxEvent),
    TreeSigningStarted(TreeSigningStartedEvent),
    TreeNonces(TreeNoncesEvent),
    TreeSignature(TreeSignatureEvent),
    BatchFinalization(BatchFinalizationEvent),
    BatchFinalized(BatchFinalizedEvent),
    BatchFailed(BatchFailedEvent),

    /// A message the transport decoded but this client does not understand.
    Other { id: String, event_type: String },
}

impl SettlementEvent {
    /// Round correlation id.
    pub fn id(&self) -> &str {
        match self {
            SettlementEvent::BatchStarted(e) => &e.id,
            SettlementEvent::TreeTx(e) => &e.id,
            SettlementEvent::TreeSigningStarted(e) => &e.id,
            SettlementEvent::TreeNonces(e) => &e.id,
            SettlementEvent::TreeSignature(e) => &e.id,
            SettlementEvent::BatchFinalization(e) => &e.id,
            SettlementEvent::BatchFinalized(e) => &e.id,
            SettlementEvent::BatchFailed(e) => &e.id,
            SettlementEvent::Other { id, .. } => id,
        }
    }

    pub fn kind(&self) -> SettlementEventKind {
        match self {
            SettlementEvent::BatchStarted(_) => SettlementEventKind::BatchStarted,
            SettlementEvent::TreeTx(_) => SettlementEventKind::TreeTx,
            SettlementEvent::TreeSigningStarted(_) => SettlementEventKind::TreeSigningStarted,
            SettlementEvent::TreeNonces(_) => SettlementEventKind::TreeNonces,
            SettlementEvent::TreeSignature(_) => SettlementEventKind::TreeSignature,
            SettlementEvent::BatchFinalization(_) => SettlementEventKind::BatchFinalization,
            SettlementEvent::BatchFinalized(_) => SettlementEventKind::BatchFinalized,
            SettlementEvent::BatchFailed(_) => SettlementEventKind::BatchFailed,
            SettlementEvent::Other { .. } => SettlementEventKind::Other,
        }
    }
}

/// Fieldless tag of a [`SettlementEvent`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SettlementEventKind {
    BatchStarted,
    TreeTx,
    TreeSigningStarted,
    TreeNonces,
    TreeSignature,
    BatchFinalization,
    BatchFinalized,
    BatchFailed,
    Other,
}

impl fmt::Display for SettlementEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettlementEventKind::BatchStarted => "batch_started",
            SettlementEventKind::TreeTx => "tree_tx",
            SettlementEventKind::TreeSigningStarted => "tree_signing_started",
            SettlementEventKind::TreeNonces => "tree_nonces",
            SettlementEventKind::TreeSignature => "tree_signature",
            SettlementEventKind::BatchFinalization => "batch_finalization",
            SettlementEventKind::BatchFinalized => "batch_finalized",
            SettlementEventKind::BatchFailed => "batch_failed",
            SettlementEventKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use ark_tx_tree::test_utils::{make_fragment, make_outpoint};

    use super::*;

    #[test]
    fn test_tree_tx_kind() {
        let mut event = TreeTxEvent {
            id: "round".to_owned(),
            batch_index: 1,
            fragment: make_fragment(make_outpoint(1), 1, None),
        };
        assert_eq!(event.tree_kind(), Some(TreeKind::Connector));

        event.batch_index = 7;
        assert_eq!(event.tree_kind(), None);

        let sig = TreeSignatureEvent {
            id: "round".to_owned(),
            batch_index: 0,
            txid: event.fragment.txid(),
            signature: String::new(),
        };
        assert_eq!(sig.tree_kind(), Some(TreeKind::Vtxo));
    }

    #[test]
    fn test_id_and_kind() {
        let event = SettlementEvent::BatchFailed(BatchFailedEvent {
            id: "round-1".to_owned(),
            reason: "not enough participants".to_owned(),
        });
        assert_eq!(event.id(), "round-1");
        assert_eq!(event.kind(), SettlementEventKind::BatchFailed);
        assert_eq!(event.kind().to_string(), "batch_failed");

        let other = SettlementEvent::Other {
            id: "round-2".to_owned(),
            event_type: "heartbeat".to_owned(),
        };
        assert_eq!(other.id(), "round-2");
        assert_eq!(other.kind(), SettlementEventKind::Other);
    }
}
