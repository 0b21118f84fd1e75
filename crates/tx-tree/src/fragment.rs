use bitcoin::{Psbt, Txid};

/// One transaction of a tree as the server streams it.
///
/// Fragments only know their parent. Whether a fragment is a leaf is derived
/// once the full set is known, see [`TxTree::create`](crate::TxTree::create).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeFragment {
    /// Id of the transaction.
    txid: Txid,

    /// The partially signed transaction.
    tx: Psbt,

    /// Id of the transaction this one spends from, `None` for the root.
    parent_txid: Option<Txid>,
}

impl TreeFragment {
    pub fn new(txid: Txid, tx: Psbt, parent_txid: Option<Txid>) -> Self {
        Self {
            txid,
            tx,
            parent_txid,
        }
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    pub fn tx(&self) -> &Psbt {
        &self.tx
    }

    pub(crate) fn tx_mut(&mut self) -> &mut Psbt {
        &mut self.tx
    }

    pub fn parent_txid(&self) -> Option<Txid> {
        self.parent_txid
    }

    pub fn is_root(&self) -> bool {
        self.parent_txid.is_none()
    }

    pub fn into_parts(self) -> (Txid, Psbt, Option<Txid>) {
        (self.txid, self.tx, self.parent_txid)
    }
}
