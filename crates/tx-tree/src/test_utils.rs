//! Fixtures for building fragment sets in tests.

use bitcoin::{
    absolute::LockTime, hashes::Hash, secp256k1::schnorr, taproot, transaction::Version, Amount,
    OutPoint, Psbt, ScriptBuf, Sequence, TapSighashType, Transaction, TxIn, TxOut, Txid, Witness,
};

use crate::TreeFragment;

/// Value of every output created by the fixtures.
pub const OUTPUT_VALUE: Amount = Amount::from_sat(1_000);

/// An outpoint on a synthetic funding transaction.
pub fn make_outpoint(id: u8) -> OutPoint {
    OutPoint::new(Txid::from_byte_array([id; 32]), 0)
}

/// An unsigned transaction spending `prevout` into `n_outputs` outputs.
pub fn make_tx(prevout: OutPoint, n_outputs: usize) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: prevout,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: (0..n_outputs)
            .map(|_| TxOut {
                value: OUTPUT_VALUE,
                script_pubkey: ScriptBuf::new(),
            })
            .collect(),
    }
}

/// A fragment whose txid matches the transaction it carries.
pub fn make_fragment(prevout: OutPoint, n_outputs: usize, parent: Option<Txid>) -> TreeFragment {
    let tx = make_tx(prevout, n_outputs);
    let txid = tx.compute_txid();
    let psbt = Psbt::from_unsigned_tx(tx).expect("test: unsigned tx");
    TreeFragment::new(txid, psbt, parent)
}

/// A full tree, root first, then level by level.
///
/// The root spends `make_outpoint(seed)`. Every node above the last level has
/// `fanout` outputs, each spent by one child. `depth` is the number of levels
/// below the root.
pub fn make_tree_fragments(seed: u8, depth: usize, fanout: usize) -> Vec<TreeFragment> {
    let root_outputs = if depth == 0 { 1 } else { fanout };
    let root = make_fragment(make_outpoint(seed), root_outputs, None);

    let mut level = vec![root.txid()];
    let mut fragments = vec![root];
    for cur_depth in 1..=depth {
        let n_outputs = if cur_depth == depth { 1 } else { fanout };
        let mut next_level = Vec::with_capacity(level.len() * fanout);
        for parent in level {
            for vout in 0..fanout {
                let prevout = OutPoint::new(parent, vout as u32);
                let child = make_fragment(prevout, n_outputs, Some(parent));
                next_level.push(child.txid());
                fragments.push(child);
            }
        }
        level = next_level;
    }
    fragments
}

/// A syntactically valid key-path signature filled with `byte`.
pub fn make_tap_key_sig(byte: u8) -> taproot::Signature {
    taproot::Signature {
        signature: schnorr::Signature::from_slice(&[byte; 64]).expect("test: 64 bytes"),
        sighash_type: TapSighashType::Default,
    }
}
