//! Indexed transaction tree assembled from streamed fragments.

use std::collections::{BTreeMap, VecDeque};

use bitcoin::{taproot, Psbt, Txid};

use crate::{errors::TxTreeError, fragment::TreeFragment};

/// A tree of transactions keyed by txid.
///
/// Built once from the complete fragment set of a batch. Leaves are derived:
/// a node is a leaf iff no other node names it as parent. Nodes are kept in
/// txid order, which makes construction independent of the order in which
/// the fragments arrived.
///
/// Invariants upheld by [`TxTree::create`]:
/// - exactly one node has no parent (the root)
/// - every parent reference resolves to a node of the tree
/// - every node is reachable from the root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxTree {
    root: Txid,
    nodes: BTreeMap<Txid, TreeFragment>,
    /// Parent txid to child txids, children sorted by txid.
    children: BTreeMap<Txid, Vec<Txid>>,
    /// Sorted by txid.
    leaves: Vec<Txid>,
}

impl TxTree {
    /// Builds a tree from the full set of fragments of one batch.
    pub fn create(fragments: impl IntoIterator<Item = TreeFragment>) -> Result<Self, TxTreeError> {
        let mut nodes = BTreeMap::new();
        for fragment in fragments {
            let txid = fragment.txid();
            if nodes.insert(txid, fragment).is_some() {
                return Err(TxTreeError::DuplicateTxid(txid));
            }
        }

        let roots: Vec<Txid> = nodes
            .values()
            .filter(|f| f.is_root())
            .map(TreeFragment::txid)
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(TxTreeError::MissingRoot),
            [root] => *root,
            _ => return Err(TxTreeError::MultipleRoots(roots)),
        };

        // Walking the map in key order keeps every child list sorted.
        let mut children: BTreeMap<Txid, Vec<Txid>> = BTreeMap::new();
        for fragment in nodes.values() {
            let Some(parent) = fragment.parent_txid() else {
                continue;
            };
            if !nodes.contains_key(&parent) {
                return Err(TxTreeError::MissingParent {
                    txid: fragment.txid(),
                    parent,
                });
            }
            children.entry(parent).or_default().push(fragment.txid());
        }

        let leaves = nodes
            .keys()
            .filter(|txid| !children.contains_key(*txid))
            .copied()
            .collect();

        let tree = Self {
            root,
            nodes,
            children,
            leaves,
        };

        let reachable = tree.iter().count();
        if reachable != tree.nodes.len() {
            return Err(TxTreeError::Disconnected {
                root,
                unreachable: tree.nodes.len() - reachable,
            });
        }

        Ok(tree)
    }

    pub fn root(&self) -> &TreeFragment {
        &self.nodes[&self.root]
    }

    pub fn root_txid(&self) -> Txid {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed tree, which holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.nodes.contains_key(txid)
    }

    pub fn get(&self, txid: &Txid) -> Option<&TreeFragment> {
        self.nodes.get(txid)
    }

    pub fn is_leaf(&self, txid: &Txid) -> bool {
        self.contains(txid) && !self.children.contains_key(txid)
    }

    /// Parent of the node, `None` for the root or an unknown txid.
    pub fn parent(&self, txid: &Txid) -> Option<&TreeFragment> {
        self.nodes
            .get(txid)
            .and_then(TreeFragment::parent_txid)
            .and_then(|parent| self.nodes.get(&parent))
    }

    /// Children of the node in txid order.
    pub fn children(&self, txid: &Txid) -> impl Iterator<Item = &TreeFragment> + '_ {
        self.children
            .get(txid)
            .into_iter()
            .flatten()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Leaf nodes in txid order. Each call starts a fresh iteration.
    pub fn leaves(&self) -> impl Iterator<Item = &TreeFragment> + '_ {
        self.leaves.iter().filter_map(|txid| self.nodes.get(txid))
    }

    /// Breadth-first walk from the root, siblings in txid order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            queue: VecDeque::from([self.root]),
        }
    }

    /// Path from the root down to the node, both ends included.
    pub fn branch(&self, txid: &Txid) -> Result<Vec<&TreeFragment>, TxTreeError> {
        let mut cur = self.nodes.get(txid).ok_or(TxTreeError::NotFound(*txid))?;
        let mut branch = vec![cur];
        while let Some(parent) = cur.parent_txid() {
            cur = self
                .nodes
                .get(&parent)
                .ok_or(TxTreeError::NotFound(parent))?;
            branch.push(cur);
        }
        branch.reverse();
        Ok(branch)
    }

    /// Mutable access to the transaction of one node.
    ///
    /// This is the only way to change a node. The tree structure is derived
    /// from txids and parent links, neither of which can be reached through
    /// the returned reference.
    pub fn tx_mut(&mut self, txid: &Txid) -> Result<&mut Psbt, TxTreeError> {
        self.nodes
            .get_mut(txid)
            .map(TreeFragment::tx_mut)
            .ok_or(TxTreeError::NotFound(*txid))
    }

    /// Attaches a key-path signature to one input of one node.
    pub fn set_tap_key_sig(
        &mut self,
        txid: &Txid,
        input: usize,
        sig: taproot::Signature,
    ) -> Result<(), TxTreeError> {
        let psbt = self.tx_mut(txid)?;
        let inputs = psbt.inputs.len();
        let slot = psbt
            .inputs
            .get_mut(input)
            .ok_or(TxTreeError::InputOutOfRange {
                txid: *txid,
                index: input,
                inputs,
            })?;
        slot.tap_key_sig = Some(sig);
        Ok(())
    }

    /// Checks each node against the transaction it carries.
    ///
    /// The declared txid must match the unsigned transaction, and every
    /// non-root node must spend one of its parent's outputs on input 0.
    pub fn validate(&self) -> Result<(), TxTreeError> {
        for fragment in self.nodes.values() {
            let computed = fragment.tx().unsigned_tx.compute_txid();
            if computed != fragment.txid() {
                return Err(TxTreeError::TxidMismatch {
                    declared: fragment.txid(),
                    computed,
                });
            }

            let Some(parent) = fragment.parent_txid() else {
                continue;
            };
            let spends_parent = fragment
                .tx()
                .unsigned_tx
                .input
                .first()
                .is_some_and(|input| input.previous_output.txid == parent);
            if !spends_parent {
                return Err(TxTreeError::InvalidParentLink {
                    txid: fragment.txid(),
                    parent,
                });
            }
        }
        Ok(())
    }

    /// Clones the fragments back out in breadth-first order.
    pub fn fragments(&self) -> Vec<TreeFragment> {
        self.iter().cloned().collect()
    }
}

/// Breadth-first iterator over a [`TxTree`].
#[derive(Debug)]
pub struct Iter<'a> {
    tree: &'a TxTree,
    queue: VecDeque<Txid>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TreeFragment;

    fn next(&mut self) -> Option<Self::Item> {
        let txid = self.queue.pop_front()?;
        if let Some(children) = self.tree.children.get(&txid) {
            self.queue.extend(children.iter().copied());
        }
        self.tree.nodes.get(&txid)
    }
}

impl<'a> IntoIterator for &'a TxTree {
    type Item = &'a TreeFragment;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
