//! Phase cursor, fragment buffers and per-event dispatch of a session.

use ark_batch_types::{
    BatchFailedEvent, BatchFinalizationEvent, BatchFinalizedEvent, BatchStartedEvent,
    SettlementEvent, TreeKind, TreeNoncesEvent, TreeSignatureEvent, TreeSigningStartedEvent,
    TreeTxEvent,
};
use ark_tx_tree::{TreeFragment, TxTree};
use bitcoin::Txid;
use tracing::{debug, info, warn};

use crate::{
    config::BatchSessionConfig,
    errors::{BatchSessionError, Result},
    handler::{BatchHandler, FailureDisposition, NonceProgress, StepDecision},
    phase::SessionPhase,
    signature::decode_tap_key_sig,
};

/// What the session loop does after an event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum StepOutcome {
    /// Wait for the next event.
    Continue,
    /// The batch is settled under this commitment txid.
    Finalized(Txid),
}

/// Everything one session owns. Created fresh for each round.
#[derive(Debug)]
pub(crate) struct SessionState {
    phase: SessionPhase,
    /// Round id of the batch we joined, once known.
    round_id: Option<String>,
    vtxo_fragments: Vec<TreeFragment>,
    connector_fragments: Vec<TreeFragment>,
    vtxo_tree: Option<TxTree>,
    connector_tree: Option<TxTree>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            phase: SessionPhase::Start,
            round_id: None,
            vtxo_fragments: Vec::new(),
            connector_fragments: Vec::new(),
            vtxo_tree: None,
            connector_tree: None,
        }
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn round_id(&self) -> Option<&str> {
        self.round_id.as_deref()
    }

    /// Dispatches one event.
    ///
    /// Events that are not expected in the current phase are dropped so that
    /// duplicated or late messages from the transport do not end the round.
    pub(crate) async fn process_event<H: BatchHandler>(
        &mut self,
        event: SettlementEvent,
        handler: &mut H,
        config: &BatchSessionConfig,
    ) -> Result<StepOutcome> {
        let kind = event.kind();
        let phase = self.phase;
        let accepted = match (event, phase) {
            (SettlementEvent::BatchStarted(e), SessionPhase::Start) => {
                self.on_batch_started(&e, handler, config).await?;
                true
            }
            (
                SettlementEvent::TreeTx(e),
                SessionPhase::BatchStarted | SessionPhase::TreeNoncesAggregated,
            ) => {
                self.on_tree_tx(e, handler).await?;
                true
            }
            (SettlementEvent::TreeSigningStarted(e), SessionPhase::BatchStarted) => {
                self.on_tree_signing_started(&e, handler, config).await?;
                true
            }
            (SettlementEvent::TreeNonces(e), SessionPhase::TreeSigningStarted) => {
                self.on_tree_nonces(&e, handler).await?;
                true
            }
            (SettlementEvent::TreeSignature(e), SessionPhase::TreeNoncesAggregated) => {
                self.on_tree_signature(&e, handler).await?;
                true
            }
            (SettlementEvent::BatchFinalization(e), SessionPhase::TreeNoncesAggregated) => {
                self.on_batch_finalization(&e, handler, config).await?;
                true
            }
            (SettlementEvent::BatchFinalized(e), SessionPhase::BatchFinalization) => {
                let txid = self.on_batch_finalized(&e, handler).await?;
                return Ok(StepOutcome::Finalized(txid));
            }
            (SettlementEvent::BatchFailed(e), _) => {
                self.on_batch_failed(e, handler).await?;
                true
            }
            (SettlementEvent::Other { event_type, .. }, _) => {
                debug!(%event_type, "dropping unrecognized event");
                return Ok(StepOutcome::Continue);
            }
            // Right event, wrong phase.
            (_, _) => false,
        };

        if !accepted {
            debug!(%kind, %phase, "dropping out-of-phase event");
        }
        Ok(StepOutcome::Continue)
    }

    async fn on_batch_started<H: BatchHandler>(
        &mut self,
        event: &BatchStartedEvent,
        handler: &mut H,
        config: &BatchSessionConfig,
    ) -> Result<()> {
        if handler.on_batch_started(event).await? == StepDecision::Skip {
            debug!(round_id = %event.id, "skipping batch");
            return Ok(());
        }

        self.round_id = Some(event.id.clone());
        let next = if config.skip_tree_signing() {
            SessionPhase::TreeNoncesAggregated
        } else {
            SessionPhase::BatchStarted
        };
        self.advance(next);
        Ok(())
    }

    async fn on_tree_tx<H: BatchHandler>(
        &mut self,
        event: TreeTxEvent,
        handler: &mut H,
    ) -> Result<()> {
        handler.on_tree_tx(&event).await?;

        let txid = event.fragment.txid();
        let Some(kind) = event.tree_kind() else {
            warn!(batch_index = event.batch_index, %txid, "dropping tree tx with unknown batch index");
            return Ok(());
        };
        let buffer = match kind {
            TreeKind::Vtxo => &mut self.vtxo_fragments,
            TreeKind::Connector => &mut self.connector_fragments,
        };
        debug!(%kind, %txid, buffered = buffer.len() + 1, "buffered tree tx");
        buffer.push(event.fragment);
        Ok(())
    }

    async fn on_tree_signing_started<H: BatchHandler>(
        &mut self,
        event: &TreeSigningStartedEvent,
        handler: &mut H,
        config: &BatchSessionConfig,
    ) -> Result<()> {
        let vtxo_tree = self
            .vtxo_tree
            .insert(build_tree(TreeKind::Vtxo, &self.vtxo_fragments, config)?);

        if handler.on_tree_signing_started(event, vtxo_tree).await? == StepDecision::Skip {
            debug!("skipping tree signing");
            return Ok(());
        }
        self.advance(SessionPhase::TreeSigningStarted);
        Ok(())
    }

    async fn on_tree_nonces<H: BatchHandler>(
        &mut self,
        event: &TreeNoncesEvent,
        handler: &mut H,
    ) -> Result<()> {
        match handler.on_tree_nonces(event).await? {
            NonceProgress::Aggregated => self.advance(SessionPhase::TreeNoncesAggregated),
            NonceProgress::Pending => {
                debug!(txid = %event.txid, nonces = event.nonces.len(), "tree nonces pending");
            }
        }
        Ok(())
    }

    async fn on_tree_signature<H: BatchHandler>(
        &mut self,
        event: &TreeSignatureEvent,
        handler: &mut H,
    ) -> Result<()> {
        if event.tree_kind() != Some(TreeKind::Vtxo) {
            warn!(batch_index = event.batch_index, txid = %event.txid, "dropping tree signature for non-vtxo tree");
            return Ok(());
        }

        let vtxo_tree = self
            .vtxo_tree
            .as_mut()
            .ok_or(BatchSessionError::VtxoTreeNotInitialized)?;

        let sig = decode_tap_key_sig(&event.signature).map_err(|e| {
            BatchSessionError::InvalidSignature {
                txid: event.txid,
                reason: e.to_string(),
            }
        })?;
        vtxo_tree
            .set_tap_key_sig(&event.txid, 0, sig)
            .map_err(|source| BatchSessionError::TreeSignature {
                txid: event.txid,
                source,
            })?;
        debug!(txid = %event.txid, "attached tree signature");

        handler.on_tree_signature(event).await?;
        Ok(())
    }

    async fn on_batch_finalization<H: BatchHandler>(
        &mut self,
        event: &BatchFinalizationEvent,
        handler: &mut H,
        config: &BatchSessionConfig,
    ) -> Result<()> {
        if self.vtxo_tree.is_none() && !self.vtxo_fragments.is_empty() {
            self.vtxo_tree = Some(build_tree(TreeKind::Vtxo, &self.vtxo_fragments, config)?);
        }
        if self.vtxo_tree.is_none() && !config.skip_tree_signing() {
            return Err(BatchSessionError::VtxoTreeNotInitialized);
        }
        if self.connector_tree.is_none() && !self.connector_fragments.is_empty() {
            self.connector_tree = Some(build_tree(
                TreeKind::Connector,
                &self.connector_fragments,
                config,
            )?);
        }

        handler
            .on_batch_finalization(event, self.vtxo_tree.as_mut(), self.connector_tree.as_mut())
            .await?;
        self.advance(SessionPhase::BatchFinalization);
        Ok(())
    }

    async fn on_batch_finalized<H: BatchHandler>(
        &mut self,
        event: &BatchFinalizedEvent,
        handler: &mut H,
    ) -> Result<Txid> {
        handler.on_batch_finalized(event).await?;
        info!(round_id = %event.id, commitment_txid = %event.commitment_txid, "batch finalized");
        Ok(event.commitment_txid)
    }

    async fn on_batch_failed<H: BatchHandler>(
        &mut self,
        event: BatchFailedEvent,
        handler: &mut H,
    ) -> Result<()> {
        match handler.on_batch_failed(&event).await? {
            FailureDisposition::Continue => {
                warn!(round_id = %event.id, reason = %event.reason, "batch failed, continuing");
                Ok(())
            }
            FailureDisposition::Abort => Err(BatchSessionError::ProtocolFailure {
                round_id: event.id,
                reason: event.reason,
            }),
        }
    }

    fn advance(&mut self, next: SessionPhase) {
        info!(from = %self.phase, to = %next, "session phase advanced");
        self.phase.advance(next);
    }
}

fn build_tree(
    kind: TreeKind,
    fragments: &[TreeFragment],
    config: &BatchSessionConfig,
) -> Result<TxTree> {
    let tree = TxTree::create(fragments.iter().cloned())
        .and_then(|tree| {
            if config.validate_trees() {
                tree.validate()?;
            }
            Ok(tree)
        })
        .map_err(|source| BatchSessionError::MalformedTree { kind, source })?;
    debug!(%kind, nodes = tree.len(), leaves = tree.leaves().count(), "built tree");
    Ok(tree)
}
