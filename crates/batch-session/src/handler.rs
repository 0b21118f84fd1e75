//! Callbacks the session delegates every protocol decision to.

use ark_batch_types::{
    BatchFailedEvent, BatchFinalizationEvent, BatchFinalizedEvent, BatchStartedEvent,
    TreeNoncesEvent, TreeSignatureEvent, TreeSigningStartedEvent, TreeTxEvent,
};
use ark_tx_tree::TxTree;
use async_trait::async_trait;

/// Whether the session should move on after a phase callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepDecision {
    /// Take part in this phase and advance.
    Proceed,
    /// Stay where we are and wait for the next matching event.
    Skip,
}

/// Progress of the nonce exchange as reported by the handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonceProgress {
    /// More nonces are needed before signing can start.
    Pending,
    /// All nonces are in and partial signatures were submitted.
    Aggregated,
}

/// What to do with a batch the server reported as failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureDisposition {
    /// Keep listening, the failure is advisory.
    Continue,
    /// End the session with a protocol failure.
    Abort,
}

/// Drives the phases of a settlement round.
///
/// Implementations do the actual signing and submit nonces, partial
/// signatures and forfeits to the server through their own transport client.
#[async_trait]
pub trait BatchSessionHandler: Send {
    /// A batch was announced. Return [`StepDecision::Skip`] if it does not
    /// include any of our intents.
    async fn on_batch_started(&mut self, event: &BatchStartedEvent) -> eyre::Result<StepDecision>;

    /// The VTXO tree is complete. Typically generates and submits nonces.
    async fn on_tree_signing_started(
        &mut self,
        event: &TreeSigningStartedEvent,
        vtxo_tree: &mut TxTree,
    ) -> eyre::Result<StepDecision>;

    /// Nonces for one tree transaction arrived.
    async fn on_tree_nonces(&mut self, event: &TreeNoncesEvent) -> eyre::Result<NonceProgress>;

    /// Trees are signed. Typically signs and submits forfeits using the
    /// connector tree.
    async fn on_batch_finalization(
        &mut self,
        event: &BatchFinalizationEvent,
        vtxo_tree: Option<&mut TxTree>,
        connector_tree: Option<&mut TxTree>,
    ) -> eyre::Result<()>;
}

/// Optional hooks into a settlement round.
///
/// Every method has a default, so implementors only override what they
/// care about. An `Err` from any of them ends the session.
#[async_trait]
pub trait BatchEventObserver: Send {
    async fn on_tree_tx(&mut self, _event: &TreeTxEvent) -> eyre::Result<()> {
        Ok(())
    }

    async fn on_tree_signature(&mut self, _event: &TreeSignatureEvent) -> eyre::Result<()> {
        Ok(())
    }

    async fn on_batch_finalized(&mut self, _event: &BatchFinalizedEvent) -> eyre::Result<()> {
        Ok(())
    }

    /// Decides whether a failed batch ends the session.
    ///
    /// The default aborts with the server's reason.
    async fn on_batch_failed(
        &mut self,
        _event: &BatchFailedEvent,
    ) -> eyre::Result<FailureDisposition> {
        Ok(FailureDisposition::Abort)
    }
}

/// A complete handler: mandatory phase driver plus observer hooks.
pub trait BatchHandler: BatchSessionHandler + BatchEventObserver {}

impl<T: BatchSessionHandler + BatchEventObserver> BatchHandler for T {}
