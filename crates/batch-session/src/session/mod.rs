//! The session driver.

use ark_batch_types::SettlementEvent;
use bitcoin::Txid;
use futures::stream::{Stream, StreamExt};
use tracing::{debug, field, info, info_span, Instrument, Span};

use crate::{
    errors::{BatchSessionError, Result},
    handler::BatchHandler,
    options::JoinOptions,
    state::{SessionState, StepOutcome},
};


/// Takes part in one settlement round.
///
/// Pulls events from `events` one at a time, in order, and hands every
/// protocol decision to `handler`. Returns the commitment txid once the
/// batch is finalized, or the first fatal error. The stream is not drained
/// past that point.
pub async fn join<S, H>(events: S, handler: &mut H, options: JoinOptions) -> Result<Txid>
where
    S: Stream<Item = SettlementEvent> + Unpin + Send,
    H: BatchHandler,
{
    let span = info_span!("batch-session", round_id = field::Empty);
    drive(events, handler, options).instrument(span).await
}

async fn drive<S, H>(mut events: S, handler: &mut H, options: JoinOptions) -> Result<Txid>
where
    S: Stream<Item = SettlementEvent> + Unpin + Send,
    H: BatchHandler,
{
    let mut state = SessionState::new();
    debug!(config = ?options.config(), "joining settlement round");

    while let Some(event) = events.next().await {
        if options.is_canceled() {
            info!(phase = %state.phase(), "session canceled");
            return Err(BatchSessionError::Canceled);
        }

        options.notify(&event);

        let had_round = state.round_id().is_some();
        let outcome = match state.process_event(event, handler, options.config()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(phase = %state.phase(), err = %e, "session failed");
                return Err(e);
            }
        };
        if !had_round {
            if let Some(round_id) = state.round_id() {
                Span::current().record("round_id", round_id);
            }
        }

        if let StepOutcome::Finalized(txid) = outcome {
            return Ok(txid);
        }
    }

    debug!(phase = %state.phase(), "event stream ended before finalization");
    Err(BatchSessionError::StreamClosed)
}
