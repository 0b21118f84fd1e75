//! Settlement round message types.

mod events;
mod tree_kind;

pub use events::{
    BatchFailedEvent, BatchFinalizationEvent, BatchFinalizedEvent, BatchStartedEvent,
    SettlementEvent, SettlementEventKind, TreeNoncesEvent, TreeSignatureEvent,
    TreeSigningStartedEvent, TreeTxEvent,
};
pub use tree_kind::TreeKind;
