//! Client side of a batch settlement round.
//!
//! [`join`] consumes the server's settlement event stream for one round,
//! rebuilds the VTXO and connector trees from the streamed fragments and
//! walks the round's phases in order. Signing and every call back to the
//! server are left to the caller's [`BatchSessionHandler`]; the session itself
//! does no I/O besides reading the stream.

mod config;
mod errors;
mod handler;
mod options;
mod phase;
mod session;
mod signature;
mod state;

pub use config::BatchSessionConfig;
pub use errors::{BatchSessionError, ErrorKind};
pub use handler::{
    BatchEventObserver, BatchHandler, BatchSessionHandler, FailureDisposition, NonceProgress,
    StepDecision,
};
pub use options::{EventCallback, JoinOptions};
pub use phase::SessionPhase;
pub use session::join;
pub use signature::{decode_tap_key_sig, SignatureDecodeError};
