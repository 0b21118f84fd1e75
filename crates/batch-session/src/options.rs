use std::{fmt, sync::Arc};

use ark_batch_types::SettlementEvent;
use futures::future::BoxFuture;
use tokio::{runtime::Handle, sync::watch};
use tracing::debug;

use crate::config::BatchSessionConfig;

/// Callback handed a copy of every event the session receives.
pub type EventCallback =
    Arc<dyn Fn(SettlementEvent) -> BoxFuture<'static, eyre::Result<()>> + Send + Sync>;

/// Per-call settings of [`join`](crate::join).
#[derive(Clone, Default)]
pub struct JoinOptions {
    config: BatchSessionConfig,
    cancel: Option<watch::Receiver<bool>>,
    on_event: Option<EventCallback>,
}

impl fmt::Debug for JoinOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinOptions")
            .field("config", &self.config)
            .field("cancel", &self.cancel.is_some())
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

impl JoinOptions {
    pub fn new(config: BatchSessionConfig) -> Self {
        Self {
            config,
            cancel: None,
            on_event: None,
        }
    }

    /// The session stops with [`Canceled`](crate::BatchSessionError::Canceled)
    /// once the watched value is `true`.
    pub fn with_cancel_signal(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Every received event is passed to `on_event` on a detached tokio task.
    /// Without a tokio runtime the callback is skipped.
    pub fn with_event_callback(mut self, on_event: EventCallback) -> Self {
        self.on_event = Some(on_event);
        self
    }

    pub fn config(&self) -> &BatchSessionConfig {
        &self.config
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Hands the event to the callback on a detached task.
    ///
    /// The task is never joined. Whatever it returns is logged and dropped,
    /// it cannot affect the session. Outside a tokio runtime the callback is
    /// not invoked at all.
    pub(crate) fn notify(&self, event: &SettlementEvent) {
        let Some(on_event) = &self.on_event else {
            return;
        };
        let kind = event.kind();
        let Ok(runtime) = Handle::try_current() else {
            debug!(%kind, "no tokio runtime, skipping event callback");
            return;
        };
        let fut = on_event(event.clone());
        runtime.spawn(async move {
            if let Err(e) = fut.await {
                debug!(%kind, err = %e, "event callback failed");
            }
        });
    }
}
