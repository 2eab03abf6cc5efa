//! Invoker - runs matched listeners, detached or on the emitting thread
//!
//! Every invocation is wrapped in `catch_unwind`. A panicking listener is
//! logged and counted; it never unwinds into the registry or the caller
//! of `emit`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use contracts::{EventKey, InvocationMode};
use tokio::runtime::Handle;
use tracing::{error, trace};

use crate::arg::Arg;
use crate::listener::Listener;
use crate::metrics::DispatchMetrics;

/// How a dispatcher runs its listeners
#[derive(Debug, Clone)]
pub(crate) enum Invoker {
    /// Launch each listener with `spawn_blocking` on this runtime
    Detached(Handle),
    /// Run each listener on the emitting thread
    Synchronous,
}

impl Invoker {
    pub fn mode(&self) -> InvocationMode {
        match self {
            Self::Detached(_) => InvocationMode::Detached,
            Self::Synchronous => InvocationMode::Synchronous,
        }
    }

    /// Run (or launch) one invocation. Never unwinds.
    ///
    /// A detached invocation is only counted as delivered once it starts
    /// running; one cancelled by a shut-down runtime is not.
    pub fn invoke(&self, invocation: Invocation) {
        match self {
            Self::Detached(handle) => {
                // The JoinHandle is dropped: emit does not wait for completion.
                handle.spawn_blocking(move || invocation.run());
            }
            Self::Synchronous => invocation.run(),
        }
    }
}

/// One listener call with its arguments
pub(crate) struct Invocation {
    pub event: EventKey,
    pub listener: Arc<Listener>,
    pub args: Arc<[Arg]>,
    pub metrics: Arc<DispatchMetrics>,
}

impl Invocation {
    fn run(self) {
        self.metrics.inc_delivered_count();
        observability::record_delivery(&self.event);

        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.listener.call(&self.args)));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        observability::record_handler_duration_ms(&self.event, elapsed_ms);

        match result {
            Ok(called) => {
                trace!(
                    event = %self.event,
                    listener_id = %self.listener.id(),
                    called,
                    elapsed_ms,
                    "Listener returned"
                );
            }
            Err(payload) => {
                self.metrics.inc_panic_count();
                observability::record_handler_panic(&self.event);
                error!(
                    event = %self.event,
                    listener_id = %self.listener.id(),
                    signature = %self.listener.signature(),
                    panic = %panic_message(payload.as_ref()),
                    "Listener panicked"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
