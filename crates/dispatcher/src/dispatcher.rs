//! Dispatcher - typed publish/subscribe over named event keys

use std::fmt;
use std::sync::Arc;

use contracts::{ContractError, DispatcherConfig, EventKey, InvocationMode};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, instrument, trace, warn};

use crate::arg::{Arg, IntoArgs};
use crate::error::DispatcherError;
use crate::invoke::{Invocation, Invoker};
use crate::listener::{IntoListener, Listener, ListenerId};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::Registry;

/// Builder for creating a Dispatcher
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    runtime: Option<Handle>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            runtime: None,
        }
    }

    /// Runtime that detached listeners are launched on.
    ///
    /// Defaults to the runtime `build` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn invocation(mut self, mode: InvocationMode) -> Self {
        self.config.invocation = mode;
        self
    }

    pub fn listener_warn_threshold(mut self, threshold: usize) -> Self {
        self.config.listener_warn_threshold = Some(threshold);
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    /// - Detached invocation without a runtime handle, outside a tokio runtime
    /// - A listener warning threshold of zero
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        if self.config.listener_warn_threshold == Some(0) {
            return Err(ContractError::config_validation(
                "listener_warn_threshold",
                "must be > 0 when set",
            )
            .into());
        }

        let invoker = match self.config.invocation {
            InvocationMode::Synchronous => Invoker::Synchronous,
            InvocationMode::Detached => {
                let handle = match self.runtime {
                    Some(handle) => handle,
                    None => Handle::try_current()
                        .map_err(|e| DispatcherError::no_runtime(e.to_string()))?,
                };
                Invoker::Detached(handle)
            }
        };

        debug!(
            invocation = ?invoker.mode(),
            listener_warn_threshold = ?self.config.listener_warn_threshold,
            "Dispatcher created"
        );

        Ok(Dispatcher::with_invoker(
            invoker,
            self.config.listener_warn_threshold,
        ))
    }
}

/// In-process event dispatcher.
///
/// Listeners are registered against an event key and selected at emit
/// time by signature: an emission reaches every listener of its key whose
/// parameter count equals the argument count and whose parameter types
/// match the argument types position by position. Other listeners are
/// skipped silently.
///
/// All methods take `&self`. The registry is guarded by one mutex that is
/// never held while a listener runs, so listeners may register, remove
/// or emit on the same dispatcher.
///
/// # Emission order
///
/// `emit` takes a snapshot of the key's list and walks it in registration
/// order. Before each matching listener is invoked the live registry is
/// checked again:
/// - a once listener is removed at that moment, and skipped if it is
///   already gone (consumed by a concurrent emission, or removed by an
///   earlier listener of this emission);
/// - a persistent listener is skipped if it has been removed.
///
/// Listeners added during an emission first run on the next emission.
/// A once listener is only consumed by an emission it matches.
pub struct Dispatcher {
    registry: Mutex<Registry>,
    invoker: Invoker,
    metrics: Arc<DispatchMetrics>,
    listener_warn_threshold: Option<usize>,
}

impl Dispatcher {
    /// Dispatcher that runs listeners on the emitting thread
    pub fn synchronous() -> Self {
        Self::with_invoker(Invoker::Synchronous, None)
    }

    /// Dispatcher that launches each listener on `handle`'s blocking pool
    /// and returns from `emit` without waiting for them
    pub fn detached(handle: Handle) -> Self {
        Self::with_invoker(Invoker::Detached(handle), None)
    }

    /// Build from configuration, using the ambient tokio runtime for
    /// detached invocation
    pub fn from_config(config: &DispatcherConfig) -> Result<Self, DispatcherError> {
        DispatcherBuilder::new(config.clone()).build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    fn with_invoker(invoker: Invoker, listener_warn_threshold: Option<usize>) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            invoker,
            metrics: Arc::new(DispatchMetrics::new()),
            listener_warn_threshold,
        }
    }

    /// Register a persistent listener
    pub fn on<P, F>(&self, event: impl Into<EventKey>, listener: F) -> ListenerId
    where
        F: IntoListener<P>,
    {
        self.register(event, listener, false)
    }

    /// Register a listener that is removed by the first emission it matches
    pub fn once<P, F>(&self, event: impl Into<EventKey>, listener: F) -> ListenerId
    where
        F: IntoListener<P>,
    {
        self.register(event, listener, true)
    }

    /// Append a listener to the event's list.
    ///
    /// There is no duplicate detection: registering the same closure twice
    /// gives two listeners with distinct ids, both invoked per emission.
    pub fn register<P, F>(&self, event: impl Into<EventKey>, listener: F, once: bool) -> ListenerId
    where
        F: IntoListener<P>,
    {
        let event = event.into();
        let listener = Arc::new(Listener::new(listener, once));
        let id = listener.id();

        debug!(
            event = %event,
            listener_id = %id,
            signature = %listener.signature(),
            once,
            "Listener registered"
        );

        let count = {
            let mut registry = self.registry.lock();
            let count = registry.push(event.clone(), listener);
            observability::record_listener_count(&event, count);
            count
        };

        if let Some(threshold) = self.listener_warn_threshold {
            if count > threshold {
                warn!(
                    event = %event,
                    listeners = count,
                    threshold,
                    "Listener count above warning threshold, possible leak"
                );
            }
        }

        id
    }

    /// Deliver `args` to every matching listener of `event`.
    ///
    /// Never fails: an unknown key is a no-op, non-matching listeners are
    /// skipped, and a panicking listener is contained and logged.
    ///
    /// Only keys with listeners get an `event`-labelled emit series, so
    /// arbitrary caller keys do not grow the metric set.
    #[instrument(name = "dispatcher_emit", level = "trace", skip_all, fields(event = event.as_ref()))]
    pub fn emit<A: IntoArgs>(&self, event: impl AsRef<str>, args: A) {
        let event = event.as_ref();
        self.metrics.inc_emit_count();

        let Some((key, snapshot)) = self.registry.lock().snapshot(event) else {
            trace!(event, "No listeners");
            return;
        };
        observability::record_emit(&key);

        let args: Arc<[Arg]> = args.into_args().into();
        let mut skipped = 0u64;

        for listener in snapshot {
            if !listener.accepts(&args) {
                skipped += 1;
                continue;
            }

            if !self.claim(&key, &listener) {
                trace!(
                    event = %key,
                    listener_id = %listener.id(),
                    "Listener removed during emission, skipped"
                );
                continue;
            }

            self.invoker.invoke(Invocation {
                event: key.clone(),
                listener,
                args: Arc::clone(&args),
                metrics: Arc::clone(&self.metrics),
            });
        }

        if skipped > 0 {
            self.metrics.add_skipped_count(skipped);
            observability::record_skipped(&key, skipped);
            trace!(event = %key, skipped, "Listeners skipped by signature");
        }
    }

    /// Check a matched listener against the live registry just before it
    /// is invoked. Once listeners are removed here, under the lock, so
    /// racing emissions cannot both claim one. The id lookup is constant
    /// time, so an emission costs one short lock per matched listener.
    fn claim(&self, key: &EventKey, listener: &Listener) -> bool {
        let mut registry = self.registry.lock();
        if !listener.is_once() {
            return registry.contains(key, listener.id());
        }
        let removed = registry.remove(key, listener.id());
        if removed {
            observability::record_listener_count(key, registry.listener_count(key));
        }
        removed
    }

    /// Remove the listener registered under `id` for `event`.
    ///
    /// Returns whether a listener was removed. Unknown keys and ids are a
    /// no-op.
    pub fn remove_listener(&self, event: impl AsRef<str>, id: ListenerId) -> bool {
        let event = event.as_ref();
        let removed = {
            let mut registry = self.registry.lock();
            let removed = registry.remove(event, id);
            if removed {
                observability::record_listener_count(event, registry.listener_count(event));
            }
            removed
        };

        if removed {
            debug!(event, listener_id = %id, "Listener removed");
        }
        removed
    }

    /// Drop the whole listener list of each given key.
    ///
    /// An empty key list is a no-op; there is no wildcard.
    #[instrument(name = "dispatcher_remove_all", level = "debug", skip_all)]
    pub fn remove_all_listeners<I, K>(&self, events: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let events: Vec<K> = events.into_iter().collect();
        if events.is_empty() {
            return;
        }

        let removed = {
            let mut registry = self.registry.lock();
            let removed = registry.remove_keys(&events);
            for event in &events {
                observability::record_listener_count(event.as_ref(), 0);
            }
            removed
        };
        debug!(keys = events.len(), removed, "Listener lists cleared");
    }

    /// Number of listeners currently registered for `event`
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        self.registry.lock().listener_count(event.as_ref())
    }

    pub fn has_listeners(&self, event: impl AsRef<str>) -> bool {
        self.listener_count(event) > 0
    }

    /// Keys that currently have at least one listener (unordered)
    pub fn event_keys(&self) -> Vec<EventKey> {
        self.registry.lock().keys()
    }

    pub fn invocation_mode(&self) -> InvocationMode {
        self.invoker.mode()
    }

    /// Get dispatch counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("invocation", &self.invoker.mode())
            .field("listeners", &self.registry.lock().len())
            .field("listener_warn_threshold", &self.listener_warn_threshold)
            .finish()
    }
}
