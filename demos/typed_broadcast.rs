//! Typed Broadcast Example
//!
//! Registers listeners with different signatures on one event key and
//! shows which of them each emission reaches. Runs listeners on the
//! emitting thread.
//!
//! Run with: cargo run --bin typed_broadcast

use std::sync::{Arc, OnceLock};

use dispatcher::{Arg, Dispatcher, ListenerId};

#[derive(Debug, Clone)]
struct Position {
    x: f32,
    y: f32,
}

fn main() -> anyhow::Result<()> {
    observability::init()?;

    let dispatcher = Arc::new(Dispatcher::synchronous());

    // ==== Stage 1: listeners with different signatures ====
    dispatcher.on("message", |msg: String| {
        tracing::info!(%msg, "string listener");
    });
    dispatcher.on("message", |what: String, pos: Position| {
        tracing::info!(%what, x = pos.x, y = pos.y, "positioned listener");
    });
    dispatcher.on("message", |arg: Arg| {
        tracing::info!(type_name = arg.type_name(), "wildcard listener");
    });
    dispatcher.once("message", |msg: String| {
        tracing::info!(%msg, "once listener");
    });

    // ==== Stage 2: emissions select by arity and type ====
    dispatcher.emit("message", ("simple message".to_string(),));
    dispatcher.emit("message", ("car".to_string(), Position { x: 4.5, y: 5.6 }));
    dispatcher.emit("message", (42u32,));
    tracing::info!(
        listeners = dispatcher.listener_count("message"),
        "once listener consumed"
    );

    // ==== Stage 3: a listener that replaces itself while running ====
    let own_id: Arc<OnceLock<ListenerId>> = Arc::default();
    let id = {
        let d = Arc::clone(&dispatcher);
        let own_id = Arc::clone(&own_id);
        dispatcher.on("swap", move || {
            tracing::info!("first listener, swapping in the second");
            d.on("swap", || tracing::info!("second listener"));
            if let Some(id) = own_id.get() {
                d.remove_listener("swap", *id);
            }
        })
    };
    let _ = own_id.set(id);

    dispatcher.emit("swap", ());
    dispatcher.emit("swap", ());

    // ==== Stage 4: a panicking listener is contained ====
    dispatcher.on("fragile", || panic!("listener failure"));
    dispatcher.on("fragile", || tracing::info!("sibling still runs"));
    dispatcher.emit("fragile", ());

    dispatcher.remove_all_listeners(["message", "swap", "fragile"]);

    let metrics = dispatcher.metrics();
    tracing::info!(
        emits = metrics.emit_count,
        delivered = metrics.delivered_count,
        skipped = metrics.skipped_count,
        panics = metrics.panic_count,
        keys = dispatcher.event_keys().len(),
        "Demo finished"
    );

    Ok(())
}
