//! Detached Fan-out Example
//!
//! Loads a dispatcher configuration (detached invocation unless the file
//! or `DISPATCHER_INVOCATION` says otherwise), then emits readings to
//! listeners that run on the tokio blocking pool while `emit` returns
//! immediately.
//!
//! Run with: cargo run --bin detached_fanout [config.toml]

use std::path::PathBuf;
use std::time::Duration;

use config_loader::ConfigLoader;
use dispatcher::Dispatcher;
use observability::{LogFormat, ObservabilityConfig};
use tokio::sync::mpsc;

const READINGS: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut obs = ObservabilityConfig::from_env()?;
    if std::env::var_os("DISPATCHER_LOG_FORMAT").is_none() {
        obs.log_format = LogFormat::Compact;
    }
    observability::init_with_config(obs)?;

    // ==== Stage 1: configuration ====
    let path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(path) = &path {
        tracing::info!(path = %path.display(), "Loading dispatcher config");
    }
    let config = ConfigLoader::load_or_default(path.as_deref())?;
    let dispatcher = Dispatcher::from_config(&config)?;
    tracing::info!(mode = ?dispatcher.invocation_mode(), "Dispatcher ready");

    // ==== Stage 2: listeners ====
    let (tx, mut rx) = mpsc::unbounded_channel::<(&'static str, u32)>();
    for name in ["logger", "aggregator", "archiver"] {
        let tx = tx.clone();
        dispatcher.on("reading", move |seq: u32, value: f64| {
            std::thread::sleep(Duration::from_millis(20));
            tracing::debug!(listener = name, seq, value, "reading handled");
            let _ = tx.send((name, seq));
        });
    }
    drop(tx);

    // ==== Stage 3: emit without waiting for listeners ====
    for seq in 0..READINGS {
        dispatcher.emit("reading", (seq, f64::from(seq) * 0.5));
    }
    tracing::info!("All readings emitted");

    let expected = READINGS as usize * 3;
    let mut handled = 0usize;
    while handled < expected {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(_)) => handled += 1,
            Ok(None) | Err(_) => break,
        }
    }

    let metrics = dispatcher.metrics();
    tracing::info!(
        handled,
        delivered = metrics.delivered_count,
        panics = metrics.panic_count,
        "Demo finished"
    );

    Ok(())
}
