//! Dispatcher metrics recorded through the global `metrics` recorder.
//!
//! All series carry an `event` label with the event key.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Register descriptions for every dispatcher series with the installed
/// recorder. Called by the Prometheus installer; harmless without one.
pub fn describe_metrics() {
    describe_counter!("event_dispatcher_emits_total", "Emit calls per event key");
    describe_counter!(
        "event_dispatcher_deliveries_total",
        "Listener invocations started per event key"
    );
    describe_counter!(
        "event_dispatcher_skipped_total",
        "Listeners passed over because their signature did not match the emission"
    );
    describe_counter!(
        "event_dispatcher_handler_panics_total",
        "Listener invocations that panicked"
    );
    describe_histogram!(
        "event_dispatcher_handler_duration_ms",
        Unit::Milliseconds,
        "Wall time of one listener invocation"
    );
    describe_gauge!(
        "event_dispatcher_listeners",
        Unit::Count,
        "Listeners currently registered per event key"
    );
}

/// Record one emit call
pub fn record_emit(event: &str) {
    counter!("event_dispatcher_emits_total", "event" => event.to_string()).increment(1);
}

/// Record one listener invocation started
pub fn record_delivery(event: &str) {
    counter!("event_dispatcher_deliveries_total", "event" => event.to_string()).increment(1);
}

/// Record listeners passed over because their signature did not match
pub fn record_skipped(event: &str, count: u64) {
    if count > 0 {
        counter!("event_dispatcher_skipped_total", "event" => event.to_string()).increment(count);
    }
}

/// Record a listener invocation that panicked
pub fn record_handler_panic(event: &str) {
    counter!("event_dispatcher_handler_panics_total", "event" => event.to_string()).increment(1);
}

/// Record how long one listener invocation ran
pub fn record_handler_duration_ms(event: &str, duration_ms: f64) {
    histogram!("event_dispatcher_handler_duration_ms", "event" => event.to_string())
        .record(duration_ms);
}

/// Record the current number of listeners on a key
pub fn record_listener_count(event: &str, count: usize) {
    gauge!("event_dispatcher_listeners", "event" => event.to_string()).set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_emit("message");
        record_delivery("message");
        record_skipped("message", 0);
        record_skipped("message", 2);
        record_handler_panic("message");
        record_handler_duration_ms("message", 0.5);
        record_listener_count("message", 3);
    }
}
