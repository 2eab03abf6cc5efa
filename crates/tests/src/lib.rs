//! # Integration Tests
//!
//! Cross-crate and concurrency tests.
//!
//! Covers:
//! - Config file -> ConfigLoader -> Dispatcher
//! - Many threads registering, emitting and removing on one dispatcher
//! - Once listeners racing across threads and runtime workers

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::InvocationMode::default();
        let _ = contracts::EventKey::from("compile");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::ConfigLoader;
    use dispatcher::{Arg, Dispatcher, InvocationMode};

    /// Config file on disk -> loader -> dispatcher -> typed fan-out
    #[tokio::test(flavor = "multi_thread")]
    async fn test_e2e_config_to_detached_dispatch() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "invocation = \"detached\"").unwrap();
        writeln!(file, "listener_warn_threshold = 16").unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert_eq!(dispatcher.invocation_mode(), InvocationMode::Detached);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<&'static str>();
        let t = tx.clone();
        dispatcher.on("reading", move |_: String, _: f64| {
            let _ = t.send("pair");
        });
        let t = tx.clone();
        dispatcher.on("reading", move |_: Arg| {
            let _ = t.send("any");
        });
        dispatcher.on("reading", move |_: String| {
            let _ = tx.send("string");
        });

        dispatcher.emit("reading", ("temperature".to_string(), 21.5f64));

        let mut got = Vec::new();
        while let Ok(Some(tag)) = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
            got.push(tag);
        }
        assert_eq!(got, vec!["pair"]);
    }

    #[test]
    fn test_e2e_config_to_synchronous_dispatch() {
        let config = ConfigLoader::load_from_str(
            r#"{ "invocation": "synchronous" }"#,
            config_loader::ConfigFormat::Json,
        )
        .unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = std::sync::Arc::clone(&seen);
        dispatcher.on("message", move |msg: String| s.lock().unwrap().push(msg));

        dispatcher.emit("message", ("one".to_string(),));
        dispatcher.emit("message", ("two".to_string(),));
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }
}

#[cfg(test)]
mod stress_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use dispatcher::Dispatcher;

    const THREADS: u64 = 8;
    const ROUNDS: u64 = 200;
    const ONCE_PER_THREAD: u64 = 50;

    /// Concurrent register / emit / remove on shared keys, then check that
    /// the registry holds exactly what should remain.
    #[test]
    fn test_concurrent_mutation_keeps_registry_consistent() {
        let dispatcher = Dispatcher::synchronous();
        let persistent_hits = Arc::new(AtomicU64::new(0));
        let once_hits = Arc::new(AtomicU64::new(0));

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let dispatcher = &dispatcher;
                let persistent_hits = Arc::clone(&persistent_hits);
                let once_hits = Arc::clone(&once_hits);

                scope.spawn(move || {
                    let own_key = format!("thread-{t}");
                    for i in 0..ROUNDS {
                        let hits = Arc::clone(&persistent_hits);
                        let id = dispatcher.on("shared", move |_: u64| {
                            hits.fetch_add(1, Ordering::Relaxed);
                        });
                        dispatcher.on(own_key.as_str(), || {});

                        if i < ONCE_PER_THREAD {
                            let hits = Arc::clone(&once_hits);
                            dispatcher.once("once", move |_: u64| {
                                hits.fetch_add(1, Ordering::Relaxed);
                            });
                        }

                        dispatcher.emit("shared", (i,));
                        dispatcher.emit("once", (i,));

                        if i % 2 == 0 {
                            assert!(dispatcher.remove_listener("shared", id));
                        }
                    }
                });
            }
        });

        // drain once listeners that no emission reached yet
        dispatcher.emit("once", (0u64,));

        assert_eq!(dispatcher.listener_count("shared"), (THREADS * ROUNDS / 2) as usize);
        assert_eq!(once_hits.load(Ordering::Relaxed), THREADS * ONCE_PER_THREAD);
        assert_eq!(dispatcher.listener_count("once"), 0);
        for t in 0..THREADS {
            assert_eq!(dispatcher.listener_count(format!("thread-{t}")), ROUNDS as usize);
        }

        // every surviving shared listener runs exactly once more
        let before = persistent_hits.load(Ordering::Relaxed);
        dispatcher.emit("shared", (0u64,));
        assert_eq!(
            persistent_hits.load(Ordering::Relaxed) - before,
            THREADS * ROUNDS / 2
        );

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.emit_count, THREADS * ROUNDS * 2 + 2);
        assert_eq!(metrics.panic_count, 0);
    }

    #[test]
    fn test_remove_all_during_concurrent_emits() {
        let dispatcher = Dispatcher::synchronous();
        let hits = Arc::new(AtomicU64::new(0));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let dispatcher = &dispatcher;
                let hits = Arc::clone(&hits);
                scope.spawn(move || {
                    for _ in 0..500 {
                        let h = Arc::clone(&hits);
                        dispatcher.on("churn", move || {
                            h.fetch_add(1, Ordering::Relaxed);
                        });
                        dispatcher.emit("churn", ());
                    }
                });
            }
            let dispatcher = &dispatcher;
            scope.spawn(move || {
                for _ in 0..200 {
                    dispatcher.remove_all_listeners(["churn"]);
                }
            });
        });

        dispatcher.remove_all_listeners(["churn"]);
        let before = hits.load(Ordering::Relaxed);
        dispatcher.emit("churn", ());
        assert_eq!(hits.load(Ordering::Relaxed), before);
        assert!(!dispatcher.has_listeners("churn"));
    }

    /// Once listeners consumed from many runtime workers at once, with
    /// detached invocation.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_detached_once_race() {
        let dispatcher = Arc::new(Dispatcher::detached(tokio::runtime::Handle::current()));
        let hits = Arc::new(AtomicU64::new(0));

        for _ in 0..100 {
            let h = Arc::clone(&hits);
            dispatcher.once("race", move |_: u32| {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }

        let mut tasks = Vec::new();
        for i in 0..200u32 {
            let dispatcher = Arc::clone(&dispatcher);
            tasks.push(tokio::spawn(async move {
                dispatcher.emit("race", (i,));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while hits.load(Ordering::SeqCst) < 100 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 100);
        assert_eq!(dispatcher.listener_count("race"), 0);
    }

    /// A detached listener that re-emits its own key does not deadlock.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_detached_recursive_emit() {
        let dispatcher = Arc::new(Dispatcher::detached(tokio::runtime::Handle::current()));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let d = Arc::downgrade(&dispatcher);
        dispatcher.on("countdown", move |n: u32| {
            let _ = tx.send(n);
            if n > 0 {
                if let Some(d) = d.upgrade() {
                    d.emit("countdown", (n - 1,));
                }
            }
        });

        dispatcher.emit("countdown", (5u32,));

        let mut got = Vec::new();
        for _ in 0..6 {
            let n = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            got.push(n);
        }
        assert_eq!(got, vec![5, 4, 3, 2, 1, 0]);
    }
}
