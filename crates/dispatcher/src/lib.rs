//! # Dispatcher
//!
//! In-process typed publish/subscribe.
//!
//! Responsibilities:
//! - Register listeners against event keys, recording each listener's
//!   parameter signature
//! - Emit an argument list to every listener whose signature accepts it
//! - Once-only listeners, removal by [`ListenerId`], clearing whole keys
//! - Contain listener panics; never hold the registry lock during a call
//!
//! ## Example
//!
//! ```
//! use dispatcher::{Arg, Dispatcher};
//!
//! let dispatcher = Dispatcher::synchronous();
//! dispatcher.on("message", |msg: String| println!("string: {msg}"));
//! dispatcher.on("message", |msg: String, n: i64| println!("pair: {msg} {n}"));
//! dispatcher.on("message", |arg: Arg| println!("any: {}", arg.type_name()));
//!
//! // reaches the first and third listeners only
//! dispatcher.emit("message", ("hello".to_string(),));
//! ```

mod arg;
pub mod dispatcher;
pub mod error;
mod invoke;
mod listener;
pub mod metrics;
mod registry;
mod signature;

pub use arg::{Arg, IntoArgs};
pub use contracts::{DispatcherConfig, EventKey, InvocationMode};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use listener::{IntoListener, Listener, ListenerId, Param};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use signature::{ParamType, Signature};
