//! # Contracts
//!
//! Shared vocabulary for the event dispatcher workspace.
//! Every other crate may depend on this one; it depends on no workspace crate.
//!
//! ## Contents
//! - [`EventKey`]: cheap-to-clone event name used as the registry key
//! - [`DispatcherConfig`] / [`InvocationMode`]: how handlers are run
//! - [`ContractError`]: configuration and IO errors

mod config;
mod error;
mod event_key;

pub use config::*;
pub use error::*;
pub use event_key::EventKey;
