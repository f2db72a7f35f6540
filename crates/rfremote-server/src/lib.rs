//! # rfremote-server
//!
//! HTTP listener for the remote keyword protocol. One configured port,
//! one path: POST bodies go to the RPC endpoint, DELETE shuts the
//! listener down, and every other method serves a human-readable
//! introspection page built from the live registry.

#![deny(unsafe_code)]

pub mod config;
mod page;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{Listener, ListenerState, ServerError};
pub use shutdown::ShutdownSignal;
