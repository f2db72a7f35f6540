//! # rfremote-core
//!
//! Shared vocabulary for the remote keyword server:
//! - **Values**: the argument types the wire protocol can carry
//! - **Results**: run outcomes with failure classification
//! - **Names**: friendly snake_case derivation for keyword identifiers
//! - **Errors**: the error type keyword handlers fail with

#![deny(unsafe_code)]

pub mod errors;
pub mod names;
pub mod result;
pub mod value;

pub use errors::KeywordError;
pub use names::friendly_name;
pub use result::{FailureKind, ReturnValue, RunResult, RunStatus};
pub use value::Value;
