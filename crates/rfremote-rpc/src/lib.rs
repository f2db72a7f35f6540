//! # rfremote-rpc
//!
//! The remote keyword protocol: a JSON request/response envelope, the five
//! protocol methods over a shared keyword registry, and the encoding of
//! run results into the wire structure clients consume.

#![deny(unsafe_code)]

pub mod dispatch;
pub mod encoder;
pub mod errors;
pub mod types;

pub use dispatch::{RemoteRpc, RpcEndpoint};
pub use encoder::encode_run_result;
pub use errors::EndpointError;
pub use types::{RpcErrorBody, RpcRequest, RpcResponse};
