//! Remote store gateway.
//!
//! This module executes store effects against the campaign store's GraphQL
//! endpoint via `reqwest`. It implements the `StoreInterpreter` trait defined
//! in the effects module.
//!
//! Key features:
//! - Endpoint, admin secret and per-call timeout read from the environment
//! - GraphQL `errors` arrays and non-2xx statuses surface as errors
//! - Errors are categorized as transient or permanent for logging

mod client;
mod error;
mod interpreter;

pub use client::{DEFAULT_REQUEST_TIMEOUT_SECS, GatewayConfig, GraphQlClient};
pub use error::{GatewayConfigError, GatewayError, GatewayErrorKind};
