//! Store interpreter trait.
//!
//! Implementations:
//! - [`crate::gateway::GraphQlClient`] executes effects against the remote store
//! - the test `MockStore` executes them against in-memory campaigns

use std::future::Future;

use super::{StoreEffect, StoreResponse};

/// Interprets store effects.
///
/// Effects are executed one at a time; the reconciler awaits each call before
/// issuing the next, so implementations need not handle concurrent calls from
/// a single worker.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct EmptyStore;
///
/// impl StoreInterpreter for EmptyStore {
///     type Error = std::io::Error;
///
///     async fn interpret(&self, effect: StoreEffect) -> Result<StoreResponse, Self::Error> {
///         match effect {
///             StoreEffect::FetchCampaigns => Ok(StoreResponse::Campaigns(vec![])),
///             _ => Ok(StoreResponse::AffectedRows(1)),
///         }
///     }
/// }
/// ```
pub trait StoreInterpreter {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a store effect and return its response.
    fn interpret(
        &self,
        effect: StoreEffect,
    ) -> impl Future<Output = Result<StoreResponse, Self::Error>> + Send;
}
