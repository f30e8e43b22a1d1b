//! Critical Mass - a worker that keeps participation fulfillment flags in step
//! with each campaign's critical mass.
//!
//! This library provides the domain types, the pure evaluator, the store
//! effects and their GraphQL interpreter, and the polling reconciler.

pub mod effects;
pub mod evaluator;
pub mod gateway;
pub mod types;
pub mod worker;

#[cfg(test)]
pub mod test_utils;
