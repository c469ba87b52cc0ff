//! Core types and logic for the glean warehouse assistant.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod context;
pub mod conversation;
pub mod error;
pub mod export;
pub mod generate;
pub mod insight;
pub mod registry;
pub mod store;
pub mod table;

pub use error::{Error, Result};
