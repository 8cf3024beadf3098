//! Core types and trait definitions for the roster record store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; storage backends implement
//! [`store::RecordStore`] and the services in `roster-sync` consume it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod mapper;
pub mod payload;
pub mod projection;
pub mod record;
pub mod scan;
pub mod store;

pub use error::{Error, Result};
