//! Shared types, adapter traits, and the error type of sebrule.
//!
//! This crate contains the types that are shared between the service crate
//! and the adapter implementations, so adapters can be built without the
//! HTTP layer.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod blob_adapter;
pub mod error;
pub mod extract;
pub mod meta_adapter;
pub mod prelude;
pub mod settings;
pub mod types;

// vim: ts=4
