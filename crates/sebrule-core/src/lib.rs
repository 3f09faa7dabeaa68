//! Safe Exam Browser configuration handling.
//!
//! - [`plist`]: the property-list document model and its canonical serialization
//! - [`compile`]: turns quiz settings into a configuration document and config key
//! - [`cipher`]: the encrypted `.seb` container
//! - [`access`]: request validation against the stored keys

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod browser_keys;
pub mod cipher;
pub mod compile;
pub mod config_key;
pub mod filter_rule;
pub mod plist;
pub mod prelude;

// vim: ts=4
