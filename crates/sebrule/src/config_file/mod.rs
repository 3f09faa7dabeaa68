//! Uploaded configuration files

pub mod handler;

// vim: ts=4
