//! Per-quiz settings: the save pathway and the management endpoints

pub mod handler;
pub mod service;

// vim: ts=4
