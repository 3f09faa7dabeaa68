//! Configuration templates shared by quizzes

pub mod cache;
pub mod handler;

// vim: ts=4
