//! PADDOCK — timed betting-round engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod command;
pub mod config;
pub mod engine;
pub mod types;
