//! Command implementations for the CLI
//!
//! - start: Start the HTTP server
//! - generate: Produce a change order from text, a PDF or stdin
//! - test: Test configuration validity
//! - config: Configuration display and validation

pub mod config;
pub mod generate;
pub mod start;
