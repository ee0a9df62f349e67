//! Strata CLI - Command-line interface for Strata.
//!
//! This crate provides the `strata` tool: it reconciles declared models
//! against the schema snapshot and writes up/down migrations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod prompt;
