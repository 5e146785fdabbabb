//! `canvas` command-line front end.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod commands;
pub mod config;
