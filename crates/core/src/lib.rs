//! Domain types and pure logic for the Canvas AI editor.
//!
//! Nothing in this crate performs I/O: storage lives in `canvas-db`,
//! the vendor client in `canvas-gemini` and orchestration in
//! `canvas-editor`.

pub mod actions;
pub mod error;
pub mod export;
pub mod history;
pub mod image;
pub mod types;
