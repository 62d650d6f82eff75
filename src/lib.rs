//! Frame-driven simulation core for a vertical UFO shooter.
//!
//! `compute` holds the pure per-frame logic, `session` wraps it in the level
//! state machine, and the binary in `main.rs` draws the result in a terminal.

pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod levels;
pub mod session;
