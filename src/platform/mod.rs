//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Keyboard input mapping (both targets)
//! - The JavaScript bridge (wasm32 only)

pub mod keys;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use keys::{KeyAction, key_down, key_up};
