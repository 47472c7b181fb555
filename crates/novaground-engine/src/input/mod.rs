//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into [`KeyEvent`]s.

mod key;

pub use key::{Key, KeyEvent, KeyState};

pub(crate) use key::translate_key_event;
