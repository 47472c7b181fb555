//! NovaGround engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the station binary,
//! and the vertex-colour pipeline that draws the 3D rocket view.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod color;
pub mod camera;
pub mod shader;
pub mod render;
