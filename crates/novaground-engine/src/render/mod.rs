//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and create them
//! lazily on first use, rebuilding when the surface format changes.
//!
//! Convention:
//! - world space is right-handed, +Z up, units are metres
//! - meshes are authored in model space and placed with a per-draw model matrix
//! - the vertex shader receives `view_proj * model` as a single uniform

mod color_mesh;
mod ctx;
mod mesh;

pub use color_mesh::{ColorMeshRenderer, MeshDraw};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{Mesh, MeshHandle, Topology};
