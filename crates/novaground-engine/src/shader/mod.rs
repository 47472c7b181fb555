//! Vertex-colour shader pipeline.
//!
//! The GPU programs live in `color.wgsl`. The same stages are mirrored on the
//! CPU in [`stages`] so that the contract of each stage can be checked without
//! a device:
//!
//! | Stage | GPU entry point | CPU mirror |
//! |-------|-----------------|------------|
//! | vertex, clip-space input | `vs_passthrough` | [`vertex_passthrough`] |
//! | vertex, MVP uniform | `vs_mvp` | [`vertex_mvp`], [`vertex_transform`] |
//! | rasterizer varying | fixed function | [`interpolate`] |
//! | fragment | `fs_main` | [`fragment_passthrough`] |

mod source;
mod stages;
mod vertex;

pub use source::{ShaderVariant, COLOR_WGSL, FRAGMENT_ENTRY, MVP_UNIFORM_NAME};
pub use stages::{
    fragment_passthrough, interpolate, vertex_mvp, vertex_passthrough, vertex_transform,
    ClipVertex,
};
pub use vertex::{ColorVertex, TransformUniform};
