/// WGSL source of the vertex-colour pipeline.
pub const COLOR_WGSL: &str = include_str!("color.wgsl");

/// Fragment entry point shared by both vertex variants.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Conventional name of the MVP uniform.
///
/// WGSL binds by slot (`@group(0) @binding(0)`), so this only appears in
/// diagnostics.
pub const MVP_UNIFORM_NAME: &str = "p3d_ModelViewProjectionMatrix";

/// Which vertex stage a pipeline is built with.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShaderVariant {
    /// Positions are already clip-space; they are only homogenized.
    Passthrough,
    /// Positions are transformed by the MVP uniform.
    #[default]
    ModelViewProjection,
}

impl ShaderVariant {
    pub const fn vertex_entry(self) -> &'static str {
        match self {
            Self::Passthrough => "vs_passthrough",
            Self::ModelViewProjection => "vs_mvp",
        }
    }

    pub const fn uses_transform(self) -> bool {
        matches!(self, Self::ModelViewProjection)
    }
}
