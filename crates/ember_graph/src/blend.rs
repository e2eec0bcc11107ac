//! Blend-state derivation.
//!
//! Hashable mirror types for `wgpu::BlendState`/`BlendComponent`, grounded in
//! the engine's existing `pipeline_key` module, which mirrors non-`Hash`
//! `wgpu` descriptor types for use as pipeline cache keys. Blend components
//! are already plain enums, so the mirror here exists mainly to keep the
//! cache-key shape consistent with the rest of the pipeline key.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentKey {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl From<wgpu::BlendComponent> for BlendComponentKey {
    fn from(c: wgpu::BlendComponent) -> Self {
        Self {
            src_factor: c.src_factor,
            dst_factor: c.dst_factor,
            operation: c.operation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateKey {
    pub color: BlendComponentKey,
    pub alpha: BlendComponentKey,
}

impl From<wgpu::BlendState> for BlendStateKey {
    fn from(s: wgpu::BlendState) -> Self {
        Self {
            color: s.color.into(),
            alpha: s.alpha.into(),
        }
    }
}

/// True for integer and depth/stencil formats, which never support
/// alpha-blending regardless of what the pass declared.
#[must_use]
pub fn forces_blend_disabled(format: wgpu::TextureFormat) -> bool {
    use wgpu::TextureFormat::{
        Depth16Unorm, Depth24Plus, Depth24PlusStencil8, Depth32Float, Depth32FloatStencil8, R8Sint, R8Uint, R16Sint,
        R16Uint, R32Sint, R32Uint, Rg8Sint, Rg8Uint, Rg16Sint, Rg16Uint, Rg32Sint, Rg32Uint, Rgba8Sint, Rgba8Uint,
        Rgba16Sint, Rgba16Uint, Rgba32Sint, Rgba32Uint,
    };
    matches!(
        format,
        R8Uint
            | R8Sint
            | R16Uint
            | R16Sint
            | R32Uint
            | R32Sint
            | Rg8Uint
            | Rg8Sint
            | Rg16Uint
            | Rg16Sint
            | Rg32Uint
            | Rg32Sint
            | Rgba8Uint
            | Rgba8Sint
            | Rgba16Uint
            | Rgba16Sint
            | Rgba32Uint
            | Rgba32Sint
            | Depth16Unorm
            | Depth24Plus
            | Depth24PlusStencil8
            | Depth32Float
            | Depth32FloatStencil8
    )
}

/// Derives the blend state a color attachment should build its pipeline
/// with: the declared state (defaulting to opaque overwrite) unless the
/// format forces blending off.
#[must_use]
pub fn derive_blend_state(format: wgpu::TextureFormat, declared: Option<wgpu::BlendState>) -> Option<wgpu::BlendState> {
    if forces_blend_disabled(format) {
        return None;
    }
    Some(declared.unwrap_or(wgpu::BlendState::REPLACE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_format_forces_blend_disabled_even_when_declared() {
        let resolved = derive_blend_state(wgpu::TextureFormat::Rgba8Uint, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert_eq!(resolved, None);
    }

    #[test]
    fn default_color_format_gets_opaque_overwrite() {
        let resolved = derive_blend_state(wgpu::TextureFormat::Rgba8Unorm, None);
        assert_eq!(resolved, Some(wgpu::BlendState::REPLACE));
    }
}
