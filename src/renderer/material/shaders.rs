//! WGSL sources of the surface and depth pipelines

use crate::core::shader::{ShaderComposer, ShaderModule};
use crate::error::ShaderError;
use crate::renderer::shadow::DepthEncoding;

pub const MODEL: ShaderModule = ShaderModule::new("model", include_str!("../../shaders/model.wgsl"));
pub const FRAME: ShaderModule = ShaderModule::new("frame", include_str!("../../shaders/frame.wgsl"));
pub const DEPTH: ShaderModule = ShaderModule::new("depth", include_str!("../../shaders/depth.wgsl"));
pub const SHADOW_NATIVE: ShaderModule = ShaderModule::new(
    "shadow_depth",
    include_str!("../../shaders/shadow_native.wgsl"),
);
pub const SHADOW_PACKED: ShaderModule = ShaderModule::new(
    "shadow_depth",
    include_str!("../../shaders/shadow_packed.wgsl"),
);
pub const SHADOW: ShaderModule = ShaderModule::new("shadow", include_str!("../../shaders/shadow.wgsl"));
pub const LIGHTING: ShaderModule =
    ShaderModule::new("lighting", include_str!("../../shaders/lighting.wgsl"));
pub const ANALYTIC: ShaderModule =
    ShaderModule::new("analytic", include_str!("../../shaders/analytic.wgsl"));
pub const OVERLAY: ShaderModule =
    ShaderModule::new("overlay", include_str!("../../shaders/overlay.wgsl"));

/// Module providing `load_shadow_depth` for `encoding`.
pub fn shadow_lookup(encoding: DepthEncoding) -> ShaderModule {
    match encoding {
        DepthEncoding::Native => SHADOW_NATIVE,
        DepthEncoding::PackedRgba8 => SHADOW_PACKED,
    }
}

/// Full source of a surface pipeline whose fragment stage is `surface`.
pub fn surface_source(encoding: DepthEncoding, surface: ShaderModule) -> Result<String, ShaderError> {
    ShaderComposer::new()
        .module(MODEL)?
        .module(FRAME)?
        .module(shadow_lookup(encoding))?
        .module(SHADOW)?
        .module(LIGHTING)?
        .module(surface)?
        .compose()
}

/// Full source of the depth capture pipeline.
pub fn depth_source() -> Result<String, ShaderError> {
    ShaderComposer::new().module(MODEL)?.module(DEPTH)?.compose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_source_picks_depth_lookup() {
        let native = surface_source(DepthEncoding::Native, ANALYTIC).unwrap();
        assert!(native.contains("texture_depth_2d"));
        assert!(!native.contains("unpack_depth"));

        let packed = surface_source(DepthEncoding::PackedRgba8, OVERLAY).unwrap();
        assert!(packed.contains("unpack_depth"));
        assert!(!packed.contains("texture_depth_2d"));
    }

    #[test]
    fn test_declarations_precede_use() {
        let source = surface_source(DepthEncoding::Native, ANALYTIC).unwrap();
        let declared = source.find("fn load_shadow_depth").unwrap();
        let used = source.find("load_shadow_depth(texel)").unwrap();
        assert!(declared < used);
        let frame = source.find("var<uniform> frame").unwrap();
        let shadow = source.find("fn shadow_factor").unwrap();
        assert!(frame < shadow);
    }

    #[test]
    fn test_depth_source_has_both_fragment_entries() {
        let source = depth_source().unwrap();
        assert!(source.contains("fn fs_native"));
        assert!(source.contains("fn fs_packed"));
    }
}
