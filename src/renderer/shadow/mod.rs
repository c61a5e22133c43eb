//! Shadow mapping module
//!
//! Light-space transforms, depth capture (GPU pass and CPU reference
//! rasterizer) and the hard shadow test.

mod directional;
mod light_space;
mod sampling;
mod shadow_map;

pub use directional::{DirectionalShadow, ShadowCapture};
pub use light_space::LightSpaceTransform;
pub use sampling::{shadow_bias, shadow_factor};
pub use shadow_map::{pack_depth, unpack_depth, ShadowMap};

/// How captured depth is stored in the shadow map texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthEncoding {
    /// A `Depth32Float` texture read directly.
    #[default]
    Native,
    /// Depth split into four base-256 digits of an `Rgba8Unorm` texel.
    PackedRgba8,
}

/// Angle-dependent depth bias used by the shadow test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowBias {
    /// Lower bound applied when the surface faces the light.
    pub min_bias: f32,
    /// Bias added per unit of `1 - dot(N, L)`.
    pub slope_scale: f32,
}

impl Default for ShadowBias {
    fn default() -> Self {
        Self {
            min_bias: 0.0005,
            slope_scale: 0.0005,
        }
    }
}

/// Shadow map configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Shadow map resolution (width and height).
    pub resolution: u32,
    /// Storage format of captured depth.
    pub encoding: DepthEncoding,
    /// Bias applied by the shadow test.
    pub bias: ShadowBias,
}

impl ShadowConfig {
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    pub fn with_encoding(mut self, encoding: DepthEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_bias(mut self, bias: ShadowBias) -> Self {
        self.bias = bias;
        self
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            encoding: DepthEncoding::Native,
            bias: ShadowBias::default(),
        }
    }
}

/// Identifies one completed depth capture.
///
/// Handles are only minted by a capture, so holding one means the map it
/// names has been written at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMapHandle {
    generation: u64,
    resolution: u32,
    encoding: DepthEncoding,
}

impl ShadowMapHandle {
    pub(crate) fn new(generation: u64, resolution: u32, encoding: DepthEncoding) -> Self {
        Self {
            generation,
            resolution,
            encoding,
        }
    }

    /// Capture counter value at the time the map was written.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn encoding(&self) -> DepthEncoding {
        self.encoding
    }
}
