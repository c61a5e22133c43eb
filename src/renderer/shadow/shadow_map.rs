//! CPU shadow map
//!
//! Software counterpart of the GPU depth pass. Triangles are rasterized in
//! light texture space with pixel-centre sampling and no face culling, and
//! every texel keeps the nearest depth.

use super::{DepthEncoding, LightSpaceTransform};
use crate::renderer::geometry::MeshData;
use glam::{Mat4, Vec2, Vec3};

/// Depth every texel holds after a clear.
pub const FAR_DEPTH: f32 = 1.0;

const DIGIT_BASE: f32 = 256.0;

/// Split a depth in `[0, 1]` into four base-256 digits, most significant first.
pub fn pack_depth(depth: f32) -> [u8; 4] {
    let mut rest = depth.clamp(0.0, 1.0);
    let mut digits = [0u8; 4];
    for digit in &mut digits {
        rest *= DIGIT_BASE;
        let whole = rest.floor().min(255.0);
        *digit = whole as u8;
        rest -= whole;
    }
    digits
}

/// Inverse of [`pack_depth`].
pub fn unpack_depth(digits: [u8; 4]) -> f32 {
    let mut scale = 1.0 / DIGIT_BASE;
    let mut depth = 0.0;
    for digit in digits {
        depth += digit as f32 * scale;
        scale /= DIGIT_BASE;
    }
    depth
}

#[derive(Debug, Clone)]
enum DepthStorage {
    Float(Vec<f32>),
    Packed(Vec<[u8; 4]>),
}

/// Square depth image captured from the light.
#[derive(Debug, Clone)]
pub struct ShadowMap {
    resolution: u32,
    storage: DepthStorage,
}

impl ShadowMap {
    /// Allocate a map cleared to [`FAR_DEPTH`].
    pub fn new(resolution: u32, encoding: DepthEncoding) -> Self {
        let resolution = resolution.max(1);
        let texels = (resolution as usize) * (resolution as usize);
        let storage = match encoding {
            DepthEncoding::Native => DepthStorage::Float(vec![FAR_DEPTH; texels]),
            DepthEncoding::PackedRgba8 => DepthStorage::Packed(vec![[255; 4]; texels]),
        };
        Self {
            resolution,
            storage,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn encoding(&self) -> DepthEncoding {
        match self.storage {
            DepthStorage::Float(_) => DepthEncoding::Native,
            DepthStorage::Packed(_) => DepthEncoding::PackedRgba8,
        }
    }

    /// Reset every texel to the far depth.
    pub fn clear(&mut self) {
        match &mut self.storage {
            DepthStorage::Float(texels) => texels.fill(FAR_DEPTH),
            // opaque white, the packed clear colour
            DepthStorage::Packed(texels) => texels.fill([255; 4]),
        }
    }

    /// Overwrite every texel with `depth`.
    pub fn fill(&mut self, depth: f32) {
        match &mut self.storage {
            DepthStorage::Float(texels) => texels.fill(depth),
            DepthStorage::Packed(texels) => texels.fill(pack_depth(depth)),
        }
    }

    /// Decoded depth of a texel. Coordinates are clamped to the map.
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        let index = self.index(x, y);
        match &self.storage {
            DepthStorage::Float(texels) => texels[index],
            DepthStorage::Packed(texels) => unpack_depth(texels[index]),
        }
    }

    /// Store `depth` if it is nearer than the current texel value.
    pub fn write_min(&mut self, x: u32, y: u32, depth: f32) {
        let index = self.index(x, y);
        match &mut self.storage {
            DepthStorage::Float(texels) => {
                if depth < texels[index] {
                    texels[index] = depth;
                }
            }
            DepthStorage::Packed(texels) => {
                if depth < unpack_depth(texels[index]) {
                    texels[index] = pack_depth(depth);
                }
            }
        }
    }

    /// Clear the map, then rasterize every caster seen through `transform`.
    pub fn capture<'a, I>(&mut self, transform: &LightSpaceTransform, casters: I)
    where
        I: IntoIterator<Item = (Mat4, &'a MeshData)>,
    {
        self.clear();
        let shadow_matrix = transform.shadow_matrix();
        for (model, mesh) in casters {
            for tri in mesh.world_triangles(model) {
                let projected = tri.map(|p| shadow_matrix.project_point3(p));
                self.rasterize_triangle(projected);
            }
        }
    }

    /// Rasterize one triangle given in texture space (`uv` in xy, depth in z).
    pub fn rasterize_triangle(&mut self, tri: [Vec3; 3]) {
        if tri.iter().any(|p| !p.is_finite()) {
            return;
        }

        let res = self.resolution as f32;
        let [a, b, c] = tri.map(|p| Vec2::new(p.x * res, p.y * res));
        let area = edge(a, b, c);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().min(res) as u32).min(self.resolution);
        let y1 = (max.y.ceil().min(res) as u32).min(self.resolution);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * tri[0].z + w1 * tri[1].z + w2 * tri[2].z;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                self.write_min(x, y, depth);
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        let max = self.resolution - 1;
        (y.min(max) as usize) * (self.resolution as usize) + x.min(max) as usize
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_depth_digits() {
        assert_eq!(pack_depth(0.0), [0, 0, 0, 0]);
        assert_eq!(pack_depth(0.5), [128, 0, 0, 0]);
        assert_eq!(pack_depth(1.0), [255, 255, 255, 255]);

        let depth = 0.424_317_2;
        assert!((unpack_depth(pack_depth(depth)) - depth).abs() < 1e-6);
    }

    #[test]
    fn test_packed_clear_decodes_to_far() {
        let map = ShadowMap::new(4, DepthEncoding::PackedRgba8);
        assert!((map.depth_at(2, 2) - FAR_DEPTH).abs() < 1e-6);
    }

    #[test]
    fn test_write_min_keeps_nearest() {
        for encoding in [DepthEncoding::Native, DepthEncoding::PackedRgba8] {
            let mut map = ShadowMap::new(2, encoding);
            map.write_min(1, 0, 0.4);
            map.write_min(1, 0, 0.7);
            assert!((map.depth_at(1, 0) - 0.4).abs() < 1e-6);
            assert!((map.depth_at(0, 0) - FAR_DEPTH).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rasterize_covers_either_winding() {
        let mut map = ShadowMap::new(8, DepthEncoding::Native);
        let tri = [
            Vec3::new(0.0, 0.0, 0.25),
            Vec3::new(1.0, 0.0, 0.25),
            Vec3::new(0.0, 1.0, 0.25),
        ];
        map.rasterize_triangle(tri);
        assert_eq!(map.depth_at(1, 1), 0.25);
        // outside the hypotenuse
        assert_eq!(map.depth_at(7, 7), FAR_DEPTH);

        let mut flipped = ShadowMap::new(8, DepthEncoding::Native);
        flipped.rasterize_triangle([tri[0], tri[2], tri[1]]);
        assert_eq!(flipped.depth_at(1, 1), 0.25);
    }

    #[test]
    fn test_rasterize_skips_depth_outside_range() {
        let mut map = ShadowMap::new(4, DepthEncoding::Native);
        map.rasterize_triangle([
            Vec3::new(-1.0, -1.0, 1.5),
            Vec3::new(3.0, -1.0, 1.5),
            Vec3::new(-1.0, 3.0, 1.5),
        ]);
        assert_eq!(map.depth_at(0, 0), FAR_DEPTH);
    }

    #[test]
    fn test_capture_without_casters_is_far() {
        let mut map = ShadowMap::new(16, DepthEncoding::Native);
        map.fill(0.1);
        map.capture(&LightSpaceTransform::default(), std::iter::empty());
        assert_eq!(map.depth_at(8, 8), FAR_DEPTH);
    }
}
