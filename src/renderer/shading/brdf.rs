//! Lambert diffuse + Blinn-Phong specular

use glam::Vec3;

/// Ambient strength applied to the albedo.
pub const DEFAULT_AMBIENT: f32 = 0.04;

/// Display gamma.
pub const GAMMA: f32 = 2.2;

/// Surface material parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    /// Linear albedo.
    pub albedo: Vec3,
    /// Metallic scalar in [0, 1].
    pub metallic: f32,
    /// Roughness scalar in [0, 1].
    pub roughness: f32,
}

impl MaterialParams {
    pub fn new(albedo: Vec3, metallic: f32, roughness: f32) -> Self {
        Self {
            albedo,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Blinn-Phong exponent, `lerp(8, 64, 1 - roughness)`.
    pub fn shininess(&self) -> f32 {
        lerp(8.0, 64.0, 1.0 - self.roughness)
    }

    /// Specular scale, `lerp(0.1, 0.6, metallic)`.
    pub fn spec_strength(&self) -> f32 {
        lerp(0.1, 0.6, self.metallic)
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::new(Vec3::splat(0.8), 0.0, 0.5)
    }
}

/// Geometry of one shaded point. All vectors are unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Surface normal `N`.
    pub normal: Vec3,
    /// Direction toward the camera `V`.
    pub view: Vec3,
    /// Direction toward the light `L`.
    pub light: Vec3,
}

impl SurfaceSample {
    /// Build a sample from world positions, normalizing every vector.
    pub fn from_positions(position: Vec3, normal: Vec3, camera: Vec3, light_dir: Vec3) -> Self {
        Self {
            normal: normal.normalize_or(Vec3::Y),
            view: (camera - position).normalize_or(Vec3::Y),
            light: light_dir.normalize_or(Vec3::Y),
        }
    }
}

/// Diffuse plus specular, scaled by the light radiance.
///
/// Exactly zero when the surface faces away from the light.
pub fn direct_lighting(sample: &SurfaceSample, material: &MaterialParams, radiance: Vec3) -> Vec3 {
    let n_dot_l = sample.normal.dot(sample.light);
    if n_dot_l <= 0.0 {
        return Vec3::ZERO;
    }

    let diffuse = material.albedo * n_dot_l;

    let half = (sample.light + sample.view).normalize_or(sample.normal);
    let n_dot_h = sample.normal.dot(half).max(0.0);
    let spec = n_dot_h.powf(material.shininess()) * material.spec_strength();

    (diffuse + Vec3::splat(spec)) * radiance
}

/// Linear color: `ambient * albedo + shadow * direct`.
pub fn shade(
    sample: &SurfaceSample,
    material: &MaterialParams,
    radiance: Vec3,
    ambient: f32,
    shadow: f32,
) -> Vec3 {
    material.albedo * ambient + shadow.clamp(0.0, 1.0) * direct_lighting(sample, material, radiance)
}

/// Component-wise `pow(c, 1 / 2.2)`.
pub fn gamma_encode(color: Vec3) -> Vec3 {
    color.max(Vec3::ZERO).powf(1.0 / GAMMA)
}

/// Rec. 709 luma weights.
pub fn luminance(color: Vec3) -> f32 {
    color.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_material() -> MaterialParams {
        MaterialParams::new(Vec3::new(0.533, 0.706, 1.0), 0.1, 0.3)
    }

    #[test]
    fn test_back_facing_has_no_direct_light() {
        let material = sphere_material();
        let normals = [Vec3::Y, Vec3::X, Vec3::new(0.3, -0.2, 0.9).normalize()];
        for n in normals {
            // light on the far side of the surface
            for l in [-n, (-n + n.any_orthonormal_vector()).normalize()] {
                let sample = SurfaceSample {
                    normal: n,
                    view: n,
                    light: l,
                };
                assert_eq!(direct_lighting(&sample, &material, Vec3::ONE), Vec3::ZERO);
                for shadow in [0.0, 1.0] {
                    let color = shade(&sample, &material, Vec3::ONE, DEFAULT_AMBIENT, shadow);
                    assert_eq!(color, material.albedo * DEFAULT_AMBIENT);
                }
            }
        }
    }

    #[test]
    fn test_color_never_below_ambient() {
        let material = sphere_material();
        let ambient = material.albedo * DEFAULT_AMBIENT;
        let sample = SurfaceSample::from_positions(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::Y,
            Vec3::new(0.0, 1.5, 4.0),
            Vec3::new(3.0, 8.0, 2.0),
        );
        for shadow in [0.0, 1.0] {
            let color = shade(&sample, &material, Vec3::ONE, DEFAULT_AMBIENT, shadow);
            assert!(color.cmpge(ambient).all());
        }

        let shadowed = shade(&sample, &material, Vec3::ONE, DEFAULT_AMBIENT, 0.0);
        assert_eq!(shadowed, ambient);
        assert!(shadowed.cmpgt(Vec3::ZERO).all());
    }

    #[test]
    fn test_head_on_light_value() {
        let material = MaterialParams::new(Vec3::splat(0.5), 0.0, 1.0);
        let sample = SurfaceSample {
            normal: Vec3::Y,
            view: Vec3::Y,
            light: Vec3::Y,
        };
        // diffuse 0.5, N.H = 1 so spec = 0.1
        let color = shade(&sample, &material, Vec3::ONE, 0.04, 1.0);
        assert!((color - Vec3::splat(0.02 + 0.5 + 0.1)).length() < 1e-6);
    }

    #[test]
    fn test_material_lerps() {
        let m = MaterialParams::new(Vec3::ONE, 1.0, 0.0);
        assert_eq!(m.shininess(), 64.0);
        assert!((m.spec_strength() - 0.6).abs() < 1e-7);
        let m = MaterialParams::new(Vec3::ONE, 0.0, 1.0);
        assert_eq!(m.shininess(), 8.0);
        assert!((m.spec_strength() - 0.1).abs() < 1e-7);
    }

    #[test]
    fn test_gamma_encode() {
        let encoded = gamma_encode(Vec3::new(0.0, 1.0, 0.5));
        assert_eq!(encoded.x, 0.0);
        assert_eq!(encoded.y, 1.0);
        assert!((encoded.z - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
    }
}
