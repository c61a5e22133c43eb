//! Joint hierarchy and linear blend skinning

use crate::core::vertex::{SkinnedVertex, VertexPN};
use crate::error::AnimationError;
use glam::{Mat4, Quat, Vec3};

/// Local transform of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl JointPose {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, always lower than this joint's index.
    pub parent: Option<usize>,
    pub rest_pose: JointPose,
    pub inverse_bind: Mat4,
}

/// Joints ordered parents first.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self, AnimationError> {
        for (index, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= index {
                    return Err(AnimationError::ParentOrder {
                        joint: index,
                        parent,
                    });
                }
            }
        }
        Ok(Self { joints })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Rest pose of every joint.
    pub fn rest_poses(&self) -> Vec<JointPose> {
        self.joints.iter().map(|joint| joint.rest_pose).collect()
    }

    /// Model-space transform of every joint.
    pub fn global_matrices(&self, poses: &[JointPose], out: &mut Vec<Mat4>) {
        out.clear();
        for (index, joint) in self.joints.iter().enumerate() {
            let local = poses
                .get(index)
                .unwrap_or(&joint.rest_pose)
                .to_matrix();
            let global = match joint.parent {
                Some(parent) => out[parent] * local,
                None => local,
            };
            out.push(global);
        }
    }

    /// `global * inverse_bind` for every joint.
    pub fn skinning_matrices(&self, poses: &[JointPose], out: &mut Vec<Mat4>) {
        self.global_matrices(poses, out);
        for (matrix, joint) in out.iter_mut().zip(&self.joints) {
            *matrix *= joint.inverse_bind;
        }
    }

    /// Check that every weighted influence names an existing joint.
    pub fn validate_influences(&self, vertices: &[SkinnedVertex]) -> Result<(), AnimationError> {
        let count = self.joints.len();
        for vertex in vertices {
            for (joint, weight) in vertex.joints.iter().zip(vertex.weights) {
                if weight > 0.0 && *joint as usize >= count {
                    return Err(AnimationError::InfluenceOutOfRange {
                        joint: *joint as usize,
                        count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Deform `vertices` by the weighted sum of their joint matrices.
///
/// Weights are renormalized; a vertex without weight keeps its bind pose.
pub fn skin_vertices(vertices: &[SkinnedVertex], matrices: &[Mat4], out: &mut Vec<VertexPN>) {
    out.clear();
    out.extend(vertices.iter().map(|vertex| {
        let mut blended = Mat4::ZERO;
        let mut total = 0.0;
        for (joint, weight) in vertex.joints.iter().zip(vertex.weights) {
            if weight <= 0.0 {
                continue;
            }
            if let Some(matrix) = matrices.get(*joint as usize) {
                blended += *matrix * weight;
                total += weight;
            }
        }

        let position = Vec3::from(vertex.position);
        let normal = Vec3::from(vertex.normal);
        if total <= f32::EPSILON {
            return VertexPN::new(vertex.position, vertex.normal);
        }
        let blended = blended * (1.0 / total);

        VertexPN::new(
            blended.transform_point3(position).to_array(),
            blended
                .transform_vector3(normal)
                .normalize_or(normal)
                .to_array(),
        )
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(name: &str, parent: Option<usize>, translation: Vec3) -> Joint {
        let rest_pose = JointPose {
            translation,
            ..Default::default()
        };
        Joint {
            name: name.into(),
            parent,
            rest_pose,
            inverse_bind: Mat4::IDENTITY,
        }
    }

    #[test]
    fn test_parent_order_enforced() {
        let err = Skeleton::new(vec![
            joint("child", Some(1), Vec3::ZERO),
            joint("root", None, Vec3::ZERO),
        ])
        .unwrap_err();
        assert_eq!(err, AnimationError::ParentOrder { joint: 0, parent: 1 });
    }

    #[test]
    fn test_global_matrices_chain() {
        let skeleton = Skeleton::new(vec![
            joint("root", None, Vec3::new(0.0, 1.0, 0.0)),
            joint("arm", Some(0), Vec3::new(1.0, 0.0, 0.0)),
        ])
        .unwrap();
        let mut globals = Vec::new();
        skeleton.global_matrices(&skeleton.rest_poses(), &mut globals);
        let tip = globals[1].transform_point3(Vec3::ZERO);
        assert!((tip - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_skinning_blends_weights() {
        let matrices = [
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        ];
        let vertex = SkinnedVertex {
            position: [1.0, 0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            joints: [0, 1, 0, 0],
            weights: [0.5, 0.5, 0.0, 0.0],
        };
        let mut out = Vec::new();
        skin_vertices(&[vertex], &matrices, &mut out);
        assert!((Vec3::from(out[0].position) - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(out[0].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unweighted_vertex_keeps_bind_pose() {
        let vertex = SkinnedVertex {
            position: [0.5, 0.5, 0.5],
            normal: [1.0, 0.0, 0.0],
            joints: [0; 4],
            weights: [0.0; 4],
        };
        let mut out = Vec::new();
        skin_vertices(&[vertex], &[Mat4::from_scale(Vec3::splat(3.0))], &mut out);
        assert_eq!(out[0], VertexPN::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_influence_out_of_range() {
        let skeleton = Skeleton::new(vec![joint("root", None, Vec3::ZERO)]).unwrap();
        let vertex = SkinnedVertex {
            position: [0.0; 3],
            normal: [0.0, 1.0, 0.0],
            joints: [0, 3, 0, 0],
            weights: [0.5, 0.5, 0.0, 0.0],
        };
        assert_eq!(
            skeleton.validate_influences(&[vertex]),
            Err(AnimationError::InfluenceOutOfRange { joint: 3, count: 1 })
        );
    }
}
