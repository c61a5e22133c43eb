//! glTF skinned model import

use crate::animation::{
    AnimatedModel, AnimationClip, InterpolationMode, Joint, JointPose, KeyframeTrack, Skeleton,
    Track, TrackData,
};
use crate::core::vertex::SkinnedVertex;
use crate::error::AssetError;
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use std::collections::HashMap;
use std::path::Path;

/// Import the first skin of a glTF/GLB file, its mesh and every clip.
pub fn load_skinned_model(path: &Path) -> Result<AnimatedModel, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }

    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let model = skinned_model_from_document(path, &document, &buffers)?;
    tracing::info!(
        "loaded '{}': {} joints, {} vertices, {} clips",
        path.display(),
        model.skeleton().len(),
        model.skinned_vertices().len(),
        model.clips().len()
    );
    Ok(model)
}

/// Build an [`AnimatedModel`] from an already parsed document.
///
/// `path` only labels errors.
pub fn skinned_model_from_document(
    path: &Path,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<AnimatedModel, AssetError> {
    let skin = document
        .skins()
        .next()
        .ok_or_else(|| AssetError::MissingSkin(path.to_path_buf()))?;

    let skin_nodes: Vec<gltf::Node> = skin.joints().collect();
    // glTF node index -> position in the skin's joint list
    let node_to_skin: HashMap<usize, usize> = skin_nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (node.index(), position))
        .collect();

    let mut skin_parents = vec![None; skin_nodes.len()];
    for (position, node) in skin_nodes.iter().enumerate() {
        for child in node.children() {
            if let Some(&child_position) = node_to_skin.get(&child.index()) {
                skin_parents[child_position] = Some(position);
            }
        }
    }

    let order = parent_first_order(&skin_parents);
    let mut skin_to_joint = vec![0usize; order.len()];
    for (joint, &position) in order.iter().enumerate() {
        skin_to_joint[position] = joint;
    }

    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_binds: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; skin_nodes.len()],
    };

    let joints = order
        .iter()
        .map(|&position| {
            let node = &skin_nodes[position];
            let (translation, rotation, scale) = node.transform().decomposed();
            Joint {
                name: node
                    .name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("joint{}", node.index())),
                parent: skin_parents[position].map(|parent| skin_to_joint[parent]),
                rest_pose: JointPose {
                    translation: Vec3::from(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from(scale),
                },
                inverse_bind: inverse_binds
                    .get(position)
                    .copied()
                    .unwrap_or(Mat4::IDENTITY),
            }
        })
        .collect();

    let skeleton = Skeleton::new(joints).map_err(|source| AssetError::Skeleton {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = document
        .nodes()
        .filter(|node| node.skin().is_some_and(|s| s.index() == skin.index()))
        .find_map(|node| node.mesh())
        .ok_or_else(|| AssetError::MissingMesh(path.to_path_buf()))?;

    let (vertices, indices) = read_skinned_mesh(path, &mesh, buffers, &skin_to_joint)?;

    let node_to_joint: HashMap<usize, usize> = node_to_skin
        .iter()
        .map(|(&node, &position)| (node, skin_to_joint[position]))
        .collect();
    let clips = document
        .animations()
        .map(|animation| read_clip(&animation, buffers, &node_to_joint))
        .collect();

    AnimatedModel::new(skeleton, vertices, indices, clips).map_err(|source| AssetError::Skeleton {
        path: path.to_path_buf(),
        source,
    })
}

/// Order joints so every parent precedes its children.
fn parent_first_order(parents: &[Option<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(parents.len());
    let mut placed = vec![false; parents.len()];

    for index in 0..parents.len() {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(joint) = current {
            if placed[joint] || chain.len() > parents.len() {
                break;
            }
            chain.push(joint);
            current = parents[joint];
        }
        for joint in chain.into_iter().rev() {
            if !placed[joint] {
                placed[joint] = true;
                order.push(joint);
            }
        }
    }

    order
}

fn read_skinned_mesh(
    path: &Path,
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    skin_to_joint: &[usize],
) -> Result<(Vec<SkinnedVertex>, Vec<u32>), AssetError> {
    let missing = |attribute| AssetError::MissingAttribute {
        path: path.to_path_buf(),
        attribute,
    };

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let base = vertices.len() as u32;

        let positions = reader.read_positions().ok_or_else(|| missing("POSITION"))?;
        let normals = reader.read_normals().ok_or_else(|| missing("NORMAL"))?;
        let joints = reader
            .read_joints(0)
            .ok_or_else(|| missing("JOINTS_0"))?
            .into_u16();
        let weights = reader
            .read_weights(0)
            .ok_or_else(|| missing("WEIGHTS_0"))?
            .into_f32();

        let start = vertices.len();
        vertices.extend(positions.zip(normals).zip(joints.zip(weights)).map(
            |((position, normal), (joints, weights))| SkinnedVertex {
                position,
                normal,
                joints: joints.map(|j| {
                    skin_to_joint
                        .get(j as usize)
                        .map_or(j, |&joint| joint as u16)
                }),
                weights,
            },
        ));
        let count = (vertices.len() - start) as u32;

        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| base + i)),
            None => indices.extend(base..base + count),
        }
    }

    tracing::debug!(
        "mesh '{}': {} vertices, {} indices",
        mesh.name().unwrap_or("unnamed"),
        vertices.len(),
        indices.len()
    );
    Ok((vertices, indices))
}

fn read_clip(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    node_to_joint: &HashMap<usize, usize>,
) -> AnimationClip {
    let name = animation
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("clip{}", animation.index()));
    let mut tracks = Vec::new();

    for channel in animation.channels() {
        let target = channel.target();
        let Some(&joint) = node_to_joint.get(&target.node().index()) else {
            tracing::debug!("clip '{}': skipping channel on non-joint node", name);
            continue;
        };

        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let data = match outputs {
            ReadOutputs::Translations(values) => KeyframeTrack::new(
                times,
                values.map(Vec3::from).collect(),
                interpolation,
            )
            .map(TrackData::Translation),
            ReadOutputs::Rotations(values) => KeyframeTrack::new(
                times,
                values.into_f32().map(Quat::from_array).collect(),
                interpolation,
            )
            .map(TrackData::Rotation),
            ReadOutputs::Scales(values) => KeyframeTrack::new(
                times,
                values.map(Vec3::from).collect(),
                interpolation,
            )
            .map(TrackData::Scale),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };

        match data {
            Ok(data) => tracks.push(Track { joint, data }),
            Err(err) => tracing::warn!("clip '{}': dropping malformed track: {}", name, err),
        }
    }

    AnimationClip::new(name, tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two-joint skin listed child first, one triangle and a clip lifting the
    // root by two units over one second.
    const SKINNED_TRIANGLE: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "body", "mesh": 0, "skin": 0 },
            { "name": "root", "children": [2] },
            { "name": "tip", "translation": [0.0, 1.0, 0.0] }
        ],
        "skins": [{ "joints": [2, 1], "inverseBindMatrices": 5 }],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1, "JOINTS_0": 2, "WEIGHTS_0": 3 },
                "indices": 4
            }]
        }],
        "animations": [{
            "name": "lift",
            "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
            "samplers": [{ "input": 6, "output": 7, "interpolation": "LINEAR" }]
        }],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "VEC4" },
            { "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" },
            { "bufferView": 4, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 5, "componentType": 5126, "count": 2, "type": "MAT4" },
            { "bufferView": 6, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 7, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 72, "byteLength": 24 },
            { "buffer": 0, "byteOffset": 96, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 144, "byteLength": 6 },
            { "buffer": 0, "byteOffset": 152, "byteLength": 128 },
            { "buffer": 0, "byteOffset": 280, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 288, "byteLength": 24 }
        ],
        "buffers": [{
            "byteLength": 312,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAAAAAAABAAIAAAAAAIA/AAAAAAAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAACAvwAAAAAAAIA/AACAPwAAAAAAAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAACAPwAAAAAAAIA/AAAAAAAAAAAAAAAAAAAAAAAAAEAAAAAA"
        }]
    }"#;

    fn import_triangle() -> AnimatedModel {
        let (document, buffers, _) = gltf::import_slice(SKINNED_TRIANGLE.as_bytes()).unwrap();
        skinned_model_from_document(Path::new("triangle.gltf"), &document, &buffers).unwrap()
    }

    #[test]
    fn test_parent_first_order() {
        assert_eq!(parent_first_order(&[Some(1), None]), vec![1, 0]);
        assert_eq!(
            parent_first_order(&[Some(2), None, Some(1)]),
            vec![1, 2, 0]
        );
        assert_eq!(parent_first_order(&[None, None]), vec![0, 1]);
    }

    #[test]
    fn test_skin_reordered_parent_first() {
        let model = import_triangle();
        let joints = model.skeleton().joints();
        assert_eq!(joints[0].name, "root");
        assert_eq!(joints[1].name, "tip");
        assert_eq!(joints[1].parent, Some(0));
        assert_eq!(joints[1].rest_pose.translation, Vec3::Y);
    }

    #[test]
    fn test_mesh_and_clip_imported() {
        let model = import_triangle();
        assert_eq!(model.indices(), &[0, 1, 2]);
        assert_eq!(model.clips().len(), 1);
        let clip = &model.clips()[0];
        assert_eq!(clip.name, "lift");
        assert_eq!(clip.duration, 1.0);
        assert_eq!(clip.tracks[0].joint, 0);
    }

    #[test]
    fn test_bind_pose_is_rest_pose() {
        let model = import_triangle();
        let expected = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        for (vertex, expected) in model.skinned_vertices().iter().zip(expected) {
            assert!((Vec3::from(vertex.position) - Vec3::from(expected)).length() < 1e-5);
        }
    }

    #[test]
    fn test_clip_moves_every_vertex() {
        let mut model = import_triangle();
        model.advance(0.5);
        let expected = [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 2.0, 0.0]];
        for (vertex, expected) in model.skinned_vertices().iter().zip(expected) {
            assert!((Vec3::from(vertex.position) - Vec3::from(expected)).length() < 1e-5);
        }
    }

    #[test]
    fn test_document_without_skin() {
        let json = r#"{ "asset": { "version": "2.0" } }"#;
        let (document, buffers, _) = gltf::import_slice(json.as_bytes()).unwrap();
        let err = skinned_model_from_document(Path::new("empty.gltf"), &document, &buffers)
            .unwrap_err();
        assert!(matches!(err, AssetError::MissingSkin(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_skinned_model(Path::new("no/such/model.glb")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
