//! Error types
//!
//! Domain errors for asset import, animation data and shader composition.
//! GPU resource construction keeps returning `anyhow::Result`.

use std::path::PathBuf;

/// Errors raised while importing a skinned model.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to import glTF '{path}': {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("'{0}' contains no skin")]
    MissingSkin(PathBuf),

    #[error("'{0}' contains no mesh bound to its skin")]
    MissingMesh(PathBuf),

    #[error("mesh in '{path}' has no {attribute} attribute")]
    MissingAttribute {
        path: PathBuf,
        attribute: &'static str,
    },

    #[error("invalid skeleton in '{path}': {source}")]
    Skeleton {
        path: PathBuf,
        #[source]
        source: AnimationError,
    },

    #[error("loader for '{0}' stopped before delivering a result")]
    Disconnected(PathBuf),
}

/// Errors raised while assembling skeletons and clips.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimationError {
    #[error("joint {joint} lists parent {parent}, parents must precede their children")]
    ParentOrder { joint: usize, parent: usize },

    #[error("track targets joint {joint} but the skeleton has {count} joints")]
    JointOutOfRange { joint: usize, count: usize },

    #[error("vertex references joint {joint} but the skeleton has {count} joints")]
    InfluenceOutOfRange { joint: usize, count: usize },

    #[error("keyframe track has {times} times but {values} values")]
    TrackLength { times: usize, values: usize },
}

/// Errors raised while composing WGSL modules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("shader module '{0}' added twice")]
    DuplicateModule(String),

    #[error("shader composition has no modules")]
    Empty,
}
