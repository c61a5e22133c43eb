//! Asynchronous asset loading
//!
//! Imports run on a worker thread; the frame loop polls the returned
//! [`PendingModel`] without blocking.

mod gltf_loader;

pub use gltf_loader::{load_skinned_model, skinned_model_from_document};

use crate::animation::AnimatedModel;
use crate::error::AssetError;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Spawns skinned model imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetLoader;

impl AssetLoader {
    /// Import a skinned glTF/GLB model with its clips on a worker thread.
    pub fn load_skinned(path: impl Into<PathBuf>) -> PendingModel {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        tracing::info!("loading skinned model '{}'", path.display());

        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("umbra-asset-loader".into())
            .spawn(move || {
                let result = load_skinned_model(&worker_path);
                // receiver gone means nobody waits for the model anymore
                let _ = tx.send(result);
            });
        if let Err(err) = spawned {
            // the sender was dropped with the closure, so polling reports a disconnect
            tracing::error!("failed to spawn asset loader thread: {}", err);
        }

        PendingModel {
            path,
            receiver: rx,
            finished: false,
        }
    }
}

/// Handle to an in-flight model import.
pub struct PendingModel {
    path: PathBuf,
    receiver: mpsc::Receiver<Result<AnimatedModel, AssetError>>,
    finished: bool,
}

impl PendingModel {
    /// Non-blocking check. Yields the result once, then `None`.
    pub fn poll(&mut self) -> Option<Result<AnimatedModel, AssetError>> {
        if self.finished {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(AssetError::Disconnected(self.path.clone()))
            }
        };
        self.finished = true;
        Some(result)
    }

    /// Block until the import finishes.
    pub fn wait(self) -> Result<AnimatedModel, AssetError> {
        self.receiver
            .recv()
            .map_err(|_| AssetError::Disconnected(self.path.clone()))?
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn from_receiver(
        path: PathBuf,
        receiver: mpsc::Receiver<Result<AnimatedModel, AssetError>>,
    ) -> Self {
        Self {
            path,
            receiver,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_empty_then_result_once() {
        let (tx, rx) = mpsc::channel();
        let mut pending = PendingModel::from_receiver("model.glb".into(), rx);
        assert!(pending.poll().is_none());

        tx.send(Err(AssetError::MissingSkin("model.glb".into())))
            .unwrap();
        assert!(matches!(pending.poll(), Some(Err(AssetError::MissingSkin(_)))));
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_dropped_worker_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<Result<AnimatedModel, AssetError>>();
        drop(tx);
        let mut pending = PendingModel::from_receiver("model.glb".into(), rx);
        assert!(matches!(pending.poll(), Some(Err(AssetError::Disconnected(_)))));
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let pending = AssetLoader::load_skinned("does/not/exist.glb");
        assert_eq!(pending.path(), Path::new("does/not/exist.glb"));
        assert!(matches!(pending.wait(), Err(AssetError::NotFound(_))));
    }
}
