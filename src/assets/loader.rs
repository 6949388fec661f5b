//! Background asset loading pipeline
//!
//! Runs the two decode stages on a worker thread and reports typed events
//! over a channel. The channel is FIFO, so the environment result is always
//! integrated before the model result, and the model stage is never issued
//! unless the environment stage succeeded.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::environment::{self, EnvironmentImage};
use super::model::{self, LoadedModel};
use super::AssetError;

/// Which pipeline stage an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStage {
    Environment,
    Model,
}

impl std::fmt::Display for AssetStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetStage::Environment => write!(f, "environment map"),
            AssetStage::Model => write!(f, "model"),
        }
    }
}

/// Completion events delivered to the render loop.
pub enum AssetEvent {
    EnvironmentLoaded(EnvironmentImage),
    ModelLoaded(LoadedModel),
    LoadFailed {
        stage: AssetStage,
        error: AssetError,
    },
}

/// Handle to the loader thread. Dropping it detaches the thread; an
/// abandoned load finishes into a closed channel and is discarded.
pub struct AssetLoader {
    receiver: Receiver<AssetEvent>,
}

impl AssetLoader {
    /// Starts loading both startup assets in the background.
    pub fn spawn(environment_path: PathBuf, model_path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || run_pipeline(&environment_path, &model_path, &sender))
            .expect("Failed to spawn asset loader thread");

        Self { receiver }
    }

    /// Drains every event that has arrived since the last poll. Never
    /// blocks; meant to be called once per render tick.
    pub fn poll(&self) -> Vec<AssetEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Lifecycle of one loading stage, as shown in the status panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Ready,
    Failed(String),
}

/// What the status panel displays for the two startup assets.
pub struct AssetStatusBoard {
    pub environment: StageStatus,
    pub model: StageStatus,
}

impl AssetStatusBoard {
    pub fn new() -> Self {
        Self {
            environment: StageStatus::Pending,
            model: StageStatus::Pending,
        }
    }

    pub fn set(&mut self, stage: AssetStage, status: StageStatus) {
        match stage {
            AssetStage::Environment => self.environment = status,
            AssetStage::Model => self.model = status,
        }
    }
}

impl Default for AssetStatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn run_pipeline(
    environment_path: &std::path::Path,
    model_path: &std::path::Path,
    sender: &Sender<AssetEvent>,
) {
    match environment::load(environment_path) {
        Ok(env) => {
            if sender.send(AssetEvent::EnvironmentLoaded(env)).is_err() {
                return;
            }
        }
        Err(error) => {
            log::error!("environment map load failed: {error}");
            let _ = sender.send(AssetEvent::LoadFailed {
                stage: AssetStage::Environment,
                error,
            });
            // The model stage depends on a lit scene; skip it entirely.
            return;
        }
    }

    match model::load(model_path) {
        Ok(loaded) => {
            let _ = sender.send(AssetEvent::ModelLoaded(loaded));
        }
        Err(error) => {
            log::error!("model load failed: {error}");
            let _ = sender.send(AssetEvent::LoadFailed {
                stage: AssetStage::Model,
                error,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_missing_environment_skips_model_stage() {
        let (sender, receiver) = mpsc::channel();
        run_pipeline(
            Path::new("does/not/exist.hdr"),
            Path::new("does/not/exist.gltf"),
            &sender,
        );
        drop(sender);

        let events: Vec<AssetEvent> = receiver.try_iter().collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            AssetEvent::LoadFailed { stage, .. } => {
                assert_eq!(*stage, AssetStage::Environment);
            }
            _ => panic!("expected a failure event"),
        }
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(AssetStage::Environment.to_string(), "environment map");
        assert_eq!(AssetStage::Model.to_string(), "model");
    }
}
