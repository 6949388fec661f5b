//! Startup asset loading
//!
//! Two sequential stages: the HDR environment map first, then the glTF
//! scene, issued only once the environment stage has succeeded. Both run on
//! a worker thread ([`loader`]) so the render loop keeps ticking while they
//! decode; results and failures come back as typed events.

pub mod environment;
pub mod loader;
pub mod model;

pub use environment::EnvironmentImage;
pub use loader::{AssetEvent, AssetLoader, AssetStage, AssetStatusBoard, StageStatus};
pub use model::LoadedModel;

/// Errors from the asset decoding stages.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode environment map: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to load glTF scene: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("mesh primitive '{0}' has no vertex positions")]
    MissingPositions(String),
}
