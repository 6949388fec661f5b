//! Rendering pipeline
//!
//! wgpu-based renderer: environment background pass, PBR object pass with
//! ACES tone mapping, and the UI overlay hook.

pub mod pipeline_manager;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
