// src/lib.rs
//! Bothy 3D Viewer
//!
//! A native scene viewer built on wgpu and winit: loads an HDR environment
//! map and a glTF model, renders them with a physically-based tone-mapped
//! pipeline, and switches between orbit and first-person navigation from a
//! settings panel.

pub mod app;
pub mod assets;
pub mod collision;
pub mod gfx;
pub mod settings;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{BothyApp, ViewerConfig};
pub use settings::ViewerSettings;

/// Creates a viewer instance with the default asset paths
pub fn default() -> BothyApp {
    pollster::block_on(BothyApp::new(ViewerConfig::default()))
}
