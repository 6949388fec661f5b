//! # Graphics Module
//!
//! Everything between the scene description and the screen:
//!
//! - **Camera System** ([`camera`]) - The shared perspective camera, the
//!   orbit and first-person controllers, and the navigation mode switch
//! - **Rendering Pipeline** ([`rendering`]) - Environment background and PBR
//!   passes with ACES tone mapping
//! - **Scene Management** ([`scene`]) - Object list, materials, collision
//! - **Resource Management** ([`resources`]) - Materials, textures, global
//!   uniforms, and the environment map binding

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{Camera, NavigationMode, Navigator};
pub use rendering::render_engine::RenderEngine;
pub use scene::Scene;
