//! GPU resource management
//!
//! Materials, textures, and the global uniform bindings shared by every
//! pipeline: camera matrices, the directional light, tone-mapping exposure,
//! and the equirectangular environment map.

pub mod environment_map;
pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use environment_map::EnvironmentMapBinding;
pub use global_bindings::{GlobalBindings, GlobalUBO, LightConfig};
pub use material::{Material, MaterialManager};
pub use texture_resource::TextureResource;
