pub mod camera;
pub mod first_person;
pub mod navigation;
pub mod orbit;

// Re-export main types
pub use camera::{Camera, CameraUniform};
pub use first_person::FirstPersonController;
pub use navigation::{NavigationMode, Navigator};
pub use orbit::OrbitController;
