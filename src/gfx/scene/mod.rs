//! Scene management
//!
//! The flat object list the renderer draws, the material store, and the
//! collision mesh the first-person controller probes. Objects arrive from
//! the glTF loader; the scene owns everything, controllers only borrow.

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object};
pub use scene::Scene;
pub use vertex::Vertex3D;
