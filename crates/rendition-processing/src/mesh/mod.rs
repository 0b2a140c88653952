//! 3D scene processors: GLB thumbnails and glTF archive expansion.

mod archive;
mod glb;

pub use archive::{select_scene, GltfArchiveExtractor};
pub use glb::GlbProcessor;
