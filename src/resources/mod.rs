//! Resource management
//!
//! GPU-side resources of the camera background: the quad geometry, its
//! per-frame UVs, the camera and depth textures, and the two material
//! variants with their asynchronous loader.

mod loader;
mod material;
mod mesh;
mod texture;
mod uv;

pub use loader::*;
pub use material::*;
pub use mesh::*;
pub use texture::*;
pub use uv::*;
