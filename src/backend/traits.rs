//! Collaborator traits for the rendering engine and its scene
//!
//! The camera stream never owns the engine or the scene. It receives them as
//! shared handles at construction and drives them through these traits, so
//! any engine (or the in-memory [`DummyEngine`](super::dummy::DummyEngine))
//! can sit underneath.

use crate::backend::types::*;
use glam::Vec4;
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create renderable: {0}")]
    RenderableCreationFailed(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Device lost")]
    DeviceLost,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Rendering engine operations used by the camera stream.
///
/// Methods take `&self`; implementations use interior mutability. All calls
/// are made from the thread that owns the camera stream.
pub trait RenderEngine: Send + Sync {
    /// Whether the engine is still alive. Nothing may be created or destroyed
    /// once this returns `false`.
    fn is_valid(&self) -> bool;

    // Geometry

    /// Allocate a vertex buffer
    fn create_vertex_buffer(&self, desc: &VertexBufferDescriptor)
        -> EngineResult<VertexBufferHandle>;

    /// Upload the contents of one buffer slot
    fn set_vertex_buffer_at(&self, buffer: VertexBufferHandle, slot: u32, data: &[u8]);

    /// Allocate an index buffer
    fn create_index_buffer(&self, desc: &IndexBufferDescriptor) -> EngineResult<IndexBufferHandle>;

    /// Upload index data
    fn set_index_buffer(&self, buffer: IndexBufferHandle, data: &[u8]);

    fn destroy_vertex_buffer(&self, buffer: VertexBufferHandle);

    fn destroy_index_buffer(&self, buffer: IndexBufferHandle);

    // Textures

    /// Create a texture backed by a platform image stream
    fn create_external_texture(&self, desc: &ExternalTextureDescriptor)
        -> EngineResult<TextureHandle>;

    /// Create a texture populated by [`write_texture`](Self::write_texture)
    fn create_texture(&self, desc: &TextureDescriptor) -> EngineResult<TextureHandle>;

    /// Replace the full contents of a texture
    fn write_texture(&self, texture: TextureHandle, data: &[u8]);

    fn destroy_texture(&self, texture: TextureHandle);

    // Materials

    /// Bind a texture to a named sampler parameter
    fn set_material_texture(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
        texture: TextureHandle,
        sampler: SamplerDescriptor,
    );

    /// Set a named float4 array parameter
    fn set_material_float4_array(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
        values: &[Vec4],
    );

    // Entities

    /// Allocate a new entity id
    fn create_entity(&self) -> EntityHandle;

    /// Attach a renderable component to an entity
    fn build_renderable(&self, entity: EntityHandle, desc: &RenderableDescriptor)
        -> EngineResult<()>;

    /// Swap the material instance of one primitive
    fn set_renderable_material(
        &self,
        entity: EntityHandle,
        primitive: usize,
        material: MaterialInstanceHandle,
    );

    fn set_renderable_priority(&self, entity: EntityHandle, priority: RenderPriority);

    fn destroy_entity(&self, entity: EntityHandle);
}

/// The scene the camera background is drawn in
pub trait RenderScene: Send + Sync {
    fn add_entity(&self, entity: EntityHandle);

    fn remove_entity(&self, entity: EntityHandle);

    fn contains_entity(&self, entity: EntityHandle) -> bool;
}
