//! Release of the camera stream's GPU resources

use crate::backend::*;

/// Everything a camera stream owns on the GPU, collected for release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSet {
    pub vertex_buffer: VertexBufferHandle,
    pub index_buffer: IndexBufferHandle,
    /// Present only if the renderable was ever created
    pub entity: Option<EntityHandle>,
    pub textures: Vec<TextureHandle>,
}

impl ReleaseSet {
    /// Destroy the resources, provided the engine is still alive.
    ///
    /// Returns `false` when the engine was already gone and nothing was
    /// touched. Handles of a dead engine are meaningless, so they are dropped.
    pub fn release(self, engine: &dyn RenderEngine, scene: &dyn RenderScene) -> bool {
        if !engine.is_valid() {
            log::warn!("Rendering engine is gone; skipping camera stream cleanup");
            return false;
        }

        if let Some(entity) = self.entity {
            scene.remove_entity(entity);
            engine.destroy_entity(entity);
        }
        for texture in self.textures {
            engine.destroy_texture(texture);
        }
        engine.destroy_vertex_buffer(self.vertex_buffer);
        engine.destroy_index_buffer(self.index_buffer);

        log::debug!(
            "Released camera stream buffers {:?} / {:?}",
            self.vertex_buffer,
            self.index_buffer
        );
        true
    }
}
