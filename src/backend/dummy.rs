//! Dummy rendering engine for testing and headless use.
//!
//! This engine doesn't touch a GPU. It keeps every resource it is asked to
//! create in memory and records uploads, material parameters and scene
//! membership, so the camera stream can be exercised and inspected without
//! graphics hardware.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec4;
use parking_lot::Mutex;

use super::traits::{EngineError, EngineResult, RenderEngine, RenderScene};
use super::types::*;

/// What kind of texture a dummy texture was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyTextureKind {
    External(ExternalImageId),
    Uploaded(TextureFormat),
}

/// Snapshot of a texture held by the dummy engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyTexture {
    pub kind: DummyTextureKind,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub write_count: usize,
}

impl DummyTexture {
    /// Size of a full upload; `None` for external textures.
    pub fn byte_size(&self) -> Option<usize> {
        match self.kind {
            DummyTextureKind::External(_) => None,
            DummyTextureKind::Uploaded(format) => {
                Some((self.width * self.height * format.bytes_per_pixel()) as usize)
            }
        }
    }
}

/// Snapshot of a renderable component.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyRenderable {
    pub descriptor: RenderableDescriptor,
    pub material: MaterialInstanceHandle,
    pub priority: RenderPriority,
}

#[derive(Debug, Default)]
struct DummyMaterialInstance {
    label: String,
    textures: HashMap<String, (TextureHandle, SamplerDescriptor)>,
    float4_arrays: HashMap<String, Vec<Vec4>>,
}

#[derive(Debug)]
struct DummyVertexBuffer {
    descriptor: VertexBufferDescriptor,
    slots: HashMap<u32, Vec<u8>>,
}

#[derive(Debug)]
struct DummyIndexBuffer {
    descriptor: IndexBufferDescriptor,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct DummyState {
    next_id: u64,
    vertex_buffers: HashMap<VertexBufferHandle, DummyVertexBuffer>,
    index_buffers: HashMap<IndexBufferHandle, DummyIndexBuffer>,
    textures: HashMap<TextureHandle, DummyTexture>,
    material_instances: HashMap<MaterialInstanceHandle, DummyMaterialInstance>,
    entities: HashSet<EntityHandle>,
    renderables: HashMap<EntityHandle, DummyRenderable>,
    scene: Vec<EntityHandle>,
    entities_created: usize,
}

impl DummyState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Dummy rendering engine and scene.
#[derive(Debug)]
pub struct DummyEngine {
    valid: AtomicBool,
    state: Mutex<DummyState>,
}

impl DummyEngine {
    /// Create a new, valid dummy engine.
    pub fn new() -> Self {
        Self {
            valid: AtomicBool::new(true),
            state: Mutex::new(DummyState::default()),
        }
    }

    /// Simulate engine teardown; afterwards [`RenderEngine::is_valid`] is false.
    pub fn invalidate(&self) {
        log::trace!("DummyEngine: invalidated");
        self.valid.store(false, Ordering::Release);
    }

    /// Create a material instance, standing in for a material asset build.
    pub fn create_material_instance(&self, label: &str) -> MaterialInstanceHandle {
        let mut state = self.state.lock();
        let handle = MaterialInstanceHandle::from_raw(state.next_id());
        state.material_instances.insert(
            handle,
            DummyMaterialInstance {
                label: label.to_string(),
                ..Default::default()
            },
        );
        log::trace!("DummyEngine: created material instance {label:?} ({handle:?})");
        handle
    }

    /// Label given to a material instance at creation.
    pub fn material_label(&self, material: MaterialInstanceHandle) -> Option<String> {
        self.state
            .lock()
            .material_instances
            .get(&material)
            .map(|m| m.label.clone())
    }

    /// Number of live vertex buffers.
    pub fn vertex_buffer_count(&self) -> usize {
        self.state.lock().vertex_buffers.len()
    }

    /// Number of live index buffers.
    pub fn index_buffer_count(&self) -> usize {
        self.state.lock().index_buffers.len()
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.state.lock().textures.len()
    }

    /// Descriptor a vertex buffer was created with.
    pub fn vertex_buffer_descriptor(
        &self,
        buffer: VertexBufferHandle,
    ) -> Option<VertexBufferDescriptor> {
        self.state
            .lock()
            .vertex_buffers
            .get(&buffer)
            .map(|b| b.descriptor.clone())
    }

    /// Last data uploaded to a vertex buffer slot.
    pub fn vertex_slot_data(&self, buffer: VertexBufferHandle, slot: u32) -> Option<Vec<u8>> {
        self.state
            .lock()
            .vertex_buffers
            .get(&buffer)
            .and_then(|b| b.slots.get(&slot).cloned())
    }

    /// Last data uploaded to an index buffer.
    pub fn index_data(&self, buffer: IndexBufferHandle) -> Option<Vec<u8>> {
        self.state
            .lock()
            .index_buffers
            .get(&buffer)
            .map(|b| b.data.clone())
    }

    /// Snapshot of a live texture.
    pub fn texture(&self, texture: TextureHandle) -> Option<DummyTexture> {
        self.state.lock().textures.get(&texture).cloned()
    }

    /// Texture bound to a material parameter.
    pub fn material_texture(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
    ) -> Option<TextureHandle> {
        self.state
            .lock()
            .material_instances
            .get(&material)
            .and_then(|m| m.textures.get(name))
            .map(|(texture, _)| *texture)
    }

    /// Sampler used for a material texture parameter.
    pub fn material_sampler(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
    ) -> Option<SamplerDescriptor> {
        self.state
            .lock()
            .material_instances
            .get(&material)
            .and_then(|m| m.textures.get(name))
            .map(|(_, sampler)| *sampler)
    }

    /// Float4 array bound to a material parameter.
    pub fn material_float4_array(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
    ) -> Option<Vec<Vec4>> {
        self.state
            .lock()
            .material_instances
            .get(&material)
            .and_then(|m| m.float4_arrays.get(name).cloned())
    }

    /// Snapshot of the renderable attached to an entity.
    pub fn renderable(&self, entity: EntityHandle) -> Option<DummyRenderable> {
        self.state.lock().renderables.get(&entity).cloned()
    }

    /// Total number of entities ever created.
    pub fn entities_created(&self) -> usize {
        self.state.lock().entities_created
    }

    /// Whether an entity has been created and not destroyed.
    pub fn is_entity_alive(&self, entity: EntityHandle) -> bool {
        self.state.lock().entities.contains(&entity)
    }

    /// Entities currently in the scene, in insertion order.
    pub fn scene_entities(&self) -> Vec<EntityHandle> {
        self.state.lock().scene.clone()
    }

    fn check_valid(&self) -> EngineResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(EngineError::DeviceLost)
        }
    }
}

impl Default for DummyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for DummyEngine {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn create_vertex_buffer(
        &self,
        desc: &VertexBufferDescriptor,
    ) -> EngineResult<VertexBufferHandle> {
        self.check_valid()?;
        if desc.vertex_count == 0 {
            return Err(EngineError::BufferCreationFailed(
                "vertex count cannot be zero".to_string(),
            ));
        }
        if desc
            .attributes
            .iter()
            .any(|a| a.buffer_slot >= desc.buffer_count)
        {
            return Err(EngineError::InvalidParameter(format!(
                "attribute slot out of range for {} buffers",
                desc.buffer_count
            )));
        }

        let mut state = self.state.lock();
        let handle = VertexBufferHandle::from_raw(state.next_id());
        state.vertex_buffers.insert(
            handle,
            DummyVertexBuffer {
                descriptor: desc.clone(),
                slots: HashMap::new(),
            },
        );
        log::trace!(
            "DummyEngine: creating vertex buffer {:?} ({} vertices)",
            desc.label,
            desc.vertex_count
        );
        Ok(handle)
    }

    fn set_vertex_buffer_at(&self, buffer: VertexBufferHandle, slot: u32, data: &[u8]) {
        let mut state = self.state.lock();
        match state.vertex_buffers.get_mut(&buffer) {
            Some(vb) => {
                log::trace!("DummyEngine: set_vertex_buffer_at slot={} len={}", slot, data.len());
                vb.slots.insert(slot, data.to_vec());
            }
            None => log::warn!("DummyEngine: upload to unknown vertex buffer {buffer:?}"),
        }
    }

    fn create_index_buffer(&self, desc: &IndexBufferDescriptor) -> EngineResult<IndexBufferHandle> {
        self.check_valid()?;
        if desc.index_count == 0 {
            return Err(EngineError::BufferCreationFailed(
                "index count cannot be zero".to_string(),
            ));
        }

        let mut state = self.state.lock();
        let handle = IndexBufferHandle::from_raw(state.next_id());
        state.index_buffers.insert(
            handle,
            DummyIndexBuffer {
                descriptor: desc.clone(),
                data: Vec::new(),
            },
        );
        log::trace!(
            "DummyEngine: creating index buffer {:?} ({} indices)",
            desc.label,
            desc.index_count
        );
        Ok(handle)
    }

    fn set_index_buffer(&self, buffer: IndexBufferHandle, data: &[u8]) {
        let mut state = self.state.lock();
        match state.index_buffers.get_mut(&buffer) {
            Some(ib) => {
                let expected = ib.descriptor.index_count as u64 * ib.descriptor.format.size();
                if data.len() as u64 != expected {
                    log::warn!(
                        "DummyEngine: index upload of {} bytes, expected {}",
                        data.len(),
                        expected
                    );
                }
                ib.data = data.to_vec();
            }
            None => log::warn!("DummyEngine: upload to unknown index buffer {buffer:?}"),
        }
    }

    fn destroy_vertex_buffer(&self, buffer: VertexBufferHandle) {
        if self.state.lock().vertex_buffers.remove(&buffer).is_none() {
            log::warn!("DummyEngine: destroying unknown vertex buffer {buffer:?}");
        }
    }

    fn destroy_index_buffer(&self, buffer: IndexBufferHandle) {
        if self.state.lock().index_buffers.remove(&buffer).is_none() {
            log::warn!("DummyEngine: destroying unknown index buffer {buffer:?}");
        }
    }

    fn create_external_texture(
        &self,
        desc: &ExternalTextureDescriptor,
    ) -> EngineResult<TextureHandle> {
        self.check_valid()?;
        if desc.width == 0 || desc.height == 0 {
            return Err(EngineError::TextureCreationFailed(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let mut state = self.state.lock();
        let handle = TextureHandle::from_raw(state.next_id());
        state.textures.insert(
            handle,
            DummyTexture {
                kind: DummyTextureKind::External(desc.image),
                width: desc.width,
                height: desc.height,
                data: Vec::new(),
                write_count: 0,
            },
        );
        log::trace!(
            "DummyEngine: creating external texture {:?} ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        Ok(handle)
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> EngineResult<TextureHandle> {
        self.check_valid()?;
        if desc.width == 0 || desc.height == 0 {
            return Err(EngineError::TextureCreationFailed(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let mut state = self.state.lock();
        let handle = TextureHandle::from_raw(state.next_id());
        state.textures.insert(
            handle,
            DummyTexture {
                kind: DummyTextureKind::Uploaded(desc.format),
                width: desc.width,
                height: desc.height,
                data: vec![0; desc.byte_size()],
                write_count: 0,
            },
        );
        log::trace!(
            "DummyEngine: creating texture {:?} ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        Ok(handle)
    }

    fn write_texture(&self, texture: TextureHandle, data: &[u8]) {
        let mut state = self.state.lock();
        match state.textures.get_mut(&texture) {
            Some(DummyTexture {
                kind: DummyTextureKind::External(_),
                ..
            }) => log::warn!("DummyEngine: write to external texture {texture:?} ignored"),
            Some(tex) if tex.byte_size() != Some(data.len()) => log::warn!(
                "DummyEngine: write of {} bytes to {texture:?}, expected {:?}; ignored",
                data.len(),
                tex.byte_size()
            ),
            Some(tex) => {
                log::trace!("DummyEngine: write_texture {:?} len={}", texture, data.len());
                tex.data = data.to_vec();
                tex.write_count += 1;
            }
            None => log::warn!("DummyEngine: write to unknown texture {texture:?}"),
        }
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        if self.state.lock().textures.remove(&texture).is_none() {
            log::warn!("DummyEngine: destroying unknown texture {texture:?}");
        }
    }

    fn set_material_texture(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
        texture: TextureHandle,
        sampler: SamplerDescriptor,
    ) {
        let mut state = self.state.lock();
        let instance = state.material_instances.entry(material).or_default();
        instance.textures.insert(name.to_string(), (texture, sampler));
        log::trace!("DummyEngine: {material:?}.{name} = {texture:?}");
    }

    fn set_material_float4_array(
        &self,
        material: MaterialInstanceHandle,
        name: &str,
        values: &[Vec4],
    ) {
        let mut state = self.state.lock();
        let instance = state.material_instances.entry(material).or_default();
        instance
            .float4_arrays
            .insert(name.to_string(), values.to_vec());
    }

    fn create_entity(&self) -> EntityHandle {
        let mut state = self.state.lock();
        let entity = EntityHandle::from_raw(state.next_id());
        state.entities.insert(entity);
        state.entities_created += 1;
        entity
    }

    fn build_renderable(
        &self,
        entity: EntityHandle,
        desc: &RenderableDescriptor,
    ) -> EngineResult<()> {
        self.check_valid()?;
        let mut state = self.state.lock();
        if !state.entities.contains(&entity) {
            return Err(EngineError::RenderableCreationFailed(format!(
                "unknown entity {entity:?}"
            )));
        }
        if !state.vertex_buffers.contains_key(&desc.vertex_buffer)
            || !state.index_buffers.contains_key(&desc.index_buffer)
        {
            return Err(EngineError::RenderableCreationFailed(
                "geometry buffers are not alive".to_string(),
            ));
        }
        state.renderables.insert(
            entity,
            DummyRenderable {
                descriptor: desc.clone(),
                material: desc.material,
                priority: desc.priority,
            },
        );
        log::trace!("DummyEngine: built renderable for {entity:?}");
        Ok(())
    }

    fn set_renderable_material(
        &self,
        entity: EntityHandle,
        primitive: usize,
        material: MaterialInstanceHandle,
    ) {
        let mut state = self.state.lock();
        match state.renderables.get_mut(&entity) {
            Some(r) if primitive == 0 => r.material = material,
            Some(_) => log::warn!("DummyEngine: renderable has no primitive {primitive}"),
            None => log::warn!("DummyEngine: {entity:?} has no renderable"),
        }
    }

    fn set_renderable_priority(&self, entity: EntityHandle, priority: RenderPriority) {
        let mut state = self.state.lock();
        match state.renderables.get_mut(&entity) {
            Some(r) => r.priority = priority,
            None => log::warn!("DummyEngine: {entity:?} has no renderable"),
        }
    }

    fn destroy_entity(&self, entity: EntityHandle) {
        let mut state = self.state.lock();
        state.renderables.remove(&entity);
        if !state.entities.remove(&entity) {
            log::warn!("DummyEngine: destroying unknown entity {entity:?}");
        }
    }
}

impl RenderScene for DummyEngine {
    fn add_entity(&self, entity: EntityHandle) {
        let mut state = self.state.lock();
        if !state.scene.contains(&entity) {
            state.scene.push(entity);
        }
    }

    fn remove_entity(&self, entity: EntityHandle) {
        self.state.lock().scene.retain(|e| *e != entity);
    }

    fn contains_entity(&self, entity: EntityHandle) -> bool {
        self.state.lock().scene.contains(&entity)
    }
}

// Ensure DummyEngine is Send + Sync
static_assertions::assert_impl_all!(DummyEngine: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn uv_layout() -> VertexBufferDescriptor {
        VertexBufferDescriptor {
            label: Some("test".into()),
            vertex_count: 3,
            buffer_count: 1,
            attributes: vec![VertexAttribute {
                semantic: VertexSemantic::Uv0,
                buffer_slot: 0,
                format: VertexFormat::Float32x2,
                offset: 0,
                stride: 8,
            }],
        }
    }

    #[test]
    fn test_dummy_engine() {
        let engine = DummyEngine::new();
        assert!(engine.is_valid());
        engine.invalidate();
        assert!(!engine.is_valid());
    }

    #[test]
    fn test_vertex_buffer_lifecycle() {
        let engine = DummyEngine::new();
        let vb = engine.create_vertex_buffer(&uv_layout()).unwrap();
        engine.set_vertex_buffer_at(vb, 0, &[1, 2, 3]);
        assert_eq!(engine.vertex_slot_data(vb, 0), Some(vec![1, 2, 3]));
        assert_eq!(engine.vertex_buffer_count(), 1);
        engine.destroy_vertex_buffer(vb);
        assert_eq!(engine.vertex_buffer_count(), 0);
    }

    #[test]
    fn test_attribute_slot_out_of_range() {
        let engine = DummyEngine::new();
        let mut desc = uv_layout();
        desc.attributes[0].buffer_slot = 1;
        assert!(matches!(
            engine.create_vertex_buffer(&desc),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_create_after_invalidate_fails() {
        let engine = DummyEngine::new();
        engine.invalidate();
        assert_eq!(
            engine.create_vertex_buffer(&uv_layout()),
            Err(EngineError::DeviceLost)
        );
    }

    #[test]
    fn test_zero_sized_texture_rejected() {
        let engine = DummyEngine::new();
        let result = engine.create_texture(&TextureDescriptor {
            label: None,
            width: 0,
            height: 4,
            format: TextureFormat::Rg8Unorm,
            usage: TextureUsage::TEXTURE_BINDING,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_texture_writes_are_counted() {
        let engine = DummyEngine::new();
        let tex = engine
            .create_texture(&TextureDescriptor {
                label: None,
                width: 2,
                height: 1,
                format: TextureFormat::Rg8Unorm,
                usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            })
            .unwrap();
        engine.write_texture(tex, &[1, 2, 3, 4]);
        engine.write_texture(tex, &[5, 6, 7, 8]);
        let snapshot = engine.texture(tex).unwrap();
        assert_eq!(snapshot.write_count, 2);
        assert_eq!(snapshot.data, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_mis_sized_texture_write_ignored() {
        let engine = DummyEngine::new();
        let tex = engine
            .create_texture(&TextureDescriptor {
                label: None,
                width: 4,
                height: 4,
                format: TextureFormat::Rgba8Unorm,
                usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            })
            .unwrap();
        engine.write_texture(tex, &[7; 32]);

        let snapshot = engine.texture(tex).unwrap();
        assert_eq!(snapshot.write_count, 0);
        assert_eq!(snapshot.data, vec![0; 64]);
    }

    #[test]
    fn test_scene_membership() {
        let engine = DummyEngine::new();
        let entity = engine.create_entity();
        engine.add_entity(entity);
        engine.add_entity(entity);
        assert_eq!(engine.scene_entities(), vec![entity]);
        engine.remove_entity(entity);
        assert!(!engine.contains_entity(entity));
    }
}
