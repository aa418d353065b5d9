//! Camera background renderable

use crate::backend::*;
use crate::error::CameraStreamResult;
use crate::resources::CameraQuad;

/// Lifecycle of the camera entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderableState {
    #[default]
    Uninitialized,
    Initialized {
        entity: EntityHandle,
        material: MaterialInstanceHandle,
    },
}

/// The scene entity that draws the camera quad.
///
/// The entity is created once, the first time a material is attached. After
/// that only its material instance and priority change.
#[derive(Debug)]
pub struct CameraRenderable {
    state: RenderableState,
    priority: RenderPriority,
}

impl CameraRenderable {
    pub fn new(priority: RenderPriority) -> Self {
        Self {
            state: RenderableState::Uninitialized,
            priority,
        }
    }

    /// Attach `material`, creating the entity on first use.
    pub fn init_or_update_material(
        &mut self,
        engine: &dyn RenderEngine,
        scene: &dyn RenderScene,
        quad: &CameraQuad,
        material: MaterialInstanceHandle,
    ) -> CameraStreamResult<EntityHandle> {
        match &mut self.state {
            RenderableState::Initialized {
                entity,
                material: current,
            } => {
                engine.set_renderable_material(*entity, 0, material);
                *current = material;
                log::debug!("Camera renderable {entity:?} now uses {material:?}");
                Ok(*entity)
            }
            RenderableState::Uninitialized => {
                let entity = engine.create_entity();
                let desc = RenderableDescriptor {
                    vertex_buffer: quad.vertex_buffer(),
                    index_buffer: quad.index_buffer(),
                    topology: PrimitiveTopology::TriangleList,
                    material,
                    priority: self.priority,
                    cast_shadows: false,
                    receive_shadows: false,
                    culling: false,
                };
                if let Err(e) = engine.build_renderable(entity, &desc) {
                    engine.destroy_entity(entity);
                    return Err(e.into());
                }
                scene.add_entity(entity);
                self.state = RenderableState::Initialized { entity, material };
                log::info!(
                    "Created camera renderable {entity:?} (priority {})",
                    self.priority.value()
                );
                Ok(entity)
            }
        }
    }

    /// Store a new priority, pushing it to the entity if it exists.
    pub fn set_priority(&mut self, engine: &dyn RenderEngine, priority: RenderPriority) {
        self.priority = priority;
        if let RenderableState::Initialized { entity, .. } = self.state {
            engine.set_renderable_priority(entity, priority);
        }
    }

    pub fn priority(&self) -> RenderPriority {
        self.priority
    }

    pub fn state(&self) -> RenderableState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, RenderableState::Initialized { .. })
    }

    pub fn entity(&self) -> Option<EntityHandle> {
        match self.state {
            RenderableState::Initialized { entity, .. } => Some(entity),
            RenderableState::Uninitialized => None,
        }
    }

    pub fn material(&self) -> Option<MaterialInstanceHandle> {
        match self.state {
            RenderableState::Initialized { material, .. } => Some(material),
            RenderableState::Uninitialized => None,
        }
    }

    /// Give up the entity for release; the renderable is uninitialized after.
    pub(crate) fn take_entity(&mut self) -> Option<EntityHandle> {
        let entity = self.entity();
        self.state = RenderableState::Uninitialized;
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::QUAD_UVS;

    fn setup() -> (DummyEngine, CameraQuad) {
        let engine = DummyEngine::new();
        let quad = CameraQuad::create(&engine, "test", &QUAD_UVS).unwrap();
        (engine, quad)
    }

    #[test]
    fn entity_created_once() {
        let (engine, quad) = setup();
        let mut renderable = CameraRenderable::new(RenderPriority::LAST);
        let first = engine.create_material_instance("a");
        let second = engine.create_material_instance("b");

        let entity = renderable
            .init_or_update_material(&engine, &engine, &quad, first)
            .unwrap();
        for _ in 0..3 {
            let again = renderable
                .init_or_update_material(&engine, &engine, &quad, second)
                .unwrap();
            assert_eq!(again, entity);
        }

        assert_eq!(engine.entities_created(), 1);
        assert_eq!(engine.scene_entities(), vec![entity]);
        let built = engine.renderable(entity).unwrap();
        assert_eq!(built.material, second);
        assert_eq!(built.priority, RenderPriority::LAST);
        assert!(!built.descriptor.cast_shadows);
        assert!(!built.descriptor.receive_shadows);
        assert!(!built.descriptor.culling);
    }

    #[test]
    fn priority_applies_before_and_after_init() {
        let (engine, quad) = setup();
        let mut renderable = CameraRenderable::new(RenderPriority::LAST);
        renderable.set_priority(&engine, RenderPriority::new(2));

        let material = engine.create_material_instance("a");
        let entity = renderable
            .init_or_update_material(&engine, &engine, &quad, material)
            .unwrap();
        assert_eq!(engine.renderable(entity).unwrap().priority.value(), 2);

        renderable.set_priority(&engine, RenderPriority::FIRST);
        assert_eq!(engine.renderable(entity).unwrap().priority, RenderPriority::FIRST);
    }

    #[test]
    fn failed_build_stays_uninitialized() {
        let (engine, quad) = setup();
        let mut renderable = CameraRenderable::new(RenderPriority::LAST);
        let material = engine.create_material_instance("a");
        engine.invalidate();

        assert!(renderable
            .init_or_update_material(&engine, &engine, &quad, material)
            .is_err());
        assert!(!renderable.is_initialized());
        assert!(engine.scene_entities().is_empty());
    }
}
