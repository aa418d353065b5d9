//! Camera stream orchestrator
//!
//! [`CameraStream`] ties the pieces together: it owns the quad geometry,
//! tracks the per-frame UVs, creates the camera and depth textures when the
//! tracking session first provides their sizes, picks between the standard
//! and occlusion materials, and keeps the single background entity in the
//! scene up to date.
//!
//! All operations must run on the thread that created the stream. Material
//! loads may finish anywhere; their results are applied by
//! [`CameraStream::poll_materials`], which [`CameraStream::update`] calls
//! at the start of every frame.

use std::sync::Arc;

use glam::Vec2;

use crate::backend::*;
use crate::error::{CameraStreamError, CameraStreamResult};
use crate::resources::*;
use crate::scene::{CameraRenderable, ReleaseSet};
use crate::thread::ThreadAffinity;
use crate::tracking::*;
use crate::CameraStreamConfig;

/// Renders the live camera image behind the virtual content of an AR view.
pub struct CameraStream {
    engine: Arc<dyn RenderEngine>,
    scene: Arc<dyn RenderScene>,
    config: CameraStreamConfig,
    affinity: ThreadAffinity,
    camera_image: ExternalImageId,
    quad: CameraQuad,
    uvs: UvTransformTracker,
    textures: CameraTextures,
    materials: MaterialSelector,
    renderable: CameraRenderable,
    depth_mode: DepthMode,
    depth_mode_usage: DepthModeUsage,
    released: bool,
}

impl CameraStream {
    /// Create the stream and start loading both camera materials.
    ///
    /// `camera_image` is the platform image the camera writes into. Fails
    /// with [`CameraStreamError::EngineNotInitialized`] if the engine is not
    /// valid, or with the engine's error if the quad buffers cannot be made.
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        scene: Arc<dyn RenderScene>,
        camera_image: ExternalImageId,
        loader: &dyn MaterialLoader,
        config: CameraStreamConfig,
    ) -> CameraStreamResult<Self> {
        if !engine.is_valid() {
            return Err(CameraStreamError::EngineNotInitialized);
        }

        let uvs = UvTransformTracker::new();
        let quad = CameraQuad::create(engine.as_ref(), &config.label, uvs.transformed())?;
        let renderable = CameraRenderable::new(config.render_priority);

        let mut stream = Self {
            engine,
            scene,
            config,
            affinity: ThreadAffinity::current(),
            camera_image,
            quad,
            uvs,
            textures: CameraTextures::new(),
            materials: MaterialSelector::new(),
            renderable,
            depth_mode: DepthMode::NoDepth,
            depth_mode_usage: DepthModeUsage::Disabled,
            released: false,
        };

        for kind in CameraMaterialKind::ALL {
            stream.materials.request(loader, kind);
        }
        stream.poll_materials()?;

        log::info!("Camera stream {:?} created for {camera_image:?}", stream.config.label);
        Ok(stream)
    }

    /// Apply material loads that finished since the last call.
    ///
    /// Returns the number of material slots that were filled.
    pub fn poll_materials(&mut self) -> CameraStreamResult<usize> {
        self.affinity.assert_current("poll_materials");
        let filled = self
            .materials
            .apply_pending(self.engine.as_ref(), &self.config.uv_transform_parameter);
        if filled > 0 {
            self.refresh_material()?;
        }
        Ok(filled)
    }

    /// Request `kind` from `loader` again, typically after a failed load.
    pub fn reload_material(&self, loader: &dyn MaterialLoader, kind: CameraMaterialKind) {
        self.materials.request(loader, kind);
    }

    /// Recompute the depth mode from the session configuration.
    ///
    /// Call whenever the session may have been reconfigured. A changed mode
    /// re-runs material selection.
    pub fn check_if_depth_is_enabled(
        &mut self,
        session: &dyn ArSession,
    ) -> CameraStreamResult<DepthMode> {
        self.affinity.assert_current("check_if_depth_is_enabled");
        let mode = DepthMode::from_session(session);
        if mode != self.depth_mode {
            log::debug!("Depth mode {:?} -> {mode:?}", self.depth_mode);
            self.depth_mode = mode;
            self.refresh_material()?;
        }
        Ok(mode)
    }

    /// Create the camera texture from the first frame's intrinsics.
    ///
    /// Does nothing once the texture exists.
    pub fn initialize_texture(&mut self, frame: &dyn ArFrame) -> CameraStreamResult<()> {
        self.affinity.assert_current("initialize_texture");
        if self.textures.is_camera_initialized() {
            return Ok(());
        }

        let intrinsics = frame.texture_intrinsics();
        self.textures.initialize_camera(
            self.engine.as_ref(),
            &self.config.label,
            self.camera_image,
            &intrinsics,
        )?;
        log::info!(
            "Camera texture initialized at {}x{}",
            intrinsics.width(),
            intrinsics.height()
        );
        self.refresh_material()
    }

    /// Apply this frame's display transform to the quad UVs and upload them.
    pub fn recalculate_camera_uvs(&mut self, frame: &dyn ArFrame) {
        self.affinity.assert_current("recalculate_camera_uvs");
        let uvs = self.uvs.recalculate(frame);
        self.quad.upload_uvs(self.engine.as_ref(), uvs);
    }

    /// Push a depth image to the occlusion material.
    ///
    /// The depth texture is created from the first image and attached to
    /// the occlusion material; later images only replace its contents. Does
    /// nothing without an image, a camera texture or an occlusion material.
    pub fn recalculate_occlusion(
        &mut self,
        depth_image: Option<&DepthImage>,
    ) -> CameraStreamResult<()> {
        self.affinity.assert_current("recalculate_occlusion");
        let Some(image) = depth_image else {
            return Ok(());
        };
        if !self.textures.is_camera_initialized() {
            return Ok(());
        }
        let Some(occlusion) = self
            .materials
            .material(CameraMaterialKind::Occlusion)
            .map(Material::instance)
        else {
            return Ok(());
        };

        let engine = self.engine.as_ref();
        let created = self.textures.ensure_depth(
            engine,
            &self.config.label,
            self.config.depth_texture_format,
            image,
        )?;
        if created {
            self.bind_depth_texture(occlusion);
        }

        if self.textures.update_depth(engine, image) {
            log::trace!("Updated depth texture from {}x{} image", image.width(), image.height());
        }
        Ok(())
    }

    /// Depth mode derived from the session at the last
    /// [`check_if_depth_is_enabled`](Self::check_if_depth_is_enabled).
    pub fn depth_mode(&self) -> DepthMode {
        self.depth_mode
    }

    pub fn depth_mode_usage(&self) -> DepthModeUsage {
        self.depth_mode_usage
    }

    /// Change the occlusion policy and rebind the selected material.
    pub fn set_depth_mode_usage(&mut self, usage: DepthModeUsage) -> CameraStreamResult<()> {
        self.affinity.assert_current("set_depth_mode_usage");
        self.depth_mode_usage = usage;
        self.refresh_material()
    }

    /// Use a caller-supplied occlusion material instead of the default one.
    ///
    /// The default load never replaces it, even if it finishes later.
    pub fn set_occlusion_material(&mut self, material: Material) -> CameraStreamResult<()> {
        self.affinity.assert_current("set_occlusion_material");
        log::debug!("Using custom occlusion material {:?}", material.name());
        let instance = material.instance();
        self.materials.set_custom(CameraMaterialKind::Occlusion, material);
        self.bind_depth_texture(instance);
        self.refresh_material()
    }

    pub fn render_priority(&self) -> RenderPriority {
        self.renderable.priority()
    }

    /// Change the draw order; applied immediately if the entity exists.
    pub fn set_render_priority(&mut self, priority: RenderPriority) {
        self.affinity.assert_current("set_render_priority");
        self.renderable.set_priority(self.engine.as_ref(), priority);
    }

    /// Run every per-frame step for one tracking frame.
    ///
    /// Failures are logged; a frame that cannot be fully processed leaves
    /// the previous frame's state on screen.
    pub fn update(&mut self, frame: &dyn ArFrame) {
        if let Err(e) = self.poll_materials() {
            log::error!("Failed to apply camera materials: {e}");
        }
        if let Err(e) = self.initialize_texture(frame) {
            log::error!("Failed to initialize camera texture: {e}");
        }
        self.recalculate_camera_uvs(frame);

        if self.selected_material_kind() == CameraMaterialKind::Occlusion {
            let image = self.depth_mode.acquire_image(frame);
            if let Err(e) = self.recalculate_occlusion(image.as_ref()) {
                log::error!("Failed to update depth texture: {e}");
            }
        }
    }

    /// Release all GPU resources now.
    ///
    /// Dropping the stream does the same; this makes the point explicit.
    pub fn teardown(mut self) {
        self.affinity.assert_current("teardown");
        self.release();
    }

    pub fn is_texture_initialized(&self) -> bool {
        self.textures.is_camera_initialized()
    }

    pub fn is_renderable_initialized(&self) -> bool {
        self.renderable.is_initialized()
    }

    pub fn renderable_entity(&self) -> Option<EntityHandle> {
        self.renderable.entity()
    }

    pub fn camera_texture(&self) -> Option<TextureHandle> {
        self.textures.camera().map(ExternalTexture::handle)
    }

    pub fn depth_texture(&self) -> Option<TextureHandle> {
        self.textures.depth().map(DepthTexture::handle)
    }

    /// The material variant the current policy and depth mode call for.
    pub fn selected_material_kind(&self) -> CameraMaterialKind {
        select_material_kind(self.depth_mode_usage, self.depth_mode)
    }

    pub fn material_slot(&self, kind: CameraMaterialKind) -> &MaterialSlot {
        self.materials.slot(kind)
    }

    /// UVs uploaded by the last [`recalculate_camera_uvs`](Self::recalculate_camera_uvs).
    pub fn transformed_uvs(&self) -> &[Vec2; VERTEX_COUNT] {
        self.uvs.transformed()
    }

    pub fn quad(&self) -> &CameraQuad {
        &self.quad
    }

    pub fn config(&self) -> &CameraStreamConfig {
        &self.config
    }

    /// Bind the selected material to the camera texture and attach it to the
    /// renderable. Deferred until both the material and the texture exist.
    fn refresh_material(&mut self) -> CameraStreamResult<()> {
        let (kind, material) = self
            .materials
            .select(self.depth_mode_usage, self.depth_mode);
        let Some(instance) = material.map(Material::instance) else {
            log::debug!("{kind:?} camera material not loaded yet, deferring binding");
            return Ok(());
        };
        let Some(camera) = self.textures.camera().map(ExternalTexture::handle) else {
            log::debug!("Camera texture not initialized yet, deferring binding");
            return Ok(());
        };

        let engine = self.engine.as_ref();
        engine.set_material_texture(
            instance,
            &self.config.camera_texture_parameter,
            camera,
            SamplerDescriptor::linear_clamp(),
        );
        if kind == CameraMaterialKind::Occlusion {
            self.bind_depth_texture(instance);
        }

        self.renderable
            .init_or_update_material(engine, self.scene.as_ref(), &self.quad, instance)?;
        log::debug!("Bound {kind:?} camera material {instance:?}");
        Ok(())
    }

    fn bind_depth_texture(&self, material: MaterialInstanceHandle) {
        if let Some(depth) = self.textures.depth() {
            self.engine.set_material_texture(
                material,
                &self.config.depth_texture_parameter,
                depth.handle(),
                SamplerDescriptor::nearest_clamp(),
            );
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let set = ReleaseSet {
            vertex_buffer: self.quad.vertex_buffer(),
            index_buffer: self.quad.index_buffer(),
            entity: self.renderable.take_entity(),
            textures: self.textures.take_handles(),
        };
        if set.release(self.engine.as_ref(), self.scene.as_ref()) {
            log::info!("Camera stream {:?} released", self.config.label);
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if !self.affinity.is_current() {
            log::error!(
                "Camera stream {:?} dropped off its rendering thread; GPU resources leaked",
                self.config.label
            );
            return;
        }
        self.release();
    }
}

impl std::fmt::Debug for CameraStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraStream")
            .field("label", &self.config.label)
            .field("camera_image", &self.camera_image)
            .field("depth_mode", &self.depth_mode)
            .field("depth_mode_usage", &self.depth_mode_usage)
            .field("renderable", &self.renderable.state())
            .field("released", &self.released)
            .finish()
    }
}

static_assertions::assert_impl_all!(CameraStream: Send);
