//! Common utilities for camera stream integration tests.
//!
//! Provides scripted tracking sessions and frames, material loaders whose
//! completion the test controls, and a context wiring a [`DummyEngine`] in
//! as both engine and scene.

#![allow(dead_code)]

use std::sync::Arc;

use camera_stream::backend::{ExternalImageId, RenderEngine, RenderScene};
use camera_stream::resources::MaterialLoadError;
use camera_stream::tracking::{CameraIntrinsics, SessionDepthMode};
use camera_stream::{
    ArFrame, ArSession, CameraMaterialKind, CameraStream, CameraStreamConfig, CameraStreamResult,
    DepthImage, DummyEngine, Material, MaterialCompletion, MaterialLoader,
};
use glam::Vec2;
use parking_lot::Mutex;

/// Install the test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decode bytes uploaded to a `Float32x2` vertex slot.
pub fn decode_vec2(bytes: &[u8]) -> Vec<Vec2> {
    let floats: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
        .collect();
    floats.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect()
}

// ============================================================================
// Tracking
// ============================================================================

/// Session with a fixed capability set and active depth mode.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub supported: Vec<SessionDepthMode>,
    pub configured: SessionDepthMode,
}

impl TestSession {
    /// A device supporting every depth mode, configured for `mode`.
    pub fn configured(mode: SessionDepthMode) -> Self {
        Self {
            supported: vec![SessionDepthMode::Automatic, SessionDepthMode::RawDepthOnly],
            configured: mode,
        }
    }

    /// A device without any depth capability.
    pub fn without_depth() -> Self {
        Self {
            supported: Vec::new(),
            configured: SessionDepthMode::Disabled,
        }
    }
}

impl ArSession for TestSession {
    fn is_depth_mode_supported(&self, mode: SessionDepthMode) -> bool {
        self.supported.contains(&mode)
    }

    fn depth_mode(&self) -> SessionDepthMode {
        self.configured
    }
}

/// Display transforms a test frame can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTransform {
    Identity,
    /// (u, v) -> (v, u)
    SwapAxes,
}

/// Frame with fixed intrinsics, display transform and depth images.
#[derive(Debug, Clone)]
pub struct TestFrame {
    pub intrinsics: CameraIntrinsics,
    pub transform: DisplayTransform,
    pub depth: Option<DepthImage>,
    pub raw_depth: Option<DepthImage>,
}

impl TestFrame {
    pub fn new(width: u32, height: u32) -> Self {
        let center = Vec2::new(width as f32, height as f32) * 0.5;
        Self {
            intrinsics: CameraIntrinsics::new(Vec2::splat(500.0), center, width, height),
            transform: DisplayTransform::Identity,
            depth: None,
            raw_depth: None,
        }
    }

    pub fn with_transform(mut self, transform: DisplayTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_depth(mut self, image: DepthImage) -> Self {
        self.depth = Some(image);
        self
    }

    pub fn with_raw_depth(mut self, image: DepthImage) -> Self {
        self.raw_depth = Some(image);
        self
    }
}

impl ArFrame for TestFrame {
    fn texture_intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    fn transform_display_uv_coords(&self, input: &[Vec2], output: &mut [Vec2]) {
        for (out, uv) in output.iter_mut().zip(input) {
            *out = match self.transform {
                DisplayTransform::Identity => *uv,
                DisplayTransform::SwapAxes => Vec2::new(uv.y, uv.x),
            };
        }
    }

    fn acquire_depth_image(&self) -> Option<DepthImage> {
        self.depth.clone()
    }

    fn acquire_raw_depth_image(&self) -> Option<DepthImage> {
        self.raw_depth.clone()
    }
}

// ============================================================================
// Material loaders
// ============================================================================

fn build_material(engine: &DummyEngine, kind: CameraMaterialKind) -> Material {
    let name = format!("{kind:?}");
    let instance = engine.create_material_instance(&name);
    Material::new(name, instance)
}

/// Loader that completes every request before returning.
pub struct InlineLoader {
    engine: Arc<DummyEngine>,
}

impl InlineLoader {
    pub fn new(engine: Arc<DummyEngine>) -> Self {
        Self { engine }
    }
}

impl MaterialLoader for InlineLoader {
    fn load(&self, kind: CameraMaterialKind, completion: MaterialCompletion) {
        completion.complete(Ok(build_material(&self.engine, kind)));
    }
}

/// Loader that holds requests until the test completes them.
pub struct QueuedLoader {
    engine: Arc<DummyEngine>,
    pending: Mutex<Vec<MaterialCompletion>>,
}

impl QueuedLoader {
    pub fn new(engine: Arc<DummyEngine>) -> Self {
        Self {
            engine,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Remove the oldest pending request for `kind`.
    pub fn take(&self, kind: CameraMaterialKind) -> MaterialCompletion {
        let mut pending = self.pending.lock();
        let index = pending
            .iter()
            .position(|c| c.kind() == kind)
            .unwrap_or_else(|| panic!("no pending {kind:?} request"));
        pending.remove(index)
    }

    /// Finish the pending request for `kind` successfully.
    pub fn succeed(&self, kind: CameraMaterialKind) -> Material {
        let material = build_material(&self.engine, kind);
        self.take(kind).complete(Ok(material.clone()));
        material
    }

    /// Finish the pending request for `kind` with an error.
    pub fn fail(&self, kind: CameraMaterialKind) {
        self.take(kind).complete(Err(MaterialLoadError::BuildFailed {
            name: format!("{kind:?}"),
            reason: "shader compilation failed".to_string(),
        }));
    }
}

impl MaterialLoader for QueuedLoader {
    fn load(&self, _kind: CameraMaterialKind, completion: MaterialCompletion) {
        self.pending.lock().push(completion);
    }
}

// ============================================================================
// Test context
// ============================================================================

/// A dummy engine doubling as the scene.
pub struct TestContext {
    pub engine: Arc<DummyEngine>,
}

impl TestContext {
    pub fn new() -> Self {
        init_logging();
        Self {
            engine: Arc::new(DummyEngine::new()),
        }
    }

    pub fn inline_loader(&self) -> InlineLoader {
        InlineLoader::new(self.engine.clone())
    }

    pub fn queued_loader(&self) -> QueuedLoader {
        QueuedLoader::new(self.engine.clone())
    }

    pub fn try_stream(
        &self,
        loader: &dyn MaterialLoader,
        config: CameraStreamConfig,
    ) -> CameraStreamResult<CameraStream> {
        let engine: Arc<dyn RenderEngine> = self.engine.clone();
        let scene: Arc<dyn RenderScene> = self.engine.clone();
        CameraStream::new(engine, scene, ExternalImageId(42), loader, config)
    }

    pub fn stream(&self, loader: &dyn MaterialLoader) -> CameraStream {
        self.try_stream(loader, CameraStreamConfig::default())
            .expect("camera stream creation failed")
    }
}
