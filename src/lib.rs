//! Camera Stream - camera feed background rendering for augmented-reality views
//!
//! Draws the live camera image as a full-screen background behind virtual
//! content, with optional depth-based occlusion so real-world geometry can
//! hide virtual objects.
//!
//! # Features
//! - Single over-sized triangle covering the viewport, UVs updated per frame
//! - External camera texture created lazily from the first frame
//! - Standard and occlusion materials loaded asynchronously, selected from
//!   the session's depth capability and the caller's occlusion policy
//! - One scene entity per stream, released exactly once
//!
//! The rendering engine, the scene, the tracking session and the material
//! loader are collaborators behind traits; see [`backend`], [`tracking`] and
//! [`MaterialLoader`]. [`DummyEngine`] implements the engine and scene in
//! memory for tests and headless use.

pub mod backend;
pub mod camera_stream;
pub mod error;
pub mod resources;
pub mod scene;
pub mod thread;
pub mod tracking;

pub use backend::{DummyEngine, RenderEngine, RenderPriority, RenderScene, TextureFormat};
pub use camera_stream::CameraStream;
pub use error::{CameraStreamError, CameraStreamResult};
pub use resources::{CameraMaterialKind, Material, MaterialCompletion, MaterialLoader};
pub use tracking::{ArFrame, ArSession, DepthImage, DepthMode, DepthModeUsage};

/// Material parameter the camera texture is bound to
pub const MATERIAL_CAMERA_TEXTURE: &str = "cameraTexture";

/// Material parameter the depth texture is bound to
pub const MATERIAL_DEPTH_TEXTURE: &str = "depthTexture";

/// Material parameter holding the 4x4 UV transform
pub const MATERIAL_UV_TRANSFORM: &str = "uvTransform";

/// Configuration for a camera stream
#[derive(Debug, Clone, PartialEq)]
pub struct CameraStreamConfig {
    /// Prefix of the debug labels given to GPU objects
    pub label: String,
    /// Sampler parameter receiving the camera texture
    pub camera_texture_parameter: String,
    /// Sampler parameter receiving the depth texture
    pub depth_texture_parameter: String,
    /// Float4 array parameter initialized to the identity UV transform
    pub uv_transform_parameter: String,
    /// Draw order of the camera background
    pub render_priority: RenderPriority,
    /// Format of the texture the 16-bit depth image is copied into
    pub depth_texture_format: TextureFormat,
}

impl CameraStreamConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_camera_texture_parameter(mut self, name: impl Into<String>) -> Self {
        self.camera_texture_parameter = name.into();
        self
    }

    pub fn with_depth_texture_parameter(mut self, name: impl Into<String>) -> Self {
        self.depth_texture_parameter = name.into();
        self
    }

    pub fn with_uv_transform_parameter(mut self, name: impl Into<String>) -> Self {
        self.uv_transform_parameter = name.into();
        self
    }

    pub fn with_render_priority(mut self, priority: RenderPriority) -> Self {
        self.render_priority = priority;
        self
    }

    pub fn with_depth_texture_format(mut self, format: TextureFormat) -> Self {
        self.depth_texture_format = format;
        self
    }
}

impl Default for CameraStreamConfig {
    fn default() -> Self {
        Self {
            label: "camera_stream".to_string(),
            camera_texture_parameter: MATERIAL_CAMERA_TEXTURE.to_string(),
            depth_texture_parameter: MATERIAL_DEPTH_TEXTURE.to_string(),
            uv_transform_parameter: MATERIAL_UV_TRANSFORM.to_string(),
            render_priority: RenderPriority::LAST,
            depth_texture_format: TextureFormat::Rg8Unorm,
        }
    }
}
