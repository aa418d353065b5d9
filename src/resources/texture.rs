//! Camera and depth textures

use crate::backend::*;
use crate::error::CameraStreamResult;
use crate::tracking::{CameraIntrinsics, DepthImage};

/// Texture bound to the platform image stream the camera writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalTexture {
    handle: TextureHandle,
    image: ExternalImageId,
    width: u32,
    height: u32,
}

impl ExternalTexture {
    /// Create the texture at the camera image size reported by `intrinsics`.
    pub fn create(
        engine: &dyn RenderEngine,
        label: &str,
        image: ExternalImageId,
        intrinsics: &CameraIntrinsics,
    ) -> CameraStreamResult<Self> {
        let (width, height) = (intrinsics.width(), intrinsics.height());
        let handle = engine.create_external_texture(&ExternalTextureDescriptor {
            label: Some(format!("{label} camera")),
            image,
            width,
            height,
        })?;
        log::debug!("Created camera texture {handle:?} ({width}x{height}) for {image:?}");
        Ok(Self {
            handle,
            image,
            width,
            height,
        })
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn image(&self) -> ExternalImageId {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Bytes per texel of a DEPTH16 image.
const DEPTH_BYTES_PER_PIXEL: u32 = 2;

/// Texture receiving the 16-bit depth image, two bytes per texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTexture {
    handle: TextureHandle,
    width: u32,
    height: u32,
}

impl DepthTexture {
    /// Create a texture sized to `image`. Contents are written separately.
    ///
    /// `format` must hold exactly one 16-bit sample per texel.
    pub fn create(
        engine: &dyn RenderEngine,
        label: &str,
        format: TextureFormat,
        image: &DepthImage,
    ) -> CameraStreamResult<Self> {
        if format.bytes_per_pixel() != DEPTH_BYTES_PER_PIXEL {
            return Err(EngineError::InvalidParameter(format!(
                "depth texture format {format:?} has {} bytes per texel, depth images have {}",
                format.bytes_per_pixel(),
                DEPTH_BYTES_PER_PIXEL
            ))
            .into());
        }
        let (width, height) = (image.width(), image.height());
        let handle = engine.create_texture(&TextureDescriptor {
            label: Some(format!("{label} depth")),
            width,
            height,
            format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        log::debug!("Created depth texture {handle:?} ({width}x{height}, {format:?})");
        Ok(Self {
            handle,
            width,
            height,
        })
    }

    /// Replace the texture contents with `image`.
    ///
    /// Returns `false` without uploading when the image size differs from
    /// the texture size.
    pub fn write(&self, engine: &dyn RenderEngine, image: &DepthImage) -> bool {
        if image.width() != self.width || image.height() != self.height {
            log::warn!(
                "Depth image is {}x{}, depth texture is {}x{}; skipping upload",
                image.width(),
                image.height(),
                self.width,
                self.height
            );
            return false;
        }
        engine.write_texture(self.handle, image.as_bytes());
        true
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The textures a camera stream owns. Each is created lazily, at most once.
#[derive(Debug, Default)]
pub struct CameraTextures {
    camera: Option<ExternalTexture>,
    depth: Option<DepthTexture>,
}

impl CameraTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the camera texture unless it already exists.
    ///
    /// Returns `true` when a texture was created by this call.
    pub fn initialize_camera(
        &mut self,
        engine: &dyn RenderEngine,
        label: &str,
        image: ExternalImageId,
        intrinsics: &CameraIntrinsics,
    ) -> CameraStreamResult<bool> {
        if self.camera.is_some() {
            return Ok(false);
        }
        self.camera = Some(ExternalTexture::create(engine, label, image, intrinsics)?);
        Ok(true)
    }

    /// Create the depth texture sized to `image` unless it already exists.
    ///
    /// Returns `true` when a texture was created by this call.
    pub fn ensure_depth(
        &mut self,
        engine: &dyn RenderEngine,
        label: &str,
        format: TextureFormat,
        image: &DepthImage,
    ) -> CameraStreamResult<bool> {
        if self.depth.is_some() {
            return Ok(false);
        }
        self.depth = Some(DepthTexture::create(engine, label, format, image)?);
        Ok(true)
    }

    /// Upload `image` into the depth texture, if there is one.
    pub fn update_depth(&self, engine: &dyn RenderEngine, image: &DepthImage) -> bool {
        self.depth
            .as_ref()
            .is_some_and(|depth| depth.write(engine, image))
    }

    pub fn camera(&self) -> Option<&ExternalTexture> {
        self.camera.as_ref()
    }

    pub fn depth(&self) -> Option<&DepthTexture> {
        self.depth.as_ref()
    }

    pub fn is_camera_initialized(&self) -> bool {
        self.camera.is_some()
    }

    /// Forget both textures, returning the handles that still need destroying.
    pub fn take_handles(&mut self) -> Vec<TextureHandle> {
        self.camera
            .take()
            .map(|t| t.handle())
            .into_iter()
            .chain(self.depth.take().map(|t| t.handle()))
            .collect()
    }
}
