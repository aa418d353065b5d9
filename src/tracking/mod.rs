//! Tracking session collaborator
//!
//! The AR tracking subsystem is external. The camera stream only needs to ask
//! the session what depth data it is configured to produce, and to read the
//! camera intrinsics, the display UV transform and the optional depth image
//! from each frame.

mod depth;

pub use depth::*;

use glam::{UVec2, Vec2};

/// Depth configuration of the tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionDepthMode {
    #[default]
    Disabled,
    /// Smoothed depth with holes filled
    Automatic,
    /// Unfiltered depth from the sensor
    RawDepthOnly,
}

/// Read-only view of the tracking session configuration
pub trait ArSession {
    /// Whether the device can produce depth in the given mode.
    fn is_depth_mode_supported(&self, mode: SessionDepthMode) -> bool;

    /// The depth mode of the active configuration.
    fn depth_mode(&self) -> SessionDepthMode;
}

/// Intrinsics of the camera image delivered to the external texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in pixels
    pub focal_length: Vec2,
    /// Principal point in pixels
    pub principal_point: Vec2,
    /// Image width and height in pixels
    pub image_dimensions: UVec2,
}

impl CameraIntrinsics {
    pub fn new(focal_length: Vec2, principal_point: Vec2, width: u32, height: u32) -> Self {
        Self {
            focal_length,
            principal_point,
            image_dimensions: UVec2::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image_dimensions.x
    }

    pub fn height(&self) -> u32 {
        self.image_dimensions.y
    }
}

/// One tracking frame
pub trait ArFrame {
    /// Intrinsics of the GPU camera texture for this frame.
    fn texture_intrinsics(&self) -> CameraIntrinsics;

    /// Map normalized camera-image UVs to the current display orientation.
    ///
    /// `input` and `output` have the same length.
    fn transform_display_uv_coords(&self, input: &[Vec2], output: &mut [Vec2]);

    /// Smoothed depth image, when the session produces one.
    fn acquire_depth_image(&self) -> Option<DepthImage> {
        None
    }

    /// Raw depth image, when the session produces one.
    fn acquire_raw_depth_image(&self) -> Option<DepthImage> {
        None
    }
}

/// What depth data the session is able to provide, derived from its
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthMode {
    /// The session does not produce depth
    #[default]
    NoDepth,
    /// The session is configured for smoothed depth
    Depth,
    /// The session is configured for raw depth
    RawDepth,
}

impl DepthMode {
    /// Derive the mode from the session configuration.
    ///
    /// A configured mode only counts if the device also supports it.
    pub fn from_session(session: &dyn ArSession) -> Self {
        let configured = session.depth_mode();
        let mut mode = DepthMode::NoDepth;

        if session.is_depth_mode_supported(SessionDepthMode::Automatic)
            && configured == SessionDepthMode::Automatic
        {
            mode = DepthMode::Depth;
        }

        if session.is_depth_mode_supported(SessionDepthMode::RawDepthOnly)
            && configured == SessionDepthMode::RawDepthOnly
        {
            mode = DepthMode::RawDepth;
        }

        mode
    }

    pub fn has_depth(&self) -> bool {
        matches!(self, DepthMode::Depth | DepthMode::RawDepth)
    }

    /// Acquire the depth image matching this mode from a frame.
    pub fn acquire_image(&self, frame: &dyn ArFrame) -> Option<DepthImage> {
        match self {
            DepthMode::NoDepth => None,
            DepthMode::Depth => frame.acquire_depth_image(),
            DepthMode::RawDepth => frame.acquire_raw_depth_image(),
        }
    }
}

/// Whether the user wants depth used for occlusion when it is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthModeUsage {
    /// Use the occlusion material when the session provides depth
    Enabled,
    /// Always use the standard camera material
    #[default]
    Disabled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Session {
        supported: &'static [SessionDepthMode],
        configured: SessionDepthMode,
    }

    impl ArSession for Session {
        fn is_depth_mode_supported(&self, mode: SessionDepthMode) -> bool {
            self.supported.contains(&mode)
        }

        fn depth_mode(&self) -> SessionDepthMode {
            self.configured
        }
    }

    const ALL: &[SessionDepthMode] = &[SessionDepthMode::Automatic, SessionDepthMode::RawDepthOnly];

    #[rstest]
    #[case::disabled(ALL, SessionDepthMode::Disabled, DepthMode::NoDepth)]
    #[case::automatic(ALL, SessionDepthMode::Automatic, DepthMode::Depth)]
    #[case::raw(ALL, SessionDepthMode::RawDepthOnly, DepthMode::RawDepth)]
    #[case::automatic_unsupported(&[], SessionDepthMode::Automatic, DepthMode::NoDepth)]
    #[case::raw_unsupported(
        &[SessionDepthMode::Automatic],
        SessionDepthMode::RawDepthOnly,
        DepthMode::NoDepth
    )]
    fn depth_mode_from_session(
        #[case] supported: &'static [SessionDepthMode],
        #[case] configured: SessionDepthMode,
        #[case] expected: DepthMode,
    ) {
        let session = Session {
            supported,
            configured,
        };
        assert_eq!(DepthMode::from_session(&session), expected);
    }

    #[test]
    fn defaults() {
        assert_eq!(DepthMode::default(), DepthMode::NoDepth);
        assert_eq!(DepthModeUsage::default(), DepthModeUsage::Disabled);
        assert!(!DepthMode::NoDepth.has_depth());
        assert!(DepthMode::RawDepth.has_depth());
    }

    #[test]
    fn intrinsics_dimensions() {
        let intrinsics =
            CameraIntrinsics::new(Vec2::splat(500.0), Vec2::new(320.0, 240.0), 640, 480);
        assert_eq!(intrinsics.width(), 640);
        assert_eq!(intrinsics.height(), 480);
    }
}
