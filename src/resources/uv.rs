//! Per-frame camera UV transform

use glam::Vec2;

use super::mesh::{QUAD_UVS, VERTEX_COUNT};
use crate::tracking::ArFrame;

/// Flip the V axis. The tracking subsystem puts `v = 0` at the top of the
/// image; the renderer samples with `v = 0` at the bottom.
pub fn flip_v(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

/// Raw and display-transformed UVs of the camera quad.
#[derive(Debug, Clone, PartialEq)]
pub struct UvTransformTracker {
    raw: [Vec2; VERTEX_COUNT],
    transformed: [Vec2; VERTEX_COUNT],
}

impl UvTransformTracker {
    pub fn new() -> Self {
        Self {
            raw: QUAD_UVS,
            transformed: QUAD_UVS.map(flip_v),
        }
    }

    /// Recompute the transformed UVs from this frame's display transform.
    pub fn recalculate(&mut self, frame: &dyn ArFrame) -> &[Vec2; VERTEX_COUNT] {
        frame.transform_display_uv_coords(&self.raw, &mut self.transformed);
        for uv in self.transformed.iter_mut() {
            *uv = flip_v(*uv);
        }
        &self.transformed
    }

    /// UVs supplied by the device, before any transform.
    pub fn raw(&self) -> &[Vec2; VERTEX_COUNT] {
        &self.raw
    }

    /// UVs currently uploaded to the GPU.
    pub fn transformed(&self) -> &[Vec2; VERTEX_COUNT] {
        &self.transformed
    }
}

impl Default for UvTransformTracker {
    fn default() -> Self {
        Self::new()
    }
}
