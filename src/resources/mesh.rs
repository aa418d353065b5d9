//! Full-screen camera quad geometry

use glam::{Vec2, Vec3};

use crate::backend::*;
use crate::error::CameraStreamResult;

/// Vertices in the camera quad.
pub const VERTEX_COUNT: usize = 3;

/// Vertex buffer slot holding positions.
pub const POSITION_SLOT: u32 = 0;

/// Vertex buffer slot holding UVs.
pub const UV_SLOT: u32 = 1;

/// One over-sized triangle covering the whole viewport in clip space.
pub const QUAD_POSITIONS: [Vec3; VERTEX_COUNT] = [
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, -3.0, 1.0),
    Vec3::new(3.0, 1.0, 1.0),
];

/// Camera-image UVs for [`QUAD_POSITIONS`]; the visible part of the triangle
/// spans exactly `0..1` on both axes.
pub const QUAD_UVS: [Vec2; VERTEX_COUNT] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 2.0),
    Vec2::new(2.0, 0.0),
];

pub const QUAD_INDICES: [u16; VERTEX_COUNT] = [0, 1, 2];

/// GPU buffers of the camera quad.
///
/// Positions and indices are uploaded once at creation and never change.
/// Only the UV slot is re-uploaded, once per frame.
#[derive(Debug)]
pub struct CameraQuad {
    vertex_buffer: VertexBufferHandle,
    index_buffer: IndexBufferHandle,
}

impl CameraQuad {
    /// Layout with one buffer per attribute: positions in slot 0, UVs in slot 1.
    pub fn vertex_layout(label: &str) -> VertexBufferDescriptor {
        VertexBufferDescriptor {
            label: Some(format!("{label} vertices")),
            vertex_count: VERTEX_COUNT as u32,
            buffer_count: 2,
            attributes: vec![
                VertexAttribute {
                    semantic: VertexSemantic::Position,
                    buffer_slot: POSITION_SLOT,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                    stride: VertexFormat::Float32x3.size(),
                },
                VertexAttribute {
                    semantic: VertexSemantic::Uv0,
                    buffer_slot: UV_SLOT,
                    format: VertexFormat::Float32x2,
                    offset: 0,
                    stride: VertexFormat::Float32x2.size(),
                },
            ],
        }
    }

    /// Allocate the buffers and upload the fixed quad with the given UVs.
    pub fn create(
        engine: &dyn RenderEngine,
        label: &str,
        uvs: &[Vec2; VERTEX_COUNT],
    ) -> CameraStreamResult<Self> {
        let index_buffer = engine.create_index_buffer(&IndexBufferDescriptor {
            label: Some(format!("{label} indices")),
            index_count: QUAD_INDICES.len() as u32,
            format: IndexFormat::Uint16,
        })?;
        engine.set_index_buffer(index_buffer, bytemuck::cast_slice(&QUAD_INDICES));

        let vertex_buffer = match engine.create_vertex_buffer(&Self::vertex_layout(label)) {
            Ok(buffer) => buffer,
            Err(e) => {
                engine.destroy_index_buffer(index_buffer);
                return Err(e.into());
            }
        };
        engine.set_vertex_buffer_at(
            vertex_buffer,
            POSITION_SLOT,
            bytemuck::cast_slice(&QUAD_POSITIONS),
        );

        let quad = Self {
            vertex_buffer,
            index_buffer,
        };
        quad.upload_uvs(engine, uvs);

        log::debug!("Created camera quad {vertex_buffer:?} / {index_buffer:?}");
        Ok(quad)
    }

    /// Push a UV set to the UV slot.
    pub fn upload_uvs(&self, engine: &dyn RenderEngine, uvs: &[Vec2; VERTEX_COUNT]) {
        log::trace!("Uploading camera UVs {uvs:?}");
        engine.set_vertex_buffer_at(self.vertex_buffer, UV_SLOT, bytemuck::cast_slice(uvs));
    }

    pub fn vertex_buffer(&self) -> VertexBufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> IndexBufferHandle {
        self.index_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_region_maps_to_unit_uvs() {
        // Clip-space (x, y) -> uv is affine on this triangle; check the
        // viewport corners land on 0 and 1.
        let to_uv = |p: Vec3| Vec2::new((p.x + 1.0) / 2.0, (1.0 - p.y) / 2.0);
        for (position, uv) in QUAD_POSITIONS.iter().zip(QUAD_UVS.iter()) {
            assert_eq!(to_uv(*position), *uv);
        }
    }

    #[test]
    fn layout_has_position_and_uv_slots() {
        let layout = CameraQuad::vertex_layout("quad");
        assert_eq!(layout.vertex_count, 3);
        assert_eq!(layout.slot_size(POSITION_SLOT), Some(36));
        assert_eq!(layout.slot_size(UV_SLOT), Some(24));
    }

    #[test]
    fn create_uploads_fixed_geometry() {
        let engine = DummyEngine::new();
        let quad = CameraQuad::create(&engine, "quad", &QUAD_UVS).unwrap();

        let positions = engine
            .vertex_slot_data(quad.vertex_buffer(), POSITION_SLOT)
            .unwrap();
        assert_eq!(positions.as_slice(), bytemuck::cast_slice::<Vec3, u8>(&QUAD_POSITIONS));

        let indices = engine.index_data(quad.index_buffer()).unwrap();
        assert_eq!(indices.as_slice(), bytemuck::cast_slice::<u16, u8>(&QUAD_INDICES));

        let uvs = engine.vertex_slot_data(quad.vertex_buffer(), UV_SLOT).unwrap();
        assert_eq!(uvs.len(), 24);
    }

    #[test]
    fn create_on_dead_engine_fails_without_leaking() {
        let engine = DummyEngine::new();
        engine.invalidate();
        assert!(CameraQuad::create(&engine, "quad", &QUAD_UVS).is_err());
        assert_eq!(engine.index_buffer_count(), 0);
    }
}
