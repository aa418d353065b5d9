//! Common types shared between the camera stream and the rendering engine

/// Handle to an engine vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferHandle(u64);

/// Handle to an engine index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferHandle(u64);

/// Handle to an engine texture (external or regular)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

/// Handle to a material instance owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialInstanceHandle(u64);

/// Handle to a scene-graph entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(u64);

macro_rules! raw_handle {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                /// Wrap an engine-side identifier.
                pub const fn from_raw(raw: u64) -> Self {
                    Self(raw)
                }

                /// The engine-side identifier.
                pub const fn raw(&self) -> u64 {
                    self.0
                }
            }
        )*
    };
}

raw_handle!(
    VertexBufferHandle,
    IndexBufferHandle,
    TextureHandle,
    MaterialInstanceHandle,
    EntityHandle,
);

/// Platform identifier of the image stream the camera writes into
/// (for example a GL external OES texture name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalImageId(pub u32);

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rg8Unorm,
    R16Uint,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm => 4,
            TextureFormat::Rg8Unorm | TextureFormat::R16Uint => 2,
        }
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUsage(u32);

impl TextureUsage {
    pub const COPY_DST: Self = Self(1 << 0);
    pub const TEXTURE_BINDING: Self = Self(1 << 1);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for TextureUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Texture descriptor for textures populated by explicit uploads
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Size in bytes of one full upload.
    pub fn byte_size(&self) -> usize {
        (self.width * self.height * self.format.bytes_per_pixel()) as usize
    }
}

/// Descriptor for a texture bound directly to a platform image stream
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTextureDescriptor {
    pub label: Option<String>,
    pub image: ExternalImageId,
    pub width: u32,
    pub height: u32,
}

/// Vertex attribute semantic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Uv0,
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

impl VertexFormat {
    pub fn size(&self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
        }
    }
}

/// One attribute, read from its own buffer slot
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub buffer_slot: u32,
    pub format: VertexFormat,
    pub offset: u64,
    pub stride: u64,
}

/// Vertex buffer descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferDescriptor {
    pub label: Option<String>,
    pub vertex_count: u32,
    pub buffer_count: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferDescriptor {
    /// Expected byte size of the data uploaded to `slot`.
    pub fn slot_size(&self, slot: u32) -> Option<u64> {
        self.attributes
            .iter()
            .find(|a| a.buffer_slot == slot)
            .map(|a| a.stride * self.vertex_count as u64)
    }
}

/// Index format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
}

impl IndexFormat {
    pub fn size(&self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
        }
    }
}

/// Index buffer descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBufferDescriptor {
    pub label: Option<String>,
    pub index_count: u32,
    pub format: IndexFormat,
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// Filter mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Address mode for samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    ClampToEdge,
}

/// Sampler state used when a texture is bound to a material parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDescriptor {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
}

impl SamplerDescriptor {
    pub fn linear_clamp() -> Self {
        Self::default()
    }

    pub fn nearest_clamp() -> Self {
        Self {
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Self::default()
        }
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
        }
    }
}

/// Draw order of a renderable; higher priorities are drawn later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderPriority(u8);

impl RenderPriority {
    pub const FIRST: Self = Self(0);
    pub const DEFAULT: Self = Self(4);
    pub const LAST: Self = Self(7);

    /// Create a priority, clamping to the supported `FIRST..=LAST` range.
    pub fn new(priority: i32) -> Self {
        Self(priority.clamp(Self::FIRST.0 as i32, Self::LAST.0 as i32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for RenderPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the engine needs to build a single-primitive renderable
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDescriptor {
    pub vertex_buffer: VertexBufferHandle,
    pub index_buffer: IndexBufferHandle,
    pub topology: PrimitiveTopology,
    pub material: MaterialInstanceHandle,
    pub priority: RenderPriority,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Frustum culling; needs a bounding box, which the camera quad does not have.
    pub culling: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_priority_clamps() {
        assert_eq!(RenderPriority::new(-3), RenderPriority::FIRST);
        assert_eq!(RenderPriority::new(42), RenderPriority::LAST);
        assert_eq!(RenderPriority::new(5).value(), 5);
        assert!(RenderPriority::LAST > RenderPriority::DEFAULT);
    }

    #[test]
    fn vertex_slot_size() {
        let desc = VertexBufferDescriptor {
            label: None,
            vertex_count: 3,
            buffer_count: 2,
            attributes: vec![VertexAttribute {
                semantic: VertexSemantic::Uv0,
                buffer_slot: 1,
                format: VertexFormat::Float32x2,
                offset: 0,
                stride: VertexFormat::Float32x2.size(),
            }],
        };
        assert_eq!(desc.slot_size(1), Some(24));
        assert_eq!(desc.slot_size(0), None);
    }

    #[test]
    fn texture_byte_size() {
        let desc = TextureDescriptor {
            label: None,
            width: 160,
            height: 90,
            format: TextureFormat::Rg8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        };
        assert_eq!(desc.byte_size(), 160 * 90 * 2);
        assert!(desc.usage.contains(TextureUsage::COPY_DST));
    }
}
