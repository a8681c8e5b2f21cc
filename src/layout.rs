use crate::program::{LinkedProgram, ShaderBackend};

/// Component layout of a single vertex attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttribFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl AttribFormat {
    pub fn components(self) -> u32 {
        match self {
            Self::Float32 => 1,
            Self::Float32x2 => 2,
            Self::Float32x3 => 3,
            Self::Float32x4 => 4,
        }
    }

    pub fn size(self) -> u32 {
        self.components() * size_of::<f32>() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub format: AttribFormat,
    pub offset: u32,
}

/// Interleaved attributes stored in one vertex buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferLayout {
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

/// An attribute resolved to the input slot the program reads it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAttribute {
    pub name: &'static str,
    pub location: u32,
    pub format: AttribFormat,
    pub offset: u32,
    pub stride: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Triangles,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: PrimitiveMode,
    pub first: u32,
    pub count: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("attribute `{name}` is not an active input of the program")]
    InactiveAttribute { name: &'static str },

    #[error("attribute `{name}` ends at byte {end}, past the stride of {stride}")]
    AttributeOutOfStride { name: &'static str, end: u32, stride: u32 },

    #[error("buffer of {len} bytes is not a whole number of {stride}-byte vertices")]
    PartialVertex { len: usize, stride: u32 },

    #[error("buffer holds {count} vertices, more than a draw call can address")]
    TooManyVertices { count: usize },

    #[error("vertex buffers disagree on vertex count: {expected} vs {found}")]
    VertexCountMismatch { expected: u32, found: u32 },
}

impl VertexBufferLayout {
    /// Layout with the attributes packed back to back in the given order.
    pub fn packed(attributes: &[(&'static str, AttribFormat)]) -> Self {
        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|&(name, format)| {
                let attr = VertexAttribute { name, format, offset };
                offset += format.size();
                attr
            })
            .collect();
        Self { stride: offset, attributes }
    }

    /// Looks up every attribute's location in `program`.
    pub fn resolve<B: ShaderBackend + ?Sized>(
        &self,
        program: &LinkedProgram<'_, B>,
    ) -> Result<Vec<BoundAttribute>, LayoutError> {
        self.attributes
            .iter()
            .map(|attr| {
                let end = attr.offset + attr.format.size();
                if end > self.stride {
                    return Err(LayoutError::AttributeOutOfStride {
                        name: attr.name,
                        end,
                        stride: self.stride,
                    });
                }
                let location = program
                    .attrib_location(attr.name)
                    .ok_or(LayoutError::InactiveAttribute { name: attr.name })?;
                Ok(BoundAttribute {
                    name: attr.name,
                    location,
                    format: attr.format,
                    offset: attr.offset,
                    stride: self.stride,
                })
            })
            .collect()
    }

    pub fn vertex_count(&self, byte_len: usize) -> Result<u32, LayoutError> {
        let stride = self.stride as usize;
        if stride == 0 || byte_len % stride != 0 {
            return Err(LayoutError::PartialVertex { len: byte_len, stride: self.stride });
        }
        let count = byte_len / stride;
        u32::try_from(count).map_err(|_| LayoutError::TooManyVertices { count })
    }
}
