use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use crate::layout::{AttribFormat, VertexBufferLayout};

/// Clip-space position fed to `a_position`
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: Vec2,
}

/// Per-vertex color fed to `a_color`, kept in its own buffer
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, Pod, Zeroable)]
pub struct ColorVertex {
    pub color: Vec3,
}

impl PositionVertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { position: Vec2::new(x, y) }
    }

    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(&[("a_position", AttribFormat::Float32x2)])
    }
}

impl ColorVertex {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { color: Vec3::new(r, g, b) }
    }

    pub fn layout() -> VertexBufferLayout {
        VertexBufferLayout::packed(&[("a_color", AttribFormat::Float32x3)])
    }
}
