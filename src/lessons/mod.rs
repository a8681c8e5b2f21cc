//! The tutorial drawings as data: shader pair, vertex buffers and draw call.

mod vertex;

pub use vertex::{ColorVertex, PositionVertex};

use std::fmt;
use crate::layout::{BoundAttribute, DrawCall, LayoutError, PrimitiveMode, VertexBufferLayout};
use crate::loader::SourceLoader;
use crate::program::{
    BuildError, LinkedProgram, ProgramBuilder, ShaderBackend, ShaderSource, SourceLoadError,
};

const POINT_VERT: &str = "#version 450 core

layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    gl_PointSize = 10.0;
}
";

const POINT_FRAG: &str = "#version 450 core

layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.0, 0.0, 1.0);
}
";

const TRIANGLE_VERT: &str = "#version 450 core

layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

const TRIANGLE_FRAG: &str = "#version 450 core

layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(0.2, 0.6, 1.0, 1.0);
}
";

const COLORED_VERT: &str = "#version 450 core

layout(location = 0) in vec2 a_position;
layout(location = 1) in vec3 a_color;

layout(location = 0) out vec3 v_color;

void main() {
    v_color = a_color;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

const COLORED_FRAG: &str = "#version 450 core

layout(location = 0) in vec3 v_color;

layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(v_color, 1.0);
}
";

const LOADED_VERT_PATH: &str = "triangle.vert";
const LOADED_FRAG_PATH: &str = "triangle.frag";

const POINT: [PositionVertex; 1] = [PositionVertex::new(0.0, 0.0)];

const TRIANGLE: [PositionVertex; 3] = [
    PositionVertex::new(0.0, 0.5),
    PositionVertex::new(-0.5, -0.5),
    PositionVertex::new(0.5, -0.5),
];

const TWO_TRIANGLES: [PositionVertex; 6] = [
    PositionVertex::new(-0.9, -0.5),
    PositionVertex::new(-0.1, -0.5),
    PositionVertex::new(-0.5, 0.5),
    PositionVertex::new(0.1, -0.5),
    PositionVertex::new(0.9, -0.5),
    PositionVertex::new(0.5, 0.5),
];

const TWO_TRIANGLE_COLORS: [ColorVertex; 6] = [
    ColorVertex::new(1.0, 0.0, 0.0),
    ColorVertex::new(0.0, 1.0, 0.0),
    ColorVertex::new(0.0, 0.0, 1.0),
    ColorVertex::new(1.0, 1.0, 0.0),
    ColorVertex::new(0.0, 1.0, 1.0),
    ColorVertex::new(1.0, 0.0, 1.0),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lesson {
    Point,
    Triangle,
    ColoredTriangles,
    /// The triangle again, with its shaders read through a [`SourceLoader`].
    LoadedTriangle,
}

#[derive(thiserror::Error, Debug)]
pub enum LessonError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Vertex bytes ready for upload, with the slots they feed
#[derive(Debug)]
pub struct PreparedBuffer {
    pub data: Vec<u8>,
    pub attributes: Vec<BoundAttribute>,
}

pub struct PreparedLesson<'a, B: ShaderBackend + ?Sized> {
    pub lesson: Lesson,
    pub program: LinkedProgram<'a, B>,
    pub buffers: Vec<PreparedBuffer>,
    pub draw: DrawCall,
}

impl Lesson {
    pub const ALL: [Lesson; 4] = [
        Lesson::Point,
        Lesson::Triangle,
        Lesson::ColoredTriangles,
        Lesson::LoadedTriangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Triangle => "triangle",
            Self::ColoredTriangles => "colored-triangles",
            Self::LoadedTriangle => "loaded-triangle",
        }
    }

    pub fn mode(self) -> PrimitiveMode {
        match self {
            Self::Point => PrimitiveMode::Points,
            _ => PrimitiveMode::Triangles,
        }
    }

    fn sources(self, loader: &SourceLoader) -> Result<(ShaderSource, ShaderSource), SourceLoadError> {
        let (vert, frag) = match self {
            Self::Point => (POINT_VERT, POINT_FRAG),
            Self::Triangle => (TRIANGLE_VERT, TRIANGLE_FRAG),
            Self::ColoredTriangles => (COLORED_VERT, COLORED_FRAG),
            Self::LoadedTriangle => {
                return Ok((
                    loader.load_inferred(LOADED_VERT_PATH)?,
                    loader.load_inferred(LOADED_FRAG_PATH)?,
                ));
            }
        };
        Ok((ShaderSource::vertex(vert), ShaderSource::fragment(frag)))
    }

    fn buffers(self) -> Vec<(Vec<u8>, VertexBufferLayout)> {
        match self {
            Self::Point => vec![positions(&POINT)],
            Self::Triangle | Self::LoadedTriangle => vec![positions(&TRIANGLE)],
            Self::ColoredTriangles => vec![
                positions(&TWO_TRIANGLES),
                (bytemuck::cast_slice::<_, u8>(&TWO_TRIANGLE_COLORS).to_vec(), ColorVertex::layout()),
            ],
        }
    }

    /// Builds the program, binds every buffer's attributes to the program's
    /// input slots and works out the draw call.
    pub fn prepare<'a, B: ShaderBackend + ?Sized>(
        self,
        builder: &ProgramBuilder<'a, B>,
        loader: &SourceLoader,
    ) -> Result<PreparedLesson<'a, B>, LessonError> {
        let (vertex, fragment) = self.sources(loader).map_err(BuildError::from)?;
        let program = builder.build_sources(vertex, fragment)?;

        let mut count = None;
        let mut buffers = Vec::new();
        for (data, layout) in self.buffers() {
            let vertices = layout.vertex_count(data.len())?;
            match count {
                None => count = Some(vertices),
                Some(expected) if expected != vertices => {
                    return Err(LayoutError::VertexCountMismatch { expected, found: vertices }.into());
                }
                Some(_) => {}
            }
            let attributes = layout.resolve(&program)?;
            buffers.push(PreparedBuffer { data, attributes });
        }

        let draw = DrawCall {
            mode: self.mode(),
            first: 0,
            count: count.unwrap_or(0),
        };

        Ok(PreparedLesson { lesson: self, program, buffers, draw })
    }
}

fn positions(vertices: &[PositionVertex]) -> (Vec<u8>, VertexBufferLayout) {
    (bytemuck::cast_slice::<_, u8>(vertices).to_vec(), PositionVertex::layout())
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
