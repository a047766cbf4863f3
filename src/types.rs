//! Plain data shared by the shader compiler, geometry setup, and frame loop.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// An RGBA color with components in `[0, 1]`.
pub type Color = [f32; 4];

/// A vertex as laid out in the vertex buffer: one `vec3` position at
/// attribute location 0, tightly packed.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in normalized device coordinates.
    pub position: [f32; 3],
}

impl Vertex {
    /// Number of `f32` components per vertex.
    pub const COMPONENTS: i32 = 3;

    /// Byte distance between consecutive vertices.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const STRIDE: i32 = std::mem::size_of::<Self>() as i32;

    /// Build a vertex from its three coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// The hardcoded triangle: left, right, top, in normalized device
/// coordinates.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new(-0.5, -0.5, 0.0),
    Vertex::new(0.5, -0.5, 0.0),
    Vertex::new(0.0, 0.5, 0.0),
];

/// A programmable pipeline stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex stage; writes `gl_Position`.
    Vertex,
    /// Per-fragment stage; writes the output color.
    Fragment,
}

impl ShaderStage {
    /// The GL enum passed to `glCreateShader`.
    #[must_use]
    pub const fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}
