//! Static vertex geometry: one vertex array object over one vertex buffer.

use tracing::trace;

use crate::{backend::Backend, error::RenderError, gpu::Gpu, types::Vertex};

/// Attribute location of the position input in the vertex shader.
pub const POSITION_LOCATION: u32 = 0;

/// Uploaded vertex data and the attribute layout describing it.
///
/// The vertex data is copied to the GPU once, with a static usage hint.
/// Geometry that changes per frame needs a streaming buffer and a different
/// update path; this type has neither.
#[derive(Debug)]
pub struct Geometry<B: Backend> {
    vao: B::VertexArray,
    vbo: B::Buffer,
    vertex_count: i32,
}

impl<B: Backend> Geometry<B> {
    /// Create the vertex array and buffer and upload `vertices`.
    ///
    /// The calls are issued in the order the GL binding model needs: bind
    /// the VAO, bind the VBO, upload, describe attribute 0 as three packed
    /// floats, enable it, then unbind the VBO and the VAO. Nothing is left
    /// bound afterwards.
    ///
    /// # Errors
    ///
    /// [`RenderError::Allocation`] if either object cannot be created,
    /// [`RenderError::Driver`] if the error flag is set after setup (subject
    /// to the error check policy). Created objects are released on error.
    ///
    /// # Panics
    ///
    /// Panics if `vertices.len()` exceeds `i32::MAX`.
    pub fn create(gpu: &mut Gpu<B>, vertices: &[Vertex]) -> Result<Self, RenderError> {
        let vertex_count =
            i32::try_from(vertices.len()).expect("vertex count exceeds i32::MAX");

        let vao = gpu
            .backend()
            .create_vertex_array()
            .map_err(RenderError::allocation("vertex array"))?;
        let vbo = match gpu.backend().create_buffer() {
            Ok(vbo) => vbo,
            Err(reason) => {
                gpu.backend().delete_vertex_array(vao);
                return Err(RenderError::Allocation {
                    object: "vertex buffer",
                    reason,
                });
            }
        };

        gpu.bind_vertex_array(Some(vao));
        gpu.bind_array_buffer(Some(vbo));
        gpu.backend().upload_static(bytemuck::cast_slice(vertices));
        gpu.backend().vertex_attrib_pointer_f32(
            POSITION_LOCATION,
            Vertex::COMPONENTS,
            Vertex::STRIDE,
            0,
        );
        gpu.backend().enable_vertex_attrib_array(POSITION_LOCATION);

        // The attribute pointer has captured the VBO, so both can be unbound.
        gpu.bind_array_buffer(None);
        gpu.bind_vertex_array(None);

        let geometry = Self {
            vao,
            vbo,
            vertex_count,
        };
        if let Err(e) = gpu.check("vertex buffer setup") {
            geometry.delete(gpu);
            return Err(e);
        }

        trace!(
            "uploaded {0} vertices into buffer {1:?} (vertex array {2:?})",
            vertex_count,
            vbo,
            vao
        );
        Ok(geometry)
    }

    /// The vertex array object.
    pub fn vertex_array(&self) -> B::VertexArray {
        self.vao
    }

    /// The vertex buffer object.
    pub fn buffer(&self) -> B::Buffer {
        self.vbo
    }

    /// Number of vertices uploaded.
    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Bind the vertex array for drawing.
    pub fn bind(&self, gpu: &mut Gpu<B>) {
        gpu.bind_vertex_array(Some(self.vao));
    }

    /// Release the vertex array and the buffer.
    pub fn delete(self, gpu: &mut Gpu<B>) {
        trace!(
            "deleting vertex array {0:?} and buffer {1:?}",
            self.vao,
            self.vbo
        );
        gpu.forget_vertex_array(self.vao);
        gpu.backend().delete_vertex_array(self.vao);
        gpu.forget_buffer(self.vbo);
        gpu.backend().delete_buffer(self.vbo);
    }
}
