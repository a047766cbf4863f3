//! The graphics API surface the renderer depends on.
//!
//! [`Backend`] is the narrow slice of OpenGL this crate actually uses. The
//! production implementation, [`GlowBackend`], forwards each call to
//! [`glow`]; tests swap in a recording fake so the shader, geometry, and
//! frame-loop sequencing can be checked without a GPU.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use glow::HasContext;

use crate::types::ShaderStage;

/// A GL-like graphics backend.
///
/// Handles are opaque driver names. The backend does no lifetime tracking:
/// every `create_*` must be matched by the corresponding `delete_*`.
///
/// Buffer calls always target `GL_ARRAY_BUFFER`; the renderer never binds
/// anything else.
pub trait Backend {
    /// A shader object name.
    type Shader: Copy + Debug + Eq + Hash;
    /// A program object name.
    type Program: Copy + Debug + Eq + Hash;
    /// A vertex array object name.
    type VertexArray: Copy + Debug + Eq + Hash;
    /// A buffer object name.
    type Buffer: Copy + Debug + Eq + Hash;

    /// Allocate a shader object for `stage`.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no name could be allocated.
    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Replace the shader's source text.
    fn shader_source(&mut self, shader: Self::Shader, source: &str);
    /// Compile the shader's current source.
    fn compile_shader(&mut self, shader: Self::Shader);
    /// `GL_COMPILE_STATUS` of the last compile.
    fn shader_compile_status(&mut self, shader: Self::Shader) -> bool;
    /// The driver's compile diagnostics.
    fn shader_info_log(&mut self, shader: Self::Shader) -> String;
    /// Release a shader object.
    fn delete_shader(&mut self, shader: Self::Shader);

    /// Allocate an empty program object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no name could be allocated.
    fn create_program(&mut self) -> Result<Self::Program, String>;
    /// Attach a compiled shader to a program.
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    /// Detach a shader from a program.
    fn detach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    /// Link all attached shaders.
    fn link_program(&mut self, program: Self::Program);
    /// `GL_LINK_STATUS` of the last link.
    fn program_link_status(&mut self, program: Self::Program) -> bool;
    /// The driver's link diagnostics.
    fn program_info_log(&mut self, program: Self::Program) -> String;
    /// Make `program` current, or unbind with `None`.
    fn use_program(&mut self, program: Option<Self::Program>);
    /// Release a program object.
    fn delete_program(&mut self, program: Self::Program);

    /// Allocate a vertex array object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no name could be allocated.
    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, String>;
    /// Bind `vertex_array`, or unbind with `None`.
    fn bind_vertex_array(&mut self, vertex_array: Option<Self::VertexArray>);
    /// Release a vertex array object.
    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);

    /// Allocate a buffer object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no name could be allocated.
    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;
    /// Bind `buffer` to `GL_ARRAY_BUFFER`, or unbind with `None`.
    fn bind_array_buffer(&mut self, buffer: Option<Self::Buffer>);
    /// Upload `data` into the bound array buffer with `GL_STATIC_DRAW`.
    fn upload_static(&mut self, data: &[u8]);
    /// Release a buffer object.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Describe float attribute `index` in terms of the bound array buffer.
    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32);
    /// Enable attribute slot `index` on the bound vertex array.
    fn enable_vertex_attrib_array(&mut self, index: u32);

    /// Set the viewport rectangle in window pixels.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    /// Set the color used by [`clear_color_buffer`](Self::clear_color_buffer).
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    /// Clear the color buffer only.
    fn clear_color_buffer(&mut self);
    /// Draw `count` vertices as `GL_TRIANGLES` starting at `first`.
    fn draw_triangles(&mut self, first: i32, count: i32);

    /// Read and reset the GL error flag. `glow::NO_ERROR` when clean.
    fn get_error(&mut self) -> u32;
}

/// [`Backend`] over a live [`glow::Context`].
pub struct GlowBackend {
    gl: Arc<glow::Context>,
}

impl GlowBackend {
    /// Wrap a loaded GL context.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread, and stay current
    /// (on this thread only) for as long as the backend is used.
    #[must_use]
    pub unsafe fn new(gl: Arc<glow::Context>) -> Self {
        Self { gl }
    }

    /// The wrapped context.
    #[must_use]
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

// The safety contract of `GlowBackend::new` covers every call below: the
// context is current on this thread and handles are only ever passed back
// to the context that created them.
impl Backend for GlowBackend {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type VertexArray = glow::VertexArray;
    type Buffer = glow::Buffer;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }
    }

    fn shader_source(&mut self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) };
    }

    fn compile_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) };
    }

    fn shader_compile_status(&mut self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&mut self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) };
    }

    fn create_program(&mut self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) };
    }

    fn detach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) };
    }

    fn link_program(&mut self, program: Self::Program) {
        unsafe { self.gl.link_program(program) };
    }

    fn program_link_status(&mut self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&mut self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) };
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) };
    }

    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) };
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_array_buffer(&mut self, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer) };
    }

    fn upload_static(&mut self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset);
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) };
    }

    fn clear_color_buffer(&mut self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };
    }

    fn draw_triangles(&mut self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) };
    }

    fn get_error(&mut self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
