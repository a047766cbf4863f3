//! The renderer: owns the GPU objects for the triangle and issues the
//! per-frame commands.

use tracing::{debug, trace};

use crate::{
    backend::Backend,
    error::RenderError,
    geometry::Geometry,
    gpu::Gpu,
    shaders::{self, LinkedProgram},
    types::{Color, Vertex, TRIANGLE},
};

/// Convert a `u32` to `i32` for GL API calls.
///
/// # Panics
///
/// Panics if `value > i32::MAX`. In practice, this is unreachable for
/// window dimensions.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).expect("dimension exceeds i32::MAX")
}

/// Draws a single hardcoded triangle.
///
/// Holds the three GPU objects created at startup: the linked program, the
/// vertex array, and its vertex buffer. They live until
/// [`destroy`](Self::destroy), which consumes the renderer so nothing can be
/// released twice or used afterwards.
///
/// # Example
///
/// ```no_run
/// # use triangle_renderer_glow::{backend::GlowBackend, config::ErrorChecks, gpu::Gpu, TriangleRenderer};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), triangle_renderer_glow::RenderError> {
/// // During setup (with a current GL context):
/// let mut gpu = Gpu::new(unsafe { GlowBackend::new(gl) }, ErrorChecks::Always);
/// let renderer = TriangleRenderer::new(&mut gpu, [0.2, 0.3, 0.3, 1.0])?;
///
/// // Each frame:
/// renderer.render(&mut gpu)?;
///
/// // On shutdown:
/// renderer.destroy(&mut gpu);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TriangleRenderer<B: Backend> {
    /// Compiled identity/solid-color program.
    program: LinkedProgram<B>,
    /// Vertex array plus the static buffer behind it.
    geometry: Geometry<B>,
    /// Background color applied before each draw.
    clear_color: Color,
}

impl<B: Backend> TriangleRenderer<B> {
    /// Create a renderer for the default triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if shader compilation, program linking, or vertex
    /// buffer setup fails. Objects created before the failure are released.
    pub fn new(gpu: &mut Gpu<B>, clear_color: Color) -> Result<Self, RenderError> {
        Self::with_vertices(gpu, &TRIANGLE, clear_color)
    }

    /// Create a renderer drawing `vertices` as a triangle list.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_vertices(
        gpu: &mut Gpu<B>,
        vertices: &[Vertex],
        clear_color: Color,
    ) -> Result<Self, RenderError> {
        let program = shaders::compile_program(
            gpu,
            shaders::TRIANGLE_VERTEX_SRC,
            shaders::TRIANGLE_FRAGMENT_SRC,
        )?;

        let geometry = match Geometry::create(gpu, vertices) {
            Ok(geometry) => geometry,
            Err(e) => {
                program.delete(gpu);
                return Err(e);
            }
        };

        debug!(
            "renderer ready: program {0:?}, vertex array {1:?}, buffer {2:?}",
            program.handle(),
            geometry.vertex_array(),
            geometry.buffer()
        );

        Ok(Self {
            program,
            geometry,
            clear_color,
        })
    }

    /// The linked program.
    pub fn program(&self) -> &LinkedProgram<B> {
        &self.program
    }

    /// The uploaded geometry.
    pub fn geometry(&self) -> &Geometry<B> {
        &self.geometry
    }

    /// Map rendering onto a `width` × `height` pixel surface.
    ///
    /// # Errors
    ///
    /// [`RenderError::Driver`] if the error flag is set after the viewport
    /// update (subject to the error check policy).
    ///
    /// # Panics
    ///
    /// Panics if either dimension exceeds `i32::MAX`.
    pub fn resize(&self, gpu: &mut Gpu<B>, width: u32, height: u32) -> Result<(), RenderError> {
        gpu.backend().viewport(0, 0, gl_size(width), gl_size(height));
        gpu.check("viewport update")?;
        trace!("viewport set to {0}x{1}", width, height);
        Ok(())
    }

    /// Issue one frame: clear, then draw the triangle.
    ///
    /// # Errors
    ///
    /// [`RenderError::Driver`] if the error flag is set after the draw
    /// (subject to the error check policy).
    pub fn render(&self, gpu: &mut Gpu<B>) -> Result<(), RenderError> {
        let [r, g, b, a] = self.clear_color;
        gpu.backend().clear_color(r, g, b, a);
        gpu.backend().clear_color_buffer();

        self.program.bind(gpu);
        self.geometry.bind(gpu);
        gpu.backend()
            .draw_triangles(0, self.geometry.vertex_count());

        gpu.check("frame draw")
    }

    /// Release every GPU object owned by this renderer: the vertex array and
    /// buffer first, then the program.
    pub fn destroy(self, gpu: &mut Gpu<B>) {
        debug!("releasing renderer resources");
        self.geometry.delete(gpu);
        self.program.delete(gpu);
    }
}
