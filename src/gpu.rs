//! A [`Backend`] plus an explicit mirror of the GL binding state.

use std::fmt;

use crate::{backend::Backend, config::ErrorChecks, error::RenderError};

/// What is currently bound on the context.
///
/// OpenGL keeps this as hidden global state; [`Gpu`] records every bind it
/// issues here so callers can reason about (and tests can assert on)
/// binding transitions without querying the driver.
pub struct Bindings<B: Backend> {
    /// The bound vertex array object.
    pub vertex_array: Option<B::VertexArray>,
    /// The buffer bound to `GL_ARRAY_BUFFER`.
    pub array_buffer: Option<B::Buffer>,
    /// The program in use.
    pub program: Option<B::Program>,
}

impl<B: Backend> Bindings<B> {
    /// `true` when no vertex array and no array buffer are bound.
    #[must_use]
    pub fn geometry_unbound(&self) -> bool {
        self.vertex_array.is_none() && self.array_buffer.is_none()
    }
}

impl<B: Backend> Default for Bindings<B> {
    fn default() -> Self {
        Self {
            vertex_array: None,
            array_buffer: None,
            program: None,
        }
    }
}

impl<B: Backend> fmt::Debug for Bindings<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("vertex_array", &self.vertex_array)
            .field("array_buffer", &self.array_buffer)
            .field("program", &self.program)
            .finish()
    }
}

/// The rendering thread's handle on the graphics context.
///
/// All bind calls go through here so [`bindings`](Self::bindings) always
/// matches what the driver holds. Everything else is reached through
/// [`backend`](Self::backend).
pub struct Gpu<B: Backend> {
    backend: B,
    bindings: Bindings<B>,
    error_checks: ErrorChecks,
}

impl<B: Backend> Gpu<B> {
    /// Wrap a backend whose context has nothing bound yet.
    pub fn new(backend: B, error_checks: ErrorChecks) -> Self {
        Self {
            backend,
            bindings: Bindings::default(),
            error_checks,
        }
    }

    /// Raw access for calls that do not touch binding state.
    pub fn backend(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The current bindings.
    pub fn bindings(&self) -> &Bindings<B> {
        &self.bindings
    }

    /// Consume the wrapper and return the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Bind a vertex array object, or unbind with `None`.
    pub fn bind_vertex_array(&mut self, vertex_array: Option<B::VertexArray>) {
        self.backend.bind_vertex_array(vertex_array);
        self.bindings.vertex_array = vertex_array;
    }

    /// Bind an array buffer, or unbind with `None`.
    pub fn bind_array_buffer(&mut self, buffer: Option<B::Buffer>) {
        self.backend.bind_array_buffer(buffer);
        self.bindings.array_buffer = buffer;
    }

    /// Make a program current, or clear with `None`.
    pub fn use_program(&mut self, program: Option<B::Program>) {
        self.backend.use_program(program);
        self.bindings.program = program;
    }

    /// Forget about a deleted vertex array. GL unbinds a bound object on
    /// deletion, so the mirror must too.
    pub(crate) fn forget_vertex_array(&mut self, vertex_array: B::VertexArray) {
        if self.bindings.vertex_array == Some(vertex_array) {
            self.bindings.vertex_array = None;
        }
    }

    /// See [`forget_vertex_array`](Self::forget_vertex_array).
    pub(crate) fn forget_buffer(&mut self, buffer: B::Buffer) {
        if self.bindings.array_buffer == Some(buffer) {
            self.bindings.array_buffer = None;
        }
    }

    /// See [`forget_vertex_array`](Self::forget_vertex_array). A current
    /// program is only flagged for deletion by GL, but it must not be used
    /// again either way.
    pub(crate) fn forget_program(&mut self, program: B::Program) {
        if self.bindings.program == Some(program) {
            self.bindings.program = None;
        }
    }

    /// Read the GL error flag after `operation`, honoring the error check
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Driver`] if the flag was set.
    pub fn check(&mut self, operation: &'static str) -> Result<(), RenderError> {
        if !self.error_checks.enabled() {
            return Ok(());
        }

        let code = self.backend.get_error();
        if code == glow::NO_ERROR {
            return Ok(());
        }

        tracing::error!("GL error 0x{0:04X} after {1}", code, operation);
        Err(RenderError::Driver { operation, code })
    }
}
