//! GLSL shader sources and compilation helpers.
//!
//! Both shaders target GLSL 3.30 core (OpenGL 3.3).

use tracing::{error, trace};

use crate::{backend::Backend, error::RenderError, gpu::Gpu, types::ShaderStage};

/// Identity vertex shader.
///
/// Reads one `vec3` position from attribute location 0 and forwards it to
/// `gl_Position` unchanged.
pub const TRIANGLE_VERTEX_SRC: &str = r"#version 330 core

layout (location = 0) in vec3 a_position;

void main() {
    gl_Position = vec4(a_position, 1.0);
}
";

/// Solid-color fragment shader. Every fragment is `(1.0, 0.5, 0.2, 1.0)`.
pub const TRIANGLE_FRAGMENT_SRC: &str = r"#version 330 core

out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.5, 0.2, 1.0);
}
";

/// A shader object whose compile status check succeeded.
///
/// Only [`compile_shader`] creates these, so anything attached to a program
/// has compiled.
#[derive(Debug)]
pub struct CompiledShader<B: Backend> {
    handle: B::Shader,
    stage: ShaderStage,
}

impl<B: Backend> CompiledShader<B> {
    /// The driver's name for this shader.
    pub fn handle(&self) -> B::Shader {
        self.handle
    }

    /// Which stage this shader implements.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Release the shader object without linking it.
    pub fn delete(self, gpu: &mut Gpu<B>) {
        trace!("deleting {0} shader {1:?}", self.stage, self.handle);
        gpu.backend().delete_shader(self.handle);
    }
}

/// A program object whose link status check succeeded.
///
/// Only [`link_program`] creates these, so anything made current for a
/// draw has linked.
#[derive(Debug)]
pub struct LinkedProgram<B: Backend> {
    handle: B::Program,
}

impl<B: Backend> LinkedProgram<B> {
    /// The driver's name for this program.
    pub fn handle(&self) -> B::Program {
        self.handle
    }

    /// Make this program current.
    pub fn bind(&self, gpu: &mut Gpu<B>) {
        gpu.use_program(Some(self.handle));
    }

    /// Release the program object.
    pub fn delete(self, gpu: &mut Gpu<B>) {
        trace!("deleting program {0:?}", self.handle);
        gpu.forget_program(self.handle);
        gpu.backend().delete_program(self.handle);
    }
}

/// Compile a shader program from vertex and fragment source strings.
///
/// The compiled shader objects are detached and deleted after linking
/// (successful or not), so only the program needs to be cleaned up by the
/// caller.
///
/// # Errors
///
/// Returns [`RenderError::Compile`] or [`RenderError::Link`] carrying the
/// driver's info log if either stage fails to compile or the program fails
/// to link, and [`RenderError::Allocation`] if the driver cannot create the
/// objects. Nothing is leaked on any error path.
pub fn compile_program<B: Backend>(
    gpu: &mut Gpu<B>,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<LinkedProgram<B>, RenderError> {
    let vs = compile_shader(gpu, ShaderStage::Vertex, vertex_src)?;
    let fs = match compile_shader(gpu, ShaderStage::Fragment, fragment_src) {
        Ok(fs) => fs,
        Err(e) => {
            vs.delete(gpu);
            return Err(e);
        }
    };

    link_program(gpu, vs, fs)
}

/// Compile a single shader stage from source.
///
/// On failure the driver's info log is logged at error level, the shader
/// object is released, and the log is returned in the error.
///
/// # Errors
///
/// [`RenderError::Compile`] if the compile status check fails,
/// [`RenderError::Allocation`] if no shader object could be created.
pub fn compile_shader<B: Backend>(
    gpu: &mut Gpu<B>,
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledShader<B>, RenderError> {
    let backend = gpu.backend();
    let shader = backend
        .create_shader(stage)
        .map_err(RenderError::allocation("shader"))?;
    backend.shader_source(shader, source);
    backend.compile_shader(shader);

    if !backend.shader_compile_status(shader) {
        let log = backend.shader_info_log(shader);
        backend.delete_shader(shader);
        error!("GLSL {0} shader compilation error:\n{1}", stage, log);
        return Err(RenderError::Compile { stage, log });
    }

    trace!("compiled {0} shader {1:?}", stage, shader);
    Ok(CompiledShader {
        handle: shader,
        stage,
    })
}

/// Link a vertex and a fragment shader into a program.
///
/// Both shaders are consumed: they are detached and deleted once the link
/// status is known. On a failed link the program is deleted as well.
///
/// # Errors
///
/// [`RenderError::Link`] if the link status check fails,
/// [`RenderError::Allocation`] if no program object could be created.
pub fn link_program<B: Backend>(
    gpu: &mut Gpu<B>,
    vertex: CompiledShader<B>,
    fragment: CompiledShader<B>,
) -> Result<LinkedProgram<B>, RenderError> {
    let program = match gpu.backend().create_program() {
        Ok(program) => program,
        Err(reason) => {
            vertex.delete(gpu);
            fragment.delete(gpu);
            return Err(RenderError::Allocation {
                object: "program",
                reason,
            });
        }
    };

    let backend = gpu.backend();
    let (vs, fs) = (vertex.handle, fragment.handle);
    backend.attach_shader(program, vs);
    backend.attach_shader(program, fs);
    backend.link_program(program);

    let linked = backend.program_link_status(program);
    let log = if linked {
        None
    } else {
        Some(backend.program_info_log(program))
    };

    // Shaders can be detached and deleted once linking is done either way.
    backend.detach_shader(program, vs);
    backend.detach_shader(program, fs);
    backend.delete_shader(vs);
    backend.delete_shader(fs);

    if let Some(log) = log {
        backend.delete_program(program);
        error!("GLSL program link error:\n{0}", log);
        return Err(RenderError::Link { log });
    }

    trace!("linked program {0:?}", program);
    Ok(LinkedProgram { handle: program })
}
