//! Test doubles: a recording GL backend and a scripted window.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    backend::Backend,
    frame::{Event, Window},
    types::ShaderStage,
};

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    UploadStatic { buffer: Option<u32>, bytes: Vec<u8> },
    DeleteBuffer(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
        buffer: Option<u32>,
        vertex_array: Option<u32>,
    },
    EnableVertexAttribArray { index: u32, vertex_array: Option<u32> },
    Viewport([i32; 4]),
    ClearColor([f32; 4]),
    Clear,
    DrawTriangles {
        first: i32,
        count: i32,
        program: Option<u32>,
        vertex_array: Option<u32>,
    },
}

/// Kind of object a `create_*` call allocates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Shader,
    Program,
    VertexArray,
    Buffer,
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

/// A software stand-in for a GL context.
///
/// Every call is appended to [`calls`](Self::calls). Object names come from
/// one counter starting at 1, so `0` never names anything. Misuse that a
/// real driver reports through `glGetError` (binding a deleted object,
/// drawing without a linked program, a negative viewport) sets the error
/// flag the same way.
#[derive(Debug)]
pub struct FakeBackend {
    pub calls: Vec<Call>,
    pub bound_vertex_array: Option<u32>,
    pub bound_array_buffer: Option<u32>,
    pub current_program: Option<u32>,
    pub viewport: [i32; 4],
    /// Deletes of names that were never created or were already deleted.
    pub invalid_deletes: Vec<u32>,
    next_name: u32,
    error: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    vertex_arrays: HashSet<u32>,
    buffers: HashSet<u32>,
    link_failure: Option<String>,
    viewport_failure: Option<u32>,
    create_failure: Option<ObjectKind>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            bound_vertex_array: None,
            bound_array_buffer: None,
            current_program: None,
            viewport: [0, 0, 0, 0],
            invalid_deletes: Vec::new(),
            next_name: 1,
            error: glow::NO_ERROR,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            vertex_arrays: HashSet::new(),
            buffers: HashSet::new(),
            link_failure: None,
            viewport_failure: None,
            create_failure: None,
        }
    }

    /// Make the next link fail with `log`, whatever the shaders.
    pub fn fail_next_link(&mut self, log: &str) {
        self.link_failure = Some(log.to_owned());
    }

    /// Make the next viewport update raise `code`.
    pub fn fail_next_viewport(&mut self, code: u32) {
        self.viewport_failure = Some(code);
    }

    /// Make the next `create_*` call for `kind` fail like an exhausted driver.
    pub fn fail_next_create(&mut self, kind: ObjectKind) {
        self.create_failure = Some(kind);
    }

    /// Set the error flag, keeping an earlier unread error like GL does.
    pub fn raise_error(&mut self, code: u32) {
        if self.error == glow::NO_ERROR {
            self.error = code;
        }
    }

    /// Number of shader, program, vertex array, and buffer objects alive.
    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len() + self.vertex_arrays.len() + self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_linked(&self, program: u32) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    /// All recorded draws.
    pub fn draws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawTriangles { .. }))
            .collect()
    }

    /// How many times `call` was recorded.
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn allocate(&mut self, kind: ObjectKind) -> Result<u32, String> {
        if self.create_failure == Some(kind) {
            self.create_failure = None;
            return Err(format!("out of memory allocating {kind:?}"));
        }
        Ok(self.name())
    }

    fn name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn note_delete(&mut self, live: bool, name: u32) {
        if !live {
            self.invalid_deletes.push(name);
        }
    }
}

/// Accepts sources that declare a version, define `main`, and have balanced
/// braces; reports the first problem otherwise.
fn validate_glsl(source: &str) -> Result<(), String> {
    if !source.trim_start().starts_with("#version") {
        return Err("0:1(1): error: missing #version directive".to_owned());
    }
    if !source.contains("void main") {
        return Err("0:1(1): error: function `main' is not defined".to_owned());
    }
    let opened = source.matches('{').count();
    let closed = source.matches('}').count();
    if opened != closed {
        let line = source.lines().count();
        return Err(format!(
            "0:{line}(1): error: syntax error, unexpected end of file"
        ));
    }
    Ok(())
}

impl Backend for FakeBackend {
    type Shader = u32;
    type Program = u32;
    type VertexArray = u32;
    type Buffer = u32;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, String> {
        let name = self.allocate(ObjectKind::Shader)?;
        self.shaders.insert(
            name,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        self.calls.push(Call::CreateShader(stage, name));
        Ok(name)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        self.calls.push(Call::ShaderSource(shader));
        match self.shaders.get_mut(&shader) {
            Some(s) => source.clone_into(&mut s.source),
            None => self.raise_error(glow::INVALID_VALUE),
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        self.calls.push(Call::CompileShader(shader));
        let Some(s) = self.shaders.get_mut(&shader) else {
            self.raise_error(glow::INVALID_VALUE);
            return;
        };
        match validate_glsl(&s.source) {
            Ok(()) => {
                s.compiled = true;
                s.log.clear();
            }
            Err(log) => {
                s.compiled = false;
                s.log = log;
            }
        }
    }

    fn shader_compile_status(&mut self, shader: u32) -> bool {
        self.shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&mut self, shader: u32) -> String {
        self.shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(Call::DeleteShader(shader));
        let live = self.shaders.remove(&shader).is_some();
        self.note_delete(live, shader);
    }

    fn create_program(&mut self) -> Result<u32, String> {
        let name = self.allocate(ObjectKind::Program)?;
        self.programs.insert(name, FakeProgram::default());
        self.calls.push(Call::CreateProgram(name));
        Ok(name)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.calls.push(Call::AttachShader { program, shader });
        let shader_live = self.shaders.contains_key(&shader);
        if let (Some(p), true) = (self.programs.get_mut(&program), shader_live) {
            p.attached.push(shader);
            return;
        }
        self.raise_error(glow::INVALID_VALUE);
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        self.calls.push(Call::DetachShader { program, shader });
        if let Some(p) = self.programs.get_mut(&program) {
            if p.attached.contains(&shader) {
                p.attached.retain(|&s| s != shader);
                return;
            }
        }
        self.raise_error(glow::INVALID_OPERATION);
    }

    fn link_program(&mut self, program: u32) {
        self.calls.push(Call::LinkProgram(program));
        let forced = self.link_failure.take();
        let Some(p) = self.programs.get(&program) else {
            self.raise_error(glow::INVALID_VALUE);
            return;
        };

        let compiled_stage = |stage| {
            p.attached.iter().any(|s| {
                self.shaders
                    .get(s)
                    .is_some_and(|s| s.stage == stage && s.compiled)
            })
        };
        let result = if let Some(log) = forced {
            Err(log)
        } else if !compiled_stage(ShaderStage::Vertex) {
            Err("error: no compiled vertex shader attached".to_owned())
        } else if !compiled_stage(ShaderStage::Fragment) {
            Err("error: no compiled fragment shader attached".to_owned())
        } else {
            Ok(())
        };

        if let Some(p) = self.programs.get_mut(&program) {
            match result {
                Ok(()) => {
                    p.linked = true;
                    p.log.clear();
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                }
            }
        }
    }

    fn program_link_status(&mut self, program: u32) -> bool {
        self.is_linked(program)
    }

    fn program_info_log(&mut self, program: u32) -> String {
        self.programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.calls.push(Call::UseProgram(program));
        match program {
            Some(p) if !self.is_linked(p) => self.raise_error(glow::INVALID_OPERATION),
            _ => self.current_program = program,
        }
    }

    fn delete_program(&mut self, program: u32) {
        self.calls.push(Call::DeleteProgram(program));
        let live = self.programs.remove(&program).is_some();
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.note_delete(live, program);
    }

    fn create_vertex_array(&mut self) -> Result<u32, String> {
        let name = self.allocate(ObjectKind::VertexArray)?;
        self.vertex_arrays.insert(name);
        self.calls.push(Call::CreateVertexArray(name));
        Ok(name)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<u32>) {
        self.calls.push(Call::BindVertexArray(vertex_array));
        match vertex_array {
            Some(v) if !self.vertex_arrays.contains(&v) => {
                self.raise_error(glow::INVALID_OPERATION);
            }
            _ => self.bound_vertex_array = vertex_array,
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.calls.push(Call::DeleteVertexArray(vertex_array));
        let live = self.vertex_arrays.remove(&vertex_array);
        if self.bound_vertex_array == Some(vertex_array) {
            self.bound_vertex_array = None;
        }
        self.note_delete(live, vertex_array);
    }

    fn create_buffer(&mut self) -> Result<u32, String> {
        let name = self.allocate(ObjectKind::Buffer)?;
        self.buffers.insert(name);
        self.calls.push(Call::CreateBuffer(name));
        Ok(name)
    }

    fn bind_array_buffer(&mut self, buffer: Option<u32>) {
        self.calls.push(Call::BindArrayBuffer(buffer));
        match buffer {
            Some(b) if !self.buffers.contains(&b) => self.raise_error(glow::INVALID_OPERATION),
            _ => self.bound_array_buffer = buffer,
        }
    }

    fn upload_static(&mut self, data: &[u8]) {
        self.calls.push(Call::UploadStatic {
            buffer: self.bound_array_buffer,
            bytes: data.to_vec(),
        });
        if self.bound_array_buffer.is_none() {
            self.raise_error(glow::INVALID_OPERATION);
        }
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.calls.push(Call::DeleteBuffer(buffer));
        let live = self.buffers.remove(&buffer);
        if self.bound_array_buffer == Some(buffer) {
            self.bound_array_buffer = None;
        }
        self.note_delete(live, buffer);
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, size: i32, stride: i32, offset: i32) {
        self.calls.push(Call::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
            buffer: self.bound_array_buffer,
            vertex_array: self.bound_vertex_array,
        });
        if self.bound_vertex_array.is_none() || self.bound_array_buffer.is_none() {
            self.raise_error(glow::INVALID_OPERATION);
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::EnableVertexAttribArray {
            index,
            vertex_array: self.bound_vertex_array,
        });
        if self.bound_vertex_array.is_none() {
            self.raise_error(glow::INVALID_OPERATION);
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(Call::Viewport([x, y, width, height]));
        if let Some(code) = self.viewport_failure.take() {
            self.raise_error(code);
        } else if width < 0 || height < 0 {
            self.raise_error(glow::INVALID_VALUE);
        } else {
            self.viewport = [x, y, width, height];
        }
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.calls.push(Call::ClearColor([red, green, blue, alpha]));
    }

    fn clear_color_buffer(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn draw_triangles(&mut self, first: i32, count: i32) {
        self.calls.push(Call::DrawTriangles {
            first,
            count,
            program: self.current_program,
            vertex_array: self.bound_vertex_array,
        });
        if self.current_program.is_none() || self.bound_vertex_array.is_none() {
            self.raise_error(glow::INVALID_OPERATION);
        }
    }

    fn get_error(&mut self) -> u32 {
        std::mem::replace(&mut self.error, glow::NO_ERROR)
    }
}

/// A window that replays one batch of events per frame.
///
/// [`poll_event`](Window::poll_event) drains the front batch; [`present`]
/// moves on to the next one. Once the script runs out, polls return
/// nothing.
///
/// [`present`]: Window::present
#[derive(Debug, Default)]
pub struct ScriptedWindow {
    batches: VecDeque<VecDeque<Event>>,
    pub presents: usize,
    pub active: bool,
    /// Make `set_active(true)` report failure.
    pub refuse_activation: bool,
}

impl ScriptedWindow {
    pub fn new<I, B>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = Event>,
    {
        Self {
            batches: batches
                .into_iter()
                .map(|batch| batch.into_iter().collect())
                .collect(),
            ..Self::default()
        }
    }
}

impl Window for ScriptedWindow {
    fn poll_event(&mut self) -> Option<Event> {
        self.batches.front_mut().and_then(VecDeque::pop_front)
    }

    fn present(&mut self) -> Result<(), crate::error::RenderError> {
        self.presents += 1;
        self.batches.pop_front();
        Ok(())
    }

    fn set_active(&mut self, active: bool) -> bool {
        if active && self.refuse_activation {
            return false;
        }
        self.active = active;
        true
    }
}

#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validator_accepts_well_formed_source() {
        assert!(validate_glsl("#version 330 core\nvoid main() {\n}\n").is_ok());
    }

    #[test]
    fn validator_rejects_unbalanced_braces() {
        let log = validate_glsl("#version 330 core\nvoid main() {\n").unwrap_err();
        assert!(log.contains("syntax error"), "{log}");
    }
}
