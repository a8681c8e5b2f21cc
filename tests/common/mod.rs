#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use shaderlink::{ShaderBackend, ShaderStage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
}

#[derive(Default)]
struct Inner {
    next: u32,
    calls: Vec<Call>,
    shaders: HashMap<u32, ShaderStage>,
    programs: Vec<u32>,
}

/// Backend whose compile and link outcomes are fixed up front, recording
/// every call it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    vertex_log: Option<String>,
    fragment_log: Option<String>,
    link_log: Option<String>,
    create_shader_error: Option<String>,
    create_program_error: Option<String>,
    inner: RefCell<Inner>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_compile(mut self, stage: ShaderStage, log: &str) -> Self {
        match stage {
            ShaderStage::Vertex => self.vertex_log = Some(log.to_owned()),
            ShaderStage::Fragment => self.fragment_log = Some(log.to_owned()),
        }
        self
    }

    pub fn fail_link(mut self, log: &str) -> Self {
        self.link_log = Some(log.to_owned());
        self
    }

    pub fn fail_create_shader(mut self, msg: &str) -> Self {
        self.create_shader_error = Some(msg.to_owned());
        self
    }

    pub fn fail_create_program(mut self, msg: &str) -> Self {
        self.create_program_error = Some(msg.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|&c| pred(c)).count()
    }

    pub fn created_shaders(&self, stage: ShaderStage) -> Vec<u32> {
        self.inner.borrow().calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateShader(s, id) if *s == stage => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn compiles(&self, stage: ShaderStage) -> usize {
        let ids = self.created_shaders(stage);
        self.count(|c| matches!(c, Call::CompileShader(id) if ids.contains(id)))
    }

    pub fn deletes_of_shader(&self, shader: u32) -> usize {
        self.count(|c| *c == Call::DeleteShader(shader))
    }

    pub fn deletes_of_program(&self, program: u32) -> usize {
        self.count(|c| *c == Call::DeleteProgram(program))
    }

    pub fn live_objects(&self) -> usize {
        let inner = self.inner.borrow();
        inner.shaders.len() + inner.programs.len()
    }

    fn record(&self, call: Call) {
        self.inner.borrow_mut().calls.push(call);
    }

    fn stage_of(&self, shader: u32) -> Option<ShaderStage> {
        self.inner.borrow().shaders.get(&shader).copied()
    }
}

impl ShaderBackend for ScriptedBackend {
    type Shader = u32;
    type Program = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        if let Some(msg) = &self.create_shader_error {
            return Err(msg.clone());
        }
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let id = inner.next;
        inner.shaders.insert(id, stage);
        inner.calls.push(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, _source: &str) {
        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        match self.stage_of(shader) {
            Some(ShaderStage::Vertex) => self.vertex_log.is_none(),
            Some(ShaderStage::Fragment) => self.fragment_log.is_none(),
            None => false,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let log = match self.stage_of(shader) {
            Some(ShaderStage::Vertex) => self.vertex_log.as_deref(),
            Some(ShaderStage::Fragment) => self.fragment_log.as_deref(),
            None => None,
        };
        log.unwrap_or_default().to_owned()
    }

    fn delete_shader(&self, shader: u32) {
        self.inner.borrow_mut().shaders.remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn is_shader(&self, shader: u32) -> bool {
        self.inner.borrow().shaders.contains_key(&shader)
    }

    fn create_program(&self) -> Result<u32, String> {
        if let Some(msg) = &self.create_program_error {
            return Err(msg.clone());
        }
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let id = inner.next;
        inner.programs.push(id);
        inner.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        self.link_log.is_none()
    }

    fn program_info_log(&self, _program: u32) -> String {
        self.link_log.clone().unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.inner.borrow_mut().programs.retain(|&p| p != program);
        self.record(Call::DeleteProgram(program));
    }

    fn is_program(&self, program: u32) -> bool {
        self.inner.borrow().programs.contains(&program)
    }

    fn attrib_location(&self, _program: u32, _name: &str) -> Option<u32> {
        None
    }
}
