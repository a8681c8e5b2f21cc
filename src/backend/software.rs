use std::cell::RefCell;
use std::collections::HashMap;
use naga::front::glsl::{Frontend, Options};
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Module, Scalar, ScalarKind, Type, TypeInner};
use smallvec::SmallVec;
use crate::backend::glsl;
use crate::program::{ShaderBackend, ShaderStage, EMPTY_SOURCE_LOG};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderId(u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(u32);

/// Running totals of the calls a [`SoftwareBackend`] has served
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BackendStats {
    pub shaders_created: usize,
    pub shaders_deleted: usize,
    pub programs_created: usize,
    pub programs_deleted: usize,
    pub vertex_compiles: usize,
    pub fragment_compiles: usize,
    pub links: usize,
}

struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: String,
    module: Option<Module>,
    explicit_locations: bool,
}

struct ProgramObject {
    attached: SmallVec<[ShaderId; 2]>,
    linked: bool,
    info_log: String,
    attributes: Vec<(String, u32)>,
}

#[derive(Default)]
struct State {
    next_name: u32,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    stats: BackendStats,
}

impl State {
    /// Shaders and programs share one namespace, starting at 1 like GL.
    fn gen_name(&mut self) -> Result<u32, String> {
        self.next_name = self.next_name
            .checked_add(1)
            .ok_or_else(|| "error: out of object names".to_owned())?;
        Ok(self.next_name)
    }
}

/// A GL-like context that compiles GLSL on the CPU.
///
/// Compilation runs the naga GLSL frontend and validator. GLSL ES 3.00 and
/// shaders without `layout(location)` are rewritten first, see
/// [`glsl::prepare`]. Linking matches the vertex outputs against the fragment
/// inputs by location when both stages declare locations, by name otherwise,
/// and always by type. Nothing
/// is ever rasterized; the point is real diagnostics and observable object
/// lifetimes.
#[derive(Default)]
pub struct SoftwareBackend {
    state: RefCell<State>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> BackendStats {
        self.state.borrow().stats
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }
}

impl ShaderBackend for SoftwareBackend {
    type Shader = ShaderId;
    type Program = ProgramId;

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let mut state = self.state.borrow_mut();
        let id = ShaderId(state.gen_name()?);
        state.shaders.insert(id, ShaderObject {
            stage,
            source: String::new(),
            compiled: false,
            info_log: String::new(),
            module: None,
            explicit_locations: true,
        });
        state.stats.shaders_created += 1;
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        match self.state.borrow_mut().shaders.get_mut(&shader) {
            Some(object) => object.source = source.to_owned(),
            None => log::warn!("shader_source on unknown shader {:?}", shader),
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        let State { shaders, stats, .. } = &mut *state;
        let Some(object) = shaders.get_mut(&shader) else {
            log::warn!("compile_shader on unknown shader {:?}", shader);
            return;
        };

        match object.stage {
            ShaderStage::Vertex => stats.vertex_compiles += 1,
            ShaderStage::Fragment => stats.fragment_compiles += 1,
        }

        match compile_glsl(object.stage, &object.source) {
            Ok((module, explicit_locations)) => {
                object.compiled = true;
                object.info_log.clear();
                object.module = Some(module);
                object.explicit_locations = explicit_locations;
            }
            Err(log) => {
                object.compiled = false;
                object.info_log = log;
                object.module = None;
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state.borrow().shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_some() {
            state.stats.shaders_deleted += 1;
        } else {
            log::warn!("delete_shader on unknown shader {:?}", shader);
        }
    }

    fn is_shader(&self, shader: ShaderId) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.gen_name()?);
        state.programs.insert(id, ProgramObject {
            attached: SmallVec::new(),
            linked: false,
            info_log: String::new(),
            attributes: Vec::new(),
        });
        state.stats.programs_created += 1;
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            log::warn!("attach_shader with unknown shader {:?}", shader);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(object) if !object.attached.contains(&shader) => object.attached.push(shader),
            Some(_) => log::warn!("Shader {:?} is already attached to {:?}", shader, program),
            None => log::warn!("attach_shader on unknown program {:?}", program),
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        let State { shaders, programs, stats, .. } = &mut *state;
        let Some(object) = programs.get_mut(&program) else {
            log::warn!("link_program on unknown program {:?}", program);
            return;
        };
        stats.links += 1;

        match link_stages(shaders, &object.attached) {
            Ok(attributes) => {
                object.linked = true;
                object.info_log.clear();
                object.attributes = attributes;
            }
            Err(log) => {
                object.linked = false;
                object.info_log = log;
                object.attributes.clear();
            }
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state.borrow().programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() {
            state.stats.programs_deleted += 1;
        } else {
            log::warn!("delete_program on unknown program {:?}", program);
        }
    }

    fn is_program(&self, program: ProgramId) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let object = state.programs.get(&program).filter(|p| p.linked)?;
        object.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|&(_, location)| location)
    }
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Returns the validated module and whether the source declared its own
/// interface locations.
fn compile_glsl(stage: ShaderStage, source: &str) -> Result<(Module, bool), String> {
    if source.trim().is_empty() {
        return Err(format!("error: {}", EMPTY_SOURCE_LOG));
    }

    let prepared = glsl::prepare(source)?;
    let source = prepared.text.as_str();

    let shader_stage = naga_stage(stage);
    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(shader_stage), source)
        .map_err(|e| e.emit_to_string(source))?;

    if !module.entry_points.iter().any(|ep| ep.stage == shader_stage) {
        return Err(format!("error: {} shader has no `main` entry point", stage));
    }

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    Ok((module, prepared.explicit_locations))
}

/// A user-defined value passed between stages, or a vertex input
struct Varying {
    name: String,
    location: u32,
    ty: String,
}

/// Checks the attached stages against each other and returns the vertex
/// inputs as `(name, location)` pairs.
fn link_stages(
    shaders: &HashMap<ShaderId, ShaderObject>,
    attached: &[ShaderId],
) -> Result<Vec<(String, u32)>, String> {
    let mut vertex = None;
    let mut fragment = None;
    for id in attached {
        let object = shaders
            .get(id)
            .ok_or_else(|| format!("error: attached shader {} no longer exists", id.0))?;
        let module = object.module
            .as_ref()
            .ok_or_else(|| format!("error: {} shader {} is not compiled", object.stage, id.0))?;
        let slot = match object.stage {
            ShaderStage::Vertex => &mut vertex,
            ShaderStage::Fragment => &mut fragment,
        };
        if slot.replace((module, object.explicit_locations)).is_some() {
            return Err(format!("error: more than one {} shader attached", object.stage));
        }
    }
    let (vertex, vertex_located) = vertex.ok_or_else(|| "error: no vertex shader attached".to_owned())?;
    let (fragment, fragment_located) = fragment.ok_or_else(|| "error: no fragment shader attached".to_owned())?;
    let by_location = vertex_located && fragment_located;

    let outputs = entry_varyings(vertex, naga::ShaderStage::Vertex, Direction::Out);
    let inputs = entry_varyings(fragment, naga::ShaderStage::Fragment, Direction::In);

    let mut errors = Vec::new();
    for input in &inputs {
        let written = if by_location {
            outputs.iter().find(|out| out.location == input.location)
        } else {
            outputs.iter().find(|out| out.name == input.name)
        };
        match written {
            None if by_location => errors.push(format!(
                "error: fragment input `{}` (location {}) is not written by the vertex shader",
                input.name, input.location,
            )),
            None => errors.push(format!(
                "error: fragment input `{}` has no vertex output of the same name",
                input.name,
            )),
            Some(output) if output.ty != input.ty => errors.push(format!(
                "error: type mismatch for `{}`: vertex writes {} `{}`, fragment reads {} `{}`",
                input.name, output.ty, output.name, input.ty, input.name,
            )),
            Some(_) => {}
        }
    }
    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    let mut attributes: Vec<_> = entry_varyings(vertex, naga::ShaderStage::Vertex, Direction::In)
        .into_iter()
        .map(|attr| (attr.name, attr.location))
        .collect();
    attributes.sort_by_key(|&(_, location)| location);
    Ok(attributes)
}

enum Direction {
    In,
    Out,
}

fn entry_varyings(module: &Module, stage: naga::ShaderStage, direction: Direction) -> Vec<Varying> {
    let mut varyings = Vec::new();
    let Some(entry) = module.entry_points.iter().find(|ep| ep.stage == stage) else {
        return varyings;
    };

    match direction {
        Direction::In => {
            for arg in &entry.function.arguments {
                collect_varyings(module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut varyings);
            }
        }
        Direction::Out => {
            if let Some(result) = &entry.function.result {
                collect_varyings(module, None, result.ty, result.binding.as_ref(), &mut varyings);
            }
        }
    }
    varyings
}

fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or("<unnamed>").to_owned(),
            location: *location,
            ty: type_name(module, ty),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.name.as_deref(), member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// GLSL spelling of an interface type, used for matching and in link logs.
fn type_name(module: &Module, ty: Handle<Type>) -> String {
    let inner = &module.types[ty].inner;
    match *inner {
        TypeInner::Scalar(scalar) => scalar_name(scalar).to_owned(),
        TypeInner::Vector { size, scalar } => format!("{}vec{}", vector_prefix(scalar), size as u8),
        TypeInner::Matrix { columns, rows, .. } => format!("mat{}x{}", columns as u8, rows as u8),
        _ => format!("{:?}", inner),
    }
}

fn scalar_name(scalar: Scalar) -> &'static str {
    match (scalar.kind, scalar.width) {
        (ScalarKind::Float, 8) => "double",
        (ScalarKind::Float, _) => "float",
        (ScalarKind::Sint, _) => "int",
        (ScalarKind::Uint, _) => "uint",
        (ScalarKind::Bool, _) => "bool",
        _ => "scalar",
    }
}

fn vector_prefix(scalar: Scalar) -> &'static str {
    match (scalar.kind, scalar.width) {
        (ScalarKind::Float, 8) => "d",
        (ScalarKind::Sint, _) => "i",
        (ScalarKind::Uint, _) => "u",
        (ScalarKind::Bool, _) => "b",
        _ => "",
    }
}
