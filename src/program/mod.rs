pub mod backend;
pub mod error;
pub mod guard;
pub mod source;

pub use backend::ShaderBackend;
pub use error::{BuildError, LoadStatus, SourceLoadError};
pub use guard::{CompiledShader, LinkedProgram};
pub use source::{ShaderSource, ShaderStage};

pub const EMPTY_SOURCE_LOG: &str = "shader source is empty";

/// Compiles shader stages and links them into programs.
///
/// Every backend object created along the way is owned by a guard, so each
/// exit path (success, compile failure of either stage, link failure)
/// releases exactly the objects that are no longer needed. The only object
/// that outlives a successful [`ProgramBuilder::build`] is the returned
/// program.
pub struct ProgramBuilder<'a, B: ShaderBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: ShaderBackend + ?Sized> ProgramBuilder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn compile_stage(&self, source: ShaderSource) -> Result<CompiledShader<'a, B>, BuildError> {
        let stage = source.stage();
        if source.is_blank() {
            log::warn!("Refusing to compile empty {} shader", stage);
            return Err(BuildError::ShaderCompile {
                stage,
                log: EMPTY_SOURCE_LOG.to_owned(),
            });
        }

        let raw = self.backend
            .create_shader(stage)
            .map_err(|log| BuildError::ShaderCompile { stage, log })?;
        log::debug!("Created {} shader {:?}", stage, raw);
        let shader = CompiledShader::new(raw, stage, self.backend);

        self.backend.shader_source(raw, source.text());
        self.backend.compile_shader(raw);
        compile_or_fail(self.backend, &shader)?;

        Ok(shader)
    }

    /// Links two compiled stages. Both stage objects are released when this
    /// returns, whatever the outcome.
    pub fn link(
        &self,
        vertex: CompiledShader<'a, B>,
        fragment: CompiledShader<'a, B>,
    ) -> Result<LinkedProgram<'a, B>, BuildError> {
        if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
            return Err(BuildError::ProgramLink {
                log: format!(
                    "expected a vertex and a fragment shader, got {} and {}",
                    vertex.stage(),
                    fragment.stage(),
                ),
            });
        }

        let raw = self.backend
            .create_program()
            .map_err(|log| BuildError::ProgramLink { log })?;
        log::debug!("Created program {:?}", raw);
        let program = LinkedProgram::new(raw, self.backend);

        self.backend.attach_shader(raw, vertex.raw());
        self.backend.attach_shader(raw, fragment.raw());
        self.backend.link_program(raw);
        link_or_fail(self.backend, &program)?;

        Ok(program)
    }

    pub fn build(&self, vertex_source: &str, fragment_source: &str) -> Result<LinkedProgram<'a, B>, BuildError> {
        self.build_sources(
            ShaderSource::vertex(vertex_source),
            ShaderSource::fragment(fragment_source),
        )
    }

    /// Compiles the vertex stage, then the fragment stage, then links. The
    /// fragment stage is never compiled if the vertex stage fails.
    pub fn build_sources(
        &self,
        vertex: ShaderSource,
        fragment: ShaderSource,
    ) -> Result<LinkedProgram<'a, B>, BuildError> {
        let vertex = self.compile_stage(vertex)?;
        let fragment = self.compile_stage(fragment)?;
        self.link(vertex, fragment)
    }
}

fn compile_or_fail<B: ShaderBackend + ?Sized>(
    backend: &B,
    shader: &CompiledShader<'_, B>,
) -> Result<(), BuildError> {
    if backend.shader_compile_status(shader.raw()) {
        return Ok(());
    }

    let log = backend.shader_info_log(shader.raw());
    log::warn!("{} shader {:?} failed to compile:\n{}", shader.stage(), shader.raw(), log);
    Err(BuildError::ShaderCompile { stage: shader.stage(), log })
}

fn link_or_fail<B: ShaderBackend + ?Sized>(
    backend: &B,
    program: &LinkedProgram<'_, B>,
) -> Result<(), BuildError> {
    if backend.program_link_status(program.raw()) {
        return Ok(());
    }

    let log = backend.program_info_log(program.raw());
    log::warn!("Program {:?} failed to link:\n{}", program.raw(), log);
    Err(BuildError::ProgramLink { log })
}
