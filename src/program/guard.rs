use std::fmt;
use std::mem;
use crate::program::backend::ShaderBackend;
use crate::program::source::ShaderStage;

/// A compiled stage. The backend object is deleted when this is dropped.
pub struct CompiledShader<'a, B: ShaderBackend + ?Sized> {
    raw: B::Shader,
    stage: ShaderStage,
    backend: &'a B,
}

/// A linked program owned by the caller. The backend object is deleted when
/// this is dropped unless it is handed off with [`LinkedProgram::into_raw`].
pub struct LinkedProgram<'a, B: ShaderBackend + ?Sized> {
    raw: B::Program,
    backend: &'a B,
}

impl<'a, B: ShaderBackend + ?Sized> CompiledShader<'a, B> {
    pub(crate) fn new(raw: B::Shader, stage: ShaderStage, backend: &'a B) -> Self {
        Self { raw, stage, backend }
    }

    pub fn raw(&self) -> B::Shader {
        self.raw
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<'a, B: ShaderBackend + ?Sized> LinkedProgram<'a, B> {
    pub(crate) fn new(raw: B::Program, backend: &'a B) -> Self {
        Self { raw, backend }
    }

    pub fn raw(&self) -> B::Program {
        self.raw
    }

    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        self.backend.attrib_location(self.raw, name)
    }

    /// Gives up ownership; the caller must delete the program itself.
    pub fn into_raw(self) -> B::Program {
        let raw = self.raw;
        mem::forget(self);
        raw
    }
}

impl<B: ShaderBackend + ?Sized> fmt::Debug for CompiledShader<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("raw", &self.raw)
            .field("stage", &self.stage)
            .finish()
    }
}

impl<B: ShaderBackend + ?Sized> fmt::Debug for LinkedProgram<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedProgram")
            .field("raw", &self.raw)
            .finish()
    }
}

impl<B: ShaderBackend + ?Sized> Drop for CompiledShader<'_, B> {
    fn drop(&mut self) {
        log::debug!("Deleting {} shader {:?}", self.stage, self.raw);
        self.backend.delete_shader(self.raw);
    }
}

impl<B: ShaderBackend + ?Sized> Drop for LinkedProgram<'_, B> {
    fn drop(&mut self) {
        log::debug!("Deleting program {:?}", self.raw);
        self.backend.delete_program(self.raw);
    }
}
