use std::fmt::Debug;
use crate::program::source::ShaderStage;

/// The slice of a GL-style graphics API that program construction needs.
///
/// Handles are plain copyable names, exactly like the integer object names a
/// GL context hands out. Ownership of those names is tracked by the guards in
/// [`crate::program`], not by the backend.
pub trait ShaderBackend {
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);
    fn is_shader(&self, shader: Self::Shader) -> bool;

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn is_program(&self, program: Self::Program) -> bool;

    /// Location of an active vertex input, or `None` if the linked program
    /// has no such attribute.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
}
