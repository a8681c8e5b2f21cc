pub mod backend;
pub mod config;
pub mod layout;
pub mod lessons;
pub mod loader;
pub mod program;

pub use config::LoaderConfig;
pub use loader::SourceLoader;
pub use program::{BuildError, LinkedProgram, ProgramBuilder, ShaderBackend, ShaderSource, ShaderStage};
