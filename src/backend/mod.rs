mod glsl;
mod software;

pub use software::{BackendStats, ProgramId, ShaderId, SoftwareBackend};
