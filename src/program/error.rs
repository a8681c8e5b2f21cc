use std::fmt;
use crate::program::source::ShaderStage;

/// Why a shader source could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The server answered with a non-2xx status code.
    Http(u16),
    /// The request never produced a response.
    Transport(String),
    /// Reading a local file failed.
    Io(String),
    /// The location has no `.vert`/`.frag` extension and no stage was given.
    UnknownStage,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "HTTP status {}", code),
            Self::Transport(msg) => write!(f, "request failed: {}", msg),
            Self::Io(msg) => write!(f, "io error: {}", msg),
            Self::UnknownStage => f.write_str("cannot infer shader stage from extension"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load shader source from {url}: {status}")]
pub struct SourceLoadError {
    pub url: String,
    pub status: LoadStatus,
}

/// Errors produced while turning shader sources into a linked program.
///
/// The `log` fields hold the backend's diagnostic text exactly as reported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },

    #[error(transparent)]
    SourceLoad(#[from] SourceLoadError),
}

impl BuildError {
    /// Diagnostic text of a compile or link failure.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::ShaderCompile { log, .. } | Self::ProgramLink { log } => Some(log),
            Self::SourceLoad(_) => None,
        }
    }
}
