use std::path::PathBuf;

const SHADERS_DIR: &str = "shaders";

/// Contains options for locating and fetching shader sources
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base directory for relative file locations.
    pub shader_dir: PathBuf,
    pub user_agent: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from(SHADERS_DIR),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
            system_proxy: true,
        }
    }
}
