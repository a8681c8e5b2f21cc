use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use reqwest::blocking::Client;
use crate::config::LoaderConfig;
use crate::program::{
    BuildError, LinkedProgram, LoadStatus, ProgramBuilder, ShaderBackend, ShaderSource,
    ShaderStage, SourceLoadError,
};

/// Fetches shader text from `http(s)://` URLs or from files.
///
/// Each location is requested exactly once; failures are not retried and no
/// timeout is applied.
pub struct SourceLoader {
    config: LoaderConfig,
}

impl SourceLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn load(&self, location: &str, stage: ShaderStage) -> Result<ShaderSource, SourceLoadError> {
        let text = if is_url(location) {
            self.fetch(location)?
        } else {
            self.read_file(location)?
        };
        log::debug!("Loaded {} shader from {} ({} bytes)", stage, location, text.len());
        Ok(ShaderSource::new(stage, text))
    }

    /// Like [`SourceLoader::load`], taking the stage from a `.vert` or `.frag`
    /// extension.
    pub fn load_inferred(&self, location: &str) -> Result<ShaderSource, SourceLoadError> {
        let stage = infer_stage(location).ok_or_else(|| SourceLoadError {
            url: location.to_owned(),
            status: LoadStatus::UnknownStage,
        })?;
        self.load(location, stage)
    }

    /// Loads both stages, vertex first, then builds the program. A failed
    /// fetch stops before anything is compiled.
    pub fn load_and_build<'a, B: ShaderBackend + ?Sized>(
        &self,
        builder: &ProgramBuilder<'a, B>,
        vertex_location: &str,
        fragment_location: &str,
    ) -> Result<LinkedProgram<'a, B>, BuildError> {
        let vertex = self.load(vertex_location, ShaderStage::Vertex)?;
        let fragment = self.load(fragment_location, ShaderStage::Fragment)?;
        builder.build_sources(vertex, fragment)
    }

    pub fn resolve_path(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.shader_dir.join(path)
        }
    }

    fn read_file(&self, location: &str) -> Result<String, SourceLoadError> {
        let path = self.resolve_path(location);
        fs::read_to_string(&path).map_err(|e| SourceLoadError {
            url: path.display().to_string(),
            status: LoadStatus::Io(e.to_string()),
        })
    }

    fn fetch(&self, url: &str) -> Result<String, SourceLoadError> {
        let fail = |status| SourceLoadError { url: url.to_owned(), status };
        let transport = |e: reqwest::Error| fail(LoadStatus::Transport(e.to_string()));

        let mut builder = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(None::<Duration>);
        if !self.config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(transport)?;

        let response = client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("GET {} returned {}", url, status);
            return Err(fail(LoadStatus::Http(status.as_u16())));
        }

        response.text().map_err(transport)
    }
}

/// URL schemes are case-insensitive.
fn is_url(location: &str) -> bool {
    let has_scheme = |scheme: &str| {
        location
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    };
    has_scheme("http://") || has_scheme("https://")
}

fn infer_stage(location: &str) -> Option<ShaderStage> {
    // Ignore any query string or fragment on a URL
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    ShaderStage::from_path(Path::new(path))
}
