use color_eyre::Result;
use color_eyre::eyre::{eyre, OptionExt};
use naga::{
    front::glsl::{Frontend, Options},
    valid::{Capabilities, ValidationFlags, Validator},
    ShaderStage
};
use std::{env, fs, path::Path};

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=shaders");

    check_shaders()?;

    Ok(())
}

/// Parses and validates every GLSL stage shipped under `shaders/` so a broken
/// lesson shader fails the build instead of the first run.
fn check_shaders() -> Result<()> {
    let cargo_manifest_dir = env::var("CARGO_MANIFEST_DIR")?;
    let shaders_dir = Path::new(&cargo_manifest_dir).join("shaders");

    for entry in fs::read_dir(shaders_dir)? {
        let entry = entry?;
        let path = entry.path();

        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_eyre(format!("Shader file has no extension: {:?}", path))?;
        let shader_stage = match ext {
            "vert" => ShaderStage::Vertex,
            "frag" => ShaderStage::Fragment,
            _ => {
                log::warn!("Skipping non-GLSL file: {:?}", path);
                continue;
            }
        };

        // Read the GLSL file and parse into IR
        let source = fs::read_to_string(&path)?;
        let mut frontend = Frontend::default();
        let module = frontend
            .parse(&Options::from(shader_stage), &source)
            .map_err(|e| eyre!("{:?}:\n{}", path, e.emit_to_string(&source)))?;

        // Validate the IR
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        validator
            .validate(&module)
            .map_err(|e| eyre!("{:?}:\n{}", path, e.emit_to_string(&source)))?;
    }

    Ok(())
}
