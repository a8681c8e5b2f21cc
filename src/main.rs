use color_eyre::Result;
use shaderlink::backend::SoftwareBackend;
use shaderlink::lessons::Lesson;
use shaderlink::{LoaderConfig, ProgramBuilder, SourceLoader};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let loader = SourceLoader::new(LoaderConfig::default());

    for lesson in Lesson::ALL {
        let prepared = lesson.prepare(&builder, &loader)?;
        log::info!(
            "{}: program {:?}, {:?} {} vertices from {} buffer(s)",
            lesson,
            prepared.program.raw(),
            prepared.draw.mode,
            prepared.draw.count,
            prepared.buffers.len(),
        );
        for attr in prepared.buffers.iter().flat_map(|b| &b.attributes) {
            log::debug!(
                "  {} -> location {} ({:?}, offset {}, stride {})",
                attr.name, attr.location, attr.format, attr.offset, attr.stride,
            );
        }
    }

    let stats = backend.stats();
    log::info!(
        "{} shaders and {} programs created, {} shaders and {} programs still alive",
        stats.shaders_created,
        stats.programs_created,
        backend.live_shaders(),
        backend.live_programs(),
    );

    Ok(())
}
