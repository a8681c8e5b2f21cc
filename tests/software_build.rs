use shaderlink::backend::SoftwareBackend;
use shaderlink::{BuildError, ProgramBuilder, ShaderBackend, ShaderStage};

const VERT: &str = "#version 450 core
layout(location = 0) in vec2 a_position;
layout(location = 0) out vec2 v_uv;
void main() {
    v_uv = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

const FRAG: &str = "#version 450 core
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = vec4(v_uv, 0.0, 1.0);
}
";

const BROKEN_VERT: &str = "#version 450 core
layout(location = 0) in vec2 a_position;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0)
}
";

const BROKEN_FRAG: &str = "#version 450 core
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = undeclared_color;
}
";

/// Compiles on its own but reads an input the vertex stage never writes.
const UNMATCHED_FRAG: &str = "#version 450 core
layout(location = 0) in vec2 v_uv;
layout(location = 1) in vec3 v_normal;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = vec4(v_normal * v_uv.x, 1.0);
}
";

#[test]
fn valid_pair_links_without_leaks() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let program = builder.build(VERT, FRAG).unwrap();

    assert!(backend.program_link_status(program.raw()));
    assert_eq!(program.attrib_location("a_position"), Some(0));
    assert_eq!(backend.live_shaders(), 0);
    assert_eq!(backend.live_programs(), 1);

    drop(program);
    assert_eq!(backend.live_programs(), 0);
}

#[test]
fn vertex_syntax_error_never_compiles_fragment() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let err = builder.build(BROKEN_VERT, FRAG).unwrap_err();

    match &err {
        BuildError::ShaderCompile { stage, log } => {
            assert_eq!(*stage, ShaderStage::Vertex);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let stats = backend.stats();
    assert_eq!(stats.vertex_compiles, 1);
    assert_eq!(stats.fragment_compiles, 0);
    assert_eq!(stats.shaders_created, 1);
    assert_eq!(stats.shaders_deleted, 1);
    assert_eq!(backend.live_shaders(), 0);
}

#[test]
fn fragment_error_releases_vertex() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let err = builder.build(VERT, BROKEN_FRAG).unwrap_err();

    assert!(matches!(err, BuildError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
    let stats = backend.stats();
    assert_eq!(stats.shaders_created, 2);
    assert_eq!(stats.shaders_deleted, 2);
    assert_eq!(stats.programs_created, 0);
    assert_eq!(backend.live_shaders(), 0);
}

#[test]
fn incompatible_pair_fails_to_link() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let err = builder.build(VERT, UNMATCHED_FRAG).unwrap_err();

    let BuildError::ProgramLink { log } = err else {
        panic!("expected a link error, got {err:?}");
    };
    assert!(log.contains("v_normal"), "{}", log);
    let stats = backend.stats();
    assert_eq!(stats.links, 1);
    assert_eq!(stats.shaders_deleted, 2);
    assert_eq!(stats.programs_deleted, 1);
    assert_eq!(backend.live_shaders(), 0);
    assert_eq!(backend.live_programs(), 0);
}

#[test]
fn mismatched_varying_type_fails_to_link() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let frag = FRAG
        .replace("in vec2 v_uv", "in vec3 v_uv")
        .replace("vec4(v_uv, 0.0, 1.0)", "vec4(v_uv, 1.0)");

    let err = builder.build(VERT, &frag).unwrap_err();

    let BuildError::ProgramLink { log } = err else {
        panic!("expected a link error, got {err:?}");
    };
    assert!(log.contains("type mismatch"), "{}", log);
}

#[test]
fn repeated_builds_are_independent() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let first = builder.build(VERT, FRAG).unwrap();
    let second = builder.build(VERT, FRAG).unwrap();
    assert_ne!(first.raw(), second.raw());
    assert_eq!(first.attrib_location("a_position"), second.attrib_location("a_position"));

    let first_raw = first.raw();
    drop(first);
    assert!(!backend.is_program(first_raw));
    assert!(backend.is_program(second.raw()));
    assert!(backend.program_link_status(second.raw()));
    assert_eq!(second.attrib_location("a_position"), Some(0));
}

#[test]
fn empty_source_is_rejected() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let err = builder.build(VERT, "").unwrap_err();

    assert!(matches!(err, BuildError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
    assert_eq!(backend.live_shaders(), 0);
}

#[test]
fn missing_entry_point_is_compile_error() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let err = builder
        .build("#version 450 core\nfloat helper() { return 1.0; }\n", FRAG)
        .unwrap_err();

    assert!(matches!(err, BuildError::ShaderCompile { stage: ShaderStage::Vertex, .. }));
    assert_eq!(backend.stats().fragment_compiles, 0);
}

const ES_VERT: &str = "#version 300 es
in vec2 a_position;
in vec3 a_color;
out vec3 v_color;
void main() {
    v_color = a_color;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

const ES_FRAG: &str = "#version 300 es
precision highp float;
in vec3 v_color;
out vec4 out_color;
void main() {
    out_color = vec4(v_color, 1.0);
}
";

#[test]
fn webgl2_pair_builds() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);

    let program = builder.build(ES_VERT, ES_FRAG).unwrap();

    assert_eq!(program.attrib_location("a_position"), Some(0));
    assert_eq!(program.attrib_location("a_color"), Some(1));
    assert_eq!(backend.live_shaders(), 0);
}

#[test]
fn desktop_pair_without_locations_builds() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let vert = ES_VERT.replace("#version 300 es", "#version 450 core");
    let frag = ES_FRAG
        .replace("#version 300 es", "#version 450 core")
        .replace("precision highp float;\n", "");

    let program = builder.build(&vert, &frag).unwrap();

    assert_eq!(program.attrib_location("a_color"), Some(1));
}

#[test]
fn unlocated_names_must_match() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let frag = ES_FRAG.replace("v_color", "v_colour");

    let err = builder.build(ES_VERT, &frag).unwrap_err();

    let BuildError::ProgramLink { log } = err else {
        panic!("expected a link error, got {err:?}");
    };
    assert!(log.contains("`v_colour`"), "{}", log);
    assert_eq!(backend.live_programs(), 0);
}

#[test]
fn partially_located_stage_names_the_declaration() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let vert = VERT.replace("layout(location = 0) out vec2 v_uv;", "out vec2 v_uv;");

    let err = builder.build(&vert, FRAG).unwrap_err();

    let BuildError::ShaderCompile { stage: ShaderStage::Vertex, log } = err else {
        panic!("expected a vertex compile error, got {err:?}");
    };
    assert!(log.contains("out vec2 v_uv;"), "{}", log);
    assert!(log.contains("layout(location)"), "{}", log);
}

#[test]
fn unsupported_version_is_compile_error() {
    let backend = SoftwareBackend::new();
    let builder = ProgramBuilder::new(&backend);
    let vert = VERT.replace("#version 450 core", "#version 330 core");

    let err = builder.build(&vert, FRAG).unwrap_err();

    let BuildError::ShaderCompile { stage: ShaderStage::Vertex, log } = err else {
        panic!("expected a vertex compile error, got {err:?}");
    };
    assert!(log.contains("unsupported GLSL version `330 core`"), "{}", log);
    assert_eq!(backend.stats().fragment_compiles, 0);
}
