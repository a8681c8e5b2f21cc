//! Source rewriting ahead of the naga GLSL frontend.
//!
//! naga only reads desktop GLSL 440+ and needs every stage input and output
//! to carry `layout(location = N)`. WebGL2 style shaders (`#version 300 es`,
//! precision statements, bare `in`/`out`) are rewritten into that dialect.
//! Every line keeps its number so naga's diagnostics still point at the
//! caller's text.

const ES_VERSION: &str = "300 es";
const DESKTOP_VERSION: &str = "#version 450 core";
const PRECISION_QUALIFIERS: [&str; 3] = ["highp", "mediump", "lowp"];
const INTERPOLATION_QUALIFIERS: [&str; 3] = ["flat", "smooth", "centroid"];

/// Text ready for naga, and whether the caller gave explicit locations.
///
/// Shaders without explicit locations link by variable name, like GLSL ES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedSource {
    pub text: String,
    pub explicit_locations: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    In,
    Out,
}

struct InterfaceDecl {
    direction: Direction,
    located: bool,
}

pub(crate) fn prepare(source: &str) -> Result<PreparedSource, String> {
    let mut lines: Vec<String> = source.lines().map(str::to_owned).collect();

    let es = match find_version(&lines) {
        Some((idx, version)) if version == ES_VERSION => {
            lines[idx] = DESKTOP_VERSION.to_owned();
            true
        }
        Some((idx, version)) if !is_supported_desktop(&version) => {
            return Err(format!(
                "error: 0:{}: unsupported GLSL version `{}`; expected `300 es` or 440 and above",
                idx + 1,
                version,
            ));
        }
        _ => false,
    };

    if es {
        for line in &mut lines {
            if line.trim_start().starts_with("precision ") {
                line.clear();
            } else {
                *line = strip_precision_qualifiers(line);
            }
        }
    }

    let mut depth = 0i32;
    let mut unlocated = Vec::new();
    let mut first_located = None;
    for (idx, line) in lines.iter().enumerate() {
        let code = line.split("//").next().unwrap_or_default();
        if depth == 0 {
            if let Some(decl) = interface_decl(code) {
                if decl.located {
                    first_located.get_or_insert(idx);
                } else {
                    unlocated.push((idx, decl.direction));
                }
            }
        }
        depth += code.matches('{').count() as i32 - code.matches('}').count() as i32;
    }

    if unlocated.is_empty() {
        return Ok(PreparedSource { text: rejoin(source, &lines), explicit_locations: true });
    }
    if first_located.is_some() {
        let (idx, _) = unlocated[0];
        return Err(format!(
            "error: 0:{}: `{}` has no layout(location); give every stage input and output a location, or none of them",
            idx + 1,
            lines[idx].trim(),
        ));
    }

    let (mut next_in, mut next_out) = (0u32, 0u32);
    for (idx, direction) in unlocated {
        let counter = match direction {
            Direction::In => &mut next_in,
            Direction::Out => &mut next_out,
        };
        lines[idx] = format!("layout(location = {}) {}", counter, lines[idx].trim_start());
        *counter += 1;
    }

    Ok(PreparedSource { text: rejoin(source, &lines), explicit_locations: false })
}

/// Index and value of the `#version` directive, if it is the first directive.
fn find_version(lines: &[String]) -> Option<(usize, String)> {
    let (idx, line) = lines
        .iter()
        .enumerate()
        .find(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })?;
    let version = line.trim().strip_prefix("#version")?;
    Some((idx, version.split_whitespace().collect::<Vec<_>>().join(" ")))
}

fn is_supported_desktop(version: &str) -> bool {
    let mut parts = version.split_whitespace();
    let number_ok = parts
        .next()
        .and_then(|n| n.parse::<u32>().ok())
        .is_some_and(|n| (440..=460).contains(&n));
    let profile_ok = matches!(parts.next(), None | Some("core"));
    number_ok && profile_ok && parts.next().is_none()
}

fn strip_precision_qualifiers(line: &str) -> String {
    let indent = &line[..line.len() - line.trim_start().len()];
    let kept: Vec<&str> = line
        .split_whitespace()
        .filter(|word| !PRECISION_QUALIFIERS.contains(word))
        .collect();
    if kept.len() == line.split_whitespace().count() {
        return line.to_owned();
    }
    format!("{}{}", indent, kept.join(" "))
}

/// Recognises a global `in`/`out` declaration of a single variable.
fn interface_decl(code: &str) -> Option<InterfaceDecl> {
    let decl = code.trim().strip_suffix(';')?.trim();
    let (layout, rest) = match decl.strip_prefix("layout") {
        Some(after) => {
            let close = after.find(')')?;
            (Some(&after[..close]), &after[close + 1..])
        }
        None => (None, decl),
    };

    let mut tokens = rest
        .split_whitespace()
        .skip_while(|token| INTERPOLATION_QUALIFIERS.contains(token));
    let direction = match tokens.next()? {
        "in" => Direction::In,
        "out" => Direction::Out,
        _ => return None,
    };
    let _ty = tokens.next()?;
    let name = tokens.next()?;
    if tokens.next().is_some() || !is_identifier(name) {
        return None;
    }

    Some(InterfaceDecl {
        direction,
        located: layout.is_some_and(|l| l.contains("location")),
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn rejoin(source: &str, lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if source.ends_with('\n') {
        text.push('\n');
    }
    text
}
