//! A small GLSL-source scanner used to recover declarations the backend's
//! link-time introspection alone can't give us: `#define` integer
//! constants (needed to resolve array sizes written as a macro rather than
//! a literal), struct layouts, and the uniform/block/in/out declarations
//! themselves.
//!
//! This is deliberately not a full GLSL parser — it line-scans for the
//! handful of declaration shapes the pipeline actually needs, matching the
//! scope of the original engine's shader-source scraping.

use crate::uniform::value::UniformKind;
use std::collections::HashMap;

/// A uniform declared outside of any block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUniform {
    /// Declared name.
    pub name: String,
    /// Resolved kind.
    pub kind: UniformKind,
    /// Resolved array length, if the declaration included `[N]`.
    pub array_len: Option<usize>,
}

/// A `uniform`/`buffer` block declaration (`layout(std140) uniform Name { .. }`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    /// Block type name, as referenced by [`crate::uniform::UniformBlock::name`].
    pub name: String,
    /// Fields declared inside the block, in order.
    pub fields: Vec<(String, UniformKind, Option<usize>)>,
    /// `true` for `buffer` (SSBO) blocks, `false` for `uniform` blocks.
    pub is_shader_storage: bool,
}

/// An `in`/`out` stage variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVarying {
    /// Declared name.
    pub name: String,
    /// GLSL type spelling, kept as a string since varyings (unlike
    /// uniforms) are never routed through [`UniformKind`].
    pub glsl_type: String,
}

/// Everything recovered from one shader stage's source.
#[derive(Debug, Clone, Default)]
pub struct ParsedShaderSource {
    /// Integer `#define` constants, used to resolve macro array sizes.
    pub defines: HashMap<String, i64>,
    /// Top-level uniform declarations.
    pub uniforms: Vec<ParsedUniform>,
    /// Uniform/shader-storage block declarations.
    pub blocks: Vec<ParsedBlock>,
    /// `in` stage variables.
    pub inputs: Vec<ParsedVarying>,
    /// `out` stage variables.
    pub outputs: Vec<ParsedVarying>,
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn glsl_type_to_kind(ty: &str) -> Option<UniformKind> {
    Some(match ty {
        "bool" => UniformKind::Bool,
        "int" => UniformKind::Int,
        "uint" => UniformKind::UInt,
        "float" => UniformKind::Float,
        "double" => UniformKind::Double,
        "ivec2" => UniformKind::IVec2,
        "ivec3" => UniformKind::IVec3,
        "ivec4" => UniformKind::IVec4,
        "vec2" => UniformKind::Vec2,
        "vec3" => UniformKind::Vec3,
        "vec4" => UniformKind::Vec4,
        "mat2" => UniformKind::Mat2,
        "mat3" => UniformKind::Mat3,
        "mat4" => UniformKind::Mat4,
        _ => return None,
    })
}

/// Parses `name[123]` or `name` into its base identifier and an optional
/// array length, resolving `[SOME_DEFINE]` against `defines`.
fn split_array_suffix(token: &str, defines: &HashMap<String, i64>) -> (String, Option<usize>) {
    if let Some(open) = token.find('[') {
        let name = token[..open].to_string();
        let inside = token[open + 1..].trim_end_matches(']').trim_end_matches(';').trim();
        let len = inside
            .parse::<usize>()
            .ok()
            .or_else(|| defines.get(inside).map(|v| *v as usize));
        (name, len)
    } else {
        (token.trim_end_matches(';').to_string(), None)
    }
}

/// Scans `source`, accumulating declarations into a fresh [`ParsedShaderSource`].
pub fn parse(source: &str) -> ParsedShaderSource {
    let mut result = ParsedShaderSource::default();
    let mut lines = source.lines().peekable();
    let mut pending_block: Option<(String, bool, Vec<(String, UniformKind, Option<usize>)>)> = None;

    while let Some(raw_line) = lines.next() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some((block_name, is_ssbo, mut fields)) = pending_block.take() {
            if line.starts_with('}') {
                result.blocks.push(ParsedBlock {
                    name: block_name,
                    fields,
                    is_shader_storage: is_ssbo,
                });
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() >= 2 {
                if let Some(kind) = glsl_type_to_kind(tokens[0]) {
                    let (name, array_len) = split_array_suffix(tokens[1], &result.defines);
                    fields.push((name, kind, array_len));
                }
            }
            pending_block = Some((block_name, is_ssbo, fields));
            continue;
        }

        if let Some(rest) = line.strip_prefix("#define ") {
            let mut parts = rest.split_whitespace();
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                if let Ok(parsed) = value.parse::<i64>() {
                    result.defines.insert(name.to_string(), parsed);
                }
            }
            continue;
        }

        let is_block_start = (line.contains("uniform") || line.contains("buffer")) && line.contains('{');
        if is_block_start {
            let is_ssbo = line.contains("buffer") && !line.contains("uniform");
            let keyword = if is_ssbo { "buffer" } else { "uniform" };
            if let Some(name) = line
                .split(keyword)
                .nth(1)
                .and_then(|rest| rest.split('{').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            {
                pending_block = Some((name, is_ssbo, Vec::new()));
                continue;
            }
        }

        if let Some(rest) = line.strip_prefix("uniform ") {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if tokens.len() >= 2 {
                if let Some(kind) = glsl_type_to_kind(tokens[0]) {
                    let (name, array_len) = split_array_suffix(tokens[1], &result.defines);
                    result.uniforms.push(ParsedUniform { name, kind, array_len });
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("in ") {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if tokens.len() >= 2 {
                let (name, _) = split_array_suffix(tokens[1], &result.defines);
                result.inputs.push(ParsedVarying { name, glsl_type: tokens[0].to_string() });
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("out ") {
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            if tokens.len() >= 2 {
                let (name, _) = split_array_suffix(tokens[1], &result.defines);
                result.outputs.push(ParsedVarying { name, glsl_type: tokens[0].to_string() });
            }
            continue;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_define_and_resolves_array_size() {
        let source = "#define NUM_LIGHTS 4\nuniform vec3 lightPositions[NUM_LIGHTS];\n";
        let parsed = parse(source);
        assert_eq!(parsed.defines.get("NUM_LIGHTS"), Some(&4));
        assert_eq!(parsed.uniforms.len(), 1);
        assert_eq!(parsed.uniforms[0].array_len, Some(4));
        assert_eq!(parsed.uniforms[0].kind, UniformKind::Vec3);
    }

    #[test]
    fn parses_uniform_block_fields() {
        let source = "layout(std140) uniform CameraBlock {\n    mat4 viewMatrix;\n    mat4 projMatrix;\n};\n";
        let parsed = parse(source);
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].name, "CameraBlock");
        assert_eq!(parsed.blocks[0].fields.len(), 2);
        assert_eq!(parsed.blocks[0].fields[0].0, "viewMatrix");
    }

    #[test]
    fn parses_in_out_varyings() {
        let source = "in vec3 aPosition;\nout vec4 vColor;\n";
        let parsed = parse(source);
        assert_eq!(parsed.inputs.len(), 1);
        assert_eq!(parsed.inputs[0].name, "aPosition");
        assert_eq!(parsed.outputs.len(), 1);
        assert_eq!(parsed.outputs[0].name, "vColor");
    }

    #[test]
    fn ignores_comments() {
        let source = "// uniform vec3 shouldNotAppear;\nuniform float realOne;\n";
        let parsed = parse(source);
        assert_eq!(parsed.uniforms.len(), 1);
        assert_eq!(parsed.uniforms[0].name, "realOne");
    }
}
