//! Shader source parsing and linked-program management.

pub mod parser;
pub mod program;

pub use parser::{parse, ParsedBlock, ParsedShaderSource, ParsedUniform, ParsedVarying};
pub use program::{ShaderProgram, UniformIdMappings, UniformInfo};
