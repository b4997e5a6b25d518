//! Uniform value kinds and the storage-index record pointing at them.

use crate::core::math::{Matrix4, Vec3, Vec4};

/// Every scalar/vector/matrix/array kind a uniform may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum UniformKind {
    Bool,
    Int,
    UInt,
    Float,
    Double,
    IVec2,
    IVec3,
    IVec4,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    /// A run of `f32` scalars, laid out with std140 array stride (16 bytes
    /// per element regardless of the scalar's natural size).
    FloatArray,
    /// A run of `Vec3`s, each padded to 16 bytes per std140 array rules.
    Vec3Array,
    /// A run of `Vec4`s, naturally 16-byte aligned already.
    Vec4Array,
    /// A run of 4x4 matrices, each occupying 4 std140-aligned columns.
    Mat4Array,
}

impl UniformKind {
    /// Human-readable name, used in [`crate::core::error::RenderError::UniformKindMismatch`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Double => "double",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::FloatArray => "float[]",
            Self::Vec3Array => "vec3[]",
            Self::Vec4Array => "vec4[]",
            Self::Mat4Array => "mat4[]",
        }
    }

    /// `true` for the four array kinds, which occupy a storage range rather
    /// than a single slot.
    pub const fn is_array(self) -> bool {
        matches!(self, Self::FloatArray | Self::Vec3Array | Self::Vec4Array | Self::Mat4Array)
    }

    /// Base alignment in bytes under std140.
    pub const fn std140_align(self) -> usize {
        match self {
            Self::Bool | Self::Int | Self::UInt | Self::Float => 4,
            Self::Double => 8,
            Self::IVec2 | Self::Vec2 => 8,
            Self::IVec3 | Self::IVec4 | Self::Vec3 | Self::Vec4 => 16,
            Self::Mat2 => 16,
            Self::Mat3 => 16,
            Self::Mat4 => 16,
            // Every element of an array (or matrix column) is rounded up to
            // a 16-byte stride under std140.
            Self::FloatArray | Self::Vec3Array | Self::Vec4Array | Self::Mat4Array => 16,
        }
    }

    /// Size in bytes of one element under std140 (for arrays, the stride of
    /// a single array entry; for matrices, `4 * align` per column).
    ///
    /// `vec3`'s natural size is 12 bytes, not its 16-byte alignment — a
    /// trailing scalar field can still pack into the 4 bytes left over, the
    /// classic std140 `vec3` + scalar packing case.
    pub const fn std140_size(self) -> usize {
        match self {
            Self::Bool | Self::Int | Self::UInt | Self::Float => 4,
            Self::Double => 8,
            Self::IVec2 | Self::Vec2 => 8,
            Self::IVec3 | Self::Vec3 => 12,
            Self::IVec4 | Self::Vec4 => 16,
            Self::Mat2 => 16 * 2,
            Self::Mat3 => 16 * 3,
            Self::Mat4 => 16 * 4,
            // Array elements are always padded out to a 16-byte stride,
            // regardless of the element kind's unpadded natural size.
            Self::FloatArray | Self::Vec3Array | Self::Vec4Array => 16,
            Self::Mat4Array => 16 * 4,
        }
    }
}

/// A concrete uniform value, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    Vec2([f32; 2]),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Matrix4<f32>),
    FloatArray(Vec<f32>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
    Mat4Array(Vec<Matrix4<f32>>),
}

impl UniformValue {
    /// The kind this value reports itself as.
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Bool(_) => UniformKind::Bool,
            Self::Int(_) => UniformKind::Int,
            Self::UInt(_) => UniformKind::UInt,
            Self::Float(_) => UniformKind::Float,
            Self::Double(_) => UniformKind::Double,
            Self::IVec2(_) => UniformKind::IVec2,
            Self::IVec3(_) => UniformKind::IVec3,
            Self::IVec4(_) => UniformKind::IVec4,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat4(_) => UniformKind::Mat4,
            Self::FloatArray(_) => UniformKind::FloatArray,
            Self::Vec3Array(_) => UniformKind::Vec3Array,
            Self::Vec4Array(_) => UniformKind::Vec4Array,
            Self::Mat4Array(_) => UniformKind::Mat4Array,
        }
    }
}

/// Where a named uniform's data lives: its declared kind plus a storage
/// index into [`crate::uniform::container::UniformContainer`]'s per-kind
/// arena, and, for arrays, the element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformData {
    /// The uniform's declared kind; later writes must match it.
    pub kind: UniformKind,
    /// Index into the per-kind storage arena.
    pub storage_index: usize,
    /// Element count for array kinds; `None` for scalars/vectors/matrices.
    pub array_len: Option<usize>,
}
