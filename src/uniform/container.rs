//! Per-type typed arenas backing every uniform value in a program or
//! per-instance override set.
//!
//! Storage indices are stable: once a value is pushed it never moves, even
//! as later pushes grow other arenas, so a [`super::value::UniformData`]
//! recorded once remains valid until the whole container is dropped.

use crate::core::math::{Matrix4, Vec3, Vec4};
use crate::core::error::{RenderError, RenderResult};
use crate::uniform::value::{UniformKind, UniformValue};

/// Stable, append-only, per-kind typed storage for uniform values.
#[derive(Debug, Default)]
pub struct UniformContainer {
    bools: Vec<bool>,
    ints: Vec<i32>,
    uints: Vec<u32>,
    floats: Vec<f32>,
    doubles: Vec<f64>,
    ivec2s: Vec<[i32; 2]>,
    ivec3s: Vec<[i32; 3]>,
    ivec4s: Vec<[i32; 4]>,
    vec2s: Vec<[f32; 2]>,
    vec3s: Vec<Vec3>,
    vec4s: Vec<Vec4>,
    mat4s: Vec<Matrix4<f32>>,
    float_arrays: Vec<Vec<f32>>,
    vec3_arrays: Vec<Vec<Vec3>>,
    vec4_arrays: Vec<Vec<Vec4>>,
    mat4_arrays: Vec<Vec<Matrix4<f32>>>,
}

impl UniformContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the arena for its kind and returns the storage
    /// index it was placed at.
    pub fn push(&mut self, value: UniformValue) -> usize {
        match value {
            UniformValue::Bool(v) => push(&mut self.bools, v),
            UniformValue::Int(v) => push(&mut self.ints, v),
            UniformValue::UInt(v) => push(&mut self.uints, v),
            UniformValue::Float(v) => push(&mut self.floats, v),
            UniformValue::Double(v) => push(&mut self.doubles, v),
            UniformValue::IVec2(v) => push(&mut self.ivec2s, v),
            UniformValue::IVec3(v) => push(&mut self.ivec3s, v),
            UniformValue::IVec4(v) => push(&mut self.ivec4s, v),
            UniformValue::Vec2(v) => push(&mut self.vec2s, v),
            UniformValue::Vec3(v) => push(&mut self.vec3s, v),
            UniformValue::Vec4(v) => push(&mut self.vec4s, v),
            UniformValue::Mat4(v) => push(&mut self.mat4s, v),
            UniformValue::FloatArray(v) => push(&mut self.float_arrays, v),
            UniformValue::Vec3Array(v) => push(&mut self.vec3_arrays, v),
            UniformValue::Vec4Array(v) => push(&mut self.vec4_arrays, v),
            UniformValue::Mat4Array(v) => push(&mut self.mat4_arrays, v),
        }
    }

    /// Reads the value at `storage_index` for `kind`, or an error if `kind`
    /// doesn't match what's actually stored there (a caller bug, since
    /// `kind` should always come from the same [`super::value::UniformData`]
    /// that produced the index).
    pub fn get(&self, kind: UniformKind, storage_index: usize) -> RenderResult<UniformValue> {
        let missing = || RenderError::invariant(format!("no {} value at storage index {storage_index}", kind.name()));
        Ok(match kind {
            UniformKind::Bool => UniformValue::Bool(*self.bools.get(storage_index).ok_or_else(missing)?),
            UniformKind::Int => UniformValue::Int(*self.ints.get(storage_index).ok_or_else(missing)?),
            UniformKind::UInt => UniformValue::UInt(*self.uints.get(storage_index).ok_or_else(missing)?),
            UniformKind::Float => UniformValue::Float(*self.floats.get(storage_index).ok_or_else(missing)?),
            UniformKind::Double => UniformValue::Double(*self.doubles.get(storage_index).ok_or_else(missing)?),
            UniformKind::IVec2 => UniformValue::IVec2(*self.ivec2s.get(storage_index).ok_or_else(missing)?),
            UniformKind::IVec3 => UniformValue::IVec3(*self.ivec3s.get(storage_index).ok_or_else(missing)?),
            UniformKind::IVec4 => UniformValue::IVec4(*self.ivec4s.get(storage_index).ok_or_else(missing)?),
            UniformKind::Vec2 => UniformValue::Vec2(*self.vec2s.get(storage_index).ok_or_else(missing)?),
            UniformKind::Vec3 => UniformValue::Vec3(*self.vec3s.get(storage_index).ok_or_else(missing)?),
            UniformKind::Vec4 => UniformValue::Vec4(*self.vec4s.get(storage_index).ok_or_else(missing)?),
            UniformKind::Mat2 | UniformKind::Mat3 | UniformKind::Mat4 => {
                UniformValue::Mat4(*self.mat4s.get(storage_index).ok_or_else(missing)?)
            }
            UniformKind::FloatArray => UniformValue::FloatArray(self.float_arrays.get(storage_index).ok_or_else(missing)?.clone()),
            UniformKind::Vec3Array => UniformValue::Vec3Array(self.vec3_arrays.get(storage_index).ok_or_else(missing)?.clone()),
            UniformKind::Vec4Array => UniformValue::Vec4Array(self.vec4_arrays.get(storage_index).ok_or_else(missing)?.clone()),
            UniformKind::Mat4Array => UniformValue::Mat4Array(self.mat4_arrays.get(storage_index).ok_or_else(missing)?.clone()),
        })
    }

    /// Overwrites the value at `storage_index`, whose kind must already
    /// match `value`'s kind.
    pub fn set(&mut self, storage_index: usize, value: UniformValue) -> RenderResult<()> {
        macro_rules! write_slot {
            ($arena:expr, $v:expr) => {{
                let slot = $arena
                    .get_mut(storage_index)
                    .ok_or_else(|| RenderError::invariant("uniform storage index out of range on set"))?;
                *slot = $v;
                Ok(())
            }};
        }
        match value {
            UniformValue::Bool(v) => write_slot!(self.bools, v),
            UniformValue::Int(v) => write_slot!(self.ints, v),
            UniformValue::UInt(v) => write_slot!(self.uints, v),
            UniformValue::Float(v) => write_slot!(self.floats, v),
            UniformValue::Double(v) => write_slot!(self.doubles, v),
            UniformValue::IVec2(v) => write_slot!(self.ivec2s, v),
            UniformValue::IVec3(v) => write_slot!(self.ivec3s, v),
            UniformValue::IVec4(v) => write_slot!(self.ivec4s, v),
            UniformValue::Vec2(v) => write_slot!(self.vec2s, v),
            UniformValue::Vec3(v) => write_slot!(self.vec3s, v),
            UniformValue::Vec4(v) => write_slot!(self.vec4s, v),
            UniformValue::Mat4(v) => write_slot!(self.mat4s, v),
            UniformValue::FloatArray(v) => write_slot!(self.float_arrays, v),
            UniformValue::Vec3Array(v) => write_slot!(self.vec3_arrays, v),
            UniformValue::Vec4Array(v) => write_slot!(self.vec4_arrays, v),
            UniformValue::Mat4Array(v) => write_slot!(self.mat4_arrays, v),
        }
    }

    /// Grows the arena for `kind` to hold at least `n` values,
    /// zero/default-initializing any new slots. Arenas never shrink: if the
    /// arena already holds `n` or more values this is a no-op.
    pub fn ensure_size(&mut self, kind: UniformKind, n: usize) {
        macro_rules! grow {
            ($arena:expr, $default:expr) => {
                if $arena.len() < n {
                    $arena.resize(n, $default);
                }
            };
        }
        match kind {
            UniformKind::Bool => grow!(self.bools, false),
            UniformKind::Int => grow!(self.ints, 0),
            UniformKind::UInt => grow!(self.uints, 0),
            UniformKind::Float => grow!(self.floats, 0.0),
            UniformKind::Double => grow!(self.doubles, 0.0),
            UniformKind::IVec2 => grow!(self.ivec2s, [0; 2]),
            UniformKind::IVec3 => grow!(self.ivec3s, [0; 3]),
            UniformKind::IVec4 => grow!(self.ivec4s, [0; 4]),
            UniformKind::Vec2 => grow!(self.vec2s, [0.0; 2]),
            UniformKind::Vec3 => grow!(self.vec3s, Vec3::default()),
            UniformKind::Vec4 => grow!(self.vec4s, Vec4::default()),
            UniformKind::Mat2 | UniformKind::Mat3 | UniformKind::Mat4 => {
                use cgmath::SquareMatrix;
                grow!(self.mat4s, Matrix4::identity())
            }
            UniformKind::FloatArray => grow!(self.float_arrays, Vec::new()),
            UniformKind::Vec3Array => grow!(self.vec3_arrays, Vec::new()),
            UniformKind::Vec4Array => grow!(self.vec4_arrays, Vec::new()),
            UniformKind::Mat4Array => grow!(self.mat4_arrays, Vec::new()),
        }
    }

    /// Total number of values stored across every kind, used only for
    /// diagnostics/tests.
    pub fn len(&self) -> usize {
        self.bools.len()
            + self.ints.len()
            + self.uints.len()
            + self.floats.len()
            + self.doubles.len()
            + self.ivec2s.len()
            + self.ivec3s.len()
            + self.ivec4s.len()
            + self.vec2s.len()
            + self.vec3s.len()
            + self.vec4s.len()
            + self.mat4s.len()
            + self.float_arrays.len()
            + self.vec3_arrays.len()
            + self.vec4_arrays.len()
            + self.mat4_arrays.len()
    }

    /// `true` if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push<T>(arena: &mut Vec<T>, value: T) -> usize {
    let index = arena.len();
    arena.push(value);
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_get_round_trips() {
        let mut container = UniformContainer::new();
        let idx = container.push(UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0)));
        let value = container.get(UniformKind::Vec3, idx).unwrap();
        assert_eq!(value, UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn storage_indices_never_move_across_other_kind_pushes() {
        let mut container = UniformContainer::new();
        let a = container.push(UniformValue::Float(1.0));
        container.push(UniformValue::Vec4(Vec4::new(0.0, 0.0, 0.0, 0.0)));
        let b = container.push(UniformValue::Float(2.0));
        assert_eq!(container.get(UniformKind::Float, a).unwrap(), UniformValue::Float(1.0));
        assert_eq!(container.get(UniformKind::Float, b).unwrap(), UniformValue::Float(2.0));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut container = UniformContainer::new();
        let idx = container.push(UniformValue::Int(1));
        container.set(idx, UniformValue::Int(42)).unwrap();
        assert_eq!(container.get(UniformKind::Int, idx).unwrap(), UniformValue::Int(42));
    }
}
