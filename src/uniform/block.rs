//! The std140 uniform-block layout engine.
//!
//! `compute_layout` assigns each declared field an offset following the
//! five std140 rules: scalars align to 4 bytes, `vec2` to 8, `vec3`/`vec4`
//! to 16, every array element (regardless of its own size) is padded out to
//! a 16-byte stride, and the block's total size is rounded up to a multiple
//! of 16 so blocks can be packed back to back in a shared buffer.

use crate::core::error::{RenderError, RenderResult};
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::types::BufferHandle;
use crate::uniform::value::{UniformKind, UniformValue};
use std::collections::HashMap;

/// One named field inside a uniform block, with its computed std140 offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferUniform {
    /// Field name, as declared in shader source.
    pub name: String,
    /// Field kind.
    pub kind: UniformKind,
    /// Element count for array fields.
    pub array_len: Option<usize>,
    /// Byte offset within the block's backing buffer.
    pub offset: usize,
    /// Byte size occupied, including std140 padding.
    pub size: usize,
}

fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) / align * align
}

/// Assigns std140 offsets to `fields`, declared in order. Returns the laid
/// out fields and the block's total size, rounded up to a 16-byte multiple.
pub fn compute_layout(fields: &[(String, UniformKind, Option<usize>)]) -> (Vec<BufferUniform>, usize) {
    let mut offset = 0usize;
    let mut laid_out = Vec::with_capacity(fields.len());

    for (name, kind, array_len) in fields {
        let align = kind.std140_align();
        let element_size = kind.std140_size();
        let size = match array_len {
            Some(count) => element_size * (*count).max(1),
            None => element_size,
        };
        let field_offset = align_up(offset, align);
        laid_out.push(BufferUniform {
            name: name.clone(),
            kind: *kind,
            array_len: *array_len,
            offset: field_offset,
            size,
        });
        offset = field_offset + size;
    }

    let total_size = align_up(offset, 16).max(16);
    (laid_out, total_size)
}

/// Assigns stable global binding points to uniform blocks by name, so every
/// shader program that declares e.g. `CameraBlock` shares one binding point
/// and therefore one underlying buffer.
#[derive(Debug, Default)]
pub struct BindingPointAllocator {
    next: u32,
    assigned: HashMap<String, u32>,
}

impl BindingPointAllocator {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding point for `block_name`, assigning the next free
    /// one the first time this name is seen.
    pub fn allocate(&mut self, block_name: &str) -> u32 {
        if let Some(binding) = self.assigned.get(block_name) {
            return *binding;
        }
        let binding = self.next;
        self.next += 1;
        self.assigned.insert(block_name.to_string(), binding);
        binding
    }
}

/// A uniform block bound to a fixed binding point, with its own CPU-side
/// staging buffer and backend buffer object.
#[derive(Debug)]
pub struct UniformBlock {
    name: String,
    binding: u32,
    fields: Vec<BufferUniform>,
    field_index: HashMap<String, usize>,
    cpu_buffer: Vec<u8>,
    gpu_buffer: BufferHandle,
    dirty_range: Option<(usize, usize)>,
}

impl UniformBlock {
    /// Builds a block, computing layout from `fields` and allocating its
    /// backing GPU buffer zero-initialized.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        name: impl Into<String>,
        binding: u32,
        fields: &[(String, UniformKind, Option<usize>)],
    ) -> RenderResult<Self> {
        let (laid_out, total_size) = compute_layout(fields);
        let field_index = laid_out
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let cpu_buffer = vec![0u8; total_size];
        let gpu_buffer = backend.create_buffer(
            crate::gpu::types::BufferType::Uniform,
            crate::gpu::types::BufferUsage::Dynamic,
            &cpu_buffer,
        )?;
        backend.bind_uniform_buffer(binding, gpu_buffer)?;

        Ok(Self {
            name: name.into(),
            binding,
            fields: laid_out,
            field_index,
            cpu_buffer,
            gpu_buffer,
            dirty_range: None,
        })
    }

    /// Block name, as referenced by shader source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Global binding point this block occupies.
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Total byte size of the block's backing buffer.
    pub fn total_size(&self) -> usize {
        self.cpu_buffer.len()
    }

    /// Field layout, in declaration order.
    pub fn fields(&self) -> &[BufferUniform] {
        &self.fields
    }

    /// The block's backend buffer handle.
    pub fn gpu_buffer(&self) -> BufferHandle {
        self.gpu_buffer
    }

    /// Writes `value` into the field named `name`, staging the change for
    /// the next [`UniformBlock::flush`]. Array writes update only the
    /// sub-range touched, honoring per-element granularity instead of
    /// rewriting the whole array.
    pub fn write(&mut self, name: &str, value: &UniformValue) -> RenderResult<()> {
        let field_idx = *self
            .field_index
            .get(name)
            .ok_or_else(|| RenderError::NotFound(format!("uniform block `{}` has no field `{name}`", self.name)))?;
        let field = &self.fields[field_idx];
        if field.kind != value.kind() {
            return Err(RenderError::UniformKindMismatch {
                name: name.to_string(),
                declared: field.kind.name(),
                actual: value.kind().name(),
            });
        }

        let bytes = encode_std140(value);
        if bytes.len() > field.size {
            return Err(RenderError::invariant(format!(
                "encoded value for `{name}` is {} bytes, field only reserves {}",
                bytes.len(),
                field.size
            )));
        }
        self.cpu_buffer[field.offset..field.offset + bytes.len()].copy_from_slice(&bytes);
        self.mark_dirty(field.offset, bytes.len());
        Ok(())
    }

    /// Writes a single array element at `element_index` without touching
    /// the rest of the array, the per-element sub-range path used when only
    /// one instance's transform (etc.) changed.
    pub fn write_element(&mut self, name: &str, element_index: usize, value: &UniformValue) -> RenderResult<()> {
        let field_idx = *self
            .field_index
            .get(name)
            .ok_or_else(|| RenderError::NotFound(format!("uniform block `{}` has no field `{name}`", self.name)))?;
        let field = &self.fields[field_idx];
        let array_len = field
            .array_len
            .ok_or_else(|| RenderError::invariant(format!("`{name}` is not an array field")))?;
        if element_index >= array_len {
            return Err(RenderError::invariant(format!(
                "element index {element_index} out of range for `{name}` (len {array_len})"
            )));
        }
        let stride = field.size / array_len.max(1);
        let bytes = encode_std140(value);
        if bytes.len() > stride {
            return Err(RenderError::invariant(format!(
                "encoded element for `{name}[{element_index}]` is {} bytes, stride is {stride}",
                bytes.len()
            )));
        }
        let offset = field.offset + element_index * stride;
        self.cpu_buffer[offset..offset + bytes.len()].copy_from_slice(&bytes);
        self.mark_dirty(offset, bytes.len());
        Ok(())
    }

    fn mark_dirty(&mut self, offset: usize, len: usize) {
        let end = offset + len;
        self.dirty_range = Some(match self.dirty_range {
            Some((lo, hi)) => (lo.min(offset), hi.max(end)),
            None => (offset, end),
        });
    }

    /// Uploads any pending writes to the GPU buffer as a single sub-range
    /// update, then clears the dirty marker. A no-op if nothing changed.
    pub fn flush(&mut self, backend: &mut dyn GraphicsBackend) -> RenderResult<()> {
        if let Some((lo, hi)) = self.dirty_range.take() {
            backend.update_buffer(self.gpu_buffer, lo, &self.cpu_buffer[lo..hi])?;
        }
        Ok(())
    }
}

/// Encodes a single value into its std140 byte representation. Matrices are
/// written column-major, each column padded to 16 bytes; arrays repeat the
/// element encoding at the kind's stride.
fn encode_std140(value: &UniformValue) -> Vec<u8> {
    fn unpadded_vec3(v: crate::core::math::Vec3) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&v.x.to_le_bytes());
        out[4..8].copy_from_slice(&v.y.to_le_bytes());
        out[8..12].copy_from_slice(&v.z.to_le_bytes());
        out
    }

    fn padded_vec3(v: crate::core::math::Vec3) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..12].copy_from_slice(&unpadded_vec3(v));
        out
    }

    match value {
        UniformValue::Bool(v) => (*v as i32).to_le_bytes().to_vec(),
        UniformValue::Int(v) => v.to_le_bytes().to_vec(),
        UniformValue::UInt(v) => v.to_le_bytes().to_vec(),
        UniformValue::Float(v) => v.to_le_bytes().to_vec(),
        UniformValue::Double(v) => v.to_le_bytes().to_vec(),
        UniformValue::IVec2(v) => v.iter().flat_map(|c| c.to_le_bytes()).collect(),
        UniformValue::IVec3(v) => v.iter().flat_map(|c| c.to_le_bytes()).collect(),
        UniformValue::IVec4(v) => v.iter().flat_map(|c| c.to_le_bytes()).collect(),
        UniformValue::Vec2(v) => v.iter().flat_map(|c| c.to_le_bytes()).collect(),
        UniformValue::Vec3(v) => unpadded_vec3(*v).to_vec(),
        UniformValue::Vec4(v) => [v.x, v.y, v.z, v.w].iter().flat_map(|c| c.to_le_bytes()).collect(),
        UniformValue::Mat4(m) => {
            let mut out = Vec::with_capacity(64);
            for col in 0..4 {
                let c = m[col];
                out.extend_from_slice(&c.x.to_le_bytes());
                out.extend_from_slice(&c.y.to_le_bytes());
                out.extend_from_slice(&c.z.to_le_bytes());
                out.extend_from_slice(&c.w.to_le_bytes());
            }
            out
        }
        UniformValue::FloatArray(items) => items
            .iter()
            .flat_map(|f| {
                let mut slot = [0u8; 16];
                slot[0..4].copy_from_slice(&f.to_le_bytes());
                slot
            })
            .collect(),
        UniformValue::Vec3Array(items) => items.iter().flat_map(|v| padded_vec3(*v)).collect(),
        UniformValue::Vec4Array(items) => items
            .iter()
            .flat_map(|v| [v.x, v.y, v.z, v.w])
            .flat_map(|c| c.to_le_bytes())
            .collect(),
        UniformValue::Mat4Array(mats) => mats.iter().flat_map(|m| encode_std140(&UniformValue::Mat4(*m))).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_then_vec3_pads_to_16_byte_boundary() {
        let fields = vec![
            ("a".to_string(), UniformKind::Float, None),
            ("b".to_string(), UniformKind::Vec3, None),
        ];
        let (laid_out, total) = compute_layout(&fields);
        assert_eq!(laid_out[0].offset, 0);
        assert_eq!(laid_out[1].offset, 16);
        assert_eq!(total, 32);
    }

    #[test]
    fn two_scalars_pack_without_padding() {
        let fields = vec![
            ("a".to_string(), UniformKind::Float, None),
            ("b".to_string(), UniformKind::Float, None),
        ];
        let (laid_out, total) = compute_layout(&fields);
        assert_eq!(laid_out[0].offset, 0);
        assert_eq!(laid_out[1].offset, 4);
        assert_eq!(total, 16);
    }

    #[test]
    fn matches_the_canonical_float_vec3_float_vec4_array_layout() {
        let fields = vec![
            ("a".to_string(), UniformKind::Float, None),
            ("b".to_string(), UniformKind::Vec3, None),
            ("c".to_string(), UniformKind::Float, None),
            ("arr".to_string(), UniformKind::Vec4Array, Some(2)),
        ];
        let (laid_out, total) = compute_layout(&fields);
        assert_eq!(laid_out[0].offset, 0);
        assert_eq!(laid_out[1].offset, 16);
        assert_eq!(laid_out[2].offset, 28);
        assert_eq!(laid_out[3].offset, 32);
        assert_eq!(total, 64);
    }

    #[test]
    fn float_array_elements_use_16_byte_stride() {
        let fields = vec![("values".to_string(), UniformKind::FloatArray, Some(3))];
        let (laid_out, total) = compute_layout(&fields);
        assert_eq!(laid_out[0].size, 48);
        assert_eq!(total, 48);
    }

    #[test]
    fn mat4_occupies_four_aligned_columns() {
        let fields = vec![
            ("a".to_string(), UniformKind::Float, None),
            ("m".to_string(), UniformKind::Mat4, None),
        ];
        let (laid_out, _total) = compute_layout(&fields);
        assert_eq!(laid_out[1].offset, 16);
        assert_eq!(laid_out[1].size, 64);
    }
}
