//! Typed buffer and vertex-array wrappers over [`GraphicsBackend`].
//!
//! These types own a backend handle and the bookkeeping the backend itself
//! doesn't track (byte length, attribute layout, draw counts) so callers
//! don't have to thread that state through separately.

use crate::core::error::{RenderError, RenderResult};
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::types::{BufferHandle, BufferType, BufferUsage, PrimitiveMode, VaoHandle, VertexAttributeSlot};

/// A single GPU buffer plus the byte length last uploaded to it.
#[derive(Debug)]
pub struct GpuBuffer {
    handle: BufferHandle,
    buffer_type: BufferType,
    usage: BufferUsage,
    len_bytes: usize,
}

impl GpuBuffer {
    /// Uploads `data` as a new buffer of `buffer_type`/`usage`.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        buffer_type: BufferType,
        usage: BufferUsage,
        data: &[u8],
    ) -> RenderResult<Self> {
        let handle = backend.create_buffer(buffer_type, usage, data)?;
        Ok(Self {
            handle,
            buffer_type,
            usage,
            len_bytes: data.len(),
        })
    }

    /// The backend handle.
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// The buffer's role.
    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    /// The usage hint the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Bytes currently resident in the buffer.
    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    /// Overwrites `data` at `offset` bytes. Returns an error if the write
    /// would run past the buffer's allocated length — callers must
    /// recreate the buffer to grow it, matching the immutable-storage model
    /// used for vertex/index data.
    pub fn update(&mut self, backend: &mut dyn GraphicsBackend, offset: usize, data: &[u8]) -> RenderResult<()> {
        if offset + data.len() > self.len_bytes {
            return Err(RenderError::invariant(format!(
                "buffer update of {} bytes at offset {offset} exceeds allocated length {}",
                data.len(),
                self.len_bytes
            )));
        }
        backend.update_buffer(self.handle, offset, data)
    }

    /// Destroys the underlying GPU buffer.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        backend.destroy_buffer(self.handle);
    }
}

/// A vertex array: one vertex buffer per attribute slot, an optional index
/// buffer, and the draw counts derived from them.
#[derive(Debug)]
pub struct VertexArrayData {
    vao: VaoHandle,
    attribute_buffers: Vec<(VertexAttributeSlot, GpuBuffer)>,
    index_buffer: Option<GpuBuffer>,
    usage: BufferUsage,
    vertex_count: u32,
    index_count: u32,
    primitive: PrimitiveMode,
}

impl VertexArrayData {
    /// Builds a VAO from per-slot vertex data and optional index data.
    ///
    /// `vertex_count` is required explicitly rather than derived from byte
    /// length because attribute stride varies by slot.
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        usage: BufferUsage,
        primitive: PrimitiveMode,
        attributes: Vec<(VertexAttributeSlot, &[u8])>,
        vertex_count: u32,
        indices: Option<&[u32]>,
    ) -> RenderResult<Self> {
        if attributes.is_empty() {
            return Err(RenderError::invariant("a vertex array must have at least one attribute"));
        }

        let mut attribute_buffers = Vec::with_capacity(attributes.len());
        let mut vao_inputs = Vec::with_capacity(attributes.len());
        for (slot, data) in attributes {
            let buffer = GpuBuffer::new(backend, BufferType::Vertex, usage, data)?;
            vao_inputs.push((slot, buffer.handle()));
            attribute_buffers.push((slot, buffer));
        }

        let index_buffer = match indices {
            Some(idx) => Some(GpuBuffer::new(
                backend,
                BufferType::Index,
                usage,
                bytemuck::cast_slice(idx),
            )?),
            None => None,
        };
        let index_count = indices.map(|i| i.len() as u32).unwrap_or(0);

        let vao = backend.create_vao(&vao_inputs, index_buffer.as_ref().map(|b| b.handle()))?;

        Ok(Self {
            vao,
            attribute_buffers,
            index_buffer,
            usage,
            vertex_count,
            index_count,
            primitive,
        })
    }

    /// The backend VAO handle.
    pub fn vao_handle(&self) -> VaoHandle {
        self.vao
    }

    /// Usage hint this vertex array was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Primitive topology used to draw this vertex array.
    pub fn primitive(&self) -> PrimitiveMode {
        self.primitive
    }

    /// Number of vertices uploaded.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices, `0` if unindexed.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// `true` once at least one index or vertex exists to draw — a render
    /// command must not reference this vertex array until then.
    pub fn is_drawable(&self) -> bool {
        if self.index_buffer.is_some() {
            self.index_count > 0
        } else {
            self.vertex_count > 0
        }
    }

    /// Overwrites the data behind an existing attribute slot without
    /// reallocating the VAO. Fails if the slot wasn't part of this vertex
    /// array's original attribute set.
    pub fn update_attribute(&mut self, backend: &mut dyn GraphicsBackend, slot: VertexAttributeSlot, data: &[u8]) -> RenderResult<()> {
        let buffer = self
            .attribute_buffers
            .iter_mut()
            .find(|(s, _)| *s == slot)
            .map(|(_, b)| b)
            .ok_or_else(|| RenderError::NotFound(format!("vertex array has no {slot:?} attribute")))?;
        buffer.update(backend, 0, data)
    }

    /// Draws this vertex array with `instance_count` instances (`1` for a
    /// non-instanced draw).
    pub fn draw(&self, backend: &mut dyn GraphicsBackend, instance_count: u32) -> RenderResult<()> {
        if !self.is_drawable() {
            return Err(RenderError::invariant("attempted to draw an empty vertex array"));
        }
        let count = if self.index_buffer.is_some() {
            self.index_count
        } else {
            self.vertex_count
        };
        backend.draw_indexed(self.vao, count, instance_count, self.primitive)
    }

    /// Destroys the VAO and every attribute/index buffer it owns.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        for (_, buffer) in self.attribute_buffers {
            buffer.destroy(backend);
        }
        if let Some(index_buffer) = self.index_buffer {
            index_buffer.destroy(backend);
        }
        backend.destroy_vao(self.vao);
    }
}
