//! GPU mesh data: a [`crate::gpu::buffer::VertexArrayData`] plus the
//! object-space bounds the scene graph needs to build world-space AABBs.

use crate::core::error::{RenderError, RenderResult};
use crate::core::math::{Aabb, Vec3};
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::buffer::VertexArrayData;
use crate::gpu::types::{BufferUsage, PrimitiveMode, VertexAttributeSlot};

/// Drawable geometry: vertex/index buffers plus the object-space AABB
/// derived from its position attribute.
///
/// The AABB is recomputed whenever [`Mesh::replace_positions`] uploads new
/// position data, so a mesh whose vertices are animated in place (e.g. a
/// morph target) keeps an accurate bound without the caller tracking it
/// separately.
#[derive(Debug)]
pub struct Mesh {
    vertex_array: VertexArrayData,
    object_bounds: Aabb,
}

impl Mesh {
    /// Builds a mesh from raw attribute data. `positions` is required and
    /// drives the initial object-space AABB; other attributes are optional.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        usage: BufferUsage,
        primitive: PrimitiveMode,
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        tex_coords: Option<&[[f32; 2]]>,
        indices: Option<&[u32]>,
    ) -> RenderResult<Self> {
        if positions.is_empty() {
            return Err(RenderError::invariant("a mesh needs at least one vertex position"));
        }

        let mut attributes = vec![(VertexAttributeSlot::Position, bytemuck::cast_slice(positions))];
        if let Some(normals) = normals {
            if normals.len() != positions.len() {
                return Err(RenderError::invariant("normal count must match position count"));
            }
            attributes.push((VertexAttributeSlot::Normal, bytemuck::cast_slice(normals)));
        }
        if let Some(tex_coords) = tex_coords {
            if tex_coords.len() != positions.len() {
                return Err(RenderError::invariant("tex coord count must match position count"));
            }
            attributes.push((VertexAttributeSlot::TexCoord, bytemuck::cast_slice(tex_coords)));
        }

        let vertex_array = VertexArrayData::new(
            backend,
            usage,
            primitive,
            attributes,
            positions.len() as u32,
            indices,
        )?;

        Ok(Self {
            vertex_array,
            object_bounds: object_space_bounds(positions),
        })
    }

    /// The underlying drawable vertex array.
    pub fn vertex_array(&self) -> &VertexArrayData {
        &self.vertex_array
    }

    /// Object-space (pre-transform) bounding box.
    pub fn object_bounds(&self) -> Aabb {
        self.object_bounds
    }

    /// Uploads new position data and recomputes the object-space AABB from
    /// it.
    pub fn replace_positions(&mut self, backend: &mut dyn GraphicsBackend, positions: &[Vec3]) -> RenderResult<()> {
        self.vertex_array
            .update_attribute(backend, VertexAttributeSlot::Position, bytemuck::cast_slice(positions))?;
        self.object_bounds = object_space_bounds(positions);
        Ok(())
    }

    /// Destroys the underlying GPU vertex array.
    pub fn destroy(self, backend: &mut dyn GraphicsBackend) {
        self.vertex_array.destroy(backend);
    }
}

fn object_space_bounds(positions: &[Vec3]) -> Aabb {
    positions
        .iter()
        .fold(Aabb::EMPTY, |acc, p| acc.union(&Aabb::new(*p, *p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_space_bounds_matches_extreme_positions() {
        let positions = [
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, -3.0),
            Vec3::new(0.0, -2.0, 3.0),
        ];
        let bounds = object_space_bounds(&positions);
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }
}
