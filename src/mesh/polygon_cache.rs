//! On-demand procedural meshes (cube, sphere, cylinder, capsule, grid),
//! generated once per distinct parameterization and cached by name.

use std::collections::HashMap;
use std::f32::consts::PI;

use crate::core::error::RenderResult;
use crate::core::math::Vec3;
use crate::gpu::backend::GraphicsBackend;
use crate::gpu::types::{BufferUsage, PrimitiveMode};
use crate::mesh::vertex_array::Mesh;

/// A parameterized procedural shape. Two requests with equal parameters
/// produce the same [`PolygonCache`] cache key and therefore share one GPU
/// mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveShape {
    /// An axis-aligned cube centered on the origin.
    Cube {
        /// Distance from center to each face.
        half_extent: f32,
    },
    /// A UV sphere centered on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Longitude/latitude subdivisions.
        segments: u32,
    },
    /// A cylinder with its axis along Y, centered on the origin.
    Cylinder {
        /// Cylinder radius.
        radius: f32,
        /// Total height along Y.
        height: f32,
        /// Radial subdivisions.
        segments: u32,
    },
    /// A capsule (cylinder with hemispherical caps), axis along Y.
    Capsule {
        /// Capsule radius.
        radius: f32,
        /// Height of the straight cylindrical section, excluding caps.
        height: f32,
        /// Radial subdivisions.
        segments: u32,
    },
    /// A flat grid in the XZ plane, centered on the origin.
    Grid {
        /// Total edge length.
        size: f32,
        /// Subdivisions per edge.
        divisions: u32,
    },
}

impl PrimitiveShape {
    /// A cache key unique to this shape's kind and parameters.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Cube { half_extent } => format!("cube:{half_extent}"),
            Self::Sphere { radius, segments } => format!("sphere:{radius}:{segments}"),
            Self::Cylinder { radius, height, segments } => format!("cylinder:{radius}:{height}:{segments}"),
            Self::Capsule { radius, height, segments } => format!("capsule:{radius}:{height}:{segments}"),
            Self::Grid { size, divisions } => format!("grid:{size}:{divisions}"),
        }
    }

    fn generate(&self) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
        match *self {
            Self::Cube { half_extent } => generate_cube(half_extent),
            Self::Sphere { radius, segments } => generate_sphere(radius, segments.max(3)),
            Self::Cylinder { radius, height, segments } => generate_cylinder(radius, height, segments.max(3)),
            Self::Capsule { radius, height, segments } => generate_capsule(radius, height, segments.max(3)),
            Self::Grid { size, divisions } => generate_grid(size, divisions.max(1)),
        }
    }
}

fn generate_cube(h: f32) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, right, up) in faces {
        let base = positions.len() as u32;
        let center = normal * h;
        let corners = [
            center - right * h - up * h,
            center + right * h - up * h,
            center + right * h + up * h,
            center - right * h + up * h,
        ];
        let corner_uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (corner, uv) in corners.into_iter().zip(corner_uvs) {
            positions.push(corner);
            normals.push(normal);
            uvs.push(uv);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (positions, normals, uvs, indices)
}

fn generate_sphere(radius: f32, segments: u32) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
    let rings = segments;
    let sectors = segments * 2;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let theta = u * 2.0 * PI;
            let x = phi.sin() * theta.cos();
            let y = phi.cos();
            let z = phi.sin() * theta.sin();
            positions.push(Vec3::new(x, y, z) * radius);
            normals.push(Vec3::new(x, y, z));
            uvs.push([u, v]);
        }
    }

    let stride = sectors + 1;
    let mut indices = Vec::new();
    for ring in 0..rings {
        for sector in 0..sectors {
            let a = ring * stride + sector;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    (positions, normals, uvs, indices)
}

fn generate_cylinder(radius: f32, height: f32, segments: u32) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
    let half_height = height * 0.5;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let theta = t * 2.0 * PI;
        let (x, z) = (theta.cos(), theta.sin());
        let normal = Vec3::new(x, 0.0, z);
        positions.push(Vec3::new(x * radius, -half_height, z * radius));
        normals.push(normal);
        uvs.push([t, 0.0]);
        positions.push(Vec3::new(x * radius, half_height, z * radius));
        normals.push(normal);
        uvs.push([t, 1.0]);
    }

    for i in 0..segments {
        let base = i * 2;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
    }

    (positions, normals, uvs, indices)
}

fn generate_capsule(radius: f32, height: f32, segments: u32) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
    // Approximated as a cylinder whose end caps are replaced by hemisphere
    // rings offset by the cylinder's half-height, rather than true
    // geodesic caps — adequate for collision-visualization debug draw,
    // which is the only consumer in this crate.
    let (mut positions, mut normals, mut uvs, mut indices) = generate_cylinder(radius, height, segments);
    let half_height = height * 0.5;
    let hemisphere_rings = (segments / 2).max(2);

    for (sign, v_base) in [(1.0f32, 1.0f32), (-1.0, 0.0)] {
        let base_index = positions.len() as u32;
        for ring in 0..=hemisphere_rings {
            let t = ring as f32 / hemisphere_rings as f32;
            let phi = t * PI * 0.5;
            for i in 0..=segments {
                let theta = i as f32 / segments as f32 * 2.0 * PI;
                let local = Vec3::new(phi.sin() * theta.cos(), phi.cos() * sign, phi.sin() * theta.sin());
                positions.push(Vec3::new(local.x * radius, local.y * radius + sign * half_height, local.z * radius));
                normals.push(local);
                uvs.push([i as f32 / segments as f32, v_base]);
            }
        }
        let stride = segments + 1;
        for ring in 0..hemisphere_rings {
            for i in 0..segments {
                let a = base_index + ring * stride + i;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
    }

    (positions, normals, uvs, indices)
}

fn generate_grid(size: f32, divisions: u32) -> (Vec<Vec3>, Vec<Vec3>, Vec<[f32; 2]>, Vec<u32>) {
    let half = size * 0.5;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for row in 0..=divisions {
        let v = row as f32 / divisions as f32;
        let z = -half + v * size;
        for col in 0..=divisions {
            let u = col as f32 / divisions as f32;
            let x = -half + u * size;
            positions.push(Vec3::new(x, 0.0, z));
            normals.push(Vec3::new(0.0, 1.0, 0.0));
            uvs.push([u, v]);
        }
    }

    let stride = divisions + 1;
    for row in 0..divisions {
        for col in 0..divisions {
            let a = row * stride + col;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    (positions, normals, uvs, indices)
}

/// Caches procedurally generated GPU meshes by shape parameterization so
/// repeated requests (e.g. every scene object using the stock cube) reuse
/// one set of buffers.
#[derive(Default)]
pub struct PolygonCache {
    meshes: HashMap<String, Mesh>,
}

impl PolygonCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached mesh for `shape`, generating and uploading it on
    /// first request.
    pub fn get_or_create(&mut self, backend: &mut dyn GraphicsBackend, shape: PrimitiveShape) -> RenderResult<&Mesh> {
        let key = shape.cache_key();
        if !self.meshes.contains_key(&key) {
            let (positions, normals, uvs, indices) = shape.generate();
            let mesh = Mesh::new(
                backend,
                BufferUsage::Static,
                PrimitiveMode::Triangles,
                &positions,
                Some(&normals),
                Some(&uvs),
                Some(&indices),
            )?;
            self.meshes.insert(key.clone(), mesh);
        }
        Ok(self.meshes.get(&key).expect("just inserted"))
    }

    /// Number of distinct procedural meshes currently cached.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// `true` if no shapes have been generated yet.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        let (positions, normals, uvs, indices) = PrimitiveShape::Cube { half_extent: 1.0 }.generate();
        assert_eq!(positions.len(), 24);
        assert_eq!(normals.len(), 24);
        assert_eq!(uvs.len(), 24);
        assert_eq!(indices.len(), 36);
    }

    #[test]
    fn grid_vertex_count_matches_divisions() {
        let (positions, _, _, indices) = PrimitiveShape::Grid { size: 10.0, divisions: 4 }.generate();
        assert_eq!(positions.len(), 5 * 5);
        assert_eq!(indices.len(), 4 * 4 * 6);
    }

    #[test]
    fn cache_keys_differ_by_parameters() {
        let a = PrimitiveShape::Sphere { radius: 1.0, segments: 16 }.cache_key();
        let b = PrimitiveShape::Sphere { radius: 2.0, segments: 16 }.cache_key();
        assert_ne!(a, b);
    }
}
