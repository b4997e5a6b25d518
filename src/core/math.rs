//! Math types used throughout the render pipeline.
//!
//! Vectors and colors are thin newtypes with a guaranteed memory layout;
//! internal algorithms that need the richer `cgmath` API (quaternions,
//! 4x4 matrix inversion, `look_at`) convert through `From`/`Into` rather than
//! reimplementing that functionality.

use std::ops::{Add, Div, Mul, Neg, Sub};

pub use cgmath::{Matrix4, Quaternion};

/// A 3D vector.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// Builds a vector from components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// The vector of ones.
    #[inline]
    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared length, cheaper than `length` when only comparing magnitudes.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit-length version of this vector; the zero vector if `self` is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::zero()
        } else {
            self / len
        }
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Linear interpolation between `self` and `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}
impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
impl Div<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<cgmath::Vector3<f32>> for Vec3 {
    #[inline]
    fn from(v: cgmath::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}
impl From<Vec3> for cgmath::Vector3<f32> {
    #[inline]
    fn from(v: Vec3) -> Self {
        cgmath::Vector3::new(v.x, v.y, v.z)
    }
}
impl From<Vec3> for cgmath::Point3<f32> {
    #[inline]
    fn from(v: Vec3) -> Self {
        cgmath::Point3::new(v.x, v.y, v.z)
    }
}

/// A 4-component vector, used for homogeneous points and RGBA colors.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Vec4 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component.
    pub w: f32,
}

impl Vec4 {
    /// Builds a vector from components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Builds a homogeneous point from a 3D vector with `w = 1`.
    #[inline]
    pub const fn from_point(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }
}

impl From<cgmath::Vector4<f32>> for Vec4 {
    #[inline]
    fn from(v: cgmath::Vector4<f32>) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}
impl From<Vec4> for cgmath::Vector4<f32> {
    #[inline]
    fn from(v: Vec4) -> Self {
        cgmath::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

/// An RGBA color with components in `[0, 1]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque white, the fallback color for a missing texture.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque mid-gray, the fallback color for a missing material.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5, 1.0);

    /// Builds a color from components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts to 8-bit-per-channel components, as read back from a
    /// framebuffer.
    pub fn to_u8(self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }
}

/// An axis-aligned bounding box given by its min and max corners.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// An AABB that contains nothing; the identity element for [`Aabb::union`].
    pub const EMPTY: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Builds an AABB from explicit corners.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the extent along each axis.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Smallest AABB containing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Transforms the 8 corners of this AABB by `matrix` and returns the
    /// resulting world-space AABB.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Aabb {
        use cgmath::{Transform, Vector3};
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut result = Aabb::EMPTY;
        for corner in corners {
            let p = matrix.transform_point(cgmath::Point3::new(corner.x, corner.y, corner.z));
            let v = Vec3::new(p.x, p.y, p.z);
            result.min = result.min.min(v);
            result.max = result.max.max(v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_cross_of_basis_vectors_is_third_basis_vector() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn vec3_normalize_of_zero_is_zero() {
        assert_eq!(Vec3::zero().normalize(), Vec3::zero());
    }

    #[test]
    fn aabb_union_grows_to_contain_both() {
        let a = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(-1.0, 2.0, 0.5), Vec3::new(0.5, 3.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn aabb_transform_by_identity_is_unchanged() {
        let a = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let t = a.transform(&Matrix4::from_scale(1.0));
        assert!((t.min.x - a.min.x).abs() < 1e-5);
        assert!((t.max.z - a.max.z).abs() < 1e-5);
    }

    #[test]
    fn color_to_u8_clamps() {
        let c = Color::new(1.5, -0.5, 0.5, 1.0);
        assert_eq!(c.to_u8(), [255, 0, 128, 255]);
    }
}
