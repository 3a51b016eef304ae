use crate::value::vector3::Vector3;
use nalgebra::{Quaternion as NQuaternion, Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Rotation quaternion stored as (x, y, z, w).
///
/// Products are taken on the raw components so that rotations read from an
/// animation pass through untouched; no renormalization happens behind the
/// caller's back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation of `angle` radians about `axis` (normalized internally).
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let axis = Unit::new_normalize(nalgebra::Vector3::from(axis));
        UnitQuaternion::from_axis_angle(&axis, angle).into()
    }

    /// Rotation of `angle` radians about the vertical (+Z) axis.
    pub fn from_rotation_z(angle: f64) -> Self {
        UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), angle).into()
    }

    /// Inverse of a unit quaternion (its conjugate).
    pub fn inverse(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate `v` by this quaternion, assuming unit length.
    pub fn rotate_vector(&self, v: Vector3) -> Vector3 {
        let q = UnitQuaternion::new_unchecked(self.as_nalgebra());
        q.transform_vector(&v.into()).into()
    }

    /// Direction of the local +X axis after rotation.
    pub fn axis_x(&self) -> Vector3 {
        self.rotate_vector(Vector3::unit_x())
    }

    pub fn as_nalgebra(&self) -> NQuaternion<f64> {
        NQuaternion::new(self.w, self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// True when both quaternions describe the same rotation within `eps`
    /// (q and -q are treated as equal).
    pub fn same_rotation(&self, other: &Quaternion, eps: f64) -> bool {
        let dot = self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w;
        (dot.abs() - 1.0).abs() <= eps
    }
}

impl From<NQuaternion<f64>> for Quaternion {
    fn from(q: NQuaternion<f64>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        q.into_inner().into()
    }
}

impl From<Quaternion> for NQuaternion<f64> {
    fn from(q: Quaternion) -> Self {
        q.as_nalgebra()
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product: `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self::Output {
        (self.as_nalgebra() * rhs.as_nalgebra()).into()
    }
}
