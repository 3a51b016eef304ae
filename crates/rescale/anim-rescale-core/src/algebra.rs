//! Transform algebra shared by the converter, the accumulator and the pipeline.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::value::{Quaternion, Transform, Vector3};

/// Lengths below this are treated as zero when normalizing.
pub const SMALL_NUMBER: f64 = 1e-8;

/// Unit vector of `v`, or the zero vector when `|v|` is below [`SMALL_NUMBER`].
pub fn safe_normalize(v: Vector3) -> Vector3 {
    let len_sq = v.length_squared();
    if len_sq < SMALL_NUMBER * SMALL_NUMBER {
        return Vector3::zero();
    }
    v * (1.0 / len_sq.sqrt())
}

/// Express `child`'s local transform in `parent`'s frame.
///
/// `parent` is applied first: a point `p` in child space maps to
/// `parent(child(p))`. Rotations multiply as `parent * child`, scales
/// multiply component-wise and the child's position is scaled, rotated and
/// offset by the parent.
pub fn compose(child: &Transform, parent: &Transform) -> Transform {
    let rotation = parent.rotation * child.rotation;
    let scale = child.scale.component_mul(&parent.scale);
    let position = parent
        .rotation
        .rotate_vector(parent.scale.component_mul(&child.position))
        + parent.position;
    Transform::new(position, rotation, scale)
}

/// Fixed correction applied to the root bone when unrotation is requested:
/// -90 degrees about the vertical (+Z) axis.
pub fn root_unrotation() -> Quaternion {
    Quaternion::from_rotation_z(-std::f64::consts::FRAC_PI_2)
}

/// How a facing frame is derived from a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingConvention {
    /// Yaw then pitch, no roll. A vertical axis yields yaw = 0.
    #[default]
    YawPitch,
    /// Minimal arc from +X. An axis opposite +X turns 180 degrees about +Z.
    ShortestArc,
}

/// Orientation whose +X axis points along `q`'s local +X axis.
pub fn axis_orientation(q: &Quaternion, convention: FacingConvention) -> Quaternion {
    direction_orientation(q.axis_x(), convention)
}

/// Orientation that maps +X onto `dir`. A zero direction yields identity.
pub fn direction_orientation(dir: Vector3, convention: FacingConvention) -> Quaternion {
    if dir.length_squared() < SMALL_NUMBER * SMALL_NUMBER {
        return Quaternion::identity();
    }
    match convention {
        FacingConvention::YawPitch => {
            let yaw = dir.y.atan2(dir.x);
            let pitch = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
            // Positive pitch lifts +X towards +Z, which is a negative turn about +Y.
            UnitQuaternion::from_euler_angles(0.0, -pitch, yaw).into()
        }
        FacingConvention::ShortestArc => {
            let from = nalgebra::Vector3::x();
            let to: nalgebra::Vector3<f64> = safe_normalize(dir).into();
            match UnitQuaternion::rotation_between(&from, &to) {
                Some(q) => q.into(),
                None => Quaternion::from_rotation_z(std::f64::consts::PI),
            }
        }
    }
}
