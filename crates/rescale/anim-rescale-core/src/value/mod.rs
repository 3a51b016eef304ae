//! Value types for bone transforms

pub mod quaternion;
pub mod transform;
pub mod vector3;

pub use quaternion::*;
pub use transform::*;
pub use vector3::*;
