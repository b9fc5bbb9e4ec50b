/// 3D vector helpers on top of nalgebra
///
/// `Vec3` already provides `+`, `-`, scalar `*`, `dot`, `cross` and `norm`;
/// the only addition here is a normalization that refuses degenerate input
/// instead of returning NaNs.
use nalgebra::Vector3;

use crate::error::{Error, Result};

pub type Vec3 = Vector3<f32>;

/// Vectors shorter than this cannot be normalized
pub const EPSILON: f32 = 1e-6;

pub fn normalize(v: &Vec3) -> Result<Vec3> {
    let length = v.norm();
    if !length.is_finite() || length < EPSILON {
        return Err(Error::DegenerateVector(length));
    }
    Ok(v / length)
}
