/// View matrix construction from an eye/target/up triple
use nalgebra::Matrix4;

use crate::error::{Error, Result};
use crate::vector::{normalize, Vec3, EPSILON};

/// Orthonormal camera frame.
///
/// `z` points from the target back towards the eye, `x` to the right and
/// `y` up, so the camera looks down `-z` in its own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Basis {
    /// Fails with `DegenerateVector` when eye and target coincide and with
    /// `DegenerateBasis` when `up` is parallel to the view direction.
    pub fn new(eye: &Vec3, target: &Vec3, up: &Vec3) -> Result<Self> {
        let z = normalize(&(eye - target))?;
        let x = up.cross(&z);
        if x.norm() < EPSILON {
            return Err(Error::DegenerateBasis);
        }
        let x = normalize(&x)?;
        let y = z.cross(&x);
        Ok(Self { x, y, z })
    }

    /// Unit vector from the eye towards the target
    pub fn forward(&self) -> Vec3 {
        -self.z
    }
}

/// Build the world-to-eye transform.
///
/// The eye lands on the origin, the target on the `-Z` axis and the part of
/// `up` orthogonal to the view direction on `+Y`.
pub fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Result<Matrix4<f32>> {
    let Basis { x, y, z } = Basis::new(eye, target, up)?;

    #[rustfmt::skip]
    let view = Matrix4::new(
        x.x, x.y, x.z, -x.dot(eye),
        y.x, y.y, y.z, -y.dot(eye),
        z.x, z.y, z.z, -z.dot(eye),
        0.0, 0.0, 0.0, 1.0,
    );
    Ok(view)
}
