/// Declarative transform-compose steps for scene parts
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

use crate::error::{Error, Result};
use crate::vector::{Vec3, EPSILON};

/// Rotation angle in degrees, optionally driven by the animation clock.
///
/// Evaluates to `degrees + rate * t`, wrapped into `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub degrees: f32,
    pub rate: f32,
}

impl Angle {
    pub fn fixed(degrees: f32) -> Self {
        Self { degrees, rate: 0.0 }
    }

    pub fn animated(degrees: f32, rate: f32) -> Self {
        Self { degrees, rate }
    }

    /// Angle in degrees at time `t`
    pub fn at(&self, t: f64) -> f32 {
        (f64::from(self.degrees) + f64::from(self.rate) * t).rem_euclid(360.0) as f32
    }

    pub fn is_animated(&self) -> bool {
        self.rate != 0.0
    }
}

/// A single compose operation applied in the part's local frame
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Translate(Vec3),
    Rotate { angle: Angle, axis: Unit<Vec3> },
    Scale(Vec3),
}

impl Step {
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self::Translate(Vector3::new(x, y, z))
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::Scale(Vector3::new(x, y, z))
    }

    pub fn uniform_scale(s: f32) -> Self {
        Self::scale(s, s, s)
    }

    /// Fixed rotation in degrees about an arbitrary axis
    pub fn rotate(degrees: f32, x: f32, y: f32, z: f32) -> Result<Self> {
        Self::rotate_animated(Angle::fixed(degrees), x, y, z)
    }

    /// Rotation about an arbitrary axis; the axis is normalized and must not be zero
    pub fn rotate_animated(angle: Angle, x: f32, y: f32, z: f32) -> Result<Self> {
        let axis = Vector3::new(x, y, z);
        let axis = Unit::try_new(axis, EPSILON).ok_or(Error::DegenerateVector(axis.norm()))?;
        Ok(Self::Rotate { angle, axis })
    }

    /// Evaluate the step at animation time `t`
    pub fn matrix(&self, t: f64) -> Matrix4<f32> {
        match self {
            Self::Translate(offset) => Transform::translation_matrix(offset),
            Self::Rotate { angle, axis } => Transform::rotation_matrix(axis, angle.at(t)),
            Self::Scale(factors) => Transform::scale_matrix(factors),
        }
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation by `degrees` about a unit axis
    pub fn rotation_matrix(axis: &Unit<Vec3>, degrees: f32) -> Matrix4<f32> {
        Rotation3::from_axis_angle(axis, degrees.to_radians()).to_homogeneous()
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vec3) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a scale matrix
    pub fn scale_matrix(factors: &Vec3) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(factors)
    }

    /// Compose a step list left to right, as the steps would be applied to a stack top
    pub fn compose(steps: &[Step], t: f64) -> Matrix4<f32> {
        steps
            .iter()
            .fold(Matrix4::identity(), |acc, step| acc * step.matrix(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_animated_angle() {
        let angle = Angle::animated(180.0, 0.3);
        assert!(angle.is_animated());
        assert!((angle.at(0.0) - 180.0).abs() < 1e-6);
        assert!((angle.at(10.0) - 183.0).abs() < 1e-4);
        assert!(!Angle::fixed(45.0).is_animated());
        assert!((Angle::fixed(-90.0).at(0.0) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_angles_stay_precise_at_large_times() {
        let angle = Angle::animated(0.0, 1.0);
        // 16_777_216 = 46_603 * 360 + 136
        assert!((angle.at(16_777_216.0) - 136.0).abs() < 1e-3);
        assert!((angle.at(16_777_217.0) - 137.0).abs() < 1e-3);

        let slow = Angle::animated(180.0, 0.3);
        let a = slow.at(1.0e9);
        let b = slow.at(1.0e9 + 1.0);
        assert!(((b - a).rem_euclid(360.0) - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_about_unnormalized_axis() {
        let step = Step::rotate(90.0, 0.0, 5.0, 0.0).unwrap();
        let p = step.matrix(0.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_zero_axis_fails() {
        assert!(matches!(
            Step::rotate(10.0, 0.0, 0.0, 0.0),
            Err(Error::DegenerateVector(_))
        ));
    }

    #[test]
    fn test_compose_order() {
        // Translate then scale: the scale applies in the translated frame
        let steps = [Step::translate(1.0, 0.0, 0.0), Step::uniform_scale(2.0)];
        let p = Transform::compose(&steps, 0.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_animated_step_changes_with_time() {
        let step = Step::rotate_animated(Angle::animated(0.0, 1.0), 0.0, 1.0, 0.0).unwrap();
        assert!((step.matrix(0.0) - Matrix4::identity()).norm() < 1e-6);
        assert!((step.matrix(90.0) - Matrix4::identity()).norm() > 1.0);
    }
}
