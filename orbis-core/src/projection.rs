/// Perspective projection utilities
use nalgebra::Matrix4;

use crate::error::{Error, Result};

/// Symmetric perspective frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fovy,
            aspect,
            near,
            far,
        }
    }

    /// Check the frustum describes a non-singular projection
    pub fn validate(&self) -> Result<()> {
        let Self {
            fovy,
            aspect,
            near,
            far,
        } = *self;

        if ![fovy, aspect, near, far].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidProjection(format!(
                "non-finite parameter in {self:?}"
            )));
        }
        if fovy <= 0.0 || fovy >= 180.0 {
            return Err(Error::InvalidProjection(format!(
                "field of view must be within (0, 180) degrees, got {fovy}"
            )));
        }
        if aspect <= 0.0 {
            return Err(Error::InvalidProjection(format!(
                "aspect ratio must be positive, got {aspect}"
            )));
        }
        if near <= 0.0 || near >= far {
            return Err(Error::InvalidProjection(format!(
                "clip planes must satisfy 0 < near < far, got near={near} far={far}"
            )));
        }
        Ok(())
    }

    /// Create the projection matrix
    pub fn matrix(&self) -> Result<Matrix4<f32>> {
        self.validate()?;

        let d = 1.0 / (self.fovy.to_radians() / 2.0).tan();
        let delta = self.near - self.far;

        #[rustfmt::skip]
        let projection = Matrix4::new(
            d / self.aspect, 0.0, 0.0,                          0.0,
            0.0,             d,   0.0,                          0.0,
            0.0,             0.0, (self.near + self.far) / delta, 2.0 * self.near * self.far / delta,
            0.0,             0.0, -1.0,                         0.0,
        );
        Ok(projection)
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self::new(60.0, 1.0, 0.01, 1000.0)
    }
}

/// Viewport aspect ratio, falling back to the width when the height is not positive
pub fn aspect_ratio(width: i32, height: i32) -> f32 {
    if height > 0 {
        width as f32 / height as f32
    } else {
        width as f32
    }
}

/// Build a perspective matrix directly from its parameters
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Result<Matrix4<f32>> {
    Perspective::new(fovy, aspect, near, far).matrix()
}
