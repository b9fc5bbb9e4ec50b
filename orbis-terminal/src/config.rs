/// Host configuration loaded from TOML
///
/// Every field has a default, so an empty file (or no file at all) runs the
/// showcase scene as-is.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use orbis_core::demo::{self, Model};
use orbis_core::{
    parse_steps, AnimationClock, CameraController, CameraState, Navigation, Perspective,
    SceneDriver, SceneGraph, ScenePart, Vec3, ViewMode,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Redraw period in milliseconds
    pub frame_ms: u64,
    pub projection: ProjectionConfig,
    pub camera: CameraConfig,
    pub clock: ClockConfig,
    /// Extra parts appended to the showcase scene
    pub bodies: Vec<BodyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_ms: 10,
            projection: ProjectionConfig::default(),
            camera: CameraConfig::default(),
            clock: ClockConfig::default(),
            bodies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        let Perspective {
            fovy, near, far, ..
        } = Perspective::default();
        Self { fovy, near, far }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub view: ViewMode,
    pub turn_step: f32,
    pub move_step: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        let home = demo::home_pose();
        let navigation = Navigation::default();
        Self {
            view: ViewMode::Fixed,
            turn_step: navigation.turn_step,
            move_step: navigation.move_step,
            eye: home.eye.into(),
            target: home.target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    pub start: f64,
    pub increment: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let clock = AnimationClock::default();
        Self {
            start: clock.value(),
            increment: clock.increment(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub name: String,
    pub model: Model,
    /// Step notation, e.g. `"scale(3, 3, 3) translate(40, 0, -60) rotate(0.5t, 0, 1, 0)"`
    #[serde(default)]
    pub steps: String,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        info!(?path, bodies = config.bodies.len(), "loaded config file");
        Ok(config)
    }

    pub fn perspective(&self) -> Perspective {
        let ProjectionConfig { fovy, near, far } = self.projection;
        Perspective {
            fovy,
            near,
            far,
            ..Perspective::default()
        }
    }

    pub fn clock(&self) -> AnimationClock {
        AnimationClock::new(self.clock.start, self.clock.increment)
    }

    pub fn navigation(&self) -> Navigation {
        Navigation {
            turn_step: self.camera.turn_step,
            move_step: self.camera.move_step,
        }
    }

    pub fn home(&self) -> CameraState {
        CameraState::new(
            Vec3::from(self.camera.eye),
            Vec3::from(self.camera.target),
            Vec3::y(),
        )
    }

    /// The showcase scene with the configured bodies appended
    pub fn scene(&self) -> Result<SceneGraph<Model>> {
        let mut scene = demo::orbital_scene()?;
        for body in &self.bodies {
            let steps = parse_steps(&body.steps).map_err(|source| Error::Body {
                name: body.name.clone(),
                source,
            })?;
            debug!(name = %body.name, model = ?body.model, steps = steps.len(), "adding body");
            scene.push(ScenePart::new(body.name.as_str(), body.model).with_steps(steps));
        }
        Ok(scene)
    }

    /// Build the frame driver, validating every numeric setting up front
    pub fn driver(&self) -> Result<SceneDriver<Model>> {
        self.perspective().validate()?;
        self.home().view_matrix()?;
        self.navigation().validate()?;
        for (field, value) in [
            ("clock.start", self.clock.start),
            ("clock.increment", self.clock.increment),
        ] {
            if !value.is_finite() {
                return Err(Error::NonFinite { field, value });
            }
        }

        let camera = CameraController::new(self.home(), demo::cockpit_rig())
            .with_navigation(self.navigation())
            .with_mode(self.camera.view);
        Ok(SceneDriver::new(self.scene()?, camera)
            .with_clock(self.clock())
            .with_perspective(self.perspective()))
    }
}
