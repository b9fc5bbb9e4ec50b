/// Camera state and navigation
///
/// The controller is a small state machine over three view modes. Only the
/// free-fly mode reacts to directional commands; the cockpit mode re-derives
/// its pose from a tracked scene part every frame and the fixed mode never
/// moves.
use nalgebra::{Matrix4, Point3, Rotation3, Unit};
use tracing::{debug, trace};

use crate::clock::AnimationClock;
use crate::error::{Error, Result};
use crate::scene::SceneGraph;
use crate::vector::{normalize, Vec3};
use crate::view::{look_at, Basis};

/// Default free-fly turn step in radians
pub const TURN_STEP: f32 = 0.1;
/// Default free-fly move step in world units
pub const MOVE_STEP: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ViewMode {
    Fixed,
    Cockpit,
    FreeFly,
}

impl ViewMode {
    /// Every mode, in cycle order
    pub const ALL: [ViewMode; 3] = [ViewMode::Fixed, ViewMode::Cockpit, ViewMode::FreeFly];

    pub fn next(self) -> Self {
        match self {
            Self::Fixed => Self::Cockpit,
            Self::Cockpit => Self::FreeFly,
            Self::FreeFly => Self::Fixed,
        }
    }
}

/// Discrete free-fly input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    TurnUp,
    TurnDown,
}

impl Command {
    /// Map a key code to a command; anything unmapped yields `None`
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'w' => Some(Self::Forward),
            's' => Some(Self::Back),
            'a' => Some(Self::StrafeLeft),
            'd' => Some(Self::StrafeRight),
            'j' => Some(Self::TurnLeft),
            'l' => Some(Self::TurnRight),
            'i' => Some(Self::TurnUp),
            'k' => Some(Self::TurnDown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CameraState {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { eye, target, up }
    }

    pub fn basis(&self) -> Result<Basis> {
        Basis::new(&self.eye, &self.target, &self.up)
    }

    pub fn view_matrix(&self) -> Result<Matrix4<f32>> {
        look_at(&self.eye, &self.target, &self.up)
    }

    /// Distance between eye and target
    pub fn reach(&self) -> f32 {
        (self.target - self.eye).norm()
    }
}

/// Camera mounted on a scene part.
///
/// `eye`, `target` and `up` are expressed in the part's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CockpitRig {
    pub part: String,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl CockpitRig {
    pub fn new(part: impl Into<String>, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            part: part.into(),
            eye,
            target,
            up,
        }
    }

    /// World-space pose for the part's current transform
    pub fn pose(&self, world: &Matrix4<f32>) -> Result<CameraState> {
        let eye = world.transform_point(&Point3::from(self.eye)).coords;
        let target = world.transform_point(&Point3::from(self.target)).coords;
        let up = normalize(&world.transform_vector(&self.up))?;
        Ok(CameraState::new(eye, target, up))
    }
}

/// Free-fly step sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Navigation {
    /// Radians per turn command
    pub turn_step: f32,
    /// World units per move command
    pub move_step: f32,
}

impl Navigation {
    /// Both steps must be finite, or a single command would poison the pose
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("turn_step", self.turn_step), ("move_step", self.move_step)] {
            if !value.is_finite() {
                return Err(Error::InvalidNavigation(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            turn_step: TURN_STEP,
            move_step: MOVE_STEP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraController {
    mode: ViewMode,
    state: CameraState,
    home: CameraState,
    rig: CockpitRig,
    navigation: Navigation,
}

impl CameraController {
    /// Start in the fixed view at `home`
    pub fn new(home: CameraState, rig: CockpitRig) -> Self {
        Self {
            mode: ViewMode::Fixed,
            state: home,
            home,
            rig,
            navigation: Navigation::default(),
        }
    }

    pub fn with_navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.enter(mode);
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn rig(&self) -> &CockpitRig {
        &self.rig
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    /// Advance to the next view mode
    pub fn cycle_view(&mut self) -> ViewMode {
        self.enter(self.mode.next());
        self.mode
    }

    fn enter(&mut self, mode: ViewMode) {
        debug!(from = ?self.mode, to = ?mode, "switching view");
        // Free-fly starts from the current pose, cockpit is recomputed next frame
        if mode == ViewMode::Fixed {
            self.state = self.home;
        }
        self.mode = mode;
    }

    /// Apply a raw key code, ignoring codes without a command
    pub fn handle_code(&mut self, code: char) -> Result<()> {
        match Command::from_code(code) {
            Some(command) => self.apply(command),
            None => {
                trace!(?code, "ignoring unmapped key");
                Ok(())
            }
        }
    }

    /// Apply one free-fly step. Outside free-fly this is a no-op.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        if self.mode != ViewMode::FreeFly {
            trace!(?command, mode = ?self.mode, "ignoring command outside free-fly");
            return Ok(());
        }

        let basis = self.state.basis()?;
        let Navigation {
            turn_step,
            move_step,
        } = self.navigation;

        match command {
            Command::TurnLeft => self.turn(&basis, basis.y, turn_step),
            Command::TurnRight => self.turn(&basis, basis.y, -turn_step),
            Command::TurnUp => self.turn(&basis, basis.x, turn_step),
            Command::TurnDown => self.turn(&basis, basis.x, -turn_step),
            Command::Forward => self.shift(basis.forward() * move_step),
            Command::Back => self.shift(-basis.forward() * move_step),
            Command::StrafeLeft => self.shift(-basis.x * move_step),
            Command::StrafeRight => self.shift(basis.x * move_step),
        }
        trace!(?command, eye = ?self.state.eye, target = ?self.state.target, "camera moved");
        Ok(())
    }

    /// Rotate the target about the eye, carrying the up vector along
    fn turn(&mut self, basis: &Basis, axis: Vec3, angle: f32) {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
        let look = self.state.target - self.state.eye;
        self.state.target = self.state.eye + rotation * look;
        self.state.up = rotation * basis.y;
    }

    fn shift(&mut self, offset: Vec3) {
        self.state.eye += offset;
        self.state.target += offset;
    }

    /// Per-frame update; only the cockpit view depends on the scene
    pub fn update<G>(&mut self, scene: &SceneGraph<G>, clock: &AnimationClock) -> Result<()> {
        if self.mode == ViewMode::Cockpit {
            let world = scene.world_transform(&self.rig.part, clock.value())?;
            self.state = self.rig.pose(&world)?;
        }
        Ok(())
    }

    pub fn view_matrix(&self) -> Result<Matrix4<f32>> {
        self.state.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ScenePart;
    use crate::transform::{Angle, Step};

    fn canonical() -> CameraState {
        CameraState::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), Vec3::y())
    }

    fn rig() -> CockpitRig {
        CockpitRig::new(
            "ship",
            Vec3::new(0.0, 1.0, -4.0),
            Vec3::new(0.0, 1.0, 4.0),
            Vec3::y(),
        )
    }

    fn free_fly(home: CameraState) -> CameraController {
        CameraController::new(home, rig()).with_mode(ViewMode::FreeFly)
    }

    #[test]
    fn test_cycle_visits_every_mode() {
        let mut camera = CameraController::new(canonical(), rig());
        let mut seen = vec![camera.mode()];
        for _ in 1..ViewMode::ALL.len() {
            seen.push(camera.cycle_view());
        }
        assert_eq!(seen, ViewMode::ALL);
        assert_eq!(camera.cycle_view(), ViewMode::Fixed);
    }

    #[test]
    fn test_turns_preserve_reach() {
        let home = CameraState::new(
            Vec3::new(3.0, -2.0, 10.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::y(),
        );
        let mut camera = free_fly(home);
        let reach = home.reach();

        let turns = [
            Command::TurnLeft,
            Command::TurnUp,
            Command::TurnUp,
            Command::TurnRight,
            Command::TurnDown,
            Command::TurnLeft,
        ];
        for (i, command) in turns.iter().cycle().take(300).enumerate() {
            camera.apply(*command).unwrap();
            assert!(
                (camera.state().reach() - reach).abs() < 1e-3,
                "reach drifted after {} turns",
                i + 1
            );
        }
        assert_eq!(camera.state().eye, home.eye);
    }

    #[test]
    fn test_turn_left_looks_left() {
        let mut camera = free_fly(canonical());
        camera.apply(Command::TurnLeft).unwrap();
        let target = camera.state().target;
        assert!(target.x < 0.0);
        assert!(target.y.abs() < 1e-6);
        assert!((target.x + TURN_STEP.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_pitching_past_vertical_keeps_a_valid_basis() {
        let mut camera = free_fly(canonical());
        for _ in 0..40 {
            camera.apply(Command::TurnUp).unwrap();
            camera.view_matrix().unwrap();
        }
        assert!((camera.state().reach() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_moves_translate_eye_and_target() {
        let mut camera = free_fly(canonical());
        let look = camera.state().target - camera.state().eye;

        camera.apply(Command::Forward).unwrap();
        camera.apply(Command::Forward).unwrap();
        camera.apply(Command::StrafeRight).unwrap();

        let state = camera.state();
        assert!((state.eye - Vec3::new(MOVE_STEP, 0.0, -2.0 * MOVE_STEP)).norm() < 1e-5);
        assert!((state.target - state.eye - look).norm() < 1e-5);

        camera.apply(Command::Back).unwrap();
        camera.apply(Command::Back).unwrap();
        camera.apply(Command::StrafeLeft).unwrap();
        assert!(camera.state().eye.norm() < 1e-5);
    }

    #[test]
    fn test_unmapped_codes_are_ignored() {
        let mut camera = free_fly(canonical());
        for code in ['x', '7', ' ', '\u{1b}'] {
            camera.handle_code(code).unwrap();
        }
        assert_eq!(*camera.state(), canonical());

        camera.handle_code('W').unwrap();
        assert!(camera.state().eye.z < 0.0);
    }

    #[test]
    fn test_commands_ignored_outside_free_fly() {
        let mut camera = CameraController::new(canonical(), rig());
        camera.apply(Command::Forward).unwrap();
        camera.apply(Command::TurnLeft).unwrap();
        assert_eq!(*camera.state(), canonical());
    }

    #[test]
    fn test_fixed_resets_to_home() {
        let mut camera = free_fly(canonical());
        camera.apply(Command::Forward).unwrap();
        assert_ne!(*camera.state(), canonical());

        while camera.mode() != ViewMode::Fixed {
            camera.cycle_view();
        }
        assert_eq!(*camera.state(), canonical());
    }

    #[test]
    fn test_cockpit_follows_tracked_part() {
        let orbit = Step::rotate_animated(Angle::animated(0.0, 90.0), 0.0, 1.0, 0.0).unwrap();
        let scene = SceneGraph::new().with_part(
            ScenePart::group("pivot")
                .with_step(orbit)
                .with_child(ScenePart::new("ship", ()).with_step(Step::translate(10.0, 0.0, 0.0))),
        );

        let mut camera = CameraController::new(canonical(), rig()).with_mode(ViewMode::Cockpit);
        let mut clock = AnimationClock::new(0.0, 1.0);

        camera.update(&scene, &clock).unwrap();
        assert!((camera.state().eye - Vec3::new(10.0, 1.0, -4.0)).norm() < 1e-5);

        clock.advance();
        camera.update(&scene, &clock).unwrap();
        // A quarter turn about +Y carries (10, 1, -4) to (-4, 1, -10)
        assert!((camera.state().eye - Vec3::new(-4.0, 1.0, -10.0)).norm() < 1e-4);
        assert!((camera.state().up - Vec3::y()).norm() < 1e-5);
        camera.view_matrix().unwrap();
    }

    #[test]
    fn test_navigation_must_be_finite() {
        assert!(Navigation::default().validate().is_ok());
        for (turn_step, move_step) in [(f32::NAN, 1.0), (0.1, f32::INFINITY)] {
            let navigation = Navigation {
                turn_step,
                move_step,
            };
            let err = navigation.validate().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Parameter);
        }
    }

    #[test]
    fn test_cockpit_requires_tracked_part() {
        let scene: SceneGraph<()> = SceneGraph::new();
        let mut camera = CameraController::new(canonical(), rig()).with_mode(ViewMode::Cockpit);
        assert_eq!(
            camera.update(&scene, &AnimationClock::default()),
            Err(Error::UnknownPart("ship".into()))
        );
    }
}
