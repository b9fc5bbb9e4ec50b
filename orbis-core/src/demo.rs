/// The orbital showcase scene: a spacecraft circling a planet, more planets
/// spinning in the distance and a two-piece skybox around everything.
///
/// Time `t` is the animation clock in frames. Rotation rates are in degrees
/// per frame.
use crate::camera::{CameraState, CockpitRig};
use crate::error::Result;
use crate::scene::{SceneGraph, ScenePart};
use crate::transform::{Angle, Step};
use crate::vector::Vec3;

/// Name of the part the cockpit camera rides on
pub const SHIP: &str = "ship";

/// Geometry handles used by the showcase scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Model {
    Skybox,
    Hull,
    Turret,
    Engine,
    Tail,
    Logo,
    WingLeft,
    WingRight,
    Planet,
}

pub fn orbital_scene() -> Result<SceneGraph<Model>> {
    let scene = SceneGraph::new()
        .with_part(skybox("skybox-front", 0.0)?)
        .with_part(skybox("skybox-back", 180.0)?)
        .with_part(spacecraft()?)
        .with_part(planet(
            "earth",
            [
                Step::scale(25.0, 20.0, 20.0),
                Step::translate(0.0, -1.5, -1.0),
                spin(Angle::animated(-3.5, -0.1))?,
            ],
        ))
        .with_part(planet(
            "ember",
            [
                Step::uniform_scale(10.0),
                Step::translate(12.0, 5.0, -20.0),
                spin(Angle::animated(-35.0, -1.0))?,
            ],
        ))
        .with_part(planet(
            "moon",
            [
                Step::uniform_scale(10.0),
                Step::translate(-5.0, 5.0, 10.0),
                spin(Angle::animated(-7.0, -0.2))?,
            ],
        ))
        .with_part(planet(
            "pluto",
            [
                Step::translate(-10.0, 9.0, 0.0),
                Step::uniform_scale(4.0),
                spin(Angle::animated(-3.5, -0.1))?,
            ],
        ));
    Ok(scene)
}

/// Camera seat behind and above the hull, looking past the nose
pub fn cockpit_rig() -> CockpitRig {
    CockpitRig::new(
        SHIP,
        Vec3::new(0.0, 4.0, -16.0),
        Vec3::new(0.0, 1.0, 8.0),
        Vec3::y(),
    )
}

/// Overview pose for the fixed view: looking down `-Z` from 65 units in
/// front of the ship's orbit, level with its centre.
pub fn home_pose() -> CameraState {
    CameraState::new(
        Vec3::new(0.0, -20.0, 65.0),
        Vec3::new(0.0, -20.0, 0.0),
        Vec3::y(),
    )
}

/// Rotation about +Y
fn spin(angle: Angle) -> Result<Step> {
    Step::rotate_animated(angle, 0.0, 1.0, 0.0)
}

fn skybox(name: &str, heading: f32) -> Result<ScenePart<Model>> {
    Ok(ScenePart::new(name, Model::Skybox)
        .with_step(Step::rotate(heading, 0.0, 1.0, 0.0)?)
        .with_step(Step::uniform_scale(20.0)))
}

fn planet(name: &str, steps: [Step; 3]) -> ScenePart<Model> {
    ScenePart::new(name, Model::Planet).with_steps(steps)
}

/// The ship frame orbits a point below the earth's center; the hull is
/// drawn in that frame and every other piece hangs off it.
fn spacecraft() -> Result<ScenePart<Model>> {
    let turret = ScenePart::new("turret", Model::Turret)
        .with_step(Step::translate(0.0, 2.05, 1.4))
        .with_step(spin(Angle::animated(0.0, 0.6))?);

    let engine = ScenePart::new("engine", Model::Engine)
        .with_step(Step::translate(0.0, 0.0, -8.2))
        .with_step(Step::rotate(180.0, 0.0, 1.0, -0.1)?);

    let logo = ScenePart::new("logo", Model::Logo)
        .with_step(Step::translate(0.81, -0.46, 0.0))
        .with_step(Step::scale(1.12, 1.12, 1.0))
        .with_step(Step::rotate_animated(Angle::animated(180.0, 0.3), 0.0, 0.0, 1.0)?);

    let tail = ScenePart::new("tail", Model::Tail)
        .with_step(Step::translate(0.0, 2.98, -7.2))
        .with_step(Step::rotate(270.0, 0.0, 1.0, 0.0)?)
        .with_step(Step::rotate(7.0, 0.0, 0.0, 1.0)?)
        .with_child(logo);

    let wing_left = ScenePart::new("wing-left", Model::WingLeft).with_steps([
        Step::translate(2.8, 0.0, 0.0),
        Step::translate(-0.65, -1.3, -6.0),
        Step::rotate(90.0, 0.0, 1.0, 0.0)?,
        Step::rotate(180.0, 0.0, 0.0, 1.0)?,
        Step::rotate(-22.0, 1.0, 1.0, 0.0)?,
        Step::rotate(-5.0, 0.0, 1.0, 0.0)?,
    ]);

    let wing_right = ScenePart::new("wing-right", Model::WingRight).with_steps([
        Step::translate(-2.1, 0.0, 0.0),
        Step::translate(-0.65, -1.3, -4.2),
        Step::rotate(90.0, 0.0, 1.0, 0.0)?,
        Step::rotate(180.0, 0.0, 0.0, 1.0)?,
        Step::rotate(-22.0, 1.0, 1.0, 0.0)?,
        Step::rotate(210.0, 1.0, 0.0, 0.0)?,
        Step::rotate(-28.0, 0.0, 1.0, 0.0)?,
        Step::rotate(12.0, 0.0, 0.0, 1.0)?,
    ]);

    Ok(ScenePart::new(SHIP, Model::Hull)
        .with_steps([
            Step::uniform_scale(2.0),
            Step::translate(0.0, -10.0, -10.0),
            spin(Angle::animated(0.0, 1.0))?,
            Step::translate(20.0, 0.0, 0.0),
            Step::rotate(180.0, 0.0, 1.0, 0.0)?,
        ])
        .with_child(turret)
        .with_child(engine)
        .with_child(tail)
        .with_child(wing_left)
        .with_child(wing_right))
}
