/// Orbis Core Library - scene composition, cameras and transform math
///
/// This library holds everything that does not touch a display: view and
/// projection matrices, the transform stack, the scene graph and its
/// traversal, the camera state machine and the per-frame driver. Hosts
/// supply a [`Renderer`] and call into [`SceneDriver`].

pub mod camera;
pub mod clock;
pub mod demo;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod stack;
pub mod steps;
pub mod transform;
pub mod vector;
pub mod view;

// Re-export commonly used types
pub use camera::{CameraController, CameraState, CockpitRig, Command, Navigation, ViewMode};
pub use clock::AnimationClock;
pub use demo::Model;
pub use driver::{Input, Renderer, SceneDriver};
pub use error::{Error, ErrorKind, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use projection::{aspect_ratio, perspective, Perspective};
pub use scene::{SceneGraph, ScenePart, Visitor};
pub use stack::TransformStack;
pub use steps::parse_steps;
pub use transform::{Angle, Step, Transform};
pub use vector::Vec3;
pub use view::{look_at, Basis};
