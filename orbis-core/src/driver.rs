/// Frame-level entry points for a host application
///
/// A host owns the window, timer and input devices. It calls
/// [`SceneDriver::on_resize`] when the viewport changes, queues input as it
/// arrives and calls [`SceneDriver::on_frame`] once per tick. Everything
/// stateful (camera, clock, transform stack) lives here rather than in
/// globals, and input is only applied at the start of a frame.
use std::collections::VecDeque;

use nalgebra::Matrix4;
use tracing::{debug, trace, warn};

use crate::camera::{CameraController, Command};
use crate::clock::AnimationClock;
use crate::error::Result;
use crate::projection::{aspect_ratio, Perspective};
use crate::scene::{SceneGraph, Visitor};
use crate::stack::TransformStack;

/// Side effects the core asks of a rasterizer
pub trait Renderer<G>: Visitor<G> {
    fn set_projection(&mut self, projection: &Matrix4<f32>);
    fn set_view(&mut self, view: &Matrix4<f32>);
}

/// Input queued between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Raw key code, possibly unmapped
    Key(char),
    Command(Command),
    CycleView,
}

#[derive(Debug, Clone)]
pub struct SceneDriver<G> {
    scene: SceneGraph<G>,
    camera: CameraController,
    clock: AnimationClock,
    perspective: Perspective,
    stack: TransformStack,
    pending: VecDeque<Input>,
    frames: u64,
}

impl<G> SceneDriver<G> {
    pub fn new(scene: SceneGraph<G>, camera: CameraController) -> Self {
        Self {
            scene,
            camera,
            clock: AnimationClock::default(),
            perspective: Perspective::default(),
            stack: TransformStack::new(),
            pending: VecDeque::new(),
            frames: 0,
        }
    }

    pub fn with_clock(mut self, clock: AnimationClock) -> Self {
        self.clock = clock;
        self
    }

    /// Field of view and clip planes; the aspect ratio is replaced on resize
    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn scene(&self) -> &SceneGraph<G> {
        &self.scene
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn perspective(&self) -> &Perspective {
        &self.perspective
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Inputs waiting for the next frame
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Rebuild and install the projection for a new viewport size
    pub fn on_resize<R>(&mut self, width: i32, height: i32, renderer: &mut R) -> Result<()>
    where
        R: Renderer<G> + ?Sized,
    {
        let perspective = Perspective {
            aspect: aspect_ratio(width, height),
            ..self.perspective
        };
        let projection = perspective.matrix()?;
        debug!(width, height, aspect = perspective.aspect, "installing projection");

        self.perspective = perspective;
        renderer.set_projection(&projection);
        Ok(())
    }

    pub fn on_directional_command(&mut self, code: char) {
        self.pending.push_back(Input::Key(code));
    }

    pub fn on_command(&mut self, command: Command) {
        self.pending.push_back(Input::Command(command));
    }

    pub fn on_cycle_view(&mut self) {
        self.pending.push_back(Input::CycleView);
    }

    /// Render one frame: apply queued input, advance time, place the camera
    /// and draw every scene part.
    pub fn on_frame<R>(&mut self, renderer: &mut R) -> Result<()>
    where
        R: Renderer<G> + ?Sized,
    {
        self.drain_input()?;

        self.clock.advance();
        self.camera.update(&self.scene, &self.clock)?;

        let view = self.camera.view_matrix()?;
        renderer.set_view(&view);

        self.stack.reset(view);
        self.scene.traverse(&mut self.stack, &self.clock, renderer)?;

        self.frames += 1;
        trace!(frame = self.frames, t = self.clock.value(), "frame complete");
        Ok(())
    }

    /// Apply every queued input. A failing input does not stop the ones
    /// behind it; the first failure is returned once the queue is empty.
    fn drain_input(&mut self) -> Result<()> {
        let mut first = None;
        while let Some(input) = self.pending.pop_front() {
            let result = match input {
                Input::Key(code) => self.camera.handle_code(code),
                Input::Command(command) => self.camera.apply(command),
                Input::CycleView => {
                    self.camera.cycle_view();
                    Ok(())
                }
            };
            if let Err(err) = result {
                warn!(?input, %err, "input failed");
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
