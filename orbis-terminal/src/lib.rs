/// Terminal host for the orbis scene core
///
/// [`TerminalApp`] owns the redraw timer and the terminal. It forwards
/// resize and key events to a [`SceneDriver`] and renders each frame with
/// the [`AsciiRenderer`].
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use orbis_core::{Command, Model, SceneDriver};

pub mod config;
pub mod error;
pub mod renderer;

pub use config::Config;
pub use error::{Error, Result};
pub use renderer::{AsciiRenderer, MeshLibrary};

/// What a key press asks of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    CycleView,
    /// Raw free-fly key code, resolved by the camera
    Code(char),
    Command(Command),
    Ignore,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            KeyCode::Char('v') => Self::CycleView,
            KeyCode::Char(c) => Self::Code(c),
            KeyCode::Up => Self::Command(Command::Forward),
            KeyCode::Down => Self::Command(Command::Back),
            KeyCode::Left => Self::Command(Command::TurnLeft),
            KeyCode::Right => Self::Command(Command::TurnRight),
            KeyCode::PageUp => Self::Command(Command::TurnUp),
            KeyCode::PageDown => Self::Command(Command::TurnDown),
            _ => Self::Ignore,
        }
    }
}

/// Viewport handed to the projection for a terminal of `columns` x `rows`.
///
/// Cells are roughly twice as tall as they are wide, so the height counts
/// double.
pub fn viewport(columns: u16, rows: u16) -> (i32, i32) {
    (i32::from(columns), i32::from(rows) * 2)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    driver: SceneDriver<Model>,
    renderer: AsciiRenderer,
    frame_time: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &Config) -> Result<Self> {
        let driver = config.driver()?;
        let (width, height) = terminal::size()?;

        let mut app = Self {
            driver,
            renderer: AsciiRenderer::new(width as usize, height as usize, MeshLibrary::showcase()),
            frame_time: Duration::from_millis(config.frame_ms.max(1)),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height)?;
        Ok(app)
    }

    pub fn run(&mut self) -> Result<()> {
        let frame_ms = self.frame_time.as_millis() as u64;
        info!(frame_ms, "starting terminal host");
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!(frames = self.driver.frames(), "terminal host stopped");
        result
    }

    fn main_loop(&mut self) -> Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Queue every pending event; the driver applies them at frame start
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }
            if !self.running {
                break;
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            } else {
                trace!(?elapsed, "frame overran its slot");
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => self.resize(width, height)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match KeyAction::from_key(code) {
            KeyAction::Quit => self.running = false,
            KeyAction::CycleView => self.driver.on_cycle_view(),
            KeyAction::Code(c) => self.driver.on_directional_command(c),
            KeyAction::Command(command) => self.driver.on_command(command),
            KeyAction::Ignore => trace!(?code, "ignoring key"),
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.renderer.resize(width as usize, height as usize);
        if width == 0 || height == 0 {
            warn!(width, height, "terminal has no area, keeping previous projection");
            return Ok(());
        }
        let (w, h) = viewport(width, height);
        debug!(width, height, "terminal resized");
        self.driver.on_resize(w, h, &mut self.renderer)?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.renderer.clear();
        self.driver.on_frame(&mut self.renderer)?;

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.present(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Orbis | FPS: {:.1} | View: {:?} | V=View WASD/IJKL/Arrows=Fly Q=Quit",
                self.fps,
                self.driver.camera().mode()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyAction::from_key(KeyCode::Esc), KeyAction::Quit);
        assert_eq!(KeyAction::from_key(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(KeyAction::from_key(KeyCode::Char('v')), KeyAction::CycleView);
        assert_eq!(KeyAction::from_key(KeyCode::Char('w')), KeyAction::Code('w'));
        assert_eq!(
            KeyAction::from_key(KeyCode::Left),
            KeyAction::Command(Command::TurnLeft)
        );
        assert_eq!(KeyAction::from_key(KeyCode::Tab), KeyAction::Ignore);
    }

    #[test]
    fn test_viewport_corrects_cell_aspect() {
        assert_eq!(viewport(80, 24), (80, 48));
    }

    #[test]
    fn test_driver_renders_showcase_offscreen() {
        let mut driver = Config::default().driver().unwrap();
        let mut renderer = AsciiRenderer::new(80, 24, MeshLibrary::showcase());
        let (w, h) = viewport(80, 24);
        driver.on_resize(w, h, &mut renderer).unwrap();

        for _ in 0..3 {
            renderer.clear();
            driver.on_frame(&mut renderer).unwrap();
        }
        assert!(renderer.triangles() > 0);
        assert!(renderer.covered() > 0);

        driver.on_cycle_view();
        renderer.clear();
        driver.on_frame(&mut renderer).unwrap();
        assert!(renderer.covered() > 0);
    }
}
