/// Terminal front end: ASCII rendering with mouse-driven head tracking
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use gazer_core::{HeadTrackingApp, SceneConfig, SceneGraph, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_HEIGHT: f32 = 2.0;
/// Orbit applied per arrow key press, in cell widths
const KEY_ORBIT_STEP: f32 = 2.0;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    app: HeadTrackingApp,
    renderer: AsciiRenderer,
    background: Color,
    running: bool,
    target_frame_time: Duration,
    drag_from: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Set up for the current terminal size. `scene` defaults to the
    /// built-in lizard.
    pub fn new(config: SceneConfig, scene: Option<SceneGraph>, fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, scene, fps, width, height)
    }

    pub fn with_size(
        config: SceneConfig,
        scene: Option<SceneGraph>,
        fps: u32,
        width: u16,
        height: u16,
    ) -> io::Result<Self> {
        let viewport = cell_viewport(width, height)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let [r, g, b] = config.render.background.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let app = match scene {
            Some(scene) => HeadTrackingApp::new(config, scene, viewport),
            None => HeadTrackingApp::with_lizard(config, viewport),
        };

        Ok(Self {
            app,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            background: Color::Rgb { r, g, b },
            running: true,
            target_frame_time: Duration::from_millis(1000 / u64::from(fps.max(1))),
            drag_from: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn app(&self) -> &HeadTrackingApp {
        &self.app
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain input; pointer moves land between frames
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update and render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
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

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.handle_resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => self.app.orbit(0.0, -KEY_ORBIT_STEP * CELL_HEIGHT),
            KeyCode::Char('s') | KeyCode::Down => self.app.orbit(0.0, KEY_ORBIT_STEP * CELL_HEIGHT),
            KeyCode::Char('a') | KeyCode::Left => self.app.orbit(-KEY_ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.app.orbit(KEY_ORBIT_STEP, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.app.zoom(1.0),
            KeyCode::Char('-') => self.app.zoom(-1.0),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => self.track(column, row),
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((column, row));
                self.track(column, row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((from_column, from_row)) = self.drag_from {
                    let dx = f32::from(column) - f32::from(from_column);
                    let dy = (f32::from(row) - f32::from(from_row)) * CELL_HEIGHT;
                    self.app.orbit(dx, dy);
                }
                self.drag_from = Some((column, row));
                self.track(column, row);
            }
            MouseEventKind::Drag(_) => self.track(column, row),
            MouseEventKind::Up(_) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.app.zoom(1.0),
            MouseEventKind::ScrollDown => self.app.zoom(-1.0),
            _ => {}
        }
    }

    fn track(&mut self, column: u16, row: u16) {
        // Sample the middle of the cell, in half-cell-height units
        let x = f32::from(column) + 0.5;
        let y = (f32::from(row) + 0.5) * CELL_HEIGHT;
        self.app.pointer_move(x, y);
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        match self
            .app
            .resize(f32::from(width), f32::from(height) * CELL_HEIGHT)
        {
            Ok(()) => self.renderer.resize(width as usize, height as usize),
            Err(e) => tracing::warn!("ignoring resize: {e}"),
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let report = match self.app.frame(&mut self.renderer) {
            Ok(report) => report,
            Err(never) => match never {},
        };

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout, self.background)?;

        // Draw UI overlay
        let pointer = self.app.pointer().position;
        let neck = report
            .neck
            .map(|n| format!("neck x {:+.2} z {:+.2}", n.x, n.z))
            .unwrap_or_else(|| "no neck".to_string());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Gazer | FPS: {:.1} | pointer ({:+.2}, {:+.2}, {:+.2}) | {} | Mouse=Look Drag/WASD=Orbit Scroll/+-=Zoom Q=Quit",
                self.fps, pointer.x, pointer.y, pointer.z, neck
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn cell_viewport(width: u16, height: u16) -> gazer_core::Result<Viewport> {
    Viewport::new(f32::from(width), f32::from(height) * CELL_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    fn app() -> TerminalApp {
        TerminalApp::with_size(SceneConfig::default(), None, 30, 120, 40).unwrap()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_viewport_uses_cell_height() {
        let app = app();
        let viewport = app.app().viewport();
        assert_eq!(viewport.width, 120.0);
        assert_eq!(viewport.height, 80.0);
        assert!((app.app().camera().aspect - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mouse_move_tracks_pointer() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Moved, 59, 19));
        let p = app.app().pointer().position;
        // Centre cell of a 120x40 grid sits on the view axis
        assert!(p.x.abs() < 0.1 && p.y.abs() < 0.1, "{p:?}");

        app.handle_event(mouse(MouseEventKind::Moved, 100, 5));
        assert_ne!(app.app().pointer().position, p);
    }

    #[test]
    fn test_left_drag_orbits() {
        let mut app = app();
        let before = app.app().camera().position;
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 10));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 30, 10));
        assert!((app.app().camera().position - before).norm() > 1e-3);
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!app.is_running());
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut app = app();
        app.handle_event(Event::Resize(0, 0));
        assert_eq!(app.app().viewport().width, 120.0);
        app.handle_event(Event::Resize(80, 24));
        assert_eq!(app.app().viewport().height, 48.0);
    }

    #[test]
    fn test_frame_renders_lizard() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Moved, 70, 15));
        let report = app.app.frame(&mut app.renderer).unwrap();
        assert!(report.head_aimed);
        let drawn = (0..120)
            .flat_map(|x| (0..40).map(move |y| (x, y)))
            .filter(|&(x, y)| app.renderer.cell(x, y).is_some())
            .count();
        assert!(drawn > 0);
    }
}
