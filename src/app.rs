//! App struct: frame loop, root event handling, frame pacing.
//!
//! [`App`] ties together the node tree, the display surface, the input
//! translator and the terminal driver. The `new_headless` constructor allows
//! testing without a real terminal; the [`Pilot`](crate::testing::Pilot)
//! drives it one [`frame`](App::frame) at a time.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::Result;
use crate::event::controls::InputTranslator;
use crate::event::input::{Command, Event};
use crate::geometry::Size;
use crate::render::driver::Driver;
use crate::render::surface::Surface;
use crate::settings::Settings;
use crate::tree::Tree;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Target frames per second for the frame loop.
    pub fps: u32,
    /// Pixels per terminal cell.
    pub cell: Size,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            cell: Size::new(4, 8),
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `[window] fps`, `cell_width` and `cell_height`.
    pub fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        Self {
            fps: settings.get("window", "fps", d.fps),
            cell: Size::new(
                settings.get("window", "cell_width", d.cell.width),
                settings.get("window", "cell_height", d.cell.height),
            ),
        }
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the cell size (builder).
    pub fn with_cell(mut self, cell: Size) -> Self {
        self.cell = cell;
        self
    }
}

// ---------------------------------------------------------------------------
// FrameClock
// ---------------------------------------------------------------------------

/// Caps the loop at a target frame rate and measures frame times.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: Duration,
    last: Instant,
}

impl FrameClock {
    /// A clock for `fps` frames per second. Zero is treated as one.
    pub fn new(fps: u32) -> Self {
        Self {
            frame: Duration::from_secs(1) / fps.max(1),
            last: Instant::now(),
        }
    }

    /// The minimum duration of one frame.
    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Milliseconds since the previous [`advance`](Self::advance).
    pub fn elapsed_ms(&self) -> u64 {
        self.last.elapsed().as_millis() as u64
    }

    /// Sleep out the rest of the current frame. Returns the length of the
    /// frame that just ended in milliseconds.
    pub fn advance(&mut self) -> u64 {
        let due = self.last + self.frame;
        let now = Instant::now();
        if now < due {
            thread::sleep(due - now);
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_millis() as u64
    }

    /// Restart timing from now.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
///
/// Owns the tree, the display surface, the input translator and the driver.
/// The driver is optional to support headless testing.
pub struct App {
    /// The node tree.
    pub tree: Tree,
    /// The composited display.
    pub surface: Surface,
    /// Raw input to commands.
    pub translator: InputTranslator,
    /// Terminal driver. `None` in headless mode.
    pub driver: Option<Driver>,
    /// Application configuration.
    pub config: AppConfig,
    clock: FrameClock,
    elapsed_ms: u64,
    running: bool,
}

impl App {
    /// Create a new app with a real terminal driver.
    ///
    /// Queries the terminal size to set the initial display size. The
    /// terminal itself is only taken over by [`run`](Self::run).
    pub fn new(config: AppConfig, translator: InputTranslator) -> Result<Self> {
        let driver = Driver::new(config.cell);
        let size = driver.display_size()?;
        info!("display {}x{} px at {} fps", size.width, size.height, config.fps);
        let mut app = Self::with_size(size, config, translator);
        app.driver = Some(driver);
        Ok(app)
    }

    /// Create a headless app for testing (no terminal driver).
    pub fn new_headless(width: i32, height: i32) -> Self {
        Self::with_size(Size::new(width, height), AppConfig::default(), InputTranslator::default())
    }

    fn with_size(size: Size, config: AppConfig, translator: InputTranslator) -> Self {
        Self {
            tree: Tree::new(size),
            surface: Surface::new(size),
            translator,
            driver: None,
            clock: FrameClock::new(config.fps),
            config,
            elapsed_ms: 0,
            running: true,
        }
    }

    /// Whether the app should quit.
    pub fn should_quit(&self) -> bool {
        !self.running
    }

    /// Request the app to quit. The current frame is finished first.
    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Whether the app has a terminal driver (not headless).
    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Resize the display and redraw everything.
    pub fn resize(&mut self, size: Size) {
        if size == self.surface.size() {
            return;
        }
        info!("display resized to {}x{} px", size.width, size.height);
        self.surface = Surface::new(size);
        self.tree.resize(size);
    }

    /// Run one frame on already translated `events`: ticks, routing, draw.
    ///
    /// Returns `true` if the surface was redrawn and should be presented.
    /// Stops early, without drawing, once an exit has been requested.
    pub fn frame(&mut self, events: &[Event], elapsed_ms: u64) -> bool {
        self.tree.process_tick(elapsed_ms);
        if self.should_quit() {
            return false;
        }

        for event in self.tree.route_all(events) {
            self.handle_unconsumed(&event);
        }
        if self.should_quit() {
            return false;
        }

        self.tree.draw(&mut self.surface)
    }

    /// Root handling of events no node consumed.
    fn handle_unconsumed(&mut self, event: &Event) {
        match event {
            Event::Resize(size) => self.resize(*size),
            Event::Restored => {
                let root = self.tree.root();
                self.tree.mark_dirty(root);
            }
            Event::Quit => self.request_quit(),
            Event::Command(c) if c.command == Command::Exit => {
                debug!("exit requested by {:?}", c.origin);
                self.request_quit();
            }
            _ => {}
        }
    }

    /// Take over the terminal and run the frame loop until exit.
    ///
    /// The terminal is restored even when the loop fails. Platform errors
    /// are fatal and returned.
    pub fn run(&mut self) -> Result<()> {
        let mut driver = self
            .driver
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no terminal driver"))?;
        driver.enter()?;
        let result = self.run_with(&mut driver);
        let restored = driver.leave();
        self.driver = Some(driver);
        result?;
        restored?;
        Ok(())
    }

    fn run_with(&mut self, driver: &mut Driver) -> Result<()> {
        self.clock.reset();
        while self.running {
            let events = self.translator.update(driver)?.to_vec();
            if self.frame(&events, self.elapsed_ms) {
                driver.present(&self.surface)?;
            }
            self.elapsed_ms = self.clock.advance();
        }
        info!("frame loop stopped");
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
