//! Pilot: drive an [`App`] headlessly on a virtual clock.
//!
//! Raw events queued on the pilot go through the app's
//! [`InputTranslator`](crate::event::InputTranslator) exactly as they would
//! in the real frame loop, so key repeats and stick decoding are exercised
//! too. Time only moves when a frame runs.

use std::time::{Duration, Instant};

use crate::app::App;
use crate::event::input::{Command, Event, Key, KeyEvent, Modifiers, MouseButton, PointerAction, PointerEvent};
use crate::geometry::{Offset, Size};
use crate::render::surface::Surface;
use crate::tree::Tree;

/// Headless driver for an [`App`].
pub struct Pilot {
    app: App,
    pending: Vec<Event>,
    start: Instant,
    now: Instant,
    frame_ms: u64,
    frames: u64,
}

impl Pilot {
    /// A pilot over a fresh headless app of `width` x `height` pixels.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_app(App::new_headless(width, height))
    }

    /// A pilot over `app`, stepping one frame of the app's target rate at a time.
    pub fn with_app(app: App) -> Self {
        let now = Instant::now();
        Self {
            frame_ms: 1000 / u64::from(app.config.fps.max(1)),
            app,
            pending: Vec::new(),
            start: now,
            now,
            frames: 0,
        }
    }

    /// Use a fixed frame length of `ms` milliseconds (builder).
    pub fn with_frame_ms(mut self, ms: u64) -> Self {
        self.frame_ms = ms.max(1);
        self
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Queue a raw event for the next frame.
    pub fn send(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Queue a key press with no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.send(Event::Key(KeyEvent::down(key, Modifiers::NONE)));
    }

    /// Queue a key release.
    pub fn release_key(&mut self, key: Key) {
        self.send(Event::Key(KeyEvent::up(key, Modifiers::NONE)));
    }

    /// Press `key` for one frame, then release it for another. Returns the
    /// commands emitted over both frames.
    pub fn tap_key(&mut self, key: Key) -> Vec<Command> {
        self.press_key(key);
        let mut commands = self.frame();
        self.release_key(key);
        commands.extend(self.frame());
        commands
    }

    /// Queue a left click at display position (x, y).
    pub fn click(&mut self, x: i32, y: i32) {
        let pos = Offset::new(x, y);
        self.send(Event::Pointer(PointerEvent::new(PointerAction::Down(MouseButton::Left), pos)));
        self.send(Event::Pointer(PointerEvent::new(PointerAction::Up(MouseButton::Left), pos)));
    }

    /// Queue a display resize.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.send(Event::Resize(Size::new(width, height)));
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Run one frame on the queued events, then advance the clock by one
    /// frame length. Returns the commands the translator emitted.
    pub fn frame(&mut self) -> Vec<Command> {
        let raw = std::mem::take(&mut self.pending);
        let events = self.app.translator.process(raw, self.now).to_vec();
        self.app.frame(&events, self.frame_ms);
        self.now += Duration::from_millis(self.frame_ms);
        self.frames += 1;
        events.iter().filter_map(Event::as_command).collect()
    }

    /// Run frames until at least `ms` milliseconds have passed. Returns every
    /// command emitted meanwhile.
    pub fn wait(&mut self, ms: u64) -> Vec<Command> {
        let mut commands = Vec::new();
        let mut waited = 0;
        while waited < ms && !self.app.should_quit() {
            commands.extend(self.frame());
            waited += self.frame_ms;
        }
        commands
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Borrow the underlying app immutably.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Borrow the underlying app mutably.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn tree(&self) -> &Tree {
        &self.app.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.app.tree
    }

    /// The display as of the last frame.
    pub fn surface(&self) -> &Surface {
        &self.app.surface
    }

    /// Whether the app is still running (has not quit).
    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Virtual milliseconds since the pilot was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.now.duration_since(self.start).as_millis() as u64
    }
}

// ===========================================================================
// Tests
// ===========================================================================
