//! Input translation: raw device events to at most one command per tick.
//!
//! [`InputTranslator`] drains an [`EventSource`] once per frame, passes the raw
//! events through for the node tree and appends a synthesized
//! [`Event::Command`] when a bound key, button, hat or stick produced one.
//! Held directional inputs auto-repeat: the first repeat fires after
//! [`RepeatTiming::first`], then every [`RepeatTiming::interval`] measured from
//! the previous emission.
//!
//! Analog sticks are decoded per axis with three bands (see
//! [`AnalogThresholds`]); only one axis at a time owns the command stream.

use std::io;
use std::time::{Duration, Instant};

use log::info;

use super::binding::CommandMap;
use super::input::{pad, Command, Event, KeyEvent, Source};
use super::EventSource;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Auto-repeat delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTiming {
    /// Hold time before the first repeat.
    pub first: Duration,
    /// Time between later repeats.
    pub interval: Duration,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            interval: Duration::from_millis(200),
        }
    }
}

impl RepeatTiming {
    /// Read `[input] repeat_first_ms` and `repeat_interval_ms`.
    pub fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        Self {
            first: Duration::from_millis(settings.get("input", "repeat_first_ms", d.first.as_millis() as u64)),
            interval: Duration::from_millis(settings.get(
                "input",
                "repeat_interval_ms",
                d.interval.as_millis() as u64,
            )),
        }
    }
}

/// Magnitude bands for analog stick decoding.
///
/// A deflection at or above `dead_zone` picks a direction. Above `press` the
/// direction is pressed; below `release` (which includes the dead zone) it is
/// released; in between nothing changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogThresholds {
    pub dead_zone: f32,
    pub press: f32,
    pub release: f32,
}

impl Default for AnalogThresholds {
    fn default() -> Self {
        Self {
            dead_zone: 0.1,
            press: 0.8,
            release: 0.5,
        }
    }
}

impl AnalogThresholds {
    /// Read `[input] dead_zone`, `press` and `release`.
    pub fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        Self {
            dead_zone: settings.get("input", "dead_zone", d.dead_zone),
            press: settings.get("input", "press", d.press),
            release: settings.get("input", "release", d.release),
        }
    }

    /// Decode a stick vector (`y > 0` is up) into a band decision.
    pub fn decode(&self, x: f32, y: f32) -> Analog {
        let mut direction = None;
        if x <= -self.dead_zone {
            direction = Some((Command::Left, -x));
        }
        if x >= self.dead_zone {
            direction = Some((Command::Right, x));
        }
        if y >= self.dead_zone {
            direction = Some((Command::Up, y));
        }
        if y <= -self.dead_zone {
            direction = Some((Command::Down, -y));
        }
        match direction {
            Some((command, value)) if value > self.press => Analog::Press(command, value),
            Some((_, value)) if value >= self.release => Analog::Hold,
            _ => Analog::Release,
        }
    }
}

/// Outcome of decoding one analog sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Analog {
    /// Deflected past the press threshold, with its magnitude.
    Press(Command, f32),
    /// Between the bands: keep whatever state there is.
    Hold,
    /// Back near the centre.
    Release,
}

// ---------------------------------------------------------------------------
// InputTranslator
// ---------------------------------------------------------------------------

/// The command currently held down.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Held {
    command: Command,
    source: Source,
    pressed_at: Instant,
    last_repeat: Option<Instant>,
}

/// Turns raw platform events into the per-tick event list.
#[derive(Debug)]
pub struct InputTranslator {
    map: CommandMap,
    timing: RepeatTiming,
    analog: AnalogThresholds,
    wait_timeout: Duration,
    held: Option<Held>,
    /// The axis driving the command stream and the command it produced.
    last_axis: Option<(u8, Command)>,
    events: Vec<Event>,
}

impl InputTranslator {
    pub fn new(map: CommandMap) -> Self {
        Self {
            map,
            timing: RepeatTiming::default(),
            analog: AnalogThresholds::default(),
            wait_timeout: Duration::from_millis(5000),
            held: None,
            last_axis: None,
            events: Vec::new(),
        }
    }

    /// A translator with the standard bindings and timings from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(CommandMap::with_defaults())
            .with_timing(RepeatTiming::from_settings(settings))
            .with_analog(AnalogThresholds::from_settings(settings))
            .with_wait_timeout(Duration::from_millis(settings.get("window", "wait_timeout_ms", 5000u64)))
    }

    pub fn with_timing(mut self, timing: RepeatTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_analog(mut self, analog: AnalogThresholds) -> Self {
        self.analog = analog;
        self
    }

    /// How long [`update`](Self::update) may block when nothing is held.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn command_map(&self) -> &CommandMap {
        &self.map
    }

    /// The command being held, if any.
    pub fn held_command(&self) -> Option<Command> {
        self.held.map(|h| h.command)
    }

    /// The events produced by the last update.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain `source` and translate.
    ///
    /// Blocks up to the wait timeout for the first event, but only while no
    /// command is held, so repeats keep firing on time.
    pub fn update(&mut self, source: &mut dyn EventSource) -> io::Result<&[Event]> {
        let mut raw = Vec::new();
        if self.held.is_none() {
            if let Some(event) = source.wait(self.wait_timeout)? {
                raw.push(event);
            }
        }
        while let Some(event) = source.poll()? {
            raw.push(event);
        }
        Ok(self.process(raw, Instant::now()))
    }

    /// Translate one tick worth of raw events observed at `now`.
    pub fn process(&mut self, raw: Vec<Event>, now: Instant) -> &[Event] {
        self.events = raw;
        for event in &self.events {
            match event {
                Event::JoyDevice { id, added: true } => info!("game controller {id} connected"),
                Event::JoyDevice { id, added: false } => info!("game controller {id} disconnected"),
                _ => {}
            }
        }

        self.synthesize(now);

        if let Some(command) = self.repeat(now) {
            if !self.has_command() {
                self.events.push(command);
            }
        }
        &self.events
    }

    fn synthesize(&mut self, now: Instant) {
        let mut axis = self.last_axis.map(|(a, _)| a);
        let mut axis_press: Option<(u8, Command, f32)> = None;
        let mut axis_released = false;

        let raw = self.events.clone();
        for event in &raw {
            match *event {
                Event::Key(KeyEvent { code, pressed: true, modifiers }) => {
                    let key = KeyEvent::down(code, modifiers);
                    if let Some(command) = self.map.key_command(&key) {
                        self.emit(command, Source::Key(code), now);
                    }
                }
                Event::Key(KeyEvent { code, pressed: false, .. }) => self.release(Some(Source::Key(code))),
                Event::JoyButton { button, pressed: true } => {
                    if let Some(command) = self.map.button_command(button) {
                        self.emit(command, Source::Button(button), now);
                    }
                }
                Event::JoyButton { button, pressed: false } => self.release(Some(Source::Button(button))),
                Event::JoyHat { hat, x, y } => match self.analog.decode(f32::from(x), f32::from(y)) {
                    Analog::Press(command, _) => self.emit(command, Source::Hat(hat), now),
                    _ => self.release(Some(Source::Hat(hat))),
                },
                Event::JoyAxis { axis: id, value } => {
                    let decoded = match id {
                        pad::AXIS_LEFT_X => self.analog.decode(value, 0.0),
                        pad::AXIS_LEFT_Y => self.analog.decode(0.0, -value),
                        _ => Analog::Hold,
                    };
                    match decoded {
                        Analog::Release if axis.is_none() || axis == Some(id) => axis_released = true,
                        Analog::Press(command, magnitude)
                            if axis_press.map_or(true, |(_, _, best)| magnitude > best) =>
                        {
                            axis = Some(id);
                            axis_press = Some((id, command, magnitude));
                            axis_released = false;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if axis_released {
            self.release(None);
            self.last_axis = None;
        } else if let Some((id, command, _)) = axis_press {
            if self.last_axis != Some((id, command)) {
                self.last_axis = Some((id, command));
                self.emit(command, Source::Axis(id), now);
            }
        }
    }

    fn has_command(&self) -> bool {
        self.events.iter().any(Event::is_command)
    }

    /// Append `command` unless this tick already carries one.
    fn emit(&mut self, command: Command, source: Source, now: Instant) {
        if self.has_command() {
            return;
        }
        self.events.push(Event::command(command, source));
        if self.map.is_repeatable(command) {
            self.press(command, source, now);
        }
    }

    fn press(&mut self, command: Command, source: Source, now: Instant) {
        if matches!(self.held, Some(h) if h.command == command && h.source == source) {
            return;
        }
        self.held = Some(Held {
            command,
            source,
            pressed_at: now,
            last_repeat: None,
        });
    }

    /// Forget the held command if `source` released it. `None` releases
    /// unconditionally, as does any release while nothing is tracked.
    fn release(&mut self, source: Option<Source>) {
        match (self.held, source) {
            (Some(held), Some(source)) if held.source != source => {}
            _ => self.held = None,
        }
    }

    /// The repeat due at `now`, if any. Timers advance even if the caller
    /// ends up discarding the event.
    fn repeat(&mut self, now: Instant) -> Option<Event> {
        let held = self.held.as_mut()?;
        let due = match held.last_repeat {
            None => now.duration_since(held.pressed_at) >= self.timing.first,
            Some(last) => now.duration_since(last) >= self.timing.interval,
        };
        if !due {
            return None;
        }
        held.last_repeat = Some(now);
        Some(Event::command(held.command, held.source))
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(CommandMap::with_defaults())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::input::{Key, Modifiers};
    use pretty_assertions::assert_eq;

    fn commands(events: &[Event]) -> Vec<Command> {
        events.iter().filter_map(Event::as_command).collect()
    }

    fn key_down(code: Key) -> Event {
        Event::Key(KeyEvent::down(code, Modifiers::NONE))
    }

    fn key_up(code: Key) -> Event {
        Event::Key(KeyEvent::up(code, Modifiers::NONE))
    }

    fn axis(id: u8, value: f32) -> Event {
        Event::JoyAxis { axis: id, value }
    }

    // ── Digital presses ──────────────────────────────────────────────

    #[test]
    fn key_press_emits_command_and_passes_raw_through() {
        let mut t = InputTranslator::default();
        let out = t.process(vec![key_down(Key::Enter)], Instant::now()).to_vec();
        assert_eq!(out.len(), 2);
        assert_eq!(commands(&out), vec![Command::Enter]);
        assert_eq!(t.held_command(), None);
    }

    #[test]
    fn chorded_key_is_ignored() {
        let mut t = InputTranslator::default();
        let ctrl_up = Event::Key(KeyEvent::down(Key::Up, Modifiers::CTRL));
        assert!(commands(t.process(vec![ctrl_up], Instant::now())).is_empty());
    }

    #[test]
    fn one_command_per_tick() {
        let mut t = InputTranslator::default();
        let out = t.process(
            vec![key_down(Key::Down), Event::JoyButton { button: pad::A, pressed: true }],
            Instant::now(),
        );
        assert_eq!(commands(out), vec![Command::Down]);
    }

    #[test]
    fn pad_buttons_map_to_commands() {
        let mut t = InputTranslator::default();
        let out = t.process(vec![Event::JoyButton { button: pad::B, pressed: true }], Instant::now());
        assert_eq!(commands(out), vec![Command::Back]);
    }

    // ── Auto-repeat ──────────────────────────────────────────────────

    #[test]
    fn repeat_timing_while_held() {
        let mut t = InputTranslator::default();
        let start = Instant::now();
        let mut fired = Vec::new();

        for ms in (0..=1200).step_by(50) {
            let raw = if ms == 0 { vec![key_down(Key::Down)] } else { Vec::new() };
            let out = t.process(raw, start + Duration::from_millis(ms));
            if !commands(out).is_empty() {
                fired.push(ms);
            }
        }
        assert_eq!(fired, vec![0, 500, 700, 900, 1100]);

        let out = t.process(vec![key_up(Key::Down)], start + Duration::from_millis(1250));
        assert!(commands(out).is_empty());
        assert_eq!(t.held_command(), None);
    }

    #[test]
    fn release_of_other_source_keeps_holding() {
        let mut t = InputTranslator::default();
        let start = Instant::now();
        t.process(vec![key_down(Key::Down)], start);
        t.process(vec![key_up(Key::Up)], start + Duration::from_millis(10));
        assert_eq!(t.held_command(), Some(Command::Down));
        t.process(vec![Event::JoyButton { button: pad::DPAD_DOWN, pressed: false }], start);
        assert_eq!(t.held_command(), Some(Command::Down));
    }

    #[test]
    fn non_repeatable_commands_do_not_hold() {
        let mut t = InputTranslator::default();
        let start = Instant::now();
        t.process(vec![Event::JoyButton { button: pad::A, pressed: true }], start);
        let out = t.process(Vec::new(), start + Duration::from_secs(2));
        assert!(commands(out).is_empty());
    }

    #[test]
    fn custom_timing() {
        let timing = RepeatTiming {
            first: Duration::from_millis(100),
            interval: Duration::from_millis(50),
        };
        let mut t = InputTranslator::default().with_timing(timing);
        let start = Instant::now();
        t.process(vec![key_down(Key::Left)], start);
        assert!(commands(t.process(Vec::new(), start + Duration::from_millis(99))).is_empty());
        assert_eq!(commands(t.process(Vec::new(), start + Duration::from_millis(100))), vec![Command::Left]);
        assert_eq!(commands(t.process(Vec::new(), start + Duration::from_millis(150))), vec![Command::Left]);
    }

    // ── Analog decoding ──────────────────────────────────────────────

    #[test]
    fn decode_bands() {
        let a = AnalogThresholds::default();
        assert_eq!(a.decode(0.9, 0.0), Analog::Press(Command::Right, 0.9));
        assert_eq!(a.decode(0.0, -0.95), Analog::Press(Command::Down, 0.95));
        assert_eq!(a.decode(-0.6, 0.0), Analog::Hold);
        assert_eq!(a.decode(0.3, 0.0), Analog::Release);
        assert_eq!(a.decode(0.05, 0.0), Analog::Release);
    }

    #[test]
    fn stick_hysteresis() {
        let mut t = InputTranslator::default();
        let now = Instant::now();
        assert_eq!(commands(t.process(vec![axis(pad::AXIS_LEFT_X, 0.9)], now)), vec![Command::Right]);
        assert!(commands(t.process(vec![axis(pad::AXIS_LEFT_X, 0.6)], now)).is_empty());
        assert_eq!(t.held_command(), Some(Command::Right));
        assert!(commands(t.process(vec![axis(pad::AXIS_LEFT_X, 0.3)], now)).is_empty());
        assert_eq!(t.held_command(), None);
    }

    #[test]
    fn stick_y_axis_is_inverted() {
        let mut t = InputTranslator::default();
        let out = t.process(vec![axis(pad::AXIS_LEFT_Y, -0.9)], Instant::now());
        assert_eq!(commands(out), vec![Command::Up]);
    }

    #[test]
    fn stronger_axis_wins_within_a_tick() {
        let mut t = InputTranslator::default();
        let out = t.process(
            vec![axis(pad::AXIS_LEFT_X, 0.85), axis(pad::AXIS_LEFT_Y, 0.95)],
            Instant::now(),
        );
        assert_eq!(commands(out), vec![Command::Down]);
    }

    #[test]
    fn idle_axis_cannot_release_the_owning_axis() {
        let mut t = InputTranslator::default();
        let now = Instant::now();
        t.process(vec![axis(pad::AXIS_LEFT_X, 0.9)], now);
        t.process(vec![axis(pad::AXIS_LEFT_Y, 0.0)], now);
        assert_eq!(t.held_command(), Some(Command::Right));
    }

    #[test]
    fn steady_stick_does_not_re_emit() {
        let mut t = InputTranslator::default();
        let now = Instant::now();
        t.process(vec![axis(pad::AXIS_LEFT_X, 0.9)], now);
        assert!(commands(t.process(vec![axis(pad::AXIS_LEFT_X, 0.95)], now)).is_empty());
    }

    #[test]
    fn hat_press_and_release() {
        let mut t = InputTranslator::default();
        let now = Instant::now();
        let out = t.process(vec![Event::JoyHat { hat: 0, x: -1, y: 0 }], now);
        assert_eq!(commands(out), vec![Command::Left]);
        assert_eq!(t.held_command(), Some(Command::Left));
        t.process(vec![Event::JoyHat { hat: 0, x: 0, y: 0 }], now);
        assert_eq!(t.held_command(), None);
    }

    #[test]
    fn thresholds_from_settings() {
        let settings = Settings::parse("[input]\npress = 0.7\nrepeat_first_ms = 300\n").unwrap();
        assert_eq!(AnalogThresholds::from_settings(&settings).press, 0.7);
        assert_eq!(RepeatTiming::from_settings(&settings).first, Duration::from_millis(300));
    }
}
