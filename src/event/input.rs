//! Raw input events and the logical commands synthesized from them.
//!
//! [`Event`] is what an [`EventSource`](crate::event::EventSource) produces and
//! what the node tree consumes. Crossterm key events are converted via `From`
//! impls so the rest of the engine never depends on crossterm directly; pointer
//! conversion lives in the driver because it needs the cell-to-pixel scale.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::geometry::{Offset, Size};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);
    pub const META: Modifiers = Modifiers(1 << 3);
    pub const CAPS_LOCK: Modifiers = Modifiers(1 << 4);
    pub const NUM_LOCK: Modifiers = Modifiers(1 << 5);
    pub const MODE: Modifiers = Modifiers(1 << 6);

    /// Lock states that never block a command.
    pub const BENIGN: Modifiers = Modifiers(Self::CAPS_LOCK.0 | Self::NUM_LOCK.0 | Self::MODE.0);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no modifier bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any modifier other than the lock states is held.
    pub fn has_chord(self) -> bool {
        !(self & !Self::BENIGN).is_empty()
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

impl Not for Modifiers {
    type Output = Modifiers;
    fn not(self) -> Self::Output {
        Modifiers(!self.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A key going down or coming back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
    /// `true` for key-down, `false` for key-up.
    pub pressed: bool,
}

impl KeyEvent {
    /// A key-down event.
    pub fn down(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers, pressed: true }
    }

    /// A key-up event.
    pub fn up(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers, pressed: false }
    }
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Extra buttons, numbered from 4.
    Other(u8),
}

impl MouseButton {
    /// Left, middle or right. Only these move focus on release.
    pub fn is_primary(self) -> bool {
        !matches!(self, MouseButton::Other(_))
    }
}

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Down(MouseButton),
    Up(MouseButton),
    /// Movement by `rel` pixels, optionally while a button is held.
    Motion {
        held: Option<MouseButton>,
        rel: Offset,
    },
}

/// A positional event. `pos` is in display pixels until routing rewrites it
/// into the receiving node's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub pos: Offset,
    /// Synthesized from a touch screen rather than a mouse.
    pub touch: bool,
}

impl PointerEvent {
    pub fn new(action: PointerAction, pos: Offset) -> Self {
        Self { action, pos, touch: false }
    }

    /// Mark as touch-originated (builder).
    pub fn touch(mut self) -> Self {
        self.touch = true;
        self
    }

    /// Whether this is the release of `button`.
    pub fn is_release_of(&self, button: MouseButton) -> bool {
        self.action == PointerAction::Up(button)
    }

    /// Whether a release of this kind should move focus to the node under the pointer.
    pub fn takes_focus(&self) -> bool {
        !self.touch && matches!(self.action, PointerAction::Up(b) if b.is_primary())
    }
}

// ---------------------------------------------------------------------------
// Gamepad constants
// ---------------------------------------------------------------------------

/// Standard game-controller button and axis numbering.
pub mod pad {
    pub const A: u8 = 0;
    pub const B: u8 = 1;
    pub const X: u8 = 2;
    pub const Y: u8 = 3;
    pub const BACK: u8 = 4;
    pub const GUIDE: u8 = 5;
    pub const START: u8 = 6;
    pub const DPAD_UP: u8 = 11;
    pub const DPAD_DOWN: u8 = 12;
    pub const DPAD_LEFT: u8 = 13;
    pub const DPAD_RIGHT: u8 = 14;

    pub const AXIS_LEFT_X: u8 = 0;
    pub const AXIS_LEFT_Y: u8 = 1;
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A logical input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Back,
    Exit,
    Reload,
    Top,
    Bottom,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Up => "UP",
            Command::Down => "DOWN",
            Command::Left => "LEFT",
            Command::Right => "RIGHT",
            Command::Enter => "ENTER",
            Command::Back => "BACK",
            Command::Exit => "EXIT",
            Command::Reload => "RELOAD",
            Command::Top => "TOP",
            Command::Bottom => "BOTTOM",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The physical input a command came from. Used to match a release to its press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Key(Key),
    Button(u8),
    Axis(u8),
    Hat(u8),
}

/// A synthesized command together with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandEvent {
    pub command: Command,
    pub origin: Source,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Everything the frame loop can receive.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Pointer(PointerEvent),
    /// Wheel steps; positive `dy` scrolls up.
    Wheel { dx: i32, dy: i32 },
    JoyButton { button: u8, pressed: bool },
    /// Axis position in `[-1.0, 1.0]`.
    JoyAxis { axis: u8, value: f32 },
    /// Hat position, each component in `{-1, 0, 1}`; `y = 1` is up.
    JoyHat { hat: u8, x: i8, y: i8 },
    JoyDevice { id: u32, added: bool },
    /// The display changed size (in pixels).
    Resize(Size),
    Restored,
    Quit,
    Command(CommandEvent),
}

impl Event {
    pub fn command(command: Command, origin: Source) -> Self {
        Event::Command(CommandEvent { command, origin })
    }

    /// The command carried by this event, if it is one.
    pub fn as_command(&self) -> Option<Command> {
        match self {
            Event::Command(c) => Some(c.command),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Event::Command(_))
    }

    /// The pointer payload of a positional event.
    pub fn as_pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::Pointer(p) => Some(p),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

/// Convert crossterm key modifiers and lock state to our `Modifiers`.
fn convert_modifiers(
    m: crossterm::event::KeyModifiers,
    state: crossterm::event::KeyEventState,
) -> Modifiers {
    use crossterm::event::{KeyEventState, KeyModifiers};

    let mut out = Modifiers::NONE;
    if m.contains(KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    if m.intersects(KeyModifiers::SUPER | KeyModifiers::META | KeyModifiers::HYPER) {
        out = out | Modifiers::META;
    }
    if state.contains(KeyEventState::CAPS_LOCK) {
        out = out | Modifiers::CAPS_LOCK;
    }
    if state.contains(KeyEventState::NUM_LOCK) {
        out = out | Modifiers::NUM_LOCK;
    }
    out
}

/// Map a crossterm key code. Returns `None` for keys the engine ignores.
pub fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;

    Some(match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    })
}

impl TryFrom<crossterm::event::KeyEvent> for KeyEvent {
    type Error = ();

    /// Terminal auto-repeat (`KeyEventKind::Repeat`) is rejected: the input
    /// translator runs its own repeat timers.
    fn try_from(ct: crossterm::event::KeyEvent) -> Result<Self, Self::Error> {
        use crossterm::event::KeyEventKind;

        let code = convert_key(ct.code).ok_or(())?;
        let modifiers = convert_modifiers(ct.modifiers, ct.state);
        match ct.kind {
            KeyEventKind::Press => Ok(KeyEvent::down(code, modifiers)),
            KeyEventKind::Release => Ok(KeyEvent::up(code, modifiers)),
            KeyEventKind::Repeat => Err(()),
        }
    }
}

/// Convert a crossterm mouse button to our `MouseButton`.
pub fn convert_mouse_button(b: crossterm::event::MouseButton) -> MouseButton {
    match b {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventKind, KeyEventState, KeyModifiers};

    fn ct_key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> crossterm::event::KeyEvent {
        crossterm::event::KeyEvent::new_with_kind(code, modifiers, kind)
    }

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::SHIFT));
        assert_eq!(mods & Modifiers::CTRL, Modifiers::CTRL);
    }

    #[test]
    fn lock_states_are_not_chords() {
        assert!(!Modifiers::NONE.has_chord());
        assert!(!(Modifiers::CAPS_LOCK | Modifiers::NUM_LOCK | Modifiers::MODE).has_chord());
        assert!((Modifiers::CAPS_LOCK | Modifiers::CTRL).has_chord());
        assert!(Modifiers::SHIFT.has_chord());
    }

    // ── Pointer ──────────────────────────────────────────────────────

    #[test]
    fn only_primary_mouse_release_takes_focus() {
        let up = PointerEvent::new(PointerAction::Up(MouseButton::Right), Offset::ZERO);
        assert!(up.takes_focus());
        assert!(!up.touch().takes_focus());
        let extra = PointerEvent::new(PointerAction::Up(MouseButton::Other(4)), Offset::ZERO);
        assert!(!extra.takes_focus());
        let down = PointerEvent::new(PointerAction::Down(MouseButton::Left), Offset::ZERO);
        assert!(!down.takes_focus());
    }

    // ── Command ──────────────────────────────────────────────────────

    #[test]
    fn command_display_uses_upper_names() {
        assert_eq!(Command::Enter.to_string(), "ENTER");
        assert_eq!(Command::Reload.to_string(), "RELOAD");
    }

    #[test]
    fn event_command_accessors() {
        let e = Event::command(Command::Up, Source::Key(Key::Up));
        assert!(e.is_command());
        assert_eq!(e.as_command(), Some(Command::Up));
        assert!(e.as_pointer().is_none());
        assert_eq!(Event::Quit.as_command(), None);
    }

    // ── From<crossterm> ──────────────────────────────────────────────

    #[test]
    fn crossterm_press_and_release() {
        let down = KeyEvent::try_from(ct_key(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Press)).unwrap();
        assert_eq!(down, KeyEvent::down(Key::Up, Modifiers::NONE));
        let up = KeyEvent::try_from(ct_key(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release)).unwrap();
        assert!(!up.pressed);
    }

    #[test]
    fn crossterm_repeat_is_dropped() {
        let ct = ct_key(KeyCode::Char('r'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(KeyEvent::try_from(ct).is_err());
    }

    #[test]
    fn crossterm_unknown_key_is_dropped() {
        let ct = ct_key(KeyCode::Insert, KeyModifiers::NONE, KeyEventKind::Press);
        assert!(KeyEvent::try_from(ct).is_err());
    }

    #[test]
    fn crossterm_modifiers_and_locks() {
        let mut ct = ct_key(KeyCode::Enter, KeyModifiers::CONTROL | KeyModifiers::SUPER, KeyEventKind::Press);
        ct.state = KeyEventState::CAPS_LOCK;
        let ke = KeyEvent::try_from(ct).unwrap();
        assert!(ke.modifiers.contains(Modifiers::CTRL));
        assert!(ke.modifiers.contains(Modifiers::META));
        assert!(ke.modifiers.contains(Modifiers::CAPS_LOCK));
    }

    #[test]
    fn crossterm_mouse_buttons() {
        assert_eq!(convert_mouse_button(crossterm::event::MouseButton::Middle), MouseButton::Middle);
        assert_eq!(convert_mouse_button(crossterm::event::MouseButton::Right), MouseButton::Right);
    }
}
