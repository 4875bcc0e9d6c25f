//! Event system: raw input, command bindings, input translation.

pub mod binding;
pub mod controls;
pub mod input;

use std::io;
use std::time::Duration;

pub use binding::CommandMap;
pub use controls::{Analog, AnalogThresholds, InputTranslator, RepeatTiming};
pub use input::{
    pad, Command, CommandEvent, Event, Key, KeyEvent, Modifiers, MouseButton, PointerAction, PointerEvent,
    Source,
};

/// A platform event queue.
pub trait EventSource {
    /// Block up to `timeout` for the next event.
    fn wait(&mut self, timeout: Duration) -> io::Result<Option<Event>>;

    /// The next queued event, without blocking.
    fn poll(&mut self) -> io::Result<Option<Event>>;
}
