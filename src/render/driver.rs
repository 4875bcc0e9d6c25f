//! Crossterm terminal backend: presenter and event source.
//!
//! The engine renders into a pixel [`Surface`]. The `Driver` maps that
//! surface onto the terminal grid: every cell covers `cell` pixels and is
//! printed as an upper-half block whose foreground samples the top half and
//! whose background samples the bottom half. Only cells whose colours changed
//! since the last present are rewritten.
//!
//! Input flows the other way: terminal key, mouse and resize events become
//! [`Event`]s in display pixels. Terminals that cannot report key releases get
//! a synthesized release right after every press.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self as ct, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;

use super::surface::{Color, Surface};
use crate::event::input::{convert_mouse_button, Event, KeyEvent, MouseButton, PointerAction, PointerEvent};
use crate::event::EventSource;
use crate::geometry::{Offset, Size};

/// Glyph whose foreground paints the top half of a cell.
const UPPER_HALF: char = '\u{2580}';

/// Default pixels per terminal cell.
pub const DEFAULT_CELL: Size = Size::new(8, 16);

/// Colours of one presented cell: top half, bottom half.
pub type CellColors = (Color, Color);

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal output backend and input source using crossterm.
///
/// Wraps a `BufWriter<Stdout>` for batched writes. The driver does NOT touch
/// the terminal on creation; call [`enter`](Self::enter) explicitly and
/// [`leave`](Self::leave) before exiting.
pub struct Driver {
    writer: BufWriter<Stdout>,
    cell: Size,
    front: Vec<CellColors>,
    front_cols: i32,
    last_pointer: Option<Offset>,
    held: Option<MouseButton>,
    synthesize_release: bool,
    enhanced: bool,
    pending: VecDeque<Event>,
}

impl Driver {
    /// Create a driver with `cell` pixels per terminal cell.
    ///
    /// Odd cell heights are rounded up so both half-cells cover whole pixels.
    pub fn new(cell: Size) -> Self {
        let cell = Size::new(cell.width.max(1), (cell.height.max(2) + 1) / 2 * 2);
        Self {
            writer: BufWriter::new(io::stdout()),
            cell,
            front: Vec::new(),
            front_cols: 0,
            last_pointer: None,
            held: None,
            synthesize_release: true,
            enhanced: false,
            pending: VecDeque::new(),
        }
    }

    pub fn cell_size(&self) -> Size {
        self.cell
    }

    /// Enter the alternate screen, enable raw mode and mouse capture, and ask
    /// for key release reporting where the terminal supports it.
    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.writer, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
            self.synthesize_release = false;
        }
        debug!("terminal entered (key releases reported: {})", self.enhanced);
        self.front.clear();
        Ok(())
    }

    /// Restore the terminal.
    pub fn leave(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// The display size in pixels for the current terminal size.
    pub fn display_size(&self) -> io::Result<Size> {
        let (cols, rows) = terminal::size()?;
        Ok(self.pixels_for(cols, rows))
    }

    fn pixels_for(&self, cols: u16, rows: u16) -> Size {
        Size::new(i32::from(cols) * self.cell.width, i32::from(rows) * self.cell.height)
    }

    /// Write the changed cells of `surface` and flush.
    pub fn present(&mut self, surface: &Surface) -> io::Result<()> {
        let (cols, back) = sample_cells(surface, self.cell);
        if cols != self.front_cols || back.len() != self.front.len() {
            self.front = vec![(Color::TRANSPARENT, Color::TRANSPARENT); back.len()];
            self.front_cols = cols;
        }
        for (i, (&new, old)) in back.iter().zip(self.front.iter_mut()).enumerate() {
            if new == *old {
                continue;
            }
            *old = new;
            let (x, y) = ((i as i32 % cols) as u16, (i as i32 / cols) as u16);
            queue!(
                self.writer,
                cursor::MoveTo(x, y),
                SetForegroundColor(to_terminal(new.0)),
                SetBackgroundColor(to_terminal(new.1)),
                Print(UPPER_HALF)
            )?;
        }
        queue!(self.writer, ResetColor)?;
        self.writer.flush()
    }

    /// Translate one crossterm event. Returns `None` for events the engine ignores.
    pub fn translate(&mut self, event: ct::Event) -> Option<Event> {
        match event {
            ct::Event::Key(key) => {
                let converted = KeyEvent::try_from(key).ok()?;
                if self.synthesize_release && converted.pressed {
                    self.pending
                        .push_back(Event::Key(KeyEvent::up(converted.code, converted.modifiers)));
                }
                Some(Event::Key(converted))
            }
            ct::Event::Mouse(mouse) => self.translate_mouse(mouse),
            ct::Event::Resize(cols, rows) => {
                self.front.clear();
                Some(Event::Resize(self.pixels_for(cols, rows)))
            }
            ct::Event::FocusGained => Some(Event::Restored),
            ct::Event::FocusLost | ct::Event::Paste(_) => None,
        }
    }

    fn translate_mouse(&mut self, mouse: ct::MouseEvent) -> Option<Event> {
        let pos = Offset::new(
            i32::from(mouse.column) * self.cell.width + self.cell.width / 2,
            i32::from(mouse.row) * self.cell.height + self.cell.height / 2,
        );
        let rel = pos - self.last_pointer.unwrap_or(pos);
        let action = match mouse.kind {
            MouseEventKind::Down(b) => {
                let b = convert_mouse_button(b);
                self.held = Some(b);
                PointerAction::Down(b)
            }
            MouseEventKind::Up(b) => {
                self.held = None;
                PointerAction::Up(convert_mouse_button(b))
            }
            MouseEventKind::Drag(b) => PointerAction::Motion {
                held: Some(convert_mouse_button(b)),
                rel,
            },
            MouseEventKind::Moved => PointerAction::Motion { held: self.held, rel },
            MouseEventKind::ScrollUp => return Some(Event::Wheel { dx: 0, dy: 1 }),
            MouseEventKind::ScrollDown => return Some(Event::Wheel { dx: 0, dy: -1 }),
            MouseEventKind::ScrollLeft => return Some(Event::Wheel { dx: -1, dy: 0 }),
            MouseEventKind::ScrollRight => return Some(Event::Wheel { dx: 1, dy: 0 }),
        };
        self.last_pointer = Some(pos);
        Some(Event::Pointer(PointerEvent::new(action, pos)))
    }

    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        let mut remaining = timeout;
        loop {
            let started = std::time::Instant::now();
            if !ct::poll(remaining)? {
                return Ok(None);
            }
            if let Some(event) = self.translate(ct::read()?) {
                return Ok(Some(event));
            }
            remaining = remaining.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }
}

impl EventSource for Driver {
    fn wait(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        self.next_event(timeout)
    }

    fn poll(&mut self) -> io::Result<Option<Event>> {
        self.next_event(Duration::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Sample a surface into terminal cells. Returns the column count and the
/// cells in row-major order.
pub fn sample_cells(surface: &Surface, cell: Size) -> (i32, Vec<CellColors>) {
    let cols = surface.width() / cell.width;
    let rows = surface.height() / cell.height;
    let mut cells = Vec::with_capacity((cols.max(0) * rows.max(0)) as usize);
    let half = cell.height / 2;
    for row in 0..rows {
        for col in 0..cols {
            let x = col * cell.width + cell.width / 2;
            let top_y = row * cell.height + half / 2;
            let bottom_y = row * cell.height + half + half / 2;
            let top = surface.get(x, top_y).unwrap_or(Color::BLACK);
            let bottom = surface.get(x, bottom_y).unwrap_or(Color::BLACK);
            cells.push((top, bottom));
        }
    }
    (cols.max(0), cells)
}

/// Terminal colour for a pixel, flattened onto black.
fn to_terminal(color: Color) -> style::Color {
    let c = color.over(Color::BLACK);
    style::Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::input::Key;
    use crate::geometry::Rect;
    use crossterm::event::{KeyCode, KeyModifiers, MouseEvent};
    use pretty_assertions::assert_eq;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> ct::Event {
        ct::Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    // ── Sampling ─────────────────────────────────────────────────────

    #[test]
    fn cells_sample_top_and_bottom_halves() {
        let mut s = Surface::filled(Size::new(16, 16), Color::BLACK);
        s.fill_rect(Rect::new(0, 0, 8, 8), Color::RED);
        s.fill_rect(Rect::new(8, 8, 8, 8), Color::WHITE);
        let (cols, cells) = sample_cells(&s, Size::new(8, 16));
        assert_eq!(cols, 2);
        assert_eq!(cells, vec![(Color::RED, Color::BLACK), (Color::BLACK, Color::WHITE)]);
    }

    #[test]
    fn partial_cells_are_dropped() {
        let s = Surface::new(Size::new(20, 20));
        let (cols, cells) = sample_cells(&s, Size::new(8, 16));
        assert_eq!(cols, 2);
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn odd_cell_height_is_rounded_up() {
        assert_eq!(Driver::new(Size::new(8, 15)).cell_size(), Size::new(8, 16));
    }

    // ── Input translation ────────────────────────────────────────────

    #[test]
    fn key_press_gets_synthesized_release() {
        let mut d = Driver::new(DEFAULT_CELL);
        let press = ct::Event::Key(ct::KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(
            d.translate(press),
            Some(Event::Key(KeyEvent::down(Key::Down, crate::event::input::Modifiers::NONE)))
        );
        assert_eq!(
            d.pending.pop_front(),
            Some(Event::Key(KeyEvent::up(Key::Down, crate::event::input::Modifiers::NONE)))
        );
    }

    #[test]
    fn mouse_positions_are_cell_centres_with_relative_motion() {
        let mut d = Driver::new(Size::new(8, 16));
        let first = d.translate(mouse(MouseEventKind::Moved, 2, 1));
        assert_eq!(
            first,
            Some(Event::Pointer(PointerEvent::new(
                PointerAction::Motion { held: None, rel: Offset::ZERO },
                Offset::new(20, 24)
            )))
        );
        d.translate(mouse(MouseEventKind::Down(ct::MouseButton::Left), 2, 1));
        let drag = d.translate(mouse(MouseEventKind::Drag(ct::MouseButton::Left), 3, 1));
        assert_eq!(
            drag,
            Some(Event::Pointer(PointerEvent::new(
                PointerAction::Motion { held: Some(MouseButton::Left), rel: Offset::new(8, 0) },
                Offset::new(28, 24)
            )))
        );
    }

    #[test]
    fn wheel_and_resize() {
        let mut d = Driver::new(Size::new(8, 16));
        assert_eq!(d.translate(mouse(MouseEventKind::ScrollDown, 0, 0)), Some(Event::Wheel { dx: 0, dy: -1 }));
        assert_eq!(d.translate(ct::Event::Resize(10, 5)), Some(Event::Resize(Size::new(80, 80))));
        assert_eq!(d.translate(ct::Event::FocusGained), Some(Event::Restored));
    }
}
