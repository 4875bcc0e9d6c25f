//! Headless testing helpers: Pilot, a scripted library, launcher fixtures.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) frame by frame
//! without a terminal, on a virtual clock. [`MockLibrary`] records every
//! call the launcher screen makes so tests can assert on them.

pub mod pilot;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::LibraryError;
use crate::services::library::{Entry, Library};
use crate::services::media::{BlockFont, FileImageLoader};
use crate::widgets::game_tile::TileMetrics;
use crate::widgets::launcher::Launcher;

pub use pilot::Pilot;

// ---------------------------------------------------------------------------
// MockLibrary
// ---------------------------------------------------------------------------

/// In-memory [`Library`] recording launches, polls and terminations.
#[derive(Debug, Clone, Default)]
pub struct MockLibrary {
    pub entries: Vec<Entry>,
    /// Names passed to `launch`, in order.
    pub launched: Vec<String>,
    /// What `is_running` reports. Set by `launch`.
    pub running: bool,
    /// The `aggressive` flag of every `is_running` call.
    pub polls: Vec<bool>,
    pub terminations: usize,
    /// Number of `mark_changed` calls.
    pub reloads: usize,
    /// Make `launch` fail.
    pub fail_launch: bool,
    changed: bool,
}

impl MockLibrary {
    /// A library listing `names` in order, each launched by a command of the same name.
    pub fn new(names: &[&str]) -> Self {
        let mut library = Self::default();
        library.set_names(names);
        library
    }

    /// [`new`](Self::new), wrapped for sharing with a [`Launcher`].
    pub fn shared(names: &[&str]) -> Rc<RefCell<MockLibrary>> {
        Rc::new(RefCell::new(Self::new(names)))
    }

    /// Replace the listing. The next `list_entries` reports a change.
    pub fn set_names(&mut self, names: &[&str]) {
        self.entries = names.iter().map(|&n| Entry::new(n, n)).collect();
        self.changed = true;
    }
}

impl Library for MockLibrary {
    fn list_entries(&mut self) -> (Vec<Entry>, bool) {
        let changed = std::mem::take(&mut self.changed);
        (self.entries.clone(), changed)
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.reloads += 1;
    }

    fn launch(&mut self, entry: &Entry) -> Result<(), LibraryError> {
        if self.fail_launch {
            return Err(LibraryError::Launch {
                name: entry.name.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such command"),
            });
        }
        self.launched.push(entry.name.clone());
        self.running = true;
        Ok(())
    }

    fn is_running(&mut self, aggressive: bool) -> bool {
        self.polls.push(aggressive);
        self.running
    }

    fn terminate(&mut self) {
        self.terminations += 1;
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An unbuilt launcher over `library` with the default block font.
pub fn launcher(library: Rc<RefCell<dyn Library>>, metrics: TileMetrics) -> Launcher {
    Launcher::new(library, Rc::new(BlockFont::default()), Box::new(FileImageLoader::new())).with_metrics(metrics)
}

// ===========================================================================
// Tests
// ===========================================================================
