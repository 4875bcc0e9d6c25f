//! The game library: what can be launched, and the launched process.
//!
//! [`Library`] is the collaborator the grid and the running-game popup talk
//! to. [`CatalogLibrary`] is the default implementation: entries come from a
//! TOML catalog and launching spawns the entry's command as a child process.
//!
//! ```toml
//! [[entry]]
//! name = "Ultra Racer"
//! command = "ultra-racer"
//! args = ["--fullscreen"]
//! thumbnail = "covers/ultra-racer.png"
//! last_played = 1700000000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as Process};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::LibraryError;
use crate::settings::Settings;

/// A freshly launched entry counts as running for at least this long, so
/// launchers that hand off to another process do not bounce straight back.
pub const LAUNCH_GRACE: Duration = Duration::from_secs(5);

/// Minimum time between two kill attempts on the same process.
pub const KILL_RETRY: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One launchable item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entry {
    /// Display name; also the identity used to diff refreshed lists.
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<PathBuf>,
    /// Unix timestamp of the last launch; 0 if never played.
    #[serde(default)]
    pub last_played: u64,
    #[serde(default)]
    pub hidden: bool,
}

impl Entry {
    /// An entry with just a name and a command.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            thumbnail: None,
            last_played: 0,
            hidden: false,
        }
    }

    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail = Some(path.into());
        self
    }

    pub fn with_last_played(mut self, timestamp: u64) -> Self {
        self.last_played = timestamp;
        self
    }
}

// ---------------------------------------------------------------------------
// Library trait
// ---------------------------------------------------------------------------

/// Data source and process manager for launchable entries.
pub trait Library {
    /// The current entries, and whether they changed since the previous call.
    fn list_entries(&mut self) -> (Vec<Entry>, bool);

    /// Force the next [`list_entries`](Self::list_entries) to reload.
    fn mark_changed(&mut self);

    /// Start `entry`.
    fn launch(&mut self, entry: &Entry) -> Result<(), LibraryError>;

    /// Whether the launched entry is still running. `aggressive` is set
    /// while a termination is in progress.
    fn is_running(&mut self, aggressive: bool) -> bool;

    /// Ask the launched entry to stop.
    fn terminate(&mut self);
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Attribute entries are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    LastPlayed,
    Name,
}

impl SortKey {
    /// Parse a settings value. Unknown values fall back to last-played order.
    pub fn parse(value: &str) -> Self {
        match value {
            "name" | "sortname" => SortKey::Name,
            "lastplayed" => SortKey::LastPlayed,
            other => {
                warn!("unknown sort attribute {other:?}, sorting by last played");
                SortKey::LastPlayed
            }
        }
    }
}

/// Sort `entries` in place by `key`, optionally reversed.
pub fn sort_entries(entries: &mut [Entry], key: SortKey, reverse: bool) {
    match key {
        SortKey::LastPlayed => entries.sort_by_key(|e| e.last_played),
        SortKey::Name => entries.sort_by_cached_key(|e| e.name.to_lowercase()),
    }
    if reverse {
        entries.reverse();
    }
}

// ---------------------------------------------------------------------------
// CatalogLibrary
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    entry: Vec<Entry>,
}

/// A process started by [`CatalogLibrary::launch`].
#[derive(Debug)]
struct Running {
    name: String,
    child: Child,
    launched_at: Instant,
    killed_at: Option<Instant>,
}

/// TOML-backed library that launches entries as child processes.
#[derive(Debug)]
pub struct CatalogLibrary {
    path: Option<PathBuf>,
    entries: Vec<Entry>,
    sort: SortKey,
    reverse: bool,
    changed: bool,
    running: Option<Running>,
}

impl CatalogLibrary {
    /// A library over a fixed set of entries.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            path: None,
            entries,
            sort: SortKey::default(),
            reverse: true,
            changed: true,
            running: None,
        }
    }

    /// A library reading its entries from the catalog at `path`.
    ///
    /// The file is read immediately and again after every
    /// [`mark_changed`](Library::mark_changed).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let entries = Self::read_catalog(&path)?;
        Ok(Self {
            path: Some(path),
            ..Self::from_entries(entries)
        })
    }

    /// Apply `[gamelist] sort_attribute` and `reverse_sort`.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.sort = SortKey::parse(&settings.get("gamelist", "sort_attribute", String::from("lastplayed")));
        self.reverse = settings.get("gamelist", "reverse_sort", true);
        self
    }

    pub fn with_sort(mut self, key: SortKey, reverse: bool) -> Self {
        self.sort = key;
        self.reverse = reverse;
        self
    }

    /// Default catalog location next to the settings file.
    pub fn default_path() -> Option<PathBuf> {
        Settings::default_path().map(|p| p.with_file_name("catalog.toml"))
    }

    fn read_catalog(path: &Path) -> Result<Vec<Entry>, LibraryError> {
        let text = fs::read_to_string(path).map_err(|source| LibraryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog = toml::from_str(&text).map_err(|source| LibraryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let entries: Vec<Entry> = catalog
            .entry
            .into_iter()
            .map(|mut e| {
                e.thumbnail = e.thumbnail.map(|t| if t.is_relative() { base.join(t) } else { t });
                e
            })
            .collect();
        debug!("read {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    fn reload(&mut self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        match Self::read_catalog(path) {
            Ok(entries) => self.entries = entries,
            Err(e) => warn!("keeping previous entries: {e}"),
        }
    }
}

impl Library for CatalogLibrary {
    fn list_entries(&mut self) -> (Vec<Entry>, bool) {
        let changed = std::mem::take(&mut self.changed);
        if changed {
            self.reload();
        }
        let mut visible: Vec<Entry> = self.entries.iter().filter(|e| !e.hidden).cloned().collect();
        sort_entries(&mut visible, self.sort, self.reverse);
        (visible, changed)
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn launch(&mut self, entry: &Entry) -> Result<(), LibraryError> {
        info!("launching {}", entry.name);
        let child = Process::new(&entry.command)
            .args(&entry.args)
            .spawn()
            .map_err(|source| LibraryError::Launch {
                name: entry.name.clone(),
                source,
            })?;
        self.running = Some(Running {
            name: entry.name.clone(),
            child,
            launched_at: Instant::now(),
            killed_at: None,
        });
        Ok(())
    }

    fn is_running(&mut self, aggressive: bool) -> bool {
        let Some(running) = self.running.as_mut() else {
            return false;
        };
        let alive = match running.child.try_wait() {
            Ok(Some(status)) => {
                debug!("{} exited with {status}", running.name);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("cannot poll {}: {e}", running.name);
                false
            }
        };
        if alive || (!aggressive && running.launched_at.elapsed() < LAUNCH_GRACE) {
            return true;
        }
        info!("{} is no longer running", running.name);
        self.running = None;
        false
    }

    fn terminate(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.killed_at.is_some_and(|t| t.elapsed() < KILL_RETRY) {
            return;
        }
        info!("terminating {}", running.name);
        if let Err(e) = running.child.kill() {
            warn!("cannot kill {}: {e}", running.name);
        }
        running.killed_at = Some(Instant::now());
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("beta", "true").with_last_played(20),
            Entry::new("Alpha", "true").with_last_played(30),
            Entry::new("gamma", "true"),
        ]
    }

    // ── Listing ──────────────────────────────────────────────────────

    #[test]
    fn first_listing_is_changed_then_stable() {
        let mut lib = CatalogLibrary::from_entries(sample());
        let (entries, changed) = lib.list_entries();
        assert!(changed);
        assert_eq!(names(&entries), vec!["Alpha", "beta", "gamma"]);
        assert!(!lib.list_entries().1);
        lib.mark_changed();
        assert!(lib.list_entries().1);
    }

    #[test]
    fn sort_by_name_ascending() {
        let mut lib = CatalogLibrary::from_entries(sample()).with_sort(SortKey::Name, false);
        assert_eq!(names(&lib.list_entries().0), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn sort_from_settings() {
        let settings = Settings::parse("[gamelist]\nsort_attribute = \"lastplayed\"\nreverse_sort = false\n").unwrap();
        let mut lib = CatalogLibrary::from_entries(sample()).with_settings(&settings);
        assert_eq!(names(&lib.list_entries().0), vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn unknown_sort_key_falls_back() {
        assert_eq!(SortKey::parse("installed_at"), SortKey::LastPlayed);
        assert_eq!(SortKey::parse("sortname"), SortKey::Name);
    }

    // ── Catalog file ─────────────────────────────────────────────────

    #[test]
    fn catalog_file_round() {
        let dir = std::env::temp_dir().join(format!("couch-ui-catalog-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        fs::write(
            &path,
            r#"
[[entry]]
name = "One"
command = "one"
thumbnail = "covers/one.png"

[[entry]]
name = "Secret"
command = "secret"
hidden = true
"#,
        )
        .unwrap();

        let mut lib = CatalogLibrary::open(&path).unwrap();
        let (entries, _) = lib.list_entries();
        assert_eq!(names(&entries), vec!["One"]);
        assert_eq!(entries[0].thumbnail, Some(dir.join("covers/one.png")));

        fs::write(&path, "[[entry]]\nname = \"Two\"\ncommand = \"two\"\n").unwrap();
        assert_eq!(names(&lib.list_entries().0), vec!["One"]);
        lib.mark_changed();
        assert_eq!(names(&lib.list_entries().0), vec!["Two"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let err = CatalogLibrary::open("/nonexistent/couch-ui/catalog.toml").unwrap_err();
        assert!(matches!(err, LibraryError::Read { .. }));
    }

    // ── Processes ────────────────────────────────────────────────────

    #[test]
    fn nothing_running_initially() {
        let mut lib = CatalogLibrary::from_entries(Vec::new());
        assert!(!lib.is_running(false));
        lib.terminate();
    }

    #[test]
    fn launch_failure_is_reported() {
        let mut lib = CatalogLibrary::from_entries(Vec::new());
        let err = lib.launch(&Entry::new("ghost", "/nonexistent/couch-ui-binary")).unwrap_err();
        assert!(matches!(err, LibraryError::Launch { ref name, .. } if name == "ghost"));
        assert!(!lib.is_running(false));
    }

    #[cfg(unix)]
    #[test]
    fn exited_process_stays_running_during_grace_unless_aggressive() {
        let mut lib = CatalogLibrary::from_entries(Vec::new());
        lib.launch(&Entry::new("quick", "true")).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert!(lib.is_running(false));
        assert!(!lib.is_running(true));
        assert!(!lib.is_running(false));
    }

    #[cfg(unix)]
    #[test]
    fn terminate_kills_the_child() {
        let mut lib = CatalogLibrary::from_entries(Vec::new());
        let mut entry = Entry::new("sleeper", "sleep");
        entry.args = vec!["30".into()];
        lib.launch(&entry).unwrap();
        assert!(lib.is_running(true));
        lib.terminate();
        std::thread::sleep(Duration::from_millis(200));
        assert!(!lib.is_running(true));
    }
}
