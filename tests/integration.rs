//! Integration tests for couch-ui.
//!
//! These tests exercise the public API from outside the crate, driving the
//! launcher screen through the headless pilot: raw input goes through the
//! input translator, ticks, routing and the draw pass like in the real loop.

use std::cell::RefCell;
use std::rc::Rc;

use couch_ui::event::input::{pad, Command, Event, Key};
use couch_ui::services::library::Entry;
use couch_ui::settings::Settings;
use couch_ui::services::CatalogLibrary;
use couch_ui::testing::pilot::Pilot;
use couch_ui::testing::{self, MockLibrary};
use couch_ui::tree::NodeId;
use couch_ui::widgets::*;
use pretty_assertions::assert_eq;

struct Screen {
    pilot: Pilot,
    launcher: Rc<Launcher>,
    library: Rc<RefCell<MockLibrary>>,
}

impl Screen {
    /// An 800 x 600 launcher: three columns of 240 px tiles, 100 ms frames.
    fn new(names: &[&str]) -> Self {
        let library = MockLibrary::shared(names);
        let mut pilot = Pilot::new(800, 600).with_frame_ms(100);
        let launcher = testing::launcher(library.clone(), TileMetrics::default()).build(pilot.tree_mut());
        pilot.frame();
        Screen {
            pilot,
            launcher,
            library,
        }
    }

    fn viewport(&self) -> NodeId {
        self.launcher.grid_viewport(self.pilot.tree()).unwrap()
    }

    fn grid(&self) -> &GameGrid {
        self.pilot.tree().widget::<GameGrid>(self.viewport()).unwrap()
    }

    fn selected(&self) -> Option<usize> {
        self.grid().selected(self.pilot.tree(), self.viewport())
    }

    fn popup_visible(&self) -> bool {
        let popup = self.launcher.popup().unwrap();
        self.pilot.tree().node(popup).is_visible()
    }
}

// ---------------------------------------------------------------------------
// Grid navigation
// ---------------------------------------------------------------------------

#[test]
fn test_grid_navigation_clamps_to_last_item() {
    let mut s = Screen::new(&["a", "b", "c", "d", "e", "f", "g"]);
    assert_eq!(s.grid().columns(), 3);
    assert_eq!(s.selected(), Some(0));

    s.pilot.tap_key(Key::Right);
    assert_eq!(s.selected(), Some(1));
    s.pilot.tap_key(Key::Down);
    assert_eq!(s.selected(), Some(4));
    s.pilot.tap_key(Key::Right);
    assert_eq!(s.selected(), Some(5));
    s.pilot.tap_key(Key::Down);
    assert_eq!(s.selected(), Some(6));
}

#[test]
fn test_stick_navigates_with_hysteresis() {
    let mut s = Screen::new(&["a", "b", "c"]);
    s.pilot.send(Event::JoyAxis { axis: pad::AXIS_LEFT_X, value: 0.9 });
    assert_eq!(s.pilot.frame(), vec![Command::Right]);
    s.pilot.send(Event::JoyAxis { axis: pad::AXIS_LEFT_X, value: 0.6 });
    assert!(s.pilot.frame().is_empty());
    s.pilot.send(Event::JoyAxis { axis: pad::AXIS_LEFT_X, value: 0.3 });
    s.pilot.frame();
    assert_eq!(s.selected(), Some(1));
    assert!(s.pilot.wait(1000).is_empty());
}

#[test]
fn test_dpad_button_navigates() {
    let mut s = Screen::new(&["a", "b", "c", "d"]);
    s.pilot.send(Event::JoyButton { button: pad::DPAD_DOWN, pressed: true });
    s.pilot.frame();
    s.pilot.send(Event::JoyButton { button: pad::DPAD_DOWN, pressed: false });
    s.pilot.frame();
    assert_eq!(s.selected(), Some(3));
}

#[test]
fn test_held_key_scrolls_selection_into_view() {
    let mut s = Screen::new(&["a", "b", "c", "d", "e", "f", "g"]);
    s.pilot.press_key(Key::Down);
    s.pilot.frame();
    assert_eq!(s.selected(), Some(3));
    // First repeat after 500 ms moves to the last row.
    s.pilot.wait(500);
    s.pilot.release_key(Key::Down);
    s.pilot.frame();
    assert_eq!(s.selected(), Some(6));
    // Row 2 ends at 2 * 346 + 336 = 1028; the visible height is 600.
    assert_eq!(s.pilot.tree().shift(s.viewport()).y, 428);
}

#[test]
fn test_resize_reflows_columns() {
    let mut s = Screen::new(&["a", "b", "c", "d", "e"]);
    s.pilot.resize(500, 600);
    s.pilot.frame();
    assert_eq!(s.grid().columns(), 2);
    s.pilot.tap_key(Key::Down);
    assert_eq!(s.selected(), Some(2));
}

#[test]
fn test_escape_on_grid_quits() {
    let mut s = Screen::new(&["a"]);
    s.pilot.tap_key(Key::Escape);
    assert!(!s.pilot.is_running());
}

// ---------------------------------------------------------------------------
// Launching
// ---------------------------------------------------------------------------

#[test]
fn test_launch_run_and_return_to_grid() {
    let mut s = Screen::new(&["a", "b", "c"]);
    s.pilot.tap_key(Key::Right);
    s.pilot.tap_key(Key::Enter);
    assert_eq!(s.library.borrow().launched, vec!["b".to_owned()]);
    assert!(s.popup_visible());

    // Navigation is swallowed while the game runs.
    s.pilot.tap_key(Key::Right);
    assert_eq!(s.selected(), Some(1));

    s.library.borrow_mut().running = false;
    s.pilot.frame();
    assert!(!s.popup_visible());
    assert!(s.pilot.tree().node(s.launcher.grid().unwrap()).is_interactive());

    s.pilot.tap_key(Key::Right);
    assert_eq!(s.selected(), Some(2));
}

#[test]
fn test_escape_while_running_terminates_instead_of_quitting() {
    let mut s = Screen::new(&["a"]);
    s.pilot.tap_key(Key::Enter);
    // The release frame already polls aggressively and terminates.
    s.pilot.tap_key(Key::Escape);
    assert!(s.pilot.is_running());
    assert_eq!(s.library.borrow().terminations, 1);
    assert_eq!(s.library.borrow().polls.last(), Some(&true));

    s.library.borrow_mut().running = false;
    s.pilot.frame();
    assert!(!s.popup_visible());
    assert_eq!(s.library.borrow().terminations, 1);

    s.pilot.tap_key(Key::Escape);
    assert!(!s.pilot.is_running());
}

#[test]
fn test_failed_launch_leaves_grid_usable() {
    let mut s = Screen::new(&["a", "b"]);
    s.library.borrow_mut().fail_launch = true;
    s.pilot.tap_key(Key::Enter);
    assert!(!s.popup_visible());
    s.pilot.tap_key(Key::Right);
    assert_eq!(s.selected(), Some(1));
}

#[test]
fn test_click_launches_tile_under_pointer() {
    let mut s = Screen::new(&["a", "b", "c", "d"]);
    // Four entries over three columns: tiles start at x 0, 267 and 534.
    s.pilot.click(300, 100);
    s.pilot.frame();
    assert_eq!(s.library.borrow().launched, vec!["b".to_owned()]);
    assert!(s.popup_visible());
}

#[test]
fn test_reload_key_picks_up_new_entries() {
    let mut s = Screen::new(&["a"]);
    s.library.borrow_mut().set_names(&["a", "b"]);
    s.pilot.tap_key(Key::Char('r'));
    assert_eq!(s.grid().tiles().len(), 2);
}

// ---------------------------------------------------------------------------
// Catalog-backed library
// ---------------------------------------------------------------------------

#[test]
fn test_catalog_library_drives_the_grid() {
    let settings = Settings::parse("[gamelist]\nsort_attribute = \"name\"\nreverse_sort = false\n").unwrap();
    let library = CatalogLibrary::from_entries(vec![
        Entry::new("Zeta", "true"),
        Entry::new("Alpha", "true"),
        Entry::new("Mid", "true"),
    ])
    .with_settings(&settings);

    let mut pilot = Pilot::new(800, 600);
    let launcher = testing::launcher(Rc::new(RefCell::new(library)), TileMetrics::default()).build(pilot.tree_mut());
    pilot.frame();

    let viewport = launcher.grid_viewport(pilot.tree()).unwrap();
    let grid = pilot.tree().widget::<GameGrid>(viewport).unwrap();
    let names: Vec<String> = grid
        .tiles()
        .iter()
        .map(|&t| pilot.tree().widget::<GameTile>(t).unwrap().entry().name.clone())
        .collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
}
