//! # couch-ui
//!
//! A retained-mode, gamepad-first UI engine for a couch game launcher.
//!
//! couch-ui keeps the screen as a tree of nodes with resolved geometry, redraws
//! only the parts of the tree that changed, routes input along the focus chain
//! (or by hit-testing for pointers) and turns keyboard, gamepad and stick input
//! into a small set of navigation commands with auto-repeat. The bundled
//! launcher screen shows a scrolling grid of games and a popup while one runs.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** — Offset, Size, Rect, Insets primitives
//! - **[`layout`]** — Position/size specs and the cached geometry resolver
//! - **[`tree`]** — Slotmap-backed node arena with dirty redraw, focus and routing
//! - **[`widget`]** — Widget trait, scroll state, border drawing
//! - **[`widgets`]** — TextBlock, Scrollbar, ScrollView and the launcher screen
//! - **[`event`]** — Raw input events, command bindings, the input translator
//! - **[`render`]** — RGBA surfaces and the crossterm half-block presenter
//! - **[`services`]** — Game library, image loading and fonts
//! - **[`settings`]** — TOML settings file
//! - **[`app`]** — Frame loop tying everything together
//! - **[`testing`]** — Headless pilot and test doubles

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod layout;
pub mod tree;

// Widget system
pub mod widget;
pub mod widgets;

// Input
pub mod event;

// Rendering
pub mod render;

// Collaborators
pub mod services;
pub mod settings;

// Application
pub mod app;
pub mod testing;

pub use app::{App, AppConfig};
pub use error::{Error, Result};
