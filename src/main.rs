//! couch-ui: browse and launch games from the terminal with a gamepad or keyboard.
//!
//! Usage: `couch-ui [--config <settings.toml>] [--catalog <catalog.toml>]`

use std::cell::RefCell;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use log::{error, warn};

use couch_ui::event::InputTranslator;
use couch_ui::services::{BlockFont, CatalogLibrary, FileImageLoader};
use couch_ui::settings::Settings;
use couch_ui::widgets::{Launcher, TileMetrics};
use couch_ui::{App, AppConfig, Result};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let mut args = Args::default();
    let mut it = env::args_os().skip(1);
    while let Some(arg) = it.next() {
        let slot = match arg.to_str() {
            Some("--config") => &mut args.config,
            Some("--catalog") => &mut args.catalog,
            _ => return Err(format!("unexpected argument {}", arg.to_string_lossy())),
        };
        let value = it.next().ok_or_else(|| format!("{} needs a path", arg.to_string_lossy()))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(args)
}

fn open_library(args: &Args, settings: &Settings) -> Result<CatalogLibrary> {
    let library = match (&args.catalog, CatalogLibrary::default_path()) {
        (Some(path), _) => CatalogLibrary::open(path)?,
        (None, Some(path)) => CatalogLibrary::open(&path).unwrap_or_else(|e| {
            warn!("{e}; starting with an empty library");
            CatalogLibrary::from_entries(Vec::new())
        }),
        (None, None) => CatalogLibrary::from_entries(Vec::new()),
    };
    Ok(library.with_settings(settings))
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::discover(args.config.as_deref())?;
    let library = open_library(&args, &settings)?;

    let mut app = App::new(AppConfig::from_settings(&settings), InputTranslator::from_settings(&settings))?;
    Launcher::new(
        Rc::new(RefCell::new(library)),
        Rc::new(BlockFont::default()),
        Box::new(FileImageLoader::new()),
    )
    .with_metrics(TileMetrics::from_settings(&settings))
    .with_hide_on_launch(settings.get("play", "hide_on_launch", false))
    .build(&mut app.tree);

    app.run()
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("couch-ui: {message}");
            eprintln!("usage: couch-ui [--config <settings.toml>] [--catalog <catalog.toml>]");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("couch-ui: {e}");
            ExitCode::FAILURE
        }
    }
}
