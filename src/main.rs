//! quickfind - demo entry point
//!
//! Opens a text buffer with the quick find bar and a file list for the
//! directory given on the command line (or the current directory).

use log::{info, warn};
use quickfind::config::load_config;
use std::path::PathBuf;

mod app;

use app::QuickFindApp;

/// Application name constant.
const APP_NAME: &str = "quickfind";

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();
    let window_size = settings.window_size;
    info!(
        "Window configuration: {}x{}",
        window_size.width, window_size.height
    );

    let root = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir().unwrap_or_else(|e| {
            warn!("Cannot read the current directory: {}", e);
            PathBuf::from(".")
        }),
    };

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([window_size.width, window_size.height])
        .with_min_inner_size([400.0, 300.0]);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(QuickFindApp::new(cc, settings, &root)))),
    )
}
