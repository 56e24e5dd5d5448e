mod presenter;

use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use photoss_common::{
    parse_launch, Display, DisplaySource, ErrorReporting, FileDecoder, ImageDecoder,
    ImageDiscovery, InputEvent, InputMonitor, LaunchAction, PhotossError, SessionOptions,
    Settings, SlideshowSession, StaticDisplays, SwwwDisplays,
};
use photoss_config::TomlSettingsStore;
use tokio_util::sync::CancellationToken;

use crate::presenter::{spawn_presenter, LogPresenter, Presenter, SwwwPresenter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_launch(&args) {
        LaunchAction::Configure => show_settings(),
        LaunchAction::Slideshow => run_slideshow().await,
        LaunchAction::Exit => {
            log::info!("Unrecognised launch argument {:?}, exiting", args.first());
            Ok(())
        }
    }
}

/// Maps a library error to the user-visible error `main` returns.
fn report(context: &'static str) -> impl Fn(PhotossError) -> anyhow::Error {
    move |e| anyhow::anyhow!("{}: {}", context, e.user_friendly_message())
}

fn show_settings() -> anyhow::Result<()> {
    let store = TomlSettingsStore::open().map_err(report("Configuration error"))?;
    let settings = Settings::load(&store);

    println!("photoss settings ({})", store.path().display());
    match &settings.photo_path {
        Some(path) => println!("  Photo folder:   {}", path.display()),
        None => println!("  Photo folder:   (not set)"),
    }
    println!("  Delay:          {}s", settings.delay.as_secs());
    println!("  Discovery mode: {}", settings.discovery_mode);
    println!();
    println!("Change them with: photoss-cli set --photo-path <DIR> --delay <SECONDS> --mode <MODE>");
    Ok(())
}

async fn run_slideshow() -> anyhow::Result<()> {
    log::info!("Starting photoss slideshow...");

    let store = TomlSettingsStore::open().map_err(report("Configuration error"))?;
    let settings = Settings::load(&store);
    let root = settings
        .require_photo_path()
        .map_err(report("Configuration error"))?
        .clone();

    log::info!(
        "Settings loaded: folder {:?}, delay {}s, mode {}",
        root,
        settings.delay.as_secs(),
        settings.discovery_mode
    );

    let mode = settings.discovery_mode;
    let discovery_root = root.clone();
    let images = tokio::task::spawn_blocking(move || {
        ImageDiscovery::discover_for_slideshow(&discovery_root, mode)
    })
    .await
    .context("Image discovery task failed")?
    .map_err(report("Discovery failed"))?;

    log::info!("Found {} images under {:?}", images.len(), root);
    let images: Arc<[PathBuf]> = images.into();

    let displays = enumerate_displays(&store).map_err(report("Display setup failed"))?;
    let swww_path = which::which("swww").ok();
    if swww_path.is_none() {
        log::warn!("swww not found in PATH, frames will only be logged");
    }

    // Build every session before starting any, so a setup failure leaves nothing running
    let decoder: Arc<dyn ImageDecoder> = Arc::new(FileDecoder);
    let cache_dir = SwwwPresenter::default_cache_dir();
    let mut pending = Vec::with_capacity(displays.len());
    for (ordinal, display) in displays.iter().enumerate() {
        let options = SessionOptions::new(settings.delay, display.viewport());
        let session =
            SlideshowSession::new(ordinal, Arc::clone(&images), Arc::clone(&decoder), options)
                .map_err(report("Session setup failed"))?;

        let presenter: Arc<dyn Presenter> = match &swww_path {
            Some(path) => Arc::new(SwwwPresenter::new(
                display.clone(),
                path.clone(),
                cache_dir.clone(),
            )),
            None => Arc::new(LogPresenter::new(display.clone())),
        };
        pending.push((session, presenter));
    }

    let shutdown = CancellationToken::new();
    let mut handles = Vec::with_capacity(pending.len() * 2);
    for (session, presenter) in pending {
        log::info!(
            "Display {} ({}x{} at {},{})",
            presenter.display().name,
            presenter.display().bounds.width,
            presenter.display().bounds.height,
            presenter.display().bounds.x,
            presenter.display().bounds.y
        );
        handles.push(spawn_presenter(presenter, session.subscribe(), shutdown.clone()));
        handles.push(session.spawn(shutdown.clone()));
    }

    watch_for_activity(shutdown.clone());
    log::info!("Slideshow running on {} displays", displays.len());

    shutdown.cancelled().await;
    log::info!("Shutting down...");

    for handle in handles {
        if let Err(e) = handle.await {
            log::error!("Task failed during shutdown: {}", e);
        }
    }

    log::info!("Slideshow stopped");
    Ok(())
}

fn enumerate_displays(store: &TomlSettingsStore) -> photoss_common::Result<Vec<Display>> {
    let declared = store.displays();
    if !declared.is_empty() {
        log::info!("Using {} displays declared in {:?}", declared.len(), store.path());
        return StaticDisplays::new(declared).displays();
    }
    SwwwDisplays::new()?.displays()
}

/// Ends the slideshow on Ctrl-C or on input from an interactive terminal.
fn watch_for_activity(shutdown: CancellationToken) {
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received Ctrl-C");
                signal_shutdown.cancel();
            }
            Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    if !std::io::stdin().is_terminal() {
        return;
    }

    // Blocking read on its own thread so it never holds up runtime shutdown
    std::thread::spawn(move || {
        let mut monitor = InputMonitor::new(shutdown);
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() || monitor.observe(InputEvent::KeyPress) {
                break;
            }
        }
    });
}
