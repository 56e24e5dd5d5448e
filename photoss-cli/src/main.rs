use std::path::PathBuf;

use clap::{Parser, Subcommand};
use photoss_common::settings::{KEY_DELAY, KEY_DISCOVERY_MODE};
use photoss_common::{
    label_for_path, parse_delay, DiscoveryMode, ErrorReporting, ImageDiscovery, PhotossError,
    Settings, SettingsStore,
};
use photoss_config::TomlSettingsStore;

#[derive(Parser)]
#[command(name = "photoss-cli")]
#[command(about = "photoss-cli (photo slideshow screensaver settings)")]
#[command(version = "0.1.0")]
struct Cli {
    /// Settings file to use instead of ~/.config/photoss/settings.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current settings
    Show,

    /// Change settings
    Set {
        /// Folder holding the photos
        #[arg(long)]
        photo_path: Option<PathBuf>,

        /// Seconds between images (or a duration such as "30s", "2m")
        #[arg(long)]
        delay: Option<String>,

        /// AllFiles, FilesInRandomDirectory, RandomSelection or ThisWeekInHistory
        #[arg(long)]
        mode: Option<String>,
    },

    /// List the images a slideshow would use, without starting one
    Scan {
        /// Discovery mode to try instead of the configured one
        #[arg(long)]
        mode: Option<String>,

        /// Number of images to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut store = open_store(cli.config.as_ref())?;

    match cli.command {
        Commands::Show => show(&store),
        Commands::Set {
            photo_path,
            delay,
            mode,
        } => set(&mut store, photo_path, delay, mode),
        Commands::Scan { mode, limit } => scan(&store, mode, limit),
    }
}

fn user_error(e: PhotossError) -> anyhow::Error {
    anyhow::anyhow!(e.user_friendly_message())
}

fn open_store(path: Option<&PathBuf>) -> anyhow::Result<TomlSettingsStore> {
    match path {
        Some(path) => TomlSettingsStore::load_from_path(path),
        None => TomlSettingsStore::open(),
    }
    .map_err(user_error)
}

fn parse_mode(mode: &str) -> anyhow::Result<DiscoveryMode> {
    mode.parse().map_err(|_| {
        let names: Vec<&str> = DiscoveryMode::ALL.iter().map(|m| m.name()).collect();
        anyhow::anyhow!("Unknown discovery mode '{}'. Expected one of: {}", mode, names.join(", "))
    })
}

fn show(store: &TomlSettingsStore) -> anyhow::Result<()> {
    let settings = Settings::load(store);
    let marker = |key: &str| if store.load(key).is_none() { " (default)" } else { "" };

    println!("photoss settings ({})", store.path().display());
    println!("=================");
    match &settings.photo_path {
        Some(path) => println!("Photo folder:   {}", path.display()),
        None => println!("Photo folder:   (not set)"),
    }
    println!("Delay:          {}s{}", settings.delay.as_secs(), marker(KEY_DELAY));
    println!(
        "Discovery mode: {}{}",
        settings.discovery_mode,
        marker(KEY_DISCOVERY_MODE)
    );

    let displays = store.displays();
    if !displays.is_empty() {
        println!();
        println!("Displays:");
        for display in displays {
            println!(
                "  {}: {}x{} at {},{}",
                display.name,
                display.bounds.width,
                display.bounds.height,
                display.bounds.x,
                display.bounds.y
            );
        }
    }
    Ok(())
}

fn set(
    store: &mut TomlSettingsStore,
    photo_path: Option<PathBuf>,
    delay: Option<String>,
    mode: Option<String>,
) -> anyhow::Result<()> {
    if photo_path.is_none() && delay.is_none() && mode.is_none() {
        println!("Nothing to change. Use --photo-path, --delay or --mode.");
        return Ok(());
    }

    let mut settings = Settings::load(store);

    // Validate everything before writing anything
    if let Some(delay) = &delay {
        settings.delay = parse_delay(delay).map_err(user_error)?;
    }
    if let Some(mode) = &mode {
        settings.discovery_mode = parse_mode(mode)?;
    }
    if let Some(path) = photo_path {
        if !path.is_dir() {
            log::debug!("Photo folder {:?} does not exist", path);
            eprintln!("Warning: {} is not a directory (yet)", path.display());
        }
        settings.photo_path = Some(path);
    }

    if settings.photo_path.is_none() {
        eprintln!("Note: no photo folder set yet; the slideshow will not start without one");
    }

    settings.save(store).map_err(user_error)?;
    log::info!(
        "Saved settings to {:?}: delay {}s, mode {}",
        store.path(),
        settings.delay.as_secs(),
        settings.discovery_mode
    );
    println!("✓ Settings saved to {}", store.path().display());
    Ok(())
}

fn scan(store: &TomlSettingsStore, mode: Option<String>, limit: usize) -> anyhow::Result<()> {
    let settings = Settings::load(store);
    let root = settings.require_photo_path().map_err(user_error)?;
    let mode = match mode {
        Some(mode) => parse_mode(&mode)?,
        None => settings.discovery_mode,
    };

    println!("Scanning {} ({})...", root.display(), mode);
    let images = ImageDiscovery::discover_for_slideshow(root, mode).map_err(user_error)?;
    log::info!("Scan of {:?} ({}) found {} images", root, mode, images.len());

    println!("✓ Found {} images", images.len());
    for image in images.iter().take(limit) {
        println!("  [{}] {}", label_for_path(image), image.display());
    }
    if images.len() > limit {
        println!("  ... and {} more", images.len() - limit);
    }
    Ok(())
}
