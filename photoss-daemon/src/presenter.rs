use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops, Rgba, RgbaImage};
use photoss_common::display::swww_command;
use photoss_common::error::DisplayError;
use photoss_common::{Display, ErrorReporting, Frame, PhotossError, Result, Viewport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Puts published frames on a screen.
pub trait Presenter: Send + Sync {
    fn display(&self) -> &Display;
    fn present(&self, frame: &Frame) -> Result<()>;
}

/// Shows frames as the wallpaper of one Wayland output through `swww img`.
pub struct SwwwPresenter {
    display: Display,
    swww_path: PathBuf,
    cache_dir: PathBuf,
}

impl SwwwPresenter {
    pub fn new(display: Display, swww_path: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            display,
            swww_path,
            cache_dir,
        }
    }

    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("photoss")
    }

    /// Composed frames are written here before `swww` picks them up.
    pub fn frame_path(&self) -> PathBuf {
        let file_name: String = self
            .display
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.png", file_name))
    }

    fn present_error(&self, message: String) -> PhotossError {
        PhotossError::Display(DisplayError::Present {
            display: self.display.name.clone(),
            message,
        })
    }

    fn write_frame(&self, canvas: &RgbaImage, path: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| self.present_error(format!("cannot create {:?}: {}", self.cache_dir, e)))?;
        canvas
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| self.present_error(format!("cannot write {:?}: {}", path, e)))
    }
}

impl Presenter for SwwwPresenter {
    fn display(&self) -> &Display {
        &self.display
    }

    fn present(&self, frame: &Frame) -> Result<()> {
        let canvas = compose(frame, self.display.viewport());
        let path = self.frame_path();
        self.write_frame(&canvas, &path)?;

        let mut cmd = swww_command(&self.swww_path);
        cmd.arg("img").args(["-o", self.display.name.as_str()]).arg(&path);
        log::debug!("Executing swww command: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| self.present_error(format!("failed to run swww: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.present_error(format!(
                "swww exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        log::info!("{}: {} ({})", self.display.name, frame.label, frame.path.display());
        Ok(())
    }
}

/// Logs frames instead of showing them.
pub struct LogPresenter {
    display: Display,
}

impl LogPresenter {
    pub fn new(display: Display) -> Self {
        Self { display }
    }
}

impl Presenter for LogPresenter {
    fn display(&self) -> &Display {
        &self.display
    }

    fn present(&self, frame: &Frame) -> Result<()> {
        log::info!(
            "{}: {} ({}) at {}x{}+{}+{}",
            self.display.name,
            frame.label,
            frame.path.display(),
            frame.placement.width,
            frame.placement.height,
            frame.placement.x,
            frame.placement.y
        );
        Ok(())
    }
}

/// The frame centred on a black canvas covering the whole viewport.
pub fn compose(frame: &Frame, viewport: Viewport) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(
        viewport.width.max(1),
        viewport.height.max(1),
        Rgba([0, 0, 0, 255]),
    );
    imageops::overlay(
        &mut canvas,
        &frame.image,
        frame.placement.x as i64,
        frame.placement.y as i64,
    );
    canvas
}

/// Presents every frame a session publishes until `cancel` fires.
///
/// Only the newest frame matters; frames published while a slow present is
/// running are coalesced.
pub fn spawn_presenter(
    presenter: Arc<dyn Presenter>,
    mut frames: watch::Receiver<Option<Arc<Frame>>>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = frames.changed() => {
                    if changed.is_err() {
                        // Session is gone
                        break;
                    }
                    let Some(frame) = frames.borrow_and_update().clone() else {
                        continue;
                    };

                    let presenter = Arc::clone(&presenter);
                    match tokio::task::spawn_blocking(move || presenter.present(&frame)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => e.log_error("Presenter failed"),
                        Err(e) => log::error!("Presenter task failed: {}", e),
                    }
                }
            }
        }
        log::debug!("Presenter for {} stopped", presenter.display().name);
    })
}
