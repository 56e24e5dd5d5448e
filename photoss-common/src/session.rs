//! Per-display slideshow state machine.
//!
//! A session owns its own random stream and timer; the only thing shared
//! between sessions is the read-only image list. Frames are published on a
//! watch channel and observers never write back.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use image::imageops::FilterType;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::decode::{ImageDecoder, Rotation};
use crate::duration::DEFAULT_DELAY;
use crate::error::{DiscoveryError, PhotossError};
use crate::label::label_for_path;
use crate::layout::{place, Placement, Viewport};
use crate::Result;

pub const DEFAULT_MAX_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub period: Duration,
    pub viewport: Viewport,
    /// Decode attempts per tick before the tick is skipped.
    pub max_attempts: usize,
}

impl SessionOptions {
    pub fn new(period: Duration, viewport: Viewport) -> Self {
        Self {
            period,
            viewport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, Viewport::new(1920, 1080))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, nothing shown yet.
    Idle,
    Displaying,
}

/// An image ready to be shown: rotated upright and scaled to its placement.
#[derive(Debug, Clone)]
pub struct Frame {
    pub path: PathBuf,
    pub label: String,
    pub image: RgbaImage,
    pub placement: Placement,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Displayed(PathBuf),
    /// Every attempt failed to decode; the previous frame stays up.
    Skipped { attempts: usize },
}

/// Seed for a session's generator, from the wall clock and the display index.
///
/// The clock part is `hour * 1_000_000 + minute * 10_000 + millisecond`. It
/// stays below 2^32, so the ordinal in the upper half keeps sessions started
/// in the same millisecond apart.
pub fn session_seed(now: &impl Timelike, ordinal: usize) -> u64 {
    let millis = (now.nanosecond() / 1_000_000) % 1000;
    let clock = now.hour() as u64 * 1_000_000 + now.minute() as u64 * 10_000 + millis as u64;
    ((ordinal as u64) << 32) | clock
}

pub struct SlideshowSession {
    ordinal: usize,
    images: Arc<[PathBuf]>,
    rng: StdRng,
    decoder: Arc<dyn ImageDecoder>,
    options: SessionOptions,
    state: SessionState,
    frames: watch::Sender<Option<Arc<Frame>>>,
}

impl SlideshowSession {
    /// Creates a session seeded from the local clock.
    pub fn new(
        ordinal: usize,
        images: Arc<[PathBuf]>,
        decoder: Arc<dyn ImageDecoder>,
        options: SessionOptions,
    ) -> Result<Self> {
        let seed = session_seed(&chrono::Local::now(), ordinal);
        Self::with_rng(ordinal, images, decoder, options, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(
        ordinal: usize,
        images: Arc<[PathBuf]>,
        decoder: Arc<dyn ImageDecoder>,
        options: SessionOptions,
        rng: StdRng,
    ) -> Result<Self> {
        if images.is_empty() {
            return Err(PhotossError::Discovery(DiscoveryError::NoImagesFound {
                path: PathBuf::new(),
            }));
        }

        let (frames, _) = watch::channel(None);
        Ok(Self {
            ordinal,
            images,
            rng,
            decoder,
            options,
            state: SessionState::Idle,
            frames,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frames.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current(&self) -> Option<Arc<Frame>> {
        self.frames.borrow().clone()
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn pick_index(&mut self) -> usize {
        let len = self.images.len();
        let index = (self.rng.gen::<f64>() * len as f64) as usize;
        index.min(len - 1)
    }

    /// Shows the next random image.
    ///
    /// Undecodable picks are replaced by fresh picks within the same tick, up
    /// to `max_attempts`. Decoding runs on the blocking pool so other sessions
    /// keep ticking.
    pub async fn on_tick(&mut self) -> TickOutcome {
        let attempts = self.options.max_attempts.max(1);

        for _ in 0..attempts {
            let index = self.pick_index();
            let path = self.images[index].clone();
            let decoder = Arc::clone(&self.decoder);
            let viewport = self.options.viewport;

            let prepared = tokio::task::spawn_blocking(move || {
                prepare_frame(decoder.as_ref(), &path, viewport)
            })
            .await;

            match prepared {
                Ok(Ok(frame)) => {
                    let path = frame.path.clone();
                    self.frames.send_replace(Some(Arc::new(frame)));
                    self.state = SessionState::Displaying;
                    return TickOutcome::Displayed(path);
                }
                Ok(Err(e)) => {
                    log::debug!("Session {}: skipping image: {}", self.ordinal, e);
                }
                Err(e) => {
                    log::warn!("Session {}: decode task failed: {}", self.ordinal, e);
                }
            }
        }

        log::warn!(
            "Session {}: no decodable image after {} attempts, keeping current frame",
            self.ordinal,
            attempts
        );
        TickOutcome::Skipped { attempts }
    }

    /// Runs the session on its own task until `cancel` fires.
    ///
    /// The first tick is immediate. A slow decode delays the following ticks
    /// rather than bunching them up.
    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.options.period.max(Duration::from_millis(1));
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            log::info!(
                "Session {} started with {} images, changing every {}",
                self.ordinal,
                self.images.len(),
                humantime::format_duration(period)
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = self.on_tick() => {}
                        }
                    }
                }
            }

            log::info!("Session {} stopped", self.ordinal);
        })
    }
}

/// Decodes, lays out and scales one image.
pub fn prepare_frame(decoder: &dyn ImageDecoder, path: &Path, viewport: Viewport) -> Result<Frame> {
    let decoded = decoder.decode(path)?;
    let placement = place(decoded.raw_width, decoded.raw_height, decoded.rotation, viewport);
    let image = image::imageops::resize(
        &decoded.pixels,
        placement.width,
        placement.height,
        FilterType::Triangle,
    );

    Ok(Frame {
        path: path.to_path_buf(),
        label: label_for_path(path),
        image,
        placement,
        rotation: decoded.rotation,
    })
}
