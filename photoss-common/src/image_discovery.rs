use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, PhotossError, ValidationError};
use crate::scanner::{DirectoryScanner, FileFilter};
use crate::Result;

/// Minimum direct file count a directory needs to qualify for
/// [`DiscoveryMode::FilesInRandomDirectory`].
pub const DEFAULT_MIN_DIRECTORY_FILES: usize = 100;

/// Strategy deciding which part of the photo tree a slideshow run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiscoveryMode {
    /// Every image in the tree.
    #[default]
    AllFiles,
    /// The images directly inside one randomly chosen large directory.
    FilesInRandomDirectory,
    /// A coin flip between the two modes above, made once per run.
    RandomSelection,
    /// Images created in the week around today, in any year.
    ThisWeekInHistory,
}

impl DiscoveryMode {
    pub const ALL: [DiscoveryMode; 4] = [
        DiscoveryMode::AllFiles,
        DiscoveryMode::FilesInRandomDirectory,
        DiscoveryMode::RandomSelection,
        DiscoveryMode::ThisWeekInHistory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryMode::AllFiles => "AllFiles",
            DiscoveryMode::FilesInRandomDirectory => "FilesInRandomDirectory",
            DiscoveryMode::RandomSelection => "RandomSelection",
            DiscoveryMode::ThisWeekInHistory => "ThisWeekInHistory",
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiscoveryMode {
    type Err = PhotossError;

    fn from_str(s: &str) -> Result<Self> {
        DiscoveryMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s.trim())
            .ok_or_else(|| {
                PhotossError::Validation(ValidationError::InvalidDiscoveryMode {
                    mode: s.to_string(),
                })
            })
    }
}

/// Tunables for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub min_directory_files: usize,
    /// "Today" for [`DiscoveryMode::ThisWeekInHistory`].
    pub reference_date: NaiveDate,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            min_directory_files: DEFAULT_MIN_DIRECTORY_FILES,
            reference_date: Local::now().date_naive(),
        }
    }
}

pub struct ImageDiscovery;

impl ImageDiscovery {
    /// Discovers the images for a slideshow run under `mode`.
    ///
    /// When `mode` yields nothing the whole tree is scanned instead; only an
    /// empty tree is reported as [`DiscoveryError::NoImagesFound`].
    pub fn discover_for_slideshow(root: &Path, mode: DiscoveryMode) -> Result<Vec<PathBuf>> {
        Self::discover_with_fallback(root, mode, &DiscoveryOptions::default(), &mut rand::thread_rng())
    }

    pub fn discover_with_fallback<R: Rng + ?Sized>(
        root: &Path,
        mode: DiscoveryMode,
        options: &DiscoveryOptions,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        match Self::discover(root, mode, options, rng) {
            Ok(images) if !images.is_empty() => return Ok(images),
            Ok(_) if mode == DiscoveryMode::AllFiles => {
                return Err(PhotossError::Discovery(DiscoveryError::NoImagesFound {
                    path: root.to_path_buf(),
                }));
            }
            Ok(_) => {
                log::warn!("{} found no images under {:?}, falling back to AllFiles", mode, root);
            }
            Err(PhotossError::Discovery(DiscoveryError::NoCandidateDirectories { path, min_files })) => {
                log::warn!(
                    "No directory under {:?} holds more than {} files, falling back to AllFiles",
                    path,
                    min_files
                );
            }
            Err(e) => return Err(e),
        }

        let images = Self::discover(root, DiscoveryMode::AllFiles, options, rng)?;
        if images.is_empty() {
            return Err(PhotossError::Discovery(DiscoveryError::NoImagesFound {
                path: root.to_path_buf(),
            }));
        }
        Ok(images)
    }

    /// Runs a single discovery strategy with no fallback.
    pub fn discover<R: Rng + ?Sized>(
        root: &Path,
        mode: DiscoveryMode,
        options: &DiscoveryOptions,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        let images = match mode {
            DiscoveryMode::AllFiles => DirectoryScanner::collect_images(root, FileFilter::Images)?,
            DiscoveryMode::FilesInRandomDirectory => {
                Self::discover_random_directory(root, options.min_directory_files, rng)?
            }
            DiscoveryMode::RandomSelection => {
                let resolved = Self::resolve_random_selection(rng);
                log::info!("RandomSelection resolved to {}", resolved);
                return Self::discover(root, resolved, options, rng);
            }
            DiscoveryMode::ThisWeekInHistory => DirectoryScanner::collect_images(
                root,
                FileFilter::ImagesNear(options.reference_date),
            )?,
        };

        log::info!("Discovered {} images in {:?} ({})", images.len(), root, mode);
        Ok(images)
    }

    /// Fair coin flip between [`DiscoveryMode::AllFiles`] and
    /// [`DiscoveryMode::FilesInRandomDirectory`].
    pub fn resolve_random_selection<R: Rng + ?Sized>(rng: &mut R) -> DiscoveryMode {
        if rng.gen_bool(0.5) {
            DiscoveryMode::FilesInRandomDirectory
        } else {
            DiscoveryMode::AllFiles
        }
    }

    fn discover_random_directory<R: Rng + ?Sized>(
        root: &Path,
        min_files: usize,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        let candidates = DirectoryScanner::collect_directories_above_size(root, min_files)?;
        let chosen = candidates.choose(rng).ok_or_else(|| {
            PhotossError::Discovery(DiscoveryError::NoCandidateDirectories {
                path: root.to_path_buf(),
                min_files,
            })
        })?;

        log::info!("Using {:?} out of {} candidate directories", chosen, candidates.len());
        DirectoryScanner::collect_images_in(chosen, FileFilter::Images)
    }
}
