use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::{DirEntry, WalkDir};

use crate::date_window::{created_date, is_within_window};
use crate::error::{DiscoveryError, PhotossError};
use crate::Result;

/// Raster formats the slideshow shows, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "gif", "bmp", "png", "tiff"];

/// Return `true` if `path` has a supported image extension, in any case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Which files a scan keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    /// Every supported image.
    Images,
    /// Supported images created in the week around the given date, any year.
    ImagesNear(NaiveDate),
}

impl FileFilter {
    pub fn accepts(&self, path: &Path, created: Option<NaiveDate>) -> bool {
        if !is_supported_image(path) {
            return false;
        }

        match self {
            FileFilter::Images => true,
            FileFilter::ImagesNear(reference) => {
                created.is_some_and(|created| is_within_window(created, *reference))
            }
        }
    }

    fn needs_created_date(&self) -> bool {
        matches!(self, FileFilter::ImagesNear(_))
    }
}

/// Read-only traversal of a photo tree.
///
/// Unreadable subdirectories are logged and skipped. Only a missing or
/// non-directory root fails the scan.
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Collects matching files from `root` and every directory below it, depth first.
    pub fn collect_images(root: &Path, filter: FileFilter) -> Result<Vec<PathBuf>> {
        ensure_directory(root)?;
        Ok(Self::walk_files(WalkDir::new(root), filter))
    }

    /// Collects matching files directly inside `dir`, without descending.
    pub fn collect_images_in(dir: &Path, filter: FileFilter) -> Result<Vec<PathBuf>> {
        ensure_directory(dir)?;
        Ok(Self::walk_files(WalkDir::new(dir).max_depth(1), filter))
    }

    /// Collects `root` and every directory below it whose direct file count
    /// is strictly greater than `min_count`.
    pub fn collect_directories_above_size(root: &Path, min_count: usize) -> Result<Vec<PathBuf>> {
        ensure_directory(root)?;

        let directories = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(skip_unreadable)
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| match direct_file_count(entry.path()) {
                Ok(count) if count > min_count => Some(entry.into_path()),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Skipping unreadable directory {:?}: {}", entry.path(), e);
                    None
                }
            })
            .collect();

        Ok(directories)
    }

    fn walk_files(walker: WalkDir, filter: FileFilter) -> Vec<PathBuf> {
        walker
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(skip_unreadable)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let created = if filter.needs_created_date() {
                    entry.metadata().ok().and_then(|m| created_date(&m))
                } else {
                    None
                };
                filter.accepts(entry.path(), created)
            })
            .map(DirEntry::into_path)
            .collect()
    }
}

fn skip_unreadable(entry: walkdir::Result<DirEntry>) -> Option<DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            log::warn!("Skipping unreadable entry {:?}: {}", e.path(), e);
            None
        }
    }
}

fn direct_file_count(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        if entry?.path().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PhotossError::Discovery(DiscoveryError::DirectoryRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "Directory not found"),
        }));
    }

    if !path.is_dir() {
        return Err(PhotossError::Discovery(DiscoveryError::DirectoryRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path is not a directory"),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::fs;
    use tempfile::tempdir;
    #[cfg(unix)]
    use std::os::unix::fs::symlink;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_supported_extensions_any_case() {
        for name in ["a.jpg", "a.JPG", "a.jpeg", "a.Jpeg", "a.gif", "a.bmp", "a.png", "a.PNG", "a.tiff", "a.TIFF"] {
            assert!(is_supported_image(Path::new(name)), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["a.txt", "a.webp", "a.tif", "a.heic", "a.mp4", "jpg", "a.jpg.bak", "a"] {
            assert!(!is_supported_image(Path::new(name)), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_collect_images_recursive() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let nested = root.join("2019").join("November");
        fs::create_dir_all(&nested).unwrap();

        fs::write(root.join("root.jpg"), "fake jpg").unwrap();
        fs::write(root.join("notes.txt"), "not an image").unwrap();
        fs::write(root.join("2019").join("year.PNG"), "fake png").unwrap();
        fs::write(nested.join("deep.gif"), "fake gif").unwrap();

        let images = DirectoryScanner::collect_images(root, FileFilter::Images).unwrap();

        assert_eq!(names(&images), vec!["deep.gif", "root.jpg", "year.PNG"]);
        assert!(images.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_collect_images_empty_tree() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("a").join("b")).unwrap();

        let images = DirectoryScanner::collect_images(temp_dir.path(), FileFilter::Images).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_collect_images_missing_root() {
        let missing = Path::new("/nonexistent/photoss/photos");

        match DirectoryScanner::collect_images(missing, FileFilter::Images) {
            Err(PhotossError::Discovery(DiscoveryError::DirectoryRead { path, .. })) => {
                assert_eq!(path, missing);
            }
            other => panic!("Expected DirectoryRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_images_root_is_file() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, "fake jpg").unwrap();

        assert!(DirectoryScanner::collect_images(&file, FileFilter::Images).is_err());
    }

    #[test]
    fn test_collect_images_in_is_not_recursive() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("top.jpg"), "fake jpg").unwrap();
        fs::write(root.join("sub").join("below.jpg"), "fake jpg").unwrap();

        let images = DirectoryScanner::collect_images_in(root, FileFilter::Images).unwrap();
        assert_eq!(names(&images), vec!["top.jpg"]);
    }

    #[test]
    fn test_date_filter_keeps_recent_files() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("today.jpg"), "fake jpg").unwrap();
        fs::write(root.join("today.txt"), "not an image").unwrap();

        let today = Local::now().date_naive();
        let images = DirectoryScanner::collect_images(root, FileFilter::ImagesNear(today)).unwrap();

        // Files were created moments ago, so they sit in the window unless it
        // straddles a month boundary today.
        let lower = today.checked_sub_days(chrono::Days::new(7)).unwrap();
        let upper = today.checked_add_days(chrono::Days::new(7)).unwrap();
        if chrono::Datelike::month(&lower) == chrono::Datelike::month(&upper) {
            assert_eq!(names(&images), vec!["today.jpg"]);
        } else {
            assert!(images.is_empty());
        }
    }

    #[test]
    fn test_date_filter_excludes_distant_reference() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("today.jpg"), "fake jpg").unwrap();

        let today = Local::now().date_naive();
        let far = today.checked_add_days(chrono::Days::new(150)).unwrap();
        let images = DirectoryScanner::collect_images(temp_dir.path(), FileFilter::ImagesNear(far)).unwrap();

        assert!(images.is_empty());
    }

    #[test]
    fn test_filter_accepts_without_date_only_for_plain_images() {
        let reference = NaiveDate::from_ymd_opt(2024, 1, 23).unwrap();

        assert!(FileFilter::Images.accepts(Path::new("a.jpg"), None));
        assert!(!FileFilter::ImagesNear(reference).accepts(Path::new("a.jpg"), None));
        assert!(FileFilter::ImagesNear(reference)
            .accepts(Path::new("a.jpg"), NaiveDate::from_ymd_opt(2020, 1, 20)));
        assert!(!FileFilter::ImagesNear(reference)
            .accepts(Path::new("a.txt"), NaiveDate::from_ymd_opt(2020, 1, 20)));
    }

    #[test]
    fn test_directories_above_size() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let big = root.join("big");
        let small = root.join("small");
        let nested_big = small.join("nested");
        fs::create_dir_all(&big).unwrap();
        fs::create_dir_all(&nested_big).unwrap();

        for i in 0..4 {
            fs::write(big.join(format!("{}.jpg", i)), "fake jpg").unwrap();
            fs::write(nested_big.join(format!("{}.txt", i)), "any file counts").unwrap();
        }
        for i in 0..3 {
            fs::write(small.join(format!("{}.jpg", i)), "fake jpg").unwrap();
        }

        let mut dirs = DirectoryScanner::collect_directories_above_size(root, 3).unwrap();
        dirs.sort();

        assert_eq!(dirs, vec![big, nested_big]);
    }

    #[test]
    fn test_root_counts_as_candidate() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        for i in 0..3 {
            fs::write(root.join(format!("{}.jpg", i)), "fake jpg").unwrap();
        }

        let dirs = DirectoryScanner::collect_directories_above_size(root, 2).unwrap();
        assert_eq!(dirs, vec![root.to_path_buf()]);

        let dirs = DirectoryScanner::collect_directories_above_size(root, 3).unwrap();
        assert!(dirs.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_links_are_skipped() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("visible.jpg"), "fake jpg").unwrap();
        symlink(root.join("missing.jpg"), root.join("gone.jpg")).unwrap();
        symlink(root, root.join("loop")).unwrap();

        let images = DirectoryScanner::collect_images(root, FileFilter::Images).unwrap();
        assert_eq!(images, vec![root.join("visible.jpg")]);

        let dirs = DirectoryScanner::collect_directories_above_size(root, 0).unwrap();
        assert_eq!(dirs, vec![root.to_path_buf()]);
    }
}
