//! Captions derived from where a photo lives in the tree.
//!
//! Photo libraries are commonly filed as `.../2019/November/London/img.jpg`;
//! the caption is the part of the path from the year folder down to the
//! folder holding the image, e.g. `2019/November/London`.

use std::path::Path;

use percent_encoding::percent_decode_str;

/// Caption for `location`, which may be a plain path or a `file://` URI.
///
/// Returns the `/`-joined components from the first four-digit component up
/// to, but excluding, the file name. Without such a component the unescaped
/// path is returned whole.
pub fn label_from_path(location: &str) -> String {
    let path = unescaped_path(location);
    let components: Vec<&str> = path.split('/').collect();
    let folders = &components[..components.len().saturating_sub(1)];

    match folders.iter().position(|component| is_year(component)) {
        Some(start) => folders[start..].join("/"),
        None => path,
    }
}

pub fn label_for_path(path: &Path) -> String {
    label_from_path(&path.to_string_lossy())
}

fn is_year(component: &str) -> bool {
    component.len() == 4 && component.bytes().all(|b| b.is_ascii_digit())
}

/// Only `file://` URIs are percent-decoded; a plain path is taken as is, so
/// `%` and `\` in real file names survive.
fn unescaped_path(location: &str) -> String {
    let Some(without_scheme) = location.strip_prefix("file://") else {
        return location.to_string();
    };
    let decoded = percent_decode_str(without_scheme)
        .decode_utf8_lossy()
        .replace('\\', "/");

    // file:///C:/Photos keeps a slash in front of the drive letter
    let bytes = decoded.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':' {
        decoded[1..].to_string()
    } else {
        decoded
    }
}
