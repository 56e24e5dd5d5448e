use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{DisplayError, PhotossError};
use crate::layout::Viewport;
use crate::Result;

/// Screen area covered by one display, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub name: String,
    pub bounds: Rect,
}

impl Display {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.bounds.width, self.bounds.height)
    }
}

pub trait DisplaySource {
    fn displays(&self) -> Result<Vec<Display>>;
}

/// Displays declared up front, e.g. in the settings file.
#[derive(Debug, Clone, Default)]
pub struct StaticDisplays {
    displays: Vec<Display>,
}

impl StaticDisplays {
    pub fn new(displays: Vec<Display>) -> Self {
        Self { displays }
    }
}

impl DisplaySource for StaticDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        if self.displays.is_empty() {
            return Err(PhotossError::Display(DisplayError::NoDisplays));
        }
        Ok(self.displays.clone())
    }
}

/// Wayland outputs as reported by `swww query`.
#[derive(Debug, Clone)]
pub struct SwwwDisplays {
    swww_path: PathBuf,
}

impl SwwwDisplays {
    pub fn new() -> Result<Self> {
        let swww_path = which::which("swww").map_err(|e| {
            PhotossError::Display(DisplayError::Query {
                message: format!("swww not found in PATH: {}", e),
            })
        })?;
        Ok(Self { swww_path })
    }

    pub fn swww_path(&self) -> &Path {
        &self.swww_path
    }
}

impl DisplaySource for SwwwDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        log::debug!("Executing: swww query");
        let output = swww_command(&self.swww_path)
            .arg("query")
            .output()
            .map_err(|e| {
                PhotossError::Display(DisplayError::Query {
                    message: format!("failed to run swww query: {}", e),
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PhotossError::Display(DisplayError::Query {
                message: format!("swww query failed: {}", stderr.trim()),
            }));
        }

        let displays = parse_swww_query(&String::from_utf8_lossy(&output.stdout));
        if displays.is_empty() {
            return Err(PhotossError::Display(DisplayError::NoDisplays));
        }
        log::info!(
            "Found swww outputs: {:?}",
            displays.iter().map(|d| d.name.as_str()).collect::<Vec<_>>()
        );
        Ok(displays)
    }
}

/// A `swww` invocation carrying the session's Wayland environment.
pub fn swww_command(swww_path: &Path) -> Command {
    let mut cmd = Command::new(swww_path);
    match std::env::var("WAYLAND_DISPLAY") {
        Ok(display) => cmd.env("WAYLAND_DISPLAY", display),
        Err(_) => cmd.env("WAYLAND_DISPLAY", "wayland-0"),
    };
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        cmd.env("XDG_RUNTIME_DIR", runtime_dir);
    }
    cmd
}

/// Parses `swww query` output.
///
/// Lines look like `: HDMI-A-1: 1920x1080, scale: 1, currently displaying: ...`;
/// newer releases drop the leading colon. Outputs are output-local, so each
/// one starts at the origin.
pub fn parse_swww_query(output: &str) -> Vec<Display> {
    output.lines().filter_map(parse_query_line).collect()
}

fn parse_query_line(line: &str) -> Option<Display> {
    let line = line.trim();
    let line = line.strip_prefix(':').unwrap_or(line).trim_start();
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let size = rest.split(',').next()?.trim();
    let (width, height) = size.split_once('x')?;
    let width = width.trim().parse().ok()?;
    let height = height.trim().parse().ok()?;

    Some(Display {
        name: name.to_string(),
        bounds: Rect {
            x: 0,
            y: 0,
            width,
            height,
        },
    })
}
