use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{DecodeError, PhotossError};
use crate::Result;

/// Rotation needed before display, from the EXIF orientation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise270,
}

impl Rotation {
    /// Tag 6 is 90° clockwise, tag 8 is 270° clockwise. Everything else,
    /// mirrored variants included, is shown as stored.
    pub fn from_orientation(tag: u32) -> Self {
        match tag {
            6 => Rotation::Clockwise90,
            8 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    pub fn swaps_axes(&self) -> bool {
        !matches!(self, Rotation::None)
    }
}

/// A decoded image, already rotated upright.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
    /// Width as stored in the file, before rotation.
    pub raw_width: u32,
    /// Height as stored in the file, before rotation.
    pub raw_height: u32,
    pub rotation: Rotation,
}

pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// Decodes from the filesystem with [`decode_oriented`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        decode_oriented(path)
    }
}

pub fn decode_oriented(path: &Path) -> Result<DecodedImage> {
    let open_error = |source| {
        PhotossError::Decode(DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })
    };

    let img = image::ImageReader::open(path)
        .map_err(open_error)?
        .with_guessed_format()
        .map_err(open_error)?
        .decode()
        .map_err(|e| {
            PhotossError::Decode(DecodeError::Format {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;

    let pixels = img.to_rgba8();
    let (raw_width, raw_height) = pixels.dimensions();
    let rotation = read_orientation(path).map(Rotation::from_orientation).unwrap_or_default();

    let pixels = match rotation {
        Rotation::None => pixels,
        Rotation::Clockwise90 => image::imageops::rotate90(&pixels),
        Rotation::Clockwise270 => image::imageops::rotate270(&pixels),
    };

    Ok(DecodedImage {
        path: path.to_path_buf(),
        pixels,
        raw_width,
        raw_height,
        rotation,
    })
}

/// EXIF orientation tag of the primary image, if the file carries one.
pub fn read_orientation(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let orientation = field.value.get_uint(0)?;
    log::debug!("exif orientation {} for {}", orientation, path.display());
    Some(orientation)
}
