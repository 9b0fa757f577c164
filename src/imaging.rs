//! Image read/write helpers with validation.
//!
//! Every check returns a [`ValidationError`] instead of stopping the process,
//! so the caller decides whether a bad image is fatal.

use std::fs;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::error::{DecodingError, ImageFormatHint};
use image::{AnimationDecoder, DynamicImage, ImageError, ImageFormat, ImageReader, RgbImage};
use tracing::{debug, warn};

use crate::config::Shape;
use crate::error::ValidationError;

/// Decoded 8-bit RGB image
pub type PixelGrid = RgbImage;

/// Extensions [`write_image`] accepts
const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".bmp", ".dib", ".jpeg", ".jpg", ".jpe", ".png", ".pbm", ".pgm", ".ppm", ".tiff", ".tif",
];

/// Extensions [`write_image`] accepts, dot included
pub fn supported_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

fn format_for_extension(ext: &str) -> Option<ImageFormat> {
    match ext.to_ascii_lowercase().as_str() {
        "bmp" | "dib" => Some(ImageFormat::Bmp),
        "jpeg" | "jpg" | "jpe" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "pbm" | "pgm" | "ppm" => Some(ImageFormat::Pnm),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

fn io_error(path: &Path, source: std::io::Error) -> ValidationError {
    ValidationError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn undecodable(path: &Path, source: ImageError) -> ValidationError {
    ValidationError::Undecodable {
        path: path.to_path_buf(),
        source,
    }
}

/// Read an image file as RGB.
///
/// The format is detected from the content, not the extension.
pub fn read_image(path: &Path) -> Result<PixelGrid, ValidationError> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let image = image::load_from_memory(&bytes).map_err(|e| undecodable(path, e))?;
    Ok(image.to_rgb8())
}

/// First frame of an animated GIF, alpha dropped
pub fn read_first_frame(path: &Path) -> Result<PixelGrid, ValidationError> {
    let file = fs::File::open(path).map_err(|e| io_error(path, e))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| undecodable(path, e))?;

    let frame = decoder
        .into_frames()
        .next()
        .ok_or_else(|| {
            undecodable(
                path,
                ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Exact(ImageFormat::Gif),
                    "animation has no frames",
                )),
            )
        })?
        .map_err(|e| undecodable(path, e))?;

    Ok(DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8())
}

/// Write `image` to `path`, creating the parent directory.
///
/// The extension must be one of [`supported_extensions`], and the written
/// file is decoded again to make sure it is a valid image.
pub fn write_image(image: &PixelGrid, path: &Path) -> Result<(), ValidationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }

    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(format_for_extension)
        .ok_or_else(|| ValidationError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;

    image
        .save_with_format(path, format)
        .map_err(|source| ValidationError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    if !check_image_file_validity(path) {
        return Err(ValidationError::CorruptOutput {
            path: path.to_path_buf(),
        });
    }

    debug!("wrote {}", path.display());
    Ok(())
}

/// True if `path` is a non-empty file that decodes as an image
pub fn check_image_file_validity(path: &Path) -> bool {
    let non_empty = fs::metadata(path).is_ok_and(|m| m.len() != 0);
    if !non_empty {
        return false;
    }

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .is_ok_and(|reader| reader.decode().is_ok())
}

/// Shape of the image at `path` as decoded by [`read_image`]
/// (or [`read_first_frame`] for GIFs)
pub fn image_shape(path: &Path) -> Result<Shape, ValidationError> {
    let image = if has_extension(path, "gif") {
        read_first_frame(path)?
    } else {
        read_image(path)?
    };
    Ok(Shape::new(image.height(), image.width(), 3))
}

/// Fail unless the image at `path` has exactly the `expected` shape
pub fn check_shape(path: &Path, expected: Shape) -> Result<(), ValidationError> {
    let actual = image_shape(path)?;

    if actual != expected {
        warn!("You should use one of the rescale options");
        return Err(ValidationError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
