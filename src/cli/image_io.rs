//! CLI image helpers.
//!
//! Normalizes extensions, loads RGB buffers, and writes files with the
//! encoder matching the output extension.
use std::fs::File;
use std::io::{Error, ErrorKind};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};
use tracing::debug;

use super::AppError;

/// Quality of written JPEG files
const JPEG_QUALITY: u8 = 90;

/// Normalizes the extension of a path to lowercase.
pub(super) fn normalized_extension(path: impl AsRef<Path>) -> Option<String>
{
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether an extension names a lossy format that destroys LSB payloads.
pub(super) fn is_lossy(extension: Option<&str>) -> bool
{
    matches!(extension, Some("jpg" | "jpeg"))
}

/// Loads an image from the specified path and converts it to an RGB buffer.
///
/// # Errors
///
/// * [`AppError::Read`] when the path is a directory
/// * [`AppError::ImageOpen`] when the image cannot be loaded
pub(super) fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, AppError>
{
    let path = path.as_ref();
    if path.is_dir()
    {
        let message = format!("{} is a directory", path.display());
        return Err(AppError::Read {
            path: path.into(),
            source: Error::new(ErrorKind::IsADirectory, message),
        });
    }

    let image = image::open(path)
        .map_err(|source| AppError::ImageOpen {
            path: path.into(),
            source,
        })
        .map(DynamicImage::into_rgb8)?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "image loaded"
    );
    Ok(image)
}

/// Writes `image` to `output` with the encoder chosen by its extension.
///
/// # Errors
///
/// * [`AppError::UnsupportedFormat`] when the extension is not png, bmp, jpg
///   or jpeg
/// * [`AppError::Write`] when the file cannot be created
/// * [`AppError::ImageEncode`] when the image cannot be encoded
pub(super) fn write_image(
    image: &RgbImage,
    output: impl AsRef<Path>,
) -> Result<(), AppError>
{
    let output = output.as_ref();
    let extension = normalized_extension(output);
    let format = match extension.as_deref()
    {
        Some(ext @ ("png" | "bmp" | "jpg" | "jpeg")) => ext,
        other =>
        {
            return Err(AppError::UnsupportedFormat {
                extension: other.unwrap_or("<unknown>").into(),
            });
        },
    };

    let mut file = File::create(output).map_err(|source| AppError::Write {
        path: output.into(),
        source,
    })?;
    let (width, height) = image.dimensions();

    let result = match format
    {
        "png" => PngEncoder::new_with_quality(
            &mut file,
            CompressionType::Default,
            FilterType::Adaptive,
        )
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8),
        "bmp" => BmpEncoder::new(&mut file).encode(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        _ => JpegEncoder::new_with_quality(&mut file, JPEG_QUALITY).encode(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
    };

    result.map_err(|source| AppError::ImageEncode {
        path: output.into(),
        target_format: format.into(),
        source,
    })
}
