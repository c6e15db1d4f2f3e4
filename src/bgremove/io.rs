//! Image source and sink helpers.

use std::path::Path;

use image::{GenericImageView, ImageReader, Pixel, PixelWithColorType, Rgb};
use tracing::debug;

use crate::error::{Error, Result};
use crate::Image;

/// Load an image file and convert it to 8-bit RGB.
///
/// # Errors
///
/// * `Error::ImageLoad` - When the file cannot be opened or decoded
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> Result<Image<Rgb<u8>>> {
    let path = path.as_ref();

    let image = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = image.dimensions();
    debug!(path = %path.display(), width, height, "loaded image");

    Ok(image.to_rgb8())
}

/// Decode an in-memory encoded image and convert it to 8-bit RGB.
///
/// # Errors
///
/// * `Error::ImageDecode` - When the format cannot be guessed or decoding fails
pub fn decode_rgb_image(bytes: &[u8]) -> Result<Image<Rgb<u8>>> {
    let image = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| Error::ImageDecode {
            source: image::ImageError::IoError(error),
        })?
        .decode()
        .map_err(|source| Error::ImageDecode { source })?;

    Ok(image.to_rgb8())
}

/// Write an image or mask; the format follows the file extension.
///
/// # Errors
///
/// * `Error::ImageSave` - When encoding or writing fails
pub fn save_image<P, Q>(image: &Image<P>, path: Q) -> Result<()>
where
    P: Pixel<Subpixel = u8> + PixelWithColorType,
    Q: AsRef<Path>,
{
    let path = path.as_ref();
    image.save(path).map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "saved image");
    Ok(())
}
