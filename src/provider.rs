use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GrayImage, Luma, Pixel};
use log::{debug, warn};

use crate::errors::{StapelError, StapelResult};
use crate::listing::FileEntry;

/// A decoded image together with the listing metadata the caller needs to
/// continue the batch. The image is always RGB8; the alpha channel, when the
/// source had one, is split off into `mask` before conversion.
#[derive(Debug)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub mask: Option<GrayImage>,
    pub entry: FileEntry,
    pub file_count: usize,
    pub next_cursor: usize,
}

pub trait Provider {
    fn next_image(&mut self) -> StapelResult<Option<LoadedImage>>;
}

impl Provider for Box<dyn Provider> {
    fn next_image(&mut self) -> StapelResult<Option<LoadedImage>> {
        (**self).next_image()
    }
}

/// Passes decode failures through as skips, up to `limit` consecutive files.
/// Everything else, including exhaustion, is returned unchanged.
pub struct SkipDecodeFailures<P: Provider> {
    provider: P,
    limit: usize,
}

impl<P: Provider> SkipDecodeFailures<P> {
    pub fn new(provider: P, limit: usize) -> Self {
        Self { provider, limit }
    }
}

impl<P: Provider> Provider for SkipDecodeFailures<P> {
    fn next_image(&mut self) -> StapelResult<Option<LoadedImage>> {
        let mut skipped = 0;
        loop {
            match self.provider.next_image() {
                Err(StapelError::DecodeFailure(err)) if skipped < self.limit => {
                    skipped += 1;
                    warn!("Skipping undecodable image: {}", err);
                }
                res => return res,
            }
        }
    }
}

fn decode_failure(err: std::io::Error) -> StapelError {
    StapelError::DecodeFailure(Arc::new(image::error::ImageError::IoError(err)))
}

fn load_jpeg<P: AsRef<Path>>(path: P) -> StapelResult<DynamicImage> {
    let d = mozjpeg::Decompress::with_markers(mozjpeg::ALL_MARKERS)
        .from_path(&path)
        .map_err(decode_failure)?;
    let width = d.width();
    let height = d.height();
    let buffer: Option<Vec<[u8; 3]>> = d
        .to_colorspace(mozjpeg::ColorSpace::JCS_RGB)
        .map_err(decode_failure)?
        .read_scanlines();
    let mut img = image::RgbImage::new(width as _, height as _);
    if let Some(buffer) = buffer {
        for (row, row_buffer) in buffer.chunks(buffer.len() / height).enumerate() {
            for (col, pixel) in row_buffer.iter().enumerate() {
                *img.get_pixel_mut(col as _, row as _) = *image::Rgb::from_slice(pixel);
            }
        }
        Ok(DynamicImage::ImageRgb8(img))
    } else {
        Err(decode_failure(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "JPEG scanline decoding failed",
        )))
    }
}

fn decode_image<P: AsRef<Path>>(path: P) -> StapelResult<DynamicImage> {
    debug!("Loading {:?}", path.as_ref());
    let _t = crate::Timer::new(|e| debug!("Decoding took {}ms", e.as_millis()));
    match image::ImageFormat::from_path(&path)? {
        image::ImageFormat::Jpeg => load_jpeg(path),
        format => Ok(image::io::Reader::with_format(
            BufReader::new(std::fs::File::open(&path)?),
            format,
        )
        .decode()?),
    }
}

/// Read the EXIF orientation of a file, 1 (identity) when there is none or
/// the metadata is unreadable.
fn exif_orientation<P: AsRef<Path>>(path: P) -> u32 {
    let file = match std::fs::File::open(path.as_ref()) {
        Ok(file) => file,
        Err(_) => return 1,
    };
    exif::Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .ok()
        .and_then(|meta| {
            meta.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn alpha_mask(img: &DynamicImage) -> GrayImage {
    let rgba = img.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([rgba.get_pixel(x, y)[3]])
    })
}

/// Load an image file: decode it, apply its EXIF orientation, split off the
/// alpha channel as a mask and convert the pixels to RGB8.
pub fn load_image_from_path<P: AsRef<Path>>(
    path: P,
) -> StapelResult<(DynamicImage, Option<GrayImage>)> {
    let img = decode_image(&path)?;
    let img = apply_orientation(img, exif_orientation(&path));
    let mask = if img.color().has_alpha() {
        Some(alpha_mask(&img))
    } else {
        None
    };
    Ok((DynamicImage::ImageRgb8(img.to_rgb8()), mask))
}
