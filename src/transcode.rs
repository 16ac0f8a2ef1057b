//! Re-encoding of guest photos before upload: a size-bounded copy for
//! viewing and a square thumbnail for the grid.

use std::sync::Arc;

use anyhow::Context;
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage,
};

use crate::{ConfettiError, ConfettiResult};

pub const MAX_DIMENSION: u32 = 1200;
pub const DEFAULT_BUDGET: usize = 300 * 1024;
pub const THUMBNAIL_EDGE: u32 = 300;

pub const START_QUALITY: u8 = 90;
pub const QUALITY_STEP: u8 = 10;
pub const QUALITY_FLOOR: u8 = 10;
pub const THUMBNAIL_QUALITY: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Target size for an image so that neither side exceeds [`MAX_DIMENSION`],
/// keeping the aspect ratio. Never upscales.
pub fn bounded_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return (width, height);
    }

    let scale = |side: u32, longer: u32| -> u32 {
        let scaled = (side as u64 * MAX_DIMENSION as u64 + longer as u64 / 2) / longer as u64;
        (scaled as u32).max(1)
    };

    if width >= height {
        (MAX_DIMENSION, scale(height, width))
    } else {
        (scale(width, height), MAX_DIMENSION)
    }
}

/// Largest centered square: `(x, y, side)`.
pub fn centered_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Decodes, bounds to [`MAX_DIMENSION`] and encodes as JPEG, lowering the
/// quality from [`START_QUALITY`] in [`QUALITY_STEP`]s until the result fits
/// `budget` bytes or the quality hits [`QUALITY_FLOOR`]. Whatever comes out
/// at the floor is accepted.
#[tracing::instrument(skip(bytes), fields(input = bytes.len()))]
pub fn recompress_to_budget(bytes: &[u8], budget: usize) -> ConfettiResult<Transcoded> {
    let decoded = decode(bytes)?;
    let (width, height) = bounded_dimensions(decoded.width(), decoded.height());
    let resized = if (width, height) == decoded.dimensions() {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };
    let source = flatten_onto_white(&resized);

    let mut quality = START_QUALITY;
    loop {
        let encoded = encode_jpeg(&source, quality)?;
        if encoded.len() <= budget || quality <= QUALITY_FLOOR {
            tracing::debug!(width, height, quality, output = encoded.len(), "recompressed");
            return Ok(Transcoded { bytes: encoded, width, height, quality });
        }
        quality -= QUALITY_STEP;
    }
}

/// Crops the largest centered square and scales it to `edge`×`edge`.
#[tracing::instrument(skip(bytes), fields(input = bytes.len()))]
pub fn square_thumbnail(bytes: &[u8], edge: u32) -> ConfettiResult<Transcoded> {
    if edge == 0 {
        return Err(ConfettiError::validation("thumbnail edge must be positive"));
    }

    let decoded = decode(bytes)?;
    let (x, y, side) = centered_square(decoded.width(), decoded.height());
    let square = decoded
        .crop_imm(x, y, side, side)
        .resize_exact(edge, edge, FilterType::Triangle);

    let encoded = encode_jpeg(&flatten_onto_white(&square), THUMBNAIL_QUALITY)?;
    Ok(Transcoded { bytes: encoded, width: edge, height: edge, quality: THUMBNAIL_QUALITY })
}

pub async fn recompress_blocking(bytes: Arc<[u8]>, budget: usize) -> ConfettiResult<Transcoded> {
    tokio::task::spawn_blocking(move || recompress_to_budget(&bytes, budget))
        .await
        .context("recompress task")?
}

pub async fn thumbnail_blocking(bytes: Arc<[u8]>, edge: u32) -> ConfettiResult<Transcoded> {
    tokio::task::spawn_blocking(move || square_thumbnail(&bytes, edge))
        .await
        .context("thumbnail task")?
}

fn decode(bytes: &[u8]) -> ConfettiResult<DynamicImage> {
    let decoded = image::load_from_memory(bytes)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ConfettiError::validation("image has no pixels"));
    }
    Ok(decoded)
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u16;
        let over = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> ConfettiResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(img)?;
    Ok(buf)
}
