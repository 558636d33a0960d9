//! Image transcoder for the upload pipeline.
//!
//! Decodes an uploaded raster image of any supported format, scales it
//! down to fit the configured bounds (never up), and re-encodes it as a
//! baseline JPEG at the configured quality. Transcoding is deterministic:
//! a failure is permanent for that input and is never retried.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, Rgb, RgbImage};

use crate::error::CoreError;

/// File extension of every optimized asset.
pub const OUTPUT_EXTENSION: &str = "jpg";

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_QUALITY: u8 = 80;

/// Size and quality bounds for the optimized representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeConstraints {
    max_width: u32,
    max_height: Option<u32>,
    quality: u8,
}

impl TranscodeConstraints {
    /// Validate and build constraints. `quality` must be in `1..=100` and
    /// both bounds must be non-zero.
    pub fn new(max_width: u32, max_height: Option<u32>, quality: u8) -> Result<Self, CoreError> {
        if max_width == 0 || max_height == Some(0) {
            return Err(CoreError::Validation(
                "Image bounds must be greater than zero".into(),
            ));
        }
        if !(1..=100).contains(&quality) {
            return Err(CoreError::Validation(format!(
                "Image quality must be between 1 and 100, got {quality}"
            )));
        }
        Ok(Self {
            max_width,
            max_height,
            quality,
        })
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> Option<u32> {
        self.max_height
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for TranscodeConstraints {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: None,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Output of a successful [`transcode`].
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Format detected from the input bytes.
    pub source_format: ImageFormat,
}

/// Largest `(width, height)` that fits the bounds with the source aspect
/// ratio preserved. Sources already inside the bounds are returned as is.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: Option<u32>) -> (u32, u32) {
    let max_height = max_height.unwrap_or(u32::MAX);
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let scaled_w = (f64::from(width) * ratio).round() as u32;
    let scaled_h = (f64::from(height) * ratio).round() as u32;

    (scaled_w.clamp(1, max_width), scaled_h.clamp(1, max_height))
}

/// Detect the format of raw image bytes without decoding them.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Produce the optimized representation of `bytes`.
///
/// Fails with [`CoreError::UnsupportedFormat`] when the bytes are not a
/// decodable raster image and with [`CoreError::TranscodeFailure`] when
/// decoding or encoding breaks part-way. No partial output is returned.
pub fn transcode(bytes: &[u8], constraints: &TranscodeConstraints) -> Result<Transcoded, CoreError> {
    let source_format = detect_format(bytes)
        .ok_or_else(|| CoreError::UnsupportedFormat("Unrecognised image data".into()))?;

    let image = decode_oriented(bytes, source_format)?;

    let (width, height) = fit_within(
        image.width(),
        image.height(),
        constraints.max_width,
        constraints.max_height,
    );
    let resized = if (width, height) == (image.width(), image.height()) {
        image
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    };

    let rgb = flatten_onto_white(&resized);
    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, constraints.quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| CoreError::TranscodeFailure(format!("Failed to encode image: {e}")))?;

    Ok(Transcoded {
        bytes: out,
        width,
        height,
        source_format,
    })
}

/// Decode `bytes` and apply any EXIF orientation so the optimized copy is
/// upright even though the orientation tag is not carried over.
fn decode_oriented(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, CoreError> {
    let reader = ImageReader::with_format(Cursor::new(bytes), format);
    let mut decoder = reader.into_decoder().map_err(classify_decode_error)?;
    let orientation = decoder.orientation().map_err(classify_decode_error)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(classify_decode_error)?;
    image.apply_orientation(orientation);
    Ok(image)
}

fn classify_decode_error(err: ImageError) -> CoreError {
    match err {
        ImageError::Unsupported(e) => CoreError::UnsupportedFormat(e.to_string()),
        other => CoreError::TranscodeFailure(format!("Failed to decode image: {other}")),
    }
}

/// JPEG has no alpha channel; composite transparent pixels onto white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
