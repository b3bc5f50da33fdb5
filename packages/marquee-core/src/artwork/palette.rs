//! Dominant-colour extraction from artwork.
//!
//! Decoding is done with `image`; quantization with the modified median cut
//! implementation from `color_thief`. Extraction is CPU-bound, so async
//! callers go through [`extract_blocking`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_thief::ColorFormat;
use image::ImageReader;
use thiserror::Error;

/// Quality range accepted by the quantizer (1 = every pixel sampled).
const QUANTIZER_QUALITY: (u32, u32) = (1, 10);

/// Palette sizes accepted by the quantizer.
const QUANTIZER_COLORS: (usize, usize) = (2, 255);

#[derive(Debug, Error)]
pub enum PaletteError {
    /// The artwork could not be opened or decoded.
    #[error("{} is not a readable image: {reason}", .path.display())]
    UnreadableImage { path: PathBuf, reason: String },

    /// The quantizer rejected the image.
    #[error("Colour quantization failed: {0}")]
    Quantize(String),

    /// The blocking extraction task did not complete.
    #[error("Palette worker failed: {0}")]
    Worker(String),
}

pub type PaletteResult<T> = Result<T, PaletteError>;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Formats as a LIFX colour string, e.g. `rgb:10,20,30`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb:{},{},{}", self.r, self.g, self.b)
    }
}

/// Colours ranked by prominence, most prominent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette(Vec<Rgb>);

impl Palette {
    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self(colors)
    }
}

/// Derives a palette from an image file.
pub trait PaletteExtractor: Send + Sync {
    /// Extracts up to `color_count` distinct colours from the image at `image_path`.
    ///
    /// `quality` is a sampling stride: higher values look at fewer pixels.
    /// Any positive value is accepted. Results are deterministic for a
    /// given file.
    fn extract(&self, image_path: &Path, color_count: usize, quality: u32)
        -> PaletteResult<Palette>;
}

/// [`PaletteExtractor`] backed by `color_thief`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorThiefExtractor;

impl PaletteExtractor for ColorThiefExtractor {
    fn extract(
        &self,
        image_path: &Path,
        color_count: usize,
        quality: u32,
    ) -> PaletteResult<Palette> {
        if color_count == 0 {
            return Ok(Palette::default());
        }

        let unreadable = |reason: String| PaletteError::UnreadableImage {
            path: image_path.to_path_buf(),
            reason,
        };

        // Sniff the format from content: thumbnails are not always the JPEG
        // their file name suggests.
        let image = ImageReader::open(image_path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| unreadable(e.to_string()))?
            .decode()
            .map_err(|e| unreadable(e.to_string()))?;
        let pixels = image.to_rgb8();

        let quality = quality.clamp(QUANTIZER_QUALITY.0, QUANTIZER_QUALITY.1) as u8;
        let max_colors = color_count.clamp(QUANTIZER_COLORS.0, QUANTIZER_COLORS.1) as u8;

        let colors =
            color_thief::get_palette(pixels.as_raw(), ColorFormat::Rgb, quality, max_colors)
                .map_err(|e| PaletteError::Quantize(format!("{e:?}")))?;

        let mut seen = HashSet::new();
        let mut palette: Vec<Rgb> = colors
            .into_iter()
            .map(|c| Rgb::new(c.r, c.g, c.b))
            .filter(|rgb| seen.insert(*rgb))
            .collect();
        palette.truncate(color_count);

        log::debug!(
            "[Palette] {} -> {:?}",
            image_path.display(),
            palette.iter().map(ToString::to_string).collect::<Vec<_>>()
        );

        Ok(Palette(palette))
    }
}

/// Runs `extractor` on the blocking thread pool.
pub async fn extract_blocking(
    extractor: Arc<dyn PaletteExtractor>,
    image_path: PathBuf,
    color_count: usize,
    quality: u32,
) -> PaletteResult<Palette> {
    tokio::task::spawn_blocking(move || extractor.extract(&image_path, color_count, quality))
        .await
        .map_err(|e| PaletteError::Worker(e.to_string()))?
}
