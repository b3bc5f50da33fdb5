//! Artwork handling: the on-disk thumbnail cache and palette extraction.

pub mod cache;
pub mod palette;

pub use cache::{CacheError, CacheKey, CacheLookup, CacheResult, ThumbnailCache};
pub use palette::{
    extract_blocking, ColorThiefExtractor, Palette, PaletteError, PaletteExtractor, PaletteResult,
    Rgb,
};
