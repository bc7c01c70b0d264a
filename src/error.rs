use std::path::PathBuf;

use thiserror::Error;

/// Library error type for canvas, font, and display operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Raster surface dimensions are unusable (zero width or height).
    #[error("invalid surface size {width}x{height}")]
    Surface { width: u32, height: u32 },

    /// No installed font matched the requested family.
    #[error("no font found for '{0}'")]
    FontNotFound(String),

    /// The font file exists but could not be parsed into glyph outlines.
    #[error("unusable font face: {0}")]
    BadFont(String),

    /// Glyph description data references points or instructions out of bounds.
    #[error("invalid glyph data: {0}")]
    BadGlyphData(String),

    /// The image file could not be opened for reading.
    #[error("could not open image {}", path.display())]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JPEG decode error from the codec.
    #[error(transparent)]
    Jpeg(#[from] jpeg_decoder::Error),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Display or GPU error from the presentation layer.
    #[error("render error: {0}")]
    Render(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
