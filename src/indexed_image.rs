use crate::colors::RGBTuple;
use image::{ColorType, DynamicImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to decode PNG: {0}")]
    Png(#[from] png::DecodingError),
    #[error("image must be indexed (8-bit palette indices), but it is {found:?}")]
    ModeMismatch { found: ColorType },
    #[error("scaled image would be {width}x{height}; use a larger scale")]
    ZeroSize { width: u32, height: u32 },
    #[error("palette has {palette_len} entries, but pixel {position} uses index {index}")]
    PaletteOverflow {
        position: usize,
        index: u8,
        palette_len: usize,
    },
    #[error("palette must hold 1 to 256 colours, got {0}")]
    BadPalette(usize),
    #[error("expected {expected} pixel indices for the image size, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A palette image: up to 256 RGB colours and a row-major matrix of indices into
/// them, origin at the top-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Vec<RGBTuple>,
    indices: Vec<u8>,
}

impl IndexedImage {
    pub fn new(
        width: u32,
        height: u32,
        palette: Vec<RGBTuple>,
        indices: Vec<u8>,
    ) -> Result<Self, ImageError> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(ImageError::BadPalette(palette.len()));
        }

        let expected: usize = width as usize * height as usize;
        if indices.len() != expected {
            return Err(ImageError::DimensionMismatch {
                expected,
                actual: indices.len(),
            });
        }

        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= palette.len())
        {
            return Err(ImageError::PaletteOverflow {
                position,
                index,
                palette_len: palette.len(),
            });
        }

        Ok(Self {
            width,
            height,
            palette,
            indices,
        })
    }

    /// Builds an indexed image from a decoded index buffer and its palette.
    ///
    /// Only single-channel 8-bit buffers carry palette indices; any other colour
    /// type is rejected.
    pub fn from_index_buffer(
        buffer: DynamicImage,
        palette: Vec<RGBTuple>,
    ) -> Result<Self, ImageError> {
        match buffer {
            DynamicImage::ImageLuma8(indices) => {
                let (width, height) = indices.dimensions();
                Self::new(width, height, palette, indices.into_raw())
            }
            other => Err(ImageError::ModeMismatch {
                found: other.color(),
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.indices.len()
    }

    pub fn palette(&self) -> &[RGBTuple] {
        &self.palette
    }

    /// Palette index at column `col`, row `row`.
    pub fn index_at(&self, col: u32, row: u32) -> u8 {
        self.indices[row as usize * self.width as usize + col as usize]
    }
}
