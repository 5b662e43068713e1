use crate::colors::RGBTuple;
use crate::indexed_image::{ImageError, IndexedImage};
use image::imageops::{self, ColorMap, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Rgb};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Channel levels of the 6x6x6 web-safe palette.
const WEB_LEVELS: [u8; 6] = [0, 51, 102, 153, 204, 255];

/// The 216-colour web-safe palette, indexed as `r * 36 + g * 6 + b` over levels.
#[derive(Clone, Copy, Debug)]
pub struct WebPalette;

impl WebPalette {
    pub const LEN: usize = 216;

    fn level(channel: u8) -> usize {
        // 51 apart, so rounding to the nearest multiple picks the closest level
        ((channel as usize + 25) / 51).min(5)
    }

    pub fn colors() -> Vec<RGBTuple> {
        (0..Self::LEN)
            .map(|index| {
                (
                    WEB_LEVELS[index / 36],
                    WEB_LEVELS[(index / 6) % 6],
                    WEB_LEVELS[index % 6],
                )
            })
            .collect()
    }
}

impl ColorMap for WebPalette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        let [r, g, b] = color.0;
        Self::level(r) * 36 + Self::level(g) * 6 + Self::level(b)
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        (index < Self::LEN).then(|| {
            Rgb([
                WEB_LEVELS[index / 36],
                WEB_LEVELS[(index / 6) % 6],
                WEB_LEVELS[index % 6],
            ])
        })
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        let index: usize = self.index_of(color);
        if let Some(mapped) = self.lookup(index) {
            *color = mapped;
        }
    }
}

/// Target dimensions after scaling; fractional pixels are dropped.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> Result<(u32, u32), ImageError> {
    let scaled_width: u32 = (width as f64 * scale) as u32;
    let scaled_height: u32 = (height as f64 * scale) as u32;

    if scaled_width == 0 || scaled_height == 0 {
        return Err(ImageError::ZeroSize {
            width: scaled_width,
            height: scaled_height,
        });
    }

    Ok((scaled_width, scaled_height))
}

/// Scales an index buffer with nearest-neighbour sampling and pairs it with its palette.
fn scale_indices(
    indices: GrayImage,
    palette: Vec<RGBTuple>,
    scale: f64,
) -> Result<IndexedImage, ImageError> {
    let (width, height) = scaled_dimensions(indices.width(), indices.height(), scale)?;

    let indices: GrayImage = if (width, height) == indices.dimensions() {
        indices
    } else {
        imageops::resize(&indices, width, height, FilterType::Nearest)
    };

    IndexedImage::from_index_buffer(DynamicImage::ImageLuma8(indices), palette)
}

/// Reduces an image to the web-safe palette and scales it.
pub fn quantize(image: &DynamicImage, scale: f64) -> Result<IndexedImage, ImageError> {
    let indices: GrayImage = imageops::index_colors(&image.to_rgb8(), &WebPalette);
    scale_indices(indices, WebPalette::colors(), scale)
}

/// Unpacks one scanline of 1, 2, 4 or 8-bit palette indices.
fn unpack_indices(line: &[u8], width: u32, bits: usize) -> impl Iterator<Item = u8> + '_ {
    let per_byte: usize = 8 / bits;
    let mask: u8 = ((1u16 << bits) - 1) as u8;

    (0..width as usize).map(move |col| {
        // Leftmost pixel sits in the high bits
        let shift: usize = 8 - bits * (col % per_byte + 1);
        (line[col / per_byte] >> shift) & mask
    })
}

/// Reads a palette-mode PNG as-is: its own palette and its raw index matrix.
///
/// Returns `None` for any other PNG colour type.
fn read_indexed_png(path: &Path) -> Result<Option<(GrayImage, Vec<RGBTuple>)>, ImageError> {
    let mut decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info: &png::Info<'_> = reader.info();
    if info.color_type != png::ColorType::Indexed {
        return Ok(None);
    }
    let palette: Vec<RGBTuple> = info
        .palette
        .as_deref()
        .unwrap_or_default()
        .chunks_exact(3)
        .map(|rgb| (rgb[0], rgb[1], rgb[2]))
        .collect();
    let bits: usize = info.bit_depth as usize;

    let mut buffer: Vec<u8> = vec![0; reader.output_buffer_size()];
    let frame: png::OutputInfo = reader.next_frame(&mut buffer)?;

    let indices: Vec<u8> = buffer
        .chunks(frame.line_size)
        .take(frame.height as usize)
        .flat_map(|line| unpack_indices(line, frame.width, bits))
        .collect();
    let expected: usize = frame.width as usize * frame.height as usize;
    let actual: usize = indices.len();

    let indices: GrayImage = GrayImage::from_raw(frame.width, frame.height, indices)
        .ok_or(ImageError::DimensionMismatch { expected, actual })?;
    Ok(Some((indices, palette)))
}

/// Decodes the file at `path` into a scaled indexed image.
///
/// Palette-mode PNGs keep their own palette; everything else goes through [`quantize`].
pub fn load_indexed_image(path: &Path, scale: f64) -> Result<IndexedImage, ImageError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;

    if reader.format() == Some(ImageFormat::Png) {
        if let Some((indices, palette)) = read_indexed_png(path)? {
            log::debug!(
                "Decoded {} ({}x{}, indexed with {} colours)",
                path.display(),
                indices.width(),
                indices.height(),
                palette.len()
            );
            return scale_indices(indices, palette, scale);
        }
    }

    let image: DynamicImage = reader.decode()?;
    log::debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    quantize(&image, scale)
}
