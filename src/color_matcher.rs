//! Nearest-block colour matching.
//!
//! Image palette entries and block swatches are converted to CIE L*a*b* and each
//! palette entry is assigned the swatch with the smallest ΔE*76. The work is done
//! once per palette entry, never per pixel.

use crate::block_definitions::Swatch;
use crate::colors::{rgb_to_lab, RGBTuple};
use palette::color_difference::DeltaE;
use palette::Lab;
use thiserror::Error;

/// A colour expressed in a perceptually uniform space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerceptualColor(Lab);

impl PerceptualColor {
    pub fn from_rgb(rgb: RGBTuple) -> Self {
        Self(rgb_to_lab(rgb))
    }

    /// CIE76 difference: Euclidean distance in L*a*b*.
    pub fn distance(&self, other: &PerceptualColor) -> f32 {
        self.0.delta_e(other.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("no reference colours to match against")]
    EmptyReference,
}

/// Returns, for each query colour, the index of the nearest reference colour and
/// its distance.
///
/// Ties resolve to the reference that comes first.
pub fn nearest_matches(
    references: &[RGBTuple],
    queries: &[RGBTuple],
) -> Result<Vec<(usize, f32)>, MatchError> {
    if references.is_empty() {
        return Err(MatchError::EmptyReference);
    }

    let references: Vec<PerceptualColor> = references
        .iter()
        .copied()
        .map(PerceptualColor::from_rgb)
        .collect();

    Ok(queries
        .iter()
        .map(|&rgb| nearest(&references, &PerceptualColor::from_rgb(rgb)))
        .collect())
}

/// Index and distance of the closest reference. `references` must be non-empty.
fn nearest(references: &[PerceptualColor], query: &PerceptualColor) -> (usize, f32) {
    let mut best: usize = 0;
    let mut best_distance: f32 = f32::INFINITY;

    for (index, reference) in references.iter().enumerate() {
        let distance: f32 = reference.distance(query);
        // Strict comparison keeps the earliest of equally close references
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }

    (best, best_distance)
}

/// Mapping from an image's palette indices to swatch indices.
///
/// Built once per image and read-only afterwards.
#[derive(Clone, Debug)]
pub struct PaletteIndexMap {
    swatch_of: Vec<usize>,
    distance_of: Vec<f32>,
}

impl PaletteIndexMap {
    pub fn build(swatches: &[Swatch], palette: &[RGBTuple]) -> Result<Self, MatchError> {
        let references: Vec<RGBTuple> = swatches.iter().map(|swatch| swatch.rgb).collect();
        let (swatch_of, distance_of): (Vec<usize>, Vec<f32>) =
            nearest_matches(&references, palette)?.into_iter().unzip();

        Ok(Self {
            swatch_of,
            distance_of,
        })
    }

    pub fn len(&self) -> usize {
        self.swatch_of.len()
    }

    /// Swatch index for a palette index, if the palette has that entry.
    pub fn swatch_index(&self, palette_index: u8) -> Option<usize> {
        self.swatch_of.get(palette_index as usize).copied()
    }

    /// ΔE between a palette entry and the swatch it was matched to.
    pub fn distance(&self, palette_index: u8) -> Option<f32> {
        self.distance_of.get(palette_index as usize).copied()
    }

    /// Resolves every palette entry to its block label.
    pub fn labels<'a>(&self, swatches: &'a [Swatch]) -> Vec<&'a str> {
        self.swatch_of
            .iter()
            .map(|&index| swatches[index].label.as_str())
            .collect()
    }
}
