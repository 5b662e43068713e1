use crate::colors::{color_text_to_rgb_tuple, RGBTuple};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Embedded block colour table: label -> representative sRGB colour.
const DEFAULT_BLOCK_COLORS: &str = include_str!("../assets/block_colors.json");

static DEFAULT_SWATCHES: OnceCell<Vec<Swatch>> = OnceCell::new();

/// A block label paired with its representative colour.
///
/// The label may carry a block-state suffix such as `oak_log[axis=z]`; it is
/// written to the output verbatim and never parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub label: String,
    pub rgb: RGBTuple,
}

impl Swatch {
    pub fn new(label: impl Into<String>, rgb: RGBTuple) -> Self {
        Self {
            label: label.into(),
            rgb,
        }
    }
}

#[derive(Debug, Error)]
pub enum BlockDataError {
    #[error("failed to read block table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed block table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block '{label}' has an unrecognized colour '{text}'")]
    UnknownColor { label: String, text: String },
    #[error("block table contains no entries")]
    Empty,
}

/// Colour value as it may appear in a block table file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SwatchColor {
    Triple([u8; 3]),
    Text(String),
}

/// Parses a JSON object of `label -> [r, g, b]` (or `label -> "#rrggbb"`).
///
/// Entries keep the order they have in the document; that order decides ties
/// in colour matching.
pub fn parse_block_table(json: &str) -> Result<Vec<Swatch>, BlockDataError> {
    let table: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

    let swatches: Vec<Swatch> = table
        .into_iter()
        .map(|(label, value)| -> Result<Swatch, BlockDataError> {
            let rgb: RGBTuple = match serde_json::from_value::<SwatchColor>(value)? {
                SwatchColor::Triple([r, g, b]) => (r, g, b),
                SwatchColor::Text(text) => color_text_to_rgb_tuple(&text)
                    .ok_or_else(|| BlockDataError::UnknownColor {
                        label: label.clone(),
                        text,
                    })?,
            };
            Ok(Swatch::new(label, rgb))
        })
        .collect::<Result<_, BlockDataError>>()?;

    if swatches.is_empty() {
        return Err(BlockDataError::Empty);
    }

    Ok(swatches)
}

/// Loads an external block table from disk.
pub fn load_block_table(path: &Path) -> Result<Vec<Swatch>, BlockDataError> {
    let contents: String = fs::read_to_string(path).map_err(|source| BlockDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_block_table(&contents)
}

/// The built-in block table, parsed on first use and shared for the rest of the run.
pub fn default_swatches() -> Result<&'static [Swatch], BlockDataError> {
    DEFAULT_SWATCHES
        .get_or_try_init(|| parse_block_table(DEFAULT_BLOCK_COLORS))
        .map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_table_loads() {
        let swatches = default_swatches().unwrap();
        assert_eq!(swatches.len(), 218);

        // Document order is preserved
        assert_eq!(swatches[0].label, "acacia_log");
        assert_eq!(swatches[1].label, "acacia_planks");
        assert_eq!(swatches.last().unwrap().label, "yellow_wool");

        assert!(swatches.iter().any(|s| s.label == "observer[facing=up]"));
    }

    #[test]
    fn test_default_table_is_shared() {
        let first = default_swatches().unwrap();
        let second = default_swatches().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_parse_mixed_color_forms() {
        let json = r##"{
            "stone": [125, 125, 125],
            "snow_block": "#f0fbfb",
            "white_wool": "white",
            "oak_log[axis=z]": "#a80"
        }"##;
        let swatches = parse_block_table(json).unwrap();

        assert_eq!(
            swatches,
            vec![
                Swatch::new("stone", (125, 125, 125)),
                Swatch::new("snow_block", (240, 251, 251)),
                Swatch::new("white_wool", (249, 255, 254)),
                Swatch::new("oak_log[axis=z]", (170, 136, 0)),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_tables() {
        assert!(matches!(
            parse_block_table("{}"),
            Err(BlockDataError::Empty)
        ));
        assert!(matches!(
            parse_block_table(r#"{"stone": "not a colour"}"#),
            Err(BlockDataError::UnknownColor { .. })
        ));
        assert!(matches!(
            parse_block_table(r#"{"stone": [300, 0, 0]}"#),
            Err(BlockDataError::Json(_))
        ));
        assert!(matches!(
            parse_block_table("[1, 2, 3]"),
            Err(BlockDataError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"red_wool": [160, 39, 34], "lime_wool": [94, 168, 24]}}"#).unwrap();

        let swatches = load_block_table(file.path()).unwrap();
        assert_eq!(swatches.len(), 2);
        assert_eq!(swatches[1], Swatch::new("lime_wool", (94, 168, 24)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_block_table(&missing),
            Err(BlockDataError::Io { .. })
        ));
    }
}
