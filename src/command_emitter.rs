//! Turns an indexed image into a `.mcfunction` command stream.
//!
//! Pixels are visited row by row, left to right. With compression enabled, equal
//! neighbours within a row are merged into a single `fill`; runs never continue
//! into the next row.

use crate::indexed_image::IndexedImage;
use crate::orientation::{Orientation, PlaneTransform};
use indicatif::ProgressBar;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Headroom added on top of the command count for the chain-length gamerule.
pub const CHAIN_LENGTH_MARGIN: usize = 10;
/// Chain length restored once the function has finished.
pub const DEFAULT_CHAIN_LENGTH: usize = 65536;
pub const LAG_WARNING: &str = "Pending extreme lag...";

/// Relative coordinates `~x ~y ~z`; `None` axes print as a bare `~`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RelativePos(pub [Option<i32>; 3]);

impl fmt::Display for RelativePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut axes = self.0.iter().map(|axis| match axis {
            Some(offset) => format!("~{offset}"),
            None => "~".to_string(),
        });
        write!(f, "{}", axes.join(" "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    MaxChainLength(usize),
    Announce(&'a str),
    SetBlock {
        pos: RelativePos,
        block: &'a str,
    },
    Fill {
        from: RelativePos,
        to: RelativePos,
        block: &'a str,
    },
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MaxChainLength(length) => {
                write!(f, "gamerule maxCommandChainLength {length}")
            }
            Command::Announce(message) => write!(f, "tellraw @a \"{message}\""),
            Command::SetBlock { pos, block } => write!(f, "setblock {pos} {block}"),
            Command::Fill { from, to, block } => write!(f, "fill {from} {to} {block}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("block lookup covers {labels} palette entries but the image palette has {palette}")]
    LookupTooShort { labels: usize, palette: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub orientation: Orientation,
    /// Merge runs of equal blocks into `fill` commands
    pub compress: bool,
}

/// A run of equal blocks along one row, by column.
struct Run<'a> {
    start: u32,
    end: u32,
    block: &'a str,
}

struct Emitter<'i, 'a> {
    image: &'i IndexedImage,
    labels: &'i [&'a str],
    transform: PlaneTransform,
}

impl<'a> Emitter<'_, 'a> {
    fn pos(&self, col: u32, row: u32) -> RelativePos {
        RelativePos(self.transform.world_offset(col, row, self.image.height()))
    }

    fn block_at(&self, col: u32, row: u32) -> &'a str {
        self.labels[self.image.index_at(col, row) as usize]
    }

    fn run_command(&self, run: &Run<'a>, row: u32) -> Command<'a> {
        if run.start == run.end {
            Command::SetBlock {
                pos: self.pos(run.start, row),
                block: run.block,
            }
        } else {
            Command::Fill {
                from: self.pos(run.start, row),
                to: self.pos(run.end, row),
                block: run.block,
            }
        }
    }

    fn emit_row(&self, row: u32, commands: &mut Vec<Command<'a>>) {
        for col in 0..self.image.width() {
            commands.push(Command::SetBlock {
                pos: self.pos(col, row),
                block: self.block_at(col, row),
            });
        }
    }

    fn emit_row_compressed(&self, row: u32, commands: &mut Vec<Command<'a>>) {
        let mut current: Option<Run<'a>> = None;

        for col in 0..self.image.width() {
            let block: &'a str = self.block_at(col, row);
            match current.as_mut() {
                Some(run) if run.block == block => run.end = col,
                _ => {
                    if let Some(finished) = current.take() {
                        commands.push(self.run_command(&finished, row));
                    }
                    current = Some(Run {
                        start: col,
                        end: col,
                        block,
                    });
                }
            }
        }

        if let Some(finished) = current {
            commands.push(self.run_command(&finished, row));
        }
    }
}

/// Generates the placement commands for every pixel, without framing.
///
/// `labels[i]` is the block for palette index `i`. `progress` advances by one
/// per image row.
pub fn placement_commands<'a>(
    image: &IndexedImage,
    labels: &[&'a str],
    options: EmitOptions,
    progress: &ProgressBar,
) -> Result<Vec<Command<'a>>, EmitError> {
    if labels.len() < image.palette().len() {
        return Err(EmitError::LookupTooShort {
            labels: labels.len(),
            palette: image.palette().len(),
        });
    }

    let emitter = Emitter {
        image,
        labels,
        transform: options.orientation.transform(),
    };

    let mut commands: Vec<Command<'a>> = Vec::with_capacity(if options.compress {
        image.height() as usize
    } else {
        image.pixel_count()
    });

    for row in 0..image.height() {
        if options.compress {
            emitter.emit_row_compressed(row, &mut commands);
        } else {
            emitter.emit_row(row, &mut commands);
        }
        progress.inc(1);
    }

    Ok(commands)
}

/// Wraps placement commands with the chain-length gamerules and the lag warning.
pub fn frame_commands(body: Vec<Command<'_>>) -> Vec<Command<'_>> {
    let mut framed: Vec<Command<'_>> = Vec::with_capacity(body.len() + 3);
    framed.push(Command::MaxChainLength(body.len() + CHAIN_LENGTH_MARGIN));
    framed.push(Command::Announce(LAG_WARNING));
    framed.extend(body);
    framed.push(Command::MaxChainLength(DEFAULT_CHAIN_LENGTH));
    framed
}

/// One command per line, newline-terminated.
pub fn render(commands: &[Command<'_>]) -> String {
    let mut text: String = commands.iter().join("\n");
    text.push('\n');
    text
}

/// Builds the complete function file for an image.
pub fn generate_function(
    image: &IndexedImage,
    labels: &[&str],
    options: EmitOptions,
    progress: &ProgressBar,
) -> Result<String, EmitError> {
    let body: Vec<Command<'_>> = placement_commands(image, labels, options, progress)?;
    log::debug!(
        "Emitted {} placement commands for {} pixels",
        body.len(),
        image.pixel_count()
    );
    Ok(render(&frame_commands(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Horizontal;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    const LABELS: [&str; 4] = ["stone", "oak_log[axis=z]", "white_wool", "gold_block"];

    fn image(width: u32, height: u32, indices: Vec<u8>) -> IndexedImage {
        let palette = vec![(1, 1, 1), (2, 2, 2), (3, 3, 3), (4, 4, 4)];
        IndexedImage::new(width, height, palette, indices).unwrap()
    }

    fn options(orientation: &str, compress: bool) -> EmitOptions {
        EmitOptions {
            orientation: orientation.parse().unwrap(),
            compress,
        }
    }

    fn generate(image: &IndexedImage, options: EmitOptions) -> String {
        generate_function(image, &LABELS, options, &ProgressBar::hidden()).unwrap()
    }

    fn parse_pos(tokens: &[&str]) -> [Option<i32>; 3] {
        let mut pos = [None; 3];
        for (axis, token) in tokens.iter().enumerate() {
            let offset = token.strip_prefix('~').unwrap();
            pos[axis] = (!offset.is_empty()).then(|| offset.parse().unwrap());
        }
        pos
    }

    fn axis_range(from: Option<i32>, to: Option<i32>) -> Vec<Option<i32>> {
        match (from, to) {
            (Some(a), Some(b)) => (a.min(b)..=a.max(b)).map(Some).collect(),
            (None, None) => vec![None],
            _ => panic!("fill mixes flush and offset axes"),
        }
    }

    /// Replays a function file into the blocks it places, expanding every fill.
    fn placed_blocks(text: &str) -> HashMap<[Option<i32>; 3], String> {
        let mut world = HashMap::new();
        for line in text.lines() {
            let tokens: Vec<&str> = line.split(' ').collect();
            match tokens[0] {
                "setblock" => {
                    world.insert(parse_pos(&tokens[1..4]), tokens[4].to_string());
                }
                "fill" => {
                    let (from, to) = (parse_pos(&tokens[1..4]), parse_pos(&tokens[4..7]));
                    for x in axis_range(from[0], to[0]) {
                        for y in axis_range(from[1], to[1]) {
                            for z in axis_range(from[2], to[2]) {
                                world.insert([x, y, z], tokens[7].to_string());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        world
    }

    fn placement_lines(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|line| line.starts_with("setblock") || line.starts_with("fill"))
            .collect()
    }

    #[test]
    fn test_relative_pos_format() {
        assert_eq!(RelativePos([Some(0), Some(1), None]).to_string(), "~0 ~1 ~");
        assert_eq!(RelativePos([None, Some(-3), Some(12)]).to_string(), "~ ~-3 ~12");
    }

    #[test]
    fn test_single_pixel() {
        let img = image(1, 1, vec![2]);
        let expected = "gamerule maxCommandChainLength 11\n\
                        tellraw @a \"Pending extreme lag...\"\n\
                        setblock ~0 ~0 ~ white_wool\n\
                        gamerule maxCommandChainLength 65536\n";

        assert_eq!(generate(&img, options("N", false)), expected);
        assert_eq!(generate(&img, options("N", true)), expected);
    }

    #[test]
    fn test_uncompressed_north() {
        let img = image(2, 2, vec![0, 1, 2, 3]);
        let text = generate(&img, EmitOptions::default());

        assert_eq!(
            placement_lines(&text),
            vec![
                "setblock ~0 ~1 ~ stone",
                "setblock ~1 ~1 ~ oak_log[axis=z]",
                "setblock ~0 ~0 ~ white_wool",
                "setblock ~1 ~0 ~ gold_block",
            ]
        );
    }

    #[test]
    fn test_run_becomes_fill() {
        // Three equal blocks followed by an isolated one
        let img = image(4, 1, vec![1, 1, 1, 3]);
        let text = generate(&img, options("N", true));

        assert_eq!(
            placement_lines(&text),
            vec![
                "fill ~0 ~0 ~ ~2 ~0 ~ oak_log[axis=z]",
                "setblock ~3 ~0 ~ gold_block",
            ]
        );
    }

    #[test]
    fn test_alternating_singles_not_merged() {
        let img = image(4, 1, vec![0, 2, 0, 2]);
        let text = generate(&img, options("E", true));

        assert_eq!(
            placement_lines(&text),
            vec![
                "setblock ~ ~0 ~0 stone",
                "setblock ~ ~0 ~1 white_wool",
                "setblock ~ ~0 ~2 stone",
                "setblock ~ ~0 ~3 white_wool",
            ]
        );
    }

    #[test]
    fn test_runs_stop_at_row_end() {
        let img = image(2, 2, vec![0, 0, 0, 0]);
        let text = generate(&img, options("S+D", true));

        assert_eq!(
            placement_lines(&text),
            vec!["fill ~0 ~ ~0 ~-1 ~ ~0 stone", "fill ~0 ~ ~-1 ~-1 ~ ~-1 stone"]
        );
    }

    #[test]
    fn test_chain_length_counts() {
        let img = image(5, 3, vec![0, 0, 0, 1, 1, 2, 3, 2, 3, 2, 0, 0, 0, 0, 0]);

        let plain = generate(&img, options("W+U", false));
        assert_eq!(plain.lines().next(), Some("gamerule maxCommandChainLength 25"));
        assert_eq!(placement_lines(&plain).len(), 15);

        let compressed = generate(&img, options("W+U", true));
        let placements = placement_lines(&compressed).len();
        assert_eq!(placements, 2 + 5 + 1);
        assert_eq!(
            compressed.lines().next(),
            Some(format!("gamerule maxCommandChainLength {}", placements + 10).as_str())
        );
        assert_eq!(
            compressed.lines().last(),
            Some("gamerule maxCommandChainLength 65536")
        );
    }

    #[test]
    fn test_compression_preserves_world() {
        let mut rng = StdRng::seed_from_u64(0x6d63_696d);

        for orientation in ["N", "S", "E", "W", "NU", "ND", "SU", "SD", "EU", "ED", "WU", "WD"] {
            let (width, height) = (rng.gen_range(1..12), rng.gen_range(1..12));
            // Few colours so that runs actually occur
            let indices = (0..width * height).map(|_| rng.gen_range(0..3)).collect();
            let img = image(width, height, indices);

            let plain = placed_blocks(&generate(&img, options(orientation, false)));
            let compressed = placed_blocks(&generate(&img, options(orientation, true)));

            assert_eq!(plain.len(), (width * height) as usize, "{orientation}");
            assert_eq!(plain, compressed, "{orientation}");
        }
    }

    #[test]
    fn test_lookup_must_cover_palette() {
        let img = image(1, 1, vec![0]);
        let err = placement_commands(&img, &LABELS[..2], EmitOptions::default(), &ProgressBar::hidden())
            .unwrap_err();
        assert_eq!(err, EmitError::LookupTooShort { labels: 2, palette: 4 });
    }

    #[test]
    fn test_progress_advances_per_row() {
        let img = image(3, 4, vec![0; 12]);
        let progress = ProgressBar::hidden();
        let options = EmitOptions {
            orientation: Orientation::new(Horizontal::North, None),
            compress: true,
        };

        placement_commands(&img, &LABELS, options, &progress).unwrap();
        assert_eq!(progress.position(), 4);
    }
}
