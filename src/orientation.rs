//! Maps image coordinates onto a plane in the world.
//!
//! An orientation is a horizontal facing (N/S/E/W), optionally paired with Up or
//! Down. Without a vertical tag the picture stands upright as a wall; with one it
//! lies flat as a floor (Down) or ceiling (Up).
//!
//! | facing | vertical | plane       | column | row               |
//! |--------|----------|-------------|--------|-------------------|
//! | North  | -        | x=col, y=row| +col   | height - row - 1  |
//! | North  | Up       | x=col, z=row| +col   | -row              |
//! | North  | Down     | x=col, z=row| +col   | +row              |
//! | South  | -        | x=col, y=row| -col   | height - row - 1  |
//! | South  | Up       | x=col, z=row| -col   | +row              |
//! | South  | Down     | x=col, z=row| -col   | -row              |
//! | East   | -        | z=col, y=row| +col   | height - row - 1  |
//! | East   | Up       | z=col, x=row| +col   | +row              |
//! | East   | Down     | z=col, x=row| +col   | -row              |
//! | West   | -        | z=col, y=row| -col   | height - row - 1  |
//! | West   | Up       | z=col, x=row| -col   | -row              |
//! | West   | Down     | z=col, x=row| -col   | +row              |

use itertools::Itertools;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Horizontal {
    North,
    South,
    East,
    West,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vertical {
    Up,
    Down,
}

/// A single orientation tag as typed on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Horizontal(Horizontal),
    Vertical(Vertical),
}

impl Direction {
    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter.to_ascii_uppercase() {
            'N' => Direction::Horizontal(Horizontal::North),
            'S' => Direction::Horizontal(Horizontal::South),
            'E' => Direction::Horizontal(Horizontal::East),
            'W' => Direction::Horizontal(Horizontal::West),
            'U' => Direction::Vertical(Vertical::Up),
            'D' => Direction::Vertical(Vertical::Down),
            _ => return None,
        })
    }

    fn letter(self) -> char {
        match self {
            Direction::Horizontal(Horizontal::North) => 'N',
            Direction::Horizontal(Horizontal::South) => 'S',
            Direction::Horizontal(Horizontal::East) => 'E',
            Direction::Horizontal(Horizontal::West) => 'W',
            Direction::Vertical(Vertical::Up) => 'U',
            Direction::Vertical(Vertical::Down) => 'D',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    #[error("no orientation given")]
    Empty,
    #[error("unknown direction '{0}' (allowed: N, E, S, W, U, D)")]
    UnknownTag(char),
    #[error("too many directions specified ({0}); use at most two")]
    TooMany(usize),
    #[error("'{0}' and '{1}' are both horizontal; pair one of N/E/S/W with U or D")]
    TwoHorizontal(char, char),
    #[error("'{0}' and '{1}' are both vertical; pair one of N/E/S/W with U or D")]
    TwoVertical(char, char),
    #[error("'{0}' needs a horizontal direction (N/E/S/W) to go with it")]
    VerticalOnly(char),
}

/// Which world axes the image's column and row run along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneAxes {
    /// Column on x, row on y
    XY,
    /// Column on z, row on y
    ZY,
    /// Column on x, row on z
    XZ,
    /// Column on z, row on x
    ZX,
}

/// How the image row index becomes an offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowMapping {
    /// `height - row - 1`, so the top row ends up highest
    Inverted,
    Direct,
    Negated,
}

/// One entry of the orientation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneTransform {
    pub column_sign: i32,
    pub row: RowMapping,
    pub axes: PlaneAxes,
}

impl PlaneTransform {
    const fn new(column_sign: i32, row: RowMapping, axes: PlaneAxes) -> Self {
        Self {
            column_sign,
            row,
            axes,
        }
    }

    /// In-plane offsets `(a, b)` for a pixel; `a` follows the column, `b` the row.
    pub fn offsets(&self, col: u32, row: u32, height: u32) -> (i32, i32) {
        let col: i32 = col as i32;
        let row: i32 = row as i32;

        let b: i32 = match self.row {
            RowMapping::Inverted => height as i32 - row - 1,
            RowMapping::Direct => row,
            RowMapping::Negated => -row,
        };

        (self.column_sign * col, b)
    }

    /// World offset `[x, y, z]` for a pixel. The axis the image is flush against
    /// is `None`.
    pub fn world_offset(&self, col: u32, row: u32, height: u32) -> [Option<i32>; 3] {
        let (a, b) = self.offsets(col, row, height);
        match self.axes {
            PlaneAxes::XY => [Some(a), Some(b), None],
            PlaneAxes::ZY => [None, Some(b), Some(a)],
            PlaneAxes::XZ => [Some(a), None, Some(b)],
            PlaneAxes::ZX => [Some(b), None, Some(a)],
        }
    }
}

use PlaneAxes::{XY, XZ, ZX, ZY};
use RowMapping::{Direct, Inverted, Negated};

/// Indexed by `[Horizontal][none, Up, Down]`.
const TRANSFORMS: [[PlaneTransform; 3]; 4] = [
    // North
    [
        PlaneTransform::new(1, Inverted, XY),
        PlaneTransform::new(1, Negated, XZ),
        PlaneTransform::new(1, Direct, XZ),
    ],
    // South
    [
        PlaneTransform::new(-1, Inverted, XY),
        PlaneTransform::new(-1, Direct, XZ),
        PlaneTransform::new(-1, Negated, XZ),
    ],
    // East
    [
        PlaneTransform::new(1, Inverted, ZY),
        PlaneTransform::new(1, Direct, ZX),
        PlaneTransform::new(1, Negated, ZX),
    ],
    // West
    [
        PlaneTransform::new(-1, Inverted, ZY),
        PlaneTransform::new(-1, Negated, ZX),
        PlaneTransform::new(-1, Direct, ZX),
    ],
];

/// A validated orientation: one horizontal facing, optionally one vertical tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Orientation {
    pub facing: Horizontal,
    pub vertical: Option<Vertical>,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(Horizontal::North, None)
    }
}

impl Orientation {
    pub fn new(facing: Horizontal, vertical: Option<Vertical>) -> Self {
        Self { facing, vertical }
    }

    /// Builds an orientation from up to two tags in any order.
    pub fn from_directions(directions: &[Direction]) -> Result<Self, OrientationError> {
        let sorted: Vec<Direction> = directions.iter().copied().sorted().collect();

        match sorted.as_slice() {
            [] => Err(OrientationError::Empty),
            [Direction::Horizontal(facing)] => Ok(Self::new(*facing, None)),
            [Direction::Vertical(_)] => Err(OrientationError::VerticalOnly(sorted[0].letter())),
            [Direction::Horizontal(facing), Direction::Vertical(vertical)] => {
                Ok(Self::new(*facing, Some(*vertical)))
            }
            [first @ Direction::Horizontal(_), second @ Direction::Horizontal(_)] => Err(
                OrientationError::TwoHorizontal(first.letter(), second.letter()),
            ),
            [first, second] => Err(OrientationError::TwoVertical(
                first.letter(),
                second.letter(),
            )),
            more => Err(OrientationError::TooMany(more.len())),
        }
    }

    pub fn transform(&self) -> PlaneTransform {
        let column: usize = match self.vertical {
            None => 0,
            Some(Vertical::Up) => 1,
            Some(Vertical::Down) => 2,
        };
        TRANSFORMS[self.facing as usize][column]
    }
}

impl FromStr for Orientation {
    type Err = OrientationError;

    /// Accepts letters such as `N`, `nu`, `N+U` or `D W`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let directions: Vec<Direction> = s
            .chars()
            .filter(|c: &char| !c.is_whitespace() && *c != '+')
            .map(|c: char| Direction::from_letter(c).ok_or(OrientationError::UnknownTag(c)))
            .collect::<Result<_, _>>()?;

        Self::from_directions(&directions)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Direction::Horizontal(self.facing).letter())?;
        if let Some(vertical) = self.vertical {
            write!(f, "+{}", Direction::Vertical(vertical).letter())?;
        }
        Ok(())
    }
}
