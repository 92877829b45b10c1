//! Toroidal grid geometry.
//!
//! Slot `i` of a population laid out on a `width x height` grid sits at
//! column `i % width`, row `i / width`. Row 0 is the top row, so "up"
//! decreases the row. Both axes wrap: stepping left from column 0 lands on
//! column `width - 1`, stepping up from row 0 lands on row `height - 1`.

use ration_types::Neighborhood;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// One of the eight compass steps on the grid.
///
/// The declaration order is clockwise from "up", which is also the order
/// used for uniform direction draws:
///
/// ```text
/// 7 0 1
/// 6 X 2
/// 5 4 3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Row - 1.
    Up,
    /// Row - 1, column + 1.
    UpRight,
    /// Column + 1.
    Right,
    /// Row + 1, column + 1.
    DownRight,
    /// Row + 1.
    Down,
    /// Row + 1, column - 1.
    DownLeft,
    /// Column - 1.
    Left,
    /// Row - 1, column - 1.
    UpLeft,
}

/// The four cardinal steps, clockwise from up.
const VON_NEUMANN: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// All eight steps, clockwise from up.
const MOORE: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

/// Vertical component of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delta {
    Back,
    Stay,
    Forward,
}

impl Direction {
    /// The candidate directions for a neighborhood kind.
    pub const fn for_neighborhood(neighborhood: Neighborhood) -> &'static [Self] {
        match neighborhood {
            Neighborhood::VonNeumann => &VON_NEUMANN,
            Neighborhood::Moore => &MOORE,
        }
    }

    /// Column and row components of the step.
    const fn deltas(self) -> (Delta, Delta) {
        match self {
            Self::Up => (Delta::Stay, Delta::Back),
            Self::UpRight => (Delta::Forward, Delta::Back),
            Self::Right => (Delta::Forward, Delta::Stay),
            Self::DownRight => (Delta::Forward, Delta::Forward),
            Self::Down => (Delta::Stay, Delta::Forward),
            Self::DownLeft => (Delta::Back, Delta::Forward),
            Self::Left => (Delta::Back, Delta::Stay),
            Self::UpLeft => (Delta::Back, Delta::Back),
        }
    }
}

/// Move one cell along an axis of length `extent`, wrapping at both ends.
const fn wrap_step(coord: usize, delta: Delta, extent: usize) -> usize {
    match delta {
        Delta::Stay => coord,
        Delta::Back => {
            if coord == 0 {
                extent.saturating_sub(1)
            } else {
                coord.saturating_sub(1)
            }
        }
        Delta::Forward => {
            if coord.saturating_add(1) >= extent {
                0
            } else {
                coord.saturating_add(1)
            }
        }
    }
}

/// A `width x height` grid whose edges wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToroidalGrid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cached `width * height`.
    cells: usize,
}

impl ToroidalGrid {
    /// Create a grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGrid`] if either dimension is zero, or
    /// [`WorldError::GridTooLarge`] if the cell count overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidGrid { width, height });
        }
        let cells = width
            .checked_mul(height)
            .ok_or(WorldError::GridTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub const fn cells(&self) -> usize {
        self.cells
    }

    /// Column and row of a flat slot index.
    ///
    /// Indices past the last row wrap back onto the grid vertically.
    pub const fn coords(&self, index: usize) -> (usize, usize) {
        // Division is safe: both dimensions are non-zero by construction.
        let x = index % self.width;
        let y = (index / self.width) % self.height;
        (x, y)
    }

    /// Flat slot index of a column and row already on the grid.
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y.saturating_mul(self.width).saturating_add(x)
    }

    /// The flat index one step from `index` in `direction`, with wraparound.
    pub const fn neighbor(&self, index: usize, direction: Direction) -> usize {
        let (x, y) = self.coords(index);
        let (dx, dy) = direction.deltas();
        let nx = wrap_step(x, dx, self.width);
        let ny = wrap_step(y, dy, self.height);
        self.index(nx, ny)
    }
}
