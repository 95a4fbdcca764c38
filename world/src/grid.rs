//! Immutable tile grid decoded from level data.

use maze_shooter_core::{CellCoord, CellKind, LevelLayout};
use thiserror::Error;

/// Reasons a level's cell data cannot form a tile grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidGridError {
    /// The level declared zero columns.
    #[error("grid width must be positive")]
    ZeroWidth,
    /// The level declared zero rows.
    #[error("grid height must be positive")]
    ZeroHeight,
    /// The number of rows differs from the declared height.
    #[error("grid declares {expected} rows but provides {actual}")]
    RowCountMismatch {
        /// Height declared by the level.
        expected: u32,
        /// Number of rows actually supplied.
        actual: usize,
    },
    /// A row's length differs from the declared width.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowLengthMismatch {
        /// Index of the offending row.
        row: usize,
        /// Width declared by the level.
        expected: u32,
        /// Number of cells in the row.
        actual: usize,
    },
    /// A cell carried a code with no known meaning.
    #[error("unknown cell code {code} at column {column}, row {row}")]
    UnknownCellCode {
        /// The unrecognised code.
        code: u8,
        /// Column of the offending cell.
        column: usize,
        /// Row of the offending cell.
        row: usize,
    },
}

/// Dense row-major grid of cell classifications.
///
/// The grid is validated on construction and never changes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
}

impl TileGrid {
    /// Builds a grid from rows of decoded cells.
    pub fn new(width: u32, height: u32, rows: Vec<Vec<CellKind>>) -> Result<Self, InvalidGridError> {
        check_shape(width, height, rows.iter().map(Vec::len))?;

        let cells = rows.into_iter().flatten().collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Decodes and validates the cell codes of a level layout.
    pub fn from_layout(layout: &LevelLayout) -> Result<Self, InvalidGridError> {
        check_shape(layout.width, layout.height, layout.cells.iter().map(Vec::len))?;

        let mut cells = Vec::with_capacity(layout.cells.len() * layout.width as usize);
        for (row, codes) in layout.cells.iter().enumerate() {
            for (column, &code) in codes.iter().enumerate() {
                let kind = CellKind::from_code(code)
                    .ok_or(InvalidGridError::UnknownCellCode { code, column, row })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            width: layout.width,
            height: layout.height,
            cells,
        })
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the kind of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether the cell is outside the grid or holds a blocking kind.
    #[must_use]
    pub fn is_cell_blocked(&self, cell: CellCoord) -> bool {
        self.kind_at(cell).map_or(true, CellKind::is_blocking)
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let column = (index % width) as i32;
            let row = (index / width) as i32;
            (CellCoord::new(column, row), *kind)
        })
    }

    /// Collects the coordinates of all cells matching the predicate.
    #[must_use]
    pub fn cells_where<F>(&self, predicate: F) -> Vec<CellCoord>
    where
        F: Fn(CellKind) -> bool,
    {
        self.cells()
            .filter(|(_, kind)| predicate(*kind))
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Collects the coordinates of all non-blocking cells.
    #[must_use]
    pub fn open_cells(&self) -> Vec<CellCoord> {
        self.cells_where(|kind| !kind.is_blocking())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.width && row < self.height {
            let width = usize::try_from(self.width).ok()?;
            Some(row as usize * width + column as usize)
        } else {
            None
        }
    }
}

fn check_shape<I>(width: u32, height: u32, row_lengths: I) -> Result<(), InvalidGridError>
where
    I: ExactSizeIterator<Item = usize>,
{
    if width == 0 {
        return Err(InvalidGridError::ZeroWidth);
    }
    if height == 0 {
        return Err(InvalidGridError::ZeroHeight);
    }

    let row_count = row_lengths.len();
    if row_count != height as usize {
        return Err(InvalidGridError::RowCountMismatch {
            expected: height,
            actual: row_count,
        });
    }

    for (row, length) in row_lengths.enumerate() {
        if length != width as usize {
            return Err(InvalidGridError::RowLengthMismatch {
                row,
                expected: width,
                actual: length,
            });
        }
    }

    Ok(())
}
