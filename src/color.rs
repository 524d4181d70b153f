use std::collections::HashSet;

use palette::Srgb;

use crate::error::{Error, Result};

/// An opaque 8-bit RGB color. Equality is exact per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// `RRGGBB`, uppercase, no leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(px: image::Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        Self::new(r, g, b)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb(c.channels())
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Self::new(c.red, c.green, c.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(c: Color) -> Self {
        Srgb::new(c.r, c.g, c.b)
    }
}

/// Row-major grid of sampled colors, one per grid cell. All rows have the
/// same length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorGrid {
    rows: usize,
    columns: usize,
    cells: Vec<Color>,
}

impl ColorGrid {
    pub fn new(rows: usize, columns: usize, cells: Vec<Color>) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(Error::config(format!(
                "color grid must not be empty (got {rows}x{columns})"
            )));
        }
        if rows * columns != cells.len() {
            return Err(Error::config(format!(
                "{} cells do not fill a {rows}x{columns} grid",
                cells.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    /// Build a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(Error::config(format!(
                "row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }
        Self::new(height, width, rows.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + col).copied()
    }

    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Color]> {
        self.cells.chunks(self.columns)
    }

    /// Deduplicated colors in order of first appearance.
    pub fn distinct_colors(&self) -> Vec<Color> {
        let mut seen = HashSet::new();
        self.cells
            .iter()
            .copied()
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Rewrite every cell through `f`, keeping the shape. Stops at the first
    /// error.
    pub fn try_map_colors<E>(
        mut self,
        mut f: impl FnMut(Color) -> std::result::Result<Color, E>,
    ) -> std::result::Result<Self, E> {
        for cell in &mut self.cells {
            *cell = f(*cell)?;
        }
        Ok(self)
    }
}
