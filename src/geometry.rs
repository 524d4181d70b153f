use crate::error::{Error, Result};

/// Row pitch of a hexagonal packing relative to the cell width (≈ √3 / 2).
pub const HEX_ROW_PITCH: f64 = 0.866;

/// How grid cells tile the source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GridLayout {
    /// Square cells.
    #[default]
    Rectangular,
    /// Cells as wide as the rectangular layout but only a hexagonal row pitch
    /// tall, for circles drawn on an offset grid.
    Staggered,
}

/// Requested grid: the layout and how many cells should span the image width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub layout: GridLayout,
    pub pixel_in_row: u32,
}

impl GridGeometry {
    pub fn rectangular(pixel_in_row: u32) -> Self {
        Self {
            layout: GridLayout::Rectangular,
            pixel_in_row,
        }
    }

    pub fn staggered(pixel_in_row: u32) -> Self {
        Self {
            layout: GridLayout::Staggered,
            pixel_in_row,
        }
    }

    /// Resolve cell size and counts for an image of the given size.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> Result<CellGrid> {
        if image_width < 2 || image_height < 2 {
            return Err(Error::config(format!(
                "image of {image_width}x{image_height} is too small to sample"
            )));
        }
        if self.pixel_in_row == 0 {
            return Err(Error::config("pixel_in_row must be positive"));
        }
        if self.pixel_in_row >= image_width {
            return Err(Error::config(format!(
                "pixel_in_row {} must be smaller than the image width {image_width}",
                self.pixel_in_row
            )));
        }

        let cell_width = image_width / self.pixel_in_row;
        let cell_height = match self.layout {
            GridLayout::Rectangular => cell_width,
            GridLayout::Staggered => (cell_width as f64 * HEX_ROW_PITCH).round_ties_even() as u32,
        };
        if cell_width == 0 || cell_height == 0 {
            return Err(Error::config("resolved cell size is zero"));
        }

        let columns = image_width / cell_width;
        let rows = image_height / cell_height;
        if columns == 0 || rows == 0 {
            return Err(Error::config(format!(
                "a {cell_width}x{cell_height} cell does not fit in a {image_width}x{image_height} image"
            )));
        }

        Ok(CellGrid {
            layout: self.layout,
            cell_width,
            cell_height,
            columns,
            rows,
        })
    }
}

/// Geometry resolved against a concrete image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellGrid {
    pub layout: GridLayout,
    pub cell_width: u32,
    pub cell_height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl CellGrid {
    pub fn len(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source rectangle sampled for cell (`row`, `col`).
    pub fn cell_rect(&self, row: u32, col: u32) -> Rect {
        Rect {
            x: col * self.cell_width,
            y: row * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|right| right <= width)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= height)
    }
}
