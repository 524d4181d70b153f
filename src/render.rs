use image::{Rgb, RgbImage};

use crate::color::{Color, ColorGrid};
use crate::error::{Error, Result};
use crate::geometry::{CellGrid, GridLayout};

/// Width of the white gridlines between blocks.
pub const GRIDLINE: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Square blocks separated by gridlines, odd rows shifted half a block.
    Blocks,
    /// Circles on an offset, hexagonally packed grid.
    Circles,
}

impl Shape {
    /// The shape each layout is usually drawn with.
    pub fn for_layout(layout: GridLayout) -> Self {
        match layout {
            GridLayout::Rectangular => Shape::Blocks,
            GridLayout::Staggered => Shape::Circles,
        }
    }
}

/// Draw `grid` on a white canvas. `cells` must be the geometry the grid was
/// sampled with.
pub fn render(grid: &ColorGrid, cells: &CellGrid, shape: Shape) -> Result<RgbImage> {
    if grid.rows() != cells.rows as usize || grid.columns() != cells.columns as usize {
        return Err(Error::config(format!(
            "a {}x{} color grid does not match {}x{} cells",
            grid.rows(),
            grid.columns(),
            cells.rows,
            cells.columns
        )));
    }
    Ok(match shape {
        Shape::Blocks => render_blocks(grid, cells),
        Shape::Circles => render_circles(grid, cells),
    })
}

fn render_blocks(grid: &ColorGrid, cells: &CellGrid) -> RgbImage {
    let (cw, ch) = (cells.cell_width, cells.cell_height);
    let width = cells.columns * (cw + GRIDLINE);
    let height = cells.rows * (ch + GRIDLINE);
    let mut canvas = RgbImage::from_pixel(width, height, Color::WHITE.into());

    for (i, row) in grid.iter_rows().enumerate() {
        let i = i as u32;
        let shift = if i % 2 == 1 { cw / 2 } else { 0 };
        let top = i * (ch + GRIDLINE);
        for (j, &color) in row.iter().enumerate() {
            let left = j as u32 * (cw + GRIDLINE) + shift;
            let px: Rgb<u8> = color.into();
            // shifted rows run off the right edge
            for y in top..(top + ch).min(height) {
                for x in left..(left + cw).min(width) {
                    canvas.put_pixel(x, y, px);
                }
            }
        }
    }
    canvas
}

fn render_circles(grid: &ColorGrid, cells: &CellGrid) -> RgbImage {
    let (w, h) = (cells.cell_width, cells.cell_height);
    let width = cells.columns * w + w.div_ceil(2);
    let height = (cells.rows - 1) * h + w;
    let mut canvas = RgbImage::from_pixel(width, height, Color::WHITE.into());
    let radius = f64::from(w) / 2.0;

    for (i, row) in grid.iter_rows().enumerate() {
        let i = i as u32;
        let shift = if i % 2 == 1 { radius } else { 0.0 };
        let cy = f64::from(i * h) + radius;
        for (j, &color) in row.iter().enumerate() {
            let cx = f64::from(j as u32 * w) + radius + shift;
            let px: Rgb<u8> = color.into();
            let x0 = (cx - radius).floor().max(0.0) as u32;
            let y0 = (cy - radius).floor().max(0.0) as u32;
            let x1 = ((cx + radius).ceil() as u32).min(width);
            let y1 = ((cy + radius).ceil() as u32).min(height);
            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = f64::from(x) + 0.5 - cx;
                    let dy = f64::from(y) + 0.5 - cy;
                    if dx * dx + dy * dy <= radius * radius {
                        canvas.put_pixel(x, y, px);
                    }
                }
            }
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    fn checker() -> ColorGrid {
        ColorGrid::from_rows(vec![vec![RED, BLUE], vec![BLUE, RED]]).unwrap()
    }

    #[test]
    fn blocks_leave_gridlines_and_shift_odd_rows() {
        let cells = GridGeometry::rectangular(2).resolve(8, 8).unwrap();
        let img = render(&checker(), &cells, Shape::Blocks).unwrap();
        assert_eq!(img.dimensions(), (10, 10));

        assert_eq!(Color::from(*img.get_pixel(0, 0)), RED);
        assert_eq!(Color::from(*img.get_pixel(3, 3)), RED);
        // gridline column and row
        assert_eq!(Color::from(*img.get_pixel(4, 0)), Color::WHITE);
        assert_eq!(Color::from(*img.get_pixel(0, 4)), Color::WHITE);
        assert_eq!(Color::from(*img.get_pixel(5, 0)), BLUE);

        // second row is shifted by two pixels
        assert_eq!(Color::from(*img.get_pixel(1, 5)), Color::WHITE);
        assert_eq!(Color::from(*img.get_pixel(2, 5)), BLUE);
        assert_eq!(Color::from(*img.get_pixel(7, 5)), RED);
        assert_eq!(Color::from(*img.get_pixel(9, 5)), RED);
    }

    #[test]
    fn circles_fill_centers_and_leave_corners_white() {
        let cells = GridGeometry::staggered(2).resolve(20, 20).unwrap();
        // 10px cells, 9px rows
        assert_eq!((cells.cell_width, cells.cell_height, cells.rows), (10, 9, 2));
        let img = render(&checker(), &cells, Shape::Circles).unwrap();
        assert_eq!(img.dimensions(), (25, 19));

        assert_eq!(Color::from(*img.get_pixel(5, 5)), RED);
        assert_eq!(Color::from(*img.get_pixel(15, 5)), BLUE);
        assert_eq!(Color::from(*img.get_pixel(0, 0)), Color::WHITE);
        // odd row centers sit half a cell to the right
        assert_eq!(Color::from(*img.get_pixel(10, 14)), BLUE);
        assert_eq!(Color::from(*img.get_pixel(20, 14)), RED);
        assert_eq!(Color::from(*img.get_pixel(0, 14)), Color::WHITE);
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let cells = GridGeometry::rectangular(4).resolve(8, 8).unwrap();
        assert!(render(&checker(), &cells, Shape::Blocks).unwrap_err().is_configuration());
    }

    #[test]
    fn layouts_pair_with_shapes() {
        assert_eq!(Shape::for_layout(GridLayout::Rectangular), Shape::Blocks);
        assert_eq!(Shape::for_layout(GridLayout::Staggered), Shape::Circles);
    }
}
