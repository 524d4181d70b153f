//! Per-cell color sampling.
//!
//! Every grid cell is cropped out of the source image and reduced to one
//! representative color:
//!
//! 1. The top-left pixel of the region is taken as its background. This is a
//!    fixed assumption, not an estimate, and it misjudges blocks whose corner
//!    lands on foreground.
//! 2. Pixels exactly equal to the background are dropped. If nothing is left
//!    the background color is returned.
//! 3. The remaining pixels are grouped greedily in scan order. A pixel joins the
//!    first group (in creation order) whose anchor is within `color_threshold`
//!    on every channel, otherwise it anchors a new group. Anchors never move.
//! 4. The largest group wins, earliest group on ties.
//! 5. Its per-channel floor mean is blended with the dominant color by
//!    `dominant_coefficient`. The dominant color is currently the mean itself,
//!    so the blend always returns the mean.

use image::RgbImage;
use log::{debug, trace};
#[cfg(feature = "threads")]
use rayon::prelude::*;

use crate::color::{Color, ColorGrid};
use crate::error::{Error, Result};
use crate::geometry::{CellGrid, GridGeometry, Rect};

/// Similar colors gathered around a fixed anchor (the first member).
#[derive(Clone, Debug)]
struct ColorGroup {
    members: Vec<Color>,
}

impl ColorGroup {
    fn new(anchor: Color) -> Self {
        Self {
            members: vec![anchor],
        }
    }

    fn anchor(&self) -> Color {
        self.members[0]
    }

    fn accepts(&self, pixel: Color, threshold: u8) -> bool {
        pixel
            .channels()
            .iter()
            .zip(self.anchor().channels())
            .all(|(&p, a)| p.abs_diff(a) <= threshold)
    }

    fn mean(&self) -> Color {
        let mut sum = [0u64; 3];
        for c in &self.members {
            for (s, ch) in sum.iter_mut().zip(c.channels()) {
                *s += u64::from(ch);
            }
        }
        let n = self.members.len() as u64;
        // a mean of u8 values always fits in u8
        Color::new((sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8)
    }
}

fn group_colors(pixels: impl IntoIterator<Item = Color>, threshold: u8) -> Vec<ColorGroup> {
    let mut groups: Vec<ColorGroup> = Vec::new();
    for pixel in pixels {
        match groups.iter_mut().find(|g| g.accepts(pixel, threshold)) {
            Some(group) => group.members.push(pixel),
            None => groups.push(ColorGroup::new(pixel)),
        }
    }
    groups
}

/// First group with the highest member count.
fn largest_group(groups: &[ColorGroup]) -> Option<&ColorGroup> {
    let mut best: Option<&ColorGroup> = None;
    for group in groups {
        if best.is_none_or(|b| group.members.len() > b.members.len()) {
            best = Some(group);
        }
    }
    best
}

/// Blend `avg` toward `dominant` by `coefficient`, truncating to integers.
///
/// Written as `avg + (dominant - avg) * coefficient`, the same blend as
/// `avg * (1 - c) + dominant * c`.
fn blend(avg: Color, dominant: Color, coefficient: f64) -> Color {
    let mix = |a: u8, d: u8| {
        let v = f64::from(a) + (f64::from(d) - f64::from(a)) * coefficient;
        v.clamp(0.0, 255.0) as u8
    };
    Color::new(
        mix(avg.r, dominant.r),
        mix(avg.g, dominant.g),
        mix(avg.b, dominant.b),
    )
}

/// Representative color of a region given in scan order.
pub fn dominant_color(pixels: &[Color], dominant_coefficient: f64, color_threshold: u8) -> Result<Color> {
    check_coefficient(dominant_coefficient)?;
    let &background = pixels
        .first()
        .ok_or_else(|| Error::config("region has no pixels"))?;
    let foreground = pixels.iter().copied().filter(|&p| p != background);
    let groups = group_colors(foreground, color_threshold);

    let Some(largest) = largest_group(&groups) else {
        return Ok(background);
    };

    let avg = largest.mean();
    // TODO: blend with a separately estimated mode color once one exists;
    // until then the dominant color is the group mean and the blend is an identity.
    let dominant = avg;
    Ok(blend(avg, dominant, dominant_coefficient))
}

fn check_coefficient(dominant_coefficient: f64) -> Result<()> {
    if !dominant_coefficient.is_finite() {
        return Err(Error::config(format!(
            "dominant_coefficient must be finite, got {dominant_coefficient}"
        )));
    }
    Ok(())
}

/// Pixels inside `rect`, row by row.
pub fn crop_region(image: &RgbImage, rect: Rect) -> Result<Vec<Color>> {
    let (width, height) = image.dimensions();
    if !rect.fits_within(width, height) {
        return Err(Error::RegionOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            image_width: width,
            image_height: height,
        });
    }

    let mut pixels = Vec::with_capacity(rect.width as usize * rect.height as usize);
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            pixels.push(Color::from(*image.get_pixel(x, y)));
        }
    }
    Ok(pixels)
}

/// Extracts one representative color per grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionColorSampler {
    pub dominant_coefficient: f64,
    pub color_threshold: u8,
}

impl Default for RegionColorSampler {
    fn default() -> Self {
        Self {
            dominant_coefficient: 0.5,
            color_threshold: 10,
        }
    }
}

impl RegionColorSampler {
    pub fn new(dominant_coefficient: f64, color_threshold: u8) -> Self {
        Self {
            dominant_coefficient,
            color_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_coefficient(self.dominant_coefficient)
    }

    /// Resolve `geometry` against `image` and sample every cell.
    pub fn sample(&self, image: &RgbImage, geometry: &GridGeometry) -> Result<ColorGrid> {
        self.validate()?;
        let cells = geometry.resolve(image.width(), image.height())?;
        self.sample_cells(image, &cells)
    }

    /// Sample an already resolved grid. Cells come back row-major regardless
    /// of evaluation order.
    pub fn sample_cells(&self, image: &RgbImage, cells: &CellGrid) -> Result<ColorGrid> {
        self.validate()?;
        debug!(
            "sampling {}x{} image as {} rows x {} columns of {}x{} cells",
            image.width(),
            image.height(),
            cells.rows,
            cells.columns,
            cells.cell_width,
            cells.cell_height
        );

        let columns = cells.columns as usize;
        let cell_color = |index: usize| -> Result<Color> {
            let row = (index / columns) as u32;
            let col = (index % columns) as u32;
            let rect = cells.cell_rect(row, col);
            let pixels = crop_region(image, rect)?;
            let color = dominant_color(&pixels, self.dominant_coefficient, self.color_threshold)?;
            trace!("cell {row},{col} at {},{} -> #{}", rect.x, rect.y, color.to_hex());
            Ok(color)
        };

        #[cfg(feature = "threads")]
        let colors = (0..cells.len()).into_par_iter().map(cell_color).collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "threads"))]
        let colors = (0..cells.len()).map(cell_color).collect::<Result<Vec<_>>>()?;

        ColorGrid::new(cells.rows as usize, columns, colors)
    }
}

/// Sample `image` on `geometry` with the given blend weight and similarity
/// threshold.
pub fn sample(
    image: &RgbImage,
    geometry: &GridGeometry,
    dominant_coefficient: f64,
    color_threshold: u8,
) -> Result<ColorGrid> {
    RegionColorSampler::new(dominant_coefficient, color_threshold).sample(image, geometry)
}
