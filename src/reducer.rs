use std::collections::HashMap;

use kmeans_colors::{Kmeans, get_kmeans};
use log::debug;
use palette::Srgb;

use crate::color::{Color, ColorGrid};
use crate::error::{Error, Result};

/// Cluster indices from `kmeans_colors` are `u8`.
pub const MAX_PALETTE_SIZE: usize = 256;

/// Re-clusters the colors of a [`ColorGrid`] down to a fixed palette size with
/// seeded k-means, so equal input always gives equal output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteReducer {
    pub num_colors: usize,
    pub seed: u64,
    pub max_iter: usize,
    pub converge: f32,
    /// Independent k-means runs (seeds `seed`, `seed + 1`, ...); the tightest
    /// clustering is kept.
    pub runs: u32,
}

impl PaletteReducer {
    pub fn new(num_colors: usize) -> Self {
        Self {
            num_colors,
            seed: 0,
            max_iter: 20,
            converge: 1e-4,
            runs: 1,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_colors == 0 {
            return Err(Error::config("num_colors must be positive"));
        }
        if self.num_colors > MAX_PALETTE_SIZE {
            return Err(Error::config(format!(
                "num_colors {} exceeds the maximum palette size of {MAX_PALETTE_SIZE}",
                self.num_colors
            )));
        }
        if self.runs == 0 {
            return Err(Error::config("at least one k-means run is required"));
        }
        Ok(())
    }

    /// Map every cell of `grid` onto at most `num_colors` colors. A grid that
    /// already has few enough colors is returned as is.
    pub fn reduce(&self, grid: ColorGrid) -> Result<ColorGrid> {
        self.validate()?;

        let distinct = grid.distinct_colors();
        if distinct.len() <= self.num_colors {
            debug!(
                "grid has {} distinct colors, no reduction to {} needed",
                distinct.len(),
                self.num_colors
            );
            return Ok(grid);
        }

        let mapping = self.palette_mapping(&distinct)?;
        let reduced = apply_mapping(grid, &mapping)?;
        debug!(
            "reduced {} distinct colors to {}",
            distinct.len(),
            reduced.distinct_colors().len()
        );
        Ok(reduced)
    }

    /// Cluster `colors` and map each one to its cluster centroid, channels
    /// truncated toward zero.
    pub fn palette_mapping(&self, colors: &[Color]) -> Result<HashMap<Color, Color>> {
        self.validate()?;

        let points: Vec<Srgb> = colors
            .iter()
            .map(|c| Srgb::new(f32::from(c.r), f32::from(c.g), f32::from(c.b)))
            .collect();

        let mut best: Option<(f32, Kmeans<Srgb>)> = None;
        for run in 0..self.runs {
            let result = get_kmeans(
                self.num_colors,
                self.max_iter,
                self.converge,
                false,
                &points,
                self.seed.wrapping_add(u64::from(run)),
            );
            check_clustering(&result, points.len())?;
            let inertia = inertia(&points, &result);
            if best.as_ref().is_none_or(|(score, _)| inertia < *score) {
                best = Some((inertia, result));
            }
        }
        let (_, kmeans) = best.ok_or_else(|| Error::Clustering {
            message: "no k-means run completed".into(),
        })?;

        let centroids: Vec<Color> = kmeans.centroids.iter().map(|&c| truncate(c)).collect();
        Ok(colors
            .iter()
            .zip(&kmeans.indices)
            .map(|(&color, &idx)| (color, centroids[usize::from(idx)]))
            .collect())
    }
}

/// Rewrite every cell through `mapping`, which must cover every color.
fn apply_mapping(grid: ColorGrid, mapping: &HashMap<Color, Color>) -> Result<ColorGrid> {
    grid.try_map_colors(|c| {
        mapping.get(&c).copied().ok_or_else(|| Error::Clustering {
            message: format!("color #{} has no palette entry", c.to_hex()),
        })
    })
}

fn check_clustering(result: &Kmeans<Srgb>, points: usize) -> Result<()> {
    if result.indices.len() != points {
        return Err(Error::Clustering {
            message: format!("{} of {points} colors were assigned a cluster", result.indices.len()),
        });
    }
    if let Some(&idx) = result.indices.iter().find(|&&i| usize::from(i) >= result.centroids.len()) {
        return Err(Error::Clustering {
            message: format!("cluster {idx} has no centroid"),
        });
    }
    if result
        .centroids
        .iter()
        .any(|c| !(c.red.is_finite() && c.green.is_finite() && c.blue.is_finite()))
    {
        return Err(Error::Clustering {
            message: "k-means produced a non-finite centroid".into(),
        });
    }
    Ok(())
}

/// Sum of squared distances from each point to its centroid.
fn inertia(points: &[Srgb], result: &Kmeans<Srgb>) -> f32 {
    points
        .iter()
        .zip(&result.indices)
        .map(|(p, &i)| {
            let c = result.centroids[usize::from(i)];
            (p.red - c.red).powi(2) + (p.green - c.green).powi(2) + (p.blue - c.blue).powi(2)
        })
        .sum()
}

fn truncate(c: Srgb) -> Color {
    let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
    Color::new(channel(c.red), channel(c.green), channel(c.blue))
}

/// Reduce `grid` to at most `num_colors` colors with the default seed.
pub fn reduce(grid: ColorGrid, num_colors: usize) -> Result<ColorGrid> {
    PaletteReducer::new(num_colors).reduce(grid)
}
