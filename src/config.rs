use std::path::PathBuf;

use crate::error::Result;
use crate::geometry::GridGeometry;
use crate::reducer::PaletteReducer;
use crate::render::Shape;
use crate::sampler::RegionColorSampler;

/// Processing parameters, independent of where the image comes from.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelateOptions {
    pub geometry: GridGeometry,
    /// Blend weight of the dominant color against the group mean (0-1).
    pub dominant_coefficient: f64,
    /// Per-channel distance under which colors are grouped together.
    pub color_threshold: u8,
    /// Palette size for the optional reduction step.
    pub num_colors: Option<usize>,
    pub seed: u64,
    pub shape: Shape,
}

impl PixelateOptions {
    /// Options for `geometry`, drawn with the shape that suits its layout.
    pub fn new(geometry: GridGeometry) -> Self {
        let sampler = RegionColorSampler::default();
        Self {
            geometry,
            dominant_coefficient: sampler.dominant_coefficient,
            color_threshold: sampler.color_threshold,
            num_colors: None,
            seed: 0,
            shape: Shape::for_layout(geometry.layout),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.sampler().validate()?;
        if let Some(reducer) = self.reducer() {
            reducer.validate()?;
        }
        Ok(())
    }

    pub fn sampler(&self) -> RegionColorSampler {
        RegionColorSampler::new(self.dominant_coefficient, self.color_threshold)
    }

    pub fn reducer(&self) -> Option<PaletteReducer> {
        self.num_colors
            .map(|k| PaletteReducer::new(k).with_seed(self.seed))
    }
}

/// A complete run: where to read, where to write, and how to process.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelateConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: PixelateOptions,
}

impl PixelateConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, options: PixelateOptions) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridLayout;

    #[test]
    fn defaults_follow_layout() {
        let opts = PixelateOptions::new(GridGeometry::staggered(12));
        assert_eq!(opts.shape, Shape::Circles);
        assert_eq!(opts.dominant_coefficient, 0.5);
        assert_eq!(opts.color_threshold, 10);
        assert_eq!(opts.geometry.layout, GridLayout::Staggered);
        assert!(opts.reducer().is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut opts = PixelateOptions::new(GridGeometry::rectangular(10));
        opts.dominant_coefficient = f64::NAN;
        assert!(opts.validate().unwrap_err().is_configuration());

        let mut opts = PixelateOptions::new(GridGeometry::rectangular(10));
        opts.num_colors = Some(0);
        assert!(opts.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn reducer_carries_seed() {
        let mut opts = PixelateOptions::new(GridGeometry::rectangular(10));
        opts.num_colors = Some(4);
        opts.seed = 99;
        let reducer = opts.reducer().unwrap();
        assert_eq!((reducer.num_colors, reducer.seed), (4, 99));
    }
}
