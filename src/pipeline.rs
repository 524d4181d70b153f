use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use log::{debug, info};

use crate::color::{Color, ColorGrid};
use crate::config::{PixelateConfig, PixelateOptions};
use crate::error::{Error, Result};
use crate::geometry::CellGrid;
use crate::render::render;

/// Read and decode an image file, dropping any alpha channel.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    decode_image(&bytes)
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::Decode { source })?;
    Ok(img.to_rgb8())
}

/// Output of the in-memory pipeline.
#[derive(Clone, Debug)]
pub struct Pixelated {
    pub grid: ColorGrid,
    pub cells: CellGrid,
    pub image: RgbImage,
}

impl Pixelated {
    pub fn palette(&self) -> Vec<Color> {
        self.grid.distinct_colors()
    }

    /// Encode the rendered image in memory.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), format)
            .map_err(|source| Error::Encode { source })?;
        Ok(buf)
    }
}

/// Sample, optionally reduce, and render `image`.
pub fn pixelate_image(image: &RgbImage, options: &PixelateOptions) -> Result<Pixelated> {
    options.validate()?;

    let cells = options.geometry.resolve(image.width(), image.height())?;
    let mut grid = options.sampler().sample_cells(image, &cells)?;
    if let Some(reducer) = options.reducer() {
        grid = reducer.reduce(grid)?;
    }
    let rendered = render(&grid, &cells, options.shape)?;

    Ok(Pixelated {
        grid,
        cells,
        image: rendered,
    })
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub input_size: (u32, u32),
    pub output_size: (u32, u32),
    pub grid_size: (usize, usize),
    pub palette: Vec<Color>,
    pub output: PathBuf,
}

/// Load `config.input`, pixelate it and write `config.output`. The output
/// file only appears once everything has succeeded.
pub fn run(config: &PixelateConfig) -> Result<Report> {
    let format = ImageFormat::from_path(&config.output).map_err(|_| {
        Error::config(format!(
            "cannot pick an image format for {}",
            config.output.display()
        ))
    })?;

    let image = load_image(&config.input)?;
    info!(
        "loaded {} ({}x{})",
        config.input.display(),
        image.width(),
        image.height()
    );

    let result = pixelate_image(&image, &config.options)?;
    let encoded = result.encode(format)?;
    write_atomically(&config.output, &encoded)?;
    info!("saved pixelated image to {}", config.output.display());

    Ok(Report {
        input_size: image.dimensions(),
        output_size: result.image.dimensions(),
        grid_size: result.grid.dimensions(),
        palette: result.palette(),
        output: config.output.clone(),
    })
}

/// Scratch file next to `path`, hidden and tagged with the process id.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    debug!("writing {} bytes to {}", bytes.len(), tmp.display());

    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    // never clobber a file we did not create
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .map_err(io_err)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    Ok(())
}
