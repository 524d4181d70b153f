//! Turn a bitmap into blocky or dotted pixel art.
//!
//! The image is cut into a grid of cells, each cell is reduced to one
//! background-aware representative color ([`sampler`]), the resulting
//! [`ColorGrid`] is optionally clustered down to a fixed palette
//! ([`reducer`]), and the grid is drawn as blocks or circles ([`render`]).

use image::ImageFormat;
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod reducer;
pub mod render;
pub mod sampler;

pub use color::{Color, ColorGrid};
pub use config::{PixelateConfig, PixelateOptions};
pub use error::{Error, Result};
pub use geometry::{CellGrid, GridGeometry, GridLayout, Rect};
pub use pipeline::{Pixelated, Report, load_image, pixelate_image, run};
pub use reducer::{PaletteReducer, reduce};
pub use render::Shape;
pub use sampler::{RegionColorSampler, sample};

/// Pixelate an encoded image held in memory.
///
/// Returns the PNG-encoded result and its palette as `RRGGBB` hex strings.
pub fn pixelate_bytes(input: &[u8], options: &PixelateOptions) -> Result<(Vec<u8>, Vec<String>)> {
    let image = pipeline::decode_image(input)?;
    let result = pixelate_image(&image, options)?;
    let png = result.encode(ImageFormat::Png)?;
    let palette = result.palette().into_iter().map(Color::to_hex).collect();
    Ok((png, palette))
}

/// Browser entry point: returns `{ image: Uint8Array, palette: string[] }`.
///
/// `staggered` samples on the hexagonal row pitch and draws circles; otherwise
/// square blocks are drawn. `num_colors` enables palette reduction.
#[wasm_bindgen]
pub fn pixelate(
    input: Vec<u8>,
    pixel_in_row: u32,
    dominant_coefficient: f64,
    color_threshold: u8,
    num_colors: Option<u32>,
    staggered: bool,
) -> std::result::Result<Object, JsValue> {
    let geometry = if staggered {
        GridGeometry::staggered(pixel_in_row)
    } else {
        GridGeometry::rectangular(pixel_in_row)
    };
    let mut options = PixelateOptions::new(geometry);
    options.dominant_coefficient = dominant_coefficient;
    options.color_threshold = color_threshold;
    options.num_colors = num_colors.map(|k| k as usize);

    let (png, palette_hex) =
        pixelate_bytes(&input, &options).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let palette_js = Array::new();
    for hex in palette_hex {
        palette_js.push(&JsValue::from_str(&hex));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(png.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Ok(result)
}
