use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop the pixelation pipeline. Nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid geometry, palette size or other parameter.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("input file {} not found", path.display())]
    InputNotFound { path: PathBuf },

    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    #[error("unable to encode image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    /// A crop rectangle reaches past the image edge.
    #[error("region {x},{y} {width}x{height} lies outside the {image_width}x{image_height} image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("palette clustering failed: {message}")]
    Clustering { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}
