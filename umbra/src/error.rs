use crate::TileId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("device doesn't support {0}")]
    Unsupported(&'static str),

    #[error("target of {size}x{size} texels exceeds device limit of {limit}")]
    TargetTooLarge { size: u32, limit: u32 },

    #[error("target of {layers} layers exceeds device limit of {limit}")]
    TooManyLayers { layers: u32, limit: u32 },

    #[error("elevation of tile {0} is not loaded")]
    MissingElevation(TileId),

    #[error("tile {tile} is {actual} texels wide, expected {expected}")]
    TileSizeMismatch {
        tile: TileId,
        expected: u32,
        actual: u32,
    },

    #[error("invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    #[error("couldn't decode image: {0}")]
    Image(#[from] image::ImageError),
}
