mod f32_ext;

use spirv_std::Image;

pub use self::f32_ext::*;

/// Stitched elevation of a tile and its neighbors; one array layer per slot.
pub type TexElevation<'a> = &'a Image!(2D, type = f32, sampled, arrayed);
