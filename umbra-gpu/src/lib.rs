//! Common structs, algorithms etc. used by Umbra's shaders and engine.
//!
//! Everything in here is compiled twice: once into the SPIR-V shaders and once
//! into the host, where the very same code is exercised by CPU tests.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod daylight;
mod exposure;
mod gradient;
#[cfg(not(target_arch = "spirv"))]
mod grid;
mod horizon;
mod neighbors;
mod passes;
mod raymarch;
mod sampler;
mod shadow;
mod terrarium;
mod utils;

pub use self::daylight::*;
pub use self::exposure::*;
pub use self::gradient::*;
#[cfg(not(target_arch = "spirv"))]
pub use self::grid::*;
pub use self::horizon::*;
pub use self::neighbors::*;
pub use self::passes::*;
pub use self::raymarch::*;
pub use self::sampler::*;
pub use self::shadow::*;
pub use self::terrarium::*;
pub use self::utils::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image};

    pub use crate::*;
}

/// Golden angle, used to spread soft-shadow ray origins.
pub const GOLDEN_ANGLE: f32 = 2.39996;

pub const UMBRA_EPSILON: f32 = 1e-6;
