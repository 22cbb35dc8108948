#![cfg_attr(target_arch = "spirv", no_std)]

pub mod daylight;
pub mod fullscreen;
pub mod gradient;
pub mod horizon;
pub mod shadow;
