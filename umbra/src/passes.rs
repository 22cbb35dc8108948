use log::debug;

use crate::gpu;
use crate::{Capabilities, Result, Shaders, StitchTexture, StorageBuffer};

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct TilePasses {
            $( pub $name: $class, )*
        }

        impl TilePasses {
            pub fn new(
                device: &wgpu::Device,
                resources: &PassResources,
            ) -> Result<Self> {
                debug!("Initializing tile passes");

                Ok(Self {
                    $( $name: $class::new(device, resources)?, )*
                })
            }
        }
    };
}

mod tile_pass;

pub use self::tile_pass::*;

passes!([
    daylight => DaylightPass,
    gradient => GradientPass,
    horizon => HorizonPass,
    shadow => ShadowPass,
]);

/// Engine-owned resources the passes bind.
pub struct PassResources<'a> {
    pub shaders: &'a Shaders,
    pub capabilities: &'a Capabilities,
    pub stitch: &'a StitchTexture,
    pub slots: &'a StorageBuffer<u32>,
    pub samples: &'a StorageBuffer<gpu::DaylightSample>,
}

/// Per-tile parameters shared by all passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileContext {
    pub tile_size: u32,
    pub meters_per_pixel: f32,
    pub max_neighbor_offset: u32,
}
