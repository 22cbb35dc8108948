//! Umbra: GPU precomputation of terrain shadows, daylight, horizons and
//! gradients for elevation tiles.
//!
//! The engine renders, for every visible tile, an off-screen texture that
//! shading code can sample later; elevation of neighboring tiles is stitched
//! in, so that rays (and derivatives) can cross tile borders. Results are
//! cached per tile and rebuilt only when something they depend on changes.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_many_arguments)]

mod buffers;
mod cache;
mod capabilities;
mod daylight;
mod dem;
mod ephemeris;
mod error;
mod horizon;
mod host;
mod lut;
mod neighbors;
mod passes;
mod plan;
mod settings;
mod shaders;
mod signature;
mod stitch;
mod tile;
mod utils;

use std::sync::Arc;

use fxhash::FxHashMap;
use log::{debug, info, trace, warn};
pub use umbra_gpu as gpu;

pub use self::buffers::*;
pub use self::cache::*;
pub use self::capabilities::*;
pub use self::daylight::*;
pub use self::dem::*;
pub use self::ephemeris::*;
pub use self::error::*;
pub use self::horizon::*;
pub use self::host::*;
pub use self::lut::*;
pub use self::neighbors::*;
pub use self::passes::*;
pub use self::plan::*;
pub use self::settings::*;
pub use self::shaders::*;
pub use self::signature::*;
pub use self::stitch::*;
pub use self::tile::*;
pub use self::utils::*;

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    capabilities: Capabilities,
    offsets: NeighborOffsets,

    /// Present only when the device supports everything the engine needs.
    resources: Option<Resources>,

    outputs: FxHashMap<Mode, TileCache<Texture>>,
    exposure: ExposureLutCache,
    exposure_buffer: Option<StorageBuffer<f32>>,
}

#[derive(Debug)]
struct Resources {
    shaders: Shaders,
    slots: StorageBuffer<u32>,
    samples: StorageBuffer<gpu::DaylightSample>,
    stitch: Option<StitchTexture>,
    passes: Option<TilePasses>,
}

/// What happened during [`Engine::prepare()`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareOutcome {
    pub rendered: usize,
    pub reused: usize,
    pub skipped: usize,

    /// Number of cached textures freed, because their tiles are no longer
    /// visible.
    pub freed: usize,

    /// Set when some tiles couldn't be prepared yet; the caller should try
    /// again in the next frame.
    pub needs_repaint: bool,
}

impl Engine {
    /// Creates the engine; the device should've been requested with
    /// [`Capabilities::required_features()`] and
    /// [`Capabilities::required_limits()`]; when it wasn't, the engine stays
    /// inert and [`Self::prepare()`] does nothing.
    pub fn new(
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        config: EngineConfig,
    ) -> Self {
        let config = config.clamped();

        info!(
            "Initializing; max_neighbor_offset={}",
            config.max_neighbor_offset
        );

        let capabilities = Capabilities::detect(adapter, device);
        let offsets = NeighborOffsets::new(config.max_neighbor_offset);

        let resources = capabilities.is_supported().then(|| Resources {
            shaders: Shaders::new(device),
            slots: StorageBuffer::new(
                device,
                "umbra_slots",
                gpu::SLOT_TABLE_LEN,
                offsets.slot_table().to_vec(),
            ),
            samples: StorageBuffer::new(
                device,
                "umbra_daylight_samples",
                gpu::MAX_DAYLIGHT_SAMPLES as usize,
                Vec::new(),
            ),
            stitch: None,
            passes: None,
        });

        Self {
            config,
            capabilities,
            offsets,
            resources,
            outputs: Default::default(),
            exposure: Default::default(),
            exposure_buffer: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_supported(&self) -> bool {
        self.resources.is_some()
    }

    pub fn neighbor_offsets(&self) -> &NeighborOffsets {
        &self.offsets
    }

    /// Renders whatever the visible tiles are missing for given request,
    /// reusing cached data where possible, and frees data of tiles that are no
    /// longer visible.
    ///
    /// Work is recorded into a command encoder owned by the engine and
    /// submitted before returning, so outputs are ready for anything the
    /// caller submits afterwards.
    pub fn prepare<H>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        host: &mut H,
        request: PassRequest,
    ) -> PrepareOutcome
    where
        H: TerrainHost + ?Sized,
    {
        utils::measure("umbra_prepare", || {
            self.prepare_ex(device, queue, host, request)
        })
    }

    fn prepare_ex<H>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        host: &mut H,
        request: PassRequest,
    ) -> PrepareOutcome
    where
        H: TerrainHost + ?Sized,
    {
        let Some(resources) = &mut self.resources else {
            return PrepareOutcome::default();
        };

        let request = request.clamped();
        let mode = request.mode();
        let cache = self.outputs.entry(mode).or_default();
        let plan = plan_tiles(&*host, &self.offsets, cache, &request);

        for tile in &plan.stale {
            trace!("Dropping stale output of tile {tile}");

            cache.remove(*tile);
        }

        let mut outcome = PrepareOutcome {
            reused: plan.reused.len(),
            skipped: plan.not_ready.len(),
            needs_repaint: !plan.not_ready.is_empty(),
            ..Default::default()
        };

        if !plan.jobs.is_empty() {
            debug!(
                "Preparing tiles; mode={}, jobs={}, reused={}",
                mode.name(),
                plan.jobs.len(),
                plan.reused.len()
            );

            if let PassRequest::Daylight { daylight, .. } = &request {
                if *resources.samples != daylight.samples {
                    *resources.samples = daylight.samples.clone();
                }
            }

            resources.slots.flush(queue);
            resources.samples.flush(queue);

            let mut encoder =
                device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("umbra_prepare"),
                });

            let mut prepared = Vec::new();

            for job in plan.jobs {
                let tile = job.tile;

                let result = resources.render(
                    device,
                    &mut encoder,
                    &self.capabilities,
                    &self.offsets,
                    cache,
                    &*host,
                    &request,
                    job,
                );

                match finish_job(cache, tile, result) {
                    Ok(()) => {
                        outcome.rendered += 1;
                        prepared.push(tile);
                    }

                    Err(err) => {
                        warn!("Couldn't prepare tile {tile}: {err}");

                        outcome.skipped += 1;
                        outcome.needs_repaint = true;
                    }
                }
            }

            queue.submit([encoder.finish()]);

            for tile in prepared {
                host.mark_prepared(tile);
            }
        }

        // Tiles that left the view are freed in every mode
        outcome.freed =
            collect_all_garbage(self.outputs.values_mut(), &plan.active);

        if outcome.freed > 0 {
            debug!("Freed {} tile(s); mode={}", outcome.freed, mode.name());
        }

        outcome
    }

    /// Makes every cached output stale; nothing gets freed until the tiles
    /// become invisible or get rebuilt.
    pub fn invalidate_all(&mut self) {
        info!("Invalidating all tiles");

        for cache in self.outputs.values_mut() {
            cache.invalidate_all();
        }

        self.exposure.clear();
    }

    /// Returns the most recent, non-invalidated output for given tile.
    pub fn tile_output(
        &self,
        mode: Mode,
        tile: TileId,
    ) -> Option<&wgpu::TextureView> {
        self.tile_texture(mode, tile).map(|tex| tex.view())
    }

    pub fn tile_texture(&self, mode: Mode, tile: TileId) -> Option<&Texture> {
        self.outputs
            .get(&mode)?
            .get_current(tile)
            .map(|entry| &entry.resource)
    }

    pub fn horizon_table(&self, tile: TileId) -> Option<HorizonTable<'_>> {
        self.outputs
            .get(&Mode::Horizon)?
            .get_current(tile)
            .and_then(HorizonTable::new)
    }

    /// Number of tiles with (possibly stale) data cached for given mode.
    pub fn cached_tiles(&self, mode: Mode) -> usize {
        self.outputs.get(&mode).map_or(0, |cache| cache.len())
    }

    /// Returns the exposure table for given settings, building it when the
    /// settings changed since the last call, and uploads it into
    /// [`Self::exposure_buffer()`].
    pub fn exposure_lut<S>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        provider: &S,
        settings: &ExposureLutSettings,
    ) -> Arc<ExposureLut>
    where
        S: SunPositionProvider + ?Sized,
    {
        let lut = self.exposure.get_or_build(provider, settings);

        if self.resources.is_none() {
            return lut;
        }

        let len = lut.as_slice().len();

        let buffer = match self.exposure_buffer.take() {
            Some(buffer) if buffer.capacity() >= len => buffer,
            _ => StorageBuffer::new(
                device,
                "umbra_exposure_lut",
                len,
                Vec::new(),
            ),
        };

        let buffer = self.exposure_buffer.insert(buffer);

        if buffer.as_slice() != lut.as_slice() {
            trace!("Uploading exposure table; key={:?}", lut.key());

            buffer.clear();
            buffer.extend_from_slice(lut.as_slice());
        }

        buffer.flush(queue);

        lut
    }

    /// Exposure table most recently returned from [`Self::exposure_lut()`],
    /// laid out as [`gpu::ExposureSlice`] expects.
    pub fn exposure_buffer(&self) -> Option<&StorageBuffer<f32>> {
        self.exposure_buffer.as_ref()
    }
}

impl Resources {
    fn render<H>(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        capabilities: &Capabilities,
        offsets: &NeighborOffsets,
        cache: &mut TileCache<Texture>,
        host: &H,
        request: &PassRequest,
        job: TileJob,
    ) -> Result<(Texture, Signature)>
    where
        H: TerrainHost + ?Sized,
    {
        let TileJob {
            tile,
            source,
            neighbors,
            signature,
        } = job;

        let mode = request.mode();
        let size = source.dem.dim;

        let origin = host
            .terrain_data(tile)
            .texture
            .ok_or(Error::MissingElevation(tile))?;

        if origin.width() != size || origin.height() != size {
            return Err(Error::TileSizeMismatch {
                tile,
                expected: size,
                actual: origin.width(),
            });
        }

        let layers = match request {
            PassRequest::Horizon(settings) => settings.azimuth_count,
            _ => 1,
        };

        let format = capabilities.format(mode)?;

        capabilities.check_target(size, layers)?;
        capabilities.check_target(size, offsets.slot_count())?;

        if !self
            .stitch
            .as_ref()
            .is_some_and(|stitch| stitch.fits(size, offsets.slot_count()))
        {
            self.stitch =
                Some(StitchTexture::new(device, size, offsets.slot_count()));

            self.passes = None;
        }

        let stitch = self
            .stitch
            .as_ref()
            .ok_or(Error::Unsupported("stitch texture"))?;

        stitch.validate(origin)?;

        if self.passes.is_none() {
            self.passes = Some(TilePasses::new(
                device,
                &PassResources {
                    shaders: &self.shaders,
                    capabilities,
                    stitch,
                    slots: &self.slots,
                    samples: &self.samples,
                },
            )?);
        }

        let passes = self
            .passes
            .as_ref()
            .ok_or(Error::Unsupported("tile passes"))?;

        // Every neighbor the signature mentions must be stitched in
        let mut sources = Vec::with_capacity(neighbors.len());

        for neighbor_tile in &neighbors {
            let texture = match neighbor_tile {
                Some(id) => {
                    let texture = host
                        .terrain_data(*id)
                        .texture
                        .ok_or(Error::MissingElevation(*id))?;

                    stitch.validate(texture)?;
                    texture
                }

                None => origin,
            };

            sources.push(texture);
        }

        stitch.copy(encoder, 0, origin);

        for (neighbor, texture) in offsets.iter().zip(sources) {
            stitch.copy(encoder, neighbor.slot, texture);
        }

        let target = match cache.remove(tile) {
            Some(target) if target.fits(size, layers, format) => target,

            _ => Texture::new(
                device,
                format!("umbra_{}_{}", mode.name(), tile.key()),
                size,
                layers,
                format,
            ),
        };

        let ctx = TileContext {
            tile_size: size,
            meters_per_pixel: tile.meters_per_pixel(size),
            max_neighbor_offset: offsets.max_offset(),
        };

        match request {
            PassRequest::Gradient(settings) => {
                passes.gradient.run(encoder, &target, ctx, settings);
            }

            PassRequest::Shadow { sun, shadow } => {
                passes.shadow.run(encoder, &target, ctx, sun, shadow);
            }

            PassRequest::Daylight { daylight, shadow } => {
                passes.daylight.run(
                    encoder,
                    &target,
                    ctx,
                    daylight.samples.len() as u32,
                    shadow,
                );
            }

            PassRequest::Horizon(settings) => {
                passes.horizon.run(encoder, &target, ctx, settings);
            }
        }

        trace!("Rendered tile {tile}; signature={signature}");

        Ok((target, signature))
    }
}
