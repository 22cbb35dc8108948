use fxhash::FxHashSet;
use log::trace;

use crate::{
    ElevationTexture, NeighborOffsets, PassKey, PassRequest, Result, Signature,
    SourceTile, TerrainHost, TileCache, TileId,
};

/// Tile that has to be (re)rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct TileJob {
    pub tile: TileId,
    pub source: SourceTile,

    /// Per slot (starting at 1), tile stitched in there; `None` stands for the
    /// origin.
    pub neighbors: Vec<Option<TileId>>,

    pub signature: Signature,
}

/// Outcome of comparing visible tiles against what's already cached.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub jobs: Vec<TileJob>,

    /// Tiles whose cached data is still valid.
    pub reused: Vec<TileId>,

    /// Tiles without any elevation yet, or with only fallback elevation.
    pub not_ready: Vec<TileId>,

    /// Not-ready tiles whose cached data doesn't match current parameters;
    /// it has to be dropped instead of being served.
    pub stale: Vec<TileId>,

    /// Every visible tile; anything else gets garbage-collected.
    pub active: FxHashSet<TileId>,
}

/// Resolves sources and signatures of every visible tile and figures out which
/// of them need rendering.
///
/// Expects an already clamped request.
pub fn plan_tiles<H, R>(
    host: &H,
    offsets: &NeighborOffsets,
    cache: &TileCache<R>,
    request: &PassRequest,
) -> Plan
where
    H: TerrainHost + ?Sized,
{
    let pass = PassKey::new(request);
    let mut plan = Plan::default();

    for tile in host.renderable_tiles() {
        if !plan.active.insert(tile) {
            continue;
        }

        let Some(source) = host.source_tile(tile, false) else {
            plan.not_ready.push(tile);

            if cache.get(tile).is_some() {
                plan.stale.push(tile);
            }

            continue;
        };

        let fallback = host.terrain_data(tile).fallback;

        let mut neighbors = Vec::with_capacity(offsets.len());
        let mut neighbor_uids = Vec::with_capacity(offsets.len());

        for (neighbor, neighbor_tile) in offsets.tiles_around(tile) {
            let neighbor_source = neighbor_tile
                .and_then(|neighbor_tile| host.source_tile(neighbor_tile, true))
                .filter(|neighbor_source| {
                    neighbor_source.dem.dim == source.dem.dim
                })
                .filter(|neighbor_source| {
                    // Textures that can't be stitched are treated as missing
                    // here already, so that the signature matches what gets
                    // rendered
                    host.terrain_data(neighbor_source.id).texture.map_or(
                        true,
                        |texture| {
                            ElevationTexture::of(texture)
                                .check(source.dem.dim)
                                .is_ok()
                        },
                    )
                });

            if let Some(neighbor_source) = neighbor_source {
                neighbors.push(Some(neighbor_source.id));
                neighbor_uids.push(Some(neighbor_source.dem.uid));
            } else {
                trace!(
                    "Neighbor `{}` of tile {} is not available; using origin",
                    neighbor.name,
                    tile
                );

                neighbors.push(None);
                neighbor_uids.push(None);
            }
        }

        let signature = Signature {
            mode: request.mode(),
            tile_size: source.dem.dim,
            max_neighbor_offset: offsets.max_offset(),
            dem_uid: source.dem.uid,
            neighbor_uids,
            fallback,
            version: cache.version(),
            pass: pass.clone(),
        };

        if fallback {
            trace!("Tile {tile} has only fallback elevation; skipping");

            plan.not_ready.push(tile);

            // Whatever was rendered from real elevation stays usable for as
            // long as nothing else changes
            let rendered = Signature {
                fallback: false,
                ..signature
            };

            if cache.get(tile).is_some() && !cache.is_fresh(tile, &rendered) {
                plan.stale.push(tile);
            }

            continue;
        }

        if !source.needs_prepare && cache.is_fresh(tile, &signature) {
            plan.reused.push(tile);
            continue;
        }

        plan.jobs.push(TileJob {
            tile,
            source,
            neighbors,
            signature,
        });
    }

    plan
}

/// Stores what rendering given tile produced.
///
/// A failed build leaves no data behind: whatever was cached for the tile was
/// built for different parameters and must not be served as current.
pub fn finish_job<R>(
    cache: &mut TileCache<R>,
    tile: TileId,
    result: Result<(R, Signature)>,
) -> Result<()> {
    match result {
        Ok((resource, signature)) => {
            cache.put(tile, resource, signature);
            Ok(())
        }

        Err(err) => {
            cache.remove(tile);
            Err(err)
        }
    }
}
