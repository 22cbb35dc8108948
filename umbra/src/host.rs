use crate::TileId;

/// Elevation raster backing a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DemInfo {
    /// Width (and height) of the raster, in texels.
    pub dim: u32,

    /// Identity of the raster's contents; changes whenever the host reloads
    /// the data.
    pub uid: u64,
}

/// Tile whose elevation is used to render another tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceTile {
    /// Tile the elevation comes from; may be an ancestor of the requested
    /// tile when the exact one isn't loaded yet.
    pub id: TileId,

    pub dem: DemInfo,

    /// Set by the host when the tile's data changed in a way the engine
    /// wouldn't notice otherwise; cleared through
    /// [`TerrainHost::mark_prepared()`].
    pub needs_prepare: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TerrainData<'a> {
    /// Terrarium-encoded elevation; must be `Rgba8Unorm` with `COPY_SRC`
    /// usage.
    pub texture: Option<&'a wgpu::Texture>,

    /// Whether the texture comes from a fallback (e.g. lower-zoom) tile.
    pub fallback: bool,
}

/// The map (or whatever owns the tiles) the engine precomputes data for.
pub trait TerrainHost {
    /// Tiles visible in the current frame.
    fn renderable_tiles(&self) -> Vec<TileId>;

    /// Returns the tile providing elevation for `tile`; with `exact`, only
    /// the tile itself qualifies.
    fn source_tile(&self, tile: TileId, exact: bool) -> Option<SourceTile>;

    fn terrain_data(&self, tile: TileId) -> TerrainData<'_>;

    fn mark_prepared(&mut self, tile: TileId);
}
