use fxhash::{FxHashMap, FxHashSet};

use crate::{Signature, TileId};

/// Per-tile GPU resources, together with the signatures they were built for.
///
/// Entries live in an arena of slots, recycled through a free list and indexed
/// by tile; [`Self::invalidate_all()`] is lazy (entries merely become stale)
/// and [`Self::collect_garbage()`] is the only thing that actually frees
/// resources.
#[derive(Debug)]
pub struct TileCache<R> {
    slots: Vec<Option<CacheEntry<R>>>,
    free: Vec<usize>,
    index: FxHashMap<TileId, usize>,
    version: u64,
}

#[derive(Debug)]
pub struct CacheEntry<R> {
    pub tile: TileId,
    pub resource: R,
    pub signature: Signature,
}

impl<R> TileCache<R> {
    /// Version signatures must be built with to be considered fresh.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, tile: TileId) -> Option<&CacheEntry<R>> {
        let slot = *self.index.get(&tile)?;

        self.slots[slot].as_ref()
    }

    /// Like [`Self::get()`], but skips entries invalidated since they were
    /// built.
    pub fn get_current(&self, tile: TileId) -> Option<&CacheEntry<R>> {
        self.get(tile)
            .filter(|entry| entry.signature.version == self.version)
    }

    pub fn is_fresh(&self, tile: TileId, signature: &Signature) -> bool {
        self.get(tile).map_or(false, |entry| {
            entry.signature.version == self.version
                && entry.signature == *signature
        })
    }

    /// Stores a resource, replacing the previous one in place.
    pub fn put(&mut self, tile: TileId, resource: R, signature: Signature) {
        let entry = CacheEntry {
            tile,
            resource,
            signature,
        };

        if let Some(&slot) = self.index.get(&tile) {
            self.slots[slot] = Some(entry);
            return;
        }

        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(entry);
            slot
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        };

        self.index.insert(tile, slot);
    }

    /// Takes the resource out, so that it can be rebuilt (and put back).
    pub fn remove(&mut self, tile: TileId) -> Option<R> {
        let slot = self.index.remove(&tile)?;
        let entry = self.slots[slot].take()?;

        self.free.push(slot);

        Some(entry.resource)
    }

    /// Frees every entry whose tile isn't in `active`; returns how many got
    /// freed.
    pub fn collect_garbage(&mut self, active: &FxHashSet<TileId>) -> usize {
        let dead: Vec<_> = self
            .index
            .keys()
            .filter(|tile| !active.contains(tile))
            .copied()
            .collect();

        for tile in &dead {
            self.remove(*tile);
        }

        dead.len()
    }

    pub fn invalidate_all(&mut self) {
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry<R>> + '_ {
        self.slots.iter().flatten()
    }

    /// Number of allocated slots, including free ones.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Runs [`TileCache::collect_garbage()`] over a bunch of caches (e.g. one per
/// mode) that share the same set of visible tiles.
pub fn collect_all_garbage<'a, R>(
    caches: impl IntoIterator<Item = &'a mut TileCache<R>>,
    active: &FxHashSet<TileId>,
) -> usize
where
    R: 'a,
{
    caches
        .into_iter()
        .map(|cache| cache.collect_garbage(active))
        .sum()
}

impl<R> Default for TileCache<R> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
            free: Default::default(),
            index: Default::default(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GradientSettings, Mode, PassKey, PassRequest};

    fn signature(dem_uid: u64, version: u64) -> Signature {
        Signature {
            mode: Mode::Gradient,
            tile_size: 256,
            max_neighbor_offset: 2,
            dem_uid,
            neighbor_uids: Default::default(),
            fallback: false,
            version,
            pass: PassKey::new(&PassRequest::Gradient(
                GradientSettings::default(),
            )),
        }
    }

    fn tile(x: u32) -> TileId {
        TileId::new(4, 0, x, 3)
    }

    #[test]
    fn put_and_get() {
        let mut cache = TileCache::default();

        assert!(cache.get(tile(1)).is_none());

        cache.put(tile(1), "a", signature(1, 0));
        cache.put(tile(2), "b", signature(2, 0));

        assert_eq!("a", cache.get(tile(1)).unwrap().resource);
        assert_eq!("b", cache.get(tile(2)).unwrap().resource);
        assert!(cache.is_fresh(tile(1), &signature(1, 0)));
        assert!(!cache.is_fresh(tile(1), &signature(2, 0)));
        assert!(!cache.is_fresh(tile(3), &signature(1, 0)));

        // Updates happen in place
        cache.put(tile(1), "c", signature(3, 0));

        assert_eq!("c", cache.get(tile(1)).unwrap().resource);
        assert_eq!(2, cache.len());
        assert_eq!(2, cache.capacity());
    }

    #[test]
    fn garbage_collection() {
        let mut cache = TileCache::default();

        for x in 0..4 {
            cache.put(tile(x), x, signature(x as u64, 0));
        }

        let active: FxHashSet<_> = [tile(1), tile(3)].into_iter().collect();

        assert_eq!(2, cache.collect_garbage(&active));
        assert_eq!(2, cache.len());
        assert!(cache.get(tile(0)).is_none());
        assert!(cache.get(tile(2)).is_none());
        assert!(cache.get(tile(1)).is_some());

        // Freed slots get recycled
        cache.put(tile(10), 10, signature(10, 0));
        cache.put(tile(11), 11, signature(11, 0));

        assert_eq!(4, cache.capacity());
        assert_eq!(4, cache.len());

        let active: FxHashSet<_> =
            [tile(1), tile(3), tile(10), tile(11)].into_iter().collect();

        assert_eq!(0, cache.collect_garbage(&active));
    }

    #[test]
    fn garbage_collection_across_caches() {
        let mut caches = Vec::new();

        for _ in 0..3 {
            let mut cache = TileCache::default();

            for x in 0..3 {
                cache.put(tile(x), x, signature(x as u64, 0));
            }

            caches.push(cache);
        }

        let active: FxHashSet<_> = [tile(2)].into_iter().collect();

        assert_eq!(6, collect_all_garbage(&mut caches, &active));
        assert!(caches.iter().all(|cache| cache.len() == 1));
        assert_eq!(0, collect_all_garbage(&mut caches, &active));
    }

    #[test]
    fn invalidation_is_lazy() {
        let mut cache = TileCache::default();

        cache.put(tile(1), (), signature(1, cache.version()));
        cache.invalidate_all();

        assert_eq!(1, cache.len());
        assert!(cache.get(tile(1)).is_some());
        assert!(cache.get_current(tile(1)).is_none());
        assert!(!cache.is_fresh(tile(1), &signature(1, 0)));
        assert!(!cache.is_fresh(tile(1), &signature(1, cache.version())));

        cache.put(tile(1), (), signature(1, cache.version()));

        assert!(cache.is_fresh(tile(1), &signature(1, 1)));
        assert!(cache.get_current(tile(1)).is_some());
    }

    #[test]
    fn remove() {
        let mut cache = TileCache::default();

        cache.put(tile(1), 123, signature(1, 0));

        assert_eq!(Some(123), cache.remove(tile(1)));
        assert_eq!(None, cache.remove(tile(1)));
        assert!(cache.is_empty());
    }
}
