use crate::config::Geometry;
use crate::error::CacheError;
use crate::way::WayStore;

/// Result of looking an address up across every way
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub hit: bool,
    /// The way that supplied the data, the lowest hitting way
    pub way: Option<usize>,
    /// None is the "not ready" sentinel, only set on a hit
    pub data_out: Option<u64>,
    pub ready: bool,
}

impl Lookup {
    const MISS: Lookup = Lookup {
        hit: false,
        way: None,
        data_out: None,
        ready: false,
    };
}

/// The way aggregator. Owns every way, splits addresses, routes the single victim write and
/// resolves hits with the lowest way winning ties
pub struct CacheArray {
    geometry: Geometry,
    ways: Vec<WayStore>,
}

impl CacheArray {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            ways: (0..geometry.ways()).map(|_| WayStore::new(geometry.lines_per_way())).collect(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Splits an address into (tag, index)
    pub fn split(&self, address: u64) -> (u64, usize) {
        self.geometry.split(address)
    }

    /// Looks up an address against the committed lines
    ///
    /// Ways are scanned in ascending order and the scan stops at the first hit. Stale duplicates of
    /// the same tag can exist in higher ways, as fills only ever target the victim way
    ///
    /// # Arguments
    ///
    /// * `address`: The presented address
    ///
    /// returns: Result<Lookup, CacheError>
    pub fn lookup(&self, address: u64) -> Result<Lookup, CacheError> {
        let (tag, index) = self.split(address);
        let mut way = 0;
        while way < self.ways.len() {
            if self.ways[way].hit(index, tag)? {
                let line = self.ways[way].read(index)?;
                return Ok(Lookup {
                    hit: true,
                    way: Some(way),
                    data_out: Some(line.data),
                    ready: true,
                });
            }
            way += 1;
        }
        Ok(Lookup::MISS)
    }

    /// Stages a write of `data` for `address` into the victim way only
    ///
    /// A victim outside the ways is dropped without touching any way, like the hardware's write
    /// enables all staying low. Returns whether a write was staged
    ///
    /// # Arguments
    ///
    /// * `address`: The address being filled
    /// * `data`: The data word, truncated to the data width
    /// * `victim_way`: The way chosen by the replacement policy
    ///
    /// returns: Result<bool, CacheError>
    pub fn schedule_write(&mut self, address: u64, data: u64, victim_way: usize) -> Result<bool, CacheError> {
        let (tag, index) = self.split(address);
        let data = data & self.geometry.data_mask();
        match self.ways.get_mut(victim_way) {
            Some(way) => {
                way.write(index, tag, data)?;
                Ok(true)
            }
            None => {
                log::trace!("Dropping write of {address:#x}, victim way {victim_way} doesn't exist");
                Ok(false)
            }
        }
    }

    /// Commits staged writes on every way. Returns the way that changed, if any
    pub fn commit(&mut self) -> Option<usize> {
        let mut written = None;
        for (i, way) in self.ways.iter_mut().enumerate() {
            if way.commit() {
                written = Some(i);
            }
        }
        written
    }

    pub fn reset(&mut self) {
        self.ways.iter_mut().for_each(WayStore::reset);
    }

    pub fn ways(&self) -> &[WayStore] {
        &self.ways
    }

    /// Direct access to a way, bypassing the victim write path. Only tests use this, to build states
    /// the normal path can't produce
    #[cfg(test)]
    pub(crate) fn way_mut(&mut self, way: usize) -> &mut WayStore {
        &mut self.ways[way]
    }

    /// Number of valid lines per way
    pub fn valid_line_counts(&self) -> Vec<usize> {
        self.ways.iter().map(WayStore::valid_line_count).collect()
    }
}
