use crate::config::Geometry;

/// What a replacement policy reports for the presented address each tick
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub hit: bool,
    /// The way a fill for this address would be written into
    pub replace_way: usize,
}

/// A generic trait for implementing new replacement policies. Can be used to parameterise a
/// CacheModel.
///
/// The policy owns all of its bookkeeping. The model treats it as an oracle: it asks for a decision
/// once per tick, then reports back hits the controller counted and fills that were committed
pub trait ReplacementPolicy {
    /// Decides hit or miss and the victim way for an address
    ///
    /// Called once per tick, before the controller transition, and must not change the policy. A
    /// victim outside the ways is allowed, the write is then dropped by the aggregator
    ///
    /// # Arguments
    ///
    /// * `address`: The presented address
    ///
    /// returns: PolicyDecision
    fn evaluate(&self, address: u64) -> PolicyDecision;

    /// Updates the policy when the controller counts a hit on `way`
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    fn update_on_hit(&mut self, _address: u64, _way: usize) {}

    /// Updates the policy once a line for `address` has been committed into `way`
    fn update_on_fill(&mut self, address: u64, way: usize);

    /// Forgets everything, as on a cache reset
    fn reset(&mut self);
}

/// A shadow of the tags held by each (index, way), so a policy can answer hit or miss on its own
pub struct TagDirectory {
    geometry: Geometry,
    tags: Vec<Option<u64>>,
}

impl TagDirectory {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            geometry: *geometry,
            tags: vec![None; geometry.lines()],
        }
    }

    /// Position of (index, way) in per-line tables, lines of one index are contiguous
    pub fn slot(&self, index: usize, way: usize) -> usize {
        index * self.geometry.ways() + way
    }

    /// Returns the index of an address and the lowest way holding its tag
    pub fn find(&self, address: u64) -> (usize, Option<usize>) {
        let (tag, index) = self.geometry.split(address);
        let base = self.slot(index, 0);
        let way = self.tags[base..base + self.geometry.ways()]
            .iter()
            .position(|t| *t == Some(tag));
        (index, way)
    }

    pub fn fill(&mut self, address: u64, way: usize) {
        let (tag, index) = self.geometry.split(address);
        let slot = self.slot(index, way);
        self.tags[slot] = Some(tag);
    }

    pub fn clear(&mut self) {
        self.tags.fill(None);
    }

    pub fn ways(&self) -> usize {
        self.geometry.ways()
    }
}

/// NoPolicy is used for direct mapped caches. Every fill goes to way 0
pub struct NoPolicy {
    directory: TagDirectory,
}

impl NoPolicy {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            directory: TagDirectory::new(geometry),
        }
    }
}

impl ReplacementPolicy for NoPolicy {
    fn evaluate(&self, address: u64) -> PolicyDecision {
        let (_, way) = self.directory.find(address);
        PolicyDecision { hit: way.is_some(), replace_way: 0 }
    }

    fn update_on_fill(&mut self, address: u64, way: usize) {
        self.directory.fill(address, way);
    }

    fn reset(&mut self) {
        self.directory.clear();
    }
}

/// Standard round robin replacement policy, which keeps a separate counter for each index
pub struct RoundRobin {
    directory: TagDirectory,
    next_ways: Vec<usize>,
}

impl RoundRobin {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            directory: TagDirectory::new(geometry),
            next_ways: vec![0; geometry.lines_per_way()],
        }
    }
}

impl ReplacementPolicy for RoundRobin {
    fn evaluate(&self, address: u64) -> PolicyDecision {
        let (index, way) = self.directory.find(address);
        PolicyDecision { hit: way.is_some(), replace_way: self.next_ways[index] }
    }

    fn update_on_fill(&mut self, address: u64, way: usize) {
        self.directory.fill(address, way);
        let (index, _) = self.directory.find(address);
        self.next_ways[index] = (way + 1) % self.directory.ways();
    }

    fn reset(&mut self) {
        self.directory.clear();
        self.next_ways.fill(0);
    }
}

/// Least Recently Used replacement policy
///
/// Each line keeps the logical time it was last used. The clock only moves on hits and fills, so
/// never touched lines stay at 0 and are picked first, lowest way first
pub struct LeastRecentlyUsed {
    directory: TagDirectory,
    last_used_times: Vec<u64>,
    time: u64,
}

impl LeastRecentlyUsed {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            directory: TagDirectory::new(geometry),
            last_used_times: vec![0; geometry.lines()],
            time: 1,
        }
    }

    fn touch(&mut self, index: usize, way: usize) {
        let slot = self.directory.slot(index, way);
        self.last_used_times[slot] = self.time;
        self.time += 1;
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn evaluate(&self, address: u64) -> PolicyDecision {
        let (index, way) = self.directory.find(address);
        let base = self.directory.slot(index, 0);
        PolicyDecision {
            hit: way.is_some(),
            replace_way: min_way(&self.last_used_times[base..base + self.directory.ways()]),
        }
    }

    fn update_on_hit(&mut self, address: u64, way: usize) {
        let (index, _) = self.directory.find(address);
        self.touch(index, way);
    }

    fn update_on_fill(&mut self, address: u64, way: usize) {
        self.directory.fill(address, way);
        let (index, _) = self.directory.find(address);
        self.touch(index, way);
    }

    fn reset(&mut self) {
        self.directory.clear();
        self.last_used_times.fill(0);
        self.time = 1;
    }
}

/// Least frequently used replacement policy. A fill starts the line's count at 1
pub struct LeastFrequentlyUsed {
    directory: TagDirectory,
    usages: Vec<u64>,
}

impl LeastFrequentlyUsed {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            directory: TagDirectory::new(geometry),
            usages: vec![0; geometry.lines()],
        }
    }
}

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn evaluate(&self, address: u64) -> PolicyDecision {
        let (index, way) = self.directory.find(address);
        let base = self.directory.slot(index, 0);
        PolicyDecision {
            hit: way.is_some(),
            replace_way: min_way(&self.usages[base..base + self.directory.ways()]),
        }
    }

    fn update_on_hit(&mut self, address: u64, way: usize) {
        let (index, _) = self.directory.find(address);
        let slot = self.directory.slot(index, way);
        self.usages[slot] += 1;
    }

    fn update_on_fill(&mut self, address: u64, way: usize) {
        self.directory.fill(address, way);
        let (index, _) = self.directory.find(address);
        let slot = self.directory.slot(index, way);
        self.usages[slot] = 1;
    }

    fn reset(&mut self) {
        self.directory.clear();
        self.usages.fill(0);
    }
}

// First way holding the smallest value
fn min_way(values: &[u64]) -> usize {
    let mut min_value = u64::MAX;
    let mut min_index = 0;
    let mut i = 0;
    while i < values.len() {
        if values[i] < min_value {
            min_value = values[i];
            min_index = i;
        }
        i += 1;
    }
    min_index
}
