use crate::array::CacheArray;
use crate::config::Geometry;
use crate::controller::{AccessController, ControllerEvent, ControllerState, Stats};
use crate::error::CacheError;
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, NoPolicy, ReplacementPolicy, RoundRobin};

/// The inputs presented to the cache on one tick
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AccessRequest {
    pub address: u64,
    /// Data written on a fill or an explicit write
    pub data_in: u64,
    /// Explicit write of `data_in` into the victim way at the end of this tick
    pub write: bool,
}

impl AccessRequest {
    pub fn read(address: u64, data_in: u64) -> Self {
        Self { address, data_in, write: false }
    }

    pub fn write(address: u64, data_in: u64) -> Self {
        Self { address, data_in, write: true }
    }
}

/// The outputs of one tick
///
/// `hit`, `data_out` and `ready` describe this tick's address against the lines as they were at
/// the start of the tick. `hit_rate` includes this tick's counter updates
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickOutput {
    /// None when not ready
    pub data_out: Option<u64>,
    pub hit: bool,
    pub ready: bool,
    pub hit_rate: u32,
}

impl TickOutput {
    const RESET: TickOutput = TickOutput {
        data_out: None,
        hit: false,
        ready: false,
        hit_rate: 0,
    };
}

/// A cycle driven set associative cache, parameterised by a replacement policy
///
/// Each tick reads the old state of every component, works out the next state, then commits it in
/// one go. In order: the policy decision, the lookup across ways, the controller transition, then
/// the victim write, which is readable from the next tick on
///
/// As with the policies, static dispatch lets the compiler inline the policy calls into the tick
pub struct CacheModel<R: ReplacementPolicy> {
    array: CacheArray,
    controller: AccessController,
    policy: R,
    ticks: u64,
}

impl<R: ReplacementPolicy> CacheModel<R> {
    pub fn new(geometry: Geometry, policy: R) -> Self {
        Self {
            array: CacheArray::new(geometry),
            controller: AccessController::new(),
            policy,
            ticks: 0,
        }
    }

    /// Advances the cache by one tick
    ///
    /// Reset takes priority over everything else. Changing the address while a miss is being
    /// filled is rejected with a SequencingViolation, and the tick has no effect
    ///
    /// # Arguments
    ///
    /// * `request`: The address, data and write request presented this tick
    /// * `reset`: Synchronous reset
    ///
    /// returns: Result<TickOutput, CacheError>
    pub fn step(&mut self, request: AccessRequest, reset: bool) -> Result<TickOutput, CacheError> {
        if reset {
            self.reset();
            self.ticks += 1;
            return Ok(TickOutput::RESET);
        }
        self.check(&request, false)?;
        let address = request.address & self.array.geometry().address_mask();
        self.ticks += 1;

        let decision = self.policy.evaluate(address);
        let lookup = self.array.lookup(address)?;
        // Registered, so the aggregator sees the value from before this transition
        let write_enable = self.controller.write_enable();
        let event = self.controller.tick(address, lookup.hit);
        if write_enable || request.write {
            self.array.schedule_write(address, request.data_in, decision.replace_way)?;
        }

        if event == ControllerEvent::Hit {
            if let Some(way) = lookup.way {
                self.policy.update_on_hit(address, way);
            }
        }
        if let Some(way) = self.array.commit() {
            log::debug!("Filled {address:#x} into way {way}");
            self.policy.update_on_fill(address, way);
        }

        Ok(TickOutput {
            data_out: lookup.data_out,
            hit: lookup.hit,
            ready: lookup.ready,
            hit_rate: self.controller.hit_rate(),
        })
    }

    /// Whether `step` would accept this tick, without changing anything
    ///
    /// A reset is always accepted. Otherwise the address must stay put while a miss is filled
    pub fn check(&self, request: &AccessRequest, reset: bool) -> Result<(), CacheError> {
        if reset {
            return Ok(());
        }
        let address = request.address & self.array.geometry().address_mask();
        let state = self.controller.state();
        if state.is_filling() && address != self.controller.previous_address() {
            return Err(CacheError::SequencingViolation {
                state,
                expected: self.controller.previous_address(),
                found: address,
            });
        }
        Ok(())
    }

    /// Clears every line, the controller and the policy
    pub fn reset(&mut self) {
        self.array.reset();
        self.controller.reset();
        self.policy.reset();
    }

    pub fn geometry(&self) -> &Geometry {
        self.array.geometry()
    }

    pub fn stats(&self) -> Stats {
        self.controller.stats()
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn controller(&self) -> &AccessController {
        &self.controller
    }

    pub fn array(&self) -> &CacheArray {
        &self.array
    }

    pub fn policy(&self) -> &R {
        &self.policy
    }

    /// Ticks stepped since construction, reset ticks included and rejected ticks excluded
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn valid_line_counts(&self) -> Vec<usize> {
        self.array.valid_line_counts()
    }

    #[cfg(test)]
    pub(crate) fn array_mut(&mut self) -> &mut CacheArray {
        &mut self.array
    }

    #[cfg(test)]
    pub(crate) fn controller_mut(&mut self) -> &mut AccessController {
        &mut self.controller
    }
}

/// Enum for the 4 kinds of cache model provided by the library
///
/// The simulator steps every model once per trace line, going through a trait object each time is
/// surprisingly slow, as it is opaque to the compiler. Branching on all implementations lets it
/// reason about the concrete types and inline
pub enum GenericCache {
    RoundRobin(CacheModel<RoundRobin>),
    LeastRecentlyUsed(CacheModel<LeastRecentlyUsed>),
    LeastFrequentlyUsed(CacheModel<LeastFrequentlyUsed>),
    NoPolicy(CacheModel<NoPolicy>),
}

impl From<CacheModel<RoundRobin>> for GenericCache {
    fn from(value: CacheModel<RoundRobin>) -> Self {
        Self::RoundRobin(value)
    }
}

impl From<CacheModel<LeastRecentlyUsed>> for GenericCache {
    fn from(value: CacheModel<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<CacheModel<LeastFrequentlyUsed>> for GenericCache {
    fn from(value: CacheModel<LeastFrequentlyUsed>) -> Self {
        Self::LeastFrequentlyUsed(value)
    }
}

impl From<CacheModel<NoPolicy>> for GenericCache {
    fn from(value: CacheModel<NoPolicy>) -> Self {
        Self::NoPolicy(value)
    }
}

impl GenericCache {
    pub fn step(&mut self, request: AccessRequest, reset: bool) -> Result<TickOutput, CacheError> {
        match self {
            GenericCache::RoundRobin(c) => c.step(request, reset),
            GenericCache::LeastRecentlyUsed(c) => c.step(request, reset),
            GenericCache::LeastFrequentlyUsed(c) => c.step(request, reset),
            GenericCache::NoPolicy(c) => c.step(request, reset)
        }
    }

    pub fn check(&self, request: &AccessRequest, reset: bool) -> Result<(), CacheError> {
        match self {
            GenericCache::RoundRobin(c) => c.check(request, reset),
            GenericCache::LeastRecentlyUsed(c) => c.check(request, reset),
            GenericCache::LeastFrequentlyUsed(c) => c.check(request, reset),
            GenericCache::NoPolicy(c) => c.check(request, reset)
        }
    }

    pub fn stats(&self) -> Stats {
        match self {
            GenericCache::RoundRobin(c) => c.stats(),
            GenericCache::LeastRecentlyUsed(c) => c.stats(),
            GenericCache::LeastFrequentlyUsed(c) => c.stats(),
            GenericCache::NoPolicy(c) => c.stats()
        }
    }

    pub fn state(&self) -> ControllerState {
        match self {
            GenericCache::RoundRobin(c) => c.state(),
            GenericCache::LeastRecentlyUsed(c) => c.state(),
            GenericCache::LeastFrequentlyUsed(c) => c.state(),
            GenericCache::NoPolicy(c) => c.state()
        }
    }

    pub fn geometry(&self) -> &Geometry {
        match self {
            GenericCache::RoundRobin(c) => c.geometry(),
            GenericCache::LeastRecentlyUsed(c) => c.geometry(),
            GenericCache::LeastFrequentlyUsed(c) => c.geometry(),
            GenericCache::NoPolicy(c) => c.geometry()
        }
    }

    pub fn valid_line_counts(&self) -> Vec<usize> {
        match self {
            GenericCache::RoundRobin(c) => c.valid_line_counts(),
            GenericCache::LeastRecentlyUsed(c) => c.valid_line_counts(),
            GenericCache::LeastFrequentlyUsed(c) => c.valid_line_counts(),
            GenericCache::NoPolicy(c) => c.valid_line_counts()
        }
    }
}
