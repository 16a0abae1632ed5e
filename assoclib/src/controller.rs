/// The access sequencing states
///
/// A hit takes two ticks (Idle, Stabilize). A miss takes four, the fill being written at the end of
/// the WriteAfterMiss tick
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Idle,
    Stabilize,
    Miss,
    WriteAfterMiss,
}

impl ControllerState {
    /// Decodes a raw state register. Undefined encodings recover to Idle
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            1 => ControllerState::Stabilize,
            2 => ControllerState::Miss,
            3 => ControllerState::WriteAfterMiss,
            _ => ControllerState::Idle,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            ControllerState::Idle => 0,
            ControllerState::Stabilize => 1,
            ControllerState::Miss => 2,
            ControllerState::WriteAfterMiss => 3,
        }
    }

    /// Whether a miss fill is in flight, during which the address must stay stable
    pub fn is_filling(self) -> bool {
        matches!(self, ControllerState::Miss | ControllerState::WriteAfterMiss)
    }
}

/// Access and hit counters. Only ever grow, until a reset
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_accesses: u64,
    pub total_hits: u64,
}

impl Stats {
    /// Hit rate as a truncated integer percentage, 0 before the first access
    pub fn hit_rate(&self) -> u32 {
        if self.total_accesses > 0 {
            (self.total_hits * 100 / self.total_accesses) as u32
        } else {
            0
        }
    }
}

/// What a tick did to the counters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    None,
    /// A new address was seen and counted
    Access,
    Hit,
    Miss,
}

/// The access controller state machine
///
/// An access is a change of the presented address while idle. Presenting the same address again is
/// not a new access
#[derive(Debug, Default)]
pub struct AccessController {
    state: ControllerState,
    write_enable: bool,
    previous_address: u64,
    miss_detected: bool,
    stats: Stats,
}

impl AccessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one tick
    ///
    /// `hit` is the aggregator's hit flag for `address` this tick. The write enable seen by the
    /// aggregator this tick must be sampled with `write_enable` before calling this
    ///
    /// # Arguments
    ///
    /// * `address`: The presented address
    /// * `hit`: Whether the aggregator reports a hit for it
    ///
    /// returns: ControllerEvent
    pub fn tick(&mut self, address: u64, hit: bool) -> ControllerEvent {
        let previous = self.state;
        let event = match self.state {
            ControllerState::Idle => {
                if address != self.previous_address {
                    self.stats.total_accesses += 1;
                    self.previous_address = address;
                    self.miss_detected = false;
                    self.state = ControllerState::Stabilize;
                    ControllerEvent::Access
                } else {
                    ControllerEvent::None
                }
            }
            ControllerState::Stabilize => {
                if hit {
                    self.stats.total_hits += 1;
                    self.state = ControllerState::Idle;
                    ControllerEvent::Hit
                } else {
                    self.miss_detected = true;
                    self.state = ControllerState::Miss;
                    ControllerEvent::Miss
                }
            }
            ControllerState::Miss => {
                self.write_enable = true;
                self.state = ControllerState::WriteAfterMiss;
                ControllerEvent::None
            }
            ControllerState::WriteAfterMiss => {
                self.write_enable = false;
                self.state = ControllerState::Idle;
                ControllerEvent::None
            }
        };
        if previous != self.state {
            log::debug!("Controller {previous:?} -> {:?} at {address:#x}", self.state);
        }
        event
    }

    /// Back to Idle with cleared counters, write enable, previous address and miss flag
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Forces the state register to a raw encoding, as a glitch or a restored snapshot would
    pub fn load_state_bits(&mut self, bits: u8) {
        self.state = ControllerState::from_bits(bits);
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn write_enable(&self) -> bool {
        self.write_enable
    }

    pub fn previous_address(&self) -> u64 {
        self.previous_address
    }

    pub fn miss_detected(&self) -> bool {
        self.miss_detected
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn hit_rate(&self) -> u32 {
        self.stats.hit_rate()
    }
}
