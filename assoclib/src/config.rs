use serde::Deserialize;
use crate::error::CacheError;

/// A simulation configuration, every cache in it is driven by the same trace independently
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    pub caches: Vec<CacheConfig>,
}

/// A configuration for a single cache model
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    pub name: String,
    /// Total number of lines across all ways
    pub lines: u64,
    pub kind: CacheKindConfig,
    #[serde(default = "default_address_width")]
    pub address_width: u32,
    #[serde(default = "default_data_width")]
    pub data_width: u32,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub replacement_policy: ReplacementPolicyConfig,
}

fn default_address_width() -> u32 {
    16
}

fn default_data_width() -> u32 {
    32
}

/// The associativity - direct, 2way, 4way, 8way, or full
#[derive(Debug, Copy, Clone, Deserialize, PartialEq, Eq)]
pub enum CacheKindConfig {
    #[serde(alias = "direct")]
    Direct,
    #[serde(alias = "full")]
    Full,
    #[serde(alias = "2way")]
    TwoWay,
    #[serde(alias = "4way")]
    FourWay,
    #[serde(alias = "8way")]
    EightWay,
}

/// The replacement policy, if applicable - round robin, lru, or lfu. Defaults to round robin.
#[derive(Debug, Copy, Clone, Default, Deserialize, PartialEq, Eq)]
pub enum ReplacementPolicyConfig {
    #[default]
    #[serde(alias = "rr")]
    RoundRobin,
    #[serde(alias = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "lfu")]
    LeastFrequentlyUsed,
}

impl CacheConfig {
    /// Number of ways implied by the kind. A fully associative cache has one way per line
    pub fn ways(&self) -> u64 {
        match self.kind {
            CacheKindConfig::Direct => 1,
            CacheKindConfig::TwoWay => 2,
            CacheKindConfig::FourWay => 4,
            CacheKindConfig::EightWay => 8,
            CacheKindConfig::Full => self.lines,
        }
    }

    /// Validates the configuration and derives the fixed geometry of the model
    pub fn geometry(&self) -> Result<Geometry, CacheError> {
        Geometry::new(self.address_width, self.data_width, self.ways() as usize, self.lines as usize)
    }
}

/// The fixed shape of a cache model. Built once, never changes afterwards
///
/// The address is split with the low `index_bits` selecting the line inside every way and the
/// remaining `tag_bits` stored alongside the data
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    address_width: u32,
    data_width: u32,
    ways: usize,
    lines: usize,
    lines_per_way: usize,
    index_bits: u32,
}

impl Geometry {
    /// Validates the generic parameters of a cache
    ///
    /// # Arguments
    ///
    /// * `address_width`: Address bits, 1 to 64
    /// * `data_width`: Data word bits, 1 to 64
    /// * `ways`: Associativity, at least 1
    /// * `lines`: Total line count, must split evenly into a power of two number of lines per way
    ///
    /// returns: Result<Geometry, CacheError>
    pub fn new(address_width: u32, data_width: u32, ways: usize, lines: usize) -> Result<Self, CacheError> {
        if !(1..=64).contains(&address_width) {
            return Err(CacheError::Configuration(format!("address width {address_width} must be between 1 and 64")));
        }
        if !(1..=64).contains(&data_width) {
            return Err(CacheError::Configuration(format!("data width {data_width} must be between 1 and 64")));
        }
        if ways == 0 {
            return Err(CacheError::Configuration("a cache needs at least one way".to_string()));
        }
        if lines == 0 || lines % ways != 0 {
            return Err(CacheError::Configuration(format!("{lines} lines can't be split evenly over {ways} ways")));
        }
        let lines_per_way = lines / ways;
        if !lines_per_way.is_power_of_two() {
            return Err(CacheError::Configuration(format!("{lines_per_way} lines per way is not a power of two")));
        }
        let index_bits = lines_per_way.trailing_zeros();
        if index_bits > address_width {
            return Err(CacheError::Configuration(format!(
                "{index_bits} index bits don't fit in a {address_width} bit address"
            )));
        }
        Ok(Self {
            address_width,
            data_width,
            ways,
            lines,
            lines_per_way,
            index_bits,
        })
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn lines_per_way(&self) -> usize {
        self.lines_per_way
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
        self.address_width - self.index_bits
    }

    pub fn address_mask(&self) -> u64 {
        bit_mask(self.address_width)
    }

    pub fn data_mask(&self) -> u64 {
        bit_mask(self.data_width)
    }

    /// Splits an address into (tag, index). Bits above the address width are ignored
    pub fn split(&self, address: u64) -> (u64, usize) {
        let address = address & self.address_mask();
        let index = address & bit_mask(self.index_bits);
        (address >> self.index_bits, index as usize)
    }
}

/// A mask with the lowest `bits` bits set
pub(crate) fn bit_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
