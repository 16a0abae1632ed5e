use std::io::BufRead;
use std::time::{Duration, Instant};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::cache::{AccessRequest, CacheModel, GenericCache};
use crate::config::{CacheConfig, CacheKindConfig, ReplacementPolicyConfig, SimulationConfig};
use crate::error::CacheError;
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, NoPolicy, RoundRobin};

lazy_static! {
    static ref TRACE_LINE: Regex = Regex::new(
        r"^(?:(?P<reset>reset)|(?P<op>[RrWw])\s+(?:0x)?(?P<address>[0-9a-fA-F]+)(?:\s+(?:0x)?(?P<data>[0-9a-fA-F]+))?)(?:\s+x(?P<repeat>[0-9]+))?$"
    ).expect("trace line pattern is valid");
}

/// One trace line, presented for `repeat` consecutive ticks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TraceTick {
    pub request: AccessRequest,
    pub reset: bool,
    pub repeat: u64,
}

/// The simulator replays a trace, one line per tick, through every configured cache and collects
/// the results.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly
pub struct Simulator {
    caches: Vec<GenericCache>,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised to JSON
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub ticks: u64,
    pub caches: Vec<CacheResult>,
}

/// The result for an individual cache. Can be serialised to JSON
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct CacheResult {
    pub name: String,
    pub accesses: u64,
    pub hits: u64,
    pub hit_rate: u32,
    /// Ticks on which data_out was ready
    pub hit_ticks: u64,
}

impl Simulator {

    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A simulation configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, CacheError>
    pub fn new(config: &SimulationConfig) -> Result<Self, CacheError> {
        if config.caches.is_empty() {
            return Err(CacheError::Configuration("no caches configured".to_string()));
        }
        let caches = config.caches.iter().map(Self::config_to_cache).collect::<Result<Vec<_>, _>>()?;
        let result = SimulationResult {
            ticks: 0,
            caches: config.caches.iter().map(|cache| CacheResult {
                name: cache.name.clone(),
                accesses: 0,
                hits: 0,
                hit_rate: 0,
                hit_ticks: 0,
            }).collect(),
        };
        Ok(Self {
            caches,
            result,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Steps every cache once with the same inputs. A tick rejected by any cache steps none of them
    ///
    /// # Arguments
    ///
    /// * `line`: The trace line the tick came from, for error reporting
    /// * `request`: The inputs of the tick
    /// * `reset`: Synchronous reset
    ///
    /// returns: Result<(), CacheError>
    fn tick(&mut self, line: usize, request: AccessRequest, reset: bool) -> Result<(), CacheError> {
        // Every cache has to accept the tick before any of them steps
        for (cache, res) in self.caches.iter().zip(&self.result.caches) {
            cache.check(&request, reset).map_err(|e| CacheError::Tick {
                line,
                cache: res.name.clone(),
                source: Box::new(e),
            })?;
        }
        for (cache, res) in self.caches.iter_mut().zip(&mut self.result.caches) {
            let output = cache.step(request, reset).map_err(|e| CacheError::Tick {
                line,
                cache: res.name.clone(),
                source: Box::new(e),
            })?;
            if output.hit {
                res.hit_ticks += 1;
            }
        }
        self.result.ticks += 1;
        Ok(())
    }

    /// Replays a trace
    ///
    /// Each line is `R <address> [data] [xN]`, `W <address> [data] [xN]` or `reset [xN]`, with hex
    /// address and data. `xN` presents the line for N ticks. Blank lines and lines starting with
    /// `#` are skipped. Reads carry data too, it is what a miss fills the line with
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace
    ///
    /// returns: Result<&SimulationResult, CacheError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<&SimulationResult, CacheError> {
        log::info!("Simulating {} cache(s)", self.caches.len());
        let start = Instant::now();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let number = i + 1;
            if let Some(tick) = parse_trace_line(number, &line)? {
                let mut n = 0;
                while n < tick.repeat {
                    self.tick(number, tick.request, tick.reset)?;
                    n += 1;
                }
            }
        }
        let end = Instant::now();
        self.simulation_time += end - start;
        for (cache, res) in self.caches.iter().zip(&mut self.result.caches) {
            let stats = cache.stats();
            res.accesses = stats.total_accesses;
            res.hits = stats.total_hits;
            res.hit_rate = stats.hit_rate();
        }
        log::info!("Simulated {} ticks in {:?}", self.result.ticks, self.simulation_time);
        Ok(&self.result)
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of valid lines for each cache
    pub fn get_valid_line_counts(&self) -> Vec<u64> {
        self.caches.iter().map(|x| x.valid_line_counts().iter().sum::<usize>() as u64).collect()
    }

    pub fn caches(&self) -> &[GenericCache] {
        &self.caches
    }

    /// Creates a new cache model from a cache configuration
    fn config_to_cache(config: &CacheConfig) -> Result<GenericCache, CacheError> {
        let geometry = config.geometry()?;
        log::debug!("Cache {}: {geometry:?}", config.name);
        if config.kind == CacheKindConfig::Direct {
            return Ok(GenericCache::from(CacheModel::new(geometry, NoPolicy::new(&geometry))));
        }
        Ok(match config.replacement_policy {
            ReplacementPolicyConfig::RoundRobin => {
                GenericCache::from(CacheModel::new(geometry, RoundRobin::new(&geometry)))
            }
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericCache::from(CacheModel::new(geometry, LeastRecentlyUsed::new(&geometry)))
            }
            ReplacementPolicyConfig::LeastFrequentlyUsed => {
                GenericCache::from(CacheModel::new(geometry, LeastFrequentlyUsed::new(&geometry)))
            }
        })
    }
}

/// Parses one trace line, returning None for blank lines and comments
///
/// # Arguments
///
/// * `line`: The 1-based line number, for error reporting
/// * `text`: The line
///
/// returns: Result<Option<TraceTick>, CacheError>
///
/// # Examples
///
/// ```
/// use assoclib::simulator::parse_trace_line;
/// let tick = parse_trace_line(1, "R 0x00A4 DEADBEEF x4").unwrap().unwrap();
/// assert_eq!(tick.request.address, 0xA4);
/// assert_eq!(tick.request.data_in, 0xDEADBEEF);
/// assert_eq!(tick.repeat, 4);
/// ```
pub fn parse_trace_line(line: usize, text: &str) -> Result<Option<TraceTick>, CacheError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let captures = TRACE_LINE.captures(text).ok_or_else(|| CacheError::Parse {
        line,
        message: format!("can't parse '{text}'"),
    })?;
    let repeat = match captures.name("repeat") {
        Some(m) => m.as_str().parse::<u64>().map_err(|e| CacheError::Parse {
            line,
            message: format!("bad repeat count: {e}"),
        })?,
        None => 1,
    };
    if captures.name("reset").is_some() {
        return Ok(Some(TraceTick {
            request: AccessRequest::default(),
            reset: true,
            repeat,
        }));
    }
    let hex = |name: &str| -> Result<u64, CacheError> {
        match captures.name(name) {
            Some(m) => u64::from_str_radix(m.as_str(), 16).map_err(|e| CacheError::Parse {
                line,
                message: format!("bad {name} '{}': {e}", m.as_str()),
            }),
            None => Ok(0),
        }
    };
    let address = hex("address")?;
    let data_in = hex("data")?;
    let write = captures.name("op").map_or(false, |op| op.as_str().eq_ignore_ascii_case("w"));
    Ok(Some(TraceTick {
        request: AccessRequest { address, data_in, write },
        reset: false,
        repeat,
    }))
}
