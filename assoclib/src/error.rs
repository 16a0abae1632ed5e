use thiserror::Error;
use crate::controller::ControllerState;

/// Every failure the library can report
///
/// Configuration and contract errors are fatal for the model they come from. Dropped victim writes
/// and "not ready" outputs are not errors and never appear here
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid construction parameters
    #[error("invalid cache configuration: {0}")]
    Configuration(String),

    /// A line index outside the way was used. Only reachable through broken wiring
    #[error("line index {index} is out of range for a way of {lines} lines")]
    ContractViolation { index: usize, lines: usize },

    /// The presented address changed while a miss was still being filled
    #[error("address changed to {found:#x} while in {state:?}, expected {expected:#x} until the fill completes")]
    SequencingViolation { state: ControllerState, expected: u64, found: u64 },

    /// A cache rejected a tick while replaying a trace
    #[error("trace line {line}, cache {cache}: {source}")]
    Tick {
        line: usize,
        cache: String,
        #[source]
        source: Box<CacheError>,
    },

    /// A trace line that doesn't match the trace format
    #[error("trace line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Reading a config or trace failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A config or result couldn't be parsed as JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
