//! # AssocLib
//!
//! Assoclib is a cycle level model of a set associative hardware cache block
//!
//! Every component advances in discrete ticks: per way line storage, an aggregator resolving hits
//! across ways, and an access controller sequencing misses and keeping hit statistics. The
//! replacement policy sits behind a trait, so any algorithm can be plugged in
//!
//! A trace simulator drives the model from a file, one line per tick

/// Contains a single way of line storage
pub mod way;

/// Contains the aggregator owning every way of a cache
pub mod array;

/// Contains the access controller state machine and its statistics
pub mod controller;

/// Contains the cache model stepped once per tick, and a utility enum for the provided policies
pub mod cache;

/// Contains definitions for the JSON input format, and the validated cache geometry
pub mod config;

/// Contains the error type shared by the library
pub mod error;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace through a set of caches
pub mod simulator;

/// Contains helpers to open trace files
pub mod io;

#[cfg(test)]
mod test;

/// Contains utilities for running the demo traces in tests and benchmarks.
pub mod util;
