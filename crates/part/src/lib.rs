//! Partitioned bi-directional CSR graphs for distributed graph algorithms.
//!
//! A directed graph with `n` vertices and `m` edges is split across the
//! ranks of a process group: every rank owns a contiguous slice of the
//! global vertex range and stores the outgoing and incoming adjacency of
//! exactly those vertices in Compressed-Sparse-Row form. Neighbors owned by
//! other ranks (ghosts) appear in the adjacency lists as their global ids;
//! the partition never stores topology for vertices it does not own.
//!
//! The crate provides
//!
//! - the [`Part`] partition contract with the trivial and balanced slice
//!   implementations,
//! - the [`DirectedGraphPart`] graph partition and the backward complement
//!   that derives the incoming CSR from the outgoing one,
//! - the memory toolkit used by the search phases (packed bit set, bounded
//!   stack, dense-id hash map),
//! - the manifest and binary array loader for graphs stored on disk.
//!
//! Vertex ids and CSR offsets are both abstracted over [`Idx`] so that a
//! graph can be held with 32 bit ids and 64 bit offsets (or any other
//! combination) without touching the algorithms.

pub mod complement;
pub mod graph;
pub mod index;
pub mod input;
pub mod mem;
pub mod partition;
pub mod prelude;

pub use crate::graph::{CsrPart, DirectedGraphPart, Edge};
pub use crate::index::Idx;
pub use crate::partition::{BalancedSlicePart, Part, TrivialSlicePart};

use thiserror::Error;

/// Boundary errors of the manifest and graph file loaders.
///
/// Everything in here is reported before the first collective call of an
/// SCC run; once the pipeline is running, failures are programming errors
/// and abort the rank instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("error while loading graph")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("error while deserializing: {0}")]
    Deserialize(String),
    #[error("memory mapping failed")]
    MemoryMap { source: std::io::Error },
    #[error("violated input assumption: {0}")]
    Assumption(String),
    #[error("filesystem error: {0}")]
    Filesystem(String),
    #[error("invalid value width {width}, expected 1..=8 bytes")]
    InvalidWidth { width: u8 },
}
