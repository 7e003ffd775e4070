//! Common imports for crates building on the graph partition.

pub use crate::complement::{backward_complement, backward_complement_local};
pub use crate::graph::{CsrPart, DirectedGraphPart, Edge};
pub use crate::index::Idx;
pub use crate::input::{load_graph_part, Endian, Manifest};
pub use crate::mem::{BitSet, HashIdMap, Stack};
pub use crate::partition::{BalancedSlicePart, Part, TrivialSlicePart};
pub use crate::Error;
