//! Distributed strongly connected components over partitioned CSR graphs.
//!
//! Every rank holds one slice of a directed graph (see `graph_part`) and
//! all ranks collectively assign each vertex `u` an id `scc_id[u]` such
//! that two vertices share an id exactly when they lie on a common cycle.
//! After the run the id of an SCC is the minimum global vertex id of its
//! members, so the output is fully deterministic for a given input graph.
//!
//! The pipeline peels the graph in four phases, cheapest first:
//!
//! 1. [`trim`] removes vertices with no remaining in- or out-edges; each is
//!    a singleton SCC. This typically clears a large fraction of power-law
//!    graphs.
//! 2. [`pivot`] picks the highest-degree remaining vertex and intersects
//!    its forward and backward reachable sets, which settles the giant SCC
//!    in one sweep.
//! 3. [`color`] runs min-label propagation rounds that discover one SCC
//!    per label component simultaneously, shrinking the residue until it
//!    fits on every rank.
//! 4. [`residual`] replicates the remaining sub-graph everywhere and
//!    finishes it with serial Tarjan.
//!
//! [`scc::scc`] sequences the phases; [`fuzzy`] generates seeded graphs
//! with known decompositions for the test suite.

pub mod color;
pub mod fuzzy;
pub mod normalize;
pub mod pivot;
pub mod prelude;
pub mod residual;
pub mod scc;
pub mod tarjan;
pub mod trim;

pub use crate::scc::{scc, SccConfig};

use graph_part::Idx;

/// The sentinel marking a vertex whose SCC is not settled yet.
#[inline]
pub fn undecided<V: Idx>() -> V {
    V::max_value()
}
