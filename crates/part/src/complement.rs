//! Deriving the incoming CSR from the outgoing one.
//!
//! Loaders that only provide forward topology use this to complete the
//! partition. On a single rank the transpose is a pure count/prefix/scatter
//! pass; across ranks every edge `(u, v)` is first shipped to the owner of
//! `v`, then the received edge list is scattered locally the same way.

use graph_comm::{Communicator, Frontier};
use log::debug;

use crate::graph::{CsrPart, Edge};
use crate::index::Idx;
use crate::partition::Part;

/// Transposes a CSR held completely in memory.
pub fn backward_complement_local<V: Idx, E: Idx>(n: usize, fw: &CsrPart<V, E>) -> CsrPart<V, E> {
    debug_assert_eq!(fw.node_count(), n);

    // count indegrees into the shifted slot bw[v + 1], prefix-sum them to
    // row starts, then use bw[v + 1] as the write cursor of row v; each
    // cursor ends up at its row end, which is the final offset value
    let mut offsets = vec![E::zero(); n + 1];
    for target in fw.all_targets() {
        let v = target.index();
        offsets[v + 1] = E::new(offsets[v + 1].index() + 1);
    }
    let mut sum = 0;
    for offset in offsets.iter_mut().skip(1) {
        let indegree = offset.index();
        *offset = E::new(sum);
        sum += indegree;
    }

    let mut targets = vec![V::zero(); fw.edge_count()];
    for u in 0..n {
        for target in fw.targets(u) {
            let cursor = offsets[target.index() + 1].index();
            targets[cursor] = V::new(u);
            offsets[target.index() + 1] = E::new(cursor + 1);
        }
    }

    CsrPart::new(offsets.into_boxed_slice(), targets.into_boxed_slice())
}

/// Builds the incoming CSR of a partition from its outgoing CSR.
///
/// Collective: every rank sends each local edge `(u, v)` as `(v, u)` to the
/// owner of `v` and converts what it receives into its local incoming
/// adjacency.
pub fn backward_complement<V, E, P, C>(comm: &C, part: &P, fw: &CsrPart<V, E>) -> CsrPart<V, E>
where
    V: Idx,
    E: Idx,
    P: Part,
    C: Communicator,
{
    let local_n = part.local_n();
    debug_assert_eq!(fw.node_count(), local_n);

    let mut frontier = Frontier::new(comm.world_size());
    for k in 0..local_n {
        let u = part.to_global(k);
        for target in fw.targets(k) {
            let v = target.index();
            let edge = Edge::new(*target, V::new(u));
            if part.has_local(v) {
                frontier.local_push(edge);
            } else {
                frontier.push(part.world_rank_of(v), edge);
            }
        }
    }

    frontier.comm(comm, |edge: &Edge<V>| part.world_rank_of(edge.u.index()));

    let mut edges = Vec::new();
    while let Some(Edge { u: v, v: u }) = frontier.next() {
        edges.push((part.to_local(v.index()), u));
    }
    debug!(
        "backward complement received {} edges for {} local vertices",
        edges.len(),
        local_n
    );

    CsrPart::from_local_edges(local_n, &edges)
}
