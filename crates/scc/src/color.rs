//! Multi-pivot color propagation.
//!
//! One round discovers one SCC per label component: phase A floods minimum
//! labels along forward edges to a global fixpoint, phase B declares every
//! vertex that kept its own label a pivot and floods the pivot backward
//! through its label component. The intersection logic of the single-pivot
//! decomposition happens implicitly, once per component, all components at
//! the same time.

use graph_comm::{Communicator, Frontier};
use graph_part::mem::{BitSet, Stack};
use graph_part::{DirectedGraphPart, Edge, Idx, Part};

use crate::undecided;

/// One propagation round over the undecided sub-graph.
///
/// `labels`, `stack`, `active`, `changed` and `frontier` are caller-owned
/// scratch sized to the local vertex count; their previous contents are
/// overwritten. A non-zero `rotation` bit-rotates the vertex ids used as
/// labels, reshuffling which vertices win the label race between outer
/// rounds; decisions are recorded under the unrotated vertex id.
///
/// Returns the number of locally decided vertices. Collective; every rank
/// must call with the same `rotation`.
#[allow(clippy::too_many_arguments)]
pub fn color_scc_step<V, E, P, C>(
    comm: &C,
    graph: &DirectedGraphPart<V, E, P>,
    scc_id: &mut [V],
    labels: &mut [V],
    stack: &mut Stack<usize>,
    active: &mut BitSet,
    changed: &mut BitSet,
    frontier: &mut Frontier<Edge<V>>,
    rotation: u32,
) -> u64
where
    V: Idx,
    E: Idx,
    P: Part,
    C: Communicator,
{
    let part = graph.part();
    let local_n = part.local_n();
    let map = |v: usize| V::new(v).rotate_right(rotation);
    let unmap = |label: V| label.rotate_left(rotation);
    let route = |edge: &Edge<V>| part.world_rank_of(edge.u.index());

    // phase A: forward minimum label propagation to a global fixpoint;
    // afterwards labels[k] is the smallest mapped id that reaches k
    stack.clear();
    active.set_each(|k| scc_id[k] == undecided::<V>());
    changed.copy_from(active);
    active.for_each(|k| {
        labels[k] = map(part.to_global(k));
        stack.push(k);
    });

    loop {
        while let Some(k) = stack.pop() {
            let label = labels[k];
            for &v in graph.out_neighbors(k) {
                if !part.has_local(v.index()) {
                    continue;
                }
                let l = part.to_local(v.index());
                if scc_id[l] == undecided() && label < labels[l] {
                    labels[l] = label;
                    changed.set(l);
                    if !active.get(l) {
                        active.set(l);
                        stack.push(l);
                    }
                }
            }
            active.unset(k);
        }

        changed.for_each(|k| {
            let label = labels[k];
            for &v in graph.out_neighbors(k) {
                // only labels that can still improve the target cross ranks
                if !part.has_local(v.index()) && label < map(v.index()) {
                    frontier.push(part.world_rank_of(v.index()), Edge::new(v, label));
                }
            }
        });
        changed.clear();

        if !frontier.comm(comm, route) {
            break;
        }
        while let Some(Edge { u, v: label }) = frontier.next() {
            let k = part.to_local(u.index());
            if scc_id[k] == undecided() && label < labels[k] {
                labels[k] = label;
                changed.set(k);
                if !active.get(k) {
                    active.set(k);
                    stack.push(k);
                }
            }
        }
    }

    // phase B: vertices that won their own label race are the pivots;
    // flood each pivot backward through its label component
    let mut decided = 0u64;
    stack.clear();
    changed.clear();
    active.set_each(|k| {
        if scc_id[k] == undecided::<V>() && labels[k] == map(part.to_global(k)) {
            scc_id[k] = unmap(labels[k]);
            decided += 1;
            changed.set(k);
            stack.push(k);
            true
        } else {
            false
        }
    });

    loop {
        while let Some(k) = stack.pop() {
            let pivot = labels[k];
            for &v in graph.in_neighbors(k) {
                if !part.has_local(v.index()) {
                    continue;
                }
                let l = part.to_local(v.index());
                if scc_id[l] == undecided() && labels[l] == pivot {
                    scc_id[l] = unmap(pivot);
                    decided += 1;
                    changed.set(l);
                    if !active.get(l) {
                        active.set(l);
                        stack.push(l);
                    }
                }
            }
            active.unset(k);
        }

        changed.for_each(|k| {
            let pivot = labels[k];
            for &v in graph.in_neighbors(k) {
                if !part.has_local(v.index()) {
                    frontier.push(part.world_rank_of(v.index()), Edge::new(v, pivot));
                }
            }
        });
        changed.clear();

        if !frontier.comm(comm, route) {
            break;
        }
        while let Some(Edge { u, v: pivot }) = frontier.next() {
            let k = part.to_local(u.index());
            if scc_id[k] == undecided() && labels[k] == pivot {
                scc_id[k] = unmap(pivot);
                decided += 1;
                changed.set(k);
                if !active.get(k) {
                    active.set(k);
                    stack.push(k);
                }
            }
        }
    }

    decided
}
