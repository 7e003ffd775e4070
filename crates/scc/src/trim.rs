//! Degree-one trimming: vertices without in- or out-edges in the
//! undecided sub-graph are singleton SCCs.

use graph_comm::{Communicator, Frontier};
use graph_part::mem::BitSet;
use graph_part::{DirectedGraphPart, Idx, Part};

use crate::pivot::DegreeCand;
use crate::tarjan::tarjan;
use crate::undecided;

fn push_neighbors<V: Idx, P: Part>(part: &P, frontier: &mut Frontier<V>, targets: &[V]) {
    for &v in targets {
        if part.has_local(v.index()) {
            frontier.local_push(v);
        } else {
            frontier.push(part.world_rank_of(v.index()), v);
        }
    }
}

/// Exhaustive first trim on the full graph.
///
/// Initializes `scc_id` to the undecided sentinel, then alternates a
/// forward and a backward elimination pass: a vertex whose residual
/// in-degree (respectively out-degree) drops to zero is decided as a
/// singleton and its removal is propagated to its neighbors, across rank
/// borders through the vertex frontier.
///
/// Returns the number of locally decided vertices and the best local pivot
/// candidate, the undecided vertex maximizing residual in-degree times
/// out-degree.
pub fn trim_1_first<V, E, P, C>(
    comm: &C,
    graph: &DirectedGraphPart<V, E, P>,
    scc_id: &mut [V],
    frontier: &mut Frontier<V>,
) -> (u64, DegreeCand)
where
    V: Idx,
    E: Idx,
    P: Part,
    C: Communicator,
{
    let part = graph.part();
    let local_n = part.local_n();
    let mut indegree = vec![0usize; local_n];
    let mut outdegree = vec![0usize; local_n];
    let mut decided = 0u64;

    // forward: a vertex nothing points at cannot close a cycle
    for k in 0..local_n {
        indegree[k] = graph.in_degree(k);
        if indegree[k] == 0 {
            scc_id[k] = V::new(part.to_global(k));
            decided += 1;
            push_neighbors(part, frontier, graph.out_neighbors(k));
        } else {
            scc_id[k] = undecided();
        }
    }
    loop {
        while let Some(v) = frontier.next() {
            let k = part.to_local(v.index());
            if scc_id[k] != undecided() {
                continue;
            }
            indegree[k] -= 1;
            if indegree[k] == 0 {
                scc_id[k] = V::new(part.to_global(k));
                decided += 1;
                push_neighbors(part, frontier, graph.out_neighbors(k));
            }
        }
        if !frontier.comm(comm, |v| part.world_rank_of(v.index())) {
            break;
        }
    }

    // backward: a vertex pointing at nothing cannot close a cycle either
    for k in 0..local_n {
        if scc_id[k] != undecided() {
            continue;
        }
        outdegree[k] = graph.out_degree(k);
        if outdegree[k] == 0 {
            scc_id[k] = V::new(part.to_global(k));
            decided += 1;
            push_neighbors(part, frontier, graph.in_neighbors(k));
        }
    }
    loop {
        while let Some(v) = frontier.next() {
            let k = part.to_local(v.index());
            if scc_id[k] != undecided() {
                continue;
            }
            outdegree[k] -= 1;
            if outdegree[k] == 0 {
                scc_id[k] = V::new(part.to_global(k));
                decided += 1;
                push_neighbors(part, frontier, graph.in_neighbors(k));
            }
        }
        if !frontier.comm(comm, |v| part.world_rank_of(v.index())) {
            break;
        }
    }

    let mut cand = DegreeCand::NONE;
    for k in 0..local_n {
        if scc_id[k] == undecided() {
            cand = cand.max(DegreeCand {
                product: indegree[k] as u64 * outdegree[k] as u64,
                u: part.to_global(k) as u64,
            });
        }
    }

    (decided, cand)
}

fn has_undecided_neighbor<V: Idx, P: Part>(part: &P, scc_id: &[V], targets: &[V]) -> bool {
    targets.iter().any(|&v| {
        // ghosts count: their state is unknown here
        !part.has_local(v.index()) || scc_id[part.to_local(v.index())] == undecided::<V>()
    })
}

/// Cheap single-pass trim between phases.
///
/// Recomputes the effective degrees of every undecided vertex over the
/// still-undecided neighbors only and decides vertices with an empty side.
/// Purely local, no communication.
pub fn trim_1_normal<V, E, P>(graph: &DirectedGraphPart<V, E, P>, scc_id: &mut [V]) -> u64
where
    V: Idx,
    E: Idx,
    P: Part,
{
    let part = graph.part();
    let mut decided = 0u64;
    for k in 0..part.local_n() {
        if scc_id[k] != undecided() {
            continue;
        }
        let has_in = has_undecided_neighbor(part, scc_id, graph.in_neighbors(k));
        let has_out = has_undecided_neighbor(part, scc_id, graph.out_neighbors(k));
        if !has_in || !has_out {
            scc_id[k] = V::new(part.to_global(k));
            decided += 1;
        }
    }
    decided
}

/// Local Tarjan based trim, optionally run after each color round.
///
/// Runs Tarjan over the undecided local sub-graph (local edges only). A
/// discovered local component with no external in-edges or no external
/// out-edges into the undecided remainder (ghost neighbors count as
/// external) is a complete SCC of the global graph and is decided with its
/// minimum member id. More powerful than the degree-one trims but touches
/// every local edge.
pub fn trim_tarjan<V, E, P>(graph: &DirectedGraphPart<V, E, P>, scc_id: &mut [V]) -> u64
where
    V: Idx,
    E: Idx,
    P: Part,
{
    let part = graph.part();
    let local_n = part.local_n();

    let mut pending = BitSet::new(local_n);
    pending.set_each(|k| scc_id[k] == undecided::<V>());

    let mut components: Vec<Vec<usize>> = Vec::new();
    tarjan(
        local_n,
        |k| pending.get(k),
        |k| {
            graph
                .out_neighbors(k)
                .iter()
                .filter(|v| part.has_local(v.index()))
                .map(|v| part.to_local(v.index()))
        },
        |component| components.push(component.to_vec()),
    );

    // components arrive sinks first, so deciding one may close the next
    let mut decided = 0u64;
    for component in &components {
        let external = |targets: &[V]| {
            targets.iter().any(|&v| {
                let v = v.index();
                if part.has_local(v) {
                    let l = part.to_local(v);
                    pending.get(l) && !component.contains(&l)
                } else {
                    true
                }
            })
        };
        let has_in = component.iter().any(|&k| external(graph.in_neighbors(k)));
        let has_out = component.iter().any(|&k| external(graph.out_neighbors(k)));
        if has_in && has_out {
            continue;
        }
        // no way in or no way out: the local component is maximal
        let root = component.iter().copied().min().unwrap();
        let id = V::new(part.to_global(root));
        for &k in component {
            scc_id[k] = id;
            pending.unset(k);
        }
        decided += component.len() as u64;
    }
    decided
}
