//! Gathering the residual sub-graph and finishing it serially.
//!
//! Once the undecided residue is small enough to fit on every rank, the
//! induced forward sub-graph is replicated everywhere and each rank runs
//! serial Tarjan over it, writing the decisions for its own vertices.

use graph_comm::Communicator;
use graph_part::mem::{BitSet, HashIdMap};
use graph_part::{DirectedGraphPart, Idx, Part};
use log::debug;

use crate::tarjan::tarjan;
use crate::undecided;

/// Replicates the undecided sub-graph on all ranks and decides it with
/// serial Tarjan. Returns the local decision count.
///
/// Collective. The partition must be ordered so that the concatenation of
/// the per-rank id lists enumerates the residue in ascending global order.
pub fn residual_tarjan<V, E, P, C>(
    comm: &C,
    graph: &DirectedGraphPart<V, E, P>,
    scc_id: &mut [V],
) -> u64
where
    V: Idx,
    E: Idx,
    P: Part,
    C: Communicator,
{
    let part = graph.part();
    let local_n = part.local_n();

    // dense sub-ids: position in the gathered, globally ascending id list
    let local_ids = (0..local_n)
        .filter(|&k| scc_id[k] == undecided::<V>())
        .map(|k| V::new(part.to_global(k)))
        .collect::<Vec<_>>();
    let sub_ids = comm.allgatherv(&local_ids);
    let sub_n = sub_ids.len();

    let mut dense = HashIdMap::new(sub_n);
    let mut member = BitSet::new(part.n());
    for &id in &sub_ids {
        dense.insert(id);
        member.set(id.index());
    }

    // local rows of the induced forward sub-graph, in dense id order
    let mut row_lens = Vec::with_capacity(local_ids.len());
    let mut row_targets = Vec::new();
    for k in 0..local_n {
        if scc_id[k] != undecided::<V>() {
            continue;
        }
        let mut len = 0u64;
        for &v in graph.out_neighbors(k) {
            if member.get(v.index()) {
                row_targets.push(dense.get(v));
                len += 1;
            }
        }
        row_lens.push(len);
    }

    let sub_lens = comm.allgatherv(&row_lens);
    let sub_targets = comm.allgatherv(&row_targets);
    debug_assert_eq!(sub_lens.len(), sub_n);

    let mut sub_offsets = Vec::with_capacity(sub_n + 1);
    let mut offset = 0usize;
    sub_offsets.push(0);
    for &len in &sub_lens {
        offset += len as usize;
        sub_offsets.push(offset);
    }
    debug_assert_eq!(offset, sub_targets.len());

    debug!(
        "residual sub-graph: {} vertices, {} edges",
        sub_n,
        sub_targets.len()
    );

    let mut decided = 0u64;
    tarjan(
        sub_n,
        |_| true,
        |d| sub_targets[sub_offsets[d]..sub_offsets[d + 1]]
            .iter()
            .map(|t| t.index()),
        |component| {
            let id = component.iter().map(|&d| sub_ids[d]).min().unwrap();
            for &d in component {
                let v = sub_ids[d].index();
                if part.has_local(v) {
                    scc_id[part.to_local(v)] = id;
                    decided += 1;
                }
            }
        },
    );
    decided
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_comm::ProcessGroup;
    use graph_part::BalancedSlicePart;

    #[test]
    fn gathers_and_decides_the_residue() {
        // cycle 1 -> 3 -> 5 -> 1 left undecided between decided singletons
        let n = 6;
        let edges = [(0, 1), (1, 3), (3, 5), (5, 1), (2, 3), (5, 4)];
        for size in [1, 2, 3] {
            let outputs = ProcessGroup::run(size, |comm| {
                let part = BalancedSlicePart::new(n, comm.world_rank(), comm.world_size());
                let graph: DirectedGraphPart<u32, u64, _> =
                    DirectedGraphPart::from_edges(part, &edges);
                let local_n = graph.part().local_n();
                let mut scc_id = vec![u32::MAX; local_n];
                for k in 0..local_n {
                    let v = graph.part().to_global(k);
                    if v % 2 == 0 {
                        scc_id[k] = v as u32;
                    }
                }
                let decided = residual_tarjan(&comm, &graph, &mut scc_id);
                (decided, scc_id)
            });

            let decided: u64 = outputs.iter().map(|(d, _)| d).sum();
            assert_eq!(decided, 3, "size {}", size);
            let scc_id: Vec<u32> = outputs.into_iter().flat_map(|(_, ids)| ids).collect();
            assert_eq!(scc_id, vec![0, 1, 2, 1, 4, 1]);
        }
    }

    #[test]
    fn empty_residue_is_a_no_op() {
        let outputs = ProcessGroup::run(2, |comm| {
            let part = BalancedSlicePart::new(4, comm.world_rank(), comm.world_size());
            let graph: DirectedGraphPart<u32, u64, _> =
                DirectedGraphPart::from_edges(part, &[(0, 1)]);
            let mut scc_id = (0..graph.part().local_n())
                .map(|k| graph.part().to_global(k) as u32)
                .collect::<Vec<_>>();
            let decided = residual_tarjan(&comm, &graph, &mut scc_id);
            (decided, scc_id)
        });
        for (rank, (decided, _)) in outputs.iter().enumerate() {
            assert_eq!(*decided, 0, "rank {}", rank);
        }
    }
}
