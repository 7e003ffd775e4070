//! Canonicalization of the SCC id array.
//!
//! The phases record one representative vertex per component, but which
//! member wins depends on pivot choice and label rotation. This final pass
//! maps every representative to the minimum global vertex id of its
//! component, making the output independent of the execution history.

use fxhash::FxHashMap;
use graph_comm::frontier::partition_by_rank;
use graph_comm::Communicator;
use graph_part::{Edge, Idx, Part};

use crate::undecided;

/// Rewrites `scc_id` so that every component is named by its minimum
/// member and every leftover undecided vertex becomes its own singleton.
///
/// Collective. Each component's members all carry the same representative,
/// and the representative vertex carries itself, so the owner of the
/// representative can aggregate the member minima of all ranks and answer
/// them in a second exchange.
pub fn normalize_scc_id<V, P, C>(comm: &C, part: &P, scc_id: &mut [V])
where
    V: Idx,
    P: Part,
    C: Communicator,
{
    let local_n = part.local_n();
    for k in 0..local_n {
        if scc_id[k] == undecided() {
            scc_id[k] = V::new(part.to_global(k));
        }
    }

    // minimum local member per representative
    let mut local_min: FxHashMap<V, V> = FxHashMap::default();
    for k in 0..local_n {
        let member = V::new(part.to_global(k));
        let entry = local_min.entry(scc_id[k]).or_insert(member);
        if member < *entry {
            *entry = member;
        }
    }

    // ship each (representative, local minimum) pair to the owner of the
    // representative vertex
    let mut owned: FxHashMap<V, V> = FxHashMap::default();
    let mut send = Vec::new();
    let mut send_counts = vec![0usize; comm.world_size()];
    for (&rep, &min) in &local_min {
        let owner = part.world_rank_of(rep.index());
        if owner == comm.world_rank() {
            merge_min(&mut owned, rep, min);
        } else {
            send.push(Edge::new(rep, min));
            send_counts[owner] += 1;
        }
    }
    partition_by_rank(&mut send, &send_counts, |edge: &Edge<V>| {
        part.world_rank_of(edge.u.index())
    });
    let mut recv = Vec::new();
    let recv_counts = comm.alltoallv(&send, &send_counts, &mut recv);

    for &Edge { u: rep, v: min } in &recv {
        debug_assert!(part.has_local(rep.index()));
        merge_min(&mut owned, rep, min);
    }

    // answer every contributor with the component minimum; the received
    // segments are already grouped by source rank
    let mut reply = Vec::with_capacity(recv.len());
    let mut edges = recv.iter();
    for &count in &recv_counts {
        for _ in 0..count {
            let rep = edges.next().unwrap().u;
            reply.push(Edge::new(rep, owned[&rep]));
        }
    }
    let mut answers = Vec::new();
    comm.alltoallv(&reply, &recv_counts, &mut answers);
    let answers: FxHashMap<V, V> = answers.into_iter().map(|edge| (edge.u, edge.v)).collect();

    for k in 0..local_n {
        let rep = scc_id[k];
        scc_id[k] = if part.has_local(rep.index()) {
            owned[&rep]
        } else {
            answers[&rep]
        };
    }
}

fn merge_min<V: Idx>(acc: &mut FxHashMap<V, V>, rep: V, min: V) {
    let entry = acc.entry(rep).or_insert(min);
    if min < *entry {
        *entry = min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_comm::ProcessGroup;
    use graph_part::BalancedSlicePart;

    #[test]
    fn fills_undecided_with_own_id() {
        let outputs = ProcessGroup::run(2, |comm| {
            let part = BalancedSlicePart::new(4, comm.world_rank(), comm.world_size());
            let mut scc_id = vec![u32::MAX; part.local_n()];
            normalize_scc_id(&comm, &part, &mut scc_id);
            scc_id
        });
        let scc_id: Vec<u32> = outputs.into_iter().flatten().collect();
        assert_eq!(scc_id, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rewrites_representatives_to_component_minimum() {
        // one component {0, 2, 5} named by 5, one component {1, 4} named
        // by 4, singleton {3}; members are spread over three ranks
        let expected_reps = [5u32, 4, 5, 3, 4, 5];
        let outputs = ProcessGroup::run(3, |comm| {
            let part = BalancedSlicePart::new(6, comm.world_rank(), comm.world_size());
            let mut scc_id = (0..part.local_n())
                .map(|k| expected_reps[part.to_global(k)])
                .collect::<Vec<_>>();
            normalize_scc_id(&comm, &part, &mut scc_id);
            scc_id
        });
        let scc_id: Vec<u32> = outputs.into_iter().flatten().collect();
        assert_eq!(scc_id, vec![0, 1, 0, 3, 1, 0]);
    }
}
