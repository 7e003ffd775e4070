//! The phase pipeline.

use std::time::Instant;

use graph_comm::{Communicator, Frontier};
use graph_part::mem::{BitSet, Stack};
use graph_part::{DirectedGraphPart, Idx, Part};
use log::info;

use crate::color::color_scc_step;
use crate::normalize::normalize_scc_id;
use crate::pivot::{backward_search, forward_search, select_pivot};
use crate::residual::residual_tarjan;
use crate::tarjan::tarjan;
use crate::trim::{trim_1_first, trim_1_normal, trim_tarjan};
use crate::undecided;

/// Tuning knobs of the pipeline. The defaults reproduce the plain
/// four-phase run.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SccConfig {
    /// Rotate vertex ids when they are used as propagation labels so a
    /// different vertex wins the label race in every round.
    pub rotate_labels: bool,

    /// Run the local Tarjan based trim after every color round.
    pub trim_tarjan: bool,
}

impl SccConfig {
    pub fn new(rotate_labels: bool, trim_tarjan: bool) -> Self {
        Self {
            rotate_labels,
            trim_tarjan,
        }
    }
}

/// Computes the strongly connected components of the distributed graph.
///
/// Collective over the whole process group; every rank passes its own
/// partition slice and its `local_n`-sized `scc_id` array. On return every
/// entry holds the minimum global vertex id of the component containing
/// that vertex.
///
/// Phases run cheapest first with a global decision count deciding when
/// the residue is small enough (`n - 2n/P`) to be replicated: exhaustive
/// trim, one forward-backward pivot decomposition, color propagation
/// rounds, then serial Tarjan over the gathered residue and the
/// normalization pass.
pub fn scc<V, E, P, C>(
    comm: &C,
    graph: &DirectedGraphPart<V, E, P>,
    scc_id: &mut [V],
    config: SccConfig,
) where
    V: Idx,
    E: Idx,
    P: Part,
    C: Communicator,
{
    let part = graph.part();
    let n = part.n();
    let local_n = part.local_n();
    assert_eq!(scc_id.len(), local_n);
    assert_eq!(part.world_rank(), comm.world_rank());
    assert_eq!(part.world_size(), comm.world_size());

    let start = Instant::now();
    let mut vertex_frontier = Frontier::new(comm.world_size());
    let (mut local_decided, cand) = trim_1_first(comm, graph, scc_id, &mut vertex_frontier);
    let mut global_decided = comm.allreduce_sum(local_decided);
    info!(
        "trim_1_first decided {} of {} in {:?}",
        global_decided,
        n,
        start.elapsed()
    );

    if comm.world_size() == 1 {
        let start = Instant::now();
        serial_tarjan(graph, scc_id);
        info!("serial tarjan finished in {:?}", start.elapsed());
        return;
    }

    // the residue must fit next to the local slice on every rank
    let threshold = (n - 2 * n / comm.world_size()) as u64;

    if global_decided < threshold {
        let start = Instant::now();
        let pivot = select_pivot(comm, cand);
        let mut reached = BitSet::new(local_n);
        forward_search(comm, graph, &mut vertex_frontier, scc_id, &mut reached, pivot);
        local_decided += backward_search(comm, graph, &mut vertex_frontier, scc_id, &reached, pivot);
        local_decided += trim_1_normal(graph, scc_id);
        local_decided += trim_1_normal(graph, scc_id);
        global_decided = comm.allreduce_sum(local_decided);
        info!(
            "pivot {} settled, {} of {} decided in {:?}",
            pivot,
            global_decided,
            n,
            start.elapsed()
        );
    }

    if global_decided < threshold {
        let mut labels = vec![undecided::<V>(); local_n];
        let mut stack = Stack::with_capacity(local_n);
        let mut active = BitSet::new(local_n);
        let mut changed = BitSet::new(local_n);
        let mut edge_frontier = Frontier::new(comm.world_size());
        let mut round = 0u32;

        while global_decided < threshold {
            round += 1;
            let rotation = if config.rotate_labels { round } else { 0 };
            let start = Instant::now();
            local_decided += color_scc_step(
                comm,
                graph,
                scc_id,
                &mut labels,
                &mut stack,
                &mut active,
                &mut changed,
                &mut edge_frontier,
                rotation,
            );
            local_decided += trim_1_normal(graph, scc_id);
            if config.trim_tarjan {
                local_decided += trim_tarjan(graph, scc_id);
            }
            let previous = global_decided;
            global_decided = comm.allreduce_sum(local_decided);
            info!(
                "color round {}: {} of {} decided in {:?}",
                round,
                global_decided,
                n,
                start.elapsed()
            );
            assert!(
                global_decided > previous,
                "color propagation made no progress"
            );
        }
    }

    let start = Instant::now();
    let residual_decided = residual_tarjan(comm, graph, scc_id);
    let residual_global = comm.allreduce_sum(residual_decided);
    normalize_scc_id(comm, part, scc_id);
    info!(
        "residue of {} settled and normalized in {:?}",
        residual_global,
        start.elapsed()
    );
}

/// Single-rank fallback: plain Tarjan over the undecided local graph.
fn serial_tarjan<V, E, P>(graph: &DirectedGraphPart<V, E, P>, scc_id: &mut [V])
where
    V: Idx,
    E: Idx,
    P: Part,
{
    let part = graph.part();
    let local_n = part.local_n();
    let mut pending = BitSet::new(local_n);
    pending.set_each(|k| scc_id[k] == undecided::<V>());

    tarjan(
        local_n,
        |k| pending.get(k),
        |k| graph.out_neighbors(k).iter().map(|v| v.index()),
        |component| {
            let root = component.iter().copied().min().unwrap();
            let id = V::new(part.to_global(root));
            for &k in component {
                scc_id[k] = id;
            }
        },
    );
}
