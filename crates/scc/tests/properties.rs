//! Randomized properties checked against the generator's known
//! decomposition.

use graph_scc::prelude::*;

const SIZES: [usize; 4] = [1, 2, 3, 4];
const VERTEX_COUNTS: [usize; 6] = [1, 6, 8, 16, 33, 64];

fn run_scc<P: Part + 'static>(
    g: &FuzzyGraph<u32, u64>,
    size: usize,
    config: SccConfig,
    transpose: bool,
    make_part: impl Fn(usize, usize) -> P + Sync,
) -> Vec<u32> {
    ProcessGroup::run(size, |comm| {
        let part = make_part(comm.world_rank(), comm.world_size());
        let (graph, _) = g.partition(part);
        let graph = if transpose { graph.inverse() } else { graph };
        let mut scc_id = vec![u32::MAX; graph.part().local_n()];
        scc(&comm, &graph, &mut scc_id, config);
        scc_id
    })
    .into_iter()
    .flatten()
    .collect()
}

#[test]
fn matches_oracle_on_balanced_slices() {
    let _ = env_logger::builder().is_test(true).try_init();
    for &n in &VERTEX_COUNTS {
        for seed in 0..3 {
            let g = fuzzy_scc_graph::<u32, u64>(seed, n, None);
            for &size in &SIZES {
                let result = run_scc(&g, size, SccConfig::default(), false, |rank, ranks| {
                    BalancedSlicePart::new(n, rank, ranks)
                });
                assert_eq!(result, g.scc_id, "n={} seed={} ranks={}", n, seed, size);
            }
        }
    }
}

#[test]
fn partition_choice_does_not_change_the_result() {
    for &n in &VERTEX_COUNTS {
        let g = fuzzy_scc_graph::<u32, u64>(99, n, None);
        for &size in &SIZES {
            let trivial = run_scc(&g, size, SccConfig::default(), false, |rank, ranks| {
                TrivialSlicePart::new(n, rank, ranks)
            });
            assert_eq!(trivial, g.scc_id, "n={} ranks={}", n, size);
        }
    }
}

#[test]
fn transposing_the_graph_keeps_the_components() {
    for &n in &[8, 16, 33] {
        let g = fuzzy_scc_graph::<u32, u64>(5, n, None);
        for &size in &SIZES {
            let result = run_scc(&g, size, SccConfig::default(), true, |rank, ranks| {
                BalancedSlicePart::new(n, rank, ranks)
            });
            assert_eq!(result, g.scc_id, "n={} ranks={}", n, size);
        }
    }
}

#[test]
fn duplicate_edges_do_not_change_the_result() {
    let n = 24;
    let g = fuzzy_scc_graph::<u32, u64>(17, n, None);
    let mut edges = g.edges();
    let duplicates = edges
        .iter()
        .step_by(3)
        .copied()
        .collect::<Vec<_>>();
    edges.extend(duplicates);

    for &size in &SIZES {
        let result: Vec<u32> = ProcessGroup::run(size, |comm| {
            let part = BalancedSlicePart::new(n, comm.world_rank(), comm.world_size());
            let graph: DirectedGraphPart<u32, u64, _> =
                DirectedGraphPart::from_edges(part, &edges);
            let mut scc_id = vec![u32::MAX; graph.part().local_n()];
            scc(&comm, &graph, &mut scc_id, SccConfig::default());
            scc_id
        })
        .into_iter()
        .flatten()
        .collect();
        assert_eq!(result, g.scc_id, "ranks={}", size);
    }
}

#[test]
fn label_rotation_keeps_the_result() {
    for &n in &[16, 33, 64] {
        let g = fuzzy_scc_graph::<u32, u64>(23, n, None);
        for &size in &SIZES {
            let result = run_scc(
                &g,
                size,
                SccConfig::new(true, false),
                false,
                |rank, ranks| BalancedSlicePart::new(n, rank, ranks),
            );
            assert_eq!(result, g.scc_id, "n={} ranks={}", n, size);
        }
    }
}

#[test]
fn trim_tarjan_pass_keeps_the_result() {
    for &n in &[16, 33, 64] {
        let g = fuzzy_scc_graph::<u32, u64>(29, n, None);
        for &size in &SIZES {
            let result = run_scc(
                &g,
                size,
                SccConfig::new(false, true),
                false,
                |rank, ranks| BalancedSlicePart::new(n, rank, ranks),
            );
            assert_eq!(result, g.scc_id, "n={} ranks={}", n, size);
        }
    }
}

#[test]
fn output_is_an_scc_labelling() {
    // equivalence classes (P1) with canonical minimum representatives
    // (P4), strong connectivity inside a class (P2) and maximality across
    // classes (P3), verified structurally on the output itself
    let n = 64;
    let g = fuzzy_scc_graph::<u32, u64>(41, n, None);
    let scc_id = run_scc(&g, 3, SccConfig::default(), false, |rank, ranks| {
        BalancedSlicePart::new(n, rank, ranks)
    });

    for (v, &id) in scc_id.iter().enumerate() {
        // the representative is a class member and names itself
        assert!(id as usize <= v);
        assert_eq!(scc_id[id as usize], id);
    }

    // reachability over the global graph via a tiny fixpoint
    let reachable = |from: usize| -> Vec<bool> {
        let mut seen = vec![false; n];
        let mut queue = vec![from];
        seen[from] = true;
        while let Some(u) = queue.pop() {
            for &v in g.fw.targets(u) {
                if !seen[v as usize] {
                    seen[v as usize] = true;
                    queue.push(v as usize);
                }
            }
        }
        seen
    };

    for u in 0..n {
        let from_u = reachable(u);
        for v in 0..n {
            if scc_id[u] == scc_id[v] {
                assert!(from_u[v], "{} and {} share an id but {} -/-> {}", u, v, u, v);
            } else if from_u[v] {
                // maximality: the reverse path must be missing
                assert!(!reachable(v)[u], "{} and {} are mutually reachable", u, v);
            }
        }
    }
}
