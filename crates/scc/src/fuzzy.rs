//! Seeded random graphs with a known SCC decomposition.
//!
//! The generator first draws a partition of the vertices into components
//! (each new vertex either starts a component or joins an existing one),
//! wires every non-singleton component into a cycle over a random member
//! order, and then adds chords and cross edges until a target average
//! degree is reached. Cross edges only ever point from a component to one
//! with a smaller representative, so they cannot merge components and the
//! drawn partition stays the exact SCC decomposition.

use std::collections::BTreeMap;

use fxhash::FxHashSet;
use nanorand::{Rng, WyRand};

use graph_part::{CsrPart, DirectedGraphPart, Idx, Part};

/// A replicated graph together with its canonical SCC ids.
pub struct FuzzyGraph<V, E> {
    pub n: usize,
    pub fw: CsrPart<V, E>,
    pub bw: CsrPart<V, E>,
    /// For every vertex, the minimum member of its component.
    pub scc_id: Vec<V>,
}

impl<V: Idx, E: Idx> FuzzyGraph<V, E> {
    /// The underlying edge list, sorted by source then target.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.fw.edge_count());
        for u in 0..self.n {
            for &v in self.fw.targets(u) {
                edges.push((u, v.index()));
            }
        }
        edges
    }

    /// The local slice of this graph under `part`, with the expected local
    /// id array.
    pub fn partition<P: Part>(&self, part: P) -> (DirectedGraphPart<V, E, P>, Vec<V>) {
        let expected = (0..part.local_n())
            .map(|k| self.scc_id[part.to_global(k)])
            .collect();
        let graph = DirectedGraphPart::from_global(
            part,
            self.fw.offsets(),
            self.fw.all_targets(),
            self.bw.offsets(),
            self.bw.all_targets(),
        );
        (graph, expected)
    }
}

/// Generates a graph with `n` vertices and a known decomposition.
///
/// The same seed yields the same graph. `avg_degree` defaults to a random
/// value between `ln(max(1, ln n))` and `(n - 1) / 2`.
pub fn fuzzy_scc_graph<V: Idx, E: Idx>(
    seed: u64,
    n: usize,
    avg_degree: Option<f64>,
) -> FuzzyGraph<V, E> {
    let mut rng = WyRand::new_seed(seed);

    // draw the component structure
    let mut scc_id = vec![V::zero(); n];
    let mut comps: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut reps: Vec<usize> = Vec::new();
    for v in 0..n {
        if v == 0 || rng.generate_range(0..4u32) == 0 {
            reps.push(v);
            comps.insert(v, vec![v]);
            scc_id[v] = V::new(v);
        } else {
            let rep = reps[rng.generate_range(0..reps.len())];
            scc_id[v] = V::new(rep);
            comps.get_mut(&rep).unwrap().push(v);
        }
    }

    let target_degree = avg_degree.unwrap_or_else(|| {
        if n < 2 {
            return 0.0;
        }
        let min_d = (n as f64).ln().max(1.0).ln();
        let max_d = (n - 1) as f64 / 2.0;
        min_d + rng.generate::<f32>() as f64 * (max_d - min_d)
    });

    let mut edges: FxHashSet<(usize, usize)> = FxHashSet::default();

    // a cycle through every non-singleton component, in random member order
    for comp in comps.values_mut() {
        if comp.len() > 1 {
            shuffle(&mut rng, comp);
            edges.insert((comp[0], comp[comp.len() - 1]));
            for i in 1..comp.len() {
                edges.insert((comp[i], comp[i - 1]));
            }
        }
    }

    // chords and cross edges towards earlier components until the target
    // degree is met; a sweep that adds nothing means the graph is saturated
    while (edges.len() as f64) < target_degree * n as f64 {
        let before = edges.len();
        let mut prior: Vec<usize> = Vec::new();
        for (&rep, comp) in &comps {
            prior.push(rep);
            for _ in 0..comp.len() {
                if (edges.len() as f64) >= target_degree * n as f64 {
                    break;
                }
                let target_comp = &comps[&prior[rng.generate_range(0..prior.len())]];
                let u = comp[rng.generate_range(0..comp.len())];
                let v = target_comp[rng.generate_range(0..target_comp.len())];
                if u != v {
                    edges.insert((u, v));
                }
            }
        }
        if edges.len() == before {
            break;
        }
    }

    let mut edges = edges.into_iter().collect::<Vec<_>>();
    edges.sort_unstable();

    let fw_edges = edges
        .iter()
        .map(|&(u, v)| (u, V::new(v)))
        .collect::<Vec<_>>();
    let bw_edges = edges
        .iter()
        .map(|&(u, v)| (v, V::new(u)))
        .collect::<Vec<_>>();

    FuzzyGraph {
        n,
        fw: CsrPart::from_local_edges(n, &fw_edges),
        bw: CsrPart::from_local_edges(n, &bw_edges),
        scc_id,
    }
}

fn shuffle(rng: &mut WyRand, items: &mut [usize]) {
    for i in (1..items.len()).rev() {
        let j = rng.generate_range(0..=i);
        items.swap(i, j);
    }
}
