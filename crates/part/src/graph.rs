//! The rank-local slice of a distributed bi-directional CSR graph.

use crate::index::Idx;
use crate::partition::Part;

/// A directed edge, also the payload shape of labeled frontier exchanges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge<V> {
    pub u: V,
    pub v: V,
}

impl<V> Edge<V> {
    pub fn new(u: V, v: V) -> Self {
        Self { u, v }
    }
}

/// One direction of the local adjacency in Compressed-Sparse-Row form.
///
/// For a partition owning `local_n` vertices, `offsets` has `local_n + 1`
/// entries with `offsets[0] == 0`, and the neighbor list of local vertex
/// `k` is `targets[offsets[k]..offsets[k + 1]]`. Targets are global ids;
/// they may point at vertices owned by other ranks.
#[derive(Debug)]
pub struct CsrPart<V, E> {
    offsets: Box<[E]>,
    targets: Box<[V]>,
}

impl<V: Idx, E: Idx> CsrPart<V, E> {
    pub fn new(offsets: Box<[E]>, targets: Box<[V]>) -> Self {
        debug_assert!(!offsets.is_empty());
        debug_assert_eq!(offsets[0].index(), 0);
        debug_assert_eq!(offsets[offsets.len() - 1].index(), targets.len());
        Self { offsets, targets }
    }

    /// An empty adjacency for `local_n` vertices.
    pub fn empty(local_n: usize) -> Self {
        Self {
            offsets: vec![E::zero(); local_n + 1].into_boxed_slice(),
            targets: Box::new([]),
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn degree(&self, k: usize) -> usize {
        self.offsets[k + 1].index() - self.offsets[k].index()
    }

    #[inline]
    pub fn targets(&self, k: usize) -> &[V] {
        &self.targets[self.offsets[k].index()..self.offsets[k + 1].index()]
    }

    pub fn offsets(&self) -> &[E] {
        &self.offsets
    }

    pub fn all_targets(&self) -> &[V] {
        &self.targets
    }

    /// Builds the adjacency of `local_n` vertices from `(source local
    /// index, target global id)` pairs by degree counting, prefix summing
    /// and scattering with per-row write cursors.
    pub fn from_local_edges(local_n: usize, edges: &[(usize, V)]) -> Self {
        let mut offsets = vec![E::zero(); local_n + 1];
        for &(k, _) in edges {
            debug_assert!(k < local_n);
            offsets[k + 1] = E::new(offsets[k + 1].index() + 1);
        }
        let mut sum = 0;
        for offset in offsets.iter_mut().skip(1) {
            let degree = offset.index();
            *offset = E::new(sum);
            sum += degree;
        }
        // offsets[k + 1] is the write cursor of row k and ends up at the
        // row end, which is exactly the final offset value
        let mut targets = vec![V::zero(); edges.len()];
        for &(k, v) in edges {
            let cursor = offsets[k + 1].index();
            targets[cursor] = v;
            offsets[k + 1] = E::new(cursor + 1);
        }
        Self::new(offsets.into_boxed_slice(), targets.into_boxed_slice())
    }

    /// Cuts the rows `[begin, end)` out of a replicated global CSR,
    /// rebasing the offsets to the slice.
    pub fn from_global_rows(offsets: &[E], targets: &[V], begin: usize, end: usize) -> Self {
        let base = offsets[begin].index();
        let local_offsets = offsets[begin..=end]
            .iter()
            .map(|offset| E::new(offset.index() - base))
            .collect::<Vec<_>>();
        let local_targets = targets[base..offsets[end].index()].to_vec();
        Self::new(
            local_offsets.into_boxed_slice(),
            local_targets.into_boxed_slice(),
        )
    }
}

/// The local partition of a directed graph with both edge directions.
///
/// `csr_out` holds the outgoing and `csr_inc` the incoming neighbors of
/// the locally owned vertices, indexed by local vertex index. Across all
/// ranks, the multiset of global edges in the outgoing direction equals
/// the multiset of incoming edges with endpoints swapped.
#[derive(Debug)]
pub struct DirectedGraphPart<V, E, P> {
    part: P,
    csr_out: CsrPart<V, E>,
    csr_inc: CsrPart<V, E>,
}

impl<V: Idx, E: Idx, P: Part> DirectedGraphPart<V, E, P> {
    pub fn new(part: P, csr_out: CsrPart<V, E>, csr_inc: CsrPart<V, E>) -> Self {
        assert_eq!(csr_out.node_count(), part.local_n());
        assert_eq!(csr_inc.node_count(), part.local_n());
        let g = Self {
            part,
            csr_out,
            csr_inc,
        };
        g.debug_validate();
        g
    }

    /// Builds the local partition from a global edge list; edges whose
    /// source (outgoing) or target (incoming) is not owned here are
    /// dropped. Intended for tests and small inputs.
    pub fn from_edges(part: P, edges: &[(usize, usize)]) -> Self {
        let out_edges = edges
            .iter()
            .filter(|(u, _)| part.has_local(*u))
            .map(|&(u, v)| (part.to_local(u), V::new(v)))
            .collect::<Vec<_>>();
        let inc_edges = edges
            .iter()
            .filter(|(_, v)| part.has_local(*v))
            .map(|&(u, v)| (part.to_local(v), V::new(u)))
            .collect::<Vec<_>>();
        let csr_out = CsrPart::from_local_edges(part.local_n(), &out_edges);
        let csr_inc = CsrPart::from_local_edges(part.local_n(), &inc_edges);
        Self::new(part, csr_out, csr_inc)
    }

    /// Cuts the local slice out of replicated global forward and backward
    /// CSR arrays.
    pub fn from_global(
        part: P,
        fw_offsets: &[E],
        fw_targets: &[V],
        bw_offsets: &[E],
        bw_targets: &[V],
    ) -> Self {
        let (begin, end) = (part.begin(), part.end());
        let csr_out = CsrPart::from_global_rows(fw_offsets, fw_targets, begin, end);
        let csr_inc = CsrPart::from_global_rows(bw_offsets, bw_targets, begin, end);
        Self::new(part, csr_out, csr_inc)
    }

    #[inline]
    pub fn part(&self) -> &P {
        &self.part
    }

    #[inline]
    pub fn out_neighbors(&self, k: usize) -> &[V] {
        self.csr_out.targets(k)
    }

    #[inline]
    pub fn in_neighbors(&self, k: usize) -> &[V] {
        self.csr_inc.targets(k)
    }

    #[inline]
    pub fn out_degree(&self, k: usize) -> usize {
        self.csr_out.degree(k)
    }

    #[inline]
    pub fn in_degree(&self, k: usize) -> usize {
        self.csr_inc.degree(k)
    }

    pub fn csr_out(&self) -> &CsrPart<V, E> {
        &self.csr_out
    }

    pub fn csr_inc(&self) -> &CsrPart<V, E> {
        &self.csr_inc
    }

    /// The same partition with both edge directions swapped.
    pub fn inverse(self) -> Self {
        Self {
            part: self.part,
            csr_out: self.csr_inc,
            csr_inc: self.csr_out,
        }
    }

    fn debug_validate(&self) {
        if cfg!(debug_assertions) {
            let n = self.part.n();
            for csr in [&self.csr_out, &self.csr_inc] {
                let offsets = csr.offsets();
                for pair in offsets.windows(2) {
                    debug_assert!(pair[0] <= pair[1], "offsets must be non-decreasing");
                }
                for target in csr.all_targets() {
                    debug_assert!(target.index() < n, "target out of vertex range");
                }
            }
        }
    }
}
