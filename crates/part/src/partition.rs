//! The partition model: how the global vertex range is split across ranks.
//!
//! A partition is a bijection between global vertex ids and (rank, local
//! index) pairs. Both provided implementations are *continuous* (every rank
//! owns one contiguous block `[begin, end)`) and *ordered* (ranks are
//! ordered by block start), which the residual gather relies on.

use std::ops::Range;

/// Ownership contract of one rank over the global vertex range `[0, n)`.
///
/// Invariants that implementations must uphold:
///
/// - `to_local(to_global(k)) == k` for every `k < local_n()`,
/// - `has_local(v)` iff `world_rank_of(v) == world_rank()`,
/// - the owned sets of all ranks are a disjoint cover of `[0, n)`.
pub trait Part: Clone + Send + Sync {
    /// Whether every rank owns a contiguous global range.
    const CONTINUOUS: bool = true;

    /// Whether ranks are ordered by their range start.
    const ORDERED: bool = true;

    fn n(&self) -> usize;

    fn world_rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// First global id owned by this rank.
    fn begin(&self) -> usize;

    /// One past the last global id owned by this rank.
    fn end(&self) -> usize;

    fn local_n(&self) -> usize {
        self.end() - self.begin()
    }

    fn to_local(&self, v: usize) -> usize {
        debug_assert!(self.has_local(v));
        v - self.begin()
    }

    fn to_global(&self, k: usize) -> usize {
        debug_assert!(k < self.local_n());
        k + self.begin()
    }

    fn has_local(&self, v: usize) -> bool {
        (self.begin()..self.end()).contains(&v)
    }

    /// The rank owning global vertex `v`.
    fn world_rank_of(&self, v: usize) -> usize;

    /// The global range owned by `rank`.
    fn range_of(&self, rank: usize) -> Range<usize>;
}

/// Equal-width contiguous blocks of `n / world_size` vertices; the last
/// rank absorbs the remainder.
#[derive(Clone, Copy, Debug)]
pub struct TrivialSlicePart {
    n: usize,
    base: usize,
    rank: usize,
    size: usize,
}

impl TrivialSlicePart {
    pub fn new(n: usize, world_rank: usize, world_size: usize) -> Self {
        assert!(world_size > 0);
        assert!(world_rank < world_size);
        Self {
            n,
            base: n / world_size,
            rank: world_rank,
            size: world_size,
        }
    }
}

impl Part for TrivialSlicePart {
    fn n(&self) -> usize {
        self.n
    }

    fn world_rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.size
    }

    fn begin(&self) -> usize {
        self.range_of(self.rank).start
    }

    fn end(&self) -> usize {
        self.range_of(self.rank).end
    }

    fn world_rank_of(&self, v: usize) -> usize {
        debug_assert!(v < self.n);
        if self.base == 0 {
            // fewer vertices than ranks: the last rank owns everything
            return self.size - 1;
        }
        usize::min(v / self.base, self.size - 1)
    }

    fn range_of(&self, rank: usize) -> Range<usize> {
        debug_assert!(rank < self.size);
        let begin = rank * self.base;
        let end = if rank + 1 == self.size {
            self.n
        } else {
            begin + self.base
        };
        begin..end
    }
}

/// Contiguous blocks whose widths differ by at most one vertex: the first
/// `n mod world_size` ranks own one extra vertex.
#[derive(Clone, Copy, Debug)]
pub struct BalancedSlicePart {
    n: usize,
    base: usize,
    rem: usize,
    rank: usize,
    size: usize,
}

impl BalancedSlicePart {
    pub fn new(n: usize, world_rank: usize, world_size: usize) -> Self {
        assert!(world_size > 0);
        assert!(world_rank < world_size);
        Self {
            n,
            base: n / world_size,
            rem: n % world_size,
            rank: world_rank,
            size: world_size,
        }
    }
}

impl Part for BalancedSlicePart {
    fn n(&self) -> usize {
        self.n
    }

    fn world_rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.size
    }

    fn begin(&self) -> usize {
        self.range_of(self.rank).start
    }

    fn end(&self) -> usize {
        self.range_of(self.rank).end
    }

    fn world_rank_of(&self, v: usize) -> usize {
        debug_assert!(v < self.n);
        let wide = (self.base + 1) * self.rem;
        if v < wide {
            v / (self.base + 1)
        } else {
            self.rem + (v - wide) / self.base
        }
    }

    fn range_of(&self, rank: usize) -> Range<usize> {
        debug_assert!(rank < self.size);
        let begin = rank * self.base + usize::min(rank, self.rem);
        let end = begin + self.base + usize::from(rank < self.rem);
        begin..end
    }
}
