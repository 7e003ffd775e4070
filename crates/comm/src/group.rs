//! The process group abstraction and its thread-backed implementation.

use std::any::Any;
use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use crate::Payload;

/// A fixed-size process group seen from one rank.
///
/// All operations except [`world_rank`](Communicator::world_rank) and
/// [`world_size`](Communicator::world_size) are collective: every rank of
/// the group must call them in the same order with compatible arguments.
///
/// Reductions take the operator as a closure. The closure must be
/// associative and must be the same on every rank; the fold order is fixed
/// (rank 0 to rank `P - 1`), so every rank observes the identical result
/// even for non-commutative operators.
pub trait Communicator {
    /// The rank of the calling process in `[0, world_size)`.
    fn world_rank(&self) -> usize;

    /// The number of ranks in the group.
    fn world_size(&self) -> usize;

    /// Blocks until every rank of the group has entered the barrier.
    fn barrier(&self);

    /// Reduces one value per rank with `op` and returns the result on every
    /// rank.
    fn allreduce<T, F>(&self, value: T, op: F) -> T
    where
        T: Payload,
        F: Fn(T, T) -> T;

    /// Gathers one value per rank, indexed by rank.
    fn allgather<T: Payload>(&self, value: T) -> Vec<T>;

    /// Gathers a variable-length contribution per rank, concatenated in rank
    /// order.
    fn allgatherv<T: Payload>(&self, local: &[T]) -> Vec<T>;

    /// Exchanges one value per (source, destination) pair. `send[r]` is
    /// delivered to rank `r`; the result holds one value per source rank.
    fn alltoall<T: Payload>(&self, send: &[T]) -> Vec<T>;

    /// Exchanges variable-length per-rank buckets.
    ///
    /// `send` must be grouped into `world_size` contiguous buckets in rank
    /// order with `send_counts[r]` elements destined for rank `r`. Received
    /// elements are appended to `recv` in source rank order, preserving each
    /// source's insertion order; the returned vector holds the count
    /// received from every source rank.
    fn alltoallv<T: Payload>(&self, send: &[T], send_counts: &[usize], recv: &mut Vec<T>)
        -> Vec<usize>;

    /// Sum reduction of per-rank counters.
    fn allreduce_sum(&self, value: u64) -> u64 {
        self.allreduce(value, |a, b| a + b)
    }
}

struct Shared {
    barrier: Barrier,
    slots: Vec<Mutex<Option<Box<dyn Any + Send>>>>,
}

/// A [`Communicator`] whose ranks are threads of the calling process.
///
/// Each collective posts the local contribution into a per-rank slot,
/// synchronizes on a shared barrier, reads the peers' slots, and
/// synchronizes again before returning so that the next collective may
/// reuse the slots. The two barriers make every collective a full
/// synchronization point across the group.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    fn post<T: Send + 'static>(&self, value: T) {
        *self.shared.slots[self.rank].lock() = Some(Box::new(value));
    }

    fn with_slot<T: 'static, R>(&self, rank: usize, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.shared.slots[rank].lock();
        let slot = guard
            .as_deref()
            .expect("collective slot read before any rank posted");
        let value = slot
            .downcast_ref::<T>()
            .expect("ranks disagree on the collective payload type");
        f(value)
    }
}

impl Communicator for ThreadComm {
    fn world_rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }

    fn allreduce<T, F>(&self, value: T, op: F) -> T
    where
        T: Payload,
        F: Fn(T, T) -> T,
    {
        self.post(value);
        self.shared.barrier.wait();
        let mut acc = self.with_slot::<T, _>(0, |v| *v);
        for rank in 1..self.size {
            let value = self.with_slot::<T, _>(rank, |v| *v);
            acc = op(acc, value);
        }
        self.shared.barrier.wait();
        acc
    }

    fn allgather<T: Payload>(&self, value: T) -> Vec<T> {
        self.post(value);
        self.shared.barrier.wait();
        let gathered = (0..self.size)
            .map(|rank| self.with_slot::<T, _>(rank, |v| *v))
            .collect();
        self.shared.barrier.wait();
        gathered
    }

    fn allgatherv<T: Payload>(&self, local: &[T]) -> Vec<T> {
        self.post::<Vec<T>>(local.to_vec());
        self.shared.barrier.wait();
        let mut gathered = Vec::new();
        for rank in 0..self.size {
            self.with_slot::<Vec<T>, _>(rank, |v| gathered.extend_from_slice(v));
        }
        self.shared.barrier.wait();
        gathered
    }

    fn alltoall<T: Payload>(&self, send: &[T]) -> Vec<T> {
        assert_eq!(send.len(), self.size, "alltoall needs one value per rank");
        self.post::<Vec<T>>(send.to_vec());
        self.shared.barrier.wait();
        let received = (0..self.size)
            .map(|rank| self.with_slot::<Vec<T>, _>(rank, |v| v[self.rank]))
            .collect();
        self.shared.barrier.wait();
        received
    }

    fn alltoallv<T: Payload>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv: &mut Vec<T>,
    ) -> Vec<usize> {
        assert_eq!(send_counts.len(), self.size);
        debug_assert_eq!(send_counts.iter().sum::<usize>(), send.len());

        self.post::<(Vec<T>, Vec<usize>)>((send.to_vec(), send_counts.to_vec()));
        self.shared.barrier.wait();
        let mut recv_counts = Vec::with_capacity(self.size);
        for rank in 0..self.size {
            self.with_slot::<(Vec<T>, Vec<usize>), _>(rank, |(data, counts)| {
                let offset = counts[..self.rank].iter().sum::<usize>();
                let count = counts[self.rank];
                recv.extend_from_slice(&data[offset..offset + count]);
                recv_counts.push(count);
            });
        }
        self.shared.barrier.wait();
        recv_counts
    }
}

/// Factory for thread-backed process groups.
pub struct ProcessGroup;

impl ProcessGroup {
    /// Creates the communicators of a group with `world_size` ranks.
    ///
    /// The returned handles are indexed by rank and must each be moved to
    /// their own thread; a rank that drops its handle without participating
    /// deadlocks the remaining ranks at the next collective.
    pub fn new(world_size: usize) -> Vec<ThreadComm> {
        assert!(world_size > 0, "a process group needs at least one rank");
        let shared = Arc::new(Shared {
            barrier: Barrier::new(world_size),
            slots: (0..world_size).map(|_| Mutex::new(None)).collect(),
        });
        (0..world_size)
            .map(|rank| ThreadComm {
                rank,
                size: world_size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Runs `f` once per rank on scoped threads and returns the per-rank
    /// results in rank order.
    ///
    /// This is the single-process equivalent of launching `world_size`
    /// processes of the same program.
    pub fn run<R, F>(world_size: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(ThreadComm) -> R + Sync,
    {
        let comms = ProcessGroup::new(world_size);
        let f = &f;
        std::thread::scope(|scope| {
            let handles = comms
                .into_iter()
                .map(|comm| scope.spawn(move || f(comm)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("rank panicked"))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allreduce_sum_over_ranks() {
        let sums = ProcessGroup::run(4, |comm| comm.allreduce_sum(comm.world_rank() as u64 + 1));
        assert_eq!(sums, vec![10, 10, 10, 10]);
    }

    #[test]
    fn allreduce_non_commutative_is_rank_ordered() {
        // folding (a, b) -> (a.0, b.1) keeps rank 0's left element and the
        // last rank's right element
        let results = ProcessGroup::run(3, |comm| {
            let rank = comm.world_rank() as u64;
            comm.allreduce((rank, rank), |a, b| (a.0, b.1))
        });
        assert_eq!(results, vec![(0, 2); 3]);
    }

    #[test]
    fn allgather_indexed_by_rank() {
        let gathered = ProcessGroup::run(3, |comm| comm.allgather(comm.world_rank() * 10));
        for ranks in gathered {
            assert_eq!(ranks, vec![0, 10, 20]);
        }
    }

    #[test]
    fn allgatherv_concatenates_in_rank_order() {
        let gathered = ProcessGroup::run(3, |comm| {
            let rank = comm.world_rank();
            let local = vec![rank; rank];
            comm.allgatherv(&local)
        });
        for ranks in gathered {
            assert_eq!(ranks, vec![1, 2, 2]);
        }
    }

    #[test]
    fn alltoall_transposes() {
        let received = ProcessGroup::run(3, |comm| {
            let rank = comm.world_rank();
            let send = (0..3).map(|dest| rank * 10 + dest).collect::<Vec<_>>();
            comm.alltoall(&send)
        });
        assert_eq!(received[0], vec![0, 10, 20]);
        assert_eq!(received[1], vec![1, 11, 21]);
        assert_eq!(received[2], vec![2, 12, 22]);
    }

    #[test]
    fn alltoallv_preserves_source_order() {
        let received = ProcessGroup::run(2, |comm| {
            let rank = comm.world_rank();
            // rank 0 sends [1, 2] to itself and [3] to rank 1,
            // rank 1 sends [4] to rank 0 and [5, 6] to itself.
            let (send, counts) = if rank == 0 {
                (vec![1, 2, 3], vec![2, 1])
            } else {
                (vec![4, 5, 6], vec![1, 2])
            };
            let mut recv = Vec::new();
            let recv_counts = comm.alltoallv(&send, &counts, &mut recv);
            (recv, recv_counts)
        });
        assert_eq!(received[0], (vec![1, 2, 4], vec![2, 1]));
        assert_eq!(received[1], (vec![3, 5, 6], vec![1, 2]));
    }

    #[test]
    fn single_rank_group_never_blocks() {
        let results = ProcessGroup::run(1, |comm| {
            comm.barrier();
            let mut recv = Vec::new();
            comm.alltoallv(&[7u32, 8], &[2], &mut recv);
            (comm.allreduce_sum(42), recv)
        });
        assert_eq!(results, vec![(42, vec![7, 8])]);
    }
}
