//! Rank-partitioned frontier exchange.
//!
//! Search phases produce messages for vertices owned by other ranks faster
//! than they can be delivered one by one. The frontier batches them: local
//! work drains the inbox and pushes new messages into the outbox, and one
//! [`comm`](Frontier::comm) round exchanges all pending messages of all
//! ranks at once. The round doubles as termination detection: it returns
//! `false` exactly when no rank had anything left to send.

use crate::group::Communicator;
use crate::Payload;

/// Outbox/inbox pair for one payload shape.
///
/// Within one exchange round, payloads pushed from rank A to rank B arrive
/// in A's insertion order. Across rounds no ordering is guaranteed;
/// consumers must tolerate duplicates and reordering.
pub struct Frontier<T> {
    outbox: Vec<T>,
    send_counts: Vec<usize>,
    inbox: Vec<T>,
}

impl<T: Payload> Frontier<T> {
    pub fn new(world_size: usize) -> Self {
        Self {
            outbox: Vec::new(),
            send_counts: vec![0; world_size],
            inbox: Vec::new(),
        }
    }

    /// Queues a payload for delivery to `rank` in the next exchange round.
    pub fn push(&mut self, rank: usize, payload: T) {
        self.outbox.push(payload);
        self.send_counts[rank] += 1;
    }

    /// Delivers a self-targeted payload without waiting for an exchange.
    pub fn local_push(&mut self, payload: T) {
        self.inbox.push(payload);
    }

    pub fn has_next(&self) -> bool {
        !self.inbox.is_empty()
    }

    /// Consumes the most recently received payload.
    pub fn next(&mut self) -> Option<T> {
        self.inbox.pop()
    }

    /// Performs one global exchange round.
    ///
    /// `route` must map every payload to the rank it was pushed for; it is
    /// used to group the outbox into per-rank buckets in place. Returns
    /// `false` if no rank had pending messages, in which case nothing was
    /// exchanged and the caller's search loop has terminated globally.
    pub fn comm<C>(&mut self, comm: &C, route: impl Fn(&T) -> usize) -> bool
    where
        C: Communicator,
    {
        let total = comm.allreduce_sum(self.outbox.len() as u64);
        if total == 0 {
            return false;
        }

        partition_by_rank(&mut self.outbox, &self.send_counts, route);
        comm.alltoallv(&self.outbox, &self.send_counts, &mut self.inbox);

        self.outbox.clear();
        self.send_counts.iter_mut().for_each(|count| *count = 0);
        true
    }
}

/// Groups `data` into contiguous buckets in rank order, in place.
///
/// `counts[r]` must equal the number of elements routed to rank `r`. Each
/// element is swapped directly to its bucket's write cursor, so the pass is
/// O(len) with no scratch allocation proportional to the data.
pub fn partition_by_rank<T>(
    data: &mut [T],
    counts: &[usize],
    route: impl Fn(&T) -> usize,
) {
    let mut cursors = Vec::with_capacity(counts.len());
    let mut offset = 0;
    for &count in counts {
        cursors.push(offset);
        offset += count;
    }
    debug_assert_eq!(offset, data.len());

    let mut bucket_end = 0;
    for bucket in 0..counts.len() {
        bucket_end += counts[bucket];
        while cursors[bucket] < bucket_end {
            let rank = route(&data[cursors[bucket]]);
            debug_assert!(rank < counts.len());
            if rank == bucket {
                cursors[bucket] += 1;
            } else {
                let dest = cursors[rank];
                cursors[rank] += 1;
                data.swap(cursors[bucket], dest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ProcessGroup;

    fn route_mod(ranks: usize) -> impl Fn(&u64) -> usize {
        move |v| (*v as usize) % ranks
    }

    #[test]
    fn partition_by_rank_groups_buckets() {
        let mut data = vec![2u64, 0, 1, 2, 1, 0, 0, 2];
        let counts = vec![3, 2, 3];
        partition_by_rank(&mut data, &counts, route_mod(3));

        assert_eq!(&data[..3], &[0, 0, 0]);
        assert_eq!(&data[3..5], &[1, 1]);
        assert_eq!(&data[5..], &[2, 2, 2]);
    }

    #[test]
    fn partition_by_rank_keeps_empty_buckets() {
        let mut data = vec![3u64, 0, 3, 3];
        let counts = vec![1, 0, 0, 3];
        partition_by_rank(&mut data, &counts, |v| (*v as usize) % 4);
        assert_eq!(data, vec![0, 3, 3, 3]);
    }

    #[test]
    fn comm_routes_to_owner_and_terminates() {
        let inboxes = ProcessGroup::run(3, |comm| {
            let mut frontier = Frontier::new(comm.world_size());
            // every rank addresses each peer once with a tagged payload
            for dest in 0..comm.world_size() {
                let payload = (comm.world_rank() * 10 + dest) as u64;
                if dest == comm.world_rank() {
                    frontier.local_push(payload);
                } else {
                    frontier.push(dest, payload);
                }
            }

            assert!(frontier.comm(&comm, |v| (*v % 10) as usize));

            let mut received = Vec::new();
            while let Some(payload) = frontier.next() {
                received.push(payload);
            }
            received.sort_unstable();

            // nothing pending anywhere: the next round reports termination
            assert!(!frontier.comm(&comm, |v| (*v % 10) as usize));
            received
        });

        assert_eq!(inboxes[0], vec![0, 10, 20]);
        assert_eq!(inboxes[1], vec![1, 11, 21]);
        assert_eq!(inboxes[2], vec![2, 12, 22]);
    }
}
