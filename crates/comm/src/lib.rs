//! Collective message passing primitives for distributed graph algorithms.
//!
//! The crate models a fixed-size process group in which every rank executes
//! the same program and synchronizes through collective operations. All
//! communication is expressed against the [`Communicator`] trait; the
//! provided [`ThreadComm`] implementation backs the group with one OS thread
//! per rank inside a single process, which is also how multi-rank tests are
//! run. A network transport would implement the same trait.
//!
//! Every collective is a synchronization point: all ranks of the group must
//! reach the same call in the same order. A rank that diverges from that
//! order blocks the whole group, so algorithms built on top of this crate
//! are written as bulk-synchronous phases.
//!
//! On top of the raw collectives, [`Frontier`] implements the exchange
//! pattern shared by all search phases: payloads are pushed into a
//! rank-partitioned outbox, exchanged in one round, and consumed from a
//! local inbox.

pub mod frontier;
pub mod group;

pub use crate::frontier::Frontier;
pub use crate::group::{Communicator, ProcessGroup, ThreadComm};

/// Marker for values that can travel through a collective exchange.
///
/// Payloads are sent by copy between ranks, potentially crossing process
/// boundaries in other transports, so they must be plain data.
pub trait Payload: Copy + Send + Sync + 'static {}

impl<T: Copy + Send + Sync + 'static> Payload for T {}
