//! Common imports for running the SCC pipeline.

pub use crate::color::color_scc_step;
pub use crate::fuzzy::{fuzzy_scc_graph, FuzzyGraph};
pub use crate::normalize::normalize_scc_id;
pub use crate::pivot::{backward_search, forward_search, select_pivot, DegreeCand};
pub use crate::residual::residual_tarjan;
pub use crate::scc::{scc, SccConfig};
pub use crate::tarjan::tarjan;
pub use crate::trim::{trim_1_first, trim_1_normal, trim_tarjan};
pub use crate::undecided;

pub use graph_comm::{Communicator, Frontier, ProcessGroup, ThreadComm};
pub use graph_part::prelude::*;
