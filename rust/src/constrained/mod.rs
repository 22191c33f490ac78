//! Resource-constrained shortest paths on DAGs.
//!
//! A two-sided label-setting search:
//! - `reachability`: prune nodes and arcs off every feasible path
//! - `split`: cut the topological order where path counts balance
//! - `search`: Pareto label generation per half, with look-ahead pruning
//! - `merge`: join the halves over crossing arcs and rebuild the path
//! - `planner`: the reusable planner and the one-shot entry point

pub mod merge;
pub mod reachability;
pub mod search;
pub mod split;
pub mod types;

mod planner;

pub use planner::{constrained_shortest_path_on_dag, ConstrainedShortestPathsOnDag};
pub use types::{ConstrainedPathResult, Direction, Label, LabelStatistics, LabelStore, Termination};
