//! Shortest paths on directed acyclic graphs.
//!
//! Both planners process nodes once in a caller-supplied topological order,
//! so a run is linear in the graph size (times `log` of the in-degree for
//! the K-shortest variant).

mod k_shortest;
mod single_source;

pub use k_shortest::{k_shortest_paths_on_dag, KShortestPathsOnDag};
pub use single_source::{shortest_path_on_dag, ShortestPathsOnDag};

pub(crate) use single_source::build_graph;
