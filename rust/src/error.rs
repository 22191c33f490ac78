//! Error type shared by the graph utilities and the shortest path planners.

use thiserror::Error;

use crate::graph::{ArcIndex, NodeIndex};

/// Errors that can occur while building or querying a planner.
///
/// Every variant is a violated precondition: the offending call returns
/// early and nothing is computed. An unreachable or infeasible destination
/// is *not* an error and is reported through the returned path instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DagError {
    #[error("Cycle detected in graph")]
    CycleDetected,
    #[error("Invalid topological order: arc {tail} -> {head} points backwards")]
    InvalidTopologicalOrder { tail: NodeIndex, head: NodeIndex },
    #[error("Topological order is not a permutation of the graph nodes")]
    NotAPermutation,
    #[error("Node {node} out of range (graph has {num_nodes} nodes)")]
    NodeOutOfRange { node: NodeIndex, num_nodes: usize },
    #[error("Expected {expected} per-arc values, got {actual}")]
    ArcCountMismatch { expected: usize, actual: usize },
    #[error("Invalid length {length} on arc {arc}")]
    InvalidArcLength { arc: ArcIndex, length: f64 },
    #[error("Invalid consumption {value} of resource {resource} on arc {arc}")]
    InvalidResource {
        arc: ArcIndex,
        resource: usize,
        value: f64,
    },
    #[error("Invalid maximum {value} for resource {resource}")]
    InvalidMaxResource { resource: usize, value: f64 },
    #[error("Expected {expected} resource dimensions, got {actual}")]
    ResourceCountMismatch { expected: usize, actual: usize },
    #[error("Node {0} was not reached by the last run")]
    NodeNotReached(NodeIndex),
    #[error("Rank {rank} out of range (planner tracks {path_count} paths)")]
    RankOutOfRange { rank: usize, path_count: usize },
    #[error("Path count must be at least 1")]
    InvalidPathCount,
}
