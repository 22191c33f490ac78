//! Topological ordering utilities.

use std::collections::VecDeque;

use crate::error::DagError;
use crate::graph::{NodeIndex, StaticGraph};

/// Perform topological sort of the graph using Kahn's algorithm.
///
/// Nodes without predecessors are seeded in index order, so the result is
/// deterministic for a given graph.
///
/// # Returns
/// * `Ok(order)` where every arc's tail precedes its head
/// * `Err(DagError::CycleDetected)` if the graph has a cycle
pub fn topological_sort(graph: &StaticGraph) -> Result<Vec<NodeIndex>, DagError> {
    let num_nodes = graph.num_nodes();
    let mut in_degree = vec![0usize; num_nodes];
    for arc in 0..graph.num_arcs() {
        in_degree[graph.head(arc)] += 1;
    }

    let mut queue: VecDeque<NodeIndex> = (0..num_nodes).filter(|&n| in_degree[n] == 0).collect();
    let mut order = Vec::with_capacity(num_nodes);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for arc in graph.outgoing_arcs(node) {
            let head = graph.head(arc);
            in_degree[head] -= 1;
            if in_degree[head] == 0 {
                queue.push_back(head);
            }
        }
    }

    if order.len() != num_nodes {
        return Err(DagError::CycleDetected);
    }

    Ok(order)
}

/// Check that `order` is a permutation of the nodes in which every arc's
/// tail comes before its head.
pub fn validate_topological_order(
    graph: &StaticGraph,
    order: &[NodeIndex],
) -> Result<(), DagError> {
    let num_nodes = graph.num_nodes();
    if order.len() != num_nodes {
        return Err(DagError::NotAPermutation);
    }

    let mut position = vec![usize::MAX; num_nodes];
    for (index, &node) in order.iter().enumerate() {
        if node >= num_nodes || position[node] != usize::MAX {
            return Err(DagError::NotAPermutation);
        }
        position[node] = index;
    }

    for arc in 0..graph.num_arcs() {
        let (tail, head) = (graph.tail(arc), graph.head(arc));
        if position[tail] >= position[head] {
            return Err(DagError::InvalidTopologicalOrder { tail, head });
        }
    }

    Ok(())
}

/// Order check performed by planners at construction.
///
/// Debug builds run the full [`validate_topological_order`]. Release builds
/// only check that the order covers the node range; an order that violates
/// arc direction then yields upper bounds on path lengths instead of an
/// error.
pub fn check_topological_order(graph: &StaticGraph, order: &[NodeIndex]) -> Result<(), DagError> {
    if cfg!(debug_assertions) {
        return validate_topological_order(graph, order);
    }
    let num_nodes = graph.num_nodes();
    if order.len() != num_nodes || order.iter().any(|&node| node >= num_nodes) {
        return Err(DagError::NotAPermutation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_simple_dag() {
        let (graph, _) = StaticGraph::from_arcs(4, &[(2, 3), (0, 2), (1, 3), (0, 1)]);
        let order = topological_sort(&graph).unwrap();

        assert_eq!(order, vec![0, 2, 1, 3]);
        assert!(validate_topological_order(&graph, &order).is_ok());
    }

    #[test]
    fn test_sort_isolated_nodes() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(2, 0)]);
        let order = topological_sort(&graph).unwrap();

        // 1 and 2 have no predecessors; 0 only becomes free after 2
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_cycle_detected() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(topological_sort(&graph), Err(DagError::CycleDetected));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let (graph, _) = StaticGraph::from_arcs(2, &[(0, 1), (1, 1)]);
        assert_eq!(topological_sort(&graph), Err(DagError::CycleDetected));
    }

    #[test]
    fn test_validate_rejects_backward_arc() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1), (1, 2)]);
        assert_eq!(
            validate_topological_order(&graph, &[0, 2, 1]),
            Err(DagError::InvalidTopologicalOrder { tail: 1, head: 2 })
        );
    }

    #[test]
    fn test_validate_rejects_non_permutation() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1)]);
        assert_eq!(
            validate_topological_order(&graph, &[0, 1]),
            Err(DagError::NotAPermutation)
        );
        assert_eq!(
            validate_topological_order(&graph, &[0, 1, 1]),
            Err(DagError::NotAPermutation)
        );
        assert_eq!(
            validate_topological_order(&graph, &[0, 1, 7]),
            Err(DagError::NotAPermutation)
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_check_is_strict_in_debug_builds() {
        let (graph, _) = StaticGraph::from_arcs(2, &[(0, 1)]);
        assert!(check_topological_order(&graph, &[1, 0]).is_err());
        assert!(check_topological_order(&graph, &[0, 1]).is_ok());
    }
}
