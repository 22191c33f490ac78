//! Splitting the reachable subgraph into a forward and a backward half.

use crate::graph::{apply_permutation, ArcIndex, GraphBuilder, NodeIndex, StaticGraph};

use super::reachability::ReachableSubgraph;
use super::types::Direction;

/// Local index of the super-source in every half.
pub const SUPER_SOURCE: usize = 0;

/// Approximate number of paths from the sources to each node and from each
/// node to the destinations, over reachable arcs only.
///
/// Counts are doubles: they only steer the split and may overflow to
/// `+inf` on large graphs.
pub fn count_paths(
    graph: &StaticGraph,
    topological_order: &[NodeIndex],
    reachable: &ReachableSubgraph,
    sources: &[NodeIndex],
    destinations: &[NodeIndex],
) -> (Vec<f64>, Vec<f64>) {
    let num_nodes = graph.num_nodes();
    let mut from_sources = vec![0.0; num_nodes];
    let mut to_destinations = vec![0.0; num_nodes];

    for &source in sources {
        if reachable.node_is_reachable[source] {
            from_sources[source] += 1.0;
        }
    }
    for &node in topological_order {
        if !reachable.node_is_reachable[node] {
            continue;
        }
        for arc in graph.outgoing_arcs(node) {
            if reachable.arc_is_reachable[arc] {
                from_sources[graph.head(arc)] += from_sources[node];
            }
        }
    }

    for &destination in destinations {
        if reachable.node_is_reachable[destination] {
            to_destinations[destination] += 1.0;
        }
    }
    for &node in topological_order.iter().rev() {
        if !reachable.node_is_reachable[node] {
            continue;
        }
        for arc in graph.outgoing_arcs(node) {
            if reachable.arc_is_reachable[arc] {
                to_destinations[node] += to_destinations[graph.head(arc)];
            }
        }
    }

    (from_sources, to_destinations)
}

/// First position in the order where more paths arrive at a reachable node
/// than leave it; the midpoint if there is none.
///
/// Positions before the split form the forward half.
pub fn choose_split_index(
    topological_order: &[NodeIndex],
    reachable: &ReachableSubgraph,
    paths_from_sources: &[f64],
    paths_to_destinations: &[f64],
) -> usize {
    topological_order
        .iter()
        .position(|&node| {
            reachable.node_is_reachable[node]
                && paths_from_sources[node] > paths_to_destinations[node]
        })
        .unwrap_or(topological_order.len() / 2)
}

/// Reachable arcs going from the forward half into the backward half.
pub fn crossing_arcs(
    graph: &StaticGraph,
    in_forward_half: &[bool],
    reachable: &ReachableSubgraph,
) -> Vec<ArcIndex> {
    (0..graph.num_arcs())
        .filter(|&arc| {
            reachable.arc_is_reachable[arc]
                && in_forward_half[graph.tail(arc)]
                && !in_forward_half[graph.head(arc)]
        })
        .collect()
}

/// Sub-graph searched by one half.
///
/// Local nodes are numbered in search order with the super-source first,
/// so a search simply walks `0..num_nodes()`. The `predecessors` graph has
/// an arc from every local node to each node whose labels it extends.
#[derive(Clone, Debug)]
pub struct HalfGraph {
    pub direction: Direction,
    pub num_resources: usize,
    pub predecessors: StaticGraph,
    /// Full-graph arc behind each predecessor arc; `None` for super-source arcs.
    pub predecessor_arc: Vec<Option<ArcIndex>>,
    /// `[predecessor_arc * num_resources + resource]`
    pub arc_resources: Vec<f64>,
    /// `[local * num_resources + resource]`: least consumption still needed
    /// beyond this half to reach the opposite endpoint set.
    pub min_extra_resources: Vec<f64>,
    pub local_to_node: Vec<Option<NodeIndex>>,
    /// Indexed by full-graph node.
    pub node_to_local: Vec<Option<usize>>,
    /// Local nodes where a complete path ends: destinations for the forward
    /// half, sources for the backward half.
    pub is_endpoint: Vec<bool>,
}

impl HalfGraph {
    /// Build one half of the reachable subgraph.
    ///
    /// # Arguments
    /// * `in_forward_half` - Per full-graph node, whether it precedes the split
    /// * `arc_resources` - Consumption per `[resource][arc]`
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        direction: Direction,
        graph: &StaticGraph,
        topological_order: &[NodeIndex],
        in_forward_half: &[bool],
        reachable: &ReachableSubgraph,
        arc_resources: &[Vec<f64>],
        sources: &[NodeIndex],
        destinations: &[NodeIndex],
    ) -> Self {
        let num_resources = arc_resources.len();
        let in_half = |node: NodeIndex| {
            reachable.node_is_reachable[node]
                && in_forward_half[node] == (direction == Direction::Forward)
        };

        let mut local_to_node = vec![None];
        let mut node_to_local = vec![None; graph.num_nodes()];
        let mut add_local = |node: NodeIndex| {
            if in_half(node) {
                node_to_local[node] = Some(local_to_node.len());
                local_to_node.push(Some(node));
            }
        };
        match direction {
            Direction::Forward => topological_order.iter().for_each(|&n| add_local(n)),
            Direction::Backward => topological_order.iter().rev().for_each(|&n| add_local(n)),
        }
        let num_local = local_to_node.len();

        let (starts, ends) = match direction {
            Direction::Forward => (sources, destinations),
            Direction::Backward => (destinations, sources),
        };

        let mut builder = GraphBuilder::with_capacity(num_local, 0);
        let mut arcs: Vec<Option<ArcIndex>> = Vec::new();
        for &start in starts {
            if let Some(local) = node_to_local[start] {
                builder.add_arc(local, SUPER_SOURCE);
                arcs.push(None);
            }
        }
        for arc in 0..graph.num_arcs() {
            if !reachable.arc_is_reachable[arc] {
                continue;
            }
            let (tail, head) = (graph.tail(arc), graph.head(arc));
            let (Some(local_tail), Some(local_head)) = (node_to_local[tail], node_to_local[head])
            else {
                continue;
            };
            match direction {
                Direction::Forward => builder.add_arc(local_head, local_tail),
                Direction::Backward => builder.add_arc(local_tail, local_head),
            };
            arcs.push(Some(arc));
        }
        let (predecessors, permutation) = builder.build();
        let predecessor_arc = apply_permutation(&permutation, &arcs);

        let mut flat_resources = Vec::with_capacity(predecessor_arc.len() * num_resources);
        for arc in &predecessor_arc {
            for resource in arc_resources {
                flat_resources.push(arc.map_or(0.0, |a| resource[a]));
            }
        }

        let bounds = match direction {
            Direction::Forward => &reachable.bounds.to_destinations,
            Direction::Backward => &reachable.bounds.from_sources,
        };
        let mut min_extra_resources = Vec::with_capacity(num_local * num_resources);
        for node in &local_to_node {
            for bound in bounds {
                min_extra_resources.push(node.map_or(0.0, |n| bound[n]));
            }
        }

        let mut is_endpoint = vec![false; num_local];
        for &end in ends {
            if let Some(local) = node_to_local[end] {
                is_endpoint[local] = true;
            }
        }

        Self {
            direction,
            num_resources,
            predecessors,
            predecessor_arc,
            arc_resources: flat_resources,
            min_extra_resources,
            local_to_node,
            node_to_local,
            is_endpoint,
        }
    }

    /// Number of local nodes, super-source included.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.local_to_node.len()
    }

    #[inline]
    pub fn predecessor_resources(&self, predecessor_arc: usize) -> &[f64] {
        let start = predecessor_arc * self.num_resources;
        &self.arc_resources[start..start + self.num_resources]
    }

    #[inline]
    pub fn min_extra(&self, local: usize) -> &[f64] {
        let start = local * self.num_resources;
        &self.min_extra_resources[start..start + self.num_resources]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained::reachability::compute_reachable_subgraph;
    use crate::topology::topological_sort;

    fn reachable_for(
        graph: &StaticGraph,
        order: &[NodeIndex],
        resources: &[Vec<f64>],
        sources: &[NodeIndex],
        destinations: &[NodeIndex],
        max: &[f64],
    ) -> ReachableSubgraph {
        let (reverse, reverse_to_arc) = graph.reversed();
        compute_reachable_subgraph(
            graph,
            &reverse,
            &reverse_to_arc,
            order,
            resources,
            sources,
            destinations,
            max,
        )
        .unwrap()
    }

    #[test]
    fn test_chain_splits_at_midpoint() {
        let (graph, _) = StaticGraph::from_arcs(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let order = topological_sort(&graph).unwrap();
        let reach = reachable_for(&graph, &order, &[vec![1.0; 4]], &[0], &[4], &[10.0]);
        let (from, to) = count_paths(&graph, &order, &reach, &[0], &[4]);

        assert_eq!(from, vec![1.0; 5]);
        assert_eq!(to, vec![1.0; 5]);
        assert_eq!(choose_split_index(&order, &reach, &from, &to), 2);
    }

    #[test]
    fn test_fan_in_splits_where_paths_accumulate() {
        // 0 fans out to 1, 2, 3 which all join at 4
        let (graph, _) =
            StaticGraph::from_arcs(5, &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)]);
        let order = topological_sort(&graph).unwrap();
        let reach = reachable_for(&graph, &order, &[vec![0.0; 6]], &[0], &[4], &[0.0]);
        let (from, to) = count_paths(&graph, &order, &reach, &[0], &[4]);

        assert_eq!(from[4], 3.0);
        assert_eq!(to[0], 3.0);
        assert_eq!(choose_split_index(&order, &reach, &from, &to), 4);
    }

    #[test]
    fn test_halves_partition_reachable_nodes() {
        let (graph, _) = StaticGraph::from_arcs(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4)]);
        let order = topological_sort(&graph).unwrap();
        let resources = vec![vec![1.0; 5]];
        let reach = reachable_for(&graph, &order, &resources, &[0], &[4], &[10.0]);
        let split = 2;
        let mut in_forward = vec![false; 5];
        for &node in &order[..split] {
            in_forward[node] = true;
        }

        let forward = HalfGraph::build(
            Direction::Forward,
            &graph,
            &order,
            &in_forward,
            &reach,
            &resources,
            &[0],
            &[4],
        );
        let backward = HalfGraph::build(
            Direction::Backward,
            &graph,
            &order,
            &in_forward,
            &reach,
            &resources,
            &[0],
            &[4],
        );

        assert_eq!(forward.local_to_node, vec![None, Some(0), Some(1)]);
        assert_eq!(backward.local_to_node, vec![None, Some(4), Some(3), Some(2)]);

        // Forward: super-source arc into 0, plus 0->1
        assert_eq!(forward.predecessors.num_arcs(), 2);
        assert_eq!(forward.predecessors.outgoing_arcs(1).len(), 1);
        // Backward: super-source arc into 4, plus 3->4 and 2->3
        assert_eq!(backward.predecessors.num_arcs(), 3);
        assert!(backward.is_endpoint.iter().all(|&e| !e));
        assert_eq!(forward.is_endpoint, vec![false, false, false]);

        // Look-ahead: from node 1 at least 3 more units reach node 4 (1->2->3->4)
        assert_eq!(forward.min_extra(2), &[3.0]);
        // Backward node 2 needs 2 units from the source (0->1->2)
        assert_eq!(backward.min_extra(3), &[2.0]);

        let crossing = crossing_arcs(&graph, &in_forward, &reach);
        let crossing_pairs: Vec<_> = crossing
            .iter()
            .map(|&a| (graph.tail(a), graph.head(a)))
            .collect();
        assert_eq!(crossing_pairs, vec![(0, 4), (1, 2)]);
    }
}
