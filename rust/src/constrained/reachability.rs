//! Reachability pruning for the resource-constrained search.
//!
//! For every resource, one forward pass from the sources and one backward
//! pass from the destinations give the least consumption needed to reach a
//! node and to leave it. Nodes and arcs whose cheapest completion already
//! breaks a limit can never be on a feasible path and are pruned once, at
//! construction.

use crate::error::DagError;
use crate::graph::{NodeIndex, StaticGraph};
use crate::shortest_path::ShortestPathsOnDag;

/// Least resource consumption to and from each node.
#[derive(Clone, Debug)]
pub struct ResourceBounds {
    /// `[resource][node]`: cheapest consumption from any source.
    pub from_sources: Vec<Vec<f64>>,
    /// `[resource][node]`: cheapest consumption to any destination.
    pub to_destinations: Vec<Vec<f64>>,
}

/// Nodes and arcs that may lie on a feasible source-destination path.
#[derive(Clone, Debug)]
pub struct ReachableSubgraph {
    pub node_is_reachable: Vec<bool>,
    pub arc_is_reachable: Vec<bool>,
    pub num_reachable_nodes: usize,
    pub num_reachable_arcs: usize,
    pub bounds: ResourceBounds,
}

/// Per-node least cost from `sources` (forward) and to `destinations`
/// (backward, over the reverse graph) under one per-arc cost.
fn bidirectional_costs(
    graph: &StaticGraph,
    reverse_graph: &StaticGraph,
    reverse_to_arc: &[usize],
    topological_order: &[NodeIndex],
    reverse_order: &[NodeIndex],
    arc_costs: &[f64],
    sources: &[NodeIndex],
    destinations: &[NodeIndex],
) -> Result<(Vec<f64>, Vec<f64>), DagError> {
    let mut forward = ShortestPathsOnDag::new(graph, arc_costs.to_vec(), topological_order)?;
    forward.run(sources)?;

    let reverse_costs: Vec<f64> = reverse_to_arc.iter().map(|&arc| arc_costs[arc]).collect();
    let mut backward = ShortestPathsOnDag::new(reverse_graph, reverse_costs, reverse_order)?;
    backward.run(destinations)?;

    Ok((forward.lengths().to_vec(), backward.lengths().to_vec()))
}

/// Compute the reachable subgraph.
///
/// # Arguments
/// * `arc_resources` - Consumption per `[resource][arc]`
/// * `max_resources` - Limit per resource
#[allow(clippy::too_many_arguments)]
pub fn compute_reachable_subgraph(
    graph: &StaticGraph,
    reverse_graph: &StaticGraph,
    reverse_to_arc: &[usize],
    topological_order: &[NodeIndex],
    arc_resources: &[Vec<f64>],
    sources: &[NodeIndex],
    destinations: &[NodeIndex],
    max_resources: &[f64],
) -> Result<ReachableSubgraph, DagError> {
    let num_nodes = graph.num_nodes();
    let num_arcs = graph.num_arcs();
    let reverse_order: Vec<NodeIndex> = topological_order.iter().rev().copied().collect();

    let mut from_sources = Vec::with_capacity(arc_resources.len());
    let mut to_destinations = Vec::with_capacity(arc_resources.len());
    for costs in arc_resources {
        let (from, to) = bidirectional_costs(
            graph,
            reverse_graph,
            reverse_to_arc,
            topological_order,
            &reverse_order,
            costs,
            sources,
            destinations,
        )?;
        from_sources.push(from);
        to_destinations.push(to);
    }

    // Without resources, reachability is plain connectivity
    let connectivity = if arc_resources.is_empty() {
        Some(bidirectional_costs(
            graph,
            reverse_graph,
            reverse_to_arc,
            topological_order,
            &reverse_order,
            &vec![0.0; num_arcs],
            sources,
            destinations,
        )?)
    } else {
        None
    };

    let mut node_is_reachable = vec![false; num_nodes];
    for (node, reachable) in node_is_reachable.iter_mut().enumerate() {
        *reachable = match &connectivity {
            Some((from, to)) => from[node] < f64::INFINITY && to[node] < f64::INFINITY,
            None => (0..arc_resources.len()).all(|r| {
                let from = from_sources[r][node];
                let to = to_destinations[r][node];
                from < f64::INFINITY && to < f64::INFINITY && from + to <= max_resources[r]
            }),
        };
    }

    let mut arc_is_reachable = vec![false; num_arcs];
    for (arc, reachable) in arc_is_reachable.iter_mut().enumerate() {
        let (tail, head) = (graph.tail(arc), graph.head(arc));
        *reachable = node_is_reachable[tail]
            && node_is_reachable[head]
            && (0..arc_resources.len()).all(|r| {
                from_sources[r][tail] + arc_resources[r][arc] + to_destinations[r][head]
                    <= max_resources[r]
            });
    }

    let num_reachable_nodes = node_is_reachable.iter().filter(|&&r| r).count();
    let num_reachable_arcs = arc_is_reachable.iter().filter(|&&r| r).count();

    Ok(ReachableSubgraph {
        node_is_reachable,
        arc_is_reachable,
        num_reachable_nodes,
        num_reachable_arcs,
        bounds: ResourceBounds {
            from_sources,
            to_destinations,
        },
    })
}
