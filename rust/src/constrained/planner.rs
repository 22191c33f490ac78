//! The resource-constrained planner: construction, fork-join run, merge.

use crate::checks::{
    unique_nodes, validate_arc_length, validate_arc_lengths, validate_arc_resources,
    validate_max_resources,
};
use crate::config::ConstrainedPathConfig;
use crate::error::DagError;
use crate::graph::{apply_permutation, invert_permutation, ArcIndex, NodeIndex, StaticGraph};
use crate::models::{ArcWithLength, ArcWithLengthAndResources};
use crate::shortest_path::build_graph;
use crate::topology::{check_topological_order, topological_sort};
use crate::{log_phases, log_summary};

use super::merge::{merge_halves, reconstruct_path, HalfResults};
use super::reachability::compute_reachable_subgraph;
use super::search::search_half;
use super::split::{choose_split_index, count_paths, crossing_arcs, HalfGraph};
use super::types::{ConstrainedPathResult, Direction, LabelStatistics, LabelStore, Termination};

/// Shortest path from any source to any destination whose cumulative
/// consumption stays within `max_resources` in every dimension.
///
/// Construction prunes the nodes and arcs that cannot lie on a feasible
/// path and splits the rest in two halves along the topological order.
/// Each run searches both halves (concurrently if configured), then joins
/// them over the arcs crossing the split.
///
/// Only arc lengths may change between runs. Everything else is fixed at
/// construction.
#[derive(Debug)]
pub struct ConstrainedShortestPathsOnDag<'a> {
    graph: &'a StaticGraph,
    arc_lengths: Vec<f64>,
    /// `[resource][arc]`
    arc_resources: Vec<Vec<f64>>,
    max_resources: Vec<f64>,
    config: ConstrainedPathConfig,
    node_is_reachable: Vec<bool>,
    num_reachable_nodes: usize,
    num_reachable_arcs: usize,
    split_index: usize,
    forward: HalfGraph,
    backward: HalfGraph,
    crossing_arcs: Vec<ArcIndex>,
    forward_labels: LabelStore,
    backward_labels: LabelStore,
}

impl<'a> ConstrainedShortestPathsOnDag<'a> {
    /// Create a planner and run all the one-time precomputation.
    ///
    /// # Arguments
    /// * `graph` - The DAG
    /// * `arc_lengths` - One length per arc (finite or `+inf`)
    /// * `arc_resources` - Consumption per `[resource][arc]`, finite and
    ///   non-negative
    /// * `topological_order` - All nodes, every tail before its head
    /// * `sources` / `destinations` - Endpoint sets; duplicates are ignored
    /// * `max_resources` - One limit per resource (`+inf` for none)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &'a StaticGraph,
        arc_lengths: Vec<f64>,
        arc_resources: Vec<Vec<f64>>,
        topological_order: &[NodeIndex],
        sources: &[NodeIndex],
        destinations: &[NodeIndex],
        max_resources: Vec<f64>,
        config: ConstrainedPathConfig,
    ) -> Result<Self, DagError> {
        let num_nodes = graph.num_nodes();
        validate_arc_lengths(&arc_lengths, graph.num_arcs())?;
        validate_arc_resources(&arc_resources, graph.num_arcs())?;
        validate_max_resources(&max_resources, arc_resources.len())?;
        check_topological_order(graph, topological_order)?;
        let sources = unique_nodes(sources, num_nodes)?;
        let destinations = unique_nodes(destinations, num_nodes)?;
        let verbosity = config.verbosity;

        let (reverse_graph, reverse_to_arc) = graph.reversed();
        let reachable = compute_reachable_subgraph(
            graph,
            &reverse_graph,
            &reverse_to_arc,
            topological_order,
            &arc_resources,
            &sources,
            &destinations,
            &max_resources,
        )?;
        log_phases!(
            verbosity,
            "Reachability: {}/{} nodes, {}/{} arcs",
            reachable.num_reachable_nodes,
            num_nodes,
            reachable.num_reachable_arcs,
            graph.num_arcs()
        );

        let (paths_from_sources, paths_to_destinations) =
            count_paths(graph, topological_order, &reachable, &sources, &destinations);
        let split_index = choose_split_index(
            topological_order,
            &reachable,
            &paths_from_sources,
            &paths_to_destinations,
        );
        let mut in_forward_half = vec![false; num_nodes];
        for &node in &topological_order[..split_index] {
            in_forward_half[node] = true;
        }

        let build_half = |direction| {
            HalfGraph::build(
                direction,
                graph,
                topological_order,
                &in_forward_half,
                &reachable,
                &arc_resources,
                &sources,
                &destinations,
            )
        };
        let forward = build_half(Direction::Forward);
        let backward = build_half(Direction::Backward);
        let crossing_arcs = crossing_arcs(graph, &in_forward_half, &reachable);
        log_phases!(
            verbosity,
            "Split at {}: {} forward nodes, {} backward nodes, {} crossing arcs",
            split_index,
            forward.num_nodes() - 1,
            backward.num_nodes() - 1,
            crossing_arcs.len()
        );

        let num_resources = arc_resources.len();
        Ok(Self {
            graph,
            arc_lengths,
            arc_resources,
            max_resources,
            config,
            node_is_reachable: reachable.node_is_reachable,
            num_reachable_nodes: reachable.num_reachable_nodes,
            num_reachable_arcs: reachable.num_reachable_arcs,
            split_index,
            forward,
            backward,
            crossing_arcs,
            forward_labels: LabelStore::new(num_resources),
            backward_labels: LabelStore::new(num_resources),
        })
    }

    pub fn graph(&self) -> &'a StaticGraph {
        self.graph
    }

    pub fn arc_lengths(&self) -> &[f64] {
        &self.arc_lengths
    }

    pub fn config(&self) -> &ConstrainedPathConfig {
        &self.config
    }

    /// Replace all arc lengths; takes effect at the next run.
    pub fn set_arc_lengths(&mut self, arc_lengths: &[f64]) -> Result<(), DagError> {
        validate_arc_lengths(arc_lengths, self.graph.num_arcs())?;
        self.arc_lengths.copy_from_slice(arc_lengths);
        Ok(())
    }

    /// Change the length of one arc; takes effect at the next run.
    pub fn set_arc_length(&mut self, arc: ArcIndex, length: f64) -> Result<(), DagError> {
        validate_arc_length(arc, length)?;
        self.arc_lengths[arc] = length;
        Ok(())
    }

    /// Whether `node` survived reachability pruning.
    pub fn is_node_reachable(&self, node: NodeIndex) -> bool {
        self.node_is_reachable[node]
    }

    /// Position in the topological order where the backward half begins.
    pub fn split_index(&self) -> usize {
        self.split_index
    }

    /// Find the best feasible path under the current arc lengths.
    ///
    /// Returns `{+inf, [], []}` as the path when none is found. When a half
    /// runs out of label budget the result is best-effort and says so in
    /// its termination.
    pub fn run(&mut self) -> ConstrainedPathResult {
        let label_budget = self.config.labels_per_half();
        let verbosity = self.config.verbosity;
        let parallel = self.config.parallel;

        let Self {
            forward,
            backward,
            forward_labels,
            backward_labels,
            arc_lengths,
            max_resources,
            ..
        } = self;
        let (forward, backward) = (&*forward, &*backward);
        let (arc_lengths, max_resources) = (&arc_lengths[..], &max_resources[..]);

        let mut search_forward = || {
            search_half(forward, arc_lengths, max_resources, label_budget, forward_labels, verbosity)
        };
        let mut search_backward = || {
            search_half(backward, arc_lengths, max_resources, label_budget, backward_labels, verbosity)
        };
        if parallel {
            rayon::join(search_forward, search_backward);
        } else {
            search_forward();
            search_backward();
        }

        let halves = HalfResults {
            forward: &self.forward,
            forward_labels: &self.forward_labels,
            backward: &self.backward,
            backward_labels: &self.backward_labels,
        };
        let (best_length, best) = merge_halves(
            &halves,
            &self.crossing_arcs,
            self.graph,
            &self.arc_lengths,
            &self.arc_resources,
            &self.max_resources,
        );
        log_phases!(verbosity, "Merge: best {:?} with length {}", best, best_length);
        let path = reconstruct_path(&halves, self.graph, best_length, best);

        let truncated = self.forward_labels.is_truncated() || self.backward_labels.is_truncated();
        let termination = if truncated {
            Termination::LabelBudgetExhausted
        } else {
            Termination::Completed
        };
        let statistics = LabelStatistics {
            reachable_nodes: self.num_reachable_nodes,
            reachable_arcs: self.num_reachable_arcs,
            split_index: self.split_index,
            forward_labels: self.forward_labels.len(),
            backward_labels: self.backward_labels.len(),
            ran_in_parallel: parallel,
        };
        log_summary!(
            verbosity,
            "Constrained path: length {} over {} arcs, {} + {} labels, {}",
            path.length,
            path.arc_path.len(),
            statistics.forward_labels,
            statistics.backward_labels,
            termination
        );

        self.forward_labels.clear();
        self.backward_labels.clear();

        ConstrainedPathResult {
            path,
            termination,
            statistics,
        }
    }
}

/// One-shot resource-constrained shortest path.
///
/// Builds the graph, computes a topological order and runs the planner
/// once. Arc indices in the result refer to positions in `arcs`.
///
/// # Returns
/// * `Ok(result)`, whose path is `{+inf, [], []}` if no feasible path exists
/// * `Err(DagError::CycleDetected)` if the arcs contain a cycle
/// * `Err(DagError::ResourceCountMismatch)` if an arc does not carry one
///   value per entry of `max_resources`
pub fn constrained_shortest_path_on_dag(
    num_nodes: usize,
    arcs: &[ArcWithLengthAndResources],
    source: NodeIndex,
    destination: NodeIndex,
    max_resources: &[f64],
    config: ConstrainedPathConfig,
) -> Result<ConstrainedPathResult, DagError> {
    let num_resources = max_resources.len();
    for arc in arcs {
        if arc.resources.len() != num_resources {
            return Err(DagError::ResourceCountMismatch {
                expected: num_resources,
                actual: arc.resources.len(),
            });
        }
    }

    let arcs_with_length: Vec<ArcWithLength> = arcs
        .iter()
        .map(|arc| ArcWithLength::new(arc.from, arc.to, arc.length))
        .collect();
    let (graph, permutation, arc_lengths) = build_graph(num_nodes, &arcs_with_length)?;
    let arc_resources: Vec<Vec<f64>> = (0..num_resources)
        .map(|r| {
            let values: Vec<f64> = arcs.iter().map(|arc| arc.resources[r]).collect();
            apply_permutation(&permutation, &values)
        })
        .collect();
    let topological_order = topological_sort(&graph)?;

    let mut planner = ConstrainedShortestPathsOnDag::new(
        &graph,
        arc_lengths,
        arc_resources,
        &topological_order,
        &[source],
        &[destination],
        max_resources.to_vec(),
        config,
    )?;
    let mut result = planner.run();
    result.path = result.path.remap_arcs(&invert_permutation(&permutation));
    Ok(result)
}
