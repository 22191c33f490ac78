//! Single-source shortest paths on a DAG by one pass in topological order.

use crate::checks::{unique_nodes, validate_arc_length, validate_arc_lengths};
use crate::error::DagError;
use crate::graph::{apply_permutation, ArcIndex, GraphBuilder, NodeIndex, StaticGraph};
use crate::models::{ArcWithLength, PathWithLength};
use crate::topology::{check_topological_order, topological_sort};

/// Shortest paths from a set of sources to every node of a DAG.
///
/// Built once per (graph, topological order) and run any number of times.
/// Only the arc lengths may change between runs. Buffers are sized once;
/// a run only resets the nodes reached by the previous run.
///
/// Lengths may be negative. An arc of length `+inf` behaves as if absent.
#[derive(Debug)]
pub struct ShortestPathsOnDag<'a> {
    graph: &'a StaticGraph,
    topological_order: &'a [NodeIndex],
    arc_lengths: Vec<f64>,
    /// Length of the best known path to each node (`+inf` if unreached).
    length_from_sources: Vec<f64>,
    /// Last arc of the best path to each node; `None` at the sources.
    incoming_arc: Vec<Option<ArcIndex>>,
    reached_nodes: Vec<NodeIndex>,
}

impl<'a> ShortestPathsOnDag<'a> {
    /// Create a planner.
    ///
    /// # Arguments
    /// * `graph` - The DAG
    /// * `arc_lengths` - One length per arc (finite or `+inf`)
    /// * `topological_order` - All nodes, every tail before its head
    ///   (fully checked in debug builds only)
    pub fn new(
        graph: &'a StaticGraph,
        arc_lengths: Vec<f64>,
        topological_order: &'a [NodeIndex],
    ) -> Result<Self, DagError> {
        validate_arc_lengths(&arc_lengths, graph.num_arcs())?;
        check_topological_order(graph, topological_order)?;

        let num_nodes = graph.num_nodes();
        Ok(Self {
            graph,
            topological_order,
            arc_lengths,
            length_from_sources: vec![f64::INFINITY; num_nodes],
            incoming_arc: vec![None; num_nodes],
            reached_nodes: Vec::with_capacity(num_nodes),
        })
    }

    pub fn graph(&self) -> &'a StaticGraph {
        self.graph
    }

    pub fn arc_lengths(&self) -> &[f64] {
        &self.arc_lengths
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

    /// Compute shortest paths from `sources` to every node.
    pub fn run(&mut self, sources: &[NodeIndex]) -> Result<(), DagError> {
        let sources = unique_nodes(sources, self.graph.num_nodes())?;

        for node in self.reached_nodes.drain(..) {
            self.length_from_sources[node] = f64::INFINITY;
            self.incoming_arc[node] = None;
        }

        for &source in &sources {
            self.length_from_sources[source] = 0.0;
            self.reached_nodes.push(source);
        }

        for &node in self.topological_order {
            let length = self.length_from_sources[node];
            if length == f64::INFINITY {
                continue;
            }
            for arc in self.graph.outgoing_arcs(node) {
                let head = self.graph.head(arc);
                let candidate = length + self.arc_lengths[arc];
                if candidate < self.length_from_sources[head] {
                    if self.length_from_sources[head] == f64::INFINITY {
                        self.reached_nodes.push(head);
                    }
                    self.length_from_sources[head] = candidate;
                    self.incoming_arc[head] = Some(arc);
                }
            }
        }

        Ok(())
    }

    /// Whether the last run found a path to `node`.
    #[inline]
    pub fn is_reachable(&self, node: NodeIndex) -> bool {
        self.length_from_sources[node] < f64::INFINITY
    }

    /// Shortest path length to `node` from the last run (`+inf` if unreached).
    #[inline]
    pub fn length_to(&self, node: NodeIndex) -> f64 {
        self.length_from_sources[node]
    }

    /// Per-node shortest path lengths from the last run.
    pub fn lengths(&self) -> &[f64] {
        &self.length_from_sources
    }

    /// Nodes reached by the last run, in the order they were first reached.
    pub fn reached_nodes(&self) -> &[NodeIndex] {
        &self.reached_nodes
    }

    /// Arcs of the shortest path to `node`, source first.
    ///
    /// Fails with `NodeNotReached` if the last run did not reach `node`.
    pub fn arc_path_to(&self, node: NodeIndex) -> Result<Vec<ArcIndex>, DagError> {
        if !self.is_reachable(node) {
            return Err(DagError::NodeNotReached(node));
        }

        let mut arc_path = Vec::new();
        let mut current = node;
        while let Some(arc) = self.incoming_arc[current] {
            // Parent pointers only loop if the order violated arc direction
            if arc_path.len() >= self.graph.num_nodes() {
                return Err(DagError::CycleDetected);
            }
            arc_path.push(arc);
            current = self.graph.tail(arc);
        }
        arc_path.reverse();
        Ok(arc_path)
    }

    /// Nodes of the shortest path to `node`, source first.
    pub fn node_path_to(&self, node: NodeIndex) -> Result<Vec<NodeIndex>, DagError> {
        let arc_path = self.arc_path_to(node)?;
        Ok(self.graph.node_path(node, &arc_path))
    }

    /// The shortest path to `node`, or `{+inf, [], []}` if unreached.
    pub fn path_to(&self, node: NodeIndex) -> Result<PathWithLength, DagError> {
        if !self.is_reachable(node) {
            return Ok(PathWithLength::unreachable());
        }
        let arc_path = self.arc_path_to(node)?;
        let node_path = self.graph.node_path(node, &arc_path);
        Ok(PathWithLength::new(self.length_to(node), arc_path, node_path))
    }
}

/// Shortest path between two nodes of a DAG given as an arc list.
///
/// Builds the graph, computes a topological order and runs a single pass.
/// Arc indices in the result refer to positions in `arcs_with_length`.
///
/// # Returns
/// * `Ok(path)`, which is `{+inf, [], []}` if `destination` is unreachable
/// * `Err(DagError::CycleDetected)` if the arcs contain a cycle
pub fn shortest_path_on_dag(
    num_nodes: usize,
    arcs_with_length: &[ArcWithLength],
    source: NodeIndex,
    destination: NodeIndex,
) -> Result<PathWithLength, DagError> {
    if destination >= num_nodes {
        return Err(DagError::NodeOutOfRange {
            node: destination,
            num_nodes,
        });
    }
    let (graph, permutation, arc_lengths) = build_graph(num_nodes, arcs_with_length)?;
    let topological_order = topological_sort(&graph)?;

    let mut planner = ShortestPathsOnDag::new(&graph, arc_lengths, &topological_order)?;
    planner.run(&[source])?;

    let path = planner.path_to(destination)?;
    Ok(path.remap_arcs(&crate::graph::invert_permutation(&permutation)))
}

/// Build a graph from an arc list, checking node indices.
///
/// Returns the graph, the arc permutation and the permuted lengths.
pub(crate) fn build_graph(
    num_nodes: usize,
    arcs_with_length: &[ArcWithLength],
) -> Result<(StaticGraph, Vec<ArcIndex>, Vec<f64>), DagError> {
    let mut builder = GraphBuilder::with_capacity(num_nodes, arcs_with_length.len());
    for arc in arcs_with_length {
        for node in [arc.from, arc.to] {
            if node >= num_nodes {
                return Err(DagError::NodeOutOfRange { node, num_nodes });
            }
        }
        builder.add_arc(arc.from, arc.to);
    }
    let (graph, permutation) = builder.build();
    let lengths: Vec<f64> = arcs_with_length.iter().map(|arc| arc.length).collect();
    let arc_lengths = apply_permutation(&permutation, &lengths);
    Ok((graph, permutation, arc_lengths))
}
