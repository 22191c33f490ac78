//! K shortest paths (walks) on a DAG.
//!
//! Each node keeps its `K` best path lengths in increasing order. They are
//! produced by a lazy k-way merge over the node's predecessors: one heap
//! entry per incoming arc, advanced to the predecessor's next rank only
//! when popped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::checks::{unique_nodes, validate_arc_length, validate_arc_lengths};
use crate::error::DagError;
use crate::graph::{invert_permutation, ArcIndex, NodeIndex, StaticGraph};
use crate::models::{ArcWithLength, PathWithLength};
use crate::topology::{check_topological_order, topological_sort};

use super::single_source::build_graph;

/// Compare f64 values; inputs are never NaN.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// A pending entry of the k-way merge at one node.
#[derive(Clone, Copy, Debug, PartialEq)]
struct MergeEntry {
    length: f64,
    /// Arc from the predecessor; `None` for the empty path at a source.
    arc: Option<ArcIndex>,
    /// Rank of the predecessor path this entry extends.
    rank: usize,
}

impl Eq for MergeEntry {}

impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.length, other.length)
            .then(self.arc.cmp(&other.arc))
            .then(self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `K` shortest paths from a set of sources to every node of a DAG.
///
/// Paths are compared as arc sequences, so parallel arcs yield separate
/// ranks. Ranks are 0-based; rank 0 is the shortest path.
#[derive(Debug)]
pub struct KShortestPathsOnDag<'a> {
    graph: &'a StaticGraph,
    topological_order: &'a [NodeIndex],
    reverse_graph: StaticGraph,
    /// Original arc of each reverse-graph arc.
    reverse_to_arc: Vec<ArcIndex>,
    arc_lengths: Vec<f64>,
    path_count: usize,
    /// `[node * path_count + rank]`; `+inf` past the last existing rank.
    lengths_from_sources: Vec<f64>,
    incoming_arcs: Vec<Option<ArcIndex>>,
    incoming_ranks: Vec<usize>,
    is_source: Vec<bool>,
    sources: Vec<NodeIndex>,
    reached_nodes: Vec<NodeIndex>,
    heap: BinaryHeap<Reverse<MergeEntry>>,
}

impl<'a> KShortestPathsOnDag<'a> {
    /// Create a planner tracking `path_count` paths per node.
    pub fn new(
        graph: &'a StaticGraph,
        arc_lengths: Vec<f64>,
        topological_order: &'a [NodeIndex],
        path_count: usize,
    ) -> Result<Self, DagError> {
        if path_count == 0 {
            return Err(DagError::InvalidPathCount);
        }
        validate_arc_lengths(&arc_lengths, graph.num_arcs())?;
        check_topological_order(graph, topological_order)?;

        let (reverse_graph, reverse_to_arc) = graph.reversed();
        let num_nodes = graph.num_nodes();
        let slots = num_nodes * path_count;

        Ok(Self {
            graph,
            topological_order,
            reverse_graph,
            reverse_to_arc,
            arc_lengths,
            path_count,
            lengths_from_sources: vec![f64::INFINITY; slots],
            incoming_arcs: vec![None; slots],
            incoming_ranks: vec![0; slots],
            is_source: vec![false; num_nodes],
            sources: Vec::new(),
            reached_nodes: Vec::with_capacity(num_nodes),
            heap: BinaryHeap::new(),
        })
    }

    /// Number of paths tracked per node (`K`).
    pub fn path_count(&self) -> usize {
        self.path_count
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

    #[inline]
    fn slot(&self, node: NodeIndex, rank: usize) -> usize {
        node * self.path_count + rank
    }

    /// Compute the `K` shortest paths from `sources` to every node.
    pub fn run(&mut self, sources: &[NodeIndex]) -> Result<(), DagError> {
        let sources = unique_nodes(sources, self.graph.num_nodes())?;
        let k = self.path_count;

        for node in self.reached_nodes.drain(..) {
            let start = node * k;
            self.lengths_from_sources[start..start + k].fill(f64::INFINITY);
            self.incoming_arcs[start..start + k].fill(None);
            self.incoming_ranks[start..start + k].fill(0);
        }
        for &source in &self.sources {
            self.is_source[source] = false;
        }
        for &source in &sources {
            self.is_source[source] = true;
        }
        self.sources = sources;

        for &to in self.topological_order {
            self.heap.clear();
            if self.is_source[to] {
                self.heap.push(Reverse(MergeEntry {
                    length: 0.0,
                    arc: None,
                    rank: 0,
                }));
            }
            for reverse_arc in self.reverse_graph.outgoing_arcs(to) {
                let from = self.reverse_graph.head(reverse_arc);
                let arc = self.reverse_to_arc[reverse_arc];
                let length = self.lengths_from_sources[from * k] + self.arc_lengths[arc];
                if length < f64::INFINITY {
                    self.heap.push(Reverse(MergeEntry {
                        length,
                        arc: Some(arc),
                        rank: 0,
                    }));
                }
            }
            if self.heap.is_empty() {
                continue;
            }

            self.reached_nodes.push(to);
            for rank in 0..k {
                let Some(Reverse(entry)) = self.heap.pop() else {
                    break;
                };
                let slot = to * k + rank;
                self.lengths_from_sources[slot] = entry.length;
                self.incoming_arcs[slot] = entry.arc;
                self.incoming_ranks[slot] = entry.rank;

                // Advance this predecessor to its next rank
                if let Some(arc) = entry.arc {
                    let next_rank = entry.rank + 1;
                    if next_rank < k {
                        let from = self.graph.tail(arc);
                        let length = self.lengths_from_sources[from * k + next_rank]
                            + self.arc_lengths[arc];
                        if length < f64::INFINITY {
                            self.heap.push(Reverse(MergeEntry {
                                length,
                                arc: Some(arc),
                                rank: next_rank,
                            }));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether the last run found at least one path to `node`.
    #[inline]
    pub fn is_reachable(&self, node: NodeIndex) -> bool {
        self.lengths_from_sources[self.slot(node, 0)] < f64::INFINITY
    }

    /// Nodes reached by the last run, in topological order.
    pub fn reached_nodes(&self) -> &[NodeIndex] {
        &self.reached_nodes
    }

    /// Length of the rank-`rank` path to `node` (`+inf` if it does not exist).
    pub fn length_to(&self, node: NodeIndex, rank: usize) -> Result<f64, DagError> {
        self.check_rank(rank)?;
        Ok(self.lengths_from_sources[self.slot(node, rank)])
    }

    /// Lengths of the existing paths to `node`, in non-decreasing order.
    ///
    /// Has fewer than `K` entries when fewer paths exist.
    pub fn lengths_to(&self, node: NodeIndex) -> Vec<f64> {
        let start = self.slot(node, 0);
        self.lengths_from_sources[start..start + self.path_count]
            .iter()
            .copied()
            .take_while(|&length| length < f64::INFINITY)
            .collect()
    }

    fn check_rank(&self, rank: usize) -> Result<(), DagError> {
        if rank >= self.path_count {
            return Err(DagError::RankOutOfRange {
                rank,
                path_count: self.path_count,
            });
        }
        Ok(())
    }

    /// Arcs of the rank-`rank` path to `node`, source first.
    pub fn arc_path_to(&self, node: NodeIndex, rank: usize) -> Result<Vec<ArcIndex>, DagError> {
        self.check_rank(rank)?;
        if self.lengths_from_sources[self.slot(node, rank)] == f64::INFINITY {
            return Err(DagError::NodeNotReached(node));
        }

        let mut arc_path = Vec::new();
        let (mut current, mut current_rank) = (node, rank);
        while let Some(arc) = self.incoming_arcs[self.slot(current, current_rank)] {
            if arc_path.len() >= self.graph.num_nodes() {
                return Err(DagError::CycleDetected);
            }
            arc_path.push(arc);
            current_rank = self.incoming_ranks[self.slot(current, current_rank)];
            current = self.graph.tail(arc);
        }
        arc_path.reverse();
        Ok(arc_path)
    }

    /// Nodes of the rank-`rank` path to `node`, source first.
    pub fn node_path_to(&self, node: NodeIndex, rank: usize) -> Result<Vec<NodeIndex>, DagError> {
        let arc_path = self.arc_path_to(node, rank)?;
        Ok(self.graph.node_path(node, &arc_path))
    }

    /// All existing paths to `node`, shortest first.
    pub fn paths_to(&self, node: NodeIndex) -> Result<Vec<PathWithLength>, DagError> {
        self.lengths_to(node)
            .into_iter()
            .enumerate()
            .map(|(rank, length)| {
                let arc_path = self.arc_path_to(node, rank)?;
                let node_path = self.graph.node_path(node, &arc_path);
                Ok(PathWithLength::new(length, arc_path, node_path))
            })
            .collect()
    }
}

/// Up to `path_count` shortest paths between two nodes of a DAG given as an
/// arc list, shortest first.
///
/// Arc indices in the result refer to positions in `arcs_with_length`. The
/// result is empty if `destination` is unreachable.
pub fn k_shortest_paths_on_dag(
    num_nodes: usize,
    arcs_with_length: &[ArcWithLength],
    source: NodeIndex,
    destination: NodeIndex,
    path_count: usize,
) -> Result<Vec<PathWithLength>, DagError> {
    if destination >= num_nodes {
        return Err(DagError::NodeOutOfRange {
            node: destination,
            num_nodes,
        });
    }
    let (graph, permutation, arc_lengths) = build_graph(num_nodes, arcs_with_length)?;
    let topological_order = topological_sort(&graph)?;

    let mut planner = KShortestPathsOnDag::new(&graph, arc_lengths, &topological_order, path_count)?;
    planner.run(&[source])?;

    let to_input = invert_permutation(&permutation);
    Ok(planner
        .paths_to(destination)?
        .into_iter()
        .map(|path| path.remap_arcs(&to_input))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortest_path::single_source::ShortestPathsOnDag;

    /// 0->1:2, 0->2:5, 0->3:4, 1->4:1, 2->4:-3, 3->4:0
    fn example_arcs() -> Vec<ArcWithLength> {
        vec![
            ArcWithLength::new(0, 1, 2.0),
            ArcWithLength::new(0, 2, 5.0),
            ArcWithLength::new(0, 3, 4.0),
            ArcWithLength::new(1, 4, 1.0),
            ArcWithLength::new(2, 4, -3.0),
            ArcWithLength::new(3, 4, 0.0),
        ]
    }

    /// Deterministic layered DAG with parallel arcs and mixed-sign lengths.
    fn layered_dag(layers: usize, width: usize, seed: u64) -> (usize, Vec<ArcWithLength>) {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as usize
        };
        let num_nodes = layers * width;
        let mut arcs = Vec::new();
        for layer in 0..layers - 1 {
            for i in 0..width {
                let from = layer * width + i;
                for _ in 0..3 {
                    let to = (layer + 1) * width + next() % width;
                    let length = (next() % 21) as f64 - 5.0;
                    arcs.push(ArcWithLength::new(from, to, length));
                }
            }
        }
        (num_nodes, arcs)
    }

    #[test]
    fn test_example_two_shortest() {
        let arcs = example_arcs();
        let paths = k_shortest_paths_on_dag(5, &arcs, 0, 4, 2).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].length, 2.0);
        assert_eq!(paths[0].node_path, vec![0, 2, 4]);
        assert_eq!(paths[1].length, 3.0);
        assert_eq!(paths[1].node_path, vec![0, 1, 4]);
        assert_eq!(paths[1].arc_path, vec![0, 3]);
    }

    #[test]
    fn test_fewer_paths_than_requested() {
        let paths = k_shortest_paths_on_dag(5, &example_arcs(), 0, 4, 10).unwrap();
        let lengths: Vec<f64> = paths.iter().map(|p| p.length).collect();
        assert_eq!(lengths, vec![2.0, 3.0, 4.0]);
        assert_eq!(paths[2].node_path, vec![0, 3, 4]);
    }

    #[test]
    fn test_unreachable_destination_yields_no_paths() {
        let arcs: Vec<_> = example_arcs().into_iter().filter(|a| a.to != 4).collect();
        let paths = k_shortest_paths_on_dag(5, &arcs, 0, 4, 3).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_zero_path_count_is_rejected() {
        assert_eq!(
            k_shortest_paths_on_dag(5, &example_arcs(), 0, 4, 0),
            Err(DagError::InvalidPathCount)
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let arcs = vec![ArcWithLength::new(0, 1, 1.0), ArcWithLength::new(1, 0, 1.0)];
        assert_eq!(
            k_shortest_paths_on_dag(2, &arcs, 0, 1, 2),
            Err(DagError::CycleDetected)
        );
    }

    #[test]
    fn test_parallel_arcs_are_distinct_paths() {
        let arcs = vec![
            ArcWithLength::new(0, 1, 3.0),
            ArcWithLength::new(0, 1, 1.0),
            ArcWithLength::new(0, 1, f64::INFINITY),
        ];
        let paths = k_shortest_paths_on_dag(2, &arcs, 0, 1, 5).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].arc_path, vec![1]);
        assert_eq!(paths[1].arc_path, vec![0]);
    }

    #[test]
    fn test_rank_queries() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1), (0, 1), (1, 2)]);
        let order = vec![0, 1, 2];
        let mut planner = KShortestPathsOnDag::new(&graph, vec![1.0, 2.0, 1.0], &order, 3).unwrap();
        planner.run(&[0]).unwrap();

        assert_eq!(planner.lengths_to(2), vec![2.0, 3.0]);
        assert_eq!(planner.length_to(2, 2), Ok(f64::INFINITY));
        assert_eq!(planner.arc_path_to(2, 2), Err(DagError::NodeNotReached(2)));
        assert_eq!(
            planner.length_to(2, 3),
            Err(DagError::RankOutOfRange {
                rank: 3,
                path_count: 3
            })
        );
        assert_eq!(planner.node_path_to(2, 1).unwrap(), vec![0, 1, 2]);
        assert_eq!(planner.arc_path_to(2, 1).unwrap(), vec![1, 2]);
        assert_eq!(planner.lengths_to(0), vec![0.0]);
    }

    #[test]
    fn test_source_reached_through_another_source() {
        // 1 is a source but the walk 0 -> 1 is shorter than the empty path
        let (graph, _) = StaticGraph::from_arcs(2, &[(0, 1)]);
        let order = vec![0, 1];
        let mut planner = KShortestPathsOnDag::new(&graph, vec![-2.0], &order, 2).unwrap();
        planner.run(&[0, 1]).unwrap();

        assert_eq!(planner.lengths_to(1), vec![-2.0, 0.0]);
        assert_eq!(planner.arc_path_to(1, 0).unwrap(), vec![0]);
        assert!(planner.arc_path_to(1, 1).unwrap().is_empty());
        assert_eq!(planner.node_path_to(1, 1).unwrap(), vec![1]);
    }

    #[test]
    fn test_ranks_are_sorted_and_rank_zero_matches_single_source() {
        for seed in 1..6u64 {
            let (num_nodes, arcs) = layered_dag(6, 4, seed);
            let (graph, _, lengths) = build_graph(num_nodes, &arcs).unwrap();
            let order = topological_sort(&graph).unwrap();

            let mut k_planner =
                KShortestPathsOnDag::new(&graph, lengths.clone(), &order, 4).unwrap();
            let mut planner = ShortestPathsOnDag::new(&graph, lengths.clone(), &order).unwrap();
            k_planner.run(&[0, 1]).unwrap();
            planner.run(&[0, 1]).unwrap();

            for node in 0..num_nodes {
                let ks = k_planner.lengths_to(node);
                assert!(ks.windows(2).all(|w| w[0] <= w[1]), "seed {seed} node {node}");
                assert_eq!(k_planner.is_reachable(node), planner.is_reachable(node));
                if planner.is_reachable(node) {
                    assert_eq!(ks[0], planner.length_to(node));
                }
                for (rank, &length) in ks.iter().enumerate() {
                    let arc_path = k_planner.arc_path_to(node, rank).unwrap();
                    let total: f64 = arc_path.iter().map(|&a| lengths[a]).sum();
                    assert_eq!(total, length);
                    let nodes = k_planner.node_path_to(node, rank).unwrap();
                    assert!(nodes[0] == 0 || nodes[0] == 1);
                    assert_eq!(*nodes.last().unwrap(), node);
                }
            }
        }
    }

    #[test]
    fn test_ranks_are_distinct_paths() {
        let (num_nodes, arcs) = layered_dag(5, 3, 42);
        let (graph, _, lengths) = build_graph(num_nodes, &arcs).unwrap();
        let order = topological_sort(&graph).unwrap();
        let mut planner = KShortestPathsOnDag::new(&graph, lengths, &order, 6).unwrap();
        planner.run(&[0]).unwrap();

        for node in 0..num_nodes {
            let paths = planner.paths_to(node).unwrap();
            for i in 0..paths.len() {
                for j in i + 1..paths.len() {
                    assert_ne!(paths[i].arc_path, paths[j].arc_path);
                }
            }
        }
    }

    #[test]
    fn test_rerun_with_new_sources() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 2), (1, 2)]);
        let order = vec![0, 1, 2];
        let mut planner = KShortestPathsOnDag::new(&graph, vec![1.0, 2.0], &order, 2).unwrap();

        planner.run(&[0, 1]).unwrap();
        assert_eq!(planner.lengths_to(2), vec![1.0, 2.0]);

        planner.run(&[1]).unwrap();
        assert_eq!(planner.lengths_to(2), vec![2.0]);
        assert!(!planner.is_reachable(0));
        assert_eq!(planner.reached_nodes(), &[1, 2]);
    }
}
