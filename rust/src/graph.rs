//! Static directed graph with dense node and arc indices.
//!
//! Graphs are built in two phases: arcs are appended to a [`GraphBuilder`],
//! then [`GraphBuilder::build`] groups them by tail into a compact adjacency
//! layout. Building may renumber arcs; the returned permutation is used to
//! reorder any per-arc data (lengths, resources) kept alongside the graph.

use std::ops::Range;

/// Dense node index (`0..num_nodes`).
pub type NodeIndex = usize;
/// Dense arc index (`0..num_arcs`).
pub type ArcIndex = usize;

/// Accumulates arcs before building a [`StaticGraph`].
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    num_nodes: usize,
    tails: Vec<NodeIndex>,
    heads: Vec<NodeIndex>,
}

impl GraphBuilder {
    /// Create a builder for a graph with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self::with_capacity(num_nodes, 0)
    }

    /// Create a builder with pre-allocated room for `num_arcs` arcs.
    pub fn with_capacity(num_nodes: usize, num_arcs: usize) -> Self {
        Self {
            num_nodes,
            tails: Vec::with_capacity(num_arcs),
            heads: Vec::with_capacity(num_arcs),
        }
    }

    /// Append the arc `tail -> head` and return its (pre-build) index.
    ///
    /// The node count grows if either endpoint is beyond it.
    pub fn add_arc(&mut self, tail: NodeIndex, head: NodeIndex) -> ArcIndex {
        self.num_nodes = self.num_nodes.max(tail + 1).max(head + 1);
        self.tails.push(tail);
        self.heads.push(head);
        self.tails.len() - 1
    }

    /// Number of arcs added so far.
    pub fn num_arcs(&self) -> usize {
        self.tails.len()
    }

    /// Finalize the graph.
    ///
    /// Returns the graph and a permutation `perm` such that the arc added as
    /// `i` has index `perm[i]` in the built graph. Arcs sharing a tail keep
    /// their relative insertion order.
    pub fn build(self) -> (StaticGraph, Vec<ArcIndex>) {
        let num_nodes = self.num_nodes;
        let num_arcs = self.tails.len();

        // Counting sort by tail
        let mut first_arc = vec![0; num_nodes + 1];
        for &tail in &self.tails {
            first_arc[tail + 1] += 1;
        }
        for node in 0..num_nodes {
            first_arc[node + 1] += first_arc[node];
        }

        let mut next_slot = first_arc.clone();
        let mut permutation = vec![0; num_arcs];
        let mut tails = vec![0; num_arcs];
        let mut heads = vec![0; num_arcs];
        for (arc, (&tail, &head)) in self.tails.iter().zip(&self.heads).enumerate() {
            let slot = next_slot[tail];
            next_slot[tail] += 1;
            permutation[arc] = slot;
            tails[slot] = tail;
            heads[slot] = head;
        }

        (
            StaticGraph {
                num_nodes,
                tails,
                heads,
                first_arc,
            },
            permutation,
        )
    }
}

/// Immutable directed graph with arcs grouped by tail.
#[derive(Clone, Debug, Default)]
pub struct StaticGraph {
    num_nodes: usize,
    tails: Vec<NodeIndex>,
    heads: Vec<NodeIndex>,
    /// `first_arc[n]..first_arc[n + 1]` are the outgoing arcs of `n`.
    first_arc: Vec<ArcIndex>,
}

impl StaticGraph {
    /// Build a graph from `(tail, head)` pairs.
    ///
    /// Convenience wrapper around [`GraphBuilder`]; see
    /// [`GraphBuilder::build`] for the meaning of the returned permutation.
    pub fn from_arcs(num_nodes: usize, arcs: &[(NodeIndex, NodeIndex)]) -> (Self, Vec<ArcIndex>) {
        let mut builder = GraphBuilder::with_capacity(num_nodes, arcs.len());
        for &(tail, head) in arcs {
            builder.add_arc(tail, head);
        }
        builder.build()
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.tails.len()
    }

    #[inline]
    pub fn tail(&self, arc: ArcIndex) -> NodeIndex {
        self.tails[arc]
    }

    #[inline]
    pub fn head(&self, arc: ArcIndex) -> NodeIndex {
        self.heads[arc]
    }

    /// Outgoing arcs of `node`, as a contiguous index range.
    #[inline]
    pub fn outgoing_arcs(&self, node: NodeIndex) -> Range<ArcIndex> {
        self.first_arc[node]..self.first_arc[node + 1]
    }

    /// Build the reverse graph (every arc flipped).
    ///
    /// Returns the reverse graph and, for each of its arcs, the index of the
    /// corresponding arc in `self`.
    pub fn reversed(&self) -> (StaticGraph, Vec<ArcIndex>) {
        let mut builder = GraphBuilder::with_capacity(self.num_nodes, self.num_arcs());
        for arc in 0..self.num_arcs() {
            builder.add_arc(self.heads[arc], self.tails[arc]);
        }
        let (reverse, permutation) = builder.build();
        (reverse, invert_permutation(&permutation))
    }

    /// Node sequence implied by a path given as arcs.
    ///
    /// An empty arc path yields `[start]`.
    pub fn node_path(&self, start: NodeIndex, arc_path: &[ArcIndex]) -> Vec<NodeIndex> {
        let mut nodes = Vec::with_capacity(arc_path.len() + 1);
        nodes.push(arc_path.first().map_or(start, |&arc| self.tails[arc]));
        nodes.extend(arc_path.iter().map(|&arc| self.heads[arc]));
        nodes
    }
}

/// Invert a permutation: `inverse[perm[i]] == i`.
pub fn invert_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; permutation.len()];
    for (old, &new) in permutation.iter().enumerate() {
        inverse[new] = old;
    }
    inverse
}

/// Reorder per-arc values after [`GraphBuilder::build`].
///
/// `values[i]` belongs to the arc added as `i`; the result is indexed by the
/// built arc index.
pub fn apply_permutation<T: Clone>(permutation: &[ArcIndex], values: &[T]) -> Vec<T> {
    invert_permutation(permutation)
        .into_iter()
        .map(|old| values[old].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_groups_arcs_by_tail() {
        let (graph, perm) = StaticGraph::from_arcs(3, &[(2, 0), (0, 1), (2, 1), (0, 2)]);

        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_arcs(), 4);
        assert_eq!(graph.outgoing_arcs(0), 0..2);
        assert_eq!(graph.outgoing_arcs(1), 2..2);
        assert_eq!(graph.outgoing_arcs(2), 2..4);

        // Stable within a tail: (0,1) before (0,2), (2,0) before (2,1)
        assert_eq!(perm, vec![2, 0, 3, 1]);
        for arc in 0..4 {
            let new = perm[arc];
            let (tail, head) = [(2, 0), (0, 1), (2, 1), (0, 2)][arc];
            assert_eq!(graph.tail(new), tail);
            assert_eq!(graph.head(new), head);
        }
    }

    #[test]
    fn test_add_arc_grows_node_count() {
        let mut builder = GraphBuilder::new(1);
        builder.add_arc(0, 4);
        let (graph, _) = builder.build();
        assert_eq!(graph.num_nodes(), 5);
        assert_eq!(graph.outgoing_arcs(4), 1..1);
    }

    #[test]
    fn test_apply_permutation_follows_arcs() {
        let (graph, perm) = StaticGraph::from_arcs(3, &[(1, 2), (0, 1)]);
        let lengths = apply_permutation(&perm, &[7.0, 3.0]);

        assert_eq!(graph.tail(0), 0);
        assert_eq!(lengths, vec![3.0, 7.0]);
    }

    #[test]
    fn test_reversed_maps_back_to_original_arcs() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1), (0, 2), (1, 2)]);
        let (reverse, to_original) = graph.reversed();

        assert_eq!(reverse.num_arcs(), 3);
        for rev_arc in 0..reverse.num_arcs() {
            let arc = to_original[rev_arc];
            assert_eq!(reverse.tail(rev_arc), graph.head(arc));
            assert_eq!(reverse.head(rev_arc), graph.tail(arc));
        }
        // Node 2 has two incoming arcs in the original graph
        assert_eq!(reverse.outgoing_arcs(2).len(), 2);
    }

    #[test]
    fn test_node_path_from_arcs() {
        let (graph, _) = StaticGraph::from_arcs(3, &[(0, 1), (1, 2)]);
        assert_eq!(graph.node_path(0, &[0, 1]), vec![0, 1, 2]);
        assert_eq!(graph.node_path(2, &[]), vec![2]);
    }
}
