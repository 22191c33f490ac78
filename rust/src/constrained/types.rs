//! Types for the resource-constrained search.

use std::ops::Range;

use crate::graph::ArcIndex;
use crate::models::PathWithLength;

/// Which end of the graph a half search starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the sources, following arcs.
    Forward,
    /// From the destinations, against arcs.
    Backward,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// A partial path ending at some node of a half.
///
/// Resources live in the owning [`LabelStore`], addressed by label index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    pub length: f64,
    /// Arc (in the full graph) used to reach this label's node; `None` for
    /// the super-source label and for labels created over a super-source arc.
    pub parent_arc: Option<ArcIndex>,
    /// Label this one extends; `None` only for the super-source label.
    pub parent_label: Option<usize>,
}

/// Arena of labels for one half search.
///
/// Labels of a node are contiguous and sorted by `(length, resources)`.
#[derive(Clone, Debug, Default)]
pub struct LabelStore {
    num_resources: usize,
    labels: Vec<Label>,
    /// `[label * num_resources + resource]`
    resources: Vec<f64>,
    /// `(first_label, count)` per local node.
    node_labels: Vec<(usize, usize)>,
    truncated: bool,
}

impl LabelStore {
    pub fn new(num_resources: usize) -> Self {
        Self {
            num_resources,
            ..Default::default()
        }
    }

    /// Drop all labels and size the per-node index for `num_nodes` nodes.
    /// Allocated capacity is kept.
    pub fn reset(&mut self, num_nodes: usize) {
        self.labels.clear();
        self.resources.clear();
        self.node_labels.clear();
        self.node_labels.resize(num_nodes, (0, 0));
        self.truncated = false;
    }

    /// Drop all labels, keeping capacity.
    pub fn clear(&mut self) {
        self.reset(0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_resources(&self) -> usize {
        self.num_resources
    }

    /// Append a label and return its index.
    pub fn push(&mut self, label: Label, resources: &[f64]) -> usize {
        debug_assert_eq!(resources.len(), self.num_resources);
        self.labels.push(label);
        self.resources.extend_from_slice(resources);
        self.labels.len() - 1
    }

    /// Record that labels `first..first + count` belong to `node`.
    pub fn set_node_labels(&mut self, node: usize, first: usize, count: usize) {
        self.node_labels[node] = (first, count);
    }

    #[inline]
    pub fn label(&self, index: usize) -> &Label {
        &self.labels[index]
    }

    #[inline]
    pub fn resources(&self, index: usize) -> &[f64] {
        let start = index * self.num_resources;
        &self.resources[start..start + self.num_resources]
    }

    /// Label indices at `node`, in increasing length.
    #[inline]
    pub fn labels_at(&self, node: usize) -> Range<usize> {
        let (first, count) = self.node_labels[node];
        first..first + count
    }

    /// Whether generation stopped early on the label budget.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Arcs on the parent chain of `index`, starting from `index`'s own
    /// parent arc and walking towards the super-source.
    pub fn parent_arcs(&self, index: usize) -> Vec<ArcIndex> {
        let mut arcs = Vec::new();
        let mut current = Some(index);
        while let Some(label_index) = current {
            let label = &self.labels[label_index];
            if let Some(arc) = label.parent_arc {
                arcs.push(arc);
            }
            current = label.parent_label;
        }
        arcs
    }
}

/// How a constrained run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every label was generated: the path is optimal, or no feasible path
    /// exists.
    Completed,
    /// A half hit its label budget; the path (if any) is the best among the
    /// labels generated and may be suboptimal or missing.
    LabelBudgetExhausted,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Completed => write!(f, "Completed"),
            Termination::LabelBudgetExhausted => write!(f, "Label Budget Exhausted"),
        }
    }
}

/// Counters describing the precomputation and the last run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelStatistics {
    /// Nodes that can lie on a feasible path.
    pub reachable_nodes: usize,
    /// Arcs that can lie on a feasible path.
    pub reachable_arcs: usize,
    /// Position in the topological order where the backward half begins.
    pub split_index: usize,
    /// Labels created by the forward half (super-source included).
    pub forward_labels: usize,
    /// Labels created by the backward half (super-source included).
    pub backward_labels: usize,
    /// Whether the halves ran on separate threads.
    pub ran_in_parallel: bool,
}

impl std::fmt::Display for LabelStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Label Statistics:")?;
        writeln!(f, "  Reachable Nodes: {}", self.reachable_nodes)?;
        writeln!(f, "  Reachable Arcs: {}", self.reachable_arcs)?;
        writeln!(f, "  Split Index: {}", self.split_index)?;
        writeln!(f, "  Forward Labels: {}", self.forward_labels)?;
        writeln!(f, "  Backward Labels: {}", self.backward_labels)?;
        writeln!(f, "  Ran In Parallel: {}", self.ran_in_parallel)
    }
}

/// Result of a resource-constrained run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstrainedPathResult {
    /// Best feasible path found, or `{+inf, [], []}`.
    pub path: PathWithLength,
    pub termination: Termination,
    pub statistics: LabelStatistics,
}

impl ConstrainedPathResult {
    /// Whether the path is proven optimal (or infeasibility is proven).
    pub fn is_exact(&self) -> bool {
        self.termination == Termination::Completed
    }

    /// Whether the search was cut short by the label budget.
    pub fn is_truncated(&self) -> bool {
        self.termination == Termination::LabelBudgetExhausted
    }
}
