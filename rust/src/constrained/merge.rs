//! Joining the two half searches into a single best path.

use crate::graph::{ArcIndex, NodeIndex, StaticGraph};
use crate::models::PathWithLength;

use super::split::HalfGraph;
use super::types::LabelStore;

/// Where the best path found so far comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BestPath {
    None,
    /// Entirely inside the forward half, ending at a destination.
    Forward { node: NodeIndex, label: usize },
    /// Entirely inside the backward half, starting at a source.
    Backward { node: NodeIndex, label: usize },
    /// Forward label, then `arc` across the split, then backward label.
    Crossing {
        forward_label: usize,
        arc: ArcIndex,
        backward_label: usize,
    },
}

/// Both halves' searches, as inputs to the merge.
pub struct HalfResults<'h> {
    pub forward: &'h HalfGraph,
    pub forward_labels: &'h LabelStore,
    pub backward: &'h HalfGraph,
    pub backward_labels: &'h LabelStore,
}

/// Shortest label ending at an endpoint of `half`.
fn best_endpoint_label(half: &HalfGraph, labels: &LabelStore) -> Option<(f64, NodeIndex, usize)> {
    let mut best: Option<(f64, NodeIndex, usize)> = None;
    for local in 1..half.num_nodes() {
        if !half.is_endpoint[local] {
            continue;
        }
        // Labels are sorted by length: the first is the shortest
        let Some(label) = labels.labels_at(local).next() else {
            continue;
        };
        let length = labels.label(label).length;
        if best.map_or(true, |(best_length, _, _)| length < best_length) {
            if let Some(node) = half.local_to_node[local] {
                best = Some((length, node, label));
            }
        }
    }
    best
}

/// Find the shortest feasible combination of the two halves.
///
/// Seeds the best with single-half paths, then tries every crossing arc.
/// Labels at a node are visited in increasing length, so the inner loops
/// stop as soon as the combined length cannot improve the best.
pub fn merge_halves(
    halves: &HalfResults<'_>,
    crossing_arcs: &[ArcIndex],
    graph: &StaticGraph,
    arc_lengths: &[f64],
    arc_resources: &[Vec<f64>],
    max_resources: &[f64],
) -> (f64, BestPath) {
    let mut best_length = f64::INFINITY;
    let mut best = BestPath::None;

    if let Some((length, node, label)) = best_endpoint_label(halves.forward, halves.forward_labels)
    {
        best_length = length;
        best = BestPath::Forward { node, label };
    }
    if let Some((length, node, label)) =
        best_endpoint_label(halves.backward, halves.backward_labels)
    {
        if length < best_length {
            best_length = length;
            best = BestPath::Backward { node, label };
        }
    }

    for &arc in crossing_arcs {
        let arc_length = arc_lengths[arc];
        if arc_length == f64::INFINITY {
            continue;
        }
        let (Some(tail), Some(head)) = (
            halves.forward.node_to_local[graph.tail(arc)],
            halves.backward.node_to_local[graph.head(arc)],
        ) else {
            continue;
        };
        let forward_range = halves.forward_labels.labels_at(tail);
        let backward_range = halves.backward_labels.labels_at(head);
        if forward_range.is_empty() || backward_range.is_empty() {
            continue;
        }
        let shortest_backward = halves.backward_labels.label(backward_range.start).length;

        for forward_label in forward_range {
            let forward_length = halves.forward_labels.label(forward_label).length + arc_length;
            if forward_length + shortest_backward >= best_length {
                break;
            }
            let forward_resources = halves.forward_labels.resources(forward_label);

            for backward_label in backward_range.clone() {
                let length = forward_length + halves.backward_labels.label(backward_label).length;
                if length >= best_length {
                    break;
                }
                let backward_resources = halves.backward_labels.resources(backward_label);
                let feasible = (0..max_resources.len()).all(|r| {
                    forward_resources[r] + arc_resources[r][arc] + backward_resources[r]
                        <= max_resources[r]
                });
                if feasible {
                    best_length = length;
                    best = BestPath::Crossing {
                        forward_label,
                        arc,
                        backward_label,
                    };
                    // Longer backward labels cannot do better
                    break;
                }
            }
        }
    }

    (best_length, best)
}

/// Turn the merge result into a full-graph path.
pub fn reconstruct_path(
    halves: &HalfResults<'_>,
    graph: &StaticGraph,
    best_length: f64,
    best: BestPath,
) -> PathWithLength {
    let (start, arc_path) = match best {
        BestPath::None => return PathWithLength::unreachable(),
        BestPath::Forward { node, label } => {
            let mut arcs = halves.forward_labels.parent_arcs(label);
            arcs.reverse();
            (node, arcs)
        }
        // Backward parent chains already run from the label towards the
        // destinations, i.e. in path order
        BestPath::Backward { node, label } => (node, halves.backward_labels.parent_arcs(label)),
        BestPath::Crossing {
            forward_label,
            arc,
            backward_label,
        } => {
            let mut arcs = halves.forward_labels.parent_arcs(forward_label);
            arcs.reverse();
            arcs.push(arc);
            arcs.extend(halves.backward_labels.parent_arcs(backward_label));
            (graph.tail(arc), arcs)
        }
    };

    let node_path = graph.node_path(start, &arc_path);
    PathWithLength::new(best_length, arc_path, node_path)
}
