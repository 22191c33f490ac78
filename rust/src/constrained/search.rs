//! Label-setting search over one half.

use std::cmp::Ordering;

use crate::log_debug;

use super::split::{HalfGraph, SUPER_SOURCE};
use super::types::{Label, LabelStore};

/// Compare f64 values; inputs are never NaN.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Candidate labels for one node before filtering.
#[derive(Debug, Default)]
struct Candidates {
    lengths: Vec<f64>,
    /// `[candidate * num_resources + resource]`
    resources: Vec<f64>,
    parent_arcs: Vec<Option<usize>>,
    parent_labels: Vec<usize>,
    order: Vec<usize>,
    kept: Vec<usize>,
}

impl Candidates {
    fn clear(&mut self) {
        self.lengths.clear();
        self.resources.clear();
        self.parent_arcs.clear();
        self.parent_labels.clear();
    }
}

/// Indices of the Pareto-optimal candidates, sorted by `(length, resources)`.
///
/// A candidate is dropped when an earlier one is no worse in length and in
/// every resource; exact duplicates keep their first occurrence. Sorting
/// indices instead of candidates keeps the resource vectors in place.
pub fn pareto_filter(
    lengths: &[f64],
    resources: &[f64],
    num_resources: usize,
    order: &mut Vec<usize>,
    kept: &mut Vec<usize>,
) {
    let resources_of = |i: usize| &resources[i * num_resources..(i + 1) * num_resources];

    order.clear();
    order.extend(0..lengths.len());
    order.sort_by(|&a, &b| {
        cmp_f64(lengths[a], lengths[b]).then_with(|| {
            resources_of(a)
                .iter()
                .zip(resources_of(b))
                .map(|(&x, &y)| cmp_f64(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    });

    kept.clear();
    for &candidate in order.iter() {
        // Sorted by length, so every kept label is at most as long
        let dominated = kept.iter().any(|&k| {
            resources_of(k)
                .iter()
                .zip(resources_of(candidate))
                .all(|(&x, &y)| x <= y)
        });
        if !dominated {
            kept.push(candidate);
        }
    }
}

/// Generate the labels of one half.
///
/// Starts with a single zero label at the super-source and visits the local
/// nodes in order. Candidates that cannot complete within `max_resources`
/// (accumulated use plus the least use still needed beyond the half) are
/// dropped before the Pareto filter.
///
/// If more than `label_budget` labels would be stored, the store is marked
/// truncated and the remaining nodes keep no labels.
pub fn search_half(
    half: &HalfGraph,
    arc_lengths: &[f64],
    max_resources: &[f64],
    label_budget: usize,
    store: &mut LabelStore,
    verbosity: u8,
) {
    let num_resources = half.num_resources;
    store.reset(half.num_nodes());

    if label_budget == 0 {
        store.mark_truncated();
        return;
    }
    let root = store.push(
        Label {
            length: 0.0,
            parent_arc: None,
            parent_label: None,
        },
        &vec![0.0; num_resources],
    );
    store.set_node_labels(SUPER_SOURCE, root, 1);

    let mut candidates = Candidates::default();
    let mut accumulated = vec![0.0; num_resources];

    for node in (SUPER_SOURCE + 1)..half.num_nodes() {
        candidates.clear();
        let min_extra = half.min_extra(node);

        for predecessor_arc in half.predecessors.outgoing_arcs(node) {
            let arc = half.predecessor_arc[predecessor_arc];
            let arc_length = arc.map_or(0.0, |a| arc_lengths[a]);
            if arc_length == f64::INFINITY {
                continue;
            }
            let arc_resources = half.predecessor_resources(predecessor_arc);
            let predecessor = half.predecessors.head(predecessor_arc);

            for parent in store.labels_at(predecessor) {
                let parent_resources = store.resources(parent);
                let mut feasible = true;
                for r in 0..num_resources {
                    accumulated[r] = parent_resources[r] + arc_resources[r];
                    if accumulated[r] + min_extra[r] > max_resources[r] {
                        feasible = false;
                        break;
                    }
                }
                if !feasible {
                    continue;
                }
                candidates
                    .lengths
                    .push(store.label(parent).length + arc_length);
                candidates.resources.extend_from_slice(&accumulated);
                candidates.parent_arcs.push(arc);
                candidates.parent_labels.push(parent);
            }
        }

        if candidates.lengths.is_empty() {
            continue;
        }

        let Candidates {
            lengths,
            resources,
            parent_arcs,
            parent_labels,
            order,
            kept,
        } = &mut candidates;
        pareto_filter(lengths, resources, num_resources, order, kept);

        if store.len() + kept.len() > label_budget {
            log_debug!(
                verbosity,
                "{} half: label budget {} reached at local node {}",
                half.direction,
                label_budget,
                node
            );
            store.mark_truncated();
            return;
        }

        let first = store.len();
        for &c in kept.iter() {
            store.push(
                Label {
                    length: lengths[c],
                    parent_arc: parent_arcs[c],
                    parent_label: Some(parent_labels[c]),
                },
                &resources[c * num_resources..(c + 1) * num_resources],
            );
        }
        store.set_node_labels(node, first, kept.len());

        log_debug!(
            verbosity,
            "{} half: node {:?} keeps {} of {} labels",
            half.direction,
            half.local_to_node[node],
            kept.len(),
            lengths.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(lengths: &[f64], resources: &[f64], num_resources: usize) -> Vec<usize> {
        let (mut order, mut kept) = (Vec::new(), Vec::new());
        pareto_filter(lengths, resources, num_resources, &mut order, &mut kept);
        kept
    }

    #[test]
    fn test_pareto_keeps_tradeoffs() {
        // (length, r0, r1)
        let lengths = [3.0, 1.0, 2.0, 4.0];
        let resources = [1.0, 1.0, 5.0, 5.0, 2.0, 2.0, 0.5, 3.0];
        // 0 (3,[1,1]) is dominated by nothing: 1 and 2 use more resources
        // 3 (4,[0.5,3]) is not dominated: less r0 than anyone
        assert_eq!(filter(&lengths, &resources, 2), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_pareto_drops_dominated() {
        let lengths = [1.0, 2.0, 2.0, 3.0];
        let resources = [2.0, 1.0, 3.0, 4.0];
        // 2 and 3 are beaten by 0; 1 has less resource
        assert_eq!(filter(&lengths, &resources, 1), vec![0, 1]);
    }

    #[test]
    fn test_pareto_equal_labels_keep_first() {
        let lengths = [2.0, 2.0, 2.0];
        let resources = [1.0, 1.0, 0.0];
        assert_eq!(filter(&lengths, &resources, 1), vec![2]);

        let resources = [1.0, 1.0, 1.0];
        assert_eq!(filter(&lengths, &resources, 1), vec![0]);
    }

    #[test]
    fn test_pareto_without_resources_keeps_shortest() {
        let lengths = [5.0, -1.0, 3.0];
        assert_eq!(filter(&lengths, &[], 0), vec![1]);
    }

    #[test]
    fn test_pareto_empty() {
        assert!(filter(&[], &[], 3).is_empty());
    }
}
