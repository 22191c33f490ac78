//! Input validation shared by the planners.

use rustc_hash::FxHashSet;

use crate::error::DagError;
use crate::graph::NodeIndex;

/// Arc lengths may be any finite value or `+inf` (arc unusable).
pub fn validate_arc_lengths(lengths: &[f64], num_arcs: usize) -> Result<(), DagError> {
    if lengths.len() != num_arcs {
        return Err(DagError::ArcCountMismatch {
            expected: num_arcs,
            actual: lengths.len(),
        });
    }
    for (arc, &length) in lengths.iter().enumerate() {
        validate_arc_length(arc, length)?;
    }
    Ok(())
}

#[inline]
pub fn validate_arc_length(arc: usize, length: f64) -> Result<(), DagError> {
    if length.is_nan() || length == f64::NEG_INFINITY {
        return Err(DagError::InvalidArcLength { arc, length });
    }
    Ok(())
}

/// Resource consumptions (indexed `[resource][arc]`) must be finite and
/// non-negative.
pub fn validate_arc_resources(resources: &[Vec<f64>], num_arcs: usize) -> Result<(), DagError> {
    for (resource, values) in resources.iter().enumerate() {
        if values.len() != num_arcs {
            return Err(DagError::ArcCountMismatch {
                expected: num_arcs,
                actual: values.len(),
            });
        }
        for (arc, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(DagError::InvalidResource {
                    arc,
                    resource,
                    value,
                });
            }
        }
    }
    Ok(())
}

/// Resource limits must not be NaN; `+inf` means unconstrained.
pub fn validate_max_resources(max_resources: &[f64], num_resources: usize) -> Result<(), DagError> {
    if max_resources.len() != num_resources {
        return Err(DagError::ResourceCountMismatch {
            expected: num_resources,
            actual: max_resources.len(),
        });
    }
    for (resource, &value) in max_resources.iter().enumerate() {
        if value.is_nan() {
            return Err(DagError::InvalidMaxResource { resource, value });
        }
    }
    Ok(())
}

/// Check node indices and drop duplicates, keeping first occurrences.
pub fn unique_nodes(nodes: &[NodeIndex], num_nodes: usize) -> Result<Vec<NodeIndex>, DagError> {
    let mut seen: FxHashSet<NodeIndex> =
        FxHashSet::with_capacity_and_hasher(nodes.len(), Default::default());
    let mut unique = Vec::with_capacity(nodes.len());
    for &node in nodes {
        if node >= num_nodes {
            return Err(DagError::NodeOutOfRange { node, num_nodes });
        }
        if seen.insert(node) {
            unique.push(node);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_lengths_accept_negative_and_infinite() {
        assert!(validate_arc_lengths(&[-3.0, 0.0, f64::INFINITY], 3).is_ok());
    }

    #[test]
    fn test_arc_lengths_reject_nan_and_negative_infinity() {
        assert!(matches!(
            validate_arc_lengths(&[1.0, f64::NAN], 2),
            Err(DagError::InvalidArcLength { arc: 1, .. })
        ));
        assert!(matches!(
            validate_arc_lengths(&[f64::NEG_INFINITY], 1),
            Err(DagError::InvalidArcLength { arc: 0, .. })
        ));
        assert_eq!(
            validate_arc_lengths(&[1.0], 2),
            Err(DagError::ArcCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_arc_resources_must_be_finite_non_negative() {
        assert!(validate_arc_resources(&[vec![0.0, 2.5]], 2).is_ok());
        for bad in [-1.0, f64::INFINITY, f64::NAN] {
            assert!(matches!(
                validate_arc_resources(&[vec![0.0], vec![bad]], 1),
                Err(DagError::InvalidResource {
                    arc: 0,
                    resource: 1,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_max_resources() {
        assert!(validate_max_resources(&[1.0, f64::INFINITY], 2).is_ok());
        assert!(validate_max_resources(&[f64::NAN], 1).is_err());
        assert_eq!(
            validate_max_resources(&[1.0], 2),
            Err(DagError::ResourceCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_unique_nodes() {
        assert_eq!(unique_nodes(&[3, 1, 3, 0, 1], 4).unwrap(), vec![3, 1, 0]);
        assert_eq!(
            unique_nodes(&[4], 4),
            Err(DagError::NodeOutOfRange {
                node: 4,
                num_nodes: 4
            })
        );
    }
}
