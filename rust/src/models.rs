//! Core data types: arcs with lengths (and resources) and paths.

use pyo3::prelude::*;

use crate::graph::{ArcIndex, NodeIndex};

/// A directed arc with a length.
///
/// The length is any finite value, or `+inf` for an arc that must never be
/// used.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ArcWithLength {
    #[pyo3(get, set, name = "from_node")]
    pub from: NodeIndex,
    #[pyo3(get, set, name = "to_node")]
    pub to: NodeIndex,
    #[pyo3(get, set)]
    pub length: f64,
}

impl ArcWithLength {
    pub fn new(from: NodeIndex, to: NodeIndex, length: f64) -> Self {
        Self { from, to, length }
    }
}

#[pymethods]
impl ArcWithLength {
    #[new]
    fn py_new(from_node: NodeIndex, to_node: NodeIndex, length: f64) -> Self {
        Self::new(from_node, to_node, length)
    }

    fn __repr__(&self) -> String {
        format!(
            "ArcWithLength(from={}, to={}, length={})",
            self.from, self.to, self.length
        )
    }
}

/// A directed arc with a length and one consumption per resource dimension.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ArcWithLengthAndResources {
    #[pyo3(get, set, name = "from_node")]
    pub from: NodeIndex,
    #[pyo3(get, set, name = "to_node")]
    pub to: NodeIndex,
    #[pyo3(get, set)]
    pub length: f64,
    /// Non-negative, finite consumption per resource.
    #[pyo3(get, set)]
    pub resources: Vec<f64>,
}

impl ArcWithLengthAndResources {
    pub fn new(from: NodeIndex, to: NodeIndex, length: f64, resources: Vec<f64>) -> Self {
        Self {
            from,
            to,
            length,
            resources,
        }
    }
}

#[pymethods]
impl ArcWithLengthAndResources {
    #[new]
    fn py_new(
        from_node: NodeIndex,
        to_node: NodeIndex,
        length: f64,
        resources: Vec<f64>,
    ) -> Self {
        Self::new(from_node, to_node, length, resources)
    }

    fn __repr__(&self) -> String {
        format!(
            "ArcWithLengthAndResources(from={}, to={}, length={}, resources={:?})",
            self.from, self.to, self.length, self.resources
        )
    }
}

/// A path and its total length.
///
/// `node_path` starts at the source. When no path exists, `length` is
/// `+inf` and both sequences are empty.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct PathWithLength {
    #[pyo3(get, set)]
    pub length: f64,
    #[pyo3(get, set)]
    pub arc_path: Vec<ArcIndex>,
    #[pyo3(get, set)]
    pub node_path: Vec<NodeIndex>,
}

impl PathWithLength {
    pub fn new(length: f64, arc_path: Vec<ArcIndex>, node_path: Vec<NodeIndex>) -> Self {
        Self {
            length,
            arc_path,
            node_path,
        }
    }

    /// The "no path" value: `{+inf, [], []}`.
    pub fn unreachable() -> Self {
        Self::new(f64::INFINITY, Vec::new(), Vec::new())
    }

    /// Rewrite arc indices through `arc_map` (e.g. back to input order).
    pub fn remap_arcs(mut self, arc_map: &[ArcIndex]) -> Self {
        for arc in &mut self.arc_path {
            *arc = arc_map[*arc];
        }
        self
    }
}

#[pymethods]
impl PathWithLength {
    /// Whether this value denotes an existing path.
    pub fn is_reachable(&self) -> bool {
        self.length < f64::INFINITY
    }

    fn __repr__(&self) -> String {
        format!(
            "PathWithLength(length={}, arc_path={:?}, node_path={:?})",
            self.length, self.arc_path, self.node_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_path() {
        let path = PathWithLength::unreachable();
        assert_eq!(path.length, f64::INFINITY);
        assert!(path.arc_path.is_empty());
        assert!(path.node_path.is_empty());
        assert!(!path.is_reachable());
    }

    #[test]
    fn test_remap_arcs() {
        let path = PathWithLength::new(1.0, vec![0, 2], vec![0, 1, 2]).remap_arcs(&[5, 6, 7]);
        assert_eq!(path.arc_path, vec![5, 7]);
        assert_eq!(path.node_path, vec![0, 1, 2]);
        assert!(path.is_reachable());
    }
}
