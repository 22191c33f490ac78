//! Rust implementation of shortest path planners on directed acyclic graphs.
//!
//! Three planners share one graph representation and one topological order:
//! - `ShortestPathsOnDag`: single pass in topological order
//! - `KShortestPathsOnDag`: K best walks per node by a lazy heap merge
//! - `ConstrainedShortestPathsOnDag`: shortest path under per-resource
//!   limits, by a two-sided label-setting search
//!
//! The planners are reusable across runs; the `*_on_dag` functions are
//! one-shot conveniences and are what the Python module exposes.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;
use std::collections::HashMap;

pub mod checks;
pub mod config;
pub mod constrained;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod shortest_path;
pub mod topology;

pub use config::ConstrainedPathConfig;
pub use constrained::{
    constrained_shortest_path_on_dag, ConstrainedPathResult, ConstrainedShortestPathsOnDag,
    LabelStatistics, Termination,
};
pub use error::DagError;
pub use graph::{ArcIndex, GraphBuilder, NodeIndex, StaticGraph};
pub use models::{ArcWithLength, ArcWithLengthAndResources, PathWithLength};
pub use shortest_path::{
    k_shortest_paths_on_dag, shortest_path_on_dag, KShortestPathsOnDag, ShortestPathsOnDag,
};
pub use topology::{topological_sort, validate_topological_order};

fn to_py_err(e: DagError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

/// Result of a resource-constrained search (PyO3 wrapper).
#[pyclass(name = "ConstrainedPathResult")]
#[derive(Clone, Debug)]
pub struct PyConstrainedPathResult {
    #[pyo3(get)]
    pub path: PathWithLength,
    /// True when the label budget ran out and the path may be suboptimal.
    #[pyo3(get)]
    pub truncated: bool,
    #[pyo3(get)]
    pub statistics: HashMap<String, usize>,
}

impl From<ConstrainedPathResult> for PyConstrainedPathResult {
    fn from(result: ConstrainedPathResult) -> Self {
        let stats = &result.statistics;
        let statistics = HashMap::from([
            ("reachable_nodes".to_string(), stats.reachable_nodes),
            ("reachable_arcs".to_string(), stats.reachable_arcs),
            ("split_index".to_string(), stats.split_index),
            ("forward_labels".to_string(), stats.forward_labels),
            ("backward_labels".to_string(), stats.backward_labels),
        ]);
        Self {
            truncated: result.is_truncated(),
            path: result.path,
            statistics,
        }
    }
}

#[pymethods]
impl PyConstrainedPathResult {
    fn __repr__(&self) -> String {
        format!(
            "ConstrainedPathResult(length={}, truncated={}, arcs={})",
            self.path.length,
            self.truncated,
            self.path.arc_path.len()
        )
    }
}

/// Compute the shortest path between two nodes of a DAG.
///
/// # Arguments
/// * `num_nodes` - Number of nodes; nodes are `0..num_nodes`
/// * `arcs` - Arcs with lengths (finite or `inf`)
/// * `source` - Start node
/// * `destination` - End node
///
/// # Returns
/// * PathWithLength; `length` is `inf` and both paths are empty if the
///   destination is unreachable
///
/// # Raises
/// * ValueError if the graph has a cycle or an input is invalid
#[pyfunction]
#[pyo3(name = "shortest_path_on_dag")]
fn py_shortest_path_on_dag(
    num_nodes: usize,
    arcs: Vec<ArcWithLength>,
    source: usize,
    destination: usize,
) -> PyResult<PathWithLength> {
    shortest_path_on_dag(num_nodes, &arcs, source, destination).map_err(to_py_err)
}

/// Compute up to `path_count` shortest paths between two nodes of a DAG,
/// in non-decreasing length. Paths may share nodes.
///
/// # Raises
/// * ValueError if the graph has a cycle, `path_count` is 0 or an input is
///   invalid
#[pyfunction]
#[pyo3(name = "k_shortest_paths_on_dag")]
fn py_k_shortest_paths_on_dag(
    num_nodes: usize,
    arcs: Vec<ArcWithLength>,
    source: usize,
    destination: usize,
    path_count: usize,
) -> PyResult<Vec<PathWithLength>> {
    k_shortest_paths_on_dag(num_nodes, &arcs, source, destination, path_count).map_err(to_py_err)
}

/// Compute the shortest path whose resource use stays within
/// `max_resources`.
///
/// # Arguments
/// * `num_nodes` - Number of nodes; nodes are `0..num_nodes`
/// * `arcs` - Arcs with lengths and one consumption per resource
/// * `source` - Start node
/// * `destination` - End node
/// * `max_resources` - One limit per resource
/// * `config` - Label budget, threading and verbosity (defaults if omitted)
///
/// # Returns
/// * ConstrainedPathResult; check `truncated` before trusting optimality
///
/// # Raises
/// * ValueError if the graph has a cycle or an input is invalid
#[pyfunction]
#[pyo3(
    name = "constrained_shortest_path_on_dag",
    signature = (num_nodes, arcs, source, destination, max_resources, config=None)
)]
fn py_constrained_shortest_path_on_dag(
    num_nodes: usize,
    arcs: Vec<ArcWithLengthAndResources>,
    source: usize,
    destination: usize,
    max_resources: Vec<f64>,
    config: Option<ConstrainedPathConfig>,
) -> PyResult<PyConstrainedPathResult> {
    constrained_shortest_path_on_dag(
        num_nodes,
        &arcs,
        source,
        destination,
        &max_resources,
        config.unwrap_or_default(),
    )
    .map(PyConstrainedPathResult::from)
    .map_err(to_py_err)
}

/// Topologically sort a graph given as `(tail, head)` pairs.
///
/// # Raises
/// * ValueError if the graph has a cycle or a node is out of range
#[pyfunction]
#[pyo3(name = "topological_sort")]
fn py_topological_sort(num_nodes: usize, arcs: Vec<(usize, usize)>) -> PyResult<Vec<usize>> {
    if let Some(&(tail, head)) = arcs
        .iter()
        .find(|&&(tail, head)| tail >= num_nodes || head >= num_nodes)
    {
        let node = if tail >= num_nodes { tail } else { head };
        return Err(to_py_err(DagError::NodeOutOfRange { node, num_nodes }));
    }
    let (graph, _) = StaticGraph::from_arcs(num_nodes, &arcs);
    topological_sort(&graph).map_err(to_py_err)
}

/// The dagsp.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<ArcWithLength>()?;
    m.add_class::<ArcWithLengthAndResources>()?;
    m.add_class::<PathWithLength>()?;
    m.add_class::<PyConstrainedPathResult>()?;

    // Config types
    m.add_class::<ConstrainedPathConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_shortest_path_on_dag, m)?)?;
    m.add_function(wrap_pyfunction!(py_k_shortest_paths_on_dag, m)?)?;
    m.add_function(wrap_pyfunction!(py_constrained_shortest_path_on_dag, m)?)?;
    m.add_function(wrap_pyfunction!(py_topological_sort, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_py_result_reports_truncation_and_statistics() {
        let arcs = vec![
            ArcWithLengthAndResources::new(0, 1, 2.0, vec![1.0]),
            ArcWithLengthAndResources::new(1, 2, 3.0, vec![1.0]),
        ];
        let result =
            constrained_shortest_path_on_dag(3, &arcs, 0, 2, &[2.0], Default::default()).unwrap();
        let wrapped = PyConstrainedPathResult::from(result);

        assert!(!wrapped.truncated);
        assert_eq!(wrapped.path.length, 5.0);
        assert_eq!(wrapped.statistics["reachable_nodes"], 3);
        assert_eq!(wrapped.statistics["reachable_arcs"], 2);
    }

    #[test]
    fn test_py_topological_sort_checks_range() {
        assert!(py_topological_sort(2, vec![(0, 5)]).is_err());
        assert_eq!(py_topological_sort(3, vec![(2, 0), (0, 1)]).unwrap(), vec![2, 0, 1]);
    }
}
