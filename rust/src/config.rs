//! Configuration types for the resource-constrained planner.

use pyo3::prelude::*;

/// Default label budget: effectively unbounded.
pub const DEFAULT_MAX_NUM_CREATED_LABELS: usize = 1_000_000_000;

/// Configuration for the resource-constrained shortest path search.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstrainedPathConfig {
    /// Upper bound on labels created per run; each half gets half of it.
    /// Exhausting it makes the result best-effort.
    #[pyo3(get, set)]
    pub max_num_created_labels: usize,
    /// Search the two halves on separate threads.
    #[pyo3(get, set)]
    pub parallel: bool,
    /// Verbosity level: 0=silent, 1=summary, 2=phases, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for ConstrainedPathConfig {
    fn default() -> Self {
        Self {
            max_num_created_labels: DEFAULT_MAX_NUM_CREATED_LABELS,
            parallel: true,
            verbosity: 0,
        }
    }
}

impl ConstrainedPathConfig {
    /// Label budget of a single half.
    pub fn labels_per_half(&self) -> usize {
        self.max_num_created_labels / 2
    }
}

#[pymethods]
impl ConstrainedPathConfig {
    #[new]
    #[pyo3(signature = (max_num_created_labels=None, parallel=None, verbosity=None))]
    fn new(
        max_num_created_labels: Option<usize>,
        parallel: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            max_num_created_labels: max_num_created_labels
                .unwrap_or(defaults.max_num_created_labels),
            parallel: parallel.unwrap_or(defaults.parallel),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ConstrainedPathConfig(max_num_created_labels={}, parallel={}, verbosity={})",
            self.max_num_created_labels, self.parallel, self.verbosity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConstrainedPathConfig::default();
        assert_eq!(config.max_num_created_labels, DEFAULT_MAX_NUM_CREATED_LABELS);
        assert!(config.parallel);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_labels_per_half() {
        let config = ConstrainedPathConfig {
            max_num_created_labels: 9,
            ..Default::default()
        };
        assert_eq!(config.labels_per_half(), 4);
    }
}
