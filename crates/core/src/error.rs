//! Error types for model construction and stepping.

/// Errors that can abort a simulation run.
///
/// Newton non-convergence in the incision solver is deliberately *not* an
/// error: it is recovered locally with a bisection fallback and surfaced
/// through per-step diagnostics instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A configuration value was rejected before the run started.
    InvalidParameter(String),
    /// The receiver relation contains a cycle, violating the forest
    /// invariant the whole scheme depends on. Fatal.
    TopologyViolation {
        /// Cells reached by the traversal from the sink set.
        visited: usize,
        /// Total cells in the grid.
        cells: usize,
    },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            ModelError::TopologyViolation { visited, cells } => write!(
                f,
                "receiver relation is not a forest: traversal reached {visited} of {cells} cells"
            ),
        }
    }
}

impl std::error::Error for ModelError {}
