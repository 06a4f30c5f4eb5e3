//! Graph validation
//!
//! Checks the structural invariants passes rely on: every input resolves,
//! producers come before consumers, and the graph is acyclic.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::error::{GraphResult, TransformError};

use super::context::Graph;

/// Validation result with detailed issues
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid
    pub is_valid: bool,
    /// List of errors (critical issues)
    pub errors: Vec<String>,
    /// List of warnings (non-critical issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

impl Graph {
    /// Validate graph structure
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();

        let mut known: FxHashSet<&str> = self.inputs.iter().map(|vi| vi.name.as_str()).collect();

        for node in &self.nodes {
            if node.op_type.is_empty() {
                result.add_error(format!("Node '{}' has empty op_type", node.name));
            }

            for input in node.inputs.iter().filter(|i| !i.is_empty()) {
                if known.contains(input.as_str()) || node.is_literal(input) {
                    continue;
                }
                match self.producer_of(input) {
                    Some(producer) => result.add_error(format!(
                        "Node '{}' ({}): input '{}' is produced later by '{}'",
                        node.name,
                        node.op_type,
                        input,
                        self.node(producer).name
                    )),
                    None => result.add_error(format!(
                        "Node '{}' ({}): input '{}' not found",
                        node.name, node.op_type, input
                    )),
                }
            }

            if node.outputs.is_empty() {
                result.add_warning(format!(
                    "Node '{}' ({}) has no outputs",
                    node.name, node.op_type
                ));
            }
            known.extend(node.outputs.iter().map(|o| o.as_str()));
        }

        for output in &self.outputs {
            if !known.contains(output.name.as_str()) {
                result.add_error(format!(
                    "Graph output '{}' not produced by any node",
                    output.name
                ));
            }
        }

        let unsorted = self.count_unsortable();
        if unsorted > 0 {
            result.add_error(format!("Graph contains a cycle through {} nodes", unsorted));
        }

        result
    }

    /// Kahn's algorithm over parent/child sets; returns nodes left unsorted
    fn count_unsortable(&self) -> usize {
        let mut in_degree: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();
        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut visited = 0;

        while let Some(idx) = queue.pop_front() {
            visited += 1;
            for child in &self.children[idx] {
                in_degree[child.0] -= 1;
                if in_degree[child.0] == 0 {
                    queue.push_back(child.0);
                }
            }
        }

        self.nodes.len() - visited
    }
}

/// Quick validation that returns an error if invalid
pub fn check_graph(graph: &Graph) -> GraphResult<()> {
    let result = graph.validate();
    for warning in &result.warnings {
        log::warn!("{}", warning);
    }
    if result.is_valid {
        Ok(())
    } else {
        Err(TransformError::ValidationFailed(result.errors.join("; ")))
    }
}
