use std::fmt;

use crate::ast::{Node, Step};

/// A parsed query pipeline.
///
/// `Root` followed by zero or more path steps, optionally terminated by a
/// single comparison or condition. Built once by the parser and never
/// mutated afterwards; alias expansion produces a new `Query`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    steps: Vec<Step>,
}

impl Query {
    /// Wraps a step list. The first step must be `Node::Root`.
    pub(crate) fn from_steps(steps: Vec<Step>) -> Self {
        debug_assert!(matches!(steps.first(), Some(Step { node: Node::Root, .. })));
        Query { steps }
    }

    /// All steps including the leading `Root`.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The trailing comparison or condition, if the query has one.
    pub fn condition(&self) -> Option<&Node> {
        self.steps
            .last()
            .map(|step| &step.node)
            .filter(|node| node.is_condition())
    }

    /// True when the query ends in a comparison or condition.
    pub fn is_predicate(&self) -> bool {
        self.condition().is_some()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            if step.node.is_condition() {
                write!(f, " {}", step.node)?;
            } else {
                write!(f, "{}", step.node)?;
            }
        }
        Ok(())
    }
}
