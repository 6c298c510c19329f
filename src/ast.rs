//! Filter expression tree.
//!
//! A parsed query is a [`FilterNode`]: `key:value` literals at the leaves,
//! combined by `AND`, `OR` and `NOT`.

use serde::Serialize;
use std::fmt;

/// A node of a parsed filter query.
///
/// The tree owns its children outright; every parse builds a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterNode {
    /// `key:value` predicate. The key is lowercase and known to the key set.
    Literal { key: String, value: String },
    /// Both sides must hold.
    And {
        left: Box<FilterNode>,
        right: Box<FilterNode>,
    },
    /// Either side must hold.
    Or {
        left: Box<FilterNode>,
        right: Box<FilterNode>,
    },
    /// The child must not hold.
    Not { child: Box<FilterNode> },
}

impl FilterNode {
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Literal {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: FilterNode, right: FilterNode) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: FilterNode) -> Self {
        Self::Not {
            child: Box::new(child),
        }
    }

    /// Number of literals in the tree.
    pub fn literal_count(&self) -> usize {
        match self {
            FilterNode::Literal { .. } => 1,
            FilterNode::And { left, right } | FilterNode::Or { left, right } => {
                left.literal_count() + right.literal_count()
            }
            FilterNode::Not { child } => child.literal_count(),
        }
    }

    /// Depth of the tree; a single literal has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::Literal { .. } => 1,
            FilterNode::And { left, right } | FilterNode::Or { left, right } => {
                1 + left.depth().max(right.depth())
            }
            FilterNode::Not { child } => 1 + child.depth(),
        }
    }
}

/// Fully bracketed debugging form, e.g. `(name:foo AND NOT tag:"a b")`.
///
/// This is not the round-trip form of a query; keep the raw text for that.
impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Literal { key, value } => {
                if value
                    .chars()
                    .any(|c| c.is_whitespace() || c == '(' || c == ')')
                {
                    write!(f, "{}:\"{}\"", key, value)
                } else {
                    write!(f, "{}:{}", key, value)
                }
            }
            FilterNode::And { left, right } => write!(f, "({} AND {})", left, right),
            FilterNode::Or { left, right } => write!(f, "({} OR {})", left, right),
            FilterNode::Not { child } => write!(f, "NOT {}", child),
        }
    }
}
