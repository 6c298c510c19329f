//! The filter currently applied by a caller.
//!
//! Keeps the text the user typed next to its tree, so the exact query can be
//! shown again. A query that fails to parse leaves the previous filter alone.

use crate::ast::FilterNode;
use crate::error::InvalidQuery;
use crate::keys::KeySet;
use crate::matcher::{Matches, Record};
use crate::parser::FilterParser;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Applied {
    raw: String,
    root: FilterNode,
}

/// An optional filter together with its raw query text.
#[derive(Debug, Clone, Default)]
pub struct ActiveFilter {
    current: Option<Applied>,
}

impl ActiveFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `query` and make it the active filter.
    ///
    /// On failure the previous filter stays active.
    pub fn apply(
        &mut self,
        parser: &FilterParser,
        query: &str,
    ) -> Result<&FilterNode, InvalidQuery> {
        let root = parser.parse(query)?;
        let applied = self.current.insert(Applied {
            raw: query.to_string(),
            root,
        });
        Ok(&applied.root)
    }

    /// Like [`apply`](Self::apply), but a blank query clears the filter.
    pub fn apply_or_clear(
        &mut self,
        parser: &FilterParser,
        query: &str,
    ) -> Result<Option<&FilterNode>, InvalidQuery> {
        if query.trim().is_empty() {
            self.clear();
            return Ok(None);
        }
        self.apply(parser, query).map(Some)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// The query exactly as it was typed.
    pub fn raw(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.raw.as_str())
    }

    pub fn root(&self) -> Option<&FilterNode> {
        self.current.as_ref().map(|a| &a.root)
    }

    /// Whether `record` passes; everything passes when no filter is active.
    pub fn matches<R: Record + ?Sized>(&self, record: &R, keys: &KeySet) -> bool {
        self.root().is_none_or(|root| root.matches(record, keys))
    }
}
