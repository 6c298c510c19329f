//! # catalog-filter
//!
//! Boolean filter queries over service catalog documents.
//!
//! A query is a list of `key:value` literals combined with `AND`, `OR` and
//! `NOT`, grouped with brackets. Writing two literals side by side means
//! `AND`.
//!
//! ## Quick Example
//!
//! ```
//! use catalog_filter::prelude::*;
//!
//! let keys = KeySet::default();
//! let tree = catalog_filter::parse("tag:payments NOT lifecycle:deprecated", &keys).unwrap();
//!
//! assert_eq!(
//!     tree,
//!     FilterNode::and(
//!         FilterNode::literal("tag", "payments"),
//!         FilterNode::not(FilterNode::literal("lifecycle", "deprecated")),
//!     )
//! );
//! ```
//!
//! ## Syntax
//!
//! | Form          | Meaning                              |
//! |---------------|--------------------------------------|
//! | `key:value`   | Field contains value                 |
//! | `key:"a b"`   | Quoted value, may contain spaces     |
//! | `a AND b`     | Both (same as `a b`)                 |
//! | `a OR b`      | Either                               |
//! | `NOT a`       | Negation                             |
//! | `( ... )`     | Grouping                             |

pub mod ast;
pub mod config;
pub mod error;
pub mod filter;
pub mod keys;
pub mod matcher;
pub mod parser;

pub mod prelude {
    pub use crate::ast::FilterNode;
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::filter::ActiveFilter;
    pub use crate::keys::KeySet;
    pub use crate::matcher::{Matches, Record, filter_records};
    pub use crate::parser::FilterParser;
}

/// Parse a filter query against the allowed keys.
///
/// # Example
///
/// ```
/// use catalog_filter::{keys::KeySet, parse};
///
/// let keys = KeySet::from_keys(["name", "tag"]).unwrap();
/// assert!(parse("name:foo OR tag:bar", &keys).is_ok());
/// assert!(parse("colour:red", &keys).is_err());
/// ```
pub fn parse(query: &str, keys: &keys::KeySet) -> Result<ast::FilterNode, error::InvalidQuery> {
    parser::parse(query, keys)
}
