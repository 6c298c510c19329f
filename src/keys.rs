//! Filter key registry.
//!
//! The set of keys a query may use, each mapped to the record field it
//! filters on. Keys are matched case-insensitively and stored lowercase.

use std::collections::BTreeMap;

use crate::error::{FilterError, FilterResult};

/// Built-in mapping for service documents: `(filter key, record field)`.
pub const DEFAULT_KEYS: &[(&str, &str)] = &[
    ("name", "name"),
    ("tag", "tags"),
    ("owner", "owner"),
    ("lifecycle", "lifecycle"),
    ("system", "system"),
    ("description", "description"),
];

/// Allow-list of filter keys with their record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    fields: BTreeMap<String, String>,
}

impl KeySet {
    /// Build a key set from `(key, field)` pairs.
    ///
    /// Keys are lowercased. A later pair for the same key replaces an earlier one.
    pub fn new<I, K, F>(pairs: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = (K, F)>,
        K: AsRef<str>,
        F: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (key, field) in pairs {
            let key = key.as_ref();
            if !is_valid_key(key) {
                return Err(FilterError::InvalidKey(key.to_string()));
            }
            fields.insert(key.to_lowercase(), field.into());
        }
        Ok(Self { fields })
    }

    /// Build a key set where every key filters on the field of the same name.
    pub fn from_keys<I, K>(keys: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self::new(keys.into_iter().map(|k| {
            let field = k.as_ref().to_string();
            (k, field)
        }))
    }

    /// Whether `key` is allowed, ignoring case.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_lowercase())
    }

    /// Record field for `key`, ignoring case.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Lowercase keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(key, field)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self {
            fields: DEFAULT_KEYS
                .iter()
                .map(|(k, f)| (k.to_string(), f.to_string()))
                .collect(),
        }
    }
}

/// Characters a key token may contain in a query.
pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}
