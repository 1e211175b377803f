//! Argument maps supplied by the caller and forwarded between steps.
//!
//! An [`ArgMap`] is the variable environment for one template render. It is
//! immutable per render call: a sequence step that wants to reshape the
//! arguments for its templates derives a new map through a [`ForwardArgs`]
//! function and leaves the running map untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named arguments for a generation run.
///
/// ## Why `BTreeMap`?
///
/// Iteration order feeds the content fingerprint in the applied ledger, so
/// it must be deterministic across runs and platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgMap(BTreeMap<String, String>);

impl ArgMap {
    /// Create an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(name, value)` pairs.
    ///
    /// ```rust
    /// use graft_core::domain::ArgMap;
    ///
    /// let args = ArgMap::from_pairs([("entity", "Widget"), ("subdomain", "cms")]);
    /// assert_eq!(args.get("entity"), Some("Widget"));
    /// ```
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up an argument value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// `true` if the argument is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Fluent variant of [`insert`](Self::insert) for builder chains.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Derive a copy with every entry of `other` overlaid on `self`.
    pub fn merged(&self, other: &ArgMap) -> Self {
        let mut out = self.clone();
        for (k, v) in &other.0 {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ArgMap {
    /// Render as `{a=1, b=2}` for log lines and error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// Per-step argument transformation applied before a step's templates render.
///
/// Plain function pointers keep sequences `Copy`-friendly and trivially
/// comparable in tests; sequences are authored in code, so closures capturing
/// state have no use here.
pub type ForwardArgs = fn(&ArgMap) -> ArgMap;

/// The identity forwarding function: pass the running arguments through.
pub fn forward_all(args: &ArgMap) -> ArgMap {
    args.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_and_get() {
        let args = ArgMap::from_pairs([("entity", "Widget")]);
        assert_eq!(args.get("entity"), Some("Widget"));
        assert_eq!(args.get("missing"), None);
    }

    #[test]
    fn with_overrides_existing() {
        let args = ArgMap::new().with("k", "a").with("k", "b");
        assert_eq!(args.get("k"), Some("b"));
    }

    #[test]
    fn merged_overlays_other() {
        let base = ArgMap::from_pairs([("a", "1"), ("b", "2")]);
        let over = ArgMap::from_pairs([("b", "3")]);
        let merged = base.merged(&over);
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
    }

    #[test]
    fn display_is_key_ordered() {
        let args = ArgMap::from_pairs([("b", "2"), ("a", "1")]);
        assert_eq!(args.to_string(), "{a=1, b=2}");
    }

    #[test]
    fn forward_all_is_identity() {
        let args = ArgMap::from_pairs([("x", "y")]);
        assert_eq!(forward_all(&args), args);
    }
}
