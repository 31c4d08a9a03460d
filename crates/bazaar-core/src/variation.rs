//! # Variation Signatures
//!
//! A shopper picks a product variation as a set of attribute choices
//! (`size: M`, `color: blue`). Two picks are the same variation when the
//! sets are equal, regardless of the order the caller listed them in.
//!
//! Cart line identity is `(user, product, variation)`, and the variation
//! component is stored as a canonical string so the database can compare
//! and index it. Canonical form is JSON with keys in sorted order.
//!
//! ```text
//! {"color":"blue","size":"M"}  ◄── canonical
//! {"size":"M","color":"blue"}  ◄── same pick, never stored
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A product variation pick: attribute name to chosen value.
///
/// Backed by a `BTreeMap` so iteration (and therefore serialization) is
/// always in sorted key order. Serialization of this type IS the canonical
/// signature; there is no second normalization step to keep in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variation(BTreeMap<String, String>);

impl Variation {
    /// An empty variation (product without options).
    pub fn new() -> Self {
        Variation(BTreeMap::new())
    }

    /// Sets one attribute choice, replacing any previous value.
    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.0.insert(attribute.into(), value.into());
    }

    /// Number of chosen attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attributes are chosen.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates attribute/value pairs in sorted attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the canonical signature: JSON with sorted keys.
    ///
    /// The empty variation renders as `{}`, so every line has a non-null
    /// signature and the identity index never has to treat NULL specially.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::variation::Variation;
    ///
    /// let mut pick = Variation::new();
    /// pick.set("size", "M");
    /// pick.set("color", "blue");
    ///
    /// assert_eq!(pick.signature(), r#"{"color":"blue","size":"M"}"#);
    /// ```
    pub fn signature(&self) -> String {
        // String-to-string maps cannot fail to serialize
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Parses a stored signature back into a variation.
    ///
    /// Returns `None` for malformed signatures; callers render those as
    /// an empty pick rather than failing the whole cart view.
    pub fn from_signature(signature: &str) -> Option<Variation> {
        serde_json::from_str(signature).ok()
    }
}

impl From<BTreeMap<String, String>> for Variation {
    fn from(map: BTreeMap<String, String>) -> Self {
        Variation(map)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
