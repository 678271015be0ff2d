//! Core types for the bridge.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Opaque identifier for one live subscription.
///
/// Allocated strictly increasing from 0 for the lifetime of the process
/// and never reused after removal. Carries no meaning beyond being a
/// lookup key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub u64);

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a subscription is listening to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerKind {
    /// A single document path.
    Document,
    /// A collection query.
    Query,
}

/// Sort direction for an ordered query.
///
/// The wire protocol only ever requests the default today; descending
/// exists so the query description is complete for the store client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A comparison value for query bounds and equality filters.
///
/// The external store accepts exactly three scalar kinds for
/// comparisons. Anything that is neither boolean nor string is coerced
/// to `f64` upstream (see [`crate::query::translate`]).
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Str(String),
    Number(f64),
}

/// Primary ordering of a query.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A range endpoint for an ordered query.
///
/// `key` scopes the bound to a document key (a compound bound); when
/// absent the bound applies to the primary ordered field.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    pub value: ScalarValue,
    pub key: Option<String>,
}

/// An equality filter on a single field.
#[derive(Clone, Debug, PartialEq)]
pub struct EqualityFilter {
    pub field: String,
    pub value: ScalarValue,
}

/// A fully translated query, ready for the external store client.
///
/// Built once per listen command by [`crate::query::translate`] and
/// immutable thereafter. How bounds and filters combine is the store's
/// business, not ours; no cross-field validation happens here.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDescription {
    pub collection_path: String,
    pub order_by: Option<OrderBy>,
    pub start_bound: Option<Bound>,
    pub end_bound: Option<Bound>,
    pub equality_filter: Option<EqualityFilter>,
    pub limit: Option<u64>,
}

impl QueryDescription {
    /// A bare query over a collection, no refinements.
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            collection_path: path.into(),
            order_by: None,
            start_bound: None,
            end_bound: None,
            equality_filter: None,
            limit: None,
        }
    }
}

/// One field value inside a document body.
///
/// `Reference` points at another document instead of holding inline
/// data. References are not wire-representable; top-level ones are
/// rewritten to their path string before serialization
/// ([`DocumentBody::sanitize_references`]).
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<FieldValue>),
    Map(DocumentBody),
    Reference(String),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Str(s) => serializer.serialize_str(s),
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Map(body) => body.serialize(serializer),
            // A nested reference that survived sanitization still
            // degrades to its path rather than failing the encode.
            FieldValue::Reference(path) => serializer.serialize_str(path),
        }
    }
}

/// An insertion-ordered field map for one document.
///
/// Field order matters on the wire (it mirrors whatever the store
/// client reported), so this is a plain pair list rather than a hash
/// map.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DocumentBody(Vec<(String, FieldValue)>);

impl DocumentBody {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, keeping insertion order.
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.push((field.into(), value));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    /// Look up a field by name (first match).
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Rewrite every top-level reference value to its path string.
    ///
    /// Scans top-level fields only, not nested maps or arrays; that is
    /// the legacy contract this bridge preserves, not an oversight.
    /// Idempotent: a body with no references is left untouched.
    pub fn sanitize_references(&mut self) {
        for (_, value) in &mut self.0 {
            if let FieldValue::Reference(path) = value {
                *value = FieldValue::Str(std::mem::take(path));
            }
        }
    }
}

impl Serialize for DocumentBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in &self.0 {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, FieldValue)> for DocumentBody {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What happened to one document between two consecutive query
/// snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}
