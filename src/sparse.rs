//! SparseBag: presence-aware layer over [`PropertyBag`]
//!
//! A `SparseBag` treats empty stored values (zero, false, empty text or
//! collections; see [`Value::is_empty`]) the same as absent ones for
//! counting, containment, and enumeration. Nested containers are the
//! exception: a stored [`Value::Bag`] always counts as present, however
//! hollow.
//!
//! Reads and writes behave exactly like the base container; only the
//! set-shaped operations (`len`, `has`, `keys`, `values`, `items`,
//! equality, rendering) apply the emptiness filter.

use crate::bag::PropertyBag;
use crate::error::Result;
use crate::schema::Schema;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Presence-aware keyed container
///
/// # Example
///
/// ```
/// use slotbag::{Schema, SparseBag, Value};
/// use std::sync::Arc;
///
/// let schema = Arc::new(Schema::builder().keys(["name", "count"]).build().unwrap());
/// let mut bag = SparseBag::new(schema, [("name", Value::from("a"))]).unwrap();
///
/// assert_eq!(bag.len(), 1);
/// assert!(!bag.has("count"));
///
/// bag.set("count", 0).unwrap();
/// assert!(!bag.has("count"));                     // zero counts as absent
/// assert_eq!(bag.get("count").unwrap(), Value::Int(0)); // but reads fine
///
/// bag.set_if_value_present("count", 5).unwrap();
/// assert_eq!(bag.get("count").unwrap(), Value::Int(5));
/// assert_eq!(bag.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SparseBag {
    inner: PropertyBag,
}

impl SparseBag {
    /// Build a container and seed it with `pairs`
    ///
    /// Same construction contract as [`PropertyBag::new`].
    pub fn new<I, K, V>(schema: Arc<Schema>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Ok(SparseBag {
            inner: PropertyBag::new(schema, pairs)?,
        })
    }

    /// Build an unseeded container
    pub fn empty(schema: Arc<Schema>) -> Self {
        SparseBag {
            inner: PropertyBag::empty(schema),
        }
    }

    /// The underlying base container
    pub fn bag(&self) -> &PropertyBag {
        &self.inner
    }

    /// Unwrap into the base container
    pub fn into_inner(self) -> PropertyBag {
        self.inner
    }

    /// The shared schema handle
    pub fn schema(&self) -> &Arc<Schema> {
        self.inner.schema()
    }

    /// Whether construction has completed
    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    /// Read the value for `key` (see [`PropertyBag::get`])
    pub fn get(&self, key: &str) -> Result<Value> {
        self.inner.get(key)
    }

    /// Write `value` under `key` (see [`PropertyBag::set`])
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.inner.set(key, value)
    }

    /// Delete the value under `key` (see [`PropertyBag::del`])
    pub fn del(&mut self, key: &str) -> Result<()> {
        self.inner.del(key)
    }

    /// Raw store presence for `key`, without emptiness filtering
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    /// Presence check: stored and non-empty, or a nested container
    pub fn has(&self, key: &str) -> bool {
        match self.inner.stored(key) {
            // Nested containers always count, however hollow; this also
            // means the check never descends into them
            Some(Value::Bag(_)) => true,
            Some(value) => !value.is_empty(),
            None => false,
        }
    }

    /// Number of declared keys with a present value
    pub fn len(&self) -> usize {
        self.schema().keys().filter(|k| self.has(k)).count()
    }

    /// Whether no declared key holds a present value
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared keys with a present value, in declaration order
    pub fn keys(&self) -> Vec<&str> {
        self.inner
            .schema()
            .keys()
            .filter(|k| self.has(k))
            .collect()
    }

    /// Values for [`keys`](Self::keys), through the dispatched read path
    ///
    /// # Errors
    ///
    /// Propagates getter failures.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.keys().into_iter().map(|k| self.inner.get(k)).collect()
    }

    /// Present key/value pairs, through the dispatched read path
    ///
    /// # Errors
    ///
    /// Propagates getter failures.
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        self.keys()
            .into_iter()
            .map(|k| Ok((k.to_string(), self.inner.get(k)?)))
            .collect()
    }

    /// Write only when `key` currently has no present value
    ///
    /// # Errors
    ///
    /// Propagates the write failure when the write happens.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        if !self.has(key) {
            self.inner.set(key, value)?;
        }
        Ok(())
    }

    /// Write only when `value` itself is present (non-empty)
    ///
    /// # Errors
    ///
    /// Propagates the write failure when the write happens.
    pub fn set_if_value_present(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if !value.is_empty() {
            self.inner.set(key, value)?;
        }
        Ok(())
    }

    /// Copy by value (see [`PropertyBag::copy`])
    ///
    /// # Errors
    ///
    /// Propagates setter failures from the copy's construction.
    pub fn copy(&self) -> Result<Self> {
        Ok(SparseBag {
            inner: self.inner.copy()?,
        })
    }

    fn items_map(&self) -> Option<HashMap<String, Value>> {
        self.items().ok().map(|pairs| pairs.into_iter().collect())
    }
}

impl From<PropertyBag> for SparseBag {
    fn from(inner: PropertyBag) -> Self {
        SparseBag { inner }
    }
}

impl From<SparseBag> for Value {
    fn from(bag: SparseBag) -> Self {
        Value::from(bag.into_inner())
    }
}

// Containers compare as the mapping of their present items. A getter
// failure during enumeration compares unequal.
impl PartialEq for SparseBag {
    fn eq(&self, other: &Self) -> bool {
        match (self.items_map(), other.items_map()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<HashMap<String, Value>> for SparseBag {
    fn eq(&self, other: &HashMap<String, Value>) -> bool {
        self.items_map().map_or(false, |m| m == *other)
    }
}

impl PartialEq<SparseBag> for HashMap<String, Value> {
    fn eq(&self, other: &SparseBag) -> bool {
        other == self
    }
}

// Mapping-literal rendering of present items with printable values
// (text, integer, float, boolean). Everything else is omitted, as are
// keys whose getter fails.
impl fmt::Display for SparseBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for key in self.keys() {
            let value = match self.inner.get(key) {
                Ok(v) => v,
                Err(_) => continue,
            };
            let rendered = match value {
                Value::String(s) => format!("{s:?}"),
                Value::Int(i) => i.to_string(),
                Value::Float(x) => format!("{x:?}"),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{key:?}: {rendered}")?;
        }
        write!(f, "}}")
    }
}
