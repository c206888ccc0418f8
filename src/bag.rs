//! PropertyBag: keyed container over a fixed, schema-declared key set
//!
//! ## Design
//!
//! A `PropertyBag` owns a backing store (`Slots`) and a shared schema
//! handle. Every keyed operation resolves against the schema first:
//! accessor overrides intercept the operation, undeclared keys are
//! rejected, and only then does the backing store get touched.
//!
//! ## Access paths
//!
//! - **Dispatched**: `get` / `set` / `del` on the bag. Schema-checked,
//!   accessor overrides fire. This is the only public mutation path.
//! - **Raw**: `raw_get` / `raw_set` / `raw_del` on [`Slots`].
//!   Unconditional, no schema check, no dispatch. Handed to accessor
//!   functions so they can reach the store without re-entering
//!   dispatch.
//!
//! ## Lifecycle
//!
//! Construction applies the supplied pairs through the dispatched write
//! path, so setter overrides run for seed values too. The `initialized`
//! flag stays false until every pair has been applied; accessors can
//! branch on it to defer work that only makes sense on a fully built
//! container (validation against sibling keys, for instance).

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Raw backing store of a container: slot values plus the lifecycle flag
///
/// Accessor functions receive this view. Its operations are
/// unconditional: no schema check, no accessor dispatch. Outside of
/// accessors it only escapes read-only.
#[derive(Clone, Debug, Default)]
pub struct Slots {
    values: HashMap<String, Value>,
    initialized: bool,
}

impl Slots {
    fn new() -> Self {
        Slots {
            values: HashMap::new(),
            initialized: false,
        }
    }

    /// Standalone slots view, marked initialized
    ///
    /// For exercising accessor functions directly, outside a container
    /// (unit tests, mostly).
    pub fn detached() -> Self {
        Slots {
            values: HashMap::new(),
            initialized: true,
        }
    }

    /// Whether the owning container has finished construction
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Read a stored value unconditionally
    ///
    /// # Errors
    ///
    /// [`Error::ValueMissing`] when no value is stored under `key`.
    pub fn raw_get(&self, key: &str) -> Result<&Value> {
        self.values.get(key).ok_or_else(|| Error::missing(key))
    }

    /// Store a value unconditionally, overwriting any prior value
    pub fn raw_set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Remove a stored value unconditionally, returning it
    ///
    /// # Errors
    ///
    /// [`Error::ValueMissing`] when no value is stored under `key`.
    pub fn raw_del(&mut self, key: &str) -> Result<Value> {
        self.values.remove(key).ok_or_else(|| Error::missing(key))
    }

    /// Whether a value is stored under `key`
    pub fn raw_contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Keyed container over a fixed, schema-declared key set
///
/// Values are read, written, and deleted through one dispatched path;
/// per-key accessor overrides from the schema intercept the matching
/// operation. Keys outside the schema's permitted set are rejected on
/// every access.
///
/// # Example
///
/// ```
/// use slotbag::{PropertyBag, Schema, Value};
/// use std::sync::Arc;
///
/// let schema = Arc::new(Schema::builder().keys(["name", "mtu"]).build().unwrap());
/// let mut bag = PropertyBag::new(Arc::clone(&schema), [("name", "eth0")]).unwrap();
///
/// bag.set("mtu", 1500).unwrap();
/// assert_eq!(bag.get("mtu").unwrap(), Value::Int(1500));
/// assert!(bag.set("duplex", "full").is_err());
/// ```
#[derive(Clone)]
pub struct PropertyBag {
    schema: Arc<Schema>,
    slots: Slots,
}

impl PropertyBag {
    /// Build a container and seed it with `pairs`
    ///
    /// Pairs naming declared keys are applied through the dispatched
    /// write path in schema declaration order, so setter overrides run
    /// during construction. Pairs naming undeclared keys are ignored.
    /// The container reports `is_initialized() == false` to accessors
    /// until every pair has been applied.
    ///
    /// # Errors
    ///
    /// Propagates the first setter failure. The partially seeded
    /// container is dropped; no partially constructed value escapes.
    pub fn new<I, K, V>(schema: Arc<Schema>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut seed: HashMap<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut bag = PropertyBag {
            schema: Arc::clone(&schema),
            slots: Slots::new(),
        };
        for key in schema.keys() {
            if let Some(value) = seed.remove(key) {
                bag.set(key, value)?;
            }
        }
        bag.slots.initialized = true;
        Ok(bag)
    }

    /// Build an unseeded container
    pub fn empty(schema: Arc<Schema>) -> Self {
        let mut slots = Slots::new();
        slots.initialized = true;
        PropertyBag { schema, slots }
    }

    /// The shared schema handle
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether construction has completed
    pub fn is_initialized(&self) -> bool {
        self.slots.is_initialized()
    }

    /// Read the value for `key`
    ///
    /// A getter override always wins, even when a raw value is also
    /// stored under the key.
    ///
    /// # Errors
    ///
    /// - [`Error::UndeclaredKey`] when `key` is outside the permitted
    ///   set
    /// - [`Error::ValueMissing`] when `key` is permitted but holds no
    ///   value
    pub fn get(&self, key: &str) -> Result<Value> {
        if let Some(getter) = self.schema.accessors(key).get {
            return getter(&self.slots);
        }
        if !self.schema.permits(key) {
            return Err(Error::undeclared(key));
        }
        self.slots.raw_get(key).cloned()
    }

    /// Write `value` under `key`
    ///
    /// # Errors
    ///
    /// [`Error::UndeclaredKey`] when `key` is outside the permitted
    /// set; otherwise whatever a setter override returns.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        if !self.schema.permits(key) {
            return Err(Error::undeclared(key));
        }
        let value = value.into();
        match self.schema.accessors(key).set {
            Some(setter) => setter(&mut self.slots, value),
            None => {
                self.slots.raw_set(key, value);
                Ok(())
            }
        }
    }

    /// Delete the value under `key`
    ///
    /// # Errors
    ///
    /// - [`Error::UndeclaredKey`] when `key` is outside the permitted
    ///   set
    /// - [`Error::ValueMissing`] when `key` is permitted but holds no
    ///   value
    pub fn del(&mut self, key: &str) -> Result<()> {
        if let Some(deleter) = self.schema.accessors(key).del {
            return deleter(&mut self.slots);
        }
        if !self.schema.permits(key) {
            return Err(Error::undeclared(key));
        }
        self.slots.raw_del(key).map(|_| ())
    }

    /// Whether a value is stored under `key`
    ///
    /// Raw store presence: no accessor dispatch, no emptiness
    /// filtering.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.raw_contains(key)
    }

    /// Stored declared keys and their values, in declaration order
    ///
    /// Raw store view: getter overrides do not fire, and values stored
    /// under accessor-only (undeclared) keys are not included.
    pub fn stored_entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .keys()
            .filter_map(move |k| self.slots.values.get(k).map(|v| (k, v)))
    }

    /// Copy by value: a fresh container of the same schema, seeded from
    /// the current raw pairs
    ///
    /// Setter overrides run again during the copy's construction.
    /// Values stored under accessor-only keys do not survive (seeding
    /// applies declared keys only).
    ///
    /// # Errors
    ///
    /// Propagates setter failures from the copy's construction.
    pub fn copy(&self) -> Result<Self> {
        let pairs: Vec<(String, Value)> = self
            .slots
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        PropertyBag::new(Arc::clone(&self.schema), pairs)
    }

    pub(crate) fn stored(&self, key: &str) -> Option<&Value> {
        self.slots.values.get(key)
    }
}

// Equal when the declared key sets match and the raw stores hold the
// same values. Accessor tables are not compared (fn pointers carry no
// useful equality).
impl PartialEq for PropertyBag {
    fn eq(&self, other: &Self) -> bool {
        self.schema.key_list() == other.schema.key_list() && self.slots.values == other.slots.values
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("keys", &self.schema.key_list())
            .field("values", &self.slots.values)
            .field("initialized", &self.slots.initialized)
            .finish()
    }
}
