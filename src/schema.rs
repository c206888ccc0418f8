//! Schema declaration for slot containers
//!
//! A [`Schema`] fixes the set of keys a container may ever hold and
//! binds optional per-key accessor overrides. It is built once through
//! [`SchemaBuilder`], validated at build time, and shared between
//! container instances as `Arc<Schema>`; instances never mutate it.
//!
//! ## Accessor table
//!
//! Accessors are plain `fn` pointers resolved into a per-key table when
//! the schema is built. Dispatch on get/set/del is a table lookup, never
//! a name-based search. An accessor bound to an undeclared key extends
//! the permitted set with that key (the key becomes reachable through
//! its accessors and raw writes, but is invisible to declared-key
//! enumeration).

use crate::bag::Slots;
use crate::error::{Result, SchemaError};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Getter override: computes the value returned for its key
pub type Getter = fn(&Slots) -> Result<Value>;

/// Setter override: intercepts writes for its key
pub type Setter = fn(&mut Slots, Value) -> Result<()>;

/// Deleter override: intercepts deletes for its key
pub type Deleter = fn(&mut Slots) -> Result<()>;

/// The accessor overrides bound to a single key
#[derive(Debug, Clone, Copy, Default)]
pub struct Accessors {
    /// Getter override, if bound
    pub get: Option<Getter>,
    /// Setter override, if bound
    pub set: Option<Setter>,
    /// Deleter override, if bound
    pub del: Option<Deleter>,
}

impl Accessors {
    fn is_bound(&self) -> bool {
        self.get.is_some() || self.set.is_some() || self.del.is_some()
    }
}

/// Fixed key set and accessor table shared by container instances
///
/// # Example
///
/// ```
/// use slotbag::{Schema, Slots, Result, Value};
///
/// fn get_label(slots: &Slots) -> Result<Value> {
///     let name = slots.raw_get("name")?.clone();
///     Ok(match name {
///         Value::String(s) => Value::String(format!("nic/{s}")),
///         other => other,
///     })
/// }
///
/// let schema = Schema::builder()
///     .key("name")
///     .key("label")
///     .getter("label", get_label)
///     .build()
///     .unwrap();
/// assert!(schema.permits("label"));
/// assert!(!schema.permits("mtu"));
/// ```
pub struct Schema {
    /// Declared keys in declaration order
    keys: Vec<String>,
    /// Per-key accessor table
    accessors: HashMap<String, Accessors>,
}

impl Schema {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            keys: Vec::new(),
            accessors: HashMap::new(),
        }
    }

    /// Declared keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Number of declared keys
    pub fn declared_len(&self) -> usize {
        self.keys.len()
    }

    /// Whether `key` is declared in the key set
    pub fn declares(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Whether `key` is reachable at all: declared, or bound to at
    /// least one accessor
    pub fn permits(&self, key: &str) -> bool {
        self.declares(key) || self.accessors.contains_key(key)
    }

    /// The accessor table entry for `key` (all `None` when unbound)
    pub fn accessors(&self, key: &str) -> Accessors {
        self.accessors.get(key).copied().unwrap_or_default()
    }

    pub(crate) fn key_list(&self) -> &[String] {
        &self.keys
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("keys", &self.keys)
            .field("accessor_keys", &{
                let mut bound: Vec<&str> = self.accessors.keys().map(String::as_str).collect();
                bound.sort_unstable();
                bound
            })
            .finish()
    }
}

/// Builder for [`Schema`]
///
/// Collects declared keys and accessor bindings, then validates the
/// whole declaration in [`build`](SchemaBuilder::build).
pub struct SchemaBuilder {
    keys: Vec<String>,
    accessors: HashMap<String, Accessors>,
}

impl SchemaBuilder {
    /// Declare a key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Declare several keys at once, preserving order
    pub fn keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Bind a getter override to `key`
    pub fn getter(mut self, key: impl Into<String>, f: Getter) -> Self {
        self.accessors.entry(key.into()).or_default().get = Some(f);
        self
    }

    /// Bind a setter override to `key`
    pub fn setter(mut self, key: impl Into<String>, f: Setter) -> Self {
        self.accessors.entry(key.into()).or_default().set = Some(f);
        self
    }

    /// Bind a deleter override to `key`
    pub fn deleter(mut self, key: impl Into<String>, f: Deleter) -> Self {
        self.accessors.entry(key.into()).or_default().del = Some(f);
        self
    }

    /// Validate the declaration and produce the schema
    ///
    /// # Errors
    ///
    /// - [`SchemaError::EmptySchema`] when no keys are declared and no
    ///   accessors are bound
    /// - [`SchemaError::DuplicateKey`] when a key is declared twice
    pub fn build(self) -> std::result::Result<Schema, SchemaError> {
        if self.keys.is_empty() && !self.accessors.values().any(Accessors::is_bound) {
            return Err(SchemaError::EmptySchema);
        }
        for (i, key) in self.keys.iter().enumerate() {
            if self.keys[..i].contains(key) {
                return Err(SchemaError::DuplicateKey { key: key.clone() });
            }
        }
        let schema = Schema {
            keys: self.keys,
            accessors: self.accessors,
        };
        debug!(keys = ?schema.keys, "property schema registered");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn get_fixed(_slots: &Slots) -> Result<Value> {
        Ok(Value::Int(7))
    }

    fn set_store(slots: &mut Slots, value: Value) -> Result<()> {
        slots.raw_set("stored", value);
        Ok(())
    }

    fn del_noop(_slots: &mut Slots) -> Result<()> {
        Ok(())
    }

    #[test]
    fn test_builder_declares_keys_in_order() {
        let schema = Schema::builder()
            .key("b")
            .keys(["a", "c"])
            .build()
            .unwrap();
        let keys: Vec<&str> = schema.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(schema.declared_len(), 3);
    }

    #[test]
    fn test_empty_schema_rejected() {
        let result = Schema::builder().build();
        assert_eq!(result.unwrap_err(), SchemaError::EmptySchema);
    }

    #[test]
    fn test_accessor_only_schema_accepted() {
        let schema = Schema::builder().getter("virtual", get_fixed).build().unwrap();
        assert!(schema.permits("virtual"));
        assert!(!schema.declares("virtual"));
        assert_eq!(schema.declared_len(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = Schema::builder().key("name").key("name").build();
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateKey { key }) if key == "name"
        ));
    }

    #[test]
    fn test_permits_declared_and_accessor_keys() {
        let schema = Schema::builder()
            .key("plain")
            .setter("intercepted", set_store)
            .build()
            .unwrap();
        assert!(schema.permits("plain"));
        assert!(schema.permits("intercepted"));
        assert!(!schema.permits("other"));
    }

    #[test]
    fn test_accessor_table_lookup() {
        let schema = Schema::builder()
            .key("k")
            .getter("k", get_fixed)
            .deleter("k", del_noop)
            .build()
            .unwrap();

        let acc = schema.accessors("k");
        assert!(acc.get.is_some());
        assert!(acc.set.is_none());
        assert!(acc.del.is_some());

        let unbound = schema.accessors("plain");
        assert!(unbound.get.is_none() && unbound.set.is_none() && unbound.del.is_none());
    }

    #[test]
    fn test_getter_fn_is_callable_through_table() {
        let schema = Schema::builder().getter("seven", get_fixed).build().unwrap();
        let slots = Slots::detached();
        let got = (schema.accessors("seven").get.unwrap())(&slots).unwrap();
        assert_eq!(got, Value::Int(7));
    }

    #[test]
    fn test_debug_output_lists_keys() {
        let schema = Schema::builder()
            .key("name")
            .getter("label", get_fixed)
            .build()
            .unwrap();
        let debug = format!("{:?}", schema);
        assert!(debug.contains("name"));
        assert!(debug.contains("label"));
    }

    #[test]
    fn test_accessor_errors_propagate() {
        fn get_fails(_slots: &Slots) -> Result<Value> {
            Err(Error::missing("backing"))
        }
        let schema = Schema::builder().getter("k", get_fails).build().unwrap();
        let slots = Slots::detached();
        let err = (schema.accessors("k").get.unwrap())(&slots).unwrap_err();
        assert_eq!(err, Error::missing("backing"));
    }
}
