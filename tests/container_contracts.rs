//! Container contract tests
//!
//! Cross-module checks of the keyed-access contract:
//! - accessor precedence over the backing store
//! - permission vs missing-value error selection
//! - construction ordering and the initialization flag
//! - copy-by-value semantics
//! - presence-aware counting, enumeration, equality, and rendering
//! - conditional writes

use once_cell::sync::Lazy;
use proptest::prelude::*;
use slotbag::{Error, PropertyBag, Result, Schema, Slots, SparseBag, Value};
use std::collections::HashMap;
use std::sync::Arc;

static NIC_SCHEMA: Lazy<Arc<Schema>> =
    Lazy::new(|| Arc::new(Schema::builder().keys(["name", "count"]).build().unwrap()));

fn get_name_decorated(slots: &Slots) -> Result<Value> {
    let stored = slots.raw_get("name")?;
    match stored {
        Value::String(s) => Ok(Value::String(format!("nic:{s}"))),
        other => Ok(other.clone()),
    }
}

fn set_count_records_phase(slots: &mut Slots, value: Value) -> Result<()> {
    // Remembers under "name" whether this write happened during
    // construction, so tests can observe the lifecycle flag
    slots.raw_set("name", Value::Bool(slots.is_initialized()));
    slots.raw_set("count", value);
    Ok(())
}

fn set_count_sees_name(slots: &mut Slots, _value: Value) -> Result<()> {
    // Stores whether "name" was already seeded when this ran
    slots.raw_set("count", Value::Bool(slots.raw_contains("name")));
    Ok(())
}

// ============================================================================
// Error selection
// ============================================================================

#[test]
fn undeclared_key_rejected_on_every_path() {
    let mut bag = PropertyBag::empty(Arc::clone(&NIC_SCHEMA));
    assert_eq!(bag.get("duplex").unwrap_err(), Error::undeclared("duplex"));
    assert_eq!(
        bag.set("duplex", 1).unwrap_err(),
        Error::undeclared("duplex")
    );
    assert_eq!(bag.del("duplex").unwrap_err(), Error::undeclared("duplex"));
}

#[test]
fn permitted_but_absent_is_missing_value() {
    let mut bag = PropertyBag::empty(Arc::clone(&NIC_SCHEMA));
    assert_eq!(bag.get("count").unwrap_err(), Error::missing("count"));
    assert_eq!(bag.del("count").unwrap_err(), Error::missing("count"));
}

// ============================================================================
// Accessor precedence
// ============================================================================

#[test]
fn getter_always_wins_over_stored_value() {
    let schema = Arc::new(
        Schema::builder()
            .keys(["name", "count"])
            .getter("name", get_name_decorated)
            .build()
            .unwrap(),
    );
    let mut bag = PropertyBag::empty(schema);
    bag.set("name", "eth0").unwrap();
    assert_eq!(bag.get("name").unwrap(), Value::String("nic:eth0".into()));
}

#[test]
fn setter_intercepts_seed_and_later_writes() {
    let schema = Arc::new(
        Schema::builder()
            .keys(["name", "count"])
            .setter("count", set_count_records_phase)
            .build()
            .unwrap(),
    );

    // Seed write runs before initialization completes
    let bag = PropertyBag::new(Arc::clone(&schema), [("count", 1)]).unwrap();
    assert_eq!(bag.get("name").unwrap(), Value::Bool(false));

    // The same write after construction sees the flag set
    let mut bag = PropertyBag::empty(schema);
    bag.set("count", 1).unwrap();
    assert_eq!(bag.get("name").unwrap(), Value::Bool(true));
}

#[test]
fn construction_applies_pairs_in_declared_order() {
    let schema = Arc::new(
        Schema::builder()
            .keys(["name", "count"])
            .setter("count", set_count_sees_name)
            .build()
            .unwrap(),
    );
    // "name" is declared first, so it is already stored when the
    // "count" setter runs, regardless of pair order
    let bag = PropertyBag::new(
        schema,
        [("count", Value::Int(1)), ("name", Value::from("eth0"))],
    )
    .unwrap();
    assert_eq!(bag.get("count").unwrap(), Value::Bool(true));
}

// ============================================================================
// Copy semantics
// ============================================================================

#[test]
fn copy_is_equal_but_independent() {
    let mut original =
        SparseBag::new(Arc::clone(&NIC_SCHEMA), [("name", Value::from("a"))]).unwrap();
    let copy = original.copy().unwrap();
    assert_eq!(original, copy);

    original.set("name", "b").unwrap();
    assert_ne!(original, copy);
    assert_eq!(copy.get("name").unwrap(), Value::String("a".into()));
}

#[test]
fn copy_reseeds_through_setters() {
    let schema = Arc::new(
        Schema::builder()
            .keys(["name", "count"])
            .setter("count", set_count_records_phase)
            .build()
            .unwrap(),
    );
    let mut bag = PropertyBag::empty(schema);
    bag.set("count", 7).unwrap();
    assert_eq!(bag.get("name").unwrap(), Value::Bool(true));

    // The copy's seed writes run during its construction
    let copy = bag.copy().unwrap();
    assert_eq!(copy.get("name").unwrap(), Value::Bool(false));
}

// ============================================================================
// Presence-aware layer
// ============================================================================

#[test]
fn counting_treats_zero_as_absent() {
    let mut c = SparseBag::new(Arc::clone(&NIC_SCHEMA), [("name", Value::from("a"))]).unwrap();
    assert_eq!(c.len(), 1);
    assert!(!c.has("count"));

    c.set("count", 0).unwrap();
    assert!(!c.has("count"));
    assert_eq!(c.get("count").unwrap(), Value::Int(0));

    c.set_if_value_present("count", 5).unwrap();
    assert_eq!(c.get("count").unwrap(), Value::Int(5));
    assert_eq!(c.len(), 2);
}

#[test]
fn set_if_absent_is_noop_when_present() {
    let mut c = SparseBag::new(Arc::clone(&NIC_SCHEMA), [("name", Value::from("a"))]).unwrap();
    c.set_if_absent("name", "b").unwrap();
    assert_eq!(c.get("name").unwrap(), Value::String("a".into()));
}

#[test]
fn mapping_equality_both_directions() {
    let mut c = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
    c.set("name", "a").unwrap();
    c.set("count", 0).unwrap();

    let mut expected = HashMap::new();
    expected.insert("name".to_string(), Value::String("a".into()));
    assert_eq!(c, expected);
    assert_eq!(expected, c);
}

#[test]
fn nested_container_always_present() {
    let inner = PropertyBag::empty(Arc::clone(&NIC_SCHEMA));
    let mut c = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
    c.set("count", inner).unwrap();
    assert!(c.has("count"));
    assert_eq!(c.len(), 1);
    // and stays out of the rendered mapping (not a printable primitive)
    assert_eq!(c.to_string(), "{}");
}

#[test]
fn rendering_matches_present_primitives() {
    let mut c = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
    c.set("name", "a").unwrap();
    c.set("count", 5).unwrap();
    assert_eq!(c.to_string(), r#"{"name": "a", "count": 5}"#);
}

#[test]
fn rebuild_from_items_is_equal() {
    let mut c = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
    c.set("name", "a").unwrap();
    c.set("count", 2).unwrap();
    let rebuilt = SparseBag::new(Arc::clone(c.schema()), c.items().unwrap()).unwrap();
    assert_eq!(c, rebuilt);
}

// ============================================================================
// Property tests
// ============================================================================

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        // Finite range keeps NaN out so equality assertions hold
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        ".{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
    ]
}

proptest! {
    #[test]
    fn prop_set_then_get_is_identity(v in scalar_value()) {
        let mut bag = PropertyBag::empty(Arc::clone(&NIC_SCHEMA));
        bag.set("name", v.clone()).unwrap();
        prop_assert_eq!(bag.get("name").unwrap(), v);
    }

    #[test]
    fn prop_len_agrees_with_has_and_keys(a in scalar_value(), b in scalar_value()) {
        let mut bag = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
        bag.set("name", a).unwrap();
        bag.set("count", b).unwrap();
        let by_has = ["name", "count"].iter().filter(|k| bag.has(k)).count();
        prop_assert_eq!(bag.len(), by_has);
        prop_assert_eq!(bag.keys().len(), by_has);
    }

    #[test]
    fn prop_rebuild_from_items_is_equal(a in scalar_value(), b in scalar_value()) {
        let mut bag = SparseBag::empty(Arc::clone(&NIC_SCHEMA));
        bag.set("name", a).unwrap();
        bag.set("count", b).unwrap();
        let rebuilt = SparseBag::new(Arc::clone(bag.schema()), bag.items().unwrap()).unwrap();
        prop_assert!(bag == rebuilt);
    }
}
