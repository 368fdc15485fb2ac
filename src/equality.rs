//! Deep-equality collaborators used to decide whether a `set` is a change.
//!
//! Stores compare with [`PartialEq`] by default, which for derived
//! implementations is already a structural, content-based comparison over
//! nested containers. For dynamically shaped state the crate also offers a
//! JSON-tree comparison, where numbers are compared by value regardless of
//! their integer or float representation (`1 == 1.0`), and object keys are
//! compared without regard to order.
//!
//! `PartialEq` is not reflexive for floats: a store holding `f64::NAN` would
//! treat every `set(f64::NAN)` as a change. [`reflexive_eq`] restores
//! reflexivity for scalar floats, and [`serialized_eq`] maps non-finite floats
//! to `null`, so two NaNs in composite state compare equal there.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::Result;

/// Structural equality through [`PartialEq`].
pub fn structural_eq<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    a == b
}

/// [`PartialEq`] that also treats two values unequal to themselves as equal.
///
/// Meant for scalar floats and single-float wrappers such as `Option<f64>`,
/// where `NaN == NaN` under this comparison. For composite state with float
/// fields use [`serialized_eq`], since a NaN in one field would otherwise
/// hide differences in the others.
pub fn reflexive_eq<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    a == b || (a.ne(a) && b.ne(b))
}

/// Deep equality over JSON trees.
///
/// Arrays compare element-wise in order, objects compare by key set and
/// per-key values, numbers compare numerically.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => objects_eq(x, y),
        _ => a == b,
    }
}

/// Serialize both values to JSON trees and compare them with [`json_eq`].
///
/// Fails if either value cannot be represented as JSON, e.g. a map with
/// non-string keys.
pub fn serialized_eq<T: Serialize + ?Sized>(a: &T, b: &T) -> Result<bool> {
    let a = serde_json::to_value(a)?;
    let b = serde_json::to_value(b)?;
    Ok(json_eq(&a, &b))
}

fn numbers_eq(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn objects_eq(x: &Map<String, Value>, y: &Map<String, Value>) -> bool {
    x.len() == y.len()
        && x
            .iter()
            .all(|(key, value)| y.get(key).is_some_and(|other| json_eq(value, other)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn json_numbers_compare_by_value() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!(-3), &json!(-3.0)));
        assert!(!json_eq(&json!(1), &json!(1.5)));
        assert!(!json_eq(&json!(u64::MAX), &json!(-1)));
    }

    #[test]
    fn json_nested_containers() {
        let a = json!({"x": 1, "items": [1, 2, {"deep": [true, null]}]});
        let b = json!({"items": [1.0, 2, {"deep": [true, null]}], "x": 1});
        assert!(json_eq(&a, &b));

        let c = json!({"x": 1, "items": [1, 2, {"deep": [true, false]}]});
        assert!(!json_eq(&a, &c));
    }

    #[test]
    fn json_object_key_sets_must_match() {
        assert!(!json_eq(&json!({"x": 1}), &json!({"x": 1, "y": null})));
        assert!(!json_eq(&json!({"x": 1, "z": 2}), &json!({"x": 1, "y": 2})));
        assert!(!json_eq(&json!([1, 2]), &json!([1, 2, 3])));
    }

    #[test]
    fn json_mismatched_kinds() {
        assert!(!json_eq(&json!(0), &json!(false)));
        assert!(!json_eq(&json!(null), &json!([])));
        assert!(!json_eq(&json!("1"), &json!(1)));
    }

    #[test]
    fn serialized_eq_uses_structure() {
        let mut a = BTreeMap::new();
        a.insert("count", 2.0_f64);
        let mut b = BTreeMap::new();
        b.insert("count", 2.0_f64);
        assert!(serialized_eq(&a, &b).unwrap());

        b.insert("count", 3.0);
        assert!(!serialized_eq(&a, &b).unwrap());
    }

    #[test]
    fn serialized_eq_rejects_non_string_keys() {
        let mut a: HashMap<(i32, i32), i32> = HashMap::new();
        a.insert((0, 0), 1);
        let err = serialized_eq(&a, &a.clone()).unwrap_err();
        assert!(err.to_string().starts_with("failed to serialize state"));
    }

    #[test]
    fn reflexive_eq_treats_nan_as_equal() {
        assert!(reflexive_eq(&f64::NAN, &f64::NAN));
        assert!(reflexive_eq(&Some(f32::NAN), &Some(f32::NAN)));
        assert!(reflexive_eq(&1.5, &1.5));
        assert!(!reflexive_eq(&f64::NAN, &1.0));
        assert!(!reflexive_eq(&None, &Some(f64::NAN)));
    }

    #[test]
    fn serialized_eq_treats_nan_fields_as_equal() {
        let a = (f64::NAN, 1);
        assert!(serialized_eq(&a, &(f64::NAN, 1)).unwrap());
        assert!(!serialized_eq(&a, &(f64::NAN, 2)).unwrap());
    }

    #[test]
    fn structural_eq_on_nested_values() {
        assert!(structural_eq(&vec![vec![1, 2], vec![3]], &vec![vec![1, 2], vec![3]]));
        assert!(!structural_eq(&Some(vec![1]), &None));
    }
}
