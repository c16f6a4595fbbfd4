//! Prototype and dispatch tests

mod common;
use common::{birth, call, constant, method, num, root, text};

use quest_core::{Coercion, Flow, Key, Object, RuntimeError, Symbol};

// ===== identity =====

#[test]
fn test_is_a_is_reflexive() {
    let obj = Object::new_root();
    assert!(obj.is_a(&obj));

    let proto = root();
    assert_eq!(call(&proto, "is_a", &[proto.clone()]).as_bool(), Some(true));
}

#[test]
fn test_identity_equality() {
    let proto = root();
    let a = birth(&proto);
    let b = birth(&proto);

    assert_eq!(call(&a, "===", &[a.clone()]).as_bool(), Some(true));
    assert_eq!(call(&a, "===", &[b.clone()]).as_bool(), Some(false));
    assert_eq!(call(&a, "==", &[b]).as_bool(), Some(false));
}

#[test]
fn test_ids_are_numbers_and_distinct() {
    let a = Object::new_root();
    let b = Object::new_root();
    let id_a = a.get(Key::ID).unwrap();
    let id_b = b.get(Key::ID).unwrap();
    assert_ne!(num(&id_a), num(&id_b));
}

// ===== lookup =====

#[test]
fn test_prototype_fallback_returns_identical_value() {
    let proto = Object::new_root();
    let value = Object::list(Vec::new());
    proto.set("items", value.clone()).unwrap();

    let child = Object::with_parent(&proto);
    let grandchild = Object::with_parent(&child);
    assert!(grandchild.get("items").unwrap().identical(&value));
}

#[test]
fn test_stepparents_consulted_in_order_before_parent() {
    let parent = Object::new_root();
    let first = Object::new_root();
    let second = Object::new_root();
    parent.set("name", Object::text("parent")).unwrap();
    second.set("name", Object::text("second")).unwrap();

    let obj = Object::builder()
        .parent(&parent)
        .stepparent(&first)
        .stepparent(&second)
        .build();
    assert_eq!(text(&obj.get("name").unwrap()), "second");

    first.set("name", Object::text("first")).unwrap();
    assert_eq!(text(&obj.get("name").unwrap()), "first");
}

#[test]
fn test_stored_null_shadows_prototype() {
    let proto = Object::new_root();
    proto.set("x", Object::number(1.0)).unwrap();
    let child = Object::with_parent(&proto);
    child.set("x", Object::null()).unwrap();

    assert!(child.has("x"));
    assert!(child.get("x").unwrap().is_null());
    assert!(child.lookup(&"x".into()).is_some());
    assert!(child.lookup(&"y".into()).is_none());
}

// ===== reserved keys =====

#[test]
fn test_readonly_fails_identically_through_store_and_dispatch() {
    let obj = Object::new_root();
    obj.set("pi", Object::number(3.0)).unwrap();
    obj.make_readonly("pi");

    let through_dispatch = obj.set("pi", Object::number(4.0)).unwrap_err();
    let through_store = obj
        .attrs_mut()
        .set("pi".into(), Object::number(4.0))
        .unwrap_err();
    assert_eq!(through_dispatch, through_store);
    assert_eq!(
        through_dispatch,
        RuntimeError::ReadonlyViolation {
            key: "pi".to_string()
        }
    );
    assert!(obj.delete("pi").is_err());
}

#[test]
fn test_reparent_through_dispatch() {
    let old = Object::new_root();
    let new = Object::new_root();
    new.set("origin", Object::text("new")).unwrap();
    let obj = Object::with_parent(&old);

    obj.set(Key::PARENT, new.clone()).unwrap();
    assert!(obj.get(Key::PARENT).unwrap().identical(&new));
    assert_eq!(text(&obj.get("origin").unwrap()), "new");

    let detached = obj.delete(Key::PARENT).unwrap();
    assert!(detached.identical(&new));
    assert!(obj.get("origin").unwrap().is_null());
    assert!(obj.get(Key::PARENT).unwrap().is_null());
}

#[test]
fn test_stepparents_through_dispatch() {
    let mixin = Object::new_root();
    mixin.set("mixed", Object::boolean(true)).unwrap();
    let obj = Object::new_root();

    obj.set(Key::STEPPARENTS, Object::list(vec![mixin.clone()]))
        .unwrap();
    assert!(obj.is_a(&mixin));
    assert_eq!(obj.get("mixed").unwrap().as_bool(), Some(true));

    let err = obj.set(Key::STEPPARENTS, mixin).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
}

// ===== closures =====

#[test]
fn test_bound_closures_do_not_observe_other_owners() {
    let proto = Object::new_root();
    proto
        .set("whoami", method(|call| Ok(Flow::Value(call.this()))))
        .unwrap();
    let a = Object::with_parent(&proto);
    let b = Object::with_parent(&proto);

    assert!(call(&a, "whoami", &[]).identical(&a));
    assert!(call(&b, "whoami", &[]).identical(&b));
    assert!(call(&a, "whoami", &[]).identical(&a));
}

#[test]
fn test_methods_see_all_arguments() {
    let obj = Object::new_root();
    obj.set("count", method(|call| Ok(Flow::Value(Object::number(call.argc() as f64)))))
        .unwrap();
    let result = call(&obj, "count", &[Object::null(), Object::null(), Object::null()]);
    assert_eq!(num(&result), 3.0);
}

#[test]
fn test_unresolved_call_is_null_not_error() {
    let obj = Object::new_root();
    assert!(call(&obj, "nothing_here", &[]).is_null());
}

// ===== coercion =====

#[test]
fn test_call_into_missing_num_is_type_mismatch() {
    let obj = root();
    let err = obj.call_into(Coercion::Num).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeMismatch {
            attr: "@num".to_string(),
            expected: "Number",
            found: "Null",
        }
    );
}

#[test]
fn test_call_into_wrong_kind() {
    let obj = Object::new_root();
    obj.set(Symbol::AT_TEXT, constant(Object::number(1.0))).unwrap();
    let err = obj.call_into(Coercion::Text).unwrap_err();
    assert_eq!(err.to_string(), "@text didn't return Text (got Number)");
}

#[test]
fn test_kernel_text_coercion() {
    let obj = root();
    let coerced = obj.call_into(Coercion::Text).unwrap().settle().unwrap();
    assert_eq!(coerced.as_text(), Some(format!("<object #{}>", obj.id()).as_str()));
}

// ===== super =====

#[test]
fn test_super_skips_local_value() {
    let proto = Object::new_root();
    let child = Object::with_parent(&proto);
    proto.set("label", Object::text("proto")).unwrap();
    child.set("label", Object::text("child")).unwrap();

    assert_eq!(text(&child.super_attr("label")), "proto");
    assert_eq!(text(&child.get("label").unwrap()), "child");
}

#[test]
fn test_three_level_super_chain() {
    let base = Object::new_root();
    base.set("describe", constant(Object::text("base"))).unwrap();

    let middle = Object::with_parent(&base);
    middle
        .set(
            "describe",
            method(|call| {
                let below = quest_core::value!(call.call_super("describe", &[]));
                Ok(Flow::Value(Object::text(format!("middle<{}>", text(&below)))))
            }),
        )
        .unwrap();

    let top = Object::with_parent(&middle);
    top.set(
        "describe",
        method(|call| {
            let below = quest_core::value!(call.call_super("describe", &[]));
            Ok(Flow::Value(Object::text(format!("top<{}>", text(&below)))))
        }),
    )
    .unwrap();

    let leaf = Object::with_parent(&top);
    assert_eq!(text(&call(&leaf, "describe", &[])), "top<middle<base>>");
}

// ===== lifecycle =====

#[test]
fn test_birth_with_initializer_sets_fields() {
    let proto = root();
    let init = method(|call| {
        call.this().set("ready", Object::boolean(true))?;
        Ok(Flow::Value(Object::null()))
    });
    let child = call(&proto, "birth", &[init]);
    assert_eq!(child.get("ready").unwrap().as_bool(), Some(true));
    assert!(child.is_a(&proto));
}

#[test]
fn test_clone_is_shallow_with_fresh_identity() {
    let proto = root();
    let original = birth(&proto);
    let shared = Object::list(Vec::new());
    original.set("items", shared.clone()).unwrap();

    let copy = call(&original, "clone", &[]);
    assert!(!copy.identical(&original));
    assert!(copy.get("items").unwrap().identical(&shared));
    assert!(copy.is_a(&proto));
}

#[test]
fn test_object_keys_hash_by_identity() {
    let obj = Object::new_root();
    let key_a = Object::text("same");
    let key_b = Object::text("same");
    obj.set(&key_a, Object::number(1.0)).unwrap();
    obj.set(&key_b, Object::number(2.0)).unwrap();

    assert_eq!(num(&obj.get(&key_a).unwrap()), 1.0);
    assert_eq!(num(&obj.get(&key_b).unwrap()), 2.0);
    assert_eq!(obj.attrs().len(), 2);
}

// ===== null sentinel =====

#[test]
fn test_writes_to_unresolved_result_are_rejected() {
    let obj = Object::new_root();
    let missing = obj.get("nothing").unwrap();
    assert!(missing.is_null());

    let err = missing.set("greet", Object::text("leaked")).unwrap_err();
    assert!(matches!(err, RuntimeError::ReadonlyViolation { .. }));
    assert!(missing.delete("greet").is_err());

    let other = Object::new_root().get("also_missing").unwrap();
    assert!(other.get("greet").unwrap().is_null());
    assert!(!other.respond_to("greet"));
}

#[test]
fn test_unbound_receiver_sees_clean_null() {
    let _ = Object::null().set("greet", Object::text("leaked"));
    let check = quest_core::Closure::new(|call| {
        Ok(Flow::Value(Object::boolean(call.this().respond_to("greet"))))
    });
    let answer = check.call(&[]).unwrap().settle().unwrap();
    assert_eq!(answer.as_bool(), Some(false));
}

// ===== shared ancestors =====

#[test]
fn test_deep_diamond_lookup_misses_quickly() {
    let mut cur = root();
    for _ in 0..128 {
        cur = Object::builder().parent(&cur).stepparent(&cur).build();
    }
    assert!(cur.get("missing").unwrap().is_null());
    assert!(!cur.respond_to("missing"));
    assert_eq!(call(&cur, "is_a", &[Object::new_root()]).as_bool(), Some(false));
}

#[test]
fn test_self_stepparent_cycle_terminates() {
    let obj = Object::new_root();
    obj.push_stepparent(obj.clone());
    assert!(obj.get("missing").unwrap().is_null());
    obj.delete(Key::STEPPARENTS).unwrap();
}
