//! try / return tests

mod common;
use common::{call, method, num, root, text};

use quest_core::{
    return_levels, return_to, try_with, value, Flow, Object, Result, RuntimeError, Target,
};

// ===== level-addressed =====

#[test]
fn test_return_two_levels_skips_outer_rest() {
    let result = try_with(|_outer| {
        let inner = value!(try_with(|_inner| {
            value!(return_levels(2, Object::text("V")));
            Ok(Flow::Value(Object::text("inner rest")))
        }));
        Ok(Flow::Value(Object::text(format!("outer rest after {}", text(&inner)))))
    })
    .unwrap()
    .settle()
    .unwrap();
    assert_eq!(text(&result), "V");
}

#[test]
fn test_return_one_level_continues_outer() {
    let result = try_with(|_outer| {
        let inner = value!(try_with(|_inner| {
            value!(return_levels(1, Object::text("V")));
            Ok(Flow::Value(Object::text("inner rest")))
        }));
        Ok(Flow::Value(Object::text(format!("outer got {}", text(&inner)))))
    })
    .unwrap()
    .settle()
    .unwrap();
    assert_eq!(text(&result), "outer got V");
}

#[test]
fn test_too_many_levels_is_unhandled() {
    let err = try_with(|_| return_levels(3, Object::null())).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnhandledEscape {
            remaining: Target::Levels(2)
        }
    );
    assert_eq!(err.to_string(), "returned 2 levels too many");
}

// ===== marker-addressed =====

fn nest(frames: usize, marker: &Object) -> Result<Flow> {
    if frames == 0 {
        return return_to(marker, Object::number(42.0));
    }
    let marker = marker.clone();
    try_with(move |_| {
        value!(nest(frames - 1, &marker));
        Ok(Flow::Value(Object::text("frame rest")))
    })
}

#[test]
fn test_marker_return_across_five_frames() {
    let result = try_with(|marker| {
        value!(nest(5, marker));
        Ok(Flow::Value(Object::text("outer rest")))
    })
    .unwrap()
    .settle()
    .unwrap();
    assert_eq!(num(&result), 42.0);
    assert_eq!(quest_core::runtime::escape::depth(), 0);
}

#[test]
fn test_stale_marker_is_unhandled() {
    let marker = try_with(|marker| Ok(Flow::Value(marker.clone())))
        .unwrap()
        .settle()
        .unwrap();
    let err = return_to(&marker, Object::null()).unwrap_err();
    assert!(err.to_string().contains("not active"));
}

// ===== errors and escapes stay apart =====

#[test]
fn test_try_does_not_catch_errors() {
    let err = try_with(|_| {
        let frozen = Object::new_root();
        frozen.make_readonly("x");
        frozen.set("x", Object::null())?;
        Ok(Flow::Value(Object::null()))
    })
    .unwrap_err();
    assert!(matches!(err, RuntimeError::ReadonlyViolation { .. }));
    assert_eq!(quest_core::runtime::escape::depth(), 0);
}

#[test]
fn test_escape_passes_through_method_calls() {
    let obj = Object::new_root();
    obj.set(
        "bail",
        method(|call| return_levels(1, call.arg(0))),
    )
    .unwrap();

    let result = try_with(|_| {
        value!(obj.call_attr("bail", &[Object::text("out")]));
        Ok(Flow::Value(Object::text("not reached")))
    })
    .unwrap()
    .settle()
    .unwrap();
    assert_eq!(text(&result), "out");
}

// ===== kernel try / return =====

#[test]
fn test_kernel_loop_with_early_exit() {
    let proto = root();
    let looper = proto.clone();
    let body = method(move |_| {
        for i in 0..10 {
            if i == 4 {
                value!(looper.call_attr("return", &[Object::null(), Object::number(i as f64)]));
            }
        }
        Ok(Flow::Value(Object::number(-1.0)))
    });
    assert_eq!(num(&call(&proto, "try", &[body])), 4.0);
}

#[test]
fn test_kernel_nested_try_by_marker() {
    let proto = root();
    let outer_proto = proto.clone();
    let outer_body = method(move |outer| {
        let outer_marker = outer.arg(0);
        let returner = outer_proto.clone();
        let inner_body = method(move |_| {
            returner.call_attr("return", &[outer_marker.clone(), Object::text("to outer")])
        });
        value!(outer_proto.call_attr("try", &[inner_body]));
        Ok(Flow::Value(Object::text("outer rest")))
    });
    assert_eq!(text(&call(&proto, "try", &[outer_body])), "to outer");
}

#[test]
fn test_initializer_escape_replaces_the_child() {
    let proto = root();
    let init = method(|call| {
        call.this().set("started", Object::boolean(true))?;
        value!(return_levels(1, Object::text("aborted")));
        call.this().set("finished", Object::boolean(true))?;
        Ok(Flow::Value(Object::null()))
    });

    let result = try_with(|_| {
        let child = value!(proto.call_attr("birth", &[init.clone()]));
        Ok(Flow::Value(child))
    })
    .unwrap()
    .settle()
    .unwrap();
    assert_eq!(text(&result), "aborted");

    // outside any try the same initializer has nowhere to land
    let err = proto.call_attr("birth", &[init]).unwrap_err();
    assert!(matches!(err, RuntimeError::UnhandledEscape { .. }));
}
