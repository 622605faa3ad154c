//! Integration tests for the Node utility core
//!
//! Exercises the public surface end to end: lazy exports backed by a
//! module registry, promisified callbacks settled from a later task,
//! deprecation codes shared between wrappers and signal lookup.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use raya_node_sdk::{JsFunction, JsObject, ModuleRegistry, Value};
use raya_node_util::{
    convert_to_valid_signal, deprecate_in, promisify_in, DeprecateOptions, LazyBinder, Process,
    ProcessFlags, RecordingSink, WeakReference,
};

fn isolated() -> (Arc<Process>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    (Arc::new(Process::new(ProcessFlags::default(), sink.clone())), sink)
}

/// Callback-style function that remembers its callbacks for a later task
fn deferred_add(pending: Rc<RefCell<Vec<(JsFunction, f64)>>>) -> JsFunction {
    JsFunction::native("add", move |_this, args| {
        let a = args.first().and_then(Value::as_number).unwrap_or(0.0);
        let b = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
        if let Some(cb) = args.last().and_then(Value::as_function) {
            pending.borrow_mut().push((cb.clone(), a + b));
        }
        Ok(Value::Undefined)
    })
}

#[test]
fn test_lazy_exports_from_registry() {
    let loads = Rc::new(Cell::new(0));
    let mut registry = ModuleRegistry::new();
    let counter = loads.clone();
    registry.register("internal/fs/promises", move || {
        counter.set(counter.get() + 1);
        Ok(JsObject::from_entries([
            ("foo", Value::from(1)),
            ("bar", Value::from(2)),
        ]))
    });

    let binder = LazyBinder::new(Rc::new(registry));
    let target = JsObject::new();
    binder
        .define_lazy(&target, "internal/fs/promises", &["foo", "bar"], true)
        .unwrap();
    assert_eq!(loads.get(), 0);

    let foo = target.get("foo").unwrap();
    assert_eq!(foo, Value::from(1));
    assert_eq!(target.get("foo").unwrap(), foo);
    assert_eq!(target.get("bar").unwrap(), Value::from(2));
    assert_eq!(loads.get(), 1);
    assert_eq!(target.keys(), vec!["foo".to_string(), "bar".to_string()]);
}

#[test]
fn test_lazy_missing_module_propagates() {
    let binder = LazyBinder::new(Rc::new(ModuleRegistry::new()));
    let target = JsObject::new();
    binder.define_lazy(&target, "nope", &["x"], true).unwrap();
    let err = target.get("x").unwrap_err();
    assert_eq!(err.code(), "ERR_MODULE_NOT_FOUND");
}

#[tokio::test(flavor = "current_thread")]
async fn test_promisify_settles_from_later_task() {
    let (process, _) = isolated();
    let pending = Rc::new(RefCell::new(Vec::new()));
    let g = promisify_in(&process, &Value::Function(deferred_add(pending.clone()))).unwrap();

    let result = g.call(&Value::Undefined, &[Value::from(2), Value::from(3)]).unwrap();
    let promise = result.as_promise().unwrap().clone();
    assert!(promise.is_pending());

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            let settle = tokio::task::spawn_local(async move {
                tokio::task::yield_now().await;
                for (cb, sum) in pending.borrow_mut().drain(..) {
                    cb.call(&Value::Undefined, &[Value::Null, Value::Number(sum)])
                        .unwrap();
                }
            });
            assert_eq!(promise.await, Ok(Value::from(5)));
            settle.await.unwrap();
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_promisify_named_results() {
    let (process, _) = isolated();
    let f = JsFunction::native("pair", |_this, args| {
        let cb = args.last().and_then(Value::as_function).cloned().unwrap();
        cb.call(&Value::Undefined, &[Value::Null, Value::from(1), Value::from(2)])
    });
    f.set_result_names(["x", "y"]);

    let g = promisify_in(&process, &Value::Function(f)).unwrap();
    let result = g.call(&Value::Undefined, &[]).unwrap();
    let value = result.as_promise().unwrap().clone().await.unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.get("x").unwrap(), Value::from(1));
    assert_eq!(obj.get("y").unwrap(), Value::from(2));
}

#[tokio::test(flavor = "current_thread")]
async fn test_promisify_rejects_with_callback_error() {
    let (process, _) = isolated();
    let f = JsFunction::native("fail", |_this, args| {
        let cb = args.last().and_then(Value::as_function).cloned().unwrap();
        cb.call(&Value::Undefined, &[Value::from("ENOENT")])?;
        // Only the first settlement counts
        cb.call(&Value::Undefined, &[Value::Null, Value::from(1)])
    });
    let g = promisify_in(&process, &Value::Function(f)).unwrap();
    let result = g.call(&Value::Undefined, &[]).unwrap();
    assert_eq!(result.as_promise().unwrap().clone().await, Err(Value::from("ENOENT")));
}

#[test]
fn test_deprecation_code_shared_across_wrappers() {
    let (process, sink) = isolated();
    let f = Value::Function(JsFunction::native("legacy", |_, _| Ok(Value::Undefined)));
    let first = deprecate_in(&process, &f, "legacy() is deprecated", DeprecateOptions::with_code("X1")).unwrap();
    for _ in 0..5 {
        first.call(&Value::Undefined, &[]).unwrap();
    }
    process.drain_warnings();
    assert_eq!(sink.count_code("X1"), 1);

    let second = deprecate_in(&process, &f, "legacy() is deprecated", DeprecateOptions::with_code("X1")).unwrap();
    second.call(&Value::Undefined, &[]).unwrap();
    process.drain_warnings();
    assert_eq!(sink.count_code("X1"), 1);
}

#[test]
fn test_signal_names() {
    let lower = convert_to_valid_signal(&Value::from("sigterm")).unwrap();
    let upper = convert_to_valid_signal(&Value::from("SIGTERM")).unwrap();
    assert_eq!(lower, upper);

    let err = convert_to_valid_signal(&Value::from(999999)).unwrap_err();
    assert_eq!(err.code(), "ERR_UNKNOWN_SIGNAL");
}

#[test]
fn test_weak_reference_balance() {
    let target = Rc::new(JsObject::new());
    let mut weak = WeakReference::new(&target);
    for _ in 0..3 {
        weak.inc_ref();
    }
    for _ in 0..3 {
        weak.dec_ref().unwrap();
    }
    assert_eq!(weak.ref_count(), 0);
    assert!(weak.get().is_some());
    drop(target);
    assert!(weak.get().is_none());
}
