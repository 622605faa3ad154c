//! Call-once helpers

use std::cell::{OnceCell, RefCell};

use raya_node_sdk::{JsFunction, Value};

/// Wrap `f` so it runs at most once.
///
/// Later calls do not invoke `f` and return `undefined`, or the first
/// call's result when `preserve_return_value` is set. If the first call
/// threw, later calls return `undefined` either way.
pub fn once(f: &JsFunction, preserve_return_value: bool) -> JsFunction {
    let target = f.clone();
    let first: RefCell<Option<Value>> = RefCell::new(None);
    JsFunction::native(f.name(), move |this, args| {
        if let Some(value) = first.borrow().as_ref() {
            return Ok(value.clone());
        }
        // Mark as called before running, so re-entrant calls do not rerun `f`
        *first.borrow_mut() = Some(Value::Undefined);
        let result = target.call(this, args)?;
        if preserve_return_value {
            *first.borrow_mut() = Some(result.clone());
        }
        Ok(result)
    })
}

/// Compute `f()` on the first call and hand out clones afterwards.
pub fn cached_result<T, F>(f: F) -> impl Fn() -> T
where
    T: Clone,
    F: Fn() -> T,
{
    let cell = OnceCell::new();
    move || cell.get_or_init(&f).clone()
}
