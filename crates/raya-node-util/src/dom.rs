//! Script-side `DOMException`
//!
//! The class is only built when something first needs to throw one.

use std::cell::OnceCell;

use raya_node_sdk::{DomException, JsFunction, NodeError, NodeResult, Value};

thread_local! {
    static DOM_EXCEPTION_CLASS: OnceCell<JsFunction> = const { OnceCell::new() };
}

/// The `DOMException` constructor for this thread, created on first use.
///
/// `new DOMException(message?, name?)` produces an object carrying
/// `message`, `name` and the legacy numeric `code`.
pub fn dom_exception_class() -> JsFunction {
    DOM_EXCEPTION_CLASS.with(|cell| cell.get_or_init(build_class).clone())
}

fn build_class() -> JsFunction {
    log::debug!("creating DOMException class");
    JsFunction::class("DOMException", |this, args| {
        let text = |i: usize| match args.get(i) {
            None | Some(Value::Undefined) => String::new(),
            Some(v) => v.to_string(),
        };
        let exception = DomException::new(text(0), text(1));
        this.set_data("message", Value::from(exception.message()));
        this.set_data("name", Value::from(exception.name()));
        this.set_data("code", Value::Number(f64::from(exception.code())));
        Ok(())
    })
}

/// Construct a `DOMException` instance without exposing the class up front.
pub fn lazy_dom_exception(message: &str, name: &str) -> NodeResult<Value> {
    dom_exception_class().construct(&[Value::from(message), Value::from(name)])
}

/// A `DOMException` ready to be returned as an error.
pub fn dom_error(message: &str, name: &str) -> NodeError {
    match lazy_dom_exception(message, name) {
        Ok(value) => NodeError::Thrown(value),
        Err(_) => NodeError::Dom(DomException::new(message, name)),
    }
}
