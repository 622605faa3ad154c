//! Callback-to-promise adaptation
//!
//! `promisify(f)` turns a function taking a trailing `(err, ...values)`
//! callback into one returning a [`Promise`]. Functions can opt out by
//! carrying their own implementation under the `promisify.custom` symbol,
//! and can declare names for multi-value callbacks with
//! [`JsFunction::set_result_names`].

use std::sync::Arc;

use raya_node_sdk::{
    JsFunction, JsObject, NodeError, NodeResult, Promise, PropertyDescriptor, PropertyKey,
    ProcessWarning, Resolver, Symbol, Value, WarningCategory,
};

use crate::process::Process;

/// Code of the warning emitted when the wrapped function returns a promise
pub const PROMISE_RETURN_CODE: &str = "DEP0174";

const PROMISE_RETURN_MESSAGE: &str =
    "Calling promisify on a function that returns a Promise is likely a mistake.";

/// The `util.promisify.custom` symbol (`Symbol.for('nodejs.util.promisify.custom')`)
pub fn promisify_custom() -> Symbol {
    Symbol::for_key("nodejs.util.promisify.custom")
}

/// Promisify against the global process.
pub fn promisify(original: &Value) -> NodeResult<JsFunction> {
    promisify_in(&Process::global(), original)
}

/// Promisify `original`, reporting misuse diagnostics to `process`.
///
/// Fails synchronously only when `original` (or its custom implementation)
/// is not a function.
pub fn promisify_in(process: &Arc<Process>, original: &Value) -> NodeResult<JsFunction> {
    let Some(original) = original.as_function() else {
        return Err(NodeError::invalid_arg_type("original", "function", original));
    };

    let custom_key = PropertyKey::from(promisify_custom());
    let custom = original.get(custom_key.clone())?;
    if custom.is_truthy() {
        let Some(custom_fn) = custom.as_function() else {
            return Err(NodeError::invalid_arg_type("util.promisify.custom", "function", &custom));
        };
        custom_fn.define_property(custom_key, PropertyDescriptor::hidden(custom.clone()))?;
        return Ok(custom_fn.clone());
    }

    let target = original.clone();
    let process = process.clone();
    let promisified = JsFunction::native(original.name(), move |this, args| {
        let (promise, resolver) = Promise::pending();
        let callback = settle_callback(resolver.clone(), &target);

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.extend_from_slice(args);
        call_args.push(Value::Function(callback));

        match target.call(this, &call_args) {
            Ok(Value::Promise(_)) => {
                if process.claim_deprecation_code(PROMISE_RETURN_CODE) {
                    process.emit_warning(
                        ProcessWarning::new(PROMISE_RETURN_MESSAGE, WarningCategory::Deprecation)
                            .with_code(Some(PROMISE_RETURN_CODE))
                            .with_source(target.name()),
                    );
                }
            }
            Ok(_) => {}
            Err(err) => {
                resolver.reject(err.into_value());
            }
        }
        Ok(Value::Promise(promise))
    });

    promisified
        .properties()
        .set_prototype(original.prototype_link());
    promisified.inherit_result_names(original);
    promisified.define_property(
        promisify_custom(),
        PropertyDescriptor::hidden(Value::Function(promisified.clone())),
    )?;
    for (key, descriptor) in original.properties().own_property_descriptors() {
        promisified.define_property(key, descriptor)?;
    }
    Ok(promisified)
}

/// Build the trailing `(err, ...values)` callback for one invocation.
fn settle_callback(resolver: Resolver, target: &JsFunction) -> JsFunction {
    let names = target.result_names();
    JsFunction::native("", move |_this, args| {
        let err = args.first().cloned().unwrap_or_default();
        if err.is_truthy() {
            resolver.reject(err);
            return Ok(Value::Undefined);
        }
        let values = args.get(1..).unwrap_or_default();
        match names.as_deref() {
            Some(names) if values.len() > 1 => {
                let obj = JsObject::new();
                for (i, name) in names.iter().enumerate() {
                    obj.set_data(name.as_str(), values.get(i).cloned().unwrap_or_default());
                }
                resolver.resolve(Value::Object(obj));
            }
            _ => {
                resolver.resolve(values.first().cloned().unwrap_or_default());
            }
        }
        Ok(Value::Undefined)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessFlags;
    use crate::warning::RecordingSink;

    fn isolated() -> (Arc<Process>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (Arc::new(Process::new(ProcessFlags::default(), sink.clone())), sink)
    }

    fn callback_of(args: &[Value]) -> JsFunction {
        args.last()
            .and_then(Value::as_function)
            .cloned()
            .expect("trailing callback")
    }

    #[test]
    fn test_rejects_non_function() {
        let (process, _) = isolated();
        let err = promisify_in(&process, &Value::from(5)).unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_ARG_TYPE");
    }

    #[test]
    fn test_sync_callback_settles_immediately() {
        let (process, _) = isolated();
        let f = JsFunction::native("sync", |_this, args| {
            callback_of(args).call(&Value::Undefined, &[Value::Null, Value::from("ok")])
        });
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        let result = g.call(&Value::Undefined, &[]).unwrap();
        let promise = result.as_promise().unwrap();
        assert_eq!(promise.outcome(), Some(Ok(Value::from("ok"))));
    }

    #[test]
    fn test_first_value_only_without_names() {
        let (process, _) = isolated();
        let f = JsFunction::native("many", |_this, args| {
            callback_of(args).call(
                &Value::Undefined,
                &[Value::Undefined, Value::from(1), Value::from(2)],
            )
        });
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        let result = g.call(&Value::Undefined, &[]).unwrap();
        assert_eq!(result.as_promise().unwrap().outcome(), Some(Ok(Value::from(1))));
    }

    #[test]
    fn test_sync_throw_rejects() {
        let (process, _) = isolated();
        let f = JsFunction::native("throws", |_this, _args| {
            Err(NodeError::Thrown(Value::from("bad input")))
        });
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        let result = g.call(&Value::Undefined, &[]).unwrap();
        assert_eq!(
            result.as_promise().unwrap().outcome(),
            Some(Err(Value::from("bad input")))
        );
    }

    #[test]
    fn test_custom_implementation_returned() {
        let (process, _) = isolated();
        let original = JsFunction::native("original", |_, _| Ok(Value::Undefined));
        let custom = JsFunction::native("custom", |_, _| Ok(Value::Promise(Promise::resolved(Value::Null))));
        original
            .set(promisify_custom(), Value::Function(custom.clone()))
            .unwrap();

        let g = promisify_in(&process, &Value::Function(original)).unwrap();
        assert!(g.ptr_eq(&custom));
        let marker = custom.properties().get_own_property(promisify_custom()).unwrap();
        assert!(!marker.enumerable);
        assert!(!marker.is_writable());
        assert!(marker.configurable);
    }

    #[test]
    fn test_custom_must_be_function() {
        let (process, _) = isolated();
        let original = JsFunction::native("original", |_, _| Ok(Value::Undefined));
        original.set(promisify_custom(), Value::from("nope")).unwrap();
        let err = promisify_in(&process, &Value::Function(original)).unwrap_err();
        assert!(matches!(err, NodeError::InvalidArgType { ref name, .. } if name == "util.promisify.custom"));
    }

    #[test]
    fn test_promisify_is_idempotent() {
        let (process, _) = isolated();
        let f = JsFunction::native("f", |_, _| Ok(Value::Undefined));
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        let again = promisify_in(&process, &Value::Function(g.clone())).unwrap();
        assert!(again.ptr_eq(&g));
    }

    #[test]
    fn test_copies_properties_and_prototype_link() {
        let (process, _) = isolated();
        let base = JsFunction::native("base", |_, _| Ok(Value::Undefined));
        let f = JsFunction::native("withStatics", |_, _| Ok(Value::Undefined));
        f.set_prototype_of(Some(&base));
        f.set("VERSION", Value::from(3)).unwrap();

        let g = promisify_in(&process, &Value::Function(f.clone())).unwrap();
        assert_eq!(g.name(), "withStatics");
        assert_eq!(g.get("VERSION").unwrap(), Value::from(3));
        assert_eq!(g.get("name").unwrap(), Value::from("withStatics"));
        assert!(g.prototype_link().unwrap().ptr_eq(base.properties()));
        assert_eq!(g.properties().keys(), vec!["VERSION".to_string()]);
    }

    #[test]
    fn test_returning_promise_warns_once() {
        let (process, sink) = isolated();
        let f = JsFunction::native("alreadyAsync", |_this, args| {
            callback_of(args).call(&Value::Undefined, &[Value::Null, Value::from(1)])?;
            Ok(Value::Promise(Promise::resolved(Value::Undefined)))
        });
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        let first = g.call(&Value::Undefined, &[]).unwrap();
        g.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();

        // Result is unaffected
        assert_eq!(first.as_promise().unwrap().outcome(), Some(Ok(Value::from(1))));
        assert_eq!(sink.count_code(PROMISE_RETURN_CODE), 1);
        assert_eq!(sink.warnings()[0].source.as_deref(), Some("alreadyAsync"));
    }

    #[test]
    fn test_promise_return_warning_survives_suppression() {
        let (process, sink) = isolated();
        process.update_flags(|f| f.no_deprecation = true);
        let f = JsFunction::native("alreadyAsync", |_this, _args| {
            Ok(Value::Promise(Promise::resolved(Value::Undefined)))
        });
        let g = promisify_in(&process, &Value::Function(f)).unwrap();
        g.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert!(sink.is_empty());

        process.update_flags(|f| f.no_deprecation = false);
        g.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert_eq!(sink.count_code(PROMISE_RETURN_CODE), 1);
    }
}
