//! Deprecation wrappers
//!
//! [`deprecate`] wraps a function so that using it reports a
//! `DeprecationWarning`. Codeless wrappers warn once each; coded wrappers
//! warn once per code for the whole process, no matter how many wrappers
//! share the code. The wrapper is a drop-in replacement: it calls and
//! constructs exactly like the original, and instances built through
//! either satisfy `instanceof` against both.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use raya_node_sdk::{
    CallFn, ConstructFn, FunctionKind, JsFunction, NodeError, NodeResult, ProcessWarning, Value,
    WarningCategory,
};

use crate::process::Process;

/// How a deprecation is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecateOptions {
    /// Deprecation code (e.g. `DEP0005`), shared process-wide
    pub code: Option<String>,
    /// Deliver the warning during the call instead of on the next drain
    pub emit_synchronously: bool,
    /// Only warn when `pending_deprecation` is enabled
    pub pending: bool,
}

impl DeprecateOptions {
    /// Options for a coded deprecation
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

/// Per-wrapper warning state
struct Notice {
    process: Arc<Process>,
    message: String,
    source: String,
    options: DeprecateOptions,
    warned: Cell<bool>,
}

impl Notice {
    fn fire(&self) {
        let flags = self.process.flags();
        if flags.no_deprecation || (self.options.pending && !flags.pending_deprecation) {
            return;
        }
        if self.warned.replace(true) {
            return;
        }
        if let Some(code) = &self.options.code {
            if !self.process.claim_deprecation_code(code) {
                return;
            }
        }

        let warning = ProcessWarning::new(self.message.as_str(), WarningCategory::Deprecation)
            .with_code(self.options.code.as_deref())
            .with_source(self.source.as_str());
        if self.options.emit_synchronously {
            self.process.emit_warning_sync(warning);
        } else {
            self.process.emit_warning(warning);
        }
    }
}

/// Wrap `f` against the global process, warning asynchronously.
pub fn deprecate(f: &Value, message: &str, code: Option<&str>) -> NodeResult<JsFunction> {
    let options = DeprecateOptions {
        code: code.map(str::to_string),
        ..DeprecateOptions::default()
    };
    deprecate_in(&Process::global(), f, message, options)
}

/// Like [`deprecate`], but silent unless the process runs with
/// `pending_deprecation`.
pub fn pending_deprecate(f: &Value, message: &str, code: &str) -> NodeResult<JsFunction> {
    let options = DeprecateOptions {
        pending: true,
        ..DeprecateOptions::with_code(code)
    };
    deprecate_in(&Process::global(), f, message, options)
}

/// Wrap `f` so that its first use reports `message` to `process`.
///
/// Flags are read on every call, so changing them after wrapping takes
/// effect immediately.
pub fn deprecate_in(
    process: &Arc<Process>,
    f: &Value,
    message: &str,
    options: DeprecateOptions,
) -> NodeResult<JsFunction> {
    let Some(target) = f.as_function() else {
        return Err(NodeError::invalid_arg_type("fn", "function", f));
    };

    let notice = Rc::new(Notice {
        process: process.clone(),
        message: message.to_string(),
        source: target.name().to_string(),
        options,
        warned: Cell::new(false),
    });

    let call: CallFn = {
        let target = target.clone();
        let notice = notice.clone();
        Rc::new(move |this: &Value, args: &[Value]| {
            notice.fire();
            target.call(this, args)
        })
    };
    let kind = match target.kind() {
        FunctionKind::Callable(_) => FunctionKind::Callable(call),
        FunctionKind::Constructible { .. } => {
            let target = target.clone();
            let construct: ConstructFn = Rc::new(move |args: &[Value], new_target: &JsFunction| {
                notice.fire();
                target.construct_with_target(args, new_target)
            });
            FunctionKind::Constructible { call, construct }
        }
    };

    let wrapper = JsFunction::new(target.name(), kind);
    wrapper.set_prototype_of(Some(target));
    wrapper.inherit_result_names(target);
    if target.is_constructible() {
        wrapper.set_prototype_object(target.prototype_object());
    }
    Ok(wrapper)
}

/// Warn once per `code` on the global process, then construct `ctor`.
pub fn deprecate_instantiation(
    ctor: &JsFunction,
    code: &str,
    message: &str,
    args: &[Value],
) -> NodeResult<Value> {
    deprecate_instantiation_in(&Process::global(), ctor, code, message, args)
}

/// Warn once per `code` on `process`, then construct `ctor`.
pub fn deprecate_instantiation_in(
    process: &Process,
    ctor: &JsFunction,
    code: &str,
    message: &str,
    args: &[Value],
) -> NodeResult<Value> {
    if process.claim_deprecation_code(code) {
        process.emit_warning(
            ProcessWarning::new(message, WarningCategory::Deprecation)
                .with_code(Some(code))
                .with_source(ctor.name()),
        );
    }
    ctor.construct(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessFlags;
    use crate::warning::RecordingSink;
    use raya_node_sdk::instance_of;

    fn isolated(flags: ProcessFlags) -> (Arc<Process>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (Arc::new(Process::new(flags, sink.clone())), sink)
    }

    fn double() -> Value {
        Value::Function(JsFunction::native("double", |_this, args| {
            let n = args.first().and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(n * 2.0))
        }))
    }

    #[test]
    fn test_forwards_calls() {
        let (process, _) = isolated(ProcessFlags::default());
        let wrapped = deprecate_in(&process, &double(), "double() is deprecated", DeprecateOptions::default()).unwrap();
        assert_eq!(wrapped.name(), "double");
        assert_eq!(wrapped.call(&Value::Undefined, &[Value::from(4)]).unwrap(), Value::from(8));
    }

    #[test]
    fn test_codeless_warns_once_per_wrapper() {
        let (process, sink) = isolated(ProcessFlags::default());
        let f = double();
        let a = deprecate_in(&process, &f, "old", DeprecateOptions::default()).unwrap();
        let b = deprecate_in(&process, &f, "old", DeprecateOptions::default()).unwrap();
        for _ in 0..3 {
            a.call(&Value::Undefined, &[]).unwrap();
            b.call(&Value::Undefined, &[]).unwrap();
        }
        process.drain_warnings();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_async_emission_waits_for_drain() {
        let (process, sink) = isolated(ProcessFlags::default());
        let wrapped = deprecate_in(&process, &double(), "old", DeprecateOptions::default()).unwrap();
        wrapped.call(&Value::Undefined, &[]).unwrap();
        assert!(sink.is_empty());
        assert_eq!(process.drain_warnings(), 1);
        let warnings = sink.warnings();
        let warning = &warnings[0];
        assert_eq!(warning.category, WarningCategory::Deprecation);
        assert_eq!(warning.source.as_deref(), Some("double"));
    }

    #[test]
    fn test_sync_emission() {
        let (process, sink) = isolated(ProcessFlags::default());
        let options = DeprecateOptions {
            emit_synchronously: true,
            ..DeprecateOptions::with_code("DEP0900")
        };
        let wrapped = deprecate_in(&process, &double(), "old", options).unwrap();
        wrapped.call(&Value::Undefined, &[]).unwrap();
        assert_eq!(sink.count_code("DEP0900"), 1);
    }

    #[test]
    fn test_flags_checked_per_call() {
        let (process, sink) = isolated(ProcessFlags {
            no_deprecation: true,
            ..Default::default()
        });
        let wrapped = deprecate_in(&process, &double(), "old", DeprecateOptions::default()).unwrap();
        wrapped.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert!(sink.is_empty());

        process.update_flags(|f| f.no_deprecation = false);
        wrapped.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_pending_requires_flag() {
        let (process, sink) = isolated(ProcessFlags::default());
        let options = DeprecateOptions {
            pending: true,
            ..DeprecateOptions::with_code("DEP0901")
        };
        let wrapped = deprecate_in(&process, &double(), "soon", options).unwrap();
        wrapped.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert!(sink.is_empty());

        process.update_flags(|f| f.pending_deprecation = true);
        wrapped.call(&Value::Undefined, &[]).unwrap();
        process.drain_warnings();
        assert_eq!(sink.count_code("DEP0901"), 1);
    }

    #[test]
    fn test_rejects_non_function() {
        let (process, _) = isolated(ProcessFlags::default());
        let err = deprecate_in(&process, &Value::Null, "x", DeprecateOptions::default()).unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_ARG_TYPE");
    }

    #[test]
    fn test_constructible_identity() {
        let (process, _) = isolated(ProcessFlags::default());
        let point = JsFunction::class("Point", |this, args| {
            this.set_data("x", args.first().cloned().unwrap_or_default());
            Ok(())
        });
        let wrapped = deprecate_in(
            &process,
            &Value::Function(point.clone()),
            "Point is deprecated",
            DeprecateOptions::default(),
        )
        .unwrap();

        assert!(wrapped.is_constructible());
        let via_wrapper = wrapped.construct(&[Value::from(3)]).unwrap();
        let direct = point.construct(&[Value::from(4)]).unwrap();
        assert!(instance_of(&via_wrapper, &point));
        assert!(instance_of(&via_wrapper, &wrapped));
        assert!(instance_of(&direct, &wrapped));
        assert_eq!(via_wrapper.as_object().unwrap().get("x").unwrap(), Value::from(3));
        assert!(wrapped.prototype_link().unwrap().ptr_eq(point.properties()));
    }

    #[test]
    fn test_callable_wrapper_is_not_constructible() {
        let (process, _) = isolated(ProcessFlags::default());
        let wrapped = deprecate_in(&process, &double(), "old", DeprecateOptions::default()).unwrap();
        assert!(matches!(wrapped.construct(&[]), Err(NodeError::NotConstructible(_))));
    }

    #[test]
    fn test_deprecate_instantiation_once_per_code() {
        let (process, sink) = isolated(ProcessFlags::default());
        let ctor = JsFunction::class("Legacy", |_, _| Ok(()));
        for _ in 0..3 {
            let instance = deprecate_instantiation_in(&process, &ctor, "DEP0902", "Legacy is deprecated", &[]).unwrap();
            assert!(instance_of(&instance, &ctor));
        }
        process.drain_warnings();
        assert_eq!(sink.count_code("DEP0902"), 1);
    }

    #[test]
    fn test_instantiation_code_kept_while_suppressed() {
        let (process, sink) = isolated(ProcessFlags {
            no_deprecation: true,
            ..Default::default()
        });
        let ctor = JsFunction::class("Legacy", |_, _| Ok(()));
        deprecate_instantiation_in(&process, &ctor, "DEP0903", "Legacy is deprecated", &[]).unwrap();
        process.drain_warnings();
        assert!(sink.is_empty());

        process.update_flags(|f| f.no_deprecation = false);
        deprecate_instantiation_in(&process, &ctor, "DEP0903", "Legacy is deprecated", &[]).unwrap();
        process.drain_warnings();
        assert_eq!(sink.count_code("DEP0903"), 1);
    }

    #[test]
    fn test_wrapper_keeps_result_names_for_promisify() {
        let (process, _) = isolated(ProcessFlags::default());
        let pair = JsFunction::native("pair", |_this, args| {
            let cb = args.last().and_then(Value::as_function).cloned().unwrap();
            cb.call(&Value::Undefined, &[Value::Null, Value::from(1), Value::from(2)])
        });
        pair.set_result_names(["x", "y"]);

        let wrapped = deprecate_in(&process, &Value::Function(pair), "pair() is deprecated", DeprecateOptions::default()).unwrap();
        let g = crate::promisify::promisify_in(&process, &Value::Function(wrapped)).unwrap();
        let result = g.call(&Value::Undefined, &[]).unwrap();
        let value = match result.as_promise().unwrap().outcome() {
            Some(Ok(value)) => value,
            other => panic!("unexpected outcome: {:?}", other),
        };
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("x").unwrap(), Value::from(1));
        assert_eq!(obj.get("y").unwrap(), Value::from(2));
    }
}
