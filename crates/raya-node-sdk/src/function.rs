//! Script functions backed by Rust closures
//!
//! A function is either plainly callable or also constructible. Wrappers
//! (deprecation, promisification) forward to the original through this
//! variant instead of manipulating prototypes behind the caller's back.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{NodeError, NodeResult};
use crate::object::{JsObject, PropertyDescriptor};
use crate::value::{PropertyKey, Value};

/// Call behaviour: `(this, args) -> result`
pub type CallFn = Rc<dyn Fn(&Value, &[Value]) -> NodeResult<Value>>;

/// Construct behaviour: `(args, new_target) -> instance`
pub type ConstructFn = Rc<dyn Fn(&[Value], &JsFunction) -> NodeResult<Value>>;

/// What a function can be used for.
#[derive(Clone)]
pub enum FunctionKind {
    /// Only callable
    Callable(CallFn),
    /// Callable and usable with `new`
    Constructible {
        /// Behaviour when called without `new`
        call: CallFn,
        /// Behaviour when constructed
        construct: ConstructFn,
    },
}

struct FunctionData {
    name: String,
    kind: FunctionKind,
    properties: JsObject,
    prototype: RefCell<Option<JsObject>>,
    result_names: RefCell<Option<Rc<[String]>>>,
}

/// Shared handle to a script function. Cloning shares the function.
#[derive(Clone)]
pub struct JsFunction(Rc<FunctionData>);

impl JsFunction {
    /// Create a function of the given kind.
    ///
    /// Constructible functions get a fresh, empty `prototype` object.
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        let name = name.into();
        let properties = JsObject::new();
        // Own `name` is a hidden data property, so it travels with descriptor copies
        properties.insert_property("name", PropertyDescriptor::hidden(Value::from(name.as_str())));
        let prototype = match kind {
            FunctionKind::Constructible { .. } => Some(JsObject::new()),
            FunctionKind::Callable(_) => None,
        };
        JsFunction(Rc::new(FunctionData {
            name,
            kind,
            properties,
            prototype: RefCell::new(prototype),
            result_names: RefCell::new(None),
        }))
    }

    /// Create a plain callable from a closure
    pub fn native<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> NodeResult<Value> + 'static,
    {
        Self::new(name, FunctionKind::Callable(Rc::new(f)))
    }

    /// Create a class-style constructor.
    ///
    /// `init` receives the freshly allocated instance, whose prototype is
    /// `new_target.prototype`. Calling without `new` is a TypeError.
    pub fn class<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn(&JsObject, &[Value]) -> NodeResult<()> + 'static,
    {
        let name = name.into();
        let call_name = name.clone();
        let call: CallFn = Rc::new(move |_this, _args| {
            Err(NodeError::Type(format!(
                "Class constructor {} cannot be invoked without 'new'",
                call_name
            )))
        });
        let construct: ConstructFn = Rc::new(move |args, new_target| {
            let instance = JsObject::with_prototype(new_target.prototype_object());
            init(&instance, args)?;
            Ok(Value::Object(instance))
        });
        Self::new(name, FunctionKind::Constructible { call, construct })
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Call/construct capabilities
    pub fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    /// Whether `new` may be applied
    pub fn is_constructible(&self) -> bool {
        matches!(self.0.kind, FunctionKind::Constructible { .. })
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsFunction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Invoke with an explicit receiver
    pub fn call(&self, this: &Value, args: &[Value]) -> NodeResult<Value> {
        match &self.0.kind {
            FunctionKind::Callable(call) => call(this, args),
            FunctionKind::Constructible { call, .. } => call(this, args),
        }
    }

    /// `new f(...args)`
    pub fn construct(&self, args: &[Value]) -> NodeResult<Value> {
        self.construct_with_target(args, self)
    }

    /// `Reflect.construct(f, args, new_target)`
    pub fn construct_with_target(&self, args: &[Value], new_target: &JsFunction) -> NodeResult<Value> {
        match &self.0.kind {
            FunctionKind::Constructible { construct, .. } => construct(args, new_target),
            FunctionKind::Callable(_) => Err(NodeError::NotConstructible(self.0.name.clone())),
        }
    }

    // ========================================================================
    // Properties and prototypes
    // ========================================================================

    /// Own property table (statics)
    pub fn properties(&self) -> &JsObject {
        &self.0.properties
    }

    /// Read a property (own or inherited through the function's chain)
    pub fn get(&self, key: impl Into<PropertyKey>) -> NodeResult<Value> {
        self.0.properties.get(key)
    }

    /// Assign a property
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> NodeResult<()> {
        self.0.properties.set(key, value)
    }

    /// Define an own property
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: PropertyDescriptor,
    ) -> NodeResult<()> {
        self.0.properties.define_property(key, descriptor)
    }

    /// Make `parent` this function's prototype link (for static inheritance)
    pub fn set_prototype_of(&self, parent: Option<&JsFunction>) {
        self.0
            .properties
            .set_prototype(parent.map(|p| p.properties().clone()));
    }

    /// The function whose properties this one inherits from, as an object
    pub fn prototype_link(&self) -> Option<JsObject> {
        self.0.properties.prototype()
    }

    /// The `prototype` object given to instances
    pub fn prototype_object(&self) -> Option<JsObject> {
        self.0.prototype.borrow().clone()
    }

    /// Replace the `prototype` object given to instances
    pub fn set_prototype_object(&self, prototype: Option<JsObject>) {
        *self.0.prototype.borrow_mut() = prototype;
    }

    // ========================================================================
    // Callback result names
    // ========================================================================

    /// Names of the values this function passes to its callback, if declared
    pub fn result_names(&self) -> Option<Rc<[String]>> {
        self.0.result_names.borrow().clone()
    }

    /// Declare the names of the values passed to the callback
    pub fn set_result_names<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        *self.0.result_names.borrow_mut() = Some(Rc::from(names));
    }

    /// Share another function's declared result names
    pub fn inherit_result_names(&self, from: &JsFunction) {
        *self.0.result_names.borrow_mut() = from.result_names();
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.0.name)
    }
}
