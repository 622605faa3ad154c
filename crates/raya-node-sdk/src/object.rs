//! Objects with ordered own properties and a prototype link
//!
//! Property slots are either plain data, script accessors (getter/setter
//! functions), or native accessors implemented in Rust. Native accessors
//! may ask the object to replace them with a plain data property after a
//! read or write, which is how self-memoizing properties are expressed
//! without rewriting object shape from the outside.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{NodeError, NodeResult};
use crate::function::JsFunction;
use crate::value::{PropertyKey, Value};

// ============================================================================
// Native accessors
// ============================================================================

/// Outcome of reading a native accessor.
pub enum AccessorRead {
    /// Return the value, keep the accessor installed
    Value(Value),
    /// Return the value and replace the accessor with a writable data property
    Memoize(Value),
}

/// Outcome of writing through a native accessor.
pub enum AccessorWrite {
    /// The accessor stored the value itself
    Stored,
    /// Replace the accessor with a writable data property holding the value
    Replace(Value),
}

/// Property accessor implemented natively.
///
/// `receiver` is the object the property was accessed through, which may
/// differ from the object holding the slot when it is inherited.
pub trait NativeAccessor {
    /// Produce the property value
    fn get(&self, receiver: &JsObject) -> NodeResult<AccessorRead>;

    /// Accept a write. Accessors without a setter return `ReadOnlyProperty`.
    fn set(&self, receiver: &JsObject, value: Value) -> NodeResult<AccessorWrite>;

    /// Whether a setter is installed
    fn has_setter(&self) -> bool {
        true
    }
}

// ============================================================================
// Property descriptors
// ============================================================================

/// Storage behind a property
#[derive(Clone)]
pub enum PropertySlot {
    /// Plain value
    Data {
        /// Stored value
        value: Value,
        /// Whether assignments are allowed
        writable: bool,
    },
    /// Script getter/setter pair
    Accessor {
        /// Getter function
        get: Option<JsFunction>,
        /// Setter function
        set: Option<JsFunction>,
    },
    /// Accessor implemented in Rust
    Native(Rc<dyn NativeAccessor>),
}

/// Full description of an own property.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Value or accessor storage
    pub slot: PropertySlot,
    /// Listed by [`JsObject::keys`]
    pub enumerable: bool,
    /// May be redefined
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data property
    pub fn data(value: Value) -> Self {
        Self {
            slot: PropertySlot::Data { value, writable: true },
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-enumerable, non-writable, configurable data property
    pub fn hidden(value: Value) -> Self {
        Self {
            slot: PropertySlot::Data { value, writable: false },
            enumerable: false,
            configurable: true,
        }
    }

    /// Configurable property backed by a native accessor
    pub fn native(accessor: Rc<dyn NativeAccessor>, enumerable: bool) -> Self {
        Self {
            slot: PropertySlot::Native(accessor),
            enumerable,
            configurable: true,
        }
    }

    /// Whether the descriptor stores a value directly
    pub fn is_data(&self) -> bool {
        matches!(self.slot, PropertySlot::Data { .. })
    }

    /// Whether assignments may succeed through this descriptor
    pub fn is_writable(&self) -> bool {
        match &self.slot {
            PropertySlot::Data { writable, .. } => *writable,
            PropertySlot::Accessor { set, .. } => set.is_some(),
            PropertySlot::Native(acc) => acc.has_setter(),
        }
    }

    /// The stored value of a data property
    pub fn value(&self) -> Option<&Value> {
        match &self.slot {
            PropertySlot::Data { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ============================================================================
// JsObject
// ============================================================================

struct ObjectData {
    properties: IndexMap<PropertyKey, PropertyDescriptor>,
    prototype: Option<JsObject>,
}

/// Shared handle to a script object. Cloning shares the object.
#[derive(Clone)]
pub struct JsObject(Rc<RefCell<ObjectData>>);

impl JsObject {
    /// Create an empty object with no prototype
    pub fn new() -> Self {
        Self::with_prototype(None)
    }

    /// Create an empty object inheriting from `prototype`
    pub fn with_prototype(prototype: Option<JsObject>) -> Self {
        JsObject(Rc::new(RefCell::new(ObjectData {
            properties: IndexMap::new(),
            prototype,
        })))
    }

    /// Create an object from `(key, value)` data properties, in order
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let obj = Self::new();
        for (key, value) in entries {
            obj.set_data(key, value);
        }
        obj
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Prototype link
    pub fn prototype(&self) -> Option<JsObject> {
        self.0.borrow().prototype.clone()
    }

    /// Replace the prototype link
    pub fn set_prototype(&self, prototype: Option<JsObject>) {
        self.0.borrow_mut().prototype = prototype;
    }

    /// Check whether `self` appears in the prototype chain of `other`
    pub fn is_prototype_of(&self, other: &JsObject) -> bool {
        let mut current = other.prototype();
        while let Some(obj) = current {
            if obj.ptr_eq(self) {
                return true;
            }
            current = obj.prototype();
        }
        false
    }

    /// Define (or redefine) an own property.
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: PropertyDescriptor,
    ) -> NodeResult<()> {
        let key = key.into();
        let mut data = self.0.borrow_mut();
        if let Some(existing) = data.properties.get(&key) {
            if !existing.configurable {
                return Err(NodeError::NonConfigurable(key.to_string()));
            }
        }
        data.properties.insert(key, descriptor);
        Ok(())
    }

    /// Install a plain writable data property, overwriting whatever is there.
    pub fn set_data(&self, key: impl Into<PropertyKey>, value: Value) {
        self.0
            .borrow_mut()
            .properties
            .insert(key.into(), PropertyDescriptor::data(value));
    }

    /// Insert a descriptor unconditionally (used while building fresh objects)
    pub(crate) fn insert_property(&self, key: impl Into<PropertyKey>, descriptor: PropertyDescriptor) {
        self.0.borrow_mut().properties.insert(key.into(), descriptor);
    }

    /// Own property descriptor, if present
    pub fn get_own_property(&self, key: impl Into<PropertyKey>) -> Option<PropertyDescriptor> {
        self.0.borrow().properties.get(&key.into()).cloned()
    }

    /// All own property descriptors in definition order
    pub fn own_property_descriptors(&self) -> Vec<(PropertyKey, PropertyDescriptor)> {
        self.0
            .borrow()
            .properties
            .iter()
            .map(|(k, d)| (k.clone(), d.clone()))
            .collect()
    }

    /// All own property keys (strings and symbols) in definition order
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Enumerable own string keys in definition order
    pub fn keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .properties
            .iter()
            .filter(|(_, d)| d.enumerable)
            .filter_map(|(k, _)| k.as_str().map(str::to_string))
            .collect()
    }

    /// Check for an own property
    pub fn has_own(&self, key: impl Into<PropertyKey>) -> bool {
        self.0.borrow().properties.contains_key(&key.into())
    }

    /// Check for a property anywhere on the prototype chain
    pub fn has(&self, key: impl Into<PropertyKey>) -> bool {
        self.find(&key.into()).is_some()
    }

    /// Read a property, following the prototype chain.
    ///
    /// Missing properties read as `undefined`.
    pub fn get(&self, key: impl Into<PropertyKey>) -> NodeResult<Value> {
        let key = key.into();
        let Some((holder, descriptor)) = self.find(&key) else {
            return Ok(Value::Undefined);
        };
        match descriptor.slot {
            PropertySlot::Data { value, .. } => Ok(value),
            PropertySlot::Accessor { get: Some(getter), .. } => {
                getter.call(&Value::Object(self.clone()), &[])
            }
            PropertySlot::Accessor { get: None, .. } => Ok(Value::Undefined),
            PropertySlot::Native(accessor) => match accessor.get(self)? {
                AccessorRead::Value(value) => Ok(value),
                AccessorRead::Memoize(value) => {
                    holder.replace_with_data(&key, value.clone());
                    Ok(value)
                }
            },
        }
    }

    /// Assign a property.
    ///
    /// Writable own data properties are updated in place, accessors found
    /// on the chain receive the write, and anything else creates a new own
    /// data property.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> NodeResult<()> {
        let key = key.into();
        let Some((holder, descriptor)) = self.find(&key) else {
            self.set_data(key, value);
            return Ok(());
        };
        match descriptor.slot {
            PropertySlot::Data { writable: false, .. } => {
                Err(NodeError::ReadOnlyProperty(key.to_string()))
            }
            PropertySlot::Data { writable: true, .. } => {
                if holder.ptr_eq(self) {
                    self.replace_with_data(&key, value);
                } else {
                    self.set_data(key, value);
                }
                Ok(())
            }
            PropertySlot::Accessor { set: Some(setter), .. } => {
                setter.call(&Value::Object(self.clone()), &[value])?;
                Ok(())
            }
            PropertySlot::Accessor { set: None, .. } => {
                Err(NodeError::ReadOnlyProperty(key.to_string()))
            }
            PropertySlot::Native(accessor) => match accessor.set(self, value)? {
                AccessorWrite::Stored => Ok(()),
                AccessorWrite::Replace(value) => {
                    holder.replace_with_data(&key, value);
                    Ok(())
                }
            },
        }
    }

    /// Locate a property on the chain, returning the holder and a copy of
    /// its descriptor. No borrow is held once this returns.
    fn find(&self, key: &PropertyKey) -> Option<(JsObject, PropertyDescriptor)> {
        let mut current = Some(self.clone());
        while let Some(obj) = current {
            let found = obj.0.borrow().properties.get(key).cloned();
            if let Some(descriptor) = found {
                return Some((obj, descriptor));
            }
            current = obj.prototype();
        }
        None
    }

    /// Turn an existing slot into a writable data property, keeping its
    /// enumerability and configurability.
    fn replace_with_data(&self, key: &PropertyKey, value: Value) {
        let mut data = self.0.borrow_mut();
        let (enumerable, configurable) = data
            .properties
            .get(key)
            .map(|d| (d.enumerable, d.configurable))
            .unwrap_or((true, true));
        data.properties.insert(
            key.clone(),
            PropertyDescriptor {
                slot: PropertySlot::Data { value, writable: true },
                enumerable,
                configurable,
            },
        );
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.own_property_keys();
        f.debug_set().entries(keys.iter()).finish()
    }
}

/// `value instanceof ctor`: true if `ctor.prototype` is on the value's chain.
pub fn instance_of(value: &Value, ctor: &JsFunction) -> bool {
    let (Some(holder), Some(proto)) = (value.property_holder(), ctor.prototype_object()) else {
        return false;
    };
    proto.is_prototype_of(&holder)
}
