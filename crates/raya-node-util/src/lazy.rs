//! Lazily loaded properties
//!
//! Binds properties of a target object to the exports of a module that is
//! only loaded when one of them is first read. All keys registered by one
//! call share a single load.
//!
//! Two flavours exist:
//! - [`LazyBinder::define_lazy`]: the first successful read (or any write)
//!   turns the property into a plain writable data property.
//! - [`LazyBinder::define_replaceable_lazy_attribute`]: the accessor stays
//!   installed; an optional `check` runs on every read and the property can
//!   be made read-only.

use std::cell::RefCell;
use std::rc::Rc;

use raya_node_sdk::{
    AccessorRead, AccessorWrite, JsObject, ModuleLoader, NativeAccessor, NodeError, NodeResult,
    PropertyDescriptor, Value,
};

/// Receiver check run before every read of a replaceable attribute
pub type LazyCheck = Rc<dyn Fn(&JsObject) -> NodeResult<()>>;

// ============================================================================
// Shared module handle
// ============================================================================

/// One load shared by every key registered in a single define call.
struct LazyModule {
    loader: Rc<dyn ModuleLoader>,
    id: String,
    exports: RefCell<Option<JsObject>>,
}

impl LazyModule {
    /// Exports, loading the module if needed. Failures are not cached.
    fn exports(&self) -> NodeResult<JsObject> {
        if let Some(exports) = self.exports.borrow().as_ref() {
            return Ok(exports.clone());
        }
        log::debug!("loading lazy module '{}'", self.id);
        let exports = self.loader.load(&self.id)?;
        *self.exports.borrow_mut() = Some(exports.clone());
        Ok(exports)
    }
}

// ============================================================================
// Accessor state
// ============================================================================

/// Where a lazy property's value comes from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LazyState {
    /// Nothing read or written yet
    Unresolved,
    /// Written before the loader produced a value; the loader is bypassed
    ExternallySet(Value),
    /// Produced by the loader and cached
    Resolved(Value),
}

enum LazyMode {
    /// Become a data property once a value is known
    Memoizing,
    /// Stay an accessor
    Replaceable {
        writable: bool,
        check: Option<LazyCheck>,
    },
}

struct LazyAccessor {
    key: String,
    module: Rc<LazyModule>,
    mode: LazyMode,
    state: RefCell<LazyState>,
}

impl LazyAccessor {
    fn memoizing(&self) -> bool {
        matches!(self.mode, LazyMode::Memoizing)
    }

    fn is_absent(&self, value: &Value) -> bool {
        match self.mode {
            LazyMode::Memoizing => value.is_undefined(),
            LazyMode::Replaceable { .. } => value.is_nullish(),
        }
    }

    fn load(&self) -> NodeResult<Value> {
        let value = self.module.exports()?.get(self.key.as_str())?;
        if !self.is_absent(&value) {
            *self.state.borrow_mut() = LazyState::Resolved(value.clone());
        }
        Ok(value)
    }
}

impl NativeAccessor for LazyAccessor {
    fn get(&self, receiver: &JsObject) -> NodeResult<AccessorRead> {
        if let LazyMode::Replaceable { check: Some(check), .. } = &self.mode {
            check(receiver)?;
        }
        let cached = match &*self.state.borrow() {
            LazyState::Unresolved => None,
            LazyState::ExternallySet(v) | LazyState::Resolved(v) => Some(v.clone()),
        };
        let value = match cached {
            Some(value) => value,
            None => self.load()?,
        };
        if self.memoizing() && !self.is_absent(&value) {
            Ok(AccessorRead::Memoize(value))
        } else {
            Ok(AccessorRead::Value(value))
        }
    }

    fn set(&self, _receiver: &JsObject, value: Value) -> NodeResult<AccessorWrite> {
        match self.mode {
            LazyMode::Replaceable { writable: false, .. } => {
                Err(NodeError::ReadOnlyProperty(self.key.clone()))
            }
            LazyMode::Replaceable { writable: true, .. } => {
                *self.state.borrow_mut() = LazyState::ExternallySet(value);
                Ok(AccessorWrite::Stored)
            }
            // The slot becomes plain data; no state to keep
            LazyMode::Memoizing => Ok(AccessorWrite::Replace(value)),
        }
    }

    fn has_setter(&self) -> bool {
        !matches!(self.mode, LazyMode::Replaceable { writable: false, .. })
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Options for [`LazyBinder::define_replaceable_lazy_attribute`]
#[derive(Clone)]
pub struct ReplaceableOptions {
    /// Install a setter (default `true`)
    pub writable: bool,
    /// Run before every read with the receiver
    pub check: Option<LazyCheck>,
}

impl Default for ReplaceableOptions {
    fn default() -> Self {
        Self {
            writable: true,
            check: None,
        }
    }
}

impl ReplaceableOptions {
    /// No setter installed; writes fail
    pub fn read_only() -> Self {
        Self {
            writable: false,
            check: None,
        }
    }

    /// Attach a receiver check
    pub fn with_check(mut self, check: impl Fn(&JsObject) -> NodeResult<()> + 'static) -> Self {
        self.check = Some(Rc::new(check));
        self
    }
}

/// Installs lazy properties backed by a module loader.
#[derive(Clone)]
pub struct LazyBinder {
    loader: Rc<dyn ModuleLoader>,
}

impl LazyBinder {
    /// Bind against `loader`
    pub fn new(loader: Rc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }

    fn module(&self, id: &str) -> Rc<LazyModule> {
        Rc::new(LazyModule {
            loader: self.loader.clone(),
            id: id.to_string(),
            exports: RefCell::new(None),
        })
    }

    /// Install self-memoizing properties `keys` on `target`, each resolving
    /// to the same-named export of module `id`.
    ///
    /// Fails only if one of the keys is already a non-configurable property.
    pub fn define_lazy(
        &self,
        target: &JsObject,
        id: &str,
        keys: &[&str],
        enumerable: bool,
    ) -> NodeResult<()> {
        let module = self.module(id);
        for key in keys {
            let accessor = LazyAccessor {
                key: key.to_string(),
                module: module.clone(),
                mode: LazyMode::Memoizing,
                state: RefCell::new(LazyState::Unresolved),
            };
            target.define_property(*key, PropertyDescriptor::native(Rc::new(accessor), enumerable))?;
        }
        Ok(())
    }

    /// Install enumerable accessor properties `keys` on `target` that load
    /// from module `id` and stay accessors (replaceable by assignment unless
    /// `options.writable` is false).
    pub fn define_replaceable_lazy_attribute(
        &self,
        target: &JsObject,
        id: &str,
        keys: &[&str],
        options: ReplaceableOptions,
    ) -> NodeResult<()> {
        let module = self.module(id);
        for key in keys {
            let accessor = LazyAccessor {
                key: key.to_string(),
                module: module.clone(),
                mode: LazyMode::Replaceable {
                    writable: options.writable,
                    check: options.check.clone(),
                },
                state: RefCell::new(LazyState::Unresolved),
            };
            target.define_property(*key, PropertyDescriptor::native(Rc::new(accessor), true))?;
        }
        Ok(())
    }
}
