//! Host interfaces: what the embedding runtime supplies
//!
//! The utility layer never reaches into the engine directly. Module
//! loading, the platform signal table and the destination of process
//! warnings are all provided through these traits.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{NodeError, NodeResult};
use crate::object::JsObject;

// ============================================================================
// Module loading
// ============================================================================

/// Resolves a module identifier to its exports object on demand.
pub trait ModuleLoader {
    /// Load `id`. Failures propagate to whoever triggered the load.
    fn load(&self, id: &str) -> NodeResult<JsObject>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&str) -> NodeResult<JsObject>,
{
    fn load(&self, id: &str) -> NodeResult<JsObject> {
        self(id)
    }
}

/// A module factory producing an exports object
pub type ModuleFactory = Rc<dyn Fn() -> NodeResult<JsObject>>;

/// Registry of internal modules indexed by identifier.
///
/// Built-in modules register a factory here (e.g., "internal/url",
/// "internal/blob"); the factory runs each time the module is loaded.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: FxHashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module factory by identifier
    pub fn register(&mut self, id: &str, factory: impl Fn() -> NodeResult<JsObject> + 'static) {
        self.factories.insert(id.to_string(), Rc::new(factory));
    }

    /// Check if a module is registered
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Get the number of registered modules
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, id: &str) -> NodeResult<JsObject> {
        match self.factories.get(id) {
            Some(factory) => factory(),
            None => Err(NodeError::ModuleNotFound(id.to_string())),
        }
    }
}

// ============================================================================
// Platform signals
// ============================================================================

/// Platform enumeration of process signals.
pub trait SignalTable: Send + Sync {
    /// `(symbolic name, number)` pairs, e.g. `("SIGTERM", 15)`
    fn entries(&self) -> Vec<(String, i32)>;
}

impl SignalTable for Vec<(String, i32)> {
    fn entries(&self) -> Vec<(String, i32)> {
        self.clone()
    }
}

// ============================================================================
// Process warnings
// ============================================================================

/// Warning category, printed as the warning's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCategory {
    /// Generic `Warning`
    Warning,
    /// `DeprecationWarning`
    Deprecation,
    /// `ExperimentalWarning`
    Experimental,
    /// Any other named category
    Custom(String),
}

impl WarningCategory {
    /// Name as printed
    pub fn name(&self) -> &str {
        match self {
            WarningCategory::Warning => "Warning",
            WarningCategory::Deprecation => "DeprecationWarning",
            WarningCategory::Experimental => "ExperimentalWarning",
            WarningCategory::Custom(name) => name,
        }
    }
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A process warning as handed to a [`WarningSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWarning {
    /// Human-readable message
    pub message: String,
    /// Category (`DeprecationWarning`, ...)
    pub category: WarningCategory,
    /// Stable code such as `DEP0174`
    pub code: Option<String>,
    /// Additional detail line
    pub detail: Option<String>,
    /// Name of the callable the warning is attributed to
    pub source: Option<String>,
}

impl ProcessWarning {
    /// Create a warning with just a message and category
    pub fn new(message: impl Into<String>, category: WarningCategory) -> Self {
        Self {
            message: message.into(),
            category,
            code: None,
            detail: None,
            source: None,
        }
    }

    /// Attach a code
    pub fn with_code(mut self, code: Option<&str>) -> Self {
        self.code = code.map(str::to_string);
        self
    }

    /// Attach a detail line
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attribute the warning to a callable
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ProcessWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{}] ", code)?;
        }
        write!(f, "{}: {}", self.category, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n{}", detail)?;
        }
        Ok(())
    }
}

/// Destination for process warnings. Emission is infallible.
pub trait WarningSink: Send + Sync {
    /// Deliver one warning
    fn emit(&self, warning: &ProcessWarning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::cell::Cell;

    #[test]
    fn test_registry_loads_and_reports_missing() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let mut registry = ModuleRegistry::new();
        registry.register("internal/answer", move || {
            counter.set(counter.get() + 1);
            Ok(JsObject::from_entries([("answer", Value::from(42))]))
        });

        assert!(registry.contains("internal/answer"));
        let exports = registry.load("internal/answer").unwrap();
        assert_eq!(exports.get("answer").unwrap(), Value::from(42));
        assert_eq!(loads.get(), 1);

        let err = registry.load("internal/missing").unwrap_err();
        assert_eq!(err.code(), "ERR_MODULE_NOT_FOUND");
    }

    #[test]
    fn test_warning_display() {
        let warning = ProcessWarning::new("old API", WarningCategory::Deprecation)
            .with_code(Some("DEP0001"));
        assert_eq!(warning.to_string(), "[DEP0001] DeprecationWarning: old API");

        let plain = ProcessWarning::new("careful", WarningCategory::Warning).with_detail("more");
        assert_eq!(plain.to_string(), "Warning: careful\nmore");
    }
}
