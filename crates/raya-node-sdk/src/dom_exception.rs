//! DOMException shim
//!
//! Web APIs report failures as `DOMException`s identified by `name`. The
//! numeric `code` is the legacy WebIDL constant for names that have one
//! and 0 for everything else.

use crate::object::JsObject;
use crate::value::Value;

/// Legacy WebIDL error names and their numeric codes
const LEGACY_CODES: &[(&str, u16)] = &[
    ("IndexSizeError", 1),
    ("HierarchyRequestError", 3),
    ("WrongDocumentError", 4),
    ("InvalidCharacterError", 5),
    ("NoModificationAllowedError", 7),
    ("NotFoundError", 8),
    ("NotSupportedError", 9),
    ("InUseAttributeError", 10),
    ("InvalidStateError", 11),
    ("SyntaxError", 12),
    ("InvalidModificationError", 13),
    ("NamespaceError", 14),
    ("InvalidAccessError", 15),
    ("TypeMismatchError", 17),
    ("SecurityError", 18),
    ("NetworkError", 19),
    ("AbortError", 20),
    ("URLMismatchError", 21),
    ("QuotaExceededError", 22),
    ("TimeoutError", 23),
    ("InvalidNodeTypeError", 24),
    ("DataCloneError", 25),
];

/// A named web-platform error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct DomException {
    message: String,
    name: String,
}

impl DomException {
    /// Create an exception; `name` defaults to `"Error"` when empty.
    pub fn new(message: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: message.into(),
            name: if name.is_empty() { "Error".to_string() } else { name },
        }
    }

    /// Exception message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exception name, e.g. `AbortError`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legacy numeric code, 0 if the name has none
    pub fn code(&self) -> u16 {
        LEGACY_CODES
            .iter()
            .find(|(name, _)| *name == self.name)
            .map_or(0, |(_, code)| *code)
    }

    /// Script-visible error object with `name`, `message` and `code`
    pub fn to_value(&self) -> Value {
        let obj = JsObject::new();
        obj.set_data("name", Value::from(self.name.as_str()));
        obj.set_data("message", Value::from(self.message.as_str()));
        obj.set_data("code", Value::Number(f64::from(self.code())));
        Value::Object(obj)
    }
}
