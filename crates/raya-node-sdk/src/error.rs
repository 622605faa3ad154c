//! Error types for the Node compatibility layer
//!
//! Every variant maps onto a Node-style error code (see [`NodeError::code`])
//! so hosts can surface `err.code` the way scripts expect.

use crate::dom_exception::DomException;
use crate::object::JsObject;
use crate::value::Value;

/// Result type for Node compatibility operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Node compatibility error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum NodeError {
    /// An argument had the wrong type
    #[error("The \"{name}\" argument must be of type {expected}. Received {received}")]
    InvalidArgType {
        /// Argument name as it appears in the public API
        name: String,
        /// Expected type description
        expected: String,
        /// Description of the received value
        received: String,
    },

    /// An argument had the right type but an unsupported value
    #[error("The argument '{name}' {reason}. Received {received}")]
    InvalidArgValue {
        /// Argument name
        name: String,
        /// Why the value was rejected
        reason: String,
        /// Description of the received value
        received: String,
    },

    /// Signal number or name not known on this platform
    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    /// A numeric value fell outside its allowed range
    #[error("The value of \"{name}\" is out of range. It must be {range}. Received {received}")]
    OutOfRange {
        /// Name of the offending value
        name: String,
        /// Allowed range description
        range: String,
        /// Received value
        received: String,
    },

    /// `new` was applied to a plain callable
    #[error("{0} is not a constructor")]
    NotConstructible(String),

    /// Write to a non-writable property or an accessor without a setter
    #[error("Cannot assign to read only property '{0}' of object")]
    ReadOnlyProperty(String),

    /// Redefinition of a non-configurable property
    #[error("Cannot redefine property: {0}")]
    NonConfigurable(String),

    /// Module loader could not resolve an identifier
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Generic TypeError raised by the object model
    #[error("{0}")]
    Type(String),

    /// Web-platform error
    #[error(transparent)]
    Dom(#[from] DomException),

    /// A script-level value thrown by user code, propagated unchanged
    #[error("Uncaught {0}")]
    Thrown(Value),
}

impl NodeError {
    /// Shorthand for an `ERR_INVALID_ARG_TYPE` error.
    pub fn invalid_arg_type(name: &str, expected: &str, received: &Value) -> Self {
        NodeError::InvalidArgType {
            name: name.to_string(),
            expected: expected.to_string(),
            received: describe_received(received),
        }
    }

    /// Node-style error code (`err.code`)
    pub fn code(&self) -> &'static str {
        match self {
            NodeError::InvalidArgType { .. } => "ERR_INVALID_ARG_TYPE",
            NodeError::InvalidArgValue { .. } => "ERR_INVALID_ARG_VALUE",
            NodeError::UnknownSignal(_) => "ERR_UNKNOWN_SIGNAL",
            NodeError::OutOfRange { .. } => "ERR_OUT_OF_RANGE",
            NodeError::ModuleNotFound(_) => "ERR_MODULE_NOT_FOUND",
            NodeError::NotConstructible(_)
            | NodeError::ReadOnlyProperty(_)
            | NodeError::NonConfigurable(_)
            | NodeError::Type(_) => "ERR_TYPE",
            NodeError::Dom(_) => "ERR_DOM_EXCEPTION",
            NodeError::Thrown(_) => "ERR_UNCAUGHT",
        }
    }

    /// Constructor name the error surfaces as in script land.
    pub fn error_name(&self) -> &'static str {
        match self {
            NodeError::OutOfRange { .. } => "RangeError",
            NodeError::ModuleNotFound(_) => "Error",
            NodeError::Thrown(_) => "Error",
            NodeError::Dom(_) => "DOMException",
            _ => "TypeError",
        }
    }

    /// Convert into a script-visible value.
    ///
    /// Thrown values are returned as-is and DOM exceptions keep their own
    /// shape; everything else becomes a plain
    /// error object carrying `name`, `message` and `code`.
    pub fn into_value(self) -> Value {
        match self {
            NodeError::Thrown(value) => value,
            NodeError::Dom(exception) => exception.to_value(),
            other => {
                let obj = JsObject::new();
                obj.set_data("name", Value::from(other.error_name()));
                obj.set_data("message", Value::from(other.to_string()));
                obj.set_data("code", Value::from(other.code()));
                Value::Object(obj)
            }
        }
    }
}

impl From<Value> for NodeError {
    fn from(value: Value) -> Self {
        NodeError::Thrown(value)
    }
}

/// Render a received value the way Node's argument validators do.
fn describe_received(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Function(f) => format!("function {}", f.name()),
        Value::Object(_) => "an instance of Object".to_string(),
        Value::Promise(_) => "an instance of Promise".to_string(),
        Value::String(s) => format!("type string ('{}')", s),
        other => format!("type {} ({})", other.type_of(), other),
    }
}
