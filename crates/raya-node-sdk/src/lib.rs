//! Raya Node SDK - value model and host interfaces for Node compatibility
//!
//! This crate provides the narrow surface the Node compatibility utilities
//! are written against: dynamic values, objects with ordered properties and
//! prototype links, callable/constructible functions, single-threaded
//! promises, and the traits an embedding host implements (module loading,
//! signal enumeration, warning delivery).
//!
//! Everything here is `Rc`-based and meant for single-threaded, cooperative
//! use; process-wide tables live behind `parking_lot` locks.

#![warn(missing_docs)]

pub mod dom_exception;
pub mod error;
pub mod function;
pub mod host;
pub mod object;
pub mod promise;
pub mod value;

pub use dom_exception::DomException;
pub use error::{NodeError, NodeResult};
pub use function::{CallFn, ConstructFn, FunctionKind, JsFunction};
pub use host::{
    ModuleFactory, ModuleLoader, ModuleRegistry, ProcessWarning, SignalTable, WarningCategory,
    WarningSink,
};
pub use object::{
    instance_of, AccessorRead, AccessorWrite, JsObject, NativeAccessor, PropertyDescriptor,
    PropertySlot,
};
pub use promise::{Promise, Resolver, Settlement};
pub use value::{PropertyKey, Symbol, Value};
