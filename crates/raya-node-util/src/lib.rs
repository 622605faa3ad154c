//! Raya Node Util - internal utility core of the Node compatibility layer
//!
//! The pieces the `node:` modules are built from:
//!
//! - [`lazy`]: exports that load their module on first access
//! - [`weak_ref`]: weak references with explicit pinning
//! - [`promisify`]: callback-style functions adapted to promises
//! - [`deprecate`]: wrappers that warn once on use
//! - [`signals`]: signal names and numbers
//!
//! plus encoding names, `Blob`/`File`, `DOMException` and the process
//! warning machinery they report through.

#![warn(missing_docs)]

pub mod blob;
pub mod deprecate;
pub mod dom;
pub mod encoding;
pub mod lazy;
pub mod memo;
pub mod process;
pub mod promisify;
pub mod signals;
pub mod warning;
pub mod weak_ref;

pub use blob::{Blob, BlobOptions, BlobPart, File, FileOptions, LineEndings};
pub use deprecate::{
    deprecate, deprecate_in, deprecate_instantiation, deprecate_instantiation_in,
    pending_deprecate, DeprecateOptions,
};
pub use dom::{dom_error, dom_exception_class, lazy_dom_exception};
pub use encoding::{normalize_encoding, Encoding};
pub use lazy::{LazyBinder, LazyCheck, ReplaceableOptions};
pub use memo::{cached_result, once};
pub use process::{emit_experimental_warning, Process, ProcessFlags};
pub use promisify::{promisify, promisify_custom, promisify_in, PROMISE_RETURN_CODE};
pub use signals::{
    convert_to_valid_signal, install_signal_table, signals, signals_to_names, PlatformSignals,
    Signals,
};
pub use warning::{RecordingSink, StderrWarningSink};
pub use weak_ref::WeakReference;
