//! Process-wide warning state and runtime flags
//!
//! A [`Process`] owns everything the utilities treat as "per process": the
//! deprecation flags, the set of warning codes already reported, the
//! experimental features already announced, and the queue of warnings
//! waiting for the next tick. [`Process::global`] is the instance used by
//! the free functions; embedders and tests can build isolated instances.

use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use raya_node_sdk::{ProcessWarning, WarningCategory, WarningSink};
use rustc_hash::FxHashSet;

use crate::warning::StderrWarningSink;

// ============================================================================
// Flags
// ============================================================================

/// Runtime flags that gate warning emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessFlags {
    /// Silence every `DeprecationWarning` (`--no-deprecation`)
    pub no_deprecation: bool,
    /// Enable warnings for soft (pending) deprecations (`--pending-deprecation`)
    pub pending_deprecation: bool,
    /// Silence all process warnings (`--no-warnings`)
    pub no_warnings: bool,
}

impl ProcessFlags {
    /// Read flags from `RAYA_NO_DEPRECATION`, `RAYA_PENDING_DEPRECATION`
    /// and `RAYA_NO_WARNINGS`. A flag is set by `1` or `true`.
    pub fn from_env() -> Self {
        Self {
            no_deprecation: env_flag("RAYA_NO_DEPRECATION"),
            pending_deprecation: env_flag("RAYA_PENDING_DEPRECATION"),
            no_warnings: env_flag("RAYA_NO_WARNINGS"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        Err(_) => false,
    }
}

// ============================================================================
// Process
// ============================================================================

static GLOBAL_PROCESS: LazyLock<Arc<Process>> = LazyLock::new(|| {
    Arc::new(Process::new(ProcessFlags::from_env(), Arc::new(StderrWarningSink)))
});

/// Process-scoped warning state. Initialized on first use, never torn down.
pub struct Process {
    flags: RwLock<ProcessFlags>,
    sink: RwLock<Arc<dyn WarningSink>>,
    pending: Mutex<VecDeque<ProcessWarning>>,
    warned_codes: Mutex<FxHashSet<String>>,
    experimental_features: Mutex<FxHashSet<String>>,
}

impl Process {
    /// Create an isolated process state
    pub fn new(flags: ProcessFlags, sink: Arc<dyn WarningSink>) -> Self {
        Self {
            flags: RwLock::new(flags),
            sink: RwLock::new(sink),
            pending: Mutex::new(VecDeque::new()),
            warned_codes: Mutex::new(FxHashSet::default()),
            experimental_features: Mutex::new(FxHashSet::default()),
        }
    }

    /// The process-wide instance (flags from the environment, stderr sink)
    pub fn global() -> Arc<Process> {
        GLOBAL_PROCESS.clone()
    }

    /// Current flags
    pub fn flags(&self) -> ProcessFlags {
        *self.flags.read()
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: ProcessFlags) {
        *self.flags.write() = flags;
    }

    /// Modify the flags in place
    pub fn update_flags(&self, f: impl FnOnce(&mut ProcessFlags)) {
        f(&mut *self.flags.write());
    }

    /// Route warnings to a different sink
    pub fn set_warning_sink(&self, sink: Arc<dyn WarningSink>) {
        *self.sink.write() = sink;
    }

    // ========================================================================
    // Emission
    // ========================================================================

    /// Queue a warning for delivery on the next [`drain_warnings`](Self::drain_warnings).
    pub fn emit_warning(&self, warning: ProcessWarning) {
        if self.is_suppressed(&warning) {
            return;
        }
        self.pending.lock().push_back(warning);
    }

    /// Deliver a warning immediately.
    pub fn emit_warning_sync(&self, warning: ProcessWarning) {
        if self.is_suppressed(&warning) {
            return;
        }
        self.deliver(&warning);
    }

    /// Deliver every queued warning in order. Returns how many were delivered.
    pub fn drain_warnings(&self) -> usize {
        let drained: Vec<ProcessWarning> = self.pending.lock().drain(..).collect();
        for warning in &drained {
            self.deliver(warning);
        }
        drained.len()
    }

    /// Number of warnings waiting for delivery
    pub fn pending_warnings(&self) -> usize {
        self.pending.lock().len()
    }

    fn is_suppressed(&self, warning: &ProcessWarning) -> bool {
        let flags = self.flags();
        let suppressed = flags.no_warnings
            || (warning.category == WarningCategory::Deprecation && flags.no_deprecation);
        if suppressed {
            log::trace!("suppressed {}: {}", warning.category, warning.message);
        }
        suppressed
    }

    fn deliver(&self, warning: &ProcessWarning) {
        let sink = self.sink.read().clone();
        log::debug!("emitting {} ({:?})", warning.category, warning.code);
        sink.emit(warning);
    }

    // ========================================================================
    // Once-per-process bookkeeping
    // ========================================================================

    /// Record `code` as reported. Returns `true` only the first time.
    pub fn claim_warning_code(&self, code: &str) -> bool {
        self.warned_codes.lock().insert(code.to_string())
    }

    /// Claim `code` for a deprecation warning. Returns `false` without
    /// claiming while `no_deprecation` is set, so the notice is still
    /// available once the flag is cleared.
    pub fn claim_deprecation_code(&self, code: &str) -> bool {
        if self.flags().no_deprecation {
            log::trace!("deprecation {} suppressed before claim", code);
            return false;
        }
        self.claim_warning_code(code)
    }

    /// Whether `code` has already been reported
    pub fn has_warned_code(&self, code: &str) -> bool {
        self.warned_codes.lock().contains(code)
    }

    /// Announce an experimental feature once per process.
    ///
    /// Returns `true` if this call emitted the warning.
    pub fn emit_experimental_warning(&self, feature: &str) -> bool {
        if !self.experimental_features.lock().insert(feature.to_string()) {
            return false;
        }
        self.emit_warning(ProcessWarning::new(
            format!("{} is an experimental feature and might change at any time", feature),
            WarningCategory::Experimental,
        ));
        true
    }
}

/// Announce an experimental feature on the global process.
pub fn emit_experimental_warning(feature: &str) -> bool {
    Process::global().emit_experimental_warning(feature)
}
