//! Signal name normalization
//!
//! Signals are accepted either as numbers or as case-insensitive names
//! (`"sigterm"`, `"SIGTERM"`). The name table comes from the platform
//! (libc constants) unless the host installs its own before first use.

use std::sync::{Arc, LazyLock, OnceLock};

use raya_node_sdk::{NodeError, NodeResult, SignalTable, Value};
use rustc_hash::FxHashMap;

/// Signals known on this platform, `name -> number`, in table order
pub struct Signals {
    by_name: FxHashMap<String, i32>,
    by_number: FxHashMap<i32, String>,
    ordered: Vec<(String, i32)>,
}

impl Signals {
    fn build(entries: Vec<(String, i32)>) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_number = FxHashMap::default();
        for (name, number) in &entries {
            by_name.insert(name.clone(), *number);
            // Aliases share a number; the first name listed wins
            by_number.entry(*number).or_insert_with(|| name.clone());
        }
        Self {
            by_name,
            by_number,
            ordered: entries,
        }
    }

    /// Number for an exact (upper-case) name
    pub fn number(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// Canonical name for a number
    pub fn name(&self, number: i32) -> Option<&str> {
        self.by_number.get(&number).map(String::as_str)
    }

    /// `(name, number)` pairs in table order
    pub fn entries(&self) -> &[(String, i32)] {
        &self.ordered
    }

    /// Number of known names
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no signal is known
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

static INSTALLED_TABLE: OnceLock<Arc<dyn SignalTable>> = OnceLock::new();

static SIGNALS: LazyLock<Signals> = LazyLock::new(|| {
    let entries = INSTALLED_TABLE
        .get_or_init(|| Arc::new(PlatformSignals) as Arc<dyn SignalTable>)
        .entries();
    log::debug!("building signal table ({} entries)", entries.len());
    Signals::build(entries)
});

/// Replace the platform table. Only the first installation counts, and
/// only if it happens before the table is first used.
///
/// Returns `false` if a table was already installed or built.
pub fn install_signal_table(table: Arc<dyn SignalTable>) -> bool {
    let installed = INSTALLED_TABLE.set(table).is_ok();
    if !installed {
        log::debug!("signal table already in place, ignoring installed table");
    }
    installed
}

/// The process signal table, built on first use
pub fn signals() -> &'static Signals {
    &SIGNALS
}

/// Number to canonical name, for every known signal
pub fn signals_to_names() -> FxHashMap<i32, String> {
    SIGNALS.by_number.clone()
}

/// Normalize a signal given by number or name to its number.
///
/// Numbers pass through if known; strings are upper-cased and looked up.
/// Everything else is `ERR_UNKNOWN_SIGNAL`.
pub fn convert_to_valid_signal(value: &Value) -> NodeResult<i32> {
    match value {
        Value::Number(n) if n.fract() == 0.0 => {
            let number = *n as i32;
            if f64::from(number) == *n && SIGNALS.name(number).is_some() {
                return Ok(number);
            }
        }
        Value::String(name) => {
            if let Some(number) = SIGNALS.number(&name.to_ascii_uppercase()) {
                return Ok(number);
            }
        }
        _ => {}
    }
    Err(NodeError::UnknownSignal(value.to_string()))
}

// ============================================================================
// Platform table
// ============================================================================

/// Signal constants from libc
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformSignals;

impl SignalTable for PlatformSignals {
    fn entries(&self) -> Vec<(String, i32)> {
        platform_entries()
            .iter()
            .map(|(name, number)| (name.to_string(), *number))
            .collect()
    }
}

#[cfg(unix)]
fn platform_entries() -> Vec<(&'static str, i32)> {
    #[allow(unused_mut)]
    let mut entries = vec![
        ("SIGHUP", libc::SIGHUP),
        ("SIGINT", libc::SIGINT),
        ("SIGQUIT", libc::SIGQUIT),
        ("SIGILL", libc::SIGILL),
        ("SIGTRAP", libc::SIGTRAP),
        ("SIGABRT", libc::SIGABRT),
        ("SIGBUS", libc::SIGBUS),
        ("SIGFPE", libc::SIGFPE),
        ("SIGKILL", libc::SIGKILL),
        ("SIGUSR1", libc::SIGUSR1),
        ("SIGSEGV", libc::SIGSEGV),
        ("SIGUSR2", libc::SIGUSR2),
        ("SIGPIPE", libc::SIGPIPE),
        ("SIGALRM", libc::SIGALRM),
        ("SIGTERM", libc::SIGTERM),
        ("SIGCHLD", libc::SIGCHLD),
        ("SIGCONT", libc::SIGCONT),
        ("SIGSTOP", libc::SIGSTOP),
        ("SIGTSTP", libc::SIGTSTP),
        ("SIGTTIN", libc::SIGTTIN),
        ("SIGTTOU", libc::SIGTTOU),
        ("SIGURG", libc::SIGURG),
        ("SIGXCPU", libc::SIGXCPU),
        ("SIGXFSZ", libc::SIGXFSZ),
        ("SIGVTALRM", libc::SIGVTALRM),
        ("SIGPROF", libc::SIGPROF),
        ("SIGWINCH", libc::SIGWINCH),
        ("SIGIO", libc::SIGIO),
        ("SIGSYS", libc::SIGSYS),
    ];
    #[cfg(target_os = "linux")]
    entries.extend([
        ("SIGIOT", libc::SIGIOT),
        ("SIGPOLL", libc::SIGPOLL),
        ("SIGPWR", libc::SIGPWR),
    ]);
    entries
}

#[cfg(not(unix))]
fn platform_entries() -> Vec<(&'static str, i32)> {
    vec![
        ("SIGINT", libc::SIGINT),
        ("SIGILL", libc::SIGILL),
        ("SIGABRT", libc::SIGABRT),
        ("SIGFPE", libc::SIGFPE),
        ("SIGSEGV", libc::SIGSEGV),
        ("SIGTERM", libc::SIGTERM),
    ]
}
