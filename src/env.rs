use crate::sys;
use std::env as stdenv;
use std::path::PathBuf;

/// State that survives across dispatch cycles.
///
/// The current working directory is the only mutable piece: `cd` writes it,
/// the prompt and `pwd` read it. Everything else the interpreter touches is
/// rebuilt fresh each cycle.
#[derive(Debug, Clone)]
pub struct Session {
    /// The working directory commands run in, kept in sync with the process
    /// working directory.
    pub current_dir: PathBuf,
}

impl Session {
    /// Capture the process working directory into a new session.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { current_dir }
    }

    /// The directory `cd` falls back to when invoked without an argument:
    /// `$HOME` if set, otherwise the account database entry for the
    /// current user.
    pub fn home_dir(&self) -> Option<PathBuf> {
        stdenv::var_os("HOME")
            .map(PathBuf::from)
            .or_else(|| sys::account_by_uid(sys::current_uid()).map(|acct| acct.home))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes tests that read or move the process working directory, which
/// is shared state across the whole test binary.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}
