//! External fallback: commands absent from the table are delegated to a
//! program located on `PATH`, run in the foreground and reaped before the
//! next prompt.

use crate::env::Session;
use crate::lexer::Invocation;
use anyhow::{Context, Result, bail};
use std::borrow::Cow;
use std::env as stdenv;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Conventional process exit code. 0 is success.
pub type ExitCode = i32;

/// Build the argument vector handed to the external program: the command
/// name, then every option, then every positional.
///
/// Options are always placed before positionals even when the original line
/// interleaved them. That reordering is long-standing observable behavior of
/// this interpreter and is kept deliberately.
pub fn build_argv(inv: &Invocation) -> Vec<String> {
    let mut argv = Vec::with_capacity(1 + inv.options.len() + inv.positionals.len());
    argv.push(inv.name.clone());
    argv.extend(inv.options.iter().cloned());
    argv.extend(inv.positionals.iter().cloned());
    argv
}

/// Spawn the external program named by the invocation and block until it
/// exits.
///
/// The program is resolved on `PATH` first; an unresolvable name fails
/// before anything is spawned. The child is always waited on, so no zombie
/// outlives the cycle. Exits caused by a signal are mapped to `128 + signal`
/// the way most shells report them.
pub fn spawn_and_wait(inv: &Invocation, session: &Session) -> Result<ExitCode> {
    let search_paths = stdenv::var_os("PATH").unwrap_or_default();
    let Some(program) = resolve_program(&search_paths, Path::new(&inv.name)) else {
        bail!("command not found");
    };

    let argv = build_argv(inv);
    let mut child = Command::new(program.as_ref())
        .args(&argv[1..])
        .current_dir(&session.current_dir)
        .spawn()
        .context("cannot start process")?;

    let status = child.wait().context("wait failed")?;
    match status.code() {
        Some(code) => Ok(code),
        None => Ok(signal_exit_code(status)),
    }
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> ExitCode {
    -1
}

/// Resolve a command name the way execvp would.
///
/// - Absolute path: used as-is if it exists.
/// - A path with separators (`bin/tool`, `./tool`): resolved against the
///   current directory.
/// - A bare name: the first match found walking the `PATH` directories.
///
/// Returns a borrowed path when no search was needed.
pub fn resolve_program<'a>(search_paths: &OsStr, name: &'a Path) -> Option<Cow<'a, Path>> {
    if name.as_os_str().is_empty() {
        return None;
    }
    if name.is_absolute() || name.components().count() > 1 {
        return name.exists().then_some(Cow::Borrowed(name));
    }
    find_in_path(search_paths, name.as_os_str()).map(Cow::Owned)
}

fn find_in_path(search_paths: &OsStr, name: &OsStr) -> Option<PathBuf> {
    stdenv::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}
