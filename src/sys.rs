//! Thin safe wrappers over the libc account and system queries that have no
//! portable equivalent in std.
//!
//! Each wrapper copies the data it needs out of the C library's static
//! storage before returning, so callers never hold raw pointers.

use std::ffi::{CStr, CString};
use std::io;
use std::path::PathBuf;

/// One entry of the user account database.
#[derive(Debug, Clone)]
pub struct Account {
    pub uid: libc::uid_t,
    pub gid: libc::gid_t,
    pub name: String,
    pub home: PathBuf,
}

/// Real user id of the calling process.
pub fn current_uid() -> libc::uid_t {
    // getuid cannot fail.
    unsafe { libc::getuid() }
}

/// Look up an account by numeric user id.
pub fn account_by_uid(uid: libc::uid_t) -> Option<Account> {
    let pw = unsafe { libc::getpwuid(uid) };
    // Safety: getpwuid returns null or a pointer valid until the next
    // passwd query on this thread; copy_account reads it immediately.
    unsafe { copy_account(pw) }
}

/// Look up an account by login name.
pub fn account_by_name(name: &str) -> Option<Account> {
    let cname = CString::new(name).ok()?;
    let pw = unsafe { libc::getpwnam(cname.as_ptr()) };
    unsafe { copy_account(pw) }
}

unsafe fn copy_account(pw: *const libc::passwd) -> Option<Account> {
    if pw.is_null() {
        return None;
    }
    unsafe {
        Some(Account {
            uid: (*pw).pw_uid,
            gid: (*pw).pw_gid,
            name: CStr::from_ptr((*pw).pw_name).to_string_lossy().into_owned(),
            home: PathBuf::from(CStr::from_ptr((*pw).pw_dir).to_string_lossy().into_owned()),
        })
    }
}

/// Name of the group with the given id, if the group database knows it.
pub fn group_name(gid: libc::gid_t) -> Option<String> {
    let gr = unsafe { libc::getgrgid(gid) };
    if gr.is_null() {
        return None;
    }
    unsafe { Some(CStr::from_ptr((*gr).gr_name).to_string_lossy().into_owned()) }
}

/// The five classic utsname fields.
#[derive(Debug, Clone)]
pub struct SystemName {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

/// Query the kernel identification via uname(2).
pub fn system_name() -> io::Result<SystemName> {
    let mut raw: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut raw) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(SystemName {
        sysname: field(&raw.sysname),
        nodename: field(&raw.nodename),
        release: field(&raw.release),
        version: field(&raw.version),
        machine: field(&raw.machine),
    })
}

fn field(raw: &[libc::c_char]) -> String {
    // The kernel null-terminates every utsname member.
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}
