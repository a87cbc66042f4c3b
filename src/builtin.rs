//! Built-in command bodies and the fixed command table.
//!
//! Every built-in is a unit struct implementing [`Builtin`]; the table wires
//! each one to its name, arity contract, accepted flag and usage hint. The
//! table is built once, is never mutated, and lookup is a linear scan with
//! exact case-sensitive matching.

use crate::command::{Arity, Builtin, Descriptor};
use crate::env::Session;
use crate::lexer::{Invocation, MAX_POSITIONALS};
use crate::sys;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use std::env as stdenv;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The command table, in its original order. Names are unique.
pub static COMMANDS: &[Descriptor] = &[
    Descriptor { name: "cp", handler: &Cp, arity: Arity::Exact(2), flag: None, usage: "SOURCE DEST" },
    Descriptor { name: "echo", handler: &Echo, arity: Arity::AtMost(MAX_POSITIONALS), flag: None, usage: "[WORDS]" },
    Descriptor { name: "help", handler: &Help, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "ls", handler: &Ls, arity: Arity::AtMost(1), flag: Some("-l"), usage: "[DIRECTORY]" },
    Descriptor { name: "exit", handler: &Exit, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "rmdir", handler: &Rmdir, arity: Arity::Exact(1), flag: None, usage: "DIRECTORY" },
    Descriptor { name: "rm", handler: &Rm, arity: Arity::Exact(1), flag: None, usage: "FILE" },
    Descriptor { name: "pwd", handler: &Pwd, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "hostname", handler: &Hostname, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "whoami", handler: &Whoami, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "cd", handler: &Cd, arity: Arity::AtMost(1), flag: None, usage: "[DIRECTORY]" },
    Descriptor { name: "uname", handler: &Uname, arity: Arity::Exact(0), flag: Some("-a"), usage: "" },
    Descriptor { name: "mkdir", handler: &Mkdir, arity: Arity::Exact(1), flag: None, usage: "DIRECTORY" },
    Descriptor { name: "mv", handler: &Mv, arity: Arity::Exact(2), flag: None, usage: "SOURCE DEST" },
    Descriptor { name: "ln", handler: &Ln, arity: Arity::Exact(2), flag: Some("-s"), usage: "SOURCE LINK" },
    Descriptor { name: "chmod", handler: &Chmod, arity: Arity::Exact(2), flag: None, usage: "OCTAL-MODE FILE" },
    Descriptor { name: "id", handler: &Id, arity: Arity::AtMost(1), flag: None, usage: "[ACCOUNT]" },
    Descriptor { name: "date", handler: &Date, arity: Arity::Exact(0), flag: None, usage: "" },
    Descriptor { name: "cat", handler: &Cat, arity: Arity::Exact(1), flag: None, usage: "FILE" },
    Descriptor { name: "touch", handler: &Touch, arity: Arity::Exact(1), flag: None, usage: "FILE" },
    Descriptor { name: "sleep", handler: &Sleep, arity: Arity::Exact(1), flag: None, usage: "SECONDS" },
];

/// Find the descriptor for a command name. First match wins; `None` sends
/// the invocation to the external fallback.
pub fn lookup(name: &str) -> Option<&'static Descriptor> {
    COMMANDS.iter().find(|desc| desc.name == name)
}

/// Print the usage triple of every table entry, one per line.
///
/// Shared by the `help` built-in and the startup banner.
pub fn write_listing(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "supported commands:")?;
    for desc in COMMANDS {
        writeln!(out, "{}", desc.usage_line("  "))?;
    }
    writeln!(out)
}

/// Copy a regular file, keeping the source permissions.
pub struct Cp;

impl Builtin for Cp {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        fs::copy(&inv.positionals[0], &inv.positionals[1])
            .with_context(|| inv.positionals[0].clone())?;
        Ok(())
    }
}

/// Print the positional arguments back, space separated.
pub struct Echo;

impl Builtin for Echo {
    fn run(&self, inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", inv.positionals.join(" "))?;
        Ok(())
    }
}

/// List every supported command with its usage triple.
pub struct Help;

impl Builtin for Help {
    fn run(&self, _inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        write_listing(out)?;
        Ok(())
    }
}

/// Directory listing. Plain mode prints names in columns; `-l` prints one
/// attribute line per entry.
pub struct Ls;

const DISPLAY_WIDTH: usize = 80;

impl Builtin for Ls {
    fn run(&self, inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let dir = match inv.positionals.first() {
            Some(d) => PathBuf::from(d),
            None => PathBuf::from("."),
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| dir.display().to_string())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        if inv.has_option("-l") {
            for name in &names {
                write_attr_line(&dir, name, out)?;
            }
        } else {
            write_name_columns(&names, out)?;
        }
        Ok(())
    }
}

fn write_name_columns(names: &[String], out: &mut dyn Write) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    // Longest name plus padding decides the column width; as many columns
    // as fit in the display width, but always at least one.
    let column = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 4;
    let per_line = (DISPLAY_WIDTH / column).max(1);
    for (i, name) in names.iter().enumerate() {
        write!(out, "{:<column$}", name)?;
        if (i + 1) % per_line == 0 {
            writeln!(out)?;
        }
    }
    if names.len() % per_line != 0 {
        writeln!(out)?;
    }
    Ok(())
}

fn write_attr_line(dir: &Path, name: &str, out: &mut dyn Write) -> Result<()> {
    use std::os::unix::fs::MetadataExt;

    let path = dir.join(name);
    let md = fs::symlink_metadata(&path).with_context(|| path.display().to_string())?;

    let owner = sys::account_by_uid(md.uid())
        .map(|acct| acct.name)
        .unwrap_or_else(|| md.uid().to_string());
    let group = sys::group_name(md.gid()).unwrap_or_else(|| md.gid().to_string());
    let mtime: DateTime<Local> = md
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    write!(
        out,
        "{} {:>3} {:<8} {:<8} {:>8} {} {}",
        mode_string(&md),
        md.nlink(),
        owner,
        group,
        md.size(),
        mtime.format("%b %d %H:%M"),
        name
    )?;
    if md.file_type().is_symlink() {
        if let Ok(target) = fs::read_link(&path) {
            write!(out, " -> {}", target.display())?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn mode_string(md: &fs::Metadata) -> String {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    let ft = md.file_type();
    let kind = if ft.is_symlink() {
        'l'
    } else if ft.is_dir() {
        'd'
    } else if ft.is_char_device() {
        'c'
    } else if ft.is_block_device() {
        'b'
    } else if ft.is_fifo() {
        'f'
    } else if ft.is_socket() {
        's'
    } else {
        '-'
    };

    let bits = md.permissions().mode();
    let mut s = String::with_capacity(10);
    s.push(kind);
    for shift in [6u32, 3, 0] {
        let triple = (bits >> shift) & 0o7;
        s.push(if triple & 0o4 != 0 { 'r' } else { '-' });
        s.push(if triple & 0o2 != 0 { 'w' } else { '-' });
        s.push(if triple & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

/// Terminate the interpreter with status 0. The only built-in that does not
/// return to the prompt.
pub struct Exit;

impl Builtin for Exit {
    fn run(&self, _inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        std::process::exit(0)
    }
}

/// Remove an empty directory.
pub struct Rmdir;

impl Builtin for Rmdir {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        fs::remove_dir(&inv.positionals[0]).with_context(|| inv.positionals[0].clone())?;
        Ok(())
    }
}

/// Remove one file, or one directory via rmdir semantics.
pub struct Rm;

impl Builtin for Rm {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        let target = &inv.positionals[0];
        let md = fs::symlink_metadata(target).with_context(|| target.clone())?;
        if md.is_dir() {
            fs::remove_dir(target).with_context(|| target.clone())?;
        } else {
            fs::remove_file(target).with_context(|| target.clone())?;
        }
        Ok(())
    }
}

/// Print the session's current working directory.
pub struct Pwd;

impl Builtin for Pwd {
    fn run(&self, _inv: &Invocation, session: &mut Session, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", session.current_dir.display())?;
        Ok(())
    }
}

/// Print the machine's host name.
pub struct Hostname;

impl Builtin for Hostname {
    fn run(&self, _inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let name = hostname::get().context("cannot read the host name")?;
        writeln!(out, "{}", name.to_string_lossy())?;
        Ok(())
    }
}

/// Print the login name of the current user.
pub struct Whoami;

impl Builtin for Whoami {
    fn run(&self, _inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let acct = sys::account_by_uid(sys::current_uid())
            .ok_or_else(|| anyhow!("cannot resolve the current user"))?;
        writeln!(out, "{}", acct.name)?;
        Ok(())
    }
}

/// Change the working directory; without an argument, go home.
pub struct Cd;

impl Builtin for Cd {
    fn run(&self, inv: &Invocation, session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        let target = match inv.positionals.first() {
            Some(dir) => PathBuf::from(dir),
            None => session
                .home_dir()
                .ok_or_else(|| anyhow!("cannot determine the home directory"))?,
        };

        let target = if target.is_absolute() {
            target
        } else {
            session.current_dir.join(target)
        };

        let canonical =
            fs::canonicalize(&target).with_context(|| target.display().to_string())?;
        stdenv::set_current_dir(&canonical)
            .with_context(|| canonical.display().to_string())?;
        session.current_dir = canonical;
        Ok(())
    }
}

/// Print the kernel identification; `-a` adds the full utsname set.
pub struct Uname;

impl Builtin for Uname {
    fn run(&self, inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let un = sys::system_name()?;
        if inv.has_option("-a") {
            writeln!(
                out,
                "{} {} {} {} {}",
                un.sysname, un.nodename, un.release, un.version, un.machine
            )?;
        } else {
            writeln!(out, "{}", un.sysname)?;
        }
        Ok(())
    }
}

/// Create a directory with mode 0755.
pub struct Mkdir;

impl Builtin for Mkdir {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = &inv.positionals[0];
        fs::create_dir(dir).with_context(|| dir.clone())?;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).with_context(|| dir.clone())?;
        Ok(())
    }
}

/// Rename a file.
pub struct Mv;

impl Builtin for Mv {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        fs::rename(&inv.positionals[0], &inv.positionals[1])
            .with_context(|| inv.positionals[0].clone())?;
        Ok(())
    }
}

/// Create a hard link, or a symbolic link with `-s`.
pub struct Ln;

impl Builtin for Ln {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        let (source, link) = (&inv.positionals[0], &inv.positionals[1]);
        if inv.has_option("-s") {
            std::os::unix::fs::symlink(source, link).with_context(|| link.clone())?;
        } else {
            fs::hard_link(source, link).with_context(|| link.clone())?;
        }
        Ok(())
    }
}

/// Set file permissions from an octal mode string.
pub struct Chmod;

impl Builtin for Chmod {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (mode_arg, file) = (&inv.positionals[0], &inv.positionals[1]);
        let mode = u32::from_str_radix(mode_arg, 8)
            .map_err(|_| anyhow!("invalid octal mode \"{}\"", mode_arg))?;
        fs::set_permissions(file, fs::Permissions::from_mode(mode)).with_context(|| file.clone())?;
        Ok(())
    }
}

/// Print uid and gid of the current user, or of a named account.
pub struct Id;

impl Builtin for Id {
    fn run(&self, inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let acct = match inv.positionals.first() {
            Some(name) => {
                sys::account_by_name(name).ok_or_else(|| anyhow!("unknown user \"{}\"", name))?
            }
            None => sys::account_by_uid(sys::current_uid())
                .ok_or_else(|| anyhow!("cannot resolve the current user"))?,
        };
        let group = sys::group_name(acct.gid).unwrap_or_else(|| acct.gid.to_string());
        writeln!(
            out,
            "uid={}({}) gid={}({})",
            acct.uid, acct.name, acct.gid, group
        )?;
        Ok(())
    }
}

/// Print the current local date and time.
pub struct Date;

impl Builtin for Date {
    fn run(&self, _inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", Local::now().format("%a %b %d %H:%M:%S %Y"))?;
        Ok(())
    }
}

/// Write one file's contents to the output.
pub struct Cat;

impl Builtin for Cat {
    fn run(&self, inv: &Invocation, _session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let file = &inv.positionals[0];
        let mut f = fs::File::open(file).with_context(|| file.clone())?;
        io::copy(&mut f, out).with_context(|| file.clone())?;
        Ok(())
    }
}

/// Update a file's modification time, creating it empty when missing.
pub struct Touch;

impl Builtin for Touch {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let file = &inv.positionals[0];
        match fs::OpenOptions::new().write(true).open(file) {
            Ok(f) => f.set_modified(SystemTime::now()).with_context(|| file.clone())?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::File::create(file).with_context(|| file.clone())?;
                fs::set_permissions(file, fs::Permissions::from_mode(0o644))
                    .with_context(|| file.clone())?;
            }
            Err(e) => return Err(e).with_context(|| file.clone()),
        }
        Ok(())
    }
}

/// Suspend the interpreter for a whole number of seconds.
pub struct Sleep;

impl Builtin for Sleep {
    fn run(&self, inv: &Invocation, _session: &mut Session, _out: &mut dyn Write) -> Result<()> {
        let arg = &inv.positionals[0];
        let secs: u64 = arg
            .parse()
            .map_err(|_| anyhow!("invalid number of seconds \"{}\"", arg))?;
        std::thread::sleep(std::time::Duration::from_secs(secs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::lock_current_dir;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!("cmdsh_{}_{}_{}", tag, std::process::id(), nanos));
        fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn inv(name: &str, options: &[&str], positionals: &[&str]) -> Invocation {
        Invocation {
            name: name.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            positionals: positionals.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn run(builtin: &dyn Builtin, i: &Invocation) -> Result<String> {
        let mut session = Session::new();
        let mut out = Vec::new();
        builtin.run(i, &mut session, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn lookup_finds_every_table_entry_exactly() {
        for desc in COMMANDS {
            let found = lookup(desc.name).expect("every name must resolve");
            assert_eq!(found.name, desc.name);
        }
    }

    #[test]
    fn lookup_is_case_sensitive_and_rejects_unknown_names() {
        assert!(lookup("lscpu").is_none());
        assert!(lookup("LS").is_none());
        assert!(lookup("Pwd").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn table_names_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn listing_mentions_every_command() {
        let mut out = Vec::new();
        write_listing(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        for desc in COMMANDS {
            assert!(s.contains(desc.name), "listing is missing {}", desc.name);
        }
        assert!(s.contains("ls  -l  [DIRECTORY]"));
    }

    #[test]
    fn echo_joins_positionals_with_spaces() {
        let s = run(&Echo, &inv("echo", &[], &["hello", "world"])).unwrap();
        assert_eq!(s, "hello world\n");
    }

    #[test]
    fn echo_of_nothing_is_a_bare_newline() {
        let s = run(&Echo, &inv("echo", &[], &[])).unwrap();
        assert_eq!(s, "\n");
    }

    #[test]
    fn cp_copies_contents_and_is_idempotent() {
        let dir = make_unique_temp_dir("cp");
        let src = dir.join("src.txt");
        let dst = dir.join("dst.txt");
        fs::write(&src, "payload\n").unwrap();

        let args = [src.to_str().unwrap(), dst.to_str().unwrap()];
        run(&Cp, &inv("cp", &[], &args)).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload\n");

        // Same invocation, same state, same outcome.
        run(&Cp, &inv("cp", &[], &args)).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload\n");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cp_missing_source_reports_an_error() {
        let dir = make_unique_temp_dir("cp_missing");
        let args = [
            dir.join("absent").to_str().unwrap().to_string(),
            dir.join("dst").to_str().unwrap().to_string(),
        ];
        let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        assert!(run(&Cp, &inv("cp", &[], &args)).is_err());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cat_prints_file_contents() {
        let dir = make_unique_temp_dir("cat");
        let file = dir.join("f.txt");
        fs::write(&file, "line one\nline two\n").unwrap();

        let s = run(&Cat, &inv("cat", &[], &[file.to_str().unwrap()])).unwrap();
        assert_eq!(s, "line one\nline two\n");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn mkdir_then_rmdir_round_trip() {
        let dir = make_unique_temp_dir("mkdir");
        let sub = dir.join("made");
        let sub_str = sub.to_str().unwrap();

        run(&Mkdir, &inv("mkdir", &[], &[sub_str])).unwrap();
        assert!(sub.is_dir());
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&sub).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o755);
        }

        run(&Rmdir, &inv("rmdir", &[], &[sub_str])).unwrap();
        assert!(!sub.exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rm_removes_files_and_directories() {
        let dir = make_unique_temp_dir("rm");
        let file = dir.join("f");
        let sub = dir.join("d");
        fs::write(&file, "x").unwrap();
        fs::create_dir(&sub).unwrap();

        run(&Rm, &inv("rm", &[], &[file.to_str().unwrap()])).unwrap();
        assert!(!file.exists());

        run(&Rm, &inv("rm", &[], &[sub.to_str().unwrap()])).unwrap();
        assert!(!sub.exists());

        assert!(run(&Rm, &inv("rm", &[], &[file.to_str().unwrap()])).is_err());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn mv_renames() {
        let dir = make_unique_temp_dir("mv");
        let from = dir.join("a");
        let to = dir.join("b");
        fs::write(&from, "moved").unwrap();

        run(
            &Mv,
            &inv("mv", &[], &[from.to_str().unwrap(), to.to_str().unwrap()]),
        )
        .unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "moved");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn ln_makes_hard_and_symbolic_links() {
        let dir = make_unique_temp_dir("ln");
        let src = dir.join("orig");
        fs::write(&src, "data").unwrap();

        let hard = dir.join("hard");
        run(
            &Ln,
            &inv("ln", &[], &[src.to_str().unwrap(), hard.to_str().unwrap()]),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&hard).unwrap(), "data");
        assert!(!fs::symlink_metadata(&hard).unwrap().file_type().is_symlink());

        let soft = dir.join("soft");
        run(
            &Ln,
            &inv("ln", &["-s"], &[src.to_str().unwrap(), soft.to_str().unwrap()]),
        )
        .unwrap();
        assert!(fs::symlink_metadata(&soft).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&soft).unwrap(), "data");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn chmod_applies_octal_modes_and_rejects_garbage() {
        use std::os::unix::fs::PermissionsExt;

        let dir = make_unique_temp_dir("chmod");
        let file = dir.join("f");
        fs::write(&file, "x").unwrap();
        let file_str = file.to_str().unwrap();

        run(&Chmod, &inv("chmod", &[], &["600", file_str])).unwrap();
        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        let err = run(&Chmod, &inv("chmod", &[], &["nope", file_str])).unwrap_err();
        assert!(err.to_string().contains("invalid octal mode"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn touch_creates_then_updates() {
        let dir = make_unique_temp_dir("touch");
        let file = dir.join("f");
        let file_str = file.to_str().unwrap();

        run(&Touch, &inv("touch", &[], &[file_str])).unwrap();
        assert!(file.exists());
        assert_eq!(fs::metadata(&file).unwrap().len(), 0);

        let before = fs::metadata(&file).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        run(&Touch, &inv("touch", &[], &[file_str])).unwrap();
        let after = fs::metadata(&file).unwrap().modified().unwrap();
        assert!(after >= before);
        assert_eq!(fs::metadata(&file).unwrap().len(), 0);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn ls_plain_lists_names_in_columns() {
        let dir = make_unique_temp_dir("ls");
        fs::write(dir.join("aaa"), "").unwrap();
        fs::write(dir.join("bb"), "").unwrap();

        let s = run(&Ls, &inv("ls", &[], &[dir.to_str().unwrap()])).unwrap();
        assert!(s.contains("aaa"));
        assert!(s.contains("bb"));
        assert!(s.ends_with('\n'));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn ls_long_shows_attributes_and_link_targets() {
        let dir = make_unique_temp_dir("ls_l");
        let file = dir.join("plain");
        fs::write(&file, "12345").unwrap();
        std::os::unix::fs::symlink(&file, dir.join("sym")).unwrap();

        let s = run(&Ls, &inv("ls", &["-l"], &[dir.to_str().unwrap()])).unwrap();
        let plain_line = s
            .lines()
            .find(|l| l.ends_with("plain"))
            .expect("plain file line");
        assert!(plain_line.starts_with('-'));
        assert!(plain_line.contains(" 5 "));

        let sym_line = s.lines().find(|l| l.contains("sym")).expect("symlink line");
        assert!(sym_line.starts_with('l'));
        assert!(sym_line.contains(" -> "));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn ls_missing_directory_reports_an_error() {
        let missing = stdenv::temp_dir().join("cmdsh_no_such_dir");
        assert!(run(&Ls, &inv("ls", &[], &[missing.to_str().unwrap()])).is_err());
    }

    #[test]
    fn column_layout_wraps_at_the_display_width() {
        let names: Vec<String> = (0..10).map(|i| format!("name{}", i)).collect();
        let mut out = Vec::new();
        write_name_columns(&names, &mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        // Width 9 + padding 4 = 13, so 6 names per line: 10 names -> 2 lines.
        assert_eq!(s.lines().count(), 2);
    }

    #[test]
    fn pwd_prints_the_session_directory() {
        let mut session = Session::new();
        session.current_dir = PathBuf::from("/somewhere/specific");
        let mut out = Vec::new();
        Pwd.run(&inv("pwd", &[], &[]), &mut session, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/somewhere/specific\n");
    }

    #[test]
    fn cd_changes_session_and_process_directory() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let dir = make_unique_temp_dir("cd");
        let canonical = fs::canonicalize(&dir).unwrap();

        let mut session = Session::new();
        let mut out = Vec::new();
        Cd.run(
            &inv("cd", &[], &[dir.to_str().unwrap()]),
            &mut session,
            &mut out,
        )
        .unwrap();

        assert_eq!(session.current_dir, canonical);
        assert_eq!(stdenv::current_dir().unwrap(), canonical);

        stdenv::set_current_dir(&orig).unwrap();
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cd_to_a_missing_directory_fails_in_place() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut session = Session::new();
        let mut out = Vec::new();
        let res = Cd.run(
            &inv("cd", &[], &["definitely_not_a_directory_cmdsh"]),
            &mut session,
            &mut out,
        );

        assert!(res.is_err());
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(session.current_dir, Session::new().current_dir);
    }

    #[test]
    fn whoami_and_id_agree_on_the_current_user() {
        let who = run(&Whoami, &inv("whoami", &[], &[])).unwrap();
        let name = who.trim();
        assert!(!name.is_empty());

        let id_out = run(&Id, &inv("id", &[], &[])).unwrap();
        assert!(id_out.starts_with("uid="));
        assert!(id_out.contains(&format!("({})", name)));
        assert!(id_out.contains("gid="));
    }

    #[test]
    fn id_rejects_unknown_accounts() {
        let err = run(&Id, &inv("id", &[], &["no_such_user_cmdsh_test"])).unwrap_err();
        assert!(err.to_string().contains("unknown user"));
    }

    #[test]
    fn hostname_prints_one_word() {
        let s = run(&Hostname, &inv("hostname", &[], &[])).unwrap();
        assert!(!s.trim().is_empty());
        assert_eq!(s.lines().count(), 1);
    }

    #[test]
    fn uname_flag_expands_the_output() {
        let short = run(&Uname, &inv("uname", &[], &[])).unwrap();
        let long = run(&Uname, &inv("uname", &["-a"], &[])).unwrap();
        assert!(!short.trim().is_empty());
        assert!(long.len() > short.len());
        assert!(long.starts_with(short.trim_end()));
    }

    #[test]
    fn date_prints_the_current_year() {
        let s = run(&Date, &inv("date", &[], &[])).unwrap();
        let year = Local::now().format("%Y").to_string();
        assert!(s.contains(&year));
    }

    #[test]
    fn sleep_zero_returns_immediately_and_garbage_fails() {
        run(&Sleep, &inv("sleep", &[], &["0"])).unwrap();
        let err = run(&Sleep, &inv("sleep", &[], &["soon"])).unwrap_err();
        assert!(err.to_string().contains("invalid number of seconds"));
    }

    #[test]
    fn mode_string_spells_out_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = make_unique_temp_dir("mode");
        let file = dir.join("f");
        fs::write(&file, "x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o754)).unwrap();

        let md = fs::symlink_metadata(&file).unwrap();
        assert_eq!(mode_string(&md), "-rwxr-xr--");

        let dmd = fs::symlink_metadata(&dir).unwrap();
        assert!(mode_string(&dmd).starts_with('d'));

        fs::remove_dir_all(dir).unwrap();
    }
}
