use crate::env::Session;
use crate::lexer::Invocation;
use anyhow::Result;
use std::io::Write;

/// A command implemented directly by the interpreter.
///
/// Handlers receive an invocation that already passed [`validate`], so they
/// may index into `positionals` up to their declared arity without further
/// checks. A handler reports failure by returning an error; the dispatcher
/// prints it as `<name>: <reason>` and moves on to the next prompt. No
/// handler terminates the interpreter except `exit`.
pub trait Builtin {
    /// Executes the command, writing any output to `out`.
    fn run(&self, inv: &Invocation, session: &mut Session, out: &mut dyn Write) -> Result<()>;
}

/// How many positional arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many positionals.
    Exact(usize),
    /// Anywhere from zero up to this many positionals.
    AtMost(usize),
}

/// One entry of the command table, fixed for the lifetime of the process.
pub struct Descriptor {
    /// Unique command name, matched case-sensitively.
    pub name: &'static str,
    /// The built-in body invoked after validation.
    pub handler: &'static (dyn Builtin + Sync),
    /// Positional-argument contract.
    pub arity: Arity,
    /// The single accepted option flag, if the command takes one.
    pub flag: Option<&'static str>,
    /// Argument placeholder text shown in usage and help listings.
    pub usage: &'static str,
}

impl Descriptor {
    /// Render the `<label><name>  [<flag>]  <hint>` usage triple.
    pub fn usage_line(&self, label: &str) -> String {
        let mut line = format!("{}{}", label, self.name);
        if let Some(flag) = self.flag {
            line.push_str("  ");
            line.push_str(flag);
        }
        if !self.usage.is_empty() {
            line.push_str("  ");
            line.push_str(self.usage);
        }
        line
    }
}

/// Which way an arity contract was violated.
///
/// `AtMost` has no lower bound, so its violations are always `TooMany`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityViolation {
    TooFew,
    TooMany,
}

/// Everything wrong with one invocation, collected in a single pass.
///
/// Both the arity check and the option check always run, so the user sees
/// every violation at once rather than one per attempt.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub arity: Option<ArityViolation>,
    pub rejected_options: Vec<String>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.arity.is_none() && self.rejected_options.is_empty()
    }
}

/// Check an invocation against a descriptor's arity and option contracts.
///
/// Never fails and never panics: the result is a report the dispatcher turns
/// into a usage message when it is not clean. Repeats of the accepted flag
/// are tolerated; every other option token is rejected individually.
pub fn validate(inv: &Invocation, desc: &Descriptor) -> Report {
    let mut report = Report::default();

    let supplied = inv.positionals.len();
    report.arity = match desc.arity {
        Arity::Exact(want) if supplied < want => Some(ArityViolation::TooFew),
        Arity::Exact(want) if supplied > want => Some(ArityViolation::TooMany),
        Arity::AtMost(cap) if supplied > cap => Some(ArityViolation::TooMany),
        _ => None,
    };

    for opt in &inv.options {
        match desc.flag {
            Some(flag) if opt == flag => {}
            _ => report.rejected_options.push(opt.clone()),
        }
    }

    report
}
