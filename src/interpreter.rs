use crate::builtin;
use crate::command::{ArityViolation, validate};
use crate::env::Session;
use crate::external;
use crate::lexer;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// What one dispatch cycle did to the prompt counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Blank line: nothing was dispatched and the counter stays put.
    Skipped,
    /// A non-blank line went through dispatch, successfully or not.
    Ran,
}

/// The line-oriented command interpreter.
///
/// Each input line is tokenized, looked up in the command table, validated
/// and executed — or handed to the external fallback when the name is
/// unknown. Failures of any one cycle are reported and absorbed; only the
/// `exit` built-in ends the process.
///
/// Example
/// ```
/// use cmdsh::Interpreter;
/// let mut sh = Interpreter::new();
/// let mut out = Vec::new();
/// sh.dispatch("echo hello world", &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
/// ```
pub struct Interpreter {
    session: Session,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
        }
    }

    /// The persistent session state, exposed for the prompt.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Process exactly one input line.
    ///
    /// All user-visible text of the cycle — command output, usage messages,
    /// error reports — goes to `out`. The returned [`Cycle`] tells the read
    /// loop whether to advance its counter.
    pub fn dispatch(&mut self, line: &str, out: &mut dyn Write) -> Result<Cycle> {
        let inv = match lexer::tokenize(line) {
            Ok(Some(inv)) => inv,
            Ok(None) => return Ok(Cycle::Skipped),
            Err(e) => {
                writeln!(out, "{}", e)?;
                return Ok(Cycle::Ran);
            }
        };

        match builtin::lookup(&inv.name) {
            Some(desc) => {
                let report = validate(&inv, desc);
                if !report.is_ok() {
                    match report.arity {
                        Some(ArityViolation::TooMany) => writeln!(out, "too many arguments")?,
                        Some(ArityViolation::TooFew) => writeln!(out, "not enough arguments")?,
                        None => {}
                    }
                    for opt in &report.rejected_options {
                        writeln!(out, "unsupported option ({})", opt)?;
                    }
                    writeln!(out, "{}", desc.usage_line("usage: "))?;
                } else if let Err(e) = desc.handler.run(&inv, &mut self.session, out) {
                    writeln!(out, "{}: {:#}", inv.name, e)?;
                }
            }
            None => {
                if let Err(e) = external::spawn_and_wait(&inv, &self.session) {
                    writeln!(out, "{}: {:#}", inv.name, e)?;
                }
            }
        }

        Ok(Cycle::Ran)
    }

    /// The interactive read loop.
    ///
    /// Prompts with `<cwd> N: `, counting only the lines that actually
    /// dispatched. Ctrl-C and end-of-input end the session cleanly.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();
        let mut counter: u64 = 1;

        loop {
            let prompt = format!("<{}> {}: ", self.session.current_dir.display(), counter);
            match rl.readline(&prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    if self.dispatch(&line, &mut stdout)? == Cycle::Ran {
                        counter += 1;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
