//! Splits one input line into a command name, option tokens and positional
//! arguments.
//!
//! Whitespace is the only separator: there is no quoting, escaping or
//! operator syntax. Every token after the first is classified by its first
//! character alone — a leading `-` makes it an option, anything else a
//! positional argument. The first token is always the command name, even if
//! it starts with `-`.

use std::fmt;

/// Upper bound on the length of one input line, in bytes.
pub const MAX_LINE: usize = 4096;
/// Upper bound on the number of option tokens in one invocation.
pub const MAX_OPTIONS: usize = 10;
/// Upper bound on the number of positional arguments in one invocation.
pub const MAX_POSITIONALS: usize = 100;

/// One parsed command line: a name plus options and positionals, each in
/// their order of appearance.
///
/// An `Invocation` is built fresh for every dispatched line and is not
/// retained past the cycle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub options: Vec<String>,
    pub positionals: Vec<String>,
}

impl Invocation {
    /// True when the given flag was supplied at least once.
    pub fn has_option(&self, flag: &str) -> bool {
        self.options.iter().any(|opt| opt == flag)
    }
}

/// Reasons a line can be rejected before dispatch.
///
/// Oversized input is rejected outright rather than truncated, so a line
/// either produces a complete `Invocation` or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// The raw line exceeds [`MAX_LINE`] bytes.
    LineTooLong(usize),
    /// More than [`MAX_OPTIONS`] option tokens were supplied.
    TooManyOptions,
    /// More than [`MAX_POSITIONALS`] positional tokens were supplied.
    TooManyPositionals,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::LineTooLong(len) => {
                write!(f, "line too long ({} bytes, limit is {})", len, MAX_LINE)
            }
            LexError::TooManyOptions => {
                write!(f, "too many options (limit is {})", MAX_OPTIONS)
            }
            LexError::TooManyPositionals => {
                write!(f, "too many arguments (limit is {})", MAX_POSITIONALS)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Tokenize one input line.
///
/// Returns `Ok(None)` for a blank or whitespace-only line, which the caller
/// treats as a no-op cycle.
pub fn tokenize(line: &str) -> Result<Option<Invocation>, LexError> {
    if line.len() > MAX_LINE {
        return Err(LexError::LineTooLong(line.len()));
    }

    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let mut options = Vec::new();
    let mut positionals = Vec::new();
    for word in words {
        if word.starts_with('-') {
            if options.len() == MAX_OPTIONS {
                return Err(LexError::TooManyOptions);
            }
            options.push(word.to_string());
        } else {
            if positionals.len() == MAX_POSITIONALS {
                return Err(LexError::TooManyPositionals);
            }
            positionals.push(word.to_string());
        }
    }

    Ok(Some(Invocation {
        name: name.to_string(),
        options,
        positionals,
    }))
}
