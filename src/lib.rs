//! A small interactive command interpreter.
//!
//! One line of input is split into a command name, option flags and
//! positional arguments, validated against a fixed table of built-in
//! commands, and either executed in-process or handed to an external
//! program found on `PATH`. There are no pipelines, no redirection and no
//! quoting rules — whitespace splitting is the whole grammar.
//!
//! The main entry point is [`Interpreter`], which dispatches single lines
//! and drives the interactive read loop. The public modules expose the
//! tokenizer, the command table and the validation contract for reuse in
//! tests and embedding.

pub mod builtin;
pub mod command;
pub mod env;
pub mod external;
mod interpreter;
pub mod lexer;
mod sys;

pub use interpreter::{Cycle, Interpreter};
