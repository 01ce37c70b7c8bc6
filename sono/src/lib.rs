/*  Library for the Sono programming language.
    Copyright (C) 2018 to 2019 Charles Johnson

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program. If not, see <http://www.gnu.org/licenses/>.
*/

//! # Sono
//!
//! An interpreter for a small scripting language whose values include
//! feature matrices, phones, words and sound-change rules.
//!
//! A `Context` owns a phone table generated from a tab-separated feature
//! table and a global scope that persists between calls to `execute`.
//!
//! ```
//! use sono::{Context, Options};
//!
//! let mut context = Context::new(Options::default());
//!
//! // The value of the last statement is rendered as text
//! assert_eq!(context.execute("1 + 2 * 3"), "7");
//!
//! // Named functions
//! assert_eq!(context.execute("square(x) => { return x * x }; square(7)"), "49");
//!
//! // Blocks yield the vector of their statement values
//! assert_eq!(context.execute("{ 1; \"two\" }"), "[1, two]");
//!
//! // Runtime errors can be caught, with the message bound to `_e`
//! assert_eq!(context.execute("try { throw \"oops\" } catch _e"), "oops");
//!
//! // Uncaught errors are reported with their position
//! assert_eq!(
//!     context.execute("1 + \"a\""),
//!     "RUNTIME ERROR: cannot add Number and String at 1:3"
//! );
//! ```
//!
//! With a phone table, words can be pushed through rules:
//!
//! ```no_run
//! use sono::{Context, Options};
//!
//! let mut context = Context::from_path("phones.tsv", Options::default()).unwrap();
//! context.execute("devoice = S |> [+syl, +high] -> [-voice] / [-voice] _ [-voice]");
//! println!("{}", context.execute("`kisa` >> devoice"));
//! ```

/// Operator associativity derived from signed precedence.
mod associativity;

/// Syntax trees.
pub mod ast;

/// The entry point for hosts: phone table, global scope and execution.
mod context;

/// Runtime values.
pub mod datum;

/// The errors that scripts and phone tables can produce.
mod errors;

/// Walking syntax trees.
pub mod evaluator;

/// Script closures and native commands.
pub mod function;

/// Interning of feature and variable names.
pub mod interner;

mod lexer;

// Trait for logging.
mod logging;

/// The operator table.
pub mod operators;

/// Operator-precedence parsing of tokens into syntax trees.
mod parser;

pub mod phonology;

/// State shared by everything evaluating in one context.
pub mod runtime;

/// Variable bindings and scope chains.
pub mod scope;

/// Structure templates and instances.
pub mod structure;

pub use context::{Context, Options};
pub use datum::{Datum, DatumKind};
pub use errors::{ErrorClass, Position, SonoError, SonoResult};
pub use function::{Callable, NativeCommand, NativeFunction};
pub use lexer::{Lexer, Token, TokenKind};
pub use logging::Logger;
pub use parser::Parser;
pub use runtime::{CancellationHandle, Printer};
