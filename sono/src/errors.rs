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

use snafu::Snafu;
use std::fmt;

pub type SonoResult<T> = Result<T, SonoError>;

/// Line and column of a token in the source, both starting at 1.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

fn at(position: &Option<Position>) -> String {
    position.map(|p| format!(" at {}", p)).unwrap_or_default()
}

/// The broad kind of failure, which decides who may observe it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Raised while tokenizing or parsing. Aborts the whole unit.
    Compilation,
    /// Raised while evaluating. Catchable with `try`/`catch`.
    Runtime,
    /// The evaluation was cancelled from outside.
    Cancelled,
    /// The phone table could not be built.
    Startup,
}

/// All the expected ways a Sono program could fail.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SonoError {
    /// A string, phone or word literal is missing its closing quote.
    #[snafu(display("COMPILATION ERROR: unclosed {} literal at {}", delimiter, position))]
    UnclosedLiteral { delimiter: char, position: Position },
    /// A backslash escape that is not one of the supported forms.
    #[snafu(display("COMPILATION ERROR: malformed escape `{}` at {}", escape, position))]
    MalformedEscape { escape: String, position: Position },
    /// A symbol run that is not an operator.
    #[snafu(display("COMPILATION ERROR: unknown token `{}` at {}", token, position))]
    UnknownToken { token: String, position: Position },
    /// A bracket without its partner.
    #[snafu(display("COMPILATION ERROR: unmatched `{}` at {}", bracket, position))]
    UnmatchedBracket { bracket: char, position: Position },
    /// An operator found fewer operands than its arity.
    #[snafu(display("COMPILATION ERROR: `{}` is missing an operand at {}", operator, position))]
    MissingOperand { operator: String, position: Position },
    /// An `@` feature literal that names no known feature or quality.
    #[snafu(display("COMPILATION ERROR: malformed feature literal `{}` at {}", literal, position))]
    MalformedFeature { literal: String, position: Position },
    /// A phone or word literal that cannot be read against the phone table.
    #[snafu(display("COMPILATION ERROR: {} at {}", reason, position))]
    InvalidLiteral { reason: String, position: Position },
    /// A construct whose operands have the wrong shape, e.g. a lambda parameter that is not a name.
    #[snafu(display("COMPILATION ERROR: {} at {}", message, position))]
    MalformedSyntax { message: String, position: Position },
    /// Phonological syntax used while phonology is switched off.
    #[snafu(display("COMPILATION ERROR: phonological operations are disabled at {}", position))]
    PhonologyDisabled { position: Position },
    /// An operation applied to a value of the wrong variant.
    #[snafu(display("RUNTIME ERROR: cannot {} {}{}", operation, found, at(position)))]
    TypeMismatch {
        operation: String,
        found: String,
        position: Option<Position>,
    },
    /// Indexing past the end of a sized value.
    #[snafu(display("RUNTIME ERROR: index {} is out of range for length {}{}", index, length, at(position)))]
    IndexOutOfRange {
        index: String,
        length: usize,
        position: Option<Position>,
    },
    /// A variable that is not bound in any enclosing scope.
    #[snafu(display("RUNTIME ERROR: `{}` is not within scope{}", name, at(position)))]
    UnresolvedVariable {
        name: String,
        position: Option<Position>,
    },
    /// Arithmetic whose result is infinite or NaN.
    #[snafu(display("RUNTIME ERROR: {} produced a non-finite number{}", operation, at(position)))]
    NonFinite {
        operation: String,
        position: Option<Position>,
    },
    /// A call with more arguments than parameters.
    #[snafu(display("RUNTIME ERROR: expected at most {} arguments but found {}{}", expected, found, at(position)))]
    ArityMismatch {
        expected: usize,
        found: usize,
        position: Option<Position>,
    },
    /// Writing through an immutable binding.
    #[snafu(display("RUNTIME ERROR: cannot modify immutable value{}", at(position)))]
    Immutable { position: Option<Position> },
    /// A segment that is not a known base phone.
    #[snafu(display("RUNTIME ERROR: `{}` is not a recognised phone{}", segment, at(position)))]
    UnknownPhone {
        segment: String,
        position: Option<Position>,
    },
    /// A diacritic that is restricted or unsupported on the phone it follows.
    #[snafu(display("RUNTIME ERROR: diacritic `{}` cannot be applied to `{}`{}", diacritic, base, at(position)))]
    InapplicableDiacritic {
        diacritic: String,
        base: String,
        position: Option<Position>,
    },
    /// A transcription whose last character is a syllable or morpheme boundary.
    #[snafu(display("RUNTIME ERROR: `{}` ends with a boundary marker{}", transcription, at(position)))]
    DanglingBoundary {
        transcription: String,
        position: Option<Position>,
    },
    /// Raised explicitly by a script with `throw`.
    #[snafu(display("RUNTIME ERROR: {}{}", message, at(position)))]
    Thrown {
        message: String,
        position: Option<Position>,
    },
    /// Any other runtime failure.
    #[snafu(display("RUNTIME ERROR: {}{}", message, at(position)))]
    Runtime {
        message: String,
        position: Option<Position>,
    },
    /// The cancellation flag was raised while evaluating.
    #[snafu(display("Evaluation cancelled"))]
    Cancelled,
    /// The phone table file could not be read.
    #[snafu(display("Cannot read phone table `{}`: {}", path, reason))]
    PhoneTableUnavailable { path: String, reason: String },
    /// The phone table file is not a valid feature table.
    #[snafu(display("Malformed phone table at line {}: {}", line, reason))]
    MalformedPhoneTable { line: usize, reason: String },
}

impl SonoError {
    pub fn class(&self) -> ErrorClass {
        use SonoError::*;
        match self {
            UnclosedLiteral { .. }
            | MalformedEscape { .. }
            | UnknownToken { .. }
            | UnmatchedBracket { .. }
            | MissingOperand { .. }
            | MalformedFeature { .. }
            | InvalidLiteral { .. }
            | MalformedSyntax { .. }
            | PhonologyDisabled { .. } => ErrorClass::Compilation,
            Cancelled => ErrorClass::Cancelled,
            PhoneTableUnavailable { .. } | MalformedPhoneTable { .. } => ErrorClass::Startup,
            _ => ErrorClass::Runtime,
        }
    }

    /// Only runtime errors can be caught by scripts.
    pub fn is_catchable(&self) -> bool {
        self.class() == ErrorClass::Runtime
    }

    /// Builds a generic runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        SonoError::Runtime {
            message: message.into(),
            position: None,
        }
    }

    pub fn type_mismatch(operation: impl Into<String>, found: impl Into<String>) -> Self {
        SonoError::TypeMismatch {
            operation: operation.into(),
            found: found.into(),
            position: None,
        }
    }

    /// The text bound to `_e` by `catch`.
    pub fn message(&self) -> String {
        match self {
            SonoError::Thrown { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Stamps `position` onto a runtime error that does not know where it happened yet.
    pub fn at(mut self, here: Position) -> Self {
        use SonoError::*;
        match &mut self {
            TypeMismatch { position, .. }
            | IndexOutOfRange { position, .. }
            | UnresolvedVariable { position, .. }
            | NonFinite { position, .. }
            | ArityMismatch { position, .. }
            | Immutable { position }
            | UnknownPhone { position, .. }
            | InapplicableDiacritic { position, .. }
            | DanglingBoundary { position, .. }
            | Thrown { position, .. }
            | Runtime { position, .. } => {
                if position.is_none() {
                    *position = Some(here);
                }
            }
            _ => (),
        }
        self
    }

    pub fn position(&self) -> Option<Position> {
        use SonoError::*;
        match self {
            UnclosedLiteral { position, .. }
            | MalformedEscape { position, .. }
            | UnknownToken { position, .. }
            | UnmatchedBracket { position, .. }
            | MissingOperand { position, .. }
            | MalformedFeature { position, .. }
            | InvalidLiteral { position, .. }
            | MalformedSyntax { position, .. }
            | PhonologyDisabled { position } => Some(*position),
            TypeMismatch { position, .. }
            | IndexOutOfRange { position, .. }
            | UnresolvedVariable { position, .. }
            | NonFinite { position, .. }
            | ArityMismatch { position, .. }
            | Immutable { position }
            | UnknownPhone { position, .. }
            | InapplicableDiacritic { position, .. }
            | DanglingBoundary { position, .. }
            | Thrown { position, .. }
            | Runtime { position, .. } => *position,
            Cancelled | PhoneTableUnavailable { .. } | MalformedPhoneTable { .. } => None,
        }
    }
}
