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

use crate::{
    ast::FunctionDef,
    datum::Datum,
    errors::{SonoError, SonoResult},
    evaluator::Evaluator,
    scope::{Scope, WeakScope},
};
use std::{fmt, sync::Arc};

/// A command implemented in Rust and callable from scripts.
///
/// Hosts register their own commands with `Context::register`.
pub trait NativeCommand: Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum>;
}

pub type NativeFn = fn(&Evaluator, Vec<Datum>) -> SonoResult<Datum>;

/// A `NativeCommand` backed by a plain function.
pub struct NativeFunction {
    name: &'static str,
    function: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &'static str, function: NativeFn) -> Self {
        Self { name, function }
    }
}

impl NativeCommand for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
        (self.function)(evaluator, arguments)
    }
}

/// Where a closure finds its free variables.
#[derive(Clone)]
pub enum Captured {
    Scope(Scope),
    /// A method defined in a structure body. The instance owns the frame, so
    /// the method only refers to it.
    Method(WeakScope),
}

/// A lambda together with the scope it was created in.
pub struct Closure {
    pub definition: Arc<FunctionDef>,
    pub captured: Captured,
}

impl Closure {
    pub fn scope(&self) -> SonoResult<Scope> {
        match &self.captured {
            Captured::Scope(scope) => Ok(scope.clone()),
            Captured::Method(scope) => scope
                .upgrade()
                .ok_or_else(|| SonoError::runtime("method called after its instance was released")),
        }
    }
}

#[derive(Clone)]
pub enum Callable {
    Script(Arc<Closure>),
    Native(Arc<dyn NativeCommand>),
}

impl Callable {
    pub fn closure(definition: Arc<FunctionDef>, scope: Scope) -> Self {
        Callable::Script(Arc::new(Closure {
            definition,
            captured: Captured::Scope(scope),
        }))
    }

    /// The same function holding `body` weakly, if it was created directly in `body`.
    pub fn as_method_of(&self, body: &Scope) -> Option<Callable> {
        match self {
            Callable::Script(closure) => match &closure.captured {
                Captured::Scope(scope) if scope.same_frame(body) => Some(Callable::Script(Arc::new(Closure {
                    definition: Arc::clone(&closure.definition),
                    captured: Captured::Method(body.downgrade()),
                }))),
                _ => None,
            },
            Callable::Native(_) => None,
        }
    }

    pub fn native(name: &'static str, function: NativeFn) -> Self {
        Callable::Native(Arc::new(NativeFunction::new(name, function)))
    }

    /// Identity, not structural, equality.
    pub fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Script(a), Callable::Script(b)) => Arc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Callable::Script(closure) => write!(f, "<function/{}>", closure.definition.parameters.len()),
            Callable::Native(command) => write!(f, "<native {}>", command.name()),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
