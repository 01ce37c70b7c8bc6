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
    ast::Node,
    datum::Datum,
    function::Callable,
    interner::{Interner, Symbol},
    scope::Scope,
};
use std::{fmt, sync::Arc};

/// Methods an instance may define to take part in built-in operations.
///
/// They are looked up once, when the instance is created.
#[derive(Clone, Default)]
pub struct Hooks {
    /// `getStr()`, used by `str` and printing.
    pub get_str: Option<Callable>,
    /// `equals(other)`, used by `==` and `!=`.
    pub equals: Option<Callable>,
    /// `getHash()`, used when the instance is a dictionary key.
    pub get_hash: Option<Callable>,
    /// `getLen()`, used by `len`.
    pub get_len: Option<Callable>,
    /// `getIndex(i)`, used by indexing.
    pub get_index: Option<Callable>,
}

impl Hooks {
    pub fn resolve(scope: &Scope, interner: &Interner) -> Self {
        let find = |name: &str| {
            interner
                .get(name)
                .and_then(|symbol| scope.local(symbol))
                .and_then(|cell| match cell.read() {
                    Datum::Function(callable) => Some(callable),
                    _ => None,
                })
        };
        Hooks {
            get_str: find("getStr"),
            equals: find("equals"),
            get_hash: find("getHash"),
            get_len: find("getLen"),
            get_index: find("getIndex"),
        }
    }
}

/// `struct Name class { ... }` waiting to be instantiated with `new`.
pub struct Template {
    pub name: Symbol,
    pub body: Arc<Node>,
    pub scope: Scope,
}

/// An evaluated structure body.
pub struct Object {
    pub name: Symbol,
    pub scope: Scope,
    pub hooks: Hooks,
    /// Created by `static`: evaluated once and never instantiated.
    pub is_static: bool,
}

pub enum Structure {
    Template(Template),
    Object(Object),
}

impl Structure {
    pub fn name(&self) -> Symbol {
        match self {
            Structure::Template(template) => template.name,
            Structure::Object(object) => object.name,
        }
    }

    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Structure::Template(template) => format!("<struct {}>", interner.name(template.name)),
            Structure::Object(object) => interner.name(object.name),
        }
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Structure::Template(template) => write!(f, "Template({})", template.name),
            Structure::Object(object) => write!(f, "Object({}, {:?})", object.name, object.scope),
        }
    }
}
