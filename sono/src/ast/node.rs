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
    errors::Position,
    interner::Symbol,
    operators::Operator,
    phonology::{Feature, Phone, RuleKind, Word},
};
use std::sync::Arc;

/// How an argument is bound to a parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParameterMode {
    /// A copy of the argument in a fresh mutable binding.
    Value,
    /// `ref`: shares the caller's binding when the argument is a variable.
    Reference,
    /// `final`: a copy that cannot be assigned to.
    Final,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub name: Symbol,
    pub mode: ParameterMode,
}

/// Parameters and body of a lambda, shared by every closure created from it.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub parameters: Vec<Parameter>,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::Block(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Phone(Phone),
    Word(Word),
    Feature(Feature),
    Break,
    Variable(Symbol),
    /// `var name`, always bound in the innermost scope.
    Declare(Symbol),
    /// Contents of `( )`. Only lives inside the parser; groups of one are
    /// replaced by their element and the rest by a `Vector`.
    Group(Vec<Node>),
    Vector(Vec<Node>),
    /// `{ }`, evaluated in a new scope.
    Block(Vec<Node>),
    /// `[ ]` literal whose elements are features or matrices.
    Matrix(Vec<Node>),
    Unary(Operator, Box<Node>),
    Binary(Operator, Box<Node>, Box<Node>),
    /// `=` and the compound assignments.
    Assign(Operator, Box<Node>, Box<Node>),
    Member(Box<Node>, Symbol),
    Index(Box<Node>, Box<Node>),
    Call(Box<Node>, Vec<Node>),
    Lambda(Arc<FunctionDef>),
    If {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    ForEach {
        variable: Symbol,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    Try {
        body: Box<Node>,
        handler: Option<Box<Node>>,
    },
    Structure {
        name: Symbol,
        body: Arc<Node>,
        is_static: bool,
    },
    New {
        structure: Box<Node>,
        arguments: Vec<Node>,
    },
    /// `kind |> search -> replacement / left _ right`; absent parts are `Null`.
    Rule {
        kind: RuleKind,
        search: Box<Node>,
        replacement: Box<Node>,
        left: Box<Node>,
        right: Box<Node>,
    },
    Return(Box<Node>),
    Throw(Box<Node>),
}
