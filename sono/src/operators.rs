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

use crate::associativity::Associativity;
use lazy_static::lazy_static;
use maplit::hashmap;
use std::{collections::HashMap, fmt};

/// Every operator the parser knows, including the ones only the tokenizer inserts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    Member,
    Index,
    Call,
    Ref,
    Final,
    New,
    Struct,
    Static,
    Class,
    Var,
    Lambda,
    Not,
    Length,
    Stringify,
    Numerify,
    Vectorize,
    Wordify,
    Matrixify,
    Common,
    TypeOf,
    Negate,
    Affirm,
    Power,
    From,
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    Transform,
    Contrast,
    Arrow,
    Focus,
    RuleContext,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Rule,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    Try,
    Until,
    In,
    Do,
    Then,
    Catch,
    Else,
    Return,
    Throw,
    Comma,
    Semicolon,
}

lazy_static! {
    /// Operators as they are spelled in source text.
    static ref SPELLINGS: HashMap<&'static str, Operator> = {
        use Operator::*;
        hashmap! {
            "." => Member,
            "ref" => Ref,
            "final" => Final,
            "new" => New,
            "struct" => Struct,
            "static" => Static,
            "class" => Class,
            "var" => Var,
            "=>" => Lambda,
            "!" => Not,
            "len" => Length,
            "str" => Stringify,
            "num" => Numerify,
            "vec" => Vectorize,
            "word" => Wordify,
            "mat" => Matrixify,
            "com" => Common,
            "type" => TypeOf,
            "**" => Power,
            "from" => From,
            "*" => Multiply,
            "/" => Divide,
            "%" => Remainder,
            "+" => Add,
            "-" => Subtract,
            ">>" => Transform,
            "?>" => Contrast,
            "->" => Arrow,
            "==" => Equal,
            "!=" => NotEqual,
            "<" => Less,
            ">" => Greater,
            "<=" => LessEqual,
            ">=" => GreaterEqual,
            "&&" => And,
            "||" => Or,
            "|>" => Rule,
            "=" => Assign,
            "+=" => AddAssign,
            "-=" => SubtractAssign,
            "*=" => MultiplyAssign,
            "/=" => DivideAssign,
            "%=" => RemainderAssign,
            "try" => Try,
            "until" => Until,
            "in" => In,
            "do" => Do,
            "then" => Then,
            "catch" => Catch,
            "else" => Else,
            "return" => Return,
            "throw" => Throw,
            "," => Comma,
            ";" => Semicolon,
        }
    };
}

impl Operator {
    pub fn from_spelling(text: &str) -> Option<Operator> {
        SPELLINGS.get(text).copied()
    }

    /// Whether some operator is spelled with `text` as a prefix, e.g. `&` of `&&`.
    pub fn is_spelling_prefix(text: &str) -> bool {
        SPELLINGS.keys().any(|spelling| spelling.starts_with(text))
    }

    /// Signed precedence: the magnitude orders binding strength and a
    /// negative sign makes the operator right associative.
    pub fn precedence(self) -> i8 {
        use Operator::*;
        match self {
            Member | Index | Call => 15,
            Ref | Final => -15,
            New | Struct | Static => -14,
            Class => 13,
            Var => -13,
            Lambda => 12,
            Not => -12,
            Length | Stringify | Numerify | Vectorize | Wordify | Matrixify | Common | TypeOf
            | Negate | Affirm => -11,
            Power => -10,
            From => 10,
            Multiply | Divide | Remainder => 9,
            Add | Subtract | Transform | Contrast => 8,
            Arrow | Focus => 7,
            Equal | NotEqual | Less | Greater | LessEqual | GreaterEqual | RuleContext => 6,
            And | Or | Rule => 5,
            Until => 4,
            Assign | AddAssign | SubtractAssign | MultiplyAssign | DivideAssign
            | RemainderAssign | Try => -4,
            In | Do | Then | Catch => 3,
            Else => -3,
            Return | Throw | Comma => 2,
            Semicolon => -1,
        }
    }

    pub fn associativity(self) -> Associativity {
        Associativity::of(self.precedence())
    }

    /// Number of operands taken off the operand stack.
    pub fn arity(self) -> usize {
        use Operator::*;
        match self {
            Comma | Semicolon => 0,
            Ref | Final | New | Struct | Static | Var | Not | Length | Stringify | Numerify
            | Vectorize | Wordify | Matrixify | Common | TypeOf | Negate | Affirm | Try
            | Return | Throw => 1,
            _ => 2,
        }
    }

    pub fn is_separator(self) -> bool {
        matches!(self, Operator::Comma | Operator::Semicolon)
    }

    pub fn is_prefix(self) -> bool {
        self.arity() == 1
    }

    pub fn spelling(self) -> &'static str {
        use Operator::*;
        match self {
            Index => ".index",
            Call => ".exec",
            Negate => ".negative",
            Affirm => ".positive",
            Focus => "_",
            RuleContext => "/",
            other => SPELLINGS
                .iter()
                .find(|(_, op)| **op == other)
                .map_or("?", |(spelling, _)| *spelling),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.spelling())
    }
}
