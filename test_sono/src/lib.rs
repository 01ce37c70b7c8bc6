/*  Testing library for the Sono programming language.
    Copyright (C) 2019 Charles Johnson

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

#[macro_use]
extern crate lazy_static;
extern crate proptest;

use std::collections::HashSet;

/// A small Japanese-oriented feature table used across the tests.
pub const BASE_PHONES: &str = include_str!("../data/phones.tsv");

// Runs each script in turn on the context and checks the rendered output.
#[macro_export]
macro_rules! assert_evaluates {
    ($cont:ident, $($script:expr => $expected:expr),+ $(,)?) => {
        $(assert_eq!($cont.execute($script), $expected, "while running `{}`", $script);)+
    };
}

// Checks if a string can be used as a variable name
#[macro_export]
macro_rules! assume_identifier {
    ($a:ident) => {
        prop_assume!(!$a.is_empty());
        prop_assume!($a.chars().all(|c| c.is_ascii_alphabetic()));
        prop_assume!(!RESERVED_WORDS.contains($a.as_str()));
    };
}

// Checks if all strings each can be used as variable names
#[macro_export]
macro_rules! assume_identifiers {
	($($a:ident),*) => ($(assume_identifier!($a);)*)
}

lazy_static! {
    /// Words that are operators, literals or value kinds rather than free names.
    pub static ref RESERVED_WORDS: HashSet<&'static str> = {
        let mut words = HashSet::new();
        for word in &[
            "ref", "final", "new", "struct", "static", "class", "var", "len", "str", "num",
            "vec", "word", "mat", "com", "type", "from", "try", "until", "in", "do", "then",
            "catch", "else", "return", "throw", "null", "true", "false", "break", "this",
            "all", "print", "spawn", "join", "dict", "sqrt", "floor", "abs", "S", "Af", "Ab",
            "Null", "Bool", "Number", "String", "Vector", "Dictionary", "Matrix", "Feature",
            "Phone", "Word", "Rule", "Function", "Structure", "Pointer",
        ] {
            words.insert(*word);
        }
        words
    };
}
