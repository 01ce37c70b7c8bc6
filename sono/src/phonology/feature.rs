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

use crate::interner::{Interner, Symbol};
use std::fmt;

/// The value a feature takes in a matrix.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Quality {
    True,
    False,
    /// Not specified. A matrix never stores this; setting it removes the entry.
    Unset,
    /// Matches any value in a pattern.
    Any,
    /// Pattern variables, bound from the current, preceding and following phone.
    Alpha,
    Beta,
    Gamma,
}

impl Quality {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            '+' => Quality::True,
            '-' => Quality::False,
            '0' => Quality::Unset,
            '~' => Quality::Any,
            'α' => Quality::Alpha,
            'β' => Quality::Beta,
            'γ' => Quality::Gamma,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Quality::True => '+',
            Quality::False => '-',
            Quality::Unset => '0',
            Quality::Any => '~',
            Quality::Alpha => 'α',
            Quality::Beta => 'β',
            Quality::Gamma => 'γ',
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, Quality::Alpha | Quality::Beta | Quality::Gamma)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single feature paired with its quality, e.g. `+voice`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Feature {
    pub feature: Symbol,
    pub quality: Quality,
}

impl Feature {
    pub fn new(feature: Symbol, quality: Quality) -> Self {
        Self { feature, quality }
    }

    pub fn render(&self, interner: &Interner) -> String {
        format!("{}{}", self.quality, interner.name(self.feature))
    }
}

#[cfg(test)]
mod tests {
    use super::Quality;

    #[test]
    fn symbols_round_trip() {
        for symbol in "+-0~αβγ".chars() {
            assert_eq!(Quality::from_symbol(symbol).map(Quality::symbol), Some(symbol));
        }
        assert_eq!(Quality::from_symbol('x'), None);
    }

    #[test]
    fn only_greek_letters_are_variables() {
        assert!(Quality::Beta.is_variable());
        assert!(!Quality::Any.is_variable());
        assert!(!Quality::True.is_variable());
    }
}
