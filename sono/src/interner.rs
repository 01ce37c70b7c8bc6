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

use bimap::BiMap;
use std::{
    fmt,
    sync::{PoisonError, RwLock},
};

/// Small integer standing in for an interned string.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(usize);

impl Symbol {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional mapping between strings and `Symbol`s.
///
/// Feature names and variable names share one interner so that both can be
/// compared as integers. Symbols are never removed, so a `Symbol` handed out
/// once stays valid for the lifetime of the interner.
#[derive(Debug, Default)]
pub struct Interner {
    symbols: RwLock<BiMap<String, Symbol>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, allocating the next free one if it is new.
    pub fn intern(&self, name: &str) -> Symbol {
        if let Some(symbol) = self.get(name) {
            return symbol;
        }
        let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won the race between the read above and this lock.
        if let Some(symbol) = symbols.get_by_left(name) {
            return *symbol;
        }
        let symbol = Symbol(symbols.len());
        symbols.insert(name.to_string(), symbol);
        symbol
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_by_left(name)
            .copied()
    }

    pub fn resolve(&self, symbol: Symbol) -> Option<String> {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_by_right(&symbol)
            .cloned()
    }

    /// Like `resolve` but falls back on the numeric form for display purposes.
    pub fn name(&self, symbol: Symbol) -> String {
        self.resolve(symbol).unwrap_or_else(|| symbol.to_string())
    }

    pub fn len(&self) -> usize {
        self.symbols.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Interner;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interning_twice_gives_the_same_symbol(name: String) {
            let interner = Interner::new();
            let first = interner.intern(&name);
            prop_assert_eq!(interner.intern(&name), first);
            prop_assert_eq!(interner.len(), 1);
        }

        #[test]
        fn resolving_an_interned_symbol_gives_back_the_string(name: String) {
            let interner = Interner::new();
            let symbol = interner.intern(&name);
            prop_assert_eq!(interner.resolve(symbol), Some(name));
        }
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let interner = Interner::new();
        let voice = interner.intern("voice");
        let nasal = interner.intern("nasal");
        assert_ne!(voice, nasal);
        assert_eq!(interner.get("voice"), Some(voice));
        assert_eq!(interner.get("round"), None);
    }
}
