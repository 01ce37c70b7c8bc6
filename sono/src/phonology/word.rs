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

use crate::phonology::phone::Phone;
use std::fmt;

/// Delimiter recorded before a phone in a transcription.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Marker {
    None,
    /// `.` in the transcription.
    Syllable,
    /// `+` in the transcription.
    Morpheme,
}

impl Marker {
    pub fn from_symbol(symbol: char) -> Option<Marker> {
        match symbol {
            '.' => Some(Marker::Syllable),
            '+' => Some(Marker::Morpheme),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Marker::None => "",
            Marker::Syllable => ".",
            Marker::Morpheme => "+",
        }
    }
}

/// A sequence of phones, each paired with the marker written before it.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Word {
    phones: Vec<Phone>,
    markers: Vec<Marker>,
}

impl Word {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phone: Phone, marker: Marker) {
        self.phones.push(phone);
        self.markers.push(marker);
    }

    pub fn pop(&mut self) -> Option<(Phone, Marker)> {
        let phone = self.phones.pop()?;
        let marker = self.markers.pop().unwrap_or(Marker::None);
        Some((phone, marker))
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    pub fn phone(&self, index: usize) -> Option<&Phone> {
        self.phones.get(index)
    }

    /// The marker before `index`. Out of range positions have none.
    pub fn marker(&self, index: usize) -> Marker {
        self.markers.get(index).copied().unwrap_or(Marker::None)
    }

    pub fn phones(&self) -> &[Phone] {
        &self.phones
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Phone, Marker)> + '_ {
        self.phones.iter().zip(self.markers.iter().copied())
    }

    pub fn concat(&self, other: &Word) -> Word {
        let mut word = self.clone();
        for (phone, marker) in other.iter() {
            word.push(phone.clone(), marker);
        }
        word
    }
}

impl FromIterator<(Phone, Marker)> for Word {
    fn from_iter<I: IntoIterator<Item = (Phone, Marker)>>(iter: I) -> Self {
        let mut word = Word::new();
        for (phone, marker) in iter {
            word.push(phone, marker);
        }
        word
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (phone, marker) in self.iter() {
            write!(f, "{}{}", marker.symbol(), phone)?;
        }
        Ok(())
    }
}
