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

use crate::phonology::matrix::FeatureMatrix;
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

#[derive(Debug)]
struct PhoneData {
    symbol: String,
    matrix: FeatureMatrix,
}

/// An immutable speech sound: a display symbol and its complete feature matrix.
///
/// Two phones are the same phone when their matrices are equal, whatever
/// their symbols.
#[derive(Clone, Debug)]
pub struct Phone(Arc<PhoneData>);

impl Phone {
    pub fn new(symbol: impl Into<String>, matrix: FeatureMatrix) -> Self {
        Phone(Arc::new(PhoneData {
            symbol: symbol.into(),
            matrix,
        }))
    }

    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.0.matrix
    }
}

impl PartialEq for Phone {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.matrix == other.0.matrix
    }
}

impl Eq for Phone {}

impl Hash for Phone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.matrix.hash(state)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.symbol)
    }
}
