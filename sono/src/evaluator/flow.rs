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

use crate::datum::Datum;

/// The outcome of evaluating one node.
///
/// `Return` and `Break` travel up through blocks until a function call or a
/// loop consumes them.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Value(Datum),
    Return(Datum),
    Break,
}

impl Flow {
    /// The carried value, with `Break` counting as `null`.
    pub fn into_value(self) -> Datum {
        match self {
            Flow::Value(value) | Flow::Return(value) => value,
            Flow::Break => Datum::Null,
        }
    }
}

impl From<Datum> for Flow {
    fn from(value: Datum) -> Self {
        Flow::Value(value)
    }
}

/// Evaluates to the value of a `SonoResult<Flow>`, returning early from the
/// enclosing function with any `Return` or `Break`.
macro_rules! value {
    ($flow:expr) => {
        match $flow? {
            $crate::evaluator::Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Flow;
    use crate::datum::Datum;

    #[test]
    fn break_carries_null() {
        assert_eq!(Flow::Break.into_value(), Datum::Null);
        assert_eq!(Flow::Return(Datum::Number(1.0)).into_value(), Datum::Number(1.0));
    }
}
