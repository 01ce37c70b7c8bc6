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

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl Associativity {
    /// Negative precedences in the operator table are right associative.
    pub fn of(precedence: i8) -> Self {
        if precedence < 0 {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// Whether an operator already on the stack is emitted before `incoming` is pushed.
    pub fn yields_to(self, stacked: i8, incoming: i8) -> bool {
        let (stacked_level, incoming_level) = (stacked.unsigned_abs(), incoming.unsigned_abs());
        incoming_level < stacked_level
            || (incoming_level == stacked_level && self == Self::Left)
    }
}
