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

use slog::{o, Discard};

pub trait Logger {
    fn logger(&mut self) -> &mut slog::Logger;
}

/// A logger that drops every record, used when the host does not supply one.
pub fn discard() -> slog::Logger {
    slog::Logger::root(Discard, o!())
}

#[cfg(test)]
mod tests {
    use super::discard;

    #[test]
    fn discarded_records_go_nowhere() {
        let logger = discard();
        slog::info!(logger, "dropped"; "records" => 1);
        slog::warn!(logger.new(slog::o!("child" => true)), "also dropped");
    }
}
