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

use super::Evaluator;
use crate::{
    datum::Datum,
    errors::{SonoError, SonoResult},
    phonology::{Boundary, ContextEntry, FeatureMatrix, RuleKind, Segment, SoundChangeRule},
};

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn segment(datum: Datum) -> SonoResult<Segment> {
    match datum {
        Datum::Phone(phone) => Ok(Segment::Phone(phone)),
        Datum::Matrix(matrix) => Ok(Segment::Matrix(matrix)),
        Datum::Feature(feature) => Ok(Segment::Matrix(FeatureMatrix::from(feature))),
        other => Err(SonoError::type_mismatch("use as a rule segment", other.kind().name())),
    }
}

fn boundary(text: &str, side: Side) -> SonoResult<Boundary> {
    match (text, side) {
        ("#", Side::Left) | ("^", _) => Ok(Boundary::WordStart),
        ("#", Side::Right) => Ok(Boundary::WordEnd),
        ("$", _) | (".", _) => Ok(Boundary::SyllableEdge),
        ("+", _) => Ok(Boundary::MorphemeEdge),
        _ => Err(SonoError::runtime(format!("`{}` is not a boundary", text))),
    }
}

fn entry(datum: Datum, side: Side) -> SonoResult<ContextEntry> {
    match datum {
        Datum::String(text) => Ok(ContextEntry::Boundary(boundary(&text, side)?)),
        other => Ok(ContextEntry::Segment(segment(other)?)),
    }
}

/// A context is a single entry, a vector of entries or the phones of a word.
fn context(datum: Datum, side: Side) -> SonoResult<Vec<ContextEntry>> {
    match datum {
        Datum::Null => Ok(Vec::new()),
        Datum::Vector(entries) => entries.into_iter().map(|e| entry(e, side)).collect(),
        Datum::Word(word) => Ok(word
            .phones()
            .iter()
            .cloned()
            .map(|phone| ContextEntry::Segment(Segment::Phone(phone)))
            .collect()),
        other => Ok(vec![entry(other, side)?]),
    }
}

impl Evaluator {
    pub(super) fn rule(
        &self,
        kind: RuleKind,
        search: Datum,
        replacement: Datum,
        left: Datum,
        right: Datum,
    ) -> SonoResult<SoundChangeRule> {
        let search = match search {
            Datum::Null => None,
            other => Some(segment(other)?),
        };
        let replacement = match replacement {
            Datum::Null => Vec::new(),
            Datum::Vector(segments) => segments.into_iter().map(segment).collect::<SonoResult<_>>()?,
            Datum::Word(word) => word.phones().iter().cloned().map(Segment::Phone).collect(),
            other => vec![segment(other)?],
        };
        let rule = SoundChangeRule::new(kind, search, context(left, Side::Left)?, context(right, Side::Right)?, replacement);
        log::trace!("built rule {}", rule.render(self.interner()));
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::{boundary, Side};
    use crate::phonology::Boundary;

    #[test]
    fn hash_depends_on_the_side_of_the_focus() {
        assert_eq!(boundary("#", Side::Left).unwrap(), Boundary::WordStart);
        assert_eq!(boundary("#", Side::Right).unwrap(), Boundary::WordEnd);
        assert_eq!(boundary(".", Side::Right).unwrap(), Boundary::SyllableEdge);
        assert!(boundary("%", Side::Left).is_err());
    }
}
