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

use crate::{
    interner::{Interner, Symbol},
    phonology::{
        feature::Quality,
        matrix::FeatureMatrix,
        phone::Phone,
        table::PhoneTable,
        word::{Marker, Word},
    },
};
use std::collections::HashMap;

/// How a successful match affects its neighbours.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleKind {
    Simple,
    /// The next input phone is skipped after a match.
    AssimilateForward,
    /// The last output phone is dropped before the replacement is written.
    AssimilateBackward,
}

impl RuleKind {
    pub fn from_name(name: &str) -> Option<RuleKind> {
        match name {
            "S" => Some(RuleKind::Simple),
            "Af" => Some(RuleKind::AssimilateForward),
            "Ab" => Some(RuleKind::AssimilateBackward),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Simple => "S",
            RuleKind::AssimilateForward => "Af",
            RuleKind::AssimilateBackward => "Ab",
        }
    }
}

/// Positions between phones that a context can require.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Boundary {
    WordStart,
    WordEnd,
    SyllableEdge,
    MorphemeEdge,
}

impl Boundary {
    fn holds_at(self, word: &Word, gap: usize) -> bool {
        let edge = gap == 0 || gap == word.len();
        match self {
            Boundary::WordStart => gap == 0,
            Boundary::WordEnd => gap == word.len(),
            Boundary::SyllableEdge => {
                edge || matches!(word.marker(gap), Marker::Syllable | Marker::Morpheme)
            }
            Boundary::MorphemeEdge => edge || word.marker(gap) == Marker::Morpheme,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Boundary::WordStart | Boundary::WordEnd => "#",
            Boundary::SyllableEdge => "$",
            Boundary::MorphemeEdge => "+",
        }
    }
}

/// A phone literal or a feature pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Matrix(FeatureMatrix),
    Phone(Phone),
}

impl Segment {
    fn render(&self, interner: &Interner) -> String {
        match self {
            Segment::Matrix(matrix) => matrix.render(interner),
            Segment::Phone(phone) => phone.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContextEntry {
    Segment(Segment),
    Boundary(Boundary),
}

impl ContextEntry {
    fn render(&self, interner: &Interner) -> String {
        match self {
            ContextEntry::Segment(segment) => segment.render(interner),
            ContextEntry::Boundary(boundary) => boundary.symbol().to_string(),
        }
    }
}

/// Qualities read off the neighbourhood of the current phone.
#[derive(Default)]
struct Captures {
    alpha: HashMap<Symbol, Quality>,
    beta: HashMap<Symbol, Quality>,
    gamma: HashMap<Symbol, Quality>,
}

impl Captures {
    fn capture(into: &mut HashMap<Symbol, Quality>, pattern: &FeatureMatrix, variable: Quality, source: &Phone) {
        for &(feature, quality) in pattern.entries() {
            if quality == variable {
                into.insert(feature, source.matrix().get(feature));
            }
        }
    }

    fn instantiate(&self, pattern: &FeatureMatrix) -> FeatureMatrix {
        if !pattern.has_variables() {
            return pattern.clone();
        }
        pattern
            .substitute(Quality::Alpha, &self.alpha)
            .substitute(Quality::Beta, &self.beta)
            .substitute(Quality::Gamma, &self.gamma)
    }
}

fn patterns(entries: &[ContextEntry]) -> impl Iterator<Item = &FeatureMatrix> {
    entries.iter().filter_map(|entry| match entry {
        ContextEntry::Segment(Segment::Matrix(matrix)) => Some(matrix),
        _ => None,
    })
}

/// A sound change `kind |> search -> replacement / left _ right`.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundChangeRule {
    kind: RuleKind,
    search: Option<Segment>,
    left: Vec<ContextEntry>,
    right: Vec<ContextEntry>,
    replacement: Vec<Segment>,
}

impl SoundChangeRule {
    pub fn new(
        kind: RuleKind,
        search: Option<Segment>,
        left: Vec<ContextEntry>,
        right: Vec<ContextEntry>,
        replacement: Vec<Segment>,
    ) -> Self {
        Self {
            kind,
            search,
            left,
            right,
            replacement,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Applies the rule across `word` in a single left to right pass.
    pub fn transform(&self, table: &PhoneTable, word: &Word) -> Word {
        let mut output = Word::new();
        let mut index = 0;
        while let Some(phone) = word.phone(index) {
            let marker = word.marker(index);
            let captures = self.captures(word, index);
            if !self.matches(word, index, &captures) {
                output.push(phone.clone(), marker);
                index += 1;
                continue;
            }
            if self.kind == RuleKind::AssimilateBackward {
                // Drops the previous output phone, not the matched input phone.
                output.pop();
            }
            for (n, action) in self.replacement.iter().enumerate() {
                let realized = match action {
                    Segment::Phone(literal) => literal.clone(),
                    Segment::Matrix(matrix) => {
                        let delta = captures.instantiate(matrix).without_variables();
                        table.transform(phone, &delta, true)
                    }
                };
                output.push(realized, if n == 0 { marker } else { Marker::None });
            }
            if self.search.is_none() {
                let kept = if self.replacement.is_empty() {
                    marker
                } else {
                    Marker::None
                };
                output.push(phone.clone(), kept);
            }
            if self.kind == RuleKind::AssimilateForward {
                index += 1;
            }
            index += 1;
        }
        output
    }

    fn captures(&self, word: &Word, index: usize) -> Captures {
        let mut captures = Captures::default();
        if let (Some(Segment::Matrix(search)), Some(current)) = (&self.search, word.phone(index)) {
            Captures::capture(&mut captures.alpha, search, Quality::Alpha, current);
        }
        if let Some(preceding) = index.checked_sub(1).and_then(|i| word.phone(i)) {
            for pattern in patterns(&self.left) {
                Captures::capture(&mut captures.beta, pattern, Quality::Beta, preceding);
            }
        }
        let following = if self.search.is_some() { index + 1 } else { index };
        if let Some(following) = word.phone(following) {
            for pattern in patterns(&self.right) {
                Captures::capture(&mut captures.gamma, pattern, Quality::Gamma, following);
            }
        }
        captures
    }

    fn matches(&self, word: &Word, index: usize, captures: &Captures) -> bool {
        let Some(current) = word.phone(index) else {
            return false;
        };
        let segment_matches = |segment: &Segment, phone: &Phone| match segment {
            Segment::Phone(literal) => literal == phone,
            Segment::Matrix(pattern) => phone.matrix().has_features(&captures.instantiate(pattern)),
        };
        if let Some(search) = &self.search {
            if !segment_matches(search, current) {
                return false;
            }
        }
        let mut gap = index;
        for entry in self.left.iter().rev() {
            match entry {
                ContextEntry::Boundary(boundary) => {
                    if !boundary.holds_at(word, gap) {
                        return false;
                    }
                }
                ContextEntry::Segment(segment) => {
                    let Some(phone) = gap.checked_sub(1).and_then(|i| word.phone(i)) else {
                        return false;
                    };
                    if !segment_matches(segment, phone) {
                        return false;
                    }
                    gap -= 1;
                }
            }
        }
        let mut gap = if self.search.is_some() { index + 1 } else { index };
        for entry in &self.right {
            match entry {
                ContextEntry::Boundary(boundary) => {
                    if !boundary.holds_at(word, gap) {
                        return false;
                    }
                }
                ContextEntry::Segment(segment) => {
                    let Some(phone) = word.phone(gap) else {
                        return false;
                    };
                    if !segment_matches(segment, phone) {
                        return false;
                    }
                    gap += 1;
                }
            }
        }
        true
    }

    pub fn render(&self, interner: &Interner) -> String {
        let search = self
            .search
            .as_ref()
            .map_or_else(|| "null".to_string(), |s| s.render(interner));
        let replacement: Vec<String> = self.replacement.iter().map(|s| s.render(interner)).collect();
        let side = |entries: &[ContextEntry]| {
            entries
                .iter()
                .map(|e| e.render(interner))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let mut text = format!(
            "{} |> {} -> ({})",
            self.kind.name(),
            search,
            replacement.join(", ")
        );
        if !self.left.is_empty() || !self.right.is_empty() {
            text.push_str(&format!(" / {} _ {}", side(&self.left), side(&self.right)));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::{Boundary, ContextEntry, RuleKind, Segment, SoundChangeRule};
    use crate::{
        interner::Interner,
        phonology::{feature::Quality, FeatureMatrix, PhoneTable},
    };
    use std::sync::Arc;
    use test_sono::BASE_PHONES;
    use Quality::{Alpha, False, True};

    fn table() -> PhoneTable {
        PhoneTable::from_tsv(Arc::new(Interner::new()), BASE_PHONES).unwrap()
    }

    fn pattern(table: &PhoneTable, entries: &[(&str, Quality)]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::new();
        for (name, quality) in entries {
            matrix.set(table.classes(), table.feature(name).unwrap(), *quality);
        }
        matrix
    }

    fn phone(table: &PhoneTable, symbol: &str) -> Segment {
        Segment::Phone(table.interpret_phone(symbol).unwrap())
    }

    fn apply(table: &PhoneTable, rule: &SoundChangeRule, word: &str) -> String {
        rule.transform(table, &table.interpret_sequence(word).unwrap())
            .to_string()
    }

    #[test]
    fn matrix_replacement_between_contexts() {
        let table = table();
        let voiceless = ContextEntry::Segment(Segment::Matrix(pattern(&table, &[("voice", False), ("syl", False)])));
        let rule = SoundChangeRule::new(
            RuleKind::Simple,
            Some(Segment::Matrix(pattern(
                &table,
                &[("syl", True), ("high", True), ("back", True), ("LAB", False)],
            ))),
            vec![voiceless.clone()],
            vec![voiceless],
            vec![Segment::Matrix(pattern(&table, &[("voice", False)]))],
        );
        assert_eq!(apply(&table, &rule, "tɯsi"), "tɯ\u{0325}si");
        assert_eq!(apply(&table, &rule, "tɯmi"), "tɯmi");
        assert_eq!(apply(&table, &rule, "tusi"), "tusi");
    }

    #[test]
    fn empty_replacement_deletes() {
        let table = table();
        let rule = SoundChangeRule::new(RuleKind::Simple, Some(phone(&table, "h")), vec![], vec![], vec![]);
        assert_eq!(apply(&table, &rule, "aha"), "aa");
        assert_eq!(rule.render(table.interner()), "S |> h -> ()");
    }

    #[test]
    fn missing_search_inserts_before_the_current_phone() {
        let table = table();
        let rule = SoundChangeRule::new(
            RuleKind::Simple,
            None,
            vec![ContextEntry::Segment(phone(&table, "k"))],
            vec![ContextEntry::Segment(phone(&table, "s"))],
            vec![phone(&table, "ɯ")],
        );
        assert_eq!(apply(&table, &rule, "aksa"), "akɯsa");
    }

    #[test]
    fn word_boundaries_sit_at_the_edges() {
        let table = table();
        let final_a = SoundChangeRule::new(
            RuleKind::Simple,
            Some(phone(&table, "a")),
            vec![],
            vec![ContextEntry::Boundary(Boundary::WordEnd)],
            vec![phone(&table, "o")],
        );
        assert_eq!(apply(&table, &final_a, "aka"), "ako");
        let initial_a = SoundChangeRule::new(
            RuleKind::Simple,
            Some(phone(&table, "a")),
            vec![ContextEntry::Boundary(Boundary::WordStart)],
            vec![],
            vec![phone(&table, "o")],
        );
        assert_eq!(apply(&table, &initial_a, "aka"), "oka");
    }

    #[test]
    fn syllable_boundaries_follow_markers() {
        let table = table();
        let rule = SoundChangeRule::new(
            RuleKind::Simple,
            Some(phone(&table, "k")),
            vec![ContextEntry::Boundary(Boundary::SyllableEdge)],
            vec![],
            vec![phone(&table, "g")],
        );
        assert_eq!(apply(&table, &rule, "ka.ka"), "ga.ga");
        assert_eq!(apply(&table, &rule, "aka"), "aka");
    }

    #[test]
    fn alpha_agrees_with_the_following_phone() {
        let table = table();
        let vowel = pattern(&table, &[("syl", True), ("back", Alpha)]);
        let rule = SoundChangeRule::new(
            RuleKind::AssimilateForward,
            Some(Segment::Matrix(vowel.clone())),
            vec![],
            vec![ContextEntry::Segment(Segment::Matrix(vowel))],
            vec![Segment::Matrix(pattern(&table, &[("long", True)]))],
        );
        assert_eq!(apply(&table, &rule, "eid"), "eːd");
        assert_eq!(apply(&table, &rule, "eod"), "eod");
    }

    #[test]
    fn forward_assimilation_skips_the_next_phone() {
        let table = table();
        let rule = SoundChangeRule::new(
            RuleKind::AssimilateForward,
            Some(phone(&table, "a")),
            vec![],
            vec![],
            vec![phone(&table, "o")],
        );
        assert_eq!(apply(&table, &rule, "akat"), "oo");
    }

    // The phone removed is the previous one in the output, which may itself
    // be a replacement, rather than the input phone before the match.
    #[test]
    fn backward_assimilation_replaces_the_previous_output_phone() {
        let table = table();
        let rule = SoundChangeRule::new(
            RuleKind::AssimilateBackward,
            Some(phone(&table, "k")),
            vec![],
            vec![],
            vec![phone(&table, "g")],
        );
        assert_eq!(apply(&table, &rule, "aka"), "ga");
        assert_eq!(apply(&table, &rule, "kka"), "ga");
        assert_eq!(apply(&table, &rule, "ka"), "ga");
    }
}
