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
    phonology::feature::{Feature, Quality},
};
use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

/// Which features govern which.
///
/// A major feature such as `COR` governs the place features listed after it
/// in the phone table header. The table does not depend on any matrix.
#[derive(Clone, Debug, Default)]
pub struct MajorClasses {
    dependents: HashMap<Symbol, Vec<Symbol>>,
    governors: HashMap<Symbol, Symbol>,
}

impl MajorClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, major: Symbol) {
        self.dependents.entry(major).or_default();
    }

    pub fn add_dependent(&mut self, major: Symbol, dependent: Symbol) {
        self.dependents.entry(major).or_default().push(dependent);
        self.governors.insert(dependent, major);
    }

    pub fn is_major(&self, feature: Symbol) -> bool {
        self.dependents.contains_key(&feature)
    }

    pub fn dependents(&self, major: Symbol) -> &[Symbol] {
        self.dependents.get(&major).map_or(&[], Vec::as_slice)
    }

    pub fn governor(&self, feature: Symbol) -> Option<Symbol> {
        self.governors.get(&feature).copied()
    }
}

/// Sparse mapping from feature to quality.
///
/// Entries keep their insertion order, which matters when a matrix is used
/// as a delta, but equality and hashing ignore it.
#[derive(Clone, Debug, Default)]
pub struct FeatureMatrix {
    entries: Vec<(Symbol, Quality)>,
}

impl FeatureMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feature: Symbol) -> Quality {
        self.entries
            .iter()
            .find(|(f, _)| *f == feature)
            .map_or(Quality::Unset, |(_, q)| *q)
    }

    pub fn entries(&self) -> &[(Symbol, Quality)] {
        &self.entries
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.entries.iter().map(|(f, q)| Feature::new(*f, *q))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_variables(&self) -> bool {
        self.entries.iter().any(|(_, q)| q.is_variable())
    }

    /// Writes one entry without any major-class propagation.
    pub(crate) fn put(&mut self, feature: Symbol, quality: Quality) {
        let existing = self.entries.iter().position(|(f, _)| *f == feature);
        match (existing, quality) {
            (Some(index), Quality::Unset) => {
                self.entries.remove(index);
            }
            (Some(index), _) => self.entries[index].1 = quality,
            (None, Quality::Unset) => (),
            (None, _) => self.entries.push((feature, quality)),
        }
    }

    /// Sets a feature and keeps its major class consistent.
    pub fn set(&mut self, classes: &MajorClasses, feature: Symbol, quality: Quality) {
        self.put(feature, quality);
        if quality.is_variable() {
            return;
        }
        if classes.is_major(feature) {
            if quality == Quality::True {
                self.initialize_dependents(classes, feature);
            } else {
                for &dependent in classes.dependents(feature) {
                    self.put(dependent, Quality::Unset);
                }
            }
        } else if quality == Quality::True {
            if let Some(major) = classes.governor(feature) {
                self.put(major, Quality::True);
                self.initialize_dependents(classes, major);
            }
        }
    }

    // Unset dependents of a major that is now `+` become `-`.
    fn initialize_dependents(&mut self, classes: &MajorClasses, major: Symbol) {
        for &dependent in classes.dependents(major) {
            if self.get(dependent) == Quality::Unset {
                self.put(dependent, Quality::False);
            }
        }
    }

    /// Copy of `self` with every entry of `delta` set on it in order.
    pub fn transform(&self, classes: &MajorClasses, delta: &FeatureMatrix) -> FeatureMatrix {
        let mut result = self.clone();
        for &(feature, quality) in &delta.entries {
            result.set(classes, feature, quality);
        }
        result
    }

    /// Whether every non-wildcard entry of `pattern` is present here with the same quality.
    pub fn has_features(&self, pattern: &FeatureMatrix) -> bool {
        pattern
            .entries
            .iter()
            .filter(|(_, q)| *q != Quality::Any)
            .all(|(f, q)| self.get(*f) == *q)
    }

    /// All entries of both matrices. Features on which they disagree become `Any`.
    pub fn union(&self, other: &FeatureMatrix) -> FeatureMatrix {
        let mut result = self.clone();
        for &(feature, quality) in &other.entries {
            match result.get(feature) {
                Quality::Unset => result.put(feature, quality),
                existing if existing == quality => (),
                _ => result.put(feature, Quality::Any),
            }
        }
        result
    }

    /// Entries of `self` whose quality is `variable`, with that variable replaced by the captured value.
    pub(crate) fn substitute(&self, variable: Quality, captured: &HashMap<Symbol, Quality>) -> FeatureMatrix {
        let mut result = self.clone();
        for &(feature, quality) in &self.entries {
            if quality == variable {
                if let Some(value) = captured.get(&feature) {
                    result.put(feature, *value);
                }
            }
        }
        result
    }

    pub fn without_variables(&self) -> FeatureMatrix {
        FeatureMatrix {
            entries: self
                .entries
                .iter()
                .filter(|(_, q)| !q.is_variable())
                .copied()
                .collect(),
        }
    }

    pub fn render(&self, interner: &Interner) -> String {
        let features: Vec<String> = self.features().map(|f| f.render(interner)).collect();
        format!("[{}]", features.join(", "))
    }

    fn sorted(&self) -> Vec<(Symbol, Quality)> {
        let mut entries = self.entries.clone();
        entries.sort();
        entries
    }
}

impl PartialEq for FeatureMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(f, q)| other.get(*f) == *q)
    }
}

impl Eq for FeatureMatrix {}

impl Hash for FeatureMatrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state)
    }
}

impl From<Feature> for FeatureMatrix {
    fn from(feature: Feature) -> Self {
        let mut matrix = FeatureMatrix::new();
        matrix.put(feature.feature, feature.quality);
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureMatrix, MajorClasses};
    use crate::{
        interner::{Interner, Symbol},
        phonology::feature::Quality,
    };
    use proptest::prelude::*;

    struct Fixture {
        classes: MajorClasses,
        voice: Symbol,
        dorsal: Symbol,
        high: Symbol,
        back: Symbol,
        labial: Symbol,
        round: Symbol,
    }

    fn fixture() -> Fixture {
        let interner = Interner::new();
        let voice = interner.intern("voice");
        let labial = interner.intern("LAB");
        let round = interner.intern("round");
        let dorsal = interner.intern("DOR");
        let high = interner.intern("high");
        let back = interner.intern("back");
        let mut classes = MajorClasses::new();
        classes.add_class(labial);
        classes.add_dependent(labial, round);
        classes.add_class(dorsal);
        classes.add_dependent(dorsal, high);
        classes.add_dependent(dorsal, back);
        Fixture {
            classes,
            voice,
            dorsal,
            high,
            back,
            labial,
            round,
        }
    }

    fn quality() -> impl Strategy<Value = Quality> {
        prop_oneof![
            Just(Quality::True),
            Just(Quality::False),
            Just(Quality::Unset),
            Just(Quality::Any),
        ]
    }

    fn delta(features: Vec<Symbol>) -> impl Strategy<Value = Vec<(Symbol, Quality)>> {
        prop::collection::vec((prop::sample::select(features), quality()), 0..6)
    }

    fn build(fixture: &Fixture, entries: &[(Symbol, Quality)]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::new();
        for &(feature, quality) in entries {
            matrix.set(&fixture.classes, feature, quality);
        }
        matrix
    }

    fn all_features() -> Vec<Symbol> {
        let f = fixture();
        vec![f.voice, f.dorsal, f.high, f.back, f.labial, f.round]
    }

    proptest! {
        #[test]
        fn transforming_twice_is_transforming_once(
            base in delta(all_features()),
            change in delta(all_features()),
        ) {
            let f = fixture();
            let start = build(&f, &base);
            let change = literal(&change);
            let once = start.transform(&f.classes, &change);
            let twice = once.transform(&f.classes, &change);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn equality_ignores_order_and_is_symmetric(entries in delta(all_features())) {
            let forwards = literal(&entries);
            let mut backwards = FeatureMatrix::new();
            let settled: Vec<_> = forwards.entries().to_vec();
            for &(feature, quality) in settled.iter().rev() {
                backwards.put(feature, quality);
            }
            prop_assert_eq!(&forwards, &backwards);
            prop_assert_eq!(&backwards, &forwards);
        }
    }

    // Deltas hold their entries exactly as written.
    fn literal(entries: &[(Symbol, Quality)]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::new();
        for &(feature, quality) in entries {
            matrix.put(feature, quality);
        }
        matrix
    }

    #[test]
    fn major_true_initialises_unset_dependents_to_false() {
        let f = fixture();
        let mut matrix = FeatureMatrix::new();
        matrix.set(&f.classes, f.high, Quality::True);
        matrix.set(&f.classes, f.dorsal, Quality::False);
        matrix.set(&f.classes, f.dorsal, Quality::True);
        assert_eq!(matrix.get(f.high), Quality::False);
        assert_eq!(matrix.get(f.back), Quality::False);
    }

    #[test]
    fn major_false_or_any_resets_dependents() {
        let f = fixture();
        let mut matrix = FeatureMatrix::new();
        matrix.set(&f.classes, f.labial, Quality::True);
        matrix.set(&f.classes, f.round, Quality::True);
        matrix.set(&f.classes, f.labial, Quality::Any);
        assert_eq!(matrix.get(f.round), Quality::Unset);
        matrix.set(&f.classes, f.labial, Quality::True);
        assert_eq!(matrix.get(f.round), Quality::False);
        matrix.set(&f.classes, f.labial, Quality::False);
        assert_eq!(matrix.get(f.round), Quality::Unset);
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn dependent_true_forces_its_major() {
        let f = fixture();
        let mut matrix = FeatureMatrix::new();
        matrix.set(&f.classes, f.dorsal, Quality::False);
        matrix.set(&f.classes, f.back, Quality::True);
        assert_eq!(matrix.get(f.dorsal), Quality::True);
        assert_eq!(matrix.get(f.back), Quality::True);
        assert_eq!(matrix.get(f.high), Quality::False);
    }

    #[test]
    fn forced_major_leaves_set_siblings_alone() {
        let f = fixture();
        let mut matrix = FeatureMatrix::new();
        matrix.set(&f.classes, f.high, Quality::Any);
        matrix.set(&f.classes, f.back, Quality::True);
        assert_eq!(matrix.get(f.dorsal), Quality::True);
        assert_eq!(matrix.get(f.high), Quality::Any);
    }

    #[test]
    fn pattern_variables_do_not_propagate() {
        let f = fixture();
        let mut matrix = FeatureMatrix::new();
        matrix.set(&f.classes, f.dorsal, Quality::Gamma);
        matrix.set(&f.classes, f.high, Quality::Alpha);
        assert_eq!(matrix.len(), 2);
        assert!(matrix.has_variables());
        assert!(matrix.without_variables().is_empty());
    }

    #[test]
    fn union_turns_conflicts_into_wildcards() {
        let f = fixture();
        let mut left = FeatureMatrix::new();
        left.put(f.voice, Quality::True);
        left.put(f.high, Quality::True);
        let mut right = FeatureMatrix::new();
        right.put(f.voice, Quality::False);
        right.put(f.high, Quality::True);
        right.put(f.back, Quality::Any);
        let union = left.union(&right);
        assert_eq!(union.get(f.voice), Quality::Any);
        assert_eq!(union.get(f.high), Quality::True);
        assert_eq!(union.get(f.back), Quality::Any);
    }

    #[test]
    fn any_is_a_wildcard_in_patterns() {
        let f = fixture();
        let mut phone = FeatureMatrix::new();
        phone.put(f.voice, Quality::True);
        let mut pattern = FeatureMatrix::new();
        pattern.put(f.voice, Quality::Any);
        assert!(phone.has_features(&pattern));
        pattern.put(f.round, Quality::False);
        assert!(!phone.has_features(&pattern));
    }
}
