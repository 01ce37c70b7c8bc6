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
        feature::Quality::{self, False, True, Unset},
        matrix::{FeatureMatrix, MajorClasses},
    },
};
use std::fmt;

/// The secondary articulations that can be stacked on a base phone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Diacritic {
    Vocalic,
    Retracted,
    Advanced,
    Palatoalveolar,
    Dental,
    Devoicing,
    Nasalization,
    Labialization,
    Palatalization,
    Velarization,
    Pharyngealization,
    Aspiration,
    Length,
}

impl fmt::Display for Diacritic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type Pattern = &'static [(&'static str, Quality)];

struct Definition {
    kind: Diacritic,
    symbol: char,
    delta: Pattern,
    restrictions: &'static [Diacritic],
    requirements: &'static [Pattern],
}

const OBSTRUENT_OR_GLIDE: &[Pattern] = &[
    &[("cons", True), ("syl", False)],
    &[("cons", False), ("syl", False)],
];

const FRONTABLE: &[Pattern] = &[
    &[("cons", True), ("syl", False), ("back", False)],
    &[("cons", False), ("syl", False), ("back", False)],
    &[("cons", True), ("syl", False), ("back", Unset)],
    &[("cons", False), ("syl", False), ("back", Unset)],
];

const CORONAL: &[Pattern] = &[&[("COR", True)]];

// Order matters: it is the order in which variants are derived.
const DEFINITIONS: [Definition; 13] = [
    Definition {
        kind: Diacritic::Vocalic,
        symbol: '\u{0329}',
        delta: &[("syl", True)],
        restrictions: &[],
        requirements: &[&[("cons", True), ("son", True), ("syl", False)]],
    },
    Definition {
        kind: Diacritic::Retracted,
        symbol: '\u{0320}',
        delta: &[("front", False), ("back", True)],
        restrictions: &[Diacritic::Advanced],
        requirements: CORONAL,
    },
    Definition {
        kind: Diacritic::Advanced,
        symbol: '\u{031F}',
        delta: &[("front", True), ("back", False)],
        restrictions: &[Diacritic::Retracted],
        requirements: CORONAL,
    },
    Definition {
        kind: Diacritic::Palatoalveolar,
        symbol: '\u{033A}',
        delta: &[("ant", False), ("dist", True)],
        restrictions: &[Diacritic::Dental],
        requirements: CORONAL,
    },
    Definition {
        kind: Diacritic::Dental,
        symbol: '\u{032A}',
        delta: &[("ant", True), ("dist", True)],
        restrictions: &[Diacritic::Palatoalveolar],
        requirements: CORONAL,
    },
    Definition {
        kind: Diacritic::Devoicing,
        symbol: '\u{0325}',
        delta: &[("voice", False)],
        restrictions: &[],
        requirements: &[&[("voice", True)]],
    },
    Definition {
        kind: Diacritic::Nasalization,
        symbol: '\u{0303}',
        delta: &[("nasal", True)],
        restrictions: &[],
        requirements: &[&[("son", True), ("nasal", False)]],
    },
    Definition {
        kind: Diacritic::Labialization,
        symbol: 'ʷ',
        delta: &[("LAB", True), ("round", True)],
        restrictions: &[],
        requirements: OBSTRUENT_OR_GLIDE,
    },
    Definition {
        kind: Diacritic::Palatalization,
        symbol: 'ʲ',
        delta: &[
            ("DOR", True),
            ("high", True),
            ("low", False),
            ("front", True),
            ("back", False),
        ],
        restrictions: &[Diacritic::Velarization, Diacritic::Pharyngealization],
        requirements: FRONTABLE,
    },
    Definition {
        kind: Diacritic::Velarization,
        symbol: 'ˠ',
        delta: &[
            ("DOR", True),
            ("high", True),
            ("low", False),
            ("front", False),
            ("back", True),
        ],
        restrictions: &[Diacritic::Palatalization, Diacritic::Pharyngealization],
        requirements: FRONTABLE,
    },
    Definition {
        kind: Diacritic::Pharyngealization,
        symbol: 'ˤ',
        delta: &[
            ("DOR", True),
            ("high", False),
            ("low", True),
            ("front", False),
            ("back", True),
        ],
        restrictions: &[Diacritic::Velarization, Diacritic::Palatalization],
        requirements: OBSTRUENT_OR_GLIDE,
    },
    Definition {
        kind: Diacritic::Aspiration,
        symbol: 'ʰ',
        delta: &[("sg", True), ("cg", False)],
        restrictions: &[],
        requirements: OBSTRUENT_OR_GLIDE,
    },
    Definition {
        kind: Diacritic::Length,
        symbol: 'ː',
        delta: &[("long", True)],
        restrictions: &[],
        requirements: &[&[("long", False)]],
    },
];

/// A diacritic resolved against the features of one phone table.
#[derive(Clone, Debug)]
pub struct SecondaryArticulation {
    kind: Diacritic,
    symbol: char,
    delta: FeatureMatrix,
    restrictions: &'static [Diacritic],
    requirements: Vec<Vec<(Symbol, Quality)>>,
}

impl SecondaryArticulation {
    /// The standard diacritics whose deltas only use features in `features`.
    pub fn standard(interner: &Interner, features: &[Symbol]) -> Vec<SecondaryArticulation> {
        DEFINITIONS
            .iter()
            .filter_map(|definition| {
                let mut delta = FeatureMatrix::new();
                for (name, quality) in definition.delta {
                    let feature = interner.get(name).filter(|f| features.contains(f))?;
                    delta.put(feature, *quality);
                }
                let requirements = definition
                    .requirements
                    .iter()
                    .map(|pattern| {
                        pattern
                            .iter()
                            .map(|(name, quality)| (interner.intern(name), *quality))
                            .collect()
                    })
                    .collect();
                Some(SecondaryArticulation {
                    kind: definition.kind,
                    symbol: definition.symbol,
                    delta,
                    restrictions: definition.restrictions,
                    requirements,
                })
            })
            .collect()
    }

    pub fn kind(&self) -> Diacritic {
        self.kind
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn delta(&self) -> &FeatureMatrix {
        &self.delta
    }

    /// Whether this diacritic may follow `applied` on a phone with `matrix`.
    pub fn can_apply(&self, matrix: &FeatureMatrix, applied: &[Diacritic]) -> bool {
        !applied
            .iter()
            .any(|d| *d == self.kind || self.restrictions.contains(d))
            && self
                .requirements
                .iter()
                .any(|pattern| pattern.iter().all(|(f, q)| matrix.get(*f) == *q))
    }

    pub fn apply(&self, classes: &MajorClasses, matrix: &FeatureMatrix) -> FeatureMatrix {
        matrix.transform(classes, &self.delta)
    }
}

struct Derivation {
    symbol: String,
    matrix: FeatureMatrix,
    applied: Vec<Diacritic>,
    next: usize,
}

/// Enumerates the diacritic variants of a base phone.
pub struct SecondaryArticulationGenerator<'a> {
    classes: &'a MajorClasses,
    articulations: &'a [SecondaryArticulation],
}

impl<'a> SecondaryArticulationGenerator<'a> {
    pub fn new(classes: &'a MajorClasses, articulations: &'a [SecondaryArticulation]) -> Self {
        Self {
            classes,
            articulations,
        }
    }

    /// Every variant of `symbol`, depth first, each diacritic considered only
    /// after those already on the derivation path.
    pub fn expand(&self, symbol: &str, matrix: &FeatureMatrix) -> Vec<(String, FeatureMatrix)> {
        let mut variants = Vec::new();
        let mut work = vec![Derivation {
            symbol: symbol.to_string(),
            matrix: matrix.clone(),
            applied: Vec::new(),
            next: 0,
        }];
        while let Some(current) = work.last_mut() {
            let index = current.next;
            let Some(articulation) = self.articulations.get(index) else {
                work.pop();
                continue;
            };
            current.next += 1;
            if !articulation.can_apply(&current.matrix, &current.applied) {
                continue;
            }
            let mut applied = current.applied.clone();
            applied.push(articulation.kind);
            let derived = Derivation {
                symbol: format!("{}{}", current.symbol, articulation.symbol),
                matrix: articulation.apply(self.classes, &current.matrix),
                applied,
                next: index + 1,
            };
            variants.push((derived.symbol.clone(), derived.matrix.clone()));
            work.push(derived);
        }
        log::trace!("{} has {} diacritic variants", symbol, variants.len());
        variants
    }
}
