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
    errors::{SonoError, SonoResult},
    interner::{Interner, Symbol},
    phonology::{
        feature::Quality,
        matrix::{FeatureMatrix, MajorClasses},
        phone::Phone,
        secondary::{Diacritic, SecondaryArticulation, SecondaryArticulationGenerator},
        word::{Marker, Word},
    },
};
use rayon::prelude::*;
use std::{collections::HashMap, fs, path::Path, sync::Arc};

/// Symbol given to a matrix that no registered phone carries.
pub const UNKNOWN_SYMBOL: &str = "*";

/// Reads a tab separated base phone table.
///
/// The header row starts with `SEGMENT` and names the features. An all
/// uppercase feature opens a major class that governs the lowercase features
/// after it. Every other row is a segment followed by one quality per feature.
pub struct PhoneTableBuilder {
    interner: Arc<Interner>,
    features: Vec<Symbol>,
    classes: MajorClasses,
    bases: Vec<(String, FeatureMatrix)>,
}

impl PhoneTableBuilder {
    pub fn new(interner: Arc<Interner>) -> Self {
        Self {
            interner,
            features: Vec::new(),
            classes: MajorClasses::new(),
            bases: Vec::new(),
        }
    }

    pub fn load(mut self, source: &str) -> SonoResult<Self> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());
        let (line, header) = lines.next().ok_or(SonoError::MalformedPhoneTable {
            line: 1,
            reason: "missing header row".to_string(),
        })?;
        self.read_header(line, header)?;
        for (line, row) in lines {
            self.read_row(line, row)?;
        }
        log::debug!(
            "Loaded {} base phones over {} features",
            self.bases.len(),
            self.features.len()
        );
        Ok(self)
    }

    fn read_header(&mut self, line: usize, header: &str) -> SonoResult<()> {
        let mut cells = header.split('\t').map(str::trim);
        if !cells
            .next()
            .map_or(false, |first| first.eq_ignore_ascii_case("SEGMENT"))
        {
            return Err(SonoError::MalformedPhoneTable {
                line,
                reason: "the header must start with SEGMENT".to_string(),
            });
        }
        let mut major = None;
        for name in cells {
            let feature = self.interner.intern(name);
            if is_major_name(name) {
                self.classes.add_class(feature);
                major = Some(feature);
            } else if let Some(major) = major {
                self.classes.add_dependent(major, feature);
            }
            self.features.push(feature);
        }
        Ok(())
    }

    fn read_row(&mut self, line: usize, row: &str) -> SonoResult<()> {
        let cells: Vec<&str> = row.split('\t').map(str::trim).collect();
        if cells.len() != self.features.len() + 1 {
            return Err(SonoError::MalformedPhoneTable {
                line,
                reason: format!(
                    "expected {} columns but found {}",
                    self.features.len() + 1,
                    cells.len()
                ),
            });
        }
        let mut matrix = FeatureMatrix::new();
        for (feature, cell) in self.features.iter().zip(&cells[1..]) {
            let quality = match cell.chars().collect::<Vec<_>>().as_slice() {
                [symbol] => Quality::from_symbol(*symbol).filter(|q| !q.is_variable()),
                _ => None,
            }
            .ok_or_else(|| SonoError::MalformedPhoneTable {
                line,
                reason: format!("`{}` is not a quality", cell),
            })?;
            matrix.set(&self.classes, *feature, quality);
        }
        self.bases.push((cells[0].to_string(), matrix));
        Ok(())
    }

    /// Every symbol and matrix in the order they are staged: the base phones
    /// as read, then the variants of each base in turn.
    pub fn derivations(&self) -> Vec<(String, FeatureMatrix)> {
        let articulations = SecondaryArticulation::standard(&self.interner, &self.features);
        let generator = SecondaryArticulationGenerator::new(&self.classes, &articulations);
        let mut derivations = self.bases.clone();
        for (symbol, matrix) in &self.bases {
            derivations.extend(generator.expand(symbol, matrix));
        }
        derivations
    }

    /// Derives every diacritic variant and settles on one symbol per matrix.
    pub fn finish(self) -> PhoneTable {
        let articulations = SecondaryArticulation::standard(&self.interner, &self.features);
        let mut staging = Staging::default();
        for (symbol, matrix) in self.derivations() {
            staging.stage(symbol, matrix);
        }
        let phones: Vec<Phone> = staging
            .order
            .into_iter()
            .zip(staging.symbols)
            .map(|(matrix, mut symbols)| {
                symbols.sort_by(|a, b| a.chars().count().cmp(&b.chars().count()).then(a.cmp(b)));
                let canonical = symbols.swap_remove(0);
                Phone::new(canonical, matrix)
            })
            .collect();
        log::debug!("Registered {} phones", phones.len());
        let index = phones
            .iter()
            .enumerate()
            .map(|(i, phone)| (phone.matrix().clone(), i))
            .collect();
        PhoneTable {
            interner: self.interner,
            features: self.features,
            classes: self.classes,
            bases: self.bases.into_iter().collect(),
            phones,
            index,
            articulations,
        }
    }
}

fn is_major_name(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase)
}

/// Symbols seen for each matrix, in order of first appearance.
#[derive(Default)]
struct Staging {
    order: Vec<FeatureMatrix>,
    symbols: Vec<Vec<String>>,
    positions: HashMap<FeatureMatrix, usize>,
}

impl Staging {
    fn stage(&mut self, symbol: String, matrix: FeatureMatrix) {
        match self.positions.get(&matrix) {
            Some(&position) => self.symbols[position].push(symbol),
            None => {
                self.positions.insert(matrix.clone(), self.order.len());
                self.order.push(matrix);
                self.symbols.push(vec![symbol]);
            }
        }
    }
}

/// The canonical registry of phones.
///
/// Built once and read-only afterwards, so it can be shared between contexts
/// and threads without locking.
#[derive(Debug)]
pub struct PhoneTable {
    interner: Arc<Interner>,
    features: Vec<Symbol>,
    classes: MajorClasses,
    bases: HashMap<String, FeatureMatrix>,
    phones: Vec<Phone>,
    index: HashMap<FeatureMatrix, usize>,
    articulations: Vec<SecondaryArticulation>,
}

impl PhoneTable {
    /// A table without features or phones, for running scripts without phonology.
    pub fn empty(interner: Arc<Interner>) -> Self {
        PhoneTableBuilder::new(interner).finish()
    }

    pub fn from_tsv(interner: Arc<Interner>, source: &str) -> SonoResult<Self> {
        Ok(PhoneTableBuilder::new(interner).load(source)?.finish())
    }

    pub fn from_path(interner: Arc<Interner>, path: impl AsRef<Path>) -> SonoResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|error| SonoError::PhoneTableUnavailable {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;
        Self::from_tsv(interner, &source)
    }

    pub fn interner(&self) -> &Arc<Interner> {
        &self.interner
    }

    pub fn classes(&self) -> &MajorClasses {
        &self.classes
    }

    pub fn features(&self) -> &[Symbol] {
        &self.features
    }

    /// The symbol of a feature named in the table header.
    pub fn feature(&self, name: &str) -> Option<Symbol> {
        self.interner
            .get(name)
            .filter(|symbol| self.features.contains(symbol))
    }

    pub fn phones(&self) -> &[Phone] {
        &self.phones
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    pub fn contains(&self, matrix: &FeatureMatrix) -> bool {
        self.index.contains_key(matrix)
    }

    pub fn get(&self, matrix: &FeatureMatrix) -> Option<&Phone> {
        self.index.get(matrix).map(|&i| &self.phones[i])
    }

    pub fn is_diacritic(&self, symbol: char) -> bool {
        self.articulation(symbol).is_some()
    }

    fn articulation(&self, symbol: char) -> Option<&SecondaryArticulation> {
        self.articulations.iter().find(|a| a.symbol() == symbol)
    }

    /// The canonical phone for `matrix`, falling back on a fuzzy match when
    /// `search` is set and on an unregistered `*` phone otherwise.
    pub fn lookup_or_create(&self, matrix: FeatureMatrix, search: bool) -> Phone {
        if let Some(phone) = self.get(&matrix) {
            return phone.clone();
        }
        if search {
            if let Some(phone) = self.fuzzy_search(&matrix) {
                log::trace!("fuzzy match {}", phone);
                return phone;
            }
        }
        Phone::new(UNKNOWN_SYMBOL, matrix)
    }

    /// The first registered phone that agrees with every feature `target` specifies.
    pub fn fuzzy_search(&self, target: &FeatureMatrix) -> Option<Phone> {
        self.phones
            .par_iter()
            .find_first(|phone| phone.matrix().has_features(target))
            .cloned()
    }

    /// `phone` with `delta` merged into its matrix, re-interned.
    pub fn transform(&self, phone: &Phone, delta: &FeatureMatrix, search: bool) -> Phone {
        self.lookup_or_create(phone.matrix().transform(&self.classes, delta), search)
    }

    /// Features on which every phone agrees.
    pub fn common(&self, phones: &[Phone]) -> FeatureMatrix {
        let mut common = FeatureMatrix::new();
        if let Some((first, rest)) = phones.split_first() {
            for &(feature, quality) in first.matrix().entries() {
                if rest.iter().all(|p| p.matrix().get(feature) == quality) {
                    common.put(feature, quality);
                }
            }
        }
        common
    }

    /// Features that `b` specifies differently from `a`.
    pub fn contrast(&self, a: &Phone, b: &Phone) -> FeatureMatrix {
        let mut contrast = FeatureMatrix::new();
        for &(feature, quality) in b.matrix().entries() {
            if a.matrix().get(feature) != quality {
                contrast.put(feature, quality);
            }
        }
        contrast
    }

    /// The phones among `phones` that have every feature of `pattern`.
    pub fn find(&self, pattern: &FeatureMatrix, phones: &[Phone]) -> Vec<Phone> {
        phones
            .par_iter()
            .filter(|phone| phone.matrix().has_features(pattern))
            .cloned()
            .collect()
    }

    /// Reads a single segment such as `tʲ`.
    pub fn interpret_phone(&self, segment: &str) -> SonoResult<Phone> {
        let word = self.interpret_sequence(segment)?;
        match word.iter().collect::<Vec<_>>().as_slice() {
            [(phone, Marker::None)] => Ok((*phone).clone()),
            _ => Err(SonoError::UnknownPhone {
                segment: segment.to_string(),
                position: None,
            }),
        }
    }

    /// Reads a transcription into a word.
    ///
    /// Each phone is the shortest run of characters naming a base phone
    /// (`_` ties the run to the next character) followed by any diacritics.
    pub fn interpret_sequence(&self, transcription: &str) -> SonoResult<Word> {
        let characters: Vec<char> = transcription.chars().collect();
        let mut word = Word::new();
        let mut marker = Marker::None;
        let mut i = 0;
        while i < characters.len() {
            if let Some(boundary) = Marker::from_symbol(characters[i]) {
                marker = boundary;
                i += 1;
                continue;
            }
            let mut base = String::new();
            while i < characters.len() && (characters[i] == '_' || !self.bases.contains_key(&base)) {
                base.push(characters[i]);
                i += 1;
            }
            let mut diacritics = Vec::new();
            while i < characters.len() && self.is_diacritic(characters[i]) {
                diacritics.push(characters[i]);
                i += 1;
            }
            word.push(self.interpret_segment(&base, &diacritics)?, marker);
            marker = Marker::None;
        }
        if marker != Marker::None {
            return Err(SonoError::DanglingBoundary {
                transcription: transcription.to_string(),
                position: None,
            });
        }
        Ok(word)
    }

    fn interpret_segment(&self, base: &str, diacritics: &[char]) -> SonoResult<Phone> {
        let mut matrix = self
            .bases
            .get(base)
            .cloned()
            .ok_or_else(|| SonoError::UnknownPhone {
                segment: base.to_string(),
                position: None,
            })?;
        let mut symbol = base.to_string();
        let mut applied: Vec<Diacritic> = Vec::new();
        for &mark in diacritics {
            let articulation = self
                .articulation(mark)
                .filter(|a| a.can_apply(&matrix, &applied))
                .ok_or_else(|| SonoError::InapplicableDiacritic {
                    diacritic: mark.to_string(),
                    base: symbol.clone(),
                    position: None,
                })?;
            matrix = articulation.apply(&self.classes, &matrix);
            applied.push(articulation.kind());
            symbol.push(mark);
        }
        Ok(self
            .get(&matrix)
            .cloned()
            .unwrap_or_else(|| Phone::new(symbol, matrix)))
    }
}

#[cfg(test)]
mod tests {
    use super::{PhoneTable, PhoneTableBuilder, UNKNOWN_SYMBOL};
    use crate::{
        errors::SonoError,
        interner::Interner,
        phonology::{feature::Quality, Feature, FeatureMatrix, Marker},
    };
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use test_sono::BASE_PHONES;

    fn base_table() -> PhoneTable {
        PhoneTable::from_tsv(Arc::new(Interner::new()), BASE_PHONES).unwrap()
    }

    fn symbols(table: &PhoneTable) -> Vec<&str> {
        table.phones().iter().map(|phone| phone.symbol()).collect()
    }

    #[test]
    fn variants_are_derived_depth_first_after_the_bases() {
        let builder = PhoneTableBuilder::new(Arc::new(Interner::new()))
            .load("SEGMENT\tlong\tvoice\na\t-\t+\n")
            .unwrap();
        let order: Vec<String> = builder.derivations().into_iter().map(|(symbol, _)| symbol).collect();
        assert_eq!(order, vec!["a", "a\u{0325}", "a\u{0325}ː", "aː"]);
        assert_eq!(builder.finish().len(), 4);
    }

    #[test]
    fn shortest_then_smallest_symbol_is_canonical() {
        let table = PhoneTable::from_tsv(Arc::new(Interner::new()), "SEGMENT\tvoice\nb\t+\na\t+\n").unwrap();
        assert_eq!(symbols(&table), vec!["a", "a\u{0325}"]);
    }

    #[test]
    fn base_phones_are_registered_first_in_file_order() {
        let table = base_table();
        let rows: Vec<&str> = BASE_PHONES
            .lines()
            .skip(1)
            .filter_map(|row| row.split('\t').next())
            .collect();
        assert_eq!(rows.len(), 27);
        assert_eq!(&symbols(&table)[..27], rows.as_slice());
        assert_eq!(table.len(), 698);
    }

    #[test]
    fn header_must_start_with_segment() {
        assert_matches!(
            PhoneTable::from_tsv(Arc::new(Interner::new()), "NAME\tvoice\n"),
            Err(SonoError::MalformedPhoneTable { line: 1, .. })
        );
        assert_matches!(
            PhoneTable::from_tsv(Arc::new(Interner::new()), "SEGMENT\tvoice\na\t+\t-\n"),
            Err(SonoError::MalformedPhoneTable { line: 2, .. })
        );
        assert_matches!(
            PhoneTable::from_tsv(Arc::new(Interner::new()), "SEGMENT\tvoice\na\tα\n"),
            Err(SonoError::MalformedPhoneTable { line: 2, .. })
        );
    }

    #[test]
    fn missing_file_is_a_startup_error() {
        assert_matches!(
            PhoneTable::from_path(Arc::new(Interner::new()), "/nonexistent/phones.tsv"),
            Err(SonoError::PhoneTableUnavailable { .. })
        );
    }

    #[test]
    fn transcriptions_are_read_base_then_diacritics() {
        let table = base_table();
        let word = table.interpret_sequence("tɯ\u{0325}.sʲi+ka").unwrap();
        assert_eq!(word.len(), 6);
        assert_eq!(word.phone(1).unwrap().symbol(), "ɯ\u{0325}");
        assert_eq!(word.phone(2).unwrap().symbol(), "sʲ");
        assert_eq!(word.marker(2), Marker::Syllable);
        assert_eq!(word.marker(4), Marker::Morpheme);
        assert_eq!(word.to_string(), "tɯ\u{0325}.sʲi+ka");
    }

    #[test]
    fn unknown_and_inapplicable_segments_are_errors() {
        let table = base_table();
        assert_matches!(table.interpret_sequence("ʘa"), Err(SonoError::UnknownPhone { .. }));
        assert_matches!(
            table.interpret_sequence("aʲ"),
            Err(SonoError::InapplicableDiacritic { .. })
        );
        assert_matches!(table.interpret_phone("ka"), Err(SonoError::UnknownPhone { .. }));
        assert_matches!(
            table.interpret_sequence("ka."),
            Err(SonoError::DanglingBoundary { transcription, .. }) if transcription == "ka."
        );
        assert_eq!(table.interpret_sequence("+ka").unwrap().to_string(), "+ka");
    }

    #[test]
    fn fuzzy_search_returns_the_first_registered_match() {
        let table = base_table();
        let voice = table.feature("voice").unwrap();
        let voiceless = FeatureMatrix::from(Feature::new(voice, Quality::False));
        assert_eq!(table.lookup_or_create(voiceless.clone(), true).symbol(), "p");
        assert_eq!(table.lookup_or_create(voiceless, false).symbol(), UNKNOWN_SYMBOL);
    }

    #[test]
    fn contrast_and_common_features() {
        let table = base_table();
        let voice = table.feature("voice").unwrap();
        let cons = table.feature("cons").unwrap();
        let t = table.interpret_phone("t").unwrap();
        let d = table.interpret_phone("d").unwrap();
        assert_eq!(
            table.contrast(&t, &d),
            FeatureMatrix::from(Feature::new(voice, Quality::True))
        );
        let common = table.common(&[t.clone(), d]);
        assert_eq!(common.get(cons), Quality::True);
        assert_eq!(common.get(voice), Quality::Unset);
        let voiceless = table.find(&FeatureMatrix::from(Feature::new(voice, Quality::False)), table.phones());
        assert!(voiceless.contains(&t));
    }
}
