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

//! Feature matrices, phones, words and sound changes.

/// Qualities and single features.
pub mod feature;

/// Sparse feature matrices and major-class propagation.
pub mod matrix;

pub mod phone;

/// Sound-change rules and their application to words.
pub mod rule;

/// Diacritics and the generation of secondary articulations.
pub mod secondary;

/// The canonical phone registry and transcription reading.
pub mod table;

pub mod word;

pub use self::{
    feature::{Feature, Quality},
    matrix::{FeatureMatrix, MajorClasses},
    phone::Phone,
    rule::{Boundary, ContextEntry, RuleKind, Segment, SoundChangeRule},
    secondary::{Diacritic, SecondaryArticulation, SecondaryArticulationGenerator},
    table::{PhoneTable, PhoneTableBuilder, UNKNOWN_SYMBOL},
    word::{Marker, Word},
};
