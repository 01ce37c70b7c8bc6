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
    function::Callable,
    interner::Interner,
    phonology::{Feature, FeatureMatrix, Phone, SoundChangeRule, Word},
    structure::Structure,
};
use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

/// The variants of `Datum`, used to key prototype methods.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DatumKind {
    Null,
    Bool,
    Number,
    String,
    Vector,
    Dictionary,
    Matrix,
    Feature,
    Phone,
    Word,
    Rule,
    Function,
    Structure,
    Pointer,
}

impl DatumKind {
    pub const ALL: [DatumKind; 14] = [
        DatumKind::Null,
        DatumKind::Bool,
        DatumKind::Number,
        DatumKind::String,
        DatumKind::Vector,
        DatumKind::Dictionary,
        DatumKind::Matrix,
        DatumKind::Feature,
        DatumKind::Phone,
        DatumKind::Word,
        DatumKind::Rule,
        DatumKind::Function,
        DatumKind::Structure,
        DatumKind::Pointer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DatumKind::Null => "Null",
            DatumKind::Bool => "Bool",
            DatumKind::Number => "Number",
            DatumKind::String => "String",
            DatumKind::Vector => "Vector",
            DatumKind::Dictionary => "Dictionary",
            DatumKind::Matrix => "Matrix",
            DatumKind::Feature => "Feature",
            DatumKind::Phone => "Phone",
            DatumKind::Word => "Word",
            DatumKind::Rule => "Rule",
            DatumKind::Function => "Function",
            DatumKind::Structure => "Structure",
            DatumKind::Pointer => "Pointer",
        }
    }

    pub fn from_name(name: &str) -> Option<DatumKind> {
        DatumKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for DatumKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque handle owned by native code, e.g. a spawned thread.
#[derive(Clone)]
pub struct Pointer(Arc<dyn Any + Send + Sync>);

impl Pointer {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Pointer(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pointer({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Pointer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Vector(Vec<Datum>),
    Dictionary(BTreeMap<String, Datum>),
    Matrix(FeatureMatrix),
    Feature(Feature),
    Phone(Phone),
    Word(Word),
    Rule(Arc<SoundChangeRule>),
    Function(Callable),
    Structure(Arc<Structure>),
    Pointer(Pointer),
}

impl Datum {
    pub fn kind(&self) -> DatumKind {
        match self {
            Datum::Null => DatumKind::Null,
            Datum::Bool(_) => DatumKind::Bool,
            Datum::Number(_) => DatumKind::Number,
            Datum::String(_) => DatumKind::String,
            Datum::Vector(_) => DatumKind::Vector,
            Datum::Dictionary(_) => DatumKind::Dictionary,
            Datum::Matrix(_) => DatumKind::Matrix,
            Datum::Feature(_) => DatumKind::Feature,
            Datum::Phone(_) => DatumKind::Phone,
            Datum::Word(_) => DatumKind::Word,
            Datum::Rule(_) => DatumKind::Rule,
            Datum::Function(_) => DatumKind::Function,
            Datum::Structure(_) => DatumKind::Structure,
            Datum::Pointer(_) => DatumKind::Pointer,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_bool(&self, operation: &str) -> SonoResult<bool> {
        match self {
            Datum::Bool(value) => Ok(*value),
            other => Err(SonoError::type_mismatch(operation, other.kind().name())),
        }
    }

    pub fn as_number(&self, operation: &str) -> SonoResult<f64> {
        match self {
            Datum::Number(value) => Ok(*value),
            other => Err(SonoError::type_mismatch(operation, other.kind().name())),
        }
    }

    /// Reads an index into a sized value of `length`.
    pub fn as_index(&self, length: usize) -> SonoResult<usize> {
        let index = self.as_number("index with")?;
        if index.fract() != 0.0 || index < 0.0 || index >= length as f64 {
            return Err(SonoError::IndexOutOfRange {
                index: format_number(index),
                length,
                position: None,
            });
        }
        Ok(index as usize)
    }

    /// Renders the value without consulting structure hooks.
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Datum::Null => "null".to_string(),
            Datum::Bool(value) => value.to_string(),
            Datum::Number(value) => format_number(*value),
            Datum::String(text) => text.clone(),
            Datum::Vector(elements) => format!(
                "[{}]",
                elements
                    .iter()
                    .map(|element| element.render(interner))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Datum::Dictionary(entries) => format!(
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value.render(interner)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Datum::Matrix(matrix) => matrix.render(interner),
            Datum::Feature(feature) => feature.render(interner),
            Datum::Phone(phone) => phone.to_string(),
            Datum::Word(word) => word.to_string(),
            Datum::Rule(rule) => rule.render(interner),
            Datum::Function(callable) => callable.to_string(),
            Datum::Structure(structure) => structure.render(interner),
            Datum::Pointer(_) => "<pointer>".to_string(),
        }
    }
}

/// Whole numbers print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => true,
            (Datum::Bool(a), Datum::Bool(b)) => a == b,
            (Datum::Number(a), Datum::Number(b)) => a == b,
            (Datum::String(a), Datum::String(b)) => a == b,
            (Datum::Vector(a), Datum::Vector(b)) => a == b,
            (Datum::Dictionary(a), Datum::Dictionary(b)) => a == b,
            (Datum::Matrix(a), Datum::Matrix(b)) => a == b,
            (Datum::Feature(a), Datum::Feature(b)) => a == b,
            (Datum::Phone(a), Datum::Phone(b)) => a == b,
            (Datum::Word(a), Datum::Word(b)) => a == b,
            (Datum::Rule(a), Datum::Rule(b)) => a == b,
            (Datum::Function(a), Datum::Function(b)) => a.same(b),
            (Datum::Structure(a), Datum::Structure(b)) => Arc::ptr_eq(a, b),
            (Datum::Pointer(a), Datum::Pointer(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Number(value)
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::String(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_string())
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(elements: Vec<Datum>) -> Self {
        Datum::Vector(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_number, Datum, DatumKind};
    use crate::{errors::SonoError, interner::Interner};
    use assert_matches::assert_matches;

    #[test]
    fn whole_numbers_have_no_fraction() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn kinds_are_named_by_their_variant() {
        for kind in DatumKind::ALL {
            assert_eq!(DatumKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(Datum::from("x").kind(), DatumKind::String);
    }

    #[test]
    fn nested_vectors_render() {
        let interner = Interner::new();
        let value = Datum::from(vec![
            Datum::Number(1.0),
            Datum::from(vec![Datum::from("a"), Datum::Null]),
        ]);
        assert_eq!(value.render(&interner), "[1, [a, null]]");
    }

    #[test]
    fn indices_must_be_whole_and_in_range() {
        assert_eq!(Datum::Number(2.0).as_index(3).unwrap(), 2);
        assert_matches!(
            Datum::Number(3.0).as_index(3),
            Err(SonoError::IndexOutOfRange { length: 3, .. })
        );
        assert_matches!(Datum::Number(0.5).as_index(3), Err(SonoError::IndexOutOfRange { .. }));
        assert_matches!(Datum::Null.as_index(3), Err(SonoError::TypeMismatch { .. }));
    }
}
