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

use super::{Evaluator, Flow};
use crate::{
    ast::Node,
    datum::{format_number, Datum},
    errors::{SonoError, SonoResult},
    operators::Operator,
    phonology::{Feature, FeatureMatrix, Marker, Phone, Word},
    scope::Scope,
};

fn finite(operation: &str, value: f64) -> SonoResult<Datum> {
    if value.is_finite() {
        Ok(Datum::Number(value))
    } else {
        Err(SonoError::NonFinite {
            operation: operation.to_string(),
            position: None,
        })
    }
}

/// Whole numbers beyond this are no longer all exactly representable.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
/// The most elements a single `until` may produce.
const MAX_RANGE: i64 = 1 << 24;
/// How many range elements are produced between cancellation checks.
const RANGE_CHECK_INTERVAL: i64 = 1 << 16;

fn mismatch(operation: &str, a: &Datum, b: &Datum) -> SonoError {
    SonoError::type_mismatch(operation, format!("{} and {}", a.kind(), b.kind()))
}

/// The arithmetic behind a compound assignment such as `+=`.
pub(super) fn compound(operator: Operator) -> Option<Operator> {
    match operator {
        Operator::AddAssign => Some(Operator::Add),
        Operator::SubtractAssign => Some(Operator::Subtract),
        Operator::MultiplyAssign => Some(Operator::Multiply),
        Operator::DivideAssign => Some(Operator::Divide),
        Operator::RemainderAssign => Some(Operator::Remainder),
        _ => None,
    }
}

impl Evaluator {
    pub(super) fn binary_node(&self, operator: Operator, left: &Node, right: &Node, scope: &Scope) -> SonoResult<Flow> {
        let left = value!(self.evaluate(left, scope));
        let value = match operator {
            Operator::And => {
                left.as_bool("apply && to")? && value!(self.evaluate(right, scope)).as_bool("apply && to")?
            }
            Operator::Or => {
                left.as_bool("apply || to")? || value!(self.evaluate(right, scope)).as_bool("apply || to")?
            }
            _ => {
                let right = value!(self.evaluate(right, scope));
                return Ok(Flow::Value(self.binary(operator, left, right)?));
            }
        };
        Ok(Flow::Value(Datum::Bool(value)))
    }

    /// `start until end`: the whole numbers from `start` up to but excluding `end`.
    fn range(&self, start: f64, end: f64) -> SonoResult<Datum> {
        for bound in [start, end] {
            if !bound.is_finite() || bound.fract() != 0.0 || bound.abs() >= MAX_EXACT {
                return Err(SonoError::runtime(format!(
                    "range bound {} is not an exact whole number",
                    format_number(bound)
                )));
            }
        }
        let (start, end) = (start as i64, end as i64);
        let length = (end - start).max(0);
        if length > MAX_RANGE {
            return Err(SonoError::runtime(format!(
                "range of {} elements exceeds the limit of {}",
                length, MAX_RANGE
            )));
        }
        let mut values = Vec::with_capacity(length as usize);
        for value in start..end {
            if (value - start) % RANGE_CHECK_INTERVAL == 0 {
                self.runtime.checkpoint()?;
            }
            values.push(Datum::Number(value as f64));
        }
        Ok(Datum::Vector(values))
    }

    pub(super) fn binary(&self, operator: Operator, a: Datum, b: Datum) -> SonoResult<Datum> {
        match operator {
            Operator::Add => self.add(a, b),
            Operator::Subtract | Operator::Multiply | Operator::Divide | Operator::Remainder | Operator::Power => {
                let operation = operator.spelling();
                let (x, y) = match (&a, &b) {
                    (Datum::Number(x), Datum::Number(y)) => (*x, *y),
                    _ => return Err(mismatch(operation, &a, &b)),
                };
                finite(
                    operation,
                    match operator {
                        Operator::Subtract => x - y,
                        Operator::Multiply => x * y,
                        Operator::Divide => x / y,
                        Operator::Remainder => x % y,
                        _ => x.powf(y),
                    },
                )
            }
            Operator::Equal => Ok(Datum::Bool(self.equals(&a, &b)?)),
            Operator::NotEqual => Ok(Datum::Bool(!self.equals(&a, &b)?)),
            Operator::Less | Operator::Greater | Operator::LessEqual | Operator::GreaterEqual => {
                let ordering = match (&a, &b) {
                    (Datum::Number(x), Datum::Number(y)) => x.partial_cmp(y),
                    (Datum::String(x), Datum::String(y)) => Some(x.cmp(y)),
                    _ => return Err(mismatch("compare", &a, &b)),
                };
                let Some(ordering) = ordering else {
                    return Ok(Datum::Bool(false));
                };
                Ok(Datum::Bool(match operator {
                    Operator::Less => ordering.is_lt(),
                    Operator::Greater => ordering.is_gt(),
                    Operator::LessEqual => ordering.is_le(),
                    _ => ordering.is_ge(),
                }))
            }
            Operator::And | Operator::Or => {
                let (x, y) = (a.as_bool(operator.spelling())?, b.as_bool(operator.spelling())?);
                Ok(Datum::Bool(if operator == Operator::And { x && y } else { x || y }))
            }
            Operator::Until => match (&a, &b) {
                (Datum::Number(start), Datum::Number(end)) => self.range(*start, *end),
                _ => Err(mismatch("make a range from", &a, &b)),
            },
            Operator::Transform => self.transform(a, b),
            Operator::Contrast => match (&a, &b) {
                (Datum::Phone(x), Datum::Phone(y)) => Ok(Datum::Matrix(self.runtime.phones().contrast(x, y))),
                _ => Err(mismatch("contrast", &a, &b)),
            },
            Operator::From => {
                let pattern = match a {
                    Datum::Matrix(matrix) => matrix,
                    Datum::Feature(feature) => FeatureMatrix::from(feature),
                    other => return Err(SonoError::type_mismatch("search with", other.kind().name())),
                };
                let phones = self.phones_of(b, "search among")?;
                Ok(Datum::Vector(
                    self.runtime
                        .phones()
                        .find(&pattern, &phones)
                        .into_iter()
                        .map(Datum::Phone)
                        .collect(),
                ))
            }
            Operator::Arrow | Operator::Focus | Operator::RuleContext => Err(SonoError::runtime(format!(
                "`{}` is only valid inside a rule",
                operator.spelling()
            ))),
            Operator::In => Err(SonoError::runtime("`in` must be followed by `do`")),
            other => Err(SonoError::runtime(format!("`{}` cannot be used here", other.spelling()))),
        }
    }

    fn add(&self, a: Datum, b: Datum) -> SonoResult<Datum> {
        match (a, b) {
            (Datum::Number(x), Datum::Number(y)) => finite("+", x + y),
            (Datum::String(mut x), Datum::String(y)) => {
                x.push_str(&y);
                Ok(Datum::String(x))
            }
            (Datum::Vector(mut x), Datum::Vector(y)) => {
                x.extend(y);
                Ok(Datum::Vector(x))
            }
            (Datum::Matrix(x), Datum::Matrix(y)) => Ok(Datum::Matrix(x.union(&y))),
            (Datum::Word(x), Datum::Word(y)) => Ok(Datum::Word(x.concat(&y))),
            (a, b) => Err(mismatch("add", &a, &b)),
        }
    }

    fn transform(&self, a: Datum, b: Datum) -> SonoResult<Datum> {
        let phones = self.runtime.phones();
        match (a, b) {
            (Datum::Phone(phone), Datum::Matrix(delta)) => Ok(Datum::Phone(phones.transform(&phone, &delta, true))),
            (Datum::Phone(phone), Datum::Feature(feature)) => {
                Ok(Datum::Phone(phones.transform(&phone, &FeatureMatrix::from(feature), true)))
            }
            (Datum::Matrix(matrix), Datum::Matrix(delta)) => Ok(Datum::Matrix(matrix.transform(phones.classes(), &delta))),
            (Datum::Matrix(matrix), Datum::Feature(feature)) => Ok(Datum::Matrix(
                matrix.transform(phones.classes(), &FeatureMatrix::from(feature)),
            )),
            (Datum::Phone(phone), Datum::Rule(rule)) => {
                let word: Word = std::iter::once((phone, Marker::None)).collect();
                Ok(Datum::Word(rule.transform(phones, &word)))
            }
            (Datum::Word(word), Datum::Rule(rule)) => Ok(Datum::Word(rule.transform(phones, &word))),
            (Datum::Word(word), Datum::Vector(rules)) => {
                let mut word = word;
                for rule in rules {
                    self.runtime.checkpoint()?;
                    match rule {
                        Datum::Rule(rule) => word = rule.transform(phones, &word),
                        other => return Err(SonoError::type_mismatch("apply as a rule", other.kind().name())),
                    }
                }
                Ok(Datum::Word(word))
            }
            (a, b) => Err(mismatch("transform", &a, &b)),
        }
    }

    pub(super) fn unary(&self, operator: Operator, operand: Datum) -> SonoResult<Datum> {
        match operator {
            Operator::Not => Ok(Datum::Bool(!operand.as_bool("negate")?)),
            Operator::Negate => finite("-", -operand.as_number("negate")?),
            Operator::Affirm => Ok(Datum::Number(operand.as_number("take the sign of")?)),
            Operator::Length => self.length(&operand),
            Operator::Stringify => Ok(Datum::String(self.stringify(&operand)?)),
            Operator::Numerify => match operand {
                Datum::Number(value) => Ok(Datum::Number(value)),
                Datum::Bool(value) => Ok(Datum::Number(if value { 1.0 } else { 0.0 })),
                Datum::String(text) => text
                    .trim()
                    .parse::<f64>()
                    .map(Datum::Number)
                    .map_err(|_| SonoError::runtime(format!("`{}` is not a number", text))),
                other => Err(SonoError::type_mismatch("convert to a number", other.kind().name())),
            },
            Operator::Vectorize => Ok(Datum::Vector(self.elements(operand, "convert to a vector")?)),
            Operator::Wordify => match operand {
                Datum::Word(word) => Ok(Datum::Word(word)),
                Datum::String(text) => Ok(Datum::Word(self.runtime.phones().interpret_sequence(&text)?)),
                other => {
                    let phones = self.phones_of(other, "convert to a word")?;
                    Ok(Datum::Word(phones.into_iter().map(|phone| (phone, Marker::None)).collect()))
                }
            },
            Operator::Matrixify => match operand {
                Datum::Phone(phone) => Ok(Datum::Matrix(phone.matrix().clone())),
                Datum::Vector(elements) => self.matrix(elements),
                other => self.matrix(vec![other]),
            },
            Operator::Common => {
                let phones = self.phones_of(operand, "find the common features of")?;
                Ok(Datum::Matrix(self.runtime.phones().common(&phones)))
            }
            Operator::TypeOf => Ok(Datum::String(operand.kind().name().to_string())),
            Operator::Ref | Operator::Final => Err(SonoError::runtime(format!(
                "`{}` is only valid in a parameter list",
                operator.spelling()
            ))),
            Operator::Struct | Operator::Static => Err(SonoError::runtime(format!(
                "`{}` must be followed by a name and `class`",
                operator.spelling()
            ))),
            other => Err(SonoError::runtime(format!("`{}` cannot be used here", other.spelling()))),
        }
    }

    /// Builds a matrix from features and matrices, each set in turn.
    pub(super) fn matrix(&self, elements: Vec<Datum>) -> SonoResult<Datum> {
        let classes = self.runtime.phones().classes();
        let mut matrix = FeatureMatrix::new();
        for element in elements {
            match element {
                Datum::Feature(Feature { feature, quality }) => matrix.set(classes, feature, quality),
                Datum::Matrix(delta) => matrix = matrix.transform(classes, &delta),
                other => return Err(SonoError::type_mismatch("put in a matrix", other.kind().name())),
            }
        }
        Ok(Datum::Matrix(matrix))
    }

    /// Phones of a word, a vector of phones or a single phone.
    fn phones_of(&self, datum: Datum, operation: &str) -> SonoResult<Vec<Phone>> {
        match datum {
            Datum::Phone(phone) => Ok(vec![phone]),
            Datum::Word(word) => Ok(word.phones().to_vec()),
            Datum::Vector(elements) => elements
                .into_iter()
                .map(|element| match element {
                    Datum::Phone(phone) => Ok(phone),
                    other => Err(SonoError::type_mismatch(operation, other.kind().name())),
                })
                .collect(),
            other => Err(SonoError::type_mismatch(operation, other.kind().name())),
        }
    }

    /// The elements visited by `in ... do` and produced by `vec`.
    pub(super) fn elements(&self, datum: Datum, operation: &str) -> SonoResult<Vec<Datum>> {
        match datum {
            Datum::Null => Ok(Vec::new()),
            Datum::Vector(elements) => Ok(elements),
            Datum::String(text) => Ok(text.chars().map(|c| Datum::String(c.to_string())).collect()),
            Datum::Word(word) => Ok(word.phones().iter().cloned().map(Datum::Phone).collect()),
            Datum::Matrix(matrix) => Ok(matrix.features().map(Datum::Feature).collect()),
            Datum::Dictionary(entries) => Ok(entries.into_keys().map(Datum::String).collect()),
            other => Err(SonoError::type_mismatch(operation, other.kind().name())),
        }
    }

    /// Size of a value, using `getLen` on instances that define it.
    pub(crate) fn length(&self, datum: &Datum) -> SonoResult<Datum> {
        let length = match datum {
            Datum::String(text) => text.chars().count(),
            Datum::Vector(elements) => elements.len(),
            Datum::Dictionary(entries) => entries.len(),
            Datum::Matrix(matrix) => matrix.len(),
            Datum::Word(word) => word.len(),
            Datum::Structure(_) => match Self::hooks(datum).and_then(|hooks| hooks.get_len.as_ref()) {
                Some(hook) => return self.call_function(hook, Vec::new()),
                None => return Err(SonoError::type_mismatch("take the length of", "a structure without getLen")),
            },
            other => return Err(SonoError::type_mismatch("take the length of", other.kind().name())),
        };
        Ok(Datum::Number(length as f64))
    }

    pub(super) fn index(&self, target: Datum, index: Datum) -> SonoResult<Datum> {
        match target {
            Datum::Vector(mut elements) => {
                let i = index.as_index(elements.len())?;
                Ok(elements.swap_remove(i))
            }
            Datum::String(text) => {
                let characters: Vec<char> = text.chars().collect();
                let i = index.as_index(characters.len())?;
                Ok(Datum::String(characters[i].to_string()))
            }
            Datum::Word(word) => {
                let i = index.as_index(word.len())?;
                Ok(word.phone(i).cloned().map_or(Datum::Null, Datum::Phone))
            }
            Datum::Dictionary(entries) => {
                let key = self.key_of(&index)?;
                Ok(entries.get(&key).cloned().unwrap_or(Datum::Null))
            }
            Datum::Matrix(matrix) => match index {
                Datum::String(name) => {
                    let feature = self
                        .runtime
                        .phones()
                        .feature(&name)
                        .ok_or_else(|| SonoError::runtime(format!("`{}` is not a feature", name)))?;
                    Ok(Datum::Feature(Feature::new(feature, matrix.get(feature))))
                }
                other => Err(SonoError::type_mismatch("index a matrix with", other.kind().name())),
            },
            Datum::Structure(_) => match Self::hooks(&target).and_then(|hooks| hooks.get_index.as_ref()) {
                Some(hook) => self.call_function(hook, vec![index]),
                None => Err(SonoError::type_mismatch("index", "a structure without getIndex")),
            },
            other => Err(SonoError::type_mismatch("index", other.kind().name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::compound;
    use crate::{
        datum::Datum,
        errors::SonoError,
        evaluator::Evaluator,
        interner::Interner,
        logging,
        operators::Operator,
        phonology::PhoneTable,
        runtime::{Runtime, StandardOutput},
    };
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn evaluator() -> Evaluator {
        let phones = Arc::new(PhoneTable::empty(Arc::new(Interner::new())));
        Evaluator::new(Arc::new(Runtime::new(
            phones,
            true,
            Arc::new(StandardOutput),
            logging::discard(),
        )))
    }

    fn until(evaluator: &Evaluator, start: f64, end: f64) -> Result<Datum, SonoError> {
        evaluator.binary(Operator::Until, Datum::Number(start), Datum::Number(end))
    }

    #[test]
    fn ranges_count_up_to_their_end() {
        let evaluator = evaluator();
        assert_eq!(
            until(&evaluator, -1.0, 2.0).unwrap(),
            Datum::from(vec![Datum::Number(-1.0), Datum::Number(0.0), Datum::Number(1.0)])
        );
        assert_eq!(until(&evaluator, 3.0, 1.0).unwrap(), Datum::Vector(vec![]));
    }

    #[test]
    fn range_bounds_must_be_exact_whole_numbers() {
        let evaluator = evaluator();
        assert_matches!(until(&evaluator, 0.5, 3.0), Err(SonoError::Runtime { .. }));
        assert_matches!(until(&evaluator, 0.0, f64::INFINITY), Err(SonoError::Runtime { .. }));
        assert_matches!(
            until(&evaluator, 9_007_199_254_740_992.0, 9_007_199_254_740_994.0),
            Err(SonoError::Runtime { .. })
        );
    }

    #[test]
    fn oversized_ranges_are_rejected_up_front() {
        let evaluator = evaluator();
        assert_matches!(
            until(&evaluator, 0.0, 1e12),
            Err(SonoError::Runtime { message, .. }) if message.contains("exceeds the limit")
        );
    }

    #[test]
    fn building_a_range_stops_when_cancelled() {
        let evaluator = evaluator();
        evaluator.runtime().cancellation().cancel();
        assert_matches!(until(&evaluator, 0.0, 3.0), Err(SonoError::Cancelled));
    }

    #[test]
    fn compound_assignments_map_to_arithmetic() {
        assert_eq!(compound(Operator::RemainderAssign), Some(Operator::Remainder));
        assert_eq!(compound(Operator::Assign), None);
    }
}
