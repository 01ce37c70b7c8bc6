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

use super::{natives::take, Evaluator};
use crate::{
    datum::{Datum, DatumKind},
    errors::{SonoError, SonoResult},
    function::{Callable, NativeFn},
    phonology::Marker,
    runtime::Runtime,
};

fn receiver_mismatch(method: &str, receiver: &Datum) -> SonoError {
    SonoError::type_mismatch(format!("call {} on", method), receiver.kind().name())
}

fn length(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [receiver] = take(arguments)?;
    evaluator.length(&receiver)
}

fn contains(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [receiver, item] = take(arguments)?;
    let found = match (&receiver, &item) {
        (Datum::Vector(elements), _) => {
            let mut found = false;
            for element in elements {
                if evaluator.equals(element, &item)? {
                    found = true;
                    break;
                }
            }
            found
        }
        (Datum::String(text), Datum::String(part)) => text.contains(part.as_str()),
        (Datum::Word(word), Datum::Phone(phone)) => word.phones().contains(phone),
        (Datum::Matrix(matrix), Datum::Feature(feature)) => matrix.get(feature.feature) == feature.quality,
        _ => return Err(receiver_mismatch("contains", &receiver)),
    };
    Ok(Datum::Bool(found))
}

fn reverse(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [receiver] = take(arguments)?;
    match receiver {
        Datum::Vector(mut elements) => {
            elements.reverse();
            Ok(Datum::Vector(elements))
        }
        Datum::String(text) => Ok(Datum::String(text.chars().rev().collect())),
        Datum::Word(word) => {
            // A marker belongs to the gap before its phone, so it moves one place along.
            let length = word.len();
            Ok(Datum::Word(
                word.iter()
                    .rev()
                    .enumerate()
                    .map(|(index, (phone, _))| {
                        let marker = if index == 0 {
                            Marker::None
                        } else {
                            word.marker(length - index)
                        };
                        (phone.clone(), marker)
                    })
                    .collect(),
            ))
        }
        other => Err(receiver_mismatch("reverse", &other)),
    }
}

fn join(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [receiver, separator] = take(arguments)?;
    let separator = match separator {
        Datum::Null => String::new(),
        Datum::String(separator) => separator,
        other => return Err(SonoError::type_mismatch("join with", other.kind().name())),
    };
    match receiver {
        Datum::Vector(elements) => Ok(Datum::String(
            elements
                .iter()
                .map(|element| evaluator.stringify(element))
                .collect::<SonoResult<Vec<_>>>()?
                .join(&separator),
        )),
        other => Err(receiver_mismatch("join", &other)),
    }
}

/// Splits on a separator, or on whitespace when none is given.
fn split(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [receiver, separator] = take(arguments)?;
    let text = match receiver {
        Datum::String(text) => text,
        other => return Err(receiver_mismatch("split", &other)),
    };
    let parts: Vec<Datum> = match separator {
        Datum::Null => text.split_whitespace().map(Datum::from).collect(),
        Datum::String(separator) => text.split(separator.as_str()).map(Datum::from).collect(),
        other => return Err(SonoError::type_mismatch("split with", other.kind().name())),
    };
    Ok(Datum::Vector(parts))
}

fn upper(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::String(text)] => Ok(Datum::String(text.to_uppercase())),
        [other] => Err(receiver_mismatch("upper", &other)),
    }
}

fn lower(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::String(text)] => Ok(Datum::String(text.to_lowercase())),
        [other] => Err(receiver_mismatch("lower", &other)),
    }
}

fn symbol(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Phone(phone)] => Ok(Datum::String(phone.symbol().to_string())),
        [other] => Err(receiver_mismatch("symbol", &other)),
    }
}

fn matrix(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Phone(phone)] => Ok(Datum::Matrix(phone.matrix().clone())),
        [other] => Err(receiver_mismatch("matrix", &other)),
    }
}

fn phones(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Word(word)] => Ok(Datum::Vector(word.phones().iter().cloned().map(Datum::Phone).collect())),
        [other] => Err(receiver_mismatch("phones", &other)),
    }
}

/// `word.apply(rule)` and `rule.apply(word)`.
fn apply(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Word(word), Datum::Rule(rule)] | [Datum::Rule(rule), Datum::Word(word)] => {
            Ok(Datum::Word(rule.transform(evaluator.runtime().phones(), &word)))
        }
        [receiver, _] => Err(receiver_mismatch("apply", &receiver)),
    }
}

fn keys(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Dictionary(entries)] => Ok(Datum::Vector(entries.into_keys().map(Datum::String).collect())),
        [other] => Err(receiver_mismatch("keys", &other)),
    }
}

fn has(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    match take(arguments)? {
        [Datum::Dictionary(entries), key] => Ok(Datum::Bool(entries.contains_key(&evaluator.key_of(&key)?))),
        [other, _] => Err(receiver_mismatch("has", &other)),
    }
}

/// Registers the built-in methods of each value kind.
pub(crate) fn install(runtime: &Runtime) {
    use DatumKind::*;
    let methods: [(&[DatumKind], &'static str, NativeFn); 13] = [
        (&[String, Vector, Dictionary, Matrix, Word], "length", length),
        (&[Vector, String, Word, Matrix], "contains", contains),
        (&[Vector, String, Word], "reverse", reverse),
        (&[Vector], "join", join),
        (&[String], "split", split),
        (&[String], "upper", upper),
        (&[String], "lower", lower),
        (&[Phone], "symbol", symbol),
        (&[Phone], "matrix", matrix),
        (&[Word], "phones", phones),
        (&[Word, Rule], "apply", apply),
        (&[Dictionary], "keys", keys),
        (&[Dictionary], "has", has),
    ];
    for (kinds, name, function) in methods {
        let method = runtime.interner().intern(name);
        for kind in kinds {
            runtime.set_prototype(*kind, method, Callable::native(name, function));
        }
    }
}
