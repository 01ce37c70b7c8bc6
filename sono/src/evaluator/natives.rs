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
    datum::{Datum, Pointer},
    errors::{SonoError, SonoResult},
    function::{Callable, NativeFn},
    interner::Interner,
    scope::Scope,
};
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
    thread::{self, JoinHandle},
};

/// Pads missing arguments with `null` and rejects surplus ones, the way
/// script functions bind their parameters.
pub(crate) fn take<const N: usize>(mut arguments: Vec<Datum>) -> SonoResult<[Datum; N]> {
    if arguments.len() > N {
        return Err(SonoError::ArityMismatch {
            expected: N,
            found: arguments.len(),
            position: None,
        });
    }
    arguments.resize(N, Datum::Null);
    <[Datum; N]>::try_from(arguments).map_err(|_| SonoError::runtime("wrong number of arguments"))
}

/// A thread started by `spawn`. It can be joined once.
struct Worker(Mutex<Option<JoinHandle<SonoResult<Datum>>>>);

fn print(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let text = arguments
        .iter()
        .map(|argument| evaluator.stringify(argument))
        .collect::<SonoResult<Vec<_>>>()?
        .join(" ");
    evaluator.runtime().print(&text);
    Ok(Datum::Null)
}

/// Calls a function on a new thread. Bindings passed by reference are
/// shared with the caller without any further locking.
fn spawn(evaluator: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let mut arguments = arguments.into_iter();
    let callable = match arguments.next() {
        Some(Datum::Function(callable)) => callable,
        other => {
            return Err(SonoError::type_mismatch(
                "spawn",
                other.map_or("Null", |datum| datum.kind().name()),
            ))
        }
    };
    let arguments: Vec<Datum> = arguments.collect();
    let worker = evaluator.clone();
    let thread = thread::Builder::new()
        .name("sono-worker".to_string())
        .spawn(move || worker.call_function(&callable, arguments))
        .map_err(|error| SonoError::runtime(format!("cannot spawn a thread: {}", error)))?;
    log::debug!("spawned worker thread");
    Ok(Datum::Pointer(Pointer::new(Worker(Mutex::new(Some(thread))))))
}

fn join(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    let [handle] = take(arguments)?;
    let worker = match &handle {
        Datum::Pointer(pointer) => pointer.downcast_ref::<Worker>(),
        _ => None,
    }
    .ok_or_else(|| SonoError::type_mismatch("join", handle.kind().name()))?;
    let thread = worker
        .0
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .ok_or_else(|| SonoError::runtime("thread has already been joined"))?;
    thread
        .join()
        .map_err(|_| SonoError::runtime("spawned thread panicked"))?
}

fn dict(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    take::<0>(arguments)?;
    Ok(Datum::Dictionary(BTreeMap::new()))
}

fn numeric(name: &str, arguments: Vec<Datum>, f: fn(f64) -> f64) -> SonoResult<Datum> {
    let [number] = take(arguments)?;
    let result = f(number.as_number(name)?);
    if result.is_finite() {
        Ok(Datum::Number(result))
    } else {
        Err(SonoError::NonFinite {
            operation: name.to_string(),
            position: None,
        })
    }
}

fn sqrt(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    numeric("sqrt", arguments, f64::sqrt)
}

fn floor(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    numeric("floor", arguments, f64::floor)
}

fn abs(_: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
    numeric("abs", arguments, f64::abs)
}

/// Binds the global natives in `scope`.
pub(crate) fn install(scope: &Scope, interner: &Interner) {
    let natives: [(&'static str, NativeFn); 7] = [
        ("print", print),
        ("spawn", spawn),
        ("join", join),
        ("dict", dict),
        ("sqrt", sqrt),
        ("floor", floor),
        ("abs", abs),
    ];
    for (name, function) in natives {
        scope.declare(interner.intern(name), Datum::Function(Callable::native(name, function)));
    }
}

#[cfg(test)]
mod tests {
    use super::take;
    use crate::{datum::Datum, errors::SonoError};
    use assert_matches::assert_matches;

    #[test]
    fn missing_arguments_are_null() {
        let [a, b] = take::<2>(vec![Datum::Number(1.0)]).unwrap();
        assert_eq!(a, Datum::Number(1.0));
        assert_eq!(b, Datum::Null);
    }

    #[test]
    fn surplus_arguments_are_rejected() {
        assert_matches!(
            take::<1>(vec![Datum::Null, Datum::Null]),
            Err(SonoError::ArityMismatch { expected: 1, found: 2, .. })
        );
    }
}
