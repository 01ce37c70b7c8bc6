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

use super::{operations::compound, Evaluator, Flow};
use crate::{
    ast::{Node, NodeKind},
    datum::Datum,
    errors::{SonoError, SonoResult},
    operators::Operator,
    scope::{Cell, Scope},
    structure::Structure,
};

/// One index below a binding, e.g. the `[0]` of `v[0] = x`.
struct Step {
    index: Datum,
    /// The index as a dictionary key, worked out before the binding is locked.
    key: String,
}

impl Evaluator {
    pub(super) fn assign(&self, operator: Operator, target: &Node, value: &Node, scope: &Scope) -> SonoResult<Flow> {
        let value = value!(self.evaluate(value, scope));
        if let NodeKind::Member(object, name) = &target.kind {
            if let Some(kind) = self.type_name(object, scope) {
                return match value {
                    Datum::Function(callable) if operator == Operator::Assign => {
                        log::debug!("method {}.{} registered", kind, self.interner().name(*name));
                        self.runtime.set_prototype(kind, *name, callable.clone());
                        Ok(Flow::Value(Datum::Function(callable)))
                    }
                    other => Err(SonoError::type_mismatch("register as a method", other.kind().name())),
                };
            }
        }
        let (cell, path) = self.place(target, scope, operator == Operator::Assign)?;
        let arithmetic = compound(operator);
        let result = cell.update(|current| {
            let slot = Self::slot(current, &path)?;
            let updated = match arithmetic {
                Some(arithmetic) => self.binary(arithmetic, slot.clone(), value)?,
                None => value,
            };
            *slot = updated.clone();
            Ok(updated)
        })?;
        Ok(Flow::Value(result))
    }

    /// The binding an assignment writes through and the indices below it.
    fn place(&self, target: &Node, scope: &Scope, creating: bool) -> SonoResult<(Cell, Vec<Step>)> {
        match &target.kind {
            NodeKind::Variable(name) => match scope.lookup(*name) {
                Some(cell) => Ok((cell, Vec::new())),
                None if creating => Ok((scope.declare(*name, Datum::Null), Vec::new())),
                None => Err(SonoError::UnresolvedVariable {
                    name: self.interner().name(*name),
                    position: Some(target.position),
                }),
            },
            NodeKind::Declare(name) => Ok((scope.declare(*name, Datum::Null), Vec::new())),
            NodeKind::Index(container, index) => {
                let (cell, mut path) = self.place(container, scope, false)?;
                let index = self.evaluate(index, scope)?.into_value();
                let key = self.key_of(&index)?;
                path.push(Step { index, key });
                Ok((cell, path))
            }
            NodeKind::Member(object, name) => match self.evaluate(object, scope)?.into_value() {
                Datum::Structure(structure) => match &*structure {
                    Structure::Object(instance) => {
                        let cell = instance
                            .scope
                            .local(*name)
                            .unwrap_or_else(|| instance.scope.declare(*name, Datum::Null));
                        Ok((cell, Vec::new()))
                    }
                    Structure::Template(_) => Err(SonoError::type_mismatch(
                        "assign a member of",
                        "a structure that has not been instantiated",
                    )),
                },
                other => Err(SonoError::type_mismatch("assign a member of", other.kind().name())),
            },
            _ => Err(SonoError::runtime("cannot assign to this expression")),
        }
    }

    fn slot<'d>(datum: &'d mut Datum, path: &[Step]) -> SonoResult<&'d mut Datum> {
        let Some((step, rest)) = path.split_first() else {
            return Ok(datum);
        };
        let next = match datum {
            Datum::Vector(elements) => {
                let i = step.index.as_index(elements.len())?;
                &mut elements[i]
            }
            Datum::Dictionary(entries) => entries.entry(step.key.clone()).or_insert(Datum::Null),
            other => return Err(SonoError::type_mismatch("assign an element of", other.kind().name())),
        };
        Self::slot(next, rest)
    }
}
