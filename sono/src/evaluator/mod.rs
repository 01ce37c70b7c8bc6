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

//! Tree-walking evaluation of parsed statements.

#[macro_use]
mod flow;
pub(crate) mod intrinsics;
pub(crate) mod natives;
mod operations;
mod places;
mod rules;

pub use self::flow::Flow;

use crate::{
    ast::{Node, NodeKind, ParameterMode},
    datum::{Datum, DatumKind},
    errors::{SonoError, SonoResult},
    function::Callable,
    interner::{Interner, Symbol},
    operators::Operator,
    runtime::Runtime,
    scope::{Binding, Cell, Scope},
    structure::{Hooks, Object, Structure, Template},
};
use std::sync::Arc;

/// A call argument. Arguments written as a bare variable keep its binding
/// so that `ref` parameters can share it.
pub struct Argument {
    pub value: Datum,
    pub cell: Option<Cell>,
}

impl From<Datum> for Argument {
    fn from(value: Datum) -> Self {
        Self { value, cell: None }
    }
}

/// Evaluates syntax trees against a shared `Runtime`.
///
/// Cloning is cheap, which is how spawned threads get their own evaluator.
#[derive(Clone)]
pub struct Evaluator {
    runtime: Arc<Runtime>,
}

impl Evaluator {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn interner(&self) -> &Interner {
        self.runtime.interner()
    }

    fn intern(&self, name: &str) -> Symbol {
        self.interner().intern(name)
    }

    /// Evaluates top-level statements directly in `scope` and gives back the last value.
    pub fn run(&self, statements: &[Node], scope: &Scope) -> SonoResult<Datum> {
        let mut last = Datum::Null;
        for statement in statements {
            match self.evaluate(statement, scope)? {
                Flow::Value(value) => last = value,
                Flow::Return(value) => return Ok(value),
                Flow::Break => return Ok(Datum::Null),
            }
        }
        Ok(last)
    }

    /// Evaluates `node`, stamping its position on runtime errors that lack one.
    pub fn evaluate(&self, node: &Node, scope: &Scope) -> SonoResult<Flow> {
        self.evaluate_node(node, scope)
            .map_err(|error| error.at(node.position))
    }

    fn evaluate_node(&self, node: &Node, scope: &Scope) -> SonoResult<Flow> {
        let value = match &node.kind {
            NodeKind::Null => Datum::Null,
            NodeKind::Bool(value) => Datum::Bool(*value),
            NodeKind::Number(value) => Datum::Number(*value),
            NodeKind::Str(text) => Datum::String(text.clone()),
            NodeKind::Phone(phone) => Datum::Phone(phone.clone()),
            NodeKind::Word(word) => Datum::Word(word.clone()),
            NodeKind::Feature(feature) => Datum::Feature(*feature),
            NodeKind::Break => return Ok(Flow::Break),
            NodeKind::Variable(name) => self.variable(*name, scope)?,
            NodeKind::Declare(name) => {
                scope.declare(*name, Datum::Null);
                Datum::Null
            }
            NodeKind::Group(elements) | NodeKind::Vector(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(value!(self.evaluate(element, scope)));
                }
                Datum::Vector(values)
            }
            NodeKind::Block(statements) => return self.block(statements, scope),
            NodeKind::Matrix(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(value!(self.evaluate(element, scope)));
                }
                self.matrix(values)?
            }
            NodeKind::Unary(operator, operand) => {
                let operand = value!(self.evaluate(operand, scope));
                self.unary(*operator, operand)?
            }
            NodeKind::Binary(operator, left, right) => {
                return self.binary_node(*operator, left, right, scope)
            }
            NodeKind::Assign(operator, target, value) => {
                return self.assign(*operator, target, value, scope)
            }
            NodeKind::Member(object, name) => return self.member(object, *name, scope),
            NodeKind::Index(target, index) => {
                let target = value!(self.evaluate(target, scope));
                let index = value!(self.evaluate(index, scope));
                self.index(target, index)?
            }
            NodeKind::Call(callee, arguments) => return self.call(callee, arguments, scope),
            NodeKind::Lambda(definition) => {
                Datum::Function(Callable::closure(Arc::clone(definition), scope.clone()))
            }
            NodeKind::If {
                condition,
                then,
                otherwise,
            } => {
                if value!(self.evaluate(condition, scope)).as_bool("branch on")? {
                    return self.evaluate(then, scope);
                }
                match otherwise {
                    Some(otherwise) => return self.evaluate(otherwise, scope),
                    None => Datum::Null,
                }
            }
            NodeKind::While { condition, body } => return self.while_loop(condition, body, scope),
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            } => return self.for_each(*variable, iterable, body, scope),
            NodeKind::Try { body, handler } => return self.try_catch(body, handler.as_deref(), scope),
            NodeKind::Structure {
                name,
                body,
                is_static,
            } => self.define_structure(*name, body, *is_static, scope)?,
            NodeKind::New {
                structure,
                arguments,
            } => return self.instantiate(structure, arguments, scope),
            NodeKind::Rule {
                kind,
                search,
                replacement,
                left,
                right,
            } => {
                let search = value!(self.evaluate(search, scope));
                let replacement = value!(self.evaluate(replacement, scope));
                let left = value!(self.evaluate(left, scope));
                let right = value!(self.evaluate(right, scope));
                Datum::Rule(Arc::new(self.rule(*kind, search, replacement, left, right)?))
            }
            NodeKind::Return(value) => return Ok(Flow::Return(value!(self.evaluate(value, scope)))),
            NodeKind::Throw(message) => {
                let message = value!(self.evaluate(message, scope));
                return Err(SonoError::Thrown {
                    message: self.stringify(&message)?,
                    position: None,
                });
            }
        };
        Ok(Flow::Value(value))
    }

    /// The name of a value kind when `node` is an unbound variable such as `Word`.
    fn type_name(&self, node: &Node, scope: &Scope) -> Option<DatumKind> {
        match &node.kind {
            NodeKind::Variable(name) if scope.lookup(*name).is_none() => {
                DatumKind::from_name(&self.interner().resolve(*name)?)
            }
            _ => None,
        }
    }

    fn variable(&self, name: Symbol, scope: &Scope) -> SonoResult<Datum> {
        if let Some(value) = scope.get(name) {
            return Ok(value);
        }
        let text = self.interner().name(name);
        if text == "this" {
            if let Some(owner) = scope.owner() {
                return Ok(Datum::Structure(owner));
            }
        }
        match DatumKind::from_name(&text) {
            Some(kind) => Ok(Datum::String(kind.name().to_string())),
            None => Err(SonoError::UnresolvedVariable {
                name: text,
                position: None,
            }),
        }
    }

    fn block(&self, statements: &[Node], scope: &Scope) -> SonoResult<Flow> {
        self.runtime.checkpoint()?;
        let inner = scope.child();
        let mut values = Vec::with_capacity(statements.len());
        for statement in statements {
            values.push(value!(self.evaluate(statement, &inner)));
        }
        Ok(Flow::Value(Datum::Vector(values)))
    }

    fn while_loop(&self, condition: &Node, body: &Node, scope: &Scope) -> SonoResult<Flow> {
        loop {
            self.runtime.checkpoint()?;
            if !value!(self.evaluate(condition, scope)).as_bool("loop on")? {
                break;
            }
            match self.evaluate(body, scope)? {
                Flow::Value(_) => (),
                Flow::Break => break,
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Value(Datum::Null))
    }

    fn for_each(&self, variable: Symbol, iterable: &Node, body: &Node, scope: &Scope) -> SonoResult<Flow> {
        let items = self.elements(value!(self.evaluate(iterable, scope)), "iterate over")?;
        for item in items {
            self.runtime.checkpoint()?;
            let inner = scope.child();
            inner.declare(variable, item);
            match self.evaluate(body, &inner)? {
                Flow::Value(_) => (),
                Flow::Break => break,
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Value(Datum::Null))
    }

    fn try_catch(&self, body: &Node, handler: Option<&Node>, scope: &Scope) -> SonoResult<Flow> {
        match self.evaluate(body, scope) {
            Err(error) if error.is_catchable() => {
                log::debug!("caught {}", error);
                match handler {
                    Some(handler) => {
                        let inner = scope.child();
                        inner.declare(self.intern("_e"), Datum::String(error.message()));
                        self.evaluate(handler, &inner)
                    }
                    None => Ok(Flow::Value(Datum::Null)),
                }
            }
            result => result,
        }
    }

    /// Evaluates a call argument, keeping the binding of a bare variable.
    fn argument(&self, node: &Node, scope: &Scope) -> SonoResult<Argument> {
        if let NodeKind::Variable(name) = &node.kind {
            if let Some(cell) = scope.lookup(*name) {
                return Ok(Argument {
                    value: cell.read(),
                    cell: Some(cell),
                });
            }
        }
        Ok(Argument::from(self.evaluate(node, scope)?.into_value()))
    }

    fn arguments(&self, nodes: &[Node], scope: &Scope) -> SonoResult<Vec<Argument>> {
        nodes.iter().map(|node| self.argument(node, scope)).collect()
    }

    fn call(&self, callee: &Node, arguments: &[Node], scope: &Scope) -> SonoResult<Flow> {
        let mut values = Vec::with_capacity(arguments.len() + 1);
        // Methods only hold their instance weakly, so it is kept here until the call returns.
        let mut instance = None;
        let function = match &callee.kind {
            NodeKind::Member(object, name) => match self.type_name(object, scope) {
                Some(kind) => self.prototype(kind, *name)?,
                None => {
                    let receiver = self.argument(object, scope)?;
                    if let Datum::Structure(structure) = &receiver.value {
                        let method = self.structure_member(structure, *name)?;
                        instance = Some(receiver.value);
                        method
                    } else {
                        let method = self.prototype(receiver.value.kind(), *name)?;
                        values.push(receiver);
                        method
                    }
                }
            },
            _ => value!(self.evaluate(callee, scope)),
        };
        values.extend(self.arguments(arguments, scope)?);
        let result = match function {
            Datum::Function(callable) => self.invoke(&callable, values),
            other => Err(SonoError::type_mismatch("call", other.kind().name())),
        };
        drop(instance);
        Ok(Flow::Value(result?))
    }

    /// Calls a function with plain values.
    pub fn call_function(&self, callable: &Callable, arguments: Vec<Datum>) -> SonoResult<Datum> {
        self.invoke(callable, arguments.into_iter().map(Argument::from).collect())
    }

    /// Calls a function, binding arguments to parameters according to their mode.
    pub fn invoke(&self, callable: &Callable, arguments: Vec<Argument>) -> SonoResult<Datum> {
        self.runtime.checkpoint()?;
        let closure = match callable {
            Callable::Native(command) => {
                log::trace!("calling native {}", command.name());
                return command.call(self, arguments.into_iter().map(|a| a.value).collect());
            }
            Callable::Script(closure) => closure,
        };
        let parameters = &closure.definition.parameters;
        if arguments.len() > parameters.len() {
            return Err(SonoError::ArityMismatch {
                expected: parameters.len(),
                found: arguments.len(),
                position: None,
            });
        }
        let frame = closure.scope()?.child();
        let mut arguments = arguments.into_iter();
        for parameter in parameters {
            let cell = match (parameter.mode, arguments.next()) {
                (ParameterMode::Reference, Some(Argument { cell: Some(cell), .. })) => cell,
                (ParameterMode::Final, argument) => {
                    Binding::immutable(argument.map_or(Datum::Null, |a| a.value))
                }
                (_, argument) => Binding::new(argument.map_or(Datum::Null, |a| a.value)),
            };
            frame.bind(parameter.name, cell);
        }
        let body = &closure.definition.body;
        Ok(match self.evaluate(body, &frame)? {
            Flow::Return(value) => value,
            Flow::Value(value) if !body.is_block() => value,
            _ => Datum::Null,
        })
    }

    fn prototype(&self, kind: DatumKind, name: Symbol) -> SonoResult<Datum> {
        self.runtime
            .prototype(kind, name)
            .map(Datum::Function)
            .ok_or_else(|| SonoError::UnresolvedVariable {
                name: format!("{}.{}", kind, self.interner().name(name)),
                position: None,
            })
    }

    fn member(&self, object: &Node, name: Symbol, scope: &Scope) -> SonoResult<Flow> {
        if let Some(kind) = self.type_name(object, scope) {
            return Ok(Flow::Value(self.prototype(kind, name)?));
        }
        Ok(Flow::Value(match value!(self.evaluate(object, scope)) {
            Datum::Structure(structure) => self.structure_member(&structure, name)?,
            other => self.prototype(other.kind(), name)?,
        }))
    }

    fn structure_member(&self, structure: &Structure, name: Symbol) -> SonoResult<Datum> {
        match structure {
            Structure::Object(object) => {
                object
                    .scope
                    .local(name)
                    .map(|cell| cell.read())
                    .ok_or_else(|| SonoError::UnresolvedVariable {
                        name: format!("{}.{}", self.interner().name(object.name), self.interner().name(name)),
                        position: None,
                    })
            }
            Structure::Template(_) => Err(SonoError::type_mismatch(
                "access a member of",
                "a structure that has not been instantiated",
            )),
        }
    }

    fn define_structure(&self, name: Symbol, body: &Arc<Node>, is_static: bool, scope: &Scope) -> SonoResult<Datum> {
        let structure = if is_static {
            self.construct(name, body, scope, true, Vec::new())?
        } else {
            Arc::new(Structure::Template(Template {
                name,
                body: Arc::clone(body),
                scope: scope.clone(),
            }))
        };
        scope.declare(name, Datum::Structure(Arc::clone(&structure)));
        Ok(Datum::Structure(structure))
    }

    /// Evaluates a structure body into a new instance and runs its `init`.
    ///
    /// Plain assignments at the top of the body declare fields on the
    /// instance instead of updating outer variables of the same name.
    fn construct(
        &self,
        name: Symbol,
        body: &Node,
        scope: &Scope,
        is_static: bool,
        arguments: Vec<Argument>,
    ) -> SonoResult<Arc<Structure>> {
        self.runtime.checkpoint()?;
        let instance = scope.child();
        let statements = match &body.kind {
            NodeKind::Block(statements) => statements.as_slice(),
            _ => std::slice::from_ref(body),
        };
        for statement in statements {
            match &statement.kind {
                NodeKind::Assign(Operator::Assign, target, value) => {
                    if let NodeKind::Variable(field) = target.kind {
                        let value = self.evaluate(value, &instance)?.into_value();
                        instance.declare(field, value);
                        continue;
                    }
                    self.evaluate(statement, &instance)?;
                }
                _ => {
                    self.evaluate(statement, &instance)?;
                }
            }
        }
        // Methods see their instance's frame without keeping it alive.
        for (_, cell) in instance.locals() {
            if let (true, Datum::Function(callable)) = (cell.is_mutable(), cell.read()) {
                if let Some(method) = callable.as_method_of(&instance) {
                    cell.write(Datum::Function(method))?;
                }
            }
        }
        let hooks = Hooks::resolve(&instance, self.interner());
        let object = Arc::new(Structure::Object(Object {
            name,
            scope: instance.clone(),
            hooks,
            is_static,
        }));
        instance.set_owner(&object);
        match instance.local(self.intern("init")).map(|cell| cell.read()) {
            Some(Datum::Function(init)) => {
                self.invoke(&init, arguments)?;
            }
            _ if !arguments.is_empty() => {
                return Err(SonoError::ArityMismatch {
                    expected: 0,
                    found: arguments.len(),
                    position: None,
                })
            }
            _ => (),
        }
        log::debug!("constructed {}", self.interner().name(name));
        Ok(object)
    }

    fn instantiate(&self, structure: &Node, arguments: &[Node], scope: &Scope) -> SonoResult<Flow> {
        let target = value!(self.evaluate(structure, scope));
        let arguments = self.arguments(arguments, scope)?;
        let structure = match target {
            Datum::Structure(structure) => structure,
            other => return Err(SonoError::type_mismatch("instantiate", other.kind().name())),
        };
        match &*structure {
            Structure::Template(template) => Ok(Flow::Value(Datum::Structure(self.construct(
                template.name,
                &template.body,
                &template.scope,
                false,
                arguments,
            )?))),
            Structure::Object(object) if object.is_static => Err(SonoError::runtime(format!(
                "static structure {} cannot be instantiated",
                self.interner().name(object.name)
            ))),
            Structure::Object(_) => Err(SonoError::type_mismatch("instantiate", "an instance")),
        }
    }

    fn hooks(datum: &Datum) -> Option<&Hooks> {
        match datum {
            Datum::Structure(structure) => match &**structure {
                Structure::Object(object) => Some(&object.hooks),
                Structure::Template(_) => None,
            },
            _ => None,
        }
    }

    /// Text of a value, using `getStr` on instances that define it.
    pub fn stringify(&self, datum: &Datum) -> SonoResult<String> {
        match datum {
            Datum::Vector(elements) => Ok(format!(
                "[{}]",
                elements
                    .iter()
                    .map(|element| self.stringify(element))
                    .collect::<SonoResult<Vec<_>>>()?
                    .join(", ")
            )),
            Datum::Dictionary(entries) => Ok(format!(
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| Ok(format!("{}: {}", key, self.stringify(value)?)))
                    .collect::<SonoResult<Vec<_>>>()?
                    .join(", ")
            )),
            _ => match Self::hooks(datum).and_then(|hooks| hooks.get_str.as_ref()) {
                Some(hook) => match self.call_function(hook, Vec::new())? {
                    Datum::String(text) => Ok(text),
                    other => self.stringify(&other),
                },
                None => Ok(datum.render(self.interner())),
            },
        }
    }

    /// Equality as `==` sees it, using `equals` on instances that define it.
    pub fn equals(&self, a: &Datum, b: &Datum) -> SonoResult<bool> {
        if let Some(hook) = Self::hooks(a).and_then(|hooks| hooks.equals.as_ref()) {
            return self
                .call_function(hook, vec![b.clone()])?
                .as_bool("use as an equality result");
        }
        match (a, b) {
            (Datum::Vector(x), Datum::Vector(y)) => {
                if x.len() != y.len() {
                    return Ok(false);
                }
                for (x, y) in x.iter().zip(y) {
                    if !self.equals(x, y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(a == b),
        }
    }

    /// Dictionary key for a value, using `getHash` on instances that define it.
    pub fn key_of(&self, datum: &Datum) -> SonoResult<String> {
        match Self::hooks(datum).and_then(|hooks| hooks.get_hash.as_ref()) {
            Some(hook) => {
                let hash = self.call_function(hook, Vec::new())?;
                self.stringify(&hash)
            }
            None => self.stringify(datum),
        }
    }
}
