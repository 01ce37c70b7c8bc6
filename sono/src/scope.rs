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
    datum::Datum,
    errors::{SonoError, SonoResult},
    interner::Symbol,
    structure::Structure,
};
use dashmap::DashMap;
use std::{
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock, Weak},
};

/// Storage for one variable.
///
/// Reference parameters share the caller's `Binding`, so writes through
/// either name are seen by both. Two threads that share a binding this way
/// can still lose each other's updates between a read and a write.
#[derive(Debug)]
pub struct Binding {
    value: RwLock<Datum>,
    mutable: bool,
}

pub type Cell = Arc<Binding>;

impl Binding {
    pub fn new(value: Datum) -> Cell {
        Arc::new(Self {
            value: RwLock::new(value),
            mutable: true,
        })
    }

    pub fn immutable(value: Datum) -> Cell {
        Arc::new(Self {
            value: RwLock::new(value),
            mutable: false,
        })
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn read(&self) -> Datum {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn write(&self, value: Datum) -> SonoResult<()> {
        self.update(|current| {
            *current = value;
            Ok(())
        })
    }

    /// Runs `f` on the stored value in place.
    pub fn update<T>(&self, f: impl FnOnce(&mut Datum) -> SonoResult<T>) -> SonoResult<T> {
        if !self.mutable {
            return Err(SonoError::Immutable { position: None });
        }
        let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut value)
    }
}

struct Frame {
    variables: DashMap<Symbol, Cell>,
    parent: Option<Scope>,
    /// The instance whose body this frame holds, seen as `this`.
    owner: OnceLock<Weak<Structure>>,
}

/// A chain of frames mapping names to bindings.
///
/// Cloning a `Scope` shares the frame, which is how closures and structure
/// instances keep their defining scope alive.
#[derive(Clone)]
pub struct Scope(Arc<Frame>);

impl Scope {
    pub fn global() -> Self {
        Scope(Arc::new(Frame {
            variables: DashMap::new(),
            parent: None,
            owner: OnceLock::new(),
        }))
    }

    pub fn child(&self) -> Self {
        Scope(Arc::new(Frame {
            variables: DashMap::new(),
            parent: Some(self.clone()),
            owner: OnceLock::new(),
        }))
    }

    pub fn lookup(&self, name: Symbol) -> Option<Cell> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if let Some(cell) = scope.local(name) {
                return Some(cell);
            }
            frame = scope.0.parent.as_ref();
        }
        None
    }

    /// The binding of `name` in this frame only.
    pub fn local(&self, name: Symbol) -> Option<Cell> {
        self.0.variables.get(&name).map(|cell| Arc::clone(&cell))
    }

    pub fn get(&self, name: Symbol) -> Option<Datum> {
        self.lookup(name).map(|cell| cell.read())
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn declare(&self, name: Symbol, value: Datum) -> Cell {
        let cell = Binding::new(value);
        self.bind(name, Arc::clone(&cell));
        cell
    }

    pub fn bind(&self, name: Symbol, cell: Cell) {
        self.0.variables.insert(name, cell);
    }

    /// Updates the nearest binding of `name`, or declares it here if there is none.
    pub fn assign(&self, name: Symbol, value: Datum) -> SonoResult<()> {
        match self.lookup(name) {
            Some(cell) => cell.write(value),
            None => {
                self.declare(name, value);
                Ok(())
            }
        }
    }

    pub fn same_frame(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Every binding made directly in this frame.
    pub fn locals(&self) -> Vec<(Symbol, Cell)> {
        self.0
            .variables
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    /// Marks this frame as the body of `owner`. The frame does not keep it alive.
    pub fn set_owner(&self, owner: &Arc<Structure>) {
        // A frame belongs to at most one instance; later calls keep the first.
        let _ = self.0.owner.set(Arc::downgrade(owner));
    }

    /// The instance of the nearest enclosing structure body, if it is still alive.
    pub fn owner(&self) -> Option<Arc<Structure>> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if let Some(owner) = scope.0.owner.get() {
                return owner.upgrade();
            }
            frame = scope.0.parent.as_ref();
        }
        None
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Arc::downgrade(&self.0))
    }
}

/// A scope that does not keep its frame alive.
#[derive(Clone)]
pub struct WeakScope(Weak<Frame>);

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(Scope)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Scope({} variables)", self.0.variables.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{Binding, Scope};
    use crate::{datum::Datum, errors::SonoError, interner::Interner};
    use assert_matches::assert_matches;

    #[test]
    fn weak_scopes_do_not_keep_frames_alive() {
        let scope = Scope::global().child();
        let weak = scope.downgrade();
        assert!(weak.upgrade().is_some());
        drop(scope);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn lookup_walks_the_parent_chain() {
        let interner = Interner::new();
        let x = interner.intern("x");
        let global = Scope::global();
        global.declare(x, Datum::Number(1.0));
        let inner = global.child().child();
        assert_eq!(inner.get(x), Some(Datum::Number(1.0)));
        assert!(inner.local(x).is_none());
    }

    #[test]
    fn assignment_updates_the_nearest_binding() {
        let interner = Interner::new();
        let (x, y) = (interner.intern("x"), interner.intern("y"));
        let global = Scope::global();
        global.declare(x, Datum::Number(1.0));
        let inner = global.child();
        inner.assign(x, Datum::Number(2.0)).unwrap();
        inner.assign(y, Datum::Number(3.0)).unwrap();
        assert_eq!(global.get(x), Some(Datum::Number(2.0)));
        assert_eq!(global.get(y), None);
        assert_eq!(inner.get(y), Some(Datum::Number(3.0)));
    }

    #[test]
    fn shared_bindings_see_each_others_writes() {
        let interner = Interner::new();
        let (a, b) = (interner.intern("a"), interner.intern("b"));
        let caller = Scope::global();
        let cell = caller.declare(a, Datum::Number(1.0));
        let callee = caller.child();
        callee.bind(b, cell);
        callee.assign(b, Datum::Number(5.0)).unwrap();
        assert_eq!(caller.get(a), Some(Datum::Number(5.0)));
    }

    #[test]
    fn immutable_bindings_reject_writes() {
        let cell = Binding::immutable(Datum::Null);
        assert_matches!(cell.write(Datum::Bool(true)), Err(SonoError::Immutable { .. }));
        assert_eq!(cell.read(), Datum::Null);
    }
}
