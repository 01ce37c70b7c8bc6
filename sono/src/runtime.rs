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
    datum::DatumKind,
    errors::{SonoError, SonoResult},
    function::Callable,
    interner::{Interner, Symbol},
    phonology::PhoneTable,
};
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Where `print` writes to.
pub trait Printer: Send + Sync {
    fn print(&self, text: &str);
}

pub struct StandardOutput;

impl Printer for StandardOutput {
    fn print(&self, text: &str) {
        println!("{}", text);
    }
}

/// Asks a running evaluation to stop at its next checkpoint.
#[derive(Clone, Debug, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// State shared by everything evaluating in one context, including spawned threads.
pub struct Runtime {
    interner: Arc<Interner>,
    phones: Arc<PhoneTable>,
    phonology: bool,
    prototypes: DashMap<(DatumKind, Symbol), Callable>,
    cancellation: CancellationHandle,
    printer: Arc<dyn Printer>,
    logger: slog::Logger,
}

impl Runtime {
    pub fn new(phones: Arc<PhoneTable>, phonology: bool, printer: Arc<dyn Printer>, logger: slog::Logger) -> Self {
        Self {
            interner: Arc::clone(phones.interner()),
            phones,
            phonology,
            prototypes: DashMap::new(),
            cancellation: CancellationHandle::default(),
            printer,
            logger,
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn phones(&self) -> &Arc<PhoneTable> {
        &self.phones
    }

    pub fn phonology(&self) -> bool {
        self.phonology
    }

    pub fn logger(&self) -> &slog::Logger {
        &self.logger
    }

    pub fn cancellation(&self) -> &CancellationHandle {
        &self.cancellation
    }

    /// Fails with `Cancelled` once cancellation has been requested.
    pub fn checkpoint(&self) -> SonoResult<()> {
        if self.cancellation.is_cancelled() {
            Err(SonoError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn prototype(&self, kind: DatumKind, name: Symbol) -> Option<Callable> {
        self.prototypes.get(&(kind, name)).map(|entry| entry.value().clone())
    }

    pub fn set_prototype(&self, kind: DatumKind, name: Symbol, callable: Callable) {
        self.prototypes.insert((kind, name), callable);
    }

    pub fn print(&self, text: &str) {
        self.printer.print(text);
    }
}
