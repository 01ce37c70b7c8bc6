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
    errors::SonoResult,
    evaluator::{intrinsics, natives, Evaluator},
    function::NativeCommand,
    interner::Interner,
    lexer::Lexer,
    logging::{self, Logger},
    parser::Parser,
    phonology::PhoneTable,
    runtime::{CancellationHandle, Printer, Runtime, StandardOutput},
    scope::{Binding, Scope},
};
use std::{path::Path, sync::Arc};

/// How a `Context` is set up.
#[derive(Clone)]
pub struct Options {
    /// Whether phone, word and feature literals and rules are accepted.
    pub phonology: bool,
    /// Defaults to a logger that discards everything.
    pub logger: Option<slog::Logger>,
    /// Defaults to standard output.
    pub printer: Option<Arc<dyn Printer>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            phonology: true,
            logger: None,
            printer: None,
        }
    }
}

/// A script environment: a phone table, the global scope and everything
/// defined in it so far.
pub struct Context {
    evaluator: Evaluator,
    global: Scope,
    logger: slog::Logger,
}

impl Context {
    /// A context without any phones.
    pub fn new(options: Options) -> Self {
        Self::with_phone_table(Arc::new(PhoneTable::empty(Arc::new(Interner::new()))), options)
    }

    /// A context whose phones are generated from a tab-separated feature table.
    pub fn from_tsv(source: &str, options: Options) -> SonoResult<Self> {
        let phones = PhoneTable::from_tsv(Arc::new(Interner::new()), source)?;
        Ok(Self::with_phone_table(Arc::new(phones), options))
    }

    pub fn from_path(path: impl AsRef<Path>, options: Options) -> SonoResult<Self> {
        let phones = PhoneTable::from_path(Arc::new(Interner::new()), path)?;
        Ok(Self::with_phone_table(Arc::new(phones), options))
    }

    pub fn with_phone_table(phones: Arc<PhoneTable>, options: Options) -> Self {
        let logger = options.logger.unwrap_or_else(logging::discard);
        let printer = options.printer.unwrap_or_else(|| Arc::new(StandardOutput));
        slog::info!(logger, "phone table installed";
            "phones" => phones.len(),
            "features" => phones.features().len(),
            "phonology" => options.phonology);
        let all = Datum::Vector(phones.phones().iter().cloned().map(Datum::Phone).collect());
        let runtime = Arc::new(Runtime::new(phones, options.phonology, printer, logger.clone()));
        intrinsics::install(&runtime);
        let global = Scope::global();
        natives::install(&global, runtime.interner());
        if options.phonology {
            global.bind(runtime.interner().intern("all"), Binding::immutable(all));
        }
        Self {
            evaluator: Evaluator::new(runtime),
            global,
            logger,
        }
    }

    /// Tokenizes, parses and evaluates `source` in the global scope.
    ///
    /// The value of the last statement is returned. Cancellation is cleared
    /// once the unit has finished, whatever the outcome.
    pub fn run(&mut self, source: &str) -> SonoResult<Datum> {
        let runtime = Arc::clone(self.evaluator.runtime());
        let result = Lexer::new(runtime.phones(), runtime.phonology())
            .tokenize(source)
            .and_then(|tokens| Parser::new(runtime.phones()).parse(tokens))
            .and_then(|statements| self.evaluator.run(&statements, &self.global));
        runtime.cancellation().reset();
        result
    }

    /// Runs `source` and renders the outcome, errors included, as text.
    pub fn execute(&mut self, source: &str) -> String {
        let result = self.run(source).and_then(|value| match value {
            Datum::Null => Ok(String::new()),
            value => self.render(&value),
        });
        match result {
            Ok(text) => text,
            Err(error) => {
                slog::warn!(self.logger, "{}", error);
                error.to_string()
            }
        }
    }

    /// Text of a value as scripts see it through `str`.
    pub fn render(&self, value: &Datum) -> SonoResult<String> {
        self.evaluator.stringify(value)
    }

    /// A handle that stops the running unit at its next checkpoint.
    pub fn cancellation(&self) -> CancellationHandle {
        self.evaluator.runtime().cancellation().clone()
    }

    /// Makes a host command callable from scripts under its own name.
    pub fn register(&mut self, command: Arc<dyn NativeCommand>) {
        let name = self.evaluator.interner().intern(command.name());
        slog::debug!(self.logger, "registered native"; "name" => command.name());
        self.global
            .declare(name, Datum::Function(crate::function::Callable::Native(command)));
    }

    /// The global value of `name`, if it is bound.
    pub fn get(&self, name: &str) -> Option<Datum> {
        self.evaluator
            .interner()
            .get(name)
            .and_then(|symbol| self.global.get(symbol))
    }

    pub fn phones(&self) -> &Arc<PhoneTable> {
        self.evaluator.runtime().phones()
    }
}

impl Logger for Context {
    fn logger(&mut self) -> &mut slog::Logger {
        &mut self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, Options};
    use crate::{
        datum::Datum,
        errors::SonoResult,
        evaluator::Evaluator,
        function::NativeCommand,
        runtime::Printer,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Printer for Recorder {
        fn print(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    struct Twice;

    impl NativeCommand for Twice {
        fn name(&self) -> &str {
            "twice"
        }

        fn call(&self, _: &Evaluator, arguments: Vec<Datum>) -> SonoResult<Datum> {
            let n = arguments.first().cloned().unwrap_or(Datum::Null).as_number("double")?;
            Ok(Datum::Number(n * 2.0))
        }
    }

    #[test]
    fn null_renders_as_nothing() {
        let mut context = Context::new(Options::default());
        assert_eq!(context.execute("x = null"), "");
        assert_eq!(context.execute("1 + 2"), "3");
    }

    #[test]
    fn print_goes_to_the_printer() {
        let recorder = Arc::new(Recorder::default());
        let mut context = Context::new(Options {
            printer: Some(recorder.clone()),
            ..Options::default()
        });
        assert_eq!(context.execute(r#"print("a", 1, (2, "b"))"#), "");
        assert_eq!(*recorder.0.lock().unwrap(), vec!["a 1 [2, b]".to_string()]);
    }

    #[test]
    fn host_commands_can_be_registered() {
        let mut context = Context::new(Options::default());
        context.register(Arc::new(Twice));
        assert_eq!(context.execute("twice(21)"), "42");
    }

    #[test]
    fn globals_persist_between_units() {
        let mut context = Context::new(Options::default());
        context.execute("total = 5");
        context.execute("total += 1");
        assert_eq!(context.get("total"), Some(Datum::Number(6.0)));
    }

    #[test]
    fn a_cancelled_unit_stops_and_the_next_one_runs() {
        let mut context = Context::new(Options::default());
        context.cancellation().cancel();
        assert_eq!(context.execute("{ 1 }"), "Evaluation cancelled");
        assert_eq!(context.execute("{ 1 }"), "[1]");
    }
}
