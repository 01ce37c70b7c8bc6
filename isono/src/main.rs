// ISono: Interactive Shell for the Sono Programming Language.
// Copyright (C) 2018 to 2019 Charles Johnson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! # Interactive Shell for the Sono Programming Language.

use clap::Parser;
use linefeed::{Interface, ReadResult};
use simple_logger::SimpleLogger;
use slog::{o, Drain};
use sono::{Context, Datum, Options};
use std::{fs, path::PathBuf, process};

/// Interactive shell for the Sono phonology scripting language.
#[derive(Debug, Parser)]
#[command(name = "isono", version, about)]
struct Arguments {
    /// Tab-separated feature table the phones are generated from
    phones: PathBuf,
    /// Script to run before the prompt opens
    #[arg(short, long)]
    script: Option<PathBuf>,
    /// Reject phone, word and feature literals and rules
    #[arg(long)]
    no_phonology: bool,
    /// Log evaluation details to standard error
    #[arg(short, long)]
    verbose: bool,
    /// Exit after the script instead of opening the prompt
    #[arg(long)]
    no_repl: bool,
}

fn logger(verbose: bool) -> slog::Logger {
    let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let level = if verbose {
        slog::Level::Debug
    } else {
        slog::Level::Warning
    };
    slog::Logger::root(slog::LevelFilter::new(drain, level).fuse(), o!("shell" => "isono"))
}

fn render(context: &Context, value: &Datum) -> String {
    context
        .render(value)
        .unwrap_or_else(|error| error.to_string())
}

/// Prints the outcome of `source`, one line per element for vectors.
fn show(context: &mut Context, source: &str) {
    match context.run(source) {
        Ok(Datum::Null) => (),
        Ok(Datum::Vector(elements)) => {
            for element in &elements {
                println!("{}", render(context, element));
            }
        }
        Ok(value) => println!("{}", render(context, &value)),
        Err(error) => println!("{}", error),
    }
}

fn main() {
    let arguments = Arguments::parse();
    let level = if arguments.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(error) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Cannot start logging: {}", error);
    }
    let options = Options {
        phonology: !arguments.no_phonology,
        logger: Some(logger(arguments.verbose)),
        printer: None,
    };
    let mut context = match Context::from_path(&arguments.phones, options) {
        Ok(context) => context,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    };
    if let Some(script) = &arguments.script {
        match fs::read_to_string(script) {
            Ok(source) => show(&mut context, &source),
            Err(error) => {
                eprintln!("Cannot read script `{}`: {}", script.display(), error);
                process::exit(1);
            }
        }
    }
    if arguments.no_repl {
        return;
    }
    println!("ISono Copyright (C) 2018 to 2019 Charles Johnson.\nThis program comes with ABSOLUTELY NO WARRANTY.\nThis is free software, and you are welcome to redistribute it under certain\nconditions; visit https://www.gnu.org/licenses/gpl-3.0.en.html for more details.");
    let reader = match Interface::new("ISono") {
        Ok(reader) => reader,
        Err(error) => {
            eprintln!("Cannot open the terminal: {}", error);
            process::exit(1);
        }
    };
    if let Err(error) = reader.set_prompt(">>> ") {
        eprintln!("Cannot set the prompt: {}", error);
    }
    loop {
        match reader.read_line() {
            Ok(ReadResult::Input(input)) => {
                show(&mut context, &input);
                reader.add_history_unique(input);
            }
            Ok(_) => break,
            Err(error) => {
                eprintln!("{}", error);
                break;
            }
        }
    }
    println!("Exiting");
}
