//! CLI entry point for the `minipeg` calculator.
//!
//! Feeds one program given as a command-line argument to the top-level
//! statement rule, prints each statement's value on its own line, and with
//! `--trace` appends the rendered rule-invocation tree.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use minipeg::calc::evaluate;

fn usage() -> ExitCode {
    let _ = writeln!(io::stderr(), "usage: minipeg [--trace] <program>");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let mut program = None;
    let mut show_trace = false;
    for arg in env::args().skip(1) {
        if arg == "--trace" {
            show_trace = true;
        } else if program.is_none() {
            program = Some(arg);
        } else {
            return usage();
        }
    }
    let Some(program) = program else {
        return usage();
    };

    match evaluate(&program) {
        Ok(evaluation) => {
            let mut stdout = io::stdout();
            for value in &evaluation.results {
                let _ = writeln!(stdout, "{value}");
            }
            if show_trace {
                let _ = write!(stdout, "{}", evaluation.trace.render());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = writeln!(io::stderr(), "minipeg: {err}");
            ExitCode::FAILURE
        }
    }
}
