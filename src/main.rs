use std::cell::RefCell;
use std::fs;
use std::io::{self, Read};
use std::rc::Rc;

use anyhow::{Context, Result, bail};

use corvid::builtins::{Registry, SharedWriter};
use corvid::evaluator::{Evaluator, Scope, Value};
use corvid::parser;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next();
    if args.next().is_some() {
        bail!("Only one input file is supported");
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(errors) => {
            for error in &errors {
                eprintln!("parse error: {error}");
            }
            bail!("{} parse error(s)", errors.len());
        }
    };

    let stdout: SharedWriter = Rc::new(RefCell::new(io::stdout()));
    let evaluator = Evaluator::new(Registry::standard(stdout));
    let scope = Scope::root();
    if let Value::Error(error) = evaluator.eval_program(&program, &scope) {
        bail!("runtime error: {error}");
    }
    Ok(())
}
