use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};

use corvid::builtins::{Registry, SharedWriter};
use corvid::evaluator::{Evaluator, Scope, Value};
use corvid::fixtures::{Case, CaseClass, load_cases};
use corvid::parser;

fn run_captured(source: &str) -> (Value, String) {
    let program = match parser::parse(source) {
        Ok(program) => program,
        Err(errors) => panic!("unexpected parse errors: {errors:?}"),
    };
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let writer: SharedWriter = buffer.clone();
    let evaluator = Evaluator::new(Registry::standard(writer));
    let scope = Scope::root();
    let result = evaluator.eval_program(&program, &scope);
    let output = String::from_utf8(buffer.borrow().clone()).expect("output should be utf-8");
    (result, output)
}

fn expected_message(case: &Case) -> Result<String> {
    case.spec
        .expected
        .message_contains
        .clone()
        .with_context(|| format!("Missing message_contains in {}", case.name))
}

#[test]
fn runs_program_fixtures() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;

    for case in cases {
        let source = fs::read_to_string(&case.program_path)
            .with_context(|| format!("Reading {}", case.name))?;

        match case.spec.class {
            CaseClass::RuntimeSuccess => {
                let stdout_file = case
                    .spec
                    .expected
                    .stdout_file
                    .as_deref()
                    .with_context(|| format!("Missing stdout_file in {}", case.name))?;
                let expected = case.read_text(stdout_file)?;
                let (result, output) = run_captured(&source);
                ensure!(
                    !result.is_error(),
                    "Case {} failed at runtime: {result}",
                    case.name
                );
                assert_eq!(output, expected, "stdout mismatch for {}", case.name);
            }
            CaseClass::ParseError => {
                let expected = expected_message(&case)?;
                let errors = match parser::parse(&source) {
                    Err(errors) => errors,
                    Ok(_) => anyhow::bail!(
                        "Expected parse error in {}, but parsing succeeded",
                        case.name
                    ),
                };
                let rendered = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                ensure!(
                    rendered.contains(&expected),
                    "Expected parse error containing '{expected}' in {}, got '{rendered}'",
                    case.name
                );
            }
            CaseClass::EvalError => {
                let expected = expected_message(&case)?;
                let (result, _) = run_captured(&source);
                let error = match result {
                    Value::Error(error) => error,
                    other => anyhow::bail!(
                        "Expected runtime error in {}, got {other:?}",
                        case.name
                    ),
                };
                let actual = error.to_string();
                ensure!(
                    actual.contains(&expected),
                    "Expected runtime error containing '{expected}' in {}, got '{actual}'",
                    case.name
                );
            }
        }
    }

    Ok(())
}
