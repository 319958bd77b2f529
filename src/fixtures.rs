//! Loader for the data-driven program fixtures under `tests/programs/`.
//!
//! Each case is a directory holding a `case.yaml` spec and a `program.crow`
//! source file, plus whatever expectation files the spec points at.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseClass {
    RuntimeSuccess,
    ParseError,
    EvalError,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExpectedOutcome {
    /// File holding the exact stdout for `runtime_success` cases.
    #[serde(default)]
    pub stdout_file: Option<String>,
    /// Substring the error message must contain for the error classes.
    #[serde(default)]
    pub message_contains: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaseSpec {
    pub class: CaseClass,
    #[serde(default)]
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub dir: PathBuf,
    pub program_path: PathBuf,
    pub spec: CaseSpec,
}

impl Case {
    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(relative_path))
            .with_context(|| format!("Reading {} fixture file {}", self.name, relative_path))
    }
}

pub fn load_cases(programs_dir: &Path) -> Result<Vec<Case>> {
    let mut cases = Vec::new();

    for entry in
        fs::read_dir(programs_dir).with_context(|| format!("Reading {}", programs_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let case_path = path.join("case.yaml");
        if !case_path.exists() {
            continue;
        }

        let program_path = path.join("program.crow");
        ensure!(
            program_path.exists(),
            "Missing program.crow for case {}",
            path.display()
        );

        let case_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .map(str::to_string)
            .with_context(|| format!("Invalid case directory name {}", path.display()))?;
        let case_raw = fs::read_to_string(&case_path)
            .with_context(|| format!("Reading {}", case_path.display()))?;
        let spec: CaseSpec = serde_yaml::from_str(&case_raw)
            .with_context(|| format!("Parsing {}", case_path.display()))?;

        cases.push(Case {
            name: case_name,
            dir: path,
            program_path,
            spec,
        });
    }

    ensure!(
        !cases.is_empty(),
        "No test cases found in {}",
        programs_dir.display()
    );
    cases.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(cases)
}
