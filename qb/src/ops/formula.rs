//! Formula operations - test and deploy the formulas listed in a project file.
//!
//! A project file names formula sources on disk and where they belong:
//!
//! ```toml
//! [[test.formulas]]
//! file = "formulas/total.qbf"
//! table_id = "bqy"
//! record_id = 1
//! expected = "42"
//!
//! [[deploy.formulas]]
//! file = "formulas/total.qbf"
//! table_id = "bqy"
//! field_id = 8
//! ```
//!
//! Formula paths are relative to the project file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, Result, bail};
use qbcli_client::{
    Client,
    resources::{
        fields::{FieldInput, FieldProperties},
        formula::RunFormulaInput,
    },
};
use qbcli_core::FieldId;
use serde::Deserialize;
use tracing::{debug, info};

use crate::reports::{FormulaDeployReport, FormulaTestReport};

pub const DEFAULT_PROJECT_FILE: &str = "quickbase.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub test: Section<FormulaTest>,
    #[serde(default)]
    pub deploy: Section<FormulaDeployment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct Section<T> {
    #[serde(default)]
    pub formulas: Vec<T>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            formulas: Vec::new(),
        }
    }
}

/// A formula evaluated against one record and compared with its expected result.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormulaTest {
    pub file: PathBuf,
    pub table_id: String,
    pub record_id: u64,
    pub expected: String,
}

/// A formula pushed to the field that computes it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormulaDeployment {
    pub file: PathBuf,
    pub table_id: String,
    pub field_id: FieldId,
}

impl ProjectFile {
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("error reading project file {}", path.display()))?;
        let project: Self = toml::from_str(&text)
            .wrap_err_with(|| format!("invalid project file {}", path.display()))?;
        project.validate()?;
        Ok(project)
    }

    fn validate(&self) -> Result<()> {
        for (idx, t) in self.test.formulas.iter().enumerate() {
            if t.table_id.is_empty() || t.record_id == 0 || t.file.as_os_str().is_empty() {
                bail!("test formula {idx}: file, table_id and record_id are required");
            }
        }
        for (idx, d) in self.deploy.formulas.iter().enumerate() {
            if d.table_id.is_empty() || d.field_id == 0 || d.file.as_os_str().is_empty() {
                bail!("deploy formula {idx}: file, table_id and field_id are required");
            }
        }
        Ok(())
    }
}

/// Options shared by the formula operations.
pub struct FormulaOptions<'a> {
    /// The project file listing the formulas.
    pub project_file: &'a Path,
}

fn read_formula(project_file: &Path, file: &Path) -> Result<String> {
    let path = project_file.parent().unwrap_or(Path::new("")).join(file);
    fs::read_to_string(&path)
        .wrap_err_with(|| format!("error reading formula file {}", path.display()))
}

/// Run every test formula and compare each result with its expectation.
///
/// A formula the API rejects counts as a failure; an unreadable formula file
/// stops the run.
pub fn test_formulas(client: &Client, opts: FormulaOptions) -> Result<FormulaTestReport> {
    let project = ProjectFile::open(opts.project_file)?;
    let mut report = FormulaTestReport::default();

    for (idx, test) in project.test.formulas.iter().enumerate() {
        let input = RunFormulaInput {
            formula: read_formula(opts.project_file, &test.file)?,
            from: test.table_id.clone(),
            rid: test.record_id,
        };
        debug!(idx, file = %test.file.display(), "running formula");
        match client.run_formula(&input) {
            Ok(output) if output.result == test.expected => report.passed.push(idx),
            Ok(output) => {
                report.failed.insert(
                    idx,
                    format!("expected {:?}, got {:?}", test.expected, output.result),
                );
            }
            Err(e) => {
                report.failed.insert(idx, e.to_string());
            }
        }
    }

    info!(
        passed = report.passed.len(),
        failed = report.failed.len(),
        "tested formulas"
    );
    Ok(report)
}

/// Write every deploy formula to its field.
///
/// Per-field API errors are collected in the report instead of stopping the
/// run.
pub fn deploy_formulas(client: &Client, opts: FormulaOptions) -> Result<FormulaDeployReport> {
    let project = ProjectFile::open(opts.project_file)?;
    let mut report = FormulaDeployReport::default();

    for deployment in &project.deploy.formulas {
        let input = FieldInput {
            properties: Some(FieldProperties {
                formula: Some(read_formula(opts.project_file, &deployment.file)?),
                ..FieldProperties::default()
            }),
            ..FieldInput::default()
        };
        let table_id = deployment.table_id.clone();
        match client.update_field(&table_id, deployment.field_id, &input) {
            Ok(_) => report
                .deployed
                .entry(table_id)
                .or_default()
                .push(deployment.field_id),
            Err(e) => {
                report
                    .errors
                    .entry(table_id)
                    .or_default()
                    .insert(deployment.field_id, e.to_string());
            }
        }
    }

    info!(
        deployed = report.deployed.values().map(Vec::len).sum::<usize>(),
        "deployed formulas"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::ops::fake::FakeTransport;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    // ========================================================================
    // Project file
    // ========================================================================

    #[test]
    fn test_project_file_rejects_unknown_keys() {
        let dir = project(&[(
            DEFAULT_PROJECT_FILE,
            "[[test.formulas]]\nfile = \"a.qbf\"\ntable_id = \"bqy\"\nrecord_id = 1\nexpected = \"1\"\ncolour = \"red\"\n",
        )]);
        let err = ProjectFile::open(&dir.path().join(DEFAULT_PROJECT_FILE)).unwrap_err();
        assert!(format!("{err:?}").contains("colour"), "{err:?}");
    }

    #[test]
    fn test_project_file_requires_ids() {
        let dir = project(&[(
            DEFAULT_PROJECT_FILE,
            "[[deploy.formulas]]\nfile = \"a.qbf\"\ntable_id = \"\"\nfield_id = 8\n",
        )]);
        let err = ProjectFile::open(&dir.path().join(DEFAULT_PROJECT_FILE)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "deploy formula 0: file, table_id and field_id are required"
        );
    }

    #[test]
    fn test_missing_project_file() {
        let dir = TempDir::new().unwrap();
        let err = ProjectFile::open(&dir.path().join(DEFAULT_PROJECT_FILE)).unwrap_err();
        assert!(err.to_string().starts_with("error reading project file"));
    }

    // ========================================================================
    // Test
    // ========================================================================

    #[test]
    fn test_formulas_pass_and_fail() {
        let dir = project(&[
            (
                DEFAULT_PROJECT_FILE,
                "[[test.formulas]]\nfile = \"double.qbf\"\ntable_id = \"bqy\"\nrecord_id = 1\nexpected = \"4\"\n\n\
                 [[test.formulas]]\nfile = \"double.qbf\"\ntable_id = \"bqy\"\nrecord_id = 2\nexpected = \"4\"\n",
            ),
            ("double.qbf", "[Estimate] * 2"),
        ]);
        let transport = FakeTransport::default();
        transport.reply(json!({"result": "4"})).reply(json!({"result": "6"}));

        let report = test_formulas(
            &transport.client(),
            FormulaOptions {
                project_file: &dir.path().join(DEFAULT_PROJECT_FILE),
            },
        )
        .unwrap();

        assert_eq!(report.passed, [0]);
        assert_eq!(report.failed[&1], r#"expected "4", got "6""#);
        assert_eq!(
            transport.bodies()[1],
            json!({"formula": "[Estimate] * 2", "from": "bqy", "rid": 2})
        );
    }

    #[test]
    fn test_api_error_fails_only_that_formula() {
        let dir = project(&[
            (
                DEFAULT_PROJECT_FILE,
                "[[test.formulas]]\nfile = \"a.qbf\"\ntable_id = \"bqy\"\nrecord_id = 1\nexpected = \"x\"\n\n\
                 [[test.formulas]]\nfile = \"a.qbf\"\ntable_id = \"bqy\"\nrecord_id = 2\nexpected = \"x\"\n",
            ),
            ("a.qbf", "\"x\""),
        ]);
        // Nothing queued, so both calls get the fake's 500.
        let transport = FakeTransport::default();
        let report = test_formulas(
            &transport.client(),
            FormulaOptions {
                project_file: &dir.path().join(DEFAULT_PROJECT_FILE),
            },
        )
        .unwrap();
        assert!(report.passed.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[&0].contains("no reply queued"), "{}", report.failed[&0]);
    }

    #[test]
    fn test_unreadable_formula_stops_the_run() {
        let dir = project(&[(
            DEFAULT_PROJECT_FILE,
            "[[test.formulas]]\nfile = \"missing.qbf\"\ntable_id = \"bqy\"\nrecord_id = 1\nexpected = \"x\"\n",
        )]);
        let transport = FakeTransport::default();
        let err = test_formulas(
            &transport.client(),
            FormulaOptions {
                project_file: &dir.path().join(DEFAULT_PROJECT_FILE),
            },
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("error reading formula file"));
        assert!(transport.bodies().is_empty());
    }

    // ========================================================================
    // Deploy
    // ========================================================================

    #[test]
    fn test_deploy_updates_fields_and_collects_errors() {
        let dir = project(&[
            (
                DEFAULT_PROJECT_FILE,
                "[[deploy.formulas]]\nfile = \"total.qbf\"\ntable_id = \"bqy\"\nfield_id = 8\n\n\
                 [[deploy.formulas]]\nfile = \"total.qbf\"\ntable_id = \"bqz\"\nfield_id = 9\n",
            ),
            ("total.qbf", "[Price] * [Quantity]"),
        ]);
        let transport = FakeTransport::default();
        transport.reply(json!({"id": 8, "label": "Total", "fieldType": "numeric"}));

        let report = deploy_formulas(
            &transport.client(),
            FormulaOptions {
                project_file: &dir.path().join(DEFAULT_PROJECT_FILE),
            },
        )
        .unwrap();

        assert_eq!(report.deployed["bqy"], [8]);
        assert!(report.errors["bqz"].contains_key(&9));
        assert_eq!(
            transport.bodies()[0],
            json!({"properties": {"formula": "[Price] * [Quantity]"}})
        );
        assert_eq!(
            transport.urls()[0],
            "https://api.quickbase.com/v1/fields/8?tableId=bqy"
        );
    }
}
