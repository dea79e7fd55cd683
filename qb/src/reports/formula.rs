//! Outcomes of formula test and deploy runs.

use std::collections::BTreeMap;

use qbcli_core::FieldId;
use serde::Serialize;
use serde_json::Value as Json;

use super::{Report, Rows};

/// Which test formulas, by position in the project file, passed or failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormulaTestReport {
    pub passed: Vec<usize>,
    /// Failure reason per formula.
    pub failed: BTreeMap<usize, String>,
}

impl Report for FormulaTestReport {
    fn json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    fn rows(&self) -> Rows {
        let mut rows: Vec<Vec<String>> = self
            .passed
            .iter()
            .map(|idx| vec![idx.to_string(), "passed".into(), String::new()])
            .chain(
                self.failed
                    .iter()
                    .map(|(idx, reason)| vec![idx.to_string(), "failed".into(), reason.clone()]),
            )
            .collect();
        rows.sort_by_key(|row| row[0].parse::<usize>().unwrap_or(usize::MAX));
        Rows {
            headers: vec!["formula".into(), "status".into(), "reason".into()],
            rows,
        }
    }
}

/// Fields that received their formula, and errors for those that did not,
/// keyed by table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormulaDeployReport {
    pub deployed: BTreeMap<String, Vec<FieldId>>,
    pub errors: BTreeMap<String, BTreeMap<FieldId, String>>,
}

impl Report for FormulaDeployReport {
    fn json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }

    fn rows(&self) -> Rows {
        let deployed = self.deployed.iter().flat_map(|(table, ids)| {
            ids.iter()
                .map(move |id| vec![table.clone(), id.to_string(), "deployed".into()])
        });
        let errors = self.errors.iter().flat_map(|(table, errors)| {
            errors
                .iter()
                .map(move |(id, e)| vec![table.clone(), id.to_string(), e.clone()])
        });
        Rows {
            headers: vec!["table".into(), "field".into(), "result".into()],
            rows: deployed.chain(errors).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_test_report_rows_in_file_order() {
        let report = FormulaTestReport {
            passed: vec![0, 2],
            failed: BTreeMap::from([(1, r#"expected "4", got "6""#.to_string())]),
        };
        let rows = report.rows();
        assert_eq!(rows.rows[0], ["0", "passed", ""]);
        assert_eq!(rows.rows[1], ["1", "failed", r#"expected "4", got "6""#]);
        assert_eq!(rows.rows[2], ["2", "passed", ""]);
        assert_eq!(
            report.json(),
            json!({"passed": [0, 2], "failed": {"1": "expected \"4\", got \"6\""}})
        );
    }

    #[test]
    fn test_deploy_report_json() {
        let report = FormulaDeployReport {
            deployed: BTreeMap::from([("bqy".to_string(), vec![8])]),
            errors: BTreeMap::from([(
                "bqz".to_string(),
                BTreeMap::from([(9, "field not found".to_string())]),
            )]),
        };
        assert_eq!(
            report.json(),
            json!({"deployed": {"bqy": [8]}, "errors": {"bqz": {"9": "field not found"}}})
        );
        assert_eq!(report.rows().rows[1], ["bqz", "9", "field not found"]);
    }
}
