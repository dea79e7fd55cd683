use serde::{Deserialize, Serialize};

use crate::{Client, Error, Result, transport::Method};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunFormulaInput {
    pub formula: String,
    pub from: String,
    pub rid: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormulaOutput {
    #[serde(default)]
    pub result: String,
}

impl Client {
    /// Evaluate a formula against one record.
    pub fn run_formula(&self, input: &RunFormulaInput) -> Result<RunFormulaOutput> {
        if input.formula.trim().is_empty() {
            return Err(Error::invalid_input("formula required"));
        }
        self.call(Method::Post, ["formula", "run"])
            .json(input)?
            .send("formula result")
    }
}
