use serde::Deserialize;

use super::apps::Variable;
use crate::{Client, Error, Result, xml::Envelope, xml::Param};

#[derive(Deserialize)]
struct VariableValue {
    #[serde(default)]
    value: String,
}

impl Client {
    pub fn get_variable(&self, app_id: &str, name: &str) -> Result<Variable> {
        if name.is_empty() {
            return Err(Error::invalid_input("variable name required"));
        }
        let found: VariableValue = self.xml_call(
            app_id,
            "API_GetDBvar",
            &[("varname", Param::Text(name.to_string()))],
        )?;
        Ok(Variable {
            name: name.to_string(),
            value: found.value,
        })
    }

    pub fn set_variable(&self, app_id: &str, name: &str, value: &str) -> Result<Variable> {
        if name.is_empty() {
            return Err(Error::invalid_input("variable name required"));
        }
        let _: Envelope = self.xml_call(
            app_id,
            "API_SetDBvar",
            &[
                ("varname", Param::Text(name.to_string())),
                ("value", Param::Text(value.to_string())),
            ],
        )?;
        Ok(Variable {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}
