use serde::{Deserialize, Serialize};

use crate::{Client, Error, Result, transport::Method};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CloneUserTokenInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub apps: Vec<TokenApp>,
    /// Only present right after cloning.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenApp {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId {
    #[serde(default)]
    pub id: u64,
}

impl Client {
    /// Clone the token the client authenticates with.
    pub fn clone_user_token(&self, input: &CloneUserTokenInput) -> Result<UserToken> {
        if input.name.is_empty() {
            return Err(Error::invalid_input("token name required"));
        }
        self.call(Method::Post, ["usertoken", "clone"])
            .json(input)?
            .send("user token")
    }

    /// Deactivate `token`. The call authenticates as that token.
    pub fn deactivate_user_token(&self, token: &str) -> Result<TokenId> {
        self.call(Method::Post, ["usertoken", "deactivate"])
            .user_token(token)
            .send("deactivated user token")
    }

    /// Delete `token`. The call authenticates as that token.
    pub fn delete_user_token(&self, token: &str) -> Result<TokenId> {
        self.call(Method::Delete, ["usertoken"])
            .user_token(token)
            .send("deleted user token")
    }
}
