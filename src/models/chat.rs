use serde::{ Serialize, Deserialize };
use super::plan::Reference;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), references: Vec::new() }
    }

    pub fn assistant(text: impl Into<String>, references: Vec<Reference>) -> Self {
        Self { role: Role::Assistant, text: text.into(), references }
    }
}
