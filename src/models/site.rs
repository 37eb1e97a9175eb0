use serde::{Deserialize, Serialize};

/// A registered sede allowed to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub password: String,
}

impl Site {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }

    /// Exact match on both identifier and credential.
    pub fn matches(&self, id: &str, password: &str) -> bool {
        self.id == id && self.password == password
    }
}
