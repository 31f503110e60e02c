//! Activity record. Identity is its position in the activity sequence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
