/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Invoice mutations supported by the action pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// User-facing message when the store rejects this operation
    pub fn database_error_message(&self) -> String {
        format!("Database Error: Failed to {} Invoice.", self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "Create"),
            Operation::Update => write!(f, "Update"),
            Operation::Delete => write!(f, "Delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_messages() {
        assert_eq!(
            Operation::Create.database_error_message(),
            "Database Error: Failed to Create Invoice."
        );
        assert_eq!(
            Operation::Update.database_error_message(),
            "Database Error: Failed to Update Invoice."
        );
        assert_eq!(
            Operation::Delete.database_error_message(),
            "Database Error: Failed to Delete Invoice."
        );
    }
}
