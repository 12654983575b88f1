//! User-defined gate signatures.

use serde::{Deserialize, Serialize};

/// A user-defined gate: its name and ordered formal parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// The gate name as it appears at call sites.
    pub name: String,
    /// Formal qubit parameters, in declaration order.
    pub parameters: Vec<String>,
}

impl FunctionDefinition {
    /// Create a new definition.
    pub fn new(name: impl Into<String>, parameters: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Number of formal parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        let def = FunctionDefinition::new("foo", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(def.arity(), 2);
        assert_eq!(def.parameters, vec!["a", "b"]);
    }
}
