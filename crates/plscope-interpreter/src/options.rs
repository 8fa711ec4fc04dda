//! Interpreter configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Evaluate `v NUMBER := expr` initializers when the declaration is reached.
    /// When off, declared variables start as NULL.
    pub initialize_declarations: bool,

    /// Nested calls allowed before `CallDepthExceeded`
    pub max_call_depth: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            initialize_declarations: true,
            max_call_depth: 64,
        }
    }
}

impl InterpreterOptions {
    /// Load options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = InterpreterOptions::from_json(r#"{"max_call_depth": 8}"#).unwrap();
        assert_eq!(options.max_call_depth, 8);
        assert!(options.initialize_declarations);

        let options = InterpreterOptions::from_json("{}").unwrap();
        assert_eq!(options, InterpreterOptions::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(InterpreterOptions::from_json(r#"{"max_call_depth": "deep"}"#).is_err());
    }
}
