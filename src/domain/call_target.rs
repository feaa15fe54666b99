//! Call Target Parsing
//!
//! Turns the user's dotted entry-point name into a lookup key.

use crate::domain::error::TraceError;

/// The entry point to trace from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// `function`
    Function(String),
    /// `Class.method`
    Method { class: String, method: String },
}

impl CallTarget {
    /// Parse `function` or `Class.method`.
    pub fn parse(input: &str) -> Result<Self, TraceError> {
        let invalid = || TraceError::InvalidTarget(input.to_string());
        let segments: Vec<&str> = input.trim().split('.').map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        match segments.as_slice() {
            [function] => Ok(CallTarget::Function(function.to_string())),
            [class, method] => Ok(CallTarget::Method {
                class: class.to_string(),
                method: method.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for CallTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallTarget::Function(name) => write!(f, "{}", name),
            CallTarget::Method { class, method } => write!(f, "{}.{}", class, method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function() {
        assert_eq!(
            CallTarget::parse("main"),
            Ok(CallTarget::Function("main".to_string()))
        );
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(
            CallTarget::parse("Foo.bar"),
            Ok(CallTarget::Method {
                class: "Foo".to_string(),
                method: "bar".to_string()
            })
        );
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", ".", "Foo.", ".bar", "a.b.c", "  "] {
            assert_eq!(
                CallTarget::parse(input),
                Err(TraceError::InvalidTarget(input.to_string())),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_display_round_trips_name() {
        let target = CallTarget::parse("Foo.bar").unwrap();
        assert_eq!(target.to_string(), "Foo.bar");
    }
}
