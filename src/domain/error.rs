//! Error kinds that end a trace run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TraceError {
    /// The call target has an empty function, class, or method segment.
    #[error("Invalid call target '{0}': expected `function` or `Class.method`")]
    InvalidTarget(String),
    #[error("Source file {} is not part of the project", .0.display())]
    SourceFileNotFound(PathBuf),
    #[error("Function '{name}' not found in {}", file.display())]
    FunctionNotFound { name: String, file: PathBuf },
    #[error("Class '{name}' not found in {}", file.display())]
    ClassNotFound { name: String, file: PathBuf },
    #[error("Method '{method}' not found in class '{class}' in {}", file.display())]
    MethodNotFound {
        class: String,
        method: String,
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_target() {
        let err = TraceError::MethodNotFound {
            class: "Foo".into(),
            method: "bar".into(),
            file: PathBuf::from("src/foo.ts"),
        };
        assert_eq!(
            err.to_string(),
            "Method 'bar' not found in class 'Foo' in src/foo.ts"
        );
        let err = TraceError::SourceFileNotFound(PathBuf::from("src/missing.ts"));
        assert_eq!(
            err.to_string(),
            "Source file src/missing.ts is not part of the project"
        );
    }
}
