use serde::{Deserialize, Serialize};

/// Which stage of the pipeline produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Tokenize,
    Parse,
    Link,
    Dir,
    Module,
}

/// Recoverable errors skip one unit (a file, a node); fatal errors abort
/// the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Recoverable,
    Fatal,
}

/// A pipeline error. Tokenize and Link errors are always fatal, Dir and
/// Module errors always recoverable; Parse errors carry either severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScpError {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl ScpError {
    pub fn new(
        kind: ErrorKind,
        severity: Severity,
        file: &str,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        ScpError {
            kind,
            severity,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn tokenize(file: &str, line: u32, message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Tokenize, Severity::Fatal, file, line, message)
    }

    pub fn parse(file: &str, line: u32, message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Parse, Severity::Recoverable, file, line, message)
    }

    pub fn parse_fatal(file: &str, line: u32, message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Parse, Severity::Fatal, file, line, message)
    }

    pub fn link(file: &str, line: u32, message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Link, Severity::Fatal, file, line, message)
    }

    pub fn dir(file: &str, line: u32, message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Dir, Severity::Recoverable, file, line, message)
    }

    pub fn module(message: impl Into<String>) -> Self {
        ScpError::new(ErrorKind::Module, Severity::Recoverable, "", 0, message)
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Serialize for the CLI's json output mode. All fields are always
    /// present so the shape is stable for consumers.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":     self.kind,
            "severity": self.severity,
            "file":     self.file,
            "line":     self.line,
            "message":  self.message,
        })
    }
}

impl std::fmt::Display for ScpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file.is_empty() {
            write!(f, "{:?}: {}", self.kind, self.message)
        } else {
            write!(
                f,
                "{:?}: {}:{}: {}",
                self.kind, self.file, self.line, self.message
            )
        }
    }
}
