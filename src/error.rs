use serde::{Serialize, Deserialize};
use std::fmt;
use crate::calendar::ParseError;

/// Broad classification of a [`GaiaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed date or other caller input.
    Parse,
    /// A write to the backing store did not go through.
    Persistence,
    Config,
    Io,
    Json,
    State,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::State => "state",
        }
    }
}

/// Unified error type for the whole crate.
/// Fallible functions return `Result<T, GaiaError>` rather than String errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaiaError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl GaiaError {
    /// Create a new error with kind, stage and message
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, stage: &'static str) -> Self {
        GaiaError {
            kind,
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    pub fn parse<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::Parse, message, stage)
    }

    pub fn persistence<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::Persistence, message, stage)
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_persistence(&self) -> bool {
        self.kind == ErrorKind::Persistence
    }
}

impl fmt::Display for GaiaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for GaiaError {}

impl From<ParseError> for GaiaError {
    fn from(err: ParseError) -> Self {
        GaiaError::parse(err.to_string(), "calendar").with_source("calendar::ParseError")
    }
}

impl From<anyhow::Error> for GaiaError {
    fn from(err: anyhow::Error) -> Self {
        GaiaError::new(ErrorKind::State, err.to_string(), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for GaiaError {
    fn from(err: std::io::Error) -> Self {
        GaiaError::new(ErrorKind::Io, format!("I/O error: {}", err), "io")
            .with_source("std::io")
    }
}

impl From<serde_json::Error> for GaiaError {
    fn from(err: serde_json::Error) -> Self {
        GaiaError::new(ErrorKind::Json, format!("JSON error: {}", err), "json_parse")
            .with_source("serde_json")
    }
}

impl From<toml::de::Error> for GaiaError {
    fn from(err: toml::de::Error) -> Self {
        GaiaError::new(ErrorKind::Config, format!("TOML error: {}", err), "config")
            .with_source("toml")
    }
}
