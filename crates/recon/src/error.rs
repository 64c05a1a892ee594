use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, negative bonus, etc.).
    ConfigValidation(String),
    /// A verification key is not of the form `file::name::city`.
    MalformedKey(String),
    /// A verification key references a source file not in the loaded set.
    UnknownSourceFile { key: String, file: String },
    /// No record matched a verification key during apply.
    RecordNotFound { key: String },
    /// More than one record matched a verification key during apply.
    AmbiguousRecord { key: String, count: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MalformedKey(key) => {
                write!(f, "malformed verification key '{key}' (want file::name::city)")
            }
            Self::UnknownSourceFile { key, file } => {
                write!(f, "verification '{key}': source file '{file}' not loaded")
            }
            Self::RecordNotFound { key } => {
                write!(f, "no record found for verification '{key}'")
            }
            Self::AmbiguousRecord { key, count } => {
                write!(f, "{count} records match verification '{key}', want exactly 1")
            }
        }
    }
}

impl std::error::Error for ReconError {}
