use std::fmt;

#[derive(Debug)]
pub enum LinkageError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty file name, etc.).
    ConfigValidation(String),
    /// Bloom filter constructed with a zero size or zero hash rounds.
    InvalidBloomParams { size: usize, hash_count: u32 },
    /// Missing required column in a dataset's CSV header.
    MissingColumn { dataset: String, column: String },
    /// A field map handed to `Record::from_fields` lacks a required key.
    MissingField { field: String },
    /// Malformed CSV content (ragged rows, bad quoting).
    Csv { dataset: String, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for LinkageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidBloomParams { size, hash_count } => write!(
                f,
                "invalid bloom filter parameters: size={size}, hash_count={hash_count} (both must be > 0)"
            ),
            Self::MissingColumn { dataset, column } => {
                write!(f, "dataset '{dataset}': missing column '{column}'")
            }
            Self::MissingField { field } => write!(f, "record is missing field '{field}'"),
            Self::Csv { dataset, message } => write!(f, "dataset '{dataset}': CSV error: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LinkageError {}
