use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: ParseError,
    },
    Validation {
        path: PathBuf,
        line: u64,
        column: usize,
        kind: ValidationError,
    },
    Empty {
        path: PathBuf,
    },
    Config(String),
}

#[derive(Debug)]
pub enum ParseError {
    Csv(csv::Error),
    BareQuote { line: u64 },
    ExtraneousQuote { line: u64 },
    UnclosedQuote { line: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotAnInteger { value: String },
    MissingColumn { len: usize },
    UnsafeText { value: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Converts a CSV error, keeping plain I/O failures apart from grammar
    /// violations.
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        let io_kind = match source.kind() {
            csv::ErrorKind::Io(e) => Some(e.kind()),
            _ => None,
        };
        match io_kind {
            Some(kind) => Error::Io {
                path,
                source: io::Error::new(kind, source),
            },
            None => Error::Parse {
                path,
                source: ParseError::Csv(source),
            },
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Error::Parse { path, source } => {
                write!(f, "malformed CSV in {}: {}", path.display(), source)
            }
            Error::Validation {
                path,
                line,
                column,
                kind,
            } => write!(
                f,
                "{}:{}: column {}: {}",
                path.display(),
                line,
                column,
                kind
            ),
            Error::Empty { path } => write!(f, "{} contains no data rows", path.display()),
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Csv(e) => write!(f, "{}", e),
            ParseError::BareQuote { line } => {
                write!(f, "line {}: quote in unquoted field", line)
            }
            ParseError::ExtraneousQuote { line } => {
                write!(f, "line {}: unexpected text after closing quote", line)
            }
            ParseError::UnclosedQuote { line } => {
                write!(f, "line {}: quoted field is never closed", line)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::NotAnInteger { value } => {
                write!(f, "expected an integer, found {:?}", value)
            }
            ValidationError::MissingColumn { len } => {
                write!(f, "row has only {} fields", len)
            }
            ValidationError::UnsafeText { value } => {
                write!(f, "text contains a quote or backslash: {:?}", value)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
