use std::fmt;

/// Where a parse error starts or ends. All fields count from 0; `column`
/// and `offset` are byte counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A stylesheet syntax error covering `begin..end`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub code: String,
    pub message: String,
    pub begin: Position,
    pub end: Position,
}

impl ParseError {
    pub fn syntax_error(message: String, begin: Position, end: Position) -> Self {
        ParseError {
            code: "css-syntax-error".to_string(),
            message,
            begin,
            end,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.begin.line, self.begin.column)?;
        if self.end != self.begin {
            write!(f, "-{}:{}", self.end.line, self.end.column)?;
        }
        write!(f, ": {} ({})", self.message, self.code)
    }
}

impl std::error::Error for ParseError {}

/// Everything that can make [`crate::MixinFrom::process`] fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No loader was configured.
    #[error("Expected getFileText to be provided as option to constructor")]
    Config,

    /// The loader failed. Reported exactly as the loader produced it.
    #[error(transparent)]
    Load(anyhow::Error),

    /// The fetched stylesheet has no definition with the requested name.
    #[error("Failed to find mixin {name} at {location}")]
    DefinitionNotFound { name: String, location: String },

    /// The fetched stylesheet could not be parsed.
    #[error("Failed to parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
