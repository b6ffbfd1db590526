//! Error and result types for the query crate.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub enum Error {
    /// An unrecognized character or an unterminated string literal.
    Lexical(String),
    /// An unexpected token, already formatted with its line/column.
    Syntax(String),
    /// One or more syntax/lexical errors accumulated by the parser.
    Parse(Vec<String>),
    /// A static check that doesn't require a token mismatch: multi-label
    /// node patterns, `DETACH` outside `DELETE`, an undeclared variable
    /// referenced by WHERE/SET/DELETE.
    Semantic(String),
    /// A constraint violated only at execution time: non-detach delete of
    /// a node with edges, rebinding a variable already bound by CREATE.
    Runtime(String),
    Other(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Lexical(msg) => write!(f, "lexical error: {msg}"),
            Error::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Error::Parse(msgs) => write!(f, "parse errors: {}", msgs.join("; ")),
            Error::Semantic(msg) => write!(f, "semantic error: {msg}"),
            Error::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
