use thiserror::Error;

/// Errors produced when BQL text is syntactically malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("missing closing parenthesis")]
    MissingClosingParen,

    #[error("IN requires at least one value")]
    EmptyInList,

    #[error("unexpected token '{token}' at position {index}")]
    UnexpectedToken { token: String, index: usize },

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
