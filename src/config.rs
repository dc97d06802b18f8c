use thiserror::Error;

/// The directive name this middleware answers to in proxy configuration.
pub(crate) const DIRECTIVE_NAME: &str = "minify";

/// Error returned when the `minify` configuration directive is malformed.
///
/// Directive parsing happens during setup; a malformed directive rejects the
/// configuration before the middleware ever serves traffic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectiveError {
    /// The directive line was empty.
    #[error("empty directive")]
    Empty,
    /// The directive name was not `minify`.
    #[error("unrecognized directive {0:?}")]
    UnknownDirective(String),
    /// The directive takes no arguments but one was given.
    #[error("minify directive takes no arguments, got {0:?}")]
    UnexpectedArgument(String),
}

/// Parses a whitespace-tokenized directive line. Only the bare token
/// `minify` is accepted.
pub(crate) fn parse_directive(input: &str) -> Result<(), DirectiveError> {
    let mut tokens = input.split_whitespace();
    match tokens.next() {
        None => Err(DirectiveError::Empty),
        Some(name) if name != DIRECTIVE_NAME => {
            Err(DirectiveError::UnknownDirective(name.to_string()))
        }
        Some(_) => match tokens.next() {
            Some(argument) => Err(DirectiveError::UnexpectedArgument(argument.to_string())),
            None => Ok(()),
        },
    }
}
