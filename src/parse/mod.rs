mod error;
mod lexer;
mod parser;
mod simplify;

pub use error::ParseError;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{is_ruleset_name, ParseInfo, MAX_DEPTH};
pub use simplify::simplify;

use crate::{RuleSet, Schema};

/// Parse BQL text into a simplified ruleset tree, reporting how many tokens
/// the parser consumed.
///
/// Parsing stops at the first token that cannot continue the expression; the
/// returned [`ParseInfo`] tells whether input was left over.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid BQL syntax.
pub fn parse<S: Schema + ?Sized>(input: &str, schema: &S) -> Result<(RuleSet, ParseInfo), ParseError> {
    let tokens = tokenize(input);
    let mut parser = parser::Parser::new(&tokens, schema);
    let tree = parser.parse_expression()?;
    Ok((simplify(tree), parser.info()))
}
