use winnow::ascii::alpha1;
use winnow::combinator::{alt, eof, opt, peek, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{any, one_of, take, take_while};

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One of `( ) ! & | ,`.
    Symbol,
    /// A bare word: field, ruleset name, keyword or literal.
    Word,
    /// A double-quoted string. The token text is already unescaped.
    Quoted,
    /// A comparison operator, or `!CONTAINS` / `!LIKE`.
    Operator,
}

/// One lexical unit of BQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether this is the symbol `sym`.
    #[must_use]
    pub fn is_symbol(&self, sym: char) -> bool {
        self.kind == TokenKind::Symbol && self.text.len() == 1 && self.text.starts_with(sym)
    }

    /// Whether this token can stand for a literal value.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Quoted)
    }
}

const NEGATED_KEYWORDS: &[&str] = &["!CONTAINS", "!LIKE"];

/// Characters that end a bare word.
fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '!' | '&' | '|' | '=' | '<' | '>' | ',')
}

/// Characters allowed right after `!CONTAINS` / `!LIKE`.
fn is_keyword_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '!' | '&' | '|' | '=' | '<' | '>' | '"')
}

// -- Operators --------------------------------------------------------------

fn comparison_op(input: &mut &str) -> ModalResult<Token> {
    alt((
        "!=",
        (one_of(['=', '<', '>']), opt('=')).take(),
    ))
    .map(|op: &str| Token::new(TokenKind::Operator, op))
    .parse_next(input)
}

fn negated_keyword(input: &mut &str) -> ModalResult<Token> {
    terminated(
        ('!', alpha1).take().verify(|word: &str| {
            NEGATED_KEYWORDS.contains(&word.to_ascii_uppercase().as_str())
        }),
        peek(alt((eof.void(), one_of(is_keyword_boundary).void()))),
    )
    .map(|word: &str| Token::new(TokenKind::Operator, word.to_ascii_uppercase()))
    .parse_next(input)
}

fn symbol(input: &mut &str) -> ModalResult<Token> {
    one_of(['(', ')', '!', '&', '|', ','])
        .map(|c: char| Token::new(TokenKind::Symbol, c))
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn unicode_escape(input: &mut &str) -> ModalResult<Option<char>> {
    take(4usize)
        .verify(|hex: &str| hex.chars().all(|c| c.is_ascii_hexdigit()))
        .map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
        .parse_next(input)
}

/// A double-quoted string with JSON-style escapes. An unterminated string
/// runs to end of input.
fn quoted(input: &mut &str) -> ModalResult<Token> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    while let Some(ch) = opt(any).parse_next(input)? {
        match ch {
            '"' => break,
            '\\' => match opt(any).parse_next(input)? {
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some('r') => s.push('\r'),
                Some('b') => s.push('\u{8}'),
                Some('f') => s.push('\u{c}'),
                Some('u') => match opt(unicode_escape).parse_next(input)? {
                    Some(Some(c)) => s.push(c),
                    _ => s.push('u'),
                },
                Some(other) => s.push(other),
                None => break,
            },
            c => s.push(c),
        }
    }
    Ok(Token::new(TokenKind::Quoted, s))
}

fn word(input: &mut &str) -> ModalResult<Token> {
    take_while(1.., |c: char| !is_reserved(c))
        .map(|w: &str| Token::new(TokenKind::Word, w))
        .parse_next(input)
}

fn token(input: &mut &str) -> ModalResult<Token> {
    alt((comparison_op, negated_keyword, symbol, quoted, word)).parse_next(input)
}

/// Split BQL text into tokens. Never fails: a character no other rule
/// accepts becomes a one-character word.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut rest = input;
    let mut tokens = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        match token.parse_next(&mut rest) {
            Ok(tok) => tokens.push(tok),
            Err(_) => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    tokens.push(Token::new(TokenKind::Word, c));
                }
                rest = chars.as_str();
            }
        }
    }
    tracing::trace!(count = tokens.len(), "tokenized bql input");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    fn op(s: &str) -> (TokenKind, String) {
        (TokenKind::Operator, s.to_owned())
    }

    fn sym(s: &str) -> (TokenKind, String) {
        (TokenKind::Symbol, s.to_owned())
    }

    fn word(s: &str) -> (TokenKind, String) {
        (TokenKind::Word, s.to_owned())
    }

    #[test]
    fn comparison_operators_are_greedy() {
        assert_eq!(
            texts("a=1 b!=2 c<=3 d>=4 e<5 f>6"),
            vec![
                word("a"), op("="), word("1"),
                word("b"), op("!="), word("2"),
                word("c"), op("<="), word("3"),
                word("d"), op(">="), word("4"),
                word("e"), op("<"), word("5"),
                word("f"), op(">"), word("6"),
            ]
        );
    }

    #[test]
    fn lone_bang_is_a_symbol() {
        assert_eq!(texts("!TEST"), vec![sym("!"), word("TEST")]);
        assert_eq!(texts("! a=1"), vec![sym("!"), word("a"), op("="), word("1")]);
    }

    #[test]
    fn negated_keywords_need_a_boundary() {
        assert_eq!(
            texts("fname !contains bob"),
            vec![word("fname"), op("!CONTAINS"), word("bob")]
        );
        assert_eq!(texts("x !LIKE\"y\""), vec![
            word("x"),
            op("!LIKE"),
            (TokenKind::Quoted, "y".to_owned()),
        ]);
        assert_eq!(texts("!like"), vec![op("!LIKE")]);
        // Not followed by a boundary: plain negation of a word.
        assert_eq!(texts("!containsx"), vec![sym("!"), word("containsx")]);
        assert_eq!(texts("!LIKES"), vec![sym("!"), word("LIKES")]);
    }

    #[test]
    fn symbols() {
        assert_eq!(
            texts("(a|b)&c,d"),
            vec![
                sym("("), word("a"), sym("|"), word("b"), sym(")"),
                sym("&"), word("c"), sym(","), word("d"),
            ]
        );
    }

    #[test]
    fn quoted_strings_unescape() {
        let tokens = tokenize(r#""a \"b\" \\ c" "line\nbreak" "A""#);
        let values: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(values, vec!["a \"b\" \\ c", "line\nbreak", "A"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Quoted));
    }

    #[test]
    fn quoted_string_keeps_reserved_characters() {
        assert_eq!(
            texts(r#"name="a & b | (c)""#),
            vec![
                word("name"),
                op("="),
                (TokenKind::Quoted, "a & b | (c)".to_owned()),
            ]
        );
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        assert_eq!(
            texts(r#"a="open ended"#),
            vec![word("a"), op("="), (TokenKind::Quoted, "open ended".to_owned())]
        );
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(
            texts("  sign \t IN\n(aries,   taurus)  "),
            vec![
                word("sign"), word("IN"), sym("("), word("aries"),
                sym(","), word("taurus"), sym(")"),
            ]
        );
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
