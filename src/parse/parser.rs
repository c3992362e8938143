//! Recursive descent over the token stream.
//!
//! ```text
//! expr    → or
//! or      → and ("|" and)*
//! and     → unary ("&" unary)*
//! unary   → "!" unary | primary
//! primary → "(" expr ")" | NAME | rule
//! rule    → literal OPERATOR value | literal
//! value   → literal | "(" literal ("," literal)* ")"
//! ```
//!
//! Every rule starts life inside a one-element `and` ruleset; the simplifier
//! removes those wrappers once the whole tree is built.

use crate::coerce::coerce_value;
use crate::types::resolve_named;
use crate::{is_list_operator, Condition, Node, Rule, RuleSet, Schema};

use super::error::ParseError;
use super::lexer::{Token, TokenKind};

/// Keyword operators recognised in any letter case.
const KEYWORD_OPERATORS: &[&str] = &["CONTAINS", "LIKE", "IN", "NOT", "IS"];

/// Deepest nesting of `(` and `!` the parser descends into.
pub const MAX_DEPTH: usize = 128;

/// How far the parser got through the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseInfo {
    /// Tokens consumed by the parser.
    pub consumed: usize,
    /// Tokens produced by the tokenizer.
    pub total: usize,
}

impl ParseInfo {
    /// Whether every token was consumed, i.e. there is no trailing input.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.consumed == self.total
    }
}

/// Whether `word` has the lexical form of a named ruleset: only `A-Z`, `0-9`
/// and `_`, with at least one letter.
#[must_use]
pub fn is_ruleset_name(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && word.chars().any(|c| c.is_ascii_uppercase())
}

/// Whether a word in operator position is an alphabetic operator: one of the
/// keywords in any case, or any all-uppercase word.
fn is_keyword_operator(word: &str) -> bool {
    if KEYWORD_OPERATORS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
        return true;
    }
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c == '_')
}

pub(crate) struct Parser<'a, S: Schema + ?Sized> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    schema: &'a S,
}

impl<'a, S: Schema + ?Sized> Parser<'a, S> {
    pub(crate) fn new(tokens: &'a [Token], schema: &'a S) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            schema,
        }
    }

    pub(crate) fn info(&self) -> ParseInfo {
        ParseInfo {
            consumed: self.position,
            total: self.tokens.len(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.position)?;
        self.position += 1;
        Some(tok)
    }

    fn check_symbol(&self, sym: char) -> bool {
        self.peek().is_some_and(|t| t.is_symbol(sym))
    }

    fn check_word(&self, word: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Word && t.text.eq_ignore_ascii_case(word))
    }

    fn unexpected(&self, tok: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            token: tok.text.clone(),
            index: self.position.saturating_sub(1),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn parse_expression(&mut self) -> Result<RuleSet, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<RuleSet, ParseError> {
        let mut left = self.parse_and()?;
        while self.check_symbol('|') {
            self.advance();
            let right = self.parse_and()?;
            left = merge(left, right, Condition::Or);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<RuleSet, ParseError> {
        let mut left = self.parse_unary()?;
        while self.check_symbol('&') {
            self.advance();
            let right = self.parse_unary()?;
            left = merge(left, right, Condition::And);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<RuleSet, ParseError> {
        if !self.check_symbol('!') {
            return self.parse_primary();
        }
        self.advance();
        self.enter()?;
        let mut inner = self.parse_unary()?;
        self.leave();
        if inner.name.is_some() && self.schema.resolver().is_some() {
            // Negate a resolved reference from outside so its stored `not`
            // stays tied to the name.
            return Ok(RuleSet::with_rules(Condition::And, vec![inner.into()]).negated(true));
        }
        inner.not = !inner.not;
        Ok(inner)
    }

    fn parse_primary(&mut self) -> Result<RuleSet, ParseError> {
        let tok = self.peek().ok_or(ParseError::UnexpectedEnd)?;

        if tok.is_symbol('(') {
            self.advance();
            self.enter()?;
            let mut expr = self.parse_expression()?;
            if !self.check_symbol(')') {
                return Err(ParseError::MissingClosingParen);
            }
            self.advance();
            self.leave();
            expr.is_child = true;
            return Ok(expr);
        }

        if tok.kind == TokenKind::Word && is_ruleset_name(&tok.text) {
            self.advance();
            return Ok(self.reference(&tok.text));
        }

        if !tok.is_literal() {
            self.advance();
            return Err(self.unexpected(tok));
        }

        let rule = self.parse_rule()?;
        Ok(RuleSet::with_rules(Condition::And, vec![rule.into()]))
    }

    /// A named reference, expanded from the store when it resolves.
    fn reference(&self, name: &str) -> RuleSet {
        match resolve_named(self.schema, name) {
            Some(stored) => stored.named(name),
            None => RuleSet::reference(name),
        }
    }

    fn next_is_operator(&self) -> bool {
        self.peek().is_some_and(|t| match t.kind {
            TokenKind::Operator => true,
            TokenKind::Word => is_keyword_operator(&t.text),
            TokenKind::Symbol | TokenKind::Quoted => false,
        })
    }

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let first = self.advance().ok_or(ParseError::UnexpectedEnd)?;

        if !self.next_is_operator() {
            let value = coerce_value(first, crate::DOCUMENT_FIELD, self.schema);
            return Ok(Rule::document(value));
        }

        let field = first.text.as_str();
        let op_tok = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        let mut operator = if op_tok.kind == TokenKind::Word
            || op_tok.text.trim_start_matches('!').chars().all(|c| c.is_ascii_alphabetic())
        {
            op_tok.text.to_ascii_lowercase()
        } else {
            op_tok.text.clone()
        };

        match operator.as_str() {
            "not" if self.check_word("in") => {
                self.advance();
                operator = "not in".to_owned();
            }
            "is" if self.check_word("null") => {
                self.advance();
                return Ok(Rule::unary(field, "is null"));
            }
            "is" if self.check_word("not") && self.peek_word_at(1, "null") => {
                self.advance();
                self.advance();
                return Ok(Rule::unary(field, "is not null"));
            }
            _ => {}
        }

        if is_list_operator(&operator) && self.check_symbol('(') {
            self.advance();
            let values = self.parse_value_list(field)?;
            return Ok(Rule::new(field, &operator, values));
        }

        let value_tok = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        if !value_tok.is_literal() {
            return Err(self.unexpected(value_tok));
        }
        let value = coerce_value(value_tok, field, self.schema);
        Ok(Rule::new(field, &operator, value))
    }

    fn peek_word_at(&self, offset: usize, word: &str) -> bool {
        self.tokens
            .get(self.position + offset)
            .is_some_and(|t| t.kind == TokenKind::Word && t.text.eq_ignore_ascii_case(word))
    }

    /// The literals of an IN list, after its opening parenthesis.
    fn parse_value_list(&mut self, field: &str) -> Result<Vec<crate::Value>, ParseError> {
        let mut values = Vec::new();
        while let Some(tok) = self.peek() {
            if tok.is_symbol(')') {
                break;
            }
            self.advance();
            if !tok.is_literal() {
                return Err(self.unexpected(tok));
            }
            values.push(coerce_value(tok, field, self.schema));
            if self.check_symbol(',') {
                self.advance();
            }
        }
        if !self.check_symbol(')') {
            return Err(ParseError::MissingClosingParen);
        }
        self.advance();
        if values.is_empty() {
            return Err(ParseError::EmptyInList);
        }
        Ok(values)
    }
}

/// Combine two operands under `cond`, flattening into `left` when neither
/// side carries negation, a name or explicit parentheses. A right operand
/// joined by the other connective stays one nested child.
pub(crate) fn merge(mut left: RuleSet, right: RuleSet, cond: Condition) -> RuleSet {
    let both_plain = left.is_plain() && right.is_plain();

    if both_plain && left.condition == cond {
        if right.condition == cond || right.rules.len() == 1 {
            left.rules.extend(right.rules);
        } else {
            left.rules.push(Node::RuleSet(right));
        }
        return left;
    }

    if both_plain
        && cond == Condition::Or
        && left.condition == Condition::And
        && right.condition == Condition::And
        && left.rules.len() == 1
        && right.rules.len() == 1
    {
        let mut rules = left.rules;
        rules.extend(right.rules);
        return RuleSet::with_rules(Condition::Or, rules);
    }

    RuleSet::with_rules(cond, vec![Node::RuleSet(left), Node::RuleSet(right)])
}
