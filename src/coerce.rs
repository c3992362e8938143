//! Literal-to-value coercion driven by the field schema.

use chrono::{DateTime, NaiveDate};

use crate::parse::{Token, TokenKind};
use crate::{FieldType, Schema, Value};

/// Convert a literal token to a typed value for `field`.
///
/// Quoted strings are taken verbatim. Bare words follow the field's declared
/// type: `number` parses as a number, `boolean` is `true` only for the word
/// `true`, `date` parses as a calendar date. A word that does not parse as its
/// field's type, or belongs to an unknown field, stays a string; strict
/// validation then rejects it.
#[must_use]
pub fn coerce_value<S: Schema + ?Sized>(token: &Token, field: &str, schema: &S) -> Value {
    if token.kind == TokenKind::Quoted {
        return Value::String(token.text.clone());
    }
    let Some(config) = schema.field(field) else {
        return Value::String(token.text.clone());
    };
    coerce_word(&token.text, config.field_type)
}

/// Coerce a bare word to `field_type`.
#[must_use]
pub fn coerce_word(word: &str, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Number => parse_number(word).map_or_else(|| Value::from(word), Value::Number),
        FieldType::Boolean => Value::Bool(word == "true"),
        FieldType::Date => parse_date(word).map_or_else(|| Value::from(word), Value::Date),
        _ => Value::from(word),
    }
}

fn parse_number(word: &str) -> Option<f64> {
    word.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_date(word: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(word, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(word).ok().map(|dt| dt.date_naive()))
}
