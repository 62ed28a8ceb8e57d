//! Tokenizer for query expressions.
//!
//! Splits an expression like `supabase.from('users').select('id,name')`
//! into tokens: identifiers, punctuation, and literal strings/numbers.
//! Both single and double quotes are accepted, with escape sequences.

use crate::error::{PlayError, Result};
use serde_json::Number;

/// A token scanned from an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An identifier (`supabase`, `from`, `true`, ...).
    Ident(String),
    /// A quoted string literal, unescaped.
    Str(String),
    /// A numeric literal.
    Num(Number),
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl Token {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("'{name}'"),
            Self::Str(_) => "a string".to_string(),
            Self::Num(n) => format!("'{n}'"),
            Self::Dot => "'.'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Colon => "':'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::LBracket => "'['".to_string(),
            Self::RBracket => "']'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
        }
    }
}

/// A token together with its byte position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Tokenizes an expression string.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '.' => {
                chars.next();
                Token::Dot
            }
            ',' => {
                chars.next();
                Token::Comma
            }
            ':' => {
                chars.next();
                Token::Colon
            }
            '(' => {
                chars.next();
                Token::LParen
            }
            ')' => {
                chars.next();
                Token::RParen
            }
            '[' => {
                chars.next();
                Token::LBracket
            }
            ']' => {
                chars.next();
                Token::RBracket
            }
            '{' => {
                chars.next();
                Token::LBrace
            }
            '}' => {
                chars.next();
                Token::RBrace
            }
            '\'' | '"' => {
                chars.next();
                Token::Str(collect_quoted(&mut chars, c, pos)?)
            }
            c if c.is_ascii_digit() => Token::Num(collect_number(&mut chars, pos)?),
            '-' => Token::Num(collect_number(&mut chars, pos)?),
            c if is_ident_start(c) => Token::Ident(collect_ident(&mut chars)),
            other => {
                return Err(PlayError::expression(format!(
                    "unexpected character '{other}' at position {}",
                    pos + 1
                )));
            }
        };

        tokens.push(Spanned { token, pos });
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Collects an identifier starting at the current position.
fn collect_ident(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_ident_continue(c) {
            break;
        }
        chars.next();
        ident.push(c);
    }
    ident
}

/// Collects characters inside quotes, handling escape sequences.
fn collect_quoted(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> Result<String> {
    let mut result = String::new();
    let mut escaped = false;

    for (_, c) in chars.by_ref() {
        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                other => result.push(other),
            }
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok(result);
        } else {
            result.push(c);
        }
    }

    Err(PlayError::expression(format!(
        "unterminated string starting at position {}",
        start + 1
    )))
}

/// Collects a numeric literal (integer, decimal, optional exponent).
fn collect_number(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<Number> {
    let mut text = String::new();

    if let Some(&(_, '-')) = chars.peek() {
        chars.next();
        text.push('-');
    }

    let mut saw_digit = false;
    let mut saw_fraction = false;
    let mut saw_exponent = false;

    while let Some(&(_, c)) = chars.peek() {
        match c {
            d if d.is_ascii_digit() => {
                saw_digit = true;
                text.push(d);
                chars.next();
            }
            '.' if !saw_fraction && !saw_exponent => {
                saw_fraction = true;
                text.push('.');
                chars.next();
            }
            'e' | 'E' if saw_digit && !saw_exponent => {
                saw_exponent = true;
                text.push(c);
                chars.next();
                if let Some(&(_, sign @ ('+' | '-'))) = chars.peek() {
                    text.push(sign);
                    chars.next();
                }
            }
            _ => break,
        }
    }

    if !saw_digit {
        return Err(PlayError::expression(format!(
            "malformed number at position {}",
            start + 1
        )));
    }

    if !saw_fraction && !saw_exponent {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Number::from(n));
        }
    }

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| {
            PlayError::expression(format!("malformed number '{text}' at position {}", start + 1))
        })
}
