//! Parser for query expressions.
//!
//! Accepts a single call chain rooted at one identifier:
//! `root.method(arg, ...).method(...)...`. Arguments are literals only:
//! strings, numbers, booleans, null, arrays, and `{key: value}` objects.

use crate::error::{PlayError, Result};
use serde_json::{Map, Value};

use super::token::{tokenize, Spanned, Token};

/// One method call in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Value>,
}

/// A parsed expression: the root identifier and the calls applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallChain {
    pub root: String,
    pub calls: Vec<Call>,
}

/// Parses an expression string into a call chain.
pub fn parse(input: &str) -> Result<CallChain> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let chain = parser.chain()?;

    if let Some(extra) = parser.peek() {
        return Err(PlayError::expression(format!(
            "unexpected {} after the call chain",
            extra.token.describe()
        )));
    }

    Ok(chain)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<()> {
        match self.next() {
            Some(spanned) if &spanned.token == expected => Ok(()),
            Some(spanned) => Err(PlayError::expression(format!(
                "expected {} {context}, found {}",
                expected.describe(),
                spanned.token.describe()
            ))),
            None => Err(PlayError::expression(format!(
                "expected {} {context}, found end of expression",
                expected.describe()
            ))),
        }
    }

    fn ident(&mut self, context: &str) -> Result<String> {
        match self.next() {
            Some(Spanned {
                token: Token::Ident(name),
                ..
            }) => Ok(name),
            Some(spanned) => Err(PlayError::expression(format!(
                "expected an identifier {context}, found {}",
                spanned.token.describe()
            ))),
            None => Err(PlayError::expression(format!(
                "expected an identifier {context}, found end of expression"
            ))),
        }
    }

    fn chain(&mut self) -> Result<CallChain> {
        let root = self.ident("at the start of the expression")?;
        let mut calls = Vec::new();

        while self.peek().is_some() {
            self.expect(&Token::Dot, "between calls")?;
            let method = self.ident("after '.'")?;
            self.expect(&Token::LParen, &format!("after '{method}'"))?;
            let args = self.args(&method)?;
            calls.push(Call { method, args });
        }

        Ok(CallChain { root, calls })
    }

    /// Parses a parenthesized argument list, consuming the closing paren.
    fn args(&mut self, method: &str) -> Result<Vec<Value>> {
        let mut args = Vec::new();

        if matches!(
            self.peek(),
            Some(Spanned {
                token: Token::RParen,
                ..
            })
        ) {
            self.next();
            return Ok(args);
        }

        loop {
            args.push(self.literal()?);
            match self.next() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RParen,
                    ..
                }) => return Ok(args),
                Some(spanned) => {
                    return Err(PlayError::expression(format!(
                        "expected ',' or ')' in {method}() arguments, found {}",
                        spanned.token.describe()
                    )));
                }
                None => {
                    return Err(PlayError::expression(format!(
                        "unterminated argument list for {method}()"
                    )));
                }
            }
        }
    }

    fn literal(&mut self) -> Result<Value> {
        match self.next() {
            Some(Spanned {
                token: Token::Str(s),
                ..
            }) => Ok(Value::String(s)),
            Some(Spanned {
                token: Token::Num(n),
                ..
            }) => Ok(Value::Number(n)),
            Some(Spanned {
                token: Token::Ident(name),
                ..
            }) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(PlayError::expression(format!(
                    "'{other}' is not a literal; only strings, numbers, booleans, null, arrays and objects are allowed as arguments"
                ))),
            },
            Some(Spanned {
                token: Token::LBracket,
                ..
            }) => self.array(),
            Some(Spanned {
                token: Token::LBrace,
                ..
            }) => self.object(),
            Some(spanned) => Err(PlayError::expression(format!(
                "expected a literal argument, found {}",
                spanned.token.describe()
            ))),
            None => Err(PlayError::expression(
                "expected a literal argument, found end of expression",
            )),
        }
    }

    /// Parses an array literal, the opening bracket already consumed.
    fn array(&mut self) -> Result<Value> {
        let mut items = Vec::new();

        if matches!(
            self.peek(),
            Some(Spanned {
                token: Token::RBracket,
                ..
            })
        ) {
            self.next();
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.literal()?);
            match self.next() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RBracket,
                    ..
                }) => return Ok(Value::Array(items)),
                Some(spanned) => {
                    return Err(PlayError::expression(format!(
                        "expected ',' or ']' in an array literal, found {}",
                        spanned.token.describe()
                    )));
                }
                None => {
                    return Err(PlayError::expression("unterminated array literal"));
                }
            }
        }
    }

    /// Parses an object literal, the opening brace already consumed.
    fn object(&mut self) -> Result<Value> {
        let mut map = Map::new();

        if matches!(
            self.peek(),
            Some(Spanned {
                token: Token::RBrace,
                ..
            })
        ) {
            self.next();
            return Ok(Value::Object(map));
        }

        loop {
            let key = match self.next() {
                Some(Spanned {
                    token: Token::Ident(name),
                    ..
                }) => name,
                Some(Spanned {
                    token: Token::Str(s),
                    ..
                }) => s,
                Some(spanned) => {
                    return Err(PlayError::expression(format!(
                        "expected a key in an object literal, found {}",
                        spanned.token.describe()
                    )));
                }
                None => {
                    return Err(PlayError::expression("unterminated object literal"));
                }
            };

            self.expect(&Token::Colon, "after an object key")?;
            let value = self.literal()?;
            map.insert(key, value);

            match self.next() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RBrace,
                    ..
                }) => return Ok(Value::Object(map)),
                Some(spanned) => {
                    return Err(PlayError::expression(format!(
                        "expected ',' or '}}' in an object literal, found {}",
                        spanned.token.describe()
                    )));
                }
                None => {
                    return Err(PlayError::expression("unterminated object literal"));
                }
            }
        }
    }
}
