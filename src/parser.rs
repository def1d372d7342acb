// src/parser.rs
use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidSyntax(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidSyntax(msg) => f.write_str(msg),
        }
    }
}

/// Character cursor over an expression string.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn error(&self, msg: impl fmt::Display) -> ParseError {
        ParseError::InvalidSyntax(format!("{msg} at offset {}", self.i))
    }

    pub fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        match self.peek_char() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => self.i += 1,
            _ => return Err(self.error("identifier expected")),
        }
        self.eat_word();
        Ok(self.s[start..self.i].to_string())
    }

    /// Field reference: an identifier optionally followed by `.segment`
    /// parts (`author.name`, `tags.0`).
    pub fn parse_reference(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        self.parse_identifier()?;
        while self.peek_char() == Some('.') {
            self.i += 1;
            let seg_start = self.i;
            self.eat_word();
            if self.i == seg_start {
                return Err(self.error("field segment expected after '.'"));
            }
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn eat_word(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.i - start
    }

    /// Unsigned number literal: `12`, `1.5`, `.5`, `2e3`. Integers that fit
    /// in `i64` stay integers.
    pub fn parse_number_literal(&mut self) -> Result<Value, ParseError> {
        let start = self.i;
        let mut is_float = false;
        let int_digits = self.eat_digits();
        if self.peek_char() == Some('.') {
            self.i += 1;
            is_float = true;
            if self.eat_digits() == 0 && int_digits == 0 {
                return Err(self.error("number expected"));
            }
        } else if int_digits == 0 {
            return Err(self.error("number expected"));
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            self.i += 1;
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.i += 1;
            }
            if self.eat_digits() == 0 {
                return Err(self.error("exponent digits expected"));
            }
            is_float = true;
        }
        let s = &self.s[start..self.i];
        if !is_float {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::from(i));
            }
        }
        let f: f64 = s.parse().map_err(|_| self.error("bad number"))?;
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| self.error("number out of range"))
    }

    pub fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let quote = self.peek_char().ok_or_else(|| self.error("string expected"))?;
        if quote != '\'' && quote != '"' {
            return Err(self.error("expected quoted string"));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(self.error("unterminated string"))
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn consume_str(&mut self, lit: &str) -> bool {
        if self.peek_str(lit) {
            self.i += lit.len();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
