//! Tokenizer for DDL text. Restartable from an input string only; holds no
//! state beyond the borrow of the source it is constructed from.

use serde::{Deserialize, Serialize};

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Operator,
    Whitespace,
    Comment,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: usize,
}

/// A single-pass tokenizer over a borrowed `&str`. Each call to `next_token`
/// advances an internal byte offset; there is no other mutable state, so a
/// `Lexer` can be dropped and a fresh one created from the same string with
/// identical results (no restart penalty beyond re-scanning).
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the whole input in one pass, including a trailing `Eof` token.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                value: String::new(),
                start,
            });
        };

        if c.is_ascii_whitespace() {
            return Ok(self.lex_whitespace(start));
        }

        if c == b'-' && self.peek_at(1) == Some(b'-') {
            return Ok(self.lex_line_comment(start));
        }

        if c == b'/' && self.peek_at(1) == Some(b'*') {
            return self.lex_block_comment(start);
        }

        if c == b';' {
            self.pos += 1;
            return Ok(Token {
                kind: TokenKind::Semicolon,
                value: ";".to_string(),
                start,
            });
        }

        if c == b'\'' || c == b'"' {
            return self.lex_string(start, c);
        }

        if c.is_ascii_digit() {
            return Ok(self.lex_number(start));
        }

        if is_identifier_start(c) {
            return Ok(self.lex_identifier(start));
        }

        Ok(self.lex_operator(start))
    }

    fn lex_whitespace(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Whitespace,
            value: self.slice(start),
            start,
        }
    }

    fn lex_line_comment(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if c == b'\n' {
                break;
            }
            self.pos += 1;
        }
        Token {
            kind: TokenKind::Comment,
            value: self.slice(start),
            start,
        }
    }

    fn lex_block_comment(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 2; // consume `/*`
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        offset: start,
                        message: "unterminated block comment".to_string(),
                    })
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.pos += 2;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(Token {
            kind: TokenKind::Comment,
            value: self.slice(start),
            start,
        })
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> Result<Token, LexError> {
        self.pos += 1; // consume opening quote
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        offset: start,
                        message: "unterminated string literal".to_string(),
                    })
                }
                Some(c) if c == quote => {
                    // A doubled quote is an escaped quote inside the string.
                    if self.peek_at(1) == Some(quote) {
                        self.pos += 2;
                        continue;
                    }
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(Token {
            kind: TokenKind::String,
            value: self.slice(start),
            start,
        })
    }

    fn lex_number(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Number,
            value: self.slice(start),
            start,
        }
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if is_identifier_continue(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Identifier,
            value: self.slice(start),
            start,
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        self.pos += 1;
        Token {
            kind: TokenKind::Operator,
            value: self.slice(start),
            start,
        }
    }

    fn slice(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }
}

fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_identifier_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

/// True if a token's text parses as a number, even if the lexer classified
/// it as `Operator` (a bare sign prefix, for instance). The parser copes
/// with simple lexers this way instead of requiring a smarter lexer.
pub fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_create_table() {
        let tokens = Lexer::tokenize("CREATE TABLE users (id SERIAL);").unwrap();
        let idents: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(idents, vec!["CREATE", "TABLE", "users", "id", "SERIAL"]);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn handles_doubled_quote_escape() {
        let tokens = Lexer::tokenize("'it''s'").unwrap();
        let string_tok = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string_tok.value, "'it''s'");
    }

    #[test]
    fn handles_double_quoted_identifiers() {
        let tokens = Lexer::tokenize("\"My Table\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "\"My Table\"");
    }

    #[test]
    fn line_and_block_comments() {
        let tokens = Lexer::tokenize("-- hi\n/* block\ncomment */ x").unwrap();
        assert_eq!(
            kinds("-- hi\n/* block\ncomment */ x"),
            vec![
                TokenKind::Comment,
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
        assert!(tokens.iter().any(|t| t.value.starts_with("-- hi")));
    }

    #[test]
    fn unterminated_string_errors_with_offset() {
        let err = Lexer::tokenize("'abc").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let err = Lexer::tokenize("/* never closed").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn empty_statement_is_just_a_semicolon() {
        assert_eq!(kinds(";"), vec![TokenKind::Semicolon, TokenKind::Eof]);
    }

    #[test]
    fn is_numeric_accepts_signed_and_decimal() {
        assert!(is_numeric("42"));
        assert!(is_numeric("-3.5"));
        assert!(!is_numeric("abc"));
    }
}
