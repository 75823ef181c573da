// klam-reader - Parser for KLambda source
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser.
//!
//! Converts tokens into `KlamVal` forms built only from Number, String,
//! Symbol, Empty and Cons.

use thiserror::Error;

use crate::lexer::{Lexer, LexerError, Token};
use crate::value::KlamVal;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// The parser converts tokens into forms.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source code.
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let line = lexer.line();
        let column = lexer.column();
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            line,
            column,
        })
    }

    /// Parse a single form from the source.
    /// Returns None if at end of input.
    pub fn parse(&mut self) -> Result<Option<KlamVal>, ParseError> {
        if matches!(self.current, Token::Eof) {
            return Ok(None);
        }
        let val = self.parse_form()?;
        Ok(Some(val))
    }

    /// Parse all forms from the source.
    pub fn parse_all(&mut self) -> Result<Vec<KlamVal>, ParseError> {
        let mut forms = Vec::new();
        while let Some(form) = self.parse()? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Parse a string and return the first form (convenience function).
    pub fn parse_str(source: &str) -> Result<Option<KlamVal>, ParseError> {
        let mut parser = Parser::new(source)?;
        parser.parse()
    }

    /// Parse a string and return all forms (convenience function).
    pub fn parse_all_str(source: &str) -> Result<Vec<KlamVal>, ParseError> {
        let mut parser = Parser::new(source)?;
        parser.parse_all()
    }

    // ========================================================================
    // Internal parsing methods
    // ========================================================================

    fn advance(&mut self) -> Result<Token, ParseError> {
        let prev = std::mem::replace(&mut self.current, Token::Eof);
        // Capture position of the next token before fetching it
        self.line = self.lexer.line();
        self.column = self.lexer.column();
        self.current = self.lexer.next_token()?;
        Ok(prev)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn parse_form(&mut self) -> Result<KlamVal, ParseError> {
        let (line, column) = (self.line, self.column);
        match self.advance()? {
            Token::Number(n) => Ok(KlamVal::Number(n)),
            Token::String(s) => Ok(KlamVal::string(&s)),
            Token::Symbol(s) => Ok(KlamVal::symbol(&s)),
            Token::LParen => self.parse_list(line, column),
            Token::RParen => Err(self.error("unexpected ')'")),
            Token::Eof => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_list(&mut self, line: usize, column: usize) -> Result<KlamVal, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.current {
                Token::RParen => {
                    self.advance()?;
                    return Ok(KlamVal::list(items));
                }
                Token::Eof => {
                    return Err(ParseError {
                        message: "unclosed '('".to_string(),
                        line,
                        column,
                    });
                }
                _ => items.push(self.parse_form()?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> KlamVal {
        Parser::parse_str(s).unwrap().unwrap()
    }

    #[test]
    fn test_atoms() {
        assert_eq!(parse("12"), KlamVal::Number(12.0));
        assert_eq!(parse("\"str\""), KlamVal::string("str"));
        assert_eq!(parse("foo"), KlamVal::symbol("foo"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(parse("()"), KlamVal::Empty);
    }

    #[test]
    fn test_nested_list() {
        let form = parse("(defun f (X) (+ X 1))");
        assert_eq!(form.to_string(), "[defun f [X] [+ X 1]]");
        assert_eq!(form.list_len(), Some(4));
    }

    #[test]
    fn test_parse_all() {
        let forms = Parser::parse_all_str("1 (a) \"b\"").unwrap();
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[1].to_string(), "[a]");
    }

    #[test]
    fn test_errors() {
        let err = Parser::parse_str("(a (b)").unwrap_err();
        assert_eq!(err.message, "unclosed '('");
        assert_eq!((err.line, err.column), (1, 1));

        let err = Parser::parse_str(")").unwrap_err();
        assert_eq!(err.message, "unexpected ')'");
    }

    #[test]
    fn test_end_of_input() {
        let mut parser = Parser::new("  ").unwrap();
        assert_eq!(parser.parse().unwrap(), None);
    }
}
