//! Recursive-descent parser: token stream to [`Equation`].
//!
//! One token of lookahead, plus a second peek to tell a priority clause
//! `(@n)` from a parenthesised constant list. No resolution happens here.
use crate::ast::{Equation, DEFAULT_PRIORITY};
use crate::error::{CompileError, ParseError};
use crate::lexer::{self, Spanned, Token};

mod terms;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    fn cur_pos(&self) -> usize {
        self.cur().pos
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, expected: &'static str) -> ParseError {
        ParseError::Expected {
            expected,
            found: self.peek().to_string(),
            pos: self.cur_pos(),
        }
    }

    /// Consume the `)` matching the `(` at `open`. Running out of input is
    /// reported as an unbalanced paren rather than a generic expectation.
    fn expect_close(&mut self, open: usize) -> Result<(), ParseError> {
        match self.peek() {
            Token::CloseParen => {
                self.advance();
                Ok(())
            }
            Token::Eof => Err(ParseError::UnbalancedParen(open)),
            _ => Err(self.err("')'")),
        }
    }

    /// A number with an optional detached sign (`- 5`). Signs written flush
    /// against the digits were already folded in by the lexer.
    fn take_signed_number(&mut self, expected: &'static str) -> Result<f64, ParseError> {
        let negate = match self.peek() {
            Token::Minus if matches!(self.peek_at(1), Token::Number(_)) => {
                self.advance();
                true
            }
            Token::Plus if matches!(self.peek_at(1), Token::Number(_)) => {
                self.advance();
                false
            }
            _ => false,
        };
        match self.peek() {
            Token::Number(n) => {
                let n = *n;
                self.advance();
                Ok(if negate { -n } else { n })
            }
            _ => Err(self.err(expected)),
        }
    }

    fn starts_signed_number(&self) -> bool {
        match self.peek() {
            Token::Number(_) => true,
            Token::Minus | Token::Plus => matches!(self.peek_at(1), Token::Number(_)),
            _ => false,
        }
    }

    // -- Equation ------------------------------------------------

    fn parse_equation(&mut self) -> Result<Equation, ParseError> {
        let left = self.parse_left_term()?;

        let relation = match self.peek() {
            Token::Relation(r) => *r,
            Token::Star => return Err(self.err("relation (multipliers belong on the right)")),
            _ => return Err(self.err("relation")),
        };
        self.advance();

        let priority = self.parse_priority()?;
        let right = self.parse_right_term()?;

        match self.peek() {
            Token::Eof => {}
            Token::CloseParen => return Err(ParseError::UnbalancedParen(self.cur_pos())),
            _ => return Err(self.err("end of equation")),
        }

        Ok(Equation {
            left,
            relation,
            priority,
            right,
        })
    }

    /// `'(' '@' number ')'` directly after the relation.
    fn parse_priority(&mut self) -> Result<u16, ParseError> {
        if !(self.peek() == &Token::OpenParen && self.peek_at(1) == &Token::At) {
            return Ok(DEFAULT_PRIORITY);
        }
        let open = self.cur_pos();
        self.advance(); // (
        self.advance(); // @
        let value_pos = self.cur_pos();
        let value = self.take_signed_number("priority value")?;
        if value.fract() != 0.0 || !(1.0..=1000.0).contains(&value) {
            return Err(ParseError::PriorityOutOfRange {
                value,
                pos: value_pos,
            });
        }
        self.expect_close(open)?;
        Ok(value as u16)
    }
}

/// Parse a token stream produced by [`lexer::lex`].
pub fn parse(tokens: &[Spanned]) -> Result<Equation, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Expected {
            expected: "equation",
            found: Token::Eof.to_string(),
            pos: 0,
        });
    }
    Parser::new(tokens).parse_equation()
}

/// Lex and parse one equation string.
pub fn parse_str(src: &str) -> Result<Equation, CompileError> {
    let tokens = lexer::lex(src)?;
    Ok(parse(&tokens)?)
}
