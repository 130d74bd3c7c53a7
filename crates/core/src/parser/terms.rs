use super::Parser;
use crate::ast::{
    is_reserved_word, AttributeName, ConstantEntry, LeftTerm, MultiplierPosition, RightTerm,
    ViewPath, ViewRef,
};
use crate::error::ParseError;
use crate::lexer::Token;

/// Largest `$n` accepted; larger numbers are not exact in the lexer's `f64`.
const MAX_VIEW_INDEX: f64 = u32::MAX as f64;

impl<'a> Parser<'a> {
    // -- Operands ------------------------------------------------

    pub(super) fn parse_left_term(&mut self) -> Result<LeftTerm, ParseError> {
        if self.peek() != &Token::Dollar {
            return Err(self.err("'$' view reference"));
        }
        let (view, attributes) = self.parse_view_operand()?;
        if attributes.is_empty() {
            return Err(self.err("attribute"));
        }
        Ok(LeftTerm { view, attributes })
    }

    /// `'$' viewRef ('.' segment)* ('.' attrSpec)?`
    ///
    /// Dotted identifiers are key-path segments until an attribute keyword
    /// that is not itself followed by `.`, or a parenthesised attribute
    /// list, ends the operand. The returned attribute list is empty when
    /// no attribute was written.
    fn parse_view_operand(&mut self) -> Result<(ViewPath, Vec<AttributeName>), ParseError> {
        let start = self.cur_pos();
        self.advance(); // $
        let root = match self.peek().clone() {
            Token::Identifier(w) if w == "self" => ViewRef::SelfRef,
            Token::Identifier(w) if w == "all" => ViewRef::AllRef,
            Token::Identifier(w) if !is_reserved_word(&w) => ViewRef::NameRef(w),
            Token::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= MAX_VIEW_INDEX => {
                ViewRef::IndexRef(n as usize)
            }
            _ => return Err(self.err("view name or index")),
        };
        self.advance();

        let mut key_path = Vec::new();
        let mut attributes = Vec::new();
        while self.peek() == &Token::Dot {
            match self.peek_at(1).clone() {
                Token::OpenParen => {
                    self.advance(); // .
                    attributes = self.parse_attribute_list()?;
                    break;
                }
                Token::Identifier(w) => {
                    self.advance(); // .
                    let keyword = AttributeName::from_keyword(&w);
                    let continues = self.peek_at(1) == &Token::Dot;
                    self.advance();
                    match keyword {
                        Some(attr) if !continues => {
                            attributes.push(attr);
                            break;
                        }
                        _ => key_path.push(w),
                    }
                }
                _ => {
                    self.advance(); // .
                    return Err(self.err("attribute or key path segment"));
                }
            }
        }

        Ok((ViewPath::new(root, key_path, start), attributes))
    }

    /// `'(' attrName (',' attrName)* ')'`
    fn parse_attribute_list(&mut self) -> Result<Vec<AttributeName>, ParseError> {
        let open = self.cur_pos();
        self.advance(); // (
        let mut attributes = Vec::new();
        loop {
            match self.peek().clone() {
                Token::Identifier(w) => match AttributeName::from_keyword(&w) {
                    Some(attr) => {
                        attributes.push(attr);
                        self.advance();
                    }
                    None => return Err(self.err("attribute name")),
                },
                Token::Eof => return Err(ParseError::UnbalancedParen(open)),
                _ => return Err(self.err("attribute name")),
            }
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                _ => {
                    self.expect_close(open)?;
                    return Ok(attributes);
                }
            }
        }
    }

    // -- Right-hand side -----------------------------------------

    pub(super) fn parse_right_term(&mut self) -> Result<RightTerm, ParseError> {
        let mut term = match self.peek().clone() {
            Token::Dollar => {
                let (view, attributes) = self.parse_view_operand()?;
                let mut term = RightTerm::new(Some(view), attributes);
                if self.peek() == &Token::Star {
                    self.advance();
                    term.multiplier = self.take_signed_number("multiplier")?;
                    term.multiplier_position = MultiplierPosition::After;
                }
                term
            }
            _ if self.starts_signed_number() => {
                let value = self.take_signed_number("number")?;
                if self.peek() != &Token::OpenParen {
                    // pure constant equation: nothing may follow
                    let mut term = RightTerm::new(None, Vec::new());
                    term.constants = vec![ConstantEntry::Value(value)];
                    return self.finish_right_term(term);
                }
                let open = self.cur_pos();
                self.advance(); // (
                if self.peek() != &Token::Dollar {
                    return Err(self.err("'$' view reference"));
                }
                let (view, attributes) = self.parse_view_operand()?;
                self.expect_close(open)?;
                let mut term = RightTerm::new(Some(view), attributes);
                term.multiplier = value;
                term.multiplier_position = MultiplierPosition::Before;
                term
            }
            Token::OpenParen => {
                let mut term = RightTerm::new(None, Vec::new());
                term.constants = self.parse_constant_list()?;
                return self.finish_right_term(term);
            }
            _ => return Err(self.err("right-hand term")),
        };

        let negate = match self.peek() {
            Token::Plus => false,
            Token::Minus => true,
            Token::Star => return Err(self.err("constant or end of equation")),
            _ => return Ok(term),
        };
        self.advance();
        let constants = if self.peek() == &Token::OpenParen {
            self.parse_constant_list()?
        } else {
            vec![ConstantEntry::Value(self.take_signed_number("constant")?)]
        };
        term.constants = if negate {
            constants
                .into_iter()
                .map(|c| match c {
                    ConstantEntry::Value(v) => ConstantEntry::Value(-v),
                    ConstantEntry::Skip => ConstantEntry::Skip,
                })
                .collect()
        } else {
            constants
        };
        self.finish_right_term(term)
    }

    /// A multiplier may not follow the constant.
    fn finish_right_term(&mut self, term: RightTerm) -> Result<RightTerm, ParseError> {
        if self.peek() == &Token::Star {
            return Err(ParseError::MultiplierAfterConstant(self.cur_pos()));
        }
        Ok(term)
    }

    /// `'(' constEntry (',' constEntry)* ')'`, where `constEntry` is a number
    /// or the `-` skip marker.
    fn parse_constant_list(&mut self) -> Result<Vec<ConstantEntry>, ParseError> {
        let open = self.cur_pos();
        self.advance(); // (
        let mut entries = Vec::new();
        loop {
            match self.peek() {
                Token::Dash => {
                    self.advance();
                    entries.push(ConstantEntry::Skip);
                }
                Token::Eof => return Err(ParseError::UnbalancedParen(open)),
                _ => entries.push(ConstantEntry::Value(
                    self.take_signed_number("constant or '-'")?,
                )),
            }
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                _ => {
                    self.expect_close(open)?;
                    return Ok(entries);
                }
            }
        }
    }
}
