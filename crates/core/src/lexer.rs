use crate::ast::Relation;
use crate::error::LexError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `$` -- introduces a view reference
    Dollar,
    /// Identifiers and keywords (`self`, `all`, attribute names) -- distinguished in the parser
    Identifier(String),
    /// Numeric literal, sign already folded in when it was a prefix
    Number(f64),
    // Punctuation
    Dot,
    OpenParen,
    CloseParen,
    Comma,
    At,
    // Operators
    Relation(Relation),
    Plus,
    Minus,
    Star,
    /// `-` standing alone in a constant list: skip this index
    Dash,
    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Dollar => f.write_str("'$'"),
            Token::Identifier(w) => write!(f, "identifier '{}'", w),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Dot => f.write_str("'.'"),
            Token::OpenParen => f.write_str("'('"),
            Token::CloseParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::At => f.write_str("'@'"),
            Token::Relation(r) => write!(f, "'{}'", r),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Dash => f.write_str("skip marker '-'"),
            Token::Eof => f.write_str("end of equation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Character offset of the first character of the token
    pub pos: usize,
}

/// A sign directly in front of a number belongs to the number only where an
/// operand may start; after an operand it is the constant operator.
fn sign_allowed(prev: Option<&Spanned>) -> bool {
    match prev.map(|s| &s.token) {
        None => true,
        Some(Token::Relation(_))
        | Some(Token::OpenParen)
        | Some(Token::Comma)
        | Some(Token::At)
        | Some(Token::Plus)
        | Some(Token::Minus)
        | Some(Token::Star) => true,
        _ => false,
    }
}

fn starts_number(chars: &[char], pos: usize) -> bool {
    match chars.get(pos) {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.get(pos + 1).is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn next_non_blank(chars: &[char], mut pos: usize) -> Option<char> {
    while pos < chars.len() {
        if !chars[pos].is_whitespace() {
            return Some(chars[pos]);
        }
        pos += 1;
    }
    None
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, LexError> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        // Number, with an optional sign folded in
        if starts_number(&chars, pos)
            || ((c == '-' || c == '+')
                && sign_allowed(tokens.last())
                && starts_number(&chars, pos + 1))
        {
            if c == '-' || c == '+' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let text: String = chars[start..pos].iter().collect();
            let n: f64 = text.parse().map_err(|_| LexError::UnexpectedChar(start, c))?;
            tokens.push(Spanned {
                token: Token::Number(n),
                pos: start,
            });
            continue;
        }

        let single = match c {
            '$' => Some(Token::Dollar),
            '.' => Some(Token::Dot),
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            ',' => Some(Token::Comma),
            '@' => Some(Token::At),
            '+' => Some(Token::Plus),
            '*' => Some(Token::Star),
            '=' => Some(Token::Relation(Relation::Equal)),
            '-' => match next_non_blank(&chars, pos + 1) {
                Some(',') | Some(')') => Some(Token::Dash),
                _ => Some(Token::Minus),
            },
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(Spanned { token, pos: start });
            pos += 1;
            continue;
        }

        if (c == '<' || c == '>') && chars.get(pos + 1) == Some(&'=') {
            let relation = if c == '<' {
                Relation::LessOrEqual
            } else {
                Relation::GreaterOrEqual
            };
            tokens.push(Spanned {
                token: Token::Relation(relation),
                pos: start,
            });
            pos += 2;
            continue;
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Identifier(word),
                pos: start,
            });
            continue;
        }

        return Err(LexError::UnexpectedChar(start, c));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: chars.len(),
    });
    Ok(tokens)
}
