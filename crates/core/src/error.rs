use std::fmt;

/// Scanner failure. Offsets are character positions in the equation string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{1}' at offset {0}")]
    UnexpectedChar(usize, char),
}

impl LexError {
    pub fn pos(&self) -> usize {
        match self {
            LexError::UnexpectedChar(pos, _) => *pos,
        }
    }
}

/// Grammar violation found while parsing a token stream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} at offset {pos}, got {found}")]
    Expected {
        expected: &'static str,
        found: String,
        pos: usize,
    },

    #[error("unbalanced parenthesis at offset {0}")]
    UnbalancedParen(usize),

    /// The multiplier must always precede the constant.
    #[error("multiplier after constant at offset {0}")]
    MultiplierAfterConstant(usize),

    #[error("priority {value} at offset {pos} is not an integer in 1..=1000")]
    PriorityOutOfRange { value: f64, pos: usize },
}

impl ParseError {
    pub fn pos(&self) -> usize {
        match self {
            ParseError::Expected { pos, .. } => *pos,
            ParseError::UnbalancedParen(pos) => *pos,
            ParseError::MultiplierAfterConstant(pos) => *pos,
            ParseError::PriorityOutOfRange { pos, .. } => *pos,
        }
    }
}

/// A view reference that could not be mapped to a view handle. `pos` is
/// the offset of the reference's `$`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown view '${name}' at offset {pos}")]
    UnknownView { name: String, pos: usize },

    #[error("key path segment '{segment}' at offset {pos} does not resolve to a view")]
    KeyPathNotAView { segment: String, pos: usize },

    /// A named substitution collection used `self`, `all` or an attribute
    /// name as a key.
    #[error("'{0}' is reserved and cannot name a substitution view")]
    ReservedName(String),
}

impl ResolveError {
    pub fn pos(&self) -> Option<usize> {
        match self {
            ResolveError::UnknownView { pos, .. } => Some(*pos),
            ResolveError::KeyPathNotAView { pos, .. } => Some(*pos),
            ResolveError::ReservedName(_) => None,
        }
    }
}

/// Which list-valued component of an equation failed to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    LeftTargets,
    RightAttributes,
    RightViews,
    Constants,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListKind::LeftTargets => "left-hand targets",
            ListKind::RightAttributes => "right-hand attribute list",
            ListKind::RightViews => "right-hand view list",
            ListKind::Constants => "constant list",
        };
        f.write_str(s)
    }
}

/// A list-valued component whose length cannot be aligned to the target length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    #[error("{component} has {got} entries, expected 1 or {expected}")]
    SizeMismatch {
        component: ListKind,
        expected: usize,
        got: usize,
    },

    #[error("{0} is empty")]
    Empty(ListKind),
}

/// Any failure while compiling a single equation string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

impl CompileError {
    /// Short stage name: `lex`, `parse`, `resolve` or `broadcast`.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "lex",
            CompileError::Parse(_) => "parse",
            CompileError::Resolve(_) => "resolve",
            CompileError::Broadcast(_) => "broadcast",
        }
    }

    /// Character offset into the equation, when the stage tracks one.
    pub fn pos(&self) -> Option<usize> {
        match self {
            CompileError::Lex(e) => Some(e.pos()),
            CompileError::Parse(e) => Some(e.pos()),
            CompileError::Resolve(e) => e.pos(),
            CompileError::Broadcast(_) => None,
        }
    }
}

/// A compile failure tagged with the position of its equation in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationError {
    pub index: usize,
    pub equation: String,
    pub error: CompileError,
}

impl EquationError {
    pub fn new(index: usize, equation: impl Into<String>, error: CompileError) -> Self {
        EquationError {
            index,
            equation: equation.into(),
            error,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    pub fn pos(&self) -> Option<usize> {
        self.error.pos()
    }

    /// Serialize for tooling. All fields are always present (null offset when
    /// the failing stage has none).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "equation": self.equation,
            "index":    self.index,
            "kind":     self.error.kind(),
            "message":  self.error.to_string(),
            "offset":   self.error.pos(),
        })
    }
}

impl fmt::Display for EquationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "equation {} ({:?}): {} error: {}",
            self.index,
            self.equation,
            self.error.kind(),
            self.error
        )
    }
}

impl std::error::Error for EquationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
