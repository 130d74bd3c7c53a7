//! Shared AST types for the equation compiler.
//!
//! These types are produced by the parser and consumed by every later pass.
//! They carry no resolved views: view references stay symbolic until
//! Pass 2.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Priority used when an equation has no `(@n)` clause (required).
pub const DEFAULT_PRIORITY: u16 = 1000;
/// Multiplier used when an equation has none.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;
/// Constant used when an equation has none.
pub const DEFAULT_CONSTANT: f64 = 0.0;

// ──────────────────────────────────────────────
// Relations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ──────────────────────────────────────────────
// Attributes
// ──────────────────────────────────────────────

/// A primitive layout attribute of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
    Baseline,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::Left,
        Attribute::Right,
        Attribute::Top,
        Attribute::Bottom,
        Attribute::Leading,
        Attribute::Trailing,
        Attribute::Width,
        Attribute::Height,
        Attribute::CenterX,
        Attribute::CenterY,
        Attribute::Baseline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Top => "top",
            Attribute::Bottom => "bottom",
            Attribute::Leading => "leading",
            Attribute::Trailing => "trailing",
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::CenterX => "centerX",
            Attribute::CenterY => "centerY",
            Attribute::Baseline => "baseline",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An attribute as written in an equation: a primitive, or one of the
/// special names that stand for a fixed list of primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeName {
    Primitive(Attribute),
    Margins,
    Size,
    Center,
}

impl AttributeName {
    /// Look up an attribute keyword. Returns `None` for anything that is not
    /// one of the 14 reserved attribute names.
    pub fn from_keyword(word: &str) -> Option<AttributeName> {
        match word {
            "margins" => Some(AttributeName::Margins),
            "size" => Some(AttributeName::Size),
            "center" => Some(AttributeName::Center),
            _ => Attribute::ALL
                .iter()
                .find(|a| a.name() == word)
                .map(|a| AttributeName::Primitive(*a)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeName::Primitive(a) => a.name(),
            AttributeName::Margins => "margins",
            AttributeName::Size => "size",
            AttributeName::Center => "center",
        }
    }

    pub fn is_special(self) -> bool {
        !matches!(self, AttributeName::Primitive(_))
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `self`, `all` and the 14 attribute names. None of them can name a
/// substitution view.
pub fn is_reserved_word(word: &str) -> bool {
    word == "self" || word == "all" || AttributeName::from_keyword(word).is_some()
}

// ──────────────────────────────────────────────
// View references
// ──────────────────────────────────────────────

/// The root of a view reference, before any key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ViewRef {
    /// `$self` -- the receiver
    SelfRef,
    /// `$all` -- every substitution view
    AllRef,
    /// `$0`, `$1`, ...
    IndexRef(usize),
    /// `$name`
    NameRef(String),
}

impl fmt::Display for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewRef::SelfRef => f.write_str("self"),
            ViewRef::AllRef => f.write_str("all"),
            ViewRef::IndexRef(n) => write!(f, "{}", n),
            ViewRef::NameRef(name) => f.write_str(name),
        }
    }
}

/// A view reference followed by zero or more key-path segments, each of
/// which must yield a view.
///
/// `pos` is the offset of the `$` in the source. It is left out of equality
/// and hashing, so a re-rendered equation still compares equal.
#[derive(Debug, Clone, Serialize)]
pub struct ViewPath {
    pub root: ViewRef,
    pub key_path: Vec<String>,
    pub pos: usize,
}

impl ViewPath {
    pub fn new(root: ViewRef, key_path: Vec<String>, pos: usize) -> Self {
        ViewPath {
            root,
            key_path,
            pos,
        }
    }
}

impl PartialEq for ViewPath {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.key_path == other.key_path
    }
}

impl Eq for ViewPath {}

impl Hash for ViewPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
        self.key_path.hash(state);
    }
}

impl fmt::Display for ViewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.root)?;
        for segment in &self.key_path {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Terms
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstantEntry {
    Value(f64),
    /// `-` in a constant list: no constraint for this index
    Skip,
}

impl fmt::Display for ConstantEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantEntry::Value(v) => write!(f, "{}", v),
            ConstantEntry::Skip => f.write_str("-"),
        }
    }
}

/// Where the multiplier was written relative to the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierPosition {
    /// `2($view.attr)`
    Before,
    /// `$view.attr * 2`
    After,
    /// no multiplier written; [`DEFAULT_MULTIPLIER`] applies
    Omitted,
}

/// Left-hand side: always a view with at least one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeftTerm {
    pub view: ViewPath,
    pub attributes: Vec<AttributeName>,
}

/// Right-hand side. `view == None` is a pure constant term; an empty
/// `attributes` list on a view term mirrors the left attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RightTerm {
    pub view: Option<ViewPath>,
    pub attributes: Vec<AttributeName>,
    pub multiplier_position: MultiplierPosition,
    pub multiplier: f64,
    pub constants: Vec<ConstantEntry>,
}

impl RightTerm {
    /// A right-hand side with every optional clause at its default.
    pub fn new(view: Option<ViewPath>, attributes: Vec<AttributeName>) -> Self {
        RightTerm {
            view,
            attributes,
            multiplier_position: MultiplierPosition::Omitted,
            multiplier: DEFAULT_MULTIPLIER,
            constants: vec![ConstantEntry::Value(DEFAULT_CONSTANT)],
        }
    }

    pub fn has_default_constant(&self) -> bool {
        self.constants == [ConstantEntry::Value(DEFAULT_CONSTANT)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equation {
    pub left: LeftTerm,
    pub relation: Relation,
    pub priority: u16,
    pub right: RightTerm,
}

// ──────────────────────────────────────────────
// Canonical rendering
// ──────────────────────────────────────────────

fn write_attributes(f: &mut fmt::Formatter<'_>, attributes: &[AttributeName]) -> fmt::Result {
    match attributes {
        [] => Ok(()),
        [single] => write!(f, ".{}", single),
        many => {
            f.write_str(".(")?;
            for (i, a) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", a)?;
            }
            f.write_str(")")
        }
    }
}

fn write_constants(f: &mut fmt::Formatter<'_>, constants: &[ConstantEntry]) -> fmt::Result {
    match constants {
        [ConstantEntry::Value(v)] => write!(f, "{}", v),
        many => {
            f.write_str("(")?;
            for (i, c) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", c)?;
            }
            f.write_str(")")
        }
    }
}

/// Renders the equation back to source form. Parsing the rendering yields
/// an equal AST.
impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.left.view)?;
        write_attributes(f, &self.left.attributes)?;
        write!(f, " {}", self.relation)?;
        if self.priority != DEFAULT_PRIORITY {
            write!(f, "(@{})", self.priority)?;
        }
        f.write_str(" ")?;

        let right = &self.right;
        match &right.view {
            None => write_constants(f, &right.constants),
            Some(view) => {
                match right.multiplier_position {
                    MultiplierPosition::Before => {
                        write!(f, "{}({}", right.multiplier, view)?;
                        write_attributes(f, &right.attributes)?;
                        f.write_str(")")?;
                    }
                    MultiplierPosition::After => {
                        write!(f, "{}", view)?;
                        write_attributes(f, &right.attributes)?;
                        write!(f, " * {}", right.multiplier)?;
                    }
                    MultiplierPosition::Omitted => {
                        write!(f, "{}", view)?;
                        write_attributes(f, &right.attributes)?;
                    }
                }
                if !right.has_default_constant() {
                    f.write_str(" + ")?;
                    write_constants(f, &right.constants)?;
                }
                Ok(())
            }
        }
    }
}
