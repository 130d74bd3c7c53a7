use crate::ast::{Attribute, Relation, DEFAULT_MULTIPLIER, DEFAULT_PRIORITY};
use serde::Serialize;
use std::fmt;

/// One fully resolved constraint:
/// `item_view.item_attribute <relation> multiplier * related_view.related_attribute + constant`.
///
/// `related_view` and `related_attribute` are both `None` for a constant
/// constraint (`item.width = 50`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintDescriptor<V> {
    pub item_view: V,
    pub item_attribute: Attribute,
    pub relation: Relation,
    pub related_view: Option<V>,
    pub related_attribute: Option<Attribute>,
    pub multiplier: f64,
    pub constant: f64,
    pub priority: u16,
}

impl<V> ConstraintDescriptor<V> {
    pub fn is_required(&self) -> bool {
        self.priority == DEFAULT_PRIORITY
    }

    /// Map the view handles, e.g. from framework handles to display names.
    pub fn map_views<W>(self, mut f: impl FnMut(V) -> W) -> ConstraintDescriptor<W> {
        ConstraintDescriptor {
            item_view: f(self.item_view),
            item_attribute: self.item_attribute,
            relation: self.relation,
            related_view: self.related_view.map(&mut f),
            related_attribute: self.related_attribute,
            multiplier: self.multiplier,
            constant: self.constant,
            priority: self.priority,
        }
    }
}

/// `a.width = 2 * b.width + 4 @250`; default multiplier, zero constant and
/// required priority are left out.
impl<V: fmt::Display> fmt::Display for ConstraintDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {} ", self.item_view, self.item_attribute, self.relation)?;
        match (&self.related_view, self.related_attribute) {
            (Some(view), Some(attribute)) => {
                if self.multiplier != DEFAULT_MULTIPLIER {
                    write!(f, "{} * ", self.multiplier)?;
                }
                write!(f, "{}.{}", view, attribute)?;
                if self.constant > 0.0 {
                    write!(f, " + {}", self.constant)?;
                } else if self.constant < 0.0 {
                    write!(f, " - {}", -self.constant)?;
                }
            }
            _ => write!(f, "{}", self.constant)?,
        }
        if !self.is_required() {
            write!(f, " @{}", self.priority)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ConstraintDescriptor<&'static str> {
        ConstraintDescriptor {
            item_view: "a",
            item_attribute: Attribute::Width,
            relation: Relation::Equal,
            related_view: Some("b"),
            related_attribute: Some(Attribute::Height),
            multiplier: 1.0,
            constant: 0.0,
            priority: 1000,
        }
    }

    #[test]
    fn display_defaults() {
        assert_eq!(descriptor().to_string(), "a.width = b.height");
    }

    #[test]
    fn display_full() {
        let d = ConstraintDescriptor {
            relation: Relation::LessOrEqual,
            multiplier: 2.0,
            constant: -4.5,
            priority: 250,
            ..descriptor()
        };
        assert_eq!(d.to_string(), "a.width <= 2 * b.height - 4.5 @250");
    }

    #[test]
    fn display_constant() {
        let d = ConstraintDescriptor {
            related_view: None,
            related_attribute: None,
            constant: 50.0,
            ..descriptor()
        };
        assert_eq!(d.to_string(), "a.width = 50");
    }

    #[test]
    fn map_views_keeps_everything_else() {
        let d = descriptor().map_views(|v| v.to_uppercase());
        assert_eq!(d.item_view, "A");
        assert_eq!(d.related_view.as_deref(), Some("B"));
        assert_eq!(d.related_attribute, Some(Attribute::Height));
    }

    #[test]
    fn serializes_with_camel_case_attributes() {
        let d = ConstraintDescriptor {
            item_attribute: Attribute::CenterX,
            ..descriptor()
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["item_attribute"], "centerX");
        assert_eq!(json["relation"], "equal");
        assert_eq!(json["priority"], 1000);
    }
}
