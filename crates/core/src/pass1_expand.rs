//! Pass 1: Attribute expansion -- replace the special attribute names
//! (`margins`, `size`, `center`) by their primitive constituents, in place.

use crate::ast::{Attribute, AttributeName};

pub const MARGINS: [Attribute; 4] = [
    Attribute::Top,
    Attribute::Leading,
    Attribute::Bottom,
    Attribute::Trailing,
];
pub const SIZE: [Attribute; 2] = [Attribute::Width, Attribute::Height];
pub const CENTER: [Attribute; 2] = [Attribute::CenterX, Attribute::CenterY];

/// Expand an attribute list. Order is preserved: each special name is
/// replaced by its constituents at the position it occupied.
pub fn expand(attributes: &[AttributeName]) -> Vec<Attribute> {
    let mut expanded = Vec::with_capacity(attributes.len());
    for name in attributes {
        match name {
            AttributeName::Primitive(a) => expanded.push(*a),
            AttributeName::Margins => expanded.extend_from_slice(&MARGINS),
            AttributeName::Size => expanded.extend_from_slice(&SIZE),
            AttributeName::Center => expanded.extend_from_slice(&CENTER),
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AttributeName::*;

    #[test]
    fn margins_order() {
        assert_eq!(
            expand(&[Margins]),
            vec![
                Attribute::Top,
                Attribute::Leading,
                Attribute::Bottom,
                Attribute::Trailing
            ]
        );
    }

    #[test]
    fn mixed_list_keeps_relative_order() {
        assert_eq!(
            expand(&[Primitive(Attribute::Baseline), Size, Center, Primitive(Attribute::Left)]),
            vec![
                Attribute::Baseline,
                Attribute::Width,
                Attribute::Height,
                Attribute::CenterX,
                Attribute::CenterY,
                Attribute::Left,
            ]
        );
    }

    #[test]
    fn primitives_expand_to_themselves() {
        for a in Attribute::ALL {
            assert_eq!(expand(&[Primitive(a)]), vec![a]);
        }
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(expand(&[]).is_empty());
    }
}
