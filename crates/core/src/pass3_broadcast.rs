//! Pass 3: List broadcasting -- align every list-valued component of an
//! equation to a single target length.
//!
//! The target length N is the number of left-hand targets: left views
//! times left attributes (more than one left view only with `$all`). Each
//! right-hand component must have length 1 (repeated N times) or exactly
//! N. Targets are ordered by left attribute first, then left view.

use crate::ast::{Attribute, ConstantEntry};
use crate::error::{BroadcastError, ListKind};

/// The list-valued components of one equation, after expansion (Pass 1) and
/// resolution (Pass 2).
#[derive(Debug, Clone, Copy)]
pub struct BroadcastInput<'a, V> {
    pub left_views: &'a [V],
    pub left_attributes: &'a [Attribute],
    /// `None` for a pure constant right-hand side.
    pub right_views: Option<&'a [V]>,
    /// Empty when the right-hand view carries no attribute; each index then
    /// relates to the same attribute as its left target.
    pub right_attributes: &'a [Attribute],
    pub constants: &'a [ConstantEntry],
}

/// One aligned index that survived skip markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned<V> {
    /// Position in the full (unskipped) target order.
    pub index: usize,
    pub item_view: V,
    pub item_attribute: Attribute,
    pub related_view: Option<V>,
    pub related_attribute: Option<Attribute>,
    pub constant: f64,
}

fn check_len(component: ListKind, len: usize, target: usize) -> Result<(), BroadcastError> {
    match len {
        0 => Err(BroadcastError::Empty(component)),
        1 => Ok(()),
        n if n == target => Ok(()),
        got => Err(BroadcastError::SizeMismatch {
            component,
            expected: target,
            got,
        }),
    }
}

fn pick<T>(list: &[T], index: usize) -> &T {
    if list.len() == 1 {
        &list[0]
    } else {
        &list[index]
    }
}

pub fn broadcast<V: Clone>(
    input: &BroadcastInput<'_, V>,
) -> Result<Vec<Aligned<V>>, BroadcastError> {
    let view_count = input.left_views.len();
    let target = view_count * input.left_attributes.len();
    if target == 0 {
        return Err(BroadcastError::Empty(ListKind::LeftTargets));
    }

    if !input.right_attributes.is_empty() {
        check_len(ListKind::RightAttributes, input.right_attributes.len(), target)?;
    }
    if let Some(views) = input.right_views {
        check_len(ListKind::RightViews, views.len(), target)?;
    }
    check_len(ListKind::Constants, input.constants.len(), target)?;

    let mut aligned = Vec::with_capacity(target);
    for (a, item_attribute) in input.left_attributes.iter().enumerate() {
        for (v, item_view) in input.left_views.iter().enumerate() {
            let index = a * view_count + v;
            let constant = match pick(input.constants, index) {
                ConstantEntry::Skip => continue,
                ConstantEntry::Value(c) => *c,
            };
            let (related_view, related_attribute) = match input.right_views {
                None => (None, None),
                Some(views) => {
                    let attribute = if input.right_attributes.is_empty() {
                        *item_attribute
                    } else {
                        *pick(input.right_attributes, index)
                    };
                    (Some(pick(views, index).clone()), Some(attribute))
                }
            };
            aligned.push(Aligned {
                index,
                item_view: item_view.clone(),
                item_attribute: *item_attribute,
                related_view,
                related_attribute,
                constant,
            });
        }
    }
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Attribute::*;
    use crate::ast::ConstantEntry::{Skip, Value};

    fn input<'a>(
        left_views: &'a [&'static str],
        left_attributes: &'a [Attribute],
        right_views: Option<&'a [&'static str]>,
        right_attributes: &'a [Attribute],
        constants: &'a [ConstantEntry],
    ) -> BroadcastInput<'a, &'static str> {
        BroadcastInput {
            left_views,
            left_attributes,
            right_views,
            right_attributes,
            constants,
        }
    }

    #[test]
    fn scalar_components_broadcast_to_every_target() {
        let out = broadcast(&input(
            &["self"],
            &[Width, Height],
            Some(&["x"][..]),
            &[Width],
            &[Value(4.0)],
        ))
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].item_attribute, Height);
        assert_eq!(out[1].related_view, Some("x"));
        assert_eq!(out[1].related_attribute, Some(Width));
        assert_eq!(out[1].constant, 4.0);
    }

    #[test]
    fn lists_align_by_index() {
        let out = broadcast(&input(
            &["self"],
            &[Width, Height],
            Some(&["x"][..]),
            &[Height, Width],
            &[Value(1.0), Value(2.0)],
        ))
        .unwrap();
        assert_eq!(out[0].related_attribute, Some(Height));
        assert_eq!(out[0].constant, 1.0);
        assert_eq!(out[1].related_attribute, Some(Width));
        assert_eq!(out[1].constant, 2.0);
    }

    #[test]
    fn skip_drops_exactly_its_index() {
        let constants = [Value(10.0), Skip];
        let out = broadcast(&input(&["self"], &[Top, Bottom], None, &[], &constants)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index, 0);
        assert_eq!(out[0].item_attribute, Top);
        assert_eq!(out[0].related_view, None);
        assert_eq!(out[0].related_attribute, None);
    }

    #[test]
    fn size_mismatch() {
        assert_eq!(
            broadcast(&input(
                &["self"],
                &[Width, Height],
                None,
                &[],
                &[Value(10.0), Value(4.0), Value(5.0)],
            )),
            Err(BroadcastError::SizeMismatch {
                component: ListKind::Constants,
                expected: 2,
                got: 3,
            })
        );
        assert_eq!(
            broadcast(&input(
                &["self"],
                &[Width],
                Some(&["x"][..]),
                &[Width, Height],
                &[Value(0.0)],
            )),
            Err(BroadcastError::SizeMismatch {
                component: ListKind::RightAttributes,
                expected: 1,
                got: 2,
            })
        );
    }

    #[test]
    fn all_on_the_left_multiplies_targets() {
        let out = broadcast(&input(
            &["a", "b", "c"],
            &[Width, Height],
            Some(&["self"][..]),
            &[],
            &[Value(0.0)],
        ))
        .unwrap();
        let order: Vec<(&str, Attribute)> =
            out.iter().map(|x| (x.item_view, x.item_attribute)).collect();
        assert_eq!(
            order,
            vec![
                ("a", Width),
                ("b", Width),
                ("c", Width),
                ("a", Height),
                ("b", Height),
                ("c", Height),
            ]
        );
        assert!(out.iter().all(|x| x.related_attribute == Some(x.item_attribute)));
    }

    #[test]
    fn right_view_list_aligns_with_targets() {
        let out = broadcast(&input(
            &["a", "b"],
            &[Left],
            Some(&["p", "q"][..]),
            &[Right],
            &[Value(8.0)],
        ))
        .unwrap();
        assert_eq!(out[0].related_view, Some("p"));
        assert_eq!(out[1].related_view, Some("q"));
    }

    #[test]
    fn empty_components_are_rejected() {
        assert_eq!(
            broadcast(&input(&[], &[Width], None, &[], &[Value(1.0)])),
            Err(BroadcastError::Empty(ListKind::LeftTargets))
        );
        assert_eq!(
            broadcast(&input(&["self"], &[Width], Some(&[][..]), &[], &[Value(1.0)])),
            Err(BroadcastError::Empty(ListKind::RightViews))
        );
    }
}
