//! Pass 4: Descriptor synthesis -- one [`ConstraintDescriptor`] per
//! aligned index, carrying the equation's relation, multiplier and priority.

use crate::ast::Equation;
use crate::descriptor::ConstraintDescriptor;
use crate::pass3_broadcast::Aligned;

pub fn synthesize<V>(
    equation: &Equation,
    aligned: Vec<Aligned<V>>,
) -> Vec<ConstraintDescriptor<V>> {
    aligned
        .into_iter()
        .map(|a| ConstraintDescriptor {
            item_view: a.item_view,
            item_attribute: a.item_attribute,
            relation: equation.relation,
            related_view: a.related_view,
            related_attribute: a.related_attribute,
            multiplier: equation.right.multiplier,
            constant: a.constant,
            priority: equation.priority,
        })
        .collect()
}
