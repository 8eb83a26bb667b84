//! Order planner: computes the target order of a container's members.

use crate::classify::classify;
use crate::models::configuration::Configuration;
use crate::models::declaration::Declaration;

/// Target order for one sequence of declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Positions into the planned slice, in target order.
    pub order: Vec<usize>,
    /// True iff `order` is not the identity.
    pub needs_reordering: bool,
}

/// Sorts `decls` by bucket, keeping source order inside each bucket.
///
/// Ties are broken by position in `decls` rather than by
/// `original_index`, so a pooled sequence drawn from several containers is
/// still ordered by its pooled (source) position.
pub fn plan<'d>(decls: impl IntoIterator<Item = &'d Declaration>, cfg: &Configuration) -> Plan {
    let buckets: Vec<usize> = decls.into_iter().map(|d| classify(d, cfg)).collect();
    let mut order: Vec<usize> = (0..buckets.len()).collect();
    // `sort_by_key` is stable.
    order.sort_by_key(|&i| buckets[i]);
    let needs_reordering = order.iter().enumerate().any(|(pos, &i)| pos != i);
    Plan {
        order,
        needs_reordering,
    }
}
