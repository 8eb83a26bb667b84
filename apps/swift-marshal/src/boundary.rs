//! Boundary grouper: decides which members are ordered together and which
//! slot each member ends up in.
//!
//! A rewrite unit is a set of blocks (type body and/or `extension` blocks)
//! whose members are planned as one sequence. Under `separate` every block
//! is its own unit. Under `merge` all blocks sharing a qualified name form
//! one unit. Nested types always have a qualified name of their own and
//! are therefore planned independently of their parent.
//!
//! Every block keeps its member slots. What changes is which member fills
//! each slot:
//! - one block, or `respect_boundaries: false`: the unit's target sequence
//!   is poured into the unit's slots in source order, so members may move
//!   between blocks.
//! - several blocks with `respect_boundaries: true`: each block receives its
//!   own members, in the order they take in the unit's target sequence.
//!
//! A fill that would put a member ending in a `//` comment into a slot
//! followed by more code on the same line is not applied. Such a unit keeps
//! its members where they are and is reported as held.

use crate::models::configuration::{Configuration, ExtensionsStrategy};
use crate::models::declaration::{ContainerId, Declaration, SyntaxTree};
use crate::order::plan;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Address of a member inside the syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub container: ContainerId,
    pub index: usize,
}

impl MemberRef {
    pub fn resolve<'t>(&self, tree: &'t SyntaxTree) -> &'t Declaration {
        &tree.container(self.container).members[self.index]
    }
}

/// Blocks whose members are planned together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteUnit {
    pub qualified_name: String,
    /// Participating containers in source order.
    pub blocks: Vec<ContainerId>,
    /// Every member slot of every block, in source order.
    pub slots: Vec<MemberRef>,
}

/// Groups the containers of `tree` into rewrite units.
pub fn group(tree: &SyntaxTree, cfg: &Configuration) -> Vec<RewriteUnit> {
    let mut units: Vec<RewriteUnit> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for id in tree.walk() {
        let container = tree.container(id);
        let slots = (0..container.members.len()).map(|index| MemberRef {
            container: id,
            index,
        });
        let existing = match cfg.extensions_strategy {
            ExtensionsStrategy::Separate => None,
            ExtensionsStrategy::Merge => by_name.get(container.qualified_name.as_str()).copied(),
        };
        match existing {
            Some(pos) => {
                units[pos].blocks.push(id);
                units[pos].slots.extend(slots);
            }
            None => {
                by_name.insert(&container.qualified_name, units.len());
                units.push(RewriteUnit {
                    qualified_name: container.qualified_name.clone(),
                    blocks: vec![id],
                    slots: slots.collect(),
                });
            }
        }
    }
    units
}

/// Member placed into each slot of each container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    slots: HashMap<ContainerId, Vec<MemberRef>>,
    /// Out of order, but left as is because no safe fill exists.
    held: HashSet<ContainerId>,
}

impl Assignment {
    /// Members for the slots of `id`, in slot order.
    pub fn members_for(&self, id: ContainerId) -> Option<&[MemberRef]> {
        self.slots.get(&id).map(Vec::as_slice)
    }

    /// True when some slot of `id` receives a member other than its own.
    pub fn is_reordered(&self, id: ContainerId) -> bool {
        self.members_for(id).is_some_and(|members| {
            members
                .iter()
                .enumerate()
                .any(|(index, m)| *m != MemberRef { container: id, index })
        })
    }

    pub fn any_reordered(&self) -> bool {
        self.slots.keys().any(|&id| self.is_reordered(id))
    }

    /// True when `id` is out of order, whether or not it gets rewritten.
    pub fn needs_reordering(&self, id: ContainerId) -> bool {
        self.is_reordered(id) || self.held.contains(&id)
    }
}

/// Groups `tree` and plans every unit.
pub fn assign(tree: &SyntaxTree, cfg: &Configuration) -> Assignment {
    let mut assignment = Assignment::default();
    for unit in group(tree, cfg) {
        let target = unit_target(tree, &unit, cfg);
        let fill = fill_slots(&unit, &target, cfg);
        let fits = fill
            .iter()
            .all(|(&block, members)| fits_block(tree, block, members));
        if fits {
            assignment.slots.extend(fill);
        } else {
            warn!(
                unit = %unit.qualified_name,
                "members share a line with a trailing // comment, leaving them in place"
            );
            for &block in &unit.blocks {
                let identity = (0..tree.container(block).members.len())
                    .map(|index| MemberRef {
                        container: block,
                        index,
                    })
                    .collect::<Vec<_>>();
                if fill.get(&block) != Some(&identity) {
                    assignment.held.insert(block);
                }
                assignment.slots.insert(block, identity);
            }
        }
        debug!(
            unit = %unit.qualified_name,
            blocks = unit.blocks.len(),
            members = unit.slots.len(),
            reordered = unit.blocks.iter().any(|&b| assignment.needs_reordering(b)),
            "planned rewrite unit"
        );
    }
    assignment
}

/// Slot contents for every block of `unit`, given its target sequence.
fn fill_slots(
    unit: &RewriteUnit,
    target: &[MemberRef],
    cfg: &Configuration,
) -> HashMap<ContainerId, Vec<MemberRef>> {
    // Blocks without members still get an (empty) entry.
    let mut fill: HashMap<ContainerId, Vec<MemberRef>> =
        unit.blocks.iter().map(|&b| (b, Vec::new())).collect();
    if unit.blocks.len() == 1 || !cfg.respect_boundaries {
        for (slot, member) in unit.slots.iter().zip(target) {
            fill.entry(slot.container).or_default().push(*member);
        }
    } else {
        for member in target {
            fill.entry(member.container).or_default().push(*member);
        }
    }
    fill
}

/// A member ending in a line comment only fits a slot that ends its line.
fn fits_block(tree: &SyntaxTree, block: ContainerId, members: &[MemberRef]) -> bool {
    members.iter().enumerate().all(|(index, member)| {
        let slot = MemberRef {
            container: block,
            index,
        };
        *member == slot || slot.resolve(tree).ends_line || !member.resolve(tree).line_comment
    })
}

/// The unit's members in target order.
fn unit_target(tree: &SyntaxTree, unit: &RewriteUnit, cfg: &Configuration) -> Vec<MemberRef> {
    let planned = plan(unit.slots.iter().map(|m| m.resolve(tree)), cfg);
    planned.order.iter().map(|&i| unit.slots[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{StructureParser, SwiftParser};

    const TYPE_AND_EXTENSION: &str = "struct A {\n  func f() {}\n  var x = 1\n}\nextension A {\n  func g() {}\n  init() {}\n}\nstruct B {}\n";

    fn at(container: usize, index: usize) -> MemberRef {
        MemberRef {
            container: ContainerId(container),
            index,
        }
    }

    fn cfg(strategy: ExtensionsStrategy, respect: bool) -> Configuration {
        Configuration::default().with_extensions(strategy, respect)
    }

    #[test]
    fn separate_makes_one_unit_per_block() {
        let tree = SwiftParser.parse(TYPE_AND_EXTENSION).unwrap();
        let units = group(&tree, &cfg(ExtensionsStrategy::Separate, true));
        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.blocks.len() == 1));
    }

    #[test]
    fn merge_pools_blocks_with_the_same_name() {
        let tree = SwiftParser.parse(TYPE_AND_EXTENSION).unwrap();
        let units = group(&tree, &cfg(ExtensionsStrategy::Merge, true));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].qualified_name, "A");
        assert_eq!(units[0].blocks, vec![ContainerId(0), ContainerId(1)]);
        assert_eq!(units[0].slots, vec![at(0, 0), at(0, 1), at(1, 0), at(1, 1)]);
    }

    #[test]
    fn separate_orders_each_block_on_its_own() {
        let tree = SwiftParser.parse(TYPE_AND_EXTENSION).unwrap();
        let a = assign(&tree, &cfg(ExtensionsStrategy::Separate, false));
        assert_eq!(a.members_for(ContainerId(0)), Some(&[at(0, 1), at(0, 0)][..]));
        assert_eq!(a.members_for(ContainerId(1)), Some(&[at(1, 1), at(1, 0)][..]));
        assert_eq!(a.members_for(ContainerId(2)), Some(&[][..]));
        assert!(!a.is_reordered(ContainerId(2)));
    }

    #[test]
    fn merge_without_boundaries_moves_members_across_blocks() {
        let tree = SwiftParser.parse(TYPE_AND_EXTENSION).unwrap();
        let a = assign(&tree, &cfg(ExtensionsStrategy::Merge, false));
        // Joint order: init, x, f, g.
        assert_eq!(a.members_for(ContainerId(0)), Some(&[at(1, 1), at(0, 1)][..]));
        assert_eq!(a.members_for(ContainerId(1)), Some(&[at(0, 0), at(1, 0)][..]));
        assert!(a.is_reordered(ContainerId(0)));
        assert!(a.is_reordered(ContainerId(1)));
    }

    #[test]
    fn merge_with_boundaries_keeps_members_in_their_block() {
        let tree = SwiftParser.parse(TYPE_AND_EXTENSION).unwrap();
        let a = assign(&tree, &cfg(ExtensionsStrategy::Merge, true));
        assert_eq!(a.members_for(ContainerId(0)), Some(&[at(0, 1), at(0, 0)][..]));
        assert_eq!(a.members_for(ContainerId(1)), Some(&[at(1, 1), at(1, 0)][..]));
    }

    #[test]
    fn merge_with_boundaries_leaves_single_member_blocks_alone() {
        let src = "struct A {\n  func f() {}\n}\nextension A {\n  init() {}\n}\n";
        let tree = SwiftParser.parse(src).unwrap();
        let respected = assign(&tree, &cfg(ExtensionsStrategy::Merge, true));
        assert!(!respected.any_reordered());
        let crossed = assign(&tree, &cfg(ExtensionsStrategy::Merge, false));
        assert_eq!(crossed.members_for(ContainerId(0)), Some(&[at(1, 0)][..]));
        assert!(crossed.any_reordered());
    }

    #[test]
    fn nested_types_are_planned_independently() {
        let src = "struct A {\n  struct Inner {\n    func f() {}\n    init() {}\n  }\n  init() {}\n}\n";
        let tree = SwiftParser.parse(src).unwrap();
        let a = assign(&tree, &cfg(ExtensionsStrategy::Merge, false));
        // Outer: subtype (bucket 5) after initializer (bucket 2).
        assert_eq!(a.members_for(ContainerId(0)), Some(&[at(0, 1), at(0, 0)][..]));
        assert_eq!(a.members_for(ContainerId(1)), Some(&[at(1, 1), at(1, 0)][..]));
    }
}
