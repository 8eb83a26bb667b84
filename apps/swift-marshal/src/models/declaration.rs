//! Declaration tree produced by the structural parser.
//!
//! Containers live in an arena (`SyntaxTree::containers`) and refer to each
//! other by `ContainerId`. All byte ranges index into the source text the
//! tree was parsed from; the tree never owns or mutates that text.

use serde::Serialize;
use std::ops::Range;

/// Closed set of member kinds recognized inside a type body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    TypeAlias,
    AssociatedType,
    Initializer,
    TypeProperty,
    InstanceProperty,
    Subtype,
    TypeMethod,
    InstanceMethod,
    Subscript,
    Deinitializer,
}

impl MemberKind {
    pub const ALL: [MemberKind; 10] = [
        MemberKind::TypeAlias,
        MemberKind::AssociatedType,
        MemberKind::Initializer,
        MemberKind::TypeProperty,
        MemberKind::InstanceProperty,
        MemberKind::Subtype,
        MemberKind::TypeMethod,
        MemberKind::InstanceMethod,
        MemberKind::Subscript,
        MemberKind::Deinitializer,
    ];

    /// Name used for this kind in `ordering.members`.
    pub fn config_name(self) -> &'static str {
        match self {
            MemberKind::TypeAlias => "typealias",
            MemberKind::AssociatedType => "associatedtype",
            MemberKind::Initializer => "initializer",
            MemberKind::TypeProperty => "type_property",
            MemberKind::InstanceProperty => "instance_property",
            MemberKind::Subtype => "subtype",
            MemberKind::TypeMethod => "type_method",
            MemberKind::InstanceMethod => "instance_method",
            MemberKind::Subscript => "subscript",
            MemberKind::Deinitializer => "deinitializer",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.config_name() == name)
    }

    pub fn is_property(self) -> bool {
        matches!(self, MemberKind::TypeProperty | MemberKind::InstanceProperty)
    }

    pub fn is_method(self) -> bool {
        matches!(self, MemberKind::TypeMethod | MemberKind::InstanceMethod)
    }

    /// True for `static`/`class` members of the property and method families.
    pub fn is_type_scoped(self) -> bool {
        matches!(self, MemberKind::TypeProperty | MemberKind::TypeMethod)
    }
}

/// Index of a container inside `SyntaxTree::containers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub usize);

/// One member of a type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: MemberKind,
    /// Explicit access modifier, lowercased. Setter-only modifiers such as
    /// `private(set)` are never stored here.
    pub visibility: Option<String>,
    pub annotated: bool,
    /// Best-effort identifier, for diagnostics only.
    pub name: String,
    pub line: usize,
    /// Attributes, modifiers, body, trailing `;` and same-line comment.
    pub slice: Range<usize>,
    /// `slice` up to its `;` (comments before the `;` included), or
    /// without its trailing comment when there is no `;`.
    pub code: Range<usize>,
    /// Blanks and the `;` ending the member, if any.
    pub terminator: Option<Range<usize>>,
    /// Everything between the previous item (or the opening brace) and
    /// `slice.start`. Always ends where `slice` begins.
    pub leading_trivia: Range<usize>,
    /// Nothing but blanks follows `slice` on its line.
    pub ends_line: bool,
    /// `slice` finishes with a `//` comment.
    pub line_comment: bool,
    pub original_index: usize,
    /// The member's own type body when `kind == Subtype`.
    pub nested: Option<ContainerId>,
}

impl Declaration {
    /// Full byte extent the member occupies: trivia followed by its slice.
    pub fn extent(&self) -> Range<usize> {
        self.leading_trivia.start..self.slice.end
    }

    /// Trailing blanks and comment after the code and terminator.
    pub fn tail(&self) -> Range<usize> {
        let start = self.terminator.as_ref().map_or(self.code.end, |t| t.end);
        start..self.slice.end
    }
}

/// Whether a container is the type's own body or an `extension` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Primary,
    Supplementary,
}

/// One type declaration's member scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeContainer {
    /// Name as written after the keyword (`Foo`, or `Outer.Inner` for an
    /// extension of a nested type).
    pub name: String,
    /// Dotted path including enclosing types; links extensions to the
    /// primary body they extend.
    pub qualified_name: String,
    pub line: usize,
    pub boundary: BoundaryKind,
    /// Bytes strictly between `{` and `}`.
    pub body: Range<usize>,
    pub members: Vec<Declaration>,
    pub nested: Vec<ContainerId>,
}

/// Arena of type containers for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    pub containers: Vec<TypeContainer>,
    /// File-scope containers in source order.
    pub roots: Vec<ContainerId>,
}

impl SyntaxTree {
    pub fn container(&self, id: ContainerId) -> &TypeContainer {
        &self.containers[id.0]
    }

    /// All container ids in depth-first source order.
    pub fn walk(&self) -> Vec<ContainerId> {
        let mut out = Vec::with_capacity(self.containers.len());
        let mut stack: Vec<ContainerId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.container(id).nested.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_names_round_trip_for_every_kind() {
        for kind in MemberKind::ALL {
            assert_eq!(MemberKind::from_config_name(kind.config_name()), Some(kind));
        }
        assert_eq!(MemberKind::from_config_name("property"), None);
    }

    #[test]
    fn walk_is_depth_first_in_source_order() {
        let container = |name: &str, nested: Vec<ContainerId>| TypeContainer {
            name: name.into(),
            qualified_name: name.into(),
            line: 1,
            boundary: BoundaryKind::Primary,
            body: 0..0,
            members: Vec::new(),
            nested,
        };
        let tree = SyntaxTree {
            containers: vec![
                container("A", vec![ContainerId(1)]),
                container("B", vec![]),
                container("C", vec![]),
            ],
            roots: vec![ContainerId(0), ContainerId(2)],
        };
        assert_eq!(
            tree.walk(),
            vec![ContainerId(0), ContainerId(1), ContainerId(2)]
        );
    }
}
