//! Rewrite engine: renders source text with members placed per an
//! [`Assignment`].
//!
//! Output is assembled from slices of the original text only. Every byte
//! outside member extents (headers, fixed items, closing trivia, file-level
//! code) is copied as is. A member carries its code, its trailing comment
//! and any leading trivia that starts on a line of its own. The slot keeps
//! what separates it from its neighbours on the same line: inline leading
//! blanks, and the `;` when more code follows on that line. A subtype
//! member carries its nested container, which is rendered recursively with
//! its own assignment.

use crate::boundary::{Assignment, MemberRef};
use crate::models::declaration::{ContainerId, Declaration, SyntaxTree};

/// Produces the rewritten text for `text` parsed as `tree`.
pub fn rewrite(text: &str, tree: &SyntaxTree, assignment: &Assignment) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for &root in &tree.roots {
        let body = &tree.container(root).body;
        out.push_str(&text[cursor..body.start]);
        render_body(text, tree, assignment, root, &mut out);
        cursor = body.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn render_body(
    text: &str,
    tree: &SyntaxTree,
    assignment: &Assignment,
    id: ContainerId,
    out: &mut String,
) {
    let container = tree.container(id);
    let assigned = assignment.members_for(id).unwrap_or_default();
    let mut cursor = container.body.start;
    for (index, slot) in container.members.iter().enumerate() {
        let extent = slot.extent();
        out.push_str(&text[cursor..extent.start]);
        let member = assigned
            .get(index)
            .copied()
            .unwrap_or(MemberRef { container: id, index });
        let decl = member.resolve(tree);
        push_lead(text, slot, decl, out);
        render_code(text, tree, assignment, decl, out);
        let terminator = if slot.ends_line {
            &decl.terminator
        } else {
            &slot.terminator
        };
        if let Some(range) = terminator {
            out.push_str(&text[range.clone()]);
        }
        out.push_str(&text[decl.tail()]);
        cursor = extent.end;
    }
    out.push_str(&text[cursor..container.body.end]);
}

/// Leading trivia for `decl` placed where `slot` was.
fn push_lead(text: &str, slot: &Declaration, decl: &Declaration, out: &mut String) {
    let own = &text[decl.leading_trivia.clone()];
    let at_slot = &text[slot.leading_trivia.clone()];
    match (own.contains('\n'), at_slot.rfind('\n')) {
        (true, Some(_)) => out.push_str(own),
        (true, None) => {
            out.push_str(at_slot.trim_end());
            out.push_str(own);
        }
        // Only the line break and indentation; the rest travels with the
        // slot's own member.
        (false, Some(nl)) => {
            let from = if at_slot[..nl].ends_with('\r') { nl - 1 } else { nl };
            out.push_str(&at_slot[from..]);
        }
        (false, None) => out.push_str(at_slot),
    }
}

fn render_code(
    text: &str,
    tree: &SyntaxTree,
    assignment: &Assignment,
    decl: &Declaration,
    out: &mut String,
) {
    match decl.nested {
        Some(nested) => {
            let body = &tree.container(nested).body;
            out.push_str(&text[decl.code.start..body.start]);
            render_body(text, tree, assignment, nested, out);
            out.push_str(&text[body.end..decl.code.end]);
        }
        None => out.push_str(&text[decl.code.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::assign;
    use crate::models::configuration::{Configuration, ExtensionsStrategy, MemberRule};
    use crate::models::declaration::MemberKind;
    use crate::syntax::{StructureParser, SwiftParser};
    use pretty_assertions::assert_eq;

    fn fix(src: &str, cfg: &Configuration) -> String {
        let tree = SwiftParser.parse(src).unwrap();
        rewrite(src, &tree, &assign(&tree, cfg))
    }

    #[test]
    fn initializer_moves_before_method_with_its_trivia() {
        let cfg = Configuration::new(vec![
            MemberRule::Simple(MemberKind::Initializer),
            MemberRule::Simple(MemberKind::InstanceMethod),
        ]);
        let src = "struct A {\n    func run() {}\n\n    /// Makes an A.\n    init() {}\n}\n";
        let want = "struct A {\n\n    /// Makes an A.\n    init() {}\n    func run() {}\n}\n";
        assert_eq!(fix(src, &cfg), want);
    }

    #[test]
    fn ordered_input_is_byte_identical() {
        let src = "// header\nimport Foundation\n\nstruct A {\n  init() {}\n  var x: Int { 1 } // trailing\n  func f() {}\n}\n";
        assert_eq!(fix(src, &Configuration::default()), src);
    }

    #[test]
    fn fixing_twice_equals_fixing_once() {
        let src = "class C {\n  deinit {}\n  func f() {}\n  static let s = 1\n  init() {}\n  // note\n  var v = 0 // why\n}\n";
        let cfg = Configuration::default();
        let once = fix(src, &cfg);
        assert_eq!(fix(&once, &cfg), once);
        assert_eq!(
            once,
            "class C {\n  init() {}\n  static let s = 1\n  // note\n  var v = 0 // why\n  func f() {}\n  deinit {}\n}\n"
        );
    }

    #[test]
    fn enum_cases_and_conditional_regions_do_not_move() {
        let src = "enum E {\n  case a\n  func f() {}\n  #if DEBUG\n  func g() {}\n  #endif\n  case b\n  init() { self = .a }\n}\n";
        let want = "enum E {\n  case a\n  init() { self = .a }\n  #if DEBUG\n  func g() {}\n  #endif\n  case b\n  func f() {}\n}\n";
        assert_eq!(fix(src, &Configuration::default()), want);
    }

    #[test]
    fn nested_bodies_are_reordered_inside_moved_members() {
        let src = "struct A {\n  struct B {\n    func f() {}\n    init() {}\n  }\n  init() {}\n}\n";
        let want = "struct A {\n  init() {}\n  struct B {\n    init() {}\n    func f() {}\n  }\n}\n";
        assert_eq!(fix(src, &Configuration::default()), want);
    }

    #[test]
    fn merge_without_boundaries_relocates_between_blocks() {
        let cfg = Configuration::default().with_extensions(ExtensionsStrategy::Merge, false);
        let src = "struct A {\n  func f() {}\n}\n\nextension A {\n  init(x: Int) {}\n}\n";
        let want = "struct A {\n  init(x: Int) {}\n}\n\nextension A {\n  func f() {}\n}\n";
        assert_eq!(fix(src, &cfg), want);
    }

    #[test]
    fn semicolons_stay_between_members_on_one_line() {
        let src = "struct A { var a = 1; func f() {}; init() {} }\n";
        let out = fix(src, &Configuration::default());
        assert_eq!(out, "struct A { init() {}; var a = 1; func f() {} }\n");
        let tree = SwiftParser.parse(&out).unwrap();
        assert_eq!(tree.containers[0].members.len(), 3);
        assert_eq!(fix(&out, &Configuration::default()), out);
    }

    #[test]
    fn member_moving_off_a_shared_line_gets_a_line_break() {
        let src = "struct A { func f() {}\n  init() {} }\n";
        let out = fix(src, &Configuration::default());
        assert_eq!(out, "struct A {\n  init() {}\n  func f() {} }\n");
        let tree = SwiftParser.parse(&out).unwrap();
        assert_eq!(tree.containers[0].members.len(), 2);
    }

    #[test]
    fn inline_comments_stay_in_their_slot() {
        let src = "struct A { /* first */ func f() {}\n  // Builds.\n  init() {} }\n";
        let out = fix(src, &Configuration::default());
        assert_eq!(
            out,
            "struct A { /* first */\n  // Builds.\n  init() {}\n  func f() {} }\n"
        );
    }

    #[test]
    fn own_line_semicolons_travel_with_their_member() {
        let src = "struct A {\n  func f() {};\n  var a = 1; // count\n}\n";
        let out = fix(src, &Configuration::default());
        assert_eq!(out, "struct A {\n  var a = 1; // count\n  func f() {};\n}\n");
    }

    #[test]
    fn line_comment_is_never_followed_by_code() {
        let src = "struct A {\n  func f() {} // last\n  init() {}; var a = 1 }\n";
        let tree = SwiftParser.parse(src).unwrap();
        let assignment = assign(&tree, &Configuration::default());
        assert!(!assignment.any_reordered());
        assert!(assignment.needs_reordering(tree.roots[0]));
        assert_eq!(fix(src, &Configuration::default()), src);
    }

    #[test]
    fn code_outside_types_is_untouched() {
        let src = "let top = 1\nfunc helper() {}\nstruct A {\n  func f() {}\n  init() {}\n}\nlet tail = \"}\"\n";
        let want = "let top = 1\nfunc helper() {}\nstruct A {\n  init() {}\n  func f() {}\n}\nlet tail = \"}\"\n";
        assert_eq!(fix(src, &Configuration::default()), want);
    }
}
