//! Declaration classifier: maps a member to its ordering bucket.
//!
//! The bucket of a declaration is the index of the first rule in
//! `ordering.members` that matches it. A declaration that no rule matches
//! lands in the trailing bucket (`rules.len()`), after every ruled member.

use crate::models::configuration::{Configuration, MemberRule, MethodScope};
use crate::models::declaration::{Declaration, MemberKind};
use tracing::trace;

/// Access level Swift assumes when a declaration has no explicit modifier.
const IMPLICIT_VISIBILITY: &str = "internal";

/// Returns the bucket index for `decl` under `cfg`.
pub fn classify(decl: &Declaration, cfg: &Configuration) -> usize {
    let bucket = cfg
        .rules
        .iter()
        .position(|rule| matches_rule(rule, decl))
        .unwrap_or_else(|| cfg.unmatched_bucket());
    trace!(member = %decl.name, kind = ?decl.kind, bucket, "classified");
    bucket
}

/// Whether a single rule accepts `decl`. Filters left as `None` match
/// anything; the remaining filters must all agree.
pub fn matches_rule(rule: &MemberRule, decl: &Declaration) -> bool {
    match rule {
        MemberRule::Simple(kind) => decl.kind == *kind,
        MemberRule::Property {
            annotated,
            visibility,
        } => {
            decl.kind.is_property()
                && matches_annotated(*annotated, decl)
                && matches_visibility(visibility.as_deref(), decl)
        }
        MemberRule::Method {
            scope,
            visibility,
            annotated,
        } => {
            decl.kind.is_method()
                && matches_scope(*scope, decl.kind)
                && matches_visibility(visibility.as_deref(), decl)
                && matches_annotated(*annotated, decl)
        }
    }
}

fn matches_scope(scope: Option<MethodScope>, kind: MemberKind) -> bool {
    match scope {
        None => true,
        Some(MethodScope::Type) => kind.is_type_scoped(),
        Some(MethodScope::Instance) => !kind.is_type_scoped(),
    }
}

fn matches_annotated(filter: Option<bool>, decl: &Declaration) -> bool {
    filter.map_or(true, |want| want == decl.annotated)
}

fn matches_visibility(filter: Option<&str>, decl: &Declaration) -> bool {
    let Some(want) = filter else {
        return true;
    };
    let actual = decl.visibility.as_deref().unwrap_or(IMPLICIT_VISIBILITY);
    want.eq_ignore_ascii_case(actual)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a declaration with empty byte ranges; only the classifying
    /// attributes matter here.
    pub(crate) fn decl(kind: MemberKind, visibility: Option<&str>, annotated: bool) -> Declaration {
        Declaration {
            kind,
            visibility: visibility.map(str::to_string),
            annotated,
            name: "m".into(),
            line: 1,
            slice: 0..0,
            code: 0..0,
            terminator: None,
            leading_trivia: 0..0,
            ends_line: true,
            line_comment: false,
            original_index: 0,
            nested: None,
        }
    }

    #[test]
    fn simple_rules_match_on_kind() {
        let cfg = Configuration::default();
        assert_eq!(classify(&decl(MemberKind::TypeAlias, None, false), &cfg), 0);
        assert_eq!(classify(&decl(MemberKind::Initializer, None, false), &cfg), 2);
        assert_eq!(classify(&decl(MemberKind::Deinitializer, None, false), &cfg), 9);
    }

    #[test]
    fn unmatched_members_go_to_the_trailing_bucket() {
        let cfg = Configuration::new(vec![MemberRule::Simple(MemberKind::Initializer)]);
        assert_eq!(classify(&decl(MemberKind::InstanceMethod, None, false), &cfg), 1);
        assert_eq!(classify(&decl(MemberKind::Initializer, None, false), &cfg), 0);
    }

    #[test]
    fn first_matching_rule_wins() {
        let cfg = Configuration::new(vec![
            MemberRule::Method {
                scope: None,
                visibility: None,
                annotated: None,
            },
            MemberRule::Method {
                scope: None,
                visibility: Some("public".into()),
                annotated: None,
            },
        ]);
        let public_method = decl(MemberKind::InstanceMethod, Some("public"), false);
        assert_eq!(classify(&public_method, &cfg), 0);
    }

    #[test]
    fn property_rule_filters_are_combined() {
        let rule = MemberRule::Property {
            annotated: Some(true),
            visibility: Some("private".into()),
        };
        assert!(matches_rule(&rule, &decl(MemberKind::InstanceProperty, Some("private"), true)));
        assert!(matches_rule(&rule, &decl(MemberKind::TypeProperty, Some("PRIVATE"), true)));
        assert!(!matches_rule(&rule, &decl(MemberKind::InstanceProperty, Some("private"), false)));
        assert!(!matches_rule(&rule, &decl(MemberKind::InstanceProperty, Some("public"), true)));
        assert!(!matches_rule(&rule, &decl(MemberKind::InstanceMethod, Some("private"), true)));
    }

    #[test]
    fn missing_visibility_counts_as_internal() {
        let rule = MemberRule::Property {
            annotated: None,
            visibility: Some("internal".into()),
        };
        assert!(matches_rule(&rule, &decl(MemberKind::InstanceProperty, None, false)));
        let rule = MemberRule::Property {
            annotated: None,
            visibility: Some("public".into()),
        };
        assert!(!matches_rule(&rule, &decl(MemberKind::InstanceProperty, None, false)));
    }

    #[test]
    fn method_scope_selects_type_or_instance() {
        let statics = MemberRule::Method {
            scope: Some(MethodScope::Type),
            visibility: None,
            annotated: None,
        };
        let instance = MemberRule::Method {
            scope: Some(MethodScope::Instance),
            visibility: None,
            annotated: None,
        };
        let tm = decl(MemberKind::TypeMethod, None, false);
        let im = decl(MemberKind::InstanceMethod, None, false);
        assert!(matches_rule(&statics, &tm));
        assert!(!matches_rule(&statics, &im));
        assert!(matches_rule(&instance, &im));
        assert!(!matches_rule(&instance, &tm));
        assert!(!matches_rule(&statics, &decl(MemberKind::TypeProperty, None, false)));
    }
}
