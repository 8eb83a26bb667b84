//! Configuration discovery and lenient loading.
//!
//! swift-marshal reads `.swift-marshal.yaml` (or `.yml`) from the working
//! directory or its closest ancestor, stopping at the repository root
//! (a directory containing `.git`). An explicit `--config` path wins over
//! discovery. With no file at all the built-in defaults apply:
//! - `ordering.members`: every member kind in conventional order
//! - `extensions.strategy`: `separate`
//! - `extensions.respect_boundaries`: `true`
//!
//! Contents are read permissively. Unknown keys are ignored, unknown rules
//! are dropped, and malformed filter values become wildcards. Text that is
//! not YAML at all is logged and replaced by the defaults. Only a file that
//! cannot be read fails.

use crate::error::{ConfigError, MarshalError, MarshalResult};
use crate::models::configuration::{Configuration, ExtensionsStrategy, MemberRule, MethodScope};
use crate::models::declaration::MemberKind;
use fs_err as fs;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name written by `init` and preferred by discovery.
pub const CONFIG_FILE_NAME: &str = ".swift-marshal.yaml";

const CONFIG_FILE_NAMES: [&str; 2] = [CONFIG_FILE_NAME, ".swift-marshal.yml"];

/// Configuration written by `init`; equivalent to `Configuration::default()`.
pub const DEFAULT_CONFIG: &str = "\
version: 1

ordering:
  members:
    - typealias
    - associatedtype
    - initializer
    - type_property
    - instance_property
    - subtype
    - type_method
    - instance_method
    - subscript
    - deinitializer

extensions:
  strategy: separate
  respect_boundaries: true
";

/// Walk upward from `start` to the nearest configuration file.
///
/// Stops after the first directory containing `.git`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut cur = Some(start);
    while let Some(dir) = cur {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if dir.join(".git").exists() {
            return None;
        }
        cur = dir.parent();
    }
    None
}

/// Resolve the effective configuration: `explicit` if given (it must
/// exist), else the discovered file, else defaults.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<Configuration, ConfigError> {
    let path = match explicit {
        Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => find_config(cwd),
    };
    match path {
        Some(path) => {
            debug!("using config file at {}", path.display());
            load_config(&path)
        }
        None => {
            debug!("no config file found from {}, using defaults", cwd.display());
            Ok(Configuration::default())
        }
    }
}

pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_config(&text, path))
}

/// Parse configuration text; `origin` is only used in log messages.
pub fn parse_config(text: &str, origin: &Path) -> Configuration {
    let mut cfg = Configuration::default();
    let root: Value = match serde_yaml::from_str(text) {
        Ok(root) => root,
        Err(e) => {
            warn!("{} is not valid YAML ({e}), using the default configuration", origin.display());
            return cfg;
        }
    };
    let Some(root) = root.as_mapping() else {
        return cfg;
    };

    cfg.version = match root.get("version") {
        Some(v) => v.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(1),
        None => 1,
    };

    let members = section(root, "ordering")
        .and_then(|o| o.get("members"))
        .and_then(Value::as_sequence);
    if let Some(items) = members {
        let rules: Vec<MemberRule> = items.iter().filter_map(parse_rule).collect();
        if rules.is_empty() {
            warn!("ordering.members has no usable rules, keeping the default order");
        } else {
            cfg.rules = rules;
        }
    }

    if let Some(ext) = section(root, "extensions") {
        if let Some(strategy) = ext.get("strategy").and_then(scalar_string) {
            match ExtensionsStrategy::from_config_value(&strategy) {
                Some(s) => cfg.extensions_strategy = s,
                None => warn!(strategy = %strategy, "unknown extensions.strategy, using separate"),
            }
        }
        if let Some(respect) = ext.get("respect_boundaries").and_then(lenient_bool) {
            cfg.respect_boundaries = respect;
        }
    }
    cfg
}

/// Write the default configuration into `dir`. Refuses to replace an
/// existing file unless `force`.
pub fn write_default_config(dir: &Path, force: bool) -> MarshalResult<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(MarshalError::AlreadyExists(path));
    }
    fs::write(&path, DEFAULT_CONFIG).map_err(|source| MarshalError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn section<'v>(root: &'v Mapping, key: &str) -> Option<&'v Mapping> {
    root.get(key).and_then(Value::as_mapping)
}

/// One entry of `ordering.members`: a kind name, or a single-key map
/// `property:` / `method:` holding optional filters.
fn parse_rule(item: &Value) -> Option<MemberRule> {
    match item {
        Value::String(name) => {
            let kind = MemberKind::from_config_name(name.trim());
            if kind.is_none() {
                warn!(rule = %name, "ignoring unknown member kind");
            }
            kind.map(MemberRule::Simple)
        }
        Value::Mapping(map) => {
            let (name, attrs) = map.iter().next()?;
            let name = name.as_str()?;
            let empty = Mapping::new();
            let attrs = attrs.as_mapping().unwrap_or(&empty);
            match name {
                "property" => Some(MemberRule::Property {
                    annotated: attrs.get("annotated").and_then(lenient_bool),
                    visibility: attrs.get("visibility").and_then(scalar_string),
                }),
                "method" => Some(MemberRule::Method {
                    scope: attrs
                        .get("kind")
                        .and_then(scalar_string)
                        .and_then(|k| MethodScope::from_config_value(&k)),
                    visibility: attrs.get("visibility").and_then(scalar_string),
                    annotated: attrs.get("annotated").and_then(lenient_bool),
                }),
                other => {
                    warn!(rule = %other, "ignoring unknown rule");
                    None
                }
            }
        }
        other => {
            warn!(?other, "ignoring malformed ordering entry");
            None
        }
    }
}

/// `true`/`false`/`yes`/`no` in any case; anything else is no constraint.
fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Non-empty scalar as text; `null` and empty strings count as absent.
fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn parse(text: &str) -> Configuration {
        parse_config(text, Path::new("test.yaml"))
    }

    #[test]
    fn default_template_matches_built_in_defaults() {
        assert_eq!(parse(DEFAULT_CONFIG), Configuration::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse(""), Configuration::default());
    }

    #[test]
    fn parses_complex_rules_in_block_and_flow_style() {
        let cfg = parse(
            r#"
ordering:
  members:
    - initializer
    - property:
        annotated: true
        visibility: public
    - method: { kind: static, visibility: private }
    - method:
"#,
        );
        assert_eq!(
            cfg.rules,
            vec![
                MemberRule::Simple(MemberKind::Initializer),
                MemberRule::Property {
                    annotated: Some(true),
                    visibility: Some("public".into()),
                },
                MemberRule::Method {
                    scope: Some(MethodScope::Type),
                    visibility: Some("private".into()),
                    annotated: None,
                },
                MemberRule::Method {
                    scope: None,
                    visibility: None,
                    annotated: None,
                },
            ]
        );
    }

    #[test]
    fn malformed_values_become_wildcards() {
        let cfg = parse(
            r#"
version: two
ordering:
  members:
    - property:
        annotated: maybe
    - method:
        kind: weird
        annotated: yes
    - bogus_kind
    - closure:
        visibility: public
    - 42
extensions:
  strategy:
  respect_boundaries: perhaps
unknown_top_level: 1
"#,
        );
        assert_eq!(cfg.version, 1);
        assert_eq!(
            cfg.rules,
            vec![
                MemberRule::Property {
                    annotated: None,
                    visibility: None,
                },
                MemberRule::Method {
                    scope: None,
                    visibility: None,
                    annotated: Some(true),
                },
            ]
        );
        assert_eq!(cfg.extensions_strategy, ExtensionsStrategy::Separate);
        assert!(cfg.respect_boundaries);
    }

    #[test]
    fn extension_settings_are_read() {
        let cfg = parse("version: 1\nextensions:\n  strategy: merge\n  respect_boundaries: no\n");
        assert_eq!(cfg.extensions_strategy, ExtensionsStrategy::Merge);
        assert!(!cfg.respect_boundaries);
    }

    #[test]
    fn text_that_is_not_yaml_falls_back_to_defaults() {
        assert_eq!(parse("ordering: [unclosed"), Configuration::default());
        assert_eq!(
            parse("extensions: strategy: merge\n"),
            Configuration::default()
        );
    }

    #[test]
    fn unparsable_file_still_resolves() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "ordering:\n  members: [initializer\n")
            .unwrap();
        assert_eq!(resolve_config(None, dir.path()).unwrap(), Configuration::default());
    }

    #[test]
    fn discovery_walks_up_to_the_nearest_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Sources/App")).unwrap();
        let mut f = std::fs::File::create(root.join(".swift-marshal.yml")).unwrap();
        writeln!(f, "extensions:\n  strategy: merge").unwrap();

        let found = find_config(&root.join("Sources/App")).unwrap();
        assert_eq!(found, root.join(".swift-marshal.yml"));
        let cfg = resolve_config(None, &root.join("Sources/App")).unwrap();
        assert_eq!(cfg.extensions_strategy, ExtensionsStrategy::Merge);
    }

    #[test]
    fn discovery_stops_at_the_repository_root() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(CONFIG_FILE_NAME), "extensions:\n  strategy: merge\n").unwrap();
        fs::create_dir_all(root.join("repo/.git")).unwrap();
        fs::create_dir_all(root.join("repo/src")).unwrap();
        assert_eq!(find_config(&root.join("repo/src")), None);
        assert_eq!(
            resolve_config(None, &root.join("repo/src")).unwrap(),
            Configuration::default()
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = resolve_config(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = write_default_config(dir.path(), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        std::fs::write(&path, "version: 1\n").unwrap();
        let err = write_default_config(dir.path(), false).unwrap_err();
        assert!(matches!(err, MarshalError::AlreadyExists(_)));
        write_default_config(dir.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
