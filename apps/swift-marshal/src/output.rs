//! Output rendering for check and fix commands.
//!
//! Supports `human` (default) and `json` outputs, plus the Xcode warning
//! format for `check --xcode`. The JSON form includes per-file fields and a
//! top-level summary. Summaries are built as plain strings first so they
//! can be tested without capturing stdout.

use crate::models::{CheckResult, FixResult};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

/// Presentation switches for `check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckView {
    pub quiet: bool,
    pub xcode: bool,
}

/// Print check results in the requested format.
pub fn print_check(results: &[CheckResult], view: CheckView, output: &str) {
    if output == "json" {
        print_json(&compose_check_json(results));
        return;
    }
    if view.xcode {
        for line in xcode_warnings(results) {
            println!("{line}");
        }
        return;
    }
    let color = use_colors(output);
    if !view.quiet {
        for r in results {
            print_file_report(r, color);
        }
    }
    let summary = check_summary(results, view.quiet);
    if color {
        for line in summary.lines() {
            if line.starts_with('✓') {
                println!("{}", line.green().bold());
            } else if line.starts_with('✗') {
                println!("{}", line.red().bold());
            } else {
                println!("{line}");
            }
        }
    } else {
        println!("{summary}");
    }
}

fn print_file_report(r: &CheckResult, color: bool) {
    let path = r.path.display().to_string();
    if color {
        println!("{}", path.bold());
    } else {
        println!("{path}");
    }
    if r.results.is_empty() {
        println!("  (no types)");
    }
    for t in &r.results {
        let (icon, note) = if t.needs_reordering {
            ("✗", " needs reordering")
        } else {
            ("✓", "")
        };
        let icon = match (color, t.needs_reordering) {
            (true, true) => icon.red().to_string(),
            (true, false) => icon.green().to_string(),
            (false, _) => icon.to_string(),
        };
        println!("  {icon} {} (line {}){note}", t.name, t.line);
    }
    println!();
}

/// `path:line: warning: 'Name' members need reordering`, one per
/// out-of-order type.
pub fn xcode_warnings(results: &[CheckResult]) -> Vec<String> {
    results
        .iter()
        .flat_map(|r| {
            r.results.iter().filter(|t| t.needs_reordering).map(move |t| {
                format!(
                    "{}:{}: warning: '{}' members need reordering",
                    r.path.display(),
                    t.line,
                    t.name
                )
            })
        })
        .collect()
}

/// Closing summary for `check`. In quiet mode the offending files are
/// listed first.
pub fn check_summary(results: &[CheckResult], quiet: bool) -> String {
    let total_files = results.len();
    let total_types: usize = results.iter().map(|r| r.results.len()).sum();
    let failing: Vec<&CheckResult> = results.iter().filter(|r| r.needs_reorder).collect();
    if failing.is_empty() {
        return format!(
            "✓ All {total_types} types in {total_files} {} are correctly ordered",
            plural(total_files, "file", "files")
        );
    }
    let types: usize = failing.iter().map(|r| r.types_needing_reorder()).sum();
    let mut out = String::new();
    if quiet {
        for r in &failing {
            out.push_str(&format!("{}\n", r.path.display()));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "✗ {types} {} in {} {} reordering\n  Run 'swift-marshal fix' to apply changes",
        plural(types, "type", "types"),
        failing.len(),
        plural(failing.len(), "file needs", "files need"),
    ));
    out
}

/// Print fix results in the requested format.
pub fn print_fix(results: &[FixResult], dry_run: bool, quiet: bool, output: &str) {
    if output == "json" {
        print_json(&compose_fix_json(results, dry_run));
        return;
    }
    let color = use_colors(output);
    if !quiet {
        for r in results.iter().filter(|r| r.modified) {
            let label = if dry_run { "Would reorder:" } else { "Reordered:" };
            if color {
                println!("{} {}", label.yellow().bold(), r.path.display());
            } else {
                println!("{label} {}", r.path.display());
            }
        }
    }
    let summary = fix_summary(results, dry_run);
    if !color {
        println!("{summary}");
    } else if summary.starts_with('⚠') {
        println!("{}", summary.yellow().bold());
    } else {
        println!("{}", summary.green().bold());
    }
}

pub fn fix_summary(results: &[FixResult], dry_run: bool) -> String {
    let count = results.iter().filter(|r| r.modified).count();
    if count == 0 {
        let total = results.len();
        format!(
            "✓ All {total} {} already correctly ordered",
            plural(total, "file", "files")
        )
    } else if dry_run {
        format!("⚠ {count} {} would be modified", plural(count, "file", "files"))
    } else {
        format!("✓ {count} {} reordered", plural(count, "file", "files"))
    }
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("error: failed to render JSON output: {e}"),
    }
}

/// Compose check JSON object (pure) for testing/snapshot purposes.
pub fn compose_check_json(results: &[CheckResult]) -> JsonVal {
    let summary = json!({
        "files": results.len(),
        "types": results.iter().map(|r| r.results.len()).sum::<usize>(),
        "files_needing_reorder": results.iter().filter(|r| r.needs_reorder).count(),
        "types_needing_reorder": results.iter().map(|r| r.types_needing_reorder()).sum::<usize>(),
    });
    json!({"results": results, "summary": summary})
}

/// Compose fix JSON object (pure) for testing/snapshot purposes.
pub fn compose_fix_json(results: &[FixResult], dry_run: bool) -> JsonVal {
    let modified = results.iter().filter(|r| r.modified).count();
    let summary = json!({
        "files": results.len(),
        "modified": modified,
        "wrote": if dry_run { 0 } else { modified },
        "dry_run": dry_run,
    });
    json!({"results": results, "summary": summary})
}
