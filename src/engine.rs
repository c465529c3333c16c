//! Lint Engine (C5, SPEC_FULL.md §4.5): orchestrates the diff parser, the
//! directive extractor, the uniqueness validator, and the worker pool
//! through phases A (diff ingest) through E (finalize).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::diff;
use crate::errors::{self, LintError};
use crate::model::{Directive, IgnorePattern, LabelRanges, LineRange, Pair};
use crate::path_utils;
use crate::pool::Pool;
use crate::uniqueness;

const NON_CODE_EXTENSIONS: &[&str] = &["md", "markdown"];

struct Diagnostic {
    file: PathBuf,
    line: u32,
    text: String,
}

/// Lint one unified diff. Returns `0` (clean) or `1` (at least one
/// violation). Non-recoverable failures (malformed diff, malformed
/// directive, I/O other than a missing target, pool setup) propagate as
/// `Err`.
pub fn lint_diff(
    diff_text: &str,
    parallelism: usize,
    verbose: bool,
    ignore_list: &[String],
) -> Result<i32, LintError> {
    let changes = diff::parse_unified_diff(diff_text)?;
    let patterns: Vec<IgnorePattern> = ignore_list.iter().map(|s| IgnorePattern::parse(s)).collect();

    // Phase A: diff ingest.
    let mut retained: Vec<PathBuf> = Vec::new();
    for path in changes.paths() {
        if !is_code_file(path) {
            continue;
        }
        if is_plain_path_ignored(path, &patterns) {
            if verbose {
                eprintln!("dropped (ignored): {}", path.display());
            }
            continue;
        }
        retained.push(path.clone());
    }

    let mut pool = Pool::new(parallelism)?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut pairs: Vec<Pair> = Vec::new();

    // Phase B: source-side parse, pairing, and orphan detection.
    for path in &retained {
        if verbose {
            eprintln!("scheduling parse: {}", path.display());
        }
        let directives = match pool.get_or_schedule(path) {
            Ok(d) => d,
            Err(err) => return Err(errors::fatal_from(path, &err)),
        };
        for (line, text) in uniqueness::validate_uniqueness(path, &directives) {
            diagnostics.push(Diagnostic { file: path.clone(), line, text });
        }

        let mut current_if: Option<(u32, Option<String>)> = None;
        let mut saw_then = false;
        for directive in directives.iter() {
            match directive {
                Directive::IfChange { line, label } => {
                    current_if = Some((*line, label.clone()));
                    saw_then = false;
                }
                Directive::ThenChange { line, target } => match &current_if {
                    None => {
                        if !is_target_ignored(target, &patterns) {
                            diagnostics.push(Diagnostic {
                                file: path.clone(),
                                line: *line,
                                text: format!(
                                    "[ifttt] {}:{} -> unexpected ThenChange '{}' without preceding IfChange",
                                    path.display(),
                                    line,
                                    target
                                ),
                            });
                        }
                    }
                    Some((if_line, if_label)) => {
                        pairs.push(Pair {
                            file: path.clone(),
                            if_line: *if_line,
                            if_label: if_label.clone(),
                            then_target: target.clone(),
                            then_line: *line,
                        });
                        saw_then = true;
                    }
                },
                Directive::Label { .. } | Directive::EndLabel { .. } => {}
            }
        }
        if let Some((if_line, if_label)) = current_if {
            if !saw_then {
                let ignored = if_label
                    .as_deref()
                    .map(|label| is_if_context_ignored(path, Some(label), &patterns))
                    .unwrap_or(false);
                if !ignored {
                    let if_repr = match &if_label {
                        Some(l) => format!("IfChange('{l}')"),
                        None => "IfChange".to_string(),
                    };
                    diagnostics.push(Diagnostic {
                        file: path.clone(),
                        line: if_line,
                        text: format!(
                            "[ifttt] {}:{} -> missing ThenChange after {}",
                            path.display(),
                            if_line,
                            if_repr
                        ),
                    });
                }
            }
        }
    }

    // Phase C: target resolution and label ranges.
    struct ResolvedTarget {
        path: PathBuf,
        label: Option<String>,
    }
    let resolved: Vec<ResolvedTarget> = pairs
        .iter()
        .map(|pair| {
            let (target_path, label) = path_utils::split_target(&pair.then_target);
            ResolvedTarget {
                path: path_utils::resolve(&pair.file, target_path),
                label: label.map(str::to_string),
            }
        })
        .collect();

    let mut code_targets: Vec<PathBuf> = resolved
        .iter()
        .map(|r| r.path.clone())
        .filter(|p| is_code_file(p))
        .collect();
    code_targets.sort();
    code_targets.dedup();

    let mut label_ranges: HashMap<PathBuf, LabelRanges> = HashMap::new();
    let mut not_found: HashSet<PathBuf> = HashSet::new();

    for target in &code_targets {
        let directives = match pool.get_or_schedule(target) {
            Ok(d) => d,
            Err(err) => {
                if errors::is_not_found(&err) {
                    not_found.insert(target.clone());
                    for (pair, rt) in pairs.iter().zip(resolved.iter()) {
                        if &rt.path != target {
                            continue;
                        }
                        if is_if_context_ignored(&pair.file, pair.if_label.as_deref(), &patterns)
                            || is_target_ignored(&pair.then_target, &patterns)
                        {
                            continue;
                        }
                        diagnostics.push(Diagnostic {
                            file: pair.file.clone(),
                            line: pair.then_line,
                            text: violation(
                                pair,
                                &format!("target file '{}' not found.", target.display()),
                            ),
                        });
                    }
                    continue;
                }
                return Err(errors::fatal_from(target, &err));
            }
        };
        for (line, text) in uniqueness::validate_uniqueness(target, &directives) {
            diagnostics.push(Diagnostic { file: target.clone(), line, text });
        }

        let mut stack: Vec<(String, u32)> = Vec::new();
        let mut ranges: HashMap<String, LineRange> = HashMap::new();
        for directive in directives.iter() {
            match directive {
                Directive::Label { line, name } => stack.push((name.clone(), line + 1)),
                Directive::EndLabel { line } => {
                    if let Some((name, start)) = stack.pop() {
                        ranges.insert(name, LineRange { start, end: line.saturating_sub(1) });
                    }
                }
                _ => {}
            }
        }
        label_ranges.insert(target.clone(), LabelRanges(ranges));
    }

    // Phase D: pair validation.
    for (pair, rt) in pairs.iter().zip(resolved.iter()) {
        if is_if_context_ignored(&pair.file, pair.if_label.as_deref(), &patterns)
            || is_target_ignored(&pair.then_target, &patterns)
        {
            continue;
        }
        let triggered = changes
            .get(&pair.file)
            .map(|fc| fc.is_changed(pair.if_line))
            .unwrap_or(false);
        if !triggered {
            continue;
        }

        let target_file = &rt.path;
        let Some(fc) = changes.get(target_file) else {
            if not_found.contains(target_file) || !target_file.exists() {
                continue;
            }
            diagnostics.push(Diagnostic {
                file: pair.file.clone(),
                line: pair.then_line,
                text: violation(
                    pair,
                    &format!("target file '{}' not changed.", target_file.display()),
                ),
            });
            continue;
        };

        if let Some(label) = &rt.label {
            match label_ranges.get(target_file).and_then(|lr| lr.0.get(label)) {
                None => {
                    let available = label_ranges
                        .get(target_file)
                        .map(LabelRanges::available_labels_display)
                        .unwrap_or_else(|| "none".to_string());
                    diagnostics.push(Diagnostic {
                        file: pair.file.clone(),
                        line: pair.then_line,
                        text: violation(
                            pair,
                            &format!(
                                "label '{}' not found in '{}'. Available labels: {}",
                                label,
                                target_file.display(),
                                available
                            ),
                        ),
                    });
                }
                Some(range) => {
                    let changed_in_range = fc.changed_in_range(range);
                    if changed_in_range.is_empty() {
                        diagnostics.push(Diagnostic {
                            file: pair.file.clone(),
                            line: pair.then_line,
                            text: violation(
                                pair,
                                &format!(
                                    "expected changes in '{}#{}' ({}-{}), but none found. Actual changes in file: {:?}",
                                    target_file.display(),
                                    label,
                                    range.start,
                                    range.end,
                                    fc.all_changed()
                                ),
                            ),
                        });
                    }
                }
            }
        } else if fc.all_changed().is_empty() {
            diagnostics.push(Diagnostic {
                file: pair.file.clone(),
                line: pair.then_line,
                text: violation(
                    pair,
                    &format!("expected changes in '{}', but none found.", target_file.display()),
                ),
            });
        }
    }

    // Phase E: finalize.
    pool.shutdown();

    diagnostics.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    for d in &diagnostics {
        println!("{}", d.text);
    }

    Ok(if diagnostics.is_empty() { 0 } else { 1 })
}

fn violation(pair: &Pair, detail: &str) -> String {
    format!(
        "[ifttt] {} -> ThenChange '{}' (line {}): {}",
        pair.if_context(),
        pair.then_target,
        pair.then_line,
        detail
    )
}

fn is_code_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => !NON_CODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => true,
    }
}

fn is_plain_path_ignored(path: &Path, patterns: &[IgnorePattern]) -> bool {
    let basename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let full = path.to_string_lossy();
    patterns
        .iter()
        .any(|p| p.is_unlabeled() && (p.matches(basename, None) || p.matches(&full, None)))
}

fn is_target_ignored(target_raw: &str, patterns: &[IgnorePattern]) -> bool {
    let (path_part, label) = path_utils::split_target(target_raw);
    let basename = Path::new(path_part)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path_part);
    patterns
        .iter()
        .any(|p| p.matches(basename, label) || p.matches(path_part, label))
}

fn is_if_context_ignored(file: &Path, if_label: Option<&str>, patterns: &[IgnorePattern]) -> bool {
    let Some(label) = if_label else {
        return false;
    };
    let basename = file.file_name().and_then(|s| s.to_str()).unwrap_or("");
    patterns.iter().any(|p| p.matches(basename, Some(label)))
}
