//! Directive extractor (C2, SPEC_FULL.md §4.2): reads one file, selects a
//! comment syntax by extension, and scans comment interior lines for
//! `LINT.*` directive tokens.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::comment::{self, CommentLine};
use crate::errors::LintError;
use crate::model::Directive;

lazy_static! {
    static ref IFCHANGE_LABELED_RE: Regex =
        Regex::new(r#"^LINT\.IfChange\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    static ref IFCHANGE_BARE_RE: Regex = Regex::new(r"^LINT\.IfChange\b(?!\s*\()").unwrap();
    static ref THEN_SINGLE_RE: Regex =
        Regex::new(r#"^LINT\.ThenChange\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    static ref THEN_ARRAY_RE: Regex =
        Regex::new(r"^LINT\.ThenChange\s*\(\s*\[([^\]]*)\]\s*,?\s*\)").unwrap();
    static ref QUOTED_ITEM_RE: Regex = Regex::new(r#"['"]([^'"]+)['"]"#).unwrap();
    static ref LABEL_RE: Regex =
        Regex::new(r#"^LINT\.Label\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    static ref ENDLABEL_RE: Regex = Regex::new(r"^LINT\.EndLabel\b").unwrap();
}

/// Read `path`, pick a comment syntax from its extension, and extract its
/// directives. A directory yields an empty list silently; any other I/O
/// failure propagates.
pub fn read_directives(path: &Path) -> Result<Vec<Directive>, LintError> {
    if path.is_dir() {
        return Ok(Vec::new());
    }
    let source = fs::read_to_string(path).map_err(|source| LintError::Io {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let syntax = comment::syntax_for_extension(ext);
    let lines = comment::extract_comment_lines(&source, syntax);
    extract_directives_from_lines(path, &lines)
}

/// Pure directive scan over pre-extracted comment lines, split out for unit
/// testing without touching the filesystem.
pub fn extract_directives_from_lines(
    path: &Path,
    lines: &[CommentLine],
) -> Result<Vec<Directive>, LintError> {
    let mut directives = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        let line_no = lines[i].line;
        let trimmed = lines[i].text.trim();

        if ENDLABEL_RE.is_match(trimmed) {
            directives.push(Directive::EndLabel { line: line_no });
            i += 1;
            continue;
        }
        if let Some(caps) = LABEL_RE.captures(trimmed) {
            directives.push(Directive::Label {
                line: line_no,
                name: caps[1].to_string(),
            });
            i += 1;
            continue;
        }
        if trimmed.starts_with("LINT.Label") {
            return Err(malformed(path, line_no, "malformed LINT.Label(...)"));
        }
        if let Some(caps) = IFCHANGE_LABELED_RE.captures(trimmed) {
            directives.push(Directive::IfChange {
                line: line_no,
                label: Some(caps[1].to_string()),
            });
            i += 1;
            continue;
        }
        if IFCHANGE_BARE_RE.is_match(trimmed) {
            directives.push(Directive::IfChange {
                line: line_no,
                label: None,
            });
            i += 1;
            continue;
        }
        if trimmed.starts_with("LINT.IfChange") {
            return Err(malformed(path, line_no, "malformed LINT.IfChange(...)"));
        }
        if trimmed.starts_with("LINT.ThenChange") {
            let (consumed, mut then_changes) = parse_then_change(path, lines, i)?;
            directives.append(&mut then_changes);
            i += consumed;
            continue;
        }
        if trimmed.starts_with("LINT.") {
            return Err(malformed(
                path,
                line_no,
                format!("unrecognized directive '{trimmed}'"),
            ));
        }
        i += 1;
    }
    Ok(directives)
}

/// Parse a `LINT.ThenChange(...)` starting at `lines[start]`, joining
/// subsequent comment lines when the array form spans more than one line.
/// Returns the number of comment lines consumed.
fn parse_then_change(
    path: &Path,
    lines: &[CommentLine],
    start: usize,
) -> Result<(usize, Vec<Directive>), LintError> {
    let start_line = lines[start].line;
    let first = lines[start].text.trim();

    if let Some(caps) = THEN_SINGLE_RE.captures(first) {
        return Ok((
            1,
            vec![Directive::ThenChange {
                line: start_line,
                target: caps[1].to_string(),
            }],
        ));
    }

    let mut joined = String::new();
    let mut consumed = 0usize;
    let mut j = start;
    while j < lines.len() {
        if j > start {
            joined.push(' ');
        }
        joined.push_str(lines[j].text.trim());
        consumed = j - start + 1;
        j += 1;
        if joined.contains(')') {
            break;
        }
    }

    if let Some(caps) = THEN_ARRAY_RE.captures(&joined) {
        let items = &caps[1];
        let targets: Vec<Directive> = QUOTED_ITEM_RE
            .captures_iter(items)
            .map(|c| Directive::ThenChange {
                line: start_line,
                target: c[1].to_string(),
            })
            .collect();
        return Ok((consumed, targets));
    }

    Err(malformed(
        path,
        start_line,
        format!("malformed LINT.ThenChange(...): {joined}"),
    ))
}

fn malformed(path: &Path, line: u32, detail: impl Into<String>) -> LintError {
    LintError::MalformedDirective {
        path: path.to_path_buf(),
        line,
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn lines(pairs: &[(u32, &str)]) -> Vec<CommentLine> {
        pairs
            .iter()
            .map(|(l, t)| CommentLine {
                line: *l,
                text: t.to_string(),
            })
            .collect()
    }

    fn p() -> PathBuf {
        PathBuf::from("file1.ts")
    }

    #[test]
    fn bare_if_change() {
        let ls = lines(&[(1, " LINT.IfChange")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(ds, vec![Directive::IfChange { line: 1, label: None }]);
    }

    #[test]
    fn labeled_if_change() {
        let ls = lines(&[(1, " LINT.IfChange('g')")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(
            ds,
            vec![Directive::IfChange {
                line: 1,
                label: Some("g".to_string())
            }]
        );
    }

    #[test]
    fn single_then_change() {
        let ls = lines(&[(2, " LINT.ThenChange(\"file2.ts\")")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(
            ds,
            vec![Directive::ThenChange {
                line: 2,
                target: "file2.ts".to_string()
            }]
        );
    }

    #[test]
    fn array_then_change_single_line() {
        let ls = lines(&[(2, " LINT.ThenChange([\"a.ts\", 'b.ts'])")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(
            ds,
            vec![
                Directive::ThenChange { line: 2, target: "a.ts".to_string() },
                Directive::ThenChange { line: 2, target: "b.ts".to_string() },
            ]
        );
    }

    #[test]
    fn array_then_change_spans_multiple_comment_lines() {
        let ls = lines(&[
            (2, " LINT.ThenChange(["),
            (3, " \"a.ts\","),
            (4, " \"b.ts\""),
            (5, " ])"),
        ]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(
            ds,
            vec![
                Directive::ThenChange { line: 2, target: "a.ts".to_string() },
                Directive::ThenChange { line: 2, target: "b.ts".to_string() },
            ]
        );
    }

    #[test]
    fn label_and_endlabel() {
        let ls = lines(&[(1, " LINT.Label(\"dummy\")"), (5, " LINT.EndLabel")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert_eq!(
            ds,
            vec![
                Directive::Label { line: 1, name: "dummy".to_string() },
                Directive::EndLabel { line: 5 },
            ]
        );
    }

    #[test]
    fn malformed_if_change_fails_fast() {
        let ls = lines(&[(1, " LINT.IfChange(")]);
        let err = extract_directives_from_lines(&p(), &ls).unwrap_err();
        assert!(matches!(err, LintError::MalformedDirective { line: 1, .. }));
    }

    #[test]
    fn malformed_then_change_fails_fast() {
        let ls = lines(&[(1, " LINT.ThenChange(not quoted)")]);
        let err = extract_directives_from_lines(&p(), &ls).unwrap_err();
        assert!(matches!(err, LintError::MalformedDirective { line: 1, .. }));
    }

    #[test]
    fn malformed_label_fails_fast() {
        let ls = lines(&[(1, " LINT.Label()")]);
        let err = extract_directives_from_lines(&p(), &ls).unwrap_err();
        assert!(matches!(err, LintError::MalformedDirective { line: 1, .. }));
    }

    #[test]
    fn unknown_directive_kind_fails_fast() {
        let ls = lines(&[(1, " LINT.Bogus")]);
        let err = extract_directives_from_lines(&p(), &ls).unwrap_err();
        assert!(matches!(err, LintError::MalformedDirective { line: 1, .. }));
    }

    #[test]
    fn directory_path_yields_empty_list() {
        let ds = read_directives(Path::new(".")).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn plain_comment_with_no_directive_is_ignored() {
        let ls = lines(&[(1, " just a comment")]);
        let ds = extract_directives_from_lines(&p(), &ls).unwrap();
        assert!(ds.is_empty());
    }
}
