//! Unified-diff parser (C1, SPEC_FULL.md §4.1). Converts diff text into a
//! mapping `path → (added line numbers, removed line numbers)`.

use std::collections::HashMap;
use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::LintError;
use crate::model::FileChanges;

lazy_static! {
    static ref HUNK_HEADER_RE: Regex =
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap();
}

/// The per-file changed-line map produced by [`parse_unified_diff`],
/// preserving the order in which paths were first seen.
#[derive(Debug, Default)]
pub struct ChangedFiles {
    order: Vec<PathBuf>,
    changes: HashMap<PathBuf, FileChanges>,
}

impl ChangedFiles {
    pub fn get(&self, path: &std::path::Path) -> Option<&FileChanges> {
        self.changes.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn entry(&mut self, path: PathBuf) -> &mut FileChanges {
        if !self.changes.contains_key(&path) {
            self.order.push(path.clone());
            self.changes.insert(path.clone(), FileChanges::default());
        }
        self.changes.get_mut(&path).unwrap()
    }
}

/// Parse `diff_text` (a unified diff) into a [`ChangedFiles`] map.
///
/// Structural malformations (a `--- ` header with no following `+++ `
/// header, or a hunk header whose line numbers don't parse) are reported as
/// [`LintError::MalformedDiff`]. Path-decoding anomalies are best-effort and
/// never fatal.
pub fn parse_unified_diff(diff_text: &str) -> Result<ChangedFiles, LintError> {
    let filtered: Vec<&str> = diff_text.lines().filter(|l| should_keep_line(l)).collect();

    let mut result = ChangedFiles::default();
    let mut i = 0usize;
    while i < filtered.len() {
        let line = filtered[i];
        if !line.starts_with("--- ") {
            i += 1;
            continue;
        }
        let from_raw = &line[4..];
        i += 1;
        let to_raw = if i < filtered.len() && filtered[i].starts_with("+++ ") {
            let t = &filtered[i][4..];
            i += 1;
            t
        } else {
            return Err(LintError::MalformedDiff(format!(
                "expected a '+++ ' header after '--- {from_raw}'"
            )));
        };

        let to_norm = normalize_diff_path(to_raw);
        if to_norm == "/dev/null" {
            i = skip_hunks(&filtered, i);
            continue;
        }
        let path = PathBuf::from(to_norm);

        i = walk_hunks(&filtered, i, &mut result, &path)?;
    }
    Ok(result)
}

/// Keep the pre-filter's "keep as-is" decision logic and malformed-header
/// suppression in one place. A line starting with `diff ` (a VCS header) is
/// always dropped. A line starting with `--- ` or `+++ ` is kept only if it
/// looks like a genuine file-path header (`/dev/null` or a single character
/// followed by `/`); otherwise it is dropped outright, which also prevents
/// it from being counted as hunk content — this is the documented trade-off
/// in SPEC_FULL.md §4.1: a body line that happens to start with `"--- "`
/// (e.g. a horizontal rule inside a patched file) is invisible to
/// line-number accounting rather than being misread as a header.
fn should_keep_line(line: &str) -> bool {
    if line.starts_with("diff ") {
        return false;
    }
    if line.starts_with("--- ") || line.starts_with("+++ ") {
        return looks_like_diff_header_path(&line[4..]);
    }
    true
}

fn looks_like_diff_header_path(rest: &str) -> bool {
    if rest.starts_with("/dev/null") {
        return true;
    }
    let mut chars = rest.chars();
    matches!((chars.next(), chars.next()), (Some(_), Some('/')))
}

fn walk_hunks(
    lines: &[&str],
    mut i: usize,
    result: &mut ChangedFiles,
    path: &std::path::Path,
) -> Result<usize, LintError> {
    while i < lines.len() {
        let hline = lines[i];
        let caps = match HUNK_HEADER_RE.captures(hline) {
            Some(c) => c,
            None => break,
        };
        let mut old_line: u32 = caps[1]
            .parse()
            .map_err(|_| LintError::MalformedDiff(format!("bad hunk header: {hline}")))?;
        let mut new_line: u32 = caps[3]
            .parse()
            .map_err(|_| LintError::MalformedDiff(format!("bad hunk header: {hline}")))?;
        i += 1;
        while i < lines.len() {
            let cline = lines[i];
            if cline.starts_with("--- ") || HUNK_HEADER_RE.is_match(cline) {
                break;
            }
            if cline.starts_with('\\') {
                // "\ No newline at end of file" and similar markers.
                i += 1;
                continue;
            }
            match cline.as_bytes().first() {
                Some(b'+') => {
                    result.entry(path.to_path_buf()).added.insert(new_line);
                    new_line += 1;
                }
                Some(b'-') => {
                    result.entry(path.to_path_buf()).removed.insert(old_line);
                    old_line += 1;
                }
                _ => {
                    old_line += 1;
                    new_line += 1;
                }
            }
            i += 1;
        }
    }
    // Ensure a file with headers but zero hunks still appears (rare, but
    // keeps `paths()` consistent with "a file mentioned by the diff").
    result.entry(path.to_path_buf());
    Ok(i)
}

fn skip_hunks(lines: &[&str], mut i: usize) -> usize {
    while i < lines.len() && HUNK_HEADER_RE.is_match(lines[i]) {
        i += 1;
        while i < lines.len() && !lines[i].starts_with("--- ") && !HUNK_HEADER_RE.is_match(lines[i])
        {
            i += 1;
        }
    }
    i
}

/// Strip quotes, decode octal escapes, and strip a single-character path
/// prefix (`a/`, `b/`, ...), in that order.
fn normalize_diff_path(raw: &str) -> String {
    let unquoted = strip_surrounding_quotes(raw);
    let decoded = decode_octal_escapes(unquoted);
    strip_single_char_prefix(&decoded)
}

fn strip_surrounding_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Decode `\ddd` (1-3 octal digits) escapes into raw bytes, then re-read the
/// byte stream as UTF-8 (lossily, since path decoding is best-effort and
/// never fatal).
fn decode_octal_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
            let mut j = i + 1;
            let mut value: u32 = 0;
            let mut digits = 0;
            while j < bytes.len() && digits < 3 && (b'0'..=b'7').contains(&bytes[j]) {
                value = value * 8 + (bytes[j] - b'0') as u32;
                j += 1;
                digits += 1;
            }
            if digits > 0 {
                out.push(value as u8);
                i = j;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn strip_single_char_prefix(s: &str) -> String {
    let mut chars = s.char_indices();
    if chars.next().is_some() {
        if let Some((idx2, c2)) = chars.next() {
            if c2 == '/' {
                let after = idx2 + c2.len_utf8();
                return s[after..].to_string();
            }
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes<'a>(result: &'a ChangedFiles, path: &str) -> &'a FileChanges {
        result
            .get(std::path::Path::new(path))
            .unwrap_or_else(|| panic!("no entry for {path}"))
    }

    #[test]
    fn basic_modification() {
        let diff = "\
diff --git a/src/main.rs b/src/main.rs
index 541e930..e23bef1 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,3 @@
 line one
-old line
+new line
 line three
";
        let result = parse_unified_diff(diff).unwrap();
        assert_eq!(result.len(), 1);
        let c = changes(&result, "src/main.rs");
        assert_eq!(c.added, [2].into_iter().collect());
        assert_eq!(c.removed, [2].into_iter().collect());
    }

    #[test]
    fn pure_deletion_is_skipped() {
        let diff = "\
--- a/gone.rs
+++ /dev/null
@@ -1,2 +0,0 @@
-line one
-line two
";
        let result = parse_unified_diff(diff).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn pure_addition_is_kept() {
        let diff = "\
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+line one
+line two
";
        let result = parse_unified_diff(diff).unwrap();
        let c = changes(&result, "new.rs");
        assert_eq!(c.added, [1, 2].into_iter().collect());
        assert!(c.removed.is_empty());
    }

    #[test]
    fn multiple_hunks_in_one_file() {
        let diff = "\
--- a/f.rs
+++ b/f.rs
@@ -1,2 +1,2 @@
-a
+b
@@ -10,2 +10,2 @@
-c
+d
";
        let result = parse_unified_diff(diff).unwrap();
        let c = changes(&result, "f.rs");
        assert_eq!(c.added, [1, 10].into_iter().collect());
        assert_eq!(c.removed, [1, 10].into_iter().collect());
    }

    #[test]
    fn quoted_and_octal_escaped_path_is_decoded() {
        let diff = "--- \"a/\\344\\270\\255.rs\"\n+++ \"b/\\344\\270\\255.rs\"\n@@ -1 +1 @@\n-x\n+y\n";
        let result = parse_unified_diff(diff).unwrap();
        assert_eq!(result.paths().next().unwrap(), std::path::Path::new("中.rs"));
    }

    #[test]
    fn single_quoted_path() {
        let diff = "--- 'a/f.rs'\n+++ 'b/f.rs'\n@@ -1 +1 @@\n-x\n+y\n";
        let result = parse_unified_diff(diff).unwrap();
        assert_eq!(result.paths().next().unwrap(), std::path::Path::new("f.rs"));
    }

    #[test]
    fn ambiguous_dash_body_line_is_dropped_not_misread_as_header() {
        // A body line that happens to start with "--- " (e.g. a horizontal
        // rule inside the patched file's own content) must not abort
        // parsing as a malformed header, and per SPEC_FULL.md §4.1's
        // documented trade-off is simply invisible to line-number
        // accounting rather than being misread as a header itself.
        let diff = "\
--- a/notes.txt
+++ b/notes.txt
@@ -1,4 +1,4 @@
 Title
-old line
+new line
--- Not a real header, just a rule
 Footer
";
        let result = parse_unified_diff(diff).unwrap();
        assert_eq!(result.len(), 1);
        let c = changes(&result, "notes.txt");
        assert_eq!(c.added, [2].into_iter().collect());
        assert_eq!(c.removed, [2].into_iter().collect());
    }

    #[test]
    fn missing_plus_plus_plus_header_is_fatal() {
        let diff = "--- a/f.rs\n@@ -1 +1 @@\n-x\n+y\n";
        assert!(parse_unified_diff(diff).is_err());
    }

    #[test]
    fn no_newline_marker_does_not_affect_counters() {
        let diff = "\
--- a/f.rs
+++ b/f.rs
@@ -1,2 +1,2 @@
-a
\\ No newline at end of file
+b
\\ No newline at end of file
";
        let result = parse_unified_diff(diff).unwrap();
        let c = changes(&result, "f.rs");
        assert_eq!(c.added, [1].into_iter().collect());
        assert_eq!(c.removed, [1].into_iter().collect());
    }
}
