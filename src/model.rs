//! Core data types shared by the diff parser, directive extractor, and lint
//! engine (see SPEC_FULL.md §3).

use std::collections::BTreeSet;
use std::path::PathBuf;

/// A single `LINT.*` token found inside a source-file comment, together with
/// its 1-based line number in the file it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    IfChange { line: u32, label: Option<String> },
    ThenChange { line: u32, target: String },
    Label { line: u32, name: String },
    EndLabel { line: u32 },
}

impl Directive {
    pub fn line(&self) -> u32 {
        match self {
            Directive::IfChange { line, .. } => *line,
            Directive::ThenChange { line, .. } => *line,
            Directive::Label { line, .. } => *line,
            Directive::EndLabel { line } => *line,
        }
    }
}

/// Added/removed line numbers for one file, as seen in a unified diff.
/// `added` uses new-file line numbers, `removed` uses old-file line numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub added: BTreeSet<u32>,
    pub removed: BTreeSet<u32>,
}

impl FileChanges {
    pub fn is_changed(&self, line: u32) -> bool {
        self.added.contains(&line) || self.removed.contains(&line)
    }

    /// All changed line numbers (added ∪ removed), sorted ascending.
    pub fn all_changed(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self.added.iter().chain(self.removed.iter()).copied().collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    pub fn changed_in_range(&self, range: &LineRange) -> Vec<u32> {
        self.all_changed()
            .into_iter()
            .filter(|l| range.contains(*l))
            .collect()
    }
}

/// An inclusive `[start, end]` line range, used for labeled regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn contains(&self, line: u32) -> bool {
        line >= self.start && line <= self.end
    }
}

/// One `IfChange` bound to one `ThenChange` in the same file (§4.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub file: PathBuf,
    pub if_line: u32,
    pub if_label: Option<String>,
    pub then_target: String,
    pub then_line: u32,
}

impl Pair {
    /// The violation-string prefix: `"<file>#<label>:<line>"` or
    /// `"<file>:<line>"`.
    pub fn if_context(&self) -> String {
        match &self.if_label {
            Some(label) => format!("{}#{}:{}", self.file.display(), label, self.if_line),
            None => format!("{}:{}", self.file.display(), self.if_line),
        }
    }
}

/// A compiled `{glob, label?}` ignore entry, parsed once from `ignoreList[]`
/// by splitting on the first `#`.
#[derive(Clone, Debug)]
pub struct IgnorePattern {
    pub raw_glob: String,
    pub label: Option<String>,
    regex: regex::Regex,
}

impl IgnorePattern {
    pub fn parse(entry: &str) -> Self {
        let (glob, label) = match entry.split_once('#') {
            Some((g, l)) => (g.to_string(), Some(l.to_string())),
            None => (entry.to_string(), None),
        };
        let regex = crate::glob::glob_to_anchored_regex(&glob);
        IgnorePattern {
            raw_glob: glob,
            label,
            regex,
        }
    }

    /// Does `candidate` match this pattern's glob, with `label` (if any)
    /// matching this pattern's label (if any)?
    pub fn matches(&self, candidate: &str, label: Option<&str>) -> bool {
        if !self.regex.is_match(candidate) {
            return false;
        }
        match (&self.label, label) {
            (None, _) => true,
            (Some(want), Some(got)) => want == got,
            (Some(_), None) => false,
        }
    }

    /// True if the pattern carries no label (a plain file/target glob).
    pub fn is_unlabeled(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, Default)]
pub struct LabelRanges(pub std::collections::HashMap<String, LineRange>);

impl LabelRanges {
    pub fn available_labels_display(&self) -> String {
        if self.0.is_empty() {
            "none".to_string()
        } else {
            let mut names: Vec<&String> = self.0.keys().collect();
            names.sort();
            names
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_changes_all_changed_dedups_and_sorts() {
        let mut fc = FileChanges::default();
        fc.added.insert(5);
        fc.added.insert(1);
        fc.removed.insert(5);
        fc.removed.insert(3);
        assert_eq!(fc.all_changed(), vec![1, 3, 5]);
    }

    #[test]
    fn line_range_contains_is_inclusive() {
        let r = LineRange { start: 3, end: 5 };
        assert!(r.contains(3));
        assert!(r.contains(5));
        assert!(!r.contains(2));
        assert!(!r.contains(6));
    }

    #[test]
    fn pair_if_context_formats_with_and_without_label() {
        let p = Pair {
            file: PathBuf::from("file1.ts"),
            if_line: 1,
            if_label: Some("g".to_string()),
            then_target: "file2.ts".to_string(),
            then_line: 2,
        };
        assert_eq!(p.if_context(), "file1.ts#g:1");

        let p2 = Pair {
            if_label: None,
            ..p
        };
        assert_eq!(p2.if_context(), "file1.ts:1");
    }
}
