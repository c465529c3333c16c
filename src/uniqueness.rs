//! Uniqueness Validator (C3, SPEC_FULL.md §4.3): within one file's directive
//! list, `IfChange` labels and `Label` names must not collide.

use std::collections::HashSet;
use std::path::Path;

use crate::model::Directive;

/// Check `directives` (all from `path`) for duplicate label names. Returns
/// `(line, message)` pairs for any duplicates found, so the caller can sort
/// them alongside other diagnostics; never fails the caller.
pub fn validate_uniqueness(path: &Path, directives: &[Directive]) -> Vec<(u32, String)> {
    let mut seen = HashSet::new();
    let mut diagnostics = Vec::new();

    for directive in directives {
        let (line, name) = match directive {
            Directive::IfChange { line, label: Some(label) } => (*line, label.as_str()),
            Directive::Label { line, name } => (*line, name.as_str()),
            _ => continue,
        };
        if !seen.insert(name.to_string()) {
            diagnostics.push((
                line,
                format!(
                    "[ifttt] {}:{} -> duplicate directive label '{}'",
                    path.display(),
                    line,
                    name
                ),
            ));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn no_duplicates_yields_no_diagnostics() {
        let ds = vec![
            Directive::IfChange { line: 1, label: Some("a".into()) },
            Directive::Label { line: 5, name: "b".into() },
        ];
        assert!(validate_uniqueness(&PathBuf::from("f.ts"), &ds).is_empty());
    }

    #[test]
    fn duplicate_label_across_if_change_and_label_is_reported() {
        let ds = vec![
            Directive::IfChange { line: 1, label: Some("dup".into()) },
            Directive::Label { line: 5, name: "dup".into() },
        ];
        let diags = validate_uniqueness(&PathBuf::from("f.ts"), &ds);
        assert_eq!(
            diags,
            vec![(5, "[ifttt] f.ts:5 -> duplicate directive label 'dup'".to_string())]
        );
    }

    #[test]
    fn unlabeled_if_change_is_ignored() {
        let ds = vec![
            Directive::IfChange { line: 1, label: None },
            Directive::IfChange { line: 2, label: None },
        ];
        assert!(validate_uniqueness(&PathBuf::from("f.ts"), &ds).is_empty());
    }
}
