//! Translates the small glob dialect used by ignore patterns (`*` = any run
//! of characters, `?` = single character, everything else literal) into an
//! anchored regex. See SPEC_FULL.md §9 "Glob matcher".

use regex::Regex;

/// Build an anchored regex (`^...$`) equivalent to `glob`, escaping every
/// character other than `*` and `?`.
pub fn glob_to_anchored_regex(glob: &str) -> Regex {
    let mut pattern = String::with_capacity(glob.len() * 2 + 2);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    // The translated pattern is always a valid regex: every input character
    // maps to either `.`, `.*`, or an escaped literal.
    Regex::new(&pattern).expect("glob-derived regex must compile")
}
