//! Environment-variable plumbing, in the teacher's style: small, testable
//! helpers rather than a config-loading framework. See SPEC_FULL.md §4.7.

#[cfg(not(test))]
use std::env;

pub const CCLINT_PARALLELISM: &str = "CCLINT_PARALLELISM";

/// If `name` is set and, after trimming whitespace, is not the empty
/// string, return that trimmed string. Else `None`.
pub fn get_env_var(_name: &str) -> Option<String> {
    #[cfg(not(test))]
    match env::var(_name).unwrap_or_else(|_| "".to_string()).trim() {
        "" => None,
        non_empty_string => Some(non_empty_string.to_string()),
    }
    #[cfg(test)]
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_env_var_is_none_in_tests() {
        assert_eq!(get_env_var(CCLINT_PARALLELISM), None);
    }
}
