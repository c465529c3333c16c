//! Pure path manipulation: normalization and `ThenChange` target resolution
//! (SPEC_FULL.md §3 invariant 5, §4.5 Phase C). Neither function touches the
//! filesystem.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path`: collapse `.` components and pop on `..`,
/// without touching the filesystem (so it works for paths that don't
/// exist).
///
/// Copied in spirit from
/// <https://github.com/rust-lang/cargo/blob/c6745a3/crates/cargo-util/src/paths.rs#L73-L106>.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut components = path.as_ref().components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!(),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Split a `ThenChange` target into its path part and optional label part.
/// `"path#label"` -> `("path", Some("label"))`, `"#label"` -> `("",
/// Some("label"))`, `"path"` -> `("path", None)`.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, label)) => (path, Some(label)),
        None => (target, None),
    }
}

/// Resolve the path part of a `ThenChange` target relative to the file that
/// declared it. Absolute paths are used as-is. An empty path part (a local
/// `#label` reference) resolves to `source_file` itself. Pure: never
/// touches the filesystem.
pub fn resolve(source_file: &Path, target_path: &str) -> PathBuf {
    if target_path.is_empty() {
        return normalize_path(source_file);
    }
    let candidate = Path::new(target_path);
    if candidate.is_absolute() {
        return normalize_path(candidate);
    }
    let dir = source_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(dir.join(candidate))
}
