//! Scan collaborator (A4, SPEC_FULL.md §6 `run_scan`). Out-of-scope file
//! discovery lives outside the linting core: it shells out to `rg` to find
//! candidate files, then runs C2/C3 on each through the pool. Grounded on
//! the teacher's `subcommands/diff.rs`, which resolves and spawns an
//! external diff binary the same way.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use grep_cli::resolve_binary;

use crate::errors::{self, LintError};
use crate::pool::Pool;
use crate::uniqueness;

const SCAN_TOOL: &str = "rg";

/// Find files under `dir` containing the literal substring `LINT.`, then
/// run the directive extractor and uniqueness validator on each. Returns
/// `1` iff any uniqueness diagnostic was emitted.
pub fn run_scan(dir: &Path, parallelism: usize, verbose: bool) -> Result<i32, LintError> {
    let candidates = find_candidates(dir)?;

    let mut pool = Pool::new(parallelism)?;
    let mut had_diagnostic = false;
    for path in &candidates {
        if verbose {
            eprintln!("scheduling parse: {}", path.display());
        }
        let directives = match pool.get_or_schedule(path) {
            Ok(d) => d,
            Err(err) => return Err(errors::fatal_from(path, &err)),
        };
        for (_, text) in uniqueness::validate_uniqueness(path, &directives) {
            had_diagnostic = true;
            println!("{text}");
        }
    }
    pool.shutdown();

    Ok(if had_diagnostic { 1 } else { 0 })
}

fn find_candidates(dir: &Path) -> Result<Vec<PathBuf>, LintError> {
    let rg_path = resolve_binary(PathBuf::from(SCAN_TOOL)).map_err(|source| {
        LintError::ScanToolNotFound {
            tool: SCAN_TOOL.to_string(),
            source: Box::new(source),
        }
    })?;

    let mut child = Command::new(&rg_path)
        .arg("--files-with-matches")
        .arg("--fixed-strings")
        .arg("LINT.")
        .arg(dir)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| LintError::Io { path: Some(dir.to_path_buf()), source })?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let mut candidates = Vec::new();
    for line in BufReader::new(stdout).lines() {
        let line = line.map_err(|source| LintError::Io { path: Some(dir.to_path_buf()), source })?;
        if !line.is_empty() {
            candidates.push(PathBuf::from(line));
        }
    }

    let status = child
        .wait()
        .map_err(|source| LintError::Io { path: Some(dir.to_path_buf()), source })?;
    match status.code() {
        // rg exits 0 for hits, 1 for "no files matched" — both are normal.
        Some(0) | Some(1) => Ok(candidates),
        Some(code) => Err(LintError::ScanTool { tool: SCAN_TOOL.to_string(), status: code }),
        None => Err(LintError::ScanTool { tool: SCAN_TOOL.to_string(), status: -1 }),
    }
}
