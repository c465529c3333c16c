//! CLI argument surface (A1, SPEC_FULL.md §4.6). Pure `clap` parsing only —
//! reading the diff and dispatching to the engine is `main.rs`'s job, so
//! this stays dependency-light and testable via `try_parse_from` without a
//! process boundary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cclint", about = "Cross-file change-coupling linter for unified diffs")]
pub struct Cli {
    /// Unified diff to lint. Omit to read from stdin.
    pub diff_file: Option<PathBuf>,

    /// Worker thread count. Defaults to CCLINT_PARALLELISM, then available parallelism.
    #[arg(short = 'j', long)]
    pub parallelism: Option<usize>,

    /// Emit schedule/drop trace lines to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Ignore pattern, `<glob>` or `<glob>#<label>`. Repeatable.
    #[arg(short, long = "ignore")]
    pub ignore: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find candidate files containing LINT. directives under a directory.
    Scan { dir: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cli = Cli::try_parse_from(["cclint", "diff.patch"]).unwrap();
        assert_eq!(cli.diff_file, Some(PathBuf::from("diff.patch")));
        assert_eq!(cli.parallelism, None);
        assert!(!cli.verbose);
        assert!(cli.ignore.is_empty());
    }

    #[test]
    fn no_diff_file_means_stdin() {
        let cli = Cli::try_parse_from(["cclint"]).unwrap();
        assert_eq!(cli.diff_file, None);
    }

    #[test]
    fn repeated_ignore_flags_accumulate() {
        let cli = Cli::try_parse_from(["cclint", "-i", "a.ts", "-i", "b.ts#lbl"]).unwrap();
        assert_eq!(cli.ignore, vec!["a.ts".to_string(), "b.ts#lbl".to_string()]);
    }

    #[test]
    fn scan_subcommand_is_recognized() {
        let cli = Cli::try_parse_from(["cclint", "scan", "src"]).unwrap();
        match cli.command {
            Some(Command::Scan { dir }) => assert_eq!(dir, PathBuf::from("src")),
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn parallelism_flag_is_parsed() {
        let cli = Cli::try_parse_from(["cclint", "-j", "4", "diff.patch"]).unwrap();
        assert_eq!(cli.parallelism, Some(4));
    }
}
