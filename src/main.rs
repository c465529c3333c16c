use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cclint::cli::{Cli, Command};
use cclint::config::EngineConfig;
use cclint::{engine, scan};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("cclint: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = EngineConfig::new(cli.parallelism, cli.verbose, cli.ignore);

    let code = match cli.command {
        Some(Command::Scan { dir }) => scan::run_scan(&dir, config.parallelism, config.verbose)?,
        None => {
            let diff_text = read_diff_text(cli.diff_file.as_deref())?;
            engine::lint_diff(&diff_text, config.parallelism, config.verbose, &config.ignore_list)?
        }
    };
    Ok(code)
}

fn read_diff_text(path: Option<&std::path::Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read diff file {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read diff from stdin")?;
            Ok(buf)
        }
    }
}
